//! Location and symbol resolution on top of a language server.
//!
//! An agent describes a place in a file loosely (a line, a symbol path, a
//! snippet with a `<|>` marker) and the [`Engine`] turns it into an exact
//! LSP position or range. From there the engine answers richer questions:
//! hover text, outlines, references, workspace symbol search, and call
//! chains between two symbols.
//!
//! The engine never talks to a language server directly. Everything goes
//! through the [`LanguageClient`] trait, so transport and process lifecycle
//! stay with the caller.
//!
//! - [`locate`]: the two-stage scope → find resolver.
//! - [`symbols`]: path and position lookups over a document symbol tree.
//! - [`pagination`]: LRU cache of frozen result snapshots for paged delivery.
//! - [`relation`]: bounded breadth-first search over the call hierarchy.
//! - [`hover`], [`outline`], [`reference`], [`search`], [`symbol_info`],
//!   [`definition`], [`completion`], [`diagnostics`]: thin capabilities
//!   built on the pieces above.
use tokio::sync::Semaphore;

pub mod capability;
pub mod completion;
pub mod config;
pub mod definition;
pub mod diagnostics;
pub mod error;
pub(crate) mod fanout;
pub mod hover;
pub mod locate;
pub mod outline;
pub mod pagination;
pub mod provider;
pub mod reference;
pub mod relation;
pub mod search;
pub mod symbol_info;
pub mod symbols;
pub mod text;
pub mod types;

pub use capability::{Capability, CapabilitySet};
pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use provider::LanguageClient;

use crate::completion::CompletionEntry;
use crate::diagnostics::DiagnosticItem;
use crate::pagination::PaginationCache;
use crate::reference::ReferenceItem;
use crate::search::SearchItem;

/// Entry point for every resolution capability.
///
/// One `Engine` wraps one language client. The pagination caches and the
/// fan-out limiters live here, so their lifetime is the engine's lifetime
/// and two engines never share paging state.
pub struct Engine<C> {
    pub(crate) client: C,
    pub(crate) config: EngineConfig,
    pub(crate) reference_cache: PaginationCache<ReferenceItem>,
    pub(crate) search_cache: PaginationCache<SearchItem>,
    pub(crate) completion_cache: PaginationCache<CompletionEntry>,
    pub(crate) diagnostic_cache: PaginationCache<DiagnosticItem>,
    /// Bounds concurrent hover requests issued by batch enrichment.
    pub(crate) hover_limit: Semaphore,
    /// Bounds concurrent per-file symbol fetches in directory outlines.
    pub(crate) scan_limit: Semaphore,
}

impl<C: LanguageClient> Engine<C> {
    pub fn new(client: C) -> Self {
        Self::with_config(client, EngineConfig::default())
    }

    pub fn with_config(client: C, config: EngineConfig) -> Self {
        let capacity = config.pagination_capacity;
        Self {
            hover_limit: Semaphore::new(config.hover_concurrency.max(1)),
            scan_limit: Semaphore::new(config.scan_concurrency.max(1)),
            reference_cache: PaginationCache::new(capacity),
            search_cache: PaginationCache::new(capacity),
            completion_cache: PaginationCache::new(capacity),
            diagnostic_cache: PaginationCache::new(capacity),
            client,
            config,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
