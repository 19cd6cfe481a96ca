//! Error types for the resolution engine.
//!
//! "Not found" is never an error here: every operation returns `Ok(None)`
//! when a well-formed query simply has no answer. The variants below are
//! usage faults the caller has to fix by refining the request, plus
//! failures reported by the language client itself.

use thiserror::Error;

use crate::capability::Capability;

#[derive(Debug, Error)]
pub enum EngineError {
    /// More than one unmarked match for `find` inside the scope.
    #[error(
        "found {count} matches for {find:?}; add a `<|>` marker or narrow the scope to pick one"
    )]
    AmbiguousMatch { count: usize, find: String },

    /// The chosen marker depth occurs more than once in `find`.
    #[error("marker `{marker}` appears {count} times; use a deeper marker such as `{suggestion}`")]
    InvalidMarker {
        marker: String,
        count: usize,
        suggestion: String,
    },

    /// Neither a scope nor a find pattern was supplied.
    #[error("either scope or find must be provided")]
    MissingLocator,

    /// The language server does not advertise a feature this call needs.
    #[error("the language server does not support {capability}. {remediation}")]
    UnsupportedCapability {
        capability: Capability,
        remediation: &'static str,
    },

    /// A compact locate string could not be parsed.
    #[error("invalid locate string {input:?}: {reason}")]
    InvalidLocate { input: String, reason: String },

    /// A request combines fields that cannot be used together.
    #[error("invalid request: {0}")]
    InvalidRequest(&'static str),

    /// A request to the language client failed.
    #[error("{method} failed: {message}")]
    Provider {
        method: &'static str,
        message: String,
    },

    #[error(transparent)]
    Pattern(#[from] regex::Error),
}

impl EngineError {
    pub fn provider(method: &'static str, message: impl Into<String>) -> Self {
        Self::Provider {
            method,
            message: message.into(),
        }
    }
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
