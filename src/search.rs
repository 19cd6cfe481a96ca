/// Workspace-wide symbol search.
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::*;

use crate::capability::Capability;
use crate::error::Result;
use crate::pagination::{Page, PageRequest, paginate};
use crate::types::symbol_kind_name;
use crate::{Engine, LanguageClient};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    /// Keep only these kinds; every kind when absent or empty.
    #[serde(default)]
    pub kinds: Option<Vec<SymbolKind>>,
    #[serde(flatten)]
    pub page: PageRequest,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            kinds: None,
            page: PageRequest::default(),
        }
    }

    pub fn with_kinds(mut self, kinds: impl IntoIterator<Item = SymbolKind>) -> Self {
        self.kinds = Some(kinds.into_iter().collect());
        self
    }

    pub fn with_page(mut self, page: PageRequest) -> Self {
        self.page = page;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchItem {
    pub name: String,
    pub kind: String,
    pub file_path: PathBuf,
    /// 1-based.
    pub line: u32,
    pub container: Option<String>,
}

impl<C: LanguageClient> Engine<C> {
    /// Search symbols by name across the workspace, sorted by
    /// `(name, uri)`.
    pub async fn search(&self, req: &SearchRequest) -> Result<Option<Page<SearchItem>>> {
        self.client
            .capabilities()
            .ensure(Capability::WorkspaceSymbol)?;
        paginate(&req.page, &self.search_cache, || self.collect_symbols(req)).await
    }

    async fn collect_symbols(&self, req: &SearchRequest) -> Result<Option<Vec<SearchItem>>> {
        let Some(mut symbols) = self.client.workspace_symbols(&req.query).await? else {
            return Ok(None);
        };

        if let Some(kinds) = req.kinds.as_deref()
            && !kinds.is_empty()
        {
            symbols.retain(|symbol| kinds.contains(&symbol.kind));
        }
        symbols.sort_by(|a, b| {
            (&a.name, a.location.uri.as_str()).cmp(&(&b.name, b.location.uri.as_str()))
        });

        tracing::debug!(query = %req.query, matches = symbols.len(), "workspace symbol search");

        Ok(Some(
            symbols
                .into_iter()
                .map(|symbol| SearchItem {
                    kind: symbol_kind_name(symbol.kind).to_string(),
                    file_path: self.client.uri_to_path(&symbol.location.uri),
                    line: symbol.location.range.start.line + 1,
                    container: symbol.container_name,
                    name: symbol.name,
                })
                .collect(),
        ))
    }
}
