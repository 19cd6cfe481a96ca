/// Completion suggestions at a located position, paged through the
/// engine's completion cache. Items keep the order the server ranked them
/// in.
use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::*;

use crate::capability::Capability;
use crate::error::Result;
use crate::pagination::{Page, PageRequest, paginate};
use crate::types::{Locate, completion_kind_name};
use crate::{Engine, LanguageClient};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub locate: Locate,
    #[serde(flatten)]
    pub page: PageRequest,
}

impl CompletionRequest {
    pub fn new(locate: Locate) -> Self {
        Self {
            locate,
            page: PageRequest::default(),
        }
    }

    pub fn with_page(mut self, page: PageRequest) -> Self {
        self.page = page;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionEntry {
    pub label: String,
    pub kind: String,
    /// Short signature or type.
    pub detail: Option<String>,
    pub documentation: Option<String>,
    /// What accepting the suggestion inserts; the label when the server
    /// gives nothing else.
    pub insert_text: String,
}

impl From<CompletionItem> for CompletionEntry {
    fn from(item: CompletionItem) -> Self {
        let insert_text = item.insert_text.unwrap_or_else(|| item.label.clone());
        Self {
            kind: item
                .kind
                .map_or("Unknown", completion_kind_name)
                .to_string(),
            detail: item.detail,
            documentation: item.documentation.map(|doc| match doc {
                Documentation::String(text) => text,
                Documentation::MarkupContent(markup) => markup.value,
            }),
            label: item.label,
            insert_text,
        }
    }
}

impl<C: LanguageClient> Engine<C> {
    pub async fn completion(&self, req: &CompletionRequest) -> Result<Option<Page<CompletionEntry>>> {
        self.client.capabilities().ensure(Capability::Completion)?;
        paginate(&req.page, &self.completion_cache, || self.collect_completions(req)).await
    }

    async fn collect_completions(&self, req: &CompletionRequest) -> Result<Option<Vec<CompletionEntry>>> {
        let Some(located) = self.locate(&req.locate).await? else {
            return Ok(None);
        };

        let items = match self
            .client
            .completion(&located.file_path, located.position)
            .await?
        {
            Some(CompletionResponse::Array(items)) => items,
            Some(CompletionResponse::List(list)) => list.items,
            None => Vec::new(),
        };

        tracing::debug!(file = %located.file_path.display(), items = items.len(), "completion");
        Ok(Some(items.into_iter().map(CompletionEntry::from).collect()))
    }
}
