/// References and implementations of a located symbol.
///
/// Every location the server reports becomes a [`ReferenceItem`] carrying
/// a few lines of surrounding code and, where the file has symbols, the
/// narrowest symbol enclosing the location along with its hover text.
/// Locations are enriched concurrently; one that cannot be read is logged
/// and dropped. The full set is sorted by `(file, line)` and paged through
/// the engine's reference cache.
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::*;

use crate::capability::Capability;
use crate::error::Result;
use crate::fanout;
use crate::pagination::{Page, PageRequest, paginate};
use crate::text::DocumentReader;
use crate::types::{Locate, SymbolItem};
use crate::{Engine, LanguageClient};

pub const DEFAULT_CONTEXT_LINES: usize = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceMode {
    /// Every usage, declaration included.
    #[default]
    References,
    /// Concrete implementations of an interface or abstract member.
    Implementations,
}

impl ReferenceMode {
    fn capability(self) -> Capability {
        match self {
            ReferenceMode::References => Capability::References,
            ReferenceMode::Implementations => Capability::Implementation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceRequest {
    pub locate: Locate,
    #[serde(default)]
    pub mode: ReferenceMode,
    /// Lines of code shown above and below each location.
    #[serde(default = "default_context_lines")]
    pub context_lines: usize,
    #[serde(flatten)]
    pub page: PageRequest,
}

fn default_context_lines() -> usize {
    DEFAULT_CONTEXT_LINES
}

impl ReferenceRequest {
    pub fn new(locate: Locate) -> Self {
        Self {
            locate,
            mode: ReferenceMode::default(),
            context_lines: DEFAULT_CONTEXT_LINES,
            page: PageRequest::default(),
        }
    }

    pub fn implementations(mut self) -> Self {
        self.mode = ReferenceMode::Implementations;
        self
    }

    pub fn with_page(mut self, page: PageRequest) -> Self {
        self.page = page;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceItem {
    pub file_path: PathBuf,
    /// 1-based.
    pub line: u32,
    /// The surrounding lines, dedented.
    pub code: String,
    pub symbol: Option<SymbolItem>,
}

impl<C: LanguageClient> Engine<C> {
    /// Find references (or implementations) of the symbol at `req.locate`.
    ///
    /// Returns `None` when the locate itself has no answer.
    pub async fn references(&self, req: &ReferenceRequest) -> Result<Option<Page<ReferenceItem>>> {
        self.client.capabilities().ensure(req.mode.capability())?;
        paginate(&req.page, &self.reference_cache, || self.collect_references(req)).await
    }

    async fn collect_references(&self, req: &ReferenceRequest) -> Result<Option<Vec<ReferenceItem>>> {
        let Some(located) = self.locate(&req.locate).await? else {
            return Ok(None);
        };

        let locations = match req.mode {
            ReferenceMode::References => {
                self.client
                    .references(&located.file_path, located.position, true)
                    .await?
            }
            ReferenceMode::Implementations => {
                self.client
                    .implementations(&located.file_path, located.position)
                    .await?
            }
        }
        .unwrap_or_default();

        tracing::debug!(
            mode = ?req.mode,
            locations = locations.len(),
            "enriching reference locations"
        );

        let mut items = fanout::bounded(&self.hover_limit, "references", locations, |location| {
            self.reference_item(location, req.context_lines)
        })
        .await;
        items.sort_by(|a, b| (&a.file_path, a.line).cmp(&(&b.file_path, b.line)));
        Ok(Some(items))
    }

    async fn reference_item(
        &self,
        location: Location,
        context_lines: usize,
    ) -> Result<Option<ReferenceItem>> {
        let file_path = self.client.uri_to_path(&location.uri);
        let content = self.client.read_file(&file_path).await?;

        let line = location.range.start.line as usize;
        let code = {
            let reader = DocumentReader::new(&content);
            if line >= reader.line_count() {
                tracing::debug!(file = %file_path.display(), line, "reference past end of file");
                return Ok(None);
            }
            reader.lines(line.saturating_sub(context_lines), line + context_lines)
        };

        let symbol = self.enclosing_symbol(&file_path, location.range.start).await;

        Ok(Some(ReferenceItem {
            file_path,
            line: location.range.start.line + 1,
            code,
            symbol,
        }))
    }

    /// The narrowest symbol around `position`, with hover text taken at
    /// `position` itself. Lookup failures only cost the enrichment.
    async fn enclosing_symbol(&self, file_path: &std::path::Path, position: Position) -> Option<SymbolItem> {
        let capabilities = self.client.capabilities();
        if !capabilities.supports(Capability::DocumentSymbol) {
            return None;
        }

        let index = match self.symbol_index(file_path).await {
            Ok(index) => index?,
            Err(e) => {
                tracing::warn!(error = %e, file = %file_path.display(), "enclosing symbol lookup failed");
                return None;
            }
        };
        let (path, node) = index.narrowest(position)?;
        let mut item = SymbolItem::from_symbol(file_path.to_path_buf(), path, node);

        if capabilities.supports(Capability::Hover) {
            match self.hover_text(file_path, position).await {
                Ok(text) => item.hover = text,
                Err(e) => tracing::warn!(error = %e, file = %file_path.display(), "hover failed"),
            }
        }
        Some(item)
    }
}
