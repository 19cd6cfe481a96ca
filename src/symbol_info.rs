/// The symbol at a location, described in full.
///
/// The narrowest symbol enclosing the located position is reported with
/// its path, kind and range, optionally its complete source text and the
/// hover documentation taken at its name. Definition lookups reuse the
/// same description for the symbol they land on.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::*;

use crate::capability::Capability;
use crate::error::Result;
use crate::symbols::SymbolPath;
use crate::text::DocumentReader;
use crate::types::{Locate, symbol_kind_name};
use crate::{Engine, LanguageClient};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInfoRequest {
    pub locate: Locate,
    #[serde(default = "enabled")]
    pub include_hover: bool,
    #[serde(default = "enabled")]
    pub include_code: bool,
}

pub(crate) fn enabled() -> bool {
    true
}

impl SymbolInfoRequest {
    pub fn new(locate: Locate) -> Self {
        Self {
            locate,
            include_hover: true,
            include_code: true,
        }
    }

    pub fn without_hover(mut self) -> Self {
        self.include_hover = false;
        self
    }

    pub fn without_code(mut self) -> Self {
        self.include_code = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub file_path: PathBuf,
    pub name: String,
    pub path: SymbolPath,
    pub kind: String,
    pub range: Range,
    /// The text of the symbol's full range.
    pub code: Option<String>,
    pub hover: Option<String>,
}

impl<C: LanguageClient> Engine<C> {
    /// Describe the symbol enclosing `req.locate`.
    pub async fn symbol_info(&self, req: &SymbolInfoRequest) -> Result<Option<SymbolInfo>> {
        self.client
            .capabilities()
            .ensure(Capability::DocumentSymbol)?;

        let Some(located) = self.locate(&req.locate).await? else {
            return Ok(None);
        };
        self.describe_symbol(
            &located.file_path,
            located.position,
            req.include_hover,
            req.include_code,
        )
        .await
    }

    pub(crate) async fn describe_symbol(
        &self,
        file_path: &Path,
        position: Position,
        include_hover: bool,
        include_code: bool,
    ) -> Result<Option<SymbolInfo>> {
        let Some(index) = self.symbol_index(file_path).await? else {
            return Ok(None);
        };
        let Some((path, node)) = index.narrowest(position) else {
            tracing::debug!(
                file = %file_path.display(),
                line = position.line,
                "no symbol encloses position"
            );
            return Ok(None);
        };

        let code = if include_code {
            let content = self.client.read_file(file_path).await?;
            DocumentReader::new(&content)
                .read(node.range)
                .map(|snippet| snippet.text.to_string())
        } else {
            None
        };

        let hover = if include_hover && self.client.capabilities().supports(Capability::Hover) {
            self.hover_text(file_path, node.selection_range.start).await?
        } else {
            None
        };

        Ok(Some(SymbolInfo {
            file_path: file_path.to_path_buf(),
            name: node.name.clone(),
            path,
            kind: symbol_kind_name(node.kind).to_string(),
            range: node.range,
            code,
            hover,
        }))
    }
}
