/// Go to definition, declaration or type definition.
///
/// The server is asked for the target of the located symbol. Only the
/// first target it reports is followed; a `LocationLink` is followed to
/// its selection range. The symbol enclosing the target is then described
/// like any [`SymbolInfo`].
use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::*;

use crate::capability::Capability;
use crate::error::Result;
use crate::symbol_info::{SymbolInfo, enabled};
use crate::types::Locate;
use crate::{Engine, LanguageClient};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionMode {
    #[default]
    Definition,
    Declaration,
    TypeDefinition,
}

impl DefinitionMode {
    fn capability(self) -> Capability {
        match self {
            DefinitionMode::Definition => Capability::Definition,
            DefinitionMode::Declaration => Capability::Declaration,
            DefinitionMode::TypeDefinition => Capability::TypeDefinition,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionRequest {
    pub locate: Locate,
    #[serde(default)]
    pub mode: DefinitionMode,
    #[serde(default = "enabled")]
    pub include_hover: bool,
    #[serde(default = "enabled")]
    pub include_code: bool,
}

impl DefinitionRequest {
    pub fn new(locate: Locate) -> Self {
        Self {
            locate,
            mode: DefinitionMode::default(),
            include_hover: true,
            include_code: true,
        }
    }

    pub fn with_mode(mut self, mode: DefinitionMode) -> Self {
        self.mode = mode;
        self
    }
}

impl<C: LanguageClient> Engine<C> {
    pub async fn definition(&self, req: &DefinitionRequest) -> Result<Option<SymbolInfo>> {
        self.client.capabilities().ensure(req.mode.capability())?;

        let Some(located) = self.locate(&req.locate).await? else {
            return Ok(None);
        };

        let (file_path, position) = (&located.file_path, located.position);
        let response = match req.mode {
            DefinitionMode::Definition => self.client.definition(file_path, position).await?,
            DefinitionMode::Declaration => self.client.declaration(file_path, position).await?,
            DefinitionMode::TypeDefinition => {
                self.client.type_definition(file_path, position).await?
            }
        };

        let Some((uri, target)) = response.as_ref().and_then(first_target) else {
            tracing::debug!(mode = ?req.mode, file = %file_path.display(), "no target reported");
            return Ok(None);
        };

        let target_path = self.client.uri_to_path(&uri);
        self.describe_symbol(&target_path, target, req.include_hover, req.include_code)
            .await
    }
}

/// The first target of a goto response.
pub fn first_target(response: &GotoDefinitionResponse) -> Option<(Url, Position)> {
    match response {
        GotoDefinitionResponse::Scalar(location) => {
            Some((location.uri.clone(), location.range.start))
        }
        GotoDefinitionResponse::Array(locations) => locations
            .first()
            .map(|location| (location.uri.clone(), location.range.start)),
        GotoDefinitionResponse::Link(links) => links
            .first()
            .map(|link| (link.target_uri.clone(), link.target_selection_range.start)),
    }
}
