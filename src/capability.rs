/// Explicit language-server capability checks.
///
/// Every capability that needs an optional protocol feature calls
/// [`CapabilitySet::ensure`] before issuing the request, so a missing
/// feature surfaces as a typed [`EngineError::UnsupportedCapability`]
/// carrying remediation text instead of an empty answer.
use std::collections::HashSet;
use std::fmt;

use tower_lsp::lsp_types::*;

use crate::error::{EngineError, Result};

/// A protocol feature the engine may rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    DocumentSymbol,
    Hover,
    CallHierarchy,
    References,
    Implementation,
    WorkspaceSymbol,
    Definition,
    Declaration,
    TypeDefinition,
    Completion,
    Diagnostic,
}

impl Capability {
    pub const ALL: [Capability; 11] = [
        Capability::DocumentSymbol,
        Capability::Hover,
        Capability::CallHierarchy,
        Capability::References,
        Capability::Implementation,
        Capability::WorkspaceSymbol,
        Capability::Definition,
        Capability::Declaration,
        Capability::TypeDefinition,
        Capability::Completion,
        Capability::Diagnostic,
    ];

    /// The LSP method backing this capability.
    pub fn method(self) -> &'static str {
        match self {
            Capability::DocumentSymbol => "textDocument/documentSymbol",
            Capability::Hover => "textDocument/hover",
            Capability::CallHierarchy => "textDocument/prepareCallHierarchy",
            Capability::References => "textDocument/references",
            Capability::Implementation => "textDocument/implementation",
            Capability::WorkspaceSymbol => "workspace/symbol",
            Capability::Definition => "textDocument/definition",
            Capability::Declaration => "textDocument/declaration",
            Capability::TypeDefinition => "textDocument/typeDefinition",
            Capability::Completion => "textDocument/completion",
            Capability::Diagnostic => "textDocument/diagnostic",
        }
    }

    /// What the caller can do instead when the feature is missing.
    pub fn remediation(self) -> &'static str {
        match self {
            Capability::DocumentSymbol => {
                "Locate by line scope or find pattern instead of a symbol path."
            }
            Capability::Hover => "Read the declaration with a range locate instead.",
            Capability::CallHierarchy => {
                "Trace calls manually by following references from the target symbol."
            }
            Capability::References => "Use workspace symbol search to find usages by name.",
            Capability::Implementation => {
                "Use references on the interface member or definition instead of implementation."
            }
            Capability::WorkspaceSymbol => {
                "Outline the relevant directory to list symbols instead."
            }
            Capability::Definition => {
                "Use declaration instead of definition, or inspect the symbol at the location."
            }
            Capability::Declaration => "Use definition instead of declaration.",
            Capability::TypeDefinition => {
                "Read the type from hover, then locate its declaration by symbol path."
            }
            Capability::Completion => {
                "Outline the enclosing symbol or search workspace symbols to list candidates."
            }
            Capability::Diagnostic => {
                "Run the project's own checker or linter on the file instead."
            }
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method())
    }
}

/// The set of features a language client supports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet(HashSet<Capability>);

impl CapabilitySet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Capability::ALL.into_iter().collect()
    }

    /// Derive the set from what a server advertised in `initialize`.
    pub fn from_server(caps: &ServerCapabilities) -> Self {
        let mut set = Self::empty();

        if enabled(&caps.document_symbol_provider) {
            set.insert(Capability::DocumentSymbol);
        }
        if enabled(&caps.references_provider) {
            set.insert(Capability::References);
        }
        if enabled(&caps.workspace_symbol_provider) {
            set.insert(Capability::WorkspaceSymbol);
        }
        if matches!(
            caps.hover_provider,
            Some(HoverProviderCapability::Simple(true)) | Some(HoverProviderCapability::Options(_))
        ) {
            set.insert(Capability::Hover);
        }
        if matches!(
            caps.call_hierarchy_provider,
            Some(CallHierarchyServerCapability::Simple(true))
                | Some(CallHierarchyServerCapability::Options(_))
        ) {
            set.insert(Capability::CallHierarchy);
        }
        if enabled(&caps.definition_provider) {
            set.insert(Capability::Definition);
        }
        if matches!(
            caps.declaration_provider,
            Some(DeclarationCapability::Simple(true))
                | Some(DeclarationCapability::RegistrationOptions(_))
                | Some(DeclarationCapability::Options(_))
        ) {
            set.insert(Capability::Declaration);
        }
        if matches!(
            caps.type_definition_provider,
            Some(TypeDefinitionProviderCapability::Simple(true))
                | Some(TypeDefinitionProviderCapability::Options(_))
        ) {
            set.insert(Capability::TypeDefinition);
        }
        if caps.completion_provider.is_some() {
            set.insert(Capability::Completion);
        }
        if caps.diagnostic_provider.is_some() {
            set.insert(Capability::Diagnostic);
        }
        if matches!(
            caps.implementation_provider,
            Some(ImplementationProviderCapability::Simple(true))
                | Some(ImplementationProviderCapability::Options(_))
        ) {
            set.insert(Capability::Implementation);
        }

        set
    }

    pub fn insert(&mut self, capability: Capability) -> bool {
        self.0.insert(capability)
    }

    pub fn with(mut self, capability: Capability) -> Self {
        self.insert(capability);
        self
    }

    pub fn without(mut self, capability: Capability) -> Self {
        self.0.remove(&capability);
        self
    }

    pub fn supports(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    pub fn ensure(&self, capability: Capability) -> Result<()> {
        if self.supports(capability) {
            Ok(())
        } else {
            Err(EngineError::UnsupportedCapability {
                capability,
                remediation: capability.remediation(),
            })
        }
    }
}

fn enabled<T>(cap: &Option<OneOf<bool, T>>) -> bool {
    match cap {
        Some(OneOf::Left(enabled)) => *enabled,
        Some(OneOf::Right(_)) => true,
        None => false,
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
