/// The language-client boundary.
///
/// The engine consumes a language server only through [`LanguageClient`].
/// Transport, process lifecycle, request timeouts and cancellation all
/// belong to the implementor; if a call never resolves the engine makes no
/// further progress.
///
/// Conventions for implementors:
///   - `Ok(None)` means the server had no answer (not an error).
///   - `Err(_)` means the request itself failed; batch operations log and
///     drop such failures per item.
///   - File paths are workspace-relative, as written by the caller.
use std::path::{Path, PathBuf};

use tower_lsp::lsp_types::*;

use crate::capability::CapabilitySet;
use crate::error::Result;

#[tower_lsp::async_trait]
pub trait LanguageClient: Send + Sync {
    /// Features the connected server advertised.
    fn capabilities(&self) -> &CapabilitySet;

    /// Current text of a document.
    async fn read_file(&self, file_path: &Path) -> Result<String>;

    /// `textDocument/documentSymbol` in its hierarchical form.
    async fn document_symbols(&self, file_path: &Path) -> Result<Option<Vec<DocumentSymbol>>>;

    /// `textDocument/documentSymbol` in its flat form, used when the tree
    /// form is unavailable.
    async fn symbol_information(&self, file_path: &Path)
    -> Result<Option<Vec<SymbolInformation>>>;

    async fn hover(&self, file_path: &Path, position: Position) -> Result<Option<Hover>>;

    async fn prepare_call_hierarchy(
        &self,
        file_path: &Path,
        position: Position,
    ) -> Result<Option<Vec<CallHierarchyItem>>>;

    async fn outgoing_calls(
        &self,
        item: &CallHierarchyItem,
    ) -> Result<Option<Vec<CallHierarchyOutgoingCall>>>;

    async fn references(
        &self,
        file_path: &Path,
        position: Position,
        include_declaration: bool,
    ) -> Result<Option<Vec<Location>>>;

    async fn implementations(
        &self,
        file_path: &Path,
        position: Position,
    ) -> Result<Option<Vec<Location>>>;

    async fn workspace_symbols(&self, query: &str) -> Result<Option<Vec<SymbolInformation>>>;

    async fn definition(
        &self,
        file_path: &Path,
        position: Position,
    ) -> Result<Option<GotoDefinitionResponse>>;

    async fn declaration(
        &self,
        file_path: &Path,
        position: Position,
    ) -> Result<Option<GotoDefinitionResponse>>;

    async fn type_definition(
        &self,
        file_path: &Path,
        position: Position,
    ) -> Result<Option<GotoDefinitionResponse>>;

    /// `textDocument/completion`. Implementors resolve lazily filled items
    /// (`completionItem/resolve`) before returning them.
    async fn completion(
        &self,
        file_path: &Path,
        position: Position,
    ) -> Result<Option<CompletionResponse>>;

    /// Items of a full `textDocument/diagnostic` report.
    async fn diagnostics(&self, file_path: &Path) -> Result<Option<Vec<Diagnostic>>>;

    /// Map a document URI back to the path form the caller uses.
    fn uri_to_path(&self, uri: &Url) -> PathBuf {
        uri.to_file_path()
            .unwrap_or_else(|_| PathBuf::from(uri.path()))
    }
}
