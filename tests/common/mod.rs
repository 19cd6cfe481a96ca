#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use pinpoint_lsp::{Capability, CapabilitySet, Engine, EngineConfig, EngineError, LanguageClient, Result};
use tower_lsp::lsp_types::*;

/// Root every fake URI lives under.
const FAKE_ROOT: &str = "/ws/";

/// In-memory language client.
///
/// Files, symbols, hovers, the call graph and search results are all
/// canned. Paths listed in `failing` make every per-file request error.
#[derive(Default)]
pub struct FakeClient {
    pub capabilities: CapabilitySet,
    pub files: HashMap<PathBuf, String>,
    pub trees: HashMap<PathBuf, Vec<DocumentSymbol>>,
    pub flat: HashMap<PathBuf, Vec<SymbolInformation>>,
    /// Hover text keyed by file and 0-based line.
    pub hovers: HashMap<(PathBuf, u32), String>,
    pub call_items: Vec<CallHierarchyItem>,
    /// Callee names keyed by caller name.
    pub calls: HashMap<String, Vec<String>>,
    pub references: Vec<Location>,
    pub implementations: Vec<Location>,
    pub workspace_symbols: Vec<SymbolInformation>,
    /// Goto targets keyed by method, file and 0-based line of the request.
    pub gotos: HashMap<(&'static str, PathBuf, u32), GotoDefinitionResponse>,
    pub completions: Vec<CompletionItem>,
    pub diagnostics: HashMap<PathBuf, Vec<Diagnostic>>,
    pub failing: HashSet<PathBuf>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self {
            capabilities: CapabilitySet::all(),
            ..Self::default()
        }
    }

    pub fn with_file(mut self, path: &str, text: &str) -> Self {
        self.files.insert(PathBuf::from(path), text.to_string());
        self
    }

    pub fn with_symbols(mut self, path: &str, tree: Vec<DocumentSymbol>) -> Self {
        self.trees.insert(PathBuf::from(path), tree);
        self
    }

    pub fn with_flat_symbols(mut self, path: &str, flat: Vec<SymbolInformation>) -> Self {
        self.flat.insert(PathBuf::from(path), flat);
        self
    }

    pub fn with_hover(mut self, path: &str, line: u32, text: &str) -> Self {
        self.hovers.insert((PathBuf::from(path), line), text.to_string());
        self
    }

    pub fn with_call_item(mut self, item: CallHierarchyItem) -> Self {
        self.call_items.push(item);
        self
    }

    pub fn with_call(mut self, caller: &str, callee: &str) -> Self {
        self.calls
            .entry(caller.to_string())
            .or_default()
            .push(callee.to_string());
        self
    }

    pub fn with_references(mut self, locations: Vec<Location>) -> Self {
        self.references = locations;
        self
    }

    pub fn with_implementations(mut self, locations: Vec<Location>) -> Self {
        self.implementations = locations;
        self
    }

    pub fn with_workspace_symbols(mut self, symbols: Vec<SymbolInformation>) -> Self {
        self.workspace_symbols = symbols;
        self
    }

    pub fn with_goto(
        mut self,
        method: &'static str,
        path: &str,
        line: u32,
        response: GotoDefinitionResponse,
    ) -> Self {
        self.gotos.insert((method, PathBuf::from(path), line), response);
        self
    }

    pub fn with_completions(mut self, items: Vec<CompletionItem>) -> Self {
        self.completions = items;
        self
    }

    pub fn with_diagnostics(mut self, path: &str, diagnostics: Vec<Diagnostic>) -> Self {
        self.diagnostics.insert(PathBuf::from(path), diagnostics);
        self
    }

    pub fn failing(mut self, path: &str) -> Self {
        self.failing.insert(PathBuf::from(path));
        self
    }

    pub fn without(mut self, capability: Capability) -> Self {
        self.capabilities = self.capabilities.without(capability);
        self
    }

    pub fn engine(self) -> Engine<Self> {
        Engine::new(self)
    }

    pub fn engine_with(self, config: EngineConfig) -> Engine<Self> {
        Engine::with_config(self, config)
    }

    fn goto(&self, method: &'static str, file_path: &Path, position: Position) -> Result<Option<GotoDefinitionResponse>> {
        self.check(method, file_path)?;
        Ok(self
            .gotos
            .get(&(method, file_path.to_path_buf(), position.line))
            .cloned())
    }

    fn check(&self, method: &'static str, file_path: &Path) -> Result<()> {
        if self.failing.contains(file_path) {
            return Err(EngineError::provider(
                method,
                format!("{} is broken", file_path.display()),
            ));
        }
        Ok(())
    }
}

#[tower_lsp::async_trait]
impl LanguageClient for FakeClient {
    fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    async fn read_file(&self, file_path: &Path) -> Result<String> {
        self.check("read_file", file_path)?;
        self.files
            .get(file_path)
            .cloned()
            .ok_or_else(|| EngineError::provider("read_file", format!("no such file: {}", file_path.display())))
    }

    async fn document_symbols(&self, file_path: &Path) -> Result<Option<Vec<DocumentSymbol>>> {
        self.check("textDocument/documentSymbol", file_path)?;
        Ok(self.trees.get(file_path).cloned())
    }

    async fn symbol_information(&self, file_path: &Path) -> Result<Option<Vec<SymbolInformation>>> {
        self.check("textDocument/documentSymbol", file_path)?;
        Ok(self.flat.get(file_path).cloned())
    }

    async fn hover(&self, file_path: &Path, position: Position) -> Result<Option<Hover>> {
        self.check("textDocument/hover", file_path)?;
        Ok(self
            .hovers
            .get(&(file_path.to_path_buf(), position.line))
            .map(|text| Hover {
                contents: HoverContents::Markup(MarkupContent {
                    kind: MarkupKind::Markdown,
                    value: text.clone(),
                }),
                range: None,
            }))
    }

    async fn prepare_call_hierarchy(
        &self,
        file_path: &Path,
        position: Position,
    ) -> Result<Option<Vec<CallHierarchyItem>>> {
        let items: Vec<CallHierarchyItem> = self
            .call_items
            .iter()
            .filter(|item| self.uri_to_path(&item.uri) == file_path)
            .filter(|item| contains(&item.range, position))
            .cloned()
            .collect();
        Ok((!items.is_empty()).then_some(items))
    }

    async fn outgoing_calls(
        &self,
        item: &CallHierarchyItem,
    ) -> Result<Option<Vec<CallHierarchyOutgoingCall>>> {
        let Some(callees) = self.calls.get(&item.name) else {
            return Ok(None);
        };
        Ok(Some(
            callees
                .iter()
                .filter_map(|name| self.call_items.iter().find(|item| &item.name == name))
                .map(|to| CallHierarchyOutgoingCall {
                    to: to.clone(),
                    from_ranges: vec![],
                })
                .collect(),
        ))
    }

    async fn references(
        &self,
        _file_path: &Path,
        _position: Position,
        _include_declaration: bool,
    ) -> Result<Option<Vec<Location>>> {
        Ok(Some(self.references.clone()))
    }

    async fn implementations(
        &self,
        _file_path: &Path,
        _position: Position,
    ) -> Result<Option<Vec<Location>>> {
        Ok(Some(self.implementations.clone()))
    }

    async fn workspace_symbols(&self, query: &str) -> Result<Option<Vec<SymbolInformation>>> {
        Ok(Some(
            self.workspace_symbols
                .iter()
                .filter(|symbol| symbol.name.contains(query))
                .cloned()
                .collect(),
        ))
    }

    async fn definition(
        &self,
        file_path: &Path,
        position: Position,
    ) -> Result<Option<GotoDefinitionResponse>> {
        self.goto("textDocument/definition", file_path, position)
    }

    async fn declaration(
        &self,
        file_path: &Path,
        position: Position,
    ) -> Result<Option<GotoDefinitionResponse>> {
        self.goto("textDocument/declaration", file_path, position)
    }

    async fn type_definition(
        &self,
        file_path: &Path,
        position: Position,
    ) -> Result<Option<GotoDefinitionResponse>> {
        self.goto("textDocument/typeDefinition", file_path, position)
    }

    async fn completion(
        &self,
        file_path: &Path,
        _position: Position,
    ) -> Result<Option<CompletionResponse>> {
        self.check("textDocument/completion", file_path)?;
        Ok(Some(CompletionResponse::List(CompletionList {
            is_incomplete: false,
            items: self.completions.clone(),
        })))
    }

    async fn diagnostics(&self, file_path: &Path) -> Result<Option<Vec<Diagnostic>>> {
        self.check("textDocument/diagnostic", file_path)?;
        Ok(self.diagnostics.get(file_path).cloned())
    }

    fn uri_to_path(&self, uri: &Url) -> PathBuf {
        PathBuf::from(uri.path().trim_start_matches(FAKE_ROOT))
    }
}

fn contains(range: &Range, position: Position) -> bool {
    let pos = (position.line, position.character);
    (range.start.line, range.start.character) <= pos && pos < (range.end.line, range.end.character)
}

/// Route engine logs to the test output; set `RUST_LOG` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn uri(path: &str) -> Url {
    Url::parse(&format!("file://{FAKE_ROOT}{path}")).expect("valid test uri")
}

pub fn range(start_line: u32, start_char: u32, end_line: u32, end_char: u32) -> Range {
    Range {
        start: Position::new(start_line, start_char),
        end: Position::new(end_line, end_char),
    }
}

pub fn location(path: &str, line: u32, character: u32) -> Location {
    Location {
        uri: uri(path),
        range: range(line, character, line, character + 1),
    }
}

/// A document symbol whose name sits at the start of its range.
#[allow(deprecated)]
pub fn symbol(
    name: &str,
    kind: SymbolKind,
    range: Range,
    children: Vec<DocumentSymbol>,
) -> DocumentSymbol {
    DocumentSymbol {
        name: name.to_string(),
        detail: None,
        kind,
        tags: None,
        deprecated: None,
        range,
        selection_range: Range {
            start: range.start,
            end: Position::new(range.start.line, range.start.character + name.len() as u32),
        },
        children: (!children.is_empty()).then_some(children),
    }
}

#[allow(deprecated)]
pub fn info(name: &str, kind: SymbolKind, path: &str, range: Range) -> SymbolInformation {
    SymbolInformation {
        name: name.to_string(),
        kind,
        tags: None,
        deprecated: None,
        location: Location {
            uri: uri(path),
            range,
        },
        container_name: None,
    }
}

/// A call-hierarchy item spanning one line of `path`.
pub fn call_item(name: &str, path: &str, line: u32) -> CallHierarchyItem {
    CallHierarchyItem {
        name: name.to_string(),
        kind: SymbolKind::FUNCTION,
        tags: None,
        detail: None,
        uri: uri(path),
        range: range(line, 0, line + 1, 0),
        selection_range: range(line, 0, line, name.len() as u32),
        data: None,
    }
}
