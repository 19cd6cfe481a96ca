//! Data types shared across the engine.
//!
//! This module holds the request model for locating code ([`Locate`] and
//! its scopes), the point and range answers, and the small records the
//! capabilities hand back ([`ChainNode`], [`SymbolItem`]).
//!
//! Line numbers inside [`LineScope`] are 1-based because agents write
//! them by hand; every [`Position`] and [`Range`] is a 0-based LSP value.
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::*;

use crate::error::EngineError;
use crate::symbols::SymbolPath;

/// Restrict a search to a line or an inclusive range of lines (1-based).
///
/// `end_line == 0` extends the range to the end of the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawLineScope")]
pub struct LineScope {
    pub start_line: u32,
    pub end_line: u32,
}

#[derive(Deserialize)]
struct RawLineScope {
    start_line: u32,
    #[serde(default)]
    end_line: Option<u32>,
}

impl From<RawLineScope> for LineScope {
    fn from(raw: RawLineScope) -> Self {
        Self {
            start_line: raw.start_line,
            end_line: raw.end_line.unwrap_or(raw.start_line),
        }
    }
}

impl LineScope {
    pub fn line(line: u32) -> Self {
        Self {
            start_line: line,
            end_line: line,
        }
    }

    pub fn lines(start_line: u32, end_line: u32) -> Self {
        Self {
            start_line,
            end_line,
        }
    }

    /// Convert to a half-open LSP range over a document of `line_count`
    /// lines.
    pub fn to_range(self, line_count: usize) -> Range {
        let start = self.start_line.max(1) - 1;
        let end = if self.end_line == 0 {
            line_count as u32
        } else {
            self.end_line.max(start + 1)
        };
        Range {
            start: Position::new(start, 0),
            end: Position::new(end, 0),
        }
    }
}

/// Restrict a search to a symbol's full range.
///
/// Without a find pattern this also serves as a declaration locator: the
/// answer is the start of the symbol's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolScope {
    pub symbol_path: SymbolPath,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scope {
    Line(LineScope),
    Symbol(SymbolScope),
}

impl From<LineScope> for Scope {
    fn from(scope: LineScope) -> Self {
        Scope::Line(scope)
    }
}

impl From<SymbolScope> for Scope {
    fn from(scope: SymbolScope) -> Self {
        Scope::Symbol(scope)
    }
}

/// Two-stage location: an optional scope narrows the search, an optional
/// find pattern pins the spot inside it.
///
/// Resolution rules:
///   1. symbol scope without find: the symbol's declaration position
///   2. find containing a marker (`<|>`, `<<|>>`, …): the marker position
///   3. find without a marker: the start of the single match
///   4. line scope without find: the first non-blank character
///   5. no scope: the whole file is searched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLocate")]
pub struct Locate {
    /// File path relative to the workspace root.
    pub file_path: PathBuf,
    pub scope: Option<Scope>,
    pub find: Option<String>,
}

#[derive(Deserialize)]
struct RawLocate {
    file_path: PathBuf,
    #[serde(default)]
    scope: Option<Scope>,
    #[serde(default)]
    find: Option<String>,
}

impl TryFrom<RawLocate> for Locate {
    type Error = EngineError;

    fn try_from(raw: RawLocate) -> Result<Self, Self::Error> {
        Locate::new(raw.file_path, raw.scope, raw.find)
    }
}

impl Locate {
    /// Build a locate, rejecting one with neither a scope nor a find.
    pub fn new(
        file_path: impl Into<PathBuf>,
        scope: Option<Scope>,
        find: Option<String>,
    ) -> Result<Self, EngineError> {
        let locate = Self {
            file_path: file_path.into(),
            scope,
            find: find.filter(|f| !f.is_empty()),
        };
        locate.validate()?;
        Ok(locate)
    }

    pub fn find(file_path: impl Into<PathBuf>, find: impl Into<String>) -> Result<Self, EngineError> {
        Self::new(file_path, None, Some(find.into()))
    }

    pub fn symbol<S: Into<String>>(
        file_path: impl Into<PathBuf>,
        path: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            scope: Some(Scope::Symbol(SymbolScope {
                symbol_path: path.into_iter().collect(),
            })),
            find: None,
        }
    }

    pub fn with_find(mut self, find: impl Into<String>) -> Self {
        self.find = Some(find.into()).filter(|f| !f.is_empty());
        self
    }

    pub fn with_scope(mut self, scope: impl Into<Scope>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.scope.is_none() && self.find_pattern().is_none() {
            return Err(EngineError::MissingLocator);
        }
        Ok(())
    }

    /// The find pattern, treating an empty string as absent.
    pub fn find_pattern(&self) -> Option<&str> {
        self.find.as_deref().filter(|f| !f.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocateResponse {
    pub file_path: PathBuf,
    pub position: Position,
}

impl fmt::Display for LocateResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Located `{}` at {}:{}",
            self.file_path.display(),
            self.position.line + 1,
            self.position.character + 1
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocateRangeResponse {
    pub file_path: PathBuf,
    pub range: Range,
}

impl fmt::Display for LocateRangeResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Located `{}` range {}:{}-{}:{}",
            self.file_path.display(),
            self.range.start.line + 1,
            self.range.start.character + 1,
            self.range.end.line + 1,
            self.range.end.character + 1
        )
    }
}

/// One hop of a call chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainNode {
    pub name: String,
    pub kind: String,
    pub file_path: PathBuf,
    pub detail: Option<String>,
}

/// A call chain, source to target inclusive.
pub type Chain = Vec<ChainNode>;

/// A symbol as reported to the caller, optionally enriched with hover text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolItem {
    pub file_path: PathBuf,
    pub name: String,
    pub path: SymbolPath,
    pub kind: String,
    pub detail: Option<String>,
    pub range: Range,
    pub hover: Option<String>,
}

impl SymbolItem {
    pub fn from_symbol(file_path: PathBuf, path: SymbolPath, symbol: &DocumentSymbol) -> Self {
        Self {
            file_path,
            name: symbol.name.clone(),
            path,
            kind: symbol_kind_name(symbol.kind).to_string(),
            detail: symbol.detail.clone(),
            range: symbol.range,
            hover: None,
        }
    }
}

/// Human-readable name of an LSP symbol kind.
pub fn symbol_kind_name(kind: SymbolKind) -> &'static str {
    match kind {
        SymbolKind::FILE => "File",
        SymbolKind::MODULE => "Module",
        SymbolKind::NAMESPACE => "Namespace",
        SymbolKind::PACKAGE => "Package",
        SymbolKind::CLASS => "Class",
        SymbolKind::METHOD => "Method",
        SymbolKind::PROPERTY => "Property",
        SymbolKind::FIELD => "Field",
        SymbolKind::CONSTRUCTOR => "Constructor",
        SymbolKind::ENUM => "Enum",
        SymbolKind::INTERFACE => "Interface",
        SymbolKind::FUNCTION => "Function",
        SymbolKind::VARIABLE => "Variable",
        SymbolKind::CONSTANT => "Constant",
        SymbolKind::STRING => "String",
        SymbolKind::NUMBER => "Number",
        SymbolKind::BOOLEAN => "Boolean",
        SymbolKind::ARRAY => "Array",
        SymbolKind::OBJECT => "Object",
        SymbolKind::KEY => "Key",
        SymbolKind::NULL => "Null",
        SymbolKind::ENUM_MEMBER => "EnumMember",
        SymbolKind::STRUCT => "Struct",
        SymbolKind::EVENT => "Event",
        SymbolKind::OPERATOR => "Operator",
        SymbolKind::TYPE_PARAMETER => "TypeParameter",
        _ => "Unknown",
    }
}

/// Human-readable name of an LSP completion item kind.
pub fn completion_kind_name(kind: CompletionItemKind) -> &'static str {
    match kind {
        CompletionItemKind::TEXT => "Text",
        CompletionItemKind::METHOD => "Method",
        CompletionItemKind::FUNCTION => "Function",
        CompletionItemKind::CONSTRUCTOR => "Constructor",
        CompletionItemKind::FIELD => "Field",
        CompletionItemKind::VARIABLE => "Variable",
        CompletionItemKind::CLASS => "Class",
        CompletionItemKind::INTERFACE => "Interface",
        CompletionItemKind::MODULE => "Module",
        CompletionItemKind::PROPERTY => "Property",
        CompletionItemKind::UNIT => "Unit",
        CompletionItemKind::VALUE => "Value",
        CompletionItemKind::ENUM => "Enum",
        CompletionItemKind::KEYWORD => "Keyword",
        CompletionItemKind::SNIPPET => "Snippet",
        CompletionItemKind::COLOR => "Color",
        CompletionItemKind::FILE => "File",
        CompletionItemKind::REFERENCE => "Reference",
        CompletionItemKind::FOLDER => "Folder",
        CompletionItemKind::ENUM_MEMBER => "EnumMember",
        CompletionItemKind::CONSTANT => "Constant",
        CompletionItemKind::STRUCT => "Struct",
        CompletionItemKind::EVENT => "Event",
        CompletionItemKind::OPERATOR => "Operator",
        CompletionItemKind::TYPE_PARAMETER => "TypeParameter",
        _ => "Unknown",
    }
}
