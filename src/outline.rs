/// Symbol outlines for a file or a directory.
///
/// **File mode** lists a file's symbols, each enriched with hover text:
///   - `recursive = false`: top-level symbols, looking through modules
///   - `recursive = true`: every symbol except the locals inside callables
///
/// A symbol `scope` narrows a file outline to that symbol and what it
/// contains.
///
/// **Directory mode** scans source files with the `ignore` walker (so
/// `.gitignore` and hidden files are respected) and lists each file's
/// top-level symbols, without hover text. Files whose symbols cannot be
/// fetched are logged and left out.
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::*;

use crate::capability::Capability;
use crate::error::{EngineError, Result};
use crate::fanout;
use crate::symbols::{SymbolIndex, SymbolPath, filtered, range_contains, top_level};
use crate::types::{SymbolItem, SymbolScope};
use crate::{Engine, LanguageClient};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineRequest {
    /// A file or a directory, relative to the workspace root.
    pub path: PathBuf,
    /// Only valid for files.
    #[serde(default)]
    pub scope: Option<SymbolScope>,
    /// Directories: descend into subdirectories. Files: include nested
    /// members.
    #[serde(default)]
    pub recursive: bool,
}

impl OutlineRequest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            scope: None,
            recursive: false,
        }
    }

    pub fn recursive(mut self) -> Self {
        self.recursive = true;
        self
    }

    pub fn with_scope(mut self, symbol_path: SymbolPath) -> Self {
        self.scope = Some(SymbolScope { symbol_path });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum OutlineResponse {
    File(FileOutline),
    Directory(DirectoryOutline),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOutline {
    pub path: PathBuf,
    pub items: Vec<SymbolItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileGroup {
    pub file_path: PathBuf,
    pub symbols: Vec<SymbolItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryOutline {
    pub path: PathBuf,
    /// Sorted by file path.
    pub files: Vec<FileGroup>,
    pub total_files: usize,
    pub total_symbols: usize,
    /// Set for non-recursive scans that skipped visible subdirectories.
    pub has_subdirs: bool,
}

impl<C: LanguageClient> Engine<C> {
    pub async fn outline(&self, req: &OutlineRequest) -> Result<Option<OutlineResponse>> {
        self.client
            .capabilities()
            .ensure(Capability::DocumentSymbol)?;

        let on_disk = self.config.workspace_root.join(&req.path);
        if on_disk.is_dir() {
            if req.scope.is_some() {
                return Err(EngineError::InvalidRequest(
                    "scope cannot be used with a directory path",
                ));
            }
            let outline = self.outline_directory(req, &on_disk).await?;
            return Ok(Some(OutlineResponse::Directory(outline)));
        }

        Ok(self.outline_file(req).await?.map(OutlineResponse::File))
    }

    async fn outline_file(&self, req: &OutlineRequest) -> Result<Option<FileOutline>> {
        let Some(index) = self.symbol_index(&req.path).await? else {
            return Ok(None);
        };

        let scope = req.scope.as_ref().map(|scope| &scope.symbol_path);
        let items: Vec<(SymbolItem, Position)> = select(&index, scope, req.recursive)
            .into_iter()
            .map(|(path, node)| {
                let item = SymbolItem::from_symbol(req.path.clone(), path, node);
                (item, node.selection_range.start)
            })
            .collect();

        Ok(Some(FileOutline {
            path: req.path.clone(),
            items: self.with_hover(items).await,
        }))
    }

    /// Fill in hover text for every item, querying at its paired anchor.
    ///
    /// Items keep their order. A failed hover leaves that item's text
    /// empty.
    async fn with_hover(&self, items: Vec<(SymbolItem, Position)>) -> Vec<SymbolItem> {
        if !self.client.capabilities().supports(Capability::Hover) {
            tracing::debug!("hover unsupported, outline left without hover text");
            return items.into_iter().map(|(item, _)| item).collect();
        }

        fanout::bounded(
            &self.hover_limit,
            "outline hover",
            items,
            |(mut item, anchor): (SymbolItem, Position)| async move {
                match self.hover_text(&item.file_path, anchor).await {
                    Ok(text) => item.hover = text,
                    Err(e) => {
                        tracing::warn!(error = %e, symbol = %item.path, "hover failed");
                    }
                }
                Ok::<_, EngineError>(Some(item))
            },
        )
        .await
    }

    async fn outline_directory(&self, req: &OutlineRequest, root: &Path) -> Result<DirectoryOutline> {
        let mut files = Vec::new();
        let mut has_subdirs = false;

        let mut walker = WalkBuilder::new(root);
        walker.max_depth((!req.recursive).then_some(1));
        for entry in walker.build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };
            if entry.depth() == 0 {
                continue;
            }
            let Some(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_dir() {
                has_subdirs |= !req.recursive;
                continue;
            }
            if !file_type.is_file() || !self.config.accepts_file(entry.path()) {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&self.config.workspace_root)
                .unwrap_or(entry.path());
            files.push(relative.to_path_buf());
        }

        tracing::debug!(dir = %root.display(), files = files.len(), "scanning directory outline");

        let mut groups = fanout::bounded(
            &self.scan_limit,
            "directory outline",
            files,
            |file_path: PathBuf| async move {
                let symbols = match self.symbol_index(&file_path).await? {
                    Some(index) => select(&index, None, false)
                        .into_iter()
                        .map(|(path, node)| SymbolItem::from_symbol(file_path.clone(), path, node))
                        .collect(),
                    None => Vec::new(),
                };
                Ok::<_, EngineError>(Some(FileGroup { file_path, symbols }))
            },
        )
        .await;
        groups.sort_by(|a, b| a.file_path.cmp(&b.file_path));

        let total_symbols = groups.iter().map(|group| group.symbols.len()).sum();
        Ok(DirectoryOutline {
            path: req.path.clone(),
            total_files: groups.len(),
            total_symbols,
            files: groups,
            has_subdirs,
        })
    }
}

/// The `(path, node)` pairs an outline lists.
///
/// A scope is resolved the same way a locate resolves it, so among
/// duplicate siblings only the first is listed.
fn select<'a>(
    index: &'a SymbolIndex,
    scope: Option<&SymbolPath>,
    recursive: bool,
) -> Vec<(SymbolPath, &'a DocumentSymbol)> {
    let Some(scope) = scope else {
        if index.is_flat() {
            // No child edges: decide by the synthesized paths alone.
            return index
                .traverse()
                .filter(|(path, _)| recursive || path.len() == 1)
                .collect();
        }
        let root = SymbolPath::new();
        return if recursive {
            filtered(index.roots(), &root)
        } else {
            top_level(index.roots(), &root)
        };
    };

    let Some(node) = index.resolve(scope) else {
        return Vec::new();
    };

    if index.is_flat() {
        if !recursive {
            return vec![(scope.clone(), node)];
        }
        return index
            .traverse()
            .filter(|(path, candidate)| {
                std::ptr::eq(*candidate, node)
                    || (path.len() > scope.len()
                        && path.starts_with(&scope[..])
                        && range_contains(&node.range, candidate.range.start))
            })
            .collect();
    }

    let parent = scope.parent();
    let nodes = std::slice::from_ref(node);
    if recursive {
        filtered(nodes, &parent)
    } else {
        top_level(nodes, &parent)
    }
}
