/// Symbol index over a file's document symbols.
///
/// Language servers report symbols either as a hierarchical
/// `DocumentSymbol` tree (preferred) or as a flat `SymbolInformation`
/// list. [`SymbolIndex`] accepts both and answers three questions:
///
/// - [`SymbolIndex::resolve`]: which node does a [`SymbolPath`] name?
/// - [`SymbolIndex::narrowest`]: which is the deepest symbol enclosing a
///   position?
/// - [`SymbolIndex::traverse`]: every `(path, node)` pair in pre-order.
///
/// The flat form has no parent/child edges. Its nesting is approximated
/// from range containment: candidates are ordered by start ascending and
/// end descending, so an enclosing symbol always precedes what it holds.
/// An index is built fresh per query and never mutated.
mod path;

pub use path::SymbolPath;

use std::cmp::Reverse;

use tower_lsp::lsp_types::*;

use crate::capability::Capability;
use crate::error::Result;
use crate::{Engine, LanguageClient};

#[derive(Debug, Clone)]
pub enum SymbolIndex {
    Tree(Vec<DocumentSymbol>),
    /// Flat symbols in nesting order, with the path synthesized for each.
    Flat {
        nodes: Vec<DocumentSymbol>,
        paths: Vec<SymbolPath>,
    },
}

impl SymbolIndex {
    pub fn from_tree(roots: Vec<DocumentSymbol>) -> Self {
        SymbolIndex::Tree(roots)
    }

    /// Build the fallback index from a flat symbol list.
    pub fn from_information(symbols: Vec<SymbolInformation>) -> Self {
        let mut nodes: Vec<DocumentSymbol> = symbols.into_iter().map(flat_node).collect();
        nodes.sort_by_key(|node| nesting_key(&node.range));

        // Walk in nesting order keeping the chain of open ancestors.
        let mut paths = Vec::with_capacity(nodes.len());
        let mut open: Vec<(Range, SymbolPath)> = Vec::new();
        for node in &nodes {
            while let Some((range, _)) = open.last() {
                if range_encloses(range, &node.range) {
                    break;
                }
                open.pop();
            }
            let path = match open.last() {
                Some((_, parent)) => parent.child(&node.name),
                None => SymbolPath::from_iter([node.name.as_str()]),
            };
            open.push((node.range, path.clone()));
            paths.push(path);
        }

        SymbolIndex::Flat { nodes, paths }
    }

    pub fn is_flat(&self) -> bool {
        matches!(self, SymbolIndex::Flat { .. })
    }

    /// Top-level nodes. For the flat form this is every node.
    pub fn roots(&self) -> &[DocumentSymbol] {
        match self {
            SymbolIndex::Tree(roots) => roots,
            SymbolIndex::Flat { nodes, .. } => nodes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.roots().is_empty()
    }

    /// Follow `path` from the root, taking the first child with a matching
    /// name at every level.
    pub fn resolve(&self, path: &SymbolPath) -> Option<&DocumentSymbol> {
        if path.is_empty() {
            return None;
        }

        match self {
            SymbolIndex::Tree(roots) => {
                let mut level: &[DocumentSymbol] = roots;
                let mut target = None;
                for name in path.iter() {
                    let node = level.iter().find(|node| &node.name == name)?;
                    level = node.children.as_deref().unwrap_or_default();
                    target = Some(node);
                }
                target
            }
            SymbolIndex::Flat { nodes, paths } => paths
                .iter()
                .position(|candidate| candidate == path)
                .map(|idx| &nodes[idx]),
        }
    }

    /// The deepest symbol whose range contains `position`, with its path.
    pub fn narrowest(&self, position: Position) -> Option<(SymbolPath, &DocumentSymbol)> {
        match self {
            SymbolIndex::Tree(roots) => {
                let mut path = SymbolPath::new();
                let mut level: &[DocumentSymbol] = roots;
                let mut found = None;
                while let Some(node) = level
                    .iter()
                    .find(|node| range_contains(&node.range, position))
                {
                    path.push(node.name.clone());
                    found = Some(node);
                    level = node.children.as_deref().unwrap_or_default();
                }
                found.map(|node| (path, node))
            }
            SymbolIndex::Flat { nodes, .. } => {
                // `nodes` is already in nesting order, so the containing
                // candidates form the chain from outermost to innermost.
                let chain: Vec<&DocumentSymbol> = nodes
                    .iter()
                    .filter(|node| range_contains(&node.range, position))
                    .collect();
                let innermost = *chain.last()?;
                let path = chain.iter().map(|node| node.name.as_str()).collect();
                Some((path, innermost))
            }
        }
    }

    /// Depth-first pre-order walk yielding every node with its path.
    pub fn traverse(&self) -> Traverse<'_> {
        match self {
            SymbolIndex::Tree(roots) => Traverse::Tree {
                stack: vec![(SymbolPath::new(), roots.iter())],
            },
            SymbolIndex::Flat { nodes, paths } => Traverse::Flat {
                inner: paths.iter().zip(nodes.iter()),
            },
        }
    }
}

/// Iterator returned by [`SymbolIndex::traverse`].
pub enum Traverse<'a> {
    Tree {
        stack: Vec<(SymbolPath, std::slice::Iter<'a, DocumentSymbol>)>,
    },
    Flat {
        inner: std::iter::Zip<std::slice::Iter<'a, SymbolPath>, std::slice::Iter<'a, DocumentSymbol>>,
    },
}

impl<'a> Iterator for Traverse<'a> {
    type Item = (SymbolPath, &'a DocumentSymbol);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Traverse::Tree { stack } => loop {
                let (prefix, siblings) = stack.last_mut()?;
                let Some(node) = siblings.next() else {
                    stack.pop();
                    continue;
                };
                let path = prefix.child(&node.name);
                if let Some(children) = node.children.as_deref()
                    && !children.is_empty()
                {
                    stack.push((path.clone(), children.iter()));
                }
                return Some((path, node));
            },
            Traverse::Flat { inner } => inner.next().map(|(path, node)| (path.clone(), node)),
        }
    }
}

/// Top-level symbols under `prefix`, looking through `Module` nodes.
pub fn top_level<'a>(
    nodes: &'a [DocumentSymbol],
    prefix: &SymbolPath,
) -> Vec<(SymbolPath, &'a DocumentSymbol)> {
    let mut out = Vec::new();
    for node in nodes {
        let path = prefix.child(&node.name);
        if node.kind == SymbolKind::MODULE {
            if let Some(children) = node.children.as_deref() {
                out.extend(top_level(children, &path));
            }
        } else {
            out.push((path, node));
        }
    }
    out
}

/// Pre-order walk under `prefix` that lists callables but not their
/// bodies' locals.
pub fn filtered<'a>(
    nodes: &'a [DocumentSymbol],
    prefix: &SymbolPath,
) -> Vec<(SymbolPath, &'a DocumentSymbol)> {
    let mut out = Vec::new();
    collect_filtered(nodes, None, prefix, &mut out);
    out
}

fn collect_filtered<'a>(
    nodes: &'a [DocumentSymbol],
    parent_kind: Option<SymbolKind>,
    prefix: &SymbolPath,
    out: &mut Vec<(SymbolPath, &'a DocumentSymbol)>,
) {
    if parent_kind.is_some_and(is_callable) {
        return;
    }
    for node in nodes {
        let path = prefix.child(&node.name);
        out.push((path.clone(), node));
        if let Some(children) = node.children.as_deref() {
            collect_filtered(children, Some(node.kind), &path, out);
        }
    }
}

fn is_callable(kind: SymbolKind) -> bool {
    matches!(
        kind,
        SymbolKind::FUNCTION | SymbolKind::METHOD | SymbolKind::CONSTRUCTOR | SymbolKind::OPERATOR
    )
}

/// Half-open containment, comparing `(line, character)` lexicographically.
pub fn range_contains(range: &Range, position: Position) -> bool {
    let pos = (position.line, position.character);
    (range.start.line, range.start.character) <= pos && pos < (range.end.line, range.end.character)
}

fn range_encloses(outer: &Range, inner: &Range) -> bool {
    (outer.start.line, outer.start.character) <= (inner.start.line, inner.start.character)
        && (inner.end.line, inner.end.character) <= (outer.end.line, outer.end.character)
}

fn nesting_key(range: &Range) -> (u32, u32, Reverse<u32>, Reverse<u32>) {
    (
        range.start.line,
        range.start.character,
        Reverse(range.end.line),
        Reverse(range.end.character),
    )
}

#[allow(deprecated)]
fn flat_node(info: SymbolInformation) -> DocumentSymbol {
    DocumentSymbol {
        name: info.name,
        detail: None,
        kind: info.kind,
        tags: info.tags,
        deprecated: info.deprecated,
        range: info.location.range,
        selection_range: info.location.range,
        children: None,
    }
}

impl<C: LanguageClient> Engine<C> {
    /// Fetch the symbols of `file_path`, preferring the tree form and
    /// falling back to the flat list.
    ///
    /// Returns `None` when the server reports no symbols in either form.
    pub async fn symbol_index(&self, file_path: &std::path::Path) -> Result<Option<SymbolIndex>> {
        self.client
            .capabilities()
            .ensure(Capability::DocumentSymbol)?;

        if let Some(tree) = self.client.document_symbols(file_path).await?
            && !tree.is_empty()
        {
            return Ok(Some(SymbolIndex::from_tree(tree)));
        }

        if let Some(flat) = self.client.symbol_information(file_path).await?
            && !flat.is_empty()
        {
            tracing::debug!(file = %file_path.display(), "using flat symbol list");
            return Ok(Some(SymbolIndex::from_information(flat)));
        }

        Ok(None)
    }

    /// The path of the narrowest symbol enclosing `position`.
    pub async fn lookup_position(
        &self,
        file_path: &std::path::Path,
        position: Position,
    ) -> Result<Option<SymbolPath>> {
        let Some(index) = self.symbol_index(file_path).await? else {
            return Ok(None);
        };
        Ok(index.narrowest(position).map(|(path, _)| path))
    }
}
