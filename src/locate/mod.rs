/// Locate resolution: turning a loose [`Locate`] into an exact position.
///
/// Resolution runs in two stages:
///
/// 1. **Scope** — narrow the document to the whole file, a line range, or
///    the full range of a symbol found through the [`SymbolIndex`].
/// 2. **Find** — search the scoped text with a whitespace-tolerant
///    pattern ([`pattern`]). A marker ([`marker`]) inside the pattern pins
///    the exact offset; without one the single match's start is the answer.
///
/// Several unmarked matches are a usage fault
/// ([`EngineError::AmbiguousMatch`]); the resolver never picks one on the
/// caller's behalf. A query that finds nothing returns `Ok(None)`.
///
/// - [`marker`]: nested-bracket marker detection and escalation.
/// - [`pattern`]: whitespace-tolerant regex compilation.
/// - [`parse`]: the compact `file:scope@find` string form.
///
/// [`SymbolIndex`]: crate::symbols::SymbolIndex
pub mod marker;
pub mod parse;
pub mod pattern;

pub use marker::{Marker, check_marker, detect_marker};
pub use parse::parse_locate;
pub use pattern::to_regex;

use regex::{Match, Regex};
use tower_lsp::lsp_types::*;

use crate::error::{EngineError, Result};
use crate::text::DocumentReader;
use crate::types::{Locate, LocateRangeResponse, LocateResponse, Scope};
use crate::{Engine, LanguageClient};

/// The region a find pattern is searched in.
struct ScopeInfo {
    range: Range,
    /// Start of the symbol's name when scoped by symbol.
    declaration: Option<Position>,
}

impl<C: LanguageClient> Engine<C> {
    /// Resolve `locate` to a single position.
    pub async fn locate(&self, locate: &Locate) -> Result<Option<LocateResponse>> {
        locate.validate()?;

        // Marker faults are independent of the document, report them first.
        let marker = match locate.find_pattern() {
            Some(find) => check_marker(find, self.config.max_marker_depth)?,
            None => None,
        };

        let document = self.client.read_file(&locate.file_path).await?;
        let reader = DocumentReader::new(&document);

        let Some(scope) = self.scope_info(locate, &reader).await? else {
            return Ok(None);
        };
        let Some(snippet) = reader.read(scope.range) else {
            tracing::debug!(file = %locate.file_path.display(), "scope lies outside the document");
            return Ok(None);
        };

        let position = match (locate.find_pattern(), &locate.scope) {
            (Some(find), _) => {
                let Some(offset) = find_offset(find, marker.as_ref(), snippet.text)? else {
                    tracing::debug!(file = %locate.file_path.display(), find, "no match in scope");
                    return Ok(None);
                };
                reader.offset_to_position(snippet.start + offset)
            }
            (None, Some(Scope::Symbol(_))) => match scope.declaration {
                Some(position) => position,
                None => return Ok(None),
            },
            (None, Some(Scope::Line(_))) => {
                let offset = snippet
                    .text
                    .find(|c: char| !c.is_whitespace())
                    .unwrap_or(0);
                reader.offset_to_position(snippet.start + offset)
            }
            (None, None) => return Err(EngineError::MissingLocator),
        };

        Ok(Some(LocateResponse {
            file_path: locate.file_path.clone(),
            position,
        }))
    }

    /// Resolve `locate` to a range: the matched span, or the whole scope
    /// when there is no find pattern.
    ///
    /// The find pattern is matched as plain text here; markers have no
    /// special meaning for ranges.
    pub async fn locate_range(&self, locate: &Locate) -> Result<Option<LocateRangeResponse>> {
        locate.validate()?;

        let document = self.client.read_file(&locate.file_path).await?;
        let reader = DocumentReader::new(&document);

        let Some(scope) = self.scope_info(locate, &reader).await? else {
            return Ok(None);
        };

        let range = match locate.find_pattern() {
            None => scope.range,
            Some(find) => {
                let Some(snippet) = reader.read(scope.range) else {
                    return Ok(None);
                };
                let re = Regex::new(&to_regex(find))?;
                let Some(found) = single_match(&re, snippet.text, find)? else {
                    return Ok(None);
                };
                Range {
                    start: reader.offset_to_position(snippet.start + found.start()),
                    end: reader.offset_to_position(snippet.start + found.end()),
                }
            }
        };

        Ok(Some(LocateRangeResponse {
            file_path: locate.file_path.clone(),
            range,
        }))
    }

    async fn scope_info(
        &self,
        locate: &Locate,
        reader: &DocumentReader<'_>,
    ) -> Result<Option<ScopeInfo>> {
        match &locate.scope {
            None => Ok(Some(ScopeInfo {
                range: reader.full_range(),
                declaration: None,
            })),
            Some(Scope::Line(lines)) => Ok(Some(ScopeInfo {
                range: lines.to_range(reader.line_count()),
                declaration: None,
            })),
            Some(Scope::Symbol(symbol)) => {
                let Some(index) = self.symbol_index(&locate.file_path).await? else {
                    return Ok(None);
                };
                match index.resolve(&symbol.symbol_path) {
                    Some(node) => Ok(Some(ScopeInfo {
                        range: node.range,
                        declaration: Some(node.selection_range.start),
                    })),
                    None => {
                        tracing::debug!(
                            file = %locate.file_path.display(),
                            path = %symbol.symbol_path,
                            "symbol not found"
                        );
                        Ok(None)
                    }
                }
            }
        }
    }
}

/// Byte offset of the answer inside `haystack`.
fn find_offset(find: &str, marker: Option<&Marker>, haystack: &str) -> Result<Option<usize>> {
    let Some(marker) = marker else {
        let re = Regex::new(&to_regex(find))?;
        return Ok(single_match(&re, haystack, find)?.map(|m| m.start()));
    };

    let (before, after) = marker.split(find);
    let (before, after) = (to_regex(before), to_regex(after));
    if before.is_empty() && after.is_empty() {
        return Ok(Some(0));
    }

    // A unique marker pins one offset, so the first match is the answer.
    let re = Regex::new(&format!(r"({before})\s*({after})"))?;
    Ok(re
        .captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|group| group.end()))
}

/// The only match of `re`, or an ambiguity fault when there are several.
fn single_match<'h>(re: &Regex, haystack: &'h str, find: &str) -> Result<Option<Match<'h>>> {
    let mut matches = re.find_iter(haystack);
    let Some(first) = matches.next() else {
        return Ok(None);
    };

    let others = matches.count();
    if others > 0 {
        return Err(EngineError::AmbiguousMatch {
            count: others + 1,
            find: find.to_string(),
        });
    }
    Ok(Some(first))
}
