/// Position markers embedded in find patterns.
///
/// A marker is drawn from the family `<|>`, `<<|>>`, `<<<|>>>`, … where the
/// depth is the number of angle brackets on each side. Depths are scanned
/// from shallowest to deepest and the first one whose marker occurs
/// exactly once is chosen. This lets a pattern quote source code that
/// itself contains `<|>` and still pin a position with `<<|>>`.
///
/// Occurrences are counted as plain, non-overlapping substrings, so `<|>`
/// is also counted inside `<<|>>`. A consequence: a pattern whose only
/// marker is `<<|>>` resolves to depth 1 and splits around the inner
/// `<|>`, leaving a stray `<` and `>` in the text to match. `<<|>>` is only
/// usable next to a literal `<|>`; a lone marker should be `<|>`.
use crate::error::{EngineError, Result};

/// Deepest marker scanned when no configuration says otherwise.
pub const DEFAULT_MAX_DEPTH: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub depth: usize,
    /// Byte offset of the marker inside the pattern.
    pub start: usize,
    pub end: usize,
}

impl Marker {
    pub fn token(&self) -> String {
        marker_token(self.depth)
    }

    /// The text before and after the marker.
    pub fn split<'a>(&self, find: &'a str) -> (&'a str, &'a str) {
        (&find[..self.start], &find[self.end..])
    }
}

/// The marker string at `depth`, e.g. `<<|>>` for depth 2.
pub fn marker_token(depth: usize) -> String {
    format!("{}|{}", "<".repeat(depth), ">".repeat(depth))
}

/// Find the shallowest marker that occurs exactly once in `find`.
pub fn detect_marker(find: &str, max_depth: usize) -> Option<Marker> {
    (1..=max_depth).find_map(|depth| {
        let token = marker_token(depth);
        let mut hits = find.match_indices(token.as_str());
        let (start, _) = hits.next()?;
        if hits.next().is_some() {
            return None;
        }
        Some(Marker {
            depth,
            start,
            end: start + token.len(),
        })
    })
}

/// Detect the marker and verify it is unambiguous.
///
/// `Ok(None)` means the pattern carries no usable marker and is matched
/// as plain text.
pub fn check_marker(find: &str, max_depth: usize) -> Result<Option<Marker>> {
    let Some(marker) = detect_marker(find, max_depth) else {
        return Ok(None);
    };

    let token = marker.token();
    let count = find.matches(token.as_str()).count();
    if count > 1 {
        return Err(EngineError::InvalidMarker {
            marker: token,
            count,
            suggestion: marker_token(marker.depth + 1),
        });
    }

    Ok(Some(marker))
}
