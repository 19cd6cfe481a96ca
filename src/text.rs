/// Document text utilities.
///
/// This module converts between byte offsets into a document and LSP
/// positions, and reads the text covered by a range. Positions follow the
/// LSP default encoding: 0-based lines, characters counted in UTF-16 code
/// units. Byte offsets never leave this module's callers in the engine.
use tower_lsp::lsp_types::*;

/// Start offset of every line, built once per document read.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset where each line begins. Always non-empty.
    starts: Vec<usize>,
    /// Number of lines; a trailing newline does not open a new line.
    line_count: usize,
    len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut starts = Vec::with_capacity(text.len() / 32 + 1);
        starts.push(0);
        starts.extend(memchr::memchr_iter(b'\n', text.as_bytes()).map(|i| i + 1));

        let line_count = if text.is_empty() {
            0
        } else if text.ends_with('\n') {
            starts.len() - 1
        } else {
            starts.len()
        };

        Self {
            starts,
            line_count,
            len: text.len(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Byte offset of the start of `line`, or the document length past EOF.
    pub fn line_start(&self, line: usize) -> usize {
        if line < self.line_count {
            self.starts[line]
        } else {
            self.len
        }
    }

    /// Byte offset where `line` ends, including its newline.
    pub fn line_end(&self, line: usize) -> usize {
        self.line_start(line + 1)
    }

    /// The line containing `offset`.
    ///
    /// End of file after a trailing newline is the start of the line past
    /// the last one, so a match ending the document maps to `(line_count, 0)`.
    pub fn line_of(&self, offset: usize) -> usize {
        let offset = offset.min(self.len);
        self.starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1)
    }
}

/// The exact text covered by a range, with its absolute start offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet<'a> {
    pub text: &'a str,
    pub start: usize,
    pub range: Range,
}

/// Reads ranges out of one document and maps offsets to positions.
#[derive(Debug, Clone)]
pub struct DocumentReader<'a> {
    text: &'a str,
    index: LineIndex,
}

impl<'a> DocumentReader<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            index: LineIndex::new(text),
            text,
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn line_count(&self) -> usize {
        self.index.line_count()
    }

    /// A range spanning the whole document.
    pub fn full_range(&self) -> Range {
        Range {
            start: Position::new(0, 0),
            end: Position::new(self.line_count() as u32, 0),
        }
    }

    /// Map an absolute byte offset to a position.
    pub fn offset_to_position(&self, offset: usize) -> Position {
        let offset = offset.min(self.text.len());
        let line = self.index.line_of(offset);
        let start = self.index.line_start(line).min(offset);
        let character = utf16_len(&self.text[start..offset]);
        Position::new(line as u32, character as u32)
    }

    /// Map a position to an absolute byte offset.
    ///
    /// A character past the end of its line lands at the start of the next
    /// line; a line past the end of the document lands at EOF.
    pub fn position_to_offset(&self, position: Position) -> usize {
        let line = position.line as usize;
        if line >= self.line_count() {
            return self.text.len();
        }

        let start = self.index.line_start(line);
        let end = self.index.line_end(line);
        let mut units = 0usize;
        for (idx, ch) in self.text[start..end].char_indices() {
            if units >= position.character as usize {
                return start + idx;
            }
            units += ch.len_utf16();
        }
        end
    }

    /// Read the exact text inside `range`.
    ///
    /// Returns `None` for an empty document or a range starting past the
    /// last line.
    pub fn read(&self, range: Range) -> Option<Snippet<'a>> {
        if self.line_count() == 0 || range.start.line as usize >= self.line_count() {
            return None;
        }

        let start = self.position_to_offset(range.start);
        let end = self.position_to_offset(range.end).max(start);

        Some(Snippet {
            text: &self.text[start..end],
            start,
            range,
        })
    }

    /// Full lines `start..=end` (0-based, clamped), with common indentation
    /// removed.
    pub fn lines(&self, start: usize, end: usize) -> String {
        if start >= self.line_count() {
            return String::new();
        }
        let end = end.min(self.line_count() - 1);
        let from = self.index.line_start(start);
        let to = self.index.line_end(end);
        dedent(&self.text[from..to])
    }
}

fn utf16_len(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}

/// Remove the whitespace prefix shared by every non-blank line.
pub fn dedent(text: &str) -> String {
    let indent = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| &line[..line.len() - line.trim_start().len()])
        .reduce(|common, current| {
            let shared = common
                .char_indices()
                .zip(current.chars())
                .take_while(|((_, a), b)| a == b)
                .last()
                .map(|((idx, ch), _)| idx + ch.len_utf8())
                .unwrap_or(0);
            &common[..shared]
        })
        .unwrap_or("");

    if indent.is_empty() {
        return text.to_string();
    }

    text.split_inclusive('\n')
        .map(|line| line.strip_prefix(indent).unwrap_or_else(|| line.trim_start_matches([' ', '\t'])))
        .collect()
}
