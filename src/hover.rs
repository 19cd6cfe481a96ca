/// Hover text at a located position.
///
/// Servers return hover contents in several shapes (a markup block, a bare
/// string, a language-tagged code string, or a list of those). All of them
/// are flattened into one Markdown string and cleaned: some servers
/// HTML-escape their output or over-escape underscores in identifiers.
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::*;

use crate::capability::Capability;
use crate::error::Result;
use crate::types::Locate;
use crate::{Engine, LanguageClient};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoverRequest {
    pub locate: Locate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoverResponse {
    pub file_path: PathBuf,
    pub position: Position,
    /// Markdown.
    pub contents: String,
}

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]+);").expect("entity pattern is valid")
});

impl<C: LanguageClient> Engine<C> {
    /// Locate `req.locate` and return the server's hover text there.
    pub async fn hover(&self, req: &HoverRequest) -> Result<Option<HoverResponse>> {
        self.client.capabilities().ensure(Capability::Hover)?;

        let Some(located) = self.locate(&req.locate).await? else {
            return Ok(None);
        };
        let Some(contents) = self.hover_text(&located.file_path, located.position).await? else {
            return Ok(None);
        };

        Ok(Some(HoverResponse {
            file_path: located.file_path,
            position: located.position,
            contents,
        }))
    }

    /// Cleaned hover Markdown at `position`, `None` when the server has
    /// nothing or only whitespace.
    pub(crate) async fn hover_text(
        &self,
        file_path: &Path,
        position: Position,
    ) -> Result<Option<String>> {
        let Some(hover) = self.client.hover(file_path, position).await? else {
            return Ok(None);
        };
        let text = clean_hover_content(&hover_markdown(hover.contents));
        Ok((!text.trim().is_empty()).then_some(text))
    }
}

/// Flatten any hover payload into Markdown.
pub fn hover_markdown(contents: HoverContents) -> String {
    match contents {
        HoverContents::Markup(markup) => markup.value,
        HoverContents::Scalar(marked) => marked_string(marked),
        HoverContents::Array(items) => items
            .into_iter()
            .map(marked_string)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n"),
    }
}

fn marked_string(marked: MarkedString) -> String {
    match marked {
        MarkedString::String(s) => s,
        MarkedString::LanguageString(ls) => format!("```{}\n{}\n```", ls.language, ls.value),
    }
}

/// Unescape HTML entities and drop backslash escapes before underscores.
pub fn clean_hover_content(content: &str) -> String {
    unescape_html(content).replace("\\_", "_")
}

fn unescape_html(content: &str) -> Cow<'_, str> {
    ENTITY.replace_all(content, |caps: &Captures| {
        let body = &caps[1];
        let decoded = match body {
            "lt" => Some('<'),
            "gt" => Some('>'),
            "amp" => Some('&'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{a0}'),
            _ => numeric_entity(body),
        };
        match decoded {
            Some(ch) => ch.to_string(),
            None => caps[0].to_string(),
        }
    })
}

fn numeric_entity(body: &str) -> Option<char> {
    let digits = body.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse().ok()?,
    };
    char::from_u32(code)
}
