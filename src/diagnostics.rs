/// File diagnostics from the pull model (`textDocument/diagnostic`).
///
/// Diagnostics at or above a minimum severity are kept in the order the
/// server reported them and paged through the engine's diagnostic cache.
/// A diagnostic without a severity counts as an error.
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::*;

use crate::capability::Capability;
use crate::error::Result;
use crate::pagination::{Page, PageRequest, paginate};
use crate::{Engine, LanguageClient};

/// Diagnostic severity, most severe first.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Severity {
    Error,
    Warning,
    Information,
    #[default]
    Hint,
}

impl Severity {
    pub fn from_lsp(severity: Option<DiagnosticSeverity>) -> Self {
        match severity {
            Some(DiagnosticSeverity::WARNING) => Severity::Warning,
            Some(DiagnosticSeverity::INFORMATION) => Severity::Information,
            Some(DiagnosticSeverity::HINT) => Severity::Hint,
            _ => Severity::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticsRequest {
    pub file_path: PathBuf,
    /// Least severe level reported; `Hint` reports everything.
    #[serde(default)]
    pub min_severity: Severity,
    #[serde(flatten)]
    pub page: PageRequest,
}

impl DiagnosticsRequest {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            min_severity: Severity::default(),
            page: PageRequest::default(),
        }
    }

    pub fn with_min_severity(mut self, min_severity: Severity) -> Self {
        self.min_severity = min_severity;
        self
    }

    pub fn with_page(mut self, page: PageRequest) -> Self {
        self.page = page;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticItem {
    pub range: Range,
    pub severity: Severity,
    pub message: String,
    pub source: Option<String>,
    pub code: Option<NumberOrString>,
}

impl<C: LanguageClient> Engine<C> {
    pub async fn diagnostics(&self, req: &DiagnosticsRequest) -> Result<Option<Page<DiagnosticItem>>> {
        self.client.capabilities().ensure(Capability::Diagnostic)?;
        paginate(&req.page, &self.diagnostic_cache, || self.collect_diagnostics(req)).await
    }

    async fn collect_diagnostics(&self, req: &DiagnosticsRequest) -> Result<Option<Vec<DiagnosticItem>>> {
        let Some(diagnostics) = self.client.diagnostics(&req.file_path).await? else {
            return Ok(None);
        };

        let reported = diagnostics.len();
        let items: Vec<DiagnosticItem> = diagnostics
            .into_iter()
            .filter_map(|diagnostic| {
                let severity = Severity::from_lsp(diagnostic.severity);
                (severity <= req.min_severity).then(|| DiagnosticItem {
                    range: diagnostic.range,
                    severity,
                    message: diagnostic.message,
                    source: diagnostic.source,
                    code: diagnostic.code,
                })
            })
            .collect();

        tracing::debug!(
            file = %req.file_path.display(),
            reported,
            kept = items.len(),
            min_severity = ?req.min_severity,
            "diagnostics"
        );
        Ok(Some(items))
    }
}
