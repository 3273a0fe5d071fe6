pub mod markup;
pub mod pdf;
pub mod store;

pub use store::*;

use std::sync::Arc;
use std::time::Instant;

use crate::pipeline::evaluation::prompt::REPORT_TITLE;
use crate::pipeline::evaluation::{EvaluationError, EvaluationReport, ReportDocument};

const DOCUMENT_FOOTER: &str = "This report is informational only and is not medical advice. \
Consult a qualified healthcare professional before changing your diet or exercise routine.";

/// Turns a report body into a stored PDF document.
pub struct DocumentRenderer {
    store: Arc<DocumentStore>,
}

impl DocumentRenderer {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    pub fn render(&self, report: &EvaluationReport) -> Result<ReportDocument, EvaluationError> {
        let _span = tracing::info_span!("render_document", degraded = report.degraded).entered();
        let start = Instant::now();

        let footer = format!(
            "Generated {}. {DOCUMENT_FOOTER}",
            report.generated_at.format("%Y-%m-%d %H:%M UTC")
        );
        let bytes = pdf::render_report_pdf(REPORT_TITLE, &report.body, &footer)
            .map_err(EvaluationError::Render)?;

        let document = self
            .store
            .persist(&bytes)
            .map_err(|e| EvaluationError::Render(e.to_string()))?;

        tracing::info!(
            filename = %document.filename,
            elapsed_ms = %start.elapsed().as_millis(),
            "Report document rendered"
        );
        Ok(document)
    }
}
