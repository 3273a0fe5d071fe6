//! End-to-end evaluation of one validated request.
//!
//! metrics → vision (with one refusal retry) → report → optional PDF.
//! Synchronous; callers on an async runtime run it on the blocking pool.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::config::{AppConfig, OutputMode};
use crate::pipeline::render::{DocumentRenderer, DocumentStore};

use super::metrics::extract_metrics;
use super::refusal::KeywordRefusalDetector;
use super::report::ReportGenerator;
use super::types::{
    EvaluationReport, EvaluationRequest, ModelClient, RefusalClassifier, ReportDocument,
    VisualSummary,
};
use super::vision::VisionDescriber;
use super::EvaluationError;

/// Pipeline stage, for progress logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Metrics,
    Vision,
    Report,
    Render,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metrics => write!(f, "metrics"),
            Self::Vision => write!(f, "vision"),
            Self::Report => write!(f, "report"),
            Self::Render => write!(f, "render"),
        }
    }
}

/// Terminal, non-error result of a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// Inline mode: the report body is the response.
    Report(EvaluationReport),
    /// Document mode: the report was rendered and stored.
    Document {
        report: EvaluationReport,
        document: ReportDocument,
    },
    /// The vision model declined both prompts; no report was generated.
    Refused { summary: VisualSummary },
}

pub struct EvaluationPipeline {
    vision: VisionDescriber,
    reporter: ReportGenerator,
    renderer: DocumentRenderer,
    output_mode: OutputMode,
}

impl EvaluationPipeline {
    pub fn new(
        vision: VisionDescriber,
        reporter: ReportGenerator,
        renderer: DocumentRenderer,
        output_mode: OutputMode,
    ) -> Self {
        Self {
            vision,
            reporter,
            renderer,
            output_mode,
        }
    }

    /// Wire the stages from configuration around a shared model client.
    pub fn from_config(
        config: &AppConfig,
        client: Arc<dyn ModelClient>,
        store: Arc<DocumentStore>,
    ) -> Self {
        let classifier: Arc<dyn RefusalClassifier> = Arc::new(KeywordRefusalDetector::default());
        Self::new(
            VisionDescriber::new(
                client.clone(),
                classifier,
                config.vision_model.clone(),
                config.vision_timeout,
            ),
            ReportGenerator::new(client, config.report_model.clone(), config.report_timeout),
            DocumentRenderer::new(store),
            config.output_mode,
        )
    }

    pub fn run(&self, request: &EvaluationRequest) -> Result<PipelineOutcome, EvaluationError> {
        let _span = tracing::info_span!("evaluation", output_mode = %self.output_mode).entered();
        let start = Instant::now();

        tracing::debug!(stage = %PipelineStage::Metrics, "Stage started");
        let metrics = extract_metrics(&request.user_text);
        tracing::info!(
            age = ?metrics.age,
            height_cm = ?metrics.height_cm,
            weight_kg = ?metrics.weight_kg,
            bmi = ?metrics.bmi,
            has_goal = metrics.goal.is_some(),
            "Metrics extracted"
        );

        tracing::debug!(stage = %PipelineStage::Vision, "Stage started");
        let summary = self.vision.describe(&request.image_url)?;
        if summary.was_refused {
            tracing::warn!(
                elapsed_ms = %start.elapsed().as_millis(),
                "Evaluation ended: image refused after fallback"
            );
            return Ok(PipelineOutcome::Refused { summary });
        }

        tracing::debug!(stage = %PipelineStage::Report, "Stage started");
        let report = self.reporter.generate(&summary, &metrics);

        let outcome = match self.output_mode {
            OutputMode::Inline => PipelineOutcome::Report(report),
            OutputMode::Document => {
                tracing::debug!(stage = %PipelineStage::Render, "Stage started");
                let document = self.renderer.render(&report)?;
                PipelineOutcome::Document { report, document }
            }
        };

        tracing::info!(
            elapsed_ms = %start.elapsed().as_millis(),
            "Evaluation complete"
        );
        Ok(outcome)
    }
}
