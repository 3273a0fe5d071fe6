//! `POST /evaluate`: photo + free text in, evaluation report out.

use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::pipeline::evaluation::messages::{REFUSAL_ADVISORY, VISION_UNAVAILABLE};
use crate::pipeline::evaluation::{
    parse_evaluation_request, EvaluationError, PipelineOutcome, ProviderStage,
};

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub pdf_url: String,
}

/// Validates on the async side so malformed requests never reach the
/// blocking pool, then runs the pipeline with `spawn_blocking`.
pub async fn evaluate(State(ctx): State<ApiContext>, body: Bytes) -> Result<Response, ApiError> {
    let request = parse_evaluation_request(&body).map_err(|e| {
        tracing::info!(error = %e, "Rejected evaluation request");
        ApiError::from(e)
    })?;

    tracing::info!(
        text_chars = request.user_text.chars().count(),
        image_host = request.image_url.host_str().unwrap_or(""),
        "Evaluation request accepted"
    );

    let pipeline = ctx.pipeline.clone();
    let result = tokio::task::spawn_blocking(move || pipeline.run(&request)).await?;

    match result {
        Ok(PipelineOutcome::Report(report)) => Ok(report.body.into_response()),
        Ok(PipelineOutcome::Document { document, .. }) => Ok(Json(DocumentResponse {
            pdf_url: document.public_url,
        })
        .into_response()),
        Ok(PipelineOutcome::Refused { .. }) => Ok(REFUSAL_ADVISORY.into_response()),
        Err(EvaluationError::Provider {
            stage: ProviderStage::Vision,
            source,
        }) => {
            tracing::warn!(error = %source, "Vision stage unavailable");
            Ok(VISION_UNAVAILABLE.into_response())
        }
        Err(e) => Err(e.into()),
    }
}
