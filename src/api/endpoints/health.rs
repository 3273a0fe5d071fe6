use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;
use crate::pipeline::evaluation::messages::LIVENESS;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub output_mode: String,
}

/// `GET /`: plain liveness string.
pub async fn liveness() -> &'static str {
    LIVENESS
}

/// `GET /health`: JSON status for probes.
pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        output_mode: ctx.config.output_mode.to_string(),
    })
}
