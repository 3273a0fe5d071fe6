use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Build the service router.
///
/// NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
pub fn build_router(ctx: ApiContext) -> Router {
    Router::new()
        .route("/", get(endpoints::health::liveness))
        .route("/health", get(endpoints::health::check))
        .route("/evaluate", post(endpoints::evaluate::evaluate))
        .route("/reports/:filename", get(endpoints::reports::fetch))
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use crate::config::{AppConfig, OutputMode};
    use crate::pipeline::evaluation::messages::{LIVENESS, REFUSAL_ADVISORY, VISION_UNAVAILABLE};
    use crate::pipeline::evaluation::prompt::{section_header, REPORT_SECTIONS};
    use crate::pipeline::evaluation::{MockModelClient, ProviderError};

    fn context(
        mock: Arc<MockModelClient>,
        mode: OutputMode,
        dir: &tempfile::TempDir,
    ) -> ApiContext {
        let mut config = AppConfig::new("sk-test");
        config.output_mode = mode;
        config.reports_dir = dir.path().to_path_buf();
        config.public_base_url = "http://localhost:5000/reports".into();
        ApiContext::new(config, mock)
    }

    fn evaluate_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/evaluate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn payload(text: &str) -> String {
        serde_json::json!({
            "messages": [{
                "content": [
                    {"type": "text", "text": text},
                    {"type": "image_url", "image_url": {"url": "https://example.com/photo.jpg"}}
                ]
            }]
        })
        .to_string()
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn liveness_returns_fixed_string() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(context(Arc::new(MockModelClient::echo()), OutputMode::Inline, &dir));
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, LIVENESS);
    }

    #[tokio::test]
    async fn health_reports_version() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(context(Arc::new(MockModelClient::echo()), OutputMode::Document, &dir));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], crate::config::APP_VERSION);
        assert_eq!(json["output_mode"], "document");
    }

    #[tokio::test]
    async fn missing_messages_is_400_without_model_calls() {
        let dir = tempfile::tempdir().unwrap();
        let mock = Arc::new(MockModelClient::echo());
        let app = build_router(context(mock.clone(), OutputMode::Inline, &dir));

        let response = app.oneshot(evaluate_request("{}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["error"], "Missing 'messages' in request body");
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn invalid_json_is_400() {
        let dir = tempfile::tempdir().unwrap();
        let mock = Arc::new(MockModelClient::echo());
        let app = build_router(context(mock.clone(), OutputMode::Inline, &dir));

        let response = app.oneshot(evaluate_request("not json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn inline_success_returns_report_text() {
        let dir = tempfile::tempdir().unwrap();
        let mock = Arc::new(MockModelClient::echo());
        let app = build_router(context(mock.clone(), OutputMode::Inline, &dir));

        let response = app
            .oneshot(evaluate_request(&payload("user is 34, 180 cm, weighs 90")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/plain"));
        let body = body_string(response).await;
        assert!(body.contains("**1. User Profile**"));
        assert!(body.contains("**9. Disclaimer**"));
        assert!(body.contains("- BMI: 27.8 (overweight)"));
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn end_to_end_report_has_all_sections_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mock = Arc::new(MockModelClient::echo());
        let app = build_router(context(mock.clone(), OutputMode::Inline, &dir));

        let response = app
            .oneshot(evaluate_request(&payload("user is 40, 175cm, weighs 85")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;

        let mut last = 0;
        for i in 0..REPORT_SECTIONS.len() {
            let header = section_header(i);
            let pos = body
                .find(&header)
                .unwrap_or_else(|| panic!("missing {header}"));
            assert!(pos >= last, "{header} out of order");
            last = pos;
        }
        assert!(body.contains("- Age: 40"));
        assert!(body.contains("- Height: 175 cm"));
        assert!(body.contains("- Weight: 85 kg"));
        assert!(body.contains("- BMI: 27.8 (overweight)"));
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn refusal_returns_advisory() {
        let dir = tempfile::tempdir().unwrap();
        let mock = Arc::new(MockModelClient::new("Sorry, I cannot analyze this image."));
        let app = build_router(context(mock.clone(), OutputMode::Inline, &dir));

        let response = app.oneshot(evaluate_request(&payload("hi"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, REFUSAL_ADVISORY);
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn vision_failure_returns_message() {
        let dir = tempfile::tempdir().unwrap();
        let mock = Arc::new(MockModelClient::failing(ProviderError::Timeout { secs: 12 }));
        let app = build_router(context(mock, OutputMode::Inline, &dir));

        let response = app.oneshot(evaluate_request(&payload("hi"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, VISION_UNAVAILABLE);
    }

    #[tokio::test]
    async fn document_mode_returns_fetchable_pdf_url() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(context(Arc::new(MockModelClient::echo()), OutputMode::Document, &dir));

        let response = app
            .clone()
            .oneshot(evaluate_request(&payload("age 40, 175 cm, 85 kg")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        let url = json["pdf_url"].as_str().unwrap();
        let path = url.strip_prefix("http://localhost:5000").unwrap();
        assert!(path.starts_with("/reports/report_"));

        let response = app
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        assert_eq!(&bytes[0..4], b"%PDF");
    }

    #[tokio::test]
    async fn unknown_report_is_404_and_bad_name_is_400() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(context(Arc::new(MockModelClient::echo()), OutputMode::Document, &dir));

        let missing = format!("/reports/report_{}.pdf", "a".repeat(32));
        let response = app
            .clone()
            .oneshot(Request::builder().uri(missing).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(Request::builder().uri("/reports/secrets.txt").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
