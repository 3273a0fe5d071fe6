use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;

use super::messages::REPORT_FALLBACK;
use super::prompt::build_report_prompt;
use super::types::{
    ChatMessage, ContentPart, EvaluationReport, ModelClient, UserMetrics, VisualSummary,
};

/// Second model call: visual summary + metrics → report body.
///
/// Provider failures are absorbed here; the caller always gets a report,
/// flagged `degraded` when it is the fixed fallback text.
pub struct ReportGenerator {
    client: Arc<dyn ModelClient>,
    model: String,
    timeout: Duration,
}

impl ReportGenerator {
    pub fn new(client: Arc<dyn ModelClient>, model: String, timeout: Duration) -> Self {
        Self {
            client,
            model,
            timeout,
        }
    }

    pub fn generate(&self, summary: &VisualSummary, metrics: &UserMetrics) -> EvaluationReport {
        let _span = tracing::info_span!(
            "report_generate",
            model = %self.model,
            timeout_secs = self.timeout.as_secs(),
            bmi_category = %metrics.bmi_category(),
        )
        .entered();

        let prompt = build_report_prompt(&summary.text, metrics);
        let messages = [ChatMessage::user(vec![ContentPart::text(prompt)])];

        let start = Instant::now();
        match self.client.chat(&self.model, &messages, self.timeout) {
            Ok(body) => {
                tracing::info!(
                    elapsed_ms = %start.elapsed().as_millis(),
                    body_len = body.len(),
                    "Report generated"
                );
                EvaluationReport {
                    body: body.trim().to_string(),
                    generated_at: Utc::now(),
                    degraded: false,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Report model call failed, using fallback report");
                EvaluationReport {
                    body: REPORT_FALLBACK.to_string(),
                    generated_at: Utc::now(),
                    degraded: true,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::evaluation::openai::MockModelClient;
    use crate::pipeline::evaluation::ProviderError;

    fn summary() -> VisualSummary {
        VisualSummary {
            text: "Upright posture, soft midsection.".into(),
            was_refused: false,
        }
    }

    fn metrics() -> UserMetrics {
        UserMetrics {
            age: Some(40),
            height_cm: Some(175),
            weight_kg: Some(85.0),
            bmi: Some(27.8),
            goal: None,
        }
    }

    #[test]
    fn returns_trimmed_model_output() {
        let mock = Arc::new(MockModelClient::new("\n  **Body Evaluation Report** ...  \n"));
        let generator = ReportGenerator::new(mock.clone(), "gpt-4o".into(), Duration::from_secs(15));
        let report = generator.generate(&summary(), &metrics());
        assert_eq!(report.body, "**Body Evaluation Report** ...");
        assert!(!report.degraded);
        assert_eq!(mock.call_count(), 1);
    }

    #[test]
    fn prompt_is_single_text_only_user_turn() {
        let mock = Arc::new(MockModelClient::new("ok"));
        let generator = ReportGenerator::new(mock.clone(), "gpt-4o".into(), Duration::from_secs(15));
        generator.generate(&summary(), &metrics());

        let calls = mock.calls();
        let call = &calls[0];
        assert_eq!(call.timeout, Duration::from_secs(15));
        assert_eq!(call.messages.len(), 1);
        assert!(call.messages[0]
            .content
            .iter()
            .all(|p| matches!(p, ContentPart::Text { .. })));
        assert!(call.messages[0].text().contains("Upright posture, soft midsection."));
    }

    #[test]
    fn provider_failure_yields_fallback() {
        let mock = Arc::new(MockModelClient::failing(ProviderError::Status {
            status: 429,
            body: "quota exceeded".into(),
        }));
        let generator = ReportGenerator::new(mock, "gpt-4o".into(), Duration::from_secs(15));
        let report = generator.generate(&summary(), &metrics());
        assert_eq!(report.body, REPORT_FALLBACK);
        assert!(report.degraded);
    }
}
