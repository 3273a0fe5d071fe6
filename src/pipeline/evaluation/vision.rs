//! Visual description step.
//!
//! One call with the primary instruction; if the answer reads as a refusal,
//! exactly one more call with the softer fallback instruction and the same
//! image. The second answer is returned whatever it says.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use url::Url;

use super::prompt::{VISION_FALLBACK_PROMPT, VISION_PRIMARY_PROMPT};
use super::types::{ChatMessage, ContentPart, ModelClient, RefusalClassifier, VisualSummary};
use super::{EvaluationError, ProviderStage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisionAttempt {
    Primary,
    Fallback,
}

impl fmt::Display for VisionAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

pub struct VisionDescriber {
    client: Arc<dyn ModelClient>,
    classifier: Arc<dyn RefusalClassifier>,
    model: String,
    timeout: Duration,
}

impl VisionDescriber {
    pub fn new(
        client: Arc<dyn ModelClient>,
        classifier: Arc<dyn RefusalClassifier>,
        model: String,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            classifier,
            model,
            timeout,
        }
    }

    /// Describe the subject of `image_url`.
    ///
    /// A provider failure on either attempt is a `Vision` stage error.
    pub fn describe(&self, image_url: &Url) -> Result<VisualSummary, EvaluationError> {
        let _span = tracing::info_span!(
            "vision_describe",
            model = %self.model,
            timeout_secs = self.timeout.as_secs(),
        )
        .entered();

        let first = self.attempt(VisionAttempt::Primary, image_url)?;
        if !self.classifier.is_refusal(&first) {
            return Ok(VisualSummary {
                text: first,
                was_refused: false,
            });
        }

        tracing::warn!("Vision model refused the primary prompt, retrying with fallback");

        let second = self.attempt(VisionAttempt::Fallback, image_url)?;
        let was_refused = self.classifier.is_refusal(&second);
        if was_refused {
            tracing::warn!("Vision model refused the fallback prompt");
        }

        Ok(VisualSummary {
            text: second,
            was_refused,
        })
    }

    fn attempt(&self, attempt: VisionAttempt, image_url: &Url) -> Result<String, EvaluationError> {
        let instruction = match attempt {
            VisionAttempt::Primary => VISION_PRIMARY_PROMPT,
            VisionAttempt::Fallback => VISION_FALLBACK_PROMPT,
        };
        let messages = [ChatMessage::user(vec![
            ContentPart::text(instruction),
            ContentPart::image_url(image_url.as_str()),
        ])];

        let start = Instant::now();
        let text = self
            .client
            .chat(&self.model, &messages, self.timeout)
            .map_err(|source| {
                tracing::warn!(%attempt, error = %source, "Vision model call failed");
                EvaluationError::provider(ProviderStage::Vision, source)
            })?;

        tracing::info!(
            %attempt,
            elapsed_ms = %start.elapsed().as_millis(),
            text_len = text.len(),
            "Vision description received"
        );

        Ok(text.trim().to_string())
    }
}
