use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use super::ProviderError;

/// Validated inbound request. `user_text` is already truncated.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationRequest {
    pub user_text: String,
    pub image_url: Url,
}

/// Physical metrics recovered from the user's free text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserMetrics {
    pub age: Option<u32>,
    pub height_cm: Option<u32>,
    pub weight_kg: Option<f64>,
    /// `None` unless both height and weight were found.
    pub bmi: Option<f64>,
    pub goal: Option<String>,
}

impl UserMetrics {
    pub fn bmi_category(&self) -> BmiCategory {
        BmiCategory::from_bmi(self.bmi)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Unknown,
}

impl BmiCategory {
    pub fn from_bmi(bmi: Option<f64>) -> Self {
        match bmi {
            None => Self::Unknown,
            Some(v) if v < 18.5 => Self::Underweight,
            Some(v) if v < 25.0 => Self::Normal,
            Some(_) => Self::Overweight,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Underweight => "underweight",
            Self::Normal => "normal",
            Self::Overweight => "overweight",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Neutral description of the photographed subject.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualSummary {
    pub text: String,
    pub was_refused: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub body: String,
    pub generated_at: DateTime<Utc>,
    /// True when `body` is the fixed fallback text rather than model output.
    pub degraded: bool,
}

/// A rendered report persisted in the document store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportDocument {
    pub id: String,
    pub filename: String,
    pub storage_path: PathBuf,
    pub public_url: String,
}

// ──────────────────────────────────────────────
// Model wire types
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrlPart {
    pub url: String,
}

/// One block of a chat turn, in the chat-completions content-array shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrlPart },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn image_url(url: impl Into<String>) -> Self {
        Self::ImageUrl {
            image_url: ImageUrlPart { url: url.into() },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: Vec<ContentPart>,
}

impl ChatMessage {
    pub fn user(content: Vec<ContentPart>) -> Self {
        Self {
            role: ChatRole::User,
            content,
        }
    }

    /// Concatenated text blocks, ignoring images.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text { text } => Some(text.as_str()),
                ContentPart::ImageUrl { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Remote multimodal model abstraction (allows mocking).
///
/// Implementations block the calling thread until the model answers or the
/// timeout elapses; a timeout is reported as `ProviderError::Timeout`.
pub trait ModelClient: Send + Sync {
    fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        timeout: Duration,
    ) -> Result<String, ProviderError>;
}

/// Decides whether a model response declines the requested task.
pub trait RefusalClassifier: Send + Sync {
    fn is_refusal(&self, text: &str) -> bool;
}
