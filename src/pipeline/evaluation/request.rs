//! Inbound payload validation.
//!
//! The body is a chat-style envelope: `messages[0].content` is an array of
//! typed blocks. Only the first message is inspected. It must carry exactly
//! one `text` block and exactly one `image_url` block; other block types are
//! ignored.

use serde::Deserialize;
use url::Url;

use super::types::EvaluationRequest;
use super::ValidationError;

/// Longest user text kept before the ellipsis marker is appended.
pub const MAX_USER_TEXT_CHARS: usize = 500;

pub const TRUNCATION_MARKER: &str = "...";

#[derive(Debug, Deserialize)]
struct EvaluationPayload {
    #[serde(default)]
    messages: Option<Vec<PayloadMessage>>,
}

#[derive(Debug, Deserialize)]
struct PayloadMessage {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ImageUrlRef {
    url: String,
}

/// Closed set of block variants the handler understands.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    ImageUrl { image_url: ImageUrlRef },
    #[serde(other)]
    Unknown,
}

/// Parse and validate a raw request body.
pub fn parse_evaluation_request(body: &[u8]) -> Result<EvaluationRequest, ValidationError> {
    let payload: EvaluationPayload = serde_json::from_slice(body)
        .map_err(|e| ValidationError::MalformedBody(e.to_string()))?;

    let messages = payload.messages.ok_or(ValidationError::MissingMessages)?;
    let first = messages.into_iter().next().ok_or(ValidationError::EmptyMessages)?;

    let (text, image_url) = extract_blocks(first.content)?;

    let image_url = Url::parse(&image_url)
        .map_err(|e| ValidationError::InvalidImageUrl(format!("{image_url} ({e})")))?;

    Ok(EvaluationRequest {
        user_text: truncate_user_text(&text),
        image_url,
    })
}

/// First text and first image block; absent or repeated variants are errors.
fn extract_blocks(blocks: Vec<ContentBlock>) -> Result<(String, String), ValidationError> {
    let mut text: Option<String> = None;
    let mut image: Option<String> = None;

    for block in blocks {
        match block {
            ContentBlock::Text { text: t } => {
                if text.replace(t).is_some() {
                    return Err(ValidationError::DuplicateBlock("text"));
                }
            }
            ContentBlock::ImageUrl { image_url } => {
                if image.replace(image_url.url).is_some() {
                    return Err(ValidationError::DuplicateBlock("image_url"));
                }
            }
            ContentBlock::Unknown => {}
        }
    }

    let text = text.ok_or(ValidationError::MissingBlock("text"))?;
    let image = image.ok_or(ValidationError::MissingBlock("image_url"))?;
    Ok((text, image))
}

/// Cap user text at `MAX_USER_TEXT_CHARS` characters plus the marker.
pub fn truncate_user_text(text: &str) -> String {
    match text.char_indices().nth(MAX_USER_TEXT_CHARS) {
        Some((cut, _)) => format!("{}{TRUNCATION_MARKER}", &text[..cut]),
        None => text.to_string(),
    }
}
