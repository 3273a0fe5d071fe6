use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::types::{ChatMessage, ModelClient};
use super::ProviderError;

/// Blocking client for an OpenAI-compatible `/chat/completions` endpoint.
///
/// The per-call timeout is applied on each request, so the vision and report
/// stages can use different limits with one connection pool.
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    client: reqwest::blocking::Client,
}

impl OpenAiClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, ProviderError> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| ProviderError::Http(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Request body for /chat/completions
#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

/// Response body from /chat/completions
#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ModelClient for OpenAiClient {
    fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        timeout: Duration,
    ) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatCompletionRequest { model, messages };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(timeout)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout {
                        secs: timeout.as_secs(),
                    }
                } else if e.is_connect() {
                    ProviderError::Connection(self.base_url.clone())
                } else {
                    ProviderError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = response.json().map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout {
                    secs: timeout.as_secs(),
                }
            } else {
                ProviderError::MalformedResponse(e.to_string())
            }
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(ProviderError::EmptyResponse)
    }
}

// ──────────────────────────────────────────────
// MockModelClient (testing)
// ──────────────────────────────────────────────

/// What the mock answers for one call.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    /// Answer with the text of the last message sent.
    Echo,
    Fail(ProviderError),
}

/// A call the mock received.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub timeout: Duration,
}

/// Mock model client for testing: scripted replies and call recording.
///
/// Replies queued with `then_*` are consumed in order; once the queue is
/// empty every call gets the default reply.
pub struct MockModelClient {
    queue: Mutex<VecDeque<MockReply>>,
    default_reply: MockReply,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockModelClient {
    pub fn new(default_response: &str) -> Self {
        Self::with_default(MockReply::Text(default_response.to_string()))
    }

    pub fn echo() -> Self {
        Self::with_default(MockReply::Echo)
    }

    pub fn failing(error: ProviderError) -> Self {
        Self::with_default(MockReply::Fail(error))
    }

    fn with_default(default_reply: MockReply) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            default_reply,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn then_text(self, text: &str) -> Self {
        self.then(MockReply::Text(text.to_string()))
    }

    pub fn then_fail(self, error: ProviderError) -> Self {
        self.then(MockReply::Fail(error))
    }

    pub fn then(self, reply: MockReply) -> Self {
        self.queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(reply);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

impl ModelClient for MockModelClient {
    fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        timeout: Duration,
    ) -> Result<String, ProviderError> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(RecordedCall {
                model: model.to_string(),
                messages: messages.to_vec(),
                timeout,
            });

        let reply = self
            .queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
            .unwrap_or_else(|| self.default_reply.clone());

        match reply {
            MockReply::Text(text) => Ok(text),
            MockReply::Echo => Ok(messages.last().map(ChatMessage::text).unwrap_or_default()),
            MockReply::Fail(error) => Err(error),
        }
    }
}
