//! Chat-completions client for the filter extraction oracle
//!
//! Speaks the OpenAI-compatible `/chat/completions` protocol (Groq by
//! default). The response text is returned untouched; recovering JSON from it
//! is the caller's job.

use std::time::Duration;

use druglabel_core::FilterError;
use serde::{Deserialize, Serialize};

/// Client for an OpenAI-compatible chat completions endpoint
#[derive(Clone)]
pub struct OracleClient {
    http: reqwest::Client,
    api_key: String,
    api_url: String,
    model: String,
}

/// A message in the request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request body for the completions API
#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
}

/// Response from the completions API
#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Oracle answer that arrived with HTTP 200
#[derive(Debug, Clone)]
pub struct Completion {
    pub status: u16,
    /// Raw response body, not yet trusted to be a completions envelope
    pub body: String,
}

impl Completion {
    /// First choice's content; empty when the oracle sent none.
    ///
    /// A body that is not a completions envelope is `MalformedJson`.
    pub fn content(&self) -> Result<String, FilterError> {
        let envelope: ApiResponse =
            serde_json::from_str(&self.body).map_err(|e| FilterError::MalformedJson {
                reason: format!("completion envelope: {e}"),
            })?;

        Ok(envelope
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .unwrap_or_default())
    }
}

impl OracleClient {
    /// Create a client whose requests give up after `timeout`
    pub fn new(
        api_key: String,
        api_url: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_key,
            api_url,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one completion request.
    ///
    /// Anything but 200 becomes `OracleUnavailable` carrying the status; an
    /// expired timeout becomes `OracleTimeout`. Nothing is retried.
    pub async fn complete(&self, messages: &[Message]) -> Result<Completion, FilterError> {
        let request = ApiRequest {
            model: &self.model,
            messages,
        };

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), body = %body, "Oracle API error");
            return Err(FilterError::OracleUnavailable {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(transport_error)?;

        Ok(Completion {
            status: status.as_u16(),
            body,
        })
    }
}

fn transport_error(err: reqwest::Error) -> FilterError {
    if err.is_timeout() {
        FilterError::OracleTimeout
    } else {
        FilterError::OracleRequest(format!("HTTP request failed: {err}"))
    }
}
