//! Errors from the generative media provider.

use serde::Deserialize;

/// Fallback quota message when the provider body carries none.
const DEFAULT_QUOTA_MESSAGE: &str = "Quota exceeded - Rate limit reached";

#[derive(Debug, thiserror::Error)]
pub enum GenAiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Provider API error ({status}): {body}")]
    Api {
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// A response body or payload could not be decoded.
    #[error("Malformed provider response: {0}")]
    Decode(String),

    #[error("No image generated in response")]
    NoImage,

    #[error("No video generated in response")]
    NoVideo,

    /// A video operation finished with an error.
    #[error("Video generation failed: {0}")]
    OperationFailed(String),
}

/// Parsed details of a provider rate-limit response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaDetails {
    /// First line of the provider message.
    pub message: String,
    /// e.g. `"27 seconds"`, from the `RetryInfo` detail.
    pub retry_after: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Vec<serde_json::Value>,
}

impl GenAiError {
    /// HTTP status reported by the provider, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Details of a 429 response; `None` for every other error.
    pub fn quota(&self) -> Option<QuotaDetails> {
        let Self::Api { status: 429, body } = self else {
            return None;
        };

        let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok();
        let message = envelope
            .as_ref()
            .and_then(|e| e.error.message.as_deref())
            .unwrap_or(if body.trim().is_empty() {
                DEFAULT_QUOTA_MESSAGE
            } else {
                body.as_str()
            });
        let retry_after = envelope.as_ref().and_then(|e| retry_delay(&e.error.details));

        Some(QuotaDetails {
            message: first_line(message),
            retry_after,
        })
    }

    /// Human-readable provider message: the `error.message` of a JSON body
    /// when present, else the error's display form.
    pub fn provider_message(&self) -> String {
        if let Self::Api { body, .. } = self {
            if let Some(message) = serde_json::from_str::<ErrorEnvelope>(body)
                .ok()
                .and_then(|e| e.error.message)
            {
                return message;
            }
        }
        self.to_string()
    }
}

/// `retryDelay` of the first `google.rpc.RetryInfo` detail, as `"<n> seconds"`.
fn retry_delay(details: &[serde_json::Value]) -> Option<String> {
    details
        .iter()
        .find(|d| {
            d.get("@type")
                .and_then(|t| t.as_str())
                .is_some_and(|t| t.contains("RetryInfo"))
        })
        .and_then(|d| d.get("retryDelay"))
        .and_then(|d| d.as_str())
        .map(|d| format!("{} seconds", d.strip_suffix('s').unwrap_or(d)))
}

fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or_default().to_string()
}
