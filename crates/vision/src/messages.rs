//! Realtime vision session frames.
//!
//! The session speaks JSON text frames tagged by `"type"`. The client sends
//! one `config` frame, streams the clip as binary frames and then an `end`
//! frame; the server answers with `ready`, `result` and `error` frames.

use serde::{Deserialize, Serialize};

/// Frames sent by the server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The session accepted its configuration.
    Ready,

    /// One inference result for a window of frames.
    Result { result: serde_json::Value },

    Error { message: String },
}

impl ServerMessage {
    /// Text of a `result` payload. String results are returned verbatim,
    /// structured results as compact JSON.
    pub fn result_text(result: &serde_json::Value) -> String {
        match result {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Frames sent by the client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage<'a> {
    Config {
        prompt: &'a str,
        source: SourceInfo<'a>,
    },
    /// No more media will follow.
    End,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInfo<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub mime_type: &'a str,
    pub file_name: &'a str,
}

/// Parse a server text frame.
///
/// Returns `Err` for malformed JSON or unknown `type` values.
pub fn parse_message(text: &str) -> Result<ServerMessage, serde_json::Error> {
    serde_json::from_str(text)
}
