//! WebSocket client for the realtime vision service.
//!
//! [`OvershootAnalyzer`] opens one session per clip, streams the clip and
//! collects results for a fixed window before closing the session.

use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, Stream, StreamExt};
use tokio::time::Instant;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{header, HeaderValue};
use tokio_tungstenite::tungstenite::Message;

use crate::messages::{parse_message, ClientMessage, ServerMessage, SourceInfo};
use crate::verdict::StyleVerdict;

/// Default realtime service endpoint.
pub const DEFAULT_API_URL: &str = "wss://cluster1.overshoot.ai/api/v0.2";

/// Default time to collect results after the clip was sent.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(5);

/// Binary frame size used when streaming a clip.
const CHUNK_SIZE: usize = 64 * 1024;

/// An uploaded video clip.
#[derive(Debug, Clone)]
pub struct VideoClip {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub file_name: String,
}

/// Errors from a style analysis session.
#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    /// Failed to establish the WebSocket session.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A protocol-level error on an established session.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The service reported an error frame.
    #[error("Vision service error: {0}")]
    Provider(String),
}

/// Analyses the style of the person in a video clip.
#[async_trait]
pub trait StyleAnalyzer: Send + Sync {
    async fn analyze(&self, clip: VideoClip) -> Result<StyleVerdict, VisionError>;
}

/// Realtime vision client configuration.
pub struct OvershootAnalyzer {
    api_url: String,
    api_key: String,
    instruction: String,
    window: Duration,
}

impl OvershootAnalyzer {
    /// * `api_url` - WebSocket base URL, e.g. [`DEFAULT_API_URL`].
    pub fn new(api_url: String, api_key: String, window: Duration) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
            instruction: silhouette_core::prompt::style_analysis_instruction(),
            window,
        }
    }

    pub fn stream_url(&self) -> String {
        format!("{}/stream", self.api_url)
    }
}

#[async_trait]
impl StyleAnalyzer for OvershootAnalyzer {
    async fn analyze(&self, clip: VideoClip) -> Result<StyleVerdict, VisionError> {
        let url = self.stream_url();
        let mut request = url
            .as_str()
            .into_client_request()
            .map_err(|e| VisionError::Connection(format!("Invalid vision URL {url}: {e}")))?;
        let auth = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|e| VisionError::Connection(format!("Invalid API key: {e}")))?;
        request.headers_mut().insert(header::AUTHORIZATION, auth);

        let (mut ws, _response) = connect_async(request).await.map_err(|e| {
            VisionError::Connection(format!("Failed to connect to {}: {e}", self.api_url))
        })?;
        tracing::info!(
            url = %url,
            bytes = clip.bytes.len(),
            mime_type = %clip.mime_type,
            "Vision session opened",
        );

        let config = ClientMessage::Config {
            prompt: &self.instruction,
            source: SourceInfo {
                kind: "video",
                mime_type: &clip.mime_type,
                file_name: &clip.file_name,
            },
        };
        send_json(&mut ws, &config).await?;
        for chunk in clip.bytes.chunks(CHUNK_SIZE) {
            ws.send(Message::Binary(chunk.to_vec()))
                .await
                .map_err(|e| VisionError::Protocol(e.to_string()))?;
        }
        send_json(&mut ws, &ClientMessage::End).await?;

        let results = collect_results(&mut ws, self.window).await;

        if let Err(e) = ws.close(None).await {
            tracing::debug!(error = %e, "Vision session close failed");
        }

        let results = results?;
        tracing::info!(count = results.len(), "Vision session finished");
        Ok(results
            .into_iter()
            .last()
            .map(StyleVerdict::from_text)
            .unwrap_or_else(StyleVerdict::empty))
    }
}

async fn send_json<S>(ws: &mut S, frame: &ClientMessage<'_>) -> Result<(), VisionError>
where
    S: futures::Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
{
    let text = serde_json::to_string(frame).map_err(|e| VisionError::Protocol(e.to_string()))?;
    ws.send(Message::Text(text))
        .await
        .map_err(|e| VisionError::Protocol(e.to_string()))
}

/// Gather `result` payloads from `stream` until `window` elapses or the
/// session closes, in arrival order.
///
/// An `error` frame aborts collection. Unparseable text frames are logged
/// and skipped.
pub async fn collect_results<S>(stream: &mut S, window: Duration) -> Result<Vec<String>, VisionError>
where
    S: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    let deadline = Instant::now() + window;
    let mut results = Vec::new();

    loop {
        let next = match tokio::time::timeout_at(deadline, stream.next()).await {
            Ok(next) => next,
            Err(_elapsed) => break,
        };
        match next {
            None => break,
            Some(Ok(Message::Text(text))) => match parse_message(&text) {
                Ok(ServerMessage::Result { result }) => {
                    tracing::debug!(index = results.len(), "Vision result received");
                    results.push(ServerMessage::result_text(&result));
                }
                Ok(ServerMessage::Error { message }) => {
                    tracing::warn!(error = %message, "Vision service reported an error");
                    return Err(VisionError::Provider(message));
                }
                Ok(ServerMessage::Ready) => {
                    tracing::debug!("Vision session ready");
                }
                Err(e) => {
                    tracing::warn!(error = %e, raw_message = %text, "Failed to parse vision message");
                }
            },
            Some(Ok(Message::Close(frame))) => {
                tracing::info!(?frame, "Vision session closed by server");
                break;
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => return Err(VisionError::Protocol(e.to_string())),
        }
    }

    Ok(results)
}
