//! `data:<mime>;base64,<payload>` encoding and decoding.

use base64::{engine::general_purpose, Engine as _};

use crate::error::CoreError;

/// Decoded payload of a data URL (or bare base64 string).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedData {
    /// MIME type from the header, when one was present.
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Decode a `data:` URL. A bare base64 string is accepted too.
pub fn decode(input: &str) -> Result<DecodedData, CoreError> {
    let input = input.trim();
    let (mime_type, payload) = match input.strip_prefix("data:") {
        Some(rest) => {
            let (header, payload) = rest
                .split_once(',')
                .ok_or_else(|| CoreError::Validation("Malformed data URL".into()))?;
            let mime = header.strip_suffix(";base64").ok_or_else(|| {
                CoreError::Validation("Only base64 data URLs are supported".into())
            })?;
            let mime = (!mime.is_empty()).then(|| mime.to_string());
            (mime, payload)
        }
        None => (None, input),
    };

    let bytes = general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| CoreError::Validation(format!("Invalid base64 payload: {e}")))?;

    Ok(DecodedData { mime_type, bytes })
}

/// Encode bytes as a `data:` URL.
pub fn encode(mime_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:{mime_type};base64,{}",
        general_purpose::STANDARD.encode(bytes)
    )
}

/// Wrap an already base64-encoded payload in a `data:` URL.
pub fn from_base64(mime_type: &str, payload: &str) -> String {
    format!("data:{mime_type};base64,{payload}")
}
