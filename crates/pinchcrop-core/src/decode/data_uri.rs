//! `data:` URI image sources.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::{decode_image, DecodeError, DecodedImage};

/// A parsed base64 `data:` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    /// Media type from the header, lowercased (may be empty).
    pub mime: String,
    /// Decoded payload.
    pub bytes: Vec<u8>,
}

/// Parse `data:<mime>[;params];base64,<payload>`.
///
/// Whitespace inside the payload is ignored.
pub fn parse_data_uri(uri: &str) -> Result<DataUri, DecodeError> {
    let trimmed = uri.trim();
    let rest = trimmed
        .get(..5)
        .filter(|scheme| scheme.eq_ignore_ascii_case("data:"))
        .map(|_| &trimmed[5..])
        .ok_or_else(|| DecodeError::NotDataUri(preview(trimmed)))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| DecodeError::NotDataUri(preview(trimmed)))?;

    let mut params = header.split(';');
    let mime = params.next().unwrap_or_default().trim().to_ascii_lowercase();
    if !params.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
        return Err(DecodeError::NotBase64Encoded);
    }

    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| DecodeError::InvalidBase64(e.to_string()))?;

    Ok(DataUri { mime, bytes })
}

/// Parse and decode a `data:` URI image source.
pub fn decode_data_uri(uri: &str) -> Result<DecodedImage, DecodeError> {
    let parsed = parse_data_uri(uri)?;
    decode_image(&parsed.bytes)
}

/// Build a `data:<mime>;base64,<payload>` URI.
pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Shortened source string for error messages.
fn preview(uri: &str) -> String {
    uri.chars().take(32).collect()
}
