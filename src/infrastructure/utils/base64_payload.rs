use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::errors::ImageError;

/// Drops a `data:<mime>;base64,` style prefix: everything up to and
/// including the first comma, when there is one.
pub fn strip_data_prefix(payload: &str) -> &str {
    match payload.find(',') {
        Some(idx) => &payload[idx + 1..],
        None => payload,
    }
}

/// Decodes a base64 image payload, with or without a data-URL prefix.
/// ASCII whitespace (line breaks in pasted payloads) is ignored.
pub fn decode_payload(payload: &str) -> Result<Vec<u8>, ImageError> {
    let cleaned: String = strip_data_prefix(payload)
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    if cleaned.is_empty() {
        return Err(ImageError::InvalidBase64("payload is empty".into()));
    }

    Ok(STANDARD.decode(cleaned)?)
}
