//! Base64 transport encoding used by the contents API.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::EtlError;

/// Encodes UTF-8 text for a `PUT` payload.
pub fn encode_content(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

/// Decodes a `GET` payload into UTF-8 text.
///
/// The API wraps the payload at 60 columns, so ASCII whitespace is dropped
/// before decoding.
pub fn decode_content(encoded: &str) -> Result<String, EtlError> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|source| EtlError::ContentDecode {
            message: format!("invalid base64: {source}"),
        })?;

    String::from_utf8(bytes).map_err(|source| EtlError::ContentDecode {
        message: format!("content is not valid UTF-8: {source}"),
    })
}
