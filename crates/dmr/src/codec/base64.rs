//! Base64 envelope around the binary format, as sent with
//! `Content-Type: application/dmr-encoded`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::debug;

use super::binary;
use crate::error::CodecError;
use crate::node::ModelNode;

pub fn encode(node: &ModelNode) -> Result<String, CodecError> {
    Ok(STANDARD.encode(binary::encode(node)?))
}

/// Decodes standard-alphabet base64 (padding required). ASCII whitespace,
/// including line breaks, is dropped first.
pub fn decode(encoded: &str) -> Result<ModelNode, CodecError> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    debug!(len = compact.len(), "decoding base64 dmr");
    let bytes = STANDARD.decode(compact.as_bytes())?;
    binary::decode(&bytes)
}
