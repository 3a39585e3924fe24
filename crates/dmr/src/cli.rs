//! Core logic of the `dmr-encode` and `dmr-decode` binaries.
//!
//! - `dmr-encode`: JSON (stdin) → base64 or raw binary DMR (stdout)
//! - `dmr-decode`: base64 or raw binary DMR (stdin) → DMR text or JSON

use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::codec;
use crate::error::CodecError;
use crate::value::FormatOptions;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("Unknown format: {0}")]
    UnknownFormat(String),
}

// ── dmr-encode ────────────────────────────────────────────────────────────

/// Encodes JSON text as `"base64"` (the `application/dmr-encoded` body) or
/// `"binary"`.
pub fn pack(json: &str, format: &str) -> Result<Vec<u8>, CliError> {
    let node = codec::json::decode_str(json)?;
    match format.to_lowercase().as_str() {
        "base64" => Ok(codec::base64::encode(&node)?.into_bytes()),
        "binary" | "bin" => Ok(codec::binary::encode(&node)?),
        other => Err(CliError::UnknownFormat(other.to_string())),
    }
}

// ── dmr-decode ────────────────────────────────────────────────────────────

/// Decodes raw binary DMR, falling back to base64 when the bytes are not a
/// single well-formed node, and renders it as `"dmr"` text or `"json"`.
pub fn unpack(bytes: &[u8], format: &str, compact: bool) -> Result<String, CliError> {
    let node = match codec::binary::decode(bytes) {
        Ok(node) => node,
        Err(err) => {
            debug!(error = %err, "input is not raw dmr, trying base64");
            codec::base64::decode(&String::from_utf8_lossy(bytes))?
        }
    };
    match format.to_lowercase().as_str() {
        "dmr" => {
            let options = if compact {
                FormatOptions::single_line()
            } else {
                FormatOptions::multi_line()
            };
            Ok(node.format(&options))
        }
        "json" => Ok(node.to_json_string(compact)),
        other => Err(CliError::UnknownFormat(other.to_string())),
    }
}

/// Installs a stderr log subscriber filtered by `RUST_LOG` (default `warn`).
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_base64() {
        assert_eq!(pack("1", "base64").unwrap(), b"SQAAAAE=");
        assert_eq!(pack("null", "BASE64").unwrap(), b"dQ==");
    }

    #[test]
    fn pack_binary() {
        assert_eq!(pack("true", "binary").unwrap(), [b'Z', 1]);
    }

    #[test]
    fn unknown_formats() {
        assert!(matches!(pack("1", "cbor"), Err(CliError::UnknownFormat(f)) if f == "cbor"));
        assert!(matches!(unpack(b"u", "xml", false), Err(CliError::UnknownFormat(_))));
    }

    #[test]
    fn unpack_accepts_both_envelopes() {
        let json = r#"{"a":[1,{"BYTES_VALUE":"AAE="}]}"#;
        let raw = pack(json, "binary").unwrap();
        let b64 = pack(json, "base64").unwrap();
        assert_eq!(unpack(&raw, "json", true).unwrap(), json);
        assert_eq!(unpack(&b64, "json", true).unwrap(), json);
    }

    #[test]
    fn unpack_dmr_text() {
        let raw = pack(r#"{"a":1}"#, "binary").unwrap();
        assert_eq!(unpack(&raw, "dmr", true).unwrap(), "{\"a\" => 1}");
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(matches!(unpack(b"%%%", "dmr", false), Err(CliError::Codec(_))));
        assert!(pack("{", "base64").is_err());
    }
}
