//! Wire formats for [`ModelNode`](crate::ModelNode) trees.
//!
//! - [`binary`]: the tagged, big-endian format exchanged with the management
//!   endpoint (`application/dmr-encoded` before base64).
//! - [`base64`]: the standard-alphabet envelope around [`binary`].
//! - [`json`]: decoding of the JSON projection. Encoding lives on
//!   [`ModelValue::to_json_string`](crate::ModelValue::to_json_string).

pub mod base64;
pub mod binary;
pub mod json;

/// Deepest container nesting accepted by the decoders.
pub const MAX_DEPTH: usize = 128;
