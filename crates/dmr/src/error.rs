use dmr_buffers::BufferError;
use thiserror::Error;

use crate::model_type::ModelType;

/// Faults raised by the value model and its builders.
#[derive(Debug, Error)]
pub enum DmrError {
    #[error("cannot convert {from} to {to}")]
    InvalidCoercion { from: ModelType, to: &'static str },
    #[error("cannot parse {input:?} as {to}")]
    InvalidLiteral { input: String, to: &'static str },
    #[error("node is protected")]
    Protected,
    #[error("no child '{0}' exists")]
    NoSuchKey(String),
    #[error("no child exists at index [{0}]")]
    NoSuchIndex(usize),
    #[error("{kind} node cannot be indexed by {by}")]
    NotIndexable { kind: ModelType, by: &'static str },
    #[error("malformed address: {0}")]
    MalformedAddress(String),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl DmrError {
    pub(crate) fn coercion(from: ModelType, to: &'static str) -> Self {
        DmrError::InvalidCoercion { from, to }
    }

    pub(crate) fn literal(input: &str, to: &'static str) -> Self {
        DmrError::InvalidLiteral {
            input: input.to_owned(),
            to,
        }
    }

    /// `true` for unsupported conversions and for unparseable string literals.
    pub fn is_invalid_coercion(&self) -> bool {
        matches!(
            self,
            DmrError::InvalidCoercion { .. } | DmrError::InvalidLiteral { .. }
        )
    }
}

/// Faults raised while decoding binary, base64 or JSON payloads.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("dmr buffer: {0}")]
    Buffer(#[from] BufferError),
    #[error("unknown type tag: 0x{0:02x}")]
    UnknownTypeTag(u8),
    #[error("negative length: {0}")]
    NegativeLength(i32),
    #[error("nesting deeper than {0} levels")]
    TooDeep(usize),
    #[error("invalid big decimal: {0:?}")]
    InvalidDecimal(String),
    #[error("{0} trailing bytes after node")]
    TrailingBytes(usize),
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid {0} wrapper")]
    InvalidSentinel(&'static str),
}

impl From<BufferError> for DmrError {
    fn from(err: BufferError) -> Self {
        DmrError::Codec(CodecError::Buffer(err))
    }
}

pub type Result<T, E = DmrError> = std::result::Result<T, E>;
