//! Byte cursors used by the DMR binary codec.
//!
//! [`Writer`] and [`Reader`] mirror the `java.io.DataOutput` / `DataInput`
//! contract that the management protocol was defined against: every integer
//! is big-endian and strings use the "modified UTF-8" encoding (see
//! [`utf`]).

mod reader;
pub mod utf;
mod writer;

pub use reader::Reader;
pub use writer::Writer;

use thiserror::Error;

/// Errors raised while reading or writing DMR byte streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BufferError {
    #[error("unexpected end of buffer")]
    EndOfBuffer,
    #[error("invalid modified utf-8 at offset {offset}")]
    InvalidModifiedUtf8 { offset: usize },
    #[error("string too long for a 16-bit length prefix: {0} bytes")]
    StringTooLong(usize),
}
