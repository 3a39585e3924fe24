//! Growable big-endian byte writer (`DataOutput` counterpart).

use crate::{utf, BufferError};

/// A binary writer that grows automatically as needed.
///
/// # Example
///
/// ```
/// use dmr_buffers::Writer;
///
/// let mut writer = Writer::new();
/// writer.u8(b'I');
/// writer.i32(42);
/// assert_eq!(writer.flush(), [b'I', 0, 0, 0, 42]);
/// ```
pub struct Writer {
    /// The underlying byte buffer.
    pub uint8: Vec<u8>,
    /// Position where last flush happened.
    pub x0: usize,
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer {
    /// Creates a new writer with a small initial allocation.
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            uint8: Vec::with_capacity(capacity),
            x0: 0,
        }
    }

    /// Number of bytes written since the last flush.
    pub fn len(&self) -> usize {
        self.uint8.len() - self.x0
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the bytes written since the last flush and advances the flush
    /// position.
    pub fn flush(&mut self) -> Vec<u8> {
        let result = self.uint8[self.x0..].to_vec();
        self.x0 = self.uint8.len();
        result
    }

    /// Discards everything and starts over.
    pub fn reset(&mut self) {
        self.uint8.clear();
        self.x0 = 0;
    }

    #[inline]
    pub fn u8(&mut self, val: u8) {
        self.uint8.push(val);
    }

    /// Writes a boolean as a single `0`/`1` byte.
    #[inline]
    pub fn bool(&mut self, val: bool) {
        self.uint8.push(u8::from(val));
    }

    #[inline]
    pub fn u16(&mut self, val: u16) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    #[inline]
    pub fn i32(&mut self, val: i32) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    #[inline]
    pub fn i64(&mut self, val: i64) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    #[inline]
    pub fn f64(&mut self, val: f64) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    /// Writes a raw byte slice.
    pub fn buf(&mut self, buf: &[u8]) {
        self.uint8.extend_from_slice(buf);
    }

    /// Writes a 32-bit length followed by the bytes.
    pub fn sized_buf(&mut self, buf: &[u8]) {
        self.i32(buf.len() as i32);
        self.buf(buf);
    }

    /// Writes a string the way `DataOutput.writeUTF` does: a 16-bit byte
    /// length, then modified UTF-8. Returns the number of bytes written.
    pub fn utf(&mut self, s: &str) -> Result<usize, BufferError> {
        let length = utf::encoded_len(s);
        if length > u16::MAX as usize {
            return Err(BufferError::StringTooLong(length));
        }
        self.u16(length as u16);
        utf::encode_into(s, &mut self.uint8);
        Ok(length + 2)
    }

    /// Writes a string without a byte-length limit: a 32-bit count of UTF-16
    /// units, then the same per-unit encoding as [`Writer::utf`].
    pub fn long_utf(&mut self, s: &str) {
        let units = s.encode_utf16().count();
        self.i32(units as i32);
        utf::encode_into(s, &mut self.uint8);
    }
}
