//! Bounds-checked big-endian byte reader (`DataInput` counterpart).

use crate::{utf, BufferError};

/// A binary reader over a byte slice.
///
/// Every read is bounds-checked and leaves the cursor untouched when it
/// fails, so a caller can report the exact offset of a malformed payload.
///
/// # Example
///
/// ```
/// use dmr_buffers::Reader;
///
/// let data = [0x00, 0x00, 0x00, 0x2a, 0x01];
/// let mut reader = Reader::new(&data);
///
/// assert_eq!(reader.try_i32(), Ok(42));
/// assert_eq!(reader.try_bool(), Ok(true));
/// assert!(reader.is_eof());
/// ```
pub struct Reader<'a> {
    /// The underlying byte slice.
    pub uint8: &'a [u8],
    /// Current cursor position.
    pub x: usize,
}

impl<'a> Reader<'a> {
    pub fn new(uint8: &'a [u8]) -> Self {
        Self { uint8, x: 0 }
    }

    /// Returns the number of remaining bytes.
    pub fn size(&self) -> usize {
        self.uint8.len().saturating_sub(self.x)
    }

    pub fn is_eof(&self) -> bool {
        self.size() == 0
    }

    #[inline]
    fn check(&self, n: usize) -> Result<(), BufferError> {
        if self.x + n > self.uint8.len() {
            Err(BufferError::EndOfBuffer)
        } else {
            Ok(())
        }
    }

    #[inline]
    fn array<const N: usize>(&mut self) -> Result<[u8; N], BufferError> {
        self.check(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.uint8[self.x..self.x + N]);
        self.x += N;
        Ok(out)
    }

    /// Peeks at the current byte without advancing.
    pub fn try_peek(&self) -> Result<u8, BufferError> {
        self.check(1)?;
        Ok(self.uint8[self.x])
    }

    #[inline]
    pub fn try_u8(&mut self) -> Result<u8, BufferError> {
        self.check(1)?;
        let val = self.uint8[self.x];
        self.x += 1;
        Ok(val)
    }

    /// Reads one byte; any non-zero value is `true`.
    #[inline]
    pub fn try_bool(&mut self) -> Result<bool, BufferError> {
        Ok(self.try_u8()? != 0)
    }

    #[inline]
    pub fn try_u16(&mut self) -> Result<u16, BufferError> {
        Ok(u16::from_be_bytes(self.array()?))
    }

    #[inline]
    pub fn try_i32(&mut self) -> Result<i32, BufferError> {
        Ok(i32::from_be_bytes(self.array()?))
    }

    #[inline]
    pub fn try_i64(&mut self) -> Result<i64, BufferError> {
        Ok(i64::from_be_bytes(self.array()?))
    }

    #[inline]
    pub fn try_f64(&mut self) -> Result<f64, BufferError> {
        Ok(f64::from_be_bytes(self.array()?))
    }

    /// Reads `size` raw bytes and advances the cursor.
    pub fn try_buf(&mut self, size: usize) -> Result<&'a [u8], BufferError> {
        self.check(size)?;
        let x = self.x;
        self.x += size;
        Ok(&self.uint8[x..self.x])
    }

    /// Reads a `DataInput.readUTF` string: 16-bit byte length, then modified
    /// UTF-8.
    pub fn try_utf(&mut self) -> Result<String, BufferError> {
        let start = self.x;
        let length = self.try_u16()? as usize;
        let body = match self.try_buf(length) {
            Ok(body) => body,
            Err(err) => {
                self.x = start;
                return Err(err);
            }
        };
        utf::decode_at(body, start + 2).inspect_err(|_| self.x = start)
    }

    /// Reads `units` UTF-16 units of modified UTF-8 (the long string form,
    /// whose prefix counts characters instead of bytes).
    pub fn try_long_utf(&mut self, units: usize) -> Result<String, BufferError> {
        let start = self.x;
        let mut decoded = Vec::with_capacity(units.min(self.size()));
        let mut pos = self.x;
        for _ in 0..units {
            let (unit, used) = utf::decode_unit(self.uint8, pos, 0)?;
            decoded.push(unit);
            pos += used;
        }
        let s = String::from_utf16(&decoded)
            .map_err(|_| BufferError::InvalidModifiedUtf8 { offset: start })?;
        self.x = pos;
        Ok(s)
    }
}
