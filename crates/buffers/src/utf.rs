//! Java-style modified UTF-8.
//!
//! The encoding works on UTF-16 code units rather than code points:
//!
//! | unit              | bytes |
//! |-------------------|-------|
//! | `0x0001..=0x007F` | 1     |
//! | `0x0000`, `..=0x07FF` | 2 |
//! | everything else   | 3     |
//!
//! Supplementary characters are therefore written as two 3-byte surrogates,
//! and NUL never appears as a raw zero byte. Plain UTF-8 is *not* accepted as a
//! substitute on the wire.

use crate::BufferError;

/// Number of bytes `s` occupies once encoded.
pub fn encoded_len(s: &str) -> usize {
    s.encode_utf16().map(unit_len).sum()
}

#[inline]
fn unit_len(unit: u16) -> usize {
    match unit {
        0x0001..=0x007f => 1,
        0x0000 | 0x0080..=0x07ff => 2,
        _ => 3,
    }
}

/// Appends the modified UTF-8 form of `s` to `out`.
pub fn encode_into(s: &str, out: &mut Vec<u8>) {
    for unit in s.encode_utf16() {
        push_unit(unit, out);
    }
}

/// Returns the modified UTF-8 form of `s`.
pub fn encode(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(encoded_len(s));
    encode_into(s, &mut out);
    out
}

#[inline]
pub(crate) fn push_unit(unit: u16, out: &mut Vec<u8>) {
    match unit {
        0x0001..=0x007f => out.push(unit as u8),
        0x0000 | 0x0080..=0x07ff => {
            out.push(0xc0 | (0x1f & (unit >> 6)) as u8);
            out.push(0x80 | (0x3f & unit) as u8);
        }
        _ => {
            out.push(0xe0 | (0x0f & (unit >> 12)) as u8);
            out.push(0x80 | (0x3f & (unit >> 6)) as u8);
            out.push(0x80 | (0x3f & unit) as u8);
        }
    }
}

/// Decodes one UTF-16 unit starting at `bytes[pos]`.
///
/// Returns the unit and the number of bytes consumed. `base` is only used to
/// report absolute offsets in errors.
pub(crate) fn decode_unit(bytes: &[u8], pos: usize, base: usize) -> Result<(u16, usize), BufferError> {
    let invalid = BufferError::InvalidModifiedUtf8 { offset: base + pos };
    let a = *bytes.get(pos).ok_or(BufferError::EndOfBuffer)? as u16;
    if a < 0x80 {
        return Ok((a, 1));
    }
    if a < 0xc0 {
        return Err(invalid);
    }
    let b = *bytes.get(pos + 1).ok_or(BufferError::EndOfBuffer)? as u16;
    if b & 0xc0 != 0x80 {
        return Err(invalid);
    }
    if a < 0xe0 {
        return Ok(((a & 0x1f) << 6 | (b & 0x3f), 2));
    }
    if a < 0xf0 {
        let c = *bytes.get(pos + 2).ok_or(BufferError::EndOfBuffer)? as u16;
        if c & 0xc0 != 0x80 {
            return Err(invalid);
        }
        return Ok(((a & 0x0f) << 12 | (b & 0x3f) << 6 | (c & 0x3f), 3));
    }
    Err(invalid)
}

/// Decodes a complete modified UTF-8 byte sequence.
pub fn decode(bytes: &[u8]) -> Result<String, BufferError> {
    decode_at(bytes, 0)
}

pub(crate) fn decode_at(bytes: &[u8], base: usize) -> Result<String, BufferError> {
    let mut units = Vec::with_capacity(bytes.len());
    let mut pos = 0;
    while pos < bytes.len() {
        let (unit, used) = decode_unit(bytes, pos, base)?;
        units.push(unit);
        pos += used;
    }
    String::from_utf16(&units).map_err(|_| BufferError::InvalidModifiedUtf8 { offset: base })
}
