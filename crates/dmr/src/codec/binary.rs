//! DMR binary codec.
//!
//! Every node is a one-byte type tag followed by its payload. Integers are
//! big-endian, strings use modified UTF-8 with a 16-bit byte length, and a
//! string too long for that prefix is written under the `S` tag with a
//! 32-bit UTF-16 unit count instead.

use bigdecimal::BigDecimal;
use dmr_buffers::{utf, Reader, Writer};
use indexmap::IndexMap;
use num_bigint::BigInt;
use tracing::debug;

use super::MAX_DEPTH;
use crate::error::CodecError;
use crate::model_type::ModelType;
use crate::node::ModelNode;
use crate::property::Property;
use crate::value::ModelValue;

/// Tag of the long string form. Decodes to a plain STRING.
pub const LONG_STRING_TAG: u8 = b'S';

// ----------------------------------------------------------------
// Encoder

pub struct DmrEncoder {
    pub writer: Writer,
}

impl Default for DmrEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl DmrEncoder {
    pub fn new() -> Self {
        Self {
            writer: Writer::new(),
        }
    }

    pub fn with_writer(writer: Writer) -> Self {
        Self { writer }
    }

    pub fn encode(&mut self, node: &ModelNode) -> Result<Vec<u8>, CodecError> {
        self.writer.reset();
        self.write_value(node.value())?;
        Ok(self.writer.flush())
    }

    pub fn write_value(&mut self, value: &ModelValue) -> Result<(), CodecError> {
        match value {
            ModelValue::String(s) => return self.write_str(s),
            other => self.writer.u8(other.model_type().type_char()),
        }
        let w = &mut self.writer;
        match value {
            ModelValue::Undefined | ModelValue::String(_) => {}
            ModelValue::Boolean(b) => w.bool(*b),
            ModelValue::Int(i) => w.i32(*i),
            ModelValue::Long(l) => w.i64(*l),
            ModelValue::Double(d) => w.f64(*d),
            ModelValue::BigInteger(b) => w.sized_buf(&b.to_signed_bytes_be()),
            ModelValue::BigDecimal(d) => {
                w.utf(&d.to_string())?;
            }
            ModelValue::Bytes(bytes) => w.sized_buf(bytes),
            ModelValue::Expression(e) => {
                w.utf(e)?;
            }
            ModelValue::Type(t) => w.u8(t.type_char()),
            ModelValue::List(list) => {
                w.i32(list.len() as i32);
                for node in list {
                    self.write_value(node.value())?;
                }
            }
            ModelValue::Object(map) => {
                w.i32(map.len() as i32);
                for (key, node) in map {
                    self.writer.utf(key)?;
                    self.write_value(node.value())?;
                }
            }
            ModelValue::Property(p) => {
                w.utf(p.name())?;
                self.write_value(p.value().value())?;
            }
        }
        Ok(())
    }

    fn write_str(&mut self, s: &str) -> Result<(), CodecError> {
        if utf::encoded_len(s) > u16::MAX as usize {
            self.writer.u8(LONG_STRING_TAG);
            self.writer.long_utf(s);
        } else {
            self.writer.u8(ModelType::String.type_char());
            self.writer.utf(s)?;
        }
        Ok(())
    }
}

// ----------------------------------------------------------------
// Decoder

/// Reads nodes from a borrowed byte slice.
pub struct DmrDecoder<'a> {
    pub reader: Reader<'a>,
}

impl<'a> DmrDecoder<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            reader: Reader::new(bytes),
        }
    }

    /// Reads exactly one node and rejects anything left over.
    pub fn decode(&mut self) -> Result<ModelNode, CodecError> {
        let node = self.read_node()?;
        let rest = self.reader.size();
        if rest > 0 {
            return Err(CodecError::TrailingBytes(rest));
        }
        Ok(node)
    }

    pub fn read_node(&mut self) -> Result<ModelNode, CodecError> {
        self.read_at(0).map(ModelNode::from_value)
    }

    fn read_at(&mut self, depth: usize) -> Result<ModelValue, CodecError> {
        if depth > MAX_DEPTH {
            return Err(CodecError::TooDeep(MAX_DEPTH));
        }
        let tag = self.reader.try_u8()?;
        if tag == LONG_STRING_TAG {
            let units = self.read_len()?;
            return Ok(ModelValue::String(self.reader.try_long_utf(units)?));
        }
        let ty = ModelType::for_char(tag).ok_or(CodecError::UnknownTypeTag(tag))?;
        let r = &mut self.reader;
        let value = match ty {
            ModelType::Undefined => ModelValue::Undefined,
            ModelType::Boolean => ModelValue::Boolean(r.try_bool()?),
            ModelType::Int => ModelValue::Int(r.try_i32()?),
            ModelType::Long => ModelValue::Long(r.try_i64()?),
            ModelType::Double => ModelValue::Double(r.try_f64()?),
            ModelType::BigInteger => {
                let len = self.read_len()?;
                ModelValue::BigInteger(BigInt::from_signed_bytes_be(self.reader.try_buf(len)?))
            }
            ModelType::BigDecimal => {
                let text = r.try_utf()?;
                let parsed = text
                    .parse::<BigDecimal>()
                    .map_err(|_| CodecError::InvalidDecimal(text))?;
                ModelValue::BigDecimal(parsed)
            }
            ModelType::Bytes => {
                let len = self.read_len()?;
                ModelValue::Bytes(self.reader.try_buf(len)?.to_vec())
            }
            ModelType::String => ModelValue::String(r.try_utf()?),
            ModelType::Expression => ModelValue::Expression(r.try_utf()?),
            ModelType::Type => {
                let inner = r.try_u8()?;
                let ty = ModelType::for_char(inner).ok_or(CodecError::UnknownTypeTag(inner))?;
                ModelValue::Type(ty)
            }
            ModelType::List => {
                let count = self.read_len()?;
                let mut list = Vec::with_capacity(count.min(self.reader.size()));
                for _ in 0..count {
                    list.push(ModelNode::from_value(self.read_at(depth + 1)?));
                }
                ModelValue::List(list)
            }
            ModelType::Object => {
                let count = self.read_len()?;
                let mut map = IndexMap::with_capacity(count.min(self.reader.size()));
                for _ in 0..count {
                    let key = self.reader.try_utf()?;
                    let node = ModelNode::from_value(self.read_at(depth + 1)?);
                    map.insert(key, node);
                }
                ModelValue::Object(map)
            }
            ModelType::Property => {
                let name = r.try_utf()?;
                let node = ModelNode::from_value(self.read_at(depth + 1)?);
                ModelValue::Property(Property::shared(name, node))
            }
        };
        Ok(value)
    }

    fn read_len(&mut self) -> Result<usize, CodecError> {
        let len = self.reader.try_i32()?;
        usize::try_from(len).map_err(|_| CodecError::NegativeLength(len))
    }
}

// ----------------------------------------------------------------
// Entry points

/// Writes `node` (tag and payload) to `writer`.
pub fn write_node(writer: &mut Writer, node: &ModelNode) -> Result<(), CodecError> {
    let mut encoder = DmrEncoder::with_writer(std::mem::take(writer));
    let result = encoder.write_value(node.value());
    *writer = encoder.writer;
    result
}

/// Reads one node from `reader`, leaving the cursor after it.
pub fn read_node(reader: &mut Reader<'_>) -> Result<ModelNode, CodecError> {
    let mut decoder = DmrDecoder {
        reader: Reader {
            uint8: reader.uint8,
            x: reader.x,
        },
    };
    let node = decoder.read_node()?;
    reader.x = decoder.reader.x;
    Ok(node)
}

pub fn encode(node: &ModelNode) -> Result<Vec<u8>, CodecError> {
    DmrEncoder::new().encode(node)
}

pub fn decode(bytes: &[u8]) -> Result<ModelNode, CodecError> {
    debug!(len = bytes.len(), "decoding binary dmr");
    DmrDecoder::new(bytes).decode()
}
