//! JSON projection decoder.
//!
//! Plain JSON maps onto the obvious DMR types. Single-key objects keyed by
//! one of the sentinel names restore the types JSON cannot express.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use indexmap::IndexMap;
use num_bigint::BigInt;
use serde_json::{Map, Number, Value};
use tracing::debug;

use super::MAX_DEPTH;
use crate::error::CodecError;
use crate::model_type::ModelType;
use crate::node::ModelNode;
use crate::property::Property;
use crate::value::{ModelValue, BYTES_VALUE, EXPRESSION_VALUE, PROPERTY_VALUE, TYPE_MODEL_VALUE};

pub fn decode_str(json: &str) -> Result<ModelNode, CodecError> {
    debug!(len = json.len(), "decoding json dmr");
    let value: Value = serde_json::from_str(json)?;
    decode_value(&value)
}

pub fn decode_value(json: &Value) -> Result<ModelNode, CodecError> {
    read_any(json, 0).map(ModelNode::from_value)
}

fn read_any(json: &Value, depth: usize) -> Result<ModelValue, CodecError> {
    if depth > MAX_DEPTH {
        return Err(CodecError::TooDeep(MAX_DEPTH));
    }
    Ok(match json {
        Value::Null => ModelValue::Undefined,
        Value::Bool(b) => ModelValue::Boolean(*b),
        Value::Number(n) => read_number(n),
        Value::String(s) => ModelValue::String(s.clone()),
        Value::Array(items) => ModelValue::List(
            items
                .iter()
                .map(|item| read_any(item, depth + 1).map(ModelNode::from_value))
                .collect::<Result<_, _>>()?,
        ),
        Value::Object(map) => match read_sentinel(map, depth)? {
            Some(value) => value,
            None => {
                let mut object = IndexMap::with_capacity(map.len());
                for (key, item) in map {
                    object.insert(key.clone(), ModelNode::from_value(read_any(item, depth + 1)?));
                }
                ModelValue::Object(object)
            }
        },
    })
}

fn read_number(n: &Number) -> ModelValue {
    if let Some(v) = n.as_i64() {
        return match i32::try_from(v) {
            Ok(i) => ModelValue::Int(i),
            Err(_) => ModelValue::Long(v),
        };
    }
    let text = n.to_string();
    if !text.contains(['.', 'e', 'E']) {
        if let Ok(big) = text.parse::<BigInt>() {
            return ModelValue::BigInteger(big);
        }
    }
    ModelValue::Double(n.as_f64().unwrap_or(f64::NAN))
}

fn read_sentinel(map: &Map<String, Value>, depth: usize) -> Result<Option<ModelValue>, CodecError> {
    if map.len() != 1 {
        return Ok(None);
    }
    let Some((key, payload)) = map.iter().next() else {
        return Ok(None);
    };
    let value = match key.as_str() {
        BYTES_VALUE => {
            let encoded = payload.as_str().ok_or(CodecError::InvalidSentinel(BYTES_VALUE))?;
            ModelValue::Bytes(STANDARD.decode(encoded)?)
        }
        EXPRESSION_VALUE => {
            let text = payload
                .as_str()
                .ok_or(CodecError::InvalidSentinel(EXPRESSION_VALUE))?;
            ModelValue::Expression(text.to_owned())
        }
        TYPE_MODEL_VALUE => {
            let ty = payload
                .as_str()
                .and_then(|name| name.parse::<ModelType>().ok())
                .ok_or(CodecError::InvalidSentinel(TYPE_MODEL_VALUE))?;
            ModelValue::Type(ty)
        }
        PROPERTY_VALUE => {
            let inner = payload
                .as_object()
                .filter(|inner| inner.len() == 1)
                .and_then(|inner| inner.iter().next())
                .ok_or(CodecError::InvalidSentinel(PROPERTY_VALUE))?;
            let (name, item) = inner;
            let node = ModelNode::from_value(read_any(item, depth + 2)?);
            ModelValue::Property(Property::shared(name.clone(), node))
        }
        _ => return Ok(None),
    };
    Ok(Some(value))
}
