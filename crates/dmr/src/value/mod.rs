//! The DMR value sum type.

mod coerce;
mod format;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use bigdecimal::BigDecimal;
use indexmap::IndexMap;
use num_bigint::BigInt;

use crate::model_type::ModelType;
use crate::node::ModelNode;
use crate::property::Property;

pub use format::{java_double_string, FormatOptions};

/// JSON key wrapping a base64 `BYTES` payload.
pub const BYTES_VALUE: &str = "BYTES_VALUE";
/// JSON key wrapping an `EXPRESSION` payload.
pub const EXPRESSION_VALUE: &str = "EXPRESSION_VALUE";
/// JSON key wrapping a `TYPE` payload.
pub const TYPE_MODEL_VALUE: &str = "TYPE_MODEL_VALUE";
/// JSON key wrapping a `PROPERTY` payload.
pub const PROPERTY_VALUE: &str = "PROPERTY_VALUE";

/// One DMR value. Every variant reports exactly one [`ModelType`].
#[derive(Debug, Clone, Default)]
pub enum ModelValue {
    #[default]
    Undefined,
    Boolean(bool),
    Int(i32),
    Long(i64),
    Double(f64),
    BigInteger(BigInt),
    BigDecimal(BigDecimal),
    Bytes(Vec<u8>),
    String(String),
    /// Raw, unevaluated expression text such as `${jboss.home:/opt}`.
    Expression(String),
    Type(ModelType),
    List(Vec<ModelNode>),
    Object(IndexMap<String, ModelNode>),
    Property(Property),
}

impl ModelValue {
    pub fn model_type(&self) -> ModelType {
        match self {
            ModelValue::Undefined => ModelType::Undefined,
            ModelValue::Boolean(_) => ModelType::Boolean,
            ModelValue::Int(_) => ModelType::Int,
            ModelValue::Long(_) => ModelType::Long,
            ModelValue::Double(_) => ModelType::Double,
            ModelValue::BigInteger(_) => ModelType::BigInteger,
            ModelValue::BigDecimal(_) => ModelType::BigDecimal,
            ModelValue::Bytes(_) => ModelType::Bytes,
            ModelValue::String(_) => ModelType::String,
            ModelValue::Expression(_) => ModelType::Expression,
            ModelValue::Type(_) => ModelType::Type,
            ModelValue::List(_) => ModelType::List,
            ModelValue::Object(_) => ModelType::Object,
            ModelValue::Property(_) => ModelType::Property,
        }
    }

    pub fn is_defined(&self) -> bool {
        !matches!(self, ModelValue::Undefined)
    }

    pub fn expression(text: impl Into<String>) -> Self {
        ModelValue::Expression(text.into())
    }
}

// ----------------------------------------------------------------
// Equality and hashing

impl PartialEq for ModelValue {
    fn eq(&self, other: &Self) -> bool {
        use ModelValue::*;
        match (self, other) {
            (Undefined, Undefined) => true,
            (Boolean(a), Boolean(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (Long(a), Long(b)) => a == b,
            // Bitwise, so NaN equals NaN and 0.0 differs from -0.0.
            (Double(a), Double(b)) => a.to_bits() == b.to_bits(),
            (BigInteger(a), BigInteger(b)) => a == b,
            (BigDecimal(a), BigDecimal(b)) => a == b,
            (Bytes(a), Bytes(b)) => a == b,
            (String(a), String(b)) => a == b,
            (Expression(a), Expression(b)) => a == b,
            (Type(a), Type(b)) => a == b,
            (List(a), List(b)) => a == b,
            // IndexMap equality ignores insertion order.
            (Object(a), Object(b)) => a == b,
            (Property(a), Property(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ModelValue {}

impl Hash for ModelValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.model_type().hash(state);
        match self {
            ModelValue::Undefined => {}
            ModelValue::Boolean(v) => v.hash(state),
            ModelValue::Int(v) => v.hash(state),
            ModelValue::Long(v) => v.hash(state),
            ModelValue::Double(v) => v.to_bits().hash(state),
            ModelValue::BigInteger(v) => v.hash(state),
            ModelValue::BigDecimal(v) => v.hash(state),
            ModelValue::Bytes(v) => v.hash(state),
            ModelValue::String(v) | ModelValue::Expression(v) => v.hash(state),
            ModelValue::Type(v) => v.hash(state),
            ModelValue::List(v) => v.hash(state),
            ModelValue::Object(map) => {
                let mut sum = 0u64;
                for (key, node) in map {
                    let mut h = DefaultHasher::new();
                    key.hash(&mut h);
                    node.hash(&mut h);
                    sum = sum.wrapping_add(h.finish());
                }
                map.len().hash(state);
                sum.hash(state);
            }
            ModelValue::Property(p) => p.hash(state),
        }
    }
}

// ----------------------------------------------------------------
// Conversions into a value

macro_rules! value_from {
    ($($ty:ty => |$v:ident| $body:expr;)*) => {
        $(
            impl From<$ty> for ModelValue {
                fn from($v: $ty) -> Self {
                    $body
                }
            }

            impl From<$ty> for ModelNode {
                fn from($v: $ty) -> Self {
                    ModelNode::from_value($body)
                }
            }
        )*
    };
}

value_from! {
    bool => |v| ModelValue::Boolean(v);
    i32 => |v| ModelValue::Int(v);
    i64 => |v| ModelValue::Long(v);
    f64 => |v| ModelValue::Double(v);
    BigInt => |v| ModelValue::BigInteger(v);
    BigDecimal => |v| ModelValue::BigDecimal(v);
    Vec<u8> => |v| ModelValue::Bytes(v);
    &[u8] => |v| ModelValue::Bytes(v.to_vec());
    String => |v| ModelValue::String(v);
    &str => |v| ModelValue::String(v.to_owned());
    &String => |v| ModelValue::String(v.clone());
    ModelType => |v| ModelValue::Type(v);
    Property => |v| ModelValue::Property(v);
    Vec<ModelNode> => |v| ModelValue::List(v.iter().map(ModelNode::clone).collect());
    &[ModelNode] => |v| ModelValue::List(v.iter().map(ModelNode::clone).collect());
}

/// Deep copy of the node's value; the source stays untouched.
impl From<&ModelNode> for ModelValue {
    fn from(node: &ModelNode) -> Self {
        node.value().clone()
    }
}
