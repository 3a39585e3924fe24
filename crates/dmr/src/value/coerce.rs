//! `as_*` conversions between value kinds.
//!
//! Numeric narrowing follows Java casts: floating point to integer
//! saturates (NaN becomes zero), wider integers keep their low-order bits.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use indexmap::IndexMap;
use num_bigint::{BigInt, Sign};
use num_traits::{ToPrimitive, Zero};

use super::{FormatOptions, ModelValue};
use crate::error::{DmrError, Result};
use crate::model_type::ModelType;
use crate::node::ModelNode;
use crate::property::Property;

/// Low 64 bits of the two's-complement form, like `BigInteger.longValue()`.
fn low_i64(b: &BigInt) -> i64 {
    let low = b.iter_u64_digits().next().unwrap_or(0) as i64;
    if b.sign() == Sign::Minus {
        low.wrapping_neg()
    } else {
        low
    }
}

fn big_to_f64(b: &BigInt) -> f64 {
    b.to_f64().unwrap_or(f64::NAN)
}

/// Integer part of a decimal, truncated toward zero.
fn truncate(d: &BigDecimal) -> BigInt {
    d.with_scale(0).into_bigint_and_exponent().0
}

fn decimal_to_f64(d: &BigDecimal) -> f64 {
    d.to_f64().unwrap_or(f64::NAN)
}

/// The trailing `n` bytes read as an unsigned big-endian number.
fn tail(bytes: &[u8], n: usize) -> u64 {
    let start = bytes.len().saturating_sub(n);
    bytes[start..]
        .iter()
        .fold(0u64, |acc, b| (acc << 8) | u64::from(*b))
}

impl ModelValue {
    fn invalid(&self, to: &'static str) -> DmrError {
        DmrError::coercion(self.model_type(), to)
    }

    fn double_to_decimal(&self, d: f64) -> Result<BigDecimal> {
        if !d.is_finite() {
            return Err(self.invalid("big decimal"));
        }
        BigDecimal::from_str(&super::java_double_string(d))
            .map_err(|_| self.invalid("big decimal"))
    }

    pub fn as_long(&self) -> Result<i64> {
        match self {
            ModelValue::Boolean(b) => Ok(i64::from(*b)),
            ModelValue::Int(v) => Ok(i64::from(*v)),
            ModelValue::Long(v) => Ok(*v),
            ModelValue::Double(v) => Ok(*v as i64),
            ModelValue::BigInteger(v) => Ok(low_i64(v)),
            ModelValue::BigDecimal(v) => Ok(low_i64(&truncate(v))),
            ModelValue::Bytes(v) => Ok(tail(v, 8) as i64),
            ModelValue::String(s) => s.parse().map_err(|_| DmrError::literal(s, "long")),
            ModelValue::List(_) | ModelValue::Object(_) | ModelValue::Property(_) => {
                Ok(i64::from(self.size()))
            }
            _ => Err(self.invalid("long")),
        }
    }

    pub fn as_int(&self) -> Result<i32> {
        match self {
            ModelValue::Boolean(b) => Ok(i32::from(*b)),
            ModelValue::Int(v) => Ok(*v),
            ModelValue::Long(v) => Ok(*v as i32),
            ModelValue::Double(v) => Ok(*v as i32),
            ModelValue::BigInteger(v) => Ok(low_i64(v) as i32),
            ModelValue::BigDecimal(v) => Ok(low_i64(&truncate(v)) as i32),
            ModelValue::Bytes(v) => Ok(tail(v, 4) as u32 as i32),
            ModelValue::String(s) => s.parse().map_err(|_| DmrError::literal(s, "int")),
            ModelValue::List(_) | ModelValue::Object(_) | ModelValue::Property(_) => {
                Ok(self.size())
            }
            _ => Err(self.invalid("int")),
        }
    }

    pub fn as_boolean(&self) -> Result<bool> {
        match self {
            ModelValue::Boolean(b) => Ok(*b),
            ModelValue::Int(v) => Ok(*v != 0),
            ModelValue::Long(v) => Ok(*v != 0),
            ModelValue::Double(v) => Ok(*v != 0.0),
            ModelValue::BigInteger(v) => Ok(!v.is_zero()),
            ModelValue::BigDecimal(v) => Ok(!v.is_zero()),
            ModelValue::String(s) => {
                if s.eq_ignore_ascii_case("true") {
                    Ok(true)
                } else if s.eq_ignore_ascii_case("false") {
                    Ok(false)
                } else {
                    Err(DmrError::literal(s, "boolean"))
                }
            }
            ModelValue::Type(t) => Ok(*t != ModelType::Undefined),
            ModelValue::List(v) => Ok(!v.is_empty()),
            ModelValue::Object(v) => Ok(!v.is_empty()),
            ModelValue::Property(_) => Ok(true),
            _ => Err(self.invalid("boolean")),
        }
    }

    pub fn as_double(&self) -> Result<f64> {
        match self {
            ModelValue::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
            ModelValue::Int(v) => Ok(f64::from(*v)),
            ModelValue::Long(v) => Ok(*v as f64),
            ModelValue::Double(v) => Ok(*v),
            ModelValue::BigInteger(v) => Ok(big_to_f64(v)),
            ModelValue::BigDecimal(v) => Ok(decimal_to_f64(v)),
            ModelValue::String(s) => s.trim().parse().map_err(|_| DmrError::literal(s, "double")),
            _ => Err(self.invalid("double")),
        }
    }

    pub fn as_big_integer(&self) -> Result<BigInt> {
        match self {
            ModelValue::Boolean(b) => Ok(BigInt::from(i32::from(*b))),
            ModelValue::Int(v) => Ok(BigInt::from(*v)),
            ModelValue::Long(v) => Ok(BigInt::from(*v)),
            ModelValue::Double(v) => Ok(truncate(&self.double_to_decimal(*v)?)),
            ModelValue::BigInteger(v) => Ok(v.clone()),
            ModelValue::BigDecimal(v) => Ok(truncate(v)),
            ModelValue::Bytes(v) => Ok(BigInt::from_signed_bytes_be(v)),
            ModelValue::String(s) => {
                BigInt::from_str(s).map_err(|_| DmrError::literal(s, "big integer"))
            }
            _ => Err(self.invalid("big integer")),
        }
    }

    pub fn as_big_decimal(&self) -> Result<BigDecimal> {
        match self {
            ModelValue::Boolean(b) => Ok(BigDecimal::from(i32::from(*b))),
            ModelValue::Int(v) => Ok(BigDecimal::from(*v)),
            ModelValue::Long(v) => Ok(BigDecimal::from(*v)),
            ModelValue::Double(v) => self.double_to_decimal(*v),
            ModelValue::BigInteger(v) => Ok(BigDecimal::new(v.clone(), 0)),
            ModelValue::BigDecimal(v) => Ok(v.clone()),
            ModelValue::Bytes(v) => Ok(BigDecimal::new(BigInt::from_signed_bytes_be(v), 0)),
            ModelValue::String(s) => {
                BigDecimal::from_str(s).map_err(|_| DmrError::literal(s, "big decimal"))
            }
            _ => Err(self.invalid("big decimal")),
        }
    }

    pub fn as_bytes(&self) -> Result<Vec<u8>> {
        match self {
            ModelValue::Boolean(b) => Ok(vec![u8::from(*b)]),
            ModelValue::Int(v) => Ok(v.to_be_bytes().to_vec()),
            ModelValue::Long(v) => Ok(v.to_be_bytes().to_vec()),
            ModelValue::Double(v) => Ok(v.to_bits().to_be_bytes().to_vec()),
            ModelValue::BigInteger(v) => Ok(v.to_signed_bytes_be()),
            ModelValue::BigDecimal(v) => Ok(truncate(v).to_signed_bytes_be()),
            ModelValue::Bytes(v) => Ok(v.clone()),
            ModelValue::String(s) | ModelValue::Expression(s) => Ok(s.as_bytes().to_vec()),
            _ => Err(self.invalid("bytes")),
        }
    }

    /// Text form of the value. Never fails: strings come back unquoted,
    /// containers in their single-line DMR form.
    pub fn as_string(&self) -> String {
        match self {
            ModelValue::Undefined => "undefined".to_owned(),
            ModelValue::Boolean(b) => b.to_string(),
            ModelValue::Int(v) => v.to_string(),
            ModelValue::Long(v) => v.to_string(),
            ModelValue::Double(v) => super::java_double_string(*v),
            ModelValue::BigInteger(v) => v.to_string(),
            ModelValue::BigDecimal(v) => v.to_string(),
            ModelValue::String(s) | ModelValue::Expression(s) => s.clone(),
            ModelValue::Type(t) => t.name().to_owned(),
            ModelValue::Bytes(_)
            | ModelValue::List(_)
            | ModelValue::Object(_)
            | ModelValue::Property(_) => self.format(&FormatOptions::single_line()),
        }
    }

    pub fn as_type(&self) -> Result<ModelType> {
        match self {
            ModelValue::Type(t) => Ok(*t),
            ModelValue::String(s) => s.parse().map_err(|_| DmrError::literal(s, "type")),
            _ => Err(self.invalid("type")),
        }
    }

    pub fn as_property(&self) -> Result<Property> {
        match self {
            ModelValue::Property(p) => Ok(p.clone()),
            ModelValue::Object(map) if map.len() == 1 => match map.first() {
                Some((key, node)) => Ok(Property::new(key.clone(), node)),
                None => Err(self.invalid("property")),
            },
            ModelValue::List(list) if list.len() == 2 => {
                Ok(Property::new(list[0].as_string(), &list[1]))
            }
            _ => Err(self.invalid("property")),
        }
    }

    pub fn as_property_list(&self) -> Result<Vec<Property>> {
        match self {
            ModelValue::Property(p) => Ok(vec![p.clone()]),
            ModelValue::Object(map) => Ok(map
                .iter()
                .map(|(key, node)| Property::new(key.clone(), node))
                .collect()),
            ModelValue::List(list) => {
                let mut properties = Vec::new();
                let mut items = list.iter();
                while let Some(node) = items.next() {
                    if let ModelValue::Property(p) = node.value() {
                        properties.push(p.clone());
                    } else if let Some(value) = items.next() {
                        properties.push(Property::new(node.as_string(), value));
                    }
                }
                Ok(properties)
            }
            _ => Err(self.invalid("property list")),
        }
    }

    /// Copy of the value reshaped as an OBJECT node.
    pub fn as_object(&self) -> Result<ModelNode> {
        let map = match self {
            ModelValue::Object(map) => map.clone(),
            ModelValue::Property(p) => {
                let mut map = IndexMap::with_capacity(1);
                map.insert(p.name().to_owned(), p.value().clone());
                map
            }
            ModelValue::List(_) => self
                .as_property_list()?
                .into_iter()
                .map(Property::into_parts)
                .collect(),
            _ => return Err(self.invalid("object")),
        };
        Ok(ModelNode::from_value(ModelValue::Object(map)))
    }

    /// Copies of the children. OBJECT entries come back as PROPERTY nodes.
    pub fn as_list(&self) -> Result<Vec<ModelNode>> {
        match self {
            ModelValue::List(list) => Ok(list.clone()),
            ModelValue::Object(map) => Ok(map
                .iter()
                .map(|(key, node)| ModelNode::from(Property::new(key.clone(), node)))
                .collect()),
            ModelValue::Property(p) => Ok(vec![ModelNode::from(p.clone())]),
            _ => Err(self.invalid("list")),
        }
    }

    pub fn keys(&self) -> Result<Vec<String>> {
        match self {
            ModelValue::Object(map) => Ok(map.keys().cloned().collect()),
            ModelValue::Property(p) => Ok(vec![p.name().to_owned()]),
            _ => Err(self.invalid("keys")),
        }
    }

    /// Number of children of a container (a PROPERTY counts as one).
    fn size(&self) -> i32 {
        let len = match self {
            ModelValue::List(list) => list.len(),
            ModelValue::Object(map) => map.len(),
            ModelValue::Property(_) => 1,
            _ => 0,
        };
        i32::try_from(len).unwrap_or(i32::MAX)
    }

    // ----------------------------------------------------------------
    // Lenient accessors

    pub fn as_long_or(&self, default: i64) -> i64 {
        self.as_long().unwrap_or(default)
    }

    pub fn as_int_or(&self, default: i32) -> i32 {
        self.as_int().unwrap_or(default)
    }

    pub fn as_boolean_or(&self, default: bool) -> bool {
        self.as_boolean().unwrap_or(default)
    }

    pub fn as_double_or(&self, default: f64) -> f64 {
        self.as_double().unwrap_or(default)
    }

    pub fn as_string_or(&self, default: &str) -> String {
        if self.is_defined() {
            self.as_string()
        } else {
            default.to_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn java_narrowing() {
        assert_eq!(ModelValue::Long(0x1_0000_0005).as_int().unwrap(), 5);
        assert_eq!(ModelValue::Double(1e20).as_int().unwrap(), i32::MAX);
        assert_eq!(ModelValue::Double(f64::NAN).as_long().unwrap(), 0);
        assert_eq!(ModelValue::Double(-2.9).as_int().unwrap(), -2);
    }

    #[test]
    fn big_integer_keeps_low_bits() {
        let big = BigInt::from(u64::MAX) + BigInt::from(2u8);
        assert_eq!(ModelValue::BigInteger(big).as_long().unwrap(), 1);
        let neg = BigInt::from(-1);
        assert_eq!(ModelValue::BigInteger(neg).as_int().unwrap(), -1);
    }

    #[test]
    fn big_decimal_truncates() {
        let d = BigDecimal::from_str("-3.99").unwrap();
        assert_eq!(ModelValue::BigDecimal(d.clone()).as_long().unwrap(), -3);
        assert_eq!(ModelValue::BigDecimal(d).as_bytes().unwrap(), vec![0xfd]);
    }

    #[test]
    fn bytes_read_trailing_bytes() {
        let v = ModelValue::Bytes(vec![0xff, 0, 0, 0, 0, 0, 0, 1, 2]);
        assert_eq!(v.as_long().unwrap(), 0x0102);
        assert_eq!(v.as_int().unwrap(), 0x0102);
        assert_eq!(ModelValue::Bytes(vec![0xff]).as_int().unwrap(), 0xff);
        assert!(ModelValue::Bytes(vec![1]).as_double().is_err());
        assert_eq!(
            ModelValue::Bytes(vec![0xff]).as_big_integer().unwrap(),
            BigInt::from(-1)
        );
    }

    #[test]
    fn string_parses_on_demand() {
        let s = ModelValue::from("42");
        assert_eq!(s.as_int().unwrap(), 42);
        assert_eq!(s.as_long().unwrap(), 42);
        assert_eq!(s.as_double().unwrap(), 42.0);
        assert_eq!(s.as_big_integer().unwrap(), BigInt::from(42));
        let err = ModelValue::from("forty").as_int().unwrap_err();
        assert!(err.is_invalid_coercion());
        assert!(ModelValue::from("TRUE").as_boolean().unwrap());
        assert!(ModelValue::from("yes").as_boolean().is_err());
        assert_eq!(ModelValue::from("LIST").as_type().unwrap(), ModelType::List);
    }

    #[test]
    fn double_to_decimal_uses_shortest_text() {
        let d = ModelValue::Double(0.1).as_big_decimal().unwrap();
        assert_eq!(d, BigDecimal::from_str("0.1").unwrap());
        assert!(ModelValue::Double(f64::INFINITY).as_big_decimal().is_err());
    }

    #[test]
    fn undefined_only_has_defaults() {
        let u = ModelValue::Undefined;
        assert_eq!(u.as_string(), "undefined");
        assert!(u.as_int().is_err());
        assert_eq!(u.as_int_or(7), 7);
        assert_eq!(u.as_long_or(-1), -1);
        assert!(u.as_boolean_or(true));
        assert_eq!(u.as_double_or(0.5), 0.5);
        assert_eq!(u.as_string_or("x"), "x");
    }

    #[test]
    fn expression_only_converts_to_text() {
        let e = ModelValue::expression("${a:1}");
        assert_eq!(e.as_string(), "${a:1}");
        assert!(e.as_int().is_err());
        assert!(e.as_boolean().is_err());
        assert!(!e.as_boolean_or(false));
    }

    #[test]
    fn type_as_boolean() {
        assert!(ModelValue::Type(ModelType::Int).as_boolean().unwrap());
        assert!(!ModelValue::Type(ModelType::Undefined).as_boolean().unwrap());
    }

    #[test]
    fn list_pairs_into_properties() {
        let list = ModelValue::List(vec![
            ModelNode::from("a"),
            ModelNode::from(1),
            ModelNode::from(Property::shared("b", ModelNode::from(2))),
            ModelNode::from("dangling"),
        ]);
        let props = list.as_property_list().unwrap();
        assert_eq!(props.len(), 2);
        assert_eq!(props[0].name(), "a");
        assert_eq!(props[1].name(), "b");
        assert_eq!(list.as_int().unwrap(), 4);

        let object = list.as_object().unwrap();
        assert_eq!(object.keys().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn two_element_list_is_a_property() {
        let list = ModelValue::List(vec![ModelNode::from(5), ModelNode::from("v")]);
        let p = list.as_property().unwrap();
        assert_eq!(p.name(), "5");
        assert_eq!(p.value().as_string(), "v");
        assert!(ModelValue::List(vec![]).as_property().is_err());
    }
}
