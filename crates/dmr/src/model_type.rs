//! The closed set of DMR value kinds and their one-byte wire codes.

use std::fmt;
use std::str::FromStr;

/// Kind of value held by a [`ModelNode`](crate::ModelNode).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModelType {
    BigDecimal,
    BigInteger,
    Boolean,
    Bytes,
    Double,
    Expression,
    Int,
    List,
    Long,
    Object,
    Property,
    String,
    Type,
    Undefined,
}

impl ModelType {
    pub const ALL: [ModelType; 14] = [
        ModelType::BigDecimal,
        ModelType::BigInteger,
        ModelType::Boolean,
        ModelType::Bytes,
        ModelType::Double,
        ModelType::Expression,
        ModelType::Int,
        ModelType::List,
        ModelType::Long,
        ModelType::Object,
        ModelType::Property,
        ModelType::String,
        ModelType::Type,
        ModelType::Undefined,
    ];

    /// The byte written in front of every encoded value.
    pub const fn type_char(self) -> u8 {
        match self {
            ModelType::BigDecimal => b'd',
            ModelType::BigInteger => b'i',
            ModelType::Boolean => b'Z',
            ModelType::Bytes => b'b',
            ModelType::Double => b'D',
            ModelType::Expression => b'e',
            ModelType::Int => b'I',
            ModelType::List => b'l',
            ModelType::Long => b'J',
            ModelType::Object => b'o',
            ModelType::Property => b'p',
            ModelType::String => b's',
            ModelType::Type => b't',
            ModelType::Undefined => b'u',
        }
    }

    pub const fn for_char(c: u8) -> Option<ModelType> {
        Some(match c {
            b'd' => ModelType::BigDecimal,
            b'i' => ModelType::BigInteger,
            b'Z' => ModelType::Boolean,
            b'b' => ModelType::Bytes,
            b'D' => ModelType::Double,
            b'e' => ModelType::Expression,
            b'I' => ModelType::Int,
            b'l' => ModelType::List,
            b'J' => ModelType::Long,
            b'o' => ModelType::Object,
            b'p' => ModelType::Property,
            b's' => ModelType::String,
            b't' => ModelType::Type,
            b'u' => ModelType::Undefined,
            _ => return None,
        })
    }

    pub const fn name(self) -> &'static str {
        match self {
            ModelType::BigDecimal => "BIG_DECIMAL",
            ModelType::BigInteger => "BIG_INTEGER",
            ModelType::Boolean => "BOOLEAN",
            ModelType::Bytes => "BYTES",
            ModelType::Double => "DOUBLE",
            ModelType::Expression => "EXPRESSION",
            ModelType::Int => "INT",
            ModelType::List => "LIST",
            ModelType::Long => "LONG",
            ModelType::Object => "OBJECT",
            ModelType::Property => "PROPERTY",
            ModelType::String => "STRING",
            ModelType::Type => "TYPE",
            ModelType::Undefined => "UNDEFINED",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a string does not name a [`ModelType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownModelType(pub String);

impl FromStr for ModelType {
    type Err = UnknownModelType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelType::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| UnknownModelType(s.to_owned()))
    }
}
