//! Detyped Model Representation (DMR).
//!
//! A dynamically typed, self-describing value tree used to build management
//! requests and read their responses, together with:
//!
//! - the bit-exact binary wire format and its base64 envelope ([`codec`]),
//! - a JSON projection with sentinel wrappers for non-JSON types,
//! - the DMR text form used for diagnostics,
//! - [`ResourceAddress`], [`Operation`] and [`Composite`] request builders.
//!
//! # Example
//!
//! ```
//! use dmr::{ModelNode, ModelType};
//!
//! let mut node = ModelNode::new();
//! node.get("a").unwrap().get("b").unwrap().set(42).unwrap();
//! assert_eq!(node.model_type(), ModelType::Object);
//!
//! let bytes = node.to_bytes().unwrap();
//! assert_eq!(ModelNode::from_bytes(&bytes).unwrap(), node);
//! ```

pub mod address;
pub mod cli;
pub mod codec;
pub mod composite;
pub mod dispatch;
mod error;
pub mod expression;
pub mod helper;
pub mod model_type;
pub mod named_node;
pub mod node;
pub mod operation;
pub mod property;
pub mod value;

pub use address::ResourceAddress;
pub use composite::{Composite, CompositeResult};
pub use error::{CodecError, DmrError, Result};
pub use expression::{EnvResolver, NoProperties, PropertyResolver};
pub use model_type::ModelType;
pub use named_node::NamedNode;
pub use node::ModelNode;
pub use operation::{Operation, OperationBuilder};
pub use property::Property;
pub use value::{FormatOptions, ModelValue};

// Well-known keys of the management protocol.

pub const ADDRESS: &str = "address";
pub const COMPOSITE: &str = "composite";
pub const FAILURE_DESCRIPTION: &str = "failure-description";
pub const HAL_INDEX: &str = "hal-index";
pub const NAME: &str = "name";
pub const OP: &str = "operation";
pub const OPERATION_HEADERS: &str = "operation-headers";
pub const OUTCOME: &str = "outcome";
pub const RESOLVE_EXPRESSION: &str = "resolve-expression";
pub const RESULT: &str = "result";
pub const ROLES: &str = "roles";
pub const STEPS: &str = "steps";
pub const SUCCESS: &str = "success";
pub const WHOAMI: &str = "whoami";
