//! The mutable DMR tree cell.

use std::fmt;
use std::hash::{Hash, Hasher};

use bigdecimal::BigDecimal;
use dmr_buffers::{Reader, Writer};
use indexmap::IndexMap;
use num_bigint::BigInt;
use tracing::trace;

use crate::codec;
use crate::error::{DmrError, Result};
use crate::expression::{self, NoProperties, PropertyResolver};
use crate::model_type::ModelType;
use crate::property::Property;
use crate::value::{FormatOptions, ModelValue};
use crate::{FAILURE_DESCRIPTION, OUTCOME, SUCCESS};

/// A node holding exactly one [`ModelValue`].
///
/// Nodes start out UNDEFINED and turn into OBJECT or LIST containers on
/// first keyed or indexed access. Assigning from another node always copies,
/// so two nodes never share children.
///
/// Once [`protect`](ModelNode::protect)ed, a node and all its descendants
/// refuse every mutation with [`DmrError::Protected`]. Clones are never
/// protected.
///
/// Nodes are not synchronized; share them across threads only behind your
/// own lock.
#[derive(Debug, Default)]
pub struct ModelNode {
    value: ModelValue,
    protected: bool,
    tags: IndexMap<String, String>,
}

impl ModelNode {
    /// Creates an UNDEFINED node.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(value: ModelValue) -> Self {
        Self {
            value,
            protected: false,
            tags: IndexMap::new(),
        }
    }

    pub fn empty_list() -> Self {
        Self::from_value(ModelValue::List(Vec::new()))
    }

    pub fn empty_object() -> Self {
        Self::from_value(ModelValue::Object(IndexMap::new()))
    }

    pub fn model_type(&self) -> ModelType {
        self.value.model_type()
    }

    pub fn is_defined(&self) -> bool {
        self.value.is_defined()
    }

    pub fn value(&self) -> &ModelValue {
        &self.value
    }

    pub fn into_value(self) -> ModelValue {
        self.value
    }

    // ----------------------------------------------------------------
    // Protection

    pub fn is_protected(&self) -> bool {
        self.protected
    }

    /// Freezes this node and every current descendant. Idempotent.
    pub fn protect(&mut self) {
        if self.protected {
            return;
        }
        self.protected = true;
        match &mut self.value {
            ModelValue::List(list) => list.iter_mut().for_each(ModelNode::protect),
            ModelValue::Object(map) => map.values_mut().for_each(ModelNode::protect),
            ModelValue::Property(p) => p.value_mut().protect(),
            _ => {}
        }
    }

    fn check_protect(&self) -> Result<()> {
        if self.protected {
            Err(DmrError::Protected)
        } else {
            Ok(())
        }
    }

    // ----------------------------------------------------------------
    // Navigation

    /// Returns the named child, creating it when absent.
    ///
    /// An UNDEFINED node becomes an empty OBJECT first. A PROPERTY node
    /// yields its value when `name` matches the property name. Any other
    /// type fails with [`DmrError::NotIndexable`]. A protected node hands out
    /// no mutable children at all; read it through [`child`](ModelNode::child).
    pub fn get(&mut self, name: &str) -> Result<&mut ModelNode> {
        self.check_protect()?;
        if !self.is_defined() {
            trace!(key = name, "promoting undefined node to object");
            self.value = ModelValue::Object(IndexMap::new());
        }
        let kind = self.value.model_type();
        match &mut self.value {
            ModelValue::Object(map) => Ok(map.entry(name.to_owned()).or_default()),
            ModelValue::Property(p) if p.name() == name => Ok(p.value_mut()),
            _ => Err(DmrError::NotIndexable { kind, by: "name" }),
        }
    }

    /// Returns the child at `index`, padding the list with UNDEFINED nodes
    /// up to and including `index`.
    ///
    /// An UNDEFINED node becomes an empty LIST first. A PROPERTY node yields
    /// its value for index 0.
    pub fn get_index(&mut self, index: usize) -> Result<&mut ModelNode> {
        self.check_protect()?;
        if !self.is_defined() {
            trace!(index, "promoting undefined node to list");
            self.value = ModelValue::List(Vec::new());
        }
        let kind = self.value.model_type();
        match &mut self.value {
            ModelValue::List(list) => {
                if index >= list.len() {
                    list.resize_with(index + 1, ModelNode::new);
                }
                Ok(&mut list[index])
            }
            ModelValue::Property(p) if index == 0 => Ok(p.value_mut()),
            _ => Err(DmrError::NotIndexable { kind, by: "index" }),
        }
    }

    /// Walks `names` with [`get`](ModelNode::get), creating every missing
    /// level.
    pub fn get_path(&mut self, names: &[&str]) -> Result<&mut ModelNode> {
        let mut current = self;
        for name in names {
            current = current.get(name)?;
        }
        Ok(current)
    }

    /// Read-only lookup that never creates anything.
    pub fn child(&self, name: &str) -> Option<&ModelNode> {
        match &self.value {
            ModelValue::Object(map) => map.get(name),
            ModelValue::Property(p) if p.name() == name => Some(p.value()),
            _ => None,
        }
    }

    pub fn child_index(&self, index: usize) -> Option<&ModelNode> {
        match &self.value {
            ModelValue::List(list) => list.get(index),
            ModelValue::Property(p) if index == 0 => Some(p.value()),
            _ => None,
        }
    }

    pub fn require(&self, name: &str) -> Result<&ModelNode> {
        self.child(name)
            .ok_or_else(|| DmrError::NoSuchKey(name.to_owned()))
    }

    pub fn require_index(&self, index: usize) -> Result<&ModelNode> {
        self.child_index(index)
            .ok_or(DmrError::NoSuchIndex(index))
    }

    /// Removes a child of an OBJECT node, keeping the order of the others.
    pub fn remove(&mut self, name: &str) -> Result<Option<ModelNode>> {
        self.check_protect()?;
        match &mut self.value {
            ModelValue::Object(map) => Ok(map.shift_remove(name)),
            other => Err(DmrError::NotIndexable {
                kind: other.model_type(),
                by: "name",
            }),
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.child(key).is_some()
    }

    pub fn has_index(&self, index: usize) -> bool {
        self.child_index(index).is_some()
    }

    pub fn has_defined(&self, key: &str) -> bool {
        self.child(key).is_some_and(ModelNode::is_defined)
    }

    pub fn has_defined_index(&self, index: usize) -> bool {
        self.child_index(index).is_some_and(ModelNode::is_defined)
    }

    pub fn keys(&self) -> Result<Vec<String>> {
        self.value.keys()
    }

    // ----------------------------------------------------------------
    // Mutation

    /// Replaces the value. Nodes, slices and byte buffers are copied.
    ///
    /// ```
    /// use dmr::{ModelNode, ModelType};
    ///
    /// let mut node = ModelNode::new();
    /// node.set(5i64).unwrap();
    /// assert_eq!(node.model_type(), ModelType::Long);
    /// node.set("text").unwrap();
    /// assert_eq!(node.as_string(), "text");
    /// ```
    pub fn set<V: Into<ModelValue>>(&mut self, value: V) -> Result<&mut Self> {
        self.check_protect()?;
        self.value = value.into();
        Ok(self)
    }

    pub fn set_expression(&mut self, expression: impl Into<String>) -> Result<&mut Self> {
        self.set(ModelValue::Expression(expression.into()))
    }

    pub fn set_property<V: Into<ModelValue>>(
        &mut self,
        name: impl Into<String>,
        value: V,
    ) -> Result<&mut Self> {
        let property = Property::shared(name, ModelNode::from_value(value.into()));
        self.set(property)
    }

    pub fn set_expression_property(
        &mut self,
        name: impl Into<String>,
        expression: impl Into<String>,
    ) -> Result<&mut Self> {
        self.set_property(name, ModelValue::Expression(expression.into()))
    }

    pub fn set_empty_list(&mut self) -> Result<&mut Self> {
        self.set(ModelValue::List(Vec::new()))
    }

    pub fn set_empty_object(&mut self) -> Result<&mut Self> {
        self.set(ModelValue::Object(IndexMap::new()))
    }

    /// Resets the node to UNDEFINED.
    pub fn clear(&mut self) -> Result<&mut Self> {
        self.set(ModelValue::Undefined)
    }

    /// Appends a new UNDEFINED child and returns it. An UNDEFINED node
    /// becomes an empty LIST first.
    pub fn add_node(&mut self) -> Result<&mut ModelNode> {
        self.check_protect()?;
        if !self.is_defined() {
            self.value = ModelValue::List(Vec::new());
        }
        let kind = self.value.model_type();
        match &mut self.value {
            ModelValue::List(list) => {
                let index = list.len();
                list.push(ModelNode::new());
                Ok(&mut list[index])
            }
            _ => Err(DmrError::NotIndexable { kind, by: "append" }),
        }
    }

    /// Appends `value` to the list.
    pub fn add<V: Into<ModelValue>>(&mut self, value: V) -> Result<&mut Self> {
        self.add_node()?.value = value.into();
        Ok(self)
    }

    pub fn add_property<V: Into<ModelValue>>(
        &mut self,
        name: impl Into<String>,
        value: V,
    ) -> Result<&mut Self> {
        self.add_node()?.set_property(name, value)?;
        Ok(self)
    }

    pub fn add_expression(&mut self, expression: impl Into<String>) -> Result<&mut Self> {
        self.add(ModelValue::Expression(expression.into()))
    }

    pub fn add_empty_list(&mut self) -> Result<&mut ModelNode> {
        let node = self.add_node()?;
        node.value = ModelValue::List(Vec::new());
        Ok(node)
    }

    pub fn add_empty_object(&mut self) -> Result<&mut ModelNode> {
        let node = self.add_node()?;
        node.value = ModelValue::Object(IndexMap::new());
        Ok(node)
    }

    // ----------------------------------------------------------------
    // Conversions

    pub fn as_long(&self) -> Result<i64> {
        self.value.as_long()
    }

    pub fn as_long_or(&self, default: i64) -> i64 {
        self.value.as_long_or(default)
    }

    pub fn as_int(&self) -> Result<i32> {
        self.value.as_int()
    }

    pub fn as_int_or(&self, default: i32) -> i32 {
        self.value.as_int_or(default)
    }

    pub fn as_boolean(&self) -> Result<bool> {
        self.value.as_boolean()
    }

    pub fn as_boolean_or(&self, default: bool) -> bool {
        self.value.as_boolean_or(default)
    }

    pub fn as_double(&self) -> Result<f64> {
        self.value.as_double()
    }

    pub fn as_double_or(&self, default: f64) -> f64 {
        self.value.as_double_or(default)
    }

    pub fn as_string(&self) -> String {
        self.value.as_string()
    }

    pub fn as_string_or(&self, default: &str) -> String {
        self.value.as_string_or(default)
    }

    pub fn as_big_integer(&self) -> Result<BigInt> {
        self.value.as_big_integer()
    }

    pub fn as_big_decimal(&self) -> Result<BigDecimal> {
        self.value.as_big_decimal()
    }

    pub fn as_bytes(&self) -> Result<Vec<u8>> {
        self.value.as_bytes()
    }

    pub fn as_type(&self) -> Result<ModelType> {
        self.value.as_type()
    }

    pub fn as_property(&self) -> Result<Property> {
        self.value.as_property()
    }

    pub fn as_property_list(&self) -> Result<Vec<Property>> {
        self.value.as_property_list()
    }

    pub fn as_object(&self) -> Result<ModelNode> {
        self.value.as_object()
    }

    pub fn as_list(&self) -> Result<Vec<ModelNode>> {
        self.value.as_list()
    }

    // ----------------------------------------------------------------
    // Copies

    /// Same as `clone()`: a deep, unprotected copy including tags.
    pub fn copy(&self) -> ModelNode {
        self.clone()
    }

    /// Deep copy with every EXPRESSION replaced by a STRING. No properties
    /// are known, so only defaults and the separators take effect.
    pub fn resolve(&self) -> ModelNode {
        self.resolve_with(&NoProperties)
    }

    /// Deep copy with every EXPRESSION evaluated against `resolver`.
    pub fn resolve_with(&self, resolver: &dyn PropertyResolver) -> ModelNode {
        let value = match &self.value {
            ModelValue::Expression(s) => {
                ModelValue::String(expression::replace_properties(s, resolver))
            }
            ModelValue::List(list) => {
                ModelValue::List(list.iter().map(|n| n.resolve_with(resolver)).collect())
            }
            ModelValue::Object(map) => ModelValue::Object(
                map.iter()
                    .map(|(k, n)| (k.clone(), n.resolve_with(resolver)))
                    .collect(),
            ),
            ModelValue::Property(p) => ModelValue::Property(Property::shared(
                p.name(),
                p.value().resolve_with(resolver),
            )),
            other => other.clone(),
        };
        ModelNode::from_value(value)
    }

    // ----------------------------------------------------------------
    // Text and JSON

    pub fn format(&self, options: &FormatOptions) -> String {
        self.value.format(options)
    }

    pub fn to_json_string(&self, compact: bool) -> String {
        self.value.to_json_string(compact)
    }

    pub fn from_json_str(json: &str) -> Result<ModelNode> {
        Ok(codec::json::decode_str(json)?)
    }

    pub fn from_json_value(json: &serde_json::Value) -> Result<ModelNode> {
        Ok(codec::json::decode_value(json)?)
    }

    // ----------------------------------------------------------------
    // Binary

    /// Writes the type tag and payload of this node.
    pub fn write_external(&self, writer: &mut Writer) -> Result<()> {
        Ok(codec::binary::write_node(writer, self)?)
    }

    /// Replaces this node's value with one read from `reader`.
    pub fn read_external(&mut self, reader: &mut Reader<'_>) -> Result<()> {
        self.check_protect()?;
        self.value = codec::binary::read_node(reader)?.value;
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(codec::binary::encode(self)?)
    }

    /// Decodes exactly one node; trailing bytes are an error.
    pub fn from_bytes(bytes: &[u8]) -> Result<ModelNode> {
        Ok(codec::binary::decode(bytes)?)
    }

    pub fn to_base64_string(&self) -> Result<String> {
        Ok(codec::base64::encode(self)?)
    }

    /// Decodes a base64 envelope. Whitespace and line breaks are ignored.
    pub fn from_base64(encoded: &str) -> Result<ModelNode> {
        Ok(codec::base64::decode(encoded)?)
    }

    // ----------------------------------------------------------------
    // Responses

    /// `true` when the node carries an `outcome` other than `success`.
    pub fn is_failure(&self) -> bool {
        self.child(OUTCOME)
            .is_some_and(|outcome| outcome.is_defined() && outcome.as_string() != SUCCESS)
    }

    pub fn failure_description(&self) -> String {
        match self.child(FAILURE_DESCRIPTION) {
            Some(description) if description.is_defined() => {
                description.format(&FormatOptions::default())
            }
            _ => "No failure-description provided".to_owned(),
        }
    }

    // ----------------------------------------------------------------
    // Tags

    /// Attaches out-of-band metadata. Tags are copied by `clone()` but are
    /// neither serialized nor compared.
    pub fn set_tag(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn tags(&self) -> &IndexMap<String, String> {
        &self.tags
    }
}

impl Clone for ModelNode {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            protected: false,
            tags: self.tags.clone(),
        }
    }
}

impl PartialEq for ModelNode {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for ModelNode {}

impl Hash for ModelNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl From<ModelValue> for ModelNode {
    fn from(value: ModelValue) -> Self {
        ModelNode::from_value(value)
    }
}

impl fmt::Display for ModelNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.value, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_autovivifies_objects() {
        let mut node = ModelNode::new();
        node.get("a").unwrap().get("b").unwrap();
        assert_eq!(node.model_type(), ModelType::Object);
        assert_eq!(node.child("a").unwrap().model_type(), ModelType::Object);
        let leaf = node.child("a").and_then(|a| a.child("b")).unwrap();
        assert!(!leaf.is_defined());
    }

    #[test]
    fn get_index_pads_lists() {
        let mut node = ModelNode::new();
        node.get_index(5).unwrap().set(1).unwrap();
        assert_eq!(node.model_type(), ModelType::List);
        assert_eq!(node.as_int().unwrap(), 6);
        for i in 0..5 {
            assert!(!node.child_index(i).unwrap().is_defined());
        }
        assert!(node.has_defined_index(5));
    }

    #[test]
    fn get_on_scalar_fails() {
        let mut node = ModelNode::from(1);
        assert!(matches!(
            node.get("a"),
            Err(DmrError::NotIndexable { kind: ModelType::Int, .. })
        ));
        assert!(node.get_index(0).is_err());
        assert!(node.add(1).is_err());
    }

    #[test]
    fn property_answers_to_its_own_name() {
        let mut node = ModelNode::new();
        node.set_property("p", 3).unwrap();
        assert_eq!(node.get("p").unwrap().as_int().unwrap(), 3);
        assert_eq!(node.get_index(0).unwrap().as_int().unwrap(), 3);
        assert!(node.get("q").is_err());
        assert!(node.has("p"));
        assert_eq!(node.keys().unwrap(), vec!["p"]);
    }

    #[test]
    fn require_does_not_create() {
        let node = ModelNode::new();
        assert!(matches!(node.require("x"), Err(DmrError::NoSuchKey(k)) if k == "x"));
        assert!(matches!(node.require_index(2), Err(DmrError::NoSuchIndex(2))));
        assert!(!node.is_defined());
    }

    #[test]
    fn set_copies_nodes() {
        let mut source = ModelNode::new();
        source.get("x").unwrap().set(1).unwrap();
        let mut target = ModelNode::new();
        target.set(&source).unwrap();
        source.get("x").unwrap().set(2).unwrap();
        assert_eq!(target.child("x").unwrap().as_int().unwrap(), 1);
    }

    #[test]
    fn protect_is_deep() {
        let mut node = ModelNode::new();
        node.get("a").unwrap().add(1).unwrap();
        node.protect();
        assert!(matches!(node.set(1), Err(DmrError::Protected)));
        assert!(matches!(node.get("new"), Err(DmrError::Protected)));
        assert!(matches!(node.get("a"), Err(DmrError::Protected)));
        assert!(matches!(node.get_index(0), Err(DmrError::Protected)));
        assert!(matches!(node.remove("a"), Err(DmrError::Protected)));
        let a = node.child("a").unwrap();
        assert!(a.is_protected());
        assert!(a.child_index(0).unwrap().is_protected());
        assert_eq!(node.child("a").unwrap().as_int().unwrap(), 1);

        let mut copy = node.clone();
        assert!(!copy.is_protected());
        copy.get("a").unwrap().add(2).unwrap();
        assert_eq!(copy.child("a").unwrap().as_int().unwrap(), 2);
    }

    #[test]
    fn protected_children_stay_frozen() {
        let mut node = ModelNode::new();
        node.get_path(&["a", "b"]).unwrap().set(1).unwrap();
        node.get("l").unwrap().add("x").unwrap();
        node.protect();
        assert!(matches!(node.get_path(&["a", "b"]), Err(DmrError::Protected)));
        assert!(matches!(node.get("l"), Err(DmrError::Protected)));
        assert!(matches!(node.add_node(), Err(DmrError::Protected)));
        assert_eq!(node.require("a").unwrap().require("b").unwrap().as_int().unwrap(), 1);
        assert_eq!(node.child("l").unwrap().child_index(0).unwrap().as_string(), "x");
    }

    #[test]
    fn remove_keeps_order() {
        let mut node = ModelNode::new();
        for key in ["z", "a", "m"] {
            node.get(key).unwrap().set(key).unwrap();
        }
        let removed = node.remove("a").unwrap().unwrap();
        assert_eq!(removed.as_string(), "a");
        assert_eq!(node.keys().unwrap(), vec!["z", "m"]);
        assert!(node.remove("missing").unwrap().is_none());
    }

    #[test]
    fn add_helpers() {
        let mut node = ModelNode::new();
        node.add("a").unwrap().add_property("k", 1).unwrap();
        node.add_empty_object().unwrap().get("x").unwrap().set(true).unwrap();
        node.add_empty_list().unwrap().add(1i64).unwrap();
        node.add_expression("${e}").unwrap();
        assert_eq!(node.as_int().unwrap(), 5);
        assert_eq!(
            node.child_index(1).unwrap().model_type(),
            ModelType::Property
        );
        assert_eq!(
            node.child_index(4).unwrap().model_type(),
            ModelType::Expression
        );
    }

    #[test]
    fn tags_follow_clones_but_not_equality() {
        let mut node = ModelNode::from(1);
        node.set_tag("origin", "test");
        let copy = node.clone();
        assert_eq!(copy.tag("origin"), Some("test"));
        assert_eq!(node, ModelNode::from(1));
    }

    #[test]
    fn resolve_replaces_expressions() {
        let mut node = ModelNode::new();
        node.get("a").unwrap().set_expression("${missing:fallback}").unwrap();
        node.get("b").unwrap().add_expression("x${/}y").unwrap();
        let resolved = node.resolve();
        assert_eq!(resolved.child("a").unwrap().value(), &ModelValue::from("fallback"));
        assert_eq!(
            resolved.child("b").unwrap().child_index(0).unwrap().as_string(),
            format!("x{}y", std::path::MAIN_SEPARATOR)
        );
        assert_eq!(node.child("a").unwrap().model_type(), ModelType::Expression);
    }

    #[test]
    fn failure_contract() {
        let mut ok = ModelNode::new();
        ok.get(OUTCOME).unwrap().set(SUCCESS).unwrap();
        assert!(!ok.is_failure());
        assert!(!ModelNode::new().is_failure());

        let mut failed = ModelNode::new();
        failed.get(OUTCOME).unwrap().set("failed").unwrap();
        assert!(failed.is_failure());
        assert_eq!(failed.failure_description(), "No failure-description provided");
        failed.get(FAILURE_DESCRIPTION).unwrap().set("boom").unwrap();
        assert_eq!(failed.failure_description(), "\"boom\"");
    }
}
