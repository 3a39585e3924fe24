//! Lenient lookups and reshaping helpers for response trees.
//!
//! Paths are `/`-separated key lists. Empty segments are skipped, segments
//! are trimmed, and `%2F` inside a segment stands for a literal `/`.

use std::sync::OnceLock;

use indexmap::IndexMap;

use crate::error::Result;
use crate::node::ModelNode;
use crate::property::Property;
use crate::value::ModelValue;
use crate::HAL_INDEX;

const ENCODED_SLASH: &str = "%2F";

fn undefined() -> &'static ModelNode {
    static UNDEFINED: OnceLock<ModelNode> = OnceLock::new();
    UNDEFINED.get_or_init(ModelNode::new)
}

fn path_keys(path: &str) -> Vec<String> {
    path.split('/')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(decode_value)
        .collect()
}

/// Escapes `/` so a value can be used as a single path segment.
pub fn encode_value(value: &str) -> String {
    value.replace('/', ENCODED_SLASH)
}

pub fn decode_value(value: &str) -> String {
    value.replace(ENCODED_SLASH, "/")
}

/// Follows `path` through defined children only. Any miss, or an empty
/// path, yields an UNDEFINED node.
///
/// ```
/// use dmr::helper::fail_safe_get;
/// use dmr::ModelNode;
///
/// let mut node = ModelNode::new();
/// node.get("a").unwrap().get("b").unwrap().set(1).unwrap();
/// assert_eq!(fail_safe_get(&node, "a/b").as_int().unwrap(), 1);
/// assert!(!fail_safe_get(&node, "a/x/y").is_defined());
/// ```
pub fn fail_safe_get<'a>(node: &'a ModelNode, path: &str) -> &'a ModelNode {
    let keys = path_keys(path);
    if keys.is_empty() {
        return undefined();
    }
    let mut context = node;
    for key in &keys {
        match context.child(key) {
            Some(child) if child.is_defined() => context = child,
            _ => return undefined(),
        }
    }
    context
}

/// `false` unless the attribute at `path` is defined and reads as `true`.
pub fn fail_safe_boolean(node: &ModelNode, path: &str) -> bool {
    fail_safe_get(node, path).as_boolean().unwrap_or(false)
}

pub fn fail_safe_list(node: &ModelNode, path: &str) -> Vec<ModelNode> {
    fail_safe_get(node, path).as_list().unwrap_or_default()
}

pub fn fail_safe_property_list(node: &ModelNode, path: &str) -> Vec<Property> {
    fail_safe_get(node, path)
        .as_property_list()
        .unwrap_or_default()
}

/// Builds an OBJECT from alternating keys and values. A trailing key
/// without a value is ignored.
pub fn properties(pairs: &[&str]) -> ModelNode {
    let map: IndexMap<String, ModelNode> = pairs
        .chunks_exact(2)
        .map(|pair| (pair[0].to_owned(), ModelNode::from(pair[1])))
        .collect();
    ModelNode::from_value(ModelValue::Object(map))
}

/// Writes each node's position into its `hal-index` attribute.
pub fn store_index<'a, I>(nodes: I) -> Result<()>
where
    I: IntoIterator<Item = &'a mut ModelNode>,
{
    for (index, node) in nodes.into_iter().enumerate() {
        node.get(HAL_INDEX)?.set(index as i32)?;
    }
    Ok(())
}

/// Moves the defined value at `source` to `destination`, creating the
/// destination path as needed. Nothing happens when the source is missing.
pub fn move_node(node: &mut ModelNode, source: &str, destination: &str) -> Result<()> {
    let source = path_keys(source);
    let destination = path_keys(destination);
    let (Some((last, parents)), Some((dest_last, dest_parents))) =
        (source.split_last(), destination.split_last())
    else {
        return Ok(());
    };

    let mut context = &mut *node;
    for key in parents {
        if !context.has_defined(key) {
            return Ok(());
        }
        context = context.get(key)?;
    }
    if !context.has_defined(last) {
        return Ok(());
    }
    let Some(value) = context.remove(last)? else {
        return Ok(());
    };

    let mut target = node;
    for key in dest_parents {
        target = target.get(key)?;
    }
    target.get(dest_last)?.set(value.into_value())?;
    Ok(())
}

/// Turns dotted keys such as `"a.b"` into nested objects. An already
/// defined nested value wins over the dotted one; the dotted keys are
/// removed either way.
pub fn flat_to_nested(node: &mut ModelNode) -> Result<()> {
    if !node.is_defined() {
        return Ok(());
    }
    let mut dotted: Vec<Property> = node
        .as_property_list()?
        .into_iter()
        .filter(|p| p.name().contains('.'))
        .collect();
    dotted.sort_by(|a, b| b.name().cmp(a.name()));

    for property in &dotted {
        let parts: Vec<&str> = property.name().split('.').collect();
        let nested = node.get_path(&parts)?;
        if !nested.is_defined() {
            nested.set(property.value())?;
        }
    }
    for property in &dotted {
        node.remove(property.name())?;
    }
    Ok(())
}
