use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{DmrError, Result};
use crate::node::ModelNode;
use crate::property::Property;
use crate::NAME;

static NEXT_UID: AtomicU64 = AtomicU64::new(1);

fn next_uid() -> String {
    format!("hal-uid-{}", NEXT_UID.fetch_add(1, Ordering::Relaxed))
}

/// A [`ModelNode`] with an identity name, used for rows of resource
/// listings.
///
/// The name is mirrored into the node's own `name` attribute, so the node
/// must be an OBJECT (or UNDEFINED, which becomes one).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedNode {
    name: String,
    node: ModelNode,
}

impl NamedNode {
    /// Takes the name from the node's `name` attribute, or synthesizes a
    /// unique `hal-uid-N` when there is none.
    pub fn new(node: ModelNode) -> Result<Self> {
        let name = match node.child(NAME) {
            Some(name) if name.is_defined() => name.as_string(),
            _ => next_uid(),
        };
        Self::with_name(name, node)
    }

    pub fn with_name(name: impl Into<String>, mut node: ModelNode) -> Result<Self> {
        let name = name.into();
        node.get(NAME)?.set(name.as_str())?;
        Ok(Self { name, node })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames both the held name and the `name` attribute.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        self.node.get(NAME)?.set(name.as_str())?;
        self.name = name;
        Ok(())
    }

    pub fn as_model_node(&self) -> &ModelNode {
        &self.node
    }

    pub fn into_model_node(self) -> ModelNode {
        self.node
    }
}

impl TryFrom<Property> for NamedNode {
    type Error = DmrError;

    fn try_from(property: Property) -> Result<Self> {
        let (name, node) = property.into_parts();
        Self::with_name(name, node)
    }
}

impl Deref for NamedNode {
    type Target = ModelNode;

    fn deref(&self) -> &ModelNode {
        &self.node
    }
}

impl DerefMut for NamedNode {
    fn deref_mut(&mut self) -> &mut ModelNode {
        &mut self.node
    }
}

/// Turns a property list (for example a `read-children-resources` result)
/// into named rows.
pub fn as_named_nodes(properties: Vec<Property>) -> Result<Vec<NamedNode>> {
    properties.into_iter().map(NamedNode::try_from).collect()
}
