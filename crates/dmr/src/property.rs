use crate::node::ModelNode;

/// An immutable `(name, value)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Property {
    name: String,
    value: Box<ModelNode>,
}

impl Property {
    /// Creates a property holding a deep copy of `value`.
    pub fn new(name: impl Into<String>, value: &ModelNode) -> Self {
        Self::shared(name, value.clone())
    }

    /// Creates a property that takes `value` as-is, without copying it.
    pub fn shared(name: impl Into<String>, value: ModelNode) -> Self {
        Self {
            name: name.into(),
            value: Box::new(value),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &ModelNode {
        &self.value
    }

    pub(crate) fn value_mut(&mut self) -> &mut ModelNode {
        &mut self.value
    }

    pub fn into_parts(self) -> (String, ModelNode) {
        (self.name, *self.value)
    }
}
