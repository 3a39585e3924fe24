//! Batched operations and their per-step results.

use std::ops::Deref;

use crate::address::ResourceAddress;
use crate::error::Result;
use crate::node::ModelNode;
use crate::operation::Operation;
use crate::value::ModelValue;
use crate::{COMPOSITE, STEPS};

/// A `composite` operation whose `steps` parameter lists its child
/// operations in order.
///
/// The child operations and the `steps` list always have the same length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composite {
    operation: Operation,
    steps: Vec<Operation>,
}

impl Composite {
    pub fn new<I>(first: Operation, rest: I) -> Result<Self>
    where
        I: IntoIterator<Item = Operation>,
    {
        let mut composite = Self::empty();
        composite.add(first)?;
        for op in rest {
            composite.add(op)?;
        }
        Ok(composite)
    }

    /// A composite with no steps yet.
    pub fn empty() -> Self {
        let mut operation = Operation::bare(COMPOSITE, ResourceAddress::root());
        if let Ok(steps) = operation.node_mut().get(STEPS) {
            *steps = ModelNode::empty_list();
        }
        Self {
            operation,
            steps: Vec::new(),
        }
    }

    /// Appends `op` to both the step list and the `steps` parameter.
    pub fn add(&mut self, op: Operation) -> Result<&mut Self> {
        self.operation
            .node_mut()
            .get(STEPS)?
            .add(op.as_model_node())?;
        self.steps.push(op);
        Ok(self)
    }

    pub fn size(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.steps.iter()
    }

    /// Copy with every step run as `roles`.
    pub fn run_as<S>(&self, roles: &[S]) -> Result<Composite>
    where
        S: AsRef<str>,
    {
        let mut composite = Self::empty();
        for op in &self.steps {
            composite.add(op.run_as(roles.iter().map(|r| r.as_ref().to_owned()))?)?;
        }
        Ok(composite)
    }

    /// The CLI form of every step, one per line.
    pub fn as_cli(&self) -> String {
        self.steps
            .iter()
            .map(Operation::as_cli)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn as_operation(&self) -> &Operation {
        &self.operation
    }
}

impl Deref for Composite {
    type Target = Operation;

    fn deref(&self) -> &Operation {
        &self.operation
    }
}

impl<'a> IntoIterator for &'a Composite {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

/// Read-only view over a composite response's `step-1`, `step-2`, ...
/// entries. Steps are numbered from one on the wire and from zero here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeResult {
    result: ModelNode,
    undefined: ModelNode,
}

impl CompositeResult {
    pub fn new(result: &ModelNode) -> Self {
        Self {
            result: result.clone(),
            undefined: ModelNode::new(),
        }
    }

    /// The result of the step at zero-based `index`, or an UNDEFINED node.
    pub fn step(&self, index: usize) -> &ModelNode {
        index
            .checked_add(1)
            .map_or(&self.undefined, |n| self.step_named(&format!("step-{n}")))
    }

    /// The result stored under `name` (e.g. `"step-2"`), or an UNDEFINED
    /// node.
    pub fn step_named(&self, name: &str) -> &ModelNode {
        self.result.child(name).unwrap_or(&self.undefined)
    }

    pub fn size(&self) -> usize {
        match self.result.value() {
            ModelValue::Object(map) => map.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Step results in response order.
    pub fn iter(&self) -> impl Iterator<Item = &ModelNode> {
        let steps = match self.result.value() {
            ModelValue::Object(map) => Some(map.values()),
            _ => None,
        };
        steps.into_iter().flatten()
    }

    pub fn as_model_node(&self) -> &ModelNode {
        &self.result
    }
}
