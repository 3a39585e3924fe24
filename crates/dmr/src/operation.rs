//! Management operation requests.

use std::fmt;
use std::ops::Deref;

use indexmap::{IndexMap, IndexSet};

use crate::address::ResourceAddress;
use crate::error::{DmrError, Result};
use crate::model_type::ModelType;
use crate::node::ModelNode;
use crate::value::ModelValue;
use crate::{ADDRESS, OP, OPERATION_HEADERS, RESOLVE_EXPRESSION, ROLES, WHOAMI};

/// A request node shaped as
/// `{<parameters...>, "operation": name, "address": [...], "operation-headers": {...}}`.
///
/// Name, address, parameters, headers and run-as roles are also kept apart
/// so they can be read back without picking the node apart again.
///
/// ```
/// use dmr::{Operation, ResourceAddress};
///
/// let address = "/subsystem=logging".parse::<ResourceAddress>().unwrap();
/// let op = Operation::builder(address, "read-attribute")
///     .param("name", "level")
///     .build()
///     .unwrap();
/// assert_eq!(op.as_cli(), "/subsystem=logging:read-attribute(name=level)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    name: String,
    address: ResourceAddress,
    parameter: ModelNode,
    header: ModelNode,
    roles: IndexSet<String>,
    node: ModelNode,
}

impl Operation {
    pub fn builder(address: ResourceAddress, name: impl Into<String>) -> OperationBuilder {
        OperationBuilder::new(address, name)
    }

    /// Splits an arbitrary request node into name, address, parameters and
    /// headers. The node itself is kept as-is.
    pub fn from_node(node: &ModelNode) -> Result<Self> {
        match node.model_type() {
            ModelType::Object | ModelType::Undefined => {}
            kind => return Err(DmrError::NotIndexable { kind, by: "name" }),
        }
        let name = node.child(OP).map(ModelNode::as_string).unwrap_or_default();
        let address = match node.child(ADDRESS) {
            Some(address) => ResourceAddress::from_node(address)?,
            None => ResourceAddress::root(),
        };
        let mut parameter = node.clone();
        if parameter.is_defined() {
            for key in [OP, ADDRESS, OPERATION_HEADERS] {
                parameter.remove(key)?;
            }
        }
        let header = match node.child(OPERATION_HEADERS) {
            Some(header) if header.is_defined() => header.clone(),
            _ => ModelNode::new(),
        };
        let roles = read_roles(&header);
        Ok(Self {
            name,
            address,
            parameter,
            header,
            roles,
            node: node.clone(),
        })
    }

    /// The parameter node is copied into the request first, so a payload
    /// that is neither OBJECT nor UNDEFINED cannot be assembled.
    fn assemble(
        name: String,
        address: ResourceAddress,
        parameter: ModelNode,
        mut header: ModelNode,
        roles: IndexSet<String>,
    ) -> Result<Self> {
        if !roles.is_empty() && name != WHOAMI {
            let slot = header.get(ROLES)?;
            match roles.first() {
                Some(role) if roles.len() == 1 => {
                    slot.set(role.as_str())?;
                }
                _ => {
                    slot.set_empty_list()?;
                    for role in &roles {
                        slot.add(role.as_str())?;
                    }
                }
            }
        }
        let mut node = parameter.clone();
        node.get(OP)?.set(name.as_str())?;
        node.get(ADDRESS)?.set(&address)?;
        if header.is_defined() {
            node.get(OPERATION_HEADERS)?.set(&header)?;
        }
        Ok(Self {
            name,
            address,
            parameter,
            header,
            roles,
            node,
        })
    }

    /// An operation without parameters or headers.
    pub(crate) fn bare(name: &str, address: ResourceAddress) -> Self {
        let mut map = IndexMap::with_capacity(2);
        map.insert(OP.to_owned(), ModelNode::from(name));
        map.insert(ADDRESS.to_owned(), ModelNode::from_value(ModelValue::from(&address)));
        Self {
            name: name.to_owned(),
            address,
            parameter: ModelNode::new(),
            header: ModelNode::new(),
            roles: IndexSet::new(),
            node: ModelNode::from_value(ModelValue::Object(map)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &ResourceAddress {
        &self.address
    }

    pub fn parameter(&self) -> &ModelNode {
        &self.parameter
    }

    pub fn header(&self) -> &ModelNode {
        &self.header
    }

    pub fn roles(&self) -> &IndexSet<String> {
        &self.roles
    }

    pub fn has_parameter(&self) -> bool {
        self.parameter
            .as_list()
            .is_ok_and(|parameters| !parameters.is_empty())
    }

    /// Copy of this operation executed on behalf of `roles`.
    pub fn run_as<I, S>(&self, roles: I) -> Result<Operation>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::assemble(
            self.name.clone(),
            self.address.clone(),
            self.parameter.clone(),
            self.header.clone(),
            roles.into_iter().map(Into::into).collect(),
        )
    }

    /// The JBoss CLI form, e.g. `/a=b:op(p=v){h=v}`.
    pub fn as_cli(&self) -> String {
        let mut cli = String::new();
        if !self.address.is_empty() {
            cli.push_str(&self.address.to_string());
        }
        cli.push(':');
        cli.push_str(&self.name);
        if self.has_parameter() {
            push_pairs(&mut cli, &self.parameter, ('(', ')'));
        }
        if self.header.as_list().is_ok_and(|headers| !headers.is_empty()) {
            push_pairs(&mut cli, &self.header, ('{', '}'));
        }
        cli
    }

    pub fn as_model_node(&self) -> &ModelNode {
        &self.node
    }

    pub fn into_model_node(self) -> ModelNode {
        self.node
    }

    pub(crate) fn node_mut(&mut self) -> &mut ModelNode {
        &mut self.node
    }
}

fn read_roles(header: &ModelNode) -> IndexSet<String> {
    match header.child(ROLES).map(ModelNode::value) {
        Some(ModelValue::List(list)) => list.iter().map(ModelNode::as_string).collect(),
        Some(ModelValue::String(role)) => IndexSet::from([role.clone()]),
        _ => IndexSet::new(),
    }
}

fn push_pairs(cli: &mut String, node: &ModelNode, (open, close): (char, char)) {
    cli.push(open);
    let pairs = node.as_property_list().unwrap_or_default();
    for (i, p) in pairs.iter().enumerate() {
        if i > 0 {
            cli.push(',');
        }
        cli.push_str(p.name());
        cli.push('=');
        cli.push_str(&p.value().as_string());
    }
    cli.push(close);
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_cli())
    }
}

impl Deref for Operation {
    type Target = ModelNode;

    fn deref(&self) -> &ModelNode {
        &self.node
    }
}

impl AsRef<ModelNode> for Operation {
    fn as_ref(&self) -> &ModelNode {
        &self.node
    }
}

// ----------------------------------------------------------------
// Builder

/// Collects parameters, headers and roles for an [`Operation`].
///
/// Every method consumes and returns the builder. The first failure is
/// remembered and reported by [`build`](OperationBuilder::build).
#[derive(Debug)]
pub struct OperationBuilder {
    name: String,
    address: ResourceAddress,
    parameter: ModelNode,
    header: ModelNode,
    roles: IndexSet<String>,
    error: Option<DmrError>,
}

impl OperationBuilder {
    pub fn new(address: ResourceAddress, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address,
            parameter: ModelNode::new(),
            header: ModelNode::new(),
            roles: IndexSet::new(),
            error: None,
        }
    }

    fn update<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        if self.error.is_none() {
            if let Err(err) = f(&mut self) {
                self.error = Some(err);
            }
        }
        self
    }

    pub fn param<V: Into<ModelValue>>(self, name: &str, value: V) -> Self {
        let value = value.into();
        self.update(|b| {
            b.parameter.get(name)?.set(value)?;
            Ok(())
        })
    }

    /// Appends each value to the LIST parameter `name`.
    pub fn param_list<I, V>(self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ModelValue>,
    {
        self.update(|b| {
            for value in values {
                b.parameter.get(name)?.add(value)?;
            }
            Ok(())
        })
    }

    /// Sets the parameter `name` to a copy of `value`.
    pub fn param_node(self, name: &str, value: &ModelNode) -> Self {
        self.param(name, value)
    }

    pub fn header<V: Into<ModelValue>>(self, name: &str, value: V) -> Self {
        let value = value.into();
        self.update(|b| {
            b.header.get(name)?.set(value)?;
            Ok(())
        })
    }

    /// Replaces all parameters collected so far with `payload`.
    pub fn payload(mut self, payload: ModelNode) -> Self {
        self.parameter = payload;
        self
    }

    pub fn run_as<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    /// Asks the server to resolve expressions in the result.
    pub fn resolve_expressions(self) -> Self {
        self.param(RESOLVE_EXPRESSION, true)
    }

    pub fn build(self) -> Result<Operation> {
        if let Some(err) = self.error {
            return Err(err);
        }
        Operation::assemble(self.name, self.address, self.parameter, self.header, self.roles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> ResourceAddress {
        "/subsystem=datasources/data-source=ExampleDS".parse().unwrap()
    }

    #[test]
    fn builds_the_wire_shape() {
        let op = Operation::builder(address(), "write-attribute")
            .param("name", "enabled")
            .param("value", true)
            .header("blocking-timeout", 10)
            .build()
            .unwrap();
        let node = op.as_model_node();
        assert_eq!(node.child(OP).unwrap().as_string(), "write-attribute");
        assert_eq!(node.child(ADDRESS).unwrap(), address().as_model_node());
        assert!(node.child("value").unwrap().as_boolean().unwrap());
        assert_eq!(
            node.child(OPERATION_HEADERS).unwrap().child("blocking-timeout").unwrap().as_int().unwrap(),
            10
        );
        assert_eq!(op.parameter().keys().unwrap(), vec!["name", "value"]);
    }

    #[test]
    fn single_role_is_a_string() {
        let op = Operation::builder(ResourceAddress::root(), "read-resource")
            .run_as(["Operator"])
            .build()
            .unwrap();
        let roles = op.child(OPERATION_HEADERS).unwrap().child(ROLES).unwrap();
        assert_eq!(roles.model_type(), ModelType::String);
        assert_eq!(roles.as_string(), "Operator");
    }

    #[test]
    fn several_roles_are_a_list() {
        let op = Operation::builder(ResourceAddress::root(), "read-resource")
            .run_as(["Operator", "Monitor"])
            .build()
            .unwrap();
        let roles = op.child(OPERATION_HEADERS).unwrap().child(ROLES).unwrap();
        assert_eq!(roles.model_type(), ModelType::List);
        assert_eq!(roles.as_int().unwrap(), 2);
    }

    #[test]
    fn whoami_never_gets_roles() {
        let op = Operation::builder(ResourceAddress::root(), WHOAMI)
            .run_as(["Operator"])
            .build()
            .unwrap();
        assert!(!op.has(OPERATION_HEADERS));
        assert_eq!(op.roles().len(), 1);
    }

    #[test]
    fn from_node_separates_reserved_keys() {
        let built = Operation::builder(address(), "add")
            .param("jndi-name", "java:/ds")
            .param_list("tags", ["a", "b"])
            .run_as(["Deployer"])
            .build()
            .unwrap();
        let parsed = Operation::from_node(built.as_model_node()).unwrap();
        assert_eq!(parsed.name(), "add");
        assert_eq!(parsed.address(), &address());
        assert_eq!(parsed.parameter().keys().unwrap(), vec!["jndi-name", "tags"]);
        assert_eq!(parsed.roles().iter().collect::<Vec<_>>(), vec!["Deployer"]);
        assert_eq!(parsed.as_model_node(), built.as_model_node());
    }

    #[test]
    fn from_node_rejects_scalars() {
        assert!(Operation::from_node(&ModelNode::from(1)).is_err());
    }

    #[test]
    fn payload_replaces_parameters() {
        let mut payload = ModelNode::new();
        payload.get("x").unwrap().set(1).unwrap();
        let op = Operation::builder(ResourceAddress::root(), "op")
            .param("dropped", 1)
            .payload(payload)
            .build()
            .unwrap();
        assert!(!op.has("dropped"));
        assert!(op.has("x"));
    }

    #[test]
    fn builder_errors_surface_on_build() {
        let result = Operation::builder(ResourceAddress::root(), "op")
            .payload(ModelNode::from("not an object"))
            .build();
        assert!(matches!(result, Err(DmrError::NotIndexable { .. })));

        let result = Operation::builder(ResourceAddress::root(), "op")
            .param("x", 1)
            .param_list("x", [2])
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn resolve_expressions_flag() {
        let op = Operation::builder(ResourceAddress::root(), "read-resource")
            .resolve_expressions()
            .build()
            .unwrap();
        assert!(op.child(RESOLVE_EXPRESSION).unwrap().as_boolean().unwrap());
    }

    #[test]
    fn cli_form() {
        let op = Operation::builder(address(), "read-resource").build().unwrap();
        assert!(!op.has_parameter());
        assert_eq!(op.to_string(), "/subsystem=datasources/data-source=ExampleDS:read-resource");

        let op = Operation::builder(ResourceAddress::root(), "read-children-names")
            .param("child-type", "subsystem")
            .param("include-singletons", true)
            .header("allow-resource-service-restart", true)
            .build()
            .unwrap();
        assert_eq!(
            op.as_cli(),
            ":read-children-names(child-type=subsystem,include-singletons=true){allow-resource-service-restart=true}"
        );
    }

    #[test]
    fn run_as_replaces_roles() {
        let op = Operation::builder(ResourceAddress::root(), "read-resource")
            .run_as(["A", "B"])
            .build()
            .unwrap();
        let single = op.run_as(["C"]).unwrap();
        let roles = single.child(OPERATION_HEADERS).unwrap().child(ROLES).unwrap();
        assert_eq!(roles.as_string(), "C");
        assert_eq!(op.roles().len(), 2);
    }
}
