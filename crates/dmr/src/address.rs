//! Paths into the managed resource tree.

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use crate::error::{DmrError, Result};
use crate::node::ModelNode;
use crate::property::Property;
use crate::value::ModelValue;

/// An ordered list of `name=value` segments such as
/// `/subsystem=datasources/data-source=ExampleDS`.
///
/// Backed by a LIST node of PROPERTY segments, so it can be embedded in an
/// operation as-is. The root address is the empty list.
///
/// ```
/// use dmr::ResourceAddress;
///
/// let address: ResourceAddress = "/subsystem=undertow/server=default".parse().unwrap();
/// assert_eq!(address.size(), 2);
/// assert_eq!(address.last_name().as_deref(), Some("server"));
/// assert_eq!(address.parent().to_string(), "/subsystem=undertow");
/// assert_eq!(dmr::ResourceAddress::root().to_string(), "");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceAddress {
    node: ModelNode,
}

impl Default for ResourceAddress {
    fn default() -> Self {
        Self::root()
    }
}

impl ResourceAddress {
    /// A fresh empty address. Never shared, so callers may extend it.
    pub fn root() -> Self {
        Self {
            node: ModelNode::empty_list(),
        }
    }

    /// Parses `/name=value/...`. The leading slash is optional and an empty
    /// or whitespace-only string is the root.
    pub fn parse(address: &str) -> Result<Self> {
        let mut parsed = Self::root();
        if address.trim().is_empty() {
            return Ok(parsed);
        }
        let path = address.strip_prefix('/').unwrap_or(address);
        if path.is_empty() {
            return Ok(parsed);
        }
        for part in path.trim_end_matches('/').split('/') {
            let (name, value) =
                split_segment(part).ok_or_else(|| DmrError::MalformedAddress(address.to_owned()))?;
            parsed.add(name, value)?;
        }
        Ok(parsed)
    }

    /// Reads an address out of a response or request node. Segments may be
    /// PROPERTY nodes, single-key OBJECTs or `[name, value]` LISTs; an
    /// OBJECT node is read as one segment per key.
    pub fn from_node(node: &ModelNode) -> Result<Self> {
        let malformed = || DmrError::MalformedAddress(node.to_json_string(true));
        let segments = match node.value() {
            ModelValue::Undefined => Vec::new(),
            ModelValue::List(items) => items
                .iter()
                .map(|item| item.as_property().map_err(|_| malformed()))
                .collect::<Result<Vec<_>>>()?,
            ModelValue::Object(_) | ModelValue::Property(_) => {
                node.as_property_list().map_err(|_| malformed())?
            }
            ModelValue::String(s) => return Self::parse(s),
            _ => return Err(malformed()),
        };
        let mut address = Self::root();
        for segment in segments {
            address.add(segment.name(), segment.value().as_string())?;
        }
        Ok(address)
    }

    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) -> Result<&mut Self> {
        self.node.add_property(name, value.into())?;
        Ok(self)
    }

    /// Appends every segment of `other`.
    pub fn add_address(&mut self, other: &ResourceAddress) -> Result<&mut Self> {
        for (name, value) in other.segments() {
            self.add(name, value)?;
        }
        Ok(self)
    }

    fn properties(&self) -> Vec<Property> {
        self.node.as_property_list().unwrap_or_default()
    }

    /// The segments as owned `(name, value)` pairs, first to last.
    pub fn segments(&self) -> Vec<(String, String)> {
        self.properties()
            .into_iter()
            .map(|p| {
                let (name, value) = p.into_parts();
                (name, value.as_string())
            })
            .collect()
    }

    pub fn first_value(&self) -> Option<String> {
        self.properties().first().map(|p| p.value().as_string())
    }

    pub fn last_name(&self) -> Option<String> {
        self.properties().last().map(|p| p.name().to_owned())
    }

    pub fn last_value(&self) -> Option<String> {
        self.properties().last().map(|p| p.value().as_string())
    }

    /// The address without its last segment. The root is its own parent.
    pub fn parent(&self) -> ResourceAddress {
        let mut segments = self.segments();
        segments.pop();
        Self::from_segments(segments)
    }

    pub fn size(&self) -> usize {
        match self.node.value() {
            ModelValue::List(list) => list.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// `true` when `prefix`'s segments equal the leading segments of `self`.
    pub fn starts_with(&self, prefix: &ResourceAddress) -> bool {
        let (mine, theirs) = (self.segments(), prefix.segments());
        theirs.len() <= mine.len() && mine.iter().zip(&theirs).all(|(a, b)| a == b)
    }

    /// Copy with the value of every segment called `name` replaced.
    pub fn replace_value(&self, name: &str, new_value: &str) -> ResourceAddress {
        Self::from_segments(self.segments().into_iter().map(|(n, v)| {
            if n == name {
                (n, new_value.to_owned())
            } else {
                (n, v)
            }
        }))
    }

    fn from_segments(segments: impl IntoIterator<Item = (String, String)>) -> Self {
        let list = segments
            .into_iter()
            .map(|(name, value)| ModelNode::from(Property::shared(name, ModelNode::from(value))))
            .collect::<Vec<_>>();
        Self {
            node: ModelNode::from_value(ModelValue::List(list)),
        }
    }

    pub fn as_model_node(&self) -> &ModelNode {
        &self.node
    }

    pub fn into_model_node(self) -> ModelNode {
        self.node
    }
}

fn split_segment(part: &str) -> Option<(&str, &str)> {
    let (name, value) = part.split_once('=')?;
    if value.is_empty() || value.contains('=') {
        return None;
    }
    Some((name, value))
}

impl FromStr for ResourceAddress {
    type Err = DmrError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ResourceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.segments() {
            write!(f, "/{name}={value}")?;
        }
        Ok(())
    }
}

impl Deref for ResourceAddress {
    type Target = ModelNode;

    fn deref(&self) -> &ModelNode {
        &self.node
    }
}

impl AsRef<ModelNode> for ResourceAddress {
    fn as_ref(&self) -> &ModelNode {
        &self.node
    }
}

impl From<&ResourceAddress> for ModelValue {
    fn from(address: &ResourceAddress) -> Self {
        address.node.value().clone()
    }
}

impl From<ResourceAddress> for ModelValue {
    fn from(address: ResourceAddress) -> Self {
        address.node.into_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model_type::ModelType;

    fn addr(s: &str) -> ResourceAddress {
        s.parse().unwrap()
    }

    #[test]
    fn parse_forms() {
        assert!(addr("").is_empty());
        assert!(addr("  ").is_empty());
        assert!(addr("/").is_empty());
        assert_eq!(addr("a=b").to_string(), "/a=b");
        assert_eq!(addr("/a=b/c=d").segments(), vec![
            ("a".to_owned(), "b".to_owned()),
            ("c".to_owned(), "d".to_owned()),
        ]);
        assert_eq!(addr("/a=b/").size(), 1);
    }

    #[test]
    fn malformed_parts_are_rejected() {
        for bad in ["/a", "/a=b/c", "/a=b=c", "/a=", "/a=b//c=d"] {
            assert!(
                matches!(ResourceAddress::parse(bad), Err(DmrError::MalformedAddress(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn wire_shape_is_a_list_of_properties() {
        let a = addr("/subsystem=logging");
        assert_eq!(a.model_type(), ModelType::List);
        let segment = a.child_index(0).unwrap().as_property().unwrap();
        assert_eq!(segment.name(), "subsystem");
        assert_eq!(segment.value().as_string(), "logging");
    }

    #[test]
    fn accessors() {
        let a = addr("/subsystem=ds/data-source=Example");
        assert_eq!(a.first_value().as_deref(), Some("ds"));
        assert_eq!(a.last_name().as_deref(), Some("data-source"));
        assert_eq!(a.last_value().as_deref(), Some("Example"));
        assert_eq!(ResourceAddress::root().last_name(), None);
    }

    #[test]
    fn parent_of_root_is_root() {
        assert_eq!(ResourceAddress::root().parent(), ResourceAddress::root());
        assert_eq!(addr("/a=b").parent(), ResourceAddress::root());
    }

    #[test]
    fn prefixes() {
        let a = addr("/a=1/b=2");
        assert!(a.starts_with(&ResourceAddress::root()));
        assert!(a.starts_with(&addr("/a=1")));
        assert!(a.starts_with(&a));
        assert!(!a.starts_with(&addr("/a=2")));
        assert!(!addr("/a=1").starts_with(&a));
    }

    #[test]
    fn replace_and_append() {
        let a = addr("/host=master/server=one");
        assert_eq!(a.replace_value("server", "two").to_string(), "/host=master/server=two");
        assert_eq!(a.to_string(), "/host=master/server=one");

        let mut b = addr("/profile=full");
        b.add_address(&addr("/subsystem=ee")).unwrap();
        assert_eq!(b.to_string(), "/profile=full/subsystem=ee");
    }

    #[test]
    fn from_response_nodes() {
        let mut node = ModelNode::new();
        node.add_empty_object().unwrap().get("a").unwrap().set("1").unwrap();
        node.add_property("b", "2").unwrap();
        let pair = node.add_empty_list().unwrap();
        pair.add("c").unwrap().add("3").unwrap();
        assert_eq!(ResourceAddress::from_node(&node).unwrap().to_string(), "/a=1/b=2/c=3");

        assert!(ResourceAddress::from_node(&ModelNode::new()).unwrap().is_empty());
        assert!(ResourceAddress::from_node(&ModelNode::from(1)).is_err());
    }
}
