//! Property nodes, sorted property lists, and module grouping.
//!
//! [`PropertyNode`] is the unit stored in the graph: an ordinary naming, a
//! container naming, or an opaque built-in scalar. [`PropertyList`] keeps a
//! node set unique by class name with iteration always sorted by class name
//! -- the ordering invariant that makes algebraically equivalent terms
//! produce byte-identical enumerations and generated text. [`NamedProperty`]
//! pairs a node with its optional sub-property list, and [`Module`] groups
//! nodes under a declared package name.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::naming::{snake_case, ContainerNaming, Naming, TypeDescriptor};

/// A node registered in the property graph, identified by its fully
/// qualified class name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PropertyNode {
    /// An ordinary named property.
    Named(Naming),
    /// A container over an item type.
    Container(ContainerNaming),
    /// An opaque built-in scalar leaf; never expanded, excluded from the
    /// ordinary node enumeration.
    Scalar(TypeDescriptor),
}

impl PropertyNode {
    pub fn descriptor(&self) -> &TypeDescriptor {
        match self {
            PropertyNode::Named(naming) => naming.descriptor(),
            PropertyNode::Container(container) => container.naming().descriptor(),
            PropertyNode::Scalar(descriptor) => descriptor,
        }
    }

    /// Fully qualified class name.
    pub fn class_name(&self) -> String {
        self.descriptor().class_name()
    }

    /// Class name without the module prefix.
    pub fn bare_name(&self) -> &str {
        self.descriptor().bare_name()
    }

    pub fn module_name(&self) -> Option<&str> {
        self.descriptor().module_name()
    }

    /// The value-level naming, when the node has one (scalars do not).
    pub fn naming(&self) -> Option<&Naming> {
        match self {
            PropertyNode::Named(naming) => Some(naming),
            PropertyNode::Container(container) => Some(container.naming()),
            PropertyNode::Scalar(_) => None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, PropertyNode::Scalar(_))
    }

    /// Full structural comparison, unlike `==` which compares identity
    /// (class name) only. Used by the collision check at registration.
    pub(crate) fn same_definition(&self, other: &PropertyNode) -> bool {
        match (self, other) {
            (PropertyNode::Named(a), PropertyNode::Named(b)) => {
                a == b
                    && a.value_name() == b.value_name()
                    && a.plural_value_name() == b.plural_value_name()
            }
            (PropertyNode::Container(a), PropertyNode::Container(b)) => {
                a == b && a.item_class_name() == b.item_class_name()
            }
            (PropertyNode::Scalar(a), PropertyNode::Scalar(b)) => a == b,
            _ => false,
        }
    }

    /// Reconstructs a node from a bare class name, for terms that reference
    /// classes never declared through the factories. The module prefix is
    /// split off and the bare name un-camel-cased; names that do not invert
    /// to a valid identifier become opaque scalar descriptors.
    pub(crate) fn from_class_name(class_name: &str) -> PropertyNode {
        let (module, bare) = match class_name.rfind('.') {
            Some(pos) => (Some(&class_name[..pos]), &class_name[pos + 1..]),
            None => (None, class_name),
        };
        let value_name = snake_case(bare);
        match Naming::new(&value_name, None, module) {
            Ok(naming) if naming.bare_name() == bare => PropertyNode::Named(naming),
            _ => PropertyNode::Scalar(TypeDescriptor::new(bare, module)),
        }
    }
}

impl PartialEq for PropertyNode {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor() == other.descriptor()
    }
}

impl Eq for PropertyNode {}

impl Hash for PropertyNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.descriptor().hash(state);
    }
}

impl PartialOrd for PropertyNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PropertyNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.descriptor().cmp(other.descriptor())
    }
}

impl fmt::Display for PropertyNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyNode::Named(naming) => naming.fmt(f),
            PropertyNode::Container(container) => container.fmt(f),
            PropertyNode::Scalar(descriptor) => descriptor.fmt(f),
        }
    }
}

/// A set of property nodes, unique by class name, always iterated in
/// class-name order regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyList {
    entries: BTreeMap<String, PropertyNode>,
}

impl PropertyList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node; re-adding the same class name keeps the first entry.
    pub fn add(&mut self, node: PropertyNode) {
        self.entries.entry(node.class_name()).or_insert(node);
    }

    /// The nodes in class-name-sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &PropertyNode> {
        self.entries.values()
    }

    pub fn get(&self, class_name: &str) -> Option<&PropertyNode> {
        self.entries.get(class_name)
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.entries.contains_key(class_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for PropertyList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self
            .iter()
            .map(|node| format!("\"{}\"", node.class_name()))
            .collect();
        write!(f, "[{}]", names.join(", "))
    }
}

/// One node paired with its direct sub-properties.
///
/// An absent list means the node has no declared sub-properties (a leaf).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedProperty {
    node: PropertyNode,
    properties: Option<PropertyList>,
}

impl NamedProperty {
    pub fn new(node: PropertyNode, properties: Option<PropertyList>) -> Self {
        NamedProperty { node, properties }
    }

    pub fn node(&self) -> &PropertyNode {
        &self.node
    }

    /// Direct sub-properties in canonical order; empty for leaves.
    pub fn properties(&self) -> impl Iterator<Item = &PropertyNode> {
        self.properties.iter().flat_map(PropertyList::iter)
    }

    pub fn property_list(&self) -> Option<&PropertyList> {
        self.properties.as_ref()
    }

    pub fn has_properties(&self) -> bool {
        self.properties.as_ref().is_some_and(|list| !list.is_empty())
    }
}

impl fmt::Display for NamedProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.properties {
            None => write!(f, "{{\"naming\": {}}}", self.node),
            Some(list) => write!(f, "{{\"naming\": {}, \"properties\": {}}}", self.node, list),
        }
    }
}

/// A declared package: its member nodes plus a class-name lookup into the
/// full node set of the compilation it was grouped from, so generators can
/// resolve cross-module references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    name: Option<String>,
    members: Vec<PropertyNode>,
    definitions: BTreeMap<String, NamedProperty>,
}

impl Module {
    /// Builds a module; members are re-sorted to maintain canonical order.
    pub fn new(
        name: Option<String>,
        mut members: Vec<PropertyNode>,
        definitions: BTreeMap<String, NamedProperty>,
    ) -> Self {
        members.sort_by_key(|m| m.class_name());
        Module {
            name,
            members,
            definitions,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Member nodes in class-name-sorted order.
    pub fn members(&self) -> &[PropertyNode] {
        &self.members
    }

    /// Resolves any class name from the originating compilation, not just
    /// this module's members.
    pub fn definition(&self, class_name: &str) -> Option<&NamedProperty> {
        self.definitions.get(class_name)
    }
}

impl PartialEq for Module {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.members == other.members
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self
            .members
            .iter()
            .map(|node| format!("\"{}\"", node.class_name()))
            .collect();
        write!(
            f,
            "{{\"module\": {}, \"types\": [{}]}}",
            self.name.as_deref().unwrap_or(""),
            names.join(", ")
        )
    }
}
