//! Interface synthesis: abstract capability descriptors from graph nodes.
//!
//! A synthesized [`InterfaceDescriptor`] is a stateless contract: one
//! accessor per declared sub-property for ordinary nodes, exactly one
//! sequence accessor for containers. Checking a concrete type against a
//! descriptor reports every missing accessor at once, sorted by name.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use domeq_core::{NamedProperty, PropertyGraph, PropertyNode};

use crate::error::CodegenError;

/// What an accessor yields: a single value or a sequence of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessorReturns {
    /// One value of the given class.
    Single { class_name: String },
    /// All contained items of the given class.
    Sequence { item_class_name: String },
}

/// One required accessor of a synthesized interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accessor {
    name: String,
    doc: String,
    returns: AccessorReturns,
}

impl Accessor {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The generated documentation sentence for the accessor.
    pub fn doc(&self) -> &str {
        &self.doc
    }

    pub fn returns(&self) -> &AccessorReturns {
        &self.returns
    }
}

/// The accessors a concrete type claims to furnish.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    provided: BTreeSet<String>,
}

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn provide(&mut self, accessor: impl Into<String>) -> &mut Self {
        self.provided.insert(accessor.into());
        self
    }

    pub fn contains(&self, accessor: &str) -> bool {
        self.provided.contains(accessor)
    }
}

impl<S: Into<String>> FromIterator<S> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        CapabilitySet {
            provided: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// A stateless capability contract synthesized from one graph node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceDescriptor {
    interface_name: String,
    class_name: String,
    accessors: BTreeMap<String, Accessor>,
}

impl InterfaceDescriptor {
    /// Interface name, e.g. `ISpeed` for class `Speed`.
    pub fn interface_name(&self) -> &str {
        &self.interface_name
    }

    /// Fully qualified class name of the node the descriptor was
    /// synthesized from.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// The required accessors in name-sorted order.
    pub fn accessors(&self) -> impl Iterator<Item = &Accessor> {
        self.accessors.values()
    }

    /// The required accessor names in sorted order.
    pub fn required_accessors(&self) -> Vec<&str> {
        self.accessors.keys().map(String::as_str).collect()
    }

    /// Validates a concrete type's capabilities against the contract,
    /// naming every missing accessor in one failure.
    pub fn check(&self, capabilities: &CapabilitySet) -> Result<(), CodegenError> {
        let missing: Vec<String> = self
            .accessors
            .keys()
            .filter(|name| !capabilities.contains(name))
            .cloned()
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CodegenError::MissingCapabilities {
                interface: self.interface_name.clone(),
                missing,
            })
        }
    }
}

/// Synthesizes interface descriptors from a compiled property graph.
pub struct InterfaceSynthesizer<'g> {
    graph: &'g PropertyGraph,
}

impl<'g> InterfaceSynthesizer<'g> {
    pub fn new(graph: &'g PropertyGraph) -> Self {
        InterfaceSynthesizer { graph }
    }

    /// Synthesizes the descriptor for one node.
    ///
    /// Ordinary nodes get one accessor per named sub-property (scalar
    /// sub-properties are carried as plain values by the owning type and
    /// produce no accessor of their own). Containers get exactly one
    /// sequence accessor named by the item's plural value name.
    pub fn synthesize(
        &self,
        property: &NamedProperty,
    ) -> Result<InterfaceDescriptor, CodegenError> {
        match property.node() {
            PropertyNode::Container(container) => {
                let item_class = container.item_class_name();
                let item = self
                    .graph
                    .lookup(item_class)
                    .and_then(PropertyNode::naming)
                    .cloned()
                    .ok_or_else(|| CodegenError::UnknownType {
                        class_name: item_class.to_string(),
                    })?;
                let owner = container.naming();
                let accessor = Accessor {
                    name: item.plural_value_name().to_string(),
                    doc: format!(
                        "Returns all contained {} of the {} instance.",
                        item.docstring_name(),
                        owner.docstring_name()
                    ),
                    returns: AccessorReturns::Sequence {
                        item_class_name: item_class.to_string(),
                    },
                };
                Ok(InterfaceDescriptor {
                    interface_name: owner.interface_name(),
                    class_name: owner.class_name(),
                    accessors: BTreeMap::from([(accessor.name.clone(), accessor)]),
                })
            }
            PropertyNode::Named(owner) => {
                let mut accessors = BTreeMap::new();
                for sub in property.properties() {
                    let sub_naming = match sub.naming() {
                        Some(naming) => naming,
                        None => continue,
                    };
                    let accessor = Accessor {
                        name: sub_naming.value_name().to_string(),
                        doc: format!(
                            "The {} of the {} instance.",
                            sub_naming.docstring_name(),
                            owner.docstring_name()
                        ),
                        returns: AccessorReturns::Single {
                            class_name: sub.class_name(),
                        },
                    };
                    accessors.insert(accessor.name.clone(), accessor);
                }
                Ok(InterfaceDescriptor {
                    interface_name: owner.interface_name(),
                    class_name: owner.class_name(),
                    accessors,
                })
            }
            PropertyNode::Scalar(descriptor) => Err(CodegenError::UnknownType {
                class_name: descriptor.class_name(),
            }),
        }
    }

    /// Descriptors for every node in the graph, keyed by interface name.
    pub fn synthesize_all(&self) -> Result<BTreeMap<String, InterfaceDescriptor>, CodegenError> {
        let mut out = BTreeMap::new();
        for property in self.graph.properties() {
            let descriptor = self.synthesize(&property)?;
            out.insert(descriptor.interface_name.clone(), descriptor);
        }
        Ok(out)
    }
}
