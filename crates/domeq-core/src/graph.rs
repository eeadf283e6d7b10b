//! The property graph: declaration registry plus per-evaluation session.
//!
//! [`PropertyGraph`] has two layers of state. The *declaration registry*
//! holds every naming registered through the factories ([`PropertyGraph::leaf`],
//! [`PropertyGraph::named`], [`PropertyGraph::repeated`],
//! [`PropertyGraph::scalar`]) and persists across evaluations, so plural
//! overrides and module placements survive recompilation. The *session* is
//! a directed graph rebuilt from scratch by every
//! [`PropertyGraph::evaluate_and_collect`] call: one node per leaf class
//! name the term mentions, one edge per requirement pair the term denotes.
//!
//! All read accessors iterate in class-name-sorted order, so algebraically
//! equivalent terms produce byte-identical output.

use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::Directed;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::naming::{pluralize, validate_scalar_name, ContainerNaming, Naming, TypeDescriptor};
use crate::property::{Module, NamedProperty, PropertyList, PropertyNode};
use crate::term::Term;

/// Edge weight: a direct "requires" relationship from source to sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requires;

/// Compiles requirement terms into a deterministic node/adjacency state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyGraph {
    /// Factory-registered definitions, keyed by fully qualified class name.
    declared: IndexMap<String, PropertyNode>,
    /// The current compilation session, rebuilt on every evaluation.
    session: StableGraph<PropertyNode, Requires, Directed, u32>,
    /// Class name to session node index.
    session_nodes: HashMap<String, NodeIndex<u32>>,
}

impl PropertyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- factories ----

    /// Registers a plain naming (no module, derived plural) and returns a
    /// leaf term referencing its class name.
    pub fn leaf(&mut self, name: &str) -> Result<Term, CoreError> {
        self.named(name, None, None)
    }

    /// Registers a naming with an optional explicit plural and module and
    /// returns a leaf term referencing its class name.
    pub fn named(
        &mut self,
        name: &str,
        plural: Option<&str>,
        module_name: Option<&str>,
    ) -> Result<Term, CoreError> {
        let naming = Naming::new(name, plural, module_name)?;
        let class_name = naming.class_name();
        self.declare(PropertyNode::Named(naming))?;
        Ok(Term::Leaf(class_name))
    }

    /// Registers a container over the named item and returns a leaf term
    /// referencing the container's class name.
    ///
    /// The item naming is registered too; when the item was already
    /// declared (possibly with an explicit plural), that declaration is
    /// reused and its plural carries through to generated output.
    pub fn repeated(
        &mut self,
        name: &str,
        item_module: Option<&str>,
        container_module: Option<&str>,
    ) -> Result<Term, CoreError> {
        let item = Naming::new(name, None, item_module)?;
        self.declare(PropertyNode::Named(item.clone()))?;
        // Derive from the surviving declaration, not the fresh naming.
        let item = match self.declared.get(&item.class_name()) {
            Some(PropertyNode::Named(naming)) => naming.clone(),
            _ => item,
        };
        let container = ContainerNaming::new(&item, container_module);
        let class_name = container.class_name();
        self.declare(PropertyNode::Container(container))?;
        Ok(Term::Leaf(class_name))
    }

    /// Registers an opaque built-in scalar leaf and returns a leaf term
    /// referencing it. Scalars are excluded from the ordinary node
    /// enumeration and exposed through [`PropertyGraph::builtin_types`].
    pub fn scalar(&mut self, name: &str, module_name: Option<&str>) -> Result<Term, CoreError> {
        validate_scalar_name(name)?;
        let descriptor = TypeDescriptor::new(name, module_name);
        let class_name = descriptor.class_name();
        self.declare(PropertyNode::Scalar(descriptor))?;
        Ok(Term::Leaf(class_name))
    }

    /// Registers a node, rejecting class-name collisions.
    ///
    /// Policy (applied uniformly across all factories): an identical
    /// redeclaration reuses the existing entry; a redeclaration that only
    /// differs by carrying the derived default plural also reuses the
    /// existing (richer) entry; anything else is a collision.
    fn declare(&mut self, node: PropertyNode) -> Result<(), CoreError> {
        let class_name = node.class_name();
        match self.declared.get(&class_name) {
            None => {
                self.declared.insert(class_name, node);
                Ok(())
            }
            Some(existing) if existing.same_definition(&node) => Ok(()),
            Some(existing) if Self::is_default_redeclaration(existing, &node) => Ok(()),
            Some(_) => Err(CoreError::ClassNameCollision { class_name }),
        }
    }

    fn is_default_redeclaration(existing: &PropertyNode, incoming: &PropertyNode) -> bool {
        match (existing, incoming) {
            (PropertyNode::Named(a), PropertyNode::Named(b)) => {
                a.value_name() == b.value_name()
                    && b.plural_value_name() == pluralize(b.value_name())
            }
            _ => false,
        }
    }

    // ---- evaluation ----

    /// Compiles the term into a fresh session and returns the canonical
    /// node sequence.
    ///
    /// The previous session is discarded entirely; the term is wrapped
    /// between terminal elements so every leaf is registered even when it
    /// has no incoming or outgoing edges. Leaf class names with no factory
    /// registration are reconstructed from the class name itself, so
    /// evaluation never fails.
    pub fn evaluate_and_collect(&mut self, term: &Term) -> Vec<NamedProperty> {
        self.session = StableGraph::default();
        self.session_nodes.clear();

        let wrapped = Term::Terminal * term.clone() * Term::Terminal;
        let flow = wrapped.flow();
        for class_name in &flow.leaves {
            self.ensure_session_node(class_name);
        }
        for (source, sink) in &flow.edges {
            self.connect(source, sink);
        }
        // A container always carries its item as a sub-property, whether or
        // not the term mentions the item explicitly.
        let containment: Vec<(String, String)> = self
            .session
            .node_weights()
            .filter_map(|node| match node {
                PropertyNode::Container(container) => Some((
                    container.class_name(),
                    container.item_class_name().to_string(),
                )),
                _ => None,
            })
            .collect();
        for (container, item) in containment {
            self.connect(&container, &item);
        }
        self.properties()
    }

    fn ensure_session_node(&mut self, class_name: &str) -> NodeIndex<u32> {
        if let Some(&index) = self.session_nodes.get(class_name) {
            return index;
        }
        let node = match self.declared.get(class_name) {
            Some(node) => node.clone(),
            None => PropertyNode::from_class_name(class_name),
        };
        let index = self.session.add_node(node);
        self.session_nodes.insert(class_name.to_string(), index);
        index
    }

    fn connect(&mut self, source: &str, sink: &str) {
        let source = self.ensure_session_node(source);
        let sink = self.ensure_session_node(sink);
        if self.session.find_edge(source, sink).is_none() {
            self.session.add_edge(source, sink, Requires);
        }
    }

    // ---- read accessors ----

    /// The canonical node sequence of the current session: every non-scalar
    /// node sorted by class name, each paired with its direct sub-properties
    /// (absent when the node has no outgoing edges).
    pub fn properties(&self) -> Vec<NamedProperty> {
        self.sorted_indices()
            .into_iter()
            .filter(|&index| !self.session[index].is_scalar())
            .map(|index| self.collect_node(index))
            .collect()
    }

    /// All scalar descriptors in the current session, sorted by class name.
    pub fn builtin_types(&self) -> Vec<TypeDescriptor> {
        let mut scalars: Vec<TypeDescriptor> = self
            .session
            .node_weights()
            .filter_map(|node| match node {
                PropertyNode::Scalar(descriptor) => Some(descriptor.clone()),
                _ => None,
            })
            .collect();
        scalars.sort();
        scalars
    }

    /// Groups the session's non-scalar nodes by declared module. Every
    /// module carries a definition lookup over the *whole* session, so
    /// generators can resolve cross-module references.
    pub fn modules(&self) -> Vec<Module> {
        let mut definitions = BTreeMap::new();
        let mut grouped: BTreeMap<Option<String>, Vec<PropertyNode>> = BTreeMap::new();
        for index in self.sorted_indices() {
            let node = &self.session[index];
            definitions.insert(node.class_name(), self.collect_node(index));
            if !node.is_scalar() {
                grouped
                    .entry(node.module_name().map(str::to_string))
                    .or_default()
                    .push(node.clone());
            }
        }
        grouped
            .into_iter()
            .map(|(name, members)| Module::new(name, members, definitions.clone()))
            .collect()
    }

    /// Resolves a class name against the session first, then the
    /// declaration registry.
    pub fn lookup(&self, class_name: &str) -> Option<&PropertyNode> {
        self.session_nodes
            .get(class_name)
            .map(|&index| &self.session[index])
            .or_else(|| self.declared.get(class_name))
    }

    /// See [`Term::intermediate_terms`].
    pub fn extract_intermediate_terms(&self, term: &Term) -> Vec<Term> {
        term.intermediate_terms()
    }

    pub fn node_count(&self) -> usize {
        self.session.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.session.edge_count()
    }

    fn sorted_indices(&self) -> Vec<NodeIndex<u32>> {
        let mut names: Vec<(&String, NodeIndex<u32>)> = self
            .session_nodes
            .iter()
            .map(|(name, &index)| (name, index))
            .collect();
        names.sort_by(|a, b| a.0.cmp(b.0));
        names.into_iter().map(|(_, index)| index).collect()
    }

    fn collect_node(&self, index: NodeIndex<u32>) -> NamedProperty {
        let mut neighbors = self.session.neighbors(index).peekable();
        let properties = if neighbors.peek().is_none() {
            None
        } else {
            let mut list = PropertyList::new();
            for neighbor in neighbors {
                list.add(self.session[neighbor].clone());
            }
            Some(list)
        };
        NamedProperty::new(self.session[index].clone(), properties)
    }
}
