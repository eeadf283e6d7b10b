//! Core of the domain-equation compiler: an algebra of requirement terms
//! and the property graph they compile into.
//!
//! Leaf identifiers are declared through [`PropertyGraph`] factories and
//! combined into [`Term`] expressions with `+` (alternative) and `*`
//! (requires). Evaluating a term yields a deterministic, class-name-sorted
//! set of nodes and "requires" edges that downstream generators turn into
//! interface descriptors and schema text.

pub mod error;
pub mod graph;
pub mod naming;
pub mod property;
pub mod term;

// Re-export commonly used types
pub use error::CoreError;
pub use graph::PropertyGraph;
pub use naming::{camel_case, capitalize, pluralize, ContainerNaming, Naming, TypeDescriptor};
pub use property::{Module, NamedProperty, PropertyList, PropertyNode};
pub use term::Term;
