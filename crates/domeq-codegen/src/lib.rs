//! Code generation over compiled property graphs.
//!
//! This crate provides the two consumer surfaces of a compiled
//! [`domeq_core::PropertyGraph`]:
//!
//! - [`interface`] -- abstract capability descriptors, one accessor per
//!   declared sub-property
//! - [`schema`] -- proto2 schema text, one document per module
//!
//! Both surfaces are pure: they read graph snapshots and return values,
//! never touching the filesystem or network.

pub mod error;
pub mod interface;
pub mod schema;

pub use error::CodegenError;
pub use interface::{
    Accessor, AccessorReturns, CapabilitySet, InterfaceDescriptor, InterfaceSynthesizer,
};
pub use schema::{render_module, value_property_type, ProtoScalar};
