//! Codegen error types covering both generation surfaces.

/// Errors produced while synthesizing interfaces or rendering schema text.
#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    /// A concrete type was checked against an interface without furnishing
    /// every required accessor. All missing names are reported at once.
    #[error("cannot instantiate '{interface}': missing accessors: {}", missing.join(", "))]
    MissingCapabilities {
        interface: String,
        missing: Vec<String>,
    },

    /// A referenced class name has no resolvable definition.
    #[error("unknown type: {class_name}")]
    UnknownType { class_name: String },
}
