//! Schema text generation: one proto2 document per module.
//!
//! Rendering is driven entirely by a [`Module`] snapshot and is
//! deterministic: members arrive class-name-sorted from the graph and
//! every emitted list (imports, fields) follows that canonical order.
//!
//! A member whose definition carries a scalar sub-property is a *value
//! property*: it renders no message of its own and is inlined at every
//! use site as a field typed by its scalar. Pure leaves render nothing
//! either; they only appear as field types in other messages.

use serde::{Deserialize, Serialize};

use domeq_core::{CoreError, Module, NamedProperty, PropertyGraph, PropertyNode, Term, TypeDescriptor};

use crate::error::CodegenError;

/// The proto2 built-in scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProtoScalar {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
}

impl ProtoScalar {
    pub const ALL: [ProtoScalar; 15] = [
        ProtoScalar::Double,
        ProtoScalar::Float,
        ProtoScalar::Int32,
        ProtoScalar::Int64,
        ProtoScalar::Uint32,
        ProtoScalar::Uint64,
        ProtoScalar::Sint32,
        ProtoScalar::Sint64,
        ProtoScalar::Fixed32,
        ProtoScalar::Fixed64,
        ProtoScalar::Sfixed32,
        ProtoScalar::Sfixed64,
        ProtoScalar::Bool,
        ProtoScalar::String,
        ProtoScalar::Bytes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProtoScalar::Double => "double",
            ProtoScalar::Float => "float",
            ProtoScalar::Int32 => "int32",
            ProtoScalar::Int64 => "int64",
            ProtoScalar::Uint32 => "uint32",
            ProtoScalar::Uint64 => "uint64",
            ProtoScalar::Sint32 => "sint32",
            ProtoScalar::Sint64 => "sint64",
            ProtoScalar::Fixed32 => "fixed32",
            ProtoScalar::Fixed64 => "fixed64",
            ProtoScalar::Sfixed32 => "sfixed32",
            ProtoScalar::Sfixed64 => "sfixed64",
            ProtoScalar::Bool => "bool",
            ProtoScalar::String => "string",
            ProtoScalar::Bytes => "bytes",
        }
    }

    pub fn descriptor(&self) -> TypeDescriptor {
        TypeDescriptor::new(self.as_str(), None)
    }

    /// Registers the scalar on a graph and returns its leaf term.
    pub fn register(&self, graph: &mut PropertyGraph) -> Result<Term, CoreError> {
        graph.scalar(self.as_str(), None)
    }
}

/// The scalar a value property reduces to, if it is one.
pub fn value_property_type(definition: &NamedProperty) -> Option<&TypeDescriptor> {
    definition.properties().find_map(|node| match node {
        PropertyNode::Scalar(descriptor) => Some(descriptor),
        _ => None,
    })
}

/// The field type for an ordinary sub-property reference: the scalar name
/// when the sub-property is a value property, the module-stripped class
/// name inside its own module, the fully qualified name across modules.
fn field_type(sub: &PropertyNode, module: &Module) -> String {
    if let Some(definition) = module.definition(&sub.class_name()) {
        if let Some(scalar) = value_property_type(definition) {
            return scalar.class_name();
        }
    }
    if sub.module_name() == module.name() {
        sub.bare_name().to_string()
    } else {
        sub.class_name()
    }
}

/// Renders one module into a proto2 document.
///
/// Fails only when a container's item class cannot be resolved from the
/// module's definition lookup.
pub fn render_module(module: &Module) -> Result<String, CodegenError> {
    let mut lines = vec!["syntax = \"proto2\";".to_string()];

    if let Some(name) = module.name() {
        lines.push(format!("package {name};"));
    }

    let mut imports: Vec<&str> = Vec::new();
    for member in module.members() {
        let definition = match module.definition(&member.class_name()) {
            Some(definition) => definition,
            None => continue,
        };
        for sub in definition.properties() {
            if let Some(sub_module) = sub.module_name() {
                if Some(sub_module) != module.name() && !imports.contains(&sub_module) {
                    imports.push(sub_module);
                }
            }
        }
    }
    imports.sort_unstable();
    for import in imports {
        lines.push(format!("import {import};"));
    }

    for member in module.members() {
        match member {
            PropertyNode::Named(naming) => {
                let definition = match module.definition(&member.class_name()) {
                    Some(definition) => definition,
                    None => continue,
                };
                // Pure leaves and value properties render no message.
                if !definition.has_properties() || value_property_type(definition).is_some() {
                    continue;
                }
                lines.push(format!("message {} {{", naming.bare_name()));
                for (i, sub) in definition.properties().enumerate() {
                    let field_name = match sub.naming() {
                        Some(sub_naming) => sub_naming.value_name().to_string(),
                        None => continue,
                    };
                    lines.push(format!(
                        "    required {} {} = {};",
                        field_type(sub, module),
                        field_name,
                        i + 1
                    ));
                }
                lines.push("}".to_string());
            }
            PropertyNode::Container(container) => {
                let item_class = container.item_class_name();
                let item_definition =
                    module
                        .definition(item_class)
                        .ok_or_else(|| CodegenError::UnknownType {
                            class_name: item_class.to_string(),
                        })?;
                let item =
                    item_definition
                        .node()
                        .naming()
                        .ok_or_else(|| CodegenError::UnknownType {
                            class_name: item_class.to_string(),
                        })?;
                // Container item types are always module-stripped; the
                // import list carries the module reference.
                let item_type = match value_property_type(item_definition) {
                    Some(scalar) => scalar.class_name(),
                    None => item.bare_name().to_string(),
                };
                lines.push(format!("message {} {{", container.naming().bare_name()));
                lines.push(format!(
                    "    repeated {} {} = 1;",
                    item_type,
                    item.plural_value_name()
                ));
                lines.push("}".to_string());
            }
            PropertyNode::Scalar(_) => {}
        }
    }

    Ok(lines.join("\n"))
}
