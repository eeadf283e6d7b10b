//! Identifier model: type descriptors and naming derivation.
//!
//! A [`TypeDescriptor`] identifies a type by its fully qualified class name
//! (optional module prefix plus bare name); equality, hashing, and ordering
//! are by that class name only. [`Naming`] extends a descriptor with the
//! value-level names derived from a canonical snake_case identifier, and
//! [`ContainerNaming`] derives a "container of item" naming from an item's.
//!
//! All derivations ([`camel_case`], [`pluralize`], docstring form) are pure
//! functions of the identifier.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Capitalizes the first character of a word. Empty input stays empty.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Derives a CamelCase class name from a snake_case word:
/// split on `_`, capitalize each segment, concatenate.
pub fn camel_case(word: &str) -> String {
    word.split('_').map(capitalize).collect()
}

/// Default English pluralization rule used when no explicit plural is given.
///
/// Ends in `x`/`s` -> append `es`; consonant + `y` -> replace `y` with `ies`;
/// vowel + `y` -> append `s`; ends in `sh`/`ch` -> append `es`;
/// otherwise append `s`.
pub fn pluralize(word: &str) -> String {
    let bytes = word.as_bytes();
    if matches!(bytes.last(), Some(b'x') | Some(b's')) {
        return format!("{word}es");
    }
    if bytes.len() >= 2 {
        if bytes[bytes.len() - 1] == b'y' {
            return match bytes[bytes.len() - 2] {
                b'a' | b'e' | b'i' | b'o' | b'u' => format!("{word}s"),
                _ => format!("{}ies", &word[..word.len() - 1]),
            };
        }
        if word.ends_with("sh") || word.ends_with("ch") {
            return format!("{word}es");
        }
    }
    format!("{word}s")
}

/// Inverse of [`camel_case`]: `FooBar` -> `foo_bar`.
///
/// Used to reconstruct a naming from a bare class name when an evaluated
/// term references a class that was never declared on the graph.
pub(crate) fn snake_case(word: &str) -> String {
    let mut out = String::with_capacity(word.len() + 4);
    for (i, c) in word.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Checks the canonical value-name pattern `[a-z][a-z_]*`.
pub(crate) fn validate_value_name(name: &str) -> Result<(), CoreError> {
    let mut chars = name.chars();
    let ok = matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c == '_');
    if ok {
        Ok(())
    } else {
        Err(CoreError::InvalidIdentifier {
            name: name.to_string(),
        })
    }
}

/// Checks the scalar-name pattern `[a-z][a-z0-9_]*`.
///
/// Scalar names additionally admit digits to cover protobuf built-ins
/// such as `int32` or `fixed64`.
pub(crate) fn validate_scalar_name(name: &str) -> Result<(), CoreError> {
    let mut chars = name.chars();
    let ok = matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if ok {
        Ok(())
    } else {
        Err(CoreError::InvalidScalarName {
            name: name.to_string(),
        })
    }
}

/// Identity of a type: an optional module prefix plus a bare class name.
///
/// Also used directly for opaque built-in scalar leaves (`float`, `bytes`,
/// ...) that carry no value/plural/docstring semantics and are never
/// expanded into sub-properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDescriptor {
    module_name: Option<String>,
    name: String,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>, module_name: Option<&str>) -> Self {
        TypeDescriptor {
            module_name: module_name.map(str::to_string),
            name: name.into(),
        }
    }

    /// The module the type is declared in, if any.
    pub fn module_name(&self) -> Option<&str> {
        self.module_name.as_deref()
    }

    /// Class name without the module prefix.
    pub fn bare_name(&self) -> &str {
        &self.name
    }

    /// Fully qualified class name: `module.Name` or just `Name`.
    pub fn class_name(&self) -> String {
        match &self.module_name {
            Some(module) => format!("{module}.{}", self.name),
            None => self.name.clone(),
        }
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.class_name() == other.class_name()
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.class_name().hash(state);
    }
}

impl PartialOrd for TypeDescriptor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeDescriptor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.class_name().cmp(&other.class_name())
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{\"type\": \"{}\"}}", self.class_name())
    }
}

/// Type and value naming derived from a canonical snake_case identifier.
///
/// Identity (equality, hashing, ordering) is inherited from the underlying
/// [`TypeDescriptor`]: two namings with the same fully qualified class name
/// are the same node, regardless of plural or docstring differences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Naming {
    descriptor: TypeDescriptor,
    value_name: String,
    plural_value_name: String,
    docstring_name: String,
}

impl Naming {
    /// Builds a naming from a snake_case `name`, an optional explicit
    /// plural, and an optional module.
    ///
    /// Fails with [`CoreError::InvalidIdentifier`] before any state is
    /// created if `name` or `plural` violates `[a-z][a-z_]*`.
    pub fn new(
        name: &str,
        plural: Option<&str>,
        module_name: Option<&str>,
    ) -> Result<Self, CoreError> {
        validate_value_name(name)?;
        if let Some(p) = plural {
            validate_value_name(p)?;
        }
        Ok(Naming {
            descriptor: TypeDescriptor::new(camel_case(name), module_name),
            value_name: name.to_string(),
            plural_value_name: plural.map(str::to_string).unwrap_or_else(|| pluralize(name)),
            docstring_name: name.replace('_', " "),
        })
    }

    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    /// Name for values (the canonical snake_case identifier).
    pub fn value_name(&self) -> &str {
        &self.value_name
    }

    /// Name for plural values.
    pub fn plural_value_name(&self) -> &str {
        &self.plural_value_name
    }

    /// Identifier with underscores replaced by spaces, for prose.
    pub fn docstring_name(&self) -> &str {
        &self.docstring_name
    }

    /// Fully qualified class name.
    pub fn class_name(&self) -> String {
        self.descriptor.class_name()
    }

    /// Class name without the module prefix.
    pub fn bare_name(&self) -> &str {
        self.descriptor.bare_name()
    }

    pub fn module_name(&self) -> Option<&str> {
        self.descriptor.module_name()
    }

    /// Interface name: the bare class name prefixed with `I`.
    pub fn interface_name(&self) -> String {
        format!("I{}", self.descriptor.bare_name())
    }
}

impl PartialEq for Naming {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor == other.descriptor
    }
}

impl Eq for Naming {}

impl Hash for Naming {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.descriptor.hash(state);
    }
}

impl PartialOrd for Naming {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Naming {
    fn cmp(&self, other: &Self) -> Ordering {
        self.descriptor.cmp(&other.descriptor)
    }
}

impl fmt::Display for Naming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"type\": \"{}\", \"value\": \"{}\", \"plural\": \"{}\", \"docstring\": \"{}\"}}",
            self.class_name(),
            self.value_name,
            self.plural_value_name,
            self.docstring_name
        )
    }
}

/// Naming for a container over an item type.
///
/// The container's own value name is `{item}_container`; the item's fully
/// qualified class name is kept as a lookup-only back-reference for later
/// interface and schema generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerNaming {
    naming: Naming,
    item_class_name: String,
}

impl ContainerNaming {
    /// Derives the container naming from an already-validated item naming.
    pub fn new(item: &Naming, module_name: Option<&str>) -> Self {
        let value_name = format!("{}_container", item.value_name());
        // The item's value name is valid, so every derived field is too.
        ContainerNaming {
            item_class_name: item.class_name(),
            naming: Naming {
                descriptor: TypeDescriptor::new(camel_case(&value_name), module_name),
                plural_value_name: pluralize(&value_name),
                docstring_name: value_name.replace('_', " "),
                value_name,
            },
        }
    }

    pub fn naming(&self) -> &Naming {
        &self.naming
    }

    /// Fully qualified class name of the contained item type.
    pub fn item_class_name(&self) -> &str {
        &self.item_class_name
    }

    pub fn class_name(&self) -> String {
        self.naming.class_name()
    }
}

impl PartialEq for ContainerNaming {
    fn eq(&self, other: &Self) -> bool {
        self.naming == other.naming
    }
}

impl Eq for ContainerNaming {}

impl Hash for ContainerNaming {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.naming.hash(state);
    }
}

impl fmt::Display for ContainerNaming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.naming.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalize_handles_empty_and_plain_words() {
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("foo"), "Foo");
    }

    #[test]
    fn camel_case_joins_segments() {
        assert_eq!(camel_case("some_words"), "SomeWords");
        assert_eq!(camel_case("speed"), "Speed");
        // Empty segments collapse, so distinct value names can collide.
        assert_eq!(camel_case("foo__bar"), "FooBar");
    }

    #[test]
    fn pluralize_default_rules() {
        assert_eq!(pluralize("test"), "tests");
        assert_eq!(pluralize("phalanx"), "phalanxes");
        assert_eq!(pluralize("bus"), "buses");
        assert_eq!(pluralize("city"), "cities");
        assert_eq!(pluralize("way"), "ways");
        assert_eq!(pluralize("ssh"), "sshes");
        assert_eq!(pluralize("church"), "churches");
        assert_eq!(pluralize("knife"), "knifes");
    }

    #[test]
    fn snake_case_inverts_camel_case() {
        assert_eq!(snake_case("FooBar"), "foo_bar");
        assert_eq!(snake_case("Speed"), "speed");
    }

    #[test]
    fn naming_derives_all_name_forms() {
        let naming = Naming::new("foo_bar", None, None).unwrap();
        assert_eq!(naming.class_name(), "FooBar");
        assert_eq!(naming.value_name(), "foo_bar");
        assert_eq!(naming.plural_value_name(), "foo_bars");
        assert_eq!(naming.docstring_name(), "foo bar");
        assert_eq!(naming.interface_name(), "IFooBar");
    }

    #[test]
    fn naming_with_module_prefixes_class_name_only() {
        let naming = Naming::new("foo_bar", None, Some("module")).unwrap();
        assert_eq!(naming.class_name(), "module.FooBar");
        assert_eq!(naming.bare_name(), "FooBar");
        assert_eq!(naming.module_name(), Some("module"));
        // The interface marker applies to the bare name.
        assert_eq!(naming.interface_name(), "IFooBar");
    }

    #[test]
    fn explicit_plural_overrides_derivation() {
        let naming = Naming::new("knife", Some("knives"), None).unwrap();
        assert_eq!(naming.plural_value_name(), "knives");
    }

    #[test]
    fn invalid_identifiers_are_rejected() {
        for name in ["", "Foo", "9foo", "foo-bar", "foo bar", "_foo"] {
            assert!(
                matches!(
                    Naming::new(name, None, None),
                    Err(CoreError::InvalidIdentifier { .. })
                ),
                "expected rejection for {name:?}"
            );
        }
        assert!(matches!(
            Naming::new("foo", Some("Foos"), None),
            Err(CoreError::InvalidIdentifier { .. })
        ));
    }

    #[test]
    fn scalar_names_admit_digits() {
        assert!(validate_scalar_name("int32").is_ok());
        assert!(validate_scalar_name("sfixed64").is_ok());
        assert!(validate_scalar_name("32int").is_err());
        assert!(validate_scalar_name("").is_err());
    }

    #[test]
    fn descriptor_identity_is_by_class_name() {
        let a = Naming::new("foo", Some("fooes"), None).unwrap();
        let b = Naming::new("foo", None, None).unwrap();
        // Same class name, different plural: same identity.
        assert_eq!(a, b);

        let c = Naming::new("foo", None, Some("m")).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn descriptor_ordering_is_by_class_name() {
        assert!(TypeDescriptor::new("Foo", None) < TypeDescriptor::new("FooBar", None));
        assert!(TypeDescriptor::new("FooBar", None) > TypeDescriptor::new("Foo", None));
    }

    #[test]
    fn container_naming_derivation() {
        let item = Naming::new("test", None, None).unwrap();
        let container = ContainerNaming::new(&item, None);
        assert_eq!(container.class_name(), "TestContainer");
        assert_eq!(container.naming().value_name(), "test_container");
        assert_eq!(container.naming().plural_value_name(), "test_containers");
        assert_eq!(container.naming().docstring_name(), "test container");
        assert_eq!(container.item_class_name(), "Test");
    }

    #[test]
    fn container_keeps_item_module_in_back_reference() {
        let item = Naming::new("knife", None, Some("accessories")).unwrap();
        let container = ContainerNaming::new(&item, Some("kitchen"));
        assert_eq!(container.class_name(), "kitchen.KnifeContainer");
        assert_eq!(container.item_class_name(), "accessories.Knife");
    }

    #[test]
    fn display_formats() {
        let naming = Naming::new("foo_bar", None, None).unwrap();
        assert_eq!(
            naming.to_string(),
            "{\"type\": \"FooBar\", \"value\": \"foo_bar\", \"plural\": \"foo_bars\", \"docstring\": \"foo bar\"}"
        );
        assert_eq!(
            TypeDescriptor::new("float", None).to_string(),
            "{\"type\": \"float\"}"
        );
    }

    #[test]
    fn serde_roundtrip() {
        let naming = Naming::new("foo_bar", Some("foo_baz"), Some("m")).unwrap();
        let json = serde_json::to_string(&naming).unwrap();
        let back: Naming = serde_json::from_str(&json).unwrap();
        assert_eq!(back.class_name(), naming.class_name());
        assert_eq!(back.plural_value_name(), naming.plural_value_name());

        let item = Naming::new("knife", None, Some("accessories")).unwrap();
        let container = ContainerNaming::new(&item, Some("kitchen"));
        let json = serde_json::to_string(&container).unwrap();
        let back: ContainerNaming = serde_json::from_str(&json).unwrap();
        assert_eq!(back.item_class_name(), container.item_class_name());
        assert_eq!(back.class_name(), container.class_name());
    }
}
