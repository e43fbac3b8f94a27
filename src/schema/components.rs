//! Schema components
//!
//! A read-only view of the loaded schema. Type definitions live in arenas on
//! [`Schema`](super::Schema) and are referenced through stable ids, so two
//! references to the same definition compare equal no matter what their
//! names look like after transliteration.

use super::particles::{ModelKind, Occurs};

/// Stable handle of a simple type definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimpleTypeId(pub(crate) usize);

/// Stable handle of a complex type definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComplexTypeId(pub(crate) usize);

/// Reference to an XSD builtin type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuiltinType {
    /// The reference exactly as written in the schema (`xs:integer`)
    pub name: String,
    /// Local name in the XSD namespace (`integer`)
    pub local_name: String,
}

impl BuiltinType {
    /// Create a builtin reference
    pub fn new(name: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            local_name: local_name.into(),
        }
    }
}

/// The type of an attribute, element, or simple content
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// XSD builtin
    Builtin(BuiltinType),
    /// Simple type defined in the schema (named or anonymous)
    Simple(SimpleTypeId),
    /// Complex type defined in the schema (named or anonymous)
    Complex(ComplexTypeId),
}

/// Effective restriction facets of a simple type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Facets {
    /// minLength (or length)
    pub min_length: Option<u64>,
    /// maxLength (or length)
    pub max_length: Option<u64>,
    /// pattern facets, most derived first
    pub patterns: Vec<String>,
    /// enumeration values in declaration order
    pub enumeration: Vec<String>,
    /// minInclusive
    pub min_inclusive: Option<String>,
    /// maxInclusive
    pub max_inclusive: Option<String>,
    /// minExclusive
    pub min_exclusive: Option<String>,
    /// maxExclusive
    pub max_exclusive: Option<String>,
}

impl Facets {
    /// Apply `own` (a restriction step) on top of inherited facets
    pub fn restrict(&self, own: Facets) -> Facets {
        let mut patterns = own.patterns;
        patterns.extend(self.patterns.iter().cloned());

        Facets {
            min_length: own.min_length.or(self.min_length),
            max_length: own.max_length.or(self.max_length),
            patterns,
            enumeration: if own.enumeration.is_empty() {
                self.enumeration.clone()
            } else {
                own.enumeration
            },
            min_inclusive: own.min_inclusive.or_else(|| self.min_inclusive.clone()),
            max_inclusive: own.max_inclusive.or_else(|| self.max_inclusive.clone()),
            min_exclusive: own.min_exclusive.or_else(|| self.min_exclusive.clone()),
            max_exclusive: own.max_exclusive.or_else(|| self.max_exclusive.clone()),
        }
    }
}

/// Simple type definition (atomic restriction)
#[derive(Debug, Clone)]
pub struct SimpleType {
    /// Schema-level name (None for anonymous types)
    pub name: Option<String>,
    /// Builtin at the root of the restriction chain
    pub primitive: BuiltinType,
    /// Effective facets including inherited ones
    pub facets: Facets,
    /// Annotation documentation
    pub documentation: Option<String>,
}

impl SimpleType {
    /// Whether the type has no schema-level name
    pub fn is_anonymous(&self) -> bool {
        self.name.is_none()
    }
}

/// Attribute use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttributeUse {
    /// use="required"
    Required,
    /// use="optional" (the default)
    #[default]
    Optional,
}

impl AttributeUse {
    /// Parse the `use` attribute; `None` for "prohibited"
    pub fn parse(value: Option<&str>) -> Option<Self> {
        match value.map(str::trim) {
            Some("required") => Some(AttributeUse::Required),
            Some("prohibited") => None,
            _ => Some(AttributeUse::Optional),
        }
    }
}

/// Attribute declaration as used by a complex type
#[derive(Debug, Clone)]
pub struct Attribute {
    /// Attribute name
    pub name: String,
    /// Attribute type, never [`TypeRef::Complex`]
    pub type_ref: TypeRef,
    /// Required or optional
    pub use_: AttributeUse,
    /// `default` value constraint
    pub default: Option<String>,
    /// `fixed` value constraint
    pub fixed: Option<String>,
    /// Annotation documentation
    pub documentation: Option<String>,
}

/// Element declaration as used by a complex type (or at the top level)
#[derive(Debug, Clone)]
pub struct Element {
    /// Element tag name
    pub name: String,
    /// Element type
    pub type_ref: TypeRef,
    /// Occurrence bounds including those of enclosing groups
    pub occurs: Occurs,
    /// Content model of the nearest enclosing group
    pub model: ModelKind,
    /// Annotation documentation
    pub documentation: Option<String>,
}

/// Complex type definition with its content flattened
#[derive(Debug, Clone, Default)]
pub struct ComplexType {
    /// Schema-level name (None for anonymous types)
    pub name: Option<String>,
    /// Element that declared the type; equals `name` for named types
    pub owner: String,
    /// Slash-separated element path of an anonymous type (`Файл/Документ`)
    pub path: String,
    /// Attributes, base type's first
    pub attributes: Vec<Attribute>,
    /// Elements in content model order, base type's first
    pub elements: Vec<Element>,
    /// Type of the text value for simple content
    pub text: Option<TypeRef>,
    /// Annotation documentation (of the owning element for anonymous types)
    pub documentation: Option<String>,
}

impl ComplexType {
    /// Whether the type has no schema-level name
    pub fn is_anonymous(&self) -> bool {
        self.name.is_none()
    }

    /// Name the class is generated from
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facets_restrict() {
        let base = Facets {
            min_length: Some(1),
            max_length: Some(10),
            patterns: vec!["[0-9]+".to_string()],
            enumeration: vec!["1".to_string(), "2".to_string()],
            ..Default::default()
        };
        let own = Facets {
            max_length: Some(5),
            patterns: vec!["[0-9]{3}".to_string()],
            ..Default::default()
        };

        let derived = base.restrict(own);
        assert_eq!(derived.min_length, Some(1));
        assert_eq!(derived.max_length, Some(5));
        assert_eq!(derived.patterns, vec!["[0-9]{3}", "[0-9]+"]);
        assert_eq!(derived.enumeration, vec!["1", "2"]);
    }

    #[test]
    fn test_attribute_use_parse() {
        assert_eq!(AttributeUse::parse(Some("required")), Some(AttributeUse::Required));
        assert_eq!(AttributeUse::parse(Some("optional")), Some(AttributeUse::Optional));
        assert_eq!(AttributeUse::parse(None), Some(AttributeUse::Optional));
        assert_eq!(AttributeUse::parse(Some("prohibited")), None);
    }

    #[test]
    fn test_complex_type_display_name() {
        let anonymous = ComplexType {
            owner: "Документ".to_string(),
            path: "Файл/Документ".to_string(),
            ..Default::default()
        };
        assert!(anonymous.is_anonymous());
        assert_eq!(anonymous.display_name(), "Документ");

        let named = ComplexType {
            name: Some("АдресТип".to_string()),
            owner: "АдресТип".to_string(),
            ..Default::default()
        };
        assert_eq!(named.display_name(), "АдресТип");
    }
}
