//! Loaded XSD schema model
//!
//! [`Schema`] is the navigable type/element graph the generator walks. It is
//! built once per run and never mutated afterwards.

pub mod components;
pub mod particles;
mod parsing;

use std::path::Path;

pub use components::{
    Attribute, AttributeUse, BuiltinType, ComplexType, ComplexTypeId, Element, Facets, SimpleType,
    SimpleTypeId, TypeRef,
};
pub use particles::{parse_occurs, ModelKind, Occurs};

use crate::error::Result;
use crate::limits::Limits;
use crate::loaders::{Loader, Location};

/// A loaded schema
#[derive(Debug, Clone, Default)]
pub struct Schema {
    /// targetNamespace of the schema document
    pub target_namespace: Option<String>,
    pub(crate) simple_types: Vec<SimpleType>,
    pub(crate) complex_types: Vec<ComplexType>,
    /// Top-level simple types in declaration order
    pub global_simple_types: Vec<SimpleTypeId>,
    /// Top-level complex types in declaration order
    pub global_complex_types: Vec<ComplexTypeId>,
    /// Top-level element declarations in declaration order
    pub elements: Vec<Element>,
}

impl Schema {
    /// Load a schema from a file path
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_location(&Location::Path(path.as_ref().to_path_buf()), &Limits::default())
    }

    /// Load a schema from a string
    pub fn from_string(xsd: &str) -> Result<Self> {
        Self::from_location(&Location::String(xsd.to_string()), &Limits::default())
    }

    /// Load a schema from a location with explicit limits
    pub fn from_location(location: &Location, limits: &Limits) -> Result<Self> {
        let text = Loader::new().with_limits(limits.clone()).load(location)?;
        let schema = parsing::parse_schema(&text, limits)?;
        tracing::debug!(
            location = %location.as_str(),
            types = schema.type_count(),
            elements = schema.elements.len(),
            "schema loaded"
        );
        Ok(schema)
    }

    /// Look up a simple type by id
    pub fn simple_type(&self, id: SimpleTypeId) -> &SimpleType {
        &self.simple_types[id.0]
    }

    /// Look up a complex type by id
    pub fn complex_type(&self, id: ComplexTypeId) -> &ComplexType {
        &self.complex_types[id.0]
    }

    /// Find a top-level element by its tag name
    pub fn element(&self, name: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.name == name)
    }

    /// Find a named complex type by its schema name
    pub fn complex_type_by_name(&self, name: &str) -> Option<ComplexTypeId> {
        self.global_complex_types
            .iter()
            .copied()
            .find(|id| self.complex_type(*id).name.as_deref() == Some(name))
    }

    /// Find a named simple type by its schema name
    pub fn simple_type_by_name(&self, name: &str) -> Option<SimpleTypeId> {
        self.global_simple_types
            .iter()
            .copied()
            .find(|id| self.simple_type(*id).name.as_deref() == Some(name))
    }

    /// Number of type definitions, anonymous ones included
    pub fn type_count(&self) -> usize {
        self.simple_types.len() + self.complex_types.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_count_includes_anonymous_types() {
        let schema = Schema::from_string(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                 <xs:simpleType name="Code"><xs:restriction base="xs:string"/></xs:simpleType>
                 <xs:element name="Root"><xs:complexType>
                   <xs:attribute name="Kind"><xs:simpleType>
                     <xs:restriction base="Code"><xs:maxLength value="2"/></xs:restriction>
                   </xs:simpleType></xs:attribute>
                 </xs:complexType></xs:element>
               </xs:schema>"#,
        )
        .unwrap();

        assert_eq!(schema.global_simple_types.len(), 1);
        assert!(schema.global_complex_types.is_empty());
        assert_eq!(schema.type_count(), 3);
    }
}
