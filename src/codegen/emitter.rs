//! Class and constraint-block emission
//!
//! The [`Emitter`] renders one Python block per simple type and per complex
//! type. Complex types are memoized by [`ComplexTypeId`]: the first visit
//! emits the class (after any classes it depends on), later visits reuse the
//! name. A type reached again while its own class is still being built is a
//! cycle and is referenced by a quoted forward reference.

use std::collections::{HashMap, HashSet};

use indexmap::IndexSet;

use crate::error::{Error, Result};
use crate::names::{resolve_field_name, resolve_type_name};
use crate::schema::{
    Attribute, AttributeUse, ComplexTypeId, Element, ModelKind, Occurs, Schema, SimpleTypeId,
    TypeRef,
};
use crate::settings::Settings;

use super::constraints::{Bounds, Cardinality, ValueConstraint};
use super::hints::ListHints;
use super::python::{self, INDENT};
use super::types::map_primitive;

/// What a module-level identifier was generated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeKey {
    Reserved,
    Simple(SimpleTypeId),
    Complex(ComplexTypeId),
}

/// Module-level identifiers handed out so far
#[derive(Debug, Default)]
struct NameRegistry {
    entries: HashMap<String, (TypeKey, String)>,
}

impl NameRegistry {
    /// Claim `identifier` for `key`; claiming it again for the same key is a no-op
    fn register(&mut self, identifier: &str, key: TypeKey, original: &str) -> Result<()> {
        match self.entries.get(identifier) {
            Some((existing, _)) if *existing == key && key != TypeKey::Reserved => Ok(()),
            Some((_, first)) => Err(Error::NameCollision {
                identifier: identifier.to_string(),
                first: first.clone(),
                second: original.to_string(),
            }),
            None => {
                self.entries
                    .insert(identifier.to_string(), (key, original.to_string()));
                Ok(())
            }
        }
    }
}

/// Default of a generated field
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FieldDefault {
    /// No default; the field is required
    Required,
    /// `default=None`
    None,
    /// `default_factory=list`
    Factory,
    /// `default=<literal>`
    Value(String),
}

/// One `pydantic.Field` declaration
#[derive(Debug, Clone)]
pub(crate) struct Field {
    pub name: String,
    pub py_type: String,
    pub alias: String,
    pub description: Option<String>,
    pub default: FieldDefault,
    pub keywords: Vec<(&'static str, String)>,
    pub splat: Option<String>,
    pub comment: Vec<String>,
}

impl Field {
    pub(crate) fn render(&self) -> String {
        let arg = |text: String| format!("{INDENT}{INDENT}{text},");

        let mut lines = vec![format!("{INDENT}{}: {} = pydantic.Field(", self.name, self.py_type)];
        lines.push(arg(format!("alias={}", python::string_literal(&self.alias))));
        if let Some(description) = &self.description {
            lines.push(arg(format!("description={}", python::string_literal(description))));
        }
        match &self.default {
            FieldDefault::Required => {}
            FieldDefault::None => lines.push(arg("default=None".to_string())),
            FieldDefault::Factory => lines.push(arg("default_factory=list".to_string())),
            FieldDefault::Value(value) => lines.push(arg(format!("default={}", value))),
        }
        for (keyword, value) in &self.keywords {
            lines.push(arg(format!("{}={}", keyword, value)));
        }
        if let Some(splat) = &self.splat {
            lines.push(arg(format!("**{}", splat)));
        }

        let mut close = format!("{INDENT})");
        if !self.comment.is_empty() {
            close.push_str("  # ");
            close.push_str(&self.comment.join(" • "));
        }
        lines.push(close);

        lines.join("\n")
    }
}

/// Python value type of an attribute, element or text node
struct ValueType {
    py_type: String,
    constraint: ValueConstraint,
    /// Constraint block holding the bounds of a named simple type
    block: Option<String>,
}

impl ValueType {
    fn plain(py_type: impl Into<String>) -> Self {
        Self {
            py_type: py_type.into(),
            constraint: ValueConstraint::Free(Bounds::default()),
            block: None,
        }
    }

    /// Keywords the field type accepts; named blocks report their own drops
    fn accepted(&self, bounds: &Bounds, node: &str) -> Vec<(&'static str, String)> {
        let keywords = bounds.keywords_for(&self.py_type);
        if self.block.is_none() {
            warn_dropped(bounds, &keywords, &self.py_type, node);
        }
        keywords
    }

    /// Inline keywords and block splat for a single-valued field
    fn field_constraints(&self, node: &str) -> (Vec<(&'static str, String)>, Option<String>) {
        let ValueConstraint::Free(bounds) = &self.constraint else {
            return (Vec::new(), None);
        };
        let keywords = self.accepted(bounds, node);
        match &self.block {
            _ if keywords.is_empty() => (Vec::new(), None),
            Some(block) => (Vec::new(), Some(block.clone())),
            None => (keywords, None),
        }
    }

    /// Item type of a list field, bounds moved into a constrained type
    fn list_item(&self, node: &str) -> String {
        let bounds = match &self.constraint {
            ValueConstraint::Literal(values) => return python::literal(values),
            ValueConstraint::Fixed(value) => return python::literal(std::slice::from_ref(value)),
            ValueConstraint::Free(bounds) => bounds,
        };
        let keywords = self.accepted(bounds, node);
        if keywords.is_empty() {
            return self.py_type.clone();
        }

        // Only str, int and float accept keywords
        let function = match self.py_type.as_str() {
            "str" => "pydantic.constr",
            "int" => "pydantic.conint",
            _ => "pydantic.confloat",
        };
        let args = match &self.block {
            Some(block) => format!("**{}", block),
            None => keywords
                .iter()
                .map(|(keyword, value)| format!("{}={}", keyword, value))
                .collect::<Vec<_>>()
                .join(", "),
        };
        format!("{}({})", function, args)
    }
}

/// Log bounds a field of `py_type` cannot enforce
fn warn_dropped(bounds: &Bounds, kept: &[(&'static str, String)], py_type: &str, node: &str) {
    let dropped: Vec<&str> = bounds
        .keywords()
        .into_iter()
        .map(|(keyword, _)| keyword)
        .filter(|keyword| !kept.iter().any(|(name, _)| name == keyword))
        .collect();
    if !dropped.is_empty() {
        tracing::warn!(node, py_type, ?dropped, "facets not enforced for this type");
    }
}

/// Python literal for an XSD `default`/`fixed` value of a mapped type
fn value_literal(py_type: &str, value: &str) -> String {
    match py_type {
        "int" | "float" => python::bound_literal(value),
        "bool" => match value.trim() {
            "true" | "1" => "True".to_string(),
            _ => "False".to_string(),
        },
        _ => python::string_literal(value),
    }
}

fn description(documentation: Option<&str>) -> Option<String> {
    documentation.map(python::flatten).filter(|d| !d.is_empty())
}

/// Renders the classes and constraint blocks of one schema
pub(crate) struct Emitter<'s> {
    schema: &'s Schema,
    settings: &'s Settings,
    names: NameRegistry,
    hints: ListHints,
    class_names: HashMap<ComplexTypeId, String>,
    block_names: HashMap<SimpleTypeId, String>,
    emitting: HashSet<ComplexTypeId>,
    classes: Vec<String>,
    forward_refs: IndexSet<String>,
}

impl<'s> Emitter<'s> {
    pub(crate) fn new(schema: &'s Schema, settings: &'s Settings) -> Result<Self> {
        let mut names = NameRegistry::default();
        names.register(&settings.base_class_name, TypeKey::Reserved, &settings.base_class_name)?;
        names.register(&settings.wrapper_class_name, TypeKey::Reserved, &settings.wrapper_class_name)?;

        Ok(Self {
            schema,
            settings,
            names,
            hints: ListHints::new(),
            class_names: HashMap::new(),
            block_names: HashMap::new(),
            emitting: HashSet::new(),
            classes: Vec::new(),
            forward_refs: IndexSet::new(),
        })
    }

    /// Constraint block of a named simple type
    pub(crate) fn simple_block(&mut self, id: SimpleTypeId) -> Result<String> {
        let schema = self.schema;
        let simple = schema.simple_type(id);
        let original = simple.name.as_deref().unwrap_or_default();
        let name = self.block_name(id)?;

        let mut lines = vec![
            format!("{} = dict(", name),
            format!("{INDENT}# {} ({})", original, simple.primitive.name),
        ];
        if let Some(doc) = description(simple.documentation.as_deref()) {
            lines.push(format!("{INDENT}# {}", doc));
        }
        if let Some(bounds) = ValueConstraint::from_facets(&simple.facets).bounds() {
            let keywords = match map_primitive(&simple.primitive, original) {
                Ok(py_type) => {
                    let kept = bounds.keywords_for(py_type);
                    warn_dropped(bounds, &kept, py_type, original);
                    kept
                }
                // Unmapped primitives fail where the type is used
                Err(_) => bounds.keywords(),
            };
            for (keyword, value) in keywords {
                lines.push(format!("{INDENT}{}={},", keyword, value));
            }
        }
        lines.push(")".to_string());

        tracing::debug!(block = %name, original, "constraint block emitted");
        Ok(lines.join("\n"))
    }

    fn block_name(&mut self, id: SimpleTypeId) -> Result<String> {
        if let Some(name) = self.block_names.get(&id) {
            return Ok(name.clone());
        }
        let schema = self.schema;
        let original = schema.simple_type(id).name.as_deref().unwrap_or_default();
        let name = resolve_type_name(original, self.settings.language);
        self.names.register(&name, TypeKey::Simple(id), original)?;
        self.block_names.insert(id, name.clone());
        Ok(name)
    }

    /// Emit the class of a complex type (and the classes it needs) into `out`.
    ///
    /// Returns the class name; already emitted types are not rendered again.
    pub(crate) fn class(&mut self, id: ComplexTypeId, out: &mut Vec<String>) -> Result<String> {
        if let Some(name) = self.class_names.get(&id) {
            return Ok(name.clone());
        }

        let schema = self.schema;
        let complex = schema.complex_type(id);
        let original = complex.display_name();
        let name = resolve_type_name(original, self.settings.language);
        self.names.register(&name, TypeKey::Complex(id), &complex.path)?;
        self.class_names.insert(id, name.clone());
        self.emitting.insert(id);

        let mut fields = Vec::new();
        let mut forward = false;

        for attribute in &complex.attributes {
            fields.push(self.attribute_field(attribute, original)?);
        }
        if let Some(text) = &complex.text {
            let node = format!("{}/{}", original, self.settings.text_key);
            let value = self.value_type(text, &node, out, &mut forward)?;
            let (keywords, splat) = value.field_constraints(&node);
            let (py_type, default) = match &value.constraint {
                ValueConstraint::Literal(values) => (python::literal(values), FieldDefault::Required),
                ValueConstraint::Fixed(fixed) => (
                    python::literal(std::slice::from_ref(fixed)),
                    FieldDefault::Value(python::string_literal(fixed)),
                ),
                ValueConstraint::Free(_) => (value.py_type.clone(), FieldDefault::Required),
            };
            fields.push(Field {
                name: resolve_field_name(&self.settings.text_key, self.settings.language),
                py_type,
                alias: self.settings.text_key.clone(),
                description: None,
                default,
                keywords,
                splat,
                comment: Vec::new(),
            });
        }
        for element in &complex.elements {
            fields.push(self.element_field(element, out, &mut forward)?);
        }
        check_field_names(&fields, original)?;

        let mut lines = vec![format!("class {}({}):", name, self.settings.base_class_name)];
        match description(complex.documentation.as_deref()) {
            Some(_) => {
                lines.push(format!("{INDENT}\"\"\"{}", python::docstring_text(original)));
                lines.push(String::new());
                for line in complex.documentation.iter().flat_map(|d| d.lines()) {
                    let line = line.trim();
                    if !line.is_empty() {
                        lines.push(format!("{INDENT}{}", python::docstring_text(line)));
                    }
                }
                lines.push(format!("{INDENT}\"\"\""));
            }
            None => lines.push(format!("{INDENT}\"\"\"{}\"\"\"", python::docstring_text(original))),
        }
        for field in &fields {
            lines.push(field.render());
        }

        out.push(lines.join("\n"));
        self.emitting.remove(&id);
        self.classes.push(name.clone());
        if forward {
            self.forward_refs.insert(name.clone());
        }

        tracing::debug!(class = %name, original, fields = fields.len(), "class emitted");
        Ok(name)
    }

    fn value_type(&mut self, type_ref: &TypeRef, node: &str, out: &mut Vec<String>, forward: &mut bool) -> Result<ValueType> {
        match type_ref {
            TypeRef::Builtin(builtin) => Ok(ValueType::plain(map_primitive(builtin, node)?)),
            TypeRef::Simple(id) => {
                let schema = self.schema;
                let simple = schema.simple_type(*id);
                let py_type = map_primitive(&simple.primitive, node)?;
                let block = if simple.is_anonymous() {
                    None
                } else {
                    Some(self.block_name(*id)?)
                };
                Ok(ValueType {
                    py_type: py_type.to_string(),
                    constraint: ValueConstraint::from_facets(&simple.facets),
                    block,
                })
            }
            TypeRef::Complex(id) => {
                if self.emitting.contains(id) {
                    *forward = true;
                    let name = self.class_names.get(id).cloned().unwrap_or_default();
                    return Ok(ValueType::plain(python::string_literal(&name)));
                }
                Ok(ValueType::plain(self.class(*id, out)?))
            }
        }
    }

    fn attribute_field(&mut self, attribute: &Attribute, owner: &str) -> Result<Field> {
        let node = format!("{}/@{}", owner, attribute.name);
        let mut value = self.value_type(&attribute.type_ref, &node, &mut Vec::new(), &mut false)?;
        if let Some(fixed) = &attribute.fixed {
            value.constraint = ValueConstraint::Fixed(fixed.clone());
        }
        let required = attribute.use_ == AttributeUse::Required;
        let (keywords, splat) = value.field_constraints(&node);

        let (py_type, default) = match &value.constraint {
            ValueConstraint::Fixed(fixed) => (
                python::literal(std::slice::from_ref(fixed)),
                FieldDefault::Value(python::string_literal(fixed)),
            ),
            ValueConstraint::Literal(values) => (
                python::literal(values),
                match &attribute.default {
                    Some(default) if !required => FieldDefault::Value(python::string_literal(default)),
                    _ if required => FieldDefault::Required,
                    _ => FieldDefault::None,
                },
            ),
            ValueConstraint::Free(_) => (
                value.py_type.clone(),
                match &attribute.default {
                    Some(default) if !required => FieldDefault::Value(value_literal(&value.py_type, default)),
                    _ if required => FieldDefault::Required,
                    _ => FieldDefault::None,
                },
            ),
        };
        let py_type = if required { py_type } else { python::optional(&py_type) };

        let use_ = if required { "required" } else { "optional" };
        Ok(Field {
            name: resolve_field_name(&attribute.name, self.settings.language),
            py_type,
            alias: format!("{}{}", self.settings.attribute_prefix, attribute.name),
            description: description(attribute.documentation.as_deref()),
            default,
            keywords,
            splat,
            comment: vec![format!("use={}", use_)],
        })
    }

    pub(crate) fn element_field(&mut self, element: &Element, out: &mut Vec<String>, forward: &mut bool) -> Result<Field> {
        let value = self.value_type(&element.type_ref, &element.name, out, forward)?;
        let shape = Cardinality::resolve(element.occurs, element.model);

        let mut keywords = Vec::new();
        let mut splat = None;
        let mut default = FieldDefault::Required;

        let mut py_type = if shape.is_list {
            self.hints.insert(&element.name);
            default = FieldDefault::Factory;
            if let Some(min) = shape.min_items {
                keywords.push(("min_items", min.to_string()));
            }
            if let Some(max) = shape.max_items {
                keywords.push(("max_items", max.to_string()));
            }
            python::list(&value.list_item(&element.name))
        } else {
            let (own, block) = value.field_constraints(&element.name);
            keywords.extend(own);
            splat = block;
            match &value.constraint {
                ValueConstraint::Literal(values) => python::literal(values),
                ValueConstraint::Fixed(fixed) => {
                    default = FieldDefault::Value(python::string_literal(fixed));
                    python::literal(std::slice::from_ref(fixed))
                }
                ValueConstraint::Free(_) => value.py_type.clone(),
            }
        };

        if shape.is_optional {
            py_type = python::optional(&py_type);
            if default == FieldDefault::Required {
                default = FieldDefault::None;
            }
        }

        let mut comment = vec![element.occurs.to_string()];
        if shape.from_choice {
            comment.push("choice → optional".to_string());
        }

        Ok(Field {
            name: resolve_field_name(&element.name, self.settings.language),
            py_type,
            alias: element.name.clone(),
            description: description(element.documentation.as_deref()),
            default,
            keywords,
            splat,
            comment,
        })
    }

    /// Field for a top-level element, as held by the wrapper class
    pub(crate) fn root_field(&mut self, element: &Element, out: &mut Vec<String>) -> Result<Field> {
        let root = Element {
            occurs: Occurs::once(),
            model: ModelKind::Sequence,
            ..element.clone()
        };
        self.element_field(&root, out, &mut false)
    }

    /// Class names in emission order, list hints, classes needing forward-ref resolution
    pub(crate) fn finish(self) -> (Vec<String>, ListHints, Vec<String>) {
        (self.classes, self.hints, self.forward_refs.into_iter().collect())
    }
}

fn check_field_names(fields: &[Field], owner: &str) -> Result<()> {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for field in fields {
        if let Some(first) = seen.insert(&field.name, &field.alias) {
            return Err(Error::NameCollision {
                identifier: format!("{}.{}", owner, field.name),
                first: first.to_string(),
                second: field.alias.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn emit(xsd_body: &str) -> Result<Vec<String>> {
        let schema = Schema::from_string(&format!(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">{}</xs:schema>"#,
            xsd_body
        ))?;
        let settings = Settings::default();
        let mut emitter = Emitter::new(&schema, &settings)?;
        let mut out = Vec::new();
        for id in schema.global_complex_types.clone() {
            emitter.class(id, &mut out)?;
        }
        Ok(out)
    }

    #[test]
    fn test_field_render() {
        let field = Field {
            name: "kod".to_string(),
            py_type: "str".to_string(),
            alias: "@Код".to_string(),
            description: Some("Код товара".to_string()),
            default: FieldDefault::Required,
            keywords: vec![("max_length", "3".to_string())],
            splat: None,
            comment: vec!["use=required".to_string()],
        };
        assert_eq!(
            field.render(),
            "    kod: str = pydantic.Field(\n        alias='@Код',\n        description='Код товара',\n        max_length=3,\n    )  # use=required"
        );
    }

    #[test]
    fn test_registry_detects_collision() {
        let mut registry = NameRegistry::default();
        registry
            .register("AdresTip", TypeKey::Complex(ComplexTypeId(0)), "АдресТип")
            .unwrap();
        registry
            .register("AdresTip", TypeKey::Complex(ComplexTypeId(0)), "АдресТип")
            .unwrap();
        let err = registry
            .register("AdresTip", TypeKey::Complex(ComplexTypeId(1)), "адресТип")
            .unwrap_err();
        assert!(matches!(err, Error::NameCollision { first, second, .. } if first == "АдресТип" && second == "адресТип"));
    }

    #[test]
    fn test_class_with_attributes_and_elements() {
        let out = emit(
            r#"<xs:complexType name="Товар">
                 <xs:sequence>
                   <xs:element name="Наим" type="xs:string"/>
                 </xs:sequence>
                 <xs:attribute name="Код" type="xs:integer" use="required"/>
               </xs:complexType>"#,
        )
        .unwrap();

        assert_eq!(
            out,
            vec![[
                "class Tovar(XmlBaseClass):",
                "    \"\"\"Товар\"\"\"",
                "    kod: int = pydantic.Field(",
                "        alias='@Код',",
                "    )  # use=required",
                "    naim: str = pydantic.Field(",
                "        alias='Наим',",
                "    )  # [1..1]",
            ]
            .join("\n")]
        );
    }

    #[test]
    fn test_nested_anonymous_class_comes_first() {
        let out = emit(
            r#"<xs:complexType name="Outer"><xs:sequence>
                 <xs:element name="Inner"><xs:complexType><xs:sequence>
                   <xs:element name="Value" type="xs:string"/>
                 </xs:sequence></xs:complexType></xs:element>
               </xs:sequence></xs:complexType>"#,
        )
        .unwrap();

        assert_eq!(out.len(), 2);
        assert!(out[0].starts_with("class Inner(XmlBaseClass):"));
        assert!(out[1].starts_with("class Outer(XmlBaseClass):"));
        assert!(out[1].contains("    inner: Inner = pydantic.Field("));
    }

    #[test]
    fn test_self_reference_is_forward_ref() {
        let schema = Schema::from_string(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                 <xs:complexType name="Node"><xs:sequence>
                   <xs:element name="Child" type="Node" minOccurs="0" maxOccurs="unbounded"/>
                 </xs:sequence></xs:complexType>
               </xs:schema>"#,
        )
        .unwrap();
        let settings = Settings::default();
        let mut emitter = Emitter::new(&schema, &settings).unwrap();
        let mut out = Vec::new();
        emitter.class(schema.global_complex_types[0], &mut out).unwrap();

        assert!(out[0].contains("child: typing.Optional[typing.List['Node']] = pydantic.Field("));
        let (classes, hints, forward) = emitter.finish();
        assert_eq!(classes, vec!["Node"]);
        assert!(hints.contains("Child"));
        assert_eq!(forward, vec!["Node"]);
    }

    #[test]
    fn test_list_item_bounds_become_constrained_type() {
        let out = emit(
            r#"<xs:complexType name="T"><xs:sequence>
                 <xs:element name="Code" maxOccurs="3">
                   <xs:simpleType><xs:restriction base="xs:string"><xs:maxLength value="5"/></xs:restriction></xs:simpleType>
                 </xs:element>
               </xs:sequence></xs:complexType>"#,
        )
        .unwrap();

        assert!(out[0].contains("code: typing.List[pydantic.constr(max_length=5)] = pydantic.Field("));
        assert!(out[0].contains("        default_factory=list,\n        min_items=1,\n        max_items=3,"));
    }

    #[test]
    fn test_unenforceable_bounds_are_dropped() {
        let out = emit(
            r#"<xs:complexType name="T"><xs:sequence>
                 <xs:element name="Day" maxOccurs="3">
                   <xs:simpleType><xs:restriction base="xs:date"><xs:maxInclusive value="2030-12-31"/></xs:restriction></xs:simpleType>
                 </xs:element>
                 <xs:element name="Num">
                   <xs:simpleType><xs:restriction base="xs:int"><xs:maxLength value="5"/><xs:maxExclusive value="10"/></xs:restriction></xs:simpleType>
                 </xs:element>
               </xs:sequence></xs:complexType>"#,
        )
        .unwrap();

        assert!(out[0].contains("day: typing.List[datetime.date] = pydantic.Field("));
        assert!(out[0].contains("    num: int = pydantic.Field(\n        alias='Num',\n        lt=10,\n    )"));
        assert!(!out[0].contains("max_length"));
        assert!(!out[0].contains("2030"));
    }

    #[test]
    fn test_field_collision_in_class() {
        let err = emit(
            r#"<xs:complexType name="T">
                 <xs:sequence><xs:element name="Kod" type="xs:string"/></xs:sequence>
                 <xs:attribute name="kod" type="xs:string"/>
               </xs:complexType>"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::NameCollision { identifier, .. } if identifier == "T.kod"));
    }

    #[test]
    fn test_value_literal() {
        assert_eq!(value_literal("int", "05"), "5");
        assert_eq!(value_literal("bool", "true"), "True");
        assert_eq!(value_literal("str", "RU"), "'RU'");
    }
}
