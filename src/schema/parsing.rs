//! XSD Document Parsing
//!
//! Builds a [`Schema`] from a single XSD document in two passes: global
//! declarations are registered by name first, so references can point
//! forward, then every top-level component is built. Type definitions are
//! memoized by their XML node, which gives each definition one stable id no
//! matter how many places reach it (element refs, group refs, type refs).
//!
//! Derivations by extension/restriction are merged in a final step, once
//! every definition exists, so a base type may itself use its derived types.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use roxmltree::{Document, Node, NodeId};

use super::components::{
    Attribute, AttributeUse, BuiltinType, ComplexType, ComplexTypeId, Element, Facets, SimpleType,
    SimpleTypeId, TypeRef,
};
use super::particles::{parse_occurs, ModelKind, Occurs};
use super::Schema;

use crate::error::{Error, ParseError, Result};
use crate::limits::Limits;
use crate::namespaces::{resolve_qname, XSD_NAMESPACE};

/// XSD element local names
mod xsd_elements {
    pub const SCHEMA: &str = "schema";
    pub const ELEMENT: &str = "element";
    pub const COMPLEX_TYPE: &str = "complexType";
    pub const SIMPLE_TYPE: &str = "simpleType";
    pub const ATTRIBUTE: &str = "attribute";
    pub const ATTRIBUTE_GROUP: &str = "attributeGroup";
    pub const GROUP: &str = "group";
    pub const SEQUENCE: &str = "sequence";
    pub const CHOICE: &str = "choice";
    pub const ALL: &str = "all";
    pub const ANNOTATION: &str = "annotation";
    pub const DOCUMENTATION: &str = "documentation";
    pub const NOTATION: &str = "notation";
    pub const RESTRICTION: &str = "restriction";
    pub const EXTENSION: &str = "extension";
    pub const LIST: &str = "list";
    pub const UNION: &str = "union";
    pub const COMPLEX_CONTENT: &str = "complexContent";
    pub const SIMPLE_CONTENT: &str = "simpleContent";
    pub const ANY: &str = "any";
    pub const ANY_ATTRIBUTE: &str = "anyAttribute";
    // Facets
    pub const PATTERN: &str = "pattern";
    pub const ENUMERATION: &str = "enumeration";
    pub const LENGTH: &str = "length";
    pub const MIN_LENGTH: &str = "minLength";
    pub const MAX_LENGTH: &str = "maxLength";
    pub const MIN_INCLUSIVE: &str = "minInclusive";
    pub const MAX_INCLUSIVE: &str = "maxInclusive";
    pub const MIN_EXCLUSIVE: &str = "minExclusive";
    pub const MAX_EXCLUSIVE: &str = "maxExclusive";
    pub const TOTAL_DIGITS: &str = "totalDigits";
    pub const FRACTION_DIGITS: &str = "fractionDigits";
    pub const WHITE_SPACE: &str = "whiteSpace";
    // Identity constraints, ignored
    pub const KEY: &str = "key";
    pub const KEYREF: &str = "keyref";
    pub const UNIQUE: &str = "unique";
}

/// XSD attribute names
mod xsd_attrs {
    pub const NAME: &str = "name";
    pub const TYPE: &str = "type";
    pub const REF: &str = "ref";
    pub const TARGET_NAMESPACE: &str = "targetNamespace";
    pub const DEFAULT: &str = "default";
    pub const FIXED: &str = "fixed";
    pub const BASE: &str = "base";
    pub const VALUE: &str = "value";
    pub const MIXED: &str = "mixed";
    pub const ABSTRACT: &str = "abstract";
    pub const SUBSTITUTION_GROUP: &str = "substitutionGroup";
    pub const MIN_OCCURS: &str = "minOccurs";
    pub const MAX_OCCURS: &str = "maxOccurs";
    pub const USE: &str = "use";
}

use xsd_attrs as attrs;
use xsd_elements as tags;

/// Parse an XSD document into a [`Schema`]
pub(crate) fn parse_schema(text: &str, limits: &Limits) -> Result<Schema> {
    let doc = Document::parse(text)?;
    let root = doc.root_element();

    if !is_xsd(root, tags::SCHEMA) {
        return Err(ParseError::new(format!(
            "expected xs:schema root element, got {}",
            root.tag_name().name()
        ))
        .into());
    }

    let builder = SchemaBuilder::new(root, limits)?;
    builder.build()
}

fn is_xsd(node: Node<'_, '_>, local: &str) -> bool {
    node.is_element()
        && node.tag_name().namespace() == Some(XSD_NAMESPACE)
        && node.tag_name().name() == local
}

/// Element children in the XSD namespace, annotations skipped
fn xsd_children<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|c| {
        c.is_element()
            && c.tag_name().namespace() == Some(XSD_NAMESPACE)
            && c.tag_name().name() != tags::ANNOTATION
    })
}

fn local_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Text of the first xs:documentation of the node's annotation
fn documentation(node: Node<'_, '_>) -> Option<String> {
    let annotation = node.children().find(|c| is_xsd(*c, tags::ANNOTATION))?;
    let doc = annotation.children().find(|c| is_xsd(*c, tags::DOCUMENTATION))?;
    let text: String = doc
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect();
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn location(node: Node<'_, '_>) -> String {
    let pos = node.document().text_pos_at(node.range().start);
    format!("{}:{}", pos.row, pos.col)
}

fn parse_error(node: Node<'_, '_>, component: &str, message: impl Into<String>) -> Error {
    ParseError::new(message)
        .with_component(component)
        .with_location(location(node))
        .into()
}

/// Attach component and location to a bare parse error
fn with_context(err: Error, node: Node<'_, '_>, component: &str) -> Error {
    match err {
        Error::Parse(pe) => Error::Parse(pe.with_component(component).with_location(location(node))),
        other => other,
    }
}

fn occurs_of(node: Node<'_, '_>, component: &str) -> Result<Occurs> {
    parse_occurs(node.attribute(attrs::MIN_OCCURS), node.attribute(attrs::MAX_OCCURS))
        .map_err(|e| with_context(e, node, component))
}

fn is_true(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some("true") | Some("1"))
}

/// Restriction facets declared directly on a restriction node
fn parse_facets(node: Node<'_, '_>, component: &str) -> Result<Facets> {
    let mut facets = Facets::default();
    for child in xsd_children(node) {
        if local_name(child) != tags::SIMPLE_TYPE {
            parse_facet(child, component, &mut facets)?;
        }
    }
    Ok(facets)
}

/// Add one facet element to `facets`
fn parse_facet(child: Node<'_, '_>, component: &str, facets: &mut Facets) -> Result<()> {
    let name = local_name(child);
    let value = child
        .attribute(attrs::VALUE)
        .ok_or_else(|| parse_error(child, component, format!("xs:{} facet without 'value'", name)))?;
    let length = || {
        value
            .trim()
            .parse::<u64>()
            .map_err(|_| parse_error(child, component, format!("xs:{} value '{}' is not a non-negative integer", name, value)))
    };

    match name {
        tags::LENGTH => {
            let len = length()?;
            facets.min_length = Some(len);
            facets.max_length = Some(len);
        }
        tags::MIN_LENGTH => facets.min_length = Some(length()?),
        tags::MAX_LENGTH => facets.max_length = Some(length()?),
        tags::PATTERN => facets.patterns.push(value.to_string()),
        tags::ENUMERATION => facets.enumeration.push(value.to_string()),
        tags::MIN_INCLUSIVE => facets.min_inclusive = Some(value.trim().to_string()),
        tags::MAX_INCLUSIVE => facets.max_inclusive = Some(value.trim().to_string()),
        tags::MIN_EXCLUSIVE => facets.min_exclusive = Some(value.trim().to_string()),
        tags::MAX_EXCLUSIVE => facets.max_exclusive = Some(value.trim().to_string()),
        tags::TOTAL_DIGITS | tags::FRACTION_DIGITS | tags::WHITE_SPACE => {}
        other => return Err(Error::unsupported(format!("xs:{} facet", other), component)),
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum GlobalKind {
    SimpleType,
    ComplexType,
    Element,
    Attribute,
    Group,
    AttributeGroup,
}

impl GlobalKind {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            tags::SIMPLE_TYPE => Some(Self::SimpleType),
            tags::COMPLEX_TYPE => Some(Self::ComplexType),
            tags::ELEMENT => Some(Self::Element),
            tags::ATTRIBUTE => Some(Self::Attribute),
            tags::GROUP => Some(Self::Group),
            tags::ATTRIBUTE_GROUP => Some(Self::AttributeGroup),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::SimpleType => "simpleType",
            Self::ComplexType => "complexType",
            Self::Element => "element",
            Self::Attribute => "attribute",
            Self::Group => "group",
            Self::AttributeGroup => "attributeGroup",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DerivationMethod {
    Extension,
    Restriction,
}

impl DerivationMethod {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            tags::EXTENSION => Some(Self::Extension),
            tags::RESTRICTION => Some(Self::Restriction),
            _ => None,
        }
    }
}

/// Pending complex type derivation, merged after all types are built
#[derive(Debug, Clone)]
struct Derivation {
    base: ComplexTypeId,
    method: DerivationMethod,
    simple_content: bool,
    prohibited: Vec<String>,
    /// Facets of a simpleContent restriction, applied to the inherited text type
    text_facets: Option<Facets>,
}

struct SchemaBuilder<'a, 'input> {
    limits: &'a Limits,
    target_namespace: Option<String>,
    globals: HashMap<GlobalKind, IndexMap<String, Node<'a, 'input>>>,
    simple_types: Vec<SimpleType>,
    complex_types: Vec<ComplexType>,
    simple_ids: HashMap<NodeId, SimpleTypeId>,
    complex_ids: HashMap<NodeId, ComplexTypeId>,
    simple_in_progress: HashSet<NodeId>,
    derivations: IndexMap<ComplexTypeId, Derivation>,
}

impl<'a, 'input> SchemaBuilder<'a, 'input> {
    /// First pass: register global declarations by name
    fn new(root: Node<'a, 'input>, limits: &'a Limits) -> Result<Self> {
        let mut globals: HashMap<GlobalKind, IndexMap<String, Node<'a, 'input>>> = HashMap::new();

        for child in root.children().filter(|c| c.is_element()) {
            if child.tag_name().namespace() != Some(XSD_NAMESPACE) {
                continue;
            }
            let tag = local_name(child);
            if tag == tags::ANNOTATION || tag == tags::NOTATION {
                continue;
            }
            let kind = GlobalKind::from_tag(tag).ok_or_else(|| Error::unsupported(format!("xs:{}", tag), "schema"))?;
            let name = child.attribute(attrs::NAME).ok_or_else(|| {
                parse_error(child, "schema", format!("global xs:{} missing 'name' attribute", tag))
            })?;

            if globals.entry(kind).or_default().insert(name.to_string(), child).is_some() {
                return Err(parse_error(child, name, format!("duplicate global xs:{} declaration", tag)));
            }
        }

        Ok(Self {
            limits,
            target_namespace: root.attribute(attrs::TARGET_NAMESPACE).map(String::from),
            globals,
            simple_types: Vec::new(),
            complex_types: Vec::new(),
            simple_ids: HashMap::new(),
            complex_ids: HashMap::new(),
            simple_in_progress: HashSet::new(),
            derivations: IndexMap::new(),
        })
    }

    fn globals_of(&self, kind: GlobalKind) -> Vec<(String, Node<'a, 'input>)> {
        self.globals
            .get(&kind)
            .map(|map| map.iter().map(|(name, node)| (name.clone(), *node)).collect())
            .unwrap_or_default()
    }

    /// Second pass: build every top-level component
    fn build(mut self) -> Result<Schema> {
        let mut global_simple_types = Vec::new();
        for (name, node) in self.globals_of(GlobalKind::SimpleType) {
            global_simple_types.push(self.simple_type(node, &name)?);
        }

        let mut global_complex_types = Vec::new();
        for (name, node) in self.globals_of(GlobalKind::ComplexType) {
            global_complex_types.push(self.complex_type(node, &name)?);
        }

        let mut elements = Vec::new();
        for (name, node) in self.globals_of(GlobalKind::Element) {
            self.check_substitution(node, &name)?;
            let type_ref = self.element_type(node, &name)?;
            elements.push(Element {
                name,
                type_ref,
                occurs: Occurs::once(),
                model: ModelKind::Sequence,
                documentation: documentation(node),
            });
        }

        self.resolve_derivations()?;

        Ok(Schema {
            target_namespace: self.target_namespace,
            simple_types: self.simple_types,
            complex_types: self.complex_types,
            global_simple_types,
            global_complex_types,
            elements,
        })
    }

    fn check_components(&self) -> Result<()> {
        self.limits
            .check_components(self.simple_types.len() + self.complex_types.len())
    }

    /// Find the global declaration a `ref` points to
    fn global(&self, kind: GlobalKind, node: Node<'a, 'input>, reference: &str, owner: &str) -> Result<Node<'a, 'input>> {
        let qname = resolve_qname(node, reference, self.target_namespace.as_deref())
            .map_err(|e| with_context(e, node, owner))?;
        if qname.namespace != self.target_namespace {
            return Err(Error::unsupported(
                format!("reference to {} '{}' in foreign namespace", kind.label(), reference),
                owner,
            ));
        }
        self.globals
            .get(&kind)
            .and_then(|map| map.get(&qname.local_name))
            .copied()
            .ok_or_else(|| parse_error(node, owner, format!("unresolved {} reference '{}'", kind.label(), reference)))
    }

    /// Resolve a `type`/`base` attribute value
    fn resolve_type(&mut self, node: Node<'a, 'input>, reference: &str, owner: &str) -> Result<TypeRef> {
        let qname = resolve_qname(node, reference, self.target_namespace.as_deref())
            .map_err(|e| with_context(e, node, owner))?;

        if qname.is_xsd() {
            return Ok(TypeRef::Builtin(BuiltinType::new(reference, qname.local_name)));
        }
        if qname.namespace != self.target_namespace {
            return Err(Error::unsupported(
                format!("reference to type '{}' in foreign namespace", reference),
                owner,
            ));
        }

        let simple = self
            .globals
            .get(&GlobalKind::SimpleType)
            .and_then(|map| map.get(&qname.local_name))
            .copied();
        if let Some(simple) = simple {
            return Ok(TypeRef::Simple(self.simple_type(simple, &qname.local_name)?));
        }

        let complex = self
            .globals
            .get(&GlobalKind::ComplexType)
            .and_then(|map| map.get(&qname.local_name))
            .copied();
        if let Some(complex) = complex {
            return Ok(TypeRef::Complex(self.complex_type(complex, &qname.local_name)?));
        }

        Err(parse_error(node, owner, format!("unresolved type reference '{}'", reference)))
    }

    fn simple_type(&mut self, node: Node<'a, 'input>, owner: &str) -> Result<SimpleTypeId> {
        if let Some(&id) = self.simple_ids.get(&node.id()) {
            return Ok(id);
        }

        let name = node.attribute(attrs::NAME).map(String::from);
        let component = name.clone().unwrap_or_else(|| owner.to_string());

        if !self.simple_in_progress.insert(node.id()) {
            return Err(parse_error(node, &component, "circular simple type derivation"));
        }

        let mut derived = None;
        for child in xsd_children(node) {
            match local_name(child) {
                tags::RESTRICTION => derived = Some(self.simple_restriction(child, &component)?),
                tags::LIST => return Err(Error::unsupported("xs:list simple type", component)),
                tags::UNION => return Err(Error::unsupported("xs:union simple type", component)),
                other => return Err(Error::unsupported(format!("xs:{} in simpleType", other), component)),
            }
        }
        let (primitive, facets) =
            derived.ok_or_else(|| parse_error(node, &component, "simpleType without xs:restriction"))?;

        self.simple_in_progress.remove(&node.id());

        let id = SimpleTypeId(self.simple_types.len());
        self.simple_types.push(SimpleType {
            name,
            primitive,
            facets,
            documentation: documentation(node),
        });
        self.simple_ids.insert(node.id(), id);
        self.check_components()?;

        Ok(id)
    }

    fn simple_restriction(&mut self, node: Node<'a, 'input>, component: &str) -> Result<(BuiltinType, Facets)> {
        let base = match node.attribute(attrs::BASE) {
            Some(base) => self.resolve_type(node, base, component)?,
            None => {
                let inline = xsd_children(node)
                    .find(|c| local_name(*c) == tags::SIMPLE_TYPE)
                    .ok_or_else(|| parse_error(node, component, "xs:restriction without base"))?;
                TypeRef::Simple(self.simple_type(inline, component)?)
            }
        };

        let (primitive, inherited) = self
            .simple_base(base)
            .ok_or_else(|| parse_error(node, component, "simple type cannot restrict a complex type"))?;

        let own = parse_facets(node, component)?;
        Ok((primitive, inherited.restrict(own)))
    }

    /// Primitive and effective facets of a simple base; `None` for complex types
    fn simple_base(&self, base: TypeRef) -> Option<(BuiltinType, Facets)> {
        match base {
            TypeRef::Builtin(builtin) => Some((builtin, Facets::default())),
            TypeRef::Simple(id) => {
                let base = &self.simple_types[id.0];
                Some((base.primitive.clone(), base.facets.clone()))
            }
            TypeRef::Complex(_) => None,
        }
    }

    /// Anonymous simple type narrowing a text type by `own`
    fn restricted_text(&mut self, base: Option<TypeRef>, own: Facets, component: &str) -> Result<TypeRef> {
        let Some((primitive, inherited)) = base.and_then(|base| self.simple_base(base)) else {
            return Err(ParseError::new("simple content restriction of a type without text")
                .with_component(component)
                .into());
        };

        let id = SimpleTypeId(self.simple_types.len());
        self.simple_types.push(SimpleType {
            name: None,
            primitive,
            facets: inherited.restrict(own),
            documentation: None,
        });
        self.check_components()?;
        Ok(TypeRef::Simple(id))
    }

    fn complex_type(&mut self, node: Node<'a, 'input>, owner: &str) -> Result<ComplexTypeId> {
        if let Some(&id) = self.complex_ids.get(&node.id()) {
            return Ok(id);
        }

        let name = node.attribute(attrs::NAME).map(String::from);
        let owner = name.clone().unwrap_or_else(|| owner.to_string());

        // Reserve the id first so self-references resolve to it
        let id = ComplexTypeId(self.complex_types.len());
        self.complex_types.push(ComplexType {
            name,
            owner: owner.rsplit('/').next().unwrap_or_default().to_string(),
            path: owner.clone(),
            ..Default::default()
        });
        self.complex_ids.insert(node.id(), id);
        self.check_components()?;

        if is_true(node.attribute(attrs::MIXED)) {
            return Err(Error::unsupported("mixed content", owner));
        }

        let mut attributes = Vec::new();
        let mut prohibited = Vec::new();
        let mut elements = Vec::new();
        let mut text = None;
        let mut derivation = None;

        for child in xsd_children(node) {
            match local_name(child) {
                tags::SEQUENCE | tags::CHOICE | tags::ALL | tags::GROUP => {
                    self.particle(child, &owner, Occurs::once(), None, 0, &mut elements)?;
                }
                tags::ATTRIBUTE | tags::ATTRIBUTE_GROUP => {
                    self.attribute_particle(child, &owner, 0, &mut attributes, &mut prohibited)?;
                }
                tags::ANY_ATTRIBUTE => return Err(Error::unsupported("xs:anyAttribute wildcard", owner)),
                tags::SIMPLE_CONTENT => {
                    let (value, base) = self.simple_content(child, &owner, &mut attributes, &mut prohibited)?;
                    text = value;
                    derivation = base.map(|(base, method, facets)| (base, method, true, facets));
                }
                tags::COMPLEX_CONTENT => {
                    if is_true(child.attribute(attrs::MIXED)) {
                        return Err(Error::unsupported("mixed content", owner));
                    }
                    derivation = self
                        .complex_content(child, &owner, &mut elements, &mut attributes, &mut prohibited)?
                        .map(|(base, method)| (base, method, false, None));
                }
                other => return Err(Error::unsupported(format!("xs:{} in complexType", other), owner)),
            }
        }

        if let Some((base, method, simple_content, text_facets)) = derivation {
            self.derivations.insert(
                id,
                Derivation {
                    base,
                    method,
                    simple_content,
                    prohibited,
                    text_facets,
                },
            );
        }

        let complex = &mut self.complex_types[id.0];
        complex.attributes = attributes;
        complex.elements = elements;
        complex.text = text;
        complex.documentation = documentation(node);

        Ok(id)
    }

    /// A model group, or a reference to a named one, flattened into `out`
    fn particle(
        &mut self,
        node: Node<'a, 'input>,
        owner: &str,
        outer: Occurs,
        parent: Option<ModelKind>,
        depth: usize,
        out: &mut Vec<Element>,
    ) -> Result<()> {
        self.limits.check_depth(depth, owner)?;

        if local_name(node) != tags::GROUP {
            return self.model_group(node, owner, outer, parent, depth, out);
        }

        let reference = node
            .attribute(attrs::REF)
            .ok_or_else(|| parse_error(node, owner, "xs:group without 'ref'"))?;
        let occurs = occurs_of(node, owner)?.scaled(outer);
        let group = self.global(GlobalKind::Group, node, reference, owner)?;

        match xsd_children(group).find(|c| ModelKind::from_tag(local_name(*c)).is_some()) {
            Some(model) => self.model_group(model, owner, occurs, parent, depth + 1, out),
            None => Ok(()),
        }
    }

    fn model_group(
        &mut self,
        node: Node<'a, 'input>,
        owner: &str,
        outer: Occurs,
        parent: Option<ModelKind>,
        depth: usize,
        out: &mut Vec<Element>,
    ) -> Result<()> {
        let kind = ModelKind::from_tag(local_name(node))
            .ok_or_else(|| parse_error(node, owner, format!("unexpected xs:{} in content model", local_name(node))))?;

        let mut factor = occurs_of(node, owner)?.scaled(outer);
        if parent == Some(ModelKind::Choice) {
            factor = factor.emptiable();
        }

        for child in xsd_children(node) {
            match local_name(child) {
                tags::ELEMENT => {
                    let element = self.element_particle(child, owner, kind, factor)?;
                    if element.occurs.max == Some(0) {
                        tracing::debug!(element = %element.name, owner, "prohibited particle skipped");
                    } else {
                        out.push(element);
                    }
                }
                tags::SEQUENCE | tags::CHOICE | tags::ALL | tags::GROUP => {
                    self.particle(child, owner, factor, Some(kind), depth + 1, out)?;
                }
                tags::ANY => return Err(Error::unsupported("xs:any wildcard", owner)),
                other => return Err(Error::unsupported(format!("xs:{} in xs:{}", other, kind), owner)),
            }
        }

        Ok(())
    }

    fn check_substitution(&self, node: Node<'_, '_>, name: &str) -> Result<()> {
        if node.attribute(attrs::SUBSTITUTION_GROUP).is_some() {
            return Err(Error::unsupported("substitution group", name));
        }
        if is_true(node.attribute(attrs::ABSTRACT)) {
            return Err(Error::unsupported("abstract element (substitution group head)", name));
        }
        Ok(())
    }

    fn element_particle(&mut self, node: Node<'a, 'input>, owner: &str, model: ModelKind, factor: Occurs) -> Result<Element> {
        let (name, declaration, path) = match node.attribute(attrs::REF) {
            Some(reference) => {
                let global = self.global(GlobalKind::Element, node, reference, owner)?;
                let name = global.attribute(attrs::NAME).unwrap_or_default().to_string();
                (name.clone(), global, name)
            }
            None => {
                let name = node
                    .attribute(attrs::NAME)
                    .ok_or_else(|| parse_error(node, owner, "xs:element without 'name' or 'ref'"))?;
                (name.to_string(), node, format!("{}/{}", owner, name))
            }
        };

        self.check_substitution(declaration, &name)?;
        let occurs = occurs_of(node, &name)?.scaled(factor);
        let type_ref = self.element_type(declaration, &path)?;

        Ok(Element {
            name,
            type_ref,
            occurs,
            model,
            documentation: documentation(node).or_else(|| documentation(declaration)),
        })
    }

    /// Type of an element declaration at `path`: `type` attribute or inline definition
    fn element_type(&mut self, node: Node<'a, 'input>, path: &str) -> Result<TypeRef> {
        if let Some(reference) = node.attribute(attrs::TYPE) {
            return self.resolve_type(node, reference, path);
        }

        for child in xsd_children(node) {
            match local_name(child) {
                tags::COMPLEX_TYPE => {
                    let id = self.complex_type(child, path)?;
                    let complex = &mut self.complex_types[id.0];
                    if complex.documentation.is_none() {
                        complex.documentation = documentation(node);
                    }
                    return Ok(TypeRef::Complex(id));
                }
                tags::SIMPLE_TYPE => return Ok(TypeRef::Simple(self.simple_type(child, path)?)),
                tags::KEY | tags::KEYREF | tags::UNIQUE => {}
                other => return Err(Error::unsupported(format!("xs:{} in xs:element", other), path)),
            }
        }

        // No type given: xs:anyType, which the type table rejects
        Ok(TypeRef::Builtin(BuiltinType::new("xs:anyType", "anyType")))
    }

    fn attribute_particle(
        &mut self,
        node: Node<'a, 'input>,
        owner: &str,
        depth: usize,
        out: &mut Vec<Attribute>,
        prohibited: &mut Vec<String>,
    ) -> Result<()> {
        self.limits.check_depth(depth, owner)?;

        if local_name(node) == tags::ATTRIBUTE {
            match self.attribute(node, owner)? {
                (_, Some(attribute)) => upsert_attribute(out, attribute),
                (name, None) => prohibited.push(name),
            }
            return Ok(());
        }

        let reference = node
            .attribute(attrs::REF)
            .ok_or_else(|| parse_error(node, owner, "xs:attributeGroup without 'ref'"))?;
        let group = self.global(GlobalKind::AttributeGroup, node, reference, owner)?;

        for child in xsd_children(group) {
            match local_name(child) {
                tags::ATTRIBUTE | tags::ATTRIBUTE_GROUP => {
                    self.attribute_particle(child, owner, depth + 1, out, prohibited)?;
                }
                tags::ANY_ATTRIBUTE => return Err(Error::unsupported("xs:anyAttribute wildcard", owner)),
                other => return Err(Error::unsupported(format!("xs:{} in xs:attributeGroup", other), owner)),
            }
        }

        Ok(())
    }

    /// Returns the attribute name and, unless prohibited, its declaration
    fn attribute(&mut self, node: Node<'a, 'input>, owner: &str) -> Result<(String, Option<Attribute>)> {
        let (name, declaration) = match node.attribute(attrs::REF) {
            Some(reference) => {
                let global = self.global(GlobalKind::Attribute, node, reference, owner)?;
                (global.attribute(attrs::NAME).unwrap_or_default().to_string(), global)
            }
            None => {
                let name = node
                    .attribute(attrs::NAME)
                    .ok_or_else(|| parse_error(node, owner, "xs:attribute without 'name' or 'ref'"))?;
                (name.to_string(), node)
            }
        };

        let Some(use_) = AttributeUse::parse(node.attribute(attrs::USE)) else {
            return Ok((name, None));
        };

        let type_ref = match declaration.attribute(attrs::TYPE) {
            Some(reference) => self.resolve_type(declaration, reference, &name)?,
            None => match xsd_children(declaration).find(|c| local_name(*c) == tags::SIMPLE_TYPE) {
                Some(inline) => TypeRef::Simple(self.simple_type(inline, &name)?),
                None => TypeRef::Builtin(BuiltinType::new("xs:anySimpleType", "anySimpleType")),
            },
        };
        if matches!(type_ref, TypeRef::Complex(_)) {
            return Err(parse_error(node, &name, "attribute cannot have a complex type"));
        }

        let attribute = Attribute {
            type_ref,
            use_,
            default: node
                .attribute(attrs::DEFAULT)
                .or_else(|| declaration.attribute(attrs::DEFAULT))
                .map(String::from),
            fixed: node
                .attribute(attrs::FIXED)
                .or_else(|| declaration.attribute(attrs::FIXED))
                .map(String::from),
            documentation: documentation(node).or_else(|| documentation(declaration)),
            name: name.clone(),
        };

        Ok((name, Some(attribute)))
    }

    /// xs:simpleContent: returns the text type, or the complex base to inherit it
    /// from along with the facets narrowing it
    #[allow(clippy::type_complexity)]
    fn simple_content(
        &mut self,
        node: Node<'a, 'input>,
        owner: &str,
        attributes: &mut Vec<Attribute>,
        prohibited: &mut Vec<String>,
    ) -> Result<(Option<TypeRef>, Option<(ComplexTypeId, DerivationMethod, Option<Facets>)>)> {
        let Some(child) = xsd_children(node).next() else {
            return Err(parse_error(node, owner, "empty xs:simpleContent"));
        };
        let method = DerivationMethod::from_tag(local_name(child))
            .ok_or_else(|| Error::unsupported(format!("xs:{} in xs:simpleContent", local_name(child)), owner))?;
        let base = child
            .attribute(attrs::BASE)
            .ok_or_else(|| parse_error(child, owner, "simple content derivation without 'base'"))?;

        let mut facets = None;
        for grandchild in xsd_children(child) {
            match local_name(grandchild) {
                tags::ATTRIBUTE | tags::ATTRIBUTE_GROUP => {
                    self.attribute_particle(grandchild, owner, 0, attributes, prohibited)?;
                }
                tags::ANY_ATTRIBUTE => return Err(Error::unsupported("xs:anyAttribute wildcard", owner)),
                tags::SIMPLE_TYPE => return Err(Error::unsupported("inline xs:simpleType in xs:simpleContent", owner)),
                _ if method == DerivationMethod::Restriction => {
                    parse_facet(grandchild, owner, facets.get_or_insert_with(Facets::default))?;
                }
                other => return Err(Error::unsupported(format!("xs:{} in xs:simpleContent extension", other), owner)),
            }
        }

        match self.resolve_type(child, base, owner)? {
            TypeRef::Complex(base) => Ok((None, Some((base, method, facets)))),
            value => match facets {
                Some(facets) => Ok((Some(self.restricted_text(Some(value), facets, owner)?), None)),
                None => Ok((Some(value), None)),
            },
        }
    }

    fn complex_content(
        &mut self,
        node: Node<'a, 'input>,
        owner: &str,
        elements: &mut Vec<Element>,
        attributes: &mut Vec<Attribute>,
        prohibited: &mut Vec<String>,
    ) -> Result<Option<(ComplexTypeId, DerivationMethod)>> {
        let Some(child) = xsd_children(node).next() else {
            return Err(parse_error(node, owner, "empty xs:complexContent"));
        };
        let method = DerivationMethod::from_tag(local_name(child))
            .ok_or_else(|| Error::unsupported(format!("xs:{} in xs:complexContent", local_name(child)), owner))?;
        let base = child
            .attribute(attrs::BASE)
            .ok_or_else(|| parse_error(child, owner, "complex content derivation without 'base'"))?;

        for grandchild in xsd_children(child) {
            match local_name(grandchild) {
                tags::SEQUENCE | tags::CHOICE | tags::ALL | tags::GROUP => {
                    self.particle(grandchild, owner, Occurs::once(), None, 0, elements)?;
                }
                tags::ATTRIBUTE | tags::ATTRIBUTE_GROUP => {
                    self.attribute_particle(grandchild, owner, 0, attributes, prohibited)?;
                }
                tags::ANY_ATTRIBUTE => return Err(Error::unsupported("xs:anyAttribute wildcard", owner)),
                other => return Err(Error::unsupported(format!("xs:{} in complex content", other), owner)),
            }
        }

        match self.resolve_type(child, base, owner)? {
            TypeRef::Complex(base) => Ok(Some((base, method))),
            TypeRef::Builtin(builtin) if builtin.local_name == "anyType" => Ok(None),
            _ => Err(parse_error(child, owner, format!("complex content cannot derive from simple type '{}'", base))),
        }
    }

    fn resolve_derivations(&mut self) -> Result<()> {
        let pending: Vec<ComplexTypeId> = self.derivations.keys().copied().collect();
        for id in pending {
            self.resolve_derivation(id, &mut Vec::new())?;
        }
        Ok(())
    }

    fn resolve_derivation(&mut self, id: ComplexTypeId, visiting: &mut Vec<ComplexTypeId>) -> Result<()> {
        let Some(derivation) = self.derivations.get(&id).cloned() else {
            return Ok(());
        };
        if visiting.contains(&id) {
            return Err(ParseError::new("circular complex type derivation")
                .with_component(self.complex_types[id.0].display_name())
                .into());
        }

        visiting.push(id);
        self.resolve_derivation(derivation.base, visiting)?;
        visiting.pop();

        let base = self.complex_types[derivation.base.0].clone();
        let derived = &mut self.complex_types[id.0];

        let mut attributes = base.attributes;
        for attribute in std::mem::take(&mut derived.attributes) {
            upsert_attribute(&mut attributes, attribute);
        }
        attributes.retain(|a| !derivation.prohibited.contains(&a.name));
        derived.attributes = attributes;

        if derivation.method == DerivationMethod::Extension && !derivation.simple_content {
            let own = std::mem::take(&mut derived.elements);
            derived.elements = base.elements;
            derived.elements.extend(own);
        }
        if derived.text.is_none() {
            derived.text = base.text;
        }

        if let Some(facets) = derivation.text_facets {
            let text = self.complex_types[id.0].text.clone();
            let path = self.complex_types[id.0].path.clone();
            let restricted = self.restricted_text(text, facets, &path)?;
            self.complex_types[id.0].text = Some(restricted);
        }

        self.derivations.shift_remove(&id);
        Ok(())
    }
}

fn upsert_attribute(attributes: &mut Vec<Attribute>, attribute: Attribute) {
    match attributes.iter_mut().find(|a| a.name == attribute.name) {
        Some(existing) => *existing = attribute,
        None => attributes.push(attribute),
    }
}
