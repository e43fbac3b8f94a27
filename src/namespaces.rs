//! XML namespace handling
//!
//! Qualified names and prefix resolution for type and component references
//! found in schema attributes (`type="xs:string"`, `ref="tns:Address"`).

use crate::error::{ParseError, Result};
use crate::names::split_qname;
use std::fmt;

/// XSD 1.0 namespace
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// Qualified name (QName) - combination of namespace and local name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// Namespace URI (None for no namespace)
    pub namespace: Option<String>,
    /// Local name
    pub local_name: String,
}

impl QName {
    /// Create a new QName
    pub fn new(namespace: Option<impl Into<String>>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(|s| s.into()),
            local_name: local_name.into(),
        }
    }

    /// Create a QName without a namespace
    pub fn local(local_name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local_name: local_name.into(),
        }
    }

    /// Create a QName with a namespace
    pub fn namespaced(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local_name: local_name.into(),
        }
    }

    /// Whether this name lives in the XSD namespace
    pub fn is_xsd(&self) -> bool {
        self.namespace.as_deref() == Some(XSD_NAMESPACE)
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local_name),
            None => write!(f, "{}", self.local_name),
        }
    }
}

/// Resolve a prefixed name against the in-scope namespace declarations of `node`.
///
/// An unprefixed name with no default namespace in scope falls back to
/// `fallback`, which callers set to the schema's target namespace.
pub fn resolve_qname(node: roxmltree::Node<'_, '_>, prefixed: &str, fallback: Option<&str>) -> Result<QName> {
    match split_qname(prefixed) {
        (Some(prefix), local) => {
            let namespace = node.lookup_namespace_uri(Some(prefix)).ok_or_else(|| {
                ParseError::new(format!("unknown namespace prefix '{}' in '{}'", prefix, prefixed))
            })?;
            Ok(QName::namespaced(namespace, local))
        }
        (None, local) => {
            let namespace = node.lookup_namespace_uri(None).or(fallback);
            Ok(QName::new(namespace, local))
        }
    }
}
