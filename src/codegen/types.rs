//! XSD builtin to Python type mapping
//!
//! The table is fixed; an XSD builtin without an entry aborts generation.

use crate::error::{Error, Result};
use crate::schema::BuiltinType;

/// Python annotation for an XSD builtin, by local name in the XSD namespace
fn lookup(local_name: &str) -> Option<&'static str> {
    Some(match local_name {
        "string" | "normalizedString" | "token" | "anySimpleType" => "str",
        "integer" | "int" | "long" | "short" | "nonNegativeInteger" | "positiveInteger" => "int",
        "decimal" | "float" | "double" => "float",
        "boolean" => "bool",
        "date" => "datetime.date",
        "dateTime" => "datetime.datetime",
        "time" => "datetime.time",
        _ => return None,
    })
}

/// Map an XSD builtin to a Python type annotation.
///
/// `node` is the original name of the attribute or element using the type,
/// reported with [`Error::UnknownType`] on a miss.
pub fn map_primitive(builtin: &BuiltinType, node: &str) -> Result<&'static str> {
    lookup(&builtin.local_name).ok_or_else(|| Error::UnknownType {
        type_name: builtin.name.clone(),
        node: node.to_string(),
    })
}
