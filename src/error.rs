//! Error types for xsd2dto
//!
//! Every error is fatal: generation stops at the first one and no partial
//! output is produced. Errors always name the offending schema component by
//! its original (non-transliterated) name.

use std::fmt;
use thiserror::Error;

/// Result type alias using xsd2dto Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for schema loading and code generation
#[derive(Error, Debug)]
pub enum Error {
    /// An XSD builtin type has no entry in the type mapping table
    #[error("unknown type: '{type_name}' (used by '{node}') has no entry in the type mapping table")]
    UnknownType {
        /// The type reference exactly as written in the schema
        type_name: String,
        /// Original name of the attribute or element using the type
        node: String,
    },

    /// The schema uses a construct outside the supported subset
    #[error("unsupported construct: {construct} in '{node}'")]
    UnsupportedConstruct {
        /// Description of the construct
        construct: String,
        /// Original name of the component containing it
        node: String,
    },

    /// Two distinct components resolve to the same target identifier
    #[error("name collision: '{first}' and '{second}' both resolve to identifier '{identifier}'")]
    NameCollision {
        /// The generated identifier
        identifier: String,
        /// Original name of the component that claimed the identifier first
        first: String,
        /// Original name of the component that collided with it
        second: String,
    },

    /// Structurally invalid schema
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// XML well-formedness error
    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Resource loading error
    #[error("resource error: {0}")]
    Resource(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// Invalid generator settings
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Shorthand for [`Error::UnsupportedConstruct`]
    pub fn unsupported(construct: impl Into<String>, node: impl Into<String>) -> Self {
        Error::UnsupportedConstruct {
            construct: construct.into(),
            node: node.into(),
        }
    }
}

/// XML Schema parsing error
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Error message
    pub message: String,
    /// Location in the schema file
    pub location: Option<String>,
    /// Schema component that caused the error
    pub component: Option<String>,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
            component: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the component
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref component) = self.component {
            write!(f, " (in '{}')", component)?;
        }

        if let Some(ref loc) = self.location {
            write!(f, " at {}", loc)?;
        }

        Ok(())
    }
}

impl std::error::Error for ParseError {}
