//! # xsd2dto
//!
//! Compiles an XML Schema (XSD 1.0) document into Python source declaring
//! pydantic data classes that mirror the schema, for reading and writing
//! instance documents through an xmltodict-style reader.
//!
//! ## Features
//!
//! - Transliterated identifiers for Cyrillic schema names (Russian, Ukrainian)
//! - XSD builtins mapped through a fixed table; unknown types abort
//! - Length, pattern, range and enumeration facets as field constraints
//! - Lists and optionals from occurrence bounds and choice groups
//! - Named complex types emitted once, nested anonymous types inline
//! - List hints for tag names that must always be parsed as lists
//!
//! Unsupported constructs (wildcards, substitution groups, mixed content,
//! imports) are reported as errors rather than approximated.
//!
//! ## Example
//!
//! ```rust,ignore
//! use xsd2dto::{Generator, Schema, Settings};
//!
//! let schema = Schema::from_file("path/to/schema.xsd")?;
//! let generated = Generator::new(Settings::default()).generate(&schema)?;
//! print!("{}", generated.source);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod limits;

pub mod namespaces;
pub mod names;

pub mod loaders;
pub mod schema;

pub mod codegen;
pub mod settings;

pub use codegen::{Generated, Generator};
pub use error::{Error, Result};
pub use schema::Schema;
pub use settings::Settings;

use std::path::Path;

use loaders::Location;

/// Version of the xsd2dto library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Load the schema at `path` and generate its Python module
pub fn generate_from_file(path: impl AsRef<Path>, settings: Settings) -> Result<Generated> {
    let location = Location::Path(path.as_ref().to_path_buf());
    let schema = Schema::from_location(&location, &settings.limits)?;
    Generator::new(settings).generate(&schema)
}
