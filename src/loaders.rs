//! Schema source loading
//!
//! Only local files and in-memory strings are supported; remote schema
//! resolution is out of scope.

use crate::error::{Error, Result};
use crate::limits::Limits;
use std::fs;
use std::path::PathBuf;

/// Where a schema comes from
#[derive(Debug, Clone)]
pub enum Location {
    /// File system path
    Path(PathBuf),
    /// In-memory schema text
    String(String),
}

impl Location {
    /// Human-readable form used in log and error messages
    pub fn as_str(&self) -> String {
        match self {
            Location::Path(p) => p.to_string_lossy().to_string(),
            Location::String(_) => "<string>".to_string(),
        }
    }
}

/// Resource loader for schemas
#[derive(Debug, Default)]
pub struct Loader {
    limits: Limits,
}

impl Loader {
    /// Create a new loader with default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Load a schema source as a string
    pub fn load(&self, location: &Location) -> Result<String> {
        let content = match location {
            Location::Path(path) => fs::read_to_string(path).map_err(|e| {
                Error::Resource(format!("failed to read schema '{}': {}", path.display(), e))
            })?,
            Location::String(s) => s.clone(),
        };

        self.limits.check_schema_size(content.len())?;
        tracing::debug!(location = %location.as_str(), bytes = content.len(), "loaded schema source");

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "<xs:schema/>").unwrap();

        let location = Location::Path(file.path().to_path_buf());
        let content = Loader::new().load(&location).unwrap();

        assert!(content.contains("<xs:schema/>"));
    }

    #[test]
    fn test_load_from_string() {
        let location = Location::String("<xs:schema/>".to_string());
        let content = Loader::new().load(&location).unwrap();

        assert_eq!(content, "<xs:schema/>");
        assert_eq!(location.as_str(), "<string>");
    }

    #[test]
    fn test_missing_file() {
        let location = Location::Path(PathBuf::from("/nonexistent/schema.xsd"));
        let err = Loader::new().load(&location).unwrap_err();

        assert!(matches!(err, Error::Resource(_)));
        assert!(err.to_string().contains("/nonexistent/schema.xsd"));
    }

    #[test]
    fn test_size_limit() {
        let mut file = NamedTempFile::new().unwrap();
        let large_content = "x".repeat(11 * 1024 * 1024); // 11 MB
        write!(file, "{}", large_content).unwrap();

        let location = Location::Path(file.path().to_path_buf());
        let result = Loader::new().with_limits(Limits::strict()).load(&location);

        assert!(matches!(result, Err(Error::LimitExceeded(_))));
    }
}
