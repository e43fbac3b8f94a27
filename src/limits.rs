//! Limits for schema loading
//!
//! Group and attribute-group references are expanded inline, so a schema
//! with self-referencing groups would otherwise recurse forever.

use crate::error::{Error, Result};

/// Limits applied while loading a schema
#[derive(Debug, Clone)]
pub struct Limits {
    /// Maximum schema file size in bytes
    pub max_schema_size: usize,

    /// Maximum nesting depth of model groups and attribute groups
    pub max_depth: usize,

    /// Maximum number of type definitions (named and anonymous)
    pub max_components: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_schema_size: 100 * 1024 * 1024, // 100 MB
            max_depth: 256,
            max_components: 100000,
        }
    }
}

impl Limits {
    /// Create a new Limits with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict limits (more restrictive)
    pub fn strict() -> Self {
        Self {
            max_schema_size: 10 * 1024 * 1024, // 10 MB
            max_depth: 64,
            max_components: 10000,
        }
    }

    /// Create permissive limits (less restrictive, use with caution)
    pub fn permissive() -> Self {
        Self {
            max_schema_size: 1024 * 1024 * 1024, // 1 GB
            max_depth: 4096,
            max_components: 1000000,
        }
    }

    /// Check if the schema size is within limits
    pub fn check_schema_size(&self, size: usize) -> Result<()> {
        if size > self.max_schema_size {
            Err(Error::LimitExceeded(format!(
                "schema size {} bytes exceeds maximum {} bytes",
                size, self.max_schema_size
            )))
        } else {
            Ok(())
        }
    }

    /// Check if a group nesting depth is within limits
    pub fn check_depth(&self, depth: usize, component: &str) -> Result<()> {
        if depth > self.max_depth {
            Err(Error::LimitExceeded(format!(
                "nesting depth {} exceeds maximum {} in '{}' (recursive group reference?)",
                depth, self.max_depth, component
            )))
        } else {
            Ok(())
        }
    }

    /// Check if the number of type definitions is within limits
    pub fn check_components(&self, count: usize) -> Result<()> {
        if count > self.max_components {
            Err(Error::LimitExceeded(format!(
                "type definition count {} exceeds maximum {}",
                count, self.max_components
            )))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = Limits::default();
        assert_eq!(limits.max_depth, 256);
        assert!(limits.check_depth(100, "Group").is_ok());
        assert!(limits.check_depth(300, "Group").is_err());
    }

    #[test]
    fn test_strict_limits() {
        let limits = Limits::strict();
        assert!(limits.max_depth < Limits::default().max_depth);
        assert!(limits.check_schema_size(11 * 1024 * 1024).is_err());
    }

    #[test]
    fn test_permissive_limits() {
        let limits = Limits::permissive();
        assert!(limits.max_depth > Limits::default().max_depth);
        assert!(limits.check_components(500000).is_ok());
    }

    #[test]
    fn test_depth_error_names_component() {
        let err = Limits::strict().check_depth(65, "ГруппаА").unwrap_err();
        assert!(err.to_string().contains("ГруппаА"));
    }
}
