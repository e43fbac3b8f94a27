//! List hints
//!
//! Tag names an XML-to-dict reader must always turn into lists, even when a
//! document holds a single occurrence. Collected during one generator run
//! and read once when the wrapper class is assembled.

use indexmap::IndexSet;

/// Ordered, de-duplicated set of element tag names
#[derive(Debug, Clone, Default)]
pub struct ListHints {
    names: IndexSet<String>,
}

impl ListHints {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a tag name; repeated names keep their first position
    pub fn insert(&mut self, name: &str) -> bool {
        let inserted = self.names.insert(name.to_string());
        if inserted {
            tracing::trace!(name, "list hint registered");
        }
        inserted
    }

    /// Check if a tag name was recorded
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of recorded names
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Recorded names in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Consume the collector into its names
    pub fn into_vec(self) -> Vec<String> {
        self.names.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_is_idempotent() {
        let mut hints = ListHints::new();
        assert!(hints.insert("СвТов"));
        assert!(hints.insert("Item"));
        assert!(!hints.insert("СвТов"));

        assert_eq!(hints.len(), 2);
        assert!(hints.contains("Item"));
        assert_eq!(hints.into_vec(), vec!["СвТов", "Item"]);
    }

    #[test]
    fn test_empty() {
        let hints = ListHints::new();
        assert!(hints.is_empty());
        assert_eq!(hints.iter().count(), 0);
    }
}
