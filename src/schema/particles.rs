//! Occurrence bounds and content models
//!
//! Particles carry occurrence constraints (minOccurs, maxOccurs). Nested
//! model groups are flattened during loading, so the bounds stored on an
//! element already include those of its enclosing groups.

use crate::error::{ParseError, Result};
use std::fmt;

/// Occurrence bounds for a particle (minOccurs, maxOccurs)
/// None for max means unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurs {
    /// Minimum number of occurrences (default 1)
    pub min: u32,
    /// Maximum number of occurrences (None = unbounded, default 1)
    pub max: Option<u32>,
}

impl Occurs {
    /// Create new occurrence bounds
    pub fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// Default occurrence (1, 1)
    pub fn once() -> Self {
        Self { min: 1, max: Some(1) }
    }

    /// Optional occurrence (0, 1)
    pub fn optional() -> Self {
        Self { min: 0, max: Some(1) }
    }

    /// Zero or more (0, unbounded)
    pub fn zero_or_more() -> Self {
        Self { min: 0, max: None }
    }

    /// Check if this particle can be absent (minOccurs == 0)
    pub fn is_emptiable(&self) -> bool {
        self.min == 0
    }

    /// Check if this particle can occur more than once
    pub fn is_multiple(&self) -> bool {
        match self.max {
            Some(max) => max > 1,
            None => true,
        }
    }

    /// Check if maxOccurs is unbounded
    pub fn is_unbounded(&self) -> bool {
        self.max.is_none()
    }

    /// Combine with the bounds of an enclosing group
    pub fn scaled(self, outer: Occurs) -> Occurs {
        let max = match (self.max, outer.max) {
            (Some(0), _) | (_, Some(0)) => Some(0),
            (Some(a), Some(b)) => Some(a.saturating_mul(b)),
            _ => None,
        };
        Occurs::new(self.min.saturating_mul(outer.min), max)
    }

    /// Same bounds with minOccurs forced to zero
    pub fn emptiable(self) -> Occurs {
        Occurs::new(0, self.max)
    }
}

impl Default for Occurs {
    fn default() -> Self {
        Self::once()
    }
}

impl fmt::Display for Occurs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "[{}..{}]", self.min, max),
            None => write!(f, "[{}..unbounded]", self.min),
        }
    }
}

/// Parse minOccurs/maxOccurs from XML attribute values
pub fn parse_occurs(min_occurs: Option<&str>, max_occurs: Option<&str>) -> Result<Occurs> {
    let mut occurs = Occurs::once();

    if let Some(min_str) = min_occurs {
        occurs.min = min_str.trim().parse::<u32>().map_err(|_| {
            ParseError::new(format!(
                "minOccurs value '{}' is not a valid non-negative integer",
                min_str
            ))
        })?;
    }

    match max_occurs.map(str::trim) {
        Some("unbounded") => occurs.max = None,
        Some(max_str) => {
            let max = max_str.parse::<u32>().map_err(|_| {
                ParseError::new(format!(
                    "maxOccurs value '{}' must be a non-negative integer or 'unbounded'",
                    max_str
                ))
            })?;
            if occurs.min > max {
                return Err(ParseError::new("maxOccurs must be 'unbounded' or not less than minOccurs").into());
            }
            occurs.max = Some(max);
        }
        None => {
            if occurs.min > 1 {
                return Err(ParseError::new("minOccurs must be lesser or equal than maxOccurs").into());
            }
        }
    }

    Ok(occurs)
}

/// Content model of a group of elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModelKind {
    /// Ordered sequence of particles
    #[default]
    Sequence,
    /// One of multiple alternatives
    Choice,
    /// Unordered set of particles
    All,
}

impl ModelKind {
    /// Parse from element local name
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "sequence" => Some(Self::Sequence),
            "choice" => Some(Self::Choice),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequence => write!(f, "sequence"),
            Self::Choice => write!(f, "choice"),
            Self::All => write!(f, "all"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occurs_defaults() {
        let occurs = Occurs::default();
        assert_eq!(occurs, Occurs::once());
        assert!(!occurs.is_emptiable());
        assert!(!occurs.is_multiple());
    }

    #[test]
    fn test_occurs_multiple() {
        assert!(Occurs::zero_or_more().is_multiple());
        assert!(Occurs::new(0, Some(2)).is_multiple());
        assert!(!Occurs::optional().is_multiple());
        assert!(!Occurs::new(0, Some(0)).is_multiple());
    }

    #[test]
    fn test_parse_occurs() {
        assert_eq!(parse_occurs(None, None).unwrap(), Occurs::once());
        assert_eq!(parse_occurs(Some("0"), Some("unbounded")).unwrap(), Occurs::zero_or_more());
        assert_eq!(parse_occurs(Some("2"), Some("5")).unwrap(), Occurs::new(2, Some(5)));
        assert!(parse_occurs(Some("-1"), None).is_err());
        assert!(parse_occurs(Some("3"), Some("2")).is_err());
        assert!(parse_occurs(Some("2"), None).is_err());
        assert!(parse_occurs(None, Some("many")).is_err());
    }

    #[test]
    fn test_scaled() {
        let element = Occurs::new(1, Some(2));
        assert_eq!(element.scaled(Occurs::new(0, Some(3))), Occurs::new(0, Some(6)));
        assert_eq!(element.scaled(Occurs::zero_or_more()), Occurs::zero_or_more());
        assert_eq!(Occurs::zero_or_more().scaled(Occurs::new(1, Some(0))), Occurs::new(0, Some(0)));
        assert_eq!(Occurs::once().scaled(Occurs::once()), Occurs::once());
    }

    #[test]
    fn test_display() {
        assert_eq!(Occurs::new(0, Some(1)).to_string(), "[0..1]");
        assert_eq!(Occurs::new(1, None).to_string(), "[1..unbounded]");
    }

    #[test]
    fn test_model_kind_from_tag() {
        assert_eq!(ModelKind::from_tag("choice"), Some(ModelKind::Choice));
        assert_eq!(ModelKind::from_tag("group"), None);
        assert_eq!(ModelKind::All.to_string(), "all");
    }
}
