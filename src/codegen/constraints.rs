//! Field constraints derived from facets and occurrence bounds

use crate::schema::{Facets, ModelKind, Occurs};

use super::python;

/// Length, pattern and numeric bounds of a simple type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bounds {
    /// Minimum string length
    pub min_length: Option<u64>,
    /// Maximum string length
    pub max_length: Option<u64>,
    /// First pattern only; further patterns are not enforced
    pub pattern: Option<String>,
    /// minInclusive
    pub ge: Option<String>,
    /// maxInclusive
    pub le: Option<String>,
    /// minExclusive
    pub gt: Option<String>,
    /// maxExclusive
    pub lt: Option<String>,
}

impl Bounds {
    /// pydantic `Field` keywords in a stable order
    pub fn keywords(&self) -> Vec<(&'static str, String)> {
        let mut keywords = Vec::new();
        if let Some(min) = self.min_length {
            keywords.push(("min_length", min.to_string()));
        }
        if let Some(max) = self.max_length {
            keywords.push(("max_length", max.to_string()));
        }
        if let Some(pattern) = &self.pattern {
            keywords.push(("regex", python::regex_literal(pattern)));
        }
        let numeric = [("ge", &self.ge), ("le", &self.le), ("gt", &self.gt), ("lt", &self.lt)];
        for (keyword, value) in numeric {
            if let Some(value) = value {
                keywords.push((keyword, python::bound_literal(value)));
            }
        }
        keywords
    }

    /// Keywords a pydantic field of `py_type` accepts; the rest are dropped
    pub fn keywords_for(&self, py_type: &str) -> Vec<(&'static str, String)> {
        let accepted = accepted_keywords(py_type);
        self.keywords()
            .into_iter()
            .filter(|(keyword, _)| accepted.contains(keyword))
            .collect()
    }
}

/// Constraint keywords pydantic v1 enforces for a mapped Python type
pub fn accepted_keywords(py_type: &str) -> &'static [&'static str] {
    match py_type {
        "str" => &["min_length", "max_length", "regex"],
        "int" | "float" => &["ge", "le", "gt", "lt"],
        _ => &[],
    }
}

/// What a simple type allows as a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueConstraint {
    /// Any value of the primitive within the bounds
    Free(Bounds),
    /// One of two or more enumerated values; replaces the primitive type
    Literal(Vec<String>),
    /// Exactly one allowed value, emitted as a fixed default
    Fixed(String),
}

impl ValueConstraint {
    /// Constraint of a simple type with the given effective facets
    pub fn from_facets(facets: &Facets) -> Self {
        match facets.enumeration.as_slice() {
            [single] => ValueConstraint::Fixed(single.clone()),
            [] => ValueConstraint::Free(Bounds {
                min_length: facets.min_length,
                max_length: facets.max_length,
                pattern: facets.patterns.first().cloned(),
                ge: facets.min_inclusive.clone(),
                le: facets.max_inclusive.clone(),
                gt: facets.min_exclusive.clone(),
                lt: facets.max_exclusive.clone(),
            }),
            values => ValueConstraint::Literal(values.to_vec()),
        }
    }

    /// Bounds to render, empty for enumerations
    pub fn bounds(&self) -> Option<&Bounds> {
        match self {
            ValueConstraint::Free(bounds) => Some(bounds),
            _ => None,
        }
    }
}

/// Shape of an element field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cardinality {
    /// Field holds a list
    pub is_list: bool,
    /// Field may be absent
    pub is_optional: bool,
    /// Element sits in a choice group
    pub from_choice: bool,
    /// `min_items` for lists with minOccurs > 0
    pub min_items: Option<u32>,
    /// `max_items` for lists with a finite maxOccurs
    pub max_items: Option<u32>,
}

impl Cardinality {
    /// Resolve list-ness and optionality from occurrence bounds
    pub fn resolve(occurs: Occurs, model: ModelKind) -> Self {
        let is_list = occurs.is_multiple();
        let from_choice = model == ModelKind::Choice;

        Cardinality {
            is_list,
            is_optional: occurs.is_emptiable() || from_choice,
            from_choice,
            min_items: (is_list && occurs.min > 0).then_some(occurs.min),
            max_items: if is_list { occurs.max } else { None },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_enumeration_is_fixed() {
        let facets = Facets {
            enumeration: vec!["X".to_string()],
            max_length: Some(1),
            ..Default::default()
        };
        assert_eq!(ValueConstraint::from_facets(&facets), ValueConstraint::Fixed("X".to_string()));
    }

    #[test]
    fn test_enumeration_excludes_bounds() {
        let facets = Facets {
            enumeration: vec!["1".to_string(), "2".to_string()],
            patterns: vec!["[12]".to_string()],
            ..Default::default()
        };
        let constraint = ValueConstraint::from_facets(&facets);
        assert_eq!(constraint, ValueConstraint::Literal(vec!["1".to_string(), "2".to_string()]));
        assert!(constraint.bounds().is_none());
    }

    #[test]
    fn test_only_first_pattern_kept() {
        let facets = Facets {
            patterns: vec!["[0-9]{2}".to_string(), "[a-z]+".to_string()],
            min_length: Some(2),
            ..Default::default()
        };
        let constraint = ValueConstraint::from_facets(&facets);
        let bounds = constraint.bounds().unwrap();
        assert_eq!(bounds.pattern.as_deref(), Some("[0-9]{2}"));
        assert_eq!(
            bounds.keywords(),
            vec![("min_length", "2".to_string()), ("regex", "r'[0-9]{2}'".to_string())]
        );
    }

    #[test]
    fn test_numeric_bounds() {
        let facets = Facets {
            min_inclusive: Some("0".to_string()),
            max_exclusive: Some("100.5".to_string()),
            ..Default::default()
        };
        let constraint = ValueConstraint::from_facets(&facets);
        assert_eq!(
            constraint.bounds().unwrap().keywords(),
            vec![("ge", "0".to_string()), ("lt", "100.5".to_string())]
        );
    }

    #[test]
    fn test_keywords_filtered_by_type() {
        let bounds = Bounds {
            max_length: Some(4),
            pattern: Some("[0-9]+".to_string()),
            ge: Some("2000-01-01".to_string()),
            ..Default::default()
        };
        assert_eq!(
            bounds.keywords_for("str"),
            vec![("max_length", "4".to_string()), ("regex", "r'[0-9]+'".to_string())]
        );
        assert!(bounds.keywords_for("int").is_empty());
        assert!(bounds.keywords_for("datetime.date").is_empty());

        let range = Bounds {
            ge: Some("1".to_string()),
            pattern: Some("[0-9]".to_string()),
            ..Default::default()
        };
        assert_eq!(range.keywords_for("float"), vec![("ge", "1".to_string())]);
    }

    #[test]
    fn test_unbounded_optional_list() {
        let shape = Cardinality::resolve(Occurs::zero_or_more(), ModelKind::Sequence);
        assert!(shape.is_list);
        assert!(shape.is_optional);
        assert_eq!(shape.min_items, None);
        assert_eq!(shape.max_items, None);
    }

    #[test]
    fn test_bounded_required_list() {
        let shape = Cardinality::resolve(Occurs::new(2, Some(5)), ModelKind::Sequence);
        assert!(shape.is_list);
        assert!(!shape.is_optional);
        assert_eq!(shape.min_items, Some(2));
        assert_eq!(shape.max_items, Some(5));
    }

    #[test]
    fn test_choice_makes_optional() {
        let shape = Cardinality::resolve(Occurs::once(), ModelKind::Choice);
        assert!(!shape.is_list);
        assert!(shape.is_optional);
        assert!(shape.from_choice);
        assert_eq!(shape.max_items, None);
    }

    #[test]
    fn test_required_single() {
        let shape = Cardinality::resolve(Occurs::once(), ModelKind::All);
        assert!(!shape.is_list);
        assert!(!shape.is_optional);
    }
}
