//! Python source literals and type expressions

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Write;

/// Indentation unit of generated code
pub const INDENT: &str = "    ";

static DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").unwrap());

/// Single-quoted string literal
pub fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Regex literal, raw when the pattern allows it
pub fn regex_literal(pattern: &str) -> String {
    let trailing_backslashes = pattern.chars().rev().take_while(|c| *c == '\\').count();
    let raw_safe = !pattern.contains(['\'', '\n', '\r']) && trailing_backslashes % 2 == 0;

    if raw_safe {
        format!("r'{}'", pattern)
    } else {
        string_literal(pattern)
    }
}

/// Numeric facet value; non-numeric values (dates) become strings
pub fn bound_literal(value: &str) -> String {
    let value = value.trim();
    if let Ok(integer) = value.parse::<i128>() {
        return integer.to_string();
    }
    if DECIMAL.is_match(value) {
        return value.to_string();
    }
    string_literal(value)
}

/// Docstring body text with quotes and backslashes escaped
pub fn docstring_text(text: &str) -> String {
    text.replace('\\', "\\\\").replace("\"\"\"", "\\\"\\\"\\\"")
}

/// Collapse documentation into a single line
pub fn flatten(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `typing.Optional[...]`
pub fn optional(inner: &str) -> String {
    format!("typing.Optional[{}]", inner)
}

/// `typing.List[...]`
pub fn list(inner: &str) -> String {
    format!("typing.List[{}]", inner)
}

/// `typing.Literal[...]` over string values
pub fn literal(values: &[String]) -> String {
    let values: Vec<_> = values.iter().map(|v| string_literal(v)).collect();
    format!("typing.Literal[{}]", values.join(", "))
}

/// Tuple of string literals
pub fn tuple<'a>(values: impl IntoIterator<Item = &'a str>) -> String {
    let values: Vec<_> = values.into_iter().map(string_literal).collect();
    match values.len() {
        0 => "()".to_string(),
        1 => format!("({},)", values[0]),
        _ => format!("({})", values.join(", ")),
    }
}
