//! Schema name resolution
//!
//! Turns schema names (often written in Cyrillic) into Python identifiers:
//! PascalCase for classes and constraint blocks, snake_case for fields.
//! All functions here are pure and deterministic so that generated output
//! stays diffable between runs.

use crate::error::{Error, Result};
use heck::{ToPascalCase, ToSnakeCase};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\p{L}_][\p{L}\p{N}_]*$").unwrap());

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

// pydantic refuses fields that shadow these
const BASE_MODEL_ATTRIBUTES: &[&str] = &[
    "construct", "copy", "dict", "fields", "from_orm", "json", "parse_file", "parse_obj",
    "parse_raw", "schema", "schema_json", "update_forward_refs", "validate",
];

/// Source language of the schema names, selecting the transliteration table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Language {
    /// Russian (default)
    #[default]
    Russian,
    /// Ukrainian
    Ukrainian,
}

impl Language {
    fn table(self, c: char) -> Option<&'static str> {
        match self {
            Language::Russian => russian(c),
            Language::Ukrainian => ukrainian(c),
        }
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ru" => Ok(Language::Russian),
            "uk" => Ok(Language::Ukrainian),
            other => Err(Error::Config(format!(
                "unknown transliteration language '{}' (expected 'ru' or 'uk')",
                other
            ))),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Russian => write!(f, "ru"),
            Language::Ukrainian => write!(f, "uk"),
        }
    }
}

fn russian(c: char) -> Option<&'static str> {
    Some(match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "j",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "c",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "shh",
        'ъ' => "''",
        'ы' => "y'",
        'ь' => "'",
        'э' => "e'",
        'ю' => "yu",
        'я' => "ya",
        _ => return None,
    })
}

fn ukrainian(c: char) -> Option<&'static str> {
    Some(match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "h",
        'ґ' => "g",
        'д' => "d",
        'е' => "e",
        'є' => "ye",
        'ж' => "zh",
        'з' => "z",
        'и' => "y",
        'і' => "i",
        'ї' => "yi",
        'й' => "y",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "kh",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "shch",
        'ь' => "'",
        'ю' => "yu",
        'я' => "ya",
        '\u{2BC}' | '\u{2019}' => "'",
        _ => return None,
    })
}

/// Split a QName into prefix and local name
pub fn split_qname(qname: &str) -> (Option<&str>, &str) {
    if let Some((prefix, local)) = qname.split_once(':') {
        (Some(prefix), local)
    } else {
        (None, qname)
    }
}

/// Transliterate `raw` to Latin script.
///
/// Characters missing from the table pass through unchanged. Apostrophes
/// (including those produced by digraphs such as `ы` -> `y'`) are stripped.
pub fn transliterate(raw: &str, language: Language) -> String {
    let mut out = String::with_capacity(raw.len());

    for c in raw.chars() {
        let lower = c.to_lowercase().next().unwrap_or(c);
        match language.table(lower) {
            Some(latin) if c != lower => {
                let mut chars = latin.chars();
                if let Some(first) = chars.next() {
                    out.extend(first.to_uppercase());
                    out.push_str(chars.as_str());
                }
            }
            Some(latin) => out.push_str(latin),
            None => out.push(c),
        }
    }

    out.replace('\'', "")
}

/// Resolve a schema type or element name into a class identifier (PascalCase)
pub fn resolve_type_name(raw: &str, language: Language) -> String {
    let name = transliterate(raw, language).to_pascal_case();
    if name.is_empty() {
        return "T".to_string();
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("T{}", name);
    }
    if PYTHON_KEYWORDS.contains(&name.as_str()) {
        return format!("{}_", name);
    }
    name
}

/// Resolve a schema attribute or element name into a field identifier (snake_case)
pub fn resolve_field_name(raw: &str, language: Language) -> String {
    let name = transliterate(raw, language).to_snake_case();
    if name.is_empty() {
        return "f_".to_string();
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("f_{}", name);
    }
    if PYTHON_KEYWORDS.contains(&name.as_str()) || BASE_MODEL_ATTRIBUTES.contains(&name.as_str()) {
        return format!("{}_", name);
    }
    name
}

/// Check if a string is usable as a Python identifier
pub fn is_valid_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name) && !PYTHON_KEYWORDS.contains(&name)
}

/// Validate a configured identifier and return an error if invalid
pub fn validate_identifier(name: &str) -> Result<()> {
    if is_valid_identifier(name) {
        Ok(())
    } else {
        Err(Error::Config(format!("'{}' is not a valid Python identifier", name)))
    }
}
