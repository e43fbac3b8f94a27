//! Generator settings

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::names::{validate_identifier, Language};
use chrono::{DateTime, Utc};

/// Configuration for one generator run
#[derive(Debug, Clone)]
pub struct Settings {
    /// Dotted path of the class `base_class_name` inherits from
    pub base_model: String,
    /// Name of the emitted base class all generated classes inherit from
    pub base_class_name: String,
    /// Name of the emitted root wrapper class
    pub wrapper_class_name: String,
    /// Prefix an XML-to-dict reader puts before attribute names
    pub attribute_prefix: String,
    /// Key an XML-to-dict reader uses for element text next to attributes
    pub text_key: String,
    /// Top-level element wrapped by the root class (first declared if unset)
    pub root_element: Option<String>,
    /// Transliteration table for schema names
    pub language: Language,
    /// Timestamp embedded in the header (current time if unset)
    pub timestamp: Option<DateTime<Utc>>,
    /// Loader limits
    pub limits: Limits,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_model: "pydantic.BaseModel".to_string(),
            base_class_name: "XmlBaseClass".to_string(),
            wrapper_class_name: "Xml".to_string(),
            attribute_prefix: "@".to_string(),
            text_key: "#text".to_string(),
            root_element: None,
            language: Language::default(),
            timestamp: None,
            limits: Limits::default(),
        }
    }
}

impl Settings {
    /// Create settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the dotted path of the model class the base class inherits from
    pub fn with_base_model(mut self, base_model: impl Into<String>) -> Self {
        self.base_model = base_model.into();
        self
    }

    /// Set the name of the emitted base class
    pub fn with_base_class_name(mut self, name: impl Into<String>) -> Self {
        self.base_class_name = name.into();
        self
    }

    /// Set the name of the root wrapper class
    pub fn with_wrapper_class_name(mut self, name: impl Into<String>) -> Self {
        self.wrapper_class_name = name.into();
        self
    }

    /// Set the attribute alias prefix
    pub fn with_attribute_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.attribute_prefix = prefix.into();
        self
    }

    /// Set the root element
    pub fn with_root_element(mut self, name: impl Into<String>) -> Self {
        self.root_element = Some(name.into());
        self
    }

    /// Set the transliteration language
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Pin the header timestamp
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Set the loader limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Top-level Python module that has to be imported for `base_model`
    pub fn base_model_module(&self) -> Option<&str> {
        self.base_model.split_once('.').map(|(module, _)| module)
    }

    /// Check that configured names can be emitted as Python source
    pub fn validate(&self) -> Result<()> {
        validate_identifier(&self.base_class_name)?;
        validate_identifier(&self.wrapper_class_name)?;
        if self.base_class_name == self.wrapper_class_name {
            return Err(Error::Config(format!(
                "base class and wrapper class are both named '{}'",
                self.base_class_name
            )));
        }
        for part in self.base_model.split('.') {
            validate_identifier(part)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.base_model_module(), Some("pydantic"));
        assert_eq!(settings.attribute_prefix, "@");
    }

    #[test]
    fn test_builder() {
        let settings = Settings::new()
            .with_base_model("upd.dto_xml.XmlBaseModel")
            .with_root_element("Файл")
            .with_language(Language::Ukrainian);

        assert_eq!(settings.base_model_module(), Some("upd"));
        assert_eq!(settings.root_element.as_deref(), Some("Файл"));
        assert_eq!(settings.language, Language::Ukrainian);
    }

    #[test]
    fn test_invalid_names_rejected() {
        assert!(Settings::new().with_base_class_name("class").validate().is_err());
        assert!(Settings::new().with_base_model("pydantic..BaseModel").validate().is_err());
        assert!(Settings::new().with_wrapper_class_name("XmlBaseClass").validate().is_err());
    }
}
