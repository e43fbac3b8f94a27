//! Python DTO generation
//!
//! The [`Generator`] assembles one Python module from a loaded [`Schema`]:
//!
//! 1. header docstring with the generation timestamp, imports
//! 2. one constraint block per top-level simple type
//! 3. the base class every generated class inherits from
//! 4. one class per complex type, dependencies first
//! 5. classes of top-level elements with anonymous types
//! 6. the wrapper class holding the root element and the list hints
//! 7. `update_forward_refs()` calls for self-referencing classes
//!
//! Nothing is returned unless every step succeeds.

pub mod constraints;
mod emitter;
pub mod hints;
pub mod python;
pub mod types;

use chrono::Utc;
use serde::Serialize;

use crate::error::{ParseError, Result};
use crate::schema::{Element, Schema, TypeRef};
use crate::settings::Settings;

use emitter::Emitter;
use python::INDENT;

/// Output of one generator run
#[derive(Debug, Clone, Serialize)]
pub struct Generated {
    /// Python module source
    pub source: String,
    /// Generated class names in emission order
    pub classes: Vec<String>,
    /// Tag names readers must always parse as lists
    pub list_hints: Vec<String>,
    /// Tag name of the element held by the wrapper class
    pub root: String,
}

/// Python DTO generator
#[derive(Debug, Clone, Default)]
pub struct Generator {
    settings: Settings,
}

impl Generator {
    /// Create a generator with the given settings
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Settings used by this generator
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Generate the Python module for `schema`
    pub fn generate(&self, schema: &Schema) -> Result<Generated> {
        self.settings.validate()?;
        let settings = &self.settings;
        let root = self.root_element(schema)?;

        let mut emitter = Emitter::new(schema, settings)?;
        let mut blocks = vec![self.header()];

        for id in &schema.global_simple_types {
            blocks.push(emitter.simple_block(*id)?);
        }

        blocks.push(format!(
            "class {}({}):\n{INDENT}pass",
            settings.base_class_name, settings.base_model
        ));

        for id in &schema.global_complex_types {
            emitter.class(*id, &mut blocks)?;
        }
        for element in &schema.elements {
            if let TypeRef::Complex(id) = element.type_ref {
                emitter.class(id, &mut blocks)?;
            }
        }

        let root_field = emitter.root_field(root, &mut blocks)?;
        let (classes, hints, forward_refs) = emitter.finish();

        let mut wrapper = vec![
            format!("class {}({}):", settings.wrapper_class_name, settings.base_class_name),
            root_field.render(),
            String::new(),
            format!("{INDENT}@staticmethod"),
            format!("{INDENT}def xmltodict_force_list() -> tuple:"),
            format!("{INDENT}{INDENT}\"\"\"Tag names xmltodict must always wrap in lists\"\"\""),
            format!("{INDENT}{INDENT}return {}", python::tuple(hints.iter())),
        ];
        if !forward_refs.is_empty() {
            wrapper.push(String::new());
            wrapper.push(String::new());
            wrapper.extend(forward_refs.iter().map(|class| format!("{}.update_forward_refs()", class)));
        }
        blocks.push(wrapper.join("\n"));

        let mut source = blocks.join("\n\n\n");
        source.push('\n');

        tracing::debug!(
            classes = classes.len(),
            list_hints = hints.len(),
            root = %root.name,
            "generation finished"
        );

        Ok(Generated {
            source,
            classes,
            list_hints: hints.into_vec(),
            root: root.name.clone(),
        })
    }

    fn root_element<'a>(&self, schema: &'a Schema) -> Result<&'a Element> {
        match &self.settings.root_element {
            Some(name) => schema
                .element(name)
                .ok_or_else(|| ParseError::new(format!("root element '{}' is not declared at the top level", name)).into()),
            None => schema
                .elements
                .first()
                .ok_or_else(|| ParseError::new("schema declares no top-level element").into()),
        }
    }

    fn header(&self) -> String {
        let timestamp = self.settings.timestamp.unwrap_or_else(Utc::now);
        let mut imports = vec!["datetime", "pydantic", "typing"];
        if let Some(module) = self.settings.base_model_module() {
            if !imports.contains(&module) {
                imports.push(module);
                imports.sort_unstable();
            }
        }

        let mut lines = vec![
            "\"\"\"".to_string(),
            format!("Generated at {}", timestamp.format("%Y-%m-%d %H:%M:%S%.6f%:z")),
            "\"\"\"".to_string(),
            String::new(),
        ];
        lines.extend(imports.iter().map(|module| format!("import {}", module)));
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn settings() -> Settings {
        Settings::default().with_timestamp(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_minimal_module() {
        let schema = Schema::from_string(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                 <xs:element name="Файл" type="xs:string"/>
               </xs:schema>"#,
        )
        .unwrap();

        let generated = Generator::new(settings()).generate(&schema).unwrap();
        let expected = [
            "\"\"\"",
            "Generated at 2024-03-01 12:00:00.000000+00:00",
            "\"\"\"",
            "",
            "import datetime",
            "import pydantic",
            "import typing",
            "",
            "",
            "class XmlBaseClass(pydantic.BaseModel):",
            "    pass",
            "",
            "",
            "class Xml(XmlBaseClass):",
            "    fajl: str = pydantic.Field(",
            "        alias='Файл',",
            "    )  # [1..1]",
            "",
            "    @staticmethod",
            "    def xmltodict_force_list() -> tuple:",
            "        \"\"\"Tag names xmltodict must always wrap in lists\"\"\"",
            "        return ()",
            "",
        ]
        .join("\n");

        assert_eq!(generated.source, expected);
        assert_eq!(generated.root, "Файл");
        assert!(generated.classes.is_empty());
    }

    #[test]
    fn test_custom_base_model_is_imported() {
        let generator = Generator::new(settings().with_base_model("upd.dto_xml.XmlBaseModel"));
        let header = generator.header();
        assert!(header.contains("import typing\nimport upd"));
    }

    #[test]
    fn test_missing_root() {
        let schema = Schema::from_string(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                 <xs:element name="A" type="xs:string"/>
               </xs:schema>"#,
        )
        .unwrap();

        let err = Generator::new(settings().with_root_element("B"))
            .generate(&schema)
            .unwrap_err();
        assert!(err.to_string().contains("root element 'B'"));
    }

    #[test]
    fn test_no_elements() {
        let schema =
            Schema::from_string(r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"/>"#).unwrap();
        assert!(Generator::new(settings()).generate(&schema).is_err());
    }
}
