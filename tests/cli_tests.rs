//! CLI integration tests
//!
//! These tests verify the command-line tool by running the binary.

use std::path::PathBuf;
use std::process::Command;

fn xsd2dto_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_xsd2dto"))
}

fn fixtures_dir() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path
}

#[test]
fn test_cli_generates_to_stdout() {
    let output = Command::new(xsd2dto_bin())
        .arg(fixtures_dir().join("invoice.xsd"))
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "generation should succeed");
    assert!(stdout.starts_with("\"\"\"\nGenerated at "), "should start with header");
    assert!(stdout.contains("import pydantic"));
    assert!(stdout.contains("class Xml(XmlBaseClass):"));
    assert!(stdout.contains("def xmltodict_force_list() -> tuple:"));
}

#[test]
fn test_cli_unknown_type_fails_without_output() {
    let output = Command::new(xsd2dto_bin())
        .arg(fixtures_dir().join("unknown_type.xsd"))
        .output()
        .expect("Failed to execute command");

    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "unknown type should fail");
    assert!(output.stdout.is_empty(), "no partial output on failure");
    assert!(stderr.contains("Error: unknown type: 'xs:gYear'"), "stderr: {}", stderr);
}

#[test]
fn test_cli_missing_file() {
    let output = Command::new(xsd2dto_bin())
        .arg(fixtures_dir().join("does_not_exist.xsd"))
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error: "));
}

#[test]
fn test_cli_output_and_manifest_files() {
    let dir = tempfile::tempdir().unwrap();
    let module = dir.path().join("dto.py");
    let manifest = dir.path().join("dto.json");

    let output = Command::new(xsd2dto_bin())
        .arg(fixtures_dir().join("invoice.xsd"))
        .args(["--root", "Файл", "--base-model", "upd.dto_xml.XmlBaseModel"])
        .arg("--output")
        .arg(&module)
        .arg("--manifest")
        .arg(&manifest)
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(output.stdout.is_empty(), "module goes to the file only");

    let source = std::fs::read_to_string(&module).unwrap();
    assert!(source.contains("class XmlBaseClass(upd.dto_xml.XmlBaseModel):"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&manifest).unwrap()).expect("Manifest should be valid JSON");
    assert_eq!(json["root"], "Файл");
    assert_eq!(json["list_hints"], serde_json::json!(["СвПрод", "СвТов"]));
    assert_eq!(json["classes"].as_array().map(Vec::len), Some(4));
    assert_eq!(json["source"].as_str(), Some(source.as_str()));
}

#[test]
fn test_cli_rejects_unknown_language() {
    let output = Command::new(xsd2dto_bin())
        .arg(fixtures_dir().join("invoice.xsd"))
        .args(["--language", "de"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown transliteration language 'de'"));
}

#[test]
fn test_cli_ukrainian_names() {
    let output = Command::new(xsd2dto_bin())
        .arg(fixtures_dir().join("invoice.xsd"))
        .args(["--language", "uk"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    // Aliases keep the literal schema names whatever the table
    assert!(stdout.contains("alias='Файл'"));
}
