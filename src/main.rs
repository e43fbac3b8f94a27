//! Command-line interface for xsd2dto

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
use tracing_subscriber::EnvFilter;

#[cfg(feature = "cli")]
use xsd2dto::names::Language;
#[cfg(feature = "cli")]
use xsd2dto::{generate_from_file, Settings};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "xsd2dto")]
#[command(author, version, about = "Generate pydantic DTO classes from an XSD schema", long_about = None)]
struct Cli {
    /// Path to the XSD schema file
    #[arg(value_name = "SCHEMA")]
    schema: PathBuf,

    /// Top-level element held by the wrapper class (defaults to the first one)
    #[arg(short, long)]
    root: Option<String>,

    /// Dotted path of the model class the generated base class inherits from
    #[arg(long, default_value = "pydantic.BaseModel")]
    base_model: String,

    /// Transliteration table for schema names: ru, uk
    #[arg(short, long, default_value = "ru")]
    language: String,

    /// Prefix of attribute aliases
    #[arg(long, default_value = "@")]
    attribute_prefix: String,

    /// Write the generated module to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write a JSON report (classes, list hints, root) to a file
    #[arg(long)]
    manifest: Option<PathBuf>,
}

#[cfg(feature = "cli")]
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let language: Language = cli.language.parse()?;

    let mut settings = Settings::new()
        .with_base_model(cli.base_model)
        .with_attribute_prefix(cli.attribute_prefix)
        .with_language(language);
    if let Some(root) = cli.root {
        settings = settings.with_root_element(root);
    }

    let generated = generate_from_file(&cli.schema, settings)?;

    match &cli.output {
        Some(path) => fs::write(path, &generated.source)?,
        None => print!("{}", generated.source),
    }
    if let Some(path) = &cli.manifest {
        fs::write(path, serde_json::to_string_pretty(&generated)?)?;
    }

    tracing::info!(
        schema = %cli.schema.display(),
        classes = generated.classes.len(),
        list_hints = generated.list_hints.len(),
        "generated"
    );
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
