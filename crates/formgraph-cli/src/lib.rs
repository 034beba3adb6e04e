//! # formgraph-cli: Command-Line Interface
//!
//! Provides the `formgraph` binary for working with schema documents and
//! submissions outside a host application.
//!
//! ## Subcommands
//!
//! - `formgraph check`: construct an instance tree and print each
//!   instance's scoped errors.
//! - `formgraph normalize`: print the canonical mapping for a submission.
//! - `formgraph inspect`: print derived model types and their aliases.
//!
//! ```bash
//! formgraph check --schema user.yaml --input signup.json
//! formgraph normalize --schema user.yaml --input signup.json
//! formgraph inspect --schema user.yaml --format json
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing lives here; behavior lives in the library crates.
//! - Handlers return an exit code: `0` on success, `1` when a check found
//!   violations.

pub mod check;
pub mod inspect;
pub mod normalize;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde_json::Value;

use formgraph_model::{ModelFactory, ModelType};
use formgraph_schema::SchemaDocument;

/// Output rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Load a schema document and derive its root model type.
pub fn load_model(schema_path: &Path, factory: &ModelFactory) -> Result<Arc<ModelType>> {
    let document = SchemaDocument::load(schema_path)
        .with_context(|| format!("failed to load schema: {}", schema_path.display()))?;
    Ok(factory.derive_type(Arc::clone(document.root()), document.name()))
}

/// Read a submission from a JSON or YAML file, chosen by extension.
pub fn read_submission(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read input: {}", path.display()))?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext {
        "yaml" | "yml" => serde_yaml::from_str(&content)
            .with_context(|| format!("invalid YAML in {}", path.display())),
        _ => serde_json::from_str(&content)
            .with_context(|| format!("invalid JSON in {}", path.display())),
    }
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render JSON")?;
    println!("{rendered}");
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::testutil::*;
    use super::*;
    use serde_json::json;

    #[test]
    fn load_model_uses_document_name() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write_file(dir.path(), "user.yaml", USER_SCHEMA);
        let model = load_model(&schema, &ModelFactory::new()).unwrap();
        assert_eq!(model.model_name(), "user");
        assert_eq!(model.slots().len(), 4);
    }

    #[test]
    fn read_submission_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = write_file(dir.path(), "input.yml", "name: Ann\nfriends: []\n");
        let json_file = write_file(dir.path(), "input.json", r#"{"name": "Ann", "friends": []}"#);
        assert_eq!(read_submission(&yaml).unwrap(), read_submission(&json_file).unwrap());
        assert_eq!(read_submission(&yaml).unwrap(), json!({"name": "Ann", "friends": []}));
    }

    #[test]
    fn scratch_files_go_away_with_their_dir() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write_file(dir.path(), "user.yaml", USER_SCHEMA);
        assert!(load_model(&schema, &ModelFactory::new()).is_ok());
        drop(dir);
        assert!(!schema.exists());
    }

    #[test]
    fn missing_schema_has_context() {
        let err = load_model(Path::new("/nonexistent/user.yaml"), &ModelFactory::new()).unwrap_err();
        assert!(err.to_string().contains("failed to load schema"));
    }
}
