//! # Normalize Subcommand
//!
//! Prints the canonical mapping for a host-style submission: aliased keys
//! renamed, index mappings turned into sequences.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use serde_json::Value;

use formgraph_core::error::json_type_name;
use formgraph_model::{normalize, ModelFactory, ModelType};

/// Arguments for the `formgraph normalize` subcommand.
#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Schema document (YAML or JSON).
    #[arg(long, short)]
    pub schema: PathBuf,

    /// Submission to normalize (YAML or JSON).
    #[arg(long, short)]
    pub input: PathBuf,
}

/// Execute the normalize subcommand.
pub fn run_normalize(args: &NormalizeArgs) -> Result<u8> {
    let factory = ModelFactory::new();
    let model = crate::load_model(&args.schema, &factory)?;
    let canonical = canonicalize(crate::read_submission(&args.input)?, &model)?;
    tracing::debug!(model = model.model_name(), "normalized submission");
    crate::print_json(&canonical)?;
    Ok(0)
}

fn canonicalize(submission: Value, model: &ModelType) -> Result<Value> {
    let Value::Object(raw) = submission else {
        bail!("submission must be a mapping, found {}", json_type_name(&submission));
    };
    Ok(Value::Object(normalize(raw, model)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::*;
    use serde_json::json;

    #[test]
    fn host_keys_become_canonical() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write_file(dir.path(), "user.yaml", USER_SCHEMA);
        let model = crate::load_model(&schema, &ModelFactory::new()).unwrap();
        let submission = json!({
            "name": "Ann",
            "friends_attributes": {"1": {"name": "b"}, "0": {"name": "a"}},
            "account_attributes": {"name": "main"}
        });
        let canonical = canonicalize(submission, &model).unwrap();
        assert_eq!(
            canonical,
            json!({
                "name": "Ann",
                "friends": [{"name": "a"}, {"name": "b"}],
                "account": {"name": "main"}
            })
        );
    }

    #[test]
    fn scalar_submission_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write_file(dir.path(), "user.yaml", USER_SCHEMA);
        let model = crate::load_model(&schema, &ModelFactory::new()).unwrap();
        let err = canonicalize(json!(3), &model).unwrap_err();
        assert!(err.to_string().contains("must be a mapping, found number"));
    }
}
