//! # Check Subcommand
//!
//! Builds the instance tree for a submission, runs the JSON Schema engine
//! once over the root, and prints each instance's scoped errors.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use formgraph_model::{FieldErrors, ModelFactory, ModelInstance};
use formgraph_schema::JsonSchemaEngine;

use crate::OutputFormat;

/// Arguments for the `formgraph check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Schema document (YAML or JSON).
    #[arg(long, short)]
    pub schema: PathBuf,

    /// Submission to check (YAML or JSON).
    #[arg(long, short)]
    pub input: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Only list instances that have errors.
    #[arg(long)]
    pub only_invalid: bool,
}

/// Errors owned by one instance in the tree.
#[derive(Debug, Serialize)]
pub struct InstanceErrors {
    /// Dotted location, empty for the root.
    pub location: String,
    /// The instance's model name.
    pub model: String,
    /// Field → messages.
    pub errors: FieldErrors,
}

/// Execute the check subcommand.
pub fn run_check(args: &CheckArgs) -> Result<u8> {
    let factory = ModelFactory::new();
    let model = crate::load_model(&args.schema, &factory)?;
    let submission = crate::read_submission(&args.input)?;

    let form = ModelInstance::construct(&model, submission)
        .with_context(|| format!("cannot build a {} from {}", model.model_name(), args.input.display()))?;
    let engine = JsonSchemaEngine::new();
    let report = form.validate(&engine).context("validation engine failed")?;

    let instances = collect(&form, &report, args.only_invalid);
    tracing::info!(
        instances = form.walk().count(),
        violations = report.len(),
        "checked submission"
    );

    match args.format {
        OutputFormat::Json => crate::print_json(&instances)?,
        OutputFormat::Text => print_text(&instances, report.len()),
    }
    Ok(u8::from(!report.is_valid()))
}

fn collect(
    form: &ModelInstance,
    report: &formgraph_core::ValidationReport,
    only_invalid: bool,
) -> Vec<InstanceErrors> {
    form.walk()
        .map(|instance| InstanceErrors {
            location: instance.location().to_string(),
            model: instance.model().model_name().to_string(),
            errors: instance.errors(report),
        })
        .filter(|i| !only_invalid || !i.errors.is_empty())
        .collect()
}

fn print_text(instances: &[InstanceErrors], violations: usize) {
    for instance in instances {
        let location = if instance.location.is_empty() {
            "(root)"
        } else {
            instance.location.as_str()
        };
        if instance.errors.is_empty() {
            println!("{location} [{}]: OK", instance.model);
            continue;
        }
        println!("{location} [{}]:", instance.model);
        for message in instance.errors.full_messages() {
            println!("  {message}");
        }
    }
    if violations == 0 {
        println!("OK: no violations");
    } else {
        println!("FAIL: {violations} violation(s)");
    }
}
