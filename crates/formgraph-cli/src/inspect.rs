//! # Inspect Subcommand
//!
//! Prints every model type derived from a schema document: fields, rules,
//! options, child wiring and the host-key alias table.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use serde_json::Value;

use formgraph_model::{ModelFactory, ModelType, SlotBinding};

use crate::OutputFormat;

/// Arguments for the `formgraph inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Schema document (YAML or JSON).
    #[arg(long, short)]
    pub schema: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Summary of one derived type.
#[derive(Debug, Serialize)]
pub struct TypeSummary {
    pub model: String,
    pub param_key: String,
    pub fingerprint: String,
    pub fields: Vec<FieldSummary>,
    pub aliases: Vec<AliasSummary>,
}

/// Summary of one field.
#[derive(Debug, Serialize)]
pub struct FieldSummary {
    pub name: String,
    pub kind: String,
    pub required: bool,
    pub present: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<Value>,
}

/// A host key and the field it stands for.
#[derive(Debug, Serialize)]
pub struct AliasSummary {
    pub alias: String,
    pub field: String,
}

/// Execute the inspect subcommand.
pub fn run_inspect(args: &InspectArgs) -> Result<u8> {
    let factory = ModelFactory::new();
    let model = crate::load_model(&args.schema, &factory)?;
    let summaries: Vec<TypeSummary> = reachable_types(&model).iter().map(|t| summarize(t)).collect();

    match args.format {
        OutputFormat::Json => crate::print_json(&summaries)?,
        OutputFormat::Text => {
            for summary in &summaries {
                print_text(summary);
            }
        }
    }
    Ok(0)
}

/// The root type and every child type beneath it, each listed once, in
/// depth-first declaration order.
fn reachable_types(root: &Arc<ModelType>) -> Vec<Arc<ModelType>> {
    let mut seen: Vec<Arc<ModelType>> = Vec::new();
    let mut stack = vec![Arc::clone(root)];
    while let Some(current) = stack.pop() {
        if seen.iter().any(|t| Arc::ptr_eq(t, &current)) {
            continue;
        }
        for slot in current.slots().iter().rev() {
            if let Some(child) = slot.binding().child() {
                stack.push(Arc::clone(child));
            }
        }
        seen.push(current);
    }
    seen
}

fn summarize(model: &ModelType) -> TypeSummary {
    let fields = model
        .slots()
        .iter()
        .map(|slot| {
            let rules = model.field_spec(slot.name()).map(|f| f.rules()).unwrap_or_default();
            let kind = match slot.binding() {
                SlotBinding::Scalar(scalar) => scalar.to_string(),
                SlotBinding::Object(child) => format!("object<{}>", child.model_name()),
                SlotBinding::Array(child) => format!("array<{}>", child.model_name()),
            };
            FieldSummary {
                name: slot.name().to_string(),
                kind,
                required: rules.required,
                present: rules.present,
                options: model.options_for(slot.name()).to_vec(),
            }
        })
        .collect();
    let aliases = model
        .aliases()
        .arrays()
        .chain(model.aliases().objects())
        .map(|(alias, field)| AliasSummary {
            alias: alias.to_string(),
            field: field.to_string(),
        })
        .collect();

    TypeSummary {
        model: model.model_name().to_string(),
        param_key: model.param_key(),
        fingerprint: model.fingerprint().short(),
        fields,
        aliases,
    }
}

fn print_text(summary: &TypeSummary) {
    println!(
        "{} (param key: {}, {})",
        summary.model, summary.param_key, summary.fingerprint
    );
    for field in &summary.fields {
        let mut flags = Vec::new();
        if field.required {
            flags.push("required".to_string());
        }
        if field.present {
            flags.push("present".to_string());
        }
        if !field.options.is_empty() {
            let options: Vec<String> = field.options.iter().map(Value::to_string).collect();
            flags.push(format!("options: {}", options.join(", ")));
        }
        if flags.is_empty() {
            println!("  {}: {}", field.name, field.kind);
        } else {
            println!("  {}: {} [{}]", field.name, field.kind, flags.join("; "));
        }
    }
    for alias in &summary.aliases {
        println!("  alias {} -> {}", alias.alias, alias.field);
    }
}
