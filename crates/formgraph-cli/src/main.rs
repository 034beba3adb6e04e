//! # formgraph CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use formgraph_cli::check::{run_check, CheckArgs};
use formgraph_cli::inspect::{run_inspect, InspectArgs};
use formgraph_cli::normalize::{run_normalize, NormalizeArgs};

/// formgraph: schema-driven form objects.
///
/// Validates nested submissions against schema documents, prints canonical
/// mappings, and shows the model types a schema derives.
#[derive(Parser, Debug)]
#[command(name = "formgraph", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    /// Ignored when `RUST_LOG` is set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a submission and print every instance's errors.
    Check(CheckArgs),

    /// Print the canonical mapping for a host-style submission.
    Normalize(NormalizeArgs),

    /// Show derived model types, rules, options and aliases.
    Inspect(InspectArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Check(args) => run_check(&args),
        Commands::Normalize(args) => run_normalize(&args),
        Commands::Inspect(args) => run_inspect(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formgraph_cli::OutputFormat;
    use std::path::PathBuf;

    #[test]
    fn cli_parse_check() {
        let cli = Cli::try_parse_from([
            "formgraph", "check", "--schema", "user.yaml", "--input", "in.json", "--format", "json",
        ])
        .unwrap();
        let Commands::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(args.schema, PathBuf::from("user.yaml"));
        assert_eq!(args.input, PathBuf::from("in.json"));
        assert_eq!(args.format, OutputFormat::Json);
        assert!(!args.only_invalid);
    }

    #[test]
    fn cli_parse_short_flags_and_verbosity() {
        let cli = Cli::try_parse_from(["formgraph", "-vv", "normalize", "-s", "u.yaml", "-i", "x.yml"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Normalize(_)));
    }

    #[test]
    fn cli_parse_inspect_defaults_to_text() {
        let cli = Cli::try_parse_from(["formgraph", "inspect", "--schema", "u.yaml"]).unwrap();
        let Commands::Inspect(args) = cli.command else {
            panic!("expected inspect");
        };
        assert_eq!(args.format, OutputFormat::Text);
    }

    #[test]
    fn cli_rejects_missing_input() {
        assert!(Cli::try_parse_from(["formgraph", "check", "--schema", "u.yaml"]).is_err());
    }
}
