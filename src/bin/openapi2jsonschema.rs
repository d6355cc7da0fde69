//! openapi2jsonschema CLI
//!
//! Command-line interface for converting OpenAPI documents into JSON Schema
//! files and validating instances against the result.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use openapi2jsonschema::{
    convert, load_document_auto, validate_files, ConversionReport, ConvertOptions, CyclePolicy,
    DirectorySink, EntryStatus, StageOrder, ValidateError, DEFAULT_PREFIX,
};
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "openapi2jsonschema")]
#[command(about = "Convert OpenAPI/Swagger definitions into standalone JSON Schema files")]
#[command(version)]
struct Cli {
    /// Log every entry as it is processed
    #[arg(long, short, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors, and only list entries that were not converted
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert every schema definition into its own JSON Schema file
    Convert {
        /// Source document: file path or URL (http:// or https://), JSON or YAML
        schema: String,

        /// Directory to write schemas to
        #[arg(long, short, default_value = "schemas")]
        output: PathBuf,

        /// Prefix for JSON references to the shared definitions (Swagger 2 only)
        #[arg(long, short, default_value = DEFAULT_PREFIX)]
        prefix: String,

        /// Generate a single schema for this type, with every other type embedded
        #[arg(long, short)]
        root: Option<String>,

        /// Inline all references so each schema is self-contained
        #[arg(long)]
        stand_alone: bool,

        /// Name files kind-group-version (requires --kubernetes)
        #[arg(long, requires = "kubernetes")]
        expanded: bool,

        /// Enable Kubernetes-specific processors
        #[arg(long)]
        kubernetes: bool,

        /// Reject properties not listed in the schema
        #[arg(long)]
        strict: bool,

        /// Also convert request and response body schemas (OpenAPI 3 only)
        #[arg(long)]
        include_bodies: bool,

        /// Expand nullability before applying strict mode
        #[arg(long)]
        nullable_first: bool,

        /// Fail entries with circular references instead of keeping back-references
        #[arg(long, requires = "stand_alone")]
        fail_on_cycle: bool,

        /// Print the conversion report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate an instance against a generated schema
    Validate {
        /// Instance file to validate (JSON or YAML)
        instance: PathBuf,

        /// Self-contained schema (root mode or --stand-alone output)
        #[arg(long, short)]
        schema: PathBuf,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },
}

struct ConvertArgs {
    schema: String,
    output: PathBuf,
    options: ConvertOptions,
    json_output: bool,
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for --json
    let log_level = if cli.verbose {
        LevelFilter::DEBUG
    } else if cli.quiet {
        LevelFilter::ERROR
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Convert {
            schema,
            output,
            prefix,
            root,
            stand_alone,
            expanded,
            kubernetes,
            strict,
            include_bodies,
            nullable_first,
            fail_on_cycle,
            json,
        } => {
            let mut options = ConvertOptions::new()
                .prefix(prefix)
                .stand_alone(stand_alone)
                .expanded(expanded)
                .kubernetes(kubernetes)
                .strict(strict)
                .include_bodies(include_bodies);
            if let Some(root) = root {
                options = options.root(root);
            }
            if nullable_first {
                options = options.stage_order(StageOrder::NullableFirst);
            }
            if fail_on_cycle {
                options = options.cycle_policy(CyclePolicy::Fail);
            }
            run_convert(ConvertArgs {
                schema,
                output,
                options,
                json_output: json,
                quiet: cli.quiet,
            })
        }

        Commands::Validate {
            instance,
            schema,
            json,
        } => run_validate(&instance, &schema, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn run_convert(args: ConvertArgs) -> Result<(), u8> {
    let document = load_document_auto(&args.schema).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let mut sink = DirectorySink::create(&args.output).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let report = convert(&document, &args.options, &mut sink).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    if args.json_output {
        let output = serde_json::to_string_pretty(&report).map_err(|e| {
            eprintln!("Error serializing report: {}", e);
            2u8
        })?;
        println!("{}", output);
    } else {
        print_summary(&report, sink.dir(), args.quiet);
    }

    // Entry failures are reported, not fatal
    Ok(())
}

fn print_summary(report: &ConversionReport, dir: &Path, quiet: bool) {
    for outcome in &report.outcomes {
        match &outcome.status {
            EntryStatus::Converted if !quiet => println!(
                "  \x1b[32m✓\x1b[0m {} → {}",
                outcome.name,
                outcome.artifact.as_deref().unwrap_or("-")
            ),
            EntryStatus::Converted => {}
            EntryStatus::Skipped { reason } => {
                println!("  \x1b[33m⚠\x1b[0m {}: {}", outcome.name, reason)
            }
            EntryStatus::Failed { error } => {
                println!("  \x1b[31m✗\x1b[0m {}: {}", outcome.name, error)
            }
        }
    }

    println!();
    let (converted, skipped, failed) = (report.converted(), report.skipped(), report.failed());
    if failed == 0 {
        println!(
            "\x1b[32m✓ {} types converted, {} skipped, {} files written to {}\x1b[0m",
            converted,
            skipped,
            report.artifacts.len(),
            dir.display()
        );
    } else {
        println!(
            "\x1b[31m✗ {} types converted, {} skipped, {} failed, {} files written to {}\x1b[0m",
            converted,
            skipped,
            failed,
            report.artifacts.len(),
            dir.display()
        );
    }
}

fn run_validate(instance: &Path, schema: &Path, json_output: bool) -> Result<(), u8> {
    match validate_files(schema, instance) {
        Ok(()) => {
            if json_output {
                println!(r#"{{"valid":true}}"#);
            } else {
                println!("Valid");
            }
            Ok(())
        }
        Err(ValidateError::Invalid { errors }) => {
            if json_output {
                let output = serde_json::json!({
                    "valid": false,
                    "errors": errors
                });
                println!("{}", output);
            } else {
                eprintln!("Validation failed:");
                for error in errors {
                    eprintln!("  {}", error);
                }
            }
            Err(1)
        }
        Err(e) => {
            report_error(json_output, &e.to_string());
            Err(e.exit_code() as u8)
        }
    }
}

/// Output an error message in plain text or JSON format.
fn report_error(json_output: bool, msg: &str) {
    if json_output {
        println!("{}", serde_json::json!({ "valid": false, "error": msg }));
    } else {
        eprintln!("Error: {}", msg);
    }
}
