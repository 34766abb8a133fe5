//! Command-line front-end for the predicate compilers
//!
//! Compiles operation-language source or structural criteria against a
//! schema document and prints the resulting predicate tree.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use octofhir_predicate_compiler::diagnostics::{DiagnosticFormatter, Format};
use octofhir_predicate_compiler::{
    CompileError, CompilerConfig, InMemorySchema, Operation, OperationCompiler,
    StructuralConverter,
};
use serde_json::Value as JsonValue;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "operation-compiler")]
#[command(about = "Compile criteria into predicate trees over an entity schema")]
#[command(version)]
#[command(author = "OctoFHIR Team <funyloony@gmail.com>")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print compiled trees as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Diagnostic format: text, json or compact
    #[arg(long, global = true, default_value = "text")]
    format: Format,

    /// Compiler configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile an operation-language expression
    Compile {
        /// Schema document
        #[arg(short, long)]
        schema: PathBuf,
        /// Root entity type
        #[arg(short = 't', long = "type")]
        type_name: String,
        /// Operation source
        operation: String,
    },
    /// Convert structural criteria (JSON)
    Convert {
        /// Schema document
        #[arg(short, long)]
        schema: PathBuf,
        /// Root entity type
        #[arg(short = 't', long = "type")]
        type_name: String,
        /// Criteria file (reads from stdin if not provided)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Validate a schema document and list its types
    Check {
        /// Schema document
        #[arg(short, long)]
        schema: PathBuf,
    },
}

/// Outcome of a subcommand that may fail with a compile diagnostic
enum Outcome {
    Done,
    Rejected(CompileError),
}

fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(Outcome::Done) => {}
        Ok(Outcome::Rejected(error)) => {
            let formatter = DiagnosticFormatter::new(cli.format);
            eprintln!("{}", formatter.format(&error.to_diagnostic()));
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn run(cli: &Cli) -> Result<Outcome> {
    let config = load_config(cli.config.as_deref())?;

    match &cli.command {
        Commands::Compile {
            schema,
            type_name,
            operation,
        } => {
            let schema = load_schema(schema)?;
            let compiler = OperationCompiler::with_config(&schema, config);
            match compiler.compile(type_name, operation) {
                Ok(operation) => print_operation(&operation, cli.json).map(|()| Outcome::Done),
                Err(error) => Ok(Outcome::Rejected(error)),
            }
        }
        Commands::Convert {
            schema,
            type_name,
            file,
        } => {
            let schema = load_schema(schema)?;
            let criteria = read_criteria(file.as_deref())?;
            let JsonValue::Object(criteria) = criteria else {
                bail!("Criteria must be a JSON object");
            };
            let converter = StructuralConverter::with_config(&schema, config);
            match converter.convert(type_name, &criteria) {
                Ok(operation) => print_operation(&operation, cli.json).map(|()| Outcome::Done),
                Err(error) => Ok(Outcome::Rejected(error)),
            }
        }
        Commands::Check { schema } => {
            let schema = load_schema(schema)?;
            for entity in schema.entity_types() {
                println!(
                    "{} ({} attributes, {} relationships)",
                    entity.name(),
                    entity.attributes().count(),
                    entity.relationships().count()
                );
            }
            Ok(Outcome::Done)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<CompilerConfig> {
    match path {
        Some(path) => Ok(CompilerConfig::from_path(path)?),
        None => Ok(CompilerConfig::default()),
    }
}

fn load_schema(path: &Path) -> Result<InMemorySchema> {
    InMemorySchema::from_path(path)
        .with_context(|| format!("Failed to load schema '{}'", path.display()))
}

fn read_criteria(file: Option<&Path>) -> Result<JsonValue> {
    let text = match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Error reading file '{}'", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Error reading from stdin")?;
            buffer
        }
    };
    serde_json::from_str(&text).context("Error parsing criteria JSON")
}

fn print_operation(operation: &Operation, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(operation)?);
    } else {
        println!("{operation}");
    }
    Ok(())
}
