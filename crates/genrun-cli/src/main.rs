//! `genrun` command-line interface.
//!
//! # Usage
//!
//! ```bash
//! # Run a generation script in the current directory
//! genrun run scaffold.gen
//!
//! # Run with output directory and a JSON config pre-loaded into the context
//! genrun run scaffold.gen --output ./my-app --config answers.json
//!
//! # Parse a script without executing it
//! genrun check scaffold.gen
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use genrun_core::context::Context;
use genrun_core::error::ScriptError;
use genrun_core::executor::Executor;
use genrun_core::parser;

#[derive(Parser)]
#[command(name = "genrun", about = "Runner for generation scripts (.gen files)")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a generation script
    Run {
        /// Path to the script file
        script: PathBuf,
        /// JSON file whose top-level keys pre-populate the variable context
        #[arg(short, long, env = "GENRUN_CONFIG")]
        config: Option<PathBuf>,
        /// Directory the script runs in (created if missing)
        #[arg(short, long, default_value = ".", env = "GENRUN_OUTPUT")]
        output: PathBuf,
    },
    /// Parse a script and report, without executing anything
    Check {
        /// Path to the script file
        script: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Run {
            script,
            config,
            output,
        } => run(script, config, output).await,
        Command::Check { script } => check(script),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::from(1)
        }
    }
}

async fn run(
    script: PathBuf,
    config: Option<PathBuf>,
    output: PathBuf,
) -> Result<(), ScriptError> {
    let source = std::fs::read_to_string(&script)?;
    let parsed = parser::parse(&source)?;

    std::fs::create_dir_all(&output)?;
    let output = output.canonicalize()?;

    let mut executor = Executor::new(&output);
    if let Some(path) = config {
        executor = executor.with_context(Context::with_initial(load_config(&path)?));
    }

    executor.run(&parsed).await?;
    info!(script = %script.display(), "finished");
    Ok(())
}

fn check(script: PathBuf) -> Result<(), ScriptError> {
    let source = std::fs::read_to_string(&script)?;
    let parsed = parser::parse(&source)?;
    for warning in &parsed.warnings {
        warn!(line = warning.line, "{}", warning.message);
    }
    println!(
        "{}: {} top-level commands, {} warnings",
        script.display(),
        parsed.nodes.len(),
        parsed.warnings.len()
    );
    if !parsed.metadata.is_empty() {
        let json = serde_json::to_string_pretty(&parsed.metadata).map_err(|e| {
            ScriptError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;
        println!("{}", json);
    }
    Ok(())
}

/// Loads a `--config` file. The top level must be a JSON object; its keys
/// become initial context variables.
fn load_config(path: &PathBuf) -> Result<serde_json::Map<String, serde_json::Value>, ScriptError> {
    let text = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
        ScriptError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("{}: {}", path.display(), e),
        ))
    })?;
    match value {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(ScriptError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("{}: config must be a JSON object", path.display()),
        ))),
    }
}
