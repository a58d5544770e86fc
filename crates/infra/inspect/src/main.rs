//! Lambda Types Inspect binary.

use clap::{Parser, Subcommand};
use lambda_types::events::EventSource;
use lambda_types::config::FunctionConfig;
use lambda_types_inspect::{InspectConfig, Inspector, load_config};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error, warn};

#[derive(Debug, Parser)]
#[command(name = "lambda-types-inspect")]
#[command(bin_name = "lambda-types-inspect")]
struct Arguments {
    #[arg(long, global = true, env = "LAMBDA_TYPES_CONFIG")]
    /// TOML configuration file
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the known event sources
    Sources,
    /// Check a payload against its event shape
    Check {
        file: PathBuf,
        #[arg(long)]
        /// Shape to check against instead of the detected one
        source: Option<EventSource>,
    },
    /// Decode a payload and print a summary
    Decode { file: PathBuf },
    /// Run a payload through an echo handler
    Invoke { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Arguments::parse();

    // Load configuration
    let (config, function) = match &args.config {
        Some(path) => load_config(path)?,
        None => (InspectConfig::default(), FunctionConfig::default()),
    };

    // Initialize tracing
    let level = config.log_level.parse::<Level>().unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let inspector = Inspector::new(config, function);

    match args.command {
        Command::Sources => {
            for definition in inspector.sources() {
                let marker = if definition.deprecated { " (deprecated)" } else { "" };
                println!(
                    "{:<20} {:<36} {}{marker}",
                    definition.source, definition.shape, definition.description
                );
            }
        }
        Command::Check { file, source } => {
            let result = inspector.check_file(&file, source)?;
            println!("{}", inspector.render(&result)?);
            if !result.is_valid() {
                error!(file = %file.display(), shape = %result.shape, "Payload does not conform");
                return Ok(ExitCode::FAILURE);
            }
            for path in &result.ignored {
                warn!(key = %path, "Key ignored by shape");
            }
        }
        Command::Decode { file } => {
            let value = inspector.read_event(&file)?;
            println!("{}", inspector.render(&inspector.decode(value)?)?);
        }
        Command::Invoke { file } => {
            let value = inspector.read_event(&file)?;
            let report = inspector.invoke(value).await?;
            println!("{}", inspector.render(&report.outcome.kind())?);
            if report.outcome.is_failure() {
                error!(request_id = %report.request_id, "Handler failed");
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
