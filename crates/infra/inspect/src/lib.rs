//! # Lambda Types Inspect
//!
//! Checks, decodes and locally invokes Lambda event payloads stored as JSON
//! files.

mod config;

pub use config::{ConfigError, InspectConfig, load_config, parse_config};

use lambda_types::config::FunctionConfig;
use lambda_types::events::conformance::{self, ValidationError, ValidationResult};
use lambda_types::events::{EventError, EventRegistry, EventSource, LambdaEvent, SourceDefinition};
use lambda_types::{
    Context, HandlerError, InvocationReport, InvokeError, Invoker, LoggingMiddleware,
    SourceFilterMiddleware, async_handler_fn,
};
use serde::Serialize;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Inspector error.
#[derive(Debug, thiserror::Error)]
pub enum InspectError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path} is not JSON: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("cannot encode output: {0}")]
    Output(#[from] serde_json::Error),
    #[error(transparent)]
    Event(#[from] EventError),
    #[error(transparent)]
    Invoke(#[from] InvokeError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Ties the configuration to the event catalog.
pub struct Inspector {
    /// Inspector configuration.
    pub config: InspectConfig,
    /// The simulated function used by [`Inspector::invoke`].
    pub function: FunctionConfig,
    registry: EventRegistry,
}

impl Inspector {
    /// Creates an inspector over the standard event sources.
    pub fn new(config: InspectConfig, function: FunctionConfig) -> Self {
        Self {
            config,
            function,
            registry: EventRegistry::with_standard_sources(),
        }
    }

    /// Registered sources, in catalog order.
    pub fn sources(&self) -> Vec<&SourceDefinition> {
        self.registry.list().collect()
    }

    /// Reads a JSON payload from disk.
    pub fn read_event(&self, path: &Path) -> Result<Value, InspectError> {
        let content = read_text(path)?;
        parse_text(path, &content)
    }

    /// Checks a payload against the shape of `source`, or of the detected
    /// source when none is given.
    ///
    /// In strict mode ignored keys fail the check.
    pub fn check(&self, value: &Value, source: Option<EventSource>) -> Result<ValidationResult, InspectError> {
        let source = resolve_source(value, source)?;
        debug!(source = %source, "Checking payload");
        Ok(self.apply_strict(conformance::check_source(source, value)))
    }

    /// Like [`Inspector::check`], but reads the payload from disk so errors
    /// carry a line and column in the file.
    pub fn check_file(&self, path: &Path, source: Option<EventSource>) -> Result<ValidationResult, InspectError> {
        let content = read_text(path)?;
        let value = parse_text(path, &content)?;
        let source = resolve_source(&value, source)?;
        debug!(source = %source, file = %path.display(), "Checking payload");
        Ok(self.apply_strict(conformance::check_source_str(source, &content)))
    }

    fn apply_strict(&self, mut result: ValidationResult) -> ValidationResult {
        if self.config.strict && !result.ignored.is_empty() {
            result.valid = false;
            result.errors.extend(
                result
                    .ignored
                    .iter()
                    .map(|path| ValidationError::new(format!("unknown key `{path}`"))),
            );
        }
        result
    }

    /// Decodes a payload and summarises it, unpacking compressed log
    /// batches and Kinesis record data.
    pub fn decode(&self, value: Value) -> Result<Value, InspectError> {
        let event = LambdaEvent::from_value(value)?;
        let mut summary = json!({
            "source": event.source(),
            "records": event.record_count(),
            "event": event.to_value()?,
        });

        match &event {
            LambdaEvent::CloudWatchLogs(logs) => {
                summary["logs"] = serde_json::to_value(logs.decode()?)?;
            }
            LambdaEvent::Kinesis(stream) => {
                let data = stream
                    .records
                    .iter()
                    .map(|record| {
                        record
                            .kinesis
                            .decode_data()
                            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                summary["data"] = json!(data);
            }
            _ => {}
        }

        Ok(summary)
    }

    /// Runs the payload through an echo handler and reports how it
    /// completed.
    pub async fn invoke(&self, value: Value) -> Result<InvocationReport<Value>, InspectError> {
        let invoker = Invoker::new()
            .with_middleware(LoggingMiddleware::new())
            .with_middleware(if self.config.strict {
                SourceFilterMiddleware::strict()
            } else {
                SourceFilterMiddleware::new()
            });

        let handler = async_handler_fn(|event: Value, _ctx: Context| async move {
            Ok::<_, HandlerError>(event)
        });

        let report = invoker
            .invoke_json::<Value, Value, _>(&handler, value, self.function.context())
            .await?;
        info!(
            request_id = %report.request_id,
            duration_ms = u64::try_from(report.duration.as_millis()).unwrap_or(u64::MAX),
            "Invocation finished"
        );
        Ok(report)
    }

    /// Renders `value` as JSON, pretty-printed when configured.
    pub fn render<T: Serialize>(&self, value: &T) -> Result<String, InspectError> {
        let output = if self.config.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(output)
    }
}

fn read_text(path: &Path) -> Result<String, InspectError> {
    std::fs::read_to_string(path).map_err(|source| InspectError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_text(path: &Path, content: &str) -> Result<Value, InspectError> {
    serde_json::from_str(content).map_err(|source| InspectError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn resolve_source(value: &Value, source: Option<EventSource>) -> Result<EventSource, InspectError> {
    source.or_else(|| EventSource::detect(value)).ok_or_else(|| {
        EventError::UnknownEventSource("payload matches no known producer; pass --source".to_string())
            .into()
    })
}

impl Default for Inspector {
    fn default() -> Self {
        Self::new(InspectConfig::default(), FunctionConfig::default())
    }
}
