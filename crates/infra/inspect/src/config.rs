//! Inspector configuration.

use lambda_types::config::{FunctionConfig, FunctionConfigError};
use serde::{Deserialize, Serialize};

/// Inspector-level configuration, the `[inspect]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectConfig {
    /// Log level.
    pub log_level: String,
    /// Treat keys the shape ignores as errors. Off by default, so
    /// documented payloads carrying fields the catalog does not model
    /// still pass with a warning.
    pub strict: bool,
    /// Pretty-print JSON output.
    pub pretty: bool,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            strict: false,
            pretty: true,
        }
    }
}

/// Loads configuration from a TOML file.
///
/// Both the `[inspect]` and `[function]` tables are optional.
pub fn load_config(path: &str) -> Result<(InspectConfig, FunctionConfig), ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
    parse_config(&content)
}

/// Parses configuration from TOML text.
pub fn parse_config(content: &str) -> Result<(InspectConfig, FunctionConfig), ConfigError> {
    let config: toml::Value =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

    let inspect: InspectConfig = config
        .get("inspect")
        .map(|v| toml::Value::try_into(v.clone()))
        .transpose()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?
        .unwrap_or_default();

    let function: FunctionConfig = config
        .get("function")
        .map(|v| toml::Value::try_into(v.clone()))
        .transpose()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?
        .unwrap_or_default();
    function.validate()?;

    Ok((inspect, function))
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Invalid [function] table: {0}")]
    InvalidFunction(#[from] FunctionConfigError),
}
