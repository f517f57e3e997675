use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use validator::Validate;

/// Default number of sub-graphs compiled at the same time
pub const DEFAULT_WORKER_COUNT: usize = 4;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// How a compiled sample plan is printed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Error)]
#[error("unknown output format `{0}` (expected `text` or `json`)")]
pub struct UnknownOutputFormat(String);

impl FromStr for OutputFormat {
    type Err = UnknownOutputFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(UnknownOutputFormat(s.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Settings for one compile run
#[derive(Clone, Debug, Validate, Serialize, Deserialize)]
pub struct RunConfig {
    /// Replica configuration (YAML)
    #[validate(length(min = 1, message = "Replica config path cannot be empty"))]
    pub config_path: String,

    /// Catalog snapshot (YAML or JSON)
    #[validate(length(min = 1, message = "Catalog path cannot be empty"))]
    pub catalog_path: String,

    /// Sub-graphs compiled concurrently (1-64)
    #[validate(range(min = 1, max = 64, message = "Workers must be between 1 and 64"))]
    pub workers: usize,

    /// Wrap sampling statements with population and sample counts
    pub analyze: bool,

    pub output_format: OutputFormat,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            config_path: String::new(),
            catalog_path: String::new(),
            workers: DEFAULT_WORKER_COUNT,
            analyze: false,
            output_format: OutputFormat::Text,
        }
    }
}

impl RunConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::env_defaults()?;
        config.validate()?;
        Ok(config)
    }

    /// Create configuration from CLI arguments; options left unset on the
    /// command line fall back to `SAMPLEGRAPH_*` environment variables
    pub fn from_cli(cli: CliConfig) -> Result<Self, ConfigError> {
        let mut config = Self::env_defaults()?;
        config.merge(cli);
        config.validate()?;
        Ok(config)
    }

    /// Create configuration from a YAML file
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content,
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Overlay CLI values (CLI overrides environment)
    pub fn merge(&mut self, cli: CliConfig) {
        if let Some(path) = cli.config_path {
            self.config_path = path;
        }
        if let Some(path) = cli.catalog_path {
            self.catalog_path = path;
        }
        if let Some(workers) = cli.workers {
            self.workers = workers;
        }
        if let Some(format) = cli.output_format {
            self.output_format = format;
        }
        self.analyze |= cli.analyze;
    }

    fn env_defaults() -> Result<Self, ConfigError> {
        Ok(Self {
            config_path: env::var("SAMPLEGRAPH_CONFIG").unwrap_or_default(),
            catalog_path: env::var("SAMPLEGRAPH_CATALOG").unwrap_or_default(),
            workers: parse_env_var("SAMPLEGRAPH_WORKERS", "4")?,
            analyze: parse_env_var("SAMPLEGRAPH_ANALYZE", "false")?,
            output_format: parse_env_var("SAMPLEGRAPH_OUTPUT_FORMAT", "text")?,
        })
    }
}

/// CLI configuration (parsed from command line arguments)
#[derive(Clone, Debug, Default)]
pub struct CliConfig {
    pub config_path: Option<String>,
    pub catalog_path: Option<String>,
    pub workers: Option<usize>,
    pub analyze: bool,
    pub output_format: Option<OutputFormat>,
}

/// Parse an environment variable with a default value
fn parse_env_var<T: FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}
