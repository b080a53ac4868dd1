//! Environment configuration for the lseq binary
//!
//! Read once at startup; command-line flags override it.
//! - `LSEQ_LOG` → tracing filter directives (default `warn`)
//! - `LSEQ_FORMAT` → default output format: `text`, `json` or `debug`

use clap::ValueEnum;

/// Filter used when `LSEQ_LOG` is unset or empty
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// How the final value is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Canonical list text
    Text,
    /// Tagged JSON of the serialized value
    Json,
    /// Human-readable structure
    Debug,
}

impl OutputFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            "debug" => Some(OutputFormat::Debug),
            _ => None,
        }
    }
}

/// Parsed environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub log_filter: String,
    pub format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            format: OutputFormat::Text,
        }
    }
}

impl Config {
    /// Parse from LSEQ_LOG and LSEQ_FORMAT environment variables
    pub fn from_env() -> Self {
        Config::from_vars(
            std::env::var("LSEQ_LOG").ok().as_deref(),
            std::env::var("LSEQ_FORMAT").ok().as_deref(),
        )
    }

    pub fn from_vars(log: Option<&str>, format: Option<&str>) -> Self {
        let mut config = Config::default();
        if let Some(log) = log.filter(|v| !v.trim().is_empty()) {
            config.log_filter = log.trim().to_string();
        }
        if let Some(val) = format.filter(|v| !v.trim().is_empty()) {
            match OutputFormat::from_name(val) {
                Some(format) => config.format = format,
                None => eprintln!("Warning: LSEQ_FORMAT='{}' not recognized, ignoring", val),
            }
        }
        config
    }
}
