//! Node configuration for the checkpoint service.
//!
//! [`NodeConfig`] is layered from built-in defaults, an optional TOML file,
//! and `ANCHOR_*` environment variables (e.g. `ANCHOR_NETWORK_TYPE=testnet`),
//! later layers winning. Command-line flags are applied on top by the binary.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anchor_core::constants::NetworkType;
use serde::Deserialize;

use crate::error::NodeError;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event, for log aggregation pipelines.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Json => "json",
        })
    }
}

/// Configuration for the checkpoint service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NodeConfig {
    /// Network whose checkpoint table is active.
    pub network_type: NetworkType,
    /// Log level filter string (e.g. "info", "debug", "anchor_consensus=trace").
    pub log_level: String,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            network_type: NetworkType::Mainnet,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl NodeConfig {
    /// Default config file location, `<config dir>/anchor/anchor.toml`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("anchor")
            .join("anchor.toml")
    }

    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, [`default_path`](Self::default_path)
    /// is read if present.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::Config`] if the file is missing (explicit path
    /// only), malformed, or names an unknown network or log format.
    pub fn load(path: Option<&Path>) -> Result<Self, NodeError> {
        let defaults = Self::default();
        let file = match path {
            Some(p) => config::File::from(p).required(true),
            None => config::File::from(Self::default_path()).required(false),
        };
        let cfg = config::Config::builder()
            .set_default("network_type", defaults.network_type.name())?
            .set_default("log_level", defaults.log_level)?
            .set_default("log_format", defaults.log_format.to_string())?
            .add_source(file)
            .add_source(config::Environment::with_prefix("ANCHOR"))
            .build()?;
        Ok(cfg.try_deserialize()?)
    }
}
