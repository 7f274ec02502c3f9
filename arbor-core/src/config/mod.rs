//! Configuration types for Arbor

use crate::ArborError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub labels: LabelConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Prefixes for synthesized taxon labels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelConfig {
    /// Sequence input is labelled `{prefix}1`, `{prefix}2`, ...
    #[serde(default = "default_sequence_prefix")]
    pub sequence_prefix: String,
    /// Grid input is labelled by row
    #[serde(default = "default_matrix_prefix")]
    pub matrix_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// One of "table", "json", "newick"
    #[serde(default = "default_format")]
    pub format: String,
    /// Decimal places for the projection printed beside exact fractions
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u32,
    #[serde(default = "default_show_matrices")]
    pub show_matrices: bool,
    #[serde(default = "default_show_derivations")]
    pub show_derivations: bool,
}

// Default value functions
fn default_sequence_prefix() -> String { "Seq".to_string() }
fn default_matrix_prefix() -> String { "Species".to_string() }
fn default_format() -> String { "table".to_string() }
fn default_decimal_places() -> u32 { 2 }
fn default_show_matrices() -> bool { true }
fn default_show_derivations() -> bool { true }

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            sequence_prefix: default_sequence_prefix(),
            matrix_prefix: default_matrix_prefix(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            decimal_places: default_decimal_places(),
            show_matrices: default_show_matrices(),
            show_derivations: default_show_derivations(),
        }
    }
}

impl Config {
    /// Check values that serde cannot constrain on its own
    pub fn validate(&self) -> Result<(), ArborError> {
        if self.labels.sequence_prefix.trim().is_empty() || self.labels.matrix_prefix.trim().is_empty() {
            return Err(ArborError::Configuration(
                "label prefixes must not be empty".to_string(),
            ));
        }
        for prefix in [&self.labels.sequence_prefix, &self.labels.matrix_prefix] {
            if prefix.contains(['(', ')', ',']) {
                return Err(ArborError::Configuration(format!(
                    "label prefix '{}' may not contain '(', ')' or ','",
                    prefix
                )));
            }
        }
        match self.output.format.as_str() {
            "table" | "json" | "newick" => {}
            other => {
                return Err(ArborError::Configuration(format!(
                    "unknown output format '{}' (expected table, json or newick)",
                    other
                )))
            }
        }
        if self.output.decimal_places > 10 {
            return Err(ArborError::Configuration(format!(
                "decimal_places must be at most 10, got {}",
                self.output.decimal_places
            )));
        }
        Ok(())
    }
}

pub fn default_config() -> Config {
    Config::default()
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ArborError> {
    let path = path.as_ref();
    debug!("Loading configuration from {}", path.display());
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| ArborError::Configuration(format!("Failed to parse config: {}", e)))?;
    config.validate()?;
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<(), ArborError> {
    let contents = toml::to_string_pretty(config)
        .map_err(|e| ArborError::Configuration(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, contents)?;
    Ok(())
}
