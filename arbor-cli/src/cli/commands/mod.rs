pub mod distance;
pub mod upgma;

use anyhow::Result;
use arbor_bio::{parse_grid, read_fasta, DistanceMatrix, MatrixBuilder};
use arbor_core::{default_config, load_config, ArborError, Config};
use clap::ValueEnum;
use std::path::Path;
use tracing::info;

use crate::cli::output::OutputFormat;

/// Load the configuration file if one was given, otherwise the defaults
pub fn load_settings(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => {
            let config = load_config(path)?;
            info!("Loaded configuration from {}", path.display());
            config
        }
        None => default_config(),
    };
    Ok(config)
}

/// `--format` if given, else the configured format
pub fn resolve_format(flag: Option<OutputFormat>, config: &Config) -> Result<OutputFormat> {
    match flag {
        Some(format) => Ok(format),
        None => <OutputFormat as ValueEnum>::from_str(&config.output.format, true)
            .map_err(|e| ArborError::Configuration(e).into()),
    }
}

/// Hamming matrix from `--sequence` values or a FASTA file
pub fn sequence_matrix(
    builder: &MatrixBuilder,
    sequences: &[String],
    fasta: Option<&Path>,
) -> Result<DistanceMatrix> {
    let matrix = match fasta {
        Some(path) => {
            let records = read_fasta(path)?;
            info!("Read {} records from {}", records.len(), path.display());
            builder.from_records(&records)?
        }
        None => builder.from_sequences(sequences)?,
    };
    Ok(matrix)
}

/// Matrix from a grid file
pub fn grid_matrix(builder: &MatrixBuilder, path: &Path) -> Result<DistanceMatrix> {
    let text = std::fs::read_to_string(path).map_err(ArborError::from)?;
    let grid = parse_grid(&text)?;
    info!("Read {} grid rows from {}", grid.len(), path.display());
    Ok(builder.from_fraction_grid(&grid)?)
}
