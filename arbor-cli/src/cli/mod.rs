pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "arbor",
    version,
    about = "UPGMA phylogenetic clustering with exact arithmetic",
    long_about = "Arbor builds a distance matrix from aligned DNA sequences (Hamming distance) \
                  or from a distance grid, clusters it with UPGMA, and shows every merge step \
                  with the exact arithmetic behind each new distance."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (TOML)
    #[arg(long, global = true, value_name = "FILE", env = "ARBOR_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Cluster sequences or a distance grid with UPGMA
    Upgma(commands::upgma::UpgmaArgs),

    /// Show the pairwise Hamming distance matrix for a set of sequences
    Distance(commands::distance::DistanceArgs),
}
