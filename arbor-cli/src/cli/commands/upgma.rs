use anyhow::Result;
use arbor_bio::{cluster_upgma, MatrixBuilder};
use arbor_core::Config;
use clap::{ArgGroup, Args};
use std::path::PathBuf;

use super::{grid_matrix, resolve_format, sequence_matrix};
use crate::cli::output::{self, DisplayOptions, OutputFormat};

#[derive(Args)]
#[command(group(
    ArgGroup::new("input")
        .required(true)
        .args(["sequences", "fasta", "matrix"])
))]
pub struct UpgmaArgs {
    /// Aligned DNA sequence, repeated once per taxon (labelled Seq1, Seq2, ...)
    #[arg(short = 's', long = "sequence", value_name = "SEQ")]
    pub sequences: Vec<String>,

    /// FASTA file of aligned sequences; record ids become taxon names
    #[arg(short = 'f', long, value_name = "FILE")]
    pub fasta: Option<PathBuf>,

    /// Distance grid file, one row per line (only the upper triangle is read)
    #[arg(short = 'm', long, value_name = "FILE")]
    pub matrix: Option<PathBuf>,

    /// Output format [default: from config, normally table]
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Decimal places shown beside exact fractions
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(0..=10))]
    pub decimal_places: Option<u32>,

    /// Print only the final tree, without per-step matrices and derivations
    #[arg(long)]
    pub tree_only: bool,
}

pub fn run(args: UpgmaArgs, config: &Config) -> Result<()> {
    let format = resolve_format(args.format, config)?;
    let builder = MatrixBuilder::new(config.labels.clone());

    let matrix = match &args.matrix {
        Some(path) => grid_matrix(&builder, path)?,
        None => sequence_matrix(&builder, &args.sequences, args.fasta.as_deref())?,
    };

    let result = cluster_upgma(&matrix)?;

    match format {
        OutputFormat::Json => println!("{}", output::render_json(&result)?),
        OutputFormat::Newick => println!("{}", result.tree.to_newick()),
        OutputFormat::Table => {
            let options = DisplayOptions {
                decimal_places: args.decimal_places.unwrap_or(config.output.decimal_places),
                show_steps: !args.tree_only,
                show_matrices: config.output.show_matrices,
                show_derivations: config.output.show_derivations,
            };
            output::print_upgma(&matrix, &result, &options)?;
        }
    }

    Ok(())
}
