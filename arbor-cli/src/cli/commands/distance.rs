use anyhow::Result;
use arbor_bio::MatrixBuilder;
use arbor_core::{ArborError, Config};
use clap::{ArgGroup, Args};
use std::path::PathBuf;

use super::{resolve_format, sequence_matrix};
use crate::cli::output::{self, OutputFormat};

#[derive(Args)]
#[command(group(ArgGroup::new("input").required(true).args(["sequences", "fasta"])))]
pub struct DistanceArgs {
    /// Aligned DNA sequence, repeated once per taxon (labelled Seq1, Seq2, ...)
    #[arg(short = 's', long = "sequence", value_name = "SEQ")]
    pub sequences: Vec<String>,

    /// FASTA file of aligned sequences; record ids become taxon names
    #[arg(short = 'f', long, value_name = "FILE")]
    pub fasta: Option<PathBuf>,

    /// Output format (table or json)
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}

pub fn run(args: DistanceArgs, config: &Config) -> Result<()> {
    let format = resolve_format(args.format, config)?;
    let builder = MatrixBuilder::new(config.labels.clone());
    let matrix = sequence_matrix(&builder, &args.sequences, args.fasta.as_deref())?;

    match format {
        OutputFormat::Json => println!("{}", output::render_json(&matrix)?),
        OutputFormat::Newick => {
            return Err(ArborError::Configuration(
                "newick output needs a tree; use `arbor upgma` or --format table|json".to_string(),
            )
            .into())
        }
        OutputFormat::Table => {
            output::section_header("Hamming distance matrix");
            println!(
                "{}",
                output::matrix_table(&matrix, config.output.decimal_places, None)
            );
            output::info(&format!("{} taxa compared", matrix.len()));
        }
    }

    Ok(())
}
