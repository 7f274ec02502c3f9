//! Phylogenetic clustering utilities for Arbor
//!
//! Distance matrices are built from aligned DNA sequences (Hamming distance)
//! or from a user-entered grid, then clustered with UPGMA. All clustering
//! arithmetic is exact: distances are [`Fraction`]s and every merge step keeps
//! the operands it used.

pub mod distance;
pub mod fasta;
pub mod fraction;
pub mod matrix;
pub mod sequence;
pub mod tree;
pub mod upgma;

// Re-export commonly used types
pub use distance::{
    build_matrix_from_grid, build_matrix_from_sequences, hamming_distance, parse_grid,
    MatrixBuilder,
};
pub use fasta::{parse_fasta_str, read_fasta};
pub use fraction::Fraction;
pub use matrix::DistanceMatrix;
pub use sequence::Sequence;
pub use tree::{ClusterNode, Edge};
pub use upgma::{cluster_upgma, DistanceDerivation, MergeStep, UpgmaResult};
