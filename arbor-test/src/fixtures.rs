//! Test fixtures and data generators

use anyhow::Result;
use arbor_bio::{DistanceMatrix, Fraction};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Four aligned 29-mers used in the course's UPGMA exercise.
///
/// Pairwise Hamming distances: S1-S2 6, S1-S3 8, S1-S4 13, S2-S3 2,
/// S2-S4 11, S3-S4 13.
pub fn course_sequences() -> Vec<&'static str> {
    vec![
        "GTATAGGGGATATACTGAGAGCTATTACA",
        "GTATTGGCGATATTCCGAGACCTATTACT",
        "CTATTGGCCATATTCCGAGACCTATTACT",
        "GTATAGCCGATACCCGAGACCTAATTACT",
    ]
}

/// The same sequences as FASTA with species names as ids
pub fn course_fasta() -> String {
    let names = ["Lynx", "Felis", "Puma", "Canis"];
    names
        .iter()
        .zip(course_sequences())
        .map(|(name, seq)| format!(">{} course fixture\n{}\n", name, seq))
        .collect()
}

/// Five-taxon matrix whose UPGMA result is worked out by hand in the tests
///
/// ```text
///      a   b   c   d   e
/// a    0  17  21  31  23
/// b   17   0  30  34  21
/// c   21  30   0  28  39
/// d   31  34  28   0  43
/// e   23  21  39  43   0
/// ```
pub fn hand_matrix() -> DistanceMatrix {
    let labels = ["a", "b", "c", "d", "e"];
    let rows: [[u64; 5]; 5] = [
        [0, 17, 21, 31, 23],
        [17, 0, 30, 34, 21],
        [21, 30, 0, 28, 39],
        [31, 34, 28, 0, 43],
        [23, 21, 39, 43, 0],
    ];

    let mut pairs = Vec::new();
    for i in 0..5 {
        for j in i + 1..5 {
            pairs.push((labels[i], labels[j], Fraction::from(rows[i][j])));
        }
    }

    DistanceMatrix::from_pairs(labels.iter().map(|l| l.to_string()).collect(), pairs)
        .expect("hand matrix fixture is well formed")
}

/// Grid text for [`hand_matrix`] in the CLI's upper-triangle format
pub fn hand_grid_text() -> &'static str {
    "# five-taxon worked example\n\
     0 17 21 31 23\n\
     - 0 30 34 21\n\
     - - 0 28 39\n\
     - - - 0 43\n\
     - - - - 0\n"
}

/// Write `content` into a fresh temporary directory
pub fn write_fixture(name: &str, content: &str) -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let path = dir.path().join(name);
    fs::write(&path, content)?;
    Ok((dir, path))
}
