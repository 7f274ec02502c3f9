/// Construction of the initial distance matrix
///
/// Two sources are supported: equal-length DNA sequences compared by Hamming
/// distance, and a user-entered grid of which only the upper triangle is read.
use crate::fraction::Fraction;
use crate::matrix::DistanceMatrix;
use crate::sequence::Sequence;
use arbor_core::{ArborError, ArborResult, LabelConfig};
use rayon::prelude::*;
use tracing::debug;

/// Count positions where two equal-length sequences differ
pub fn hamming_distance(a: &[u8], b: &[u8]) -> usize {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b.iter()).filter(|(x, y)| x != y).count()
}

/// Builds [`DistanceMatrix`] values, naming taxa with the configured prefixes
#[derive(Debug, Clone, Default)]
pub struct MatrixBuilder {
    labels: LabelConfig,
}

impl MatrixBuilder {
    pub fn new(labels: LabelConfig) -> Self {
        Self { labels }
    }

    /// Hamming matrix from raw sequences, labelled `Seq1`, `Seq2`, ... in input order.
    ///
    /// Blank entries are skipped before labelling, so labels stay contiguous.
    pub fn from_sequences<S: AsRef<str>>(&self, sequences: &[S]) -> ArborResult<DistanceMatrix> {
        let records: Vec<Sequence> = sequences
            .iter()
            .map(|s| AsRef::<str>::as_ref(s))
            .filter(|s| !s.trim().is_empty())
            .enumerate()
            .map(|(i, s)| {
                Sequence::new(
                    format!("{}{}", self.labels.sequence_prefix, i + 1),
                    s.as_bytes().to_vec(),
                )
            })
            .collect();

        self.from_records(&records)
    }

    /// Hamming matrix from named records (e.g. FASTA), keeping their ids as labels
    pub fn from_records(&self, records: &[Sequence]) -> ArborResult<DistanceMatrix> {
        if records.len() < 2 {
            return Err(ArborError::InsufficientInput {
                found: records.len(),
            });
        }

        let cleaned: Vec<Vec<u8>> = records
            .iter()
            .map(Sequence::normalized_dna)
            .collect::<ArborResult<_>>()?;

        let first_len = cleaned[0].len();
        if let Some((record, seq)) = records
            .iter()
            .zip(cleaned.iter())
            .find(|(_, seq)| seq.len() != first_len)
        {
            return Err(ArborError::LengthMismatch {
                first: records[0].id.clone(),
                first_len,
                second: record.id.clone(),
                second_len: seq.len(),
            });
        }

        let labels = records.iter().map(|r| r.id.clone()).collect();
        let mut matrix = DistanceMatrix::new(labels)?;

        let n = cleaned.len();
        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .collect();
        let distances: Vec<usize> = pairs
            .par_iter()
            .map(|&(i, j)| hamming_distance(&cleaned[i], &cleaned[j]))
            .collect();

        for (&(i, j), &distance) in pairs.iter().zip(distances.iter()) {
            matrix.set(i, j, Fraction::from(distance));
        }

        debug!(
            "Built {}x{} Hamming matrix over sequences of length {}",
            n, n, first_len
        );
        Ok(matrix)
    }

    /// Matrix from a numeric grid, labelled `Species1`, `Species2`, ... by row.
    ///
    /// Only the upper triangle is read and mirrored; missing cells count as 0.
    pub fn from_grid(&self, grid: &[Vec<f64>]) -> ArborResult<DistanceMatrix> {
        let n = grid.len();
        let mut exact = Vec::with_capacity(n);
        for (i, row) in grid.iter().enumerate() {
            let mut cells = Vec::with_capacity(row.len().min(n));
            // Columns past the last row have no taxon and are ignored
            for (j, &value) in row.iter().enumerate().take(n) {
                if j <= i {
                    cells.push(None);
                    continue;
                }
                let cell = Fraction::from_f64(value).ok_or_else(|| ArborError::InvalidDistance {
                    row: i + 1,
                    column: j + 1,
                    value: value.to_string(),
                })?;
                cells.push(Some(cell));
            }
            exact.push(cells);
        }

        self.from_fraction_grid(&exact)
    }

    /// Matrix from a grid of exact cells; `None` marks a blank cell.
    pub fn from_fraction_grid(&self, grid: &[Vec<Option<Fraction>>]) -> ArborResult<DistanceMatrix> {
        let n = grid.len();
        if n < 2 {
            return Err(ArborError::InsufficientInput { found: n });
        }

        let labels = (1..=n)
            .map(|i| format!("{}{}", self.labels.matrix_prefix, i))
            .collect();
        let mut matrix = DistanceMatrix::new(labels)?;

        for (i, row) in grid.iter().enumerate() {
            for j in i + 1..n {
                let distance = row.get(j).copied().flatten().unwrap_or(Fraction::ZERO);
                if distance.is_negative() {
                    return Err(ArborError::InvalidDistance {
                        row: i + 1,
                        column: j + 1,
                        value: distance.to_string(),
                    });
                }
                matrix.set(i, j, distance);
            }
        }

        debug!("Built {}x{} matrix from grid input", n, n);
        Ok(matrix)
    }
}

/// Parse grid text: one row per line, cells separated by whitespace, commas
/// or semicolons. `-`, `.` and empty cells are blank. Lines starting with `#`
/// are ignored.
pub fn parse_grid(text: &str) -> ArborResult<Vec<Vec<Option<Fraction>>>> {
    let mut grid = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let tokens: Vec<&str> = if line.contains(',') || line.contains(';') {
            line.split(|c: char| c == ',' || c == ';').map(str::trim).collect()
        } else {
            line.split_whitespace().collect()
        };

        let row = tokens
            .into_iter()
            .enumerate()
            .map(|(col, token)| match token {
                "" | "-" | "." => Ok(None),
                value => value.parse::<Fraction>().map(Some).map_err(|_| {
                    ArborError::Parse(format!(
                        "line {}, column {}: '{}' is not a number",
                        line_no + 1,
                        col + 1,
                        value
                    ))
                }),
            })
            .collect::<ArborResult<Vec<_>>>()?;
        grid.push(row);
    }

    Ok(grid)
}

/// Hamming matrix from raw sequences with default labels
pub fn build_matrix_from_sequences<S: AsRef<str>>(sequences: &[S]) -> ArborResult<DistanceMatrix> {
    MatrixBuilder::default().from_sequences(sequences)
}

/// Matrix from a numeric upper-triangle grid with default labels
pub fn build_matrix_from_grid(grid: &[Vec<f64>]) -> ArborResult<DistanceMatrix> {
    MatrixBuilder::default().from_grid(grid)
}
