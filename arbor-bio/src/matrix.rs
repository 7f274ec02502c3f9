/// Symmetric distance matrix over labelled taxa
///
/// Cells are stored row-major in a flat square array with a parallel label
/// table. Writing `(i, j)` always writes `(j, i)` as well, and the diagonal is
/// fixed at zero, so a matrix can never be asymmetric. A cell is `None` until a
/// distance has been supplied for that pair.
use crate::fraction::Fraction;
use arbor_core::{ArborError, ArborResult};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::collections::HashSet;

/// Characters used to build merged cluster names like `(a,b)`
pub const RESERVED_LABEL_CHARS: &[char] = &['(', ')', ','];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceMatrix {
    labels: Vec<String>,
    cells: Vec<Option<Fraction>>,
}

impl DistanceMatrix {
    /// Create a matrix with a zero diagonal and every other cell unset.
    ///
    /// Labels must be unique and free of `(`, `)` and `,`, which are reserved
    /// for the names of merged clusters.
    pub fn new(labels: Vec<String>) -> ArborResult<Self> {
        let mut seen = HashSet::with_capacity(labels.len());
        for label in &labels {
            if label.contains(RESERVED_LABEL_CHARS) {
                return Err(ArborError::InvalidTaxonName(label.clone()));
            }
            if !seen.insert(label.as_str()) {
                return Err(ArborError::DuplicateTaxon(label.clone()));
            }
        }

        let n = labels.len();
        let mut cells = vec![None; n * n];
        for i in 0..n {
            cells[i * n + i] = Some(Fraction::ZERO);
        }

        Ok(Self { labels, cells })
    }

    /// Build from user-named taxa and `(a, b, distance)` triples.
    pub fn from_pairs<S, I>(labels: Vec<String>, pairs: I) -> ArborResult<Self>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = (S, S, Fraction)>,
    {
        let mut matrix = Self::new(labels)?;
        for (a, b, distance) in pairs {
            let (a, b) = (a.as_ref(), b.as_ref());
            let i = matrix
                .index_of(a)
                .ok_or_else(|| ArborError::UnknownTaxon(a.to_string()))?;
            let j = matrix
                .index_of(b)
                .ok_or_else(|| ArborError::UnknownTaxon(b.to_string()))?;
            if i == j {
                if !distance.is_zero() {
                    return Err(ArborError::DegenerateMatrix(format!(
                        "distance from {} to itself must be 0, got {}",
                        a, distance
                    )));
                }
                continue;
            }
            matrix.set(i, j, distance);
        }
        Ok(matrix)
    }

    /// Assemble from parts whose labels are already known to be unique.
    pub(crate) fn from_parts(labels: Vec<String>, cells: Vec<Option<Fraction>>) -> Self {
        debug_assert_eq!(labels.len() * labels.len(), cells.len());
        Self { labels, cells }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn label(&self, index: usize) -> &str {
        &self.labels[index]
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Distance between taxa `i` and `j`, if one has been supplied.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, i: usize, j: usize) -> Option<Fraction> {
        let n = self.len();
        assert!(i < n && j < n, "index ({}, {}) out of bounds for {} taxa", i, j, n);
        self.cells[i * n + j]
    }

    /// Set the distance between taxa `i` and `j` in both directions.
    /// Writes to the diagonal are ignored.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn set(&mut self, i: usize, j: usize, distance: Fraction) {
        let n = self.len();
        assert!(i < n && j < n, "index ({}, {}) out of bounds for {} taxa", i, j, n);
        if i == j {
            return;
        }
        self.cells[i * n + j] = Some(distance);
        self.cells[j * n + i] = Some(distance);
    }

    /// Distance between two taxa looked up by label
    pub fn distance(&self, a: &str, b: &str) -> Option<Fraction> {
        let i = self.index_of(a)?;
        let j = self.index_of(b)?;
        self.get(i, j)
    }

    /// Iterate rows as `(label, cells)`
    pub fn rows(&self) -> impl Iterator<Item = (&str, &[Option<Fraction>])> {
        let n = self.len().max(1);
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.cells.chunks(n))
    }

    /// First taxon (in row order) that lacks a distance to some other taxon
    pub fn first_incomplete(&self) -> Option<&str> {
        self.rows()
            .find(|(_, row)| row.iter().any(Option::is_none))
            .map(|(label, _)| label)
    }

    pub fn is_complete(&self) -> bool {
        self.first_incomplete().is_none()
    }

    /// Row of rounded decimal projections, blank cells as `None`
    pub fn row_decimals(&self, index: usize, places: u32) -> Vec<Option<f64>> {
        let n = self.len();
        self.cells[index * n..(index + 1) * n]
            .iter()
            .map(|cell| cell.map(|d| d.round_to(places)))
            .collect()
    }
}

impl Serialize for DistanceMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let rows: Vec<&[Option<Fraction>]> = self.rows().map(|(_, row)| row).collect();
        let mut state = serializer.serialize_struct("DistanceMatrix", 2)?;
        state.serialize_field("labels", &self.labels)?;
        state.serialize_field("rows", &rows)?;
        state.end()
    }
}
