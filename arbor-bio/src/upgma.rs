/// UPGMA agglomerative clustering
///
/// The engine repeatedly merges the two closest live clusters until one
/// remains. Live clusters occupy slots in a square working matrix; a merge
/// frees the later slot and puts the new cluster in the earlier one, so
/// surviving rows keep their display position from step to step.
///
/// Ties on the minimum distance go to the pair with the lexicographically
/// smallest `(row, column)` slot pair, i.e. the first pair met when scanning
/// the upper triangle of the current matrix row by row.
use crate::fraction::Fraction;
use crate::matrix::DistanceMatrix;
use crate::tree::ClusterNode;
use arbor_core::{ArborError, ArborResult};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

/// How the distance from a merged cluster to one survivor was derived:
/// `(left_distance × left_size + right_distance × right_size) / (left_size + right_size)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistanceDerivation {
    pub taxon: String,
    pub left_distance: Fraction,
    pub left_size: u64,
    pub right_distance: Fraction,
    pub right_size: u64,
    pub numerator: Fraction,
    pub denominator: Fraction,
    pub result: Fraction,
}

impl DistanceDerivation {
    pub fn decimal(&self, places: u32) -> f64 {
        self.result.round_to(places)
    }
}

impl fmt::Display for DistanceDerivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({} × {} + {} × {}) / ({} + {}) = {} / {}",
            self.left_distance,
            self.left_size,
            self.right_distance,
            self.right_size,
            self.left_size,
            self.right_size,
            self.numerator,
            self.denominator
        )
    }
}

/// One clustering iteration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeStep {
    /// 1-based
    pub step_number: usize,
    /// Live clusters and their distances before this merge
    pub matrix: DistanceMatrix,
    pub merged: (String, String),
    pub min_distance: Fraction,
    /// Height of the new node, `min_distance / 2`
    pub height: Fraction,
    pub new_cluster: String,
    pub new_size: u64,
    /// One entry per surviving cluster, in matrix order
    pub derivations: Vec<DistanceDerivation>,
}

impl MergeStep {
    pub fn description(&self) -> String {
        format!(
            "Merge {} and {} (minimum distance = {})",
            self.merged.0, self.merged.1, self.min_distance
        )
    }

    pub fn derivation_for(&self, taxon: &str) -> Option<&DistanceDerivation> {
        self.derivations.iter().find(|d| d.taxon == taxon)
    }
}

/// Steps in merge order plus the finished tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpgmaResult {
    pub steps: Vec<MergeStep>,
    pub tree: ClusterNode,
}

impl UpgmaResult {
    pub fn leaf_order(&self) -> Vec<&str> {
        self.tree.leaves()
    }
}

struct Slot {
    label: String,
    size: u64,
    node: ClusterNode,
}

/// Working state of one clustering run. Freed slots are `None`.
struct ClusterState {
    slots: Vec<Option<Slot>>,
    cells: Vec<Option<Fraction>>,
    width: usize,
}

impl ClusterState {
    fn from_matrix(matrix: &DistanceMatrix) -> ArborResult<Self> {
        let n = matrix.len();
        if n < 2 {
            return Err(ArborError::InsufficientInput { found: n });
        }

        let mut cells = Vec::with_capacity(n * n);
        for (label, row) in matrix.rows() {
            for (j, cell) in row.iter().enumerate() {
                match cell {
                    None => {
                        return Err(ArborError::IncompleteMatrix {
                            taxon: label.to_string(),
                        })
                    }
                    Some(d) if d.is_negative() => {
                        return Err(ArborError::DegenerateMatrix(format!(
                            "negative distance {} between {} and {}",
                            d,
                            label,
                            matrix.label(j)
                        )))
                    }
                    Some(_) => cells.push(*cell),
                }
            }
        }

        let slots = matrix
            .labels()
            .iter()
            .map(|label| {
                Some(Slot {
                    label: label.clone(),
                    size: 1,
                    node: ClusterNode::leaf(label.clone()),
                })
            })
            .collect();

        Ok(Self {
            slots,
            cells,
            width: n,
        })
    }

    fn live(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(i, _)| i)
    }

    fn live_count(&self) -> usize {
        self.live().count()
    }

    fn slot(&self, index: usize) -> ArborResult<&Slot> {
        self.slots[index].as_ref().ok_or_else(|| freed_slot(index))
    }

    fn take_slot(&mut self, index: usize) -> ArborResult<Slot> {
        self.slots[index].take().ok_or_else(|| freed_slot(index))
    }

    fn cell(&self, i: usize, j: usize) -> ArborResult<Fraction> {
        self.cells[i * self.width + j].ok_or_else(|| ArborError::IncompleteMatrix {
            taxon: self.slots[i]
                .as_ref()
                .map(|slot| slot.label.clone())
                .unwrap_or_default(),
        })
    }

    fn set_cell(&mut self, i: usize, j: usize, value: Option<Fraction>) {
        self.cells[i * self.width + j] = value;
        self.cells[j * self.width + i] = value;
    }

    /// Copy of the live part of the working matrix
    fn snapshot(&self) -> DistanceMatrix {
        let live: Vec<usize> = self.live().collect();
        let labels = self.slots.iter().flatten().map(|slot| slot.label.clone()).collect();
        let cells = live
            .iter()
            .flat_map(|&i| live.iter().map(move |&j| self.cells[i * self.width + j]))
            .collect();
        DistanceMatrix::from_parts(labels, cells)
    }

    /// Minimum-distance pair; the first one found wins ties.
    fn closest_pair(&self) -> ArborResult<(usize, usize, Fraction)> {
        let live: Vec<usize> = self.live().collect();
        let mut best: Option<(usize, usize, Fraction)> = None;

        for (k, &i) in live.iter().enumerate() {
            for &j in &live[k + 1..] {
                let d = self.cell(i, j)?;
                if best.map_or(true, |(_, _, min)| d < min) {
                    best = Some((i, j, d));
                }
            }
        }

        best.ok_or_else(|| {
            ArborError::DegenerateMatrix(format!(
                "no mergeable pair among {} live clusters",
                live.len()
            ))
        })
    }

    fn merge(&mut self, a: usize, b: usize, min: Fraction, step_number: usize) -> ArborResult<MergeStep> {
        let matrix = self.snapshot();
        let overflow = |what: &str| ArborError::ArithmeticOverflow(format!("step {}: {}", step_number, what));

        let (label_a, size_a) = self.slot(a).map(|s| (s.label.clone(), s.size))?;
        let (label_b, size_b) = self.slot(b).map(|s| (s.label.clone(), s.size))?;
        let new_label = format!("({},{})", label_a, label_b);
        let new_size = size_a + size_b;
        let height = min
            .checked_div(Fraction::from(2u64))
            .ok_or_else(|| overflow("merge height"))?;

        let weight_a = Fraction::from(size_a);
        let weight_b = Fraction::from(size_b);
        let denominator = Fraction::from(new_size);

        let survivors: Vec<usize> = self.live().filter(|&c| c != a && c != b).collect();
        let mut derivations = Vec::with_capacity(survivors.len());
        let mut new_distances = Vec::with_capacity(survivors.len());

        for c in survivors {
            let d_a = self.cell(a, c)?;
            let d_b = self.cell(b, c)?;
            let numerator = d_a
                .checked_mul(weight_a)
                .and_then(|x| d_b.checked_mul(weight_b).and_then(|y| x.checked_add(y)))
                .ok_or_else(|| overflow("weighted sum"))?;
            let result = numerator
                .checked_div(denominator)
                .ok_or_else(|| overflow("weighted average"))?;

            derivations.push(DistanceDerivation {
                taxon: self.slot(c)?.label.clone(),
                left_distance: d_a,
                left_size: size_a,
                right_distance: d_b,
                right_size: size_b,
                numerator,
                denominator,
                result,
            });
            new_distances.push((c, result));
        }

        // Free `b`, then rebuild `a` as the merged cluster
        let removed_b = self.take_slot(b)?;
        let removed_a = self.take_slot(a)?;
        for j in 0..self.width {
            self.set_cell(b, j, None);
        }
        for (c, distance) in new_distances {
            self.set_cell(a, c, Some(distance));
        }
        self.set_cell(a, a, Some(Fraction::ZERO));

        let node = ClusterNode::internal(new_label.clone(), height, removed_a.node, removed_b.node);
        self.slots[a] = Some(Slot {
            label: new_label.clone(),
            size: new_size,
            node,
        });

        debug!(
            "Step {}: merged {} and {} at distance {} into {}",
            step_number, label_a, label_b, min, new_label
        );

        Ok(MergeStep {
            step_number,
            matrix,
            merged: (label_a, label_b),
            min_distance: min,
            height,
            new_cluster: new_label,
            new_size,
            derivations,
        })
    }

    fn into_root(mut self) -> ArborResult<ClusterNode> {
        let live: Vec<usize> = self.live().collect();
        match live.as_slice() {
            [root] => Ok(self.take_slot(*root)?.node),
            _ => Err(ArborError::DegenerateMatrix(format!(
                "clustering ended with {} live clusters",
                live.len()
            ))),
        }
    }
}

fn freed_slot(index: usize) -> ArborError {
    ArborError::DegenerateMatrix(format!("cluster slot {} is no longer live", index))
}

/// Cluster `matrix` with UPGMA.
///
/// The input is only read; every run starts from its own working copy, so
/// clustering the same matrix twice yields identical results.
pub fn cluster_upgma(matrix: &DistanceMatrix) -> ArborResult<UpgmaResult> {
    let mut state = ClusterState::from_matrix(matrix)?;
    info!("Running UPGMA over {} taxa", matrix.len());

    let mut steps = Vec::with_capacity(matrix.len() - 1);
    while state.live_count() > 1 {
        let (a, b, min) = state.closest_pair()?;
        let step = state.merge(a, b, min, steps.len() + 1)?;
        steps.push(step);
    }

    let tree = state.into_root()?;
    info!(
        "UPGMA finished after {} merges, root height {}",
        steps.len(),
        tree.height()
    );

    Ok(UpgmaResult { steps, tree })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn int(n: u64) -> Fraction {
        Fraction::from(n)
    }

    fn frac(n: i128, d: i128) -> Fraction {
        Fraction::new(n, d).unwrap()
    }

    fn matrix(labels: &[&str], rows: &[&[u64]]) -> DistanceMatrix {
        let mut m = DistanceMatrix::new(labels.iter().map(|s| s.to_string()).collect()).unwrap();
        for (i, row) in rows.iter().enumerate() {
            for (j, &d) in row.iter().enumerate() {
                if i < j {
                    m.set(i, j, int(d));
                }
            }
        }
        m
    }

    #[test]
    fn test_two_taxa() {
        let m = matrix(&["a", "b"], &[&[0, 5], &[5, 0]]);
        let result = cluster_upgma(&m).unwrap();

        assert_eq!(result.steps.len(), 1);
        assert_eq!(result.steps[0].new_cluster, "(a,b)");
        assert!(result.steps[0].derivations.is_empty());
        assert_eq!(result.tree.height(), frac(5, 2));
        assert_eq!(result.leaf_order(), vec!["a", "b"]);
    }

    #[test]
    fn test_weighted_average_is_exact() {
        // Hand-computed: merge (b,c) at 2, then a joins at (6+8)/2 = 7,
        // then d at (13×1 + 12×2)/3 = 37/3
        let m = matrix(
            &["a", "b", "c", "d"],
            &[&[0, 6, 8, 13], &[6, 0, 2, 11], &[8, 2, 0, 13], &[13, 11, 13, 0]],
        );
        let result = cluster_upgma(&m).unwrap();
        let steps = &result.steps;

        assert_eq!(steps[0].merged, ("b".to_string(), "c".to_string()));
        assert_eq!(steps[0].derivation_for("a").unwrap().result, int(7));
        assert_eq!(steps[0].derivation_for("d").unwrap().result, int(12));

        assert_eq!(steps[1].merged, ("a".to_string(), "(b,c)".to_string()));
        assert_eq!(steps[1].min_distance, int(7));

        let last = steps[2].derivations.len();
        assert_eq!(last, 0);
        let to_d = steps[1].derivation_for("d").unwrap();
        assert_eq!(to_d.left_distance, int(13));
        assert_eq!(to_d.left_size, 1);
        assert_eq!(to_d.right_distance, int(12));
        assert_eq!(to_d.right_size, 2);
        assert_eq!(to_d.numerator, int(37));
        assert_eq!(to_d.denominator, int(3));
        assert_eq!(to_d.result, frac(37, 3));
        assert_eq!(to_d.to_string(), "(13 × 1 + 12 × 2) / (1 + 2) = 37 / 3");
        assert_eq!(to_d.decimal(2), 12.33);

        assert_eq!(steps[2].min_distance, frac(37, 3));
        assert_eq!(steps[2].new_cluster, "((a,(b,c)),d)");
        assert_eq!(result.tree.height(), frac(37, 6));
    }

    #[test]
    fn test_step_matrices_are_pre_merge_snapshots() {
        let m = matrix(
            &["a", "b", "c", "d"],
            &[&[0, 6, 8, 13], &[6, 0, 2, 11], &[8, 2, 0, 13], &[13, 11, 13, 0]],
        );
        let result = cluster_upgma(&m).unwrap();

        assert_eq!(result.steps[0].matrix, m);
        let second = &result.steps[1].matrix;
        assert_eq!(second.labels(), &["a".to_string(), "(b,c)".to_string(), "d".to_string()]);
        assert_eq!(second.distance("(b,c)", "d"), Some(int(12)));
        assert_eq!(second.distance("d", "(b,c)"), Some(int(12)));
        assert!(second.is_complete());
    }

    #[test]
    fn test_ties_pick_first_pair_in_scan_order() {
        // All distances equal: (a,b) is scanned first
        let m = matrix(&["a", "b", "c"], &[&[0, 4, 4], &[4, 0, 4], &[4, 4, 0]]);
        let result = cluster_upgma(&m).unwrap();
        assert_eq!(result.steps[0].merged, ("a".to_string(), "b".to_string()));
        assert_eq!(result.steps[1].new_cluster, "((a,b),c)");
    }

    #[test]
    fn test_zero_distance_pairs_merge() {
        let m = matrix(&["a", "b", "c"], &[&[0, 3, 0], &[3, 0, 3], &[0, 3, 0]]);
        let result = cluster_upgma(&m).unwrap();
        assert_eq!(result.steps[0].merged, ("a".to_string(), "c".to_string()));
        assert_eq!(result.steps[0].height, Fraction::ZERO);
        assert_eq!(result.steps[1].min_distance, int(3));
    }

    #[test]
    fn test_insufficient_input() {
        let m = DistanceMatrix::new(vec!["solo".to_string()]).unwrap();
        assert!(matches!(
            cluster_upgma(&m),
            Err(ArborError::InsufficientInput { found: 1 })
        ));
    }

    #[test]
    fn test_incomplete_matrix_names_taxon() {
        let mut m = DistanceMatrix::new(vec!["a".into(), "b".into(), "c".into()]).unwrap();
        m.set(0, 1, int(1));
        m.set(0, 2, int(1));
        match cluster_upgma(&m) {
            Err(ArborError::IncompleteMatrix { taxon }) => assert_eq!(taxon, "b"),
            other => panic!("Expected IncompleteMatrix, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_distance_is_degenerate() {
        let mut m = DistanceMatrix::new(vec!["a".into(), "b".into()]).unwrap();
        m.set(0, 1, Fraction::from_integer(-1));
        assert!(matches!(cluster_upgma(&m), Err(ArborError::DegenerateMatrix(_))));
    }

    #[test]
    fn test_overflow_is_reported() {
        let max = Fraction::from_integer(i128::MAX);
        let mut m = DistanceMatrix::new(vec!["a".into(), "b".into(), "c".into()]).unwrap();
        m.set(0, 1, Fraction::ONE);
        m.set(0, 2, max);
        m.set(1, 2, max);

        match cluster_upgma(&m) {
            Err(ArborError::ArithmeticOverflow(msg)) => assert_eq!(msg, "step 1: weighted sum"),
            other => panic!("Expected ArithmeticOverflow, got {:?}", other),
        }
    }

    #[test]
    fn test_description() {
        let m = matrix(&["a", "b"], &[&[0, 3], &[3, 0]]);
        let result = cluster_upgma(&m).unwrap();
        assert_eq!(result.steps[0].description(), "Merge a and b (minimum distance = 3)");
    }
}
