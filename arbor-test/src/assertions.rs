//! Custom assertions for clustering results

use arbor_bio::{ClusterNode, DistanceMatrix, Fraction, UpgmaResult};

/// Assert that every supplied cell mirrors its transpose and the diagonal is zero
pub fn assert_matrix_symmetric(matrix: &DistanceMatrix) {
    for i in 0..matrix.len() {
        assert_eq!(
            matrix.get(i, i),
            Some(Fraction::ZERO),
            "diagonal entry for {} is not zero",
            matrix.label(i)
        );
        for j in i + 1..matrix.len() {
            assert_eq!(
                matrix.get(i, j),
                matrix.get(j, i),
                "distance {} -> {} differs from its mirror",
                matrix.label(i),
                matrix.label(j)
            );
        }
    }
}

/// Assert the structural guarantees of a UPGMA run over `taxa` inputs:
///
/// - exactly `taxa - 1` steps, numbered from 1
/// - a tree with `taxa` leaves and `taxa - 1` internal nodes
/// - each step's node sits at half its minimum distance
/// - merge heights never decrease in step order, and parents never sit below children
/// - every recorded matrix is symmetric
pub fn assert_upgma_invariants(result: &UpgmaResult, taxa: usize) {
    assert_eq!(result.steps.len(), taxa - 1, "unexpected number of merge steps");
    assert_eq!(result.tree.leaf_count(), taxa, "unexpected number of leaves");
    assert_eq!(result.tree.internal_count(), taxa - 1, "unexpected number of internal nodes");

    let two = Fraction::from(2u64);
    let mut previous = Fraction::ZERO;
    for (i, step) in result.steps.iter().enumerate() {
        assert_eq!(step.step_number, i + 1);
        assert_eq!(step.matrix.len(), taxa - i, "step {} matrix size", step.step_number);
        assert_matrix_symmetric(&step.matrix);

        assert_eq!(
            step.height.checked_mul(two),
            Some(step.min_distance),
            "step {} height is not half its minimum distance",
            step.step_number
        );
        assert!(
            step.height >= previous,
            "step {} height {} dropped below {}",
            step.step_number,
            step.height,
            previous
        );
        previous = step.height;

        let node = result
            .tree
            .find(&step.new_cluster)
            .unwrap_or_else(|| panic!("{} missing from tree", step.new_cluster));
        assert_eq!(node.height(), step.height);
        assert_eq!(node.size(), step.new_size);
    }

    assert!(result.tree.is_monotone(), "a parent sits below one of its children");
    assert_root_matches_last_step(&result.tree, result);
}

fn assert_root_matches_last_step(tree: &ClusterNode, result: &UpgmaResult) {
    if let Some(last) = result.steps.last() {
        assert_eq!(tree.name(), last.new_cluster, "root is not the last merged cluster");
    }
}
