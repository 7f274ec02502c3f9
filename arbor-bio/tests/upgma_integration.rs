/// Integration tests for matrix building and UPGMA clustering
use arbor_bio::{
    build_matrix_from_grid, build_matrix_from_sequences, cluster_upgma, fasta, hamming_distance,
    parse_grid, DistanceMatrix, Fraction, MatrixBuilder,
};
use arbor_core::ArborError;
use arbor_test::fixtures::{course_fasta, course_sequences, hand_grid_text, hand_matrix};
use arbor_test::{assert_matrix_symmetric, assert_upgma_invariants, init_test_logging, write_fixture};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::collections::HashSet;

fn int(n: u64) -> Fraction {
    Fraction::from(n)
}

fn frac(n: i128, d: i128) -> Fraction {
    Fraction::new(n, d).unwrap()
}

#[test]
fn test_hamming_examples() {
    assert_eq!(hamming_distance(b"AAAA", b"AAAT"), 1);
    assert_eq!(hamming_distance(b"ACGT", b"TGCA"), 4);

    let matrix = build_matrix_from_sequences(&["AAAA", "AAAT", "TTTT"]).unwrap();
    assert_eq!(matrix.distance("Seq1", "Seq2"), Some(int(1)));
    assert_eq!(matrix.distance("Seq2", "Seq3"), Some(int(3)));
    assert_matrix_symmetric(&matrix);
}

#[test]
fn test_course_sequences_end_to_end() {
    init_test_logging();
    let matrix = build_matrix_from_sequences(&course_sequences()).unwrap();

    let expected = [[0, 6, 8, 13], [6, 0, 2, 11], [8, 2, 0, 13], [13, 11, 13, 0]];
    for (i, row) in expected.iter().enumerate() {
        for (j, &d) in row.iter().enumerate() {
            assert_eq!(matrix.get(i, j), Some(int(d)), "cell ({}, {})", i, j);
        }
    }

    let result = cluster_upgma(&matrix).unwrap();
    assert_upgma_invariants(&result, 4);

    // Seq2/Seq3 at distance 2 is the global minimum
    assert_eq!(result.steps[0].merged, ("Seq2".to_string(), "Seq3".to_string()));
    assert_eq!(result.steps[0].min_distance, int(2));
    assert_eq!(result.steps[1].new_cluster, "(Seq1,(Seq2,Seq3))");
    assert_eq!(result.steps[1].min_distance, int(7));
    assert_eq!(result.steps[2].min_distance, frac(37, 3));

    assert_eq!(result.tree.name(), "((Seq1,(Seq2,Seq3)),Seq4)");
    assert_eq!(result.tree.height(), frac(37, 6));
    assert_eq!(result.leaf_order(), vec!["Seq1", "Seq2", "Seq3", "Seq4"]);
}

#[test]
fn test_hand_matrix_merge_order() {
    let result = cluster_upgma(&hand_matrix()).unwrap();
    assert_upgma_invariants(&result, 5);

    let merged: Vec<(&str, &str)> = result
        .steps
        .iter()
        .map(|s| (s.merged.0.as_str(), s.merged.1.as_str()))
        .collect();
    assert_eq!(
        merged,
        vec![("a", "b"), ("(a,b)", "e"), ("c", "d"), ("((a,b),e)", "(c,d)")]
    );

    let heights: Vec<Fraction> = result.steps.iter().map(|s| s.height).collect();
    assert_eq!(heights, vec![frac(17, 2), int(11), int(14), frac(33, 2)]);

    // Second step averages (a,b) and e into distances to c and d
    let to_c = result.steps[2].matrix.distance("((a,b),e)", "c").unwrap();
    let to_d = result.steps[2].matrix.distance("((a,b),e)", "d").unwrap();
    assert_eq!(to_c, int(30));
    assert_eq!(to_d, int(36));

    let derivation = result.steps[1].derivation_for("c").unwrap();
    assert_eq!(derivation.left_distance, frac(51, 2));
    assert_eq!(derivation.left_size, 2);
    assert_eq!(derivation.right_distance, int(39));
    assert_eq!(derivation.right_size, 1);
    assert_eq!(derivation.result, int(30));
}

#[test]
fn test_weighted_average_matches_formula_exactly() {
    let result = cluster_upgma(&hand_matrix()).unwrap();

    for step in &result.steps {
        for d in &step.derivations {
            let expected = d
                .left_distance
                .checked_mul(Fraction::from(d.left_size))
                .unwrap()
                .checked_add(d.right_distance.checked_mul(Fraction::from(d.right_size)).unwrap())
                .unwrap()
                .checked_div(Fraction::from(d.left_size + d.right_size))
                .unwrap();
            assert_eq!(d.result, expected);
        }
    }
}

#[test]
fn test_new_distances_are_symmetric_in_next_matrix() {
    let result = cluster_upgma(&hand_matrix()).unwrap();

    for pair in result.steps.windows(2) {
        let (step, next) = (&pair[0], &pair[1]);
        for d in &step.derivations {
            assert_eq!(next.matrix.distance(&step.new_cluster, &d.taxon), Some(d.result));
            assert_eq!(next.matrix.distance(&d.taxon, &step.new_cluster), Some(d.result));
        }
    }
}

#[test]
fn test_clustering_is_deterministic_and_leaves_input_untouched() {
    let matrix = build_matrix_from_sequences(&course_sequences()).unwrap();
    let before = matrix.clone();

    let first = cluster_upgma(&matrix).unwrap();
    let second = cluster_upgma(&matrix).unwrap();

    assert_eq!(matrix, before);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_identical_sequences_tie_break() {
    let matrix = build_matrix_from_sequences(&["ACGT", "ACGT", "ACGT"]).unwrap();
    let result = cluster_upgma(&matrix).unwrap();

    assert_upgma_invariants(&result, 3);
    assert_eq!(result.steps[0].merged, ("Seq1".to_string(), "Seq2".to_string()));
    assert_eq!(result.tree.name(), "((Seq1,Seq2),Seq3)");
    assert_eq!(result.tree.height(), Fraction::ZERO);
}

#[test]
fn test_length_mismatch_scenario() {
    let err = build_matrix_from_sequences(&["ACGTACGTAC", "ACGTACGTACGT"]).unwrap_err();
    assert!(matches!(
        err,
        ArborError::LengthMismatch { first_len: 10, second_len: 12, .. }
    ));
}

#[test]
fn test_single_taxon_grid_rejected() {
    let err = build_matrix_from_grid(&[vec![0.0]]).unwrap_err();
    assert!(matches!(err, ArborError::InsufficientInput { found: 1 }));
}

#[test]
fn test_grid_with_decimals_stays_exact() {
    let grid = vec![
        vec![0.0, 0.1, 0.3],
        vec![0.0, 0.0, 0.2],
        vec![0.0, 0.0, 0.0],
    ];
    let result = cluster_upgma(&build_matrix_from_grid(&grid).unwrap()).unwrap();

    assert_eq!(result.steps[0].min_distance, frac(1, 10));
    // (0.3 + 0.2) / 2 exactly, no binary rounding
    assert_eq!(result.steps[1].min_distance, frac(1, 4));
    assert_eq!(result.tree.name(), "((Species1,Species2),Species3)");
}

#[test]
fn test_parsed_grid_matches_hand_matrix() {
    let grid = parse_grid(hand_grid_text()).unwrap();
    let matrix = MatrixBuilder::default().from_fraction_grid(&grid).unwrap();
    let from_grid = cluster_upgma(&matrix).unwrap();
    let from_pairs = cluster_upgma(&hand_matrix()).unwrap();

    let heights = |r: &arbor_bio::UpgmaResult| r.steps.iter().map(|s| s.height).collect::<Vec<_>>();
    assert_eq!(heights(&from_grid), heights(&from_pairs));
    assert_eq!(from_grid.tree.name(), "(((Species1,Species2),Species5),(Species3,Species4))");
}

#[test]
fn test_fasta_names_flow_into_tree() {
    let records = fasta::parse_fasta_str(&course_fasta()).unwrap();
    let matrix = MatrixBuilder::default().from_records(&records).unwrap();
    let result = cluster_upgma(&matrix).unwrap();

    assert_eq!(result.tree.name(), "((Lynx,(Felis,Puma)),Canis)");
    assert_eq!(result.tree.to_newick(), "((Lynx:3.5,(Felis:1,Puma:1):2.5):2.6666666666666665,Canis:6.166666666666667);");
}

#[test]
fn test_fasta_file_end_to_end() {
    let (_dir, path) = write_fixture("course.fasta", &course_fasta()).unwrap();
    let records = fasta::read_fasta(&path).unwrap();
    let result = cluster_upgma(&MatrixBuilder::default().from_records(&records).unwrap()).unwrap();

    assert_upgma_invariants(&result, 4);
    assert_eq!(result.leaf_order(), vec!["Lynx", "Felis", "Puma", "Canis"]);
}

#[test]
fn test_fasta_id_shaped_like_a_cluster_is_rejected() {
    let records = fasta::parse_fasta_str(">a\nAAAA\n>b\nAAAT\n>(a,b)\nTTTT\n").unwrap();
    let err = MatrixBuilder::default().from_records(&records).unwrap_err();
    assert!(matches!(err, ArborError::InvalidTaxonName(ref name) if name == "(a,b)"));

    let err = DistanceMatrix::from_pairs(
        vec!["a".into(), "b,c".into()],
        vec![("a", "b,c", int(1))],
    )
    .unwrap_err();
    assert!(matches!(err, ArborError::InvalidTaxonName(_)));
}

#[test]
fn test_cluster_names_stay_unique_in_every_step() {
    let result = cluster_upgma(&hand_matrix()).unwrap();
    for step in &result.steps {
        let labels: HashSet<&str> = step.matrix.labels().iter().map(String::as_str).collect();
        assert_eq!(labels.len(), step.matrix.len(), "step {} has clashing labels", step.step_number);
        assert_ne!(step.merged.0, step.merged.1);
        assert!(!labels.contains(step.new_cluster.as_str()));
    }
}

#[test]
fn test_user_named_matrix() {
    let matrix = DistanceMatrix::from_pairs(
        vec!["human".into(), "chimp".into(), "gorilla".into()],
        vec![
            ("human", "chimp", int(2)),
            ("human", "gorilla", int(6)),
            ("chimp", "gorilla", int(6)),
        ],
    )
    .unwrap();

    let result = cluster_upgma(&matrix).unwrap();
    assert_eq!(result.tree.name(), "((human,chimp),gorilla)");
    assert_eq!(result.tree.height(), int(3));
}

fn arbitrary_matrix() -> impl Strategy<Value = DistanceMatrix> {
    (2usize..9).prop_flat_map(|n| {
        prop::collection::vec(0u64..50, n * (n - 1) / 2).prop_map(move |values| {
            let labels = (1..=n).map(|i| format!("T{}", i)).collect();
            let mut matrix = DistanceMatrix::new(labels).unwrap();
            let mut values = values.into_iter();
            for i in 0..n {
                for j in i + 1..n {
                    matrix.set(i, j, Fraction::from(values.next().unwrap()));
                }
            }
            matrix
        })
    })
}

proptest! {
    #[test]
    fn prop_upgma_invariants_hold(matrix in arbitrary_matrix()) {
        let result = cluster_upgma(&matrix).unwrap();
        assert_upgma_invariants(&result, matrix.len());

        let mut leaves: Vec<&str> = result.leaf_order();
        leaves.sort_unstable();
        let mut labels: Vec<&str> = matrix.labels().iter().map(String::as_str).collect();
        labels.sort_unstable();
        prop_assert_eq!(leaves, labels);
    }

    #[test]
    fn prop_upgma_is_deterministic(matrix in arbitrary_matrix()) {
        prop_assert_eq!(cluster_upgma(&matrix).unwrap(), cluster_upgma(&matrix).unwrap());
    }
}
