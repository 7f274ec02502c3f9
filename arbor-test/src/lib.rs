//! Test utilities for the Arbor workspace
//!
//! Shared fixtures (classroom sequence sets, hand-computed matrices) and
//! assertions for clustering results, so the bio and CLI test suites check the
//! same invariants the same way.

pub mod assertions;
pub mod fixtures;

// Re-export commonly used items
pub use assertions::{assert_matrix_symmetric, assert_upgma_invariants};
pub use fixtures::{course_sequences, hand_matrix, write_fixture};

/// Initialize test logging (safe to call from every test)
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
