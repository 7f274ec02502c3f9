//! Core error types for Arbor

use thiserror::Error;

/// Main error type for Arbor operations
#[derive(Error, Debug)]
pub enum ArborError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Parsing error: {0}")]
    Parse(String),

    /// A sequence contains a character outside {A, C, G, T}
    #[error("Invalid alphabet: {taxon} has '{character}' at position {position} (only A, C, G, T are allowed)")]
    InvalidAlphabet {
        taxon: String,
        character: char,
        position: usize,
    },

    /// Two sequences have different lengths where Hamming distance needs equal lengths
    #[error("Length mismatch: {first} has length {first_len} but {second} has length {second_len}")]
    LengthMismatch {
        first: String,
        first_len: usize,
        second: String,
        second_len: usize,
    },

    #[error("Insufficient input: at least 2 taxa are required, found {found}")]
    InsufficientInput { found: usize },

    /// A live taxon has no distance entry to some other live taxon
    #[error("Incomplete matrix: {taxon} is missing a distance to another taxon")]
    IncompleteMatrix { taxon: String },

    #[error("Degenerate matrix: {0}")]
    DegenerateMatrix(String),

    #[error("Invalid distance at row {row}, column {column}: {value}")]
    InvalidDistance {
        row: usize,
        column: usize,
        value: String,
    },

    #[error("Duplicate taxon: {0}")]
    DuplicateTaxon(String),

    #[error("Unknown taxon: {0}")]
    UnknownTaxon(String),

    /// Taxon names may not use the characters merged cluster names are built from
    #[error("Invalid taxon name '{0}': names may not contain '(', ')' or ','")]
    InvalidTaxonName(String),

    #[error("Arithmetic overflow: {0}")]
    ArithmeticOverflow(String),
}

/// Result type alias for Arbor operations
pub type ArborResult<T> = Result<T, ArborError>;

impl ArborError {
    /// True for errors caused by the caller's input rather than the environment
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ArborError::InvalidAlphabet { .. }
                | ArborError::LengthMismatch { .. }
                | ArborError::InsufficientInput { .. }
                | ArborError::IncompleteMatrix { .. }
                | ArborError::DegenerateMatrix(_)
                | ArborError::InvalidDistance { .. }
                | ArborError::DuplicateTaxon(_)
                | ArborError::UnknownTaxon(_)
                | ArborError::InvalidTaxonName(_)
        )
    }
}

impl From<serde_json::Error> for ArborError {
    fn from(err: serde_json::Error) -> Self {
        ArborError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for ArborError {
    fn from(err: anyhow::Error) -> Self {
        ArborError::Parse(err.to_string())
    }
}
