use arbor_core::{ArborError, ArborResult};
use serde::{Deserialize, Serialize};

/// Nucleotides accepted for Hamming-distance input
pub const DNA_ALPHABET: &[u8; 4] = b"ACGT";

/// A named nucleotide sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    pub id: String,
    pub description: Option<String>,
    pub sequence: Vec<u8>,
}

impl Sequence {
    pub fn new(id: impl Into<String>, sequence: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            description: None,
            sequence,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Strip whitespace, uppercase, and reject anything outside {A, C, G, T}.
    ///
    /// Positions in the error are 1-based over the cleaned sequence.
    pub fn normalized_dna(&self) -> ArborResult<Vec<u8>> {
        normalize_dna(&self.id, &self.sequence)
    }
}

/// Clean raw sequence bytes into an uppercase DNA string.
pub fn normalize_dna(taxon: &str, raw: &[u8]) -> ArborResult<Vec<u8>> {
    let mut cleaned = Vec::with_capacity(raw.len());

    for &b in raw.iter().filter(|b| !b.is_ascii_whitespace()) {
        let upper = b.to_ascii_uppercase();
        if !DNA_ALPHABET.contains(&upper) {
            return Err(ArborError::InvalidAlphabet {
                taxon: taxon.to_string(),
                character: char::from(b),
                position: cleaned.len() + 1,
            });
        }
        cleaned.push(upper);
    }

    Ok(cleaned)
}
