use crate::sequence::Sequence;
use arbor_core::{ArborError, ArborResult};
use nom::{
    bytes::complete::{tag, take_till},
    character::complete::{line_ending, not_line_ending, space1},
    combinator::opt,
    sequence::preceded,
    IResult,
};
use std::path::Path;
use tracing::debug;

/// Parse a FASTA header line
fn parse_header(input: &str) -> IResult<&str, (&str, Option<&str>)> {
    let (input, _) = tag(">")(input)?;
    let (input, id) = take_till(|c: char| c.is_whitespace())(input)?;
    let (input, description) = opt(preceded(space1, not_line_ending))(input)?;
    let (input, _) = opt(line_ending)(input)?;
    Ok((input, (id, description)))
}

/// Parse sequence lines until next header or EOF
fn parse_sequence(input: &str) -> IResult<&str, Vec<u8>> {
    let mut sequence = Vec::new();
    let mut remaining = input;

    while !remaining.is_empty() && !remaining.starts_with('>') {
        let (rest, line) =
            take_till::<_, _, nom::error::Error<_>>(|c: char| c == '\n' || c == '\r')(remaining)?;
        let (rest, _) = opt(line_ending)(rest)?;

        sequence.extend(
            line.bytes()
                .filter(|b| !b.is_ascii_whitespace())
                .map(|b| b.to_ascii_uppercase()),
        );

        // A lone '\r' is neither content nor a line ending
        if rest.len() == remaining.len() {
            remaining = &rest[1..];
        } else {
            remaining = rest;
        }
    }

    Ok((remaining, sequence))
}

/// Parse FASTA text into records, keeping header ids as taxon names
pub fn parse_fasta_str(text: &str) -> ArborResult<Vec<Sequence>> {
    let mut records = Vec::new();
    let mut remaining = text.trim_start();

    while !remaining.is_empty() {
        if !remaining.starts_with('>') {
            let line = remaining.lines().next().unwrap_or_default();
            return Err(ArborError::Parse(format!(
                "expected a FASTA header starting with '>', found '{}'",
                line
            )));
        }

        let (rest, (id, description)) = parse_header(remaining)
            .map_err(|e| ArborError::Parse(format!("invalid FASTA header: {}", e)))?;
        if id.is_empty() {
            return Err(ArborError::Parse(
                "FASTA header is missing an identifier".to_string(),
            ));
        }

        let (rest, sequence) = parse_sequence(rest)
            .map_err(|e| ArborError::Parse(format!("invalid FASTA sequence for {}: {}", id, e)))?;

        let mut record = Sequence::new(id, sequence);
        if let Some(desc) = description.map(str::trim).filter(|d| !d.is_empty()) {
            record = record.with_description(desc);
        }
        records.push(record);

        remaining = rest.trim_start();
    }

    debug!("Parsed {} FASTA records", records.len());
    Ok(records)
}

/// Read a FASTA file from disk
pub fn read_fasta<P: AsRef<Path>>(path: P) -> ArborResult<Vec<Sequence>> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    parse_fasta_str(&contents)
}
