//! Detects drug mentions in publication titles and groups them into a graph.
//!
//! `drug_mentions` reads a vocabulary of drug names together with PubMed
//! articles and clinical-trial records, finds whole-word mentions of each drug
//! in the publication titles, and assembles a graph keyed by drug, then by
//! journal, listing every dated mention with its provenance.
//!
//! # Key Features
//!
//! - **Input parsing**: CSV with configurable header aliases, JSON arrays of
//!   records, and a drug vocabulary CSV.
//! - **Normalization**: titles and drug names are trimmed, lowercased and
//!   NFC-composed; dates in three known layouts become calendar dates.
//! - **Whole-word matching**: "aspirin" never matches "aspirinic acid".
//! - **Deterministic graphs**: first-seen ordering throughout, and duplicate
//!   titles always resolve to the PubMed record first.
//!
//! # Basic Usage
//!
//! ```rust
//! use drug_mentions::{Corpus, DrugListParser, RecordParser, build_graph};
//! use drug_mentions::csv::CsvParser;
//! use drug_mentions::mention::MentionFinder;
//!
//! let drugs = DrugListParser::new().parse("drug\nAspirin\n").unwrap();
//! let pubmed = CsvParser::new()
//!     .parse("id,title,journal,date\n1,Aspirin for headache,Journal A,01/01/2020\n")
//!     .unwrap();
//! let corpus = Corpus::new(pubmed, Vec::new());
//!
//! let mentions = MentionFinder::new().find_in_corpus(&drugs, &corpus).unwrap();
//! let graph = build_graph(&mentions, &corpus).unwrap();
//! assert_eq!(graph.len(), 1);
//! ```
//!
//! # Error Handling
//!
//! Every fallible operation returns the crate [`Result`], wrapping
//! [`MentionError`]. Unparseable dates are not errors: they surface as
//! [`PublicationDate::Unparsed`] and render as `"unknown"`.
//!
//! ```rust
//! use drug_mentions::{MentionError, RecordParser};
//! use drug_mentions::csv::CsvParser;
//!
//! match CsvParser::new().parse("id,title\n1,no journal column\n") {
//!     Err(MentionError::MissingColumn { column }) => assert_eq!(column, "journal"),
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

extern crate csv as csv_crate;

pub mod csv;
pub mod date;
pub mod graph;
pub mod json;
pub mod mention;
pub mod pipeline;
pub mod record;
mod regex;
pub mod text;

// Reexports
pub use csv::{CsvConfig, CsvParser, DrugListParser};
pub use date::{PublicationDate, parse_date};
pub use graph::{DrugGraph, GraphBuilder, MentionEntry, build_graph};
pub use json::JsonParser;
pub use mention::{Mention, MentionFinder};
pub use record::{Corpus, DrugName, Provenance, PublicationRecord, RawRecord};

/// A specialized Result type for drug mention operations.
pub type Result<T> = std::result::Result<T, MentionError>;

/// Represents errors that abort a run.
#[derive(Error, Debug)]
pub enum MentionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    InvalidFormat(String),

    #[error("Missing required column: {column}")]
    MissingColumn { column: String },

    #[error("Malformed input: {message} at line {line}")]
    MalformedInput { message: String, line: usize },

    #[error("No source record for drug {drug:?} with title {title:?}")]
    MissingSourceRecord { drug: String, title: String },

    #[error("Failed to load {}: {source}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: Box<MentionError>,
    },
}

impl MentionError {
    /// Attach the path of the input file that produced this error.
    pub fn in_input(self, path: impl Into<PathBuf>) -> Self {
        MentionError::Input {
            path: path.into(),
            source: Box::new(self),
        }
    }
}

impl From<csv_crate::Error> for MentionError {
    fn from(err: csv_crate::Error) -> Self {
        match err.position() {
            Some(pos) => MentionError::MalformedInput {
                message: err.to_string(),
                line: pos.line() as usize,
            },
            None => MentionError::InvalidFormat(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for MentionError {
    fn from(err: serde_json::Error) -> Self {
        MentionError::MalformedInput {
            message: err.to_string(),
            line: err.line(),
        }
    }
}

/// Trait for parsers that turn one input document into publication rows.
pub trait RecordParser {
    /// Parse a string containing zero or more publication records.
    ///
    /// # Errors
    ///
    /// Returns `MentionError` if a required column is absent or the input
    /// is not well formed.
    fn parse(&self, input: &str) -> Result<Vec<RawRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mention_error_display() {
        let error = MentionError::MissingSourceRecord {
            drug: "aspirin".to_string(),
            title: "aspirin for headache".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "No source record for drug \"aspirin\" with title \"aspirin for headache\""
        );
    }

    #[test]
    fn test_input_error_wraps_path() {
        let error = MentionError::MissingColumn {
            column: "drug".to_string(),
        }
        .in_input("data/drugs.csv");
        assert_eq!(
            error.to_string(),
            "Failed to load data/drugs.csv: Missing required column: drug"
        );
    }
}
