//! Publication records, drug names and the combined corpus.

use compact_str::CompactString;
use nanoid::nanoid;
use serde::{Serialize, Serializer};
use std::fmt;
use tracing::warn;

use crate::date::{PublicationDate, parse_date};
use crate::text::{normalize_drug, normalize_journal, normalize_title};

/// The corpus a publication record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Provenance {
    #[serde(rename = "PubMed")]
    PubMed,
    #[serde(rename = "Clinical Trial")]
    ClinicalTrial,
}

impl Provenance {
    /// Source-concatenation order; earlier sources win duplicate titles.
    pub const ALL: [Provenance; 2] = [Provenance::PubMed, Provenance::ClinicalTrial];

    /// The label written into the graph.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Provenance::PubMed => "PubMed",
            Provenance::ClinicalTrial => "Clinical Trial",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A normalized drug name from the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DrugName(CompactString);

impl DrugName {
    /// Normalizes `raw`; blank names yield `None`.
    #[must_use]
    pub fn new(raw: &str) -> Option<Self> {
        let normalized = normalize_drug(raw);
        if normalized.is_empty() {
            None
        } else {
            Some(Self(CompactString::from(normalized)))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DrugName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DrugName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One publication row as read from an input file, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub id: Option<String>,
    pub title: String,
    pub journal: String,
    pub date: String,
}

/// A normalized publication, the authority for journal and date lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicationRecord {
    pub id: String,
    /// Trimmed, lowercased, NFC title
    pub title: String,
    /// Trimmed, NFC journal, case preserved
    pub journal: String,
    pub date: PublicationDate,
    pub source: Provenance,
}

impl PublicationRecord {
    /// Normalizes a raw row. Rows without an id get a generated one.
    #[must_use]
    pub fn from_raw(raw: RawRecord, source: Provenance) -> Self {
        let id = raw
            .id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| nanoid!());

        let date = parse_date(&raw.date);
        if let PublicationDate::Unparsed(text) = &date {
            warn!(%source, %id, date = %text, "unrecognized date layout, recording as unknown");
        }

        Self {
            id,
            title: normalize_title(&raw.title),
            journal: normalize_journal(&raw.journal),
            date,
            source,
        }
    }
}

/// Both corpora, normalized and kept in source-concatenation order.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pubmed: Vec<PublicationRecord>,
    clinical_trials: Vec<PublicationRecord>,
}

impl Corpus {
    /// Normalizes the raw rows of each source, preserving row order.
    #[must_use]
    pub fn new(pubmed: Vec<RawRecord>, clinical_trials: Vec<RawRecord>) -> Self {
        let normalize = |rows: Vec<RawRecord>, source| {
            rows.into_iter()
                .map(|raw| PublicationRecord::from_raw(raw, source))
                .collect::<Vec<_>>()
        };
        Self {
            pubmed: normalize(pubmed, Provenance::PubMed),
            clinical_trials: normalize(clinical_trials, Provenance::ClinicalTrial),
        }
    }

    /// The records of one source, in original row order.
    #[must_use]
    pub fn by_source(&self, source: Provenance) -> &[PublicationRecord] {
        match source {
            Provenance::PubMed => &self.pubmed,
            Provenance::ClinicalTrial => &self.clinical_trials,
        }
    }

    /// All records, PubMed first.
    pub fn records(&self) -> impl Iterator<Item = &PublicationRecord> {
        Provenance::ALL
            .into_iter()
            .flat_map(|source| self.by_source(source))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pubmed.len() + self.clinical_trials.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
