//! JSON input parsing.
//!
//! The PubMed export is a JSON array of objects carrying `id`, `title`,
//! `journal` and `date`. Ids may be numbers, strings, empty or missing.
//!
//! # Example
//!
//! ```
//! use drug_mentions::{JsonParser, RecordParser};
//!
//! let input = r#"[{"id": 9, "title": "Gold nanoparticles", "date": "01/03/2020", "journal": "Journal of food protection"}]"#;
//!
//! let records = JsonParser::new().parse(input).unwrap();
//! assert_eq!(records[0].id.as_deref(), Some("9"));
//! ```

use serde::Deserialize;

use crate::{RawRecord, RecordParser, Result};

/// An id as it appears in the export. Numbers keep their JSON spelling.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonId {
    Number(serde_json::Number),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct JsonRecord {
    #[serde(default)]
    id: Option<JsonId>,
    title: String,
    journal: String,
    date: String,
}

impl From<JsonRecord> for RawRecord {
    fn from(record: JsonRecord) -> Self {
        RawRecord {
            id: record.id.map(|id| match id {
                JsonId::Number(n) => n.to_string(),
                JsonId::Text(s) => s,
            }),
            title: record.title,
            journal: record.journal,
            date: record.date,
        }
    }
}

/// Parser for JSON arrays of publication records.
#[derive(Debug, Clone, Default)]
pub struct JsonParser {}

impl JsonParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordParser for JsonParser {
    /// # Errors
    ///
    /// Returns `MentionError::MalformedInput` with the failing line when the
    /// document is not an array of records or a field has the wrong shape.
    fn parse(&self, input: &str) -> Result<Vec<RawRecord>> {
        let records: Vec<JsonRecord> = serde_json::from_str(input)?;
        Ok(records.into_iter().map(RawRecord::from).collect())
    }
}
