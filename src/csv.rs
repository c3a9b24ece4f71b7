//! CSV input parsing.
//!
//! [`CsvParser`] maps publication tables onto [`RawRecord`]s using
//! configurable header aliases, so the PubMed `title` column and the clinical
//! trials `scientific_title` column land in the same field. [`DrugListParser`]
//! reads the drug vocabulary.
//!
//! # Example
//!
//! ```
//! use drug_mentions::{CsvParser, RecordParser};
//!
//! let input = "id,scientific_title,date,journal\nNCT01,Aspirin in flu,1 January 2020,Journal C";
//!
//! let records = CsvParser::new().parse(input).unwrap();
//! assert_eq!(records[0].title, "Aspirin in flu");
//! ```

use csv::{ReaderBuilder, StringRecord};
use either::{Either, Left, Right};
use itertools::Itertools;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::{DrugName, MentionError, RawRecord, RecordParser, Result};

/// Default header mappings for publication columns
const DEFAULT_HEADERS: &[(&str, &[&str])] = &[
    ("id", &["id", "record_id"]),
    ("title", &["title", "scientific_title", "article title"]),
    ("journal", &["journal", "journal title"]),
    ("date", &["date", "publication date"]),
];

/// Columns that must be present for a publication table to be usable.
const REQUIRED_FIELDS: [&str; 3] = ["title", "journal", "date"];

/// Configuration for CSV parsing with custom header mappings.
///
/// # Examples
///
/// ```
/// use drug_mentions::csv::CsvConfig;
///
/// let mut config = CsvConfig::new();
/// config.set_header_mapping("title", vec!["Article Name".to_string()]);
/// config.set_delimiter(b';');
/// ```
#[derive(Debug, Clone)]
pub struct CsvConfig {
    /// Custom header mappings for CSV columns
    header_map: HashMap<String, Vec<String>>,
    /// Delimiter to use for parsing the CSV
    delimiter: u8,
    /// Whether rows may have fewer or more fields than the header
    flexible: bool,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvConfig {
    /// Creates a new CSV configuration with default settings
    #[must_use]
    pub fn new() -> Self {
        let mut config = Self {
            header_map: HashMap::new(),
            delimiter: b',',
            flexible: false,
        };
        config.set_default_headers();
        config
    }

    fn set_default_headers(&mut self) {
        for (field, aliases) in DEFAULT_HEADERS {
            self.header_map.insert(
                field.to_string(),
                aliases.iter().map(|s| s.to_string()).collect(),
            );
        }
    }

    /// Sets a custom header mapping, replacing the aliases for `field`
    pub fn set_header_mapping(&mut self, field: &str, aliases: Vec<String>) -> &mut Self {
        self.header_map.insert(field.to_string(), aliases);
        self
    }

    pub fn set_delimiter(&mut self, delimiter: u8) -> &mut Self {
        self.delimiter = delimiter;
        self
    }

    /// Short rows are padded with empty fields, extra fields are ignored
    pub fn set_flexible(&mut self, flexible: bool) -> &mut Self {
        self.flexible = flexible;
        self
    }

    /// Index of the first header matching one of the aliases of `field`
    fn column_for_field(&self, headers: &StringRecord, field: &str) -> Option<usize> {
        let aliases = self.header_map.get(field)?;
        headers.iter().position(|header| {
            let header = header.trim();
            aliases.iter().any(|alias| alias.eq_ignore_ascii_case(header))
        })
    }

    fn reader_builder(&self) -> ReaderBuilder {
        let mut builder = ReaderBuilder::new();
        builder
            .delimiter(self.delimiter)
            .flexible(self.flexible)
            .has_headers(true);
        builder
    }
}

/// Column positions resolved from the header row.
#[derive(Debug)]
struct ColumnLayout {
    id: Option<usize>,
    title: usize,
    journal: usize,
    date: usize,
}

impl ColumnLayout {
    fn resolve(config: &CsvConfig, headers: &StringRecord) -> Result<Self> {
        let required = |field: &str| {
            config
                .column_for_field(headers, field)
                .ok_or_else(|| MentionError::MissingColumn {
                    column: field.to_string(),
                })
        };
        let [title, journal, date] = REQUIRED_FIELDS;
        Ok(Self {
            id: config.column_for_field(headers, "id"),
            title: required(title)?,
            journal: required(journal)?,
            date: required(date)?,
        })
    }

    fn extract(&self, record: &StringRecord) -> RawRecord {
        let field = |index: usize| record.get(index).unwrap_or_default().to_string();
        RawRecord {
            id: self.id.and_then(|index| record.get(index)).map(String::from),
            title: field(self.title),
            journal: field(self.journal),
            date: field(self.date),
        }
    }
}

/// Parser for CSV publication tables.
///
/// ```
/// use drug_mentions::csv::{CsvConfig, CsvParser};
///
/// let mut config = CsvConfig::new();
/// config.set_delimiter(b';');
///
/// let parser = CsvParser::new().with_config(config);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CsvParser {
    config: CsvConfig,
}

impl CsvParser {
    /// Creates a new CSV parser with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: CsvConfig::new(),
        }
    }

    /// Creates a new CSV parser with custom configuration
    #[must_use]
    pub fn with_config(mut self, config: CsvConfig) -> Self {
        self.config = config;
        self
    }
}

impl RecordParser for CsvParser {
    fn parse(&self, input: &str) -> Result<Vec<RawRecord>> {
        let mut reader = self.config.reader_builder().from_reader(input.as_bytes());
        let layout = ColumnLayout::resolve(&self.config, reader.headers()?)?;
        debug!(?layout, "resolved csv columns");

        let mut records = Vec::new();
        for result in reader.records() {
            records.push(layout.extract(&result?));
        }
        Ok(records)
    }
}

/// Parser for the drug vocabulary: one name per row in the `drug` column.
///
/// Blank names and repeats of an earlier name are dropped with a warning.
///
/// ```
/// use drug_mentions::DrugListParser;
///
/// let drugs = DrugListParser::new()
///     .parse("atccode,drug\nA04AD,Diphenhydramine\nS03AA,Tetracycline\n")
///     .unwrap();
/// assert_eq!(drugs[0].as_str(), "diphenhydramine");
/// ```
#[derive(Debug, Clone)]
pub struct DrugListParser {
    column: String,
    delimiter: u8,
}

impl Default for DrugListParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DrugListParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            column: "drug".to_string(),
            delimiter: b',',
        }
    }

    #[must_use]
    pub fn with_column(mut self, column: &str) -> Self {
        self.column = column.to_string();
        self
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Parses the vocabulary, keeping the first occurrence of each name.
    ///
    /// # Errors
    ///
    /// Returns `MentionError::MissingColumn` when the drug column is absent,
    /// or a CSV error for malformed rows.
    pub fn parse(&self, input: &str) -> Result<Vec<DrugName>> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .from_reader(input.as_bytes());
        let index = reader
            .headers()?
            .iter()
            .position(|header| header.trim().eq_ignore_ascii_case(&self.column))
            .ok_or_else(|| MentionError::MissingColumn {
                column: self.column.clone(),
            })?;

        let rows = reader
            .records()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let (blank_lines, names): (Vec<u64>, Vec<DrugName>) =
            rows.iter().partition_map(|row| classify_row(row, index));

        if !blank_lines.is_empty() {
            warn!(lines = ?blank_lines, "skipping blank drug names");
        }

        let mut seen = HashSet::with_capacity(names.len());
        let mut drugs = Vec::with_capacity(names.len());
        for name in names {
            if seen.insert(name.clone()) {
                drugs.push(name);
            } else {
                warn!(drug = %name, "skipping repeated drug name");
            }
        }
        Ok(drugs)
    }
}

/// A usable drug name, or the line of a blank one.
fn classify_row(row: &StringRecord, index: usize) -> Either<u64, DrugName> {
    match row.get(index).and_then(DrugName::new) {
        Some(name) => Right(name),
        None => Left(row.position().map_or(0, |pos| pos.line())),
    }
}
