//! Whole-word drug mention detection.
//!
//! A drug is mentioned in a title when its normalized name occurs there with a
//! non-word character or a string edge on each side. Titles and names are
//! normalized beforehand, so matching is a plain case-sensitive search.
//!
//! ## Usage
//!
//! ```rust
//! use drug_mentions::{Corpus, DrugName, RawRecord};
//! use drug_mentions::mention::{FinderConfig, MentionFinder};
//!
//! let corpus = Corpus::new(
//!     vec![RawRecord {
//!         id: Some("1".to_string()),
//!         title: "Aspirin and ibuprofen combo".to_string(),
//!         journal: "Journal A".to_string(),
//!         date: "2020-01-01".to_string(),
//!     }],
//!     Vec::new(),
//! );
//! let drugs: Vec<DrugName> = ["ibuprofen", "aspirin", "aspirinic"]
//!     .into_iter()
//!     .filter_map(DrugName::new)
//!     .collect();
//!
//! let finder = MentionFinder::new().with_config(FinderConfig { run_in_parallel: true });
//! let mentions = finder.find_in_corpus(&drugs, &corpus).unwrap();
//! assert_eq!(mentions.len(), 2);
//! assert_eq!(mentions[0].drug.as_str(), "ibuprofen");
//! ```
//!
//! ## Ordering
//!
//! Mentions come out source by source (PubMed, then clinical trials), and
//! within a source drug by drug in vocabulary order, titles in row order. The
//! parallel path collects per-drug results in the same order.

use tracing::{debug, info};

use crate::regex::{Regex, escape};
use crate::{Corpus, DrugName, MentionError, Provenance, PublicationRecord, Result};

/// A whole-word occurrence of a drug in a publication title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    pub drug: DrugName,
    /// Normalized title of the mentioning publication
    pub title: String,
    pub source: Provenance,
}

/// Options for [`MentionFinder`].
#[derive(Debug, Default, Clone)]
pub struct FinderConfig {
    /// Scan drugs on the rayon thread pool. Ignored without the `parallel`
    /// feature.
    pub run_in_parallel: bool,
}

/// A compiled whole-word matcher for one drug name.
#[derive(Debug, Clone)]
pub struct DrugPattern {
    drug: DrugName,
    regex: Regex,
}

impl DrugPattern {
    /// Escapes the drug name and anchors it between non-word characters or
    /// string edges.
    ///
    /// # Errors
    ///
    /// Returns `MentionError::InvalidFormat` if the pattern exceeds the regex
    /// engine's size limits.
    pub fn new(drug: &DrugName) -> Result<Self> {
        let pattern = format!(r"(?:^|\W){}(?:\W|$)", escape(drug.as_str()));
        let regex = Regex::new(&pattern).map_err(|e| {
            MentionError::InvalidFormat(format!("pattern for drug {drug:?}: {e}"))
        })?;
        Ok(Self {
            drug: drug.clone(),
            regex,
        })
    }

    #[must_use]
    pub fn drug(&self) -> &DrugName {
        &self.drug
    }

    /// Whether the drug appears as a whole word in `title`.
    #[must_use]
    pub fn is_match(&self, title: &str) -> bool {
        self.regex.is_match(title)
    }

    fn mentions_in<'a>(
        &'a self,
        records: &'a [PublicationRecord],
    ) -> impl Iterator<Item = Mention> + 'a {
        records
            .iter()
            .filter(|record| self.is_match(&record.title))
            .map(|record| Mention {
                drug: self.drug.clone(),
                title: record.title.clone(),
                source: record.source,
            })
    }
}

/// Scans publication titles for drug names.
#[derive(Debug, Default, Clone)]
pub struct MentionFinder {
    config: FinderConfig,
}

impl MentionFinder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(mut self, config: FinderConfig) -> Self {
        self.config = config;
        self
    }

    /// Finds every (drug, title) pair where the drug occurs as a whole word.
    ///
    /// Output is drug-major: all mentions of the first drug, in record
    /// order, then the second drug, and so on.
    ///
    /// # Errors
    ///
    /// Fails only if a drug pattern cannot be compiled.
    pub fn find(&self, drugs: &[DrugName], records: &[PublicationRecord]) -> Result<Vec<Mention>> {
        let patterns = drugs
            .iter()
            .map(DrugPattern::new)
            .collect::<Result<Vec<_>>>()?;
        Ok(self.scan(&patterns, records))
    }

    /// Runs [`find`](Self::find) over PubMed records, then clinical trials.
    ///
    /// # Errors
    ///
    /// Fails only if a drug pattern cannot be compiled.
    pub fn find_in_corpus(&self, drugs: &[DrugName], corpus: &Corpus) -> Result<Vec<Mention>> {
        let patterns = drugs
            .iter()
            .map(DrugPattern::new)
            .collect::<Result<Vec<_>>>()?;

        let mut mentions = Vec::new();
        for source in Provenance::ALL {
            let found = self.scan(&patterns, corpus.by_source(source));
            info!(%source, mentions = found.len(), "scanned titles");
            mentions.extend(found);
        }
        Ok(mentions)
    }

    fn scan(&self, patterns: &[DrugPattern], records: &[PublicationRecord]) -> Vec<Mention> {
        debug!(
            drugs = patterns.len(),
            titles = records.len(),
            parallel = self.config.run_in_parallel,
            "scanning for mentions"
        );

        #[cfg(feature = "parallel")]
        if self.config.run_in_parallel {
            use rayon::prelude::*;

            let per_drug: Vec<Vec<Mention>> = patterns
                .par_iter()
                .map(|pattern| pattern.mentions_in(records).collect())
                .collect();
            return per_drug.into_iter().flatten().collect();
        }

        patterns
            .iter()
            .flat_map(|pattern| pattern.mentions_in(records))
            .collect()
    }
}
