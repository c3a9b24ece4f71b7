//! Drug mention graph assembly.
//!
//! [`GraphBuilder`] joins each [`Mention`] back to the publication it came
//! from and groups the results by drug, then by journal:
//!
//! ```json
//! {
//!   "aspirin": {
//!     "journals": {
//!       "Journal A": [
//!         { "date": "2020-01-01", "title": "aspirin for headache", "source": "PubMed" }
//!       ]
//!     }
//!   }
//! }
//! ```
//!
//! ## Title resolution
//!
//! Publications are indexed by normalized title. When several share a title,
//! the first in source-concatenation order wins: PubMed rows before clinical
//! trial rows, each in original row order. The journal and date of a mention
//! always come from that record, even if the mention was found in a later
//! duplicate.
//!
//! ## Ordering
//!
//! Drugs and journals keep the order in which they were first seen; entries
//! keep the order in which mentions were pushed. Identical entries are kept.

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::io::Write;
use tracing::{debug, info};

use crate::date::PublicationDate;
use crate::mention::Mention;
use crate::{Corpus, DrugName, MentionError, Provenance, PublicationRecord, Result};

/// One dated mention of a drug in a journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MentionEntry {
    /// `YYYY-MM-DD`, or `unknown`
    pub date: PublicationDate,
    pub title: String,
    pub source: Provenance,
}

/// All mentions of one drug in one journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalMentions {
    pub journal: String,
    pub entries: Vec<MentionEntry>,
}

/// Every journal mentioning one drug, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrugMentions {
    pub drug: DrugName,
    pub journals: Vec<JournalMentions>,
}

impl DrugMentions {
    #[must_use]
    pub fn journal(&self, name: &str) -> Option<&JournalMentions> {
        self.journals.iter().find(|bucket| bucket.journal == name)
    }
}

/// The finished graph: drug → journal → entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrugGraph {
    drugs: Vec<DrugMentions>,
}

impl DrugGraph {
    /// Drugs with at least one mention, in first-seen order.
    #[must_use]
    pub fn drugs(&self) -> &[DrugMentions] {
        &self.drugs
    }

    #[must_use]
    pub fn get(&self, drug: &str) -> Option<&DrugMentions> {
        self.drugs.iter().find(|node| node.drug.as_str() == drug)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.drugs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.drugs.is_empty()
    }

    /// Total number of entries across all drugs and journals.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.drugs
            .iter()
            .flat_map(|node| &node.journals)
            .map(|bucket| bucket.entries.len())
            .sum()
    }

    /// Writes the graph as pretty-printed JSON (2-space indent, non-ASCII
    /// kept literal).
    ///
    /// # Errors
    ///
    /// Returns `MentionError::Io` if the writer fails.
    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self).map_err(|e| MentionError::Io(e.into()))
    }

    /// The pretty-printed JSON document as bytes.
    ///
    /// # Errors
    ///
    /// See [`write_json`](Self::write_json).
    pub fn to_json_vec(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write_json(&mut buffer)?;
        Ok(buffer)
    }
}

impl Serialize for DrugGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.drugs.iter().map(|node| (&node.drug, JournalsView(node))))
    }
}

/// Serializes a drug node as `{"journals": {...}}`.
struct JournalsView<'a>(&'a DrugMentions);

impl Serialize for JournalsView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut node = serializer.serialize_struct("DrugMentions", 1)?;
        node.serialize_field("journals", &JournalMap(&self.0.journals))?;
        node.end()
    }
}

struct JournalMap<'a>(&'a [JournalMentions]);

impl Serialize for JournalMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for bucket in self.0 {
            map.serialize_entry(&bucket.journal, &bucket.entries)?;
        }
        map.end()
    }
}

/// Publications keyed by normalized title, first record wins.
#[derive(Debug)]
struct SourceIndex<'a> {
    by_title: HashMap<&'a str, &'a PublicationRecord>,
}

impl<'a> SourceIndex<'a> {
    fn new(corpus: &'a Corpus) -> Self {
        let mut by_title = HashMap::with_capacity(corpus.len());
        for record in corpus.records() {
            match by_title.entry(record.title.as_str()) {
                Entry::Vacant(slot) => {
                    slot.insert(record);
                }
                Entry::Occupied(kept) => {
                    let kept: &PublicationRecord = kept.get();
                    debug!(
                        title = %record.title,
                        kept = %kept.id,
                        kept_source = %kept.source,
                        shadowed = %record.id,
                        shadowed_source = %record.source,
                        "duplicate title, keeping first record"
                    );
                }
            }
        }
        Self { by_title }
    }

    fn resolve(&self, mention: &Mention) -> Result<&'a PublicationRecord> {
        self.by_title
            .get(mention.title.as_str())
            .copied()
            .ok_or_else(|| MentionError::MissingSourceRecord {
                drug: mention.drug.to_string(),
                title: mention.title.clone(),
            })
    }
}

/// Accumulates mentions into a [`DrugGraph`].
///
/// The builder owns the graph while it grows; [`finish`](Self::finish)
/// hands out the immutable result.
///
/// # Examples
///
/// ```
/// use drug_mentions::{Corpus, GraphBuilder, RawRecord};
/// use drug_mentions::mention::MentionFinder;
///
/// let corpus = Corpus::new(
///     vec![RawRecord {
///         id: Some("1".to_string()),
///         title: "aspirin for headache".to_string(),
///         journal: "Journal A".to_string(),
///         date: "2020-01-01".to_string(),
///     }],
///     Vec::new(),
/// );
/// let drugs = vec![drug_mentions::DrugName::new("aspirin").unwrap()];
/// let mentions = MentionFinder::new().find_in_corpus(&drugs, &corpus).unwrap();
///
/// let mut builder = GraphBuilder::new(&corpus);
/// for mention in &mentions {
///     builder.push(mention).unwrap();
/// }
/// let graph = builder.finish();
/// assert_eq!(graph.entry_count(), 1);
/// ```
#[derive(Debug)]
pub struct GraphBuilder<'a> {
    index: SourceIndex<'a>,
    drugs: Vec<DrugMentions>,
    drug_slots: HashMap<DrugName, usize>,
    journal_slots: HashMap<(usize, &'a str), usize>,
}

impl<'a> GraphBuilder<'a> {
    /// Indexes the corpus by title.
    #[must_use]
    pub fn new(corpus: &'a Corpus) -> Self {
        Self {
            index: SourceIndex::new(corpus),
            drugs: Vec::new(),
            drug_slots: HashMap::new(),
            journal_slots: HashMap::new(),
        }
    }

    /// Resolves a mention to its publication and appends an entry.
    ///
    /// # Errors
    ///
    /// Returns `MentionError::MissingSourceRecord` when no publication carries
    /// the mention's title. Nothing is appended in that case.
    pub fn push(&mut self, mention: &Mention) -> Result<()> {
        let record = self.index.resolve(mention)?;

        let drug_slot = match self.drug_slots.get(&mention.drug) {
            Some(&slot) => slot,
            None => {
                self.drugs.push(DrugMentions {
                    drug: mention.drug.clone(),
                    journals: Vec::new(),
                });
                let slot = self.drugs.len() - 1;
                self.drug_slots.insert(mention.drug.clone(), slot);
                slot
            }
        };

        let journals = &mut self.drugs[drug_slot].journals;
        let journal_slot = *self
            .journal_slots
            .entry((drug_slot, record.journal.as_str()))
            .or_insert_with(|| {
                journals.push(JournalMentions {
                    journal: record.journal.clone(),
                    entries: Vec::new(),
                });
                journals.len() - 1
            });

        journals[journal_slot].entries.push(MentionEntry {
            date: record.date.clone(),
            title: record.title.clone(),
            source: mention.source,
        });
        Ok(())
    }

    /// Hands out the finished graph.
    #[must_use]
    pub fn finish(self) -> DrugGraph {
        DrugGraph { drugs: self.drugs }
    }
}

/// Builds the graph for `mentions` in one pass.
///
/// # Errors
///
/// Returns `MentionError::MissingSourceRecord` for the first mention whose
/// title is not in `corpus`.
pub fn build_graph(mentions: &[Mention], corpus: &Corpus) -> Result<DrugGraph> {
    let mut builder = GraphBuilder::new(corpus);
    for mention in mentions {
        builder.push(mention)?;
    }
    let graph = builder.finish();
    info!(
        drugs = graph.len(),
        entries = graph.entry_count(),
        "built drug mention graph"
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RawRecord;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn raw(id: &str, title: &str, journal: &str, date: &str) -> RawRecord {
        RawRecord {
            id: Some(id.to_string()),
            title: title.to_string(),
            journal: journal.to_string(),
            date: date.to_string(),
        }
    }

    fn mention(drug: &str, title: &str, source: Provenance) -> Mention {
        Mention {
            drug: DrugName::new(drug).unwrap(),
            title: title.to_string(),
            source,
        }
    }

    fn end_to_end_corpus() -> Corpus {
        Corpus::new(
            vec![
                raw("1", "aspirin for headache", "Journal A", "2020-01-01"),
                raw("2", "ibuprofen benefits", "Journal B", "2020-01-02"),
            ],
            vec![raw("1", "paracetamol in flu treatment", "Journal C", "2020-01-03")],
        )
    }

    #[test]
    fn test_three_drugs_one_journal_each() {
        let corpus = end_to_end_corpus();
        let mentions = vec![
            mention("aspirin", "aspirin for headache", Provenance::PubMed),
            mention("ibuprofen", "ibuprofen benefits", Provenance::PubMed),
            mention("paracetamol", "paracetamol in flu treatment", Provenance::ClinicalTrial),
        ];

        let graph = build_graph(&mentions, &corpus).unwrap();
        assert_eq!(
            serde_json::to_value(&graph).unwrap(),
            json!({
                "aspirin": {"journals": {"Journal A": [
                    {"date": "2020-01-01", "title": "aspirin for headache", "source": "PubMed"}
                ]}},
                "ibuprofen": {"journals": {"Journal B": [
                    {"date": "2020-01-02", "title": "ibuprofen benefits", "source": "PubMed"}
                ]}},
                "paracetamol": {"journals": {"Journal C": [
                    {"date": "2020-01-03", "title": "paracetamol in flu treatment", "source": "Clinical Trial"}
                ]}}
            })
        );
    }

    #[test]
    fn test_duplicate_title_resolves_to_pubmed() {
        let corpus = Corpus::new(
            vec![raw("7", "Shared Title with Aspirin", "PubMed Journal", "01/02/2020")],
            vec![raw("NCT7", "shared title with aspirin", "Trial Journal", "2021-06-30")],
        );
        let mentions = vec![
            mention("aspirin", "shared title with aspirin", Provenance::PubMed),
            mention("aspirin", "shared title with aspirin", Provenance::ClinicalTrial),
        ];

        let graph = build_graph(&mentions, &corpus).unwrap();
        let node = graph.get("aspirin").unwrap();
        assert_eq!(node.journals.len(), 1);
        let bucket = node.journal("PubMed Journal").unwrap();
        let dates: Vec<_> = bucket.entries.iter().map(|e| e.date.to_string()).collect();
        let sources: Vec<_> = bucket.entries.iter().map(|e| e.source).collect();
        assert_eq!(dates, vec!["2020-02-01", "2020-02-01"]);
        assert_eq!(sources, vec![Provenance::PubMed, Provenance::ClinicalTrial]);
    }

    #[test]
    fn test_multi_drug_title_yields_entry_per_drug() {
        let corpus = Corpus::new(
            vec![raw("1", "aspirin and ibuprofen combo", "Journal A", "2020-01-01")],
            Vec::new(),
        );
        let mentions = vec![
            mention("aspirin", "aspirin and ibuprofen combo", Provenance::PubMed),
            mention("ibuprofen", "aspirin and ibuprofen combo", Provenance::PubMed),
        ];

        let graph = build_graph(&mentions, &corpus).unwrap();
        assert_eq!(graph.len(), 2);
        let aspirin = &graph.get("aspirin").unwrap().journals[0].entries[0];
        let ibuprofen = &graph.get("ibuprofen").unwrap().journals[0].entries[0];
        assert_eq!(aspirin, ibuprofen);
    }

    #[test]
    fn test_missing_source_record_is_fatal() {
        let corpus = end_to_end_corpus();
        let mentions = vec![
            mention("aspirin", "aspirin for headache", Provenance::PubMed),
            mention("codeine", "codeine and nothing else", Provenance::PubMed),
        ];

        let result = build_graph(&mentions, &corpus);
        match result {
            Err(MentionError::MissingSourceRecord { drug, title }) => {
                assert_eq!(drug, "codeine");
                assert_eq!(title, "codeine and nothing else");
            }
            other => panic!("expected MissingSourceRecord, got {other:?}"),
        }
    }

    #[test]
    fn test_unparsed_date_is_unknown() {
        let corpus = Corpus::new(
            vec![raw("1", "aspirin trial", "Journal A", "1 Jan 2020")],
            Vec::new(),
        );
        let mentions = vec![mention("aspirin", "aspirin trial", Provenance::PubMed)];

        let graph = build_graph(&mentions, &corpus).unwrap();
        let value = serde_json::to_value(&graph).unwrap();
        assert_eq!(value["aspirin"]["journals"]["Journal A"][0]["date"], "unknown");
    }

    #[test]
    fn test_first_seen_order_and_no_dedup() {
        let corpus = Corpus::new(
            vec![
                raw("1", "zinc study", "Zeta Journal", "2020-01-01"),
                raw("2", "zinc again", "Alpha Journal", "2020-01-02"),
                raw("3", "atropine note", "Alpha Journal", "2020-01-03"),
            ],
            Vec::new(),
        );
        let mentions = vec![
            mention("zinc", "zinc study", Provenance::PubMed),
            mention("zinc", "zinc again", Provenance::PubMed),
            mention("atropine", "atropine note", Provenance::PubMed),
            mention("zinc", "zinc study", Provenance::PubMed),
        ];

        let graph = build_graph(&mentions, &corpus).unwrap();
        let drugs: Vec<_> = graph.drugs().iter().map(|n| n.drug.as_str()).collect();
        assert_eq!(drugs, vec!["zinc", "atropine"]);

        let zinc = graph.get("zinc").unwrap();
        let journals: Vec<_> = zinc.journals.iter().map(|j| j.journal.as_str()).collect();
        assert_eq!(journals, vec!["Zeta Journal", "Alpha Journal"]);
        assert_eq!(zinc.journal("Zeta Journal").unwrap().entries.len(), 2);
        assert_eq!(graph.entry_count(), 4);

        let text = String::from_utf8(graph.to_json_vec().unwrap()).unwrap();
        assert!(text.find("\"zinc\"").unwrap() < text.find("\"atropine\"").unwrap());
        assert!(text.find("Zeta Journal").unwrap() < text.find("Alpha Journal").unwrap());
    }

    #[test]
    fn test_json_layout() {
        let corpus = Corpus::new(
            vec![raw("1", "caféine et aspirine", "Revue Médicale", "2020-01-01")],
            Vec::new(),
        );
        let mentions = vec![mention("aspirine", "caféine et aspirine", Provenance::PubMed)];

        let graph = build_graph(&mentions, &corpus).unwrap();
        let text = String::from_utf8(graph.to_json_vec().unwrap()).unwrap();
        assert_eq!(
            text,
            r#"{
  "aspirine": {
    "journals": {
      "Revue Médicale": [
        {
          "date": "2020-01-01",
          "title": "caféine et aspirine",
          "source": "PubMed"
        }
      ]
    }
  }
}"#
        );
    }
}
