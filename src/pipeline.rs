//! The batch run: load → normalize → match → build.
//!
//! Every stage finishes before the next begins, and any failure aborts the
//! run before a graph exists.
//!
//! ```
//! use drug_mentions::pipeline::{Inputs, PipelineConfig, run};
//!
//! let inputs = Inputs::from_sources(
//!     "drug\naspirin\n",
//!     "id,title,date,journal\n1,Aspirin for headache,01/01/2020,Journal A\n",
//!     "[]",
//!     "id,scientific_title,date,journal\n",
//! )
//! .unwrap();
//!
//! let graph = run(&inputs, &PipelineConfig::default()).unwrap();
//! assert_eq!(graph.get("aspirin").unwrap().journals[0].journal, "Journal A");
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::csv::{CsvConfig, CsvParser, DrugListParser};
use crate::graph::{DrugGraph, build_graph};
use crate::json::JsonParser;
use crate::mention::{FinderConfig, MentionFinder};
use crate::{Corpus, DrugName, MentionError, RawRecord, RecordParser, Result};

/// File name the graph is written to unless told otherwise.
pub const DEFAULT_OUTPUT: &str = "drug_mentions_graph.json";

/// Locations of the four input files.
#[derive(Debug, Clone)]
pub struct InputPaths {
    pub drugs: PathBuf,
    pub pubmed_csv: PathBuf,
    pub pubmed_json: PathBuf,
    pub clinical_trials: PathBuf,
}

/// Options for a run.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Header aliases and dialect for the publication CSV files
    pub csv: CsvConfig,
    pub finder: FinderConfig,
}

/// Everything a run needs, already parsed and normalized.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub drugs: Vec<DrugName>,
    pub corpus: Corpus,
}

impl Inputs {
    /// Parses in-memory documents with the default CSV configuration.
    ///
    /// # Errors
    ///
    /// Returns the first parse error encountered.
    pub fn from_sources(
        drugs_csv: &str,
        pubmed_csv: &str,
        pubmed_json: &str,
        clinical_trials_csv: &str,
    ) -> Result<Self> {
        let csv = CsvParser::new();
        Ok(Self::assemble(
            DrugListParser::new().parse(drugs_csv)?,
            csv.parse(pubmed_csv)?,
            JsonParser::new().parse(pubmed_json)?,
            csv.parse(clinical_trials_csv)?,
        ))
    }

    /// Reads and parses the four input files. Errors carry the offending
    /// path.
    ///
    /// # Errors
    ///
    /// Returns `MentionError::Input` wrapping the IO or parse failure.
    pub fn load(paths: &InputPaths, config: &PipelineConfig) -> Result<Self> {
        let csv = CsvParser::new().with_config(config.csv.clone());

        let drugs = with_file(&paths.drugs, |text| DrugListParser::new().parse(text))?;
        let pubmed_csv = with_file(&paths.pubmed_csv, |text| csv.parse(text))?;
        let pubmed_json = with_file(&paths.pubmed_json, |text| JsonParser::new().parse(text))?;
        let clinical_trials = with_file(&paths.clinical_trials, |text| csv.parse(text))?;

        Ok(Self::assemble(drugs, pubmed_csv, pubmed_json, clinical_trials))
    }

    /// PubMed rows are the CSV rows followed by the JSON rows.
    fn assemble(
        drugs: Vec<DrugName>,
        mut pubmed: Vec<RawRecord>,
        pubmed_json: Vec<RawRecord>,
        clinical_trials: Vec<RawRecord>,
    ) -> Self {
        pubmed.extend(pubmed_json);
        let corpus = Corpus::new(pubmed, clinical_trials);
        info!(
            drugs = drugs.len(),
            publications = corpus.len(),
            "loaded inputs"
        );
        Self { drugs, corpus }
    }
}

fn with_file<T>(path: &Path, parse: impl FnOnce(&str) -> Result<T>) -> Result<T> {
    let text = fs::read_to_string(path).map_err(|e| MentionError::from(e).in_input(path))?;
    parse(&text).map_err(|e| e.in_input(path))
}

/// Finds mentions and builds the graph.
///
/// # Errors
///
/// Returns `MentionError::MissingSourceRecord` if a mention cannot be joined
/// back to a publication.
pub fn run(inputs: &Inputs, config: &PipelineConfig) -> Result<DrugGraph> {
    let finder = MentionFinder::new().with_config(config.finder.clone());
    let mentions = finder.find_in_corpus(&inputs.drugs, &inputs.corpus)?;
    info!(mentions = mentions.len(), "found drug mentions");
    build_graph(&mentions, &inputs.corpus)
}
