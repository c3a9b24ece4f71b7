#![forbid(unsafe_code)]

use anyhow::Context;
use clap::Parser;
use drug_mentions::mention::FinderConfig;
use drug_mentions::pipeline::{DEFAULT_OUTPUT, InputPaths, Inputs, PipelineConfig, run};
use std::env;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Build a graph of drug mentions in PubMed and clinical-trial titles",
    long_about = None
)]
struct Cli {
    /// Drug vocabulary CSV with a `drug` column.
    #[arg(long = "drugs", value_name = "PATH")]
    drugs: PathBuf,

    /// PubMed articles as CSV.
    #[arg(long = "pubmed_csv", value_name = "PATH")]
    pubmed_csv: PathBuf,

    /// PubMed articles as a JSON array.
    #[arg(long = "pubmed_json", value_name = "PATH")]
    pubmed_json: PathBuf,

    /// Clinical trials CSV with a `scientific_title` column.
    #[arg(long = "clinical_trials", value_name = "PATH")]
    clinical_trials: PathBuf,

    /// Where to write the graph.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Scan titles on all cores.
    #[arg(long)]
    parallel: bool,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn input_paths(&self) -> InputPaths {
        InputPaths {
            drugs: self.drugs.clone(),
            pubmed_csv: self.pubmed_csv.clone(),
            pubmed_json: self.pubmed_json.clone(),
            clinical_trials: self.clinical_trials.clone(),
        }
    }

    fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            finder: FinderConfig {
                run_in_parallel: self.parallel,
            },
            ..PipelineConfig::default()
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("DRUG_MENTIONS_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "drug_mentions=debug,info"
        } else {
            "drug_mentions=info,warn"
        })
    });

    let format = env::var("DRUG_MENTIONS_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.pipeline_config();
    let inputs = Inputs::load(&cli.input_paths(), &config).context("failed to load inputs")?;
    let graph = run(&inputs, &config).context("failed to build drug mention graph")?;

    // Serialize fully before touching the output file.
    let document = graph.to_json_vec()?;
    fs::write(&cli.output, document)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;

    info!(
        output = %cli.output.display(),
        drugs = graph.len(),
        entries = graph.entry_count(),
        "wrote drug mention graph"
    );
    Ok(())
}
