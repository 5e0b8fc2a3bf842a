//! Augmented diff generator.
//!
//! Usage:
//!   adiff import --store map.db extract.osm
//!   adiff augment --store map.db changes.osc --output changes.adiff
//!   adiff merge 1.adiff 2.adiff metadata.xml --output merged.adiff
//!
//! Logs go to stderr. Documents go to stdout unless `--output` is given,
//! and nothing is written if the run fails.

use adiff_core::{augment_changes, merge_documents, AugmentConfig};
use adiff_osc::{parse_change_list, parse_osm};
use adiff_store::ElementStore;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// File name that marks changeset metadata among merge inputs.
const METADATA_FILE_NAME: &str = "metadata.xml";

#[derive(Parser, Debug)]
#[command(name = "adiff")]
#[command(about = "Augmented diffs from osmChange files and a map snapshot")]
struct Args {
    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build an augmented diff for a change list
    Augment {
        /// Element store holding the map as of the start of the batch
        #[arg(short, long)]
        store: PathBuf,

        /// osmChange file to augment
        changes: PathBuf,

        /// Write the document here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// TOML file with output settings
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Pretty-print the document
        #[arg(long)]
        indent: bool,
    },

    /// Concatenate augmented diffs, embedding changeset metadata
    Merge {
        /// Augmented diffs, plus an optional metadata.xml
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Write the document here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Load an OSM extract into an element store
    Import {
        /// Element store to create or update
        #[arg(short, long)]
        store: PathBuf,

        /// OSM XML extract
        extract: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    match args.command {
        Command::Augment {
            store,
            changes,
            output,
            config,
            indent,
        } => run_augment(&store, &changes, output.as_deref(), config.as_deref(), indent),
        Command::Merge { inputs, output } => run_merge(&inputs, output.as_deref()),
        Command::Import { store, extract } => run_import(&store, &extract),
    }
}

fn run_augment(
    store_path: &Path,
    changes_path: &Path,
    output: Option<&Path>,
    config_path: Option<&Path>,
    indent: bool,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => AugmentConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => AugmentConfig::default(),
    };
    if indent {
        config.indent = true;
    }

    let store = ElementStore::open_read_only(store_path)
        .with_context(|| format!("failed to open store {}", store_path.display()))?;
    let text = fs::read_to_string(changes_path)
        .with_context(|| format!("failed to read {}", changes_path.display()))?;
    let records = parse_change_list(&text)
        .with_context(|| format!("failed to parse {}", changes_path.display()))?;
    info!("Read {} change records from {}", records.len(), changes_path.display());

    let snapshot = store.snapshot().context("failed to begin read transaction")?;
    let diff = augment_changes(records, &snapshot).context("augmentation failed")?;
    drop(snapshot);

    if !diff.diagnostics.is_empty() {
        warn!("{} diagnostics recorded", diff.diagnostics.len());
    }
    info!(
        "{} actions, {} propagated",
        diff.len(),
        diff.propagated().count()
    );

    let document = diff.to_xml(&config).context("failed to serialize diff")?;
    emit(&document, output)
}

fn run_merge(inputs: &[PathBuf], output: Option<&Path>) -> Result<()> {
    let mut metadata = None;
    let mut documents = Vec::new();
    for path in inputs {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        if path.file_name().is_some_and(|name| name == METADATA_FILE_NAME) {
            if metadata.is_some() {
                bail!("more than one {} given", METADATA_FILE_NAME);
            }
            metadata = Some(text);
        } else {
            documents.push(text);
        }
    }

    let documents: Vec<&str> = documents.iter().map(String::as_str).collect();
    let mut buffer = Vec::new();
    let actions = merge_documents(&documents, metadata.as_deref(), &mut buffer)
        .context("merge failed")?;
    info!("Merged {} actions from {} documents", actions, documents.len());
    emit(&buffer, output)
}

fn run_import(store_path: &Path, extract_path: &Path) -> Result<()> {
    let text = fs::read_to_string(extract_path)
        .with_context(|| format!("failed to read {}", extract_path.display()))?;
    let data = parse_osm(&text)
        .with_context(|| format!("failed to parse {}", extract_path.display()))?;
    let store = ElementStore::open(store_path)
        .with_context(|| format!("failed to open store {}", store_path.display()))?;
    let stats = store
        .import(&data.nodes, &data.ways, &data.relations)
        .context("import failed")?;
    info!(
        "Imported {} nodes, {} ways, {} relations into {}",
        stats.nodes,
        stats.ways,
        stats.relations,
        store_path.display()
    );
    Ok(())
}

/// Writes a finished document to the output file or stdout.
fn emit(document: &[u8], output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => fs::write(path, document)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(document).context("failed to write to stdout")?;
            stdout.flush().context("failed to write to stdout")?;
        }
    }
    Ok(())
}
