//! Command-line interface for the descriptor merger.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;

use crate::config::MergeConfig;
use crate::element::Document;
use crate::error::Result;
use crate::grammar::{create_default_grammar, GrammarRegistry};
use crate::merge::merge_documents;
use crate::xml::{parse_document, write_document};

/// Merge Java EE deployment descriptors.
#[derive(Parser)]
#[command(name = "descriptor-merge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Merge overlay descriptors into a base descriptor.
    Merge {
        /// Base descriptor
        base: PathBuf,

        /// Overlay descriptors, applied left to right
        #[arg(required = true)]
        overlays: Vec<PathBuf>,

        /// Strategy configuration (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Document family (default: detected from the root element)
        #[arg(short, long)]
        family: Option<String>,

        /// Merge containers without a strategy element by element
        #[arg(long)]
        descend_containers: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Concatenate the top-level elements of several descriptors.
    Concat {
        /// Descriptors to concatenate; the first one provides the root
        #[arg(required = true)]
        documents: Vec<PathBuf>,

        /// Document family (default: detected from the root element)
        #[arg(short, long)]
        family: Option<String>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the built-in descriptor families.
    Families,
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Merge {
            base,
            overlays,
            config,
            family,
            descend_containers,
            output,
        } => merge_command(
            &base,
            &overlays,
            config.as_deref(),
            family.as_deref(),
            descend_containers,
            output.as_deref(),
        ),
        Commands::Concat {
            documents,
            family,
            output,
        } => concat_command(&documents, family.as_deref(), output.as_deref()),
        Commands::Families => {
            families_command(&create_default_grammar());
            Ok(())
        }
    }
}

fn read_document(path: &Path, grammar: &GrammarRegistry, family: Option<&str>) -> Result<Document> {
    let text = fs::read_to_string(path)?;
    parse_document(&text, grammar, family)
}

/// Write to the output file, or to stdout without one.
fn emit(document: &Document, output: Option<&Path>) -> Result<()> {
    let xml = write_document(document);
    match output {
        Some(path) => {
            fs::write(path, xml)?;
            eprintln!(
                "{} {}",
                style("Saved to:").green().bold(),
                path.display()
            );
        }
        None => print!("{xml}"),
    }
    Ok(())
}

/// Execute the merge command.
fn merge_command(
    base: &Path,
    overlays: &[PathBuf],
    config: Option<&Path>,
    family: Option<&str>,
    descend_containers: bool,
    output: Option<&Path>,
) -> Result<()> {
    let grammar = create_default_grammar();
    let merge_config = match config {
        Some(path) => MergeConfig::load(path)?,
        None => MergeConfig::default(),
    };
    let family = family.or(merge_config.family.as_deref());

    let base_document = read_document(base, &grammar, family)?;
    let family_id = base_document.family().to_string();
    let mut merger = merge_config.build_merger(
        &grammar,
        &family_id,
        config.and_then(Path::parent),
    )?;
    if descend_containers {
        merger.set_container_descent(true);
    }

    eprintln!(
        "{} {} ({}) with {} overlay(s)",
        style("Merging").bold(),
        style(base.display()).cyan(),
        style(&family_id).green(),
        overlays.len()
    );

    let overlay_documents = overlays
        .iter()
        .map(|path| read_document(path, &grammar, Some(&family_id)))
        .collect::<Result<Vec<_>>>()?;

    let merged = merger.merge_into(base_document, &overlay_documents)?;
    emit(&merged, output)
}

/// Execute the concat command.
fn concat_command(documents: &[PathBuf], family: Option<&str>, output: Option<&Path>) -> Result<()> {
    let grammar = create_default_grammar();
    let parsed = documents
        .iter()
        .map(|path| read_document(path, &grammar, family))
        .collect::<Result<Vec<_>>>()?;

    eprintln!(
        "{} {} document(s)",
        style("Concatenating").bold(),
        parsed.len()
    );

    let merged = merge_documents(&parsed)?;
    emit(&merged, output)
}

/// Execute the families command.
fn families_command(grammar: &GrammarRegistry) {
    for family in grammar.families() {
        println!(
            "{} <{}> {} tags",
            style(family.id()).cyan().bold(),
            family.root_name(),
            family.tags().count()
        );
    }
}
