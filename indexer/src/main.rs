use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use search_core::catalog::{read_lines, save_catalog, Catalog};
use search_core::corpus::read_corpus;
use search_core::{build_index_dir, IndexFormat};
use tracing_subscriber::{fmt, EnvFilter};

use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build the TF-IDF index and problem catalog from a corpus directory", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from a directory of problem .txt files
    Build {
        /// Corpus directory
        #[arg(long)]
        input: PathBuf,
        /// Output index directory (replaced atomically)
        #[arg(long, default_value = "./index")]
        output: PathBuf,
        /// Artifact encoding: json or bincode
        #[arg(long, default_value_t = IndexFormat::Json)]
        format: IndexFormat,
    },
    /// Write the display catalog joining corpus files with title and url lists
    Catalog {
        /// Corpus directory
        #[arg(long)]
        input: PathBuf,
        /// File with one problem title per line, line N for N.txt
        #[arg(long)]
        names: PathBuf,
        /// File with one problem url per line, line N for N.txt
        #[arg(long)]
        urls: PathBuf,
        /// Output catalog JSON file
        #[arg(long, default_value = "./catalog.json")]
        output: PathBuf,
        /// Platform label stored on every entry
        #[arg(long, default_value = "LeetCode")]
        platform: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, format } => {
            let meta = build_index_dir(&input, &output, format)
                .with_context(|| format!("building index from {}", input.display()))?;
            tracing::info!(output = %output.display(), num_docs = meta.num_docs, vocab_size = meta.vocab_size, "index build complete");
            println!("Indexing complete. Vocabulary size: {}", meta.vocab_size);
            Ok(())
        }
        Commands::Catalog { input, names, urls, output, platform } => {
            build_catalog(&input, &names, &urls, &output, &platform)
        }
    }
}

fn build_catalog(input: &Path, names: &Path, urls: &Path, output: &Path, platform: &str) -> Result<()> {
    let docs = read_corpus(input).with_context(|| format!("reading corpus {}", input.display()))?;
    let names = read_lines(names)?;
    let urls = read_lines(urls)?;
    let catalog = Catalog::build(&docs, &names, &urls, Some(platform));
    save_catalog(output, &catalog).with_context(|| format!("writing catalog {}", output.display()))?;
    tracing::info!(output = %output.display(), problems = catalog.len(), skipped = docs.len() - catalog.len(), "catalog written");
    Ok(())
}
