//! TF-IDF vector-space ranking over a small corpus of problem descriptions.
//!
//! The offline half ([`build_index_dir`]) tokenizes every corpus file, assigns
//! vocabulary positions, weights each document by TF-IDF and persists the
//! result. The online half ([`search`]) reloads that index and ranks documents
//! by cosine similarity to the query.

pub mod catalog;
pub mod corpus;
pub mod error;
pub mod index;
pub mod persist;
pub mod rank;
pub mod tfidf;
pub mod tokenizer;
pub mod vocab;

pub use catalog::{Catalog, ProblemMeta};
pub use error::{IndexError, Result};
pub use index::{DocVector, Index};
pub use persist::{IndexFormat, IndexPaths, MetaFile};
pub use rank::ScoredResult;
pub use vocab::Vocabulary;

use std::path::Path;

/// Number of results returned when the caller does not ask for a count.
pub const DEFAULT_TOP_K: usize = 30;

/// Build an index from the corpus in `corpus_dir` and persist it to `index_dir`.
///
/// Only the description part of each file is indexed. Fails if the corpus is
/// missing, empty or unreadable.
pub fn build_index_dir(corpus_dir: &Path, index_dir: &Path, format: IndexFormat) -> Result<MetaFile> {
    let docs = corpus::read_corpus(corpus_dir)?;
    let index = Index::build(docs.iter().map(|d| (d.doc_id.as_str(), d.problem.description.as_str())))?;
    persist::save_index(&IndexPaths::new(index_dir), &index, format)
}

/// Rank the documents of the index stored at `index_dir` against `query`.
///
/// The index is loaded fresh on every call, so a rebuild is picked up by the
/// next query without any coordination.
pub fn search(index_dir: &Path, query: &str, top_k: usize) -> Result<Vec<ScoredResult>> {
    let index = persist::load_index(&IndexPaths::new(index_dir))?;
    Ok(rank::rank(&index, query, top_k))
}
