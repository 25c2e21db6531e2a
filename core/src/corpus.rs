use crate::error::{IndexError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One corpus file split into its header lines and free-text description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemFile {
    pub difficulty: String,
    pub tags: Vec<String>,
    pub description: String,
}

impl ProblemFile {
    /// Line 1 is the difficulty, line 2 the comma-separated tags, the rest the description.
    pub fn parse(content: &str) -> Self {
        let mut lines = content.split('\n');
        let difficulty = lines.next().unwrap_or("").trim().to_string();
        let tags = lines
            .next()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        let description = lines.collect::<Vec<_>>().join("\n");
        Self { difficulty, tags, description }
    }
}

#[derive(Debug, Clone)]
pub struct CorpusDoc {
    /// File stem, e.g. `12` for `12.txt`.
    pub doc_id: String,
    pub path: PathBuf,
    pub problem: ProblemFile,
}

/// List the `.txt` files directly under `dir`, sorted by file name.
pub fn list_corpus_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IndexError::CorpusMissing(dir.to_path_buf()));
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            IndexError::io(path, e.into())
        })?;
        let p = entry.path();
        if entry.file_type().is_file() && p.extension().and_then(|s| s.to_str()) == Some("txt") {
            files.push(p.to_path_buf());
        }
    }
    if files.is_empty() {
        return Err(IndexError::CorpusEmpty(dir.to_path_buf()));
    }
    Ok(files)
}

/// Read and parse every corpus document in a stable, lexicographic file-name order.
pub fn read_corpus(dir: &Path) -> Result<Vec<CorpusDoc>> {
    let files = list_corpus_files(dir)?;
    let mut docs = Vec::with_capacity(files.len());
    for path in files {
        let content = fs::read_to_string(&path).map_err(|e| IndexError::io(&path, e))?;
        let doc_id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        docs.push(CorpusDoc { doc_id, problem: ProblemFile::parse(&content), path });
    }
    tracing::debug!(dir = %dir.display(), num_docs = docs.len(), "read corpus");
    Ok(docs)
}
