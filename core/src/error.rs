use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexError>;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("corpus directory not found: {0}")]
    CorpusMissing(PathBuf),

    #[error("corpus directory contains no .txt documents: {0}")]
    CorpusEmpty(PathBuf),

    #[error("cannot build an index from zero documents")]
    NoDocuments,

    #[error("corpus produced an empty vocabulary: every description is empty or stop words")]
    EmptyVocabulary,

    /// An artifact was written by a different build than the manifest; a rebuild swapped
    /// the index in the middle of a load.
    #[error("index artifact {path} is from build {found}, manifest names build {expected}")]
    BuildMismatch { path: PathBuf, found: String, expected: String },

    /// A persisted artifact (or the whole index directory) does not exist.
    #[error("index artifact missing: {0}")]
    Missing(PathBuf),

    #[error("malformed index artifact {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    /// The artifacts parse but disagree with each other.
    #[error("inconsistent index: {0}")]
    Inconsistent(String),

    #[error("unsupported index version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IndexError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IndexError::Io { path: path.into(), source }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        IndexError::Malformed { path: path.into(), reason: reason.to_string() }
    }

    /// True when the failure means "no index here (yet)" rather than a damaged one.
    pub fn is_missing(&self) -> bool {
        matches!(self, IndexError::Missing(_))
    }

    /// True when a concurrent rebuild can explain the failure and reading again may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, IndexError::Missing(_) | IndexError::BuildMismatch { .. })
    }
}
