use crate::error::{IndexError, Result};
use crate::index::{DocVector, Index};
use crate::vocab::Vocabulary;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

/// Bumped whenever the on-disk layout changes incompatibly.
pub const INDEX_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexFormat {
    /// Pretty-printed JSON, readable by other tools.
    #[default]
    Json,
    Bincode,
}

impl IndexFormat {
    fn extension(self) -> &'static str {
        match self {
            IndexFormat::Json => "json",
            IndexFormat::Bincode => "bin",
        }
    }
}

impl fmt::Display for IndexFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IndexFormat::Json => "json",
            IndexFormat::Bincode => "bincode",
        })
    }
}

impl FromStr for IndexFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(IndexFormat::Json),
            "bincode" | "bin" => Ok(IndexFormat::Bincode),
            other => Err(format!("unknown index format {other:?} (expected json or bincode)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaFile {
    pub version: u32,
    pub format: IndexFormat,
    /// Unique per build; every artifact repeats it.
    pub build_id: String,
    pub num_docs: usize,
    pub vocab_size: usize,
    pub created_at: String,
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn vocabulary(dir: &Path, format: IndexFormat) -> PathBuf { dir.join(format!("vocabulary.{}", format.extension())) }
    fn idf(dir: &Path, format: IndexFormat) -> PathBuf { dir.join(format!("idf.{}", format.extension())) }
    fn docs(dir: &Path, format: IndexFormat) -> PathBuf { dir.join(format!("docs_tf_idf.{}", format.extension())) }
    fn meta(dir: &Path) -> PathBuf { dir.join("meta.json") }

    /// Sibling directory used as `<parent>/.<name>.<tag>-<pid>`.
    fn sibling(&self, tag: &str) -> Result<PathBuf> {
        let name = self.root.file_name().ok_or_else(|| {
            IndexError::io(&self.root, std::io::Error::new(ErrorKind::InvalidInput, "index path has no directory name"))
        })?;
        let parent = self.root.parent().unwrap_or_else(|| Path::new(""));
        Ok(parent.join(format!(".{}.{tag}-{}", name.to_string_lossy(), std::process::id())))
    }
}

/// Wraps every artifact so the loader can tell which build wrote it.
#[derive(Serialize)]
struct StampedRef<'a, T> {
    build_id: &'a str,
    payload: &'a T,
}

#[derive(Deserialize)]
struct Stamped<T> {
    build_id: String,
    payload: T,
}

fn new_build_id() -> String {
    static SEQ: AtomicU64 = AtomicU64::new(0);
    let nanos = time::OffsetDateTime::now_utc().unix_timestamp_nanos();
    format!("{nanos}-{}-{}", std::process::id(), SEQ.fetch_add(1, Ordering::Relaxed))
}

fn write_artifact<T: Serialize>(path: &Path, value: &T, format: IndexFormat) -> Result<()> {
    let bytes = match format {
        IndexFormat::Json => serde_json::to_vec_pretty(value).map_err(|e| IndexError::malformed(path, e))?,
        IndexFormat::Bincode => bincode::serialize(value).map_err(|e| IndexError::malformed(path, e))?,
    };
    let mut f = File::create(path).map_err(|e| IndexError::io(path, e))?;
    f.write_all(&bytes).map_err(|e| IndexError::io(path, e))?;
    f.sync_all().map_err(|e| IndexError::io(path, e))?;
    Ok(())
}

fn read_artifact<T: DeserializeOwned>(path: &Path, format: IndexFormat) -> Result<T> {
    let buf = fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => IndexError::Missing(path.to_path_buf()),
        _ => IndexError::io(path, e),
    })?;
    match format {
        IndexFormat::Json => serde_json::from_slice(&buf).map_err(|e| IndexError::malformed(path, e)),
        IndexFormat::Bincode => bincode::deserialize(&buf).map_err(|e| IndexError::malformed(path, e)),
    }
}

/// Read an enveloped artifact and check it belongs to the build named by the manifest.
fn read_stamped<T: DeserializeOwned>(path: &Path, meta: &MetaFile) -> Result<T> {
    let stamped: Stamped<T> = read_artifact(path, meta.format)?;
    if stamped.build_id != meta.build_id {
        return Err(IndexError::BuildMismatch {
            path: path.to_path_buf(),
            found: stamped.build_id,
            expected: meta.build_id.clone(),
        });
    }
    Ok(stamped.payload)
}

/// Persist `index` under `paths.root`, replacing any previous build.
///
/// All artifacts are written to a staging sibling first and then renamed into
/// place. Each artifact carries the build id recorded in `meta.json`, so a load
/// that straddles a swap fails with [`IndexError::BuildMismatch`] instead of
/// combining two builds. While the swap runs the target briefly does not exist
/// and loads fail with [`IndexError::Missing`]. Both are retryable.
pub fn save_index(paths: &IndexPaths, index: &Index, format: IndexFormat) -> Result<MetaFile> {
    index.validate()?;
    let staging = paths.sibling("staging")?;
    if staging.exists() {
        fs::remove_dir_all(&staging).map_err(|e| IndexError::io(&staging, e))?;
    }
    fs::create_dir_all(&staging).map_err(|e| IndexError::io(&staging, e))?;

    let build_id = new_build_id();
    write_artifact(&IndexPaths::vocabulary(&staging, format), &StampedRef { build_id: &build_id, payload: index.vocabulary() }, format)?;
    write_artifact(&IndexPaths::idf(&staging, format), &StampedRef { build_id: &build_id, payload: &index.idf() }, format)?;
    write_artifact(&IndexPaths::docs(&staging, format), &StampedRef { build_id: &build_id, payload: &index.documents() }, format)?;

    let meta = MetaFile {
        version: INDEX_VERSION,
        format,
        build_id: build_id.clone(),
        num_docs: index.num_docs(),
        vocab_size: index.vocabulary().len(),
        created_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "".into()),
    };
    // meta.json is always JSON; it tells the loader which format the rest uses.
    write_artifact(&IndexPaths::meta(&staging), &meta, IndexFormat::Json)?;

    swap_into_place(&staging, paths)?;
    tracing::info!(root = %paths.root.display(), %format, build_id = %meta.build_id, num_docs = meta.num_docs, vocab_size = meta.vocab_size, "saved index");
    Ok(meta)
}

fn swap_into_place(staging: &Path, paths: &IndexPaths) -> Result<()> {
    let root = &paths.root;
    if !root.exists() {
        return fs::rename(staging, root).map_err(|e| IndexError::io(root, e));
    }
    let backup = paths.sibling("old")?;
    if backup.exists() {
        fs::remove_dir_all(&backup).map_err(|e| IndexError::io(&backup, e))?;
    }
    fs::rename(root, &backup).map_err(|e| IndexError::io(root, e))?;
    if let Err(e) = fs::rename(staging, root) {
        // put the previous build back before reporting
        if let Err(restore) = fs::rename(&backup, root) {
            tracing::error!(
                backup = %backup.display(),
                root = %root.display(),
                error = %restore,
                "failed to restore previous index; it remains at the backup path"
            );
        }
        return Err(IndexError::io(root, e));
    }
    if let Err(e) = fs::remove_dir_all(&backup) {
        tracing::warn!(path = %backup.display(), error = %e, "failed to remove previous index");
    }
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    read_artifact(&IndexPaths::meta(&paths.root), IndexFormat::Json)
}

/// Load and cross-check a persisted index.
///
/// Missing files map to [`IndexError::Missing`], unparsable ones to
/// [`IndexError::Malformed`], artifacts from another build to
/// [`IndexError::BuildMismatch`], and artifacts that disagree on positions or
/// sizes to [`IndexError::Inconsistent`].
pub fn load_index(paths: &IndexPaths) -> Result<Index> {
    if !paths.root.is_dir() {
        return Err(IndexError::Missing(paths.root.clone()));
    }
    let meta = load_meta(paths)?;
    if meta.version != INDEX_VERSION {
        return Err(IndexError::UnsupportedVersion { found: meta.version, expected: INDEX_VERSION });
    }
    let root = &paths.root;
    let positions: HashMap<String, u64> = read_stamped(&IndexPaths::vocabulary(root, meta.format), &meta)?;
    let idf: Vec<f64> = read_stamped(&IndexPaths::idf(root, meta.format), &meta)?;
    let documents: Vec<DocVector> = read_stamped(&IndexPaths::docs(root, meta.format), &meta)?;

    let vocabulary = Vocabulary::from_positions(positions.into_iter().map(|(t, p)| (t, p as usize)))
        .map_err(|reason| IndexError::Inconsistent(format!("vocabulary: {reason}")))?;
    if vocabulary.len() != meta.vocab_size {
        return Err(IndexError::Inconsistent(format!(
            "manifest lists {} terms, vocabulary has {}",
            meta.vocab_size,
            vocabulary.len()
        )));
    }
    if documents.len() != meta.num_docs {
        return Err(IndexError::Inconsistent(format!(
            "manifest lists {} documents, document index has {}",
            meta.num_docs,
            documents.len()
        )));
    }
    if documents.is_empty() || vocabulary.is_empty() {
        return Err(IndexError::Inconsistent("index holds no documents or no terms".into()));
    }
    let index = Index::from_parts(vocabulary, idf, documents)?;
    tracing::debug!(root = %root.display(), build_id = %meta.build_id, num_docs = index.num_docs(), vocab_size = index.vocabulary().len(), "loaded index");
    Ok(index)
}
