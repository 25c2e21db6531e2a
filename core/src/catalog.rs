//! Display metadata for indexed problems.
//!
//! Never consulted by the ranker: callers join `ScoredResult::doc_id` against
//! it after scoring and apply difficulty/tag filters there.

use crate::corpus::CorpusDoc;
use crate::error::{IndexError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemMeta {
    pub id: String,
    pub title: String,
    pub description: String,
    pub difficulty: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub url: String,
    #[serde(default)]
    pub platform: Option<String>,
}

impl ProblemMeta {
    /// All of `wanted` present in this problem's tags, compared after Unicode lowercasing.
    pub fn has_all_tags<S: AsRef<str>>(&self, wanted: &[S]) -> bool {
        let tags: Vec<String> = self.tags.iter().map(|t| t.to_lowercase()).collect();
        wanted.iter().all(|w| {
            let w = w.as_ref().trim().to_lowercase();
            tags.iter().any(|t| *t == w)
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    problems: Vec<ProblemMeta>,
    #[serde(skip)]
    by_id: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(problems: Vec<ProblemMeta>) -> Self {
        let by_id = problems.iter().enumerate().map(|(i, p)| (p.id.clone(), i)).collect();
        Self { problems, by_id }
    }

    /// Join corpus files with line-aligned title and url lists.
    ///
    /// A file's numeric stem selects its line in `names` and `urls`; files whose
    /// stem is not numeric or has no matching line are skipped.
    pub fn build<S: AsRef<str>>(docs: &[CorpusDoc], names: &[S], urls: &[S], platform: Option<&str>) -> Self {
        let mut problems = Vec::with_capacity(docs.len());
        for doc in docs {
            let Ok(line) = doc.doc_id.parse::<usize>() else {
                tracing::warn!(doc_id = %doc.doc_id, "skipping document with non-numeric id");
                continue;
            };
            let (Some(title), Some(url)) = (names.get(line), urls.get(line)) else {
                tracing::warn!(doc_id = %doc.doc_id, "no title or url for document");
                continue;
            };
            problems.push(ProblemMeta {
                id: doc.doc_id.clone(),
                title: title.as_ref().to_string(),
                description: doc.problem.description.clone(),
                difficulty: doc.problem.difficulty.clone(),
                tags: doc.problem.tags.clone(),
                url: url.as_ref().to_string(),
                platform: platform.map(str::to_string),
            });
        }
        Self::new(problems)
    }

    pub fn get(&self, id: &str) -> Option<&ProblemMeta> {
        self.by_id.get(id).map(|&i| &self.problems[i])
    }

    pub fn problems(&self) -> &[ProblemMeta] { &self.problems }

    pub fn len(&self) -> usize { self.problems.len() }

    pub fn is_empty(&self) -> bool { self.problems.is_empty() }
}

/// Read a list file, one trimmed entry per non-blank line.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|e| IndexError::io(path, e))?;
    Ok(content.lines().map(str::trim).filter(|l| !l.is_empty()).map(str::to_string).collect())
}

pub fn save_catalog(path: &Path, catalog: &Catalog) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| IndexError::io(parent, e))?;
    }
    let json = serde_json::to_vec_pretty(catalog).map_err(|e| IndexError::malformed(path, e))?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(|e| IndexError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| IndexError::io(path, e))?;
    Ok(())
}

pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let buf = fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => IndexError::Missing(path.to_path_buf()),
        _ => IndexError::io(path, e),
    })?;
    let raw: Catalog = serde_json::from_slice(&buf).map_err(|e| IndexError::malformed(path, e))?;
    Ok(Catalog::new(raw.problems))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::ProblemFile;
    use std::path::PathBuf;

    fn doc(id: &str, content: &str) -> CorpusDoc {
        CorpusDoc { doc_id: id.into(), path: PathBuf::from(format!("{id}.txt")), problem: ProblemFile::parse(content) }
    }

    #[test]
    fn build_joins_by_numeric_stem() {
        let docs = vec![doc("1", "Hard\nGraph\nfind it"), doc("0", "Easy\nArray,Hash Table\ntwo sum"), doc("x", "Easy\n\n"), doc("7", "Easy\n\n")];
        let cat = Catalog::build(&docs, &["Two Sum", "Clone Graph"], &["u0", "u1"], Some("LeetCode"));
        assert_eq!(cat.len(), 2);
        let p = cat.get("0").unwrap();
        assert_eq!(p.title, "Two Sum");
        assert_eq!(p.url, "u0");
        assert_eq!(p.description, "two sum");
        assert_eq!(cat.get("1").unwrap().difficulty, "Hard");
        assert!(cat.get("7").is_none());
    }

    #[test]
    fn tag_filter_requires_every_tag() {
        let p = ProblemMeta {
            id: "0".into(),
            title: "t".into(),
            description: String::new(),
            difficulty: "Easy".into(),
            tags: vec!["Array".into(), "Hash Table".into()],
            url: "u".into(),
            platform: None,
        };
        assert!(p.has_all_tags(&["array", " hash table"]));
        assert!(!p.has_all_tags(&["array", "graph"]));
        assert!(p.has_all_tags::<&str>(&[]));

        let accented = ProblemMeta { tags: vec!["Énumération".into()], ..p };
        assert!(accented.has_all_tags(&["énumération"]));
        assert!(accented.has_all_tags(&["ÉNUMÉRATION"]));
    }

    #[test]
    fn save_then_load_rebuilds_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        let cat = Catalog::build(&[doc("0", "Easy\nArray\nx")], &["A"], &["u"], None);
        save_catalog(&path, &cat).unwrap();
        let back = load_catalog(&path).unwrap();
        assert_eq!(back.get("0").unwrap().title, "A");
        assert!(load_catalog(&dir.path().join("none.json")).unwrap_err().is_missing());
    }
}
