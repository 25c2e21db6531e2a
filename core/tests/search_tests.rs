use search_core::persist::{load_index, save_index};
use search_core::{build_index_dir, search, Index, IndexError, IndexFormat, IndexPaths, DEFAULT_TOP_K};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write_corpus(dir: &Path, docs: &[(&str, &str)]) {
    fs::create_dir_all(dir).unwrap();
    for (name, body) in docs {
        fs::write(dir.join(name), body).unwrap();
    }
}

fn three_docs(dir: &Path) {
    write_corpus(
        dir,
        &[
            ("0.txt", "Easy\nTree\nbinary search tree traversal"),
            ("1.txt", "Medium\nDynamic Programming\ndynamic programming array"),
            ("2.txt", "Medium\nTree,DFS\nbinary tree depth first search"),
        ],
    );
}

#[test]
fn end_to_end_ranks_tree_problems_first() {
    let tmp = tempdir().unwrap();
    let corpus = tmp.path().join("data");
    let index_dir = tmp.path().join("index");
    three_docs(&corpus);

    let meta = build_index_dir(&corpus, &index_dir, IndexFormat::Json).unwrap();
    assert_eq!(meta.num_docs, 3);

    let results = search(&index_dir, "binary search tree", DEFAULT_TOP_K).unwrap();
    assert_eq!(results.len(), 3);
    let score = |id: &str| results.iter().find(|r| r.doc_id == id).unwrap().score;
    assert!(score("0") > score("1"));
    assert!(score("2") > score("1"));
    assert_eq!(results[2].doc_id, "1");
    assert!(results.iter().all(|r| (0.0..=1.0).contains(&r.score)));
}

#[test]
fn header_lines_are_not_indexed() {
    let tmp = tempdir().unwrap();
    let corpus = tmp.path().join("data");
    let index_dir = tmp.path().join("index");
    three_docs(&corpus);
    build_index_dir(&corpus, &index_dir, IndexFormat::Bincode).unwrap();

    let index = load_index(&IndexPaths::new(&index_dir)).unwrap();
    assert!(index.vocabulary().position("medium").is_none());
    assert!(index.vocabulary().position("dfs").is_none());
    assert_eq!(index.vocabulary().position("binary"), Some(0));
}

#[test]
fn same_query_twice_is_bit_identical() {
    let tmp = tempdir().unwrap();
    let corpus = tmp.path().join("data");
    let index_dir = tmp.path().join("index");
    three_docs(&corpus);
    build_index_dir(&corpus, &index_dir, IndexFormat::Json).unwrap();

    let a = search(&index_dir, "tree search depth", 30).unwrap();
    let b = search(&index_dir, "tree search depth", 30).unwrap();
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(&b) {
        assert_eq!(x.doc_id, y.doc_id);
        assert_eq!(x.score.to_bits(), y.score.to_bits());
    }
}

#[test]
fn index_built_in_memory_matches_reloaded_scores() {
    let tmp = tempdir().unwrap();
    let index = Index::build([("a", "two sum hash map"), ("b", "three sum two pointers")]).unwrap();
    let paths = IndexPaths::new(tmp.path().join("index"));
    save_index(&paths, &index, IndexFormat::Json).unwrap();

    let direct = search_core::rank::rank(&index, "two sum", 5);
    let reloaded = search(&paths.root, "two sum", 5).unwrap();
    assert_eq!(direct, reloaded);
}

#[test]
fn empty_or_missing_corpus_fails_build() {
    let tmp = tempdir().unwrap();
    let index_dir = tmp.path().join("index");

    let err = build_index_dir(&tmp.path().join("missing"), &index_dir, IndexFormat::Json).unwrap_err();
    assert!(matches!(err, IndexError::CorpusMissing(_)));

    let empty = tmp.path().join("empty");
    fs::create_dir_all(&empty).unwrap();
    let err = build_index_dir(&empty, &index_dir, IndexFormat::Json).unwrap_err();
    assert!(matches!(err, IndexError::CorpusEmpty(_)));
    assert!(!index_dir.exists());
}

#[test]
fn stop_word_only_corpus_fails_build() {
    let tmp = tempdir().unwrap();
    let corpus = tmp.path().join("data");
    let index_dir = tmp.path().join("index");
    write_corpus(&corpus, &[("0.txt", "Easy\nArray\nthe and of"), ("1.txt", "Easy\nArray\n")]);

    let err = build_index_dir(&corpus, &index_dir, IndexFormat::Json).unwrap_err();
    assert!(matches!(err, IndexError::EmptyVocabulary), "{err}");
    assert!(!index_dir.exists());
}

#[test]
fn search_without_index_is_an_error_not_empty_results() {
    let tmp = tempdir().unwrap();
    let err = search(&tmp.path().join("index"), "anything", 10).unwrap_err();
    assert!(err.is_missing());
}
