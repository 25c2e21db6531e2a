use crate::index::Index;
use crate::tfidf::{apply_idf, term_frequency};
use crate::tokenizer::tokenize;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    pub doc_id: String,
    pub score: f64,
}

/// Cosine of the angle between `a` and `b`; exactly 0 when either has zero norm.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    // rounding can push parallel vectors a hair past 1
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(0.0, 1.0)
}

/// Project a raw query into the index's TF-IDF space.
pub fn query_vector(index: &Index, query: &str) -> Vec<f64> {
    let tokens = tokenize(query);
    let tf = term_frequency(&tokens, index.vocabulary());
    apply_idf(&tf, index.idf())
}

/// Score every document against `query` and return the best `k`.
///
/// Every document is scored, including zero-overlap ones, so up to `k` results
/// come back even when nothing matches. Equal scores keep corpus order.
pub fn rank(index: &Index, query: &str, k: usize) -> Vec<ScoredResult> {
    let q = query_vector(index, query);
    let mut scored: Vec<ScoredResult> = index
        .documents()
        .iter()
        .map(|d| ScoredResult { doc_id: d.doc_id.clone(), score: cosine_similarity(&q, &d.tfidf) })
        .collect();
    // stable: ties stay in corpus order
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(k);
    tracing::debug!(query, k, returned = scored.len(), "ranked query");
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Index {
        Index::build([
            ("doc0", "binary search tree traversal"),
            ("doc1", "dynamic programming array"),
            ("doc2", "binary tree depth first search"),
        ])
        .unwrap()
    }

    #[test]
    fn cosine_edges() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 2.0], &[2.0, 4.0]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn relevant_docs_outrank_unrelated_one() {
        let res = rank(&corpus(), "binary search tree", 30);
        assert_eq!(res.len(), 3);
        assert_eq!(res[2].doc_id, "doc1");
        assert_eq!(res[2].score, 0.0);
        assert!(res[0].score > res[2].score && res[1].score > res[2].score);
        assert!(res.iter().any(|r| r.doc_id == "doc0") && res.iter().any(|r| r.doc_id == "doc2"));
    }

    #[test]
    fn zero_overlap_still_returns_k_zero_scores_in_corpus_order() {
        let res = rank(&corpus(), "graph coloring", 2);
        let ids: Vec<&str> = res.iter().map(|r| r.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["doc0", "doc1"]);
        assert!(res.iter().all(|r| r.score == 0.0));
    }

    #[test]
    fn k_bounds() {
        assert!(rank(&corpus(), "binary", 0).is_empty());
        assert_eq!(rank(&corpus(), "binary", 100).len(), 3);
    }
}
