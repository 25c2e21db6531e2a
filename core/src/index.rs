use crate::error::{IndexError, Result};
use crate::tfidf::{apply_idf, inverse_document_frequency, term_frequency};
use crate::tokenizer::tokenize;
use crate::vocab::Vocabulary;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocVector {
    pub doc_id: String,
    pub tfidf: Vec<f64>,
}

/// Vocabulary, IDF weights and one TF-IDF vector per document, all keyed to the
/// same term positions. Built once and read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    vocabulary: Vocabulary,
    idf: Vec<f64>,
    documents: Vec<DocVector>,
}

impl Index {
    /// Build from `(doc_id, text)` pairs, taken in the given order.
    ///
    /// Fails on an empty document set, and on documents that tokenize to nothing
    /// at all; an index over no terms cannot rank anything.
    pub fn build<I, S, T>(docs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: AsRef<str>,
    {
        let (ids, tokens): (Vec<String>, Vec<Vec<String>>) =
            docs.into_iter().map(|(id, text)| (id.into(), tokenize(text.as_ref()))).unzip();
        if ids.is_empty() {
            return Err(IndexError::NoDocuments);
        }

        let vocabulary = Vocabulary::build(&tokens);
        if vocabulary.is_empty() {
            return Err(IndexError::EmptyVocabulary);
        }
        let tfs: Vec<Vec<f64>> = tokens.iter().map(|t| term_frequency(t, &vocabulary)).collect();
        let idf = inverse_document_frequency(&tfs, vocabulary.len());
        let documents = ids
            .into_iter()
            .zip(tfs)
            .map(|(doc_id, tf)| DocVector { tfidf: apply_idf(&tf, &idf), doc_id })
            .collect();

        tracing::info!(num_docs = tokens.len(), vocab_size = vocabulary.len(), "built index");
        Ok(Self { vocabulary, idf, documents })
    }

    /// Assemble from already-computed parts, checking that every vector matches the vocabulary.
    pub fn from_parts(vocabulary: Vocabulary, idf: Vec<f64>, documents: Vec<DocVector>) -> Result<Self> {
        let index = Self { vocabulary, idf, documents };
        index.validate()?;
        Ok(index)
    }

    pub fn validate(&self) -> Result<()> {
        let n = self.vocabulary.len();
        if self.idf.len() != n {
            return Err(IndexError::Inconsistent(format!(
                "idf vector has {} entries, vocabulary has {n}",
                self.idf.len()
            )));
        }
        for doc in &self.documents {
            if doc.tfidf.len() != n {
                return Err(IndexError::Inconsistent(format!(
                    "document {:?} vector has {} entries, vocabulary has {n}",
                    doc.doc_id,
                    doc.tfidf.len()
                )));
            }
        }
        let mut weights = self.idf.iter().chain(self.documents.iter().flat_map(|d| &d.tfidf));
        if let Some(w) = weights.find(|w| !w.is_finite()) {
            return Err(IndexError::Inconsistent(format!("non-finite weight {w}")));
        }
        Ok(())
    }

    pub fn vocabulary(&self) -> &Vocabulary { &self.vocabulary }

    pub fn idf(&self) -> &[f64] { &self.idf }

    pub fn documents(&self) -> &[DocVector] { &self.documents }

    pub fn num_docs(&self) -> usize { self.documents.len() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_produces_aligned_vectors() {
        let idx = Index::build([("0", "binary search tree"), ("1", "binary heap")]).unwrap();
        assert_eq!(idx.num_docs(), 2);
        assert_eq!(idx.vocabulary().len(), 4);
        assert_eq!(idx.idf().len(), 4);
        assert!(idx.documents().iter().all(|d| d.tfidf.len() == 4));
        // "heap" is absent from doc 0
        let heap = idx.vocabulary().position("heap").unwrap();
        assert_eq!(idx.documents()[0].tfidf[heap], 0.0);
        assert!(idx.documents()[1].tfidf[heap] > 0.0);
    }

    #[test]
    fn term_shared_by_all_docs_gets_weight_one() {
        let idx = Index::build([("a", "binary"), ("b", "binary")]).unwrap();
        assert!((idx.idf()[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_document_set_fails() {
        let none: Vec<(String, String)> = Vec::new();
        assert!(matches!(Index::build(none), Err(IndexError::NoDocuments)));
    }

    #[test]
    fn stopword_only_documents_fail() {
        let err = Index::build([("0", "the and of"), ("1", "")]).unwrap_err();
        assert!(matches!(err, IndexError::EmptyVocabulary));
    }

    #[test]
    fn from_parts_rejects_short_vectors() {
        let vocab = Vocabulary::build(&[vec!["a", "b"]]);
        let docs = vec![DocVector { doc_id: "x".into(), tfidf: vec![1.0] }];
        let err = Index::from_parts(vocab, vec![1.0, 1.0], docs).unwrap_err();
        assert!(matches!(err, IndexError::Inconsistent(_)));
    }
}
