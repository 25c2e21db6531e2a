use crate::vocab::Vocabulary;

/// Dense normalized term frequencies of `tokens` over `vocab`.
///
/// Each in-vocabulary term contributes `count / tokens.len()`. Out-of-vocabulary
/// tokens still count towards the denominator but add no weight. The denominator
/// is at least 1, so empty input yields the zero vector.
pub fn term_frequency<S: AsRef<str>>(tokens: &[S], vocab: &Vocabulary) -> Vec<f64> {
    let mut counts = vec![0u32; vocab.len()];
    for token in tokens {
        if let Some(pos) = vocab.position(token.as_ref()) {
            counts[pos] += 1;
        }
    }
    let total = tokens.len().max(1) as f64;
    counts.into_iter().map(|c| c as f64 / total).collect()
}

/// Smoothed inverse document frequency: `ln((N + 1) / (df + 1)) + 1`.
///
/// `df` counts the vectors with a strictly positive entry at each position.
pub fn inverse_document_frequency(doc_tfs: &[Vec<f64>], vocab_len: usize) -> Vec<f64> {
    let mut df = vec![0u32; vocab_len];
    for tf in doc_tfs {
        for (slot, &w) in df.iter_mut().zip(tf.iter()) {
            if w > 0.0 {
                *slot += 1;
            }
        }
    }
    let n = doc_tfs.len() as f64;
    df.into_iter().map(|d| ((n + 1.0) / (d as f64 + 1.0)).ln() + 1.0).collect()
}

/// Element-wise product of a TF vector and the IDF vector.
pub fn apply_idf(tf: &[f64], idf: &[f64]) -> Vec<f64> {
    debug_assert_eq!(tf.len(), idf.len());
    tf.iter().zip(idf).map(|(t, i)| t * i).collect()
}
