//! Term -> position mapping shared by every vector of one index build.
//!
//! Positions are handed out in first-seen order while scanning documents in
//! corpus order, so the same corpus enumerated the same way always produces
//! the same vocabulary.

use indexmap::IndexSet;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    terms: IndexSet<String>,
}

// IndexSet equality ignores order; positions are part of a vocabulary's identity.
impl PartialEq for Vocabulary {
    fn eq(&self, other: &Self) -> bool {
        self.terms.iter().eq(other.terms.iter())
    }
}

impl Eq for Vocabulary {}

impl Vocabulary {
    pub fn new() -> Self { Self::default() }

    /// Assign positions to every distinct term of `docs`, in document then token order.
    pub fn build<S: AsRef<str>>(docs: &[Vec<S>]) -> Self {
        let mut vocab = Self::new();
        for tokens in docs {
            for term in tokens {
                vocab.insert(term.as_ref());
            }
        }
        vocab
    }

    /// Returns the position of `term`, assigning the next free one if unseen.
    pub fn insert(&mut self, term: &str) -> usize {
        if let Some(pos) = self.terms.get_index_of(term) {
            return pos;
        }
        self.terms.insert_full(term.to_string()).0
    }

    /// Rebuild from persisted `(term, position)` pairs.
    ///
    /// Positions must form exactly `0..n` with no gaps or repeats, otherwise
    /// an error describing the first violation is returned.
    pub fn from_positions<I>(pairs: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = (String, usize)>,
    {
        let pairs: Vec<(String, usize)> = pairs.into_iter().collect();
        let n = pairs.len();
        let mut slots: Vec<Option<String>> = vec![None; n];
        for (term, pos) in pairs {
            if pos >= n {
                return Err(format!("position {pos} of {term:?} is out of range for {n} terms"));
            }
            if let Some(prev) = &slots[pos] {
                return Err(format!("position {pos} assigned to both {prev:?} and {term:?}"));
            }
            slots[pos] = Some(term);
        }
        let mut terms = IndexSet::with_capacity(slots.len());
        for (pos, slot) in slots.into_iter().enumerate() {
            let term = slot.ok_or_else(|| format!("position {pos} is not assigned to any term"))?;
            if !terms.insert(term) {
                return Err(format!("term at position {pos} appears more than once"));
            }
        }
        Ok(Self { terms })
    }

    pub fn position(&self, term: &str) -> Option<usize> { self.terms.get_index_of(term) }

    pub fn term_at(&self, pos: usize) -> Option<&str> { self.terms.get_index(pos).map(String::as_str) }

    pub fn contains(&self, term: &str) -> bool { self.terms.contains(term) }

    pub fn len(&self) -> usize { self.terms.len() }

    pub fn is_empty(&self) -> bool { self.terms.is_empty() }

    /// Iterate `(term, position)` in position order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.terms.iter().enumerate().map(|(pos, t)| (t.as_str(), pos))
    }
}

// Persisted as a plain `{ term: position }` map, emitted in position order.
impl Serialize for Vocabulary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (term, pos) in self.iter() {
            map.serialize_entry(term, &(pos as u64))?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Vocabulary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct VocabVisitor;

        impl<'de> Visitor<'de> for VocabVisitor {
            type Value = Vocabulary;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map from term to vocabulary position")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Vocabulary, A::Error> {
                let mut pairs = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((term, pos)) = access.next_entry::<String, u64>()? {
                    pairs.push((term, pos as usize));
                }
                Vocabulary::from_positions(pairs).map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_map(VocabVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter().map(|d| d.iter().map(|s| s.to_string()).collect()).collect()
    }

    #[test]
    fn positions_follow_first_occurrence() {
        let v = Vocabulary::build(&docs(&[&["binary", "search", "binary"], &["tree", "search"]]));
        assert_eq!(v.len(), 3);
        assert_eq!(v.position("binary"), Some(0));
        assert_eq!(v.position("search"), Some(1));
        assert_eq!(v.position("tree"), Some(2));
        assert_eq!(v.term_at(2), Some("tree"));
        assert_eq!(v.position("graph"), None);
    }

    #[test]
    fn document_order_changes_positions() {
        let a = Vocabulary::build(&docs(&[&["x"], &["y"]]));
        let b = Vocabulary::build(&docs(&[&["y"], &["x"]]));
        assert_ne!(a, b);
        assert_eq!(a.position("x"), b.position("y"));
        assert_eq!(a, Vocabulary::build(&docs(&[&["x", "y"]])));
    }

    #[test]
    fn json_keeps_position_order() {
        let v = Vocabulary::build(&docs(&[&["zeta", "alpha", "mu"]]));
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, r#"{"zeta":0,"alpha":1,"mu":2}"#);
        let back: Vocabulary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn json_in_any_key_order_is_accepted() {
        let v: Vocabulary = serde_json::from_str(r#"{"b":1,"c":2,"a":0}"#).unwrap();
        assert_eq!(v.term_at(0), Some("a"));
        assert_eq!(v.term_at(2), Some("c"));
    }

    #[test]
    fn gaps_and_reuse_are_rejected() {
        assert!(serde_json::from_str::<Vocabulary>(r#"{"a":0,"b":2}"#).is_err());
        assert!(serde_json::from_str::<Vocabulary>(r#"{"a":0,"b":0}"#).is_err());
    }
}
