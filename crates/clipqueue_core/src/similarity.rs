//! Near-duplicate title detection.
//!
//! Titles are compared as TF-IDF bag-of-words vectors: lowercase tokens of at
//! least two word characters, raw term counts, smoothed idf
//! `ln((1 + n) / (1 + df)) + 1` and L2 normalisation. The candidate is part of
//! the document set when idf is computed, exactly as if the space were rebuilt
//! from `existing + [candidate]` for every query.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.8;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w{2,}").expect("token regex"));

// Guards identical vectors against rounding just below a threshold of 1.0.
const SCORE_EPSILON: f64 = 1e-9;

/// Returns true if `candidate` scores at least `threshold` against any title in `existing`.
pub fn is_similar<S: AsRef<str>>(candidate: &str, existing: &[S], threshold: f64) -> bool {
    let mut index = TitleIndex::new();
    for title in existing {
        index.insert(title.as_ref());
    }
    index.is_similar(candidate, threshold)
}

/// Incrementally grown title history with cached term statistics.
#[derive(Debug, Default, Clone)]
pub struct TitleIndex {
    docs: Vec<HashMap<String, u32>>,
    doc_freq: HashMap<String, usize>,
    postings: HashMap<String, Vec<usize>>,
    exact: HashSet<String>,
}

impl TitleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn insert(&mut self, title: &str) {
        let doc_id = self.docs.len();
        let terms = term_counts(title);
        for term in terms.keys() {
            *self.doc_freq.entry(term.clone()).or_insert(0) += 1;
            self.postings.entry(term.clone()).or_default().push(doc_id);
        }
        self.docs.push(terms);
        self.exact.insert(title.to_string());
    }

    pub fn is_similar(&self, candidate: &str, threshold: f64) -> bool {
        if self.docs.is_empty() {
            return false;
        }
        if threshold <= 0.0 || self.exact.contains(candidate) {
            return true;
        }
        self.best_score(candidate) + SCORE_EPSILON >= threshold
    }

    /// Highest cosine similarity between `candidate` and any indexed title.
    pub fn best_score(&self, candidate: &str) -> f64 {
        let candidate_terms = term_counts(candidate);
        if self.docs.is_empty() || candidate_terms.is_empty() {
            return 0.0;
        }

        let n_docs = self.docs.len() + 1;
        let idf = |term: &str| -> f64 {
            let mut df = self.doc_freq.get(term).copied().unwrap_or(0);
            if candidate_terms.contains_key(term) {
                df += 1;
            }
            ((1 + n_docs) as f64 / (1 + df) as f64).ln() + 1.0
        };

        let candidate_weights: HashMap<&str, f64> = candidate_terms
            .iter()
            .map(|(term, tf)| (term.as_str(), f64::from(*tf) * idf(term)))
            .collect();
        let candidate_norm = l2(candidate_weights.values().copied());

        let mut shared_docs: Vec<usize> = candidate_terms
            .keys()
            .filter_map(|term| self.postings.get(term))
            .flatten()
            .copied()
            .collect();
        shared_docs.sort_unstable();
        shared_docs.dedup();

        let mut best = 0.0_f64;
        for doc_id in shared_docs {
            let doc = &self.docs[doc_id];
            let dot: f64 = doc
                .iter()
                .filter_map(|(term, tf)| {
                    candidate_weights
                        .get(term.as_str())
                        .map(|weight| weight * f64::from(*tf) * idf(term))
                })
                .sum();
            if dot <= 0.0 {
                continue;
            }
            let doc_norm = l2(doc.iter().map(|(term, tf)| f64::from(*tf) * idf(term)));
            best = best.max(dot / (candidate_norm * doc_norm));
        }
        best
    }
}

fn l2(weights: impl Iterator<Item = f64>) -> f64 {
    weights.map(|w| w * w).sum::<f64>().sqrt()
}

fn term_counts(title: &str) -> HashMap<String, u32> {
    let lowered = title.to_lowercase();
    let mut counts = HashMap::new();
    for token in TOKEN.find_iter(&lowered) {
        *counts.entry(fold_plural(token.as_str())).or_insert(0) += 1;
    }
    counts
}

/// Folds common English plurals onto their singular ("scenes" -> "scene").
fn fold_plural(token: &str) -> String {
    let len = token.chars().count();
    if len > 4 {
        if let Some(stem) = token.strip_suffix("ies") {
            return format!("{stem}y");
        }
    }
    if len > 3
        && token.ends_with('s')
        && !token.ends_with("ss")
        && !token.ends_with("us")
        && !token.ends_with("is")
    {
        return token[..token.len() - 1].to_string();
    }
    token.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plural_folding() {
        assert_eq!(fold_plural("scenes"), "scene");
        assert_eq!(fold_plural("stories"), "story");
        assert_eq!(fold_plural("boss"), "boss");
        assert_eq!(fold_plural("this"), "this");
        assert_eq!(fold_plural("gas"), "gas");
    }

    #[test]
    fn tokens_ignore_single_characters_and_punctuation() {
        let counts = term_counts("A Fight! a FIGHT? x");
        assert_eq!(counts.len(), 1);
        assert_eq!(counts.get("fight"), Some(&2));
    }
}
