//! Multi-document TF-IDF index.
//!
//! Term frequency is the raw count of a term in a document and
//! `idf(t) = 1 + ln(N / (1 + df(t)))`, where `N` is the number of documents
//! and `df(t)` the number of documents containing `t`.

use std::collections::HashMap;

/// TF-IDF statistics over a bag of tokenized documents
#[derive(Debug, Clone, Default)]
pub struct TfIdfIndex {
    documents: Vec<HashMap<String, usize>>,
    /// Number of documents containing each term
    document_frequency: HashMap<String, usize>,
    /// Occurrences of each term summed over all documents
    total_frequency: HashMap<String, usize>,
}

impl TfIdfIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one document given as a token sequence
    pub fn add_document<I, S>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for token in tokens {
            *counts.entry(token.into()).or_insert(0) += 1;
        }

        for (term, count) in &counts {
            *self.document_frequency.entry(term.clone()).or_insert(0) += 1;
            *self.total_frequency.entry(term.clone()).or_insert(0) += count;
        }
        self.documents.push(counts);
    }

    /// Number of documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Number of documents containing `term`
    pub fn document_frequency(&self, term: &str) -> usize {
        self.document_frequency.get(term).copied().unwrap_or(0)
    }

    /// Inverse document frequency of `term` (0 for an empty index)
    pub fn idf(&self, term: &str) -> f64 {
        if self.documents.is_empty() {
            return 0.0;
        }
        let n = self.documents.len() as f64;
        1.0 + (n / (1.0 + self.document_frequency(term) as f64)).ln()
    }

    /// TF-IDF of `term` in the document at `index` (0 if out of range)
    pub fn tfidf(&self, term: &str, index: usize) -> f64 {
        self.documents
            .get(index)
            .and_then(|doc| doc.get(term))
            .map_or(0.0, |&tf| tf as f64 * self.idf(term))
    }

    /// Mean TF-IDF of `term` across all documents (0 for an empty index)
    pub fn mean_tfidf(&self, term: &str) -> f64 {
        if self.documents.is_empty() {
            return 0.0;
        }
        let total = self.total_frequency.get(term).copied().unwrap_or(0) as f64;
        total * self.idf(term) / self.documents.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(docs: &[&[&str]]) -> TfIdfIndex {
        let mut index = TfIdfIndex::new();
        for doc in docs {
            index.add_document(doc.iter().copied());
        }
        index
    }

    #[test]
    fn test_idf() {
        let index = index(&[&["user"], &["user", "profile"]]);

        assert_eq!(index.document_frequency("user"), 2);
        assert!((index.idf("user") - (1.0 + (2.0f64 / 3.0).ln())).abs() < 1e-12);
        assert!((index.idf("profile") - 1.0).abs() < 1e-12);
        assert!((index.idf("missing") - (1.0 + 2.0f64.ln())).abs() < 1e-12);
    }

    #[test]
    fn test_tfidf_counts_repeats() {
        let index = index(&[&["user", "user"], &["invoice"]]);
        let idf = index.idf("user");

        assert!((index.tfidf("user", 0) - 2.0 * idf).abs() < 1e-12);
        assert!(index.tfidf("user", 1).abs() < f64::EPSILON);
        assert!(index.tfidf("user", 7).abs() < f64::EPSILON);
    }

    #[test]
    fn test_mean_tfidf_matches_per_document_sum() {
        let index = index(&[&["user", "user"], &["user", "profile"], &["invoice"]]);
        let summed: f64 = (0..index.len()).map(|i| index.tfidf("user", i)).sum();

        assert!((index.mean_tfidf("user") - summed / 3.0).abs() < 1e-12);
        assert!(index.mean_tfidf("absent").abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_index_scores_zero() {
        let index = TfIdfIndex::new();
        assert!(index.is_empty());
        assert!(index.idf("user").abs() < f64::EPSILON);
        assert!(index.mean_tfidf("user").abs() < f64::EPSILON);
    }
}
