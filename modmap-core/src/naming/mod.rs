//! Term corpus and automatic module naming
//!
//! A [`TermCorpus`] tokenizes identifiers, keeps them as TF-IDF documents and
//! scores terms against the whole corpus. The graph builder uses one corpus
//! seeded with every unit name for edge weighting; each community gets its
//! own fresh corpus for naming.

pub mod tfidf;

pub use tfidf::TfIdfIndex;

use std::collections::{BTreeSet, HashSet};

use lazy_static::lazy_static;
use modmap_utils::{capitalize_word, split_identifier};
use tracing::debug;

lazy_static! {
    /// Verb and preposition noise that never names a module
    static ref STOP_WORDS: HashSet<&'static str> = [
        "get", "set", "create", "by", "for", "a", "as", "index", "map", "key", "build",
        "jwt", "post", "put", "delete", "verify", "generate",
    ]
    .into_iter()
    .collect();
}

/// Allowance for rounding when comparing a term score with the corpus mean
const MEAN_TOLERANCE: f64 = 1e-12;

/// Whether `word` (lowercase) is filtered out by tokenization
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(word)
}

/// Split `text` into lowercase terms, dropping stop words
pub fn terms(text: &str) -> Vec<String> {
    split_identifier(text)
        .into_iter()
        .map(|word| word.to_lowercase())
        .filter(|word| !is_stop_word(word))
        .collect()
}

/// Bag of tokenized documents with a running vocabulary
#[derive(Debug, Clone, Default)]
pub struct TermCorpus {
    index: TfIdfIndex,
    vocabulary: BTreeSet<String>,
}

impl TermCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a corpus with one document per name
    pub fn from_names<'a, I>(names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut corpus = Self::new();
        for name in names {
            corpus.add_document(name);
        }
        corpus
    }

    /// Tokenize `text` and record the surviving terms in the vocabulary
    pub fn tokenize(&mut self, text: &str) -> Vec<String> {
        let tokens = terms(text);
        self.vocabulary.extend(tokens.iter().cloned());
        tokens
    }

    /// Add `text` as one document. Text with no surviving terms is ignored.
    pub fn add_document(&mut self, text: &str) {
        let tokens = self.tokenize(text);
        if !tokens.is_empty() {
            self.index.add_document(tokens);
        }
    }

    /// Number of documents
    pub fn document_count(&self) -> usize {
        self.index.len()
    }

    /// Known terms in lexicographic order
    pub fn vocabulary(&self) -> impl Iterator<Item = &str> {
        self.vocabulary.iter().map(String::as_str)
    }

    /// Mean TF-IDF weight of `term` across all documents (0 for an empty corpus)
    pub fn score_term(&self, term: &str) -> f64 {
        self.index.mean_tfidf(term)
    }

    /// Mean term score over the terms of `text` (0 when nothing survives)
    pub fn mean_term_score(&self, text: &str) -> f64 {
        let tokens = terms(text);
        if tokens.is_empty() {
            return 0.0;
        }
        tokens.iter().map(|t| self.score_term(t)).sum::<f64>() / tokens.len() as f64
    }

    /// Highest term score over the terms of `text` (0 when nothing survives)
    pub fn best_term_score(&self, text: &str) -> f64 {
        terms(text)
            .iter()
            .map(|t| self.score_term(t))
            .fold(0.0, f64::max)
    }

    /// Infer a short label from the corpus.
    ///
    /// Terms scoring at least the mean score are capitalized and packed,
    /// highest score first, while their summed length stays within
    /// `max_length` characters (joining spaces are not counted). Packing stops at the first term that does
    /// not fit. The packed terms come back in descending lexicographic order
    /// and may be empty.
    pub fn infer_name(&self, max_length: usize) -> Vec<String> {
        if self.vocabulary.is_empty() {
            return Vec::new();
        }

        let scored: Vec<(&str, f64)> = self
            .vocabulary
            .iter()
            .map(|term| (term.as_str(), self.score_term(term)))
            .collect();
        let mean = scored.iter().map(|(_, score)| score).sum::<f64>() / scored.len() as f64;

        let mut candidates: Vec<(&str, f64)> = scored
            .into_iter()
            .filter(|(_, score)| *score >= mean - MEAN_TOLERANCE)
            .collect();
        candidates.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let mut packed: Vec<String> = Vec::new();
        let mut length = 0;
        for (term, _) in candidates {
            let word = capitalize_word(term);
            let next = length + word.chars().count();
            if next > max_length {
                break;
            }
            length = next;
            packed.push(word);
        }

        packed.sort();
        packed.reverse();
        packed
    }
}

/// Name a community from its member names, falling back to `fallback`
pub fn infer_module_name<'a, I>(names: I, max_length: usize, fallback: &str) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let corpus = TermCorpus::from_names(names);
    let name = corpus.infer_name(max_length).join(" ");
    let name = name.trim();

    if name.is_empty() {
        debug!("No usable terms in {} documents, naming module {fallback:?}", corpus.document_count());
        fallback.to_string()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terms_lowercase_and_filter_stop_words() {
        assert_eq!(terms("getUserProfile"), vec!["user", "profile"]);
        assert_eq!(terms("create_invoice-line"), vec!["invoice", "line"]);
        assert_eq!(terms("src/billing/invoice.ts"), vec!["src", "billing", "invoice.ts"]);
        assert!(terms("getBy").is_empty());
        assert_eq!(terms("XMLParser"), vec!["xmlparser"]);
        assert_eq!(terms("theUserOfRecord"), vec!["the", "user", "of", "record"]);
        assert!(terms("").is_empty());
    }

    #[test]
    fn test_tokenize_records_vocabulary() {
        let mut corpus = TermCorpus::new();
        corpus.tokenize("getUserProfile");
        corpus.tokenize("setUser");

        assert_eq!(corpus.vocabulary().collect::<Vec<_>>(), vec!["profile", "user"]);
        assert_eq!(corpus.document_count(), 0);
    }

    #[test]
    fn test_stop_word_document_is_not_added() {
        let mut corpus = TermCorpus::new();
        corpus.add_document("getBy");
        corpus.add_document("");

        assert_eq!(corpus.document_count(), 0);
        assert!(corpus.score_term("by").abs() < f64::EPSILON);
        assert!(corpus.infer_name(20).is_empty());
    }

    #[test]
    fn test_score_term() {
        let corpus = TermCorpus::from_names(["getUser", "getUserProfile"]);
        let user_idf = 1.0 + (2.0f64 / 3.0).ln();

        assert!((corpus.score_term("user") - user_idf).abs() < 1e-12);
        assert!((corpus.score_term("profile") - 0.5).abs() < 1e-12);
        assert!(corpus.score_term("invoice").abs() < f64::EPSILON);
    }

    #[test]
    fn test_mean_and_best_term_score() {
        let corpus = TermCorpus::from_names(["getUser", "getUserProfile"]);
        let user = corpus.score_term("user");

        assert!((corpus.mean_term_score("getUserProfile") - (user + 0.5) / 2.0).abs() < 1e-12);
        assert!((corpus.best_term_score("getUserProfile") - user).abs() < 1e-12);
        assert!(corpus.mean_term_score("getBy").abs() < f64::EPSILON);
        assert!(corpus.best_term_score("").abs() < f64::EPSILON);
    }

    #[test]
    fn test_infer_name_keeps_terms_above_mean() {
        let corpus = TermCorpus::from_names(["getUser", "getUserProfile"]);
        assert_eq!(corpus.infer_name(20), vec!["User"]);

        let corpus = TermCorpus::from_names(["userAccount", "userAccountRole", "userSession", "userSessionToken"]);
        assert_eq!(corpus.infer_name(20), vec!["User", "Session", "Account"]);
    }

    #[test]
    fn test_infer_name_respects_length_budget() {
        let corpus = TermCorpus::from_names(["userAccount", "userAccountRole", "userSession", "userSessionToken"]);

        // separators do not count: "User" + "Account" + "Session" is 18 characters
        assert_eq!(corpus.infer_name(19), vec!["User", "Session", "Account"]);
        assert_eq!(corpus.infer_name(18), vec!["User", "Session", "Account"]);
        assert_eq!(corpus.infer_name(17), vec!["User", "Account"]);
        assert_eq!(corpus.infer_name(11), vec!["User", "Account"]);
        assert_eq!(corpus.infer_name(10), vec!["User"]);
        assert_eq!(corpus.infer_name(4), vec!["User"]);
        assert!(corpus.infer_name(3).is_empty());
    }

    #[test]
    fn test_infer_name_single_term() {
        let corpus = TermCorpus::from_names(["login"]);
        assert_eq!(corpus.infer_name(20), vec!["Login"]);
    }

    #[test]
    fn test_infer_module_name_fallback() {
        assert_eq!(infer_module_name(["getBy", "set"], 20, "Unknown"), "Unknown");
        assert_eq!(infer_module_name(["createInvoice"], 20, "Unknown"), "Invoice");
        assert_eq!(infer_module_name(std::iter::empty(), 20, "Misc"), "Misc");
    }
}
