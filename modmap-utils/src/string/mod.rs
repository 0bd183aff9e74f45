//! String processing utilities
//!
//! Identifier splitting, word capitalization and Jaro-Winkler similarity
//! used by the term corpus and the similarity scorer.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Separators between identifier / path words: `_ - / \ :` and whitespace
    static ref WORD_SEPARATORS: Regex = Regex::new(r"[_\-\s/\\:]+").expect("valid separator regex");
}

/// Winkler prefix scale
const PREFIX_SCALE: f64 = 0.1;
/// Longest common prefix that earns the Winkler boost
const MAX_PREFIX: usize = 4;
/// Jaro similarity above which the prefix boost applies
const BOOST_THRESHOLD: f64 = 0.7;

/// Split an identifier or path into words.
///
/// Splits on separators and before an uppercase letter that follows a
/// lowercase one (`getUser` -> `get`, `User`). Uppercase runs stay whole
/// (`XMLParser` is one word). Casing is preserved; empty pieces are dropped.
pub fn split_identifier(text: &str) -> Vec<String> {
    WORD_SEPARATORS
        .split(text)
        .filter(|piece| !piece.is_empty())
        .flat_map(split_casing)
        .collect()
}

fn split_casing(word: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in word.chars() {
        if prev_lower && c.is_uppercase() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase();
        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Capitalize a word: first letter uppercase, the rest lowercase
pub fn capitalize_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Jaro similarity (0.0 to 1.0, 1.0 = identical).
///
/// Arguments are put in a canonical order first so the result is bitwise
/// symmetric.
pub fn jaro_similarity(s1: &str, s2: &str) -> f64 {
    if s1 == s2 {
        return 1.0;
    }

    let (a, b) = if s1 <= s2 { (s1, s2) } else { (s2, s1) };
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let window = (a.len().max(b.len()) / 2).saturating_sub(1);
    let mut a_matched = vec![false; a.len()];
    let mut b_matched = vec![false; b.len()];
    let mut matches = 0usize;

    for (i, &ca) in a.iter().enumerate() {
        let lo = i.saturating_sub(window);
        let hi = (i + window + 1).min(b.len());
        for j in lo..hi {
            if !b_matched[j] && b[j] == ca {
                a_matched[i] = true;
                b_matched[j] = true;
                matches += 1;
                break;
            }
        }
    }

    if matches == 0 {
        return 0.0;
    }

    // Count half-transpositions between the two matched sequences
    let mut transpositions = 0usize;
    let mut k = 0usize;
    for (i, &ca) in a.iter().enumerate() {
        if !a_matched[i] {
            continue;
        }
        while !b_matched[k] {
            k += 1;
        }
        if ca != b[k] {
            transpositions += 1;
        }
        k += 1;
    }

    let m = matches as f64;
    let t = transpositions as f64 / 2.0;
    (m / a.len() as f64 + m / b.len() as f64 + (m - t) / m) / 3.0
}

/// Jaro-Winkler similarity (0.0 to 1.0, 1.0 = identical).
///
/// Boosts the Jaro score by the shared prefix (up to 4 characters) when the
/// Jaro score exceeds 0.7.
pub fn jaro_winkler_similarity(s1: &str, s2: &str) -> f64 {
    if s1 == s2 {
        return 1.0;
    }

    let jaro = jaro_similarity(s1, s2);
    if jaro <= BOOST_THRESHOLD {
        return jaro;
    }

    let prefix = s1
        .chars()
        .zip(s2.chars())
        .take(MAX_PREFIX)
        .take_while(|(a, b)| a == b)
        .count();

    jaro + prefix as f64 * PREFIX_SCALE * (1.0 - jaro)
}
