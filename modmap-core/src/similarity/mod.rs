//! Pairwise similarity scoring
//!
//! Blends three signals into one edge weight for an ordered pair of units:
//! - path score: Jaro-Winkler of the two file paths averaged with the best
//!   term score either path reaches in the shared name corpus
//! - name score: mean term score of both names averaged with the
//!   Jaro-Winkler of the raw names
//! - dependency score: 1 when the source statically uses the target

use std::collections::HashMap;

use modmap_utils::jaro_winkler_similarity;
use rayon::prelude::*;

use crate::models::CodeUnit;
use crate::naming::TermCorpus;

/// Symmetric path-score table over the distinct paths of one unit set
#[derive(Debug, Clone, Default)]
pub struct PathScoreMatrix {
    index: HashMap<String, usize>,
    size: usize,
    scores: Vec<f64>,
}

impl PathScoreMatrix {
    /// Score every unordered pair of distinct paths once
    pub fn compute(paths: &[String], corpus: &TermCorpus, parallel: bool) -> Self {
        let size = paths.len();
        let best: Vec<f64> = paths.iter().map(|p| corpus.best_term_score(p)).collect();

        let row = |i: usize| -> Vec<f64> {
            (i + 1..size)
                .map(|j| pair_path_score(&paths[i], &paths[j], best[i], best[j]))
                .collect()
        };
        let upper: Vec<Vec<f64>> = if parallel {
            (0..size).into_par_iter().map(row).collect()
        } else {
            (0..size).map(row).collect()
        };

        let mut scores = vec![1.0; size * size];
        for (i, row) in upper.into_iter().enumerate() {
            for (offset, score) in row.into_iter().enumerate() {
                let j = i + 1 + offset;
                scores[i * size + j] = score;
                scores[j * size + i] = score;
            }
        }

        let index = paths
            .iter()
            .enumerate()
            .map(|(i, p)| (p.clone(), i))
            .collect();

        Self { index, size, scores }
    }

    /// Number of distinct paths
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Stored score for a pair of known paths
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = *self.index.get(a)?;
        let j = *self.index.get(b)?;
        Some(self.scores[i * self.size + j])
    }
}

fn pair_path_score(a: &str, b: &str, best_a: f64, best_b: f64) -> f64 {
    if a == b {
        return 1.0;
    }
    (jaro_winkler_similarity(a, b) + best_a.max(best_b)) / 2.0
}

/// Scores ordered unit pairs against a corpus seeded with every unit name
#[derive(Debug, Clone)]
pub struct SimilarityScorer {
    corpus: TermCorpus,
    paths: PathScoreMatrix,
    /// Mean term score per distinct unit name
    name_means: HashMap<String, f64>,
}

impl SimilarityScorer {
    /// Seed the corpus with all unit names, then precompute path scores.
    ///
    /// Every name is added before any term is scored.
    pub fn new(units: &[CodeUnit], parallel: bool) -> Self {
        let corpus = TermCorpus::from_names(units.iter().map(|u| u.name.as_str()));

        let mut paths: Vec<String> = units.iter().map(|u| u.path.clone()).collect();
        paths.sort();
        paths.dedup();
        let paths = PathScoreMatrix::compute(&paths, &corpus, parallel);

        let name_means = units
            .iter()
            .map(|u| (u.name.clone(), corpus.mean_term_score(&u.name)))
            .collect();

        Self {
            corpus,
            paths,
            name_means,
        }
    }

    /// Corpus built from the unit names
    pub fn corpus(&self) -> &TermCorpus {
        &self.corpus
    }

    /// Distinct-path score table
    pub fn path_matrix(&self) -> &PathScoreMatrix {
        &self.paths
    }

    /// Symmetric path similarity in `[0, 1]`; identical paths score 1
    pub fn path_score(&self, a: &str, b: &str) -> f64 {
        self.paths.get(a, b).unwrap_or_else(|| {
            pair_path_score(
                a,
                b,
                self.corpus.best_term_score(a),
                self.corpus.best_term_score(b),
            )
        })
    }

    /// Symmetric name similarity
    pub fn name_score(&self, a: &str, b: &str) -> f64 {
        let mean_a = self.name_mean(a);
        let mean_b = self.name_mean(b);
        ((mean_a + mean_b) / 2.0 + jaro_winkler_similarity(a, b)) / 2.0
    }

    fn name_mean(&self, name: &str) -> f64 {
        self.name_means
            .get(name)
            .copied()
            .unwrap_or_else(|| self.corpus.mean_term_score(name))
    }

    /// 1 when `source` depends on `target`, else 0
    pub fn dependency_score(source: &CodeUnit, target: &CodeUnit) -> f64 {
        if source.depends_on(&target.id) {
            1.0
        } else {
            0.0
        }
    }

    /// Blended weight of the ordered pair `source -> target`
    pub fn combined_weight(&self, source: &CodeUnit, target: &CodeUnit) -> f64 {
        let path = self.path_score(&source.path, &target.path);
        let name = self.name_score(&source.name, &target.name);
        let dependency = Self::dependency_score(source, target);
        (path + name + dependency) / 3.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UnitKind;

    fn scenario_one() -> Vec<CodeUnit> {
        let user = CodeUnit::new("u1", "getUser", UnitKind::Function, "src/user.ts");
        let profile = CodeUnit::new("u2", "getUserProfile", UnitKind::Function, "src/user.ts")
            .with_dependency(&user);
        vec![user, profile]
    }

    #[test]
    fn test_identical_paths_score_one() {
        let units = scenario_one();
        let scorer = SimilarityScorer::new(&units, false);

        assert!((scorer.path_score("src/user.ts", "src/user.ts") - 1.0).abs() < f64::EPSILON);
        assert_eq!(scorer.path_matrix().len(), 1);
    }

    #[test]
    fn test_scenario_one_weights() {
        let units = scenario_one();
        let scorer = SimilarityScorer::new(&units, false);

        assert!((SimilarityScorer::dependency_score(&units[1], &units[0]) - 1.0).abs() < f64::EPSILON);
        assert!(SimilarityScorer::dependency_score(&units[0], &units[1]).abs() < f64::EPSILON);

        let name = scorer.name_score("getUser", "getUserProfile");
        assert!((name - 0.735).abs() < 1e-3, "name score {name}");

        let forward = scorer.combined_weight(&units[0], &units[1]);
        let backward = scorer.combined_weight(&units[1], &units[0]);
        assert!((forward - 0.578).abs() < 1e-3, "forward {forward}");
        assert!((backward - 0.912).abs() < 1e-3, "backward {backward}");
    }

    #[test]
    fn test_scenario_two_stays_below_threshold() {
        let units = vec![
            CodeUnit::new("a", "login", UnitKind::Function, "auth/login.ts"),
            CodeUnit::new("b", "createInvoice", UnitKind::Function, "billing/invoice.ts"),
        ];
        let scorer = SimilarityScorer::new(&units, false);

        assert!(scorer.combined_weight(&units[0], &units[1]) < 0.33);
        assert!(scorer.combined_weight(&units[1], &units[0]) < 0.33);
    }

    #[test]
    fn test_scores_are_symmetric() {
        let units = vec![
            CodeUnit::new("a", "userAccount", UnitKind::Class, "src/accounts/model.ts"),
            CodeUnit::new("b", "invoiceLine", UnitKind::Class, "lib/billing/ledger.rs"),
            CodeUnit::new("c", "getBy", UnitKind::Function, "lib/billing/query.rs"),
        ];
        let scorer = SimilarityScorer::new(&units, true);

        for x in &units {
            for y in &units {
                assert_eq!(scorer.path_score(&x.path, &y.path), scorer.path_score(&y.path, &x.path));
                assert_eq!(scorer.name_score(&x.name, &y.name), scorer.name_score(&y.name, &x.name));
            }
        }
    }

    #[test]
    fn test_parallel_matrix_matches_sequential() {
        let paths: Vec<String> = ["a/user.ts", "a/profile.ts", "b/invoice.rs", "c/util.py"]
            .iter()
            .map(ToString::to_string)
            .collect();
        let corpus = TermCorpus::from_names(["getUser", "userProfile", "invoiceTotal"]);

        let sequential = PathScoreMatrix::compute(&paths, &corpus, false);
        let parallel = PathScoreMatrix::compute(&paths, &corpus, true);
        for a in &paths {
            for b in &paths {
                assert_eq!(sequential.get(a, b), parallel.get(a, b));
            }
        }
        assert_eq!(sequential.get("a/user.ts", "missing.ts"), None);
    }

    #[test]
    fn test_unknown_path_falls_back_to_direct_score() {
        let units = scenario_one();
        let scorer = SimilarityScorer::new(&units, false);

        let score = scorer.path_score("src/user.ts", "src/users.ts");
        assert!(score > 0.0 && score <= 1.0);
        assert_eq!(score, scorer.path_score("src/users.ts", "src/user.ts"));
    }
}
