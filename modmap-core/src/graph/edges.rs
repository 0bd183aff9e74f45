//! Similarity graph edge payload

use serde::{Deserialize, Serialize};

/// Edge between two code units whose blended similarity passed the threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityEdge {
    /// Blended path, name and dependency score
    pub weight: f64,
    /// Disparity-filter significance, set by the metrics pass
    pub disparity: f64,
    /// Normalized edge betweenness over disparity, set by the metrics pass
    pub centrality: f64,
}

impl SimilarityEdge {
    /// Create an edge whose metrics have not been computed yet
    pub const fn new(weight: f64) -> Self {
        Self {
            weight,
            disparity: 0.0,
            centrality: 0.0,
        }
    }

    /// Weight seen by community detection: mean of weight, disparity and centrality
    pub fn community_weight(&self) -> f64 {
        (self.weight + self.disparity + self.centrality) / 3.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_community_weight_is_mean() {
        let edge = SimilarityEdge {
            weight: 0.6,
            disparity: 0.3,
            centrality: 0.0,
        };
        assert!((edge.community_weight() - 0.3).abs() < 1e-12);
        assert!((SimilarityEdge::new(0.9).community_weight() - 0.3).abs() < 1e-12);
    }
}
