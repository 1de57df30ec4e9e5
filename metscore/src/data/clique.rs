use serde::{Deserialize, Serialize};

/// Weighted link between two features of a similarity clique.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CliqueEdge {
    pub source: u64,
    pub target: u64,
    pub weight: f64,
}

impl CliqueEdge {
    /// true if the edge touches the given feature
    #[inline]
    pub fn contains(&self, feature_id: u64) -> bool {
        self.source == feature_id || self.target == feature_id
    }

    /// the feature on the other end of the edge, None if the edge does not
    /// touch `feature_id`
    pub fn partner_of(&self, feature_id: u64) -> Option<u64> {
        if self.source == feature_id {
            Some(self.target)
        } else if self.target == feature_id {
            Some(self.source)
        } else {
            None
        }
    }
}

/// A connected group of features whose MS2 spectra were linked by an external
/// spectral similarity networking step. Members and edges are read-only input.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimilarityClique {
    pub clique_id: u64,
    pub members: Vec<u64>,
    pub edges: Vec<CliqueEdge>,
}

impl SimilarityClique {
    pub fn contains(&self, feature_id: u64) -> bool {
        self.members.contains(&feature_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_partner_lookup() {
        let edge = CliqueEdge { source: 1, target: 2, weight: 0.9 };
        assert_eq!(edge.partner_of(1), Some(2));
        assert_eq!(edge.partner_of(2), Some(1));
        assert_eq!(edge.partner_of(3), None);
        assert!(edge.contains(1));
        assert!(!edge.contains(3));
    }

    #[test]
    fn clique_membership() {
        let clique = SimilarityClique {
            clique_id: 0,
            members: vec![1, 2, 5],
            edges: vec![
                CliqueEdge { source: 1, target: 2, weight: 0.8 },
                CliqueEdge { source: 2, target: 5, weight: 0.7 },
            ],
        };
        assert!(clique.contains(5));
        assert!(!clique.contains(4));
    }
}
