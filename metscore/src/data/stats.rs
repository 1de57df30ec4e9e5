use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::data::clique::SimilarityClique;

/// Reserved group for samples without a metadata attribute.
pub const GROUP_GENERAL: &str = "GENERAL";
/// Reserved group marking medium or solvent blank samples.
pub const GROUP_BLANK: &str = "BLANK";

/// round a value to a fixed number of decimal places
#[inline]
pub fn round_decimals(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Run-wide bookkeeping shared by the pipeline stages: retention time extent,
/// sample grouping, per-sample feature and clique membership, and the clique
/// store itself. Built by the statistics collector, extended by the blank,
/// bioactivity and clique stages, read by selection and rollup.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SampleStats {
    pub rt_min: f64,
    pub rt_max: f64,
    pub rt_range: f64,
    pub samples: Vec<String>, // first-appearance order from the matrix
    pub sample_to_group: BTreeMap<String, String>,
    pub groups: BTreeMap<String, BTreeSet<String>>, // group -> member samples
    pub active_samples: BTreeSet<String>,
    pub inactive_samples: BTreeSet<String>,
    pub features_per_sample: BTreeMap<String, Vec<u64>>,
    pub cliques: BTreeMap<u64, SimilarityClique>,
    pub cliques_per_sample: BTreeMap<String, BTreeSet<u64>>,
    pub all_cliques: BTreeSet<u64>,
    pub blank_cliques: BTreeSet<u64>,
    pub clique_count: usize,
    pub intensity_filtered_features: BTreeMap<u64, Vec<f64>>, // id -> per-sample filter values
}

impl SampleStats {
    /// group of a sample, `GENERAL` when unknown
    pub fn group_of(&self, sample: &str) -> &str {
        self.sample_to_group
            .get(sample)
            .map(|g| g.as_str())
            .unwrap_or(GROUP_GENERAL)
    }

    /// samples of the `BLANK` group, empty set if none were declared
    pub fn blank_samples(&self) -> BTreeSet<String> {
        self.groups.get(GROUP_BLANK).cloned().unwrap_or_default()
    }

    /// true when a non-empty `BLANK` group was declared
    pub fn has_blanks(&self) -> bool {
        self.groups
            .get(GROUP_BLANK)
            .map(|samples| !samples.is_empty())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_to_decimal_places() {
        assert_eq!(round_decimals(0.23349, 3), 0.233);
        assert_eq!(round_decimals(2.0, 2), 2.0);
        assert_eq!(round_decimals(0.6666666, 2), 0.67);
        assert_eq!(round_decimals(825.232665, 4), 825.2327);
    }

    #[test]
    fn group_lookup_defaults_to_general() {
        let mut stats = SampleStats::default();
        stats
            .sample_to_group
            .insert("s1".to_string(), "treated".to_string());
        assert_eq!(stats.group_of("s1"), "treated");
        assert_eq!(stats.group_of("unknown"), GROUP_GENERAL);
    }

    #[test]
    fn blank_group_detection() {
        let mut stats = SampleStats::default();
        assert!(!stats.has_blanks());

        stats.groups.insert(GROUP_BLANK.to_string(), BTreeSet::new());
        assert!(!stats.has_blanks());

        stats
            .groups
            .get_mut(GROUP_BLANK)
            .unwrap()
            .insert("blank1".to_string());
        assert!(stats.has_blanks());
        assert!(stats.blank_samples().contains("blank1"));
    }
}
