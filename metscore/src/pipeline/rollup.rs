use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::data::feature::FeatureRecord;
use crate::data::stats::{round_decimals, SampleStats};
use crate::pipeline::selection::SampleSelection;

/// one row of the per-sample overview table
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SampleOverviewRow {
    pub sample: String,
    pub group: String,
    pub selected_features: usize,
    pub selected_networks: usize,
    pub diversity: f64,
    pub specificity: f64,
    pub mean_novelty: f64,
    pub total_features: usize,
    pub non_blank_features: usize,
    pub blank_features: usize,
}

/// roll the per-sample selections up into one overview row per sample
///
/// Diversity is the share of the run's non-blank cliques covered by the
/// sample, specificity the share of the sample's non-blank cliques whose
/// group union is a single group, and mean novelty the average novelty score
/// over the sample's non-blank features. Every ratio with an empty
/// denominator reports zero.
///
/// Arguments:
///
/// * `selections` - the per-sample feature partitions
/// * `records` - the feature records of the run
/// * `stats` - the run statistics, including the clique sets
pub fn build_overview(
    selections: &BTreeMap<String, SampleSelection>,
    records: &BTreeMap<u64, FeatureRecord>,
    stats: &SampleStats,
) -> Vec<SampleOverviewRow> {
    let run_cliques = stats.all_cliques.difference(&stats.blank_cliques).count();
    let empty = BTreeSet::new();

    stats
        .samples
        .iter()
        .map(|sample| {
            let selection = selections.get(sample).cloned().unwrap_or_default();
            let sample_cliques = stats.cliques_per_sample.get(sample).unwrap_or(&empty);
            let non_blank_cliques = sample_cliques.difference(&stats.blank_cliques).count();

            let selected_networks: BTreeSet<u64> = selection
                .selected
                .iter()
                .filter_map(|id| records.get(id).and_then(|record| record.clique_id))
                .collect();

            let single_group_cliques: BTreeSet<u64> = selection
                .non_blank
                .iter()
                .filter_map(|id| records.get(id))
                .filter(|record| record.clique_groups.len() == 1)
                .filter_map(|record| record.clique_id)
                .collect();

            let novelty: Vec<f64> = selection
                .non_blank
                .iter()
                .filter_map(|id| records.get(id).and_then(|record| record.novelty_score))
                .collect();
            let mean_novelty = if novelty.is_empty() {
                0.0
            } else {
                round_decimals(novelty.iter().mean(), 2)
            };

            SampleOverviewRow {
                sample: sample.clone(),
                group: stats.group_of(sample).to_string(),
                selected_features: selection.selected.len(),
                selected_networks: selected_networks.len(),
                diversity: guarded_ratio(non_blank_cliques, run_cliques),
                specificity: guarded_ratio(single_group_cliques.len(), non_blank_cliques),
                mean_novelty,
                total_features: selection.all.len(),
                non_blank_features: selection.non_blank.len(),
                blank_features: selection.blank_or_ms1.len(),
            }
        })
        .collect()
}

fn guarded_ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        round_decimals(numerator as f64 / denominator as f64, 2)
    }
}
