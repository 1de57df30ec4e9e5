use std::collections::{BTreeMap, BTreeSet};

use crate::data::clique::SimilarityClique;
use crate::data::feature::FeatureRecord;
use crate::data::stats::SampleStats;

/// apply the externally built similarity cliques to the records and the run
/// statistics
///
/// Every member record gets the membership flag and the clique id. The
/// clique id enters the all-cliques set, and the blank-cliques set when any
/// member is blank associated. Records inherit the union of the group sets
/// over their clique members, the per-sample clique id sets are derived from
/// the per-sample feature lists, and the clique store moves into the run
/// statistics.
pub fn apply_cliques(
    cliques: BTreeMap<u64, SimilarityClique>,
    records: &mut BTreeMap<u64, FeatureRecord>,
    stats: &mut SampleStats,
) {
    for (clique_id, clique) in &cliques {
        stats.all_cliques.insert(*clique_id);
        let mut blank = false;
        for member in &clique.members {
            if let Some(record) = records.get_mut(member) {
                record.in_clique = true;
                record.clique_id = Some(*clique_id);
                blank = blank || record.blank_associated;
            }
        }
        if blank {
            stats.blank_cliques.insert(*clique_id);
        }
    }

    // group unions, applied after all memberships are known
    let mut unions: BTreeMap<u64, BTreeSet<String>> = BTreeMap::new();
    for (clique_id, clique) in &cliques {
        let mut groups: BTreeSet<String> = BTreeSet::new();
        for member in &clique.members {
            if let Some(record) = records.get(member) {
                groups.extend(record.groups.iter().cloned());
            }
        }
        unions.insert(*clique_id, groups);
    }
    for record in records.values_mut() {
        if let Some(clique_id) = record.clique_id {
            if let Some(groups) = unions.get(&clique_id) {
                record.clique_groups = groups.clone();
            }
        }
    }

    for (sample, feature_ids) in &stats.features_per_sample {
        let clique_ids: BTreeSet<u64> = feature_ids
            .iter()
            .filter_map(|id| records.get(id).and_then(|record| record.clique_id))
            .collect();
        stats.cliques_per_sample.insert(sample.clone(), clique_ids);
    }

    stats.clique_count = cliques.len();
    stats.cliques = cliques;
}
