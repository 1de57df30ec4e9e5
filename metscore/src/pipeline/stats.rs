use std::collections::{BTreeMap, BTreeSet};

use crate::data::matrix::PeakMatrix;
use crate::data::stats::{SampleStats, GROUP_GENERAL};

/// initialize the run statistics from the raw matrix and the side tables
///
/// The sample list comes from the matrix in first-appearance order and the
/// retention time extent from the matrix-wide average retention time column.
/// Group metadata rows naming unknown samples are dropped, samples without a
/// row fall into the `GENERAL` group, as do rows with an empty attribute.
/// Bioactivity sample names are validated the same way; the inactive set is
/// the complement of the active set over all known samples.
///
/// Arguments:
///
/// * `matrix` - the raw peak matrix
/// * `group_metadata` - sample to group attribute map, None without a
///   metadata table
/// * `bioactivity_samples` - samples marked active, None without a
///   bioactivity table
///
/// Returns:
///
/// * `SampleStats` - the initialized run statistics
pub fn collect_run_stats(
    matrix: &PeakMatrix,
    group_metadata: Option<&BTreeMap<String, String>>,
    bioactivity_samples: Option<&BTreeSet<String>>,
) -> SampleStats {
    let mut stats = SampleStats::default();
    stats.samples = matrix.samples.clone();

    if !matrix.is_empty() {
        stats.rt_min = matrix
            .rows
            .iter()
            .map(|row| row.retention_time)
            .fold(f64::INFINITY, f64::min);
        stats.rt_max = matrix
            .rows
            .iter()
            .map(|row| row.retention_time)
            .fold(f64::NEG_INFINITY, f64::max);
        stats.rt_range = stats.rt_max - stats.rt_min;
    }

    let known: BTreeSet<&str> = matrix.samples.iter().map(|sample| sample.as_str()).collect();

    if let Some(metadata) = group_metadata {
        for (sample, attribute) in metadata {
            if !known.contains(sample.as_str()) {
                continue;
            }
            let group = if attribute.is_empty() {
                GROUP_GENERAL
            } else {
                attribute.as_str()
            };
            stats
                .sample_to_group
                .insert(sample.clone(), group.to_string());
        }
    }
    // samples the metadata does not mention stay in the reserved group
    for sample in &matrix.samples {
        stats
            .sample_to_group
            .entry(sample.clone())
            .or_insert_with(|| GROUP_GENERAL.to_string());
    }
    for (sample, group) in &stats.sample_to_group {
        stats
            .groups
            .entry(group.clone())
            .or_default()
            .insert(sample.clone());
    }

    if let Some(active) = bioactivity_samples {
        stats.active_samples = active
            .iter()
            .filter(|sample| known.contains(sample.as_str()))
            .cloned()
            .collect();
        stats.inactive_samples = matrix
            .samples
            .iter()
            .filter(|sample| !stats.active_samples.contains(*sample))
            .cloned()
            .collect();
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::matrix::MatrixRow;
    use crate::data::stats::GROUP_BLANK;

    fn matrix(samples: &[&str], retention_times: &[f64]) -> PeakMatrix {
        let rows = retention_times
            .iter()
            .enumerate()
            .map(|(index, rt)| MatrixRow {
                feature_id: index as u64 + 1,
                precursor_mz: 500.0,
                retention_time: *rt,
                cells: BTreeMap::new(),
            })
            .collect();
        PeakMatrix {
            samples: samples.iter().map(|s| s.to_string()).collect(),
            rows,
        }
    }

    #[test]
    fn retention_extent_comes_from_the_matrix() {
        let stats = collect_run_stats(&matrix(&["s1"], &[12.0, 10.0, 14.0]), None, None);
        assert_eq!(stats.rt_min, 10.0);
        assert_eq!(stats.rt_max, 14.0);
        assert_eq!(stats.rt_range, 4.0);
    }

    #[test]
    fn empty_matrix_keeps_zero_extent() {
        let stats = collect_run_stats(&matrix(&[], &[]), None, None);
        assert_eq!(stats.rt_min, 0.0);
        assert_eq!(stats.rt_range, 0.0);
        assert!(stats.samples.is_empty());
    }

    #[test]
    fn samples_without_metadata_fall_into_general() {
        let stats = collect_run_stats(&matrix(&["s1", "s2"], &[10.0]), None, None);
        assert_eq!(stats.group_of("s1"), GROUP_GENERAL);
        assert_eq!(stats.group_of("s2"), GROUP_GENERAL);
        assert_eq!(stats.groups[GROUP_GENERAL].len(), 2);
    }

    #[test]
    fn metadata_assigns_groups_and_drops_unknown_samples() {
        let metadata = BTreeMap::from([
            ("s1".to_string(), "treated".to_string()),
            ("blank1".to_string(), GROUP_BLANK.to_string()),
            ("ghost".to_string(), "treated".to_string()),
            ("s3".to_string(), String::new()),
        ]);
        let stats = collect_run_stats(
            &matrix(&["s1", "s2", "s3", "blank1"], &[10.0]),
            Some(&metadata),
            None,
        );

        assert_eq!(stats.group_of("s1"), "treated");
        assert_eq!(stats.group_of("s2"), GROUP_GENERAL); // no metadata row
        assert_eq!(stats.group_of("s3"), GROUP_GENERAL); // empty attribute
        assert!(stats.has_blanks());
        assert!(!stats.sample_to_group.contains_key("ghost"));
        assert!(stats.groups["treated"].contains("s1"));
    }

    #[test]
    fn bioactivity_samples_are_validated_and_complemented() {
        let active = BTreeSet::from(["s1".to_string(), "ghost".to_string()]);
        let stats = collect_run_stats(&matrix(&["s1", "s2", "s3"], &[10.0]), None, Some(&active));

        assert_eq!(stats.active_samples, BTreeSet::from(["s1".to_string()]));
        assert_eq!(
            stats.inactive_samples,
            BTreeSet::from(["s2".to_string(), "s3".to_string()])
        );
    }

    #[test]
    fn absent_bioactivity_leaves_both_sets_empty() {
        let stats = collect_run_stats(&matrix(&["s1", "s2"], &[10.0]), None, None);
        assert!(stats.active_samples.is_empty());
        assert!(stats.inactive_samples.is_empty());
    }
}
