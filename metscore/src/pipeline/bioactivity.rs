use std::collections::BTreeMap;

use crate::data::feature::FeatureRecord;
use crate::data::stats::SampleStats;

/// flag features whose intensity pattern follows the active samples
///
/// Blank-associated features are skipped. A feature present only in active
/// samples is associated; present in both, it is associated iff its minimum
/// active intensity exceeds its maximum inactive intensity by more than the
/// bioactivity factor. Association attaches the bioactivity value of every
/// presence sample in presence order, 0 for samples without a value.
/// Without active samples the stage is a no-op.
pub fn detect_bioactive_features(
    records: &mut BTreeMap<u64, FeatureRecord>,
    stats: &SampleStats,
    bioactivity_factor: f64,
    values: &BTreeMap<String, f64>,
) {
    if stats.active_samples.is_empty() {
        return;
    }

    for record in records.values_mut() {
        if record.blank_associated {
            continue;
        }

        let mut min_active = f64::INFINITY;
        let mut max_inactive = f64::NEG_INFINITY;
        let mut seen_active = false;
        let mut seen_inactive = false;
        for (sample, intensity) in record
            .presence_samples
            .iter()
            .zip(record.intensities_samples.iter())
        {
            if stats.active_samples.contains(sample) {
                seen_active = true;
                min_active = min_active.min(*intensity);
            } else {
                seen_inactive = true;
                max_inactive = max_inactive.max(*intensity);
            }
        }
        if !seen_active {
            continue;
        }

        let associated = if !seen_inactive || max_inactive == 0.0 {
            true
        } else {
            min_active / max_inactive > bioactivity_factor
        };
        if !associated {
            continue;
        }

        record.bioactivity_associated = true;
        record.bioactivity_samples = record
            .presence_samples
            .iter()
            .map(|sample| values.get(sample).copied().unwrap_or(0.0))
            .collect();
    }
}

/// mark associated features whose bioactivity never increases across the
/// presence order
pub fn detect_bioactivity_trends(records: &mut BTreeMap<u64, FeatureRecord>) {
    for record in records.values_mut() {
        if !record.bioactivity_associated {
            continue;
        }
        record.bioactivity_trend = record
            .bioactivity_samples
            .windows(2)
            .all(|pair| pair[0] >= pair[1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::feature::SampleDetection;

    fn stats_with_active(active: &[&str]) -> SampleStats {
        let mut stats = SampleStats::default();
        stats.active_samples = active.iter().map(|s| s.to_string()).collect();
        stats
    }

    fn record(detections: Vec<(&str, f64)>) -> FeatureRecord {
        FeatureRecord::from_detections(
            1,
            500.0,
            12.5,
            detections
                .into_iter()
                .map(|(sample, intensity)| SampleDetection {
                    sample: sample.to_string(),
                    intensity,
                    fwhm: 0.2,
                    retention_time: 12.5,
                })
                .collect(),
            None,
        )
    }

    fn values(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs
            .iter()
            .map(|(sample, value)| (sample.to_string(), *value))
            .collect()
    }

    #[test]
    fn active_only_feature_is_associated_with_values_in_presence_order() {
        let mut records = BTreeMap::from([(1, record(vec![("a1", 100.0), ("a2", 300.0)]))]);
        let values = values(&[("a1", 64.0), ("a2", 32.0)]);
        detect_bioactive_features(&mut records, &stats_with_active(&["a1", "a2"]), 10.0, &values);

        let record = &records[&1];
        assert!(record.bioactivity_associated);
        // presence order is a2 (300) then a1 (100)
        assert_eq!(record.bioactivity_samples, vec![32.0, 64.0]);
    }

    #[test]
    fn ratio_above_the_factor_associates() {
        // min active 1100 over max inactive 100
        let mut records = BTreeMap::from([(1, record(vec![("a1", 1100.0), ("i1", 100.0)]))]);
        detect_bioactive_features(
            &mut records,
            &stats_with_active(&["a1"]),
            10.0,
            &values(&[("a1", 64.0)]),
        );

        assert!(records[&1].bioactivity_associated);
        assert_eq!(records[&1].bioactivity_samples, vec![64.0, 0.0]);
    }

    #[test]
    fn ratio_at_or_below_the_factor_does_not_associate() {
        let mut records = BTreeMap::from([(1, record(vec![("a1", 1000.0), ("i1", 100.0)]))]);
        detect_bioactive_features(
            &mut records,
            &stats_with_active(&["a1"]),
            10.0,
            &values(&[("a1", 64.0)]),
        );
        assert!(!records[&1].bioactivity_associated);
    }

    #[test]
    fn blank_associated_features_are_skipped() {
        let mut blank_record = record(vec![("a1", 1000.0)]);
        blank_record.blank_associated = true;
        let mut records = BTreeMap::from([(1, blank_record)]);
        detect_bioactive_features(
            &mut records,
            &stats_with_active(&["a1"]),
            10.0,
            &values(&[("a1", 64.0)]),
        );
        assert!(!records[&1].bioactivity_associated);
    }

    #[test]
    fn no_active_samples_makes_the_stage_a_no_op() {
        let mut records = BTreeMap::from([(1, record(vec![("a1", 1000.0)]))]);
        detect_bioactive_features(
            &mut records,
            &SampleStats::default(),
            10.0,
            &values(&[("a1", 64.0)]),
        );
        assert!(!records[&1].bioactivity_associated);
    }

    #[test]
    fn non_increasing_values_set_the_trend() {
        let mut record = record(vec![("a1", 400.0), ("a2", 300.0), ("a3", 200.0), ("a4", 100.0)]);
        record.bioactivity_associated = true;
        record.bioactivity_samples = vec![10.0, 8.0, 8.0, 3.0];
        let mut records = BTreeMap::from([(1, record)]);

        detect_bioactivity_trends(&mut records);
        assert!(records[&1].bioactivity_trend);
    }

    #[test]
    fn an_increase_anywhere_keeps_the_trend_unset() {
        let mut record = record(vec![("a1", 300.0), ("a2", 200.0), ("a3", 100.0)]);
        record.bioactivity_associated = true;
        record.bioactivity_samples = vec![10.0, 12.0, 3.0];
        let mut records = BTreeMap::from([(1, record)]);

        detect_bioactivity_trends(&mut records);
        assert!(!records[&1].bioactivity_trend);
    }
}
