use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::data::feature::FeatureRecord;
use crate::data::peak::PeakObservation;
use crate::data::stats::GROUP_BLANK;
use crate::pipeline::config::{BioactivityFilter, SelectionThresholds};

/// per-sample partition of the peak table under a set of score thresholds
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SampleSelection {
    /// every feature detected in the sample
    pub all: BTreeSet<u64>,
    /// features set aside as MS1-only or as members of a blank group
    pub blank_or_ms1: BTreeSet<u64>,
    /// features eligible for threshold filtering
    pub non_blank: BTreeSet<u64>,
    /// features passing every active threshold
    pub selected: BTreeSet<u64>,
}

/// partition each sample peak table into all / blank-or-MS1 / non-blank /
/// selected feature sets
///
/// A peak is set aside when it is MS1-only, or when blank group designation
/// is requested and its record belongs to the blank group. The remaining
/// peaks are selected when their relative intensity, convolutedness and
/// novelty scores all fall inside the configured closed ranges and the
/// bioactivity filter passes.
///
/// Arguments:
///
/// * `tables` - the scored per-sample peak tables
/// * `records` - the feature records of the run
/// * `thresholds` - the score ranges and filter switches to apply
pub fn build_selections(
    tables: &BTreeMap<String, Vec<PeakObservation>>,
    records: &BTreeMap<u64, FeatureRecord>,
    thresholds: &SelectionThresholds,
) -> BTreeMap<String, SampleSelection> {
    tables
        .iter()
        .map(|(sample, table)| {
            let mut selection = SampleSelection::default();
            for peak in table {
                selection.all.insert(peak.feature_id);
                let record = records.get(&peak.feature_id);
                let in_blank_group = record
                    .map(|record| record.groups.contains(GROUP_BLANK))
                    .unwrap_or(false);
                if peak.ms1_only || (thresholds.designate_blank_groups && in_blank_group) {
                    selection.blank_or_ms1.insert(peak.feature_id);
                    continue;
                }
                selection.non_blank.insert(peak.feature_id);
                if !in_range(peak.rel_intensity_score, thresholds.relative_intensity)
                    || !in_range(peak.convolutedness_score, thresholds.convolutedness)
                    || !in_range(peak.novelty_score, thresholds.novelty)
                {
                    continue;
                }
                let bioactive = match thresholds.bioactivity {
                    BioactivityFilter::Off => true,
                    BioactivityFilter::Specificity => record
                        .map(|record| record.bioactivity_associated)
                        .unwrap_or(false),
                    BioactivityFilter::SpecificityTrend => record
                        .map(|record| record.bioactivity_associated && record.bioactivity_trend)
                        .unwrap_or(false),
                };
                if bioactive {
                    selection.selected.insert(peak.feature_id);
                }
            }
            (sample.clone(), selection)
        })
        .collect()
}

#[inline]
fn in_range(value: f64, range: [f64; 2]) -> bool {
    value >= range[0] && value <= range[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::feature::SampleDetection;

    fn peak(feature_id: u64, rel_intensity: f64) -> PeakObservation {
        let mut peak = PeakObservation::new(
            feature_id,
            400.0,
            6.0,
            0.2,
            1e6,
            5.8,
            6.2,
            rel_intensity,
        );
        peak.rel_intensity_score = rel_intensity;
        peak.novelty_score = 1.0;
        peak
    }

    fn record(feature_id: u64, groups: &[&str]) -> FeatureRecord {
        let mut record = FeatureRecord::from_detections(
            feature_id,
            400.0,
            6.0,
            vec![SampleDetection {
                sample: "s1".to_string(),
                intensity: 1e6,
                fwhm: 0.2,
                retention_time: 6.0,
            }],
            None,
        );
        record.groups = groups.iter().map(|g| g.to_string()).collect();
        record
    }

    #[test]
    fn defaults_select_every_non_blank_peak() {
        let tables = BTreeMap::from([(
            "s1".to_string(),
            vec![peak(1, 1.0), peak(2, 0.4)],
        )]);
        let records = BTreeMap::from([(1, record(1, &["treated"])), (2, record(2, &["treated"]))]);

        let selections = build_selections(&tables, &records, &SelectionThresholds::default());

        let selection = &selections["s1"];
        assert_eq!(selection.all, BTreeSet::from([1, 2]));
        assert!(selection.blank_or_ms1.is_empty());
        assert_eq!(selection.selected, selection.non_blank);
    }

    #[test]
    fn ms1_only_peaks_are_set_aside() {
        let mut ms1_peak = peak(1, 1.0);
        ms1_peak.ms1_only = true;
        let tables = BTreeMap::from([("s1".to_string(), vec![ms1_peak])]);
        let records = BTreeMap::from([(1, record(1, &["treated"]))]);

        let selections = build_selections(&tables, &records, &SelectionThresholds::default());

        let selection = &selections["s1"];
        assert_eq!(selection.blank_or_ms1, BTreeSet::from([1]));
        assert!(selection.non_blank.is_empty());
        assert!(selection.selected.is_empty());
    }

    #[test]
    fn blank_group_designation_is_a_switch() {
        let tables = BTreeMap::from([("blank1".to_string(), vec![peak(1, 1.0)])]);
        let records = BTreeMap::from([(1, record(1, &["BLANK"]))]);

        let thresholds = SelectionThresholds::default();
        let selections = build_selections(&tables, &records, &thresholds);
        assert_eq!(selections["blank1"].non_blank, BTreeSet::from([1]));

        let designating = SelectionThresholds {
            designate_blank_groups: true,
            ..SelectionThresholds::default()
        };
        let selections = build_selections(&tables, &records, &designating);
        assert_eq!(selections["blank1"].blank_or_ms1, BTreeSet::from([1]));
        assert!(selections["blank1"].selected.is_empty());
    }

    #[test]
    fn relative_intensity_range_filters_selection() {
        let tables = BTreeMap::from([(
            "s1".to_string(),
            vec![peak(1, 1.0), peak(2, 0.4)],
        )]);
        let records = BTreeMap::from([(1, record(1, &["treated"])), (2, record(2, &["treated"]))]);
        let thresholds = SelectionThresholds {
            relative_intensity: [0.5, 1.0],
            ..SelectionThresholds::default()
        };

        let selections = build_selections(&tables, &records, &thresholds);

        let selection = &selections["s1"];
        assert_eq!(selection.non_blank, BTreeSet::from([1, 2]));
        assert_eq!(selection.selected, BTreeSet::from([1]));
    }

    #[test]
    fn bioactivity_filters_require_association_and_trend() {
        let mut associated = record(1, &["treated"]);
        associated.bioactivity_associated = true;
        let mut trending = record(2, &["treated"]);
        trending.bioactivity_associated = true;
        trending.bioactivity_trend = true;
        let records = BTreeMap::from([
            (1, associated),
            (2, trending),
            (3, record(3, &["treated"])),
        ]);
        let tables = BTreeMap::from([(
            "s1".to_string(),
            vec![peak(1, 1.0), peak(2, 0.8), peak(3, 0.6)],
        )]);

        let specificity = SelectionThresholds {
            bioactivity: BioactivityFilter::Specificity,
            ..SelectionThresholds::default()
        };
        let selections = build_selections(&tables, &records, &specificity);
        assert_eq!(selections["s1"].selected, BTreeSet::from([1, 2]));

        let trend = SelectionThresholds {
            bioactivity: BioactivityFilter::SpecificityTrend,
            ..SelectionThresholds::default()
        };
        let selections = build_selections(&tables, &records, &trend);
        assert_eq!(selections["s1"].selected, BTreeSet::from([2]));
    }
}
