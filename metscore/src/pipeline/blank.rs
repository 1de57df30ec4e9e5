use std::collections::BTreeMap;

use statrs::statistics::{Data, OrderStatistics};

use crate::data::feature::FeatureRecord;
use crate::data::stats::SampleStats;

/// flag features that belong to the medium or solvent blanks
///
/// A feature detected only in blank samples is blank associated. A feature
/// detected in both worlds stays biological only when its median biological
/// intensity exceeds the maximum blank intensity by more than the retention
/// factor. Without a declared `BLANK` group the stage is a no-op.
pub fn detect_blank_features(
    records: &mut BTreeMap<u64, FeatureRecord>,
    stats: &SampleStats,
    blank_factor: f64,
) {
    if !stats.has_blanks() {
        return;
    }
    let blanks = stats.blank_samples();

    for record in records.values_mut() {
        let mut blank_intensities: Vec<f64> = Vec::new();
        let mut biological_intensities: Vec<f64> = Vec::new();
        for (sample, intensity) in record
            .presence_samples
            .iter()
            .zip(record.intensities_samples.iter())
        {
            if blanks.contains(sample) {
                blank_intensities.push(*intensity);
            } else {
                biological_intensities.push(*intensity);
            }
        }

        if blank_intensities.is_empty() {
            continue;
        }
        if biological_intensities.is_empty() {
            record.blank_associated = true;
            continue;
        }

        let max_blank = blank_intensities
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max);
        if max_blank == 0.0 {
            continue;
        }
        let mut biological = Data::new(biological_intensities);
        record.blank_associated = biological.median() / max_blank <= blank_factor;
    }
}
