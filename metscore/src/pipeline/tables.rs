use std::collections::{BTreeMap, BTreeSet};

use itertools::{Itertools, MinMaxResult};
use rayon::prelude::*;

use crate::data::matrix::PeakMatrix;
use crate::data::peak::PeakObservation;
use crate::data::stats::{round_decimals, SampleStats};
use crate::pipeline::config::PipelineConfig;

/// build one normalized peak table per sample from the raw matrix
///
/// Per sample, rows detected and complete in that sample become peaks and
/// their intensity is min-max scaled over the sample's detected intensities,
/// a zero range scales to 0. Across samples a feature is retained iff its
/// normalized intensities, rounded to 4 decimals, satisfy `max >= lo` and
/// `min <= hi` for the configured relative intensity range; excluded
/// features are logged in the run statistics and dropped from every table.
/// The retained feature ids per sample go to `features_per_sample`.
///
/// Arguments:
///
/// * `matrix` - the raw peak matrix
/// * `config` - pipeline parameters, only the relative intensity range is
///   read here
/// * `stats` - run statistics, receives the removed-features log and the
///   per-sample feature lists
///
/// Returns:
///
/// * `BTreeMap<String, Vec<PeakObservation>>` - one filtered normalized
///   peak table per sample
pub fn build_sample_tables(
    matrix: &PeakMatrix,
    config: &PipelineConfig,
    stats: &mut SampleStats,
) -> BTreeMap<String, Vec<PeakObservation>> {
    let mut tables: BTreeMap<String, Vec<PeakObservation>> = matrix
        .samples
        .par_iter()
        .map(|sample| (sample.clone(), sample_table(matrix, sample)))
        .collect();

    // cross-sample retention decision on rounded normalized intensities
    let [lo, hi] = config.relative_intensity_range;
    let mut per_feature: BTreeMap<u64, Vec<f64>> = BTreeMap::new();
    for table in tables.values() {
        for peak in table {
            per_feature
                .entry(peak.feature_id)
                .or_default()
                .push(round_decimals(peak.norm_intensity, 4));
        }
    }

    let mut removed: BTreeSet<u64> = BTreeSet::new();
    for (feature_id, intensities) in &per_feature {
        let (min, max) = match intensities.iter().minmax() {
            MinMaxResult::NoElements => continue,
            MinMaxResult::OneElement(value) => (*value, *value),
            MinMaxResult::MinMax(min, max) => (*min, *max),
        };
        if !(max >= lo && min <= hi) {
            removed.insert(*feature_id);
            stats
                .intensity_filtered_features
                .insert(*feature_id, intensities.clone());
        }
    }

    for (sample, table) in tables.iter_mut() {
        table.retain(|peak| !removed.contains(&peak.feature_id));
        stats.features_per_sample.insert(
            sample.clone(),
            table.iter().map(|peak| peak.feature_id).collect(),
        );
    }

    tables
}

/// peak table of one sample, normalized but not yet filtered
fn sample_table(matrix: &PeakMatrix, sample: &str) -> Vec<PeakObservation> {
    let mut peaks: Vec<PeakObservation> = Vec::new();
    for row in &matrix.rows {
        let Some(cells) = row.cells_for(sample) else {
            continue;
        };
        if !cells.is_detected() || !cells.is_complete() {
            continue;
        }
        let (Some(fwhm), Some(rt), Some(intensity), Some(rt_start), Some(rt_stop)) = (
            cells.fwhm,
            cells.rt,
            cells.intensity_max,
            cells.rt_min,
            cells.rt_max,
        ) else {
            continue;
        };
        peaks.push(PeakObservation::new(
            row.feature_id,
            row.precursor_mz,
            rt,
            fwhm,
            intensity,
            rt_start,
            rt_stop,
            0.0,
        ));
    }

    let range = match peaks.iter().map(|peak| peak.intensity).minmax() {
        MinMaxResult::MinMax(min, max) => Some((min, max - min)),
        MinMaxResult::OneElement(only) => Some((only, 0.0)),
        MinMaxResult::NoElements => None,
    };
    if let Some((min, span)) = range {
        for peak in &mut peaks {
            peak.norm_intensity = if span == 0.0 {
                0.0
            } else {
                (peak.intensity - min) / span
            };
        }
    }

    peaks
}
