use std::collections::BTreeMap;

use ordered_float::OrderedFloat;
use rayon::prelude::*;

use crate::data::feature::{FeatureRecord, SampleDetection};
use crate::data::matrix::PeakMatrix;
use crate::data::peak::PeakObservation;
use crate::data::spectrum::Ms2Spectrum;
use crate::data::stats::{round_decimals, SampleStats};
use crate::pipeline::config::PipelineConfig;

/// aggregate the per-sample tables into one record per feature
///
/// Detections across the tables assemble each record with its presence list
/// ordered by descending intensity. A fragment spectrum is accepted only if
/// enough fragments survive unit normalization and the 1% base peak filter,
/// otherwise the feature is MS1-only; a fragment spectrum without a matrix
/// row is ignored. Records carry the group set of their presence samples
/// and, with two or more groups, the directed fold-difference map over
/// per-group intensity maxima.
///
/// Arguments:
///
/// * `matrix` - the raw peak matrix, read for precursor m/z and average
///   retention time
/// * `tables` - the filtered per-sample peak tables
/// * `fragments` - raw MS2 spectra keyed by feature id
/// * `config` - pipeline parameters, read for the minimum fragment count
/// * `stats` - run statistics, read for the group assignment
///
/// Returns:
///
/// * `BTreeMap<u64, FeatureRecord>` - the feature record arena
pub fn aggregate_features(
    matrix: &PeakMatrix,
    tables: &BTreeMap<String, Vec<PeakObservation>>,
    fragments: &BTreeMap<u64, Ms2Spectrum>,
    config: &PipelineConfig,
    stats: &SampleStats,
) -> BTreeMap<u64, FeatureRecord> {
    let row_info: BTreeMap<u64, (f64, f64)> = matrix
        .rows
        .iter()
        .map(|row| (row.feature_id, (row.precursor_mz, row.retention_time)))
        .collect();

    let mut detections: BTreeMap<u64, Vec<SampleDetection>> = BTreeMap::new();
    for (sample, table) in tables {
        for peak in table {
            detections
                .entry(peak.feature_id)
                .or_default()
                .push(SampleDetection {
                    sample: sample.clone(),
                    intensity: peak.intensity,
                    fwhm: peak.fwhm,
                    retention_time: peak.retention_time,
                });
        }
    }

    detections
        .into_iter()
        .collect::<Vec<_>>()
        .into_par_iter()
        .filter_map(|(feature_id, feature_detections)| {
            let (precursor_mz, average_rt) = row_info.get(&feature_id).copied()?;
            let spectrum = accepted_spectrum(fragments.get(&feature_id), config);
            let mut record = FeatureRecord::from_detections(
                feature_id,
                precursor_mz,
                average_rt,
                feature_detections,
                spectrum,
            );
            attach_groups(&mut record, stats);
            Some((feature_id, record))
        })
        .collect()
}

/// prepared spectrum of a feature, None when too few fragments survive
fn accepted_spectrum(raw: Option<&Ms2Spectrum>, config: &PipelineConfig) -> Option<Ms2Spectrum> {
    let prepared = raw?.normalized().filter_by_intensity(0.01);
    if prepared.len() >= config.min_ms2_fragments {
        Some(prepared)
    } else {
        None
    }
}

/// group set from the presence samples, plus the fold-difference map once
/// the feature spans at least two groups
fn attach_groups(record: &mut FeatureRecord, stats: &SampleStats) {
    record.groups = record
        .presence_samples
        .iter()
        .map(|sample| stats.group_of(sample).to_string())
        .collect();

    if record.groups.len() < 2 {
        return;
    }

    let mut group_max: BTreeMap<&str, f64> = BTreeMap::new();
    for (sample, intensity) in record
        .presence_samples
        .iter()
        .zip(record.intensities_samples.iter())
    {
        let entry = group_max
            .entry(stats.group_of(sample))
            .or_insert(f64::NEG_INFINITY);
        *entry = entry.max(*intensity);
    }

    let mut fold: BTreeMap<String, f64> = BTreeMap::new();
    for (group_a, max_a) in &group_max {
        for (group_b, max_b) in &group_max {
            if group_a == group_b {
                continue;
            }
            let ratio = if *max_b == 0.0 {
                0.0
            } else {
                round_decimals(max_a / max_b, 2)
            };
            fold.insert(format!("{}/{}", group_a, group_b), ratio);
        }
    }

    let mut order: Vec<(String, f64)> = fold.iter().map(|(key, ratio)| (key.clone(), *ratio)).collect();
    order.sort_by_key(|(_, ratio)| std::cmp::Reverse(OrderedFloat(*ratio)));

    record.fold_differences = Some(fold);
    record.fold_difference_order = order.into_iter().map(|(key, _)| key).collect();
}
