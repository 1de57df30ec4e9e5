use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use ordered_float::OrderedFloat;
use tracing::info;

use crate::algorithm::novelty::novelty_score;
use crate::algorithm::overlap::{convolutedness, resolve_overlaps};
use crate::data::clique::SimilarityClique;
use crate::data::feature::{ExternalAnnotation, FeatureRecord};
use crate::data::matrix::PeakMatrix;
use crate::data::peak::PeakObservation;
use crate::data::spectrum::{LibraryEntry, Ms2Spectrum};
use crate::data::stats::{round_decimals, SampleStats};
use crate::pipeline::aggregate::aggregate_features;
use crate::pipeline::bioactivity::{detect_bioactive_features, detect_bioactivity_trends};
use crate::pipeline::blank::detect_blank_features;
use crate::pipeline::cliques::apply_cliques;
use crate::pipeline::config::PipelineConfig;
use crate::pipeline::library::match_library;
use crate::pipeline::stats::collect_run_stats;
use crate::pipeline::tables::build_sample_tables;

/// everything a run can consume, with the peak matrix as the only
/// mandatory part
#[derive(Clone, Debug, Default)]
pub struct PipelineInput {
    pub matrix: PeakMatrix,
    pub fragments: BTreeMap<u64, Ms2Spectrum>,
    pub group_metadata: Option<BTreeMap<String, String>>,
    pub bioactivity: Option<BTreeMap<String, f64>>,
    pub library: Vec<LibraryEntry>,
    pub external_annotations: BTreeMap<u64, ExternalAnnotation>,
    pub cliques: BTreeMap<u64, SimilarityClique>,
}

/// the scored state of a finished run
#[derive(Clone, Debug)]
pub struct PipelineOutput {
    pub stats: SampleStats,
    pub tables: BTreeMap<String, Vec<PeakObservation>>,
    pub records: BTreeMap<u64, FeatureRecord>,
}

/// drive a full annotation and scoring run over the given inputs
///
/// The stages run in their data dependency order: run statistics, per-sample
/// peak tables, feature aggregation, blank and bioactivity association,
/// clique application, library matching, external annotations, ion identity
/// resolution, novelty fusion, per-peak score columns and trend detection.
/// The finished tables are sorted by descending normalized intensity.
///
/// Arguments:
///
/// * `input` - the parsed run inputs
/// * `config` - the pipeline settings
///
/// Returns:
///
/// * `PipelineOutput` - run statistics, scored peak tables and feature records
pub fn run_pipeline(input: PipelineInput, config: &PipelineConfig) -> PipelineOutput {
    let PipelineInput {
        matrix,
        fragments,
        group_metadata,
        bioactivity,
        library,
        external_annotations,
        cliques,
    } = input;

    let bioactivity_samples: Option<BTreeSet<String>> = bioactivity
        .as_ref()
        .map(|values| values.keys().cloned().collect());
    let mut stats = collect_run_stats(&matrix, group_metadata.as_ref(), bioactivity_samples.as_ref());
    info!(
        "Collected statistics for {} samples over {} matrix rows",
        stats.samples.len(),
        matrix.len()
    );

    let mut tables = build_sample_tables(&matrix, config, &mut stats);
    let mut records = aggregate_features(&matrix, &tables, &fragments, config, &stats);
    info!("Aggregated {} feature records", records.len());

    detect_blank_features(&mut records, &stats, config.blank_factor);
    if let Some(values) = &bioactivity {
        detect_bioactive_features(&mut records, &stats, config.bioactivity_factor, values);
    }

    apply_cliques(cliques, &mut records, &mut stats);
    info!(
        "Applied {} similarity cliques, {} blank associated",
        stats.clique_count,
        stats.blank_cliques.len()
    );

    match_library(&mut records, &library, config);
    for (feature_id, annotation) in external_annotations {
        if let Some(record) = records.get_mut(&feature_id) {
            record.external_annotation = Some(annotation);
        }
    }

    resolve_ion_identities(&mut tables, &mut records, config);
    score_novelty(&mut records, &stats);
    populate_peak_scores(&mut tables, &records);
    detect_bioactivity_trends(&mut records);

    // dashboards read the tables top-down by intensity
    for table in tables.values_mut() {
        table.sort_by_key(|peak| Reverse(OrderedFloat(peak.norm_intensity)));
    }
    info!("Finished scoring {} peak tables", tables.len());

    PipelineOutput {
        stats,
        tables,
        records,
    }
}

/// Resolves overlapping peaks per sample into adduct annotations or
/// collisions, then scores every peak's convolutedness against its table.
fn resolve_ion_identities(
    tables: &mut BTreeMap<String, Vec<PeakObservation>>,
    records: &mut BTreeMap<u64, FeatureRecord>,
    config: &PipelineConfig,
) {
    for (sample, table) in tables.iter_mut() {
        let annotations = resolve_overlaps(sample, table, config.mass_deviation_ppm);
        for (feature_id, annotation) in annotations {
            if let Some(record) = records.get_mut(&feature_id) {
                record.adduct_annotations.push(annotation);
            }
        }

        let scores: Vec<f64> = table
            .iter()
            .map(|peak| convolutedness(peak, table))
            .collect();
        for (peak, score) in table.iter_mut().zip(scores) {
            peak.convolutedness_score = score;
        }
    }
}

/// Fuses annotation evidence into one novelty score per record, rounded to
/// 3 decimals. Scored over a snapshot so clique member lookups see the
/// unmodified records.
fn score_novelty(records: &mut BTreeMap<u64, FeatureRecord>, stats: &SampleStats) {
    let scores: Vec<(u64, f64)> = records
        .values()
        .map(|record| {
            (
                record.feature_id,
                round_decimals(novelty_score(record, records, &stats.cliques), 3),
            )
        })
        .collect();
    for (feature_id, score) in scores {
        if let Some(record) = records.get_mut(&feature_id) {
            record.novelty_score = Some(score);
        }
    }
}

/// Copies the record level results into the per-peak score columns the
/// tables are filtered on.
fn populate_peak_scores(
    tables: &mut BTreeMap<String, Vec<PeakObservation>>,
    records: &BTreeMap<u64, FeatureRecord>,
) {
    for table in tables.values_mut() {
        for peak in table.iter_mut() {
            peak.rel_intensity_score = peak.norm_intensity;
            let Some(record) = records.get(&peak.feature_id) else {
                continue;
            };
            peak.bioactivity_score = if record.bioactivity_associated {
                record
                    .bioactivity_samples
                    .iter()
                    .cloned()
                    .fold(0.0, f64::max)
            } else {
                0.0
            };
            peak.novelty_score = record.novelty_score.unwrap_or(1.0);
            peak.in_blank = record.blank_associated;
            peak.ms1_only = record.ms1_only;
        }
    }
}
