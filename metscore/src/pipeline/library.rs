use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::algorithm::similarity::modified_cosine;
use crate::data::feature::{CosineHit, FeatureRecord};
use crate::data::spectrum::{LibraryEntry, Ms2Spectrum};
use crate::data::stats::round_decimals;
use crate::pipeline::config::PipelineConfig;

/// match the fragment spectra of the records against a spectral library
///
/// Blank associated records and records without an accepted fragment
/// spectrum are skipped. A library entry counts as a hit when the modified
/// cosine score reaches the configured cutoff with at least the configured
/// number of matched peaks. Hits are stored on the record sorted by
/// descending score.
///
/// Arguments:
///
/// * `records` - the feature records of the run
/// * `library` - the prepared library entries
/// * `config` - pipeline settings (fragment tolerance, score cutoff, matched peak minimum)
pub fn match_library(
    records: &mut BTreeMap<u64, FeatureRecord>,
    library: &[LibraryEntry],
    config: &PipelineConfig,
) {
    if library.is_empty() {
        return;
    }

    let candidates: Vec<(u64, &Ms2Spectrum)> = records
        .values()
        .filter(|record| !record.blank_associated)
        .filter_map(|record| {
            record
                .ms2_spectrum
                .as_ref()
                .map(|spectrum| (record.feature_id, spectrum))
        })
        .collect();

    let hits: Vec<(u64, Vec<CosineHit>)> = candidates
        .into_par_iter()
        .map(|(feature_id, spectrum)| (feature_id, score_entries(spectrum, library, config)))
        .collect();

    for (feature_id, hits) in hits {
        if let Some(record) = records.get_mut(&feature_id) {
            record.cosine_annotation = !hits.is_empty();
            record.cosine_annotations = hits;
        }
    }
}

fn score_entries(
    spectrum: &Ms2Spectrum,
    library: &[LibraryEntry],
    config: &PipelineConfig,
) -> Vec<CosineHit> {
    let mut hits: Vec<CosineHit> = library
        .iter()
        .filter_map(|entry| {
            let result = modified_cosine(spectrum, &entry.spectrum, config.fragment_tolerance);
            if result.score >= config.library_score_cutoff
                && result.matched_peaks >= config.library_min_matched_peaks
            {
                Some(CosineHit {
                    name: entry.name.clone(),
                    smiles: entry.smiles.clone(),
                    inchi: entry.inchi.clone(),
                    score: round_decimals(result.score, 2),
                    matched_peaks: result.matched_peaks,
                })
            } else {
                None
            }
        })
        .collect();
    hits.sort_by(|a, b| b.score.total_cmp(&a.score));
    hits
}
