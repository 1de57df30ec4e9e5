use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, OrderStatistics};

use crate::chemistry::adducts::AdductAnnotation;
use crate::data::spectrum::Ms2Spectrum;

/// Library annotation produced by modified cosine matching against a
/// spectral reference library.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CosineHit {
    pub name: String,
    pub smiles: String,
    pub inchi: String,
    pub score: f64, // rounded to 2 decimals
    pub matched_peaks: usize,
}

/// Annotation of a feature by an external MS2 annotation tool, consumed as a
/// side table. `score` is the tool's confidence for the proposed compound.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExternalAnnotation {
    pub score: f64,
    pub compound_name: String,
    pub npc_superclass: String,
    pub cf_superclass: String,
    pub inchikey: String,
}

/// One detection of a feature in one sample, used to assemble a record.
#[derive(Clone, Debug)]
pub struct SampleDetection {
    pub sample: String,
    pub intensity: f64,
    pub fwhm: f64,
    pub retention_time: f64,
}

/// Represents one molecular feature across the whole run. Presence-aligned
/// vectors are ordered by descending intensity; annotation fields start at
/// their neutral values and are filled in by the pipeline stages.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub feature_id: u64,
    pub precursor_mz: f64,
    pub average_retention_time: f64,
    pub presence_samples: Vec<String>, // samples by descending intensity
    pub intensities_samples: Vec<f64>, // aligned to presence_samples
    pub rt_in_samples: BTreeMap<String, f64>,
    pub fwhm_samples: BTreeMap<String, f64>,
    pub median_fwhm: f64, // rounded to 2 decimals
    pub max_intensity: f64,
    pub ms2_spectrum: Option<Ms2Spectrum>,
    pub ms1_only: bool,
    pub blank_associated: bool,
    pub bioactivity_associated: bool,
    pub bioactivity_trend: bool,
    pub bioactivity_samples: Vec<f64>, // aligned to presence_samples once associated
    pub in_clique: bool,
    pub clique_id: Option<u64>,
    pub cosine_annotation: bool,
    pub cosine_annotations: Vec<CosineHit>,
    pub external_annotation: Option<ExternalAnnotation>,
    pub novelty_score: Option<f64>, // rounded to 3 decimals once fused
    pub groups: BTreeSet<String>,
    pub clique_groups: BTreeSet<String>, // union of groups over clique members
    pub fold_differences: Option<BTreeMap<String, f64>>, // "groupA/groupB" -> rounded ratio
    pub fold_difference_order: Vec<String>, // keys by descending ratio
    pub adduct_annotations: Vec<AdductAnnotation>,
}

impl FeatureRecord {
    /// Assembles a record from the per-sample detections of one feature.
    ///
    /// Detections are sorted by descending intensity before the aligned
    /// vectors are built, so `intensities_samples` is non-increasing and
    /// `max_intensity` equals its first element. The median FWHM is rounded
    /// to 2 decimals. Group and fold-difference fields are attached later by
    /// the aggregation stage.
    pub fn from_detections(
        feature_id: u64,
        precursor_mz: f64,
        average_retention_time: f64,
        mut detections: Vec<SampleDetection>,
        ms2_spectrum: Option<Ms2Spectrum>,
    ) -> Self {
        detections.sort_by(|a, b| b.intensity.total_cmp(&a.intensity));

        let presence_samples: Vec<String> =
            detections.iter().map(|d| d.sample.clone()).collect();
        let intensities_samples: Vec<f64> = detections.iter().map(|d| d.intensity).collect();
        let rt_in_samples: BTreeMap<String, f64> = detections
            .iter()
            .map(|d| (d.sample.clone(), d.retention_time))
            .collect();
        let fwhm_samples: BTreeMap<String, f64> = detections
            .iter()
            .map(|d| (d.sample.clone(), d.fwhm))
            .collect();

        let median_fwhm = if detections.is_empty() {
            0.0
        } else {
            let mut fwhm_data =
                Data::new(detections.iter().map(|d| d.fwhm).collect::<Vec<f64>>());
            (fwhm_data.median() * 100.0).round() / 100.0
        };

        let max_intensity = intensities_samples.first().copied().unwrap_or(0.0);
        let ms1_only = ms2_spectrum.is_none();

        FeatureRecord {
            feature_id,
            precursor_mz,
            average_retention_time,
            presence_samples,
            intensities_samples,
            rt_in_samples,
            fwhm_samples,
            median_fwhm,
            max_intensity,
            ms2_spectrum,
            ms1_only,
            blank_associated: false,
            bioactivity_associated: false,
            bioactivity_trend: false,
            bioactivity_samples: Vec::new(),
            in_clique: false,
            clique_id: None,
            cosine_annotation: false,
            cosine_annotations: Vec::new(),
            external_annotation: None,
            novelty_score: None,
            groups: BTreeSet::new(),
            clique_groups: BTreeSet::new(),
            fold_differences: None,
            fold_difference_order: Vec::new(),
            adduct_annotations: Vec::new(),
        }
    }

    /// best library score, None without cosine annotations
    pub fn best_cosine_score(&self) -> Option<f64> {
        self.cosine_annotations.first().map(|hit| hit.score)
    }

    /// external annotation confidence, None without an annotation
    pub fn external_score(&self) -> Option<f64> {
        self.external_annotation.as_ref().map(|a| a.score)
    }
}
