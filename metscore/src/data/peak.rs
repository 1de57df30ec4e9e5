use serde::{Deserialize, Serialize};

use crate::chemistry::adducts::AdductAnnotation;

/// One detected peak of a feature in one sample. Position and intensity come
/// from the per-sample columns of the raw peak matrix; the collision and
/// score fields start empty and are filled in by the downstream stages.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PeakObservation {
    pub feature_id: u64,
    pub precursor_mz: f64,
    pub retention_time: f64, // apex position
    pub fwhm: f64,
    pub intensity: f64,   // intensity range maximum in this sample
    pub rt_start: f64,    // left border of the peak span
    pub rt_stop: f64,     // right border of the peak span
    pub norm_intensity: f64, // min-max scaled within the sample
    pub collision: bool,
    pub collision_ids: Vec<u64>, // feature ids colliding with this peak, same sample only
    pub adduct_annotations: Vec<AdductAnnotation>,
    pub rel_intensity_score: f64,
    pub convolutedness_score: f64,
    pub bioactivity_score: f64,
    pub novelty_score: f64,
    pub in_blank: bool,
    pub ms1_only: bool,
}

impl PeakObservation {
    /// Constructs a peak from its matrix columns; collision bookkeeping and
    /// scores start at their neutral values.
    pub fn new(
        feature_id: u64,
        precursor_mz: f64,
        retention_time: f64,
        fwhm: f64,
        intensity: f64,
        rt_start: f64,
        rt_stop: f64,
        norm_intensity: f64,
    ) -> Self {
        PeakObservation {
            feature_id,
            precursor_mz,
            retention_time,
            fwhm,
            intensity,
            rt_start,
            rt_stop,
            norm_intensity,
            collision: false,
            collision_ids: Vec::new(),
            adduct_annotations: Vec::new(),
            rel_intensity_score: 0.0,
            convolutedness_score: 0.0,
            bioactivity_score: 0.0,
            novelty_score: 0.0,
            in_blank: false,
            ms1_only: false,
        }
    }

    /// true if the retention time spans of two peaks overlap, touching borders
    /// count as an overlap
    #[inline]
    pub fn span_overlaps(&self, other: &PeakObservation) -> bool {
        !(self.rt_stop < other.rt_start || other.rt_stop < self.rt_start)
    }
}
