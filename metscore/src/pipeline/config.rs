use serde::{Deserialize, Serialize};

/// Parameters steering a full annotation run.
///
/// Partial configuration files are fine, every missing field falls back to
/// its default.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PipelineConfig {
    // maximum mass deviation for ion identity matching, in ppm
    pub mass_deviation_ppm: f64,
    // minimum number of fragment peaks a spectrum must keep to count as MS2
    pub min_ms2_fragments: usize,
    // relative intensity range [lo, hi] for the pre-filter over per-sample tables
    pub relative_intensity_range: [f64; 2],
    // fold factor a feature must exceed over blanks to stay non-blank
    pub blank_factor: f64,
    // fold factor active-group intensity must exceed over inactive groups
    pub bioactivity_factor: f64,
    // fragment m/z tolerance for spectral library matching
    pub fragment_tolerance: f64,
    // minimum modified cosine score for a library hit
    pub library_score_cutoff: f64,
    // minimum number of matched fragment pairs for a library hit
    pub library_min_matched_peaks: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mass_deviation_ppm: 20.0,
            min_ms2_fragments: 8,
            relative_intensity_range: [0.0, 1.0],
            blank_factor: 10.0,
            bioactivity_factor: 10.0,
            fragment_tolerance: 0.1,
            library_score_cutoff: 0.8,
            library_min_matched_peaks: 8,
        }
    }
}

/// Bioactivity condition applied when selecting features per sample.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BioactivityFilter {
    // no bioactivity condition
    Off,
    // keep only bioactivity-associated features
    Specificity,
    // keep only bioactivity-associated features with a concentration trend
    SpecificityTrend,
}

/// Thresholds for the interactive per-sample feature selection.
///
/// Each range is inclusive on both ends. All defaults are wide open so a
/// fresh selection reproduces the unfiltered view.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SelectionThresholds {
    pub relative_intensity: [f64; 2],
    pub convolutedness: [f64; 2],
    pub novelty: [f64; 2],
    // treat members of blank-containing groups as blanks during selection
    pub designate_blank_groups: bool,
    pub bioactivity: BioactivityFilter,
}

impl Default for SelectionThresholds {
    fn default() -> Self {
        Self {
            relative_intensity: [0.0, 1.0],
            convolutedness: [0.0, 1.0],
            novelty: [0.0, 1.0],
            designate_blank_groups: false,
            bioactivity: BioactivityFilter::Off,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_values() {
        let config = PipelineConfig::default();
        assert_eq!(config.mass_deviation_ppm, 20.0);
        assert_eq!(config.min_ms2_fragments, 8);
        assert_eq!(config.relative_intensity_range, [0.0, 1.0]);
        assert_eq!(config.library_score_cutoff, 0.8);
        assert_eq!(config.library_min_matched_peaks, 8);
    }

    #[test]
    fn default_selection_is_wide_open() {
        let thresholds = SelectionThresholds::default();
        assert_eq!(thresholds.relative_intensity, [0.0, 1.0]);
        assert_eq!(thresholds.bioactivity, BioactivityFilter::Off);
        assert!(!thresholds.designate_blank_groups);
    }
}
