use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Detection state marker used by the per-sample state columns.
pub const STATE_DETECTED: &str = "DETECTED";

/// Per-sample cells of one matrix row. Cells are null when the feature was
/// not picked in that sample.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SampleCells {
    pub feature_state: Option<String>,
    pub fwhm: Option<f64>,
    pub rt: Option<f64>, // apex retention time
    pub intensity_max: Option<f64>,
    pub rt_min: Option<f64>, // left border of the peak span
    pub rt_max: Option<f64>, // right border of the peak span
}

impl SampleCells {
    /// true if every numeric cell is present, so a peak row can be built
    pub fn is_complete(&self) -> bool {
        self.fwhm.is_some()
            && self.rt.is_some()
            && self.intensity_max.is_some()
            && self.rt_min.is_some()
            && self.rt_max.is_some()
    }

    /// true if the picking state marks the feature as detected here
    pub fn is_detected(&self) -> bool {
        self.feature_state.as_deref() == Some(STATE_DETECTED)
    }
}

/// One row of the wide peak matrix, keyed by feature.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatrixRow {
    pub feature_id: u64,
    pub precursor_mz: f64,
    pub retention_time: f64, // average retention time over samples
    pub cells: BTreeMap<String, SampleCells>,
}

impl MatrixRow {
    pub fn cells_for(&self, sample: &str) -> Option<&SampleCells> {
        self.cells.get(sample)
    }
}

/// The wide peak matrix: one row per feature, one cell group per sample.
/// `samples` preserves the first-appearance order of the source columns.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PeakMatrix {
    pub samples: Vec<String>,
    pub rows: Vec<MatrixRow>,
}

impl PeakMatrix {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_cells_require_all_numeric_fields() {
        let mut cells = SampleCells {
            feature_state: Some(STATE_DETECTED.to_string()),
            fwhm: Some(0.2),
            rt: Some(12.5),
            intensity_max: Some(1e6),
            rt_min: Some(12.3),
            rt_max: Some(12.7),
        };
        assert!(cells.is_complete());
        assert!(cells.is_detected());

        cells.rt_min = None;
        assert!(!cells.is_complete());
    }

    #[test]
    fn non_detected_state_is_not_detected() {
        let cells = SampleCells {
            feature_state: Some("ESTIMATED".to_string()),
            ..SampleCells::default()
        };
        assert!(!cells.is_detected());
        assert!(!SampleCells::default().is_detected());
    }
}
