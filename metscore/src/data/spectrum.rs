use serde::{Deserialize, Serialize};

/// Represents an MS2 fragmentation spectrum with associated m/z values and
/// intensities, tied to the precursor that was fragmented.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ms2Spectrum {
    pub mz: Vec<f64>,
    pub intensity: Vec<f64>,
    pub precursor_mz: f64,
}

impl Ms2Spectrum {
    /// Constructs a new `Ms2Spectrum`. Fragment pairs are sorted by m/z.
    ///
    /// # Arguments
    ///
    /// * `mz` - A vector of fragment m/z values.
    /// * `intensity` - A vector of intensity values corresponding to the m/z values.
    /// * `precursor_mz` - The m/z of the fragmented precursor ion.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use metscore::data::spectrum::Ms2Spectrum;
    /// let spectrum = Ms2Spectrum::new(vec![200.0, 100.0], vec![20.0, 10.0], 250.0);
    /// assert_eq!(spectrum.mz, vec![100.0, 200.0]);
    /// assert_eq!(spectrum.intensity, vec![10.0, 20.0]);
    /// ```
    pub fn new(mz: Vec<f64>, intensity: Vec<f64>, precursor_mz: f64) -> Self {
        let mut pairs: Vec<(f64, f64)> = mz.into_iter().zip(intensity).collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ms2Spectrum {
            mz: pairs.iter().map(|p| p.0).collect(),
            intensity: pairs.iter().map(|p| p.1).collect(),
            precursor_mz,
        }
    }

    /// Scales intensities so the most intense fragment is 1. An empty
    /// spectrum or an all-zero spectrum is returned unchanged.
    pub fn normalized(&self) -> Self {
        let max_intensity = self.intensity.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        if !max_intensity.is_finite() || max_intensity <= 0.0 {
            return self.clone();
        }
        Ms2Spectrum {
            mz: self.mz.clone(),
            intensity: self.intensity.iter().map(|i| i / max_intensity).collect(),
            precursor_mz: self.precursor_mz,
        }
    }

    /// Drops fragments with an intensity below `min_intensity`.
    pub fn filter_by_intensity(&self, min_intensity: f64) -> Self {
        let mut mz_vec: Vec<f64> = Vec::new();
        let mut intensity_vec: Vec<f64> = Vec::new();

        for (mz, intensity) in self.mz.iter().zip(self.intensity.iter()) {
            if *intensity >= min_intensity {
                mz_vec.push(*mz);
                intensity_vec.push(*intensity);
            }
        }
        Ms2Spectrum {
            mz: mz_vec,
            intensity: intensity_vec,
            precursor_mz: self.precursor_mz,
        }
    }

    pub fn len(&self) -> usize {
        self.mz.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mz.is_empty()
    }
}

/// One entry of a spectral reference library: an MS2 spectrum together with
/// the compound identity it was recorded for.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LibraryEntry {
    pub name: String,
    pub smiles: String,
    pub inchi: String,
    pub spectrum: Ms2Spectrum,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_sorts_fragments_by_mz() {
        let spectrum = Ms2Spectrum::new(
            vec![300.0, 100.0, 200.0],
            vec![3.0, 1.0, 2.0],
            400.0,
        );
        assert_eq!(spectrum.mz, vec![100.0, 200.0, 300.0]);
        assert_eq!(spectrum.intensity, vec![1.0, 2.0, 3.0]);
        assert_eq!(spectrum.precursor_mz, 400.0);
    }

    #[test]
    fn normalization_scales_to_unit_maximum() {
        let spectrum = Ms2Spectrum::new(vec![100.0, 200.0], vec![50.0, 200.0], 250.0);
        let normalized = spectrum.normalized();
        assert_eq!(normalized.intensity, vec![0.25, 1.0]);
    }

    #[test]
    fn normalization_leaves_empty_spectrum_unchanged() {
        let spectrum = Ms2Spectrum::new(vec![], vec![], 250.0);
        let normalized = spectrum.normalized();
        assert!(normalized.is_empty());
    }

    #[test]
    fn intensity_filter_drops_weak_fragments() {
        let spectrum = Ms2Spectrum::new(
            vec![100.0, 150.0, 200.0],
            vec![0.005, 0.01, 1.0],
            250.0,
        );
        let filtered = spectrum.filter_by_intensity(0.01);
        assert_eq!(filtered.mz, vec![150.0, 200.0]);
        assert_eq!(filtered.len(), 2);
    }
}
