use std::fmt;

use serde::{Deserialize, Serialize};

use crate::chemistry::constants::{
    MASS_AMMONIUM, MASS_C13_C12_DELTA, MASS_IRON_56, MASS_POTASSIUM_MINUS_PROTON, MASS_PROTON,
    MASS_SODIUM, MASS_WATER, PPM,
};

/// calculate the relative mass deviation in ppm between an expected and an observed mass
///
/// Arguments:
///
/// * `expected` - calculated mass of the hypothesis ion
/// * `observed` - measured mass to compare against
///
/// Returns:
///
/// * `deviation` - absolute deviation in parts per million
///
/// # Examples
///
/// ```
/// use metscore::chemistry::adducts::ppm_mass_deviation;
///
/// let deviation = ppm_mass_deviation(415.2098, 415.2098);
/// assert_eq!(deviation, 0.0);
/// ```
#[inline]
pub fn ppm_mass_deviation(expected: f64, observed: f64) -> f64 {
    (((expected - observed) / observed) * PPM).abs()
}

/// Ion identities that can explain a co-eluting peak as a satellite of a
/// [M+H]+ reference ion. `Isotopic(n)` covers [M+n+H]+ for 13C substitutions,
/// `DoublyChargedIsotopic(n)` the corresponding [M+n+2H]2+ series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdductKind {
    Sodium,
    SodiumDimer,
    TriplyProtonatedTrimer,
    Isotopic(u8),
    DoublyChargedIsotopic(u8),
    DoublyChargedFirstIsotopic,
    Iron,
    DoublyChargedDimer,
    Ammonium,
    Potassium,
    WaterAddition,
    WaterLoss,
}

/// Catalog of ion identities, tried in order. The first entry that explains a
/// peak pair wins, so the frequent identities come first.
pub const ADDUCT_CATALOG: [AdductKind; 20] = [
    AdductKind::Sodium,
    AdductKind::SodiumDimer,
    AdductKind::TriplyProtonatedTrimer,
    AdductKind::Isotopic(1),
    AdductKind::Isotopic(2),
    AdductKind::Isotopic(3),
    AdductKind::Isotopic(4),
    AdductKind::Isotopic(5),
    AdductKind::DoublyChargedIsotopic(1),
    AdductKind::DoublyChargedIsotopic(2),
    AdductKind::DoublyChargedIsotopic(3),
    AdductKind::DoublyChargedIsotopic(4),
    AdductKind::DoublyChargedIsotopic(5),
    AdductKind::DoublyChargedFirstIsotopic,
    AdductKind::Iron,
    AdductKind::DoublyChargedDimer,
    AdductKind::Ammonium,
    AdductKind::Potassium,
    AdductKind::WaterAddition,
    AdductKind::WaterLoss,
];

impl AdductKind {
    /// calculate the m/z at which the satellite ion is expected
    ///
    /// Arguments:
    ///
    /// * `mh_ion_mz` - m/z of the peak assumed to be the [M+H]+ reference
    ///
    /// Returns:
    ///
    /// * `mz` - expected m/z of the satellite ion
    ///
    /// # Examples
    ///
    /// ```
    /// use metscore::chemistry::adducts::AdductKind;
    ///
    /// let mz = AdductKind::Sodium.expected_partner_mz(415.2098);
    /// assert!((mz - 437.191742).abs() < 1e-9);
    /// ```
    pub fn expected_partner_mz(&self, mh_ion_mz: f64) -> f64 {
        match self {
            AdductKind::Sodium => mh_ion_mz - MASS_PROTON + MASS_SODIUM,
            AdductKind::SodiumDimer => 2.0 * (mh_ion_mz - MASS_PROTON) + MASS_SODIUM,
            AdductKind::TriplyProtonatedTrimer => (mh_ion_mz + 2.0 * MASS_PROTON) / 3.0,
            AdductKind::Isotopic(n) => mh_ion_mz + *n as f64 * MASS_C13_C12_DELTA,
            AdductKind::DoublyChargedIsotopic(n) => {
                (mh_ion_mz + (*n as f64 * MASS_C13_C12_DELTA + MASS_PROTON)) / 2.0
            }
            AdductKind::DoublyChargedFirstIsotopic => mh_ion_mz + MASS_C13_C12_DELTA / 2.0,
            AdductKind::Iron => mh_ion_mz - 3.0 * MASS_PROTON + MASS_IRON_56,
            AdductKind::DoublyChargedDimer => (mh_ion_mz + MASS_PROTON) / 2.0,
            AdductKind::Ammonium => mh_ion_mz + MASS_AMMONIUM,
            AdductKind::Potassium => mh_ion_mz + MASS_POTASSIUM_MINUS_PROTON,
            AdductKind::WaterAddition => mh_ion_mz + MASS_WATER,
            AdductKind::WaterLoss => mh_ion_mz - MASS_WATER,
        }
    }

    /// true if `candidate_mz` lies within `max_ppm` (strict) of the satellite
    /// expected for a reference at `mh_ion_mz`
    pub fn matches(&self, mh_ion_mz: f64, candidate_mz: f64, max_ppm: f64) -> bool {
        ppm_mass_deviation(self.expected_partner_mz(mh_ion_mz), candidate_mz) < max_ppm
    }

    /// label of the satellite ion
    pub fn satellite_label(&self) -> String {
        match self {
            AdductKind::Sodium => "[M+Na]+".to_string(),
            AdductKind::SodiumDimer => "[2M+Na]+".to_string(),
            AdductKind::TriplyProtonatedTrimer => "[M+3H]3+".to_string(),
            AdductKind::Isotopic(n) => format!("[M+{}+H]+", n),
            AdductKind::DoublyChargedIsotopic(n) => format!("[M+{}+2H]2+", n),
            AdductKind::DoublyChargedFirstIsotopic => {
                "+1 isotopic peak of [M+2H]2+".to_string()
            }
            AdductKind::Iron => "[M+56Fe-2H]+".to_string(),
            AdductKind::DoublyChargedDimer => "[M+2H]2+".to_string(),
            AdductKind::Ammonium => "[M+NH4]+".to_string(),
            AdductKind::Potassium => "[M+K]+".to_string(),
            AdductKind::WaterAddition => "[M+H2O+H]+".to_string(),
            AdductKind::WaterLoss => "[M-H2O+H]+".to_string(),
        }
    }
}

/// Outcome of matching a co-eluting peak pair against the catalog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdductMatch {
    pub kind: AdductKind,
    pub first_is_reference: bool, // true when the first m/z acts as the [M+H]+ reference
}

/// match a pair of co-eluting precursor m/z values against the adduct catalog
///
/// Arguments:
///
/// * `mz_a` - precursor m/z of the first peak
/// * `mz_b` - precursor m/z of the second peak
/// * `max_ppm` - mass deviation tolerance in ppm
///
/// Returns:
///
/// * `Option<AdductMatch>` - first catalog entry explaining the pair, trying
///   each entry with both peaks in the reference role, or None
pub fn match_pair(mz_a: f64, mz_b: f64, max_ppm: f64) -> Option<AdductMatch> {
    for kind in ADDUCT_CATALOG {
        if kind.matches(mz_a, mz_b, max_ppm) {
            return Some(AdductMatch {
                kind,
                first_is_reference: true,
            });
        }
        if kind.matches(mz_b, mz_a, max_ppm) {
            return Some(AdductMatch {
                kind,
                first_is_reference: false,
            });
        }
    }
    None
}

/// Role a peak played in a detected adduct/isotope relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdductRole {
    MhReference,
    Satellite,
}

/// Putative adduct/isotope annotation attached to a peak and its feature.
/// Rendered via Display; the doubly charged dimer is ambiguous without
/// isotope data, so reference and satellite carry the two complementary
/// labels [2M+H]+ and [M+2H]2+.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdductAnnotation {
    pub kind: AdductKind,
    pub partner_id: u64, // feature id of the other peak in the pair
    pub sample: String,
    pub role: AdductRole,
}

impl fmt::Display for AdductAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, self.role) {
            (AdductKind::DoublyChargedDimer, AdductRole::MhReference) => {
                write!(f, "[2M+H]+ (ID {}, {})", self.partner_id, self.sample)
            }
            (AdductKind::DoublyChargedDimer, AdductRole::Satellite) => {
                write!(f, "[M+2H]2+ (ID {}, {})", self.partner_id, self.sample)
            }
            (kind, AdductRole::MhReference) => write!(
                f,
                "ID {}: {} ({})",
                self.partner_id,
                kind.satellite_label(),
                self.sample
            ),
            (kind, AdductRole::Satellite) => write!(
                f,
                "{} (ID {}, {})",
                kind.satellite_label(),
                self.partner_id,
                self.sample
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 20.0;

    #[test]
    fn mass_deviation_of_identical_masses_is_zero() {
        assert_eq!(ppm_mass_deviation(415.2098, 415.2098), 0.0);
    }

    #[test]
    fn sodium_adduct_matches_within_tolerance() {
        assert!(AdductKind::Sodium.matches(415.2098, 437.1912, TOL));
        assert!(!AdductKind::Sodium.matches(415.2098, 415.2098, TOL));
    }

    #[test]
    fn sodium_dimer_matches_within_tolerance() {
        assert!(AdductKind::SodiumDimer.matches(415.2098, 851.39427, TOL));
        assert!(!AdductKind::SodiumDimer.matches(415.2098, 437.1912, TOL));
    }

    #[test]
    fn triply_protonated_trimer_matches_within_tolerance() {
        assert!(AdductKind::TriplyProtonatedTrimer.matches(1510.4198, 504.1447, TOL));
    }

    #[test]
    fn singly_charged_isotopic_series_matches_within_tolerance() {
        // 13C isotopologues of a peak at 1648.4547
        assert!(AdductKind::Isotopic(1).matches(1648.4547, 1649.4578, TOL));
        assert!(AdductKind::Isotopic(2).matches(1648.4547, 1650.4653, TOL));
        assert!(AdductKind::Isotopic(3).matches(1648.4547, 1651.4547, TOL));
        assert!(AdductKind::Isotopic(4).matches(1648.4547, 1652.4539, TOL));
        assert!(AdductKind::Isotopic(5).matches(1648.4547, 1653.4754, TOL));
        assert!(!AdductKind::Isotopic(1).matches(1648.4547, 1650.4653, TOL));
    }

    #[test]
    fn doubly_charged_isotopic_series_matches_within_tolerance() {
        assert!(AdductKind::DoublyChargedIsotopic(1).matches(1648.4547, 825.2326, TOL));
        assert!(AdductKind::DoublyChargedIsotopic(2).matches(1648.4547, 825.7343, TOL));
        assert!(AdductKind::DoublyChargedIsotopic(3).matches(1648.4547, 826.2360, TOL));
        assert!(AdductKind::DoublyChargedIsotopic(4).matches(1648.4547, 826.7377, TOL));
        assert!(AdductKind::DoublyChargedIsotopic(5).matches(1648.4547, 827.2393, TOL));
    }

    #[test]
    fn first_isotopic_peak_of_doubly_charged_ion_matches() {
        assert!(AdductKind::DoublyChargedFirstIsotopic.matches(790.2263, 790.7269, TOL));
    }

    #[test]
    fn iron_adduct_matches_within_tolerance() {
        assert!(AdductKind::Iron.matches(843.4772, 896.3883, TOL));
    }

    #[test]
    fn doubly_charged_dimer_matches_within_tolerance() {
        assert!(AdductKind::DoublyChargedDimer.matches(1510.4198, 755.7153, TOL));
    }

    #[test]
    fn extended_adducts_match_within_tolerance() {
        assert!(AdductKind::Ammonium.matches(409.29477, 426.321, TOL));
        assert!(AdductKind::Potassium.matches(409.29477, 447.251, TOL));
        assert!(AdductKind::WaterAddition.matches(409.29477, 427.30588, TOL));
        assert!(AdductKind::WaterLoss.matches(409.29477, 391.284, TOL));
    }

    #[test]
    fn match_pair_reports_reference_orientation() {
        // sodium satellite listed second, reference first
        let hit = match_pair(415.2098, 437.1912, TOL).unwrap();
        assert_eq!(hit.kind, AdductKind::Sodium);
        assert!(hit.first_is_reference);

        // swapped order flips the orientation flag
        let hit = match_pair(437.1912, 415.2098, TOL).unwrap();
        assert_eq!(hit.kind, AdductKind::Sodium);
        assert!(!hit.first_is_reference);
    }

    #[test]
    fn match_pair_returns_none_for_unrelated_masses() {
        assert!(match_pair(1648.4547, 1510.4198, TOL).is_none());
    }

    #[test]
    fn annotation_rendering_follows_pair_roles() {
        let reference = AdductAnnotation {
            kind: AdductKind::Sodium,
            partner_id: 7,
            sample: "sampleA".to_string(),
            role: AdductRole::MhReference,
        };
        let satellite = AdductAnnotation {
            kind: AdductKind::Sodium,
            partner_id: 3,
            sample: "sampleA".to_string(),
            role: AdductRole::Satellite,
        };
        assert_eq!(reference.to_string(), "ID 7: [M+Na]+ (sampleA)");
        assert_eq!(satellite.to_string(), "[M+Na]+ (ID 3, sampleA)");
    }

    #[test]
    fn dimer_annotation_carries_both_complementary_labels() {
        let reference = AdductAnnotation {
            kind: AdductKind::DoublyChargedDimer,
            partner_id: 12,
            sample: "sampleB".to_string(),
            role: AdductRole::MhReference,
        };
        let satellite = AdductAnnotation {
            kind: AdductKind::DoublyChargedDimer,
            partner_id: 4,
            sample: "sampleB".to_string(),
            role: AdductRole::Satellite,
        };
        assert_eq!(reference.to_string(), "[2M+H]+ (ID 12, sampleB)");
        assert_eq!(satellite.to_string(), "[M+2H]2+ (ID 4, sampleB)");
    }
}
