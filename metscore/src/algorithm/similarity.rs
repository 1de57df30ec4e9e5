use crate::data::spectrum::Ms2Spectrum;

/// Result of comparing two MS2 spectra.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchResult {
    pub score: f64,
    pub matched_peaks: usize,
}

/// compute the modified cosine similarity between two MS2 spectra
///
/// Fragment pairs qualify when their m/z values agree within the tolerance
/// either directly or after shifting the first spectrum by the precursor mass
/// difference. Qualifying pairs are ranked by intensity product and accepted
/// greedily so every fragment is used at most once; the accepted products are
/// normalized by the geometric mean of the two self-similarities.
///
/// Arguments:
///
/// * `query` - spectrum of the feature under investigation
/// * `reference` - spectrum to compare against
/// * `fragment_tolerance` - maximum m/z difference for two fragments to match
///
/// Returns:
///
/// * `MatchResult` - similarity score in [0, 1] and the number of matched
///   fragment pairs
pub fn modified_cosine(
    query: &Ms2Spectrum,
    reference: &Ms2Spectrum,
    fragment_tolerance: f64,
) -> MatchResult {
    let precursor_shift = reference.precursor_mz - query.precursor_mz;

    // qualifying pairs: (query index, reference index, intensity product)
    let mut pairs: Vec<(usize, usize, f64)> = Vec::new();
    collect_pairs(query, reference, fragment_tolerance, 0.0, &mut pairs);
    if precursor_shift != 0.0 {
        collect_pairs(query, reference, fragment_tolerance, precursor_shift, &mut pairs);
    }

    pairs.sort_by(|a, b| b.2.total_cmp(&a.2));

    let mut used_query = vec![false; query.len()];
    let mut used_reference = vec![false; reference.len()];
    let mut accepted_sum = 0.0;
    let mut matched_peaks = 0;

    for (qi, ri, product) in pairs {
        if !used_query[qi] && !used_reference[ri] {
            used_query[qi] = true;
            used_reference[ri] = true;
            accepted_sum += product;
            matched_peaks += 1;
        }
    }

    let norm_query: f64 = query.intensity.iter().map(|i| i * i).sum();
    let norm_reference: f64 = reference.intensity.iter().map(|i| i * i).sum();
    if norm_query == 0.0 || norm_reference == 0.0 {
        return MatchResult {
            score: 0.0,
            matched_peaks,
        };
    }

    MatchResult {
        score: accepted_sum / (norm_query.sqrt() * norm_reference.sqrt()),
        matched_peaks,
    }
}

fn collect_pairs(
    query: &Ms2Spectrum,
    reference: &Ms2Spectrum,
    fragment_tolerance: f64,
    shift: f64,
    pairs: &mut Vec<(usize, usize, f64)>,
) {
    for (qi, query_mz) in query.mz.iter().enumerate() {
        for (ri, reference_mz) in reference.mz.iter().enumerate() {
            if (query_mz + shift - reference_mz).abs() <= fragment_tolerance {
                pairs.push((qi, ri, query.intensity[qi] * reference.intensity[ri]));
            }
        }
    }
}
