use crate::chemistry::adducts::{match_pair, AdductAnnotation, AdductRole};
use crate::data::peak::PeakObservation;

/// resolve retention time overlaps between the peaks of one sample
///
/// Every peak pair with overlapping spans is first tried against the adduct
/// catalog. A matching pair is annotated on both peaks and not treated as a
/// collision, there is only one plausible ion identity per pair. Pairs
/// without an ion relationship are marked as colliding and remember each
/// other's feature id.
///
/// Arguments:
///
/// * `sample` - name of the sample the peaks belong to
/// * `peaks` - peak table of the sample, mutated in place
/// * `max_ppm` - mass deviation tolerance for the catalog in ppm
///
/// Returns:
///
/// * `Vec<(u64, AdductAnnotation)>` - annotations to append to the
///   feature records, keyed by feature id
pub fn resolve_overlaps(
    sample: &str,
    peaks: &mut [PeakObservation],
    max_ppm: f64,
) -> Vec<(u64, AdductAnnotation)> {
    let mut record_annotations: Vec<(u64, AdductAnnotation)> = Vec::new();

    for a in 0..peaks.len() {
        for b in (a + 1)..peaks.len() {
            if !peaks[a].span_overlaps(&peaks[b]) {
                continue;
            }

            match match_pair(peaks[a].precursor_mz, peaks[b].precursor_mz, max_ppm) {
                Some(hit) => {
                    let (reference, satellite) = if hit.first_is_reference {
                        (a, b)
                    } else {
                        (b, a)
                    };
                    let reference_annotation = AdductAnnotation {
                        kind: hit.kind,
                        partner_id: peaks[satellite].feature_id,
                        sample: sample.to_string(),
                        role: AdductRole::MhReference,
                    };
                    let satellite_annotation = AdductAnnotation {
                        kind: hit.kind,
                        partner_id: peaks[reference].feature_id,
                        sample: sample.to_string(),
                        role: AdductRole::Satellite,
                    };

                    record_annotations
                        .push((peaks[reference].feature_id, reference_annotation.clone()));
                    record_annotations
                        .push((peaks[satellite].feature_id, satellite_annotation.clone()));

                    peaks[reference].adduct_annotations.push(reference_annotation);
                    peaks[satellite].adduct_annotations.push(satellite_annotation);
                }
                None => {
                    let id_a = peaks[a].feature_id;
                    let id_b = peaks[b].feature_id;
                    peaks[a].collision = true;
                    peaks[b].collision = true;
                    peaks[a].collision_ids.push(id_b);
                    peaks[b].collision_ids.push(id_a);
                }
            }
        }
    }

    record_annotations
}

/// calculate how much of a peak is affected by its collisions
///
/// The colliding peaks are classified against the original span into left,
/// right, middle and covering overlaps. Left and right overlaps shrink the
/// span from their side, middle overlaps reduce the remainder by their
/// consensus envelope, a covering overlap removes the peak entirely. The
/// score is the removed fraction of the original span.
///
/// Arguments:
///
/// * `peak` - the peak under investigation
/// * `peaks` - all peaks of the same sample, used to look up colliders
///
/// Returns:
///
/// * `score` - fraction of the span lost to collisions, 0 for a peak
///   without collisions or with an empty span
pub fn convolutedness(peak: &PeakObservation, peaks: &[PeakObservation]) -> f64 {
    let full_span = peak.rt_stop - peak.rt_start;
    let mut a_start = peak.rt_start;
    let mut a_stop = peak.rt_stop;
    let mut remainder = full_span;

    if peak.collision {
        let mut left_stops: Vec<f64> = Vec::new();
        let mut right_starts: Vec<f64> = Vec::new();
        let mut middle_starts: Vec<f64> = Vec::new();
        let mut middle_stops: Vec<f64> = Vec::new();
        let mut covered = false;

        for collider_id in &peak.collision_ids {
            let other = match peaks.iter().find(|p| p.feature_id == *collider_id) {
                Some(other) => other,
                None => continue,
            };
            let x_start = other.rt_start;
            let x_stop = other.rt_stop;

            // classification against the original span
            if peak.rt_start >= x_start && peak.rt_stop > x_stop {
                left_stops.push(x_stop);
            }
            if peak.rt_start < x_start && peak.rt_stop <= x_stop {
                right_starts.push(x_start);
            }
            if peak.rt_start < x_start && peak.rt_stop > x_stop {
                middle_starts.push(x_start);
                middle_stops.push(x_stop);
            }
            if peak.rt_start >= x_start && peak.rt_stop <= x_stop {
                covered = true;
            }
        }

        if let Some(max_left) = fold_max(&left_stops) {
            a_start = max_left;
        }
        if let Some(min_right) = fold_min(&right_starts) {
            a_stop = min_right;
        }
        if a_start >= a_stop {
            remainder = 0.0;
        } else {
            remainder = a_stop - a_start;
        }

        if let (Some(min_middle), Some(max_middle)) =
            (fold_min(&middle_starts), fold_max(&middle_stops))
        {
            if min_middle <= a_start && max_middle >= a_stop {
                remainder = 0.0;
            } else if min_middle <= a_start && max_middle < a_stop {
                a_start = max_middle;
                remainder = a_stop - a_start;
            } else if min_middle > a_start && max_middle >= a_stop {
                a_stop = min_middle;
                remainder = a_stop - a_start;
            } else if min_middle > a_start && max_middle < a_stop {
                remainder -= max_middle - min_middle;
            }
        }

        if covered {
            remainder = 0.0;
        }
    }

    if full_span == 0.0 {
        return 0.0;
    }
    1.0 - remainder / full_span
}

fn fold_max(values: &[f64]) -> Option<f64> {
    values.iter().cloned().reduce(f64::max)
}

fn fold_min(values: &[f64]) -> Option<f64> {
    values.iter().cloned().reduce(f64::min)
}
