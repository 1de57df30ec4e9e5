use std::collections::{BTreeMap, BTreeSet};

use crate::data::clique::SimilarityClique;
use crate::data::feature::FeatureRecord;

/// Scores above this threshold count as a confident annotation.
pub const ANNOTATION_THRESHOLD: f64 = 0.95;

/// calculate the novelty score of a feature from its annotation evidence
///
/// All scores are inverted, a good annotation means a low novelty score. With
/// a confident library or external annotation the better of the two decides
/// the score directly. Below the confidence threshold, the available evidence
/// is averaged: library score, external score and the class diversity among
/// the feature's clique members. Without any evidence the feature is
/// maximally novel.
///
/// Arguments:
///
/// * `record` - the feature under investigation
/// * `records` - all feature records, used to look up clique member annotations
/// * `cliques` - the similarity clique store
///
/// Returns:
///
/// * `score` - novelty in [0, 1], 1 meaning no annotation evidence
pub fn novelty_score(
    record: &FeatureRecord,
    records: &BTreeMap<u64, FeatureRecord>,
    cliques: &BTreeMap<u64, SimilarityClique>,
) -> f64 {
    let cosine_score = if record.cosine_annotation {
        record.best_cosine_score()
    } else {
        None
    };
    let external_score = record.external_score();

    if cosine_score.is_none() && external_score.is_none() {
        return 1.0;
    }

    if let (Some(c), Some(m)) = (cosine_score, external_score) {
        if c > ANNOTATION_THRESHOLD && m > ANNOTATION_THRESHOLD {
            return 1.0 - c.max(m);
        }
    }
    if let Some(c) = cosine_score {
        if c > ANNOTATION_THRESHOLD {
            return 1.0 - c;
        }
    }
    if let Some(m) = external_score {
        if m > ANNOTATION_THRESHOLD {
            return 1.0 - m;
        }
    }

    let mut scores: Vec<f64> = Vec::new();
    if let Some(c) = cosine_score {
        scores.push(c);
    }
    if let Some(m) = external_score {
        scores.push(m);
    }
    if let Some(n) = neighbour_class_diversity(record, records, cliques) {
        scores.push(n);
    }

    if scores.is_empty() {
        return 1.0;
    }
    1.0 - scores.iter().sum::<f64>() / scores.len() as f64
}

/// Class diversity among the clique members of a feature. Related compounds
/// should share their predicted compound class, so many distinct classes
/// among the neighbours weaken the annotation evidence. Defined only for
/// externally annotated features in a clique with more than one member and
/// at least one annotated member.
fn neighbour_class_diversity(
    record: &FeatureRecord,
    records: &BTreeMap<u64, FeatureRecord>,
    cliques: &BTreeMap<u64, SimilarityClique>,
) -> Option<f64> {
    record.external_annotation.as_ref()?;
    let clique = cliques.get(&record.clique_id?)?;
    if clique.members.len() <= 1 {
        return None;
    }

    let mut npc_superclasses: BTreeSet<&str> = BTreeSet::new();
    let mut cf_superclasses: BTreeSet<&str> = BTreeSet::new();
    for member in &clique.members {
        if let Some(other) = records.get(member) {
            if let Some(annotation) = &other.external_annotation {
                npc_superclasses.insert(annotation.npc_superclass.as_str());
                cf_superclasses.insert(annotation.cf_superclass.as_str());
            }
        }
    }

    let class_count = npc_superclasses.len().min(cf_superclasses.len());
    if class_count == 0 {
        return None;
    }
    Some(1.0 / class_count as f64)
}
