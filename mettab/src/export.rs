use std::collections::BTreeMap;
use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::{Deserialize, Serialize};

use metscore::data::feature::FeatureRecord;
use metscore::data::peak::PeakObservation;
use metscore::pipeline::rollup::SampleOverviewRow;

/// One feature record flattened into a spreadsheet-friendly row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureRow {
    pub feature_id: u64,
    pub precursor_mz: f64,
    pub average_retention_time: f64,
    pub median_fwhm: f64,
    pub max_intensity: f64,
    pub sample_count: usize,
    /// presence samples by descending intensity, `;`-joined
    pub samples: String,
    pub groups: String,
    pub ms1_only: bool,
    pub blank_associated: bool,
    pub bioactivity_associated: bool,
    pub bioactivity_trend: bool,
    pub in_clique: bool,
    pub clique_id: Option<u64>,
    pub best_library_match: Option<String>,
    pub best_library_score: Option<f64>,
    pub external_compound: Option<String>,
    pub external_score: Option<f64>,
    pub novelty_score: Option<f64>,
    /// `group_a/group_b:ratio` pairs in descending ratio order, `;`-joined
    pub fold_differences: String,
    pub adducts: String,
}

impl From<&FeatureRecord> for FeatureRow {
    fn from(record: &FeatureRecord) -> Self {
        let best_hit = record.cosine_annotations.first();

        let fold_differences = match &record.fold_differences {
            Some(folds) => record
                .fold_difference_order
                .iter()
                .filter_map(|key| folds.get(key).map(|ratio| format!("{}:{}", key, ratio)))
                .collect::<Vec<String>>()
                .join(";"),
            None => String::new(),
        };

        let adducts = record
            .adduct_annotations
            .iter()
            .map(|annotation| annotation.to_string())
            .collect::<Vec<String>>()
            .join(";");

        FeatureRow {
            feature_id: record.feature_id,
            precursor_mz: record.precursor_mz,
            average_retention_time: record.average_retention_time,
            median_fwhm: record.median_fwhm,
            max_intensity: record.max_intensity,
            sample_count: record.presence_samples.len(),
            samples: record.presence_samples.join(";"),
            groups: record
                .groups
                .iter()
                .cloned()
                .collect::<Vec<String>>()
                .join(";"),
            ms1_only: record.ms1_only,
            blank_associated: record.blank_associated,
            bioactivity_associated: record.bioactivity_associated,
            bioactivity_trend: record.bioactivity_trend,
            in_clique: record.in_clique,
            clique_id: record.clique_id,
            best_library_match: best_hit.map(|hit| hit.name.clone()),
            best_library_score: best_hit.map(|hit| hit.score),
            external_compound: record
                .external_annotation
                .as_ref()
                .map(|annotation| annotation.compound_name.clone()),
            external_score: record.external_score(),
            novelty_score: record.novelty_score,
            fold_differences,
            adducts,
        }
    }
}

/// write the feature records as a flat CSV table
pub fn write_feature_table<P: AsRef<Path>>(
    path: P,
    records: &BTreeMap<u64, FeatureRecord>,
) -> Result<(), Box<dyn Error>> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records.values() {
        writer.serialize(FeatureRow::from(record))?;
    }
    writer.flush()?;
    Ok(())
}

/// write the per-sample overview rows as CSV
pub fn write_overview_table<P: AsRef<Path>>(
    path: P,
    rows: &[SampleOverviewRow],
) -> Result<(), Box<dyn Error>> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// write the full feature record map as JSON for the consuming layer
pub fn write_records_json<P: AsRef<Path>>(
    path: P,
    records: &BTreeMap<u64, FeatureRecord>,
) -> Result<(), Box<dyn Error>> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), records)?;
    Ok(())
}

/// write the scored per-sample peak tables as JSON
pub fn write_peak_tables_json<P: AsRef<Path>>(
    path: P,
    tables: &BTreeMap<String, Vec<PeakObservation>>,
) -> Result<(), Box<dyn Error>> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), tables)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use metscore::data::feature::{CosineHit, SampleDetection};

    fn record() -> FeatureRecord {
        let mut record = FeatureRecord::from_detections(
            5,
            824.7379,
            15.2,
            vec![
                SampleDetection {
                    sample: "s1".to_string(),
                    intensity: 48000.0,
                    fwhm: 0.32,
                    retention_time: 15.26,
                },
                SampleDetection {
                    sample: "s2".to_string(),
                    intensity: 16000.0,
                    fwhm: 0.2,
                    retention_time: 15.16,
                },
            ],
            None,
        );
        record.groups = ["treated", "control"]
            .iter()
            .map(|g| g.to_string())
            .collect();
        record.fold_differences = Some(BTreeMap::from([
            ("treated/control".to_string(), 3.0),
            ("control/treated".to_string(), 0.33),
        ]));
        record.fold_difference_order = vec![
            "treated/control".to_string(),
            "control/treated".to_string(),
        ];
        record.cosine_annotation = true;
        record.cosine_annotations = vec![CosineHit {
            name: "siomycin A".to_string(),
            smiles: "CC1=CC=CC=C1".to_string(),
            inchi: String::new(),
            score: 0.92,
            matched_peaks: 12,
        }];
        record.novelty_score = Some(0.08);
        record
    }

    #[test]
    fn records_flatten_into_rows() {
        let row = FeatureRow::from(&record());

        assert_eq!(row.feature_id, 5);
        assert_eq!(row.sample_count, 2);
        assert_eq!(row.samples, "s1;s2");
        assert_eq!(row.groups, "control;treated");
        assert_eq!(row.best_library_match.as_deref(), Some("siomycin A"));
        assert_eq!(row.best_library_score, Some(0.92));
        assert_eq!(row.fold_differences, "treated/control:3;control/treated:0.33");
        assert_eq!(row.novelty_score, Some(0.08));
        assert!(row.external_compound.is_none());
    }

    #[test]
    fn rows_serialize_to_csv() {
        let mut writer = csv::Writer::from_writer(vec![]);
        writer.serialize(FeatureRow::from(&record())).unwrap();
        let bytes = writer.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();

        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("feature_id,precursor_mz"));
        let data = lines.next().unwrap();
        assert!(data.starts_with("5,824.7379,15.2,"));
        assert!(data.contains("s1;s2"));
    }
}
