use std::collections::BTreeMap;
use std::error::Error;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;

use metscore::data::feature::ExternalAnnotation;

/// One result row of the external annotation tool, named after its CSV
/// output columns.
#[derive(Debug, Deserialize)]
struct AnnotationRow {
    feature_id: u64,
    ms2query_model_prediction: f64,
    analog_compound_name: String,
    npc_superclass_results: String,
    cf_superclass: String,
    inchikey: String,
}

/// read an external annotation CSV from disk
pub fn read_external_annotations<P: AsRef<Path>>(
    path: P,
) -> Result<BTreeMap<u64, ExternalAnnotation>, Box<dyn Error>> {
    let file = File::open(path)?;
    parse_external_annotations(BufReader::new(file))
}

/// parse external annotation rows into one annotation per feature id
///
/// Malformed rows are dropped; a feature id occurring twice keeps its last
/// row.
pub fn parse_external_annotations<R: Read>(
    reader: R,
) -> Result<BTreeMap<u64, ExternalAnnotation>, Box<dyn Error>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut annotations: BTreeMap<u64, ExternalAnnotation> = BTreeMap::new();

    for result in csv_reader.deserialize() {
        let row: AnnotationRow = match result {
            Ok(row) => row,
            Err(_) => continue,
        };
        annotations.insert(
            row.feature_id,
            ExternalAnnotation {
                score: row.ms2query_model_prediction,
                compound_name: row.analog_compound_name,
                npc_superclass: row.npc_superclass_results,
                cf_superclass: row.cf_superclass,
                inchikey: row.inchikey,
            },
        );
    }

    Ok(annotations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_become_annotations_keyed_by_feature() {
        let text = "\
feature_id,ms2query_model_prediction,analog_compound_name,npc_superclass_results,cf_superclass,inchikey
1,0.97,siomycin,Oligopeptides,Organic acids,ABCDEFGHIJKLMN-UHFFFAOYSA-N
4,0.55,unknown analog,Terpenoids,Lipids,OPQRSTUVWXYZAB-UHFFFAOYSA-N
";
        let annotations = parse_external_annotations(text.as_bytes()).unwrap();
        assert_eq!(annotations.len(), 2);
        assert!((annotations[&1].score - 0.97).abs() < 1e-9);
        assert_eq!(annotations[&1].compound_name, "siomycin");
        assert_eq!(annotations[&4].npc_superclass, "Terpenoids");
    }

    #[test]
    fn malformed_rows_are_dropped() {
        let text = "\
feature_id,ms2query_model_prediction,analog_compound_name,npc_superclass_results,cf_superclass,inchikey
1,0.97,siomycin,Oligopeptides,Organic acids,KEY
x,0.55,broken,Terpenoids,Lipids,KEY
";
        let annotations = parse_external_annotations(text.as_bytes()).unwrap();
        assert_eq!(annotations.len(), 1);
    }
}
