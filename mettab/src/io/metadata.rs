use std::collections::BTreeMap;
use std::error::Error;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;

use metscore::data::stats::GROUP_GENERAL;

#[derive(Debug, Deserialize)]
struct MetadataRow {
    sample_name: String,
    attribute: Option<String>,
}

/// read a group metadata CSV (`sample_name`, `attribute`) from disk
pub fn read_group_metadata<P: AsRef<Path>>(
    path: P,
) -> Result<BTreeMap<String, String>, Box<dyn Error>> {
    let file = File::open(path)?;
    parse_group_metadata(BufReader::new(file))
}

/// parse group metadata rows into a sample to group assignment
///
/// Rows with an empty attribute fall into the reserved `GENERAL` group,
/// malformed rows are dropped.
pub fn parse_group_metadata<R: Read>(
    reader: R,
) -> Result<BTreeMap<String, String>, Box<dyn Error>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut assignments: BTreeMap<String, String> = BTreeMap::new();

    for result in csv_reader.deserialize() {
        let row: MetadataRow = match result {
            Ok(row) => row,
            Err(_) => continue,
        };
        let attribute = row
            .attribute
            .map(|attribute| attribute.trim().to_string())
            .filter(|attribute| !attribute.is_empty())
            .unwrap_or_else(|| GROUP_GENERAL.to_string());
        assignments.insert(row.sample_name, attribute);
    }

    Ok(assignments)
}
