use std::collections::BTreeMap;
use std::error::Error;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;

use metscore::data::stats::round_decimals;

#[derive(Debug, Deserialize)]
struct BioactivityRow {
    sample_name: String,
    quant_data: f64,
}

/// How the quantitative values in the bioactivity table are to be read.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum BioactivityFormat {
    /// concentration values, a lower concentration means a stronger activity
    Concentration,
    /// percentage values, a higher percentage means a stronger activity
    #[default]
    Percentage,
}

/// read a bioactivity CSV (`sample_name`, `quant_data`) from disk
pub fn read_bioactivity<P: AsRef<Path>>(
    path: P,
    format: BioactivityFormat,
) -> Result<BTreeMap<String, f64>, Box<dyn Error>> {
    let file = File::open(path)?;
    parse_bioactivity(BufReader::new(file), format)
}

/// parse bioactivity rows and scale the values onto `[0.1, 1.0]`
///
/// The table lists the active samples with their measured values.
/// Concentration values are inverted before scaling so the lowest active
/// concentration maps to the strongest score; percentage values scale
/// directly. All-equal inputs map to 1 for every sample, 0 stays reserved
/// for inactive samples. Malformed rows, and non-positive concentrations,
/// are dropped.
///
/// Arguments:
///
/// * `reader` - CSV input with a header row
/// * `format` - how to interpret the `quant_data` column
///
/// Returns:
///
/// * `BTreeMap<String, f64>` - scaled activity per sample, rounded to 2 decimals
pub fn parse_bioactivity<R: Read>(
    reader: R,
    format: BioactivityFormat,
) -> Result<BTreeMap<String, f64>, Box<dyn Error>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut raw: Vec<(String, f64)> = Vec::new();

    for result in csv_reader.deserialize() {
        let row: BioactivityRow = match result {
            Ok(row) => row,
            Err(_) => continue,
        };
        if format == BioactivityFormat::Concentration && row.quant_data <= 0.0 {
            continue;
        }
        raw.push((row.sample_name, row.quant_data));
    }

    Ok(scale_values(raw, format))
}

fn scale_values(raw: Vec<(String, f64)>, format: BioactivityFormat) -> BTreeMap<String, f64> {
    let Some(first) = raw.first().map(|(_, value)| *value) else {
        return BTreeMap::new();
    };
    if raw.iter().all(|(_, value)| *value == first) {
        return raw.into_iter().map(|(sample, _)| (sample, 1.0)).collect();
    }

    let transformed: Vec<(String, f64)> = raw
        .into_iter()
        .map(|(sample, value)| {
            let value = match format {
                BioactivityFormat::Concentration => 1.0 / value,
                BioactivityFormat::Percentage => value,
            };
            (sample, value)
        })
        .collect();

    let min = transformed
        .iter()
        .map(|(_, value)| *value)
        .fold(f64::INFINITY, f64::min);
    let max = transformed
        .iter()
        .map(|(_, value)| *value)
        .fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    transformed
        .into_iter()
        .map(|(sample, value)| {
            let scaled = (value - min) / span * 0.9 + 0.1;
            (sample, round_decimals(scaled, 2))
        })
        .collect()
}
