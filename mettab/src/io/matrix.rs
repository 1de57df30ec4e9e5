use std::collections::BTreeMap;
use std::error::Error;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord};
use regex::Regex;

use metscore::data::matrix::{MatrixRow, PeakMatrix, SampleCells};

/// Sample names are mined from the per-sample intensity columns.
const SAMPLE_COLUMN_PATTERN: &str = r"^datafile:(.+):intensity_range:max$";

/// read a wide peak matrix CSV from disk
pub fn read_peak_matrix<P: AsRef<Path>>(path: P) -> Result<PeakMatrix, Box<dyn Error>> {
    let file = File::open(path)?;
    parse_peak_matrix(BufReader::new(file))
}

/// parse a wide peak matrix from any reader
///
/// The matrix carries one row per feature with the shared columns
/// `feature_ID`, `precursor_mz` and `retention_time`, plus per-sample
/// columns following the `datafile:<sample>:<field>` convention. Sample
/// names are mined from the header in first-appearance order. Rows whose
/// shared columns do not parse are dropped, missing or empty per-sample
/// cells stay unset.
///
/// Arguments:
///
/// * `reader` - CSV input with a header row
///
/// Returns:
///
/// * `PeakMatrix` - the mined sample list and all parsed rows
pub fn parse_peak_matrix<R: Read>(reader: R) -> Result<PeakMatrix, Box<dyn Error>> {
    let mut csv_reader = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let index: BTreeMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(position, name)| (name.to_string(), position))
        .collect();

    let sample_pattern = Regex::new(SAMPLE_COLUMN_PATTERN)?;
    let mut samples: Vec<String> = Vec::new();
    for name in headers.iter() {
        if let Some(captures) = sample_pattern.captures(name) {
            let sample = captures[1].to_string();
            if !samples.contains(&sample) {
                samples.push(sample);
            }
        }
    }

    let mut rows: Vec<MatrixRow> = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        let (Some(feature_id), Some(precursor_mz), Some(retention_time)) = (
            parse_cell::<u64>(&record, index.get("feature_ID")),
            parse_cell::<f64>(&record, index.get("precursor_mz")),
            parse_cell::<f64>(&record, index.get("retention_time")),
        ) else {
            continue;
        };

        let mut cells: BTreeMap<String, SampleCells> = BTreeMap::new();
        for sample in &samples {
            let cell = SampleCells {
                feature_state: text_cell(&record, index.get(&sample_column(sample, "feature_state"))),
                fwhm: parse_cell(&record, index.get(&sample_column(sample, "fwhm"))),
                rt: parse_cell(&record, index.get(&sample_column(sample, "rt"))),
                intensity_max: parse_cell(
                    &record,
                    index.get(&sample_column(sample, "intensity_range:max")),
                ),
                rt_min: parse_cell(&record, index.get(&sample_column(sample, "rt_range:min"))),
                rt_max: parse_cell(&record, index.get(&sample_column(sample, "rt_range:max"))),
            };
            cells.insert(sample.clone(), cell);
        }

        rows.push(MatrixRow {
            feature_id,
            precursor_mz,
            retention_time,
            cells,
        });
    }

    Ok(PeakMatrix { samples, rows })
}

fn sample_column(sample: &str, field: &str) -> String {
    format!("datafile:{}:{}", sample, field)
}

fn parse_cell<T: FromStr>(record: &StringRecord, index: Option<&usize>) -> Option<T> {
    let value = record.get(*index?)?.trim();
    if value.is_empty() {
        return None;
    }
    value.parse().ok()
}

fn text_cell(record: &StringRecord, index: Option<&usize>) -> Option<String> {
    let value = record.get(*index?)?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
