use std::collections::BTreeMap;
use std::error::Error;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use metscore::data::spectrum::Ms2Spectrum;

/// read an MGF fragment file from disk
pub fn read_fragments<P: AsRef<Path>>(path: P) -> Result<BTreeMap<u64, Ms2Spectrum>, Box<dyn Error>> {
    let file = File::open(path)?;
    parse_fragments(BufReader::new(file))
}

/// parse MGF fragment blocks into one spectrum per feature id
///
/// Blocks are delimited by `BEGIN IONS` / `END IONS`. Inside a block the
/// `FEATURE_ID` and `PEPMASS` headers are read (PEPMASS may carry a trailing
/// intensity, only the first token counts), every other `KEY=value` line is
/// ignored and the remaining lines are fragment pairs of m/z and intensity.
/// Blocks without a feature id, precursor mass or any fragments are dropped.
///
/// Arguments:
///
/// * `reader` - line oriented MGF input
///
/// Returns:
///
/// * `BTreeMap<u64, Ms2Spectrum>` - fragment spectra keyed by feature id
pub fn parse_fragments<R: BufRead>(reader: R) -> Result<BTreeMap<u64, Ms2Spectrum>, Box<dyn Error>> {
    let mut spectra: BTreeMap<u64, Ms2Spectrum> = BTreeMap::new();

    let mut in_block = false;
    let mut feature_id: Option<u64> = None;
    let mut pepmass: Option<f64> = None;
    let mut mz: Vec<f64> = Vec::new();
    let mut intensity: Vec<f64> = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();

        if line == "BEGIN IONS" {
            in_block = true;
            feature_id = None;
            pepmass = None;
            mz.clear();
            intensity.clear();
            continue;
        }
        if line == "END IONS" {
            if let (Some(id), Some(precursor_mz)) = (feature_id, pepmass) {
                if !mz.is_empty() {
                    spectra.insert(
                        id,
                        Ms2Spectrum::new(mz.clone(), intensity.clone(), precursor_mz),
                    );
                }
            }
            in_block = false;
            continue;
        }
        if !in_block || line.is_empty() {
            continue;
        }

        if let Some(value) = line.strip_prefix("FEATURE_ID=") {
            feature_id = value.trim().parse().ok();
            continue;
        }
        if let Some(value) = line.strip_prefix("PEPMASS=") {
            pepmass = value.split_whitespace().next().and_then(|v| v.parse().ok());
            continue;
        }
        if line.contains('=') {
            continue;
        }

        let mut parts = line.split_whitespace();
        if let (Some(first), Some(second)) = (parts.next(), parts.next()) {
            if let (Ok(fragment_mz), Ok(fragment_intensity)) =
                (first.parse::<f64>(), second.parse::<f64>())
            {
                mz.push(fragment_mz);
                intensity.push(fragment_intensity);
            }
        }
    }

    Ok(spectra)
}
