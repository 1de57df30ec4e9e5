use std::error::Error;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use metscore::data::spectrum::{LibraryEntry, Ms2Spectrum};

/// Entry under construction while walking an MSP file.
#[derive(Debug, Default)]
struct EntryDraft {
    name: String,
    smiles: String,
    inchi: String,
    precursor_mz: Option<f64>,
    mz: Vec<f64>,
    intensity: Vec<f64>,
}

impl EntryDraft {
    /// Finishes the draft and resets it for the next entry. Drafts without
    /// a precursor m/z or without fragments yield nothing.
    fn build(&mut self) -> Option<LibraryEntry> {
        let draft = std::mem::take(self);
        let precursor_mz = draft.precursor_mz?;
        if draft.mz.is_empty() {
            return None;
        }
        Some(LibraryEntry {
            name: draft.name,
            smiles: draft.smiles,
            inchi: draft.inchi,
            spectrum: Ms2Spectrum::new(draft.mz, draft.intensity, precursor_mz),
        })
    }
}

/// read and prepare a reference spectral library (MSP) from disk
pub fn read_spectral_library<P: AsRef<Path>>(path: P) -> Result<Vec<LibraryEntry>, Box<dyn Error>> {
    let file = File::open(path)?;
    let entries = parse_spectral_library(BufReader::new(file))?;
    Ok(prepare_library(entries))
}

/// parse raw MSP entries without preparing them
///
/// Entries are separated by blank lines. `key: value` header lines fill the
/// entry name, SMILES, InChI and precursor m/z (keys are matched case
/// insensitively), unknown keys are ignored and the remaining lines are
/// fragment pairs of m/z and intensity.
pub fn parse_spectral_library<R: BufRead>(reader: R) -> Result<Vec<LibraryEntry>, Box<dyn Error>> {
    let mut entries: Vec<LibraryEntry> = Vec::new();
    let mut draft = EntryDraft::default();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();

        if line.is_empty() {
            if let Some(entry) = draft.build() {
                entries.push(entry);
            }
            continue;
        }

        if let Some((key, value)) = line.split_once(':') {
            let value = value.trim();
            match key.trim().to_ascii_lowercase().as_str() {
                "name" => draft.name = value.to_string(),
                "smiles" => draft.smiles = value.to_string(),
                "inchi" => draft.inchi = value.to_string(),
                "precursormz" | "precursor_mz" => draft.precursor_mz = value.parse().ok(),
                _ => {}
            }
            continue;
        }

        let mut parts = line.split_whitespace();
        if let (Some(first), Some(second)) = (parts.next(), parts.next()) {
            if let (Ok(fragment_mz), Ok(fragment_intensity)) =
                (first.parse::<f64>(), second.parse::<f64>())
            {
                draft.mz.push(fragment_mz);
                draft.intensity.push(fragment_intensity);
            }
        }
    }
    if let Some(entry) = draft.build() {
        entries.push(entry);
    }

    Ok(entries)
}

/// prepare parsed entries for matching
///
/// Each spectrum is normalized to unit maximum and stripped of fragments
/// below 1% of the maximum; entries left without fragments are dropped and
/// the survivors are sorted by ascending precursor m/z.
pub fn prepare_library(entries: Vec<LibraryEntry>) -> Vec<LibraryEntry> {
    let mut prepared: Vec<LibraryEntry> = entries
        .into_iter()
        .map(|entry| {
            let spectrum = entry.spectrum.normalized().filter_by_intensity(0.01);
            LibraryEntry { spectrum, ..entry }
        })
        .filter(|entry| !entry.spectrum.is_empty())
        .collect();
    prepared.sort_by(|a, b| a.spectrum.precursor_mz.total_cmp(&b.spectrum.precursor_mz));
    prepared
}

#[cfg(test)]
mod tests {
    use super::*;

    const MSP: &str = "\
Name: siomycin A
SMILES: CC1=CC=CC=C1
InChI: InChI=1S/C2H6O/c1-2-3/h3H,2H2,1H3
PrecursorMZ: 824.7379
Num Peaks: 3
100.0 50.0
200.0 100.0
300.0 0.5

Name: entry without precursor
150.0 20.0

Name: low fragment entry
PrecursorMZ: 500.0
400.0 1000.0
410.0 2.0
";

    #[test]
    fn entries_parse_with_headers_and_fragments() {
        let entries = parse_spectral_library(MSP.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "siomycin A");
        assert_eq!(entries[0].smiles, "CC1=CC=CC=C1");
        assert!(entries[0].inchi.starts_with("InChI=1S"));
        assert_eq!(entries[0].spectrum.len(), 3);
    }

    #[test]
    fn entries_without_precursor_are_dropped() {
        let entries = parse_spectral_library(MSP.as_bytes()).unwrap();
        assert!(entries.iter().all(|entry| entry.name != "entry without precursor"));
    }

    #[test]
    fn preparation_normalizes_filters_and_sorts() {
        let entries = parse_spectral_library(MSP.as_bytes()).unwrap();
        let prepared = prepare_library(entries);

        // sorted by ascending precursor m/z
        assert_eq!(prepared[0].name, "low fragment entry");
        assert_eq!(prepared[1].name, "siomycin A");

        // the 0.5 fragment sits below 1% of the maximum
        assert_eq!(prepared[1].spectrum.len(), 2);
        assert_eq!(prepared[1].spectrum.intensity, vec![0.5, 1.0]);

        // the 2.0 fragment of the low entry is 0.2% of its maximum
        assert_eq!(prepared[0].spectrum.len(), 1);
    }
}
