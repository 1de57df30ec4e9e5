use std::collections::BTreeMap;
use std::error::Error;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use metscore::data::clique::{CliqueEdge, SimilarityClique};

/// On the wire a clique is `{"<id>": [[members...], [[source, target,
/// weight], ...]]}`.
type RawCliques = BTreeMap<String, (Vec<u64>, Vec<(u64, u64, f64)>)>;

/// read an externally built similarity clique JSON file from disk
pub fn read_similarity_cliques<P: AsRef<Path>>(
    path: P,
) -> Result<BTreeMap<u64, SimilarityClique>, Box<dyn Error>> {
    let file = File::open(path)?;
    parse_similarity_cliques(BufReader::new(file))
}

/// parse the clique JSON into the shared clique store
///
/// JSON object keys are strings; keys that do not parse as clique ids are
/// dropped.
pub fn parse_similarity_cliques<R: Read>(
    reader: R,
) -> Result<BTreeMap<u64, SimilarityClique>, Box<dyn Error>> {
    let raw: RawCliques = serde_json::from_reader(reader)?;

    let mut cliques: BTreeMap<u64, SimilarityClique> = BTreeMap::new();
    for (key, (members, edges)) in raw {
        let Ok(clique_id) = key.parse::<u64>() else {
            continue;
        };
        let edges = edges
            .into_iter()
            .map(|(source, target, weight)| CliqueEdge {
                source,
                target,
                weight,
            })
            .collect();
        cliques.insert(
            clique_id,
            SimilarityClique {
                clique_id,
                members,
                edges,
            },
        );
    }

    Ok(cliques)
}
