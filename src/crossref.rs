// Species -> stops relation, the link between the species table and the
// stops table of the target database.
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::model::{SpeciesId, Tour};
use crate::vocabulary::SpeciesVocabulary;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StopRef {
    pub tour_id: String,
    pub stop_id: String,
    pub sequence: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeciesEntry {
    pub species_id: SpeciesId,
    pub canonical_name: String,
    pub common_names: Vec<String>,
    pub external_links: BTreeMap<String, String>,
    pub stops: Vec<StopRef>,
}

/// One entry per vocabulary species, in vocabulary order. Stops are listed in
/// tour order and then by sequence; species nobody mentions get no stops.
pub fn species_index(tours: &[Tour], vocabulary: &SpeciesVocabulary) -> Vec<SpeciesEntry> {
    let mut stops_of: HashMap<&SpeciesId, Vec<StopRef>> = HashMap::new();
    for tour in tours {
        for stop in &tour.stops {
            for species in &stop.species_refs {
                stops_of.entry(species).or_default().push(StopRef {
                    tour_id: tour.id.clone(),
                    stop_id: stop.id.clone(),
                    sequence: stop.sequence,
                });
            }
        }
    }
    vocabulary
        .iter()
        .map(|species| SpeciesEntry {
            species_id: species.id.clone(),
            canonical_name: species.canonical_name.clone(),
            common_names: vocabulary.common_names(species),
            external_links: species.external_links.clone(),
            stops: stops_of.remove(&species.id).unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SpeciesRecord, Stop};
    use crate::pipeline::enrich_tours;

    #[test]
    fn lists_stops_per_species() {
        let vocabulary = SpeciesVocabulary::build(vec![
            SpeciesRecord::new("Z", "Quercus rubra").with_forms(&["Red Oak"]),
            SpeciesRecord::new("X", "Ulmus procera")
                .with_forms(&["Elm"])
                .with_link("wikipedia", "https://en.wikipedia.org/wiki/Ulmus_procera"),
            SpeciesRecord::new("Y", "Fagus grandifolia"),
        ])
        .expect("vocabulary");
        let tours = vec![Tour {
            id: "1".to_string(),
            name: "TOUR 1".to_string(),
            stops: vec![Stop::new("1", 1, "An Elm."), Stop::new("1", 2, "Red Oak and Elm.")],
        }];
        let report = enrich_tours(&tours, &vocabulary, 2);
        let index = species_index(&report.tours, &vocabulary);
        assert_eq!(index.len(), 3);
        assert_eq!(index[0].stops.iter().map(|s| s.sequence).collect::<Vec<_>>(), [2]);
        let elm_stops: Vec<&str> = index[1].stops.iter().map(|s| s.stop_id.as_str()).collect();
        assert_eq!(elm_stops, ["1-1", "1-2"]);
        assert_eq!(index[1].common_names, ["Elm"]);
        assert_eq!(index[1].external_links.len(), 1);
        assert!(index[2].stops.is_empty());
    }
}
