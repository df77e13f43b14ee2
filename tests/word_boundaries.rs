use treetrails::{SpeciesRecord, SpeciesVocabulary, Stop, enrich_stop, find_candidates};

fn vocabulary() -> SpeciesVocabulary {
    SpeciesVocabulary::build(vec![SpeciesRecord::new("X", "Ulmus procera").with_forms(&["Elm"])])
        .expect("vocabulary")
}

#[test]
fn no_match_inside_a_longer_word() {
    assert!(find_candidates("Elmhurst Ave", &vocabulary()).is_empty());
    assert!(find_candidates("a helmet", &vocabulary()).is_empty());
}

#[test]
fn punctuation_and_digits_are_boundaries() {
    let found = find_candidates("(Elm) Elm, Elm. Elm2 \"elm\"", &vocabulary());
    assert_eq!(found.len(), 5);
}

#[test]
fn a_stop_without_mentions_is_valid() {
    let stop = Stop::new("1", 1, "Elmhurst Ave, then the lawn.");
    let enriched = enrich_stop(&stop, &vocabulary()).expect("no error");
    assert!(enriched.species_refs.is_empty());
    let excerpt = enriched.highlighted_excerpt.expect("excerpt");
    assert!(excerpt.is_plain());
    assert_eq!(excerpt.text, stop.raw_excerpt);
}
