use treetrails::{SpeciesId, SpeciesRecord, SpeciesVocabulary, VocabularyError};

#[test]
fn shared_form_is_rejected() {
    let err = SpeciesVocabulary::build(vec![
        SpeciesRecord::new("Q1", "Quercus alba").with_forms(&["Oak"]),
        SpeciesRecord::new("Q2", "Quercus rubra").with_forms(&["Oak"]),
    ])
    .unwrap_err();
    assert_eq!(
        err,
        VocabularyError::SurfaceFormCollision {
            form: "oak".to_string(),
            first: SpeciesId::from("Q1"),
            second: SpeciesId::from("Q2"),
        }
    );
}

#[test]
fn collision_ignores_case_and_whitespace() {
    let err = SpeciesVocabulary::build(vec![
        SpeciesRecord::new("Q1", "Quercus alba").with_forms(&["White  Oak"]),
        SpeciesRecord::new("Q2", "Quercus bicolor").with_forms(&["white oak"]),
    ])
    .unwrap_err();
    assert!(matches!(
        err,
        VocabularyError::SurfaceFormCollision { ref form, .. } if form == "white oak"
    ));
}

#[test]
fn repeated_form_within_one_species_is_fine() {
    let vocabulary = SpeciesVocabulary::build(vec![
        SpeciesRecord::new("Q1", "Quercus alba")
            .with_forms(&["White Oak", "white oak", "Quercus Alba"]),
    ])
    .expect("vocabulary");
    assert_eq!(vocabulary.species(&SpeciesId::from("Q1")).map(|s| s.surface_forms.len()), Some(2));
}

#[test]
fn substring_forms_of_different_species_are_allowed() {
    let vocabulary = SpeciesVocabulary::build(vec![
        SpeciesRecord::new("X", "Ulmus procera").with_forms(&["Elm"]),
        SpeciesRecord::new("Y", "Ulmus americana").with_forms(&["American Elm"]),
    ])
    .expect("vocabulary");
    assert_eq!(vocabulary.lookup("elm"), Some(&SpeciesId::from("X")));
    assert_eq!(vocabulary.lookup("american elm"), Some(&SpeciesId::from("Y")));
}
