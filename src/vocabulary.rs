//! The closed, immutable vocabulary of tree species.
//!
//! Every surface form is normalized (lowercased, whitespace collapsed) and
//! owned by exactly one species. Forms come in two flavors:
//! * declared forms: canonical name, alternate scientific names and the
//!   surface forms delivered with the species record,
//! * derived forms: genus abbreviations ("P. strobus") of scientific names
//!   and plurals of common names ("Beeches").
//!
//! A declared form claimed by two species is a [`VocabularyError`]. A derived
//! form that would be ambiguous is simply not kept.

// used for the surface form patterns
use regex::{Regex, RegexBuilder};

// lookups use a fast non-cryptographic hasher, forms are kept in sorted order
use core::hash::BuildHasherDefault;
use seahash::SeaHasher;
use std::collections::{BTreeMap, HashMap, HashSet};

use lazy_static::lazy_static;
use tracing::{debug, info, warn};

use crate::error::VocabularyError;
use crate::model::{FormKind, Species, SpeciesId, SpeciesRecord};

pub type FormHasher = BuildHasherDefault<SeaHasher>;

lazy_static! {
    // a declared form that already is a genus abbreviation, ex. "P. strobus"
    static ref ABBREVIATED: Regex = Regex::new(r"^\p{Lu}\.\s+\S").unwrap();
}

/// Lowercases and collapses all whitespace runs into single spaces.
pub fn normalize_form(form: &str) -> String {
    form.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// "Pinus strobus" -> "P. strobus". Single words have no abbreviation.
pub fn abbreviate_genus(name: &str) -> Option<String> {
    let mut words = name.split_whitespace();
    let genus = words.next()?;
    let rest: Vec<&str> = words.collect();
    let initial = genus.chars().next().filter(|c| c.is_alphabetic())?;
    if rest.is_empty() {
        return None;
    }
    Some(format!("{}. {}", initial.to_uppercase(), rest.join(" ")))
}

/// Plural of a common name, only the last word is pluralized.
pub fn pluralize(name: &str) -> String {
    let words: Vec<&str> = name.split_whitespace().collect();
    let Some((last, head)) = words.split_last() else {
        return String::new();
    };
    let lower = last.to_lowercase();
    let vowel_y = ["ay", "ey", "iy", "oy", "uy"].iter().any(|suffix| lower.ends_with(suffix));
    let plural = if lower.ends_with('y') && !vowel_y {
        format!("{}ies", &last[..last.len() - 1])
    } else if ["ch", "sh", "s", "z", "x"].iter().any(|suffix| lower.ends_with(suffix)) {
        format!("{last}es")
    } else {
        format!("{last}s")
    };
    let mut out: Vec<String> = head.iter().map(|w| w.to_string()).collect();
    out.push(plural);
    out.join(" ")
}

// ------------- Surface forms -------------
#[derive(Debug, Clone)]
pub struct SurfaceForm {
    /// The form as declared, or as derived, before normalization.
    pub text: String,
    pub normalized: String,
    pub species: SpeciesId,
    pub kind: FormKind,
    pub declared: bool,
    pattern: Regex,
}

impl SurfaceForm {
    fn compile(
        text: String,
        normalized: String,
        species: SpeciesId,
        kind: FormKind,
        declared: bool,
    ) -> Result<Self, VocabularyError> {
        // internal whitespace of a form matches any whitespace run in the text
        let source = normalized
            .split(' ')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(r"\s+");
        let pattern = RegexBuilder::new(&source)
            .case_insensitive(true)
            .build()
            .map_err(|e| VocabularyError::InvalidForm {
                form: text.clone(),
                species: species.clone(),
                message: e.to_string(),
            })?;
        Ok(Self { text, normalized, species, kind, declared, pattern })
    }
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }
    pub fn word_count(&self) -> usize {
        self.normalized.split(' ').count()
    }
    pub fn char_len(&self) -> usize {
        self.normalized.chars().count()
    }
}

// ------------- Vocabulary -------------
#[derive(Debug)]
pub struct SpeciesVocabulary {
    species: Vec<Species>,
    by_id: HashMap<SpeciesId, usize, FormHasher>,
    lookup: HashMap<String, SpeciesId, FormHasher>,
    // sorted by normalized text, which fixes the scan order of the matcher
    forms: Vec<SurfaceForm>,
}

// a form waiting to be kept, before patterns are compiled
struct Claim {
    text: String,
    species: SpeciesId,
    kind: FormKind,
}

impl SpeciesVocabulary {
    pub fn build(records: Vec<SpeciesRecord>) -> Result<Self, VocabularyError> {
        let mut species = Vec::with_capacity(records.len());
        let mut by_id = HashMap::<SpeciesId, usize, FormHasher>::default();
        let mut declared: BTreeMap<String, Claim> = BTreeMap::new();
        let mut derived: BTreeMap<String, Vec<Claim>> = BTreeMap::new();

        for record in records {
            if record.id.as_str().trim().is_empty() {
                return Err(VocabularyError::BlankId(record.canonical_name));
            }
            if by_id.contains_key(&record.id) {
                return Err(VocabularyError::DuplicateSpecies(record.id));
            }
            let own = declared_forms(&record);
            if own.is_empty() {
                return Err(VocabularyError::EmptySpecies(record.id));
            }
            for (text, kind) in &own {
                let normalized = normalize_form(text);
                match declared.get(&normalized) {
                    Some(claim) if claim.species != record.id => {
                        return Err(VocabularyError::SurfaceFormCollision {
                            form: normalized,
                            first: claim.species.clone(),
                            second: record.id.clone(),
                        });
                    }
                    Some(_) => (),
                    None => {
                        let claim =
                            Claim { text: text.clone(), species: record.id.clone(), kind: *kind };
                        declared.insert(normalized, claim);
                    }
                }
                for (derived_text, derived_kind) in derive_forms(text, *kind) {
                    derived.entry(normalize_form(&derived_text)).or_default().push(Claim {
                        text: derived_text,
                        species: record.id.clone(),
                        kind: derived_kind,
                    });
                }
            }
            by_id.insert(record.id.clone(), species.len());
            species.push(Species {
                id: record.id,
                canonical_name: record.canonical_name.trim().to_string(),
                surface_forms: own.into_iter().map(|(text, _)| text).collect(),
                external_links: record.external_links,
            });
        }

        let mut kept: BTreeMap<String, (Claim, bool)> = declared
            .into_iter()
            .map(|(normalized, claim)| (normalized, (claim, true)))
            .collect();
        for (normalized, claims) in derived {
            if let Some((owner, _)) = kept.get(&normalized) {
                if claims.iter().any(|c| c.species != owner.species) {
                    warn!(
                        form = %normalized,
                        owner = %owner.species,
                        "derived form shadows a declared form, dropped"
                    );
                }
                continue;
            }
            let owners: HashSet<&SpeciesId> = claims.iter().map(|c| &c.species).collect();
            if owners.len() > 1 {
                warn!(
                    form = %normalized,
                    species = owners.len(),
                    "derived form is ambiguous, dropped"
                );
                continue;
            }
            if let Some(claim) = claims.into_iter().next() {
                kept.insert(normalized, (claim, false));
            }
        }

        let mut lookup = HashMap::<String, SpeciesId, FormHasher>::default();
        let mut forms = Vec::with_capacity(kept.len());
        for (normalized, (claim, is_declared)) in kept {
            lookup.insert(normalized.clone(), claim.species.clone());
            let Claim { text, species: owner, kind } = claim;
            let form = SurfaceForm::compile(text, normalized, owner, kind, is_declared)?;
            forms.push(form);
        }
        info!(species = species.len(), forms = forms.len(), "vocabulary built");
        debug!(derived = forms.iter().filter(|f| !f.declared).count(), "derived forms kept");
        Ok(Self { species, by_id, lookup, forms })
    }

    /// Normalized surface form -> species id.
    pub fn lookup_forms(&self) -> &HashMap<String, SpeciesId, FormHasher> {
        &self.lookup
    }
    /// Resolves any spelling of a known form.
    pub fn lookup(&self, form: &str) -> Option<&SpeciesId> {
        self.lookup.get(&normalize_form(form))
    }
    pub fn forms(&self) -> &[SurfaceForm] {
        &self.forms
    }
    /// The kept surface form for any spelling of it.
    pub fn form(&self, text: &str) -> Option<&SurfaceForm> {
        let normalized = normalize_form(text);
        self.forms
            .binary_search_by(|f| f.normalized.as_str().cmp(&normalized))
            .ok()
            .map(|i| &self.forms[i])
    }
    /// Declared common names of a species, in declaration order.
    pub fn common_names(&self, species: &Species) -> Vec<String> {
        species
            .surface_forms
            .iter()
            .filter(|f| {
                self.form(f)
                    .is_some_and(|form| form.declared && form.kind == FormKind::Common)
            })
            .cloned()
            .collect()
    }
    pub fn species(&self, id: &SpeciesId) -> Option<&Species> {
        self.by_id.get(id).map(|i| &self.species[*i])
    }
    pub fn contains(&self, id: &SpeciesId) -> bool {
        self.by_id.contains_key(id)
    }
    /// All species in the order they were delivered.
    pub fn iter(&self) -> impl Iterator<Item = &Species> {
        self.species.iter()
    }
    pub fn len(&self) -> usize {
        self.species.len()
    }
    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }
}

// canonical name, alternate scientific names, then the record's own forms,
// deduplicated on their normalized text
fn declared_forms(record: &SpeciesRecord) -> Vec<(String, FormKind)> {
    let mut seen = HashSet::new();
    let mut forms = Vec::new();
    let scientific = std::iter::once((&record.canonical_name, FormKind::Scientific))
        .chain(record.alt_scientific_names.iter().map(|n| (n, FormKind::AltScientific)));
    let others = record.surface_forms.iter().map(|f| {
        let kind = if ABBREVIATED.is_match(f.trim()) {
            FormKind::Abbreviated
        } else {
            FormKind::Common
        };
        (f, kind)
    });
    for (text, kind) in scientific.chain(others) {
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if text.is_empty() {
            continue;
        }
        if seen.insert(normalize_form(&text)) {
            forms.push((text, kind));
        }
    }
    forms
}

fn derive_forms(text: &str, kind: FormKind) -> Vec<(String, FormKind)> {
    match kind {
        FormKind::Scientific | FormKind::AltScientific => {
            abbreviate_genus(text).map(|a| (a, FormKind::Abbreviated)).into_iter().collect()
        }
        FormKind::Common => vec![(pluralize(text), FormKind::PluralCommon)],
        FormKind::Abbreviated | FormKind::PluralCommon => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(normalize_form("  American\n  Beech "), "american beech");
    }

    #[test]
    fn abbreviates_the_genus() {
        assert_eq!(abbreviate_genus("Pinus strobus").as_deref(), Some("P. strobus"));
        assert_eq!(abbreviate_genus("Sophora"), None);
    }

    #[test]
    fn pluralizes_the_last_word() {
        assert_eq!(pluralize("American Beech"), "American Beeches");
        assert_eq!(pluralize("Black Cherry"), "Black Cherries");
        assert_eq!(pluralize("Bay"), "Bays");
        assert_eq!(pluralize("Red Oak"), "Red Oaks");
        assert_eq!(pluralize("Box"), "Boxes");
    }

    #[test]
    fn keeps_derived_forms_for_their_species() {
        let vocabulary = SpeciesVocabulary::build(vec![
            SpeciesRecord::new("Q157230", "Pinus strobus").with_forms(&["White Pine"]),
        ])
        .expect("vocabulary");
        let pine = SpeciesId::from("Q157230");
        assert_eq!(vocabulary.lookup("p. strobus"), Some(&pine));
        assert_eq!(vocabulary.lookup("WHITE   PINES"), Some(&pine));
        assert_eq!(vocabulary.lookup_forms().len(), 4);
    }

    #[test]
    fn common_names_are_the_declared_common_forms() {
        let vocabulary = SpeciesVocabulary::build(vec![
            SpeciesRecord::new("Q26745", "Acer platanoides")
                .with_alt_names(&["Acer lobelii"])
                .with_forms(&["Norway Maple", "A. platanoides", "Schwedler Maple"]),
        ])
        .expect("vocabulary");
        let maple = vocabulary.species(&SpeciesId::from("Q26745")).expect("species");
        assert_eq!(vocabulary.common_names(maple), ["Norway Maple", "Schwedler Maple"]);
        assert_eq!(vocabulary.form("norway  MAPLES").map(|f| f.kind), Some(FormKind::PluralCommon));
    }

    #[test]
    fn drops_ambiguous_derived_forms() {
        let vocabulary = SpeciesVocabulary::build(vec![
            SpeciesRecord::new("A", "Picea orientalis"),
            SpeciesRecord::new("B", "Platanus orientalis"),
        ])
        .expect("derived collisions are not fatal");
        assert!(vocabulary.lookup("P. orientalis").is_none());
        assert_eq!(vocabulary.lookup("picea orientalis"), Some(&SpeciesId::from("A")));
    }

    #[test]
    fn declared_form_wins_over_derived_form() {
        let vocabulary = SpeciesVocabulary::build(vec![
            SpeciesRecord::new("A", "Pinus strobus"),
            SpeciesRecord::new("B", "Quercus alba").with_forms(&["P. strobus"]),
        ])
        .expect("vocabulary");
        assert_eq!(vocabulary.lookup("p. strobus"), Some(&SpeciesId::from("B")));
    }

    #[test]
    fn rejects_blank_and_duplicate_species() {
        let err = SpeciesVocabulary::build(vec![SpeciesRecord::new(" ", "Ulmus")]).unwrap_err();
        assert!(matches!(err, VocabularyError::BlankId(_)));
        let err = SpeciesVocabulary::build(vec![
            SpeciesRecord::new("A", "Ulmus"),
            SpeciesRecord::new("A", "Fagus"),
        ])
        .unwrap_err();
        assert_eq!(err, VocabularyError::DuplicateSpecies(SpeciesId::from("A")));
        let err = SpeciesVocabulary::build(vec![SpeciesRecord::new("A", "  ")]).unwrap_err();
        assert_eq!(err, VocabularyError::EmptySpecies(SpeciesId::from("A")));
    }
}
