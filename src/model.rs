// used to read the collaborator inputs and hand enriched records on
use serde::{Deserialize, Serialize};

// links are kept in a stable order so output is reproducible
use std::collections::BTreeMap;
// used to print out readable forms of identifiers
use std::fmt;

use crate::assembler::HighlightedExcerpt;

// ------------- Species -------------
/// Stable identifier of a species, typically a Wikidata item id such as `Q157230`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeciesId(pub String);

impl SpeciesId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl From<&str> for SpeciesId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Species metadata as delivered by the acquisition collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeciesRecord {
    pub id: SpeciesId,
    pub canonical_name: String,
    #[serde(default)]
    pub surface_forms: Vec<String>,
    #[serde(default)]
    pub alt_scientific_names: Vec<String>,
    #[serde(default)]
    pub external_links: BTreeMap<String, String>,
}

impl SpeciesRecord {
    pub fn new(id: &str, canonical_name: &str) -> Self {
        Self {
            id: SpeciesId::from(id),
            canonical_name: canonical_name.to_string(),
            ..Self::default()
        }
    }
    pub fn with_forms(mut self, forms: &[&str]) -> Self {
        self.surface_forms.extend(forms.iter().map(|f| f.to_string()));
        self
    }
    pub fn with_alt_names(mut self, names: &[&str]) -> Self {
        self.alt_scientific_names.extend(names.iter().map(|n| n.to_string()));
        self
    }
    pub fn with_link(mut self, name: &str, uri: &str) -> Self {
        self.external_links.insert(name.to_string(), uri.to_string());
        self
    }
}

/// The canonical species as kept by the vocabulary. Never mutated after the
/// vocabulary has been built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Species {
    pub id: SpeciesId,
    pub canonical_name: String,
    /// Declared forms only, in declaration order. Derived forms live in the vocabulary.
    pub surface_forms: Vec<String>,
    pub external_links: BTreeMap<String, String>,
}

/// What kind of name a surface form is. Drives rendering, never resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormKind {
    Scientific,
    AltScientific,
    Abbreviated,
    Common,
    PluralCommon,
}

impl FormKind {
    pub fn is_scientific(&self) -> bool {
        matches!(self, Self::Scientific | Self::AltScientific | Self::Abbreviated)
    }
}

// ------------- Tours -------------
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tour {
    #[serde(alias = "tour_id")]
    pub id: String,
    pub name: String,
    pub stops: Vec<Stop>,
}

impl Tour {
    /// Stops delivered inside a tour don't repeat the tour id; fill it in.
    pub fn adopt_stops(mut self) -> Self {
        for stop in &mut self.stops {
            if stop.tour_id.is_empty() {
                stop.tour_id = self.id.clone();
            }
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    #[serde(alias = "stop_id")]
    pub id: String,
    #[serde(default)]
    pub tour_id: String,
    pub sequence: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub raw_excerpt: String,
    #[serde(default)]
    pub species_refs: Vec<SpeciesId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlighted_excerpt: Option<HighlightedExcerpt>,
}

impl Stop {
    pub fn new(tour_id: &str, sequence: u32, raw_excerpt: &str) -> Self {
        Self {
            id: format!("{tour_id}-{sequence}"),
            tour_id: tour_id.to_string(),
            sequence,
            name: String::new(),
            description: String::new(),
            raw_excerpt: raw_excerpt.to_string(),
            species_refs: Vec::new(),
            highlighted_excerpt: None,
        }
    }
    pub fn is_enriched(&self) -> bool {
        self.highlighted_excerpt.is_some()
    }
}
