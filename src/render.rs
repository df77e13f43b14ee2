// Presentation of enriched stops for the target database application.
//
// Nothing here feeds back into matching or resolution: a renderer only walks
// the segments of a highlighted excerpt and picks markup for them.
use regex::Regex;
use serde::{Deserialize, Serialize};

use lazy_static::lazy_static;
use std::fmt;
use std::str::FromStr;

use crate::assembler::{HighlightedExcerpt, Segment};
use crate::error::TrailsError;
use crate::model::Stop;
use crate::segment::is_matter_tour;
use crate::vocabulary::SpeciesVocabulary;

lazy_static! {
    static ref LEADING_BREAKS: Regex = Regex::new(r"^\n+").unwrap();
    static ref EXCESS_BREAKS: Regex = Regex::new(r"\n\n+").unwrap();
}

pub const DEFAULT_RGB: &str = "156, 39, 176";

/// Memento imports rich text, Airtable does not, plain is for everything else.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Formatting {
    #[default]
    Memento,
    Airtable,
    Plain,
}

impl FromStr for Formatting {
    type Err = TrailsError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memento" => Ok(Self::Memento),
            "airtable" => Ok(Self::Airtable),
            "plain" => Ok(Self::Plain),
            other => Err(TrailsError::Config(format!("unknown formatting '{other}'"))),
        }
    }
}
impl fmt::Display for Formatting {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::Memento => "memento",
            Self::Airtable => "airtable",
            Self::Plain => "plain",
        };
        write!(f, "{name}")
    }
}

pub fn bold(text: &str, formatting: Formatting) -> String {
    match formatting {
        Formatting::Memento => format!("<b>{text}</b>"),
        _ => text.to_string(),
    }
}

pub fn italic(text: &str, rgb: Option<&str>, formatting: Formatting) -> String {
    match (formatting, rgb) {
        (Formatting::Memento, Some(rgb)) => format!("<i style=\"color: rgb({rgb});\">{text}</i>"),
        (Formatting::Memento, None) => format!("<i>{text}</i>"),
        _ => text.to_string(),
    }
}

/// Strips leading line breaks and collapses longer runs into one blank line.
pub fn normalize_line_breaks(text: &str) -> String {
    let text = text.replace('\u{a0}', "");
    let text = LEADING_BREAKS.replace(&text, "");
    EXCESS_BREAKS.replace_all(&text, "\n\n").into_owned()
}

/// Scientific names in bold italics, common names in italics.
pub fn render_excerpt(excerpt: &HighlightedExcerpt, formatting: Formatting, rgb: &str) -> String {
    let rendered: String = excerpt
        .segments()
        .into_iter()
        .map(|segment| match segment {
            Segment::Plain(text) => text.to_string(),
            Segment::Marked { text, highlight } if highlight.kind.is_scientific() => {
                bold(&italic(text, Some(rgb), formatting), formatting)
            }
            Segment::Marked { text, .. } => italic(text, Some(rgb), formatting),
        })
        .collect();
    normalize_line_breaks(&rendered)
}

// first letter upper case, the rest lower case, whitespace collapsed
fn capitalize(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    let mut chars = flat.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// "Common name (Species name)" from the first common name mentioned in the
/// stop, or only the species name when the stop uses scientific names. A stop
/// without mentions keeps its name, and so do the introduction and back
/// matter stops.
pub fn stop_title(stop: &Stop, vocabulary: &SpeciesVocabulary) -> String {
    if is_matter_tour(&stop.tour_id) {
        return stop.name.clone();
    }
    let Some(excerpt) = &stop.highlighted_excerpt else {
        return stop.name.clone();
    };
    let Some(first) = excerpt.highlights.first() else {
        return stop.name.clone();
    };
    let common = excerpt.highlights.iter().find(|h| !h.kind.is_scientific());
    let subject = common.unwrap_or(first);
    let species = vocabulary.species(&subject.species_id).map(|s| capitalize(&s.canonical_name));
    match (common, species) {
        (Some(common), Some(species)) => {
            format!("{} ({})", capitalize(&excerpt.text[common.bytes.clone()]), species)
        }
        (None, Some(species)) => species,
        (Some(common), None) => capitalize(&excerpt.text[common.bytes.clone()]),
        (None, None) => stop.name.clone(),
    }
}
