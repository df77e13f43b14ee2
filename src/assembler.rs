//! Turns resolved mentions into an enriched [`Stop`].
//!
//! The excerpt text is never edited. Highlights are kept next to it as span
//! markers, and [`HighlightedExcerpt::segments`] walks the text in order so
//! any renderer can decide on its own markup.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::Range;

use crate::matcher::Mention;
use crate::model::{FormKind, SpeciesId, Stop};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    pub start: usize,
    pub end: usize,
    pub bytes: Range<usize>,
    pub species_id: SpeciesId,
    pub kind: FormKind,
}

impl From<&Mention> for Highlight {
    fn from(m: &Mention) -> Self {
        Self {
            start: m.start,
            end: m.end,
            bytes: m.bytes.clone(),
            species_id: m.species_id.clone(),
            kind: m.kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightedExcerpt {
    pub text: String,
    /// Disjoint and ordered by start.
    pub highlights: Vec<Highlight>,
}

/// A piece of the excerpt, either plain text or a highlighted mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Plain(&'a str),
    Marked { text: &'a str, highlight: &'a Highlight },
}

impl HighlightedExcerpt {
    pub fn plain(text: &str) -> Self {
        Self { text: text.to_string(), highlights: Vec::new() }
    }
    pub fn is_plain(&self) -> bool {
        self.highlights.is_empty()
    }
    pub fn segments(&self) -> Vec<Segment<'_>> {
        let mut segments = Vec::with_capacity(self.highlights.len() * 2 + 1);
        let mut cursor = 0;
        for highlight in &self.highlights {
            if highlight.bytes.start > cursor {
                segments.push(Segment::Plain(&self.text[cursor..highlight.bytes.start]));
            }
            segments.push(Segment::Marked { text: &self.text[highlight.bytes.clone()], highlight });
            cursor = highlight.bytes.end;
        }
        if cursor < self.text.len() {
            segments.push(Segment::Plain(&self.text[cursor..]));
        }
        segments
    }
}

/// Distinct species in order of first appearance.
pub fn species_refs(resolved: &[Mention]) -> Vec<SpeciesId> {
    let mut seen = HashSet::new();
    resolved
        .iter()
        .filter(|m| seen.insert(&m.species_id))
        .map(|m| m.species_id.clone())
        .collect()
}

pub fn assemble(stop: &Stop, resolved: &[Mention]) -> Stop {
    Stop {
        species_refs: species_refs(resolved),
        highlighted_excerpt: Some(HighlightedExcerpt {
            text: stop.raw_excerpt.clone(),
            highlights: resolved.iter().map(Highlight::from).collect(),
        }),
        ..stop.clone()
    }
}
