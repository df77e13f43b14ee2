//! Candidate mention generation.
//!
//! Every surface form of the vocabulary is located in the text on its own,
//! so the candidates may overlap each other freely. Sorting that out is the
//! job of the [`crate::resolver`].

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::ops::Range;

use crate::model::{FormKind, SpeciesId};
use crate::vocabulary::{SpeciesVocabulary, SurfaceForm};

/// Ranks candidates that overlap without one containing the other.
/// Compares word count first, then character length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Specificity {
    pub words: usize,
    pub chars: usize,
}

impl Specificity {
    pub fn of(form: &SurfaceForm) -> Self {
        Self { words: form.word_count(), chars: form.char_len() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    /// Character offsets, half-open.
    pub start: usize,
    pub end: usize,
    /// Byte offsets of the same span, for slicing the excerpt.
    pub bytes: Range<usize>,
    pub species_id: SpeciesId,
    /// The vocabulary form that produced the match.
    pub matched_form: String,
    pub kind: FormKind,
    pub specificity: Specificity,
}

impl Mention {
    pub fn len(&self) -> usize {
        self.end - self.start
    }
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
    pub fn overlaps(&self, other: &Mention) -> bool {
        self.start < other.end && other.start < self.end
    }
    pub fn contains(&self, other: &Mention) -> bool {
        self.start <= other.start && other.end <= self.end
    }
    /// The mention as it is written in `text`.
    pub fn text<'a>(&self, text: &'a str) -> &'a str {
        &text[self.bytes.clone()]
    }
}

// byte offset -> char offset, for char boundaries of one text
struct CharOffsets(Vec<usize>);

impl CharOffsets {
    fn of(text: &str) -> Self {
        Self(text.char_indices().map(|(b, _)| b).collect())
    }
    fn at(&self, byte: usize) -> usize {
        self.0.partition_point(|b| *b < byte)
    }
}

// neither end of a match may sit inside an alphabetic run
fn on_word_boundaries(text: &str, span: &Range<usize>) -> bool {
    let inner = &text[span.clone()];
    let before = text[..span.start].chars().next_back();
    let after = text[span.end..].chars().next();
    let starts_word = inner.chars().next().is_some_and(char::is_alphabetic);
    let ends_word = inner.chars().next_back().is_some_and(char::is_alphabetic);
    !(starts_word && before.is_some_and(char::is_alphabetic))
        && !(ends_word && after.is_some_and(char::is_alphabetic))
}

fn occurrences(text: &str, form: &SurfaceForm) -> Vec<Range<usize>> {
    let mut found = Vec::new();
    let mut at = 0;
    while at < text.len() {
        let Some(m) = form.pattern().find_at(text, at) else { break };
        if m.is_empty() {
            break;
        }
        if on_word_boundaries(text, &m.range()) {
            found.push(m.range());
            at = m.end();
        } else {
            // a rejected match may hide a valid one that starts inside it
            at = m.start() + text[m.start()..].chars().next().map_or(1, char::len_utf8);
        }
    }
    found
}

/// All occurrences of all surface forms in `text`, ordered by start, longer
/// spans first, then by vocabulary form order.
pub fn find_candidates(text: &str, vocabulary: &SpeciesVocabulary) -> Vec<Mention> {
    let offsets = CharOffsets::of(text);
    let mut candidates = Vec::new();
    for form in vocabulary.forms() {
        for bytes in occurrences(text, form) {
            candidates.push(Mention {
                start: offsets.at(bytes.start),
                end: offsets.at(bytes.end),
                bytes,
                species_id: form.species.clone(),
                matched_form: form.text.clone(),
                kind: form.kind,
                specificity: Specificity::of(form),
            });
        }
    }
    // stable, so ties keep the vocabulary order
    candidates.sort_by_key(|m| (m.start, Reverse(m.end)));
    candidates
}
