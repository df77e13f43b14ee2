// Reduces overlapping candidate mentions to a disjoint, start-ordered set.
//
// One left-to-right sweep over the candidates sorted by (start, -length).
// A candidate that overlaps the last accepted mention contests it:
//   1. the longer span wins (a containing span always beats the contained one)
//   2. then the higher specificity (word count, then character length)
//   3. then the earlier start
// A tie on all three between two different species cannot be decided.
use std::cmp::{Ordering, Reverse};

use crate::error::VocabularyError;
use crate::matcher::Mention;

// sort key that makes the sweep independent of the order candidates arrive in
fn sweep_order(m: &Mention) -> (usize, Reverse<usize>, Reverse<(usize, usize)>, &str, &str) {
    (
        m.start,
        Reverse(m.len()),
        Reverse((m.specificity.words, m.specificity.chars)),
        m.species_id.as_str(),
        m.matched_form.as_str(),
    )
}

// Greater means the challenger takes the place of the accepted mention
fn contest(accepted: &Mention, challenger: &Mention) -> Result<Ordering, VocabularyError> {
    let outcome = challenger
        .len()
        .cmp(&accepted.len())
        .then(challenger.specificity.cmp(&accepted.specificity))
        .then(accepted.start.cmp(&challenger.start));
    if outcome == Ordering::Equal && accepted.species_id != challenger.species_id {
        return Err(VocabularyError::AmbiguousMention {
            start: challenger.start,
            end: challenger.end,
            first: accepted.species_id.clone(),
            second: challenger.species_id.clone(),
        });
    }
    Ok(outcome)
}

pub fn resolve(mut candidates: Vec<Mention>) -> Result<Vec<Mention>, VocabularyError> {
    candidates.sort_by(|a, b| sweep_order(a).cmp(&sweep_order(b)));
    let mut accepted: Vec<Mention> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        match accepted.last_mut() {
            Some(last) if last.overlaps(&candidate) => {
                if contest(last, &candidate)? == Ordering::Greater {
                    *last = candidate;
                }
            }
            _ => accepted.push(candidate),
        }
    }
    Ok(accepted)
}
