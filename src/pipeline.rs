//! Batch enrichment of tours.
//!
//! Stops are independent of each other, so they are enriched on a rayon pool
//! that shares the vocabulary by reference. The batch keeps every tour and
//! stop in its delivered order.

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::assembler::assemble;
use crate::error::{Result, TrailsError, VocabularyError};
use crate::matcher::find_candidates;
use crate::model::{Stop, Tour};
use crate::resolver::resolve;
use crate::segment::is_matter_tour;
use crate::vocabulary::SpeciesVocabulary;

/// Matcher -> Resolver -> Assembler for one stop.
pub fn enrich_stop(
    stop: &Stop,
    vocabulary: &SpeciesVocabulary,
) -> std::result::Result<Stop, VocabularyError> {
    let candidates = find_candidates(&stop.raw_excerpt, vocabulary);
    let found = candidates.len();
    let resolved = resolve(candidates)?;
    debug!(stop = %stop.id, candidates = found, mentions = resolved.len(), "stop resolved");
    Ok(assemble(stop, &resolved))
}

/// Sequences must run 1, 2, 3, ... in the order the stops are delivered.
pub fn validate_sequences(tour: &Tour) -> Result<()> {
    for (expected, stop) in (1..).zip(&tour.stops) {
        if stop.sequence != expected {
            return Err(TrailsError::Segmentation {
                tour_id: tour.id.clone(),
                stop_id: stop.id.clone(),
                expected,
                found: stop.sequence,
            });
        }
    }
    Ok(())
}

/// What a batch produced: the enriched tours, and everything that was left
/// out of them together with the reason.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub tours: Vec<Tour>,
    pub failures: Vec<TrailsError>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
    pub fn stop_count(&self) -> usize {
        self.tours.iter().map(|t| t.stops.len()).sum()
    }
}

pub fn default_workers() -> usize {
    rayon::current_num_threads()
}

pub fn enrich_tours(tours: &[Tour], vocabulary: &SpeciesVocabulary, workers: usize) -> BatchReport {
    let mut report = BatchReport::default();
    let mut valid: Vec<&Tour> = Vec::with_capacity(tours.len());
    for tour in tours {
        match validate_sequences(tour) {
            Ok(()) => valid.push(tour),
            Err(e) => {
                warn!(tour = %tour.id, error = %e, "tour excluded");
                report.failures.push(e);
            }
        }
    }

    let work: Vec<&Stop> = valid.iter().flat_map(|t| t.stops.iter()).collect();
    let mut results = enrich_all(&work, vocabulary, workers).into_iter();

    for tour in valid {
        let mut stops = Vec::with_capacity(tour.stops.len());
        for stop in &tour.stops {
            match results.next() {
                Some(Ok(enriched)) => stops.push(enriched),
                Some(Err(source)) => {
                    warn!(tour = %tour.id, stop = %stop.id, error = %source, "stop excluded");
                    report.failures.push(TrailsError::Stop {
                        tour_id: tour.id.clone(),
                        stop_id: stop.id.clone(),
                        source,
                    });
                }
                None => (),
            }
        }
        report.tours.push(Tour { id: tour.id.clone(), name: tour.name.clone(), stops });
    }
    info!(
        tours = report.tours.len(),
        stops = report.stop_count(),
        failures = report.failures.len(),
        "batch enriched"
    );
    report
}

type Enriched = std::result::Result<Stop, VocabularyError>;

// results come back in the order of `work`
fn enrich_all(work: &[&Stop], vocabulary: &SpeciesVocabulary, workers: usize) -> Vec<Enriched> {
    let run = || -> Vec<Enriched> { work.par_iter().map(|s| enrich_stop(s, vocabulary)).collect() };
    match ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => pool.install(run),
        Err(e) => {
            warn!(workers, error = %e, "no dedicated pool, using the global one");
            run()
        }
    }
}

/// Folds every stop that mentions no species into the stop before it, so a
/// paragraph about the path between two trees stays with the tree it follows.
/// The grown stop is enriched again and the tour is renumbered 1, 2, 3, ...
/// The first stop of a tour, and the introduction and back matter, are never
/// folded.
pub fn merge_unmentioned(report: BatchReport, vocabulary: &SpeciesVocabulary) -> BatchReport {
    let BatchReport { tours, failures } = report;
    let tours = tours
        .into_iter()
        .map(|tour| if is_matter_tour(&tour.id) { tour } else { merge_tour(tour, vocabulary) })
        .collect();
    BatchReport { tours, failures }
}

fn merge_tour(tour: Tour, vocabulary: &SpeciesVocabulary) -> Tour {
    // each stop with the unmentioned stops that follow it
    let mut groups: Vec<(Stop, Vec<Stop>)> = Vec::new();
    for stop in tour.stops {
        match groups.last_mut() {
            Some((_, followers)) if stop.species_refs.is_empty() => followers.push(stop),
            _ => groups.push((stop, Vec::new())),
        }
    }

    let mut stops = Vec::new();
    for (head, followers) in groups {
        if followers.is_empty() {
            stops.push(head);
            continue;
        }
        let mut grown = head.clone();
        for follower in &followers {
            grown.raw_excerpt.push_str("\n\n");
            grown.raw_excerpt.push_str(&follower.raw_excerpt);
        }
        match enrich_stop(&grown, vocabulary) {
            Ok(enriched) => {
                debug!(stop = %head.id, folded = followers.len(), "unmentioned stops folded");
                stops.push(enriched);
            }
            Err(e) => {
                warn!(stop = %head.id, error = %e, "stops kept apart");
                stops.push(head);
                stops.extend(followers);
            }
        }
    }

    for (sequence, stop) in (1..).zip(stops.iter_mut()) {
        renumber(stop, &tour.id, sequence);
    }
    Tour { id: tour.id, name: tour.name, stops }
}

// generated ids and names follow the new sequence, delivered ones are kept
fn renumber(stop: &mut Stop, tour_id: &str, sequence: u32) {
    if stop.id == format!("{tour_id}-{}", stop.sequence) {
        stop.id = format!("{tour_id}-{sequence}");
    }
    if stop.name == format!("TOUR {tour_id} · {}", stop.sequence) {
        stop.name = format!("TOUR {tour_id} · {sequence}");
    }
    stop.sequence = sequence;
}
