//! Treetrails – tree species mentions in *Tree Trails in Prospect Park* (1968).
//!
//! The book walks its reader through four tours of the park, stop by stop,
//! naming the trees along the way by common name ("American Beech"), by
//! scientific name ("Fagus grandifolia") or by abbreviated scientific name
//! ("F. grandifolia"). Treetrails finds those mentions in the prose of each
//! stop, links every one of them to a canonical species record, and hands
//! back enriched stops ready to be exported to a database application.
//!
//! The pipeline runs strictly forward:
//! * [`vocabulary::SpeciesVocabulary`] – immutable surface form → species lookup,
//!   built once from species metadata. Collisions are rejected at build time.
//! * [`matcher::find_candidates`] – every occurrence of every surface form,
//!   case-insensitive and word-boundary respecting, overlaps included.
//! * [`resolver::resolve`] – one deterministic sweep that leaves a disjoint,
//!   start-ordered set of mentions (longest span, then specificity, then
//!   earliest start).
//! * [`assembler::assemble`] – species references in first-appearance order
//!   plus the excerpt with structural highlight markers.
//!
//! [`pipeline::enrich_tours`] runs the above over whole tours with stops spread
//! across worker threads, and reports tours or stops it had to leave out.
//!
//! Around the core:
//! * [`segment`] – splits the raw book into tours and stops.
//! * [`render`] – Memento/Airtable/plain renderings, stop titles.
//! * [`crossref`] – which stops mention which species.
//! * [`settings`] – configuration through the `config` crate.
//!
//! ## Quick Start
//! ```
//! use treetrails::{SpeciesRecord, SpeciesVocabulary, Stop, enrich_stop};
//! let vocabulary = SpeciesVocabulary::build(vec![
//!     SpeciesRecord::new("Q156944", "Ulmus americana").with_forms(&["American Elm"]),
//! ]).unwrap();
//! let stop = enrich_stop(&Stop::new("1", 1, "the American Elm stands tall"), &vocabulary).unwrap();
//! assert_eq!(stop.species_refs.len(), 1);
//! ```

pub mod assembler;
pub mod crossref;
pub mod error;
pub mod matcher;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod resolver;
pub mod segment;
pub mod settings;
pub mod vocabulary;

pub use assembler::{Highlight, HighlightedExcerpt, Segment, assemble};
pub use error::{Result, TrailsError, VocabularyError};
pub use matcher::{Mention, Specificity, find_candidates};
pub use model::{FormKind, Species, SpeciesId, SpeciesRecord, Stop, Tour};
pub use pipeline::{BatchReport, enrich_stop, enrich_tours, merge_unmentioned};
pub use resolver::resolve;
pub use vocabulary::SpeciesVocabulary;
