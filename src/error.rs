// Unified error type for treetrails
use thiserror::Error;

use crate::model::SpeciesId;

/// Integrity problems with the species vocabulary. All of these are fatal
/// to a run: a vocabulary that trips one of them cannot be trusted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VocabularyError {
    #[error("Surface form '{form}' is declared by both {first} and {second}")]
    SurfaceFormCollision { form: String, first: SpeciesId, second: SpeciesId },
    #[error("Species {0} is declared more than once")]
    DuplicateSpecies(SpeciesId),
    #[error("Species {0} has no usable surface form")]
    EmptySpecies(SpeciesId),
    #[error("Species record with canonical name '{0}' has a blank id")]
    BlankId(String),
    #[error("Surface form '{form}' of {species} cannot be compiled: {message}")]
    InvalidForm { form: String, species: SpeciesId, message: String },
    #[error("Mention at {start}..{end} is claimed equally by {first} and {second}")]
    AmbiguousMention { start: usize, end: usize, first: SpeciesId, second: SpeciesId },
}

#[derive(Error, Debug)]
pub enum TrailsError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Vocabulary error: {0}")]
    Vocabulary(#[from] VocabularyError),
    #[error("Segmentation error in tour {tour_id} at stop {stop_id}: expected sequence {expected}, found {found}")]
    Segmentation { tour_id: String, stop_id: String, expected: u32, found: u32 },
    #[error("Stop {stop_id} of tour {tour_id} failed: {source}")]
    Stop {
        tour_id: String,
        stop_id: String,
        #[source]
        source: VocabularyError,
    },
    #[error("I/O error: {0}")]
    Io(String),
    #[error("JSON error: {0}")]
    Json(String),
}

pub type Result<T> = std::result::Result<T, TrailsError>;

// Helper conversions
impl From<std::io::Error> for TrailsError {
    fn from(e: std::io::Error) -> Self { Self::Io(e.to_string()) }
}
impl From<serde_json::Error> for TrailsError {
    fn from(e: serde_json::Error) -> Self { Self::Json(e.to_string()) }
}
impl From<config::ConfigError> for TrailsError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
