// Run configuration, read with the config crate from an optional TOML file
// and TREETRAILS_* environment variables on top of built-in defaults.
use config::{Config, Environment, File};
use regex::Regex;
use serde::Deserialize;
use std::path::PathBuf;

use lazy_static::lazy_static;

use crate::error::{Result, TrailsError};
use crate::pipeline::default_workers;
use crate::render::{DEFAULT_RGB, Formatting};
use crate::segment::{Correction, SegmentOptions, book_corrections};

lazy_static! {
    static ref RGB: Regex = Regex::new(r"^\s*\d{1,3}\s*,\s*\d{1,3}\s*,\s*\d{1,3}\s*$").unwrap();
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub vocabulary_path: PathBuf,
    pub tours_path: Option<PathBuf>,
    /// When set, the book is segmented instead of reading `tours_path`.
    pub book_path: Option<PathBuf>,
    /// Standard output when absent.
    pub output_path: Option<PathBuf>,
    /// 0 means one worker per available core.
    pub workers: usize,
    pub formatting: Formatting,
    pub highlight_rgb: String,
    pub lead_in_chars: usize,
    /// Fold stops without species mentions into the stop before them.
    pub merge_unmentioned: bool,
    #[serde(default = "book_corrections")]
    pub typos: Vec<Correction>,
}

impl Settings {
    /// Reads `path` when given, otherwise `treetrails.toml` if it exists.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let file = match path {
            Some(p) => File::with_name(p).required(true),
            None => File::with_name("treetrails").required(false),
        };
        let settings: Settings = Config::builder()
            .set_default("vocabulary_path", "tree_species.json")?
            .set_default("workers", 0_i64)?
            .set_default("formatting", "memento")?
            .set_default("highlight_rgb", DEFAULT_RGB)?
            .set_default("lead_in_chars", 35_i64)?
            .set_default("merge_unmentioned", true)?
            .add_source(file)
            .add_source(Environment::with_prefix("TREETRAILS").try_parsing(true))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tours_path.is_none() && self.book_path.is_none() {
            return Err(TrailsError::Config("either tours_path or book_path must be set".into()));
        }
        if !RGB.is_match(&self.highlight_rgb) {
            return Err(TrailsError::Config(format!(
                "highlight_rgb '{}' is not of the form 'r, g, b'",
                self.highlight_rgb
            )));
        }
        if self.lead_in_chars == 0 {
            return Err(TrailsError::Config("lead_in_chars must be positive".into()));
        }
        Ok(())
    }

    pub fn worker_count(&self) -> usize {
        if self.workers == 0 { default_workers() } else { self.workers }
    }

    pub fn segment_options(&self) -> SegmentOptions {
        SegmentOptions { corrections: self.typos.clone(), lead_in_chars: self.lead_in_chars }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            vocabulary_path: PathBuf::from("tree_species.json"),
            tours_path: Some(PathBuf::from("tours.json")),
            book_path: None,
            output_path: None,
            workers: 0,
            formatting: Formatting::Memento,
            highlight_rgb: DEFAULT_RGB.to_string(),
            lead_in_chars: 35,
            merge_unmentioned: true,
            typos: book_corrections(),
        }
    }

    #[test]
    fn defaults_are_valid() {
        let settings = settings();
        assert!(settings.validate().is_ok());
        assert!(settings.worker_count() >= 1);
    }

    #[test]
    fn rejects_missing_inputs_and_bad_colors() {
        let mut missing = settings();
        missing.tours_path = None;
        assert!(matches!(missing.validate(), Err(TrailsError::Config(_))));
        let mut color = settings();
        color.highlight_rgb = "purple".to_string();
        assert!(matches!(color.validate(), Err(TrailsError::Config(_))));
    }
}
