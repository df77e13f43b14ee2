// treetrails [config.toml]
//
// Reads the species vocabulary and the tours (or the raw book), enriches every
// stop and writes tours, species cross reference and failures as JSON.
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use treetrails::crossref::{SpeciesEntry, species_index};
use treetrails::render::{render_excerpt, stop_title};
use treetrails::segment::segment_book;
use treetrails::settings::Settings;
use treetrails::{
    Result, SpeciesRecord, SpeciesVocabulary, Stop, Tour, enrich_tours, merge_unmentioned,
};

#[derive(Serialize)]
struct RenderedStop<'a> {
    #[serde(flatten)]
    stop: &'a Stop,
    title: String,
    excerpt: String,
}

#[derive(Serialize)]
struct RenderedTour<'a> {
    id: &'a str,
    name: &'a str,
    stops: Vec<RenderedStop<'a>>,
}

#[derive(Serialize)]
struct Output<'a> {
    tours: Vec<RenderedTour<'a>>,
    species: Vec<SpeciesEntry>,
    failures: Vec<String>,
}

fn load_tours(settings: &Settings) -> Result<Vec<Tour>> {
    if let Some(book) = &settings.book_path {
        let text = fs::read_to_string(book)?;
        return Ok(segment_book(&text, &settings.segment_options()));
    }
    match &settings.tours_path {
        Some(path) => {
            let tours: Vec<Tour> = serde_json::from_str(&fs::read_to_string(path)?)?;
            Ok(tours.into_iter().map(Tour::adopt_stops).collect())
        }
        None => Ok(Vec::new()),
    }
}

fn run() -> Result<()> {
    let config_path = std::env::args().nth(1);
    let settings = Settings::load(config_path.as_deref())?;

    let records: Vec<SpeciesRecord> =
        serde_json::from_str(&fs::read_to_string(&settings.vocabulary_path)?)?;
    let vocabulary = SpeciesVocabulary::build(records)?;
    let tours = load_tours(&settings)?;
    info!(
        tours = tours.len(),
        workers = settings.worker_count(),
        formatting = %settings.formatting,
        "enriching"
    );

    let mut report = enrich_tours(&tours, &vocabulary, settings.worker_count());
    if settings.merge_unmentioned {
        report = merge_unmentioned(report, &vocabulary);
    }
    let output = Output {
        tours: report
            .tours
            .iter()
            .map(|tour| RenderedTour {
                id: &tour.id,
                name: &tour.name,
                stops: tour
                    .stops
                    .iter()
                    .map(|stop| RenderedStop {
                        stop,
                        title: stop_title(stop, &vocabulary),
                        excerpt: stop
                            .highlighted_excerpt
                            .as_ref()
                            .map(|e| {
                                render_excerpt(e, settings.formatting, &settings.highlight_rgb)
                            })
                            .unwrap_or_default(),
                    })
                    .collect(),
            })
            .collect(),
        species: species_index(&report.tours, &vocabulary),
        failures: report.failures.iter().map(|e| e.to_string()).collect(),
    };

    let json = serde_json::to_string_pretty(&output)?;
    match &settings.output_path {
        Some(path) => fs::write(path, json)?,
        None => writeln!(io::stdout().lock(), "{json}")?,
    }
    info!(stops = report.stop_count(), failures = report.failures.len(), "done");
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "run failed");
            ExitCode::FAILURE
        }
    }
}
