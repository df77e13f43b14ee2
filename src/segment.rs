// Splits the raw book text into tours and stops.
//
// This is the thin preprocessing step in front of the enrichment pipeline.
// Every "TOUR <n>" heading opens a tour and every paragraph within a tour
// becomes a stop, the heading paragraph itself being stop 1. Text before the
// first heading is the introduction tour: a "Front Matter" stop up to the
// table of contents and an "INTRODUCTION" stop after that heading. From the
// "FOOTNOTE" marker onwards is the back matter tour: the footnote and "A WORD
// ABOUT THE AUTHOR".
use regex::Regex;
use serde::{Deserialize, Serialize};

use lazy_static::lazy_static;
use tracing::debug;

use crate::model::{Stop, Tour};

pub const INTRODUCTION_TOUR: &str = "intro";
pub const BACK_MATTER_TOUR: &str = "back";

/// The introduction and back matter tours carry book text, not trails.
pub fn is_matter_tour(tour_id: &str) -> bool {
    tour_id == INTRODUCTION_TOUR || tour_id == BACK_MATTER_TOUR
}

lazy_static! {
    static ref TOUR_HEADING: Regex = Regex::new(r"(?m)^[ \t]*TOUR[ \t]+([0-9]+|[IVX]+)\b").unwrap();
    static ref BACK_MATTER: Regex = Regex::new(r"(?m)^[ \t]*FOOTNOTE").unwrap();
    static ref CONTENTS: Regex = Regex::new(r"(?m)^[ \t]*TABLE\b").unwrap();
    static ref INTRODUCTION: Regex = Regex::new(r"(?m)^[ \t]*INTRODUCTION\b[ \t]*").unwrap();
    static ref ABOUT_THE_AUTHOR: Regex = Regex::new(r"(?m)^[ \t]*A WORD ABOUT\b").unwrap();
    static ref PARAGRAPH_BREAK: Regex = Regex::new(r"\n[ \t]*\n\s*").unwrap();
    static ref SPACES: Regex = Regex::new(r"[ \t]+").unwrap();
}

/// A literal find/replace applied to the whole book before segmentation,
/// used to repair OCR typos in species names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    pub find: String,
    pub replace: String,
}

impl Correction {
    pub fn new(find: &str, replace: &str) -> Self {
        Self { find: find.to_string(), replace: replace.to_string() }
    }
}

/// Typos known to be present in the scanned book.
pub fn book_corrections() -> Vec<Correction> {
    vec![
        Correction::new("Comus florida", "Cornus florida"),
        Correction::new("anwricana", "americana"),
        Correction::new("veluntina", "velutina"),
        Correction::new("Uhnus procera", "Ulmus procera"),
        Correction::new("Tilia europea", "Tilia europaea"),
        Correction::new("P. onentalis", "P. orientalis"),
        Correction::new("P. strobits", "P. strobus"),
    ]
}

#[derive(Debug, Clone)]
pub struct SegmentOptions {
    pub corrections: Vec<Correction>,
    pub lead_in_chars: usize,
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self { corrections: book_corrections(), lead_in_chars: 35 }
    }
}

pub fn apply_corrections(text: &str, corrections: &[Correction]) -> String {
    corrections
        .iter()
        .fold(text.to_string(), |text, c| text.replace(&c.find, &c.replace))
}

/// The first `chars` characters of the text on a single line, followed by "...".
pub fn lead_in(text: &str, chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut lead: String = flat.chars().take(chars).collect();
    lead.push_str("...");
    lead
}

// collapses runs of spaces inside each line and trims the line ends
fn tidy_paragraph(paragraph: &str) -> String {
    paragraph
        .lines()
        .map(|line| SPACES.replace_all(line.trim(), " ").into_owned())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn paragraphs(text: &str) -> Vec<String> {
    PARAGRAPH_BREAK
        .split(text)
        .map(tidy_paragraph)
        .filter(|p| !p.is_empty())
        .collect()
}

// one titled stop per non-empty section, numbered in order
fn matter_tour(
    id: &str,
    name: &str,
    sections: &[(&str, &str)],
    options: &SegmentOptions,
) -> Option<Tour> {
    let stops: Vec<Stop> = sections
        .iter()
        .map(|(title, text)| (title, paragraphs(text).join("\n\n")))
        .filter(|(_, text)| !text.is_empty())
        .zip(1..)
        .map(|((title, text), sequence)| {
            let mut stop = Stop::new(id, sequence, &text);
            stop.name = title.to_string();
            stop.description = lead_in(&text, options.lead_in_chars);
            stop
        })
        .collect();
    debug!(tour = %id, stops = stops.len(), "matter segmented");
    (!stops.is_empty()).then(|| Tour { id: id.to_string(), name: name.to_string(), stops })
}

fn introduction(prelude: &str, options: &SegmentOptions) -> Option<Tour> {
    let intro = INTRODUCTION.find(prelude);
    let front_end = [CONTENTS.find(prelude).map(|m| m.start()), intro.map(|m| m.start())]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(prelude.len());
    let intro_text = intro.map_or("", |m| &prelude[m.end()..]);
    let sections = [("Front Matter", &prelude[..front_end]), ("INTRODUCTION", intro_text)];
    matter_tour(INTRODUCTION_TOUR, "Introduction", &sections, options)
}

fn back_matter(back: &str, options: &SegmentOptions) -> Option<Tour> {
    let split = ABOUT_THE_AUTHOR.find(back).map_or(back.len(), |m| m.start());
    let about = back[split..].replace("Top of page", "");
    let sections = [
        ("FOOTNOTE TO TREE TRAILS", &back[..split]),
        ("A WORD ABOUT THE AUTHOR", about.as_str()),
    ];
    matter_tour(BACK_MATTER_TOUR, "Back matter", &sections, options)
}

pub fn segment_book(text: &str, options: &SegmentOptions) -> Vec<Tour> {
    let text = apply_corrections(text, &options.corrections).replace('\u{a0}', " ");
    let (body, back) = match BACK_MATTER.find(&text) {
        Some(m) => text.split_at(m.start()),
        None => (&text[..], ""),
    };
    let headings: Vec<(usize, String)> = TOUR_HEADING
        .captures_iter(body)
        .filter_map(|c| Some((c.get(0)?.start(), c.get(1)?.as_str().to_string())))
        .collect();
    let prelude = headings.first().map_or(body, |(start, _)| &body[..*start]);

    let mut tours = Vec::with_capacity(headings.len() + 2);
    tours.extend(introduction(prelude, options));
    for (i, (start, number)) in headings.iter().enumerate() {
        let end = headings.get(i + 1).map_or(body.len(), |(next, _)| *next);
        let stops = paragraphs(&body[*start..end])
            .into_iter()
            .zip(1..)
            .map(|(paragraph, sequence)| {
                let mut stop = Stop::new(number, sequence, &paragraph);
                stop.name = format!("TOUR {number} · {sequence}");
                stop.description = lead_in(&paragraph, options.lead_in_chars);
                stop
            })
            .collect::<Vec<_>>();
        debug!(tour = %number, stops = stops.len(), "tour segmented");
        tours.push(Tour { id: number.clone(), name: format!("TOUR {number}"), stops });
    }
    tours.extend(back_matter(back, options));
    tours
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOOK: &str = "Tree Trails in Prospect Park\n\nINTRODUCTION\nSome words.\n\n\
TOUR 1\nStart at the Grand Army Plaza.\n\n\
Here stands a Comus florida,   the flowering dogwood,\nnear the path.\n\n  \n\
TOUR 2\nAt the boathouse.\n\nA White Pine.\n\n\
FOOTNOTE\nTOUR 3 is not a tour.";

    #[test]
    fn splits_tours_and_paragraphs() {
        let tours = segment_book(BOOK, &SegmentOptions::default());
        let ids: Vec<&str> = tours.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["intro", "1", "2", "back"]);
        let first = &tours[1];
        assert_eq!(first.stops.len(), 2);
        assert_eq!(first.stops[0].raw_excerpt, "TOUR 1\nStart at the Grand Army Plaza.");
        assert_eq!(
            first.stops[1].raw_excerpt,
            "Here stands a Cornus florida, the flowering dogwood,\nnear the path."
        );
        let second = &tours[2];
        assert_eq!(second.stops.len(), 2);
        assert_eq!(second.stops[1].id, "2-2");
        assert_eq!(second.stops[1].tour_id, "2");
        assert_eq!(second.stops[1].name, "TOUR 2 · 2");
    }

    #[test]
    fn front_and_back_matter_become_titled_stops() {
        let tours = segment_book(BOOK, &SegmentOptions::default());
        let intro = &tours[0];
        assert_eq!(intro.name, "Introduction");
        let titles: Vec<&str> = intro.stops.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(titles, ["Front Matter", "INTRODUCTION"]);
        assert_eq!(intro.stops[0].raw_excerpt, "Tree Trails in Prospect Park");
        assert_eq!(intro.stops[1].raw_excerpt, "Some words.");
        assert_eq!(intro.stops[1].id, "intro-2");
        let back = &tours[3];
        assert_eq!(back.stops.len(), 1);
        assert_eq!(back.stops[0].name, "FOOTNOTE TO TREE TRAILS");
        assert_eq!(back.stops[0].raw_excerpt, "FOOTNOTE\nTOUR 3 is not a tour.");
    }

    #[test]
    fn table_of_contents_is_left_out() {
        let book = "Tree Trails\n\nTABLE OF CONTENTS\nTour 1 .... 3\n\nINTRODUCTION\nWelcome.\n\n\
TOUR 1\nGo.\n\nFOOTNOTE\nA note.\n\nA WORD ABOUT THE AUTHOR\nShe walked.\nTop of page";
        let tours = segment_book(book, &SegmentOptions::default());
        assert_eq!(tours[0].stops[0].raw_excerpt, "Tree Trails");
        assert_eq!(tours[0].stops[1].raw_excerpt, "Welcome.");
        let back = &tours[2].stops;
        assert_eq!(back[0].raw_excerpt, "FOOTNOTE\nA note.");
        assert_eq!(back[1].name, "A WORD ABOUT THE AUTHOR");
        assert_eq!(back[1].raw_excerpt, "A WORD ABOUT THE AUTHOR\nShe walked.");
        assert!(is_matter_tour(&tours[2].id));
        assert!(!is_matter_tour(&tours[1].id));
    }

    #[test]
    fn lead_in_is_flattened_and_cut() {
        assert_eq!(lead_in("Here stands\na dogwood", 13), "Here stands a...");
        assert_eq!(lead_in("Short", 35), "Short...");
    }

    #[test]
    fn text_without_tours_is_all_front_matter() {
        let tours = segment_book("Just an introduction.", &SegmentOptions::default());
        assert_eq!(tours.len(), 1);
        assert_eq!(tours[0].stops[0].name, "Front Matter");
        assert!(segment_book("", &SegmentOptions::default()).is_empty());
    }
}
