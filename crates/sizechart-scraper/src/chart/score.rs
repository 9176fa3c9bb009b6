//! Heuristic size-chart table scoring.
//!
//! No single signal reliably identifies a size chart: keyword matching
//! alone over-triggers on "Size" appearing in unrelated text, and pattern
//! matching alone under-triggers on charts spelled out as "Small" /
//! "Medium". Signals are therefore summed and thresholded.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::chart::normalize::normalize_table;

/// Keywords whose presence in a table's text each add +0.1 confidence.
/// Substring match on lowercased text, not word-boundary.
pub(crate) const SIZE_KEYWORDS: [&str; 16] = [
    "size",
    "chart",
    "measurement",
    "dimension",
    "sizing",
    "fit",
    "length",
    "width",
    "chest",
    "waist",
    "hip",
    "shoulder",
    "sleeve",
    "bust",
    "inseam",
    "size guide",
];

/// Ancestor class/id fragments that mark a size-chart container.
const ANCESTOR_MARKERS: [&str; 3] = ["size", "chart", "sizing"];

/// Minimum confidence for a table to be kept as a candidate.
const CANDIDATE_THRESHOLD: f64 = 0.3;

/// A table element paired with its heuristic confidence score.
///
/// The score is unbounded above by construction but practically saturates
/// around 1.5; it is a threshold input, not a calibrated probability.
pub struct ScoredTable<'a> {
    pub table: ElementRef<'a>,
    pub score: f64,
}

/// Scores every `<table>` in the document and returns the candidates
/// scoring above the threshold, sorted by descending score. Ties keep
/// document order (stable sort).
#[must_use]
#[allow(clippy::missing_panics_doc)] // selector and regexes are constants
pub fn score_tables(document: &Html) -> Vec<ScoredTable<'_>> {
    let table_sel = Selector::parse("table").expect("valid selector");

    // Word-boundary size tokens, 2-3 digit values with a length unit, and
    // measurement labels followed by a number.
    let patterns = [
        Regex::new(r#"(?i)\b(xs|s|m|l|xl|xxl|xxxl|small|medium|large)\b"#).expect("valid regex"),
        Regex::new(r#"(?i)\b\d{2,3}\s*(cm|inch|in|")"#).expect("valid regex"),
        Regex::new(r"(?i)\b(chest|waist|hip|bust)\s*[:=]?\s*\d+").expect("valid regex"),
    ];

    let mut candidates: Vec<ScoredTable<'_>> = Vec::new();

    for table in document.select(&table_sel) {
        let mut confidence = 0.0f64;
        let text = table.text().collect::<String>().to_lowercase();

        for keyword in SIZE_KEYWORDS {
            if text.contains(keyword) {
                confidence += 0.1;
            }
        }

        for pattern in &patterns {
            let matches = pattern.find_iter(&text).count();
            if matches > 0 {
                #[allow(clippy::cast_precision_loss)]
                let saturated = (matches as f64 / 5.0).min(1.0);
                confidence += 0.2 * saturated;
            }
        }

        // Speculative normalization: a table that yields usable structure
        // with size-flavored headers and a plausible row count is more
        // likely a chart than a layout table or an unrelated data grid.
        let (headers, rows) = normalize_table(table);
        if !headers.is_empty() && !rows.is_empty() {
            let header_text = headers.join(" ").to_lowercase();
            if SIZE_KEYWORDS.iter().any(|kw| header_text.contains(kw)) {
                confidence += 0.2;
            }
            if (2..=20).contains(&rows.len()) {
                confidence += 0.1;
            }
        }

        if has_size_labeled_ancestor(table) {
            confidence += 0.3;
        }

        if confidence > CANDIDATE_THRESHOLD {
            candidates.push(ScoredTable {
                table,
                score: confidence,
            });
        }
    }

    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    candidates
}

/// Walks ancestors up to (but not including) `<body>`, returning `true`
/// on the first ancestor whose class list or id contains a size marker.
fn has_size_labeled_ancestor(table: ElementRef<'_>) -> bool {
    for node in table.ancestors() {
        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };
        if element.value().name() == "body" {
            break;
        }
        let mut label: String = element.value().classes().collect::<Vec<_>>().join(" ");
        if let Some(id) = element.value().attr("id") {
            label.push(' ');
            label.push_str(id);
        }
        let label = label.to_lowercase();
        if ANCESTOR_MARKERS.iter().any(|m| label.contains(m)) {
            return true;
        }
    }
    false
}

#[cfg(test)]
#[path = "score_test.rs"]
mod tests;
