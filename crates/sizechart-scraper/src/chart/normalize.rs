//! Table-to-structured-data extraction.
//!
//! Converts one HTML `<table>` element into ordered headers plus
//! header-keyed row records. Header inference prefers an explicit
//! `<thead>`; without one, the first row is used only when every cell is
//! a `<th>` or every cell carries a class containing "header" — otherwise
//! headers stay empty and the caller must treat the table as unusable.

use std::collections::BTreeMap;

use scraper::{ElementRef, Selector};

/// Cleans extracted cell text: zero-width spaces and non-breaking spaces
/// become plain spaces, runs of whitespace collapse to one space, and the
/// result is trimmed.
#[must_use]
pub fn clean_text(text: &str) -> String {
    let replaced: String = text
        .chars()
        .map(|c| if c == '\u{200b}' || c == '\u{a0}' { ' ' } else { c })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn cell_text(cell: ElementRef<'_>) -> String {
    clean_text(&cell.text().collect::<String>())
}

/// Extracts `(headers, rows)` from a table element.
///
/// Rows come from the `<tbody>` if present, otherwise the whole table.
/// Rules applied per row:
/// - rows with zero cells are skipped;
/// - a row whose cleaned cell text exactly restates the header row is
///   skipped (headers re-stated as data);
/// - cells are zipped to headers by position; cells beyond the header
///   count are dropped;
/// - a cell containing a `span.default` child contributes that child's
///   text instead of the full cell text, with a " CM" suffix when the
///   column is not the first header (source-site convention: the default
///   unit value is embedded in a wrapper element);
/// - rows whose resulting mapping is empty are dropped.
#[must_use]
#[allow(clippy::missing_panics_doc)] // selectors are compile-time constants
pub fn normalize_table(table: ElementRef<'_>) -> (Vec<String>, Vec<BTreeMap<String, String>>) {
    let tr_sel = Selector::parse("tr").expect("valid selector");
    let cell_sel = Selector::parse("th, td").expect("valid selector");
    let thead_sel = Selector::parse("thead").expect("valid selector");
    let tbody_sel = Selector::parse("tbody").expect("valid selector");
    let default_sel = Selector::parse("span.default").expect("valid selector");

    let mut headers: Vec<String> = Vec::new();
    if let Some(thead) = table.select(&thead_sel).next() {
        if let Some(header_row) = thead.select(&tr_sel).next() {
            headers = header_row.select(&cell_sel).map(cell_text).collect();
        }
    }

    if headers.is_empty() {
        if let Some(first_row) = table.select(&tr_sel).next() {
            let cells: Vec<ElementRef<'_>> = first_row.select(&cell_sel).collect();
            if !cells.is_empty() && (all_th(&cells) || all_header_classed(&cells)) {
                headers = cells.iter().map(|c| cell_text(*c)).collect();
            }
        }
    }

    let body_rows: Vec<ElementRef<'_>> = match table.select(&tbody_sel).next() {
        Some(tbody) => tbody.select(&tr_sel).collect(),
        None => table.select(&tr_sel).collect(),
    };

    let mut rows: Vec<BTreeMap<String, String>> = Vec::new();
    for row in body_rows {
        let cells: Vec<ElementRef<'_>> = row.select(&cell_sel).collect();
        if cells.is_empty() {
            continue;
        }

        let cell_texts: Vec<String> = cells.iter().map(|c| cell_text(*c)).collect();
        if !headers.is_empty() && cell_texts == headers {
            continue;
        }

        let mut record = BTreeMap::new();
        for (i, cell) in cells.iter().enumerate() {
            let Some(header) = headers.get(i) else {
                // Cells beyond the header count carry no column meaning.
                break;
            };
            let value = match cell.select(&default_sel).next() {
                Some(default_span) => {
                    let inner = clean_text(&default_span.text().collect::<String>());
                    if header == &headers[0] {
                        inner
                    } else {
                        format!("{inner} CM")
                    }
                }
                None => cell_texts[i].clone(),
            };
            record.insert(header.clone(), value);
        }

        if !record.is_empty() {
            rows.push(record);
        }
    }

    (headers, rows)
}

fn all_th(cells: &[ElementRef<'_>]) -> bool {
    cells.iter().all(|c| c.value().name() == "th")
}

fn all_header_classed(cells: &[ElementRef<'_>]) -> bool {
    cells
        .iter()
        .all(|c| c.value().classes().any(|class| class.contains("header")))
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
