//! Size-chart location in HTML documents.
//!
//! Split into scoring (which `<table>` looks like a size chart) and
//! normalization (turning that table into headers plus row records).

pub mod normalize;
pub mod score;

pub use normalize::{clean_text, normalize_table};
pub use score::{score_tables, ScoredTable};

use scraper::Html;
use sizechart_core::SizeChart;

/// Locates the size chart in a rendered or fetched HTML document.
///
/// Only the highest-scored candidate table is considered. If it
/// normalizes to empty headers or zero rows, no other candidate is tried
/// and the result is `None` — a lower-scored table that happens to
/// normalize is more likely a false positive than the real chart.
#[must_use]
pub fn locate_size_chart(html: &str) -> Option<SizeChart> {
    let document = Html::parse_document(html);
    let candidates = score_tables(&document);
    let best = candidates.first()?;

    let (headers, rows) = normalize_table(best.table);
    if headers.is_empty() || rows.is_empty() {
        tracing::debug!(
            score = best.score,
            "top candidate did not normalize to a usable chart"
        );
        return None;
    }

    tracing::debug!(
        score = best.score,
        columns = headers.len(),
        rows = rows.len(),
        "located size chart"
    );
    Some(SizeChart { headers, rows })
}
