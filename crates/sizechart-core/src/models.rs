//! Output data model for size-chart extraction.
//!
//! ## Shape of the aggregated output file
//!
//! The CLI writes a JSON array with one object per store:
//!
//! ```json
//! [{
//!   "store_name": "westside.com",
//!   "extraction_date": "2025-06-01T12:00:00Z",
//!   "products": [{
//!     "product_title": "Linen Shirt",
//!     "product_url": "https://westside.com/products/linen-shirt",
//!     "size_chart": {
//!       "headers": ["Size", "Chest", "Waist"],
//!       "rows": [{"Size": "S", "Chest": "36", "Waist": "30"}]
//!     }
//!   }],
//!   "errors": ["..."]
//! }]
//! ```
//!
//! `errors` is present only when non-empty. Products without a size chart
//! never appear in `products` — the per-store pipeline filters them out
//! before the result is frozen.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A normalized size chart: ordered column headers plus one mapping per
/// body row.
///
/// `headers` order is load-bearing — cell values are assigned to headers
/// by column position at extraction time. Every key in any row mapping is
/// guaranteed to appear in `headers`, because row construction iterates
/// the discovered headers; a row may omit keys (sparse cells) but never
/// invent them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeChart {
    pub headers: Vec<String>,
    pub rows: Vec<BTreeMap<String, String>>,
}

impl SizeChart {
    /// `true` when either headers or rows are empty — callers treat such
    /// charts as "not found".
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() || self.rows.is_empty()
    }
}

/// A product with an optional size chart.
///
/// `title` is required for inclusion; products whose title cannot be
/// resolved are skipped upstream. The serialized key names match the
/// output-file contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "product_title")]
    pub title: String,
    #[serde(rename = "product_url")]
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_chart: Option<SizeChart>,
}

/// Aggregated extraction result for one store.
///
/// Accumulates products and error strings during processing, then is
/// frozen (extraction_date stamped) and serialized. Never shared across
/// stores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreResult {
    /// Store domain (e.g. `westside.com`).
    pub store_name: String,
    /// RFC 3339 UTC timestamp set once when store processing finishes.
    pub extraction_date: String,
    /// Only products that have a size chart.
    pub products: Vec<Product>,
    /// Human-readable error strings accumulated during processing.
    /// Errors never abort the store; they are recorded here instead.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl StoreResult {
    /// An empty result for a store that failed before producing anything.
    #[must_use]
    pub fn failed(store_name: &str, error: String) -> Self {
        Self {
            store_name: store_name.to_owned(),
            extraction_date: now_rfc3339(),
            products: Vec::new(),
            errors: vec![error],
        }
    }
}

/// Current UTC time formatted as RFC 3339 with second precision.
#[must_use]
pub fn now_rfc3339() -> String {
    chrono::Utc::now()
        .to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
