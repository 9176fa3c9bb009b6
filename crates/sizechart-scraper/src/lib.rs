//! Size-chart extraction engine for Shopify storefronts.
//!
//! Pipeline per store: discover product URLs (feed, collections, or
//! sitemap), then run each product page through the store's extraction
//! strategy (plain HTML, rendered HTML, or rendered image + vision
//! model), producing a [`sizechart_core::StoreResult`].

pub mod chart;
pub mod client;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod pacer;
pub mod render;
pub mod vision;

mod retry;
mod sitemap;

pub use chart::locate_size_chart;
pub use client::{host_of, store_origin, StoreClient};
pub use discovery::discover_product_urls;
pub use error::ExtractError;
pub use extract::{extract_store, extract_stores, normalize_domain};
pub use pacer::RequestPacer;
pub use render::Renderer;
pub use vision::VisionClient;
