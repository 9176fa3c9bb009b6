pub mod config;
pub mod models;

pub use config::ExtractionConfig;
pub use models::{now_rfc3339, Product, SizeChart, StoreResult};
