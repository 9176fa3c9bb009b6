//! Per-store extraction: strategy trait and implementations, the
//! domain-keyed registry, and the store orchestration loop.

mod registry;
mod run;
mod strategy;

pub use registry::{normalize_domain, strategy_for_store};
pub use run::{extract_store, extract_stores};
pub use strategy::{
    HtmlStrategy, RenderedChartStrategy, RenderedImageStrategy, StoreContext, StoreStrategy,
};
