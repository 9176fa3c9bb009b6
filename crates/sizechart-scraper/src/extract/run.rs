//! Store orchestration.
//!
//! One store is processed strictly sequentially: discovery, then one
//! product at a time, every network request paced by the store's shared
//! [`RequestPacer`]. Stores run concurrently with each other, bounded by
//! `concurrent_stores`, and output order always matches input order.

use std::time::Duration;

use futures::stream::{self, StreamExt};

use sizechart_core::{now_rfc3339, ExtractionConfig, StoreResult};

use crate::client::{store_origin, StoreClient};
use crate::error::ExtractError;
use crate::extract::registry::{normalize_domain, strategy_for_store};
use crate::extract::strategy::{StoreContext, StoreStrategy};
use crate::pacer::RequestPacer;
use crate::vision::VisionClient;

/// Extracts size charts for every store, at most `concurrent_stores` in
/// flight at once. Results come back in input order; a failed store
/// yields an empty result carrying the error rather than being dropped.
pub async fn extract_stores(config: &ExtractionConfig, stores: &[String]) -> Vec<StoreResult> {
    stream::iter(stores)
        .map(|store| extract_store(config, store))
        .buffered(config.concurrent_stores.max(1))
        .collect()
        .await
}

/// Extracts size charts from one store. Infallible by design: any
/// store-level failure is folded into the returned result's errors.
pub async fn extract_store(config: &ExtractionConfig, store_url: &str) -> StoreResult {
    let store_name = normalize_domain(store_url);
    tracing::info!(store = %store_name, "extracting store");

    match extract_store_inner(config, store_url, &store_name).await {
        Ok(result) => {
            tracing::info!(
                store = %store_name,
                products = result.products.len(),
                errors = result.errors.len(),
                "store finished"
            );
            result
        }
        Err(e) => {
            tracing::error!(store = %store_name, error = %e, "store failed");
            StoreResult::failed(&store_name, e.to_string())
        }
    }
}

async fn extract_store_inner(
    config: &ExtractionConfig,
    store_url: &str,
    store_name: &str,
) -> Result<StoreResult, ExtractError> {
    let origin = store_origin(store_url)?;
    let client = StoreClient::new(
        config.timeout_secs,
        &config.user_agent,
        config.max_retries,
        config.backoff_base_secs,
    )?;
    let pacer = RequestPacer::new(Duration::from_secs_f64(config.rate_limit_delay_secs.max(0.0)));
    let vision = match &config.gemini_api_key {
        Some(key) => Some(VisionClient::new(
            key.clone(),
            config.gemini_model.clone(),
            config.timeout_secs,
        )?),
        None => None,
    };

    let ctx = StoreContext {
        client,
        pacer,
        origin,
        vision,
        user_agent: config.user_agent.clone(),
    };
    let strategy = strategy_for_store(store_url);
    // No early return between here and release(): the strategy may hold
    // a browser process.
    let outcome = drive_store(config, &ctx, strategy.as_ref(), store_name).await;
    strategy.release().await;
    outcome
}

async fn drive_store(
    config: &ExtractionConfig,
    ctx: &StoreContext,
    strategy: &dyn StoreStrategy,
    store_name: &str,
) -> Result<StoreResult, ExtractError> {
    let product_urls = strategy
        .discover_products(ctx, config.max_products_per_store)
        .await?;
    tracing::info!(store = store_name, products = product_urls.len(), "discovery complete");

    let (products, errors) = run_products(ctx, strategy, &product_urls).await;

    Ok(StoreResult {
        store_name: store_name.to_owned(),
        extraction_date: now_rfc3339(),
        products,
        errors,
    })
}

/// Runs every product through the strategy, demoting per-product errors
/// to recorded strings.
async fn run_products(
    ctx: &StoreContext,
    strategy: &dyn StoreStrategy,
    product_urls: &[String],
) -> (Vec<sizechart_core::Product>, Vec<String>) {
    let mut products = Vec::new();
    let mut errors = Vec::new();

    for url in product_urls {
        match strategy.extract_product(ctx, url).await {
            Ok(Some(product)) => {
                tracing::debug!(url, title = %product.title, "extracted product chart");
                products.push(product);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(url, error = %e, "product extraction failed");
                errors.push(format!("{url}: {e}"));
            }
        }
    }

    (products, errors)
}
