//! Product discovery pipeline.
//!
//! Produces an ordered, deduplicated, length-capped list of product-page
//! URLs for a store, trying three strategies in priority order:
//!
//! 1. structured product feed (`/products.json`, page-number pagination),
//! 2. collection crawl (`/collections.json` → per-collection feeds),
//! 3. sitemap crawl (`/sitemap.xml` → nested sitemaps → `/products/` locs).
//!
//! The feed strategy is always attempted first; each later strategy runs
//! only when everything before it yielded nothing. Every strategy demotes
//! its own errors to log entries; discovery as a whole fails only when
//! all attempted strategies erred.

use crate::client::StoreClient;
use crate::error::ExtractError;
use crate::pacer::RequestPacer;
use crate::sitemap::extract_loc_entries;

use serde::Deserialize;

/// Page size requested from product feeds. A page with fewer items than
/// this is the last page.
const FEED_PAGE_SIZE: usize = 250;

/// Maximum collections crawled before giving up on the collection strategy.
const MAX_COLLECTIONS: usize = 10;

#[derive(Debug, Deserialize)]
struct ProductsPage {
    #[serde(default)]
    products: Vec<FeedProduct>,
}

#[derive(Debug, Deserialize)]
struct FeedProduct {
    #[serde(default)]
    handle: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CollectionsIndex {
    #[serde(default)]
    collections: Vec<CollectionEntry>,
}

#[derive(Debug, Deserialize)]
struct CollectionEntry {
    #[serde(default)]
    handle: Option<String>,
}

/// Discovers up to `max_count` product-page URLs for the store at `origin`.
///
/// The returned list is deduplicated preserving first-occurrence order and
/// truncated to `max_count`, regardless of which strategy produced it.
///
/// # Errors
///
/// Returns [`ExtractError::Discovery`] only when every attempted strategy
/// failed outright. Strategies that merely find nothing are not failures.
pub async fn discover_product_urls(
    client: &StoreClient,
    pacer: &RequestPacer,
    origin: &str,
    max_count: usize,
) -> Result<Vec<String>, ExtractError> {
    let mut urls: Vec<String> = Vec::new();
    let mut strategies_failed = 0usize;
    let mut strategies_attempted = 0usize;

    strategies_attempted += 1;
    match feed_urls(client, pacer, origin, max_count).await {
        Ok(found) => {
            if !found.is_empty() {
                tracing::info!(origin, count = found.len(), "found products via product feed");
            }
            urls.extend(found);
        }
        Err(e) => {
            tracing::warn!(origin, error = %e, "product feed strategy failed");
            strategies_failed += 1;
        }
    }

    if urls.is_empty() {
        strategies_attempted += 1;
        match collection_urls(client, pacer, origin, max_count).await {
            Ok(found) => {
                if !found.is_empty() {
                    tracing::info!(origin, count = found.len(), "found products via collections");
                }
                urls.extend(found);
            }
            Err(e) => {
                tracing::warn!(origin, error = %e, "collection crawl strategy failed");
                strategies_failed += 1;
            }
        }
    }

    if urls.is_empty() {
        strategies_attempted += 1;
        match sitemap_urls(client, pacer, origin).await {
            Ok(found) => {
                if !found.is_empty() {
                    tracing::info!(origin, count = found.len(), "found products via sitemap");
                }
                urls.extend(found);
            }
            Err(e) => {
                tracing::warn!(origin, error = %e, "sitemap crawl strategy failed");
                strategies_failed += 1;
            }
        }
    }

    if urls.is_empty() && strategies_failed == strategies_attempted && strategies_failed > 0 {
        return Err(ExtractError::Discovery {
            store_url: origin.to_owned(),
        });
    }

    Ok(dedup_and_cap(urls, max_count))
}

/// Strategy 1: page through the store's structured product feed.
///
/// Stops when `max_count` URLs are accumulated, a page returns fewer than
/// [`FEED_PAGE_SIZE`] items (last page), or a page returns zero items.
/// A fetch failure on the first page fails the strategy; a failure on a
/// later page aborts paging but keeps the partial results.
async fn feed_urls(
    client: &StoreClient,
    pacer: &RequestPacer,
    origin: &str,
    max_count: usize,
) -> Result<Vec<String>, ExtractError> {
    let mut urls = Vec::new();
    let mut page = 1u32;

    while urls.len() < max_count {
        let url = format!("{origin}/products.json?limit={FEED_PAGE_SIZE}&page={page}");
        pacer.wait().await;
        let response: ProductsPage = match client.fetch_json(&url).await {
            Ok(r) => r,
            Err(e) if page == 1 => return Err(e),
            Err(e) => {
                tracing::warn!(origin, page, error = %e, "feed page fetch failed — keeping earlier pages");
                break;
            }
        };

        let page_len = response.products.len();
        if page_len == 0 {
            break;
        }

        for product in response.products {
            if let Some(handle) = product.handle {
                urls.push(format!("{origin}/products/{handle}"));
            }
        }

        if page_len < FEED_PAGE_SIZE {
            break;
        }
        page += 1;
    }

    Ok(urls)
}

/// Strategy 2: crawl the collections index, then each collection's feed.
///
/// At most the first [`MAX_COLLECTIONS`] collections are visited; a
/// failure fetching one collection's feed is logged and skipped.
async fn collection_urls(
    client: &StoreClient,
    pacer: &RequestPacer,
    origin: &str,
    max_count: usize,
) -> Result<Vec<String>, ExtractError> {
    let index_url = format!("{origin}/collections.json");
    pacer.wait().await;
    let index: CollectionsIndex = client.fetch_json(&index_url).await?;

    let handles: Vec<String> = index
        .collections
        .into_iter()
        .filter_map(|c| c.handle)
        .take(MAX_COLLECTIONS)
        .collect();
    tracing::debug!(origin, collections = handles.len(), "crawling collections");

    let mut urls = Vec::new();
    for handle in handles {
        if urls.len() >= max_count {
            break;
        }
        let feed_url = format!("{origin}/collections/{handle}/products.json");
        pacer.wait().await;
        match client.fetch_json::<ProductsPage>(&feed_url).await {
            Ok(page) => {
                for product in page.products {
                    if let Some(product_handle) = product.handle {
                        urls.push(format!("{origin}/products/{product_handle}"));
                    }
                }
            }
            Err(e) => {
                tracing::warn!(origin, collection = %handle, error = %e, "collection feed fetch failed — skipping");
            }
        }
    }

    Ok(urls)
}

/// Strategy 3: crawl the root sitemap index, then every nested sitemap,
/// collecting `<loc>` entries that contain `/products/`.
///
/// A failure fetching a nested sitemap aborts the remaining nested
/// fetches but keeps the entries collected so far.
async fn sitemap_urls(
    client: &StoreClient,
    pacer: &RequestPacer,
    origin: &str,
) -> Result<Vec<String>, ExtractError> {
    let root_url = format!("{origin}/sitemap.xml");
    pacer.wait().await;
    let root_xml = client.fetch_text(&root_url).await?;

    let nested: Vec<String> = extract_loc_entries(&root_xml)
        .into_iter()
        .filter(|loc| loc.contains(".xml"))
        .collect();
    tracing::debug!(origin, nested = nested.len(), "crawling nested sitemaps");

    let mut urls = Vec::new();
    for sitemap_url in nested {
        pacer.wait().await;
        let xml = match client.fetch_text(&sitemap_url).await {
            Ok(xml) => xml,
            Err(e) => {
                tracing::warn!(origin, sitemap = %sitemap_url, error = %e, "nested sitemap fetch failed — keeping partial results");
                break;
            }
        };
        urls.extend(
            extract_loc_entries(&xml)
                .into_iter()
                .filter(|loc| loc.contains("/products/")),
        );
    }

    Ok(urls)
}

/// Deduplicates preserving first-occurrence order, then truncates to
/// `max_count`.
fn dedup_and_cap(urls: Vec<String>, max_count: usize) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut deduped: Vec<String> = urls
        .into_iter()
        .filter(|url| seen.insert(url.clone()))
        .collect();
    deduped.truncate(max_count);
    deduped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_preserves_first_occurrence_order() {
        let urls = vec![
            "https://s/products/a".to_owned(),
            "https://s/products/b".to_owned(),
            "https://s/products/a".to_owned(),
            "https://s/products/c".to_owned(),
            "https://s/products/b".to_owned(),
        ];
        let result = dedup_and_cap(urls, 10);
        assert_eq!(
            result,
            vec![
                "https://s/products/a",
                "https://s/products/b",
                "https://s/products/c"
            ]
        );
    }

    #[test]
    fn cap_truncates_after_dedup() {
        let urls = vec![
            "https://s/products/a".to_owned(),
            "https://s/products/a".to_owned(),
            "https://s/products/b".to_owned(),
            "https://s/products/c".to_owned(),
        ];
        let result = dedup_and_cap(urls, 2);
        assert_eq!(result, vec!["https://s/products/a", "https://s/products/b"]);
    }

    #[test]
    fn dedup_and_cap_is_idempotent() {
        let urls = vec![
            "https://s/products/b".to_owned(),
            "https://s/products/a".to_owned(),
            "https://s/products/b".to_owned(),
        ];
        let once = dedup_and_cap(urls, 5);
        let twice = dedup_and_cap(once.clone(), 5);
        assert_eq!(once, twice);
    }
}
