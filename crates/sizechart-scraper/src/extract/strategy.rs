//! Per-store extraction strategies.
//!
//! Every store gets the same discovery and orchestration; what varies is
//! how a single product page yields a chart. Plain stores serve the chart
//! in the initial HTML; others inject it with JavaScript after load; a
//! few only ship it as an image that needs a vision model to read.

use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::Deserialize;
use tokio::sync::Mutex;

use sizechart_core::Product;

use crate::chart::locate_size_chart;
use crate::client::StoreClient;
use crate::discovery::discover_product_urls;
use crate::error::ExtractError;
use crate::pacer::RequestPacer;
use crate::render::Renderer;
use crate::vision::VisionClient;

/// Shared per-store collaborators handed to every strategy call.
pub struct StoreContext {
    pub client: StoreClient,
    pub pacer: RequestPacer,
    /// `scheme://host` origin of the store, no trailing slash.
    pub origin: String,
    /// Present only when a vision API key is configured.
    pub vision: Option<VisionClient>,
    /// User agent shared by HTTP and rendered fetches.
    pub user_agent: String,
}

#[async_trait]
pub trait StoreStrategy: Send + Sync {
    /// Short name for logging.
    fn name(&self) -> &'static str;

    /// Discovers product URLs for the store. The default goes through the
    /// shared feed/collections/sitemap pipeline; strategies may override
    /// for stores with bespoke catalogs.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Discovery`] when no discovery strategy
    /// could produce anything.
    async fn discover_products(
        &self,
        ctx: &StoreContext,
        max_count: usize,
    ) -> Result<Vec<String>, ExtractError> {
        discover_product_urls(&ctx.client, &ctx.pacer, &ctx.origin, max_count).await
    }

    /// Extracts one product. `Ok(None)` means the product has no usable
    /// chart (or no title) and should be silently skipped; `Err` is
    /// recorded against the store but never aborts it.
    async fn extract_product(
        &self,
        ctx: &StoreContext,
        product_url: &str,
    ) -> Result<Option<Product>, ExtractError>;

    /// Releases any resources held across products. Called exactly once
    /// per store, after the last product, on every outcome.
    async fn release(&self) {}
}

#[derive(Debug, Deserialize)]
struct ProductEnvelope {
    #[serde(default)]
    product: Option<ProductInfo>,
}

#[derive(Debug, Deserialize)]
struct ProductInfo {
    #[serde(default)]
    title: Option<String>,
}

/// Fetches the product title from the product's JSON endpoint.
///
/// Returns `Ok(None)` when the endpoint is missing or carries no title;
/// such products are skipped rather than emitted untitled.
async fn fetch_product_title(
    ctx: &StoreContext,
    product_url: &str,
) -> Result<Option<String>, ExtractError> {
    let url = format!("{product_url}.json");
    ctx.pacer.wait().await;
    let envelope: ProductEnvelope = match ctx.client.fetch_json(&url).await {
        Ok(envelope) => envelope,
        Err(ExtractError::NotFound { .. }) => return Ok(None),
        Err(e) => return Err(e),
    };
    Ok(envelope
        .product
        .and_then(|p| p.title)
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty()))
}

/// Default strategy: the chart is present in the plainly fetched HTML.
pub struct HtmlStrategy;

#[async_trait]
impl StoreStrategy for HtmlStrategy {
    fn name(&self) -> &'static str {
        "html"
    }

    async fn extract_product(
        &self,
        ctx: &StoreContext,
        product_url: &str,
    ) -> Result<Option<Product>, ExtractError> {
        let Some(title) = fetch_product_title(ctx, product_url).await? else {
            tracing::debug!(url = product_url, "product has no title, skipping");
            return Ok(None);
        };

        ctx.pacer.wait().await;
        let html = ctx.client.fetch_text(product_url).await?;
        let Some(chart) = locate_size_chart(&html) else {
            tracing::debug!(url = product_url, "no size chart in page");
            return Ok(None);
        };

        Ok(Some(Product {
            title,
            url: product_url.to_owned(),
            size_chart: Some(chart),
        }))
    }
}

/// Lazily launched browser shared by a store's rendered strategies.
///
/// Launch is deferred to the first product so stores whose discovery
/// finds nothing never pay for a Chrome process.
struct SharedRenderer {
    renderer: Mutex<Option<Renderer>>,
}

impl SharedRenderer {
    fn new() -> Self {
        Self {
            renderer: Mutex::new(None),
        }
    }

    async fn render(
        &self,
        ctx: &StoreContext,
        url: &str,
        wait_selector: &str,
    ) -> Result<String, ExtractError> {
        // Lock held across the render: one page at a time per browser.
        let mut guard = self.renderer.lock().await;
        if guard.is_none() {
            *guard = Some(Renderer::launch(&ctx.user_agent)?);
        }
        let renderer = guard.as_ref().ok_or_else(|| ExtractError::Render {
            context: url.to_owned(),
            reason: "renderer unavailable".to_owned(),
        })?;
        renderer.render_html(url, Some(wait_selector)).await
    }

    async fn shutdown(&self) {
        if let Some(renderer) = self.renderer.lock().await.take() {
            renderer.close();
        }
    }
}

/// The chart is a normal table, but injected by JavaScript after load.
pub struct RenderedChartStrategy {
    wait_selector: &'static str,
    shared: SharedRenderer,
}

impl RenderedChartStrategy {
    #[must_use]
    pub fn new(wait_selector: &'static str) -> Self {
        Self {
            wait_selector,
            shared: SharedRenderer::new(),
        }
    }
}

#[async_trait]
impl StoreStrategy for RenderedChartStrategy {
    fn name(&self) -> &'static str {
        "rendered-chart"
    }

    async fn extract_product(
        &self,
        ctx: &StoreContext,
        product_url: &str,
    ) -> Result<Option<Product>, ExtractError> {
        let Some(title) = fetch_product_title(ctx, product_url).await? else {
            tracing::debug!(url = product_url, "product has no title, skipping");
            return Ok(None);
        };

        ctx.pacer.wait().await;
        let html = self.shared.render(ctx, product_url, self.wait_selector).await?;
        let Some(chart) = locate_size_chart(&html) else {
            tracing::debug!(url = product_url, "no size chart in rendered page");
            return Ok(None);
        };

        Ok(Some(Product {
            title,
            url: product_url.to_owned(),
            size_chart: Some(chart),
        }))
    }

    async fn release(&self) {
        self.shared.shutdown().await;
    }
}

/// The chart exists only as an image inside a known container; the image
/// is read by the vision model.
pub struct RenderedImageStrategy {
    wait_selector: &'static str,
    image_container: &'static str,
    shared: SharedRenderer,
}

impl RenderedImageStrategy {
    #[must_use]
    pub fn new(wait_selector: &'static str, image_container: &'static str) -> Self {
        Self {
            wait_selector,
            image_container,
            shared: SharedRenderer::new(),
        }
    }
}

#[async_trait]
impl StoreStrategy for RenderedImageStrategy {
    fn name(&self) -> &'static str {
        "rendered-image"
    }

    async fn extract_product(
        &self,
        ctx: &StoreContext,
        product_url: &str,
    ) -> Result<Option<Product>, ExtractError> {
        let Some(vision) = ctx.vision.as_ref() else {
            tracing::warn!(
                url = product_url,
                "store needs image extraction but no vision API key is configured"
            );
            return Ok(None);
        };

        let Some(title) = fetch_product_title(ctx, product_url).await? else {
            tracing::debug!(url = product_url, "product has no title, skipping");
            return Ok(None);
        };

        ctx.pacer.wait().await;
        let html = self.shared.render(ctx, product_url, self.wait_selector).await?;
        let Some(image_src) = find_image_src(&html, self.image_container) else {
            tracing::debug!(
                url = product_url,
                container = self.image_container,
                "no chart image in container"
            );
            return Ok(None);
        };

        ctx.pacer.wait().await;
        let Some(chart) = vision.extract_chart(&ctx.client, &ctx.origin, &image_src).await? else {
            tracing::debug!(url = product_url, "vision model found no chart in image");
            return Ok(None);
        };

        Ok(Some(Product {
            title,
            url: product_url.to_owned(),
            size_chart: Some(chart),
        }))
    }

    async fn release(&self) {
        self.shared.shutdown().await;
    }
}

/// Finds the `src` of the first `<img>` inside `container`.
fn find_image_src(html: &str, container: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(&format!("{container} img")).ok()?;
    let img = document.select(&selector).next()?;
    img.value()
        .attr("src")
        .or_else(|| img.value().attr("data-src"))
        .map(str::to_owned)
}
