/// Process-wide extraction configuration.
///
/// Constructed once at startup (from CLI arguments plus environment) and
/// threaded by reference into every component — no ambient/global lookup.
/// Never mutated after construction.
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Maximum products extracted per store.
    pub max_products_per_store: usize,
    /// Minimum seconds between consecutive requests to the same store.
    pub rate_limit_delay_secs: f64,
    /// Per-request HTTP timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum stores processed concurrently.
    pub concurrent_stores: usize,
    /// Retry attempts after the first failure for transient errors.
    pub max_retries: u32,
    /// Base delay in seconds for exponential backoff: `base * 2^attempt`.
    pub backoff_base_secs: u64,
    /// `User-Agent` sent with every HTTP request.
    pub user_agent: String,
    /// API key for the vision fallback. Image-based strategies return no
    /// chart when this is absent.
    pub gemini_api_key: Option<String>,
    /// Vision model used for image table extraction.
    pub gemini_model: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_products_per_store: 100,
            rate_limit_delay_secs: 1.0,
            timeout_secs: 30,
            concurrent_stores: 5,
            max_retries: 3,
            backoff_base_secs: 1,
            user_agent: default_user_agent(),
            gemini_api_key: None,
            gemini_model: "gemini-2.0-flash-exp".to_owned(),
        }
    }
}

impl std::fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("max_products_per_store", &self.max_products_per_store)
            .field("rate_limit_delay_secs", &self.rate_limit_delay_secs)
            .field("timeout_secs", &self.timeout_secs)
            .field("concurrent_stores", &self.concurrent_stores)
            .field("max_retries", &self.max_retries)
            .field("backoff_base_secs", &self.backoff_base_secs)
            .field("user_agent", &self.user_agent)
            .field(
                "gemini_api_key",
                &self.gemini_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("gemini_model", &self.gemini_model)
            .finish()
    }
}

/// Default `User-Agent`: a realistic desktop browser string. Several
/// storefronts serve stripped-down markup to obvious bot agents.
#[must_use]
pub fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
        .to_owned()
}
