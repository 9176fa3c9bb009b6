use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::ExtractError;
use crate::retry::retry_with_backoff;

/// HTTP fetch collaborator for a store's public endpoints.
///
/// Handles rate limiting (429), not-found (404), and other non-2xx
/// responses as typed errors so callers can distinguish "no data" from
/// "ill-formed data". Transient errors (429, network failures, 5xx) are
/// automatically retried with exponential backoff up to `max_retries`
/// additional attempts.
pub struct StoreClient {
    client: Client,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay in seconds for exponential backoff: `backoff_base_secs * 2^attempt`.
    backoff_base_secs: u64,
}

impl StoreClient {
    /// Creates a `StoreClient` with configured timeout, `User-Agent`, and
    /// retry policy. Set `max_retries` to `0` to disable retries.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ExtractError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_secs,
        })
    }

    /// Fetches a URL and returns the response body as text.
    ///
    /// # Errors
    ///
    /// - [`ExtractError::RateLimited`] — HTTP 429 after all retries exhausted.
    /// - [`ExtractError::NotFound`] — HTTP 404 (not retried).
    /// - [`ExtractError::UnexpectedStatus`] — any other non-2xx status
    ///   (5xx retried, 4xx not).
    /// - [`ExtractError::Http`] — network or TLS failure after all retries.
    pub async fn fetch_text(&self, url: &str) -> Result<String, ExtractError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || async {
            let response = self.checked_get(url).await?;
            Ok(response.text().await?)
        })
        .await
    }

    /// Fetches a URL and deserializes the JSON response body into `T`.
    ///
    /// # Errors
    ///
    /// Everything [`Self::fetch_text`] can return, plus
    /// [`ExtractError::Deserialize`] when the body is not valid JSON or
    /// does not match the expected shape (not retried).
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ExtractError> {
        let body = self.fetch_text(url).await?;
        serde_json::from_str::<T>(&body).map_err(|e| ExtractError::Deserialize {
            context: format!("response from {url}"),
            source: e,
        })
    }

    /// Fetches a URL and returns the raw response body, along with the
    /// `Content-Type` header if present. Used for image downloads.
    ///
    /// # Errors
    ///
    /// Same as [`Self::fetch_text`].
    pub async fn fetch_bytes(&self, url: &str) -> Result<(Vec<u8>, Option<String>), ExtractError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || async {
            let response = self.checked_get(url).await?;
            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            Ok((response.bytes().await?.to_vec(), content_type))
        })
        .await
    }

    /// Issues a GET request and triages the response status into typed
    /// errors before handing the response back.
    async fn checked_get(&self, url: &str) -> Result<reqwest::Response, ExtractError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(ExtractError::RateLimited {
                domain: host_of(url),
                retry_after_secs,
            });
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ExtractError::NotFound {
                url: url.to_owned(),
            });
        }

        if !status.is_success() {
            return Err(ExtractError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        Ok(response)
    }
}

/// Normalizes a store identifier to a `scheme://host` origin.
///
/// Accepts bare domains (`westside.com`), domains with paths, and full
/// URLs; a missing scheme defaults to `https`.
///
/// # Errors
///
/// Returns [`ExtractError::InvalidStoreUrl`] when the input cannot be
/// parsed into a URL with a host.
pub fn store_origin(store_url: &str) -> Result<String, ExtractError> {
    let trimmed = store_url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ExtractError::InvalidStoreUrl {
            store_url: store_url.to_owned(),
            reason: "empty store URL".to_owned(),
        });
    }

    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_owned()
    } else {
        format!("https://{trimmed}")
    };

    let url = url::Url::parse(&with_scheme).map_err(|e| ExtractError::InvalidStoreUrl {
        store_url: store_url.to_owned(),
        reason: e.to_string(),
    })?;
    if url.host_str().is_none() {
        return Err(ExtractError::InvalidStoreUrl {
            store_url: store_url.to_owned(),
            reason: "URL has no host".to_owned(),
        });
    }

    Ok(url.origin().ascii_serialization())
}

/// Extracts the hostname from a URL for store names and error messages.
///
/// Falls back to the full string if there is nothing to strip.
#[must_use]
pub fn host_of(url: &str) -> String {
    let without_scheme = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    without_scheme
        .split('/')
        .next()
        .unwrap_or(url)
        .to_owned()
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
