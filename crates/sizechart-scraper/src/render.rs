//! Headless-browser rendering for stores whose size charts are injected
//! by JavaScript after page load.
//!
//! All `headless_chrome` calls are blocking CDP round-trips, so every
//! render runs inside `tokio::task::spawn_blocking`. One browser process
//! serves a whole store; each page gets a fresh tab that is closed after
//! its content is captured.

use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;

use headless_chrome::{Browser, LaunchOptions};

use crate::error::ExtractError;

/// Upper bound on waiting for a post-load selector to appear. Charts that
/// take longer than this are treated as absent.
const SELECTOR_WAIT: Duration = Duration::from_secs(10);

pub struct Renderer {
    browser: Arc<Browser>,
    user_agent: String,
}

impl Renderer {
    /// Launches a headless Chrome process.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Render`] when the browser binary cannot be
    /// found or fails to start.
    pub fn launch(user_agent: &str) -> Result<Self, ExtractError> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .args(vec![
                OsStr::new("--no-sandbox"),
                OsStr::new("--disable-dev-shm-usage"),
                OsStr::new("--disable-gpu"),
                OsStr::new("--disable-extensions"),
            ])
            .build()
            .map_err(|e| ExtractError::Render {
                context: "browser launch options".to_owned(),
                reason: e.to_string(),
            })?;

        let browser = Browser::new(options).map_err(|e| ExtractError::Render {
            context: "browser launch".to_owned(),
            reason: e.to_string(),
        })?;
        tracing::debug!("headless browser launched");

        Ok(Self {
            browser: Arc::new(browser),
            user_agent: user_agent.to_owned(),
        })
    }

    /// Navigates to `url` in a fresh tab and returns the post-JavaScript
    /// document HTML.
    ///
    /// When `wait_selector` is given, rendering waits up to
    /// [`SELECTOR_WAIT`] for it to appear; a selector that never shows up
    /// is logged and the page content is captured anyway.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Render`] when the tab cannot be created,
    /// navigation fails, or the content cannot be read.
    pub async fn render_html(
        &self,
        url: &str,
        wait_selector: Option<&str>,
    ) -> Result<String, ExtractError> {
        let browser = Arc::clone(&self.browser);
        let user_agent = self.user_agent.clone();
        let url_owned = url.to_owned();
        let selector = wait_selector.map(str::to_owned);

        tokio::task::spawn_blocking(move || {
            render_blocking(&browser, &user_agent, &url_owned, selector.as_deref())
        })
        .await
        .map_err(|e| ExtractError::Render {
            context: url.to_owned(),
            reason: format!("render task panicked: {e}"),
        })?
    }

    /// Shuts down the browser process.
    pub fn close(self) {
        // Browser's Drop terminates the Chrome child process.
        drop(self.browser);
        tracing::debug!("headless browser closed");
    }
}

fn render_blocking(
    browser: &Browser,
    user_agent: &str,
    url: &str,
    wait_selector: Option<&str>,
) -> Result<String, ExtractError> {
    let render_err = |reason: String| ExtractError::Render {
        context: url.to_owned(),
        reason,
    };

    let tab = browser
        .new_tab()
        .map_err(|e| render_err(format!("failed to create tab: {e}")))?;
    tab.set_user_agent(user_agent, None, None)
        .map_err(|e| render_err(format!("failed to set user agent: {e}")))?;

    tab.navigate_to(url)
        .map_err(|e| render_err(format!("navigation failed: {e}")))?;
    tab.wait_until_navigated()
        .map_err(|e| render_err(format!("page load failed: {e}")))?;

    if let Some(selector) = wait_selector {
        if let Err(e) = tab.wait_for_element_with_custom_timeout(selector, SELECTOR_WAIT) {
            tracing::debug!(url, selector, error = %e, "wait selector did not appear, capturing anyway");
        }
    }

    let html = tab
        .get_content()
        .map_err(|e| render_err(format!("failed to read page content: {e}")))?;

    let _ = tab.close(true);
    Ok(html)
}
