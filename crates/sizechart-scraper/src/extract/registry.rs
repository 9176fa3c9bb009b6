//! Store-to-strategy registry.
//!
//! Strategies are keyed by normalized domain; anything unregistered gets
//! the plain-HTML strategy, which works for most Shopify themes.

use crate::extract::strategy::{
    HtmlStrategy, RenderedChartStrategy, RenderedImageStrategy, StoreStrategy,
};

/// Normalizes a store identifier to a bare lowercase domain: scheme,
/// path, trailing slashes, and a leading `www.` are stripped.
#[must_use]
pub fn normalize_domain(store_url: &str) -> String {
    let lowered = store_url.trim().to_lowercase();
    let without_scheme = lowered
        .strip_prefix("https://")
        .or_else(|| lowered.strip_prefix("http://"))
        .unwrap_or(&lowered);
    let host = without_scheme
        .split('/')
        .next()
        .unwrap_or(without_scheme)
        .trim_end_matches('/');
    host.strip_prefix("www.").unwrap_or(host).to_owned()
}

/// Picks the extraction strategy for a store.
#[must_use]
pub fn strategy_for_store(store_url: &str) -> Box<dyn StoreStrategy> {
    let domain = normalize_domain(store_url);
    let strategy: Box<dyn StoreStrategy> = match domain.as_str() {
        // KiwiSizing injects the chart after load.
        "littleboxindia.com" => Box::new(RenderedChartStrategy::new("#KiwiSizingChart")),
        // Chart shipped as an image inside a modal.
        "freakins.com" => {
            Box::new(RenderedImageStrategy::new(".newsletter-modal", "div.newsletter-modal"))
        }
        // Chart image sits in the first figure element.
        "squah.com" => Box::new(RenderedImageStrategy::new("figure", "figure")),
        _ => Box::new(HtmlStrategy),
    };
    tracing::debug!(domain, strategy = strategy.name(), "selected store strategy");
    strategy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_scheme_path_and_www() {
        assert_eq!(normalize_domain("westside.com"), "westside.com");
        assert_eq!(normalize_domain("https://westside.com/"), "westside.com");
        assert_eq!(normalize_domain("http://www.westside.com/collections"), "westside.com");
        assert_eq!(normalize_domain("WWW.Westside.COM"), "westside.com");
    }

    #[test]
    fn registered_domains_get_their_strategy() {
        assert_eq!(strategy_for_store("littleboxindia.com").name(), "rendered-chart");
        assert_eq!(strategy_for_store("https://www.freakins.com").name(), "rendered-image");
        assert_eq!(strategy_for_store("squah.com").name(), "rendered-image");
    }

    #[test]
    fn unregistered_domains_default_to_html() {
        assert_eq!(strategy_for_store("westside.com").name(), "html");
        assert_eq!(strategy_for_store("unknown-store.example").name(), "html");
    }
}
