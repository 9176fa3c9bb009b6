//! Sitemap XML parsing.
//!
//! Shopify sitemaps are a two-level index: the root `sitemap.xml` lists
//! nested sitemaps in `<loc>` entries, each of which lists page URLs in
//! `<loc>` entries of its own. This module only extracts the `<loc>`
//! values; the discovery pipeline applies the `.xml` / `/products/`
//! filters.

use quick_xml::events::Event;
use quick_xml::Reader;

/// Extracts the text content of every `<loc>` element in `xml`, in
/// document order. Unparseable XML yields the entries collected so far.
pub(crate) fn extract_loc_entries(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut in_loc = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                in_loc = e.name().as_ref() == b"loc";
            }
            Ok(Event::End(_)) => {
                in_loc = false;
            }
            Ok(Event::Text(e)) => {
                if in_loc {
                    let text = e.unescape().unwrap_or_default().trim().to_owned();
                    if !text.is_empty() {
                        entries.push(text);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                tracing::debug!(error = %e, "sitemap XML parse error — keeping partial entries");
                break;
            }
            _ => {}
        }
    }

    entries
}
