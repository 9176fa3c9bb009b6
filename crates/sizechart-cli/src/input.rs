//! Store list assembly from CLI arguments and an optional list file.

use std::collections::HashSet;
use std::path::Path;

/// Merges positional stores with the contents of an optional store-list
/// file, deduplicating while preserving first-occurrence order.
pub(crate) fn collect_stores(args: &[String], file: Option<&Path>) -> anyhow::Result<Vec<String>> {
    let mut stores: Vec<String> = args
        .iter()
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .collect();

    if let Some(path) = file {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read store list {}: {e}", path.display()))?;
        stores.extend(parse_store_list(&contents));
    }

    let mut seen = HashSet::new();
    Ok(stores.into_iter().filter(|s| seen.insert(s.clone())).collect())
}

/// One store per line; blank lines and `#` comment lines are ignored.
fn parse_store_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_store_list_skipping_comments_and_blanks() {
        let contents = "# stores to crawl\n\nwestside.com\n  littleboxindia.com  \n# trailing note\n";
        assert_eq!(
            parse_store_list(contents),
            vec!["westside.com", "littleboxindia.com"]
        );
    }

    #[test]
    fn merges_args_and_file_deduplicating_in_order() {
        let args = vec!["westside.com".to_owned(), "freakins.com".to_owned()];
        // No file: args pass through.
        let stores = collect_stores(&args, None).unwrap();
        assert_eq!(stores, vec!["westside.com", "freakins.com"]);
    }

    #[test]
    fn duplicate_stores_keep_first_occurrence() {
        let args = vec![
            "westside.com".to_owned(),
            "freakins.com".to_owned(),
            "westside.com".to_owned(),
        ];
        let stores = collect_stores(&args, None).unwrap();
        assert_eq!(stores, vec!["westside.com", "freakins.com"]);
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = collect_stores(&[], Some(Path::new("/nonexistent/stores.txt")));
        assert!(result.is_err());
    }
}
