//! Result file writing and the end-of-run summary table.

use std::path::Path;

use sizechart_core::StoreResult;

/// Writes the aggregated results as pretty-printed JSON, creating parent
/// directories as needed.
pub(crate) fn write_results(path: &Path, results: &[StoreResult]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(results)?;
    std::fs::write(path, json)?;
    tracing::info!(path = %path.display(), stores = results.len(), "results written");
    Ok(())
}

/// Prints a plain aligned per-store summary to stdout.
pub(crate) fn print_summary(results: &[StoreResult]) {
    let width = results
        .iter()
        .map(|r| r.store_name.len())
        .chain(std::iter::once("store".len()))
        .max()
        .unwrap_or(5);

    println!("{:<width$}  {:>8}  {:>6}", "store", "products", "errors");
    for result in results {
        println!(
            "{:<width$}  {:>8}  {:>6}",
            result.store_name,
            result.products.len(),
            result.errors.len()
        );
    }
}
