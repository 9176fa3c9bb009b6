use super::*;
use scraper::Html;

/// Parses `html` and returns the first `<table>` element.
fn first_table(document: &Html) -> ElementRef<'_> {
    let sel = Selector::parse("table").unwrap();
    document.select(&sel).next().expect("fixture has a table")
}

#[test]
fn clean_text_collapses_whitespace_and_special_spaces() {
    assert_eq!(clean_text("  Chest \n\t Size  "), "Chest Size");
    assert_eq!(clean_text("36\u{a0}in"), "36 in");
    assert_eq!(clean_text("S\u{200b}mall"), "S mall");
    assert_eq!(clean_text(""), "");
}

#[test]
fn extracts_headers_and_rows_from_thead_tbody_table() {
    let document = Html::parse_document(
        r#"<table>
            <thead><tr><th>Size</th><th>Chest</th><th>Waist</th></tr></thead>
            <tbody>
              <tr><td>S</td><td>36</td><td>30</td></tr>
              <tr><td>M</td><td>38</td><td>32</td></tr>
            </tbody>
        </table>"#,
    );
    let (headers, rows) = normalize_table(first_table(&document));

    assert_eq!(headers, vec!["Size", "Chest", "Waist"]);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["Size"], "S");
    assert_eq!(rows[0]["Chest"], "36");
    assert_eq!(rows[0]["Waist"], "30");
    assert_eq!(rows[1]["Size"], "M");
    assert_eq!(rows[1]["Chest"], "38");
    assert_eq!(rows[1]["Waist"], "32");
}

#[test]
fn falls_back_to_first_row_when_all_cells_are_th() {
    let document = Html::parse_document(
        r"<table>
            <tr><th>Size</th><th>Bust</th></tr>
            <tr><td>S</td><td>34</td></tr>
        </table>",
    );
    let (headers, rows) = normalize_table(first_table(&document));
    assert_eq!(headers, vec!["Size", "Bust"]);
    // The th row restates the headers and is skipped from the body.
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["Bust"], "34");
}

#[test]
fn falls_back_to_first_row_when_all_cells_are_header_classed() {
    let document = Html::parse_document(
        r#"<table>
            <tr><td class="col-header">Size</td><td class="col-header">Hip</td></tr>
            <tr><td>L</td><td>42</td></tr>
        </table>"#,
    );
    let (headers, rows) = normalize_table(first_table(&document));
    assert_eq!(headers, vec!["Size", "Hip"]);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["Hip"], "42");
}

#[test]
fn no_headers_when_first_row_is_plain_data() {
    let document = Html::parse_document(
        r"<table>
            <tr><td>S</td><td>36</td></tr>
            <tr><td>M</td><td>38</td></tr>
        </table>",
    );
    let (headers, rows) = normalize_table(first_table(&document));
    assert!(headers.is_empty(), "plain first row must not become headers");
    assert!(rows.is_empty(), "rows without headers produce empty records");
}

#[test]
fn skips_body_row_that_duplicates_headers() {
    let document = Html::parse_document(
        r"<table>
            <thead><tr><th>Size</th><th>Chest</th></tr></thead>
            <tbody>
              <tr><td>Size</td><td>Chest</td></tr>
              <tr><td>S</td><td>36</td></tr>
            </tbody>
        </table>",
    );
    let (_, rows) = normalize_table(first_table(&document));
    assert_eq!(rows.len(), 1, "header-echo row must be excluded");
    assert_eq!(rows[0]["Size"], "S");
}

#[test]
fn drops_cells_beyond_header_count() {
    let document = Html::parse_document(
        r"<table>
            <thead><tr><th>Size</th><th>Chest</th></tr></thead>
            <tbody><tr><td>S</td><td>36</td><td>extra</td></tr></tbody>
        </table>",
    );
    let (headers, rows) = normalize_table(first_table(&document));
    assert_eq!(headers.len(), 2);
    assert_eq!(rows[0].len(), 2, "overflow cell must be dropped, not error");
    assert!(!rows[0].values().any(|v| v == "extra"));
}

#[test]
fn row_keys_are_subset_of_headers() {
    let document = Html::parse_document(
        r"<table>
            <thead><tr><th>Size</th><th>Chest</th><th>Waist</th></tr></thead>
            <tbody>
              <tr><td>S</td><td>36</td></tr>
              <tr><td>M</td><td>38</td><td>32</td></tr>
            </tbody>
        </table>",
    );
    let (headers, rows) = normalize_table(first_table(&document));
    for row in &rows {
        for key in row.keys() {
            assert!(headers.contains(key), "row key {key} missing from headers");
        }
    }
    // Sparse first row: only two cells, so no Waist key.
    assert!(!rows[0].contains_key("Waist"));
}

#[test]
fn default_span_overrides_cell_text_with_cm_suffix() {
    let document = Html::parse_document(
        r#"<table>
            <thead><tr><th>Size</th><th>Chest</th></tr></thead>
            <tbody><tr>
              <td><span class="default">S</span><span class="alt">Small</span></td>
              <td><span class="default">91</span><span class="alt">36</span></td>
            </tr></tbody>
        </table>"#,
    );
    let (_, rows) = normalize_table(first_table(&document));
    assert_eq!(rows[0]["Size"], "S", "first column keeps bare default value");
    assert_eq!(rows[0]["Chest"], "91 CM", "non-first column gets CM suffix");
}

#[test]
fn skips_rows_with_no_cells() {
    let document = Html::parse_document(
        r"<table>
            <thead><tr><th>Size</th></tr></thead>
            <tbody><tr></tr><tr><td>S</td></tr></tbody>
        </table>",
    );
    let (_, rows) = normalize_table(first_table(&document));
    assert_eq!(rows.len(), 1);
}
