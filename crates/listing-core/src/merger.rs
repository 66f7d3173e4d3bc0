//! Merge engine: overlays photo columns onto the primary table by listing id

use crate::key::normalize;
use crate::layout::ExportLayout;
use crate::table::{Row, Table};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::{info, warn};

static BARE_FRACTION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\.\d+$").unwrap());

/// Normalize a cell for merging and export.
///
/// Quotes are removed and the value trimmed. Spreadsheet placeholders
/// (`nan`, `none`) and bare fractions such as `.5` become empty.
pub fn clean(value: &str) -> String {
    let v = value.replace('"', "");
    let v = v.trim();
    if v.eq_ignore_ascii_case("nan") || v.eq_ignore_ascii_case("none") {
        return String::new();
    }
    if BARE_FRACTION.is_match(v) {
        return String::new();
    }
    v.to_string()
}

/// Secondary rows keyed by normalized id, cells already cleaned
#[derive(Debug, Clone, Default)]
pub struct Lookup {
    rows: HashMap<String, Vec<String>>,
}

impl Lookup {
    /// Index a secondary table by its first column.
    ///
    /// Rows with an empty key are left out; a repeated key keeps the last row.
    pub fn build(secondary: &Table) -> Self {
        let mut rows: HashMap<String, Vec<String>> = HashMap::new();
        for row in &secondary.rows {
            let key = normalize(row.get(0));
            if key.is_empty() {
                continue;
            }
            let cells: Vec<String> = row.cells.iter().map(|c| clean(c)).collect();
            if rows.insert(key.clone(), cells).is_some() {
                warn!(key = %key, "duplicate photo row, keeping the later one");
            }
        }
        Self { rows }
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.rows.get(key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Outcome of one merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    /// Primary rows whose key was found in the lookup
    pub matched: usize,
    /// Primary rows left untouched
    pub unmatched: usize,
    /// Individual cells overwritten
    pub cells_written: usize,
}

/// Overlay `secondary` onto `primary` in place.
///
/// The primary table is first widened to the layout width. Only the columns
/// named in the layout's column map are ever written, and only on rows whose
/// key column matches a photo row.
pub fn merge(primary: &mut Table, secondary: &Table, layout: &ExportLayout) -> MergeReport {
    let lookup = Lookup::build(secondary);
    primary.widen(layout.width);

    let mut report = MergeReport::default();
    for row in &mut primary.rows {
        let key = normalize(row.get(layout.key_column));
        match lookup.get(&key) {
            Some(photo_row) => {
                report.matched += 1;
                report.cells_written += apply(row, photo_row, layout);
            }
            None => report.unmatched += 1,
        }
    }

    info!(
        matched = report.matched,
        unmatched = report.unmatched,
        cells = report.cells_written,
        lookup_rows = lookup.len(),
        "merged photo table"
    );
    report
}

fn apply(row: &mut Row, photo_row: &[String], layout: &ExportLayout) -> usize {
    let mut written = 0;
    for (&target, &source) in &layout.column_map {
        if let Some(value) = photo_row.get(source) {
            row.set(target, clean(value));
            written += 1;
        }
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn row(cells: &[&str]) -> Row {
        Row::new(cells.iter().map(|s| s.to_string()).collect())
    }

    fn layout(width: usize, map: &[(usize, usize)]) -> ExportLayout {
        ExportLayout {
            width,
            key_column: 1,
            image_slots: 3,
            column_map: map.iter().copied().collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn test_clean() {
        assert_eq!(clean("\"  hello \""), "hello");
        assert_eq!(clean("nan"), "");
        assert_eq!(clean("None"), "");
        assert_eq!(clean(".5"), "");
        assert_eq!(clean("0.5"), "0.5");
        assert_eq!(clean("42.00"), "42.00");
        assert_eq!(clean(""), "");
    }

    #[test]
    fn test_lookup_last_row_wins_and_skips_empty_keys() {
        let mut secondary = Table::new(2);
        secondary.push(row(&["a1", "first"]));
        secondary.push(row(&["", "orphan"]));
        secondary.push(row(&[" \"A1\" ", "second"]));

        let lookup = Lookup::build(&secondary);

        assert_eq!(lookup.len(), 1);
        assert_eq!(lookup.get("A1").unwrap()[1], "second");
    }

    #[test]
    fn test_merge_writes_only_mapped_columns() {
        let width = 100;
        let mut primary = Table::new(width);
        let mut cells = vec!["x".to_string(); width];
        cells[1] = "abc123".to_string();
        primary.push(Row::new(cells));
        let before = primary.clone();

        let mut secondary = Table::new(6);
        secondary.push(row(&["ABC123", "", "", "", "", "42.00"]));

        let report = merge(&mut primary, &secondary, &layout(width, &[(84, 5)]));

        assert_eq!(report.matched, 1);
        assert_eq!(report.cells_written, 1);
        let merged = &primary.rows[0];
        assert_eq!(merged.get(84), Some("42.00"));
        for col in (0..width).filter(|c| *c != 84) {
            assert_eq!(merged.get(col), before.rows[0].get(col), "column {}", col);
        }
    }

    #[test]
    fn test_merge_miss_leaves_row_unchanged() {
        let mut primary = Table::new(5);
        primary.push(row(&["1", "nomatch", "a", "b", "c"]));
        let before = primary.clone();

        let mut secondary = Table::new(3);
        secondary.push(row(&["other", "u1", "u2"]));

        let report = merge(&mut primary, &secondary, &layout(5, &[(3, 1), (4, 2)]));

        assert_eq!(report.unmatched, 1);
        assert_eq!(report.cells_written, 0);
        assert_eq!(primary, before);
    }

    #[test]
    fn test_merge_skips_sources_past_row_end() {
        let mut primary = Table::new(5);
        primary.push(row(&["", "k", "a", "b", "c"]));

        let secondary = Table {
            width: 2,
            rows: vec![row(&["K", "u1"])],
        };

        let report = merge(&mut primary, &secondary, &layout(5, &[(3, 1), (4, 7)]));

        assert_eq!(report.cells_written, 1);
        assert_eq!(primary.rows[0].get(3), Some("u1"));
        assert_eq!(primary.rows[0].get(4), Some("c"));
    }

    #[test]
    fn test_merge_widens_primary_first() {
        let mut primary = Table::new(2);
        primary.push(row(&["", "k"]));

        let mut secondary = Table::new(3);
        secondary.push(row(&["k", "", "photo.jpg"]));

        merge(&mut primary, &secondary, &layout(10, &[(8, 2)]));

        assert_eq!(primary.width, 10);
        assert_eq!(primary.rows[0].len(), 10);
        assert_eq!(primary.rows[0].get(8), Some("photo.jpg"));
    }

    #[test]
    fn test_merge_cleans_photo_cells() {
        let mut primary = Table::new(4);
        primary.push(row(&["", "k", "keep", "keep"]));

        let mut secondary = Table::new(3);
        secondary.push(row(&["k", "nan", ".25"]));

        merge(&mut primary, &secondary, &layout(4, &[(2, 1), (3, 2)]));

        assert_eq!(primary.rows[0].get(2), Some(""));
        assert_eq!(primary.rows[0].get(3), Some(""));
    }
}
