//! Mapping rules and the path index
//!
//! A mapping assigns every output column a rank (its 1-based position), the
//! logical source path the value comes from and the type it is coerced to.
//! The path index then resolves each logical path to the concrete node names
//! walked inside a listing.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

const RANK_HEADER: &str = "rank";
const PARENT_HEADER: &str = "parent node";
const TAG_HEADER: &str = "tag name";
const TYPE_HEADER: &str = "type";

/// Declared type of an output column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Decimal,
    Integer,
    Boolean,
    Text,
}

impl FieldType {
    /// Classify a free-text type description.
    ///
    /// Matching is a case-insensitive substring test, checked in the order
    /// decimal, int, bool; anything else is text.
    pub fn from_description(description: &str) -> Self {
        let lower = description.to_lowercase();
        if lower.contains("decimal") {
            FieldType::Decimal
        } else if lower.contains("int") {
            FieldType::Integer
        } else if lower.contains("bool") {
            FieldType::Boolean
        } else {
            FieldType::Text
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FieldType::Decimal => "decimal",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
            FieldType::Text => "text",
        };
        f.write_str(name)
    }
}

/// One output column definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRule {
    /// 1-based output column position
    pub rank: usize,
    /// Logical source path (`parent/tag`), None when the rule maps nothing
    pub source_path: Option<String>,
    pub field_type: FieldType,
}

impl MappingRule {
    pub fn new(rank: usize, source_path: Option<String>, field_type: FieldType) -> Self {
        Self {
            rank,
            source_path,
            field_type,
        }
    }

    /// Zero-based output column
    pub fn column(&self) -> usize {
        self.rank - 1
    }
}

/// Load mapping rules from a raw rule grid.
///
/// The grid is the rule sheet as read from disk, preamble rows included. The
/// header row is the first row carrying a `Rank` cell. Rows with a blank or
/// non-numeric rank are skipped; the result is sorted by rank.
pub fn load_rules(grid: &[Vec<String>]) -> Result<Vec<MappingRule>> {
    let header_idx = grid
        .iter()
        .position(|row| row.iter().any(|c| c.trim().eq_ignore_ascii_case(RANK_HEADER)))
        .ok_or_else(|| Error::RuleTable("no header row with a 'Rank' column".to_string()))?;

    let header = &grid[header_idx];
    let rank_col = find_column(header, RANK_HEADER)?;
    let parent_col = find_column(header, PARENT_HEADER)?;
    let tag_col = find_column(header, TAG_HEADER)?;
    let type_col = find_column(header, TYPE_HEADER)?;

    let mut rules = Vec::new();
    for (offset, row) in grid[header_idx + 1..].iter().enumerate() {
        let Some(rank) = parse_rank(cell(row, rank_col)) else {
            debug!(
                row = header_idx + offset + 2,
                value = cell(row, rank_col),
                "skipping rule row without a usable rank"
            );
            continue;
        };

        rules.push(MappingRule::new(
            rank,
            compose_path(cell(row, parent_col), cell(row, tag_col)),
            FieldType::from_description(cell(row, type_col)),
        ));
    }

    rules.sort_by_key(|r| r.rank);
    Ok(rules)
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

fn find_column(header: &[String], name: &str) -> Result<usize> {
    header
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| Error::RuleTable(format!("missing '{}' column", name)))
}

/// Spreadsheets store ranks as floats, so `12.0` is accepted as rank 12
fn parse_rank(raw: &str) -> Option<usize> {
    let value: f64 = raw.trim().parse().ok()?;
    if !value.is_finite() || value < 1.0 {
        return None;
    }
    Some(value.trunc() as usize)
}

fn strip_brackets(raw: &str) -> String {
    raw.replace(['<', '>'], "").trim().to_string()
}

fn compose_path(parent: &str, tag: &str) -> Option<String> {
    let parent = strip_brackets(parent);
    let tag = strip_brackets(tag);
    if parent.is_empty() || tag.is_empty() {
        return None;
    }
    Some(format!("{}/{}", parent, tag))
}

/// A path index value: either `"a/b/c"` or `["a", "b", "c"]`; `null` maps nothing
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum PointerSpec {
    Path(String),
    Segments(Vec<String>),
}

impl PointerSpec {
    fn into_segments(self) -> Vec<String> {
        let segments = match self {
            PointerSpec::Path(p) => p.split('/').map(str::to_string).collect(),
            PointerSpec::Segments(s) => s,
        };
        segments
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Case-insensitive lookup from logical field path to extraction pointer
#[derive(Debug, Clone, Default)]
pub struct PathIndex {
    pointers: HashMap<String, Vec<String>>,
}

impl PathIndex {
    /// Build an index from `(logical path, pointer)` pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let pointers = pairs
            .into_iter()
            .map(|(k, v)| {
                let spec = PointerSpec::Path(v.as_ref().to_string());
                (k.as_ref().to_lowercase(), spec.into_segments())
            })
            .collect();
        Self { pointers }
    }

    /// Parse a path index from a JSON object
    pub fn from_json_str(content: &str) -> serde_json::Result<Self> {
        let raw: HashMap<String, Option<PointerSpec>> = serde_json::from_str(content)?;
        let pointers = raw
            .into_iter()
            .map(|(k, v)| {
                let segments = v.map(PointerSpec::into_segments).unwrap_or_default();
                (k.to_lowercase(), segments)
            })
            .collect();
        Ok(Self { pointers })
    }

    /// Load a path index from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json_str(&content).map_err(|e| Error::PathIndex {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Resolve a logical path; the key is matched case-insensitively
    pub fn resolve(&self, logical_path: &str) -> Option<&[String]> {
        self.pointers
            .get(&logical_path.to_lowercase())
            .map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.pointers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pointers.is_empty()
    }
}
