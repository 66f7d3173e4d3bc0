//! Export layout and job files
//!
//! The layout fixes the shape of the export: row width, where the listing id
//! sits in the primary table, how many photo slots the secondary table has
//! and which primary columns the photo merge overwrites. A job file bundles a
//! layout with the input and output locations of one run.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Default export row width
pub const DEFAULT_WIDTH: usize = 334;
/// Default primary column holding the listing id
pub const DEFAULT_KEY_COLUMN: usize = 1;
/// Default number of photo slots per listing
pub const DEFAULT_IMAGE_SLOTS: usize = 30;

/// Shape of the export tables and of the photo merge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportLayout {
    /// Width of every primary row
    pub width: usize,
    /// Primary column compared against the photo table id
    pub key_column: usize,
    /// Photo URL slots after the id in each secondary row
    pub image_slots: usize,
    /// Primary column -> secondary column overwritten on a key match
    pub column_map: BTreeMap<usize, usize>,
}

impl Default for ExportLayout {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            key_column: DEFAULT_KEY_COLUMN,
            image_slots: DEFAULT_IMAGE_SLOTS,
            column_map: default_column_map(),
        }
    }
}

/// Photo columns 85..=93 of the export take the first nine photo URLs
fn default_column_map() -> BTreeMap<usize, usize> {
    (84..=92).zip(2..=10).collect()
}

impl ExportLayout {
    /// Width of a secondary (photo) row: the id plus every slot
    pub fn secondary_width(&self) -> usize {
        1 + self.image_slots
    }

    /// Check that every column the merge touches exists
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 {
            return Err(Error::InvalidLayout("width must be positive".to_string()));
        }
        if self.key_column >= self.width {
            return Err(Error::InvalidLayout(format!(
                "key column {} is outside the row width {}",
                self.key_column, self.width
            )));
        }
        if let Some((&target, _)) = self.column_map.iter().find(|(t, _)| **t >= self.width) {
            return Err(Error::InvalidLayout(format!(
                "column map target {} is outside the row width {}",
                target, self.width
            )));
        }
        Ok(())
    }
}

/// Everything one pipeline run needs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobFile {
    /// Feed location: file path or http(s) URL
    pub feed: String,
    /// Mapping rule sheet (.csv, .xlsx, .xls, .ods)
    pub rules: PathBuf,
    /// Path index JSON
    pub path_index: PathBuf,
    /// Directory the export bundle is written to
    pub output_dir: PathBuf,
    /// Also write the primary and photo tables before merging
    #[serde(default)]
    pub dump_intermediate: bool,
    #[serde(default)]
    pub layout: ExportLayout,
}

impl JobFile {
    /// Load a job file from JSON
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Save the job file to JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let layout = ExportLayout::default();

        assert_eq!(layout.width, 334);
        assert_eq!(layout.secondary_width(), 31);
        assert_eq!(layout.column_map.len(), 9);
        assert_eq!(layout.column_map[&84], 2);
        assert_eq!(layout.column_map[&92], 10);
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_columns() {
        let mut layout = ExportLayout {
            width: 10,
            ..ExportLayout::default()
        };
        layout.column_map.clear();
        assert!(layout.validate().is_ok());

        layout.column_map.insert(10, 2);
        assert!(matches!(layout.validate(), Err(Error::InvalidLayout(_))));

        layout.column_map.clear();
        layout.key_column = 10;
        assert!(matches!(layout.validate(), Err(Error::InvalidLayout(_))));
    }

    #[test]
    fn test_job_file_layout_defaults() {
        let job: JobFile = serde_json::from_str(
            r#"{
                "feed": "https://example.com/feed",
                "rules": "mapping.xlsx",
                "path_index": "xml_map.json",
                "output_dir": "out",
                "layout": { "image_slots": 10, "column_map": { "5": 1 } }
            }"#,
        )
        .unwrap();

        assert!(!job.dump_intermediate);
        assert_eq!(job.layout.width, DEFAULT_WIDTH);
        assert_eq!(job.layout.image_slots, 10);
        assert_eq!(job.layout.column_map.get(&5), Some(&1));
    }
}
