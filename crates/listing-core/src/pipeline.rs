//! End-to-end export run
//!
//! Loading happens up front and any failure there aborts the run before a
//! single row is built. After that nothing can fail except writing files.

use crate::builder::{build_photo_table, RowBuilder};
use crate::error::Result;
use crate::feed::{listings, parse_feed, FeedSource};
use crate::layout::{ExportLayout, JobFile};
use crate::mapping::{load_rules, MappingRule, PathIndex};
use crate::merger::{merge, MergeReport};
use crate::package::{write_bundle, write_intermediates};
use crate::rules_io::read_rule_sheet;
use crate::table::Table;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Loaded, immutable inputs of one run
#[derive(Debug, Clone)]
pub struct Pipeline {
    pub rules: Vec<MappingRule>,
    pub index: PathIndex,
    pub layout: ExportLayout,
}

/// Tables produced from one feed
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub listings: usize,
    /// Mapped rows before the photo merge
    pub primary: Table,
    /// Listing id plus photo slots per listing
    pub photos: Table,
    /// Primary table after the photo merge
    pub merged: Table,
    pub merge: MergeReport,
}

impl Pipeline {
    /// Build a pipeline from already loaded parts
    pub fn new(rules: Vec<MappingRule>, index: PathIndex, layout: ExportLayout) -> Result<Self> {
        layout.validate()?;
        Ok(Self {
            rules,
            index,
            layout,
        })
    }

    /// Load the rule sheet and path index from disk
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(
        rules_path: P,
        index_path: Q,
        layout: ExportLayout,
    ) -> Result<Self> {
        let grid = read_rule_sheet(rules_path.as_ref())?;
        let rules = load_rules(&grid)?;
        let index = PathIndex::load(index_path)?;
        info!(
            rules = rules.len(),
            paths = index.len(),
            "loaded mapping from {}",
            rules_path.as_ref().display()
        );
        Self::new(rules, index, layout)
    }

    /// Run every stage on raw feed text
    pub fn process(&self, feed_xml: &str) -> Result<PipelineOutput> {
        let doc = parse_feed(feed_xml)?;
        let nodes = listings(&doc);
        info!(listings = nodes.len(), "parsed feed");

        let builder = RowBuilder::new(&self.rules, &self.index, self.layout.width);
        let primary = builder.build_table(&nodes);
        let photos = build_photo_table(&nodes, &self.layout);

        let mut merged = primary.clone();
        let merge_report = merge(&mut merged, &photos, &self.layout);

        Ok(PipelineOutput {
            listings: nodes.len(),
            primary,
            photos,
            merged,
            merge: merge_report,
        })
    }
}

/// Summary of a completed job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub listings: usize,
    pub merge: MergeReport,
    pub files: Vec<PathBuf>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Fetch, transform and write everything a job file describes
pub fn run_job(job: &JobFile) -> Result<RunReport> {
    let started_at = Utc::now();

    let pipeline = Pipeline::load(&job.rules, &job.path_index, job.layout.clone())?;
    let source = FeedSource::parse(&job.feed);
    info!(source = %source, "reading feed");
    let feed_xml = source.read()?;

    let output = pipeline.process(&feed_xml)?;

    let mut files = Vec::new();
    if job.dump_intermediate {
        files.extend(write_intermediates(&job.output_dir, &output.primary, &output.photos)?);
    }
    let bundle = write_bundle(&job.output_dir, &output.merged)?;
    files.extend(bundle.files);
    info!(dir = %job.output_dir.display(), files = files.len(), "export written");

    Ok(RunReport {
        listings: output.listings,
        merge: output.merge,
        files,
        started_at,
        finished_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::FieldType;
    use std::collections::BTreeMap;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
    <listings>
        <listing>
            <id>ref-1</id>
            <price>1200.5</price>
            <listing_media><images>
                <image><url>https://img/a.jpg</url></image>
                <image><url>https://img/b.jpg</url></image>
            </images></listing_media>
        </listing>
        <listing>
            <id>ref-2</id>
            <price>abc</price>
        </listing>
    </listings>"#;

    fn pipeline() -> Pipeline {
        let rules = vec![
            MappingRule::new(2, Some("general/ref".to_string()), FieldType::Text),
            MappingRule::new(3, Some("general/price".to_string()), FieldType::Decimal),
        ];
        let index = PathIndex::from_pairs([("general/ref", "id"), ("general/price", "price")]);
        let layout = ExportLayout {
            width: 8,
            key_column: 1,
            image_slots: 4,
            column_map: BTreeMap::from([(5, 1), (6, 2), (7, 3)]),
        };
        Pipeline::new(rules, index, layout).unwrap()
    }

    #[test]
    fn test_process_merges_photos_by_id() {
        let output = pipeline().process(FEED).unwrap();

        assert_eq!(output.listings, 2);
        assert_eq!(output.primary.width, 8);
        assert_eq!(output.photos.width, 5);
        assert_eq!(output.merge.matched, 2);

        let first = &output.merged.rows[0];
        assert_eq!(first.get(1), Some("ref-1"));
        assert_eq!(first.get(2), Some("1200.50"));
        assert_eq!(first.get(5), Some("https://img/a.jpg"));
        assert_eq!(first.get(6), Some("https://img/b.jpg"));
        assert_eq!(first.get(7), Some(""));

        let second = &output.merged.rows[1];
        assert_eq!(second.get(2), Some(""));
        assert_eq!(second.get(5), Some(""));
    }

    #[test]
    fn test_process_keeps_unmerged_primary() {
        let output = pipeline().process(FEED).unwrap();

        assert_eq!(output.primary.rows[0].get(5), Some(""));
    }

    #[test]
    fn test_process_rejects_bad_feed() {
        assert!(pipeline().process("<listings><listing>").is_err());
    }

    #[test]
    fn test_new_validates_layout() {
        let layout = ExportLayout {
            width: 4,
            ..ExportLayout::default()
        };
        assert!(Pipeline::new(Vec::new(), PathIndex::default(), layout).is_err());
    }
}
