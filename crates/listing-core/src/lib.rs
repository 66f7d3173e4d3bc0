//! listing-core: Core library for turning listing feeds into syndication exports
//!
//! This library provides functionality to:
//! - Load mapping rules (rank, source path, type) and a path index
//! - Extract and coerce fields from XML listings into fixed-width rows
//! - Build a photo table and merge it into the mapped rows by listing id
//! - Serialize the result in the quoted `!#` export format and bundle it

pub mod builder;
pub mod coerce;
pub mod error;
pub mod extract;
pub mod feed;
pub mod key;
pub mod layout;
pub mod mapping;
pub mod merger;
pub mod package;
pub mod pipeline;
pub mod rules_io;
pub mod serializer;
pub mod table;

pub use builder::{build_photo_table, RowBuilder};
pub use error::{Error, Result};
pub use extract::{extract, ListingNode};
pub use feed::FeedSource;
pub use key::normalize;
pub use layout::{ExportLayout, JobFile};
pub use mapping::{load_rules, FieldType, MappingRule, PathIndex};
pub use merger::{clean, merge, MergeReport};
pub use package::{write_bundle, ExportBundle};
pub use pipeline::{run_job, Pipeline, PipelineOutput, RunReport};
pub use rules_io::read_rule_sheet;
pub use serializer::{parse_export_str, read_export, serialize, write_export};
pub use table::{Row, Table};
