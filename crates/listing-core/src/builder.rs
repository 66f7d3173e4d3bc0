//! Row builders for the primary (mapped) and secondary (photo) tables

use crate::coerce::coerce;
use crate::extract::{child_text, extract, ListingNode};
use crate::layout::ExportLayout;
use crate::mapping::{MappingRule, PathIndex};
use crate::table::{Row, Table};
use tracing::warn;

/// Tag of the listing identifier
pub const ID_TAG: &str = "id";

const MEDIA_TAG: &str = "listing_media";
const IMAGES_TAG: &str = "images";
const IMAGE_TAG: &str = "image";
const URL_TAG: &str = "url";

/// Builds fixed-width primary rows from mapping rules
#[derive(Debug)]
pub struct RowBuilder<'r> {
    rules: Vec<&'r MappingRule>,
    index: &'r PathIndex,
    width: usize,
}

impl<'r> RowBuilder<'r> {
    /// Prepare a builder. Rules ranked past `width` are dropped up front.
    pub fn new(rules: &'r [MappingRule], index: &'r PathIndex, width: usize) -> Self {
        let rules = rules
            .iter()
            .filter(|rule| {
                let fits = rule.rank >= 1 && rule.rank <= width;
                if !fits {
                    warn!(rank = rule.rank, width, "rule ranked outside the export width, ignored");
                }
                fits
            })
            .collect();
        Self {
            rules,
            index,
            width,
        }
    }

    /// Map one listing into a primary row
    pub fn build_row<N: ListingNode>(&self, listing: &N) -> Row {
        let mut row = Row::blank(self.width);
        for rule in &self.rules {
            let raw = rule
                .source_path
                .as_deref()
                .and_then(|path| self.index.resolve(path))
                .map(|pointer| extract(listing, pointer))
                .unwrap_or_default();
            row.set(rule.column(), coerce(rule.field_type, &raw));
        }
        row
    }

    /// Map every listing, preserving feed order
    pub fn build_table<N: ListingNode>(&self, listings: &[N]) -> Table {
        let mut table = Table::new(self.width);
        for listing in listings {
            table.push(self.build_row(listing));
        }
        table
    }
}

/// Photo URLs of a listing in document order, blank-padded or truncated to
/// exactly `slots` entries
pub fn image_urls<N: ListingNode>(listing: &N, slots: usize) -> Vec<String> {
    let mut urls: Vec<String> = listing
        .child(MEDIA_TAG)
        .and_then(|media| media.child(IMAGES_TAG))
        .map(|images| {
            images
                .children_named(IMAGE_TAG)
                .iter()
                .filter_map(|image| {
                    image
                        .child(URL_TAG)
                        .as_ref()
                        .and_then(ListingNode::text)
                        .filter(|url| !url.is_empty())
                        .map(|url| url.trim().to_string())
                })
                .take(slots)
                .collect()
        })
        .unwrap_or_default();
    urls.resize(slots, String::new());
    urls
}

/// Secondary row: listing id followed by its photo slots
pub fn build_photo_row<N: ListingNode>(listing: &N, slots: usize) -> Row {
    let mut cells = Vec::with_capacity(1 + slots);
    cells.push(child_text(listing, ID_TAG));
    cells.extend(image_urls(listing, slots));
    Row::new(cells)
}

pub fn build_photo_table<N: ListingNode>(listings: &[N], layout: &ExportLayout) -> Table {
    let mut table = Table::new(layout.secondary_width());
    for listing in listings {
        table.push(build_photo_row(listing, layout.image_slots));
    }
    table
}
