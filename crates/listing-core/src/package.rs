//! Export bundle: the final table plus the two fixed manifests

use crate::error::Result;
use crate::serializer::write_export;
use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the exported listing table
pub const EXPORT_FILE: &str = "Annonces.csv";
/// Intermediate primary table, written on request
pub const PRIMARY_DUMP_FILE: &str = "scan.csv";
/// Intermediate photo table, written on request
pub const PHOTO_DUMP_FILE: &str = "photos.csv";

pub const CONFIG_FILE: &str = "config.txt";
pub const CONFIG_TEXT: &str = "Version=4.12\r\nApplication=Propertybase / 3.0\r\nDevise=Euro\r\n";

pub const PHOTOS_FILE: &str = "photos.cfg";
pub const PHOTOS_TEXT: &str = "Mode=URL\r\n";

/// Files written for one export
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportBundle {
    pub dir: PathBuf,
    pub files: Vec<PathBuf>,
}

/// Write the export table and both manifests into `dir`, creating it if needed
pub fn write_bundle<P: AsRef<Path>>(dir: P, table: &Table) -> Result<ExportBundle> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let export_path = dir.join(EXPORT_FILE);
    write_export(&export_path, table)?;

    let config_path = dir.join(CONFIG_FILE);
    fs::write(&config_path, CONFIG_TEXT)?;

    let photos_path = dir.join(PHOTOS_FILE);
    fs::write(&photos_path, PHOTOS_TEXT)?;

    Ok(ExportBundle {
        dir: dir.to_path_buf(),
        files: vec![export_path, config_path, photos_path],
    })
}

/// Write the unmerged tables next to the bundle for inspection
pub fn write_intermediates<P: AsRef<Path>>(
    dir: P,
    primary: &Table,
    photos: &Table,
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let primary_path = dir.join(PRIMARY_DUMP_FILE);
    write_export(&primary_path, primary)?;
    let photos_path = dir.join(PHOTO_DUMP_FILE);
    write_export(&photos_path, photos)?;

    Ok(vec![primary_path, photos_path])
}
