//! Image assets copied under `static/`.

use std::fs;
use std::path::Path;

use docport_core::ConvertError;
use serde::Serialize;
use walkdir::WalkDir;

use crate::batch::{DocumentFailure, walk_failure};

/// Extensions treated as static assets (lowercase).
pub const ASSET_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "svg", "ico"];

fn is_asset(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ASSET_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Result of [`copy_assets`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct AssetReport {
    /// Assets copied (or, in a dry run, that would be copied).
    pub copied: usize,
    /// Assets or directories that could not be read or written.
    pub failures: Vec<DocumentFailure>,
}

impl AssetReport {
    /// True when at least one asset failed.
    pub fn has_errors(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Copies every asset under `source` to `output/static/<rel>`.
///
/// A failing asset is logged and recorded; the remaining assets are still
/// copied.
pub fn copy_assets(source: &Path, output: &Path, dry_run: bool) -> AssetReport {
    let static_dir = output.join("static");
    let mut report = AssetReport::default();
    for entry in WalkDir::new(source).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                report.failures.push(walk_failure(source, err));
                continue;
            }
        };
        if !entry.file_type().is_file() || !is_asset(entry.path()) {
            continue;
        }
        let rel = entry.path().strip_prefix(source).unwrap_or(entry.path());
        let destination = static_dir.join(rel);
        if dry_run {
            log::info!("would copy {} to {}", rel.display(), destination.display());
            report.copied += 1;
            continue;
        }
        match copy_one(entry.path(), &destination) {
            Ok(()) => {
                log::debug!("copied {}", rel.display());
                report.copied += 1;
            }
            Err(error) => {
                log::error!("{error}");
                report.failures.push(DocumentFailure {
                    path: rel.to_path_buf(),
                    error: error.to_string(),
                });
            }
        }
    }
    report
}

fn copy_one(from: &Path, destination: &Path) -> Result<(), ConvertError> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|err| ConvertError::io(parent, err))?;
    }
    fs::copy(from, destination).map_err(|err| ConvertError::io(destination, err))?;
    Ok(())
}
