//! Whole-tree conversion with rayon.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use docport_core::ConvertError;
use docport_hugo::{ConverterConfig, DocumentConverter};
use rayon::prelude::*;
use serde::Serialize;
use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::route::Router;

/// Batch processing switches.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Worker threads; rayon's global pool when `None`.
    pub max_threads: Option<usize>,
    /// Keep converting after a failure (default `true`).
    ///
    /// When `false`, documents are processed sequentially and the run stops
    /// after the first failure.
    pub continue_on_error: bool,
    /// Convert and report without writing anything.
    pub dry_run: bool,
    /// Skip documents whose destination is newer than the source.
    pub incremental: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_threads: None,
            continue_on_error: true,
            dry_run: false,
            incremental: false,
        }
    }
}

/// What happened to one source document.
#[derive(Debug)]
pub enum DocumentOutcome {
    /// Written (or, in a dry run, would be written) to `destination`.
    Converted {
        /// Absolute output path under `content/`.
        destination: PathBuf,
    },
    /// Destination already up to date.
    Skipped,
    /// Routing, reading or writing failed.
    Failed {
        /// Cause of the failure.
        error: ConvertError,
    },
}

/// A document that could not be converted.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentFailure {
    /// Source-relative path.
    pub path: PathBuf,
    /// Human readable cause.
    pub error: String,
}

/// Summary of a [`convert_tree`] run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// Documents discovered under the source root, plus unreadable entries.
    pub total_files: usize,
    /// Documents converted.
    pub converted_files: usize,
    /// Documents skipped as up to date.
    pub skipped_files: usize,
    /// Documents (or unreadable entries) that failed.
    pub error_files: usize,
    /// Unreadable entries first, then failed documents in source order.
    pub failures: Vec<DocumentFailure>,
    /// Wall time of the run in milliseconds.
    pub elapsed_ms: f64,
}

impl BatchReport {
    /// True when at least one document failed.
    pub fn has_errors(&self) -> bool {
        self.error_files > 0
    }
}

/// Documents found under a source root.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Source-relative document paths, sorted.
    pub documents: Vec<PathBuf>,
    /// Entries that could not be listed.
    pub failures: Vec<DocumentFailure>,
}

/// Converts a walkdir error into a failure entry relative to `root`.
pub(crate) fn walk_failure(root: &Path, err: walkdir::Error) -> DocumentFailure {
    let path = err
        .path()
        .map(|path| path.strip_prefix(root).unwrap_or(path).to_path_buf())
        .unwrap_or_default();
    let error = ConvertError::io(root.join(&path), err.into());
    log::error!("{error}");
    DocumentFailure {
        path,
        error: error.to_string(),
    }
}

/// Every `.{extension}` file under `source`, following symlinks.
///
/// Unreadable entries are recorded and the walk continues.
pub fn discover_documents(source: &Path, extension: &str) -> Discovery {
    let mut discovery = Discovery::default();
    for entry in WalkDir::new(source).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                discovery.failures.push(walk_failure(source, err));
                continue;
            }
        };
        if !entry.file_type().is_file()
            || entry.path().extension().and_then(|ext| ext.to_str()) != Some(extension)
        {
            continue;
        }
        match entry.path().strip_prefix(source) {
            Ok(rel) => discovery.documents.push(rel.to_path_buf()),
            Err(_) => discovery.failures.push(DocumentFailure {
                path: entry.path().to_path_buf(),
                error: ConvertError::InvalidPath(entry.path().to_path_buf()).to_string(),
            }),
        }
    }
    discovery
}

fn slash_path(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn is_up_to_date(source: &Path, destination: &Path) -> bool {
    let modified = |path: &Path| fs::metadata(path).and_then(|meta| meta.modified()).ok();
    match (modified(source), modified(destination)) {
        (Some(source), Some(destination)) => source <= destination,
        _ => false,
    }
}

pub(crate) fn write_atomic(destination: &Path, text: &str) -> Result<(), ConvertError> {
    let parent = destination
        .parent()
        .ok_or_else(|| ConvertError::InvalidPath(destination.to_path_buf()))?;
    fs::create_dir_all(parent).map_err(|err| ConvertError::io(parent, err))?;
    let mut file = NamedTempFile::new_in(parent).map_err(|err| ConvertError::io(parent, err))?;
    file.write_all(text.as_bytes())
        .map_err(|err| ConvertError::io(file.path().to_path_buf(), err))?;
    file.persist(destination)
        .map_err(|err| ConvertError::io(destination, err.error))?;
    Ok(())
}

/// Converts documents of one source tree into `<output>/content`.
pub struct TreeConverter<'c> {
    converter: DocumentConverter<'c>,
    router: Router<'c>,
    source: PathBuf,
    content_dir: PathBuf,
}

impl<'c> TreeConverter<'c> {
    /// Converter for `source` writing below `output`.
    pub fn new(source: &Path, output: &Path, config: &'c ConverterConfig) -> Self {
        Self {
            converter: DocumentConverter::new(config),
            router: Router::new(config),
            source: source.to_path_buf(),
            content_dir: output.join("content"),
        }
    }

    /// Output path of the source-relative document `rel_path`.
    pub fn destination(&self, rel_path: &Path) -> Result<PathBuf, ConvertError> {
        let mut destination = self.content_dir.join(self.router.route(rel_path)?);
        destination.set_extension(&self.converter.config().content_extension);
        Ok(destination)
    }

    /// Converts one document; never panics and never aborts the caller.
    pub fn convert_file(&self, rel_path: &Path, options: &BatchOptions) -> DocumentOutcome {
        match self.try_convert(rel_path, options) {
            Ok(outcome) => outcome,
            Err(error) => DocumentOutcome::Failed { error },
        }
    }

    fn try_convert(
        &self,
        rel_path: &Path,
        options: &BatchOptions,
    ) -> Result<DocumentOutcome, ConvertError> {
        let destination = self.destination(rel_path)?;
        let source = self.source.join(rel_path);
        if options.incremental && is_up_to_date(&source, &destination) {
            log::debug!("{} is up to date", rel_path.display());
            return Ok(DocumentOutcome::Skipped);
        }

        let raw = fs::read_to_string(&source).map_err(|err| ConvertError::io(&source, err))?;
        let converted = self.converter.convert(&raw, &slash_path(rel_path));
        if options.dry_run {
            log::info!("would write {}", destination.display());
        } else {
            write_atomic(&destination, &converted.text)?;
            log::debug!("wrote {}", destination.display());
        }
        Ok(DocumentOutcome::Converted { destination })
    }
}

/// Converts every document under `source` into `<output>/content`.
///
/// Never fails as a whole: unreadable entries and per-document failures are
/// recorded in the report and the remaining documents are still converted.
pub fn convert_tree(
    source: &Path,
    output: &Path,
    config: &ConverterConfig,
    options: &BatchOptions,
) -> BatchReport {
    let start = Instant::now();
    let Discovery {
        documents,
        failures: walk_failures,
    } = discover_documents(source, &config.source_extension);
    let tree = TreeConverter::new(source, output, config);

    let pool = options.max_threads.and_then(|threads| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|err| log::warn!("falling back to the global thread pool: {err}"))
            .ok()
    });

    let converted = AtomicUsize::new(0);
    let skipped = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);

    let process = |rel_path: &PathBuf| -> (PathBuf, DocumentOutcome) {
        let outcome = tree.convert_file(rel_path, options);
        let counter = match &outcome {
            DocumentOutcome::Converted { .. } => &converted,
            DocumentOutcome::Skipped => &skipped,
            DocumentOutcome::Failed { .. } => &failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        (rel_path.clone(), outcome)
    };

    let outcomes: Vec<(PathBuf, DocumentOutcome)> = if options.continue_on_error {
        if let Some(pool) = pool {
            pool.install(|| documents.par_iter().map(process).collect())
        } else {
            documents.par_iter().map(process).collect()
        }
    } else {
        // Stop on first error - sequential processing required
        let mut outcomes = Vec::with_capacity(documents.len());
        for rel_path in &documents {
            let outcome = process(rel_path);
            let stop = matches!(outcome.1, DocumentOutcome::Failed { .. });
            outcomes.push(outcome);
            if stop {
                break;
            }
        }
        outcomes
    };

    let failures = walk_failures
        .into_iter()
        .chain(outcomes.into_iter().filter_map(|(path, outcome)| match outcome {
            DocumentOutcome::Failed { error } => {
                log::error!("{}: {error}", path.display());
                Some(DocumentFailure {
                    path,
                    error: error.to_string(),
                })
            }
            _ => None,
        }))
        .collect::<Vec<_>>();

    let unreadable = failures.len() - failed.load(Ordering::Relaxed);
    BatchReport {
        total_files: documents.len() + unreadable,
        converted_files: converted.load(Ordering::Relaxed),
        skipped_files: skipped.load(Ordering::Relaxed),
        error_files: failures.len(),
        failures,
        elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
    }
}
