use std::path::PathBuf;
use thiserror::Error;

/// Source location information for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Optional file path
    pub file: Option<String>,
    /// Line number (1-indexed)
    pub line: usize,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize) -> Self {
        Self { file: None, line }
    }

    /// Create a source location with file information
    pub fn with_file(file: String, line: usize) -> Self {
        Self {
            file: Some(file),
            line,
        }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{}:{}", file, self.line)
        } else {
            write!(f, "line {}", self.line)
        }
    }
}

/// Errors that make a single document (or the whole run) fail.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Reading, writing or renaming a file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Offending path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The document's top-level directory has no `content_mapping` entry.
    #[error("no category mapping found for section '{section}' ({})", path.display())]
    UnmappedSection {
        /// Top-level path segment.
        section: String,
        /// Source-relative document path.
        path: PathBuf,
    },
    /// The section maps to a category that is no longer supported.
    #[error(
        "'{category}' is not a valid category for {}; update content_mapping in the configuration to use another category",
        path.display()
    )]
    DisallowedCategory {
        /// Category name produced by the mapping.
        category: String,
        /// Source-relative document path.
        path: PathBuf,
    },
    /// A source path was not located under the source root.
    #[error("path is outside the source tree: {}", .0.display())]
    InvalidPath(PathBuf),
    /// Configuration could not be loaded or is inconsistent.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ConvertError {
    /// Wrap an I/O error together with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Non-fatal findings recorded while converting a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionWarning {
    /// Code fence opened but never closed; it was still annotated.
    UnclosedCodeFence {
        /// Source location where the fence started
        location: SourceLocation,
        /// Fence marker character (backtick or tilde)
        marker: char,
    },
    /// Frontmatter block present but unusable; the document was read as body only.
    MalformedFrontmatter {
        /// Reason reported by the splitter
        reason: String,
    },
}

impl std::fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversionWarning::UnclosedCodeFence { location, marker } => {
                write!(f, "Unclosed code fence ({}) at {}", marker, location)
            }
            ConversionWarning::MalformedFrontmatter { reason } => {
                write!(f, "Ignoring frontmatter: {}", reason)
            }
        }
    }
}

/// Collection of warnings gathered for one document.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    /// List of non-fatal warnings
    pub warnings: Vec<ConversionWarning>,
}

impl Diagnostics {
    /// Create a new empty diagnostics collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a warning to the diagnostics collection
    pub fn add_warning(&mut self, warning: ConversionWarning) {
        self.warnings.push(warning);
    }

    /// Append every warning of `other`.
    pub fn extend(&mut self, other: Diagnostics) {
        self.warnings.extend(other.warnings);
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Number of warnings recorded.
    pub fn count(&self) -> usize {
        self.warnings.len()
    }
}
