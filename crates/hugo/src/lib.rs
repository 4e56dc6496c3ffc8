#![deny(missing_docs)]
//! docport Hugo engine: Devsite markup cleanup, sanitizing and Docsy layout.

/// Frontmatter + body assembly.
pub mod assemble;
/// Converter configuration and defaults.
pub mod config;
/// Per-document conversion.
pub mod document;
/// Frontmatter field mapping.
pub mod frontmatter;
/// Line-oriented markup sanitizer.
pub mod sanitize;
/// Whole-body transforms (cleanup, links, trees, code fences).
pub mod transform;

pub use config::{
    CodeFenceOptions, ConverterConfig, FenceStrategy, FrontmatterOptions, HeadingPolicy,
    MapperStrategy, OrderedTable, SectionMapping,
};
pub use document::{ConvertedDocument, Document, DocumentConverter, convert_document};
pub use frontmatter::{FieldMapper, MappingContext};
pub use sanitize::{LinePass, SanitizeContext, Sanitizer};
