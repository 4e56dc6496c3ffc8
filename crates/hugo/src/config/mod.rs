//! Converter configuration: mapping tables and pipeline switches.
//!
//! A [`ConverterConfig`] is built once (from YAML or [`Default`]) and shared
//! read-only by every document conversion.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Built-in defaults for every table.
pub mod defaults;
/// Ordered string-keyed tables.
pub mod ordered;

pub use ordered::OrderedTable;

/// Configuration consumed by the per-document conversion pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Frontmatter keys to keep, `source key -> target key`, in output order.
    pub field_mapping: OrderedTable<String>,
    /// Top-level section name -> category routing and sort weight.
    pub content_mapping: BTreeMap<String, SectionMapping>,
    /// Ordered `language -> [substring, ...]` table for fence inference.
    pub code_language_patterns: OrderedTable<Vec<String>>,
    /// Root-level files routed to a fixed category path (e.g. `help.md`).
    pub orphan_files: BTreeMap<String, String>,
    /// Category names that are rejected even when configured.
    pub disallowed_categories: Vec<String>,
    /// Vendor element names escaped by the sanitizer.
    pub custom_tags: Vec<String>,
    /// Extension of source documents, without the dot.
    pub source_extension: String,
    /// Extension of written content files and of rewritten `.html` link targets.
    pub content_extension: String,
    /// Which first-level heading the sanitizer drops.
    pub heading_policy: HeadingPolicy,
    /// Leave lines inside fenced code blocks untouched by the sanitizer.
    pub skip_fenced_blocks: bool,
    /// Frontmatter mapping strategy and literal defaults.
    pub frontmatter: FrontmatterOptions,
    /// Code fence language inference strategy.
    pub code_fence: CodeFenceOptions,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        defaults::default_config()
    }
}

impl ConverterConfig {
    /// Mapping for a top-level section.
    pub fn section(&self, name: &str) -> Option<&SectionMapping> {
        self.content_mapping.get(name)
    }

    /// True when `category` must not be produced by routing.
    pub fn is_disallowed_category(&self, category: &str) -> bool {
        self.disallowed_categories.iter().any(|c| c == category)
    }

    /// Category path for a root-level orphan file.
    pub fn orphan_category(&self, file_name: &str) -> Option<&str> {
        self.orphan_files.get(file_name).map(String::as_str)
    }
}

/// Routing entry for one documentation section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionMapping {
    /// Category directory under `content/` (e.g. `docs`, `tutorials`).
    #[serde(rename = "type")]
    pub category: String,
    /// Sort weight of the section.
    #[serde(default = "defaults::section_weight")]
    pub weight: i64,
    /// Display title override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// First-heading suppression policy of the sanitizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeadingPolicy {
    /// Drop the first `# Heading` of every document.
    #[default]
    Always,
    /// Drop the first `# Heading` only when it equals the title (case-insensitive).
    MatchingTitle,
}

/// Frontmatter mapper selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MapperStrategy {
    /// Copy mapped keys, add `weight` and `linkTitle`.
    #[default]
    Simple,
    /// Also apply section weights and literal `type`/`date` defaults.
    Sectioned,
}

/// Frontmatter mapping options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontmatterOptions {
    /// Mapper strategy.
    pub strategy: MapperStrategy,
    /// Weight used when neither the mapping nor the source provides one.
    pub default_weight: i64,
    /// Literal `type` injected by the sectioned strategy.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub default_type: Option<String>,
    /// Literal `date` injected by the sectioned strategy.
    #[serde(rename = "date", skip_serializing_if = "Option::is_none")]
    pub default_date: Option<String>,
}

impl Default for FrontmatterOptions {
    fn default() -> Self {
        Self {
            strategy: MapperStrategy::Simple,
            default_weight: 1,
            default_type: None,
            default_date: None,
        }
    }
}

/// Fence labeler selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FenceStrategy {
    /// First configured language whose substring occurs in the content.
    #[default]
    PatternTable,
    /// Built-in declaration/import keyword checks, then the configured table.
    Keyword,
}

/// Code fence annotation options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeFenceOptions {
    /// Labeler strategy.
    pub strategy: FenceStrategy,
}
