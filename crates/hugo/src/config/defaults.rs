//! Built-in converter defaults.
//!
//! These tables are used when no configuration file is provided, and fill in
//! any field a partial configuration file leaves out.

use std::collections::BTreeMap;

use super::{
    CodeFenceOptions, ConverterConfig, FrontmatterOptions, HeadingPolicy, OrderedTable,
    SectionMapping,
};

/// Weight of a section entry that does not declare one.
pub fn section_weight() -> i64 {
    100
}

/// Creates the default converter configuration.
///
/// # Example
///
/// ```
/// use docport_hugo::config::defaults::default_config;
///
/// let config = default_config();
/// assert_eq!(config.field_mapping.get("title").map(String::as_str), Some("title"));
/// assert!(config.is_disallowed_category("how-to-guides"));
/// assert_eq!(config.orphan_category("help.md"), Some("docs/reference"));
/// ```
pub fn default_config() -> ConverterConfig {
    ConverterConfig {
        field_mapping: default_field_mapping(),
        content_mapping: default_content_mapping(),
        code_language_patterns: default_language_patterns(),
        orphan_files: BTreeMap::from([("help.md".to_string(), "docs/reference".to_string())]),
        disallowed_categories: vec!["how-to-guides".to_string()],
        custom_tags: ["workspace", "symlink_path", "attribute_name"]
            .into_iter()
            .map(String::from)
            .collect(),
        source_extension: "md".to_string(),
        content_extension: "md".to_string(),
        heading_policy: HeadingPolicy::Always,
        skip_fenced_blocks: false,
        frontmatter: FrontmatterOptions::default(),
        code_fence: CodeFenceOptions::default(),
    }
}

/// Devsite frontmatter keys carried into Hugo frontmatter.
pub fn default_field_mapping() -> OrderedTable<String> {
    ["title", "description", "project_path", "book_path", "toc"]
        .into_iter()
        .map(|key| (key, key.to_string()))
        .collect()
}

fn section(category: &str, weight: i64, title: &str) -> SectionMapping {
    SectionMapping {
        category: category.to_string(),
        weight,
        title: Some(title.to_string()),
    }
}

/// Common Devsite section names and the Docsy category they land in.
pub fn default_content_mapping() -> BTreeMap<String, SectionMapping> {
    BTreeMap::from([
        ("about".to_string(), section("docs", 10, "About")),
        ("basics".to_string(), section("docs", 20, "Basics")),
        ("concepts".to_string(), section("docs", 30, "Concepts")),
        ("tutorials".to_string(), section("tutorials", 40, "Tutorials")),
        ("reference".to_string(), section("docs", 50, "Reference")),
    ])
}

/// Ordered substring hints for unlabeled code fences; first match wins.
pub fn default_language_patterns() -> OrderedTable<Vec<String>> {
    let table: [(&str, &[&str]); 6] = [
        ("cpp", &["#include", "std::"]),
        ("java", &["public class", "import java.", "System.out"]),
        (
            "starlark",
            &[
                "load(\"",
                "cc_binary(",
                "cc_library(",
                "java_binary(",
                "py_binary(",
                "genrule(",
                "http_archive(",
            ],
        ),
        ("python", &["def ", "import ", "print("]),
        ("bash", &["bazel ", "$ ", "#!/bin/bash", "cd ", "echo "]),
        ("go", &["package main", "func "]),
    ];
    table
        .into_iter()
        .map(|(language, hints)| {
            let hints: Vec<String> = hints.iter().map(|h| h.to_string()).collect();
            (language, hints)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_language_order() {
        let patterns = default_language_patterns();
        let languages: Vec<_> = patterns.iter().map(|(lang, _)| lang).collect();
        assert_eq!(languages, ["cpp", "java", "starlark", "python", "bash", "go"]);
    }

    #[test]
    fn default_sections_route_to_categories() {
        let config = default_config();
        assert_eq!(config.section("tutorials").unwrap().category, "tutorials");
        assert_eq!(config.section("concepts").unwrap().category, "docs");
        assert!(config.section("how-to-guides").is_none());
    }
}
