//! Devsite frontmatter to Hugo frontmatter.

use serde_yaml::{Mapping, Value};

use crate::config::{ConverterConfig, MapperStrategy};

/// File names Hugo treats as a section's own page.
const SECTION_INDEX_FILES: [&str; 2] = ["_index.md", "index.md"];

/// Where the document being mapped lives.
#[derive(Debug, Clone, Copy)]
pub struct MappingContext<'a> {
    /// Source-relative path with `/` separators.
    pub path: &'a str,
}

impl<'a> MappingContext<'a> {
    /// Context for the document at `path`.
    pub fn new(path: &'a str) -> Self {
        Self { path }
    }

    /// First path segment, when the document is inside a section directory.
    pub fn section(&self) -> Option<&'a str> {
        let (section, _) = self.path.split_once('/')?;
        Some(section)
    }

    fn is_section_index(&self) -> bool {
        let file_name = self.path.rsplit('/').next().unwrap_or(self.path);
        SECTION_INDEX_FILES.contains(&file_name)
    }
}

/// Builds Hugo frontmatter from the configured allow-list.
#[derive(Debug, Clone, Copy)]
pub struct FieldMapper<'c> {
    config: &'c ConverterConfig,
}

impl<'c> FieldMapper<'c> {
    /// Mapper driven by `config.field_mapping` and `config.frontmatter`.
    pub fn new(config: &'c ConverterConfig) -> Self {
        Self { config }
    }

    /// Maps `source`, taking the title from `heading` when none is mapped.
    ///
    /// ```
    /// use docport_hugo::config::ConverterConfig;
    /// use docport_hugo::frontmatter::{FieldMapper, MappingContext};
    ///
    /// let config = ConverterConfig::default();
    /// let source: serde_yaml::Mapping = serde_yaml::from_str("book_path: /x/_book.yaml\nfoo: 1").unwrap();
    /// let mapped = FieldMapper::new(&config).map(&source, Some("Intro"), &MappingContext::new("a.md"));
    /// assert_eq!(mapped.get("title").and_then(|v| v.as_str()), Some("Intro"));
    /// assert_eq!(mapped.get("linkTitle").and_then(|v| v.as_str()), Some("Intro"));
    /// assert!(mapped.get("foo").is_none());
    /// ```
    pub fn map(&self, source: &Mapping, heading: Option<&str>, cx: &MappingContext<'_>) -> Mapping {
        let mut out = Mapping::new();
        for (from, to) in self.config.field_mapping.iter() {
            if let Some(value) = source.get(from) {
                out.insert(Value::from(to.as_str()), value.clone());
            }
        }

        if !out.contains_key("title")
            && let Some(heading) = heading
        {
            out.insert(Value::from("title"), Value::from(heading));
        }

        if !out.contains_key("weight") {
            let weight = source
                .get("weight")
                .cloned()
                .unwrap_or_else(|| Value::from(self.default_weight(cx)));
            out.insert(Value::from("weight"), weight);
        }

        if !out.contains_key("linkTitle")
            && let Some(title) = out.get("title").cloned()
        {
            out.insert(Value::from("linkTitle"), title);
        }

        if self.config.frontmatter.strategy == MapperStrategy::Sectioned {
            let literals = [
                ("type", &self.config.frontmatter.default_type),
                ("date", &self.config.frontmatter.default_date),
            ];
            for (key, literal) in literals {
                if let Some(literal) = literal
                    && !out.contains_key(key)
                {
                    out.insert(Value::from(key), Value::from(literal.as_str()));
                }
            }
        }

        out
    }

    fn default_weight(&self, cx: &MappingContext<'_>) -> i64 {
        let options = &self.config.frontmatter;
        if options.strategy == MapperStrategy::Sectioned && cx.is_section_index() {
            let section = cx.section().and_then(|name| self.config.section(name));
            if let Some(section) = section {
                return section.weight;
            }
        }
        options.default_weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FrontmatterOptions;

    fn yaml(text: &str) -> Mapping {
        serde_yaml::from_str(text).unwrap()
    }

    fn sectioned() -> ConverterConfig {
        ConverterConfig {
            frontmatter: FrontmatterOptions {
                strategy: MapperStrategy::Sectioned,
                default_type: Some("docs".to_string()),
                default_date: Some("2024-01-01".to_string()),
                ..FrontmatterOptions::default()
            },
            ..ConverterConfig::default()
        }
    }

    #[test]
    fn copies_mapped_keys_in_table_order() {
        let config = ConverterConfig::default();
        let source = yaml("toc: true\ndescription: d\ntitle: T\nextra: x\n");
        let mapped = FieldMapper::new(&config).map(&source, None, &MappingContext::new("a.md"));
        let keys: Vec<_> = mapped.keys().filter_map(Value::as_str).collect();
        assert_eq!(keys, ["title", "description", "toc", "weight", "linkTitle"]);
    }

    #[test]
    fn mapped_title_wins_over_heading() {
        let config = ConverterConfig::default();
        let mapped = FieldMapper::new(&config).map(
            &yaml("title: Real\n"),
            Some("Heading"),
            &MappingContext::new("a.md"),
        );
        assert_eq!(mapped.get("title"), Some(&Value::from("Real")));
        assert_eq!(mapped.get("linkTitle"), Some(&Value::from("Real")));
    }

    #[test]
    fn source_weight_is_kept() {
        let config = ConverterConfig::default();
        let mapped =
            FieldMapper::new(&config).map(&yaml("weight: 7\n"), None, &MappingContext::new("a.md"));
        assert_eq!(mapped.get("weight"), Some(&Value::from(7)));
        assert!(mapped.get("linkTitle").is_none());
    }

    #[test]
    fn simple_strategy_defaults_weight_to_one() {
        let config = ConverterConfig::default();
        let mapped = FieldMapper::new(&config).map(
            &Mapping::new(),
            None,
            &MappingContext::new("concepts/_index.md"),
        );
        assert_eq!(mapped.get("weight"), Some(&Value::from(1)));
        assert!(mapped.get("type").is_none());
    }

    #[test]
    fn sectioned_strategy_uses_section_weight_for_index() {
        let config = sectioned();
        let mapper = FieldMapper::new(&config);
        let index = mapper.map(&Mapping::new(), None, &MappingContext::new("concepts/_index.md"));
        assert_eq!(index.get("weight"), Some(&Value::from(30)));
        assert_eq!(index.get("type"), Some(&Value::from("docs")));
        assert_eq!(index.get("date"), Some(&Value::from("2024-01-01")));

        let page = mapper.map(&Mapping::new(), None, &MappingContext::new("concepts/build.md"));
        assert_eq!(page.get("weight"), Some(&Value::from(1)));
    }

    #[test]
    fn sectioned_literals_do_not_override() {
        let config = ConverterConfig {
            field_mapping: [("type", "type".to_string())].into_iter().collect(),
            ..sectioned()
        };
        let mapped = FieldMapper::new(&config).map(
            &yaml("type: blog\n"),
            None,
            &MappingContext::new("a.md"),
        );
        assert_eq!(mapped.get("type"), Some(&Value::from("blog")));
    }

    #[test]
    fn context_section() {
        assert_eq!(MappingContext::new("tutorials/cpp.md").section(), Some("tutorials"));
        assert_eq!(MappingContext::new("help.md").section(), None);
        assert!(MappingContext::new("index.md").is_section_index());
    }
}
