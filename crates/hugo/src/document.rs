//! Per-document conversion: split, map, rewrite, assemble.

use std::borrow::Cow;

use docport_core::{
    BodyPipeline, ConversionWarning, Diagnostics, FrontmatterError, TransformContext,
    first_level_heading, split_frontmatter,
};
use serde_yaml::{Mapping, Value};

use crate::assemble::assemble_document;
use crate::config::ConverterConfig;
use crate::frontmatter::{FieldMapper, MappingContext};
use crate::sanitize::Sanitizer;
use crate::transform::{FenceAnnotator, LinkRewriter, TreeFixer, cleanup_devsite};

/// A source document split into frontmatter and body.
#[derive(Debug)]
pub struct Document<'a> {
    /// Source-relative path with `/` separators.
    pub path: &'a str,
    /// Unmodified file contents.
    pub raw: &'a str,
    /// Parsed frontmatter, empty when absent.
    pub frontmatter: Mapping,
    /// Everything after the frontmatter block.
    pub body: &'a str,
    /// Why a leading `---` block was ignored.
    pub fallback: Option<FrontmatterError>,
}

impl<'a> Document<'a> {
    /// Splits `raw`; never fails.
    pub fn parse(path: &'a str, raw: &'a str) -> Self {
        let split = split_frontmatter(raw);
        Self {
            path,
            raw,
            frontmatter: split.mapping,
            body: split.body,
            fallback: split.fallback,
        }
    }
}

/// Output of [`convert_document`].
#[derive(Debug)]
pub struct ConvertedDocument {
    /// Hugo file contents.
    pub text: String,
    /// The frontmatter written to `text`.
    pub frontmatter: Mapping,
    /// Warnings raised while converting.
    pub diagnostics: Diagnostics,
}

fn trim_leading_newlines(input: &str) -> Cow<'_, str> {
    Cow::Borrowed(input.trim_start_matches(['\n', '\r']))
}

/// Converts documents with one shared configuration.
///
/// Holds no per-document state, so one converter can serve many threads.
pub struct DocumentConverter<'c> {
    config: &'c ConverterConfig,
    body: BodyPipeline,
}

impl<'c> DocumentConverter<'c> {
    /// Builds the body pipeline for `config`.
    pub fn new(config: &'c ConverterConfig) -> Self {
        let body = BodyPipeline::new()
            .with(cleanup_devsite)
            .with(Sanitizer::from_config(config))
            .with(LinkRewriter::new(config.source_extension.clone()))
            .with(TreeFixer)
            .with(FenceAnnotator::from_config(config))
            .with(trim_leading_newlines);
        Self { config, body }
    }

    /// The configuration this converter was built from.
    pub fn config(&self) -> &'c ConverterConfig {
        self.config
    }

    /// Converts one document located at `rel_path` under the source root.
    pub fn convert(&self, raw: &str, rel_path: &str) -> ConvertedDocument {
        let doc = Document::parse(rel_path, raw);
        let heading = first_level_heading(doc.body);
        let frontmatter = FieldMapper::new(self.config).map(
            &doc.frontmatter,
            heading,
            &MappingContext::new(rel_path),
        );

        let title = frontmatter.get("title").and_then(Value::as_str);
        let mut cx = TransformContext::new(Some(rel_path), title);
        if let Some(reason) = &doc.fallback {
            cx.warn(ConversionWarning::MalformedFrontmatter {
                reason: reason.to_string(),
            });
        }
        let body = self.body.run(doc.body, &mut cx);
        let diagnostics = cx.diagnostics;

        for warning in &diagnostics.warnings {
            match warning {
                ConversionWarning::MalformedFrontmatter { .. } => {
                    log::warn!("{rel_path}: {warning}")
                }
                _ => log::warn!("{warning}"),
            }
        }

        ConvertedDocument {
            text: assemble_document(&frontmatter, &body),
            frontmatter,
            diagnostics,
        }
    }
}

/// Converts a single Devsite document into a Hugo document.
///
/// ```
/// use docport_hugo::{ConverterConfig, convert_document};
///
/// let raw = "---\ntitle: Setup\n---\n# Setup\nSee [here](./other.md).\n";
/// let converted = convert_document(raw, "setup.md", &ConverterConfig::default());
/// assert!(converted.text.starts_with("---\nlinkTitle: Setup\n"));
/// assert!(converted.text.ends_with("See [here](/other/)."));
/// ```
pub fn convert_document(raw: &str, rel_path: &str, config: &ConverterConfig) -> ConvertedDocument {
    DocumentConverter::new(config).convert(raw, rel_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(raw: &str) -> ConvertedDocument {
        convert_document(raw, "docs/setup.md", &ConverterConfig::default())
    }

    #[test]
    fn setup_scenario() {
        let raw = "---\ntitle: Setup\n---\n# Setup\nSee [here](./other.md) and <https://example.com>.\n";
        insta::assert_snapshot!(convert(raw).text, @r"
        ---
        linkTitle: Setup
        title: Setup
        weight: 1
        ---

        See [here](/other/) and [https://example.com](https://example.com).
        ");
    }

    #[test]
    fn title_comes_from_heading() {
        let converted = convert("# Install Bazel\n\nText.");
        assert_eq!(
            converted.frontmatter.get("title"),
            Some(&Value::from("Install Bazel"))
        );
        assert_eq!(
            converted.text,
            "---\nlinkTitle: Install Bazel\ntitle: Install Bazel\nweight: 1\n---\n\nText."
        );
    }

    #[test]
    fn malformed_frontmatter_is_reported() {
        let converted = convert("---\ntitle: [oops\n---\nBody");
        assert_eq!(converted.diagnostics.count(), 1);
        assert!(matches!(
            converted.diagnostics.warnings[0],
            ConversionWarning::MalformedFrontmatter { .. }
        ));
    }

    #[test]
    fn duplicate_heading_ids_in_document() {
        let converted = convert("## Setup {#setup}\n\n## Setup {#setup}\n");
        assert!(converted.text.ends_with("## Setup {#setup}\n\n## Setup {#setup-2}"));
    }

    #[test]
    fn include_header_is_guarded_and_labeled() {
        let converted = convert("Example:\n\n```\n#include <vector>\n```\n");
        assert!(converted.text.ends_with("Example:\n\n```cpp\n#include &lt;vector&gt;\n```"));
    }

    #[test]
    fn unclosed_fence_is_reported_with_path() {
        let converted = convert("Run:\n\n```\nbazel build //...\n");
        assert_eq!(
            converted.diagnostics.warnings[0].to_string(),
            "Unclosed code fence (`) at docs/setup.md:3"
        );
        assert!(converted.text.ends_with("```bash\nbazel build //...\n```"));
    }

    #[test]
    fn fenced_comment_survives_in_protected_blocks() {
        let config = ConverterConfig {
            skip_fenced_blocks: true,
            ..ConverterConfig::default()
        };
        let raw = "---\ntitle: Install\n---\nRun:\n\n```bash\n# fetch deps\nbazel fetch //...\n```\n";
        let converted = convert_document(raw, "docs/install.md", &config);
        assert!(
            converted
                .text
                .ends_with("Run:\n\n```bash\n# fetch deps\nbazel fetch //...\n```")
        );
    }

    #[test]
    fn fenced_comment_is_not_the_title() {
        let converted = convert("Intro text\n\n```bash\n# fetch deps\nbazel fetch //...\n```\n");
        assert!(converted.frontmatter.get("title").is_none());
        assert!(converted.frontmatter.get("linkTitle").is_none());
        assert!(converted.text.contains("```bash\n# fetch deps\n"));
    }

    #[test]
    fn converting_output_again_keeps_body() {
        let raw = "---\ntitle: Build\n---\nIntro <b> {x}\n\n```\ndef f():\n    pass\n```\n\n[a](../x/y.md)";
        let once = convert(raw).text;
        let twice = convert(&once).text;
        assert_eq!(twice, once);
    }
}
