//! Rewrites relative Markdown links to Hugo page URLs.

use std::borrow::Cow;

use docport_core::{TextTransform, TransformContext};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static MARKDOWN_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid markdown link regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

const EXTERNAL_SCHEMES: [&str; 5] = ["http://", "https://", "mailto:", "tel:", "ftp://"];

/// `[text](dir/page.md#frag)` becomes `[text](/dir/page/#frag)`.
#[derive(Debug, Clone)]
pub struct LinkRewriter {
    source_extension: String,
}

impl LinkRewriter {
    /// Rewriter for documents whose files end in `.{source_extension}`.
    pub fn new(source_extension: impl Into<String>) -> Self {
        Self {
            source_extension: source_extension.into(),
        }
    }

    /// Rewrites every inline link in `body`.
    pub fn rewrite<'a>(&self, body: &'a str) -> Cow<'a, str> {
        MARKDOWN_LINK.replace_all(body, |caps: &Captures<'_>| {
            let whole = &caps[0];
            match self.rewrite_target(&caps[2]) {
                Some(target) => format!("[{}]({})", &caps[1], target),
                None => whole.to_string(),
            }
        })
    }

    fn rewrite_target(&self, url: &str) -> Option<String> {
        let url = url.trim();
        if url.starts_with('#') || EXTERNAL_SCHEMES.iter().any(|s| url.starts_with(s)) {
            return None;
        }
        let url = WHITESPACE.replace_all(url, "");
        let (path, fragment) = match url.find('#') {
            Some(idx) => url.split_at(idx),
            None => (url.as_ref(), ""),
        };

        let suffix = format!(".{}", self.source_extension);
        let page = if let Some(stem) = path.strip_suffix(suffix.as_str()) {
            stem
        } else if is_directory_link(path) {
            path.trim_end_matches('/')
        } else {
            return None;
        };
        Some(format!("/{}/{}", strip_relative_prefix(page), fragment))
    }
}

impl Default for LinkRewriter {
    fn default() -> Self {
        Self::new("md")
    }
}

impl TextTransform for LinkRewriter {
    fn transform<'a>(&self, input: &'a str, _cx: &mut TransformContext<'_>) -> Cow<'a, str> {
        self.rewrite(input)
    }
}

fn is_directory_link(path: &str) -> bool {
    if !path.contains('/') {
        return false;
    }
    let last = path.trim_end_matches('/').rsplit('/').next().unwrap_or("");
    !last.contains('.')
}

fn strip_relative_prefix(mut path: &str) -> &str {
    loop {
        if let Some(rest) = path.strip_prefix("./") {
            path = rest;
        } else if let Some(rest) = path.strip_prefix("../") {
            path = rest;
        } else if let Some(rest) = path.strip_prefix('/') {
            path = rest;
        } else {
            return path;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewrite(body: &str) -> String {
        LinkRewriter::default().rewrite(body).into_owned()
    }

    #[test]
    fn parent_relative_markdown_link() {
        assert_eq!(rewrite("[Guide](../foo/bar.md)"), "[Guide](/foo/bar/)");
    }

    #[test]
    fn keeps_fragment_after_slash() {
        assert_eq!(rewrite("[Opts](./run/options.md#flags)"), "[Opts](/run/options/#flags)");
    }

    #[test]
    fn directory_links_get_trailing_slash() {
        assert_eq!(rewrite("[Docs](./concepts/build)"), "[Docs](/concepts/build/)");
        assert_eq!(rewrite("[Docs](concepts/build/)"), "[Docs](/concepts/build/)");
    }

    #[test]
    fn external_and_anchor_links_are_untouched() {
        let body = "[a](https://x.dev/p.md) [b](#top) [c](mailto:me@x.dev) [d](tel:123)";
        assert_eq!(rewrite(body), body);
    }

    #[test]
    fn other_files_are_untouched() {
        assert_eq!(rewrite("[img](images/logo.png)"), "[img](images/logo.png)");
        assert_eq!(rewrite("[page](page)"), "[page](page)");
    }

    #[test]
    fn collapses_whitespace_in_target() {
        assert_eq!(rewrite("[x](../a/ b.md)"), "[x](/a/b/)");
    }

    #[test]
    fn folds_multi_line_targets() {
        assert_eq!(rewrite("[x](../foo/\nbar.md)"), "[x](/foo/bar/)");
        assert_eq!(
            rewrite("See [the rules](\n  ../rules/\n  lang.md#attrs) first."),
            "See [the rules](/rules/lang/#attrs) first."
        );
    }

    #[test]
    fn custom_source_extension() {
        let rewriter = LinkRewriter::new("markdown");
        assert_eq!(rewriter.rewrite("[x](y/z.markdown)"), "[x](/y/z/)");
        assert_eq!(rewriter.rewrite("[x](y/z.md)"), "[x](y/z.md)");
    }

    #[test]
    fn rewriting_is_idempotent() {
        let once = rewrite("[Guide](../foo/bar.md) [s](sub/dir)");
        assert_eq!(rewrite(&once), once);
    }
}
