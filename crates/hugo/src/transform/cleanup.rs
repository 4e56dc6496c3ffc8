//! Removal of Devsite-only directives that have no Hugo counterpart.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

static TOC_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[TOC\]").expect("valid toc regex"));
static ANCHOR_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\{:\s*#[^}]+\s*\}").expect("valid anchor attribute regex"));
static CLASS_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\{:\s*\.[^}]+\s*\}").expect("valid class attribute regex"));
static INCLUDE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{%\s*include\s+[^%]+%\}").expect("valid include tag regex"));
static MATHJAX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<devsite-mathjax[^>]*>.*?</devsite-mathjax>").expect("valid mathjax regex")
});
static PROJECT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^Project:[ \t]*.*$").expect("valid project line regex"));
static BOOK_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^Book:[ \t]*.*$").expect("valid book line regex"));
static BLANK_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n\s*\n").expect("valid blank run regex"));

/// Strips `[TOC]`, `{: ...}` attribute lists, `{% include %}`, MathJax
/// blocks and `Project:`/`Book:` lines, then collapses blank runs.
///
/// ```
/// use docport_hugo::transform::cleanup::cleanup_devsite;
///
/// let out = cleanup_devsite("Project: /x/_project.yaml\n[TOC]\n\n\n## Intro {: #intro }\nText");
/// assert_eq!(out, "## Intro\nText");
/// ```
pub fn cleanup_devsite(body: &str) -> Cow<'_, str> {
    let mut text = Cow::Borrowed(body);
    for (re, replacement) in [
        (&*TOC_MARKER, ""),
        (&*ANCHOR_ATTR, ""),
        (&*CLASS_ATTR, ""),
        (&*INCLUDE_TAG, ""),
        (&*MATHJAX, ""),
        (&*PROJECT_LINE, ""),
        (&*BOOK_LINE, ""),
        (&*BLANK_RUN, "\n\n"),
    ] {
        let replaced = match re.replace_all(&text, replacement) {
            Cow::Owned(replaced) => Some(replaced),
            Cow::Borrowed(_) => None,
        };
        if let Some(replaced) = replaced {
            text = Cow::Owned(replaced);
        }
    }
    match text {
        Cow::Borrowed(text) => Cow::Borrowed(text.trim()),
        Cow::Owned(text) => Cow::Owned(text.trim().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_mathjax_across_lines() {
        let body = "before\n<devsite-mathjax config=\"x\">\n$$a$$\n</devsite-mathjax>\nafter";
        assert_eq!(cleanup_devsite(body), "before\n\nafter");
    }

    #[test]
    fn removes_attribute_lists_and_includes() {
        let body = "Para {:.external}\n{% include \"_shared/note.html\" %}\nEnd";
        assert_eq!(cleanup_devsite(body), "Para\n\nEnd");
    }

    #[test]
    fn collapses_blank_runs() {
        assert_eq!(cleanup_devsite("\n\na\n\n\n\n\nb\n \n\t\nc\n"), "a\n\nb\n\nc");
    }

    #[test]
    fn clean_input_is_borrowed() {
        assert!(matches!(cleanup_devsite("plain\n\ntext"), Cow::Borrowed(_)));
    }

    #[test]
    fn keeps_heading_ids() {
        assert_eq!(cleanup_devsite("## Setup {#setup}"), "## Setup {#setup}");
    }
}
