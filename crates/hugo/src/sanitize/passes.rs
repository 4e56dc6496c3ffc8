use docport_core::extract_custom_id;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::{LinePass, SanitizeContext, replace_all, replace_unescaped};
use crate::config::{ConverterConfig, HeadingPolicy};

static FIRST_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#\s+.+").expect("valid first heading regex"));
static TEMPLATE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{%.*?%\}").expect("valid template tag regex"));
static TEMPLATE_VAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{.*?\}\}").expect("valid template variable regex"));
static LINK_JUNK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\]\(([^)>]+)>[^\]]*\]\(").expect("valid link junk regex"));
static LINK_TARGET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\]\(([^)]+)\)").expect("valid link target regex"));
static MALFORMED_TAGS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (
            r">\\<code\\>([^<]+)\\</code\\>\\</a\\>,\s*<a\s+href=",
            ">`${1}()`</a>, <a href=",
        ),
        (r">\\<code\\>", ">`<code>"),
        (r"\\</code\\>\\</a\\>", "</code>`</a>"),
        (r#"href=\)/[^"\s)]+"#, r##"href="#""##),
        (r"<a\s+href=\)", r##"<a href="#">"##),
        (r"href=\s*\)", r##"href="#">"##),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
        (
            Regex::new(pattern).expect("valid malformed tag regex"),
            replacement,
        )
    })
    .collect()
});
static HEADING_ID_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(#+.*?)(\s*\{#[A-Za-z0-9_-]+\})(\s*)$").expect("valid heading id suffix regex")
});
static COLON_BRACES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^}]*?:[^}]*)\}").expect("valid colon brace regex"));
static HTML_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([^)]+?)\.html(#[^)]*)?\)").expect("valid html link regex"));
static HTML_HREF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"href="([^"]+)\.html""#).expect("valid html href regex"));
static AUTOLINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<(https?://[^>]+)>").expect("valid autolink regex"));
static INCLUDE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#include\s+<([^>]+)>").expect("valid include regex"));
static BARE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<([^ >]+)>").expect("valid bare tag regex"));
static ABSOLUTE_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(/([^)]+)\)").expect("valid absolute link regex"));
static ABSOLUTE_HREF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"href="/([^"]+)""#).expect("valid absolute href regex"));
static STYLE_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"style="[^"]*""#).expect("valid style attribute regex"));
static SECTION_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"id="section-([A-Za-z0-9_-]+)""#).expect("valid section id regex")
});
static CLOSING_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</code>").expect("valid closing code regex"));
static CODE_AFTER_ANCHOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\)><code>([^<]+)</code>").expect("valid code after anchor regex")
});
static ADJACENT_ANCHORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</a>,\s*<a href=").expect("valid adjacent anchors regex"));

/// The fourteen standard passes in execution order.
pub fn standard(config: &ConverterConfig) -> Vec<Box<dyn LinePass>> {
    vec![
        Box::new(FirstHeading {
            policy: config.heading_policy,
        }),
        Box::new(TemplateDirectives),
        Box::new(LinkRepair),
        Box::new(MalformedTags),
        Box::new(BraceEscape),
        Box::new(LinkTargets {
            extension: config.content_extension.clone(),
        }),
        Box::new(SymbolGuard),
        Box::new(GenericTags),
        Box::new(AbsoluteLinks),
        Box::new(PresentationAttributes),
        Box::new(CustomTags::new(&config.custom_tags)),
        Box::new(ClosingCode),
        Box::new(AnchorAdjacency),
        Box::new(HeadingIds),
    ]
}

fn backtick_count(line: &str) -> usize {
    line.bytes().filter(|b| *b == b'`').count()
}

/// Drops the first `# Heading`; Hugo renders the title from frontmatter.
#[derive(Debug, Clone, Copy)]
pub struct FirstHeading {
    /// Which heading qualifies.
    pub policy: HeadingPolicy,
}

impl LinePass for FirstHeading {
    fn name(&self) -> &'static str {
        "first-heading"
    }

    fn apply(&self, line: String, cx: &mut SanitizeContext<'_>) -> Option<String> {
        if cx.in_fence || !cx.heading_armed || !FIRST_HEADING.is_match(&line) {
            return Some(line);
        }
        cx.heading_armed = false;
        match self.policy {
            HeadingPolicy::Always => None,
            HeadingPolicy::MatchingTitle => {
                let text = line[1..].trim().to_lowercase();
                match cx.title {
                    Some(title) if title.trim().to_lowercase() == text => None,
                    _ => Some(line),
                }
            }
        }
    }
}

/// Removes same-line `{% ... %}` and `{{ ... }}` template directives.
#[derive(Debug, Clone, Copy)]
pub struct TemplateDirectives;

impl LinePass for TemplateDirectives {
    fn name(&self) -> &'static str {
        "template-directives"
    }

    fn apply(&self, line: String, _cx: &mut SanitizeContext<'_>) -> Option<String> {
        let line = replace_all(&TEMPLATE_TAG, line, "");
        Some(replace_all(&TEMPLATE_VAR, line, ""))
    }
}

/// Repairs link targets that swallowed HTML from the generator.
#[derive(Debug, Clone, Copy)]
pub struct LinkRepair;

impl LinePass for LinkRepair {
    fn name(&self) -> &'static str {
        "link-repair"
    }

    fn apply(&self, line: String, _cx: &mut SanitizeContext<'_>) -> Option<String> {
        let line = replace_all(&LINK_JUNK, line, "](${1}](");
        Some(replace_all(&LINK_TARGET, line, |caps: &Captures<'_>| {
            let url = &caps[1];
            let url = match url.find('>') {
                Some(end) if url.contains('<') => &url[..end],
                _ => url,
            };
            format!("]({})", escape_angles(url))
        }))
    }
}

fn escape_angles(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev = None;
    for ch in text.chars() {
        if matches!(ch, '<' | '>') && prev != Some('\\') {
            out.push('\\');
        }
        out.push(ch);
        prev = Some(ch);
    }
    out
}

/// Fixed table of known broken fragments from generated reference pages.
#[derive(Debug, Clone, Copy)]
pub struct MalformedTags;

impl LinePass for MalformedTags {
    fn name(&self) -> &'static str {
        "malformed-tags"
    }

    fn apply(&self, line: String, _cx: &mut SanitizeContext<'_>) -> Option<String> {
        Some(
            MALFORMED_TAGS
                .iter()
                .fold(line, |line, (re, replacement)| {
                    replace_all(re, line, *replacement)
                }),
        )
    }
}

/// Escapes curly braces, except a trailing `{#id}` on a heading.
#[derive(Debug, Clone, Copy)]
pub struct BraceEscape;

impl LinePass for BraceEscape {
    fn name(&self) -> &'static str {
        "brace-escape"
    }

    fn apply(&self, line: String, _cx: &mut SanitizeContext<'_>) -> Option<String> {
        if !line.contains(['{', '}']) {
            return Some(line);
        }
        if let Some(caps) = HEADING_ID_SUFFIX.captures(&line) {
            return Some(format!(
                "{}{}{}",
                escape_braces(caps[1].to_string()),
                &caps[2],
                &caps[3]
            ));
        }
        Some(escape_braces(line))
    }
}

fn escape_braces(text: String) -> String {
    let text = replace_unescaped(&COLON_BRACES, text, |caps| format!(r"\{{{}\}}", &caps[1]));
    let mut out = String::with_capacity(text.len() + 4);
    let mut prev = None;
    for ch in text.chars() {
        if matches!(ch, '{' | '}') && prev != Some('\\') {
            out.push('\\');
        }
        out.push(ch);
        prev = Some(ch);
    }
    out
}

/// Points `.html` link targets at the content extension and turns
/// `<https://...>` autolinks into explicit links.
#[derive(Debug, Clone)]
pub struct LinkTargets {
    /// Extension without the dot.
    pub extension: String,
}

impl LinePass for LinkTargets {
    fn name(&self) -> &'static str {
        "link-targets"
    }

    fn apply(&self, line: String, _cx: &mut SanitizeContext<'_>) -> Option<String> {
        let ext = self.extension.as_str();
        let line = replace_all(&HTML_LINK, line, |caps: &Captures<'_>| {
            let fragment = caps.get(2).map_or("", |m| m.as_str());
            format!("({}.{}{})", &caps[1], ext, fragment)
        });
        let line = replace_all(&HTML_HREF, line, |caps: &Captures<'_>| {
            format!("href=\"{}.{}\"", &caps[1], ext)
        });
        Some(replace_all(&AUTOLINK, line, "[${1}](${1})"))
    }
}

/// Entity-escapes comparison operators and `#include <header>`.
#[derive(Debug, Clone, Copy)]
pub struct SymbolGuard;

impl LinePass for SymbolGuard {
    fn name(&self) -> &'static str {
        "symbol-guard"
    }

    fn apply(&self, line: String, _cx: &mut SanitizeContext<'_>) -> Option<String> {
        let line = if line.contains("<=") || line.contains(">=") {
            line.replace("<=", "&lt;=").replace(">=", "&gt;=")
        } else {
            line
        };
        Some(replace_all(&INCLUDE, line, "#include &lt;${1}&gt;"))
    }
}

/// Escapes `<token>` outside inline code; an even backtick count means the
/// tag sits inside a code span.
///
/// The count is a line-local approximation: a line with unpaired literal
/// backticks (or plain text sitting between two code spans) is misjudged.
#[derive(Debug, Clone, Copy)]
pub struct GenericTags;

impl LinePass for GenericTags {
    fn name(&self) -> &'static str {
        "generic-tags"
    }

    fn apply(&self, line: String, _cx: &mut SanitizeContext<'_>) -> Option<String> {
        let ticks = backtick_count(&line);
        if ticks > 0 && ticks % 2 == 0 {
            return Some(line);
        }
        Some(replace_unescaped(&BARE_TAG, line, |caps| {
            format!(r"\<{}\>", &caps[1])
        }))
    }
}

/// Makes site-absolute link targets relative.
#[derive(Debug, Clone, Copy)]
pub struct AbsoluteLinks;

impl LinePass for AbsoluteLinks {
    fn name(&self) -> &'static str {
        "absolute-links"
    }

    fn apply(&self, line: String, _cx: &mut SanitizeContext<'_>) -> Option<String> {
        let line = replace_all(&ABSOLUTE_LINK, line, "[${1}](./${2})");
        Some(replace_all(&ABSOLUTE_HREF, line, "href=\"./${1}\""))
    }
}

/// Drops inline styles and the `section-` prefix of generated ids.
#[derive(Debug, Clone, Copy)]
pub struct PresentationAttributes;

impl LinePass for PresentationAttributes {
    fn name(&self) -> &'static str {
        "presentation-attributes"
    }

    fn apply(&self, line: String, _cx: &mut SanitizeContext<'_>) -> Option<String> {
        let line = replace_all(&STYLE_ATTR, line, "");
        Some(replace_all(&SECTION_ID, line, "id=\"${1}\""))
    }
}

/// Escapes configured vendor elements such as `<workspace>`.
#[derive(Debug, Clone)]
pub struct CustomTags {
    open: Option<Regex>,
    close: Option<Regex>,
}

impl CustomTags {
    /// Builds the open/close patterns for `names`.
    pub fn new(names: &[String]) -> Self {
        if names.is_empty() {
            return Self {
                open: None,
                close: None,
            };
        }
        let alternation = names
            .iter()
            .map(|name| regex::escape(name))
            .collect::<Vec<_>>()
            .join("|");
        let compile = |pattern: String| match Regex::new(&pattern) {
            Ok(re) => Some(re),
            Err(err) => {
                log::warn!("custom tag escaping disabled: {err}");
                None
            }
        };
        Self {
            open: compile(format!(r"<({alternation})(\s[^>]*)?>")),
            close: compile(format!(r"</({alternation})>")),
        }
    }
}

impl LinePass for CustomTags {
    fn name(&self) -> &'static str {
        "custom-tags"
    }

    fn apply(&self, line: String, _cx: &mut SanitizeContext<'_>) -> Option<String> {
        let mut line = line;
        if let Some(open) = &self.open {
            line = replace_unescaped(open, line, |caps| {
                let attrs = caps.get(2).map_or("", |m| m.as_str());
                format!(r"\<{}{}\>", &caps[1], attrs)
            });
        }
        if let Some(close) = &self.close {
            line = replace_unescaped(close, line, |caps| format!(r"\</{}\>", &caps[1]));
        }
        Some(line)
    }
}

/// Escapes `</code>` unless the line has an odd number of backticks.
///
/// Shares the backtick approximation of [`GenericTags`].
#[derive(Debug, Clone, Copy)]
pub struct ClosingCode;

impl LinePass for ClosingCode {
    fn name(&self) -> &'static str {
        "closing-code"
    }

    fn apply(&self, line: String, _cx: &mut SanitizeContext<'_>) -> Option<String> {
        if backtick_count(&line) % 2 == 1 {
            return Some(line);
        }
        Some(replace_unescaped(&CLOSING_CODE, line, |_| {
            r"\</code>".to_string()
        }))
    }
}

/// Separates anchors glued to code elements or to each other.
#[derive(Debug, Clone, Copy)]
pub struct AnchorAdjacency;

impl LinePass for AnchorAdjacency {
    fn name(&self) -> &'static str {
        "anchor-adjacency"
    }

    fn apply(&self, line: String, _cx: &mut SanitizeContext<'_>) -> Option<String> {
        let line = replace_all(&CODE_AFTER_ANCHOR, line, ") `<code>${1}</code>`");
        Some(replace_all(&ADJACENT_ANCHORS, line, r"\</a\>, \<a href="))
    }
}

/// Renames repeated `{#id}` heading anchors to `{#id-N}`.
#[derive(Debug, Clone, Copy)]
pub struct HeadingIds;

impl LinePass for HeadingIds {
    fn name(&self) -> &'static str {
        "heading-ids"
    }

    fn apply(&self, line: String, cx: &mut SanitizeContext<'_>) -> Option<String> {
        if cx.in_fence {
            return Some(line);
        }
        let hashes = line.len() - line.trim_start_matches('#').len();
        if hashes == 0 {
            return Some(line);
        }
        let (text, Some(id)) = extract_custom_id(&line[hashes..]) else {
            return Some(line);
        };
        let resolved = cx.registry.register(id);
        if resolved == id {
            return Some(line);
        }
        Some(format!("{} {} {{#{}}}", &line[..hashes], text.trim(), resolved))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(pass: &dyn LinePass, line: &str) -> Option<String> {
        let mut cx = SanitizeContext::new(None);
        pass.apply(line.to_string(), &mut cx)
    }

    #[test]
    fn malformed_code_anchor_list() {
        let line = r#"See >\<code\>foo\</code\>\</a\>, <a href="bar">"#;
        assert_eq!(
            run(&MalformedTags, line).unwrap(),
            r#"See >`foo()`</a>, <a href="bar">"#
        );
    }

    #[test]
    fn malformed_code_open_and_close() {
        assert_eq!(
            run(&MalformedTags, r">\<code\>x\</code\>\</a\>").unwrap(),
            ">`<code>x</code>`</a>"
        );
    }

    #[test]
    fn brace_escape_is_idempotent() {
        let once = run(&BraceEscape, "a {b} c").unwrap();
        assert_eq!(once, r"a \{b\} c");
        assert_eq!(run(&BraceEscape, &once).unwrap(), once);
    }

    #[test]
    fn escaped_tags_are_not_escaped_again() {
        assert_eq!(run(&GenericTags, r"\<t\>").unwrap(), r"\<t\>");
        assert_eq!(run(&GenericTags, "a `b` <t>").unwrap(), "a `b` <t>");
        assert_eq!(run(&GenericTags, "a `b <t>").unwrap(), r"a `b \<t\>");
    }

    #[test]
    fn closing_code_respects_odd_backticks() {
        assert_eq!(run(&ClosingCode, "x</code>").unwrap(), r"x\</code>");
        assert_eq!(run(&ClosingCode, "`x</code>").unwrap(), "`x</code>");
    }

    #[test]
    fn anchor_adjacency() {
        assert_eq!(
            run(&AnchorAdjacency, "[a](b)><code>c</code>").unwrap(),
            "[a](b) `<code>c</code>`"
        );
        assert_eq!(
            run(&AnchorAdjacency, r#"x</a>, <a href="y">"#).unwrap(),
            r#"x\</a\>, \<a href="y">"#
        );
    }

    #[test]
    fn custom_tags_without_names_do_nothing() {
        let pass = CustomTags::new(&[]);
        assert_eq!(run(&pass, "<workspace>").unwrap(), "<workspace>");
    }

    #[test]
    fn custom_tags_require_exact_names() {
        let pass = CustomTags::new(&["workspace".to_string()]);
        assert_eq!(run(&pass, "<workspaces x>").unwrap(), "<workspaces x>");
        assert_eq!(run(&pass, "<workspace>").unwrap(), r"\<workspace\>");
    }

    #[test]
    fn heading_ids_normalize_renamed_lines() {
        let mut cx = SanitizeContext::new(None);
        assert_eq!(
            HeadingIds.apply("# A {#a}".to_string(), &mut cx).unwrap(),
            "# A {#a}"
        );
        assert_eq!(
            HeadingIds.apply("## A  {#a} ".to_string(), &mut cx).unwrap(),
            "## A {#a-2}"
        );
        assert_eq!(cx.registry.occurrences("a"), 2);
    }

    #[test]
    fn heading_passes_ignore_fenced_lines() {
        let mut cx = SanitizeContext::new(None);
        cx.in_fence = true;
        let pass = FirstHeading {
            policy: HeadingPolicy::Always,
        };
        assert_eq!(pass.apply("# fetch deps".to_string(), &mut cx).unwrap(), "# fetch deps");
        assert!(cx.heading_armed);
        assert_eq!(
            HeadingIds.apply("## Setup {#setup}".to_string(), &mut cx).unwrap(),
            "## Setup {#setup}"
        );
        assert_eq!(cx.registry.occurrences("setup"), 0);
    }

    #[test]
    fn first_heading_disarms() {
        let pass = FirstHeading {
            policy: HeadingPolicy::Always,
        };
        let mut cx = SanitizeContext::new(None);
        assert_eq!(pass.apply("## Sub".to_string(), &mut cx).unwrap(), "## Sub");
        assert!(pass.apply("# Title".to_string(), &mut cx).is_none());
        assert_eq!(pass.apply("# Again".to_string(), &mut cx).unwrap(), "# Again");
    }
}
