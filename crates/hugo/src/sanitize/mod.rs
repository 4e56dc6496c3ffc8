//! Line-oriented markup sanitizer.
//!
//! Every body line is fed through an ordered list of [`LinePass`]es. Passes
//! share a per-document [`SanitizeContext`] carrying the heading-id registry,
//! the first-heading flag and the fence tracker. None of the passes parse
//! Markdown; they are regex rewrites that neutralize Devsite template syntax
//! and generated-HTML debris so the output is safe for Hugo.
//!
//! The inline-code checks in [`passes::GenericTags`] and [`passes::ClosingCode`]
//! count backticks per line. This is a heuristic and can be fooled by lines
//! mixing code spans with literal backticks.

use std::borrow::Cow;

use docport_core::{
    FenceState, HeadingIdRegistry, TextTransform, TransformContext, advance_fence_state,
};
use regex::{Captures, Regex, Replacer};

use crate::config::ConverterConfig;

/// The built-in line passes.
pub mod passes;

/// Mutable per-document state shared by the passes.
#[derive(Debug)]
pub struct SanitizeContext<'t> {
    /// Explicit heading ids seen so far.
    pub registry: HeadingIdRegistry,
    /// True until the first `# Heading` has been handled.
    pub heading_armed: bool,
    /// Fence state after the current line.
    pub fence: FenceState,
    /// Whether the current line opens, closes or sits inside a fence.
    pub in_fence: bool,
    /// Document title used by the matching-title heading policy.
    pub title: Option<&'t str>,
}

impl<'t> SanitizeContext<'t> {
    /// Fresh state for one document.
    pub fn new(title: Option<&'t str>) -> Self {
        Self {
            registry: HeadingIdRegistry::new(),
            heading_armed: true,
            fence: FenceState::default(),
            in_fence: false,
            title,
        }
    }
}

/// One rewrite applied to every line.
pub trait LinePass: Send + Sync {
    /// Short name used in debug logs.
    fn name(&self) -> &'static str;

    /// Rewrites `line`; returning `None` drops it from the output.
    fn apply(&self, line: String, cx: &mut SanitizeContext<'_>) -> Option<String>;

    /// Whether `skip_fenced_blocks` exempts fenced lines from this pass.
    fn skips_fenced_lines(&self) -> bool {
        true
    }
}

/// Ordered list of line passes.
pub struct Sanitizer {
    passes: Vec<Box<dyn LinePass>>,
    skip_fenced_blocks: bool,
}

impl Sanitizer {
    /// The standard fourteen passes configured from `config`.
    pub fn from_config(config: &ConverterConfig) -> Self {
        Self::with_passes(passes::standard(config), config.skip_fenced_blocks)
    }

    /// A sanitizer running exactly `passes`.
    pub fn with_passes(passes: Vec<Box<dyn LinePass>>, skip_fenced_blocks: bool) -> Self {
        Self {
            passes,
            skip_fenced_blocks,
        }
    }

    /// Pass names in execution order.
    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|pass| pass.name()).collect()
    }

    /// Sanitizes a document body; output lines are joined with `\n`.
    pub fn sanitize(&self, body: &str, title: Option<&str>) -> String {
        let mut cx = SanitizeContext::new(title);
        let mut out = Vec::new();
        for line in body.lines() {
            let outcome = advance_fence_state(line, cx.fence);
            cx.fence = outcome.next_state;
            cx.in_fence = outcome.in_fence;
            let fenced = self.skip_fenced_blocks && outcome.in_fence;

            let mut current = Some(line.to_string());
            for pass in &self.passes {
                let Some(text) = current.take() else {
                    break;
                };
                current = if fenced && pass.skips_fenced_lines() {
                    Some(text)
                } else {
                    pass.apply(text, &mut cx)
                };
                if current.is_none() {
                    log::debug!("{} dropped a line", pass.name());
                }
            }
            out.extend(current);
        }
        out.join("\n")
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::from_config(&ConverterConfig::default())
    }
}

impl TextTransform for Sanitizer {
    fn transform<'a>(&self, input: &'a str, cx: &mut TransformContext<'_>) -> Cow<'a, str> {
        Cow::Owned(self.sanitize(input, cx.title))
    }
}

/// `Regex::replace_all` that hands back the input when nothing matched.
pub(crate) fn replace_all<R: Replacer>(re: &Regex, line: String, rep: R) -> String {
    let replaced = match re.replace_all(&line, rep) {
        Cow::Owned(text) => Some(text),
        Cow::Borrowed(_) => None,
    };
    replaced.unwrap_or(line)
}

/// Like [`replace_all`], but matches directly preceded by `\` are kept as is.
pub(crate) fn replace_unescaped<F>(re: &Regex, line: String, mut rep: F) -> String
where
    F: FnMut(&Captures<'_>) -> String,
{
    let mut out = String::with_capacity(line.len());
    let mut last = 0;
    let mut changed = false;
    for caps in re.captures_iter(&line) {
        let Some(m) = caps.get(0) else {
            continue;
        };
        if line[..m.start()].ends_with('\\') {
            continue;
        }
        out.push_str(&line[last..m.start()]);
        out.push_str(&rep(&caps));
        last = m.end();
        changed = true;
    }
    if !changed {
        return line;
    }
    out.push_str(&line[last..]);
    out
}
