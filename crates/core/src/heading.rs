use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::code_fence::{FenceState, advance_fence_state};

static FIRST_LEVEL_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^# (.+)$").expect("valid first-level heading regex"));

/// Returns the trimmed text of the first `# Heading` line of `body`.
///
/// Lines inside fenced code blocks are not headings.
///
/// ```
/// use docport_core::heading::first_level_heading;
///
/// assert_eq!(first_level_heading("intro\n# Setup\n## Next"), Some("Setup"));
/// assert_eq!(first_level_heading("## Only second level"), None);
/// ```
pub fn first_level_heading(body: &str) -> Option<&str> {
    let mut fence = FenceState::default();
    for line in body.lines() {
        let outcome = advance_fence_state(line, fence);
        fence = outcome.next_state;
        if outcome.in_fence {
            continue;
        }
        let text = FIRST_LEVEL_HEADING
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .filter(|text| !text.is_empty());
        if text.is_some() {
            return text;
        }
    }
    None
}

/// Splits a trailing `{#anchor}` off heading text.
///
/// Returns the text before the anchor and the anchor id, or the input
/// unchanged and `None` when there is no well-formed anchor.
///
/// ```
/// use docport_core::heading::extract_custom_id;
///
/// assert_eq!(extract_custom_id("Setup {#setup}"), ("Setup", Some("setup")));
/// assert_eq!(extract_custom_id("Setup"), ("Setup", None));
/// ```
pub fn extract_custom_id(text: &str) -> (&str, Option<&str>) {
    let anchor = text
        .trim_end()
        .strip_suffix('}')
        .and_then(|rest| rest.rsplit_once("{#"))
        .filter(|(_, id)| is_valid_id(id));
    match anchor {
        Some((before, id)) => (before.trim_end(), Some(id)),
        None => (text, None),
    }
}

/// Anchor ids are non-empty runs of `[A-Za-z0-9_-]`.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Per-document registry of explicit heading anchor ids.
///
/// The first occurrence of an id keeps it; the n-th occurrence receives
/// `id-n`.
#[derive(Debug, Default)]
pub struct HeadingIdRegistry {
    counts: HashMap<String, usize>,
}

impl HeadingIdRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            counts: HashMap::new(),
        }
    }

    /// Records an occurrence of `id` and returns the id to write.
    pub fn register(&mut self, id: &str) -> String {
        let entry = self.counts.entry(id.to_string()).or_insert(0);
        let resolved = if *entry > 0 {
            format!("{}-{}", id, *entry + 1)
        } else {
            id.to_string()
        };
        *entry += 1;
        resolved
    }

    /// How many times `id` has been registered.
    pub fn occurrences(&self, id: &str) -> usize {
        self.counts.get(id).copied().unwrap_or(0)
    }
}
