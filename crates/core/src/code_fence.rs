//! Code fence detection shared by the tree fixer, the fence annotator and the
//! sanitizer's fenced-block guard.
//!
//! Fences are recognised at any indentation because converted pages nest
//! them inside list items.

/// Fence parsing phases tracked across lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FencePhase {
    /// Not currently inside a fence.
    #[default]
    Outside,
    /// Within fence contents.
    InsideFence,
}

/// Current fence state (phase, marker and length).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FenceState {
    /// Current fence phase.
    pub phase: FencePhase,
    /// Fence marker character (``` or ~~~).
    pub marker: Option<char>,
    /// Length of the opening fence (number of ` or ~ characters).
    pub length: usize,
}

/// Outcome of processing a single line for fence state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineParseOutcome {
    /// State to carry into the next line.
    pub next_state: FenceState,
    /// Whether the line is an opener, closer or fence content.
    pub in_fence: bool,
}

/// An opening fence line split into its parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FenceOpening<'a> {
    /// Leading whitespace before the marker run.
    pub indent: &'a str,
    /// Marker character.
    pub marker: char,
    /// Number of marker characters.
    pub length: usize,
    /// Trimmed text after the marker run (the language tag, if any).
    pub info: &'a str,
}

impl FenceOpening<'_> {
    /// True when the opener carries a language tag.
    pub fn is_labeled(&self) -> bool {
        !self.info.is_empty()
    }

    /// The marker run, e.g. "```".
    pub fn fence(&self) -> String {
        std::iter::repeat_n(self.marker, self.length).collect()
    }

    /// State entered after this opener.
    pub fn state(&self) -> FenceState {
        FenceState {
            phase: FencePhase::InsideFence,
            marker: Some(self.marker),
            length: self.length,
        }
    }
}

/// Parses a line as a fence opener.
pub fn parse_fence_opening(line: &str) -> Option<FenceOpening<'_>> {
    let line = line.trim_end_matches(['\r', '\n']);
    let indent_len = leading_whitespace_len(line);
    let after_indent = &line[indent_len..];
    let (marker, length) = detect_fence_marker_with_length(after_indent)?;
    // marker characters are ASCII, so `length` is also a byte count
    let info = after_indent[length..].trim();
    if marker == '`' && info.contains('`') {
        return None;
    }
    Some(FenceOpening {
        indent: &line[..indent_len],
        marker,
        length,
        info,
    })
}

/// True if `line` closes the fence described by `state`.
pub fn closes_fence(line: &str, state: &FenceState) -> bool {
    if state.phase != FencePhase::InsideFence {
        return false;
    }
    let trimmed = line.trim();
    match (state.marker, detect_fence_marker_with_length(trimmed)) {
        (Some(open), Some((marker, len))) => {
            marker == open && len >= state.length && len == trimmed.len()
        }
        _ => false,
    }
}

/// Advance fence state based on a single line of text.
pub fn advance_fence_state(line: &str, state: FenceState) -> LineParseOutcome {
    match state.phase {
        FencePhase::Outside => match parse_fence_opening(line) {
            Some(opening) => LineParseOutcome {
                next_state: opening.state(),
                in_fence: true,
            },
            None => LineParseOutcome {
                next_state: state,
                in_fence: false,
            },
        },
        FencePhase::InsideFence => {
            let next_state = if closes_fence(line, &state) {
                FenceState::default()
            } else {
                state
            };
            LineParseOutcome {
                next_state,
                in_fence: true,
            }
        }
    }
}

fn leading_whitespace_len(line: &str) -> usize {
    line.bytes()
        .take_while(|b| matches!(*b, b' ' | b'\t'))
        .count()
}

fn detect_fence_marker_with_length(after_indent: &str) -> Option<(char, usize)> {
    let mut chars = after_indent.chars();
    let first = chars.next()?;
    if first != '`' && first != '~' {
        return None;
    }
    let run_len = 1 + chars.take_while(|c| *c == first).count();
    if run_len >= 3 {
        Some((first, run_len))
    } else {
        None
    }
}
