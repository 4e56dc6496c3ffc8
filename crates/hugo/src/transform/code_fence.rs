//! Language tags for unlabeled code fences.
//!
//! Docsy only highlights fences that name a language, while Devsite pages
//! mostly leave them bare. [`FenceAnnotator`] finds the bare fences and asks a
//! [`FenceLabeler`] to name the language from the block content. Labeled
//! fences are copied through untouched.

use std::borrow::Cow;

use docport_core::{
    ConversionWarning, FenceOpening, FenceState, TextTransform, TransformContext, closes_fence,
    parse_fence_opening,
};

use crate::config::{ConverterConfig, FenceStrategy, OrderedTable};

/// Language used when nothing more specific is known.
pub const PLAIN_TEXT: &str = "text";

/// Chooses a language tag for the content of an unlabeled fence.
pub trait FenceLabeler: Send + Sync {
    /// Language tag for `content`.
    fn label<'s>(&'s self, content: &str) -> &'s str;
}

/// Unicode "Box Drawing" block.
const BOX_DRAWING: std::ops::RangeInclusive<char> = '\u{2500}'..='\u{257F}';

/// Empty blocks, paths and anything with box drawing are plain text.
fn is_plain_text(content: &str) -> bool {
    let trimmed = content.trim();
    trimmed.is_empty()
        || trimmed.starts_with('/')
        || content.chars().any(|c| BOX_DRAWING.contains(&c))
}

fn first_table_match<'t>(table: &'t OrderedTable<Vec<String>>, content: &str) -> Option<&'t str> {
    table
        .iter()
        .find(|(_, hints)| hints.iter().any(|hint| content.contains(hint.as_str())))
        .map(|(language, _)| language)
}

/// First configured language whose hint occurs anywhere in the content.
#[derive(Debug, Clone, Default)]
pub struct PatternTable {
    languages: OrderedTable<Vec<String>>,
}

impl PatternTable {
    /// Labeler over `languages`, checked in table order.
    pub fn new(languages: OrderedTable<Vec<String>>) -> Self {
        Self { languages }
    }
}

impl FenceLabeler for PatternTable {
    fn label<'s>(&'s self, content: &str) -> &'s str {
        if is_plain_text(content) {
            return PLAIN_TEXT;
        }
        first_table_match(&self.languages, content).unwrap_or(PLAIN_TEXT)
    }
}

const LINE_KEYWORDS: [(&str, &[&str]); 6] = [
    ("cpp", &["#include", "template <", "template<", "namespace "]),
    ("go", &["package main", "func "]),
    ("java", &["public class ", "import java.", "package "]),
    ("starlark", &["load(\"", "cc_library(", "cc_binary(", "java_library("]),
    ("python", &["def ", "class ", "import ", "from "]),
    ("bash", &["$ ", "#!/bin/bash", "#!/bin/sh"]),
];

/// Looks for declaration and import keywords at the start of a line, then
/// falls back to a substring table.
#[derive(Debug, Clone, Default)]
pub struct KeywordHeuristic {
    extra: OrderedTable<Vec<String>>,
}

impl KeywordHeuristic {
    /// Labeler with `extra` consulted after the built-in keywords.
    pub fn new(extra: OrderedTable<Vec<String>>) -> Self {
        Self { extra }
    }
}

impl FenceLabeler for KeywordHeuristic {
    fn label<'s>(&'s self, content: &str) -> &'s str {
        if is_plain_text(content) {
            return PLAIN_TEXT;
        }
        let keyword = LINE_KEYWORDS.iter().find(|(_, keywords)| {
            content
                .lines()
                .map(str::trim_start)
                .any(|line| keywords.iter().any(|k| line.starts_with(k)))
        });
        match keyword {
            Some((language, _)) => *language,
            None => first_table_match(&self.extra, content).unwrap_or(PLAIN_TEXT),
        }
    }
}

enum Scan<'a> {
    Outside,
    Labeled {
        state: FenceState,
        line: usize,
    },
    Unlabeled {
        opening: FenceOpening<'a>,
        line: usize,
        content: String,
    },
}

/// Adds a language tag to every unlabeled fence.
pub struct FenceAnnotator {
    labeler: Box<dyn FenceLabeler>,
}

impl FenceAnnotator {
    /// Annotator using `labeler`.
    pub fn new(labeler: impl FenceLabeler + 'static) -> Self {
        Self {
            labeler: Box::new(labeler),
        }
    }

    /// Annotator for the strategy selected in `config`.
    pub fn from_config(config: &ConverterConfig) -> Self {
        let table = config.code_language_patterns.clone();
        match config.code_fence.strategy {
            FenceStrategy::PatternTable => Self::new(PatternTable::new(table)),
            FenceStrategy::Keyword => Self::new(KeywordHeuristic::new(table)),
        }
    }

    /// Annotates `body`; an unterminated fence is annotated and reported.
    pub fn annotate<'a>(&self, body: &'a str, cx: &mut TransformContext<'_>) -> Cow<'a, str> {
        let mut out = String::with_capacity(body.len() + 32);
        let mut scan = Scan::Outside;
        let mut changed = false;

        for (idx, line) in body.split_inclusive('\n').enumerate() {
            scan = match scan {
                Scan::Outside => match parse_fence_opening(line) {
                    Some(opening) if opening.is_labeled() => {
                        out.push_str(line);
                        Scan::Labeled {
                            state: opening.state(),
                            line: idx + 1,
                        }
                    }
                    Some(opening) => Scan::Unlabeled {
                        opening,
                        line: idx + 1,
                        content: String::new(),
                    },
                    None => {
                        out.push_str(line);
                        Scan::Outside
                    }
                },
                Scan::Labeled { state, line: start } => {
                    out.push_str(line);
                    if closes_fence(line, &state) {
                        Scan::Outside
                    } else {
                        Scan::Labeled { state, line: start }
                    }
                }
                Scan::Unlabeled {
                    opening,
                    line: start,
                    mut content,
                } => {
                    if closes_fence(line, &opening.state()) {
                        self.emit(&mut out, &opening, &content, line.ends_with('\n'));
                        changed = true;
                        Scan::Outside
                    } else {
                        content.push_str(line);
                        Scan::Unlabeled {
                            opening,
                            line: start,
                            content,
                        }
                    }
                }
            };
        }

        match scan {
            Scan::Outside => {}
            Scan::Labeled { state, line } => cx.warn(ConversionWarning::UnclosedCodeFence {
                location: cx.location(line),
                marker: state.marker.unwrap_or('`'),
            }),
            Scan::Unlabeled {
                opening,
                line,
                content,
            } => {
                self.emit(&mut out, &opening, &content, false);
                changed = true;
                cx.warn(ConversionWarning::UnclosedCodeFence {
                    location: cx.location(line),
                    marker: opening.marker,
                });
            }
        }

        if !changed {
            return Cow::Borrowed(body);
        }
        Cow::Owned(out)
    }

    fn emit(&self, out: &mut String, opening: &FenceOpening<'_>, content: &str, newline: bool) {
        let fence = opening.fence();
        let language = self.labeler.label(content);
        out.push_str(opening.indent);
        out.push_str(&fence);
        out.push_str(language);
        out.push('\n');
        let content = content.trim_end_matches(['\n', '\r']);
        if !content.is_empty() {
            out.push_str(content);
            out.push('\n');
        }
        out.push_str(opening.indent);
        out.push_str(&fence);
        if newline {
            out.push('\n');
        }
    }
}

impl Default for FenceAnnotator {
    fn default() -> Self {
        Self::from_config(&ConverterConfig::default())
    }
}

impl TextTransform for FenceAnnotator {
    fn transform<'a>(&self, input: &'a str, cx: &mut TransformContext<'_>) -> Cow<'a, str> {
        self.annotate(input, cx)
    }
}
