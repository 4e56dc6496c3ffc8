//! Whole-body rewrites run around the line sanitizer.
//!
//! - `cleanup`: removes Devsite-only directives before sanitizing.
//! - `links`: turns relative Markdown links into Hugo page URLs.
//! - `tree`: fences Unicode directory trees as `text`.
//! - `code_fence`: labels bare code fences with an inferred language.

/// Code fence language annotation.
pub mod code_fence;
/// Devsite directive cleanup.
pub mod cleanup;
/// Relative Markdown link rewriting.
pub mod links;
/// Directory tree fencing.
pub mod tree;

pub use cleanup::cleanup_devsite;
pub use code_fence::{FenceAnnotator, FenceLabeler, KeywordHeuristic, PatternTable};
pub use links::LinkRewriter;
pub use tree::{TreeFixer, fix_directory_trees};
