#![deny(missing_docs)]
//! docport core: frontmatter splitting, fence tracking, heading ids and errors.

/// Code fence detection utilities.
pub mod code_fence;
/// Core error and diagnostic types.
pub mod error;
/// YAML frontmatter splitting.
pub mod frontmatter;
/// Heading text and anchor id utilities.
pub mod heading;
/// Ordered body transform pipeline.
pub mod pipeline;

pub use code_fence::{
    FenceOpening, FencePhase, FenceState, LineParseOutcome, advance_fence_state, closes_fence,
    parse_fence_opening,
};
pub use error::{ConversionWarning, ConvertError, Diagnostics, SourceLocation};
pub use frontmatter::{FrontmatterError, FrontmatterSplit, split_frontmatter};
pub use heading::{HeadingIdRegistry, extract_custom_id, first_level_heading};
pub use pipeline::{BodyPipeline, TextTransform, TransformContext};
