//! Wraps Unicode directory trees in `text` code blocks.
//!
//! Devsite pages often print a tree straight after a sentence such as
//! "creates the following directory structure:". Left as prose, Markdown
//! folds the tree into one paragraph.

use std::borrow::Cow;

use docport_core::{
    FencePhase, FenceState, TextTransform, TransformContext, closes_fence, parse_fence_opening,
};

const INTRO_PHRASE: &str = "following directory structure";
const CORNERS: [char; 3] = ['└', '┌', '├'];
const BRANCHES: [char; 4] = ['├', '└', '│', '─'];

fn starts_with_corner(line: &str) -> bool {
    line.trim_start().starts_with(CORNERS)
}

fn has_branch(line: &str) -> bool {
    line.contains(BRANCHES)
}

/// Fences bare trees after an intro line and relabels fenced trees as `text`.
pub fn fix_directory_trees(body: &str) -> Cow<'_, str> {
    let lines: Vec<&str> = body.split('\n').collect();
    let mut out: Vec<Cow<'_, str>> = Vec::with_capacity(lines.len());
    let mut fence = FenceState::default();
    let mut changed = false;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        if fence.phase == FencePhase::InsideFence {
            if closes_fence(line, &fence) {
                fence = FenceState::default();
            }
            out.push(Cow::Borrowed(line));
            i += 1;
            continue;
        }

        if let Some(opening) = parse_fence_opening(line) {
            fence = opening.state();
            let tree_inside = lines.get(i + 1).is_some_and(|next| starts_with_corner(next));
            if tree_inside && opening.info != "text" {
                out.push(Cow::Owned(format!("{}{}text", opening.indent, opening.fence())));
                changed = true;
            } else {
                out.push(Cow::Borrowed(line));
            }
            i += 1;
            continue;
        }

        if line.contains(INTRO_PHRASE) {
            let start = (i + 1..lines.len())
                .find(|&j| !lines[j].trim().is_empty())
                .filter(|&j| starts_with_corner(lines[j]));
            if let Some(start) = start {
                let end = (start..lines.len())
                    .find(|&k| !has_branch(lines[k]))
                    .unwrap_or(lines.len());
                let first = lines[start];
                let indent = &first[..first.len() - first.trim_start().len()];

                out.push(Cow::Borrowed(line.trim_end()));
                out.push(Cow::Borrowed(""));
                out.push(Cow::Borrowed("```text"));
                for tree_line in &lines[start..end] {
                    let dedented = tree_line
                        .strip_prefix(indent)
                        .unwrap_or_else(|| tree_line.trim_start());
                    out.push(Cow::Borrowed(dedented));
                }
                out.push(Cow::Borrowed("```"));
                changed = true;
                i = end;
                continue;
            }
        }

        out.push(Cow::Borrowed(line));
        i += 1;
    }

    if !changed {
        return Cow::Borrowed(body);
    }
    Cow::Owned(out.join("\n"))
}

/// [`fix_directory_trees`] as a pipeline step.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeFixer;

impl TextTransform for TreeFixer {
    fn transform<'a>(&self, input: &'a str, _cx: &mut TransformContext<'_>) -> Cow<'a, str> {
        fix_directory_trees(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fences_tree_after_intro() {
        let body = "This creates the following directory structure:  \n\n  ├── WORKSPACE\n  └── main\n      └── BUILD\nNext paragraph";
        assert_eq!(
            fix_directory_trees(body),
            "This creates the following directory structure:\n\n```text\n├── WORKSPACE\n└── main\n    └── BUILD\n```\nNext paragraph"
        );
    }

    #[test]
    fn intro_without_tree_is_untouched() {
        let body = "See the following directory structure in the repo.\n\nIt has two folders.";
        assert!(matches!(fix_directory_trees(body), Cow::Borrowed(_)));
    }

    #[test]
    fn relabels_fenced_tree() {
        let body = "```bash\n└── src\n    └── lib.rs\n```";
        assert_eq!(
            fix_directory_trees(body),
            "```text\n└── src\n    └── lib.rs\n```"
        );
    }

    #[test]
    fn ignores_intro_inside_fence() {
        let body = "```\n# following directory structure\n└── x\n```";
        assert_eq!(fix_directory_trees(body), body);
    }

    #[test]
    fn fixing_twice_is_stable() {
        let body = "the following directory structure:\n└── a\n    ├── b\n    └── c\n\n```\n├── d\n```";
        let once = fix_directory_trees(body).into_owned();
        assert_eq!(fix_directory_trees(&once), once);
    }
}
