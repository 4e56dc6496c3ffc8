use serde_yaml::{Mapping, Value};
use thiserror::Error;

/// Result of separating a document's metadata block from its body.
#[derive(Debug)]
pub struct FrontmatterSplit<'a> {
    /// Parsed frontmatter; empty when the block is absent or unusable.
    pub mapping: Mapping,
    /// Text after the closing delimiter, or the whole input on fallback.
    pub body: &'a str,
    /// Why a present block was ignored, if it was.
    pub fallback: Option<FrontmatterError>,
}

impl<'a> FrontmatterSplit<'a> {
    fn whole_body(input: &'a str, fallback: Option<FrontmatterError>) -> Self {
        Self {
            mapping: Mapping::new(),
            body: input,
            fallback,
        }
    }
}

/// Reasons a leading `---` block could not be used as frontmatter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrontmatterError {
    /// Unclosed YAML fence (e.g., missing terminating `---`).
    #[error("Unterminated YAML frontmatter block: expected closing '---'")]
    Unterminated,
    /// YAML failed to parse.
    #[error("Frontmatter parse error: {0}")]
    Parse(String),
    /// Top-level YAML node was neither a mapping nor null.
    #[error("Frontmatter must be a YAML mapping at the top level")]
    InvalidRootType,
}

/// Splits raw document text into frontmatter and body.
///
/// Never fails: a missing, unterminated or unparsable block yields an empty
/// mapping and the entire original text as body.
pub fn split_frontmatter(input: &str) -> FrontmatterSplit<'_> {
    let Some((block, body_start)) = find_yaml_block(input) else {
        let fallback = starts_with_fence(input).then_some(FrontmatterError::Unterminated);
        return FrontmatterSplit::whole_body(input, fallback);
    };

    match parse_yaml_block(block) {
        Ok(mapping) => FrontmatterSplit {
            mapping,
            body: &input[body_start..],
            fallback: None,
        },
        Err(err) => FrontmatterSplit::whole_body(input, Some(err)),
    }
}

fn parse_yaml_block(block: &str) -> Result<Mapping, FrontmatterError> {
    if block.trim().is_empty() {
        return Ok(Mapping::new());
    }

    let value: Value =
        serde_yaml::from_str(block).map_err(|err| FrontmatterError::Parse(err.to_string()))?;

    match value {
        Value::Null => Ok(Mapping::new()),
        Value::Mapping(mapping) => Ok(mapping),
        _ => Err(FrontmatterError::InvalidRootType),
    }
}

/// Returns the YAML text between the delimiters and the byte offset of the body.
fn find_yaml_block(input: &str) -> Option<(&str, usize)> {
    let bom_len = if input.starts_with('\u{feff}') {
        '\u{feff}'.len_utf8()
    } else {
        0
    };
    let (first, mut cursor) = next_line(input, bom_len)?;
    if !is_yaml_fence(first) {
        return None;
    }

    let block_start = cursor;
    while let Some((line, next_cursor)) = next_line(input, cursor) {
        if is_yaml_fence(line) {
            let block = input[block_start..cursor].trim_end_matches(['\r', '\n']);
            return Some((block, next_cursor));
        }
        cursor = next_cursor;
    }
    None
}

fn starts_with_fence(input: &str) -> bool {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    next_line(input, 0).is_some_and(|(line, _)| is_yaml_fence(line))
}

fn next_line(input: &str, start: usize) -> Option<(&str, usize)> {
    if start >= input.len() {
        return None;
    }

    let bytes = &input.as_bytes()[start..];
    if let Some(pos) = bytes.iter().position(|b| *b == b'\n') {
        let line_end = start + pos;
        Some((&input[start..line_end], line_end + 1))
    } else {
        Some((&input[start..], input.len()))
    }
}

fn is_yaml_fence(line: &str) -> bool {
    line.trim_end_matches('\r') == "---"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get<'m>(mapping: &'m Mapping, key: &str) -> Option<&'m Value> {
        mapping.get(Value::String(key.to_string()))
    }

    #[test]
    fn returns_whole_text_when_no_frontmatter() {
        let input = "# Title\nBody";
        let split = split_frontmatter(input);
        assert!(split.mapping.is_empty());
        assert_eq!(split.body, input);
        assert!(split.fallback.is_none());
    }

    #[test]
    fn parses_basic_yaml() {
        let input = "---\ntitle: Example\ntoc: true\n---\n# Content\n";
        let split = split_frontmatter(input);
        assert_eq!(
            get(&split.mapping, "title").and_then(Value::as_str),
            Some("Example")
        );
        assert_eq!(get(&split.mapping, "toc").and_then(Value::as_bool), Some(true));
        assert_eq!(split.body, "# Content\n");
    }

    #[test]
    fn keeps_key_order() {
        let split = split_frontmatter("---\nzeta: 1\nalpha: 2\n---\n");
        let keys: Vec<_> = split
            .mapping
            .keys()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(keys, ["zeta", "alpha"]);
        assert_eq!(split.body, "");
    }

    #[test]
    fn empty_and_null_blocks_yield_empty_mapping() {
        let split = split_frontmatter("---\n---\nBody");
        assert!(split.mapping.is_empty());
        assert_eq!(split.body, "Body");

        let split = split_frontmatter("---\n~\n---\nBody");
        assert!(split.mapping.is_empty());
        assert_eq!(split.body, "Body");
    }

    #[test]
    fn ignores_bom_and_crlf() {
        let input = "\u{feff}---\r\nfoo: bar\r\n---\r\nBody";
        let split = split_frontmatter(input);
        assert_eq!(get(&split.mapping, "foo").and_then(Value::as_str), Some("bar"));
        assert_eq!(split.body, "Body");
    }

    #[test]
    fn invalid_yaml_falls_back_to_whole_text() {
        let input = "---\ninvalid: [unterminated\n---\nBody";
        let split = split_frontmatter(input);
        assert!(split.mapping.is_empty());
        assert_eq!(split.body, input);
        assert!(matches!(split.fallback, Some(FrontmatterError::Parse(_))));
    }

    #[test]
    fn unterminated_block_falls_back() {
        let input = "---\ntitle: test";
        let split = split_frontmatter(input);
        assert_eq!(split.body, input);
        assert_eq!(split.fallback, Some(FrontmatterError::Unterminated));
    }

    #[test]
    fn scalar_root_falls_back() {
        let input = "---\njust a string\n---\nBody";
        let split = split_frontmatter(input);
        assert_eq!(split.body, input);
        assert_eq!(split.fallback, Some(FrontmatterError::InvalidRootType));
    }

    #[test]
    fn leading_text_is_not_frontmatter() {
        let input = "intro\n---\ntitle: x\n---\n";
        let split = split_frontmatter(input);
        assert!(split.mapping.is_empty());
        assert_eq!(split.body, input);
        assert!(split.fallback.is_none());
    }
}
