//! Final `---` frontmatter + body layout.

use serde_yaml::{Mapping, Value};

/// Renders `frontmatter` with sorted keys, then a blank line, then `body`.
///
/// ```
/// let mut fm = serde_yaml::Mapping::new();
/// fm.insert("weight".into(), 1.into());
/// fm.insert("title".into(), "Setup".into());
/// assert_eq!(
///     docport_hugo::assemble::assemble_document(&fm, "Body"),
///     "---\ntitle: Setup\nweight: 1\n---\n\nBody"
/// );
/// ```
pub fn assemble_document(frontmatter: &Mapping, body: &str) -> String {
    let yaml = render_frontmatter(frontmatter);
    let mut out = String::with_capacity(yaml.len() + body.len() + 10);
    out.push_str("---\n");
    out.push_str(&yaml);
    if !yaml.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("---\n\n");
    out.push_str(body);
    out
}

fn sort_key(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other).unwrap_or_default(),
    }
}

fn render_frontmatter(frontmatter: &Mapping) -> String {
    let mut entries: Vec<(&Value, &Value)> = frontmatter.iter().collect();
    entries.sort_by_cached_key(|(key, _)| sort_key(key));
    let sorted: Mapping = entries
        .into_iter()
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    match serde_yaml::to_string(&sorted) {
        Ok(yaml) => yaml,
        Err(err) => {
            log::error!("frontmatter could not be serialized, writing an empty block: {err}");
            "{}\n".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_frontmatter_is_braces() {
        assert_eq!(assemble_document(&Mapping::new(), "x"), "---\n{}\n---\n\nx");
    }

    #[test]
    fn keys_are_sorted() {
        let fm: Mapping =
            serde_yaml::from_str("weight: 2\nlinkTitle: A\ntitle: A\ndescription: d\n").unwrap();
        insta::assert_snapshot!(assemble_document(&fm, "# Body"), @r"
        ---
        description: d
        linkTitle: A
        title: A
        weight: 2
        ---

        # Body
        ");
    }

    #[test]
    fn non_string_values_survive() {
        let fm: Mapping = serde_yaml::from_str("toc: true\ntitle: Intro\n").unwrap();
        assert_eq!(
            assemble_document(&fm, ""),
            "---\ntitle: Intro\ntoc: true\n---\n\n"
        );
    }
}
