//! Source path to `content/` category path.

use std::path::{Component, Path, PathBuf};

use docport_core::ConvertError;
use docport_hugo::ConverterConfig;

/// Places documents under the Docsy category of their top-level section.
#[derive(Debug, Clone, Copy)]
pub struct Router<'c> {
    config: &'c ConverterConfig,
}

impl<'c> Router<'c> {
    /// Router over `config.content_mapping` and `config.orphan_files`.
    pub fn new(config: &'c ConverterConfig) -> Self {
        Self { config }
    }

    /// Category-relative destination of the source-relative `rel_path`.
    ///
    /// Root-level files listed in `orphan_files` go to their fixed category;
    /// every other document needs a `content_mapping` entry for its section.
    pub fn route(&self, rel_path: &Path) -> Result<PathBuf, ConvertError> {
        let mut parts = Vec::new();
        for component in rel_path.components() {
            match component {
                Component::Normal(part) => parts.push(part),
                Component::CurDir => {}
                _ => return Err(ConvertError::InvalidPath(rel_path.to_path_buf())),
            }
        }
        let Some(first) = parts.first() else {
            return Err(ConvertError::InvalidPath(rel_path.to_path_buf()));
        };
        let section = first.to_string_lossy();

        if parts.len() == 1
            && let Some(category) = self.config.orphan_category(&section)
        {
            log::info!("orphan file {section} placed under {category}");
            return Ok(Path::new(category).join(first));
        }

        let Some(mapping) = self.config.section(&section) else {
            return Err(ConvertError::UnmappedSection {
                section: section.into_owned(),
                path: rel_path.to_path_buf(),
            });
        };
        if self.config.is_disallowed_category(&mapping.category) {
            return Err(ConvertError::DisallowedCategory {
                category: mapping.category.clone(),
                path: rel_path.to_path_buf(),
            });
        }
        Ok(Path::new(&mapping.category).join(parts.iter().collect::<PathBuf>()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docport_hugo::SectionMapping;

    fn config() -> ConverterConfig {
        let mut config = ConverterConfig::default();
        config.content_mapping.insert(
            "howto".to_string(),
            SectionMapping {
                category: "how-to-guides".to_string(),
                weight: 60,
                title: None,
            },
        );
        config
    }

    #[test]
    fn routes_by_section() {
        let config = config();
        let router = Router::new(&config);
        assert_eq!(
            router.route(Path::new("tutorials/cpp.md")).unwrap(),
            Path::new("tutorials/tutorials/cpp.md")
        );
        assert_eq!(
            router.route(Path::new("./concepts/labels.md")).unwrap(),
            Path::new("docs/concepts/labels.md")
        );
    }

    #[test]
    fn orphan_help_goes_to_reference() {
        let config = config();
        assert_eq!(
            Router::new(&config).route(Path::new("help.md")).unwrap(),
            Path::new("docs/reference/help.md")
        );
    }

    #[test]
    fn unmapped_and_disallowed_are_distinct() {
        let config = config();
        let router = Router::new(&config);
        let unmapped = router.route(Path::new("blog/post.md")).unwrap_err();
        assert!(matches!(unmapped, ConvertError::UnmappedSection { ref section, .. } if section == "blog"));
        let disallowed = router.route(Path::new("howto/x.md")).unwrap_err();
        assert!(matches!(disallowed, ConvertError::DisallowedCategory { .. }));
        assert!(disallowed.to_string().contains("content_mapping"));
    }

    #[test]
    fn rejects_escaping_paths() {
        let config = config();
        let err = Router::new(&config).route(Path::new("../x.md")).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidPath(_)));
    }
}
