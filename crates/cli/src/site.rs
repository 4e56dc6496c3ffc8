//! Hugo site scaffolding around the converted content.
//!
//! [`scaffold_site`] writes `hugo.yaml` from [`SiteInfo`] and one `_index.md`
//! per site root, category and mapped section, so Docsy can render the
//! navigation even when the source tree has no index pages. An index that
//! already exists (for example one converted from the source tree) is left
//! alone. [`validate_site`] checks the layout of a finished site.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use docport_core::{ConvertError, split_frontmatter};
use docport_hugo::ConverterConfig;
use docport_hugo::assemble::assemble_document;
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use walkdir::WalkDir;

use crate::batch::{DocumentFailure, walk_failure, write_atomic};
use crate::settings::SiteInfo;

/// Hugo configuration file written at the site root.
pub const HUGO_CONFIG_FILE: &str = "hugo.yaml";
/// Hugo section index file name.
pub const SECTION_INDEX_FILE: &str = "_index.md";

const DEFAULT_PAGE_TYPE: &str = "docs";

#[derive(Serialize)]
struct HugoConfig<'a> {
    #[serde(rename = "baseURL")]
    base_url: &'a str,
    #[serde(rename = "languageCode")]
    language_code: &'a str,
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Params<'a>>,
    module: Module<'a>,
    markup: Markup,
}

#[derive(Serialize)]
struct Params<'a> {
    description: &'a str,
}

#[derive(Serialize)]
struct Module<'a> {
    imports: Vec<ModuleImport<'a>>,
}

#[derive(Serialize)]
struct ModuleImport<'a> {
    path: &'a str,
}

#[derive(Serialize)]
struct Markup {
    goldmark: Goldmark,
}

#[derive(Serialize)]
struct Goldmark {
    renderer: Renderer,
}

// converted pages keep inline anchors and code tags
#[derive(Serialize)]
struct Renderer {
    #[serde(rename = "unsafe")]
    allow_html: bool,
}

/// Renders `hugo.yaml` for `site`.
///
/// ```
/// let yaml = docport_cli::site::render_hugo_config(&docport_cli::SiteInfo::default()).unwrap();
/// assert!(yaml.starts_with("baseURL: /\nlanguageCode: en-us\ntitle: Documentation\n"));
/// ```
pub fn render_hugo_config(site: &SiteInfo) -> Result<String, ConvertError> {
    let config = HugoConfig {
        base_url: &site.base_url,
        language_code: &site.language_code,
        title: &site.title,
        params: site.description.as_deref().map(|description| Params { description }),
        module: Module {
            imports: vec![ModuleImport {
                path: &site.theme_module,
            }],
        },
        markup: Markup {
            goldmark: Goldmark {
                renderer: Renderer { allow_html: true },
            },
        },
    };
    serde_yaml::to_string(&config).map_err(|err| ConvertError::Config(err.to_string()))
}

/// A generated `_index.md` page.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionIndex {
    /// Path below `content/`.
    pub path: PathBuf,
    /// Frontmatter of the page; the body is empty.
    pub frontmatter: Mapping,
}

impl SectionIndex {
    fn new(path: PathBuf, title: &str, weight: i64, page_type: &str) -> Self {
        let mut frontmatter = Mapping::new();
        frontmatter.insert(Value::from("title"), Value::from(title));
        frontmatter.insert(Value::from("linkTitle"), Value::from(title));
        frontmatter.insert(Value::from("type"), Value::from(page_type));
        frontmatter.insert(Value::from("weight"), Value::from(weight));
        Self { path, frontmatter }
    }

    fn with_description(mut self, description: Option<&str>) -> Self {
        if let Some(description) = description {
            self.frontmatter
                .insert(Value::from("description"), Value::from(description));
        }
        self
    }

    /// File contents of the page.
    pub fn render(&self) -> String {
        assemble_document(&self.frontmatter, "")
    }
}

/// `how-to-guides` -> `How To Guides`.
fn title_case(name: &str) -> String {
    name.split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Index pages for the site root, each category and each mapped section.
///
/// A category's weight is the lowest weight among its sections. Sections
/// routed to a disallowed category get no page.
pub fn section_indices(config: &ConverterConfig, site: &SiteInfo) -> Vec<SectionIndex> {
    let page_type = config
        .frontmatter
        .default_type
        .as_deref()
        .unwrap_or(DEFAULT_PAGE_TYPE);
    let sections: Vec<_> = config
        .content_mapping
        .iter()
        .filter(|(_, mapping)| !config.is_disallowed_category(&mapping.category))
        .collect();

    let mut categories: BTreeMap<&str, i64> = BTreeMap::new();
    for (_, mapping) in &sections {
        let weight = categories
            .entry(mapping.category.as_str())
            .or_insert(mapping.weight);
        *weight = (*weight).min(mapping.weight);
    }

    let root = SectionIndex::new(PathBuf::from(SECTION_INDEX_FILE), &site.title, 1, page_type)
        .with_description(site.description.as_deref());
    let category_pages = categories.into_iter().map(|(category, weight)| {
        SectionIndex::new(
            Path::new(category).join(SECTION_INDEX_FILE),
            &title_case(category),
            weight,
            page_type,
        )
    });
    let section_pages = sections.iter().map(|(name, mapping)| {
        let title = mapping.title.clone().unwrap_or_else(|| title_case(name));
        SectionIndex::new(
            Path::new(&mapping.category).join(name).join(SECTION_INDEX_FILE),
            &title,
            mapping.weight,
            page_type,
        )
    });

    std::iter::once(root)
        .chain(category_pages)
        .chain(section_pages)
        .collect()
}

/// Outcome of [`scaffold_site`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScaffoldReport {
    /// Files written (or that would be written in a dry run).
    pub written: usize,
    /// Index pages left alone because they already exist.
    pub kept: usize,
    /// Files that could not be written.
    pub failures: Vec<DocumentFailure>,
}

impl ScaffoldReport {
    /// True when at least one file failed.
    pub fn has_errors(&self) -> bool {
        !self.failures.is_empty()
    }

    fn write(&mut self, path: &Path, rel: &Path, text: &str, dry_run: bool) {
        if dry_run {
            log::info!("would write {}", path.display());
            self.written += 1;
            return;
        }
        match write_atomic(path, text) {
            Ok(()) => {
                log::debug!("wrote {}", path.display());
                self.written += 1;
            }
            Err(error) => {
                log::error!("{error}");
                self.failures.push(DocumentFailure {
                    path: rel.to_path_buf(),
                    error: error.to_string(),
                });
            }
        }
    }
}

/// Writes `hugo.yaml` and the missing `_index.md` pages below `output`.
pub fn scaffold_site(
    output: &Path,
    config: &ConverterConfig,
    site: &SiteInfo,
    dry_run: bool,
) -> ScaffoldReport {
    let mut report = ScaffoldReport::default();
    let config_rel = Path::new(HUGO_CONFIG_FILE);
    match render_hugo_config(site) {
        Ok(yaml) => report.write(&output.join(config_rel), config_rel, &yaml, dry_run),
        Err(error) => report.failures.push(DocumentFailure {
            path: config_rel.to_path_buf(),
            error: error.to_string(),
        }),
    }

    let content_dir = output.join("content");
    for index in section_indices(config, site) {
        let destination = content_dir.join(&index.path);
        if destination.exists() {
            log::debug!("keeping existing {}", destination.display());
            report.kept += 1;
            continue;
        }
        let rel = Path::new("content").join(&index.path);
        report.write(&destination, &rel, &index.render(), dry_run);
    }
    report
}

/// Problems found by [`validate_site`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    /// Content files inspected.
    pub checked_files: usize,
    /// Required site files that do not exist, relative to the site root.
    pub missing: Vec<PathBuf>,
    /// Files present but unusable.
    pub invalid: Vec<DocumentFailure>,
}

impl ValidationReport {
    /// True when nothing is missing or invalid.
    pub fn is_valid(&self) -> bool {
        self.missing.is_empty() && self.invalid.is_empty()
    }

    fn invalid(&mut self, path: &Path, error: impl ToString) {
        self.invalid.push(DocumentFailure {
            path: path.to_path_buf(),
            error: error.to_string(),
        });
    }
}

/// Checks that `site_dir` holds a usable Hugo site.
///
/// `hugo.yaml` and `content/_index.md` must exist, `hugo.yaml` must parse, and
/// every `.{extension}` file under `content/` must start with a frontmatter
/// block that parses.
pub fn validate_site(site_dir: &Path, extension: &str) -> ValidationReport {
    let mut report = ValidationReport::default();
    let content_rel = Path::new("content");
    for required in [
        PathBuf::from(HUGO_CONFIG_FILE),
        content_rel.join(SECTION_INDEX_FILE),
    ] {
        if !site_dir.join(&required).is_file() {
            report.missing.push(required);
        }
    }

    let config_path = site_dir.join(HUGO_CONFIG_FILE);
    if let Ok(text) = fs::read_to_string(&config_path)
        && let Err(err) = serde_yaml::from_str::<Value>(&text)
    {
        report.invalid(Path::new(HUGO_CONFIG_FILE), err);
    }

    let content_dir = site_dir.join(content_rel);
    if !content_dir.is_dir() {
        return report;
    }
    for entry in WalkDir::new(&content_dir).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                report.invalid.push(walk_failure(&content_dir, err));
                continue;
            }
        };
        if !entry.file_type().is_file()
            || entry.path().extension().and_then(|ext| ext.to_str()) != Some(extension)
        {
            continue;
        }
        report.checked_files += 1;
        let rel = content_rel.join(entry.path().strip_prefix(&content_dir).unwrap_or(entry.path()));
        let raw = match fs::read_to_string(entry.path()) {
            Ok(raw) => raw,
            Err(err) => {
                report.invalid(&rel, ConvertError::io(entry.path(), err));
                continue;
            }
        };
        let split = split_frontmatter(&raw);
        if let Some(reason) = split.fallback {
            report.invalid(&rel, reason);
        } else if split.body.len() == raw.len() {
            report.invalid(&rel, "missing frontmatter block");
        }
    }
    report
}
