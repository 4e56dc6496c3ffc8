use std::fs;
use std::path::Path;

use docport_cli::{BatchOptions, Settings, convert_tree, scaffold_site, validate_site};
use docport_hugo::ConverterConfig;

fn write(root: &Path, rel: &str, text: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn source_tree() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "concepts/labels.md",
        "---\ntitle: Labels\nbook_path: /_book.yaml\n---\n# Labels\n\nSee [build](../basics/build.md).\n",
    );
    write(dir.path(), "blog/post.md", "# Post\n");
    dir
}

#[test]
fn valid_and_unmapped_documents() {
    let source = source_tree();
    let output = tempfile::tempdir().unwrap();
    let report = convert_tree(
        source.path(),
        output.path(),
        &ConverterConfig::default(),
        &BatchOptions::default(),
    );

    assert_eq!(report.total_files, 2);
    assert_eq!(report.converted_files, 1);
    assert_eq!(report.error_files, 1);
    assert!(report.has_errors());
    assert_eq!(report.failures[0].path, Path::new("blog/post.md"));
    assert!(report.failures[0].error.contains("'blog'"));

    let written = fs::read_to_string(output.path().join("content/docs/concepts/labels.md")).unwrap();
    assert_eq!(
        written,
        "---\nbook_path: /_book.yaml\nlinkTitle: Labels\ntitle: Labels\nweight: 1\n---\n\nSee [build](/basics/build/)."
    );
}

#[test]
fn dry_run_writes_nothing() {
    let source = source_tree();
    let output = tempfile::tempdir().unwrap();
    let options = BatchOptions {
        dry_run: true,
        ..BatchOptions::default()
    };
    let report =
        convert_tree(source.path(), output.path(), &ConverterConfig::default(), &options);
    assert_eq!(report.converted_files, 1);
    assert!(!output.path().join("content").exists());
}

#[test]
fn incremental_run_skips_fresh_outputs() {
    let source = source_tree();
    let output = tempfile::tempdir().unwrap();
    let config = ConverterConfig::default();
    let options = BatchOptions {
        incremental: true,
        ..BatchOptions::default()
    };
    let first = convert_tree(source.path(), output.path(), &config, &options);
    assert_eq!(first.converted_files, 1);

    let second = convert_tree(source.path(), output.path(), &config, &options);
    assert_eq!(second.converted_files, 0);
    assert_eq!(second.skipped_files, 1);
    assert_eq!(second.error_files, 1);
}

#[test]
fn fail_fast_stops_at_first_failure() {
    let source = source_tree();
    let output = tempfile::tempdir().unwrap();
    let options = BatchOptions {
        continue_on_error: false,
        max_threads: Some(1),
        ..BatchOptions::default()
    };
    let report =
        convert_tree(source.path(), output.path(), &ConverterConfig::default(), &options);
    // "blog/post.md" sorts first
    assert_eq!(report.error_files, 1);
    assert_eq!(report.converted_files, 0);
    assert_eq!(report.total_files, 2);
}

#[test]
fn report_serializes_to_json() {
    let source = source_tree();
    let output = tempfile::tempdir().unwrap();
    let report = convert_tree(
        source.path(),
        output.path(),
        &ConverterConfig::default(),
        &BatchOptions::default(),
    );
    let json: serde_json::Value = serde_json::to_value(&report).unwrap();
    assert_eq!(json["converted_files"], 1);
    assert_eq!(json["failures"][0]["path"], "blog/post.md");
}

#[cfg(unix)]
#[test]
fn dangling_symlink_does_not_stop_the_tree() {
    let source = source_tree();
    let output = tempfile::tempdir().unwrap();
    std::os::unix::fs::symlink(
        source.path().join("concepts/missing.md"),
        source.path().join("concepts/gone.md"),
    )
    .unwrap();

    let report = convert_tree(
        source.path(),
        output.path(),
        &ConverterConfig::default(),
        &BatchOptions::default(),
    );
    assert_eq!(report.converted_files, 1);
    assert_eq!(report.error_files, 2);
    assert_eq!(report.total_files, 3);
    assert!(
        report
            .failures
            .iter()
            .any(|failure| failure.path == Path::new("concepts/gone.md"))
    );
    assert!(output.path().join("content/docs/concepts/labels.md").is_file());
}

#[test]
fn converted_and_scaffolded_site_validates() {
    let source = source_tree();
    let output = tempfile::tempdir().unwrap();
    let settings = Settings::default();
    convert_tree(
        source.path(),
        output.path(),
        &settings.converter,
        &BatchOptions::default(),
    );
    assert!(!validate_site(output.path(), "md").is_valid());

    let scaffold = scaffold_site(output.path(), &settings.converter, &settings.hugo, false);
    assert!(!scaffold.has_errors());
    let report = validate_site(output.path(), "md");
    assert!(report.is_valid(), "{report:?}");
    assert!(report.checked_files > 1);

    let index = fs::read_to_string(output.path().join("content/docs/concepts/_index.md")).unwrap();
    assert!(index.contains("title: Concepts\n"));
}
