//! docport - Devsite to Hugo/Docsy documentation converter

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docport_cli::{
    AssetReport, BatchOptions, BatchReport, DocumentFailure, ScaffoldReport, Settings,
    convert_tree, copy_assets, scaffold_site, validate_site,
};
use docport_hugo::convert_document;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "docport")]
#[command(version, about = "Convert Devsite documentation to a Hugo/Docsy site", long_about = None)]
#[command(after_help = "EXAMPLES:
    docport convert -s site/en -o hugo     Convert a documentation tree
    docport -c bazel.yaml convert -s en -o out --dry-run
    docport file site/en/concepts/labels.md
    docport validate -p hugo               Check a converted site")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to ./config.yaml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a Devsite source tree into a Hugo site
    Convert {
        /// Devsite source directory
        #[arg(short, long, value_name = "DIR")]
        source: PathBuf,

        /// Hugo site directory
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        /// Report what would be written without touching the output
        #[arg(long)]
        dry_run: bool,

        /// Skip documents whose output is newer than the source
        #[arg(long)]
        incremental: bool,

        /// Worker threads
        #[arg(long, value_name = "N")]
        threads: Option<usize>,

        /// Stop after the first failing document
        #[arg(long)]
        fail_fast: bool,

        /// Print the batch report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Convert one document and print it to stdout
    File {
        /// Source document
        path: PathBuf,

        /// Path used for routing-sensitive defaults (defaults to the file name)
        #[arg(long, value_name = "REL")]
        rel_path: Option<String>,
    },
    /// Check that a directory holds a usable Hugo site
    Validate {
        /// Hugo site directory
        #[arg(short, long, value_name = "DIR")]
        path: PathBuf,
    },
    /// Print the effective configuration
    Info,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    match main_result(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:?}");
            ExitCode::FAILURE
        }
    }
}

fn main_result(cli: Cli) -> Result<ExitCode> {
    let settings = Settings::discover(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Convert {
            source,
            output,
            dry_run,
            incremental,
            threads,
            fail_fast,
            json,
        } => {
            let options = BatchOptions {
                max_threads: threads,
                continue_on_error: !fail_fast,
                dry_run,
                incremental,
            };
            convert(&settings, &source, &output, &options, json)
        }
        Commands::File { path, rel_path } => {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let rel = rel_path.unwrap_or_else(|| {
                path.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default()
            });
            let converted = convert_document(&raw, &rel, &settings.converter);
            println!("{}", converted.text);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Validate { path } => validate(&settings, &path),
        Commands::Info => {
            let yaml = serde_yaml::to_string(&settings).context("rendering configuration")?;
            print!("{yaml}");
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn convert(
    settings: &Settings,
    source: &Path,
    output: &Path,
    options: &BatchOptions,
    json: bool,
) -> Result<ExitCode> {
    anyhow::ensure!(
        source.is_dir(),
        "source directory {} does not exist",
        source.display()
    );
    log::info!(
        "converting {} into {} for {}",
        source.display(),
        output.display(),
        settings.hugo.title
    );

    let report = convert_tree(source, output, &settings.converter, options);
    let assets = copy_assets(source, output, options.dry_run);
    let scaffold = scaffold_site(output, &settings.converter, &settings.hugo, options.dry_run);

    if json {
        let summary = ConvertSummary {
            documents: &report,
            assets: &assets,
            scaffold: &scaffold,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "{} documents: {} converted, {} skipped, {} failed ({:.1} ms)",
            report.total_files,
            report.converted_files,
            report.skipped_files,
            report.error_files,
            report.elapsed_ms,
        );
        println!(
            "{} assets copied, {} site files written, {} existing indices kept",
            assets.copied, scaffold.written, scaffold.kept
        );
        print_failures(
            report
                .failures
                .iter()
                .chain(&assets.failures)
                .chain(&scaffold.failures),
        );
    }

    Ok(
        if report.has_errors() || assets.has_errors() || scaffold.has_errors() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        },
    )
}

#[derive(Serialize)]
struct ConvertSummary<'a> {
    documents: &'a BatchReport,
    assets: &'a AssetReport,
    scaffold: &'a ScaffoldReport,
}

fn print_failures<'a>(failures: impl Iterator<Item = &'a DocumentFailure>) {
    for failure in failures {
        println!("  {}: {}", failure.path.display(), failure.error);
    }
}

fn validate(settings: &Settings, site_dir: &Path) -> Result<ExitCode> {
    anyhow::ensure!(
        site_dir.is_dir(),
        "site directory {} does not exist",
        site_dir.display()
    );
    let report = validate_site(site_dir, &settings.converter.content_extension);
    for missing in &report.missing {
        println!("  missing {}", missing.display());
    }
    print_failures(report.invalid.iter());
    if report.is_valid() {
        println!("{}: {} content files ok", site_dir.display(), report.checked_files);
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "{}: {} missing, {} invalid of {} content files",
            site_dir.display(),
            report.missing.len(),
            report.invalid.len(),
            report.checked_files
        );
        Ok(ExitCode::FAILURE)
    }
}
