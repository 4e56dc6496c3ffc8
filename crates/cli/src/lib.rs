#![deny(missing_docs)]
//! Tree-level conversion for docport: settings, routing, batch writes, assets.

/// Static asset copying.
pub mod assets;
/// Parallel tree conversion.
pub mod batch;
/// Section to category routing.
pub mod route;
/// Configuration file loading.
pub mod settings;
/// Hugo site scaffolding and validation.
pub mod site;

pub use assets::{ASSET_EXTENSIONS, AssetReport, copy_assets};
pub use batch::{
    BatchOptions, BatchReport, Discovery, DocumentFailure, DocumentOutcome, TreeConverter,
    convert_tree, discover_documents,
};
pub use route::Router;
pub use settings::{DEFAULT_CONFIG_FILE, Settings, SiteInfo};
pub use site::{ScaffoldReport, ValidationReport, scaffold_site, validate_site};
