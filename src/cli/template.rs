//! `macros` command: expand a prompt template against a scene

use crate::cli::{CliOptions, load_config};
use crate::collaborators::{AssetLookup, NoAssets};
use crate::infrastructure::FileSystemAssetLookup;
use crate::macros::{MacroContext, MacroEngine};
use crate::storage;

/// Expand every macro in the template and print the result
pub async fn run_macros(template: &str, options: &CliOptions) -> anyhow::Result<()> {
    let config = load_config(options)?;
    let scene = match &options.state_path {
        Some(path) => storage::load_or_default(path)?,
        None => Default::default(),
    };
    let assets: Box<dyn AssetLookup> = match &options.assets_path {
        Some(path) => Box::new(FileSystemAssetLookup::new(path)),
        None => Box::new(NoAssets),
    };

    let engine = MacroEngine::new();
    if options.debug {
        eprintln!("Available macros: {}", engine.list_macro_names().join(", "));
    }

    let ctx = MacroContext {
        config: &config,
        scene: &scene,
        assets: assets.as_ref(),
    };
    let report = engine.resolve_report(template, &ctx).await;
    println!("{}", report.text);
    if options.debug && !report.unresolved.is_empty() {
        eprintln!("Left empty: {}", report.unresolved.join(", "));
    }
    Ok(())
}
