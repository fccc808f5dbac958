//! Command-line front end
//!
//! - `repair`: show what the repair pipeline makes of a payload
//! - `process`: run a saved model response through the director
//! - `macros`: expand a prompt template

pub mod process;
pub mod render;
pub mod template;

use crate::config::DirectorConfig;
use crate::repair;
use std::path::PathBuf;

/// Options shared by the commands
#[derive(Debug, Clone, Default)]
pub struct CliOptions {
    pub state_path: Option<PathBuf>,
    pub config_path: Option<PathBuf>,
    pub assets_path: Option<PathBuf>,
    pub interactive: bool,
    pub debug: bool,
}

pub(crate) fn load_config(options: &CliOptions) -> anyhow::Result<DirectorConfig> {
    let mut config = match &options.config_path {
        Some(path) => DirectorConfig::load(path)?,
        None => DirectorConfig::default(),
    };
    config.debug |= options.debug;
    Ok(config)
}

/// Repair a payload and print the audit trail and the result
pub fn run_repair(raw: &str) -> anyhow::Result<()> {
    let result = repair::repair(raw);

    if result.fixes.is_empty() {
        println!("[Fixes] (none)");
    } else {
        println!("[Fixes]");
        for fix in &result.fixes {
            println!("  {fix}");
        }
    }
    println!();

    match &result.parsed {
        Some(value) => {
            println!("{}", serde_json::to_string_pretty(value)?);
            Ok(())
        }
        None => anyhow::bail!(
            "payload could not be repaired: {}",
            result.error.as_deref().unwrap_or("unknown error")
        ),
    }
}
