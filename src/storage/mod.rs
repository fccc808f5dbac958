//! Storage module for saving and loading scene state
//!
//! Snapshots are pretty-printed JSON so they can be inspected and edited by hand.

use crate::types::SceneState;
use std::path::Path;

/// Save state to bytes using JSON serialization
pub fn save(state: &SceneState) -> anyhow::Result<Vec<u8>> {
    let json = serde_json::to_string_pretty(state)?;
    Ok(json.into_bytes())
}

/// Load state from bytes using JSON deserialization
pub fn load(bytes: &[u8]) -> anyhow::Result<SceneState> {
    let json = std::str::from_utf8(bytes)?;
    let state = serde_json::from_str(json)?;
    Ok(state)
}

/// Load a snapshot file, or start from an empty scene when it does not exist yet
pub fn load_or_default(path: &Path) -> anyhow::Result<SceneState> {
    if !path.exists() {
        return Ok(SceneState::new());
    }
    let bytes = std::fs::read(path)?;
    load(&bytes).map_err(|err| err.context(format!("invalid scene snapshot '{}'", path.display())))
}

/// Write a snapshot file
pub fn save_to(path: &Path, state: &SceneState) -> anyhow::Result<()> {
    std::fs::write(path, save(state)?)?;
    Ok(())
}
