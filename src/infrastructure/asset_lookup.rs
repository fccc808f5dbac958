//! Asset lookup adapters

use crate::collaborators::AssetLookup;
use crate::error::CollaboratorError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const SERVICE: &str = "asset lookup";

/// Asset lookup backed by a directory tree
///
/// Layout under the base path:
/// - `backgrounds/<name>.<ext>`
/// - `characters/<id>/expressions/<name>.<ext>`
/// - `characters/<id>/outfits/<name>.<ext>`
///
/// Names are file stems, sorted and deduplicated.
pub struct FileSystemAssetLookup {
    base_path: PathBuf,
    extensions: Vec<String>,
}

impl FileSystemAssetLookup {
    pub fn new<P: Into<PathBuf>>(base_path: P) -> Self {
        Self {
            base_path: base_path.into(),
            extensions: ["png", "jpg", "jpeg", "webp", "gif"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }

    pub fn with_extensions<P: Into<PathBuf>>(base_path: P, extensions: Vec<String>) -> Self {
        Self {
            base_path: base_path.into(),
            extensions,
        }
    }

    fn character_dir(&self, character_id: &str, kind: &str) -> Result<PathBuf, CollaboratorError> {
        let id = character_id.trim();
        if id.is_empty() || id.contains(['/', '\\']) || id == "." || id == ".." {
            return Err(CollaboratorError::failed(
                SERVICE,
                format!("invalid character id '{character_id}'"),
            ));
        }
        Ok(self.base_path.join("characters").join(id).join(kind))
    }

    async fn list_stems(&self, dir: &Path) -> Result<Vec<String>, CollaboratorError> {
        let unavailable =
            |err: std::io::Error| CollaboratorError::unavailable(SERVICE, format!("{}: {err}", dir.display()));

        let mut entries = tokio::fs::read_dir(dir).await.map_err(unavailable)?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(unavailable)? {
            let path = entry.path();
            let allowed = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| {
                    self.extensions
                        .iter()
                        .any(|allowed| allowed.eq_ignore_ascii_case(ext))
                });
            if !allowed {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }

        names.sort();
        names.dedup();
        Ok(names)
    }
}

#[async_trait]
impl AssetLookup for FileSystemAssetLookup {
    async fn list_backgrounds(&self) -> Result<Vec<String>, CollaboratorError> {
        self.list_stems(&self.base_path.join("backgrounds")).await
    }

    async fn list_expressions(&self, character_id: &str) -> Result<Vec<String>, CollaboratorError> {
        let dir = self.character_dir(character_id, "expressions")?;
        self.list_stems(&dir).await
    }

    async fn list_outfits(&self, character_id: &str) -> Result<Vec<String>, CollaboratorError> {
        let dir = self.character_dir(character_id, "outfits")?;
        self.list_stems(&dir).await
    }
}

/// In-memory asset lookup for testing
#[derive(Debug, Clone, Default)]
pub struct InMemoryAssetLookup {
    backgrounds: Vec<String>,
    expressions: HashMap<String, Vec<String>>,
    outfits: HashMap<String, Vec<String>>,
}

impl InMemoryAssetLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_background(&mut self, name: impl Into<String>) {
        self.backgrounds.push(name.into());
    }

    pub fn add_expression(&mut self, character_id: impl Into<String>, name: impl Into<String>) {
        self.expressions
            .entry(character_id.into())
            .or_default()
            .push(name.into());
    }

    pub fn add_outfit(&mut self, character_id: impl Into<String>, name: impl Into<String>) {
        self.outfits
            .entry(character_id.into())
            .or_default()
            .push(name.into());
    }
}

#[async_trait]
impl AssetLookup for InMemoryAssetLookup {
    async fn list_backgrounds(&self) -> Result<Vec<String>, CollaboratorError> {
        Ok(self.backgrounds.clone())
    }

    async fn list_expressions(&self, character_id: &str) -> Result<Vec<String>, CollaboratorError> {
        Ok(self.expressions.get(character_id).cloned().unwrap_or_default())
    }

    async fn list_outfits(&self, character_id: &str) -> Result<Vec<String>, CollaboratorError> {
        Ok(self.outfits.get(character_id).cloned().unwrap_or_default())
    }
}
