//! Infrastructure layer - adapters for external collaborators
//!
//! Implementations of the collaborator traits that touch the file system.

pub mod asset_lookup;

pub use asset_lookup::{FileSystemAssetLookup, InMemoryAssetLookup};
