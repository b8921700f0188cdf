use std::{collections::HashSet, fs, path::Path};

use log::{debug, trace, warn};
use serde::de::DeserializeOwned;

/// Loads a persisted JSON collection, failing safe to its empty default.
///
/// A missing file is a fresh installation. An unreadable or unparsable file
/// is treated as an empty collection so a corrupt store never takes the
/// application down; the condition is logged for diagnostics.
pub fn read_collection_or_default<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        debug!("Collection file {} does not exist yet", path.display());
        return T::default();
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(
                "Failed to read collection file {}: {}. Starting empty.",
                path.display(),
                e
            );
            return T::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(value) => {
            trace!("Successfully loaded collection from {}", path.display());
            value
        }
        Err(e) => {
            warn!(
                "Collection file {} is corrupt: {}. Starting empty.",
                path.display(),
                e
            );
            T::default()
        }
    }
}

/// Normalizes a tag list: trims whitespace, drops empties, and removes
/// duplicates while keeping the first occurrence's position.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

// Helper method for parsing comma-separated tag arguments
pub fn parse_tags(tags: Option<String>) -> Vec<String> {
    tags.map(|t| {
        t.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
    .unwrap_or_default()
}
