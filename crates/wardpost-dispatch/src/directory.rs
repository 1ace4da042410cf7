//! Recipient directory — static name → identity mapping.
//!
//! Names in the portal are free text, so the directory compares them with
//! the same normalization (trim + uppercase) whether they come from config
//! keys or from task rows. Unknown names are a per-recipient outcome, not
//! an error: one unmapped name must never block the mapped ones.

use std::collections::{BTreeMap, HashMap};

/// Normalize a recipient name for lookup: trim, then uppercase.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Immutable name → identity mapping, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    entries: HashMap<String, String>,
}

impl Directory {
    /// Build from the config table. Keys are normalized on the way in so
    /// a lowercase key in the TOML still resolves.
    pub fn from_config(entries: &BTreeMap<String, String>) -> Self {
        let entries = entries
            .iter()
            .map(|(name, id)| (normalize_name(name), id.trim().to_string()))
            .collect();
        Self { entries }
    }

    /// Look up an identity by (un-normalized) name.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.entries.get(&normalize_name(name)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
