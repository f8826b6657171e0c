//! Alias indirection between key names.
//!
//! An alias maps one key to another so both names address the same stored
//! value, regardless of which name a value was written under or when the
//! alias was registered. Chains resolve transitively.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::key;

/// Bidirectional alias table: alias key → canonical key.
///
/// A key may be the target of multiple aliases. Resolution follows chains
/// until no further mapping exists and is guarded against cycles.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    aliases: HashMap<String, String>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `alias` as another name for `target`.
    ///
    /// Both names are normalized. Overwrites any prior mapping for the
    /// alias. A mapping that would close a cycle (the target already
    /// resolves back to the alias) is refused with a warning, so
    /// [`resolve`](Self::resolve) can never loop. Returns whether the
    /// mapping was stored.
    pub fn register(&mut self, alias: &str, target: &str) -> bool {
        let alias = key::normalize(alias);
        let target = key::normalize(target);

        if alias == target || self.resolve(&target) == alias {
            warn!(%alias, %target, "refusing circular alias registration");
            return false;
        }

        self.aliases.insert(alias, target);
        true
    }

    /// Resolve a normalized key through the alias table to its canonical key.
    ///
    /// Substitutes repeatedly until no mapping exists. A revisited key stops
    /// the walk, so even a hand-constructed cycle terminates.
    pub fn resolve(&self, key: &str) -> String {
        let mut current = key.to_string();
        let mut seen = HashSet::new();
        while let Some(next) = self.aliases.get(&current) {
            if !seen.insert(current.clone()) {
                break;
            }
            current = next.clone();
        }
        current
    }

    /// Whether any registered alias starts the given path segments.
    ///
    /// Used by the resolver: a registered alias at a path prefix shadows all
    /// deeper keys under it.
    pub fn shadows_path(&self, parts: &[&str]) -> bool {
        let mut prefix = String::new();
        for part in &parts[..parts.len().saturating_sub(1)] {
            if !prefix.is_empty() {
                prefix.push(key::KEY_DELIMITER);
            }
            prefix.push_str(part);
            if self.aliases.contains_key(&prefix) {
                return true;
            }
        }
        false
    }

    /// All registered alias names.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.aliases.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}
