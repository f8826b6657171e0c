//! Environment variable bindings.
//!
//! A key can be bound to one or more candidate environment variables, first
//! present one wins. Automatic mode synthesizes a variable name for any key
//! at resolution time, even keys never explicitly bound. Synthesized names
//! go through the configured [`KeyReplacer`] and prefix; explicitly supplied
//! names are used verbatim.

use std::collections::HashMap;

use crate::key::{self, KEY_DELIMITER, KeyReplacer};

/// Explicit bindings plus the automatic-mode switches.
#[derive(Debug, Clone, Default)]
pub struct EnvBindings {
    /// Normalized key → ordered candidate environment variable names.
    bindings: HashMap<String, Vec<String>>,
    prefix: String,
    automatic: bool,
    allow_empty: bool,
    replacer: Option<KeyReplacer>,
}

impl EnvBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a key to the given environment variable names, in priority
    /// order. With no names, one is synthesized from the key.
    pub fn bind(&mut self, key: &str, names: &[&str]) {
        let normalized = key::normalize(key);
        let candidates = if names.is_empty() {
            vec![self.synth_name(&normalized)]
        } else {
            names.iter().map(|n| (*n).to_string()).collect()
        };
        self.bindings
            .entry(normalized)
            .or_default()
            .extend(candidates);
    }

    /// Prefix for synthesized names, stored upper-cased.
    pub fn set_prefix(&mut self, prefix: &str) {
        self.prefix = prefix.to_uppercase();
    }

    /// Enable on-demand name synthesis for any key.
    pub fn set_automatic(&mut self, on: bool) {
        self.automatic = on;
    }

    /// Whether a present-but-empty variable counts as set.
    pub fn set_allow_empty(&mut self, allow: bool) {
        self.allow_empty = allow;
    }

    pub fn set_replacer(&mut self, replacer: KeyReplacer) {
        self.replacer = Some(replacer);
    }

    /// The variable name automatic mode would consult for a key.
    pub fn synth_name(&self, key: &str) -> String {
        key::env_name(key, &self.prefix, self.replacer.as_ref())
    }

    /// Automatic-mode lookup. `None` when automatic mode is off or the
    /// synthesized variable is not set.
    pub fn lookup_auto(&self, key: &str) -> Option<String> {
        if !self.automatic {
            return None;
        }
        self.get_env(&self.synth_name(key))
    }

    /// Explicit-binding lookup: candidates in bind order, first set wins.
    pub fn lookup_bound(&self, key: &str) -> Option<String> {
        self.bindings
            .get(key)?
            .iter()
            .find_map(|name| self.get_env(name))
    }

    pub fn is_bound(&self, key: &str) -> bool {
        self.bindings.contains_key(key)
    }

    /// All explicitly bound keys.
    pub fn bound_keys(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    /// Whether automatic mode finds a variable for some proper prefix of the
    /// path, shadowing the deeper key.
    pub fn auto_shadows_path(&self, parts: &[&str]) -> bool {
        if !self.automatic {
            return false;
        }
        let mut prefix = String::new();
        for part in &parts[..parts.len().saturating_sub(1)] {
            if !prefix.is_empty() {
                prefix.push(KEY_DELIMITER);
            }
            prefix.push_str(part);
            if self.get_env(&self.synth_name(&prefix)).is_some() {
                return true;
            }
        }
        false
    }

    /// Read a variable from the process environment.
    ///
    /// A present-but-empty variable is treated as unset unless allow-empty
    /// is on, so resolution falls through to the next source.
    fn get_env(&self, name: &str) -> Option<String> {
        match std::env::var(name) {
            Ok(value) if self.allow_empty || !value.is_empty() => Some(value),
            _ => None,
        }
    }
}
