//! The resolver instance: source trees, precedence chain, and the public
//! read/write surface.
//!
//! A [`Settings`] owns six precedence-ordered value sources. Resolution for
//! a key queries them in a fixed order and stops at the first hit:
//!
//! 1. the override tree (explicit `set` calls)
//! 2. a bound flag the user set explicitly
//! 3. environment variables (automatic mode, then explicit bindings)
//! 4. the loaded config document
//! 5. the generic key/value store
//! 6. programmer defaults
//! 7. a bound flag's default value, as the final fallback
//!
//! A shallower key resolving to a non-map in a higher-precedence source
//! shadows every deeper key under that prefix, across all lower sources.
//!
//! No internal locking: concurrent reads are fine, but a write must not run
//! concurrently with any other operation on the same instance.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::debug;

use crate::alias::AliasTable;
use crate::coerce;
use crate::env::EnvBindings;
use crate::error::ConfigResult;
use crate::files::FileDiscovery;
use crate::flags::FlagValue;
use crate::format::Format;
use crate::key::{self, KeyReplacer};
use crate::merge;
use crate::tree;

/// A hierarchical configuration resolver.
#[derive(Default)]
pub struct Settings {
    override_tree: Map<String, Value>,
    config: Map<String, Value>,
    kv_store: Map<String, Value>,
    defaults: Map<String, Value>,
    aliases: AliasTable,
    env: EnvBindings,
    flags: HashMap<String, Box<dyn FlagValue>>,
    discovery: FileDiscovery,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("override_tree", &self.override_tree)
            .field("config", &self.config)
            .field("kv_store", &self.kv_store)
            .field("defaults", &self.defaults)
            .field("aliases", &self.aliases)
            .field("env", &self.env)
            .field("flags", &self.flags.keys().collect::<Vec<_>>())
            .field("discovery", &self.discovery)
            .finish()
    }
}

impl Settings {
    /// A resolver with all source trees empty.
    pub fn new() -> Self {
        Self::default()
    }

    // ---- writes ----------------------------------------------------------

    /// Set an override value, the highest-precedence source.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        let canonical = self.canonical(key);
        let mut value = value.into();
        merge::insensitivise(&mut value);
        let parts: Vec<&str> = key::split(&canonical);
        tree::set(&mut self.override_tree, &parts, value);
    }

    /// Set a default value, the lowest-precedence tree.
    pub fn set_default(&mut self, key: &str, value: impl Into<Value>) {
        let canonical = self.canonical(key);
        let mut value = value.into();
        merge::insensitivise(&mut value);
        let parts: Vec<&str> = key::split(&canonical);
        tree::set(&mut self.defaults, &parts, value);
    }

    /// Replace the generic key/value store tree wholesale.
    pub fn set_kv_store(&mut self, store: Map<String, Value>) {
        let mut value = Value::Object(store);
        merge::insensitivise(&mut value);
        if let Value::Object(map) = value {
            self.kv_store = map;
        }
    }

    /// Register `alias` as another name for `key`.
    ///
    /// Values already stored under the alias name at the top level of any
    /// tree migrate to the canonical key, so reads under either name unify
    /// no matter which came first, the value or the alias.
    pub fn register_alias(&mut self, alias: &str, key: &str) {
        let alias_key = key::normalize(alias);
        let canonical = key::normalize(key);
        if !self.aliases.register(&alias_key, &canonical) {
            return;
        }
        for tree in [
            &mut self.override_tree,
            &mut self.config,
            &mut self.kv_store,
            &mut self.defaults,
        ] {
            if let Some(value) = tree.remove(&alias_key) {
                tree.insert(canonical.clone(), value);
            }
        }
    }

    /// Bind a command-line flag to a key.
    pub fn bind_flag(&mut self, key: &str, flag: impl FlagValue + 'static) {
        self.flags.insert(key::normalize(key), Box::new(flag));
    }

    /// Bind a key to environment variables.
    ///
    /// With no names, a candidate is synthesized from the key (prefixed,
    /// replaced, upper-cased). With names, they are consulted in order and
    /// used verbatim.
    pub fn bind_env(&mut self, key: &str, names: &[&str]) {
        self.env.bind(key, names);
    }

    /// Prefix applied to all synthesized environment variable names.
    pub fn set_env_prefix(&mut self, prefix: &str) {
        self.env.set_prefix(prefix);
    }

    /// Resolve any key against the environment by synthesizing a variable
    /// name for it on demand.
    pub fn automatic_env(&mut self) {
        self.env.set_automatic(true);
    }

    /// Substitution applied to keys before environment names are
    /// synthesized from them.
    pub fn set_env_key_replacer(&mut self, replacer: KeyReplacer) {
        self.env.set_replacer(replacer);
    }

    /// Whether a present-but-empty environment variable counts as set.
    /// Defaults to false: empty variables fall through to the next source.
    pub fn allow_empty_env(&mut self, allow: bool) {
        self.env.set_allow_empty(allow);
    }

    // ---- file discovery --------------------------------------------------

    /// Load from this exact file, bypassing the search path.
    pub fn set_config_file(&mut self, path: impl Into<std::path::PathBuf>) {
        self.discovery.set_config_file(path);
    }

    /// Base name (no extension) of the file to search for.
    pub fn set_config_name(&mut self, name: &str) {
        self.discovery.set_config_name(name);
    }

    /// Force the document format instead of inferring it from extensions.
    pub fn set_config_type(&mut self, name: &str) -> ConfigResult<()> {
        self.discovery.set_config_type(Format::from_name(name)?);
        Ok(())
    }

    /// Append a directory to the config search path.
    pub fn add_config_path(&mut self, path: impl AsRef<std::path::Path>) {
        self.discovery.add_config_path(path);
    }

    // ---- loading ---------------------------------------------------------

    /// Parse a document and replace the config tree wholesale.
    ///
    /// The format must have been set via [`set_config_type`](Self::set_config_type)
    /// (or be inferable from an explicitly set config file). On error the
    /// existing tree is left unmodified.
    pub fn read_config(&mut self, bytes: &[u8]) -> ConfigResult<()> {
        let map = self.buffer_format()?.decode(bytes)?;
        self.config = map;
        Ok(())
    }

    /// Parse a document and deep-merge it into the config tree.
    ///
    /// Maps merge recursively; sequences and scalars replace. On error the
    /// existing tree is left unmodified.
    pub fn merge_config(&mut self, bytes: &[u8]) -> ConfigResult<()> {
        let map = self.buffer_format()?.decode(bytes)?;
        merge::deep_merge(&mut self.config, &map);
        Ok(())
    }

    /// Deep-merge a pre-built generic map into the config tree.
    pub fn merge_config_map(&mut self, map: Map<String, Value>) {
        let mut value = Value::Object(map);
        merge::insensitivise(&mut value);
        if let Value::Object(map) = value {
            merge::deep_merge(&mut self.config, &map);
        }
    }

    /// Discover, read, and parse the config file, replacing the config
    /// tree. A missing file is the informational `NotFound` error; all
    /// other errors leave the trees unmodified too.
    pub fn read_in_config(&mut self) -> ConfigResult<()> {
        let map = self.load_discovered()?;
        self.config = map;
        Ok(())
    }

    /// Discover, read, and parse the config file, deep-merging it into the
    /// config tree.
    pub fn merge_in_config(&mut self) -> ConfigResult<()> {
        let map = self.load_discovered()?;
        merge::deep_merge(&mut self.config, &map);
        Ok(())
    }

    fn load_discovered(&mut self) -> ConfigResult<Map<String, Value>> {
        let path = self.discovery.find()?;
        let format = self.discovery.format_for(&path)?;
        let bytes = std::fs::read(&path).map_err(|e| crate::error::ConfigError::read(&path, e))?;
        debug!(path = %path.display(), format = format.name(), "loading configuration file");
        format.decode(&bytes)
    }

    fn buffer_format(&self) -> ConfigResult<Format> {
        if let Some(format) = self.discovery.config_type() {
            return Ok(format);
        }
        // Fall back to the explicit file's extension when one is set.
        match self.discovery.find() {
            Ok(path) => self.discovery.format_for(&path),
            Err(_) => Err(crate::error::ConfigError::UnsupportedFormat(
                "no config type set".to_string(),
            )),
        }
    }

    // ---- reads -----------------------------------------------------------

    /// Resolve a key through the precedence chain.
    ///
    /// `None` means no source has the key, a shadowing prefix hides it, or
    /// it sits under a scalar.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.find(&key::normalize(key))
    }

    /// Whether the key resolves to a non-null value in any source.
    pub fn is_set(&self, key: &str) -> bool {
        !matches!(self.get(key), None | Some(Value::Null))
    }

    /// Whether the key is present in the loaded config document
    /// specifically, as opposed to being resolvable through any source.
    pub fn in_config(&self, key: &str) -> bool {
        let canonical = self.canonical(key);
        let parts: Vec<&str> = key::split(&canonical);
        tree::search_with_path_prefixes(&self.config, &parts).is_some()
    }

    pub fn get_string(&self, key: &str) -> String {
        self.get(key).map(|v| coerce::as_string(&v)).unwrap_or_default()
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| coerce::as_bool(&v))
    }

    pub fn get_i64(&self, key: &str) -> i64 {
        self.get(key).map(|v| coerce::as_i64(&v)).unwrap_or_default()
    }

    pub fn get_u64(&self, key: &str) -> u64 {
        self.get(key).map(|v| coerce::as_u64(&v)).unwrap_or_default()
    }

    pub fn get_f64(&self, key: &str) -> f64 {
        self.get(key).map(|v| coerce::as_f64(&v)).unwrap_or_default()
    }

    pub fn get_string_vec(&self, key: &str) -> Vec<String> {
        self.get(key).map(|v| coerce::as_string_vec(&v)).unwrap_or_default()
    }

    pub fn get_i64_vec(&self, key: &str) -> Vec<i64> {
        self.get(key).map(|v| coerce::as_i64_vec(&v)).unwrap_or_default()
    }

    pub fn get_duration(&self, key: &str) -> Duration {
        self.get(key).map(|v| coerce::as_duration(&v)).unwrap_or_default()
    }

    pub fn get_time(&self, key: &str) -> DateTime<Utc> {
        let epoch = DateTime::<Utc>::UNIX_EPOCH;
        self.get(key).map(|v| coerce::as_time(&v)).unwrap_or(epoch)
    }

    pub fn get_size_in_bytes(&self, key: &str) -> u64 {
        self.get(key).map(|v| coerce::as_size_in_bytes(&v)).unwrap_or_default()
    }

    pub fn get_string_map(&self, key: &str) -> Map<String, Value> {
        self.get(key).map(|v| coerce::as_string_map(&v)).unwrap_or_default()
    }

    pub fn get_string_map_string(&self, key: &str) -> HashMap<String, String> {
        self.get(key).map(|v| coerce::as_string_map_string(&v)).unwrap_or_default()
    }

    // ---- enumeration -----------------------------------------------------

    /// Every key known to any source, as dotted paths, sorted.
    ///
    /// Aliases contribute their own name; flag and env bindings contribute
    /// their bound keys whether or not a value is currently present.
    pub fn all_keys(&self) -> Vec<String> {
        let mut keys = HashSet::new();

        for tree in [&self.override_tree, &self.config, &self.kv_store, &self.defaults] {
            let mut flat = Vec::new();
            tree::flatten_keys(tree, "", &mut flat);
            keys.extend(flat);
        }
        keys.extend(self.flags.keys().cloned());
        keys.extend(self.env.bound_keys().map(str::to_string));
        keys.extend(self.aliases.keys().map(str::to_string));

        let mut keys: Vec<String> = keys.into_iter().collect();
        keys.sort();
        keys
    }

    /// A fully merged snapshot of every resolvable key as a nested map.
    ///
    /// Built by resolving each known key through the precedence chain, so
    /// shadowed and absent keys are omitted and aliases appear under their
    /// own name with the canonical key's value.
    pub fn all_settings(&self) -> Map<String, Value> {
        let mut out = Map::new();
        for key in self.all_keys() {
            let Some(value) = self.get(&key) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            let parts: Vec<&str> = key::split(&key);
            tree::set(&mut out, &parts, value);
        }
        out
    }

    /// A new instance whose config tree is the map at `key`.
    ///
    /// `None` when the key is absent or not a map.
    pub fn sub(&self, key: &str) -> Option<Settings> {
        match self.get(key)? {
            Value::Object(map) => Some(Settings {
                config: map,
                ..Settings::default()
            }),
            _ => None,
        }
    }

    // ---- resolution ------------------------------------------------------

    pub(crate) fn canonical(&self, key: &str) -> String {
        self.aliases.resolve(&key::normalize(key))
    }

    fn find(&self, lcase_key: &str) -> Option<Value> {
        let parts: Vec<&str> = key::split(lcase_key);
        if parts.len() > 1 && self.aliases.shadows_path(&parts) {
            return None;
        }

        let canonical = self.aliases.resolve(lcase_key);
        let parts: Vec<&str> = key::split(&canonical);
        let nested = parts.len() > 1;

        // Override tree first.
        if let Some(v) = tree::search_with_path_prefixes(&self.override_tree, &parts) {
            return Some(v.clone());
        }
        if nested && tree::path_shadowed_in_deep_map(&parts, &self.override_tree) {
            return None;
        }

        // Explicitly set flags outrank env and below; unset ones wait for
        // the end of the chain.
        if let Some(flag) = self.flags.get(&canonical)
            && flag.changed()
            && let Some(value) = flag.value()
        {
            return Some(Value::String(value));
        }
        if nested
            && tree::path_shadowed_in_flat_keys(&parts, self.flags.keys().map(String::as_str))
        {
            return None;
        }

        // Environment: automatic mode, then explicit bindings.
        if let Some(value) = self.env.lookup_auto(&canonical) {
            return Some(Value::String(value));
        }
        if nested && self.env.auto_shadows_path(&parts) {
            return None;
        }
        if let Some(value) = self.env.lookup_bound(&canonical) {
            return Some(Value::String(value));
        }
        if nested && tree::path_shadowed_in_flat_keys(&parts, self.env.bound_keys()) {
            return None;
        }

        // Config document.
        if let Some(v) = tree::search_with_path_prefixes(&self.config, &parts) {
            return Some(v.clone());
        }
        if nested && tree::path_shadowed_in_deep_map(&parts, &self.config) {
            return None;
        }

        // Generic key/value store.
        if let Some(v) = tree::search_with_path_prefixes(&self.kv_store, &parts) {
            return Some(v.clone());
        }
        if nested && tree::path_shadowed_in_deep_map(&parts, &self.kv_store) {
            return None;
        }

        // Defaults.
        if let Some(v) = tree::search_with_path_prefixes(&self.defaults, &parts) {
            return Some(v.clone());
        }
        if nested && tree::path_shadowed_in_deep_map(&parts, &self.defaults) {
            return None;
        }

        // Last resort: a bound flag's default value.
        if let Some(flag) = self.flags.get(&canonical)
            && let Some(value) = flag.value()
        {
            return Some(Value::String(value));
        }

        None
    }
}
