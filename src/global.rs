//! Process-wide default [`Settings`] instance.
//!
//! Small programs that keep one configuration for the whole process can use
//! these free functions instead of threading a `Settings` value through
//! every call site. The instance is created lazily on first touch and is
//! safe to use from multiple threads.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::ConfigResult;
use crate::flags::FlagValue;
use crate::key::KeyReplacer;
use crate::settings::Settings;

static DEFAULT: OnceLock<RwLock<Settings>> = OnceLock::new();

fn instance() -> &'static RwLock<Settings> {
    DEFAULT.get_or_init(|| RwLock::new(Settings::new()))
}

fn read() -> RwLockReadGuard<'static, Settings> {
    instance().read().unwrap_or_else(|e| e.into_inner())
}

fn write() -> RwLockWriteGuard<'static, Settings> {
    instance().write().unwrap_or_else(|e| e.into_inner())
}

/// Replace the default instance with a fresh one. Intended for tests.
pub fn reset() {
    *write() = Settings::new();
}

/// Run a closure against the default instance, read-only.
pub fn with<T>(f: impl FnOnce(&Settings) -> T) -> T {
    f(&read())
}

/// Run a closure against the default instance with mutable access.
pub fn with_mut<T>(f: impl FnOnce(&mut Settings) -> T) -> T {
    f(&mut write())
}

// ---- writes ----------------------------------------------------------------

pub fn set(key: &str, value: impl Into<Value>) {
    write().set(key, value);
}

pub fn set_default(key: &str, value: impl Into<Value>) {
    write().set_default(key, value);
}

pub fn register_alias(alias: &str, key: &str) {
    write().register_alias(alias, key);
}

pub fn bind_flag(key: &str, flag: impl FlagValue + 'static) {
    write().bind_flag(key, flag);
}

pub fn bind_env(key: &str, names: &[&str]) {
    write().bind_env(key, names);
}

pub fn set_env_prefix(prefix: &str) {
    write().set_env_prefix(prefix);
}

pub fn automatic_env() {
    write().automatic_env();
}

pub fn set_env_key_replacer(replacer: KeyReplacer) {
    write().set_env_key_replacer(replacer);
}

pub fn allow_empty_env(allow: bool) {
    write().allow_empty_env(allow);
}

// ---- file discovery and loading --------------------------------------------

pub fn set_config_file(path: impl Into<PathBuf>) {
    write().set_config_file(path);
}

pub fn set_config_name(name: &str) {
    write().set_config_name(name);
}

pub fn set_config_type(name: &str) -> ConfigResult<()> {
    write().set_config_type(name)
}

pub fn add_config_path(path: impl AsRef<Path>) {
    write().add_config_path(path);
}

pub fn read_config(bytes: &[u8]) -> ConfigResult<()> {
    write().read_config(bytes)
}

pub fn merge_config(bytes: &[u8]) -> ConfigResult<()> {
    write().merge_config(bytes)
}

pub fn merge_config_map(map: Map<String, Value>) {
    write().merge_config_map(map);
}

pub fn read_in_config() -> ConfigResult<()> {
    write().read_in_config()
}

pub fn merge_in_config() -> ConfigResult<()> {
    write().merge_in_config()
}

// ---- reads -----------------------------------------------------------------

pub fn get(key: &str) -> Option<Value> {
    read().get(key)
}

pub fn is_set(key: &str) -> bool {
    read().is_set(key)
}

pub fn in_config(key: &str) -> bool {
    read().in_config(key)
}

pub fn get_string(key: &str) -> String {
    read().get_string(key)
}

pub fn get_bool(key: &str) -> bool {
    read().get_bool(key)
}

pub fn get_i64(key: &str) -> i64 {
    read().get_i64(key)
}

pub fn get_u64(key: &str) -> u64 {
    read().get_u64(key)
}

pub fn get_f64(key: &str) -> f64 {
    read().get_f64(key)
}

pub fn get_string_vec(key: &str) -> Vec<String> {
    read().get_string_vec(key)
}

pub fn get_i64_vec(key: &str) -> Vec<i64> {
    read().get_i64_vec(key)
}

pub fn get_duration(key: &str) -> Duration {
    read().get_duration(key)
}

pub fn get_time(key: &str) -> DateTime<Utc> {
    read().get_time(key)
}

pub fn get_size_in_bytes(key: &str) -> u64 {
    read().get_size_in_bytes(key)
}

pub fn get_string_map(key: &str) -> Map<String, Value> {
    read().get_string_map(key)
}

pub fn get_string_map_string(key: &str) -> HashMap<String, String> {
    read().get_string_map_string(key)
}

pub fn all_keys() -> Vec<String> {
    read().all_keys()
}

pub fn all_settings() -> Map<String, Value> {
    read().all_settings()
}

#[cfg(test)]
mod tests {
    use super::*;

    // The default instance is shared process-wide; every test resets it and
    // they are serialized behind one lock so they cannot interleave.
    use std::sync::Mutex;

    static GUARD: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_instance_set_and_get() {
        let _g = GUARD.lock().unwrap_or_else(|e| e.into_inner());
        reset();

        set_default("port", 1313);
        assert_eq!(get_i64("port"), 1313);

        set("port", 40000);
        assert_eq!(get_i64("port"), 40000);
        assert!(is_set("port"));
        assert!(!is_set("host"));
    }

    #[test]
    fn test_default_instance_reset_clears_state() {
        let _g = GUARD.lock().unwrap_or_else(|e| e.into_inner());
        reset();

        set("lingering", true);
        assert!(get_bool("lingering"));
        reset();
        assert!(!is_set("lingering"));
    }

    #[test]
    fn test_collection_getters() {
        let _g = GUARD.lock().unwrap_or_else(|e| e.into_inner());
        reset();

        set("modes", serde_json::json!([1, 2, 3]));
        set("labels", serde_json::json!({"env": "prod", "tier": 2}));

        assert_eq!(get_i64_vec("modes"), vec![1, 2, 3]);
        assert_eq!(get_string_map("labels").len(), 2);
        let labels = get_string_map_string("labels");
        assert_eq!(labels["env"], "prod");
        assert_eq!(labels["tier"], "2");
    }

    #[test]
    fn test_with_mut_exposes_full_surface() {
        let _g = GUARD.lock().unwrap_or_else(|e| e.into_inner());
        reset();

        with_mut(|s| {
            s.set_config_type("json").unwrap();
            s.read_config(br#"{"Nested": {"Leaf": "ok"}}"#).unwrap();
        });
        assert_eq!(get_string("nested.leaf"), "ok");
        assert!(with(|s| s.in_config("nested.leaf")));
    }
}
