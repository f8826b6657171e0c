//! Structured decode: populating caller-defined types from the resolved
//! settings snapshot.
//!
//! The snapshot produced by `all_settings` already carries alias names, so a
//! field can be populated through whichever name its value was configured
//! under. Strict mode reports every input key the target type left
//! unconsumed as a single aggregate error.

use std::collections::HashSet;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{ConfigError, ConfigResult};
use crate::settings::Settings;
use crate::tree;

impl Settings {
    /// Deserialize the full settings snapshot into `T`.
    ///
    /// Serde's usual matching rules apply; extra keys in the snapshot are
    /// ignored.
    pub fn unmarshal<T: DeserializeOwned>(&self) -> ConfigResult<T> {
        let snapshot = Value::Object(self.all_settings());
        serde_json::from_value(snapshot).map_err(ConfigError::from)
    }

    /// Deserialize the value at one key into `T`.
    pub fn unmarshal_key<T: DeserializeOwned>(&self, key: &str) -> ConfigResult<T> {
        let value = self.get(key).unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(ConfigError::from)
    }

    /// Deserialize the full snapshot into `T`, erroring if the snapshot
    /// contains keys the target type did not consume.
    ///
    /// A key does not count as unconsumed when the type consumed its
    /// alias-canonical twin, in either direction: the snapshot carries a
    /// value under both the alias and the canonical name, and a field may
    /// be named by either.
    pub fn unmarshal_exact<T: DeserializeOwned + Serialize>(&self) -> ConfigResult<T> {
        let snapshot = self.all_settings();
        let decoded: T = serde_json::from_value(Value::Object(snapshot.clone()))?;

        let consumed: HashSet<String> = match serde_json::to_value(&decoded)? {
            Value::Object(map) => flat_keys(&map)
                .into_iter()
                .map(|key| self.canonical(&key))
                .collect(),
            _ => HashSet::new(),
        };

        let mut unmatched: Vec<String> = flat_keys(&snapshot)
            .into_iter()
            .filter(|key| !consumed.contains(&self.canonical(key)))
            .collect();

        if unmatched.is_empty() {
            Ok(decoded)
        } else {
            unmatched.sort();
            Err(ConfigError::StrictDecode { unmatched })
        }
    }
}

fn flat_keys(map: &Map<String, Value>) -> Vec<String> {
    let mut keys = Vec::new();
    tree::flatten_keys(map, "", &mut keys);
    keys
}
