//! Deep merge and document normalization.
//!
//! Merging layers one nested map onto another: maps merge recursively, while
//! sequences and scalars replace whatever sat at the key before. Sequences
//! are never merged element-wise. The source tree is never mutated.
//!
//! Every document entering the resolver is normalized first: map keys are
//! lowercased at every level (so lookups are case-insensitive regardless of
//! the casing a document used) and non-string map keys are stringified.

use serde_json::{Map, Value};

/// Merge `src` into `dest` in place.
///
/// Both trees must already be normalized ([`insensitivise`]), so keys match
/// directly. For each key of `src`:
/// - map onto map: merge recursively;
/// - anything else (scalar, sequence, or the key absent in `dest`): the
///   incoming value replaces the existing one entirely.
///
/// Keys present only in `dest` are left untouched.
pub fn deep_merge(dest: &mut Map<String, Value>, src: &Map<String, Value>) {
    for (key, incoming) in src {
        match (dest.get_mut(key), incoming) {
            (Some(Value::Object(existing)), Value::Object(overlay)) => {
                deep_merge(existing, overlay);
            }
            _ => {
                dest.insert(key.clone(), incoming.clone());
            }
        }
    }
}

/// Recursively lowercase every map key in `value`, descending through
/// sequences as well.
pub fn insensitivise(value: &mut Value) {
    match value {
        Value::Object(map) => {
            let entries: Vec<(String, Value)> = std::mem::take(map).into_iter().collect();
            for (key, mut inner) in entries {
                insensitivise(&mut inner);
                map.insert(key.to_lowercase(), inner);
            }
        }
        Value::Array(seq) => {
            for item in seq.iter_mut() {
                insensitivise(item);
            }
        }
        _ => {}
    }
}

/// Convert a YAML value to a JSON value, stringifying non-string map keys.
///
/// YAML permits booleans and numbers as map keys; the resolver only consumes
/// string-keyed maps, so such keys take their display form. Keys that have
/// no scalar form (sequences, maps) are dropped.
pub fn yaml_to_json(value: serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64().map(Value::from).unwrap_or(Value::Null)
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(seq) => {
            Value::Array(seq.into_iter().map(yaml_to_json).collect())
        }
        serde_yaml::Value::Mapping(mapping) => {
            let mut out = Map::new();
            for (k, v) in mapping {
                let Some(key) = yaml_key_to_string(&k) else {
                    continue;
                };
                out.insert(key, yaml_to_json(v));
            }
            Value::Object(out)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn yaml_key_to_string(key: &serde_yaml::Value) -> Option<String> {
    match key {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn test_maps_recurse_sequences_replace() {
        let mut dest = map(json!({
            "hello": {
                "pop": 37890,
                "world": ["us", "uk", "fr", "de"]
            }
        }));
        let src = map(json!({
            "hello": {
                "pop": 45000,
                "universe": ["mw", "ad"]
            },
            "fu": "bar"
        }));

        deep_merge(&mut dest, &src);

        assert_eq!(dest["hello"]["pop"], json!(45000));
        // Untouched sibling survives the merge.
        assert_eq!(dest["hello"]["world"].as_array().unwrap().len(), 4);
        assert_eq!(dest["hello"]["universe"].as_array().unwrap().len(), 2);
        assert_eq!(dest["fu"], json!("bar"));
    }

    #[test]
    fn test_sequence_replaces_sequence_entirely() {
        let mut dest = map(json!({"items": [1, 2, 3]}));
        let src = map(json!({"items": [4, 5]}));
        deep_merge(&mut dest, &src);
        assert_eq!(dest["items"], json!([4, 5]));
    }

    #[test]
    fn test_scalar_replaces_map() {
        let mut dest = map(json!({"value": {"nested": true}}));
        let src = map(json!({"value": 42}));
        deep_merge(&mut dest, &src);
        assert_eq!(dest["value"], json!(42));
    }

    #[test]
    fn test_map_replaces_scalar() {
        let mut dest = map(json!({"value": 42}));
        let src = map(json!({"value": {"nested": true}}));
        deep_merge(&mut dest, &src);
        assert_eq!(dest["value"], json!({"nested": true}));
    }

    #[test]
    fn test_absent_key_is_inserted() {
        let mut dest = map(json!({"a": 1}));
        let src = map(json!({"b": {"c": 2}}));
        deep_merge(&mut dest, &src);
        assert_eq!(dest["a"], json!(1));
        assert_eq!(dest["b"]["c"], json!(2));
    }

    #[test]
    fn test_source_is_not_mutated() {
        let mut dest = map(json!({"a": {"x": 1}}));
        let src = map(json!({"a": {"y": 2}}));
        let src_before = src.clone();
        deep_merge(&mut dest, &src);
        assert_eq!(src, src_before);
    }

    #[test]
    fn test_insensitivise_lowercases_all_levels() {
        let mut v = json!({
            "aBcD": 1,
            "eF": {"gH": 2, "Lm": {"nO": 4}},
            "list": [{"Inner": true}]
        });
        insensitivise(&mut v);
        assert_eq!(
            v,
            json!({
                "abcd": 1,
                "ef": {"gh": 2, "lm": {"no": 4}},
                "list": [{"inner": true}]
            })
        );
    }

    #[test]
    fn test_yaml_non_string_keys_stringified() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("true: 1\n12: dozen\nname: steve").unwrap();
        let json = yaml_to_json(yaml);
        assert_eq!(json["true"], json!(1));
        assert_eq!(json["12"], json!("dozen"));
        assert_eq!(json["name"], json!("steve"));
    }
}
