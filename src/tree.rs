//! Navigation over nested value trees.
//!
//! All trees are `serde_json::Map`s whose keys were lowercased on ingest, so
//! lookups here compare keys directly. Deep keys under a scalar or sequence
//! are simply absent, never an error: a shallower non-map value shadows
//! everything beneath it.

use serde_json::{Map, Value};

use crate::key::KEY_DELIMITER;

/// Descend into `tree` one segment at a time.
///
/// Returns `None` if a segment is missing or an intermediate value is not a
/// map while segments remain.
pub fn search<'a>(tree: &'a Map<String, Value>, parts: &[&str]) -> Option<&'a Value> {
    let (first, rest) = parts.split_first()?;
    let value = tree.get(*first)?;
    if rest.is_empty() {
        return Some(value);
    }
    match value {
        Value::Object(inner) => search(inner, rest),
        _ => None,
    }
}

/// Descend into `tree`, also trying joined path prefixes as literal keys.
///
/// A document may store `clothing.pants` as a single flattened key rather
/// than nested maps. For each recursion level the longest joined prefix is
/// tried first (`a.b.c`, then `a.b` + `c`, then `a` + `b.c`), so both
/// addressing styles resolve to the same stored value.
pub fn search_with_path_prefixes<'a>(
    tree: &'a Map<String, Value>,
    parts: &[&str],
) -> Option<&'a Value> {
    for prefix_len in (1..=parts.len()).rev() {
        let prefix = parts[..prefix_len].join(&KEY_DELIMITER.to_string());
        if let Some(value) = tree.get(&prefix) {
            if prefix_len == parts.len() {
                return Some(value);
            }
            if let Value::Object(inner) = value
                && let Some(found) = search_with_path_prefixes(inner, &parts[prefix_len..])
            {
                return Some(found);
            }
        }
    }
    None
}

/// Insert `value` at the path given by `parts`, creating intermediate maps.
///
/// A non-map intermediate node is overwritten with a fresh map so insertion
/// always succeeds.
pub fn set(tree: &mut Map<String, Value>, parts: &[&str], value: Value) {
    let Some((first, rest)) = parts.split_first() else {
        return;
    };
    if rest.is_empty() {
        tree.insert((*first).to_string(), value);
        return;
    }
    let entry = tree
        .entry((*first).to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    if let Value::Object(inner) = entry {
        set(inner, rest, value);
    }
}

/// Whether a proper prefix of the path resolves to a non-map value in `tree`.
///
/// Such a prefix makes every deeper key under it unreachable for this source
/// and, by precedence, for all lower-precedence sources as well.
pub fn path_shadowed_in_deep_map(parts: &[&str], tree: &Map<String, Value>) -> bool {
    for prefix_len in 1..parts.len() {
        match search(tree, &parts[..prefix_len]) {
            None => return false,
            Some(Value::Object(_)) => continue,
            Some(_) => return true,
        }
    }
    false
}

/// Whether a proper prefix of the path exists as a key in a flat key set.
///
/// Used for sources that are flat tables keyed by whole dotted keys (alias
/// registrations, env bindings, flag bindings).
pub fn path_shadowed_in_flat_keys<'a, I>(parts: &[&str], keys: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    let mut prefixes = Vec::new();
    let mut acc = String::new();
    for part in &parts[..parts.len().saturating_sub(1)] {
        if !acc.is_empty() {
            acc.push(KEY_DELIMITER);
        }
        acc.push_str(part);
        prefixes.push(acc.clone());
    }
    keys.into_iter().any(|k| prefixes.iter().any(|p| p == k))
}

/// Collect every dotted leaf key of a nested tree into `out`.
///
/// Maps recurse with their key appended to the prefix; scalars, sequences,
/// and empty maps are leaves.
pub fn flatten_keys(tree: &Map<String, Value>, prefix: &str, out: &mut Vec<String>) {
    for (k, v) in tree {
        let full = if prefix.is_empty() {
            k.clone()
        } else {
            format!("{prefix}{KEY_DELIMITER}{k}")
        };
        match v {
            Value::Object(inner) if !inner.is_empty() => flatten_keys(inner, &full, out),
            _ => out.push(full),
        }
    }
}
