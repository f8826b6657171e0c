//! Integration tests for the source precedence chain.
//!
//! Exercises the full lookup order end to end:
//! - explicit overrides beat everything
//! - changed flags beat env, config, kv store, and defaults
//! - config beats the kv store and defaults
//! - unchanged flag defaults are the last resort
//! - a scalar in a higher source shadows deeper keys in lower ones

use confstack::flags::StaticFlag;
use confstack::Settings;
use serde_json::{Map, Value, json};

fn yaml_settings(doc: &str) -> Settings {
    let mut s = Settings::new();
    s.set_config_type("yaml").expect("yaml is supported");
    s.read_config(doc.as_bytes()).expect("fixture parses");
    s
}

const CONFIG_YAML: &str = "\
title: config title
owner:
  name: config owner
  dob: 1979-05-27
";

fn kv_snapshot() -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("title".to_string(), json!("kv title"));
    map.insert("backend".to_string(), json!("etcd"));
    map
}

#[test]
fn test_override_beats_all_sources() {
    let mut s = yaml_settings(CONFIG_YAML);
    s.set_kv_store(kv_snapshot());
    s.set_default("title", "default title");
    s.bind_flag("title", StaticFlag::set("flag title"));
    s.set("title", "override title");

    assert_eq!(s.get_string("title"), "override title");
}

#[test]
fn test_changed_flag_beats_config_and_below() {
    let mut s = yaml_settings(CONFIG_YAML);
    s.set_kv_store(kv_snapshot());
    s.set_default("title", "default title");
    s.bind_flag("title", StaticFlag::set("flag title"));

    assert_eq!(s.get_string("title"), "flag title");
}

#[test]
fn test_unchanged_flag_loses_to_config() {
    let mut s = yaml_settings(CONFIG_YAML);
    s.bind_flag("title", StaticFlag::default_value("flag title"));

    assert_eq!(s.get_string("title"), "config title");
}

#[test]
fn test_config_beats_kv_store() {
    let mut s = yaml_settings(CONFIG_YAML);
    s.set_kv_store(kv_snapshot());

    assert_eq!(s.get_string("title"), "config title");
    // Keys only the kv store holds still resolve.
    assert_eq!(s.get_string("backend"), "etcd");
}

#[test]
fn test_kv_store_beats_defaults() {
    let mut s = Settings::new();
    s.set_kv_store(kv_snapshot());
    s.set_default("backend", "consul");

    assert_eq!(s.get_string("backend"), "etcd");
}

#[test]
fn test_flag_default_is_last_resort() {
    let mut s = Settings::new();
    s.bind_flag("workers", StaticFlag::default_value("4"));

    assert_eq!(s.get_i64("workers"), 4);

    s.set_default("workers", 8);
    assert_eq!(s.get_i64("workers"), 8);
}

#[test]
fn test_bound_but_valueless_flag_resolves_nothing() {
    let mut s = Settings::new();
    s.bind_flag("verbose", StaticFlag::unset());

    assert!(!s.is_set("verbose"));
    assert_eq!(s.get("verbose"), None);
}

#[test]
fn test_scalar_shadows_deeper_default() {
    let mut s = Settings::new();
    s.set_default("clothing.jacket.price", 100);
    s.set("clothing.jacket", "leather");

    assert_eq!(s.get_string("clothing.jacket"), "leather");
    assert_eq!(s.get("clothing.jacket.price"), None);
}

#[test]
fn test_map_in_higher_source_does_not_shadow() {
    let mut s = yaml_settings(CONFIG_YAML);
    s.set_default("owner.organization", "ACME");

    // The config holds a map at "owner", so sibling defaults stay visible.
    assert_eq!(s.get_string("owner.name"), "config owner");
    assert_eq!(s.get_string("owner.organization"), "ACME");
}

#[test]
fn test_nested_key_through_each_source() {
    let mut s = yaml_settings(CONFIG_YAML);

    assert_eq!(s.get_string("owner.name"), "config owner");

    s.bind_flag("owner.name", StaticFlag::set("flag owner"));
    assert_eq!(s.get_string("owner.name"), "flag owner");

    s.set("owner.name", "override owner");
    assert_eq!(s.get_string("owner.name"), "override owner");
}

#[test]
fn test_alias_resolves_through_precedence() {
    let mut s = yaml_settings(CONFIG_YAML);
    s.register_alias("heading", "title");

    assert_eq!(s.get_string("heading"), "config title");

    s.set("heading", "override title");
    assert_eq!(s.get_string("title"), "override title");
}

#[test]
fn test_all_settings_reflects_precedence() {
    let mut s = yaml_settings(CONFIG_YAML);
    s.set_kv_store(kv_snapshot());
    s.set_default("retries", 3);
    s.set("title", "override title");

    let snapshot = s.all_settings();
    assert_eq!(snapshot.get("title"), Some(&json!("override title")));
    assert_eq!(snapshot.get("backend"), Some(&json!("etcd")));
    assert_eq!(snapshot.get("retries"), Some(&json!(3)));
    assert!(snapshot.get("owner").is_some());
}
