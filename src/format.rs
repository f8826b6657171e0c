//! Decoding configuration documents into generic nested maps.
//!
//! The resolver core only consumes a tree of lowercased, string-keyed maps,
//! sequences, and scalars; this module is the bridge from raw bytes in a
//! concrete format to that shape.

use serde_json::{Map, Value};

use crate::error::{ConfigError, ConfigResult};
use crate::merge;

/// A configuration document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
    Toml,
}

/// File extensions recognized during config-file discovery, in search order.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["yaml", "yml", "json", "toml"];

impl Format {
    /// Detect a format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }

    /// Parse a format name as supplied by `set_config_type`.
    pub fn from_name(name: &str) -> ConfigResult<Self> {
        Self::from_extension(name).ok_or_else(|| ConfigError::UnsupportedFormat(name.to_string()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
            Self::Toml => "toml",
        }
    }

    /// Decode a document into a normalized nested map.
    ///
    /// Map keys are lowercased at every level and non-string keys are
    /// stringified, so the result is directly usable by the merge and
    /// navigation layers.
    pub fn decode(&self, bytes: &[u8]) -> ConfigResult<Map<String, Value>> {
        let value = match self {
            Self::Yaml => {
                let yaml: serde_yaml::Value = serde_yaml::from_slice(bytes)
                    .map_err(|e| ConfigError::decode("yaml", e))?;
                merge::yaml_to_json(yaml)
            }
            Self::Json => {
                serde_json::from_slice(bytes).map_err(|e| ConfigError::decode("json", e))?
            }
            Self::Toml => {
                let text = std::str::from_utf8(bytes)
                    .map_err(|e| ConfigError::decode("toml", e))?;
                let parsed: toml::Value =
                    toml::from_str(text).map_err(|e| ConfigError::decode("toml", e))?;
                serde_json::to_value(parsed).map_err(|e| ConfigError::decode("toml", e))?
            }
        };

        let mut value = value;
        merge::insensitivise(&mut value);
        match value {
            Value::Object(map) => Ok(map),
            Value::Null => Ok(Map::new()),
            _ => Err(ConfigError::decode(
                self.name(),
                "top-level value must be a mapping",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_extension() {
        assert_eq!(Format::from_extension("yml"), Some(Format::Yaml));
        assert_eq!(Format::from_extension("JSON"), Some(Format::Json));
        assert_eq!(Format::from_extension("toml"), Some(Format::Toml));
        assert_eq!(Format::from_extension("ini"), None);
    }

    #[test]
    fn test_from_name_unsupported() {
        let err = Format::from_name("properties").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_decode_yaml_lowercases_keys() {
        let doc = b"Hacker: true\nClothing:\n  Jacket: leather\n";
        let map = Format::Yaml.decode(doc).unwrap();
        assert_eq!(map["hacker"], json!(true));
        assert_eq!(map["clothing"]["jacket"], json!("leather"));
    }

    #[test]
    fn test_decode_json() {
        let doc = br#"{"Server": {"Port": 8080}}"#;
        let map = Format::Json.decode(doc).unwrap();
        assert_eq!(map["server"]["port"], json!(8080));
    }

    #[test]
    fn test_decode_toml() {
        let doc = b"[Server]\nPort = 8080\nname = \"app\"\n";
        let map = Format::Toml.decode(doc).unwrap();
        assert_eq!(map["server"]["port"], json!(8080));
        assert_eq!(map["server"]["name"], json!("app"));
    }

    #[test]
    fn test_decode_malformed_yaml() {
        let err = Format::Yaml.decode(b"foo: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::Decode { .. }));
    }

    #[test]
    fn test_decode_empty_yaml_is_empty_map() {
        let map = Format::Yaml.decode(b"").unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_decode_scalar_document_rejected() {
        let err = Format::Yaml.decode(b"just a string").unwrap_err();
        assert!(matches!(err, ConfigError::Decode { .. }));
    }
}
