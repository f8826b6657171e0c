//! Key normalization and environment-name synthesis.
//!
//! Every key entering the resolver passes through [`normalize`] before any
//! tree is touched, so lookups never depend on the casing callers used.
//! Pure string manipulation, no I/O.

/// The delimiter separating segments of a key path.
pub const KEY_DELIMITER: char = '.';

/// Canonicalize a dotted key path to its case-insensitive form.
///
/// Lower-cases every character of every segment. Always succeeds, including
/// for the empty string.
pub fn normalize(key: &str) -> String {
    key.to_lowercase()
}

/// Split a normalized key into its path segments.
pub fn split(key: &str) -> Vec<&str> {
    key.split(KEY_DELIMITER).collect()
}

/// Ordered character-substitution rule applied to keys before an environment
/// variable name is synthesized from them.
///
/// Explicitly supplied environment names are never passed through a replacer;
/// only synthesized ones are. A typical replacer turns `-` and `.` into `_`
/// so `refresh-interval` binds to `REFRESH_INTERVAL`.
#[derive(Debug, Clone, Default)]
pub struct KeyReplacer {
    pairs: Vec<(String, String)>,
}

impl KeyReplacer {
    /// Build a replacer from `(from, to)` pairs, applied in order.
    pub fn new<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(from, to)| (from.into(), to.into()))
                .collect(),
        }
    }

    /// Apply every substitution pair to `input`, in order.
    pub fn replace(&self, input: &str) -> String {
        let mut out = input.to_string();
        for (from, to) in &self.pairs {
            out = out.replace(from.as_str(), to);
        }
        out
    }
}

/// Synthesize an environment variable name from a key.
///
/// The key goes through the replacer (if any), is upper-cased, and gains the
/// upper-cased prefix with a `_` separator when a prefix is configured.
pub fn env_name(key: &str, prefix: &str, replacer: Option<&KeyReplacer>) -> String {
    let replaced = match replacer {
        Some(r) => r.replace(key),
        None => key.to_string(),
    };
    let upper = replaced.to_uppercase();
    if prefix.is_empty() {
        upper
    } else {
        format!("{}_{}", prefix.to_uppercase(), upper)
    }
}
