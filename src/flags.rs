//! Command-line flag bindings.
//!
//! The resolver does not parse flags itself; it only asks a bound flag two
//! things: was it explicitly set by the user, and what is its current string
//! value. Any flag library can participate through [`FlagValue`]; an adapter
//! for clap's `ArgMatches` is provided.

use clap::ArgMatches;
use clap::parser::ValueSource;

/// A handle to one bound command-line flag.
pub trait FlagValue: Send + Sync {
    /// Whether the user set this flag explicitly, as opposed to it sitting
    /// at its default value.
    fn changed(&self) -> bool;

    /// The flag's current string value (explicit or default), if any.
    fn value(&self) -> Option<String>;
}

/// A flag handle holding pre-captured state.
///
/// Useful for tests and for flag libraries without a dedicated adapter.
#[derive(Debug, Clone)]
pub struct StaticFlag {
    value: Option<String>,
    changed: bool,
}

impl StaticFlag {
    /// A flag the user set explicitly.
    pub fn set(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            changed: true,
        }
    }

    /// A flag left at its default value.
    pub fn default_value(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            changed: false,
        }
    }

    /// A flag with no value at all.
    pub fn unset() -> Self {
        Self {
            value: None,
            changed: false,
        }
    }
}

impl FlagValue for StaticFlag {
    fn changed(&self) -> bool {
        self.changed
    }

    fn value(&self) -> Option<String> {
        self.value.clone()
    }
}

/// Flag handle backed by a parsed clap argument.
///
/// Captures the value and its source at bind time, so the resolver holds no
/// borrow of the `ArgMatches`.
#[derive(Debug, Clone)]
pub struct ClapFlag {
    value: Option<String>,
    changed: bool,
}

impl ClapFlag {
    /// Capture the argument `id` from parsed matches.
    ///
    /// Returns `None` when the argument is unknown to the command.
    pub fn from_matches(matches: &ArgMatches, id: &str) -> Option<Self> {
        let raw = matches.try_get_raw(id).ok()?;
        let value = raw
            .and_then(|mut values| values.next())
            .map(|os| os.to_string_lossy().into_owned());
        let changed = matches.value_source(id) == Some(ValueSource::CommandLine);
        Some(Self { value, changed })
    }
}

impl FlagValue for ClapFlag {
    fn changed(&self) -> bool {
        self.changed
    }

    fn value(&self) -> Option<String> {
        self.value.clone()
    }
}
