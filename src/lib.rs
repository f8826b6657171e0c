//! Layered configuration resolver.
//!
//! Values are looked up by case-insensitive dotted key across a fixed
//! precedence chain: explicit overrides, command-line flags, environment
//! variables, the config file, an external key-value snapshot, and
//! registered defaults. Aliases, deep merging, and data-loss-tolerant type
//! coercion round out the surface.

pub mod alias;
pub mod coerce;
pub mod decode;
pub mod env;
pub mod error;
pub mod files;
pub mod flags;
pub mod format;
pub mod global;
pub mod key;
pub mod merge;
pub mod settings;
pub mod tree;

pub use error::{ConfigError, ConfigResult};
pub use flags::{ClapFlag, FlagValue, StaticFlag};
pub use format::Format;
pub use key::KeyReplacer;
pub use merge::deep_merge;
pub use settings::Settings;
