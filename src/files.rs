//! Config-file discovery on a search path.
//!
//! A file can be named explicitly, or discovered as the first
//! `<path>/<name>.<ext>` that exists over the registered search paths and
//! supported extensions. A miss is the informational
//! [`ConfigError::NotFound`]; callers may ignore it and run on defaults.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::format::{Format, SUPPORTED_EXTENSIONS};

/// Discovery state: explicit file, base name, forced format, search paths.
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    config_name: String,
    config_type: Option<Format>,
    config_file: Option<PathBuf>,
    search_paths: Vec<PathBuf>,
}

impl Default for FileDiscovery {
    fn default() -> Self {
        Self {
            config_name: "config".to_string(),
            config_type: None,
            config_file: None,
            search_paths: Vec::new(),
        }
    }
}

impl FileDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use this exact file, bypassing the search path.
    pub fn set_config_file(&mut self, path: impl Into<PathBuf>) {
        self.config_file = Some(path.into());
    }

    /// Set the base name (no extension) to search for.
    ///
    /// Clears any previously set explicit file, so the next load searches
    /// again.
    pub fn set_config_name(&mut self, name: &str) {
        self.config_name = name.to_string();
        self.config_file = None;
    }

    /// Force the document format instead of inferring it from the file
    /// extension.
    pub fn set_config_type(&mut self, format: Format) {
        self.config_type = Some(format);
    }

    /// Append a directory to the search path. `~` expands to the home
    /// directory.
    pub fn add_config_path(&mut self, path: impl AsRef<Path>) {
        self.search_paths.push(expand_tilde(path.as_ref()));
    }

    pub fn config_type(&self) -> Option<Format> {
        self.config_type
    }

    /// The file the next load will use: the explicit file if one is set,
    /// otherwise the first hit on the search path.
    pub fn find(&self) -> ConfigResult<PathBuf> {
        if let Some(ref file) = self.config_file {
            return Ok(file.clone());
        }

        for dir in &self.search_paths {
            if let Some(found) = self.search_in(dir) {
                debug!(path = %found.display(), "found configuration file");
                return Ok(found);
            }
        }

        Err(ConfigError::not_found(
            &self.config_name,
            self.search_paths.clone(),
        ))
    }

    /// The format to decode a discovered file with: the forced type when
    /// set, otherwise inferred from the extension.
    pub fn format_for(&self, path: &Path) -> ConfigResult<Format> {
        if let Some(format) = self.config_type {
            return Ok(format);
        }
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        Format::from_extension(ext).ok_or_else(|| ConfigError::UnsupportedFormat(ext.to_string()))
    }

    fn search_in(&self, dir: &Path) -> Option<PathBuf> {
        for ext in SUPPORTED_EXTENSIONS {
            let candidate = dir.join(format!("{}.{ext}", self.config_name));
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        // With a forced type the file may carry no extension at all.
        if self.config_type.is_some() {
            let candidate = dir.join(&self.config_name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        None
    }
}

fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    path.to_path_buf()
}
