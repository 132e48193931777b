// src/config.rs

//! Packager configuration
//!
//! Read from TOML, by default `$XDG_CONFIG_HOME/ventilo/config.toml`:
//!
//! ```toml
//! target_dist = "debian"
//! install_prefix = "usr"
//! lookup_workers = 8
//! library_search_dirs = ["/lib/x86_64-linux-gnu", "/usr/lib/x86_64-linux-gnu"]
//! ```
//!
//! Every key is optional. Missing search directories default to the usual
//! locations of the target distribution.

use crate::error::{Error, Result};
use crate::resolve::DEFAULT_WORKERS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Distribution used when none is configured
pub const DEFAULT_DIST: &str = "debian";

/// Configuration of a packaging run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Distribution whose `sysdepends-<dist>` entries and package manager are used
    pub target_dist: String,
    /// Prefix of the installed files under the install root
    pub install_prefix: Option<PathBuf>,
    /// Number of packages resolved concurrently
    pub lookup_workers: usize,
    /// Directories searched for needed system libraries
    pub library_search_dirs: Vec<PathBuf>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            target_dist: DEFAULT_DIST.to_string(),
            install_prefix: None,
            lookup_workers: DEFAULT_WORKERS,
            library_search_dirs: Vec::new(),
        }
    }
}

impl BuildConfig {
    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Load from `path`, else from the user config file, else defaults
    ///
    /// An explicit path must exist; the user config file is optional.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match Self::user_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// `$XDG_CONFIG_HOME/ventilo/config.toml`
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ventilo").join("config.toml"))
    }

    /// Set the target distribution
    pub fn with_dist(mut self, dist: impl Into<String>) -> Self {
        self.target_dist = dist.into();
        self
    }

    /// Set the install prefix
    pub fn with_install_prefix(mut self, prefix: PathBuf) -> Self {
        self.install_prefix = Some(prefix);
        self
    }

    /// Set the number of lookup workers
    pub fn with_lookup_workers(mut self, workers: usize) -> Self {
        self.lookup_workers = workers;
        self
    }

    /// Add a library search directory
    pub fn with_search_dir(mut self, dir: PathBuf) -> Self {
        self.library_search_dirs.push(dir);
        self
    }

    /// Directory holding the installed files under `install_root`
    pub fn install_dir(&self, install_root: &Path) -> PathBuf {
        match &self.install_prefix {
            Some(prefix) => install_root.join(prefix.strip_prefix("/").unwrap_or(prefix)),
            None => install_root.to_path_buf(),
        }
    }

    /// Configured search directories, or the defaults of the target distribution
    pub fn search_dirs(&self) -> Vec<PathBuf> {
        if !self.library_search_dirs.is_empty() {
            return self.library_search_dirs.clone();
        }
        default_search_dirs(&self.target_dist)
            .iter()
            .map(PathBuf::from)
            .collect()
    }

    fn validate(&self) -> Result<()> {
        if self.target_dist.trim().is_empty() {
            return Err(Error::ConfigError("target_dist must not be empty".to_string()));
        }
        if self.lookup_workers == 0 {
            return Err(Error::ConfigError(
                "lookup_workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where a distribution keeps its shared libraries
pub fn default_search_dirs(dist: &str) -> &'static [&'static str] {
    match dist {
        "windows" => &["/mingw64/bin", "/ucrt64/bin", "/usr/bin"],
        _ => &[
            "/lib/x86_64-linux-gnu",
            "/usr/lib/x86_64-linux-gnu",
            "/lib/aarch64-linux-gnu",
            "/usr/lib/aarch64-linux-gnu",
            "/lib64",
            "/usr/lib64",
            "/lib",
            "/usr/lib",
        ],
    }
}
