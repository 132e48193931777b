// src/lookup/mod.rs

//! External dependency lookup
//!
//! When a binary needs a library no sibling package provides, the resolver
//! asks a [`DependencyLookup`] which system package ships it and which of the
//! pending symbols that package satisfies.
//!
//! The system implementations locate the library in the configured search
//! directories, ask the distribution's package manager who owns it, and
//! introspect the located file for its exported symbols:
//!
//! | Distribution | Lookup | Owner query |
//! |--------------|--------|-------------|
//! | `debian` | [`DpkgLookup`] | `dpkg -S <path>` |
//! | `windows` | [`PacmanLookup`] | `pacman -Qo <path>` |

mod dpkg;
mod pacman;

pub use dpkg::{DpkgLookup, DpkgQuery};
pub use pacman::{PacmanLookup, PacmanQuery};

use crate::introspect::inspect_file;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

/// A system package providing a needed library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupMatch {
    pub package: String,
    /// Subset of the requested symbols the package exports
    pub satisfied: BTreeSet<String>,
}

/// Failure to find a provider for a library
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// No installed package provides the library
    #[error("no system package provides {0}")]
    NotFound(String),

    /// The package manager could not be queried
    #[error("failed to run {tool}: {reason}")]
    CommandFailed { tool: &'static str, reason: String },
}

/// Finds the system package providing a library
pub trait DependencyLookup: Send + Sync {
    /// Find the package providing `library` and the `symbols` it satisfies
    fn lookup(
        &self,
        library: &str,
        symbols: &BTreeSet<String>,
    ) -> std::result::Result<LookupMatch, LookupError>;
}

/// Lookup that never finds anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLookup;

impl DependencyLookup for NoLookup {
    fn lookup(
        &self,
        library: &str,
        _symbols: &BTreeSet<String>,
    ) -> std::result::Result<LookupMatch, LookupError> {
        Err(LookupError::NotFound(library.to_string()))
    }
}

/// Package manager query naming the owner of an installed file
pub trait OwnerQuery: Send + Sync {
    /// Name of the command, for error messages
    fn tool(&self) -> &'static str;

    /// Package owning `path`, `None` if no package does
    fn query_owner(&self, path: &Path) -> std::result::Result<Option<String>, LookupError>;
}

/// What we learned about a library on the host
#[derive(Debug, Clone)]
struct Provider {
    package: String,
    exports: BTreeSet<String>,
}

/// Lookup backed by the host package manager
///
/// Results are cached per library name for the lifetime of the lookup.
pub struct SystemLookup<Q> {
    query: Q,
    search_dirs: Vec<PathBuf>,
    cache: Mutex<HashMap<String, std::result::Result<Provider, LookupError>>>,
}

impl<Q: OwnerQuery> SystemLookup<Q> {
    pub fn new(query: Q, search_dirs: Vec<PathBuf>) -> Self {
        Self {
            query,
            search_dirs,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    fn find_provider(&self, library: &str) -> std::result::Result<Provider, LookupError> {
        let path = locate_library(&self.search_dirs, library)
            .ok_or_else(|| LookupError::NotFound(library.to_string()))?;

        let mut owner = self.query.query_owner(&path)?;
        // Merged /usr systems register some files under their canonical path only
        if owner.is_none()
            && let Ok(canonical) = std::fs::canonicalize(&path)
            && canonical != path
        {
            owner = self.query.query_owner(&canonical)?;
        }
        let package = owner.ok_or_else(|| LookupError::NotFound(library.to_string()))?;

        let exports = inspect_file(&path)
            .map(|info| info.exports)
            .unwrap_or_default();
        debug!(
            "{} is provided by {} ({} exported symbols)",
            library,
            package,
            exports.len()
        );
        Ok(Provider { package, exports })
    }

    fn cached_provider(&self, library: &str) -> std::result::Result<Provider, LookupError> {
        if let Ok(cache) = self.cache.lock()
            && let Some(hit) = cache.get(library)
        {
            return hit.clone();
        }

        let result = self.find_provider(library);
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(library.to_string(), result.clone());
        }
        result
    }
}

impl<Q: OwnerQuery> DependencyLookup for SystemLookup<Q> {
    fn lookup(
        &self,
        library: &str,
        symbols: &BTreeSet<String>,
    ) -> std::result::Result<LookupMatch, LookupError> {
        let provider = self.cached_provider(library)?;
        let satisfied = symbols.intersection(&provider.exports).cloned().collect();
        Ok(LookupMatch {
            package: provider.package,
            satisfied,
        })
    }
}

/// First existing `<dir>/<library>` among the search directories
pub fn locate_library(search_dirs: &[PathBuf], library: &str) -> Option<PathBuf> {
    search_dirs
        .iter()
        .map(|dir| dir.join(library))
        .find(|candidate| candidate.exists())
}

/// Pick the lookup for a distribution
///
/// Falls back to [`NoLookup`] when the distribution is unknown or its
/// package manager is not installed.
pub fn system_lookup(dist: &str, search_dirs: Vec<PathBuf>) -> Box<dyn DependencyLookup> {
    match dist {
        "debian" if dpkg::is_dpkg_available() => {
            Box::new(DpkgLookup::new(DpkgQuery, search_dirs))
        }
        "windows" if pacman::is_pacman_available() => {
            Box::new(PacmanLookup::new(PacmanQuery, search_dirs))
        }
        other => {
            warn!(
                "No package manager lookup available for '{}', external dependencies will not be resolved",
                other
            );
            Box::new(NoLookup)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedOwner {
        owner: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl OwnerQuery for FixedOwner {
        fn tool(&self) -> &'static str {
            "fixed"
        }

        fn query_owner(&self, _path: &Path) -> std::result::Result<Option<String>, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.owner.map(str::to_string))
        }
    }

    fn symbols(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_lookup_never_finds() {
        let err = NoLookup.lookup("libc.so.6", &symbols(&["printf"])).unwrap_err();
        assert_eq!(err, LookupError::NotFound("libc.so.6".to_string()));
    }

    #[test]
    fn test_locate_library_in_search_dirs() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        std::fs::write(second.path().join("libbar.so.2"), b"").unwrap();

        let dirs = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        assert_eq!(
            locate_library(&dirs, "libbar.so.2"),
            Some(second.path().join("libbar.so.2"))
        );
        assert_eq!(locate_library(&dirs, "libmissing.so.1"), None);
    }

    #[test]
    fn test_system_lookup_missing_library() {
        let dir = tempfile::tempdir().unwrap();
        let lookup = SystemLookup::new(
            FixedOwner { owner: Some("libbar2"), calls: AtomicUsize::new(0) },
            vec![dir.path().to_path_buf()],
        );

        let err = lookup.lookup("libbar.so.2", &symbols(&["bar"])).unwrap_err();
        assert!(matches!(err, LookupError::NotFound(_)));
        assert_eq!(lookup.query.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_system_lookup_names_owner_and_caches() {
        let dir = tempfile::tempdir().unwrap();
        // Not a real ELF file: the owner is found but nothing is satisfied
        std::fs::write(dir.path().join("libbar.so.2"), b"not a binary").unwrap();
        let lookup = SystemLookup::new(
            FixedOwner { owner: Some("libbar2"), calls: AtomicUsize::new(0) },
            vec![dir.path().to_path_buf()],
        );

        let found = lookup.lookup("libbar.so.2", &symbols(&["bar"])).unwrap();
        assert_eq!(found.package, "libbar2");
        assert!(found.satisfied.is_empty());

        lookup.lookup("libbar.so.2", &symbols(&["baz"])).unwrap();
        assert_eq!(lookup.query.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_system_lookup_unowned_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("libbar.so.2"), b"").unwrap();
        let lookup = SystemLookup::new(
            FixedOwner { owner: None, calls: AtomicUsize::new(0) },
            vec![dir.path().to_path_buf()],
        );

        let err = lookup.lookup("libbar.so.2", &BTreeSet::new()).unwrap_err();
        assert_eq!(err, LookupError::NotFound("libbar.so.2".to_string()));
    }
}
