// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Mutex;
use tempfile::TempDir;
use ventilo::lookup::{DependencyLookup, LookupError, LookupMatch};
use ventilo::{BinaryInfo, Introspector};

/// Introspector answering from a fixed table of paths
#[derive(Default)]
pub struct TableIntrospector {
    entries: HashMap<String, BinaryInfo>,
}

impl TableIntrospector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: &str, info: BinaryInfo) -> Self {
        self.entries.insert(path.to_string(), info);
        self
    }
}

impl Introspector for TableIntrospector {
    fn inspect(&self, path: &str) -> Option<BinaryInfo> {
        self.entries.get(path).cloned()
    }
}

/// Lookup answering from a fixed table of libraries, recording every call
#[derive(Default)]
pub struct RecordingLookup {
    providers: HashMap<String, (String, BTreeSet<String>)>,
    calls: Mutex<Vec<String>>,
}

impl RecordingLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `package` as the provider of `library` exporting `symbols`
    pub fn provide(mut self, library: &str, package: &str, symbols: &[&str]) -> Self {
        self.providers.insert(
            library.to_string(),
            (
                package.to_string(),
                symbols.iter().map(|s| s.to_string()).collect(),
            ),
        );
        self
    }

    /// Libraries looked up so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl DependencyLookup for RecordingLookup {
    fn lookup(
        &self,
        library: &str,
        symbols: &BTreeSet<String>,
    ) -> Result<LookupMatch, LookupError> {
        self.calls.lock().unwrap().push(library.to_string());
        let (package, exports) = self
            .providers
            .get(library)
            .ok_or_else(|| LookupError::NotFound(library.to_string()))?;
        Ok(LookupMatch {
            package: package.clone(),
            satisfied: symbols.intersection(exports).cloned().collect(),
        })
    }
}

/// Create an install tree with the given files (empty content)
///
/// Returns the TempDir - keep it alive to prevent cleanup.
pub fn install_tree(paths: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for path in paths {
        write_file(dir.path(), path, b"");
    }
    dir
}

/// Write a file under `root`, creating parent directories
pub fn write_file(root: &Path, path: &str, content: &[u8]) {
    let full = root.join(path);
    if let Some(parent) = full.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(full, content).unwrap();
}

/// Write a specfile into `dir` and return its path
pub fn write_spec(dir: &Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("ventilo.yaml");
    std::fs::write(&path, content).unwrap();
    path
}
