// src/package/file.rs

//! Installed files and the sets that own them
//!
//! Every installed file is owned by exactly one [`FileSet`] at a time: the
//! unassigned pool of a ventilation run, the ignored set, or one binary
//! package. Moving a file is a `remove` from one set and an `insert` into
//! another, so a file can never be counted twice.

use crate::error::Result;
use crate::introspect::{BinaryInfo, Introspector};
use serde::{Serialize, Serializer};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;
use walkdir::WalkDir;

/// A file produced by the build, relative to the install prefix
///
/// Binary metadata is computed on first use and then never changes.
#[derive(Debug, Clone)]
pub struct InstallFile {
    path: String,
    binary: OnceLock<Option<BinaryInfo>>,
}

impl InstallFile {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            binary: OnceLock::new(),
        }
    }

    /// Create a file whose binary metadata is already known
    pub fn with_binary_info(path: impl Into<String>, info: Option<BinaryInfo>) -> Self {
        let file = Self::new(path);
        let _ = file.binary.set(info);
        file
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Binary metadata, introspecting the file on first call
    pub fn binary_info(&self, introspector: &dyn Introspector) -> Option<&BinaryInfo> {
        self.binary
            .get_or_init(|| introspector.inspect(&self.path))
            .as_ref()
    }

    /// Binary metadata if it was already computed
    pub fn cached_binary_info(&self) -> Option<&BinaryInfo> {
        self.binary.get().and_then(Option::as_ref)
    }

    /// SONAME of the file, if it is a shared library
    pub fn soname(&self, introspector: &dyn Introspector) -> Option<&str> {
        self.binary_info(introspector)
            .and_then(|info| info.soname.as_deref())
    }
}

impl Serialize for InstallFile {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.path)
    }
}

/// A set of installed files keyed by path
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct FileSet {
    files: BTreeMap<String, InstallFile>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from relative paths
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        paths.into_iter().map(|p| InstallFile::new(p)).collect()
    }

    /// Add a file; returns false if a file with the same path was already there
    pub fn insert(&mut self, file: InstallFile) -> bool {
        match self.files.entry(file.path.clone()) {
            btree_map::Entry::Occupied(_) => false,
            btree_map::Entry::Vacant(slot) => {
                slot.insert(file);
                true
            }
        }
    }

    /// Take a file out of the set
    pub fn remove(&mut self, path: &str) -> Option<InstallFile> {
        self.files.remove(path)
    }

    /// Move every file whose path matches the predicate into a new set
    pub fn take_matching<F>(&mut self, mut predicate: F) -> FileSet
    where
        F: FnMut(&str) -> bool,
    {
        let matching: Vec<String> = self
            .files
            .keys()
            .filter(|path| predicate(path))
            .cloned()
            .collect();

        let mut taken = FileSet::new();
        for path in matching {
            if let Some(file) = self.files.remove(&path) {
                taken.insert(file);
            }
        }
        taken
    }

    /// Move all files of `other` into this set
    pub fn append(&mut self, other: FileSet) {
        for file in other.files.into_values() {
            self.insert(file);
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn get(&self, path: &str) -> Option<&InstallFile> {
        self.files.get(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Paths in sorted order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Files in path order
    pub fn iter(&self) -> impl Iterator<Item = &InstallFile> {
        self.files.values()
    }

    /// Underlying map, for parallel iteration
    pub fn as_map(&self) -> &BTreeMap<String, InstallFile> {
        &self.files
    }
}

impl FromIterator<InstallFile> for FileSet {
    fn from_iter<T: IntoIterator<Item = InstallFile>>(iter: T) -> Self {
        let mut set = FileSet::new();
        for file in iter {
            set.insert(file);
        }
        set
    }
}

impl IntoIterator for FileSet {
    type Item = InstallFile;
    type IntoIter = btree_map::IntoValues<String, InstallFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_values()
    }
}

/// List the files installed under `install_dir`
///
/// Paths are relative to `install_dir` with `/` separators. Directories are
/// left out; symlinks are kept as files (not followed).
pub fn scan_install_tree(install_dir: &Path) -> Result<FileSet> {
    let mut files = FileSet::new();

    for entry in WalkDir::new(install_dir).follow_links(false) {
        let entry = entry.map_err(|e| {
            std::io::Error::other(format!(
                "failed to walk {}: {}",
                install_dir.display(),
                e
            ))
        })?;
        if entry.file_type().is_dir() {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(install_dir) else {
            continue;
        };
        let path = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.insert(InstallFile::new(path));
    }

    debug!("Found {} installed files under {}", files.len(), install_dir.display());
    Ok(files)
}
