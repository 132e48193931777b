// src/package/binary.rs

//! Binary packages emitted from a source package

use super::file::{FileSet, InstallFile};
use crate::classify::FileCategory;
use crate::version::{VersionConflict, VersionRange};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// How a binary package came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageKind {
    /// Declared by a section of the specfile
    Custom,
    /// Created around a shared library SONAME
    Library,
    /// One of the reserved default packages
    Default(FileCategory),
}

impl PackageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Custom => "custom",
            Self::Library => "library",
            Self::Default(_) => "default",
        }
    }
}

impl std::fmt::Display for PackageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default(category) => write!(f, "default ({})", category),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

/// Where a dependency comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyOrigin {
    /// Written in the specfile
    Explicit,
    /// A sibling package of the same source package
    Internal,
    /// A system package found by the external lookup
    External,
}

/// A resolved dependency of a binary package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    pub origin: DependencyOrigin,
    pub range: VersionRange,
}

impl Dependency {
    pub fn new(origin: DependencyOrigin, range: VersionRange) -> Self {
        Self { origin, range }
    }
}

/// A binary package and everything known about it
#[derive(Debug, Clone)]
pub struct BinaryPackage {
    pub name: String,
    pub kind: PackageKind,
    /// Name of the owning source package
    pub source: String,
    pub version: String,
    pub description: String,
    files: FileSet,
    /// SONAME → exported symbols, for every library this package ships
    pub provides: BTreeMap<String, BTreeSet<String>>,
    pub depends: BTreeMap<String, Dependency>,
    /// System package names for the active distribution
    pub sysdepends: Vec<String>,
}

impl BinaryPackage {
    pub fn new(
        name: impl Into<String>,
        kind: PackageKind,
        source: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            source: source.into(),
            version: version.into(),
            description: String::new(),
            files: FileSet::new(),
            provides: BTreeMap::new(),
            depends: BTreeMap::new(),
            sysdepends: Vec::new(),
        }
    }

    pub fn files(&self) -> &FileSet {
        &self.files
    }

    /// Take ownership of a file
    pub fn add_file(&mut self, file: InstallFile) -> bool {
        self.files.insert(file)
    }

    /// Take ownership of a whole set of files
    pub fn add_files(&mut self, files: FileSet) {
        self.files.append(files);
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Record a library shipped by this package
    pub fn add_provides<I>(&mut self, soname: impl Into<String>, symbols: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.provides.entry(soname.into()).or_default().extend(symbols);
    }

    /// Add an explicit requirement, tightening any previous one for the same name
    pub fn require(
        &mut self,
        name: impl Into<String>,
        range: VersionRange,
    ) -> std::result::Result<(), VersionConflict> {
        let name = name.into();
        match self.depends.get_mut(&name) {
            Some(existing) => {
                existing.range = existing.range.intersect(&range)?;
                existing.origin = DependencyOrigin::Explicit;
            }
            None => {
                self.depends
                    .insert(name, Dependency::new(DependencyOrigin::Explicit, range));
            }
        }
        Ok(())
    }

    /// Record a discovered dependency unless the name is already known
    ///
    /// Returns true if the dependency was added. Existing entries (explicit
    /// clauses in particular) are left untouched.
    pub fn record_dependency(&mut self, name: &str, origin: DependencyOrigin) -> bool {
        if name == self.name || self.depends.contains_key(name) {
            return false;
        }
        self.depends.insert(
            name.to_string(),
            Dependency::new(origin, VersionRange::any()),
        );
        true
    }

    /// Add a system dependency once
    pub fn add_sysdepend(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.sysdepends.contains(&name) {
            self.sysdepends.push(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::Version;

    fn package() -> BinaryPackage {
        BinaryPackage::new("foo", PackageKind::Default(FileCategory::Main), "foo", "1.0")
    }

    #[test]
    fn test_require_merges_by_intersection() {
        let mut pkg = package();
        pkg.require("libbar", VersionRange::at_least(Version::Release("1.0".into())))
            .unwrap();
        pkg.require("libbar", VersionRange::from_pair("any", "2.0").unwrap())
            .unwrap();

        assert_eq!(
            pkg.depends["libbar"].range,
            VersionRange::from_pair("1.0", "2.0").unwrap()
        );
    }

    #[test]
    fn test_require_conflict() {
        let mut pkg = package();
        pkg.require("libbar", VersionRange::at_least(Version::Release("2.0".into())))
            .unwrap();
        let err = pkg
            .require("libbar", VersionRange::from_pair("any", "1.0").unwrap())
            .unwrap_err();
        assert_eq!(err.left.min, Version::Release("2.0".into()));
    }

    #[test]
    fn test_record_dependency_is_idempotent() {
        let mut pkg = package();
        assert!(pkg.record_dependency("libfoo1", DependencyOrigin::Internal));
        assert!(!pkg.record_dependency("libfoo1", DependencyOrigin::Internal));
        assert!(!pkg.record_dependency("libfoo1", DependencyOrigin::External));
        assert_eq!(pkg.depends.len(), 1);
        assert_eq!(pkg.depends["libfoo1"].origin, DependencyOrigin::Internal);
    }

    #[test]
    fn test_record_dependency_keeps_explicit_clause() {
        let mut pkg = package();
        let range = VersionRange::from_pair("1.0", "2.0").unwrap();
        pkg.require("libbar", range.clone()).unwrap();

        assert!(!pkg.record_dependency("libbar", DependencyOrigin::External));
        assert_eq!(pkg.depends["libbar"].range, range);
        assert_eq!(pkg.depends["libbar"].origin, DependencyOrigin::Explicit);
    }

    #[test]
    fn test_no_dependency_on_self() {
        let mut pkg = package();
        assert!(!pkg.record_dependency("foo", DependencyOrigin::Internal));
        assert!(pkg.depends.is_empty());
    }

    #[test]
    fn test_sysdepends_deduplicated() {
        let mut pkg = package();
        pkg.add_sysdepend("libssl3");
        pkg.add_sysdepend("libssl3");
        assert_eq!(pkg.sysdepends, vec!["libssl3".to_string()]);
    }
}
