// src/spec/mod.rs

//! Specfile model
//!
//! A specfile is a YAML mapping of mappings. The `general` section describes
//! the source package; every other top-level key declares a binary package:
//!
//! ```yaml
//! general:
//!   name: foo
//!   version: 1.2.0
//!   maintainer: Jane Doe <jane@example.com>
//!   description: foo does things
//!   build-system: cmake
//!   ignore:
//!     - share/foo/tests/.*
//!
//! foo-extra:
//!   description: extra data for foo
//!   files:
//!     - extra/.*
//!   depends:
//!     - libbar: 1.0            # at least 1.0
//!     - libbaz: [1.0, 2.0]     # explicit range
//!     - python3: any
//!   sysdepends-debian:
//!     - libssl3
//! ```
//!
//! Package sections keep their document order: the custom-package pass of
//! ventilation gives a file to the first section whose patterns match it.

mod build_system;
mod format;

pub use build_system::BuildSystem;

use crate::error::{Error, Result};
use crate::version::VersionRange;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Name of the section describing the source package
pub const GENERAL_SECTION: &str = "general";

/// Key prefix of per-distribution system dependencies
pub const SYSDEPENDS_PREFIX: &str = "sysdepends-";

/// A parsed specfile
#[derive(Debug, Clone)]
pub struct SpecDocument {
    pub general: GeneralSection,
    /// Package sections in document order
    pub packages: Vec<PackageSection>,
}

/// The `general` section
#[derive(Debug, Clone, Default)]
pub struct GeneralSection {
    pub name: String,
    pub version: String,
    pub maintainer: Option<String>,
    pub url: Option<String>,
    pub description: String,
    pub build_options: Option<String>,
    pub build_depends: Vec<String>,
    pub build_system: Option<BuildSystem>,
    /// Patterns of installed files to drop
    pub ignore: Vec<String>,
}

/// A binary package section
#[derive(Debug, Clone, Default)]
pub struct PackageSection {
    pub name: String,
    pub description: Option<String>,
    /// Patterns claiming installed files for this package
    pub files: Vec<String>,
    pub depends: Vec<DependencyClause>,
    /// System dependencies keyed by distribution (`debian`, `windows`, ...)
    pub sysdepends: BTreeMap<String, Vec<String>>,
}

impl PackageSection {
    /// A package without file patterns is a meta-package and may stay empty
    pub fn is_meta(&self) -> bool {
        self.files.is_empty()
    }

    /// System dependencies declared for a distribution
    pub fn sysdepends_for(&self, dist: &str) -> &[String] {
        self.sysdepends.get(dist).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// An explicit dependency on another package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyClause {
    pub name: String,
    pub range: VersionRange,
}

impl DependencyClause {
    pub fn new(name: impl Into<String>, range: VersionRange) -> Self {
        Self {
            name: name.into(),
            range,
        }
    }
}

impl SpecDocument {
    /// Load and validate a specfile from disk
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading specfile: {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate specfile content
    pub fn parse(content: &str) -> Result<Self> {
        let doc = format::parse_document(content)?;
        doc.validate()?;
        Ok(doc)
    }

    /// Look up a package section by name
    pub fn package(&self, name: &str) -> Option<&PackageSection> {
        self.packages.iter().find(|p| p.name == name)
    }

    fn validate(&self) -> Result<()> {
        for pattern in &self.general.ignore {
            compile_pattern(pattern)?;
        }
        for package in &self.packages {
            if package.name.trim().is_empty() {
                return Err(Error::SpecError("package section with an empty name".to_string()));
            }
            for pattern in &package.files {
                compile_pattern(pattern)?;
            }
        }
        Ok(())
    }
}

/// Compile a file pattern
///
/// Patterns match from the start of the path relative to the install
/// prefix, but do not need to consume all of it.
pub fn compile_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{})", pattern)).map_err(|source| Error::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::Version;

    const SPEC: &str = r#"
general:
  name: foo
  version: 1.2.0
  maintainer: Jane Doe <jane@example.com>
  url: https://example.com/foo.git
  description: foo does things
  build-system: cmake
  build-depends:
    - cmake
  ignore:
    - share/foo/tests/.*

foo:
  description: the foo tool

foo-extra:
  description: extra data for foo
  files:
    - extra/.*
  depends:
    - libbar: 1.0
    - libbaz: [1.0, 2.0]
    - python3: any
  sysdepends-debian:
    - libssl3
  sysdepends-windows:
    - mingw-w64-x86_64-openssl
"#;

    #[test]
    fn test_parse_general() {
        let doc = SpecDocument::parse(SPEC).unwrap();
        assert_eq!(doc.general.name, "foo");
        assert_eq!(doc.general.version, "1.2.0");
        assert_eq!(doc.general.build_system, Some(BuildSystem::Cmake));
        assert_eq!(doc.general.build_depends, vec!["cmake".to_string()]);
        assert_eq!(doc.general.ignore, vec!["share/foo/tests/.*".to_string()]);
    }

    #[test]
    fn test_parse_sections_keep_document_order() {
        let doc = SpecDocument::parse(SPEC).unwrap();
        let names: Vec<_> = doc.packages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["foo", "foo-extra"]);
        assert!(doc.package("foo").unwrap().is_meta());
        assert!(!doc.package("foo-extra").unwrap().is_meta());
    }

    #[test]
    fn test_parse_depends_forms() {
        let doc = SpecDocument::parse(SPEC).unwrap();
        let extra = doc.package("foo-extra").unwrap();

        assert_eq!(
            extra.depends,
            vec![
                DependencyClause::new(
                    "libbar",
                    VersionRange::at_least(Version::Release("1.0".to_string()))
                ),
                DependencyClause::new("libbaz", VersionRange::from_pair("1.0", "2.0").unwrap()),
                DependencyClause::new("python3", VersionRange::any()),
            ]
        );
    }

    #[test]
    fn test_parse_sysdepends_by_dist() {
        let doc = SpecDocument::parse(SPEC).unwrap();
        let extra = doc.package("foo-extra").unwrap();
        assert_eq!(extra.sysdepends_for("debian"), ["libssl3".to_string()]);
        assert_eq!(
            extra.sysdepends_for("windows"),
            ["mingw-w64-x86_64-openssl".to_string()]
        );
        assert!(extra.sysdepends_for("fedora").is_empty());
    }

    #[test]
    fn test_missing_name_is_an_error() {
        let err = SpecDocument::parse("general:\n  version: 1.0\n").unwrap_err();
        assert!(matches!(err, Error::MissingField("name")));
    }

    #[test]
    fn test_missing_general_is_an_error() {
        let err = SpecDocument::parse("foo:\n  files: [bin/.*]\n").unwrap_err();
        assert!(matches!(err, Error::SpecError(_)));
    }

    #[test]
    fn test_unknown_build_system_is_an_error() {
        let err = SpecDocument::parse("general:\n  name: foo\n  version: 1.0\n  build-system: scons\n")
            .unwrap_err();
        assert!(matches!(err, Error::UnknownBuildSystem(ref s) if s == "scons"));
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let spec = "general:\n  name: foo\n  version: 1.0\nfoo-x:\n  files:\n    - 'bin/(unclosed'\n";
        let err = SpecDocument::parse(spec).unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }

    #[test]
    fn test_compile_pattern_is_anchored_at_start() {
        let re = compile_pattern("extra/.*").unwrap();
        assert!(re.is_match("extra/a.txt"));
        assert!(!re.is_match("share/extra/a.txt"));

        let prefix = compile_pattern("lib/libfoo").unwrap();
        assert!(prefix.is_match("lib/libfoo.so.1"));
    }
}
