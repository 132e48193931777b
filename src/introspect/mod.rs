// src/introspect/mod.rs

//! Binary introspection for installed files
//!
//! Uses goblin to read the dynamic linking metadata of installed files:
//! - SONAME (or the DLL export name for PE images)
//! - Exported symbols
//! - Needed libraries and the symbols imported from them
//!
//! The format is picked by a pure magic-byte check ([`BinaryFormat::detect`]),
//! then handed to the matching per-format reader. Parse failures never
//! propagate: a truncated or corrupt file is logged and reported as not being
//! a binary, so ventilation carries on with path-based classification.

mod elf;
mod pe;
mod soname;

pub use soname::{is_link_name, library_package_name, parse_soname};

use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Binary formats we know how to introspect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryFormat {
    /// ELF (Linux and most Unix systems)
    Elf,
    /// PE/COFF (Windows DLLs and executables)
    Pe,
    /// Not a recognized binary
    None,
}

impl BinaryFormat {
    /// Classify raw file content by its magic bytes
    pub fn detect(content: &[u8]) -> Self {
        if content.starts_with(b"\x7fELF") {
            Self::Elf
        } else if content.starts_with(b"MZ") {
            Self::Pe
        } else {
            Self::None
        }
    }

    /// Get the string representation of the format
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Elf => "elf",
            Self::Pe => "pe",
            Self::None => "none",
        }
    }
}

impl std::fmt::Display for BinaryFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A library a binary needs at run time, with the symbols bound to it
///
/// ELF imports are not bound to a specific library unless symbol versioning
/// says so; those symbols live in [`BinaryInfo::unbound`] instead and
/// `symbols` stays empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NeededLibrary {
    pub name: String,
    pub symbols: BTreeSet<String>,
}

impl NeededLibrary {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbols: BTreeSet::new(),
        }
    }
}

/// Dynamic linking metadata extracted from a binary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BinaryInfo {
    pub format: BinaryFormat,
    /// Set only for shared libraries
    pub soname: Option<String>,
    pub exports: BTreeSet<String>,
    /// Needed libraries in declaration order
    pub needed: Vec<NeededLibrary>,
    /// Imported symbols not attributed to a particular library
    pub unbound: BTreeSet<String>,
}

impl BinaryInfo {
    /// Metadata for an executable (no SONAME)
    pub fn executable(format: BinaryFormat) -> Self {
        Self {
            format,
            soname: None,
            exports: BTreeSet::new(),
            needed: Vec::new(),
            unbound: BTreeSet::new(),
        }
    }

    /// Metadata for a shared library
    pub fn library(format: BinaryFormat, soname: impl Into<String>) -> Self {
        Self {
            soname: Some(soname.into()),
            ..Self::executable(format)
        }
    }

    /// Add exported symbols
    pub fn with_exports<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exports.extend(symbols.into_iter().map(Into::into));
        self
    }

    /// Add a needed library and the symbols imported from it
    pub fn needing<I, S>(mut self, library: impl Into<String>, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut needed = NeededLibrary::new(library);
        needed.symbols.extend(symbols.into_iter().map(Into::into));
        self.needed.push(needed);
        self
    }

    /// Is this a shared library?
    pub fn is_library(&self) -> bool {
        self.soname.is_some()
    }

    /// Every imported symbol, bound or not
    pub fn imported_symbols(&self) -> BTreeSet<String> {
        let mut all = self.unbound.clone();
        for lib in &self.needed {
            all.extend(lib.symbols.iter().cloned());
        }
        all
    }
}

/// Source of binary metadata for installed files
///
/// Paths are relative to whatever root the implementation was built with.
/// Implementations must be pure reads and must not fail: anything that
/// cannot be introspected is `None`.
pub trait Introspector: Send + Sync {
    fn inspect(&self, path: &str) -> Option<BinaryInfo>;
}

/// Introspector reading files from disk with goblin
#[derive(Debug, Clone)]
pub struct GoblinIntrospector {
    root: PathBuf,
}

impl GoblinIntrospector {
    /// Create an introspector resolving paths under `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Introspector for GoblinIntrospector {
    fn inspect(&self, path: &str) -> Option<BinaryInfo> {
        let full_path = self.root.join(path);
        inspect_file(&full_path)
    }
}

/// Introspect a file on disk
pub fn inspect_file(path: &Path) -> Option<BinaryInfo> {
    let content = match std::fs::read(path) {
        Ok(content) => content,
        Err(e) => {
            debug!("Cannot read {} for introspection: {}", path.display(), e);
            return None;
        }
    };

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    inspect_bytes(&content, &file_name)
}

/// Introspect in-memory file content
///
/// `file_name` names the DLL when a PE image has no export directory name.
pub fn inspect_bytes(content: &[u8], file_name: &str) -> Option<BinaryInfo> {
    let parsed = match BinaryFormat::detect(content) {
        BinaryFormat::Elf => elf::inspect(content),
        BinaryFormat::Pe => pe::inspect(content, file_name),
        BinaryFormat::None => return None,
    };

    match parsed {
        Ok(info) => info,
        Err(e) => {
            debug!("Failed to parse binary '{}': {}", file_name, e);
            None
        }
    }
}
