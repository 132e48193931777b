// src/spec/build_system.rs

//! Build system hint of a source package
//!
//! The build itself is driven elsewhere; here we only validate the token from
//! the specfile and guess it from the source tree when the specfile is silent.

use crate::error::{Error, Result};
use std::path::Path;
use std::str::FromStr;

/// Build systems the package builder knows how to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildSystem {
    Autotools,
    Cmake,
    Makefile,
    Python,
}

impl BuildSystem {
    /// Get the string representation of the build system
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Autotools => "autotools",
            Self::Cmake => "cmake",
            Self::Makefile => "makefile",
            Self::Python => "python",
        }
    }

    /// Guess the build system from marker files at the top of a source tree
    ///
    /// Checked in order: `configure.ac`, `CMakeLists.txt`, `Makefile`,
    /// `setup.py`. Returns `None` when nothing matches.
    pub fn guess(source_dir: &Path) -> Option<Self> {
        const MARKERS: &[(&str, BuildSystem)] = &[
            ("configure.ac", BuildSystem::Autotools),
            ("CMakeLists.txt", BuildSystem::Cmake),
            ("Makefile", BuildSystem::Makefile),
            ("setup.py", BuildSystem::Python),
        ];

        MARKERS
            .iter()
            .find(|(marker, _)| source_dir.join(marker).exists())
            .map(|(_, system)| *system)
    }

    /// Use the declared build system, or guess it from the source tree
    pub fn resolve(declared: Option<BuildSystem>, source_dir: &Path) -> Result<Self> {
        declared.or_else(|| Self::guess(source_dir)).ok_or_else(|| {
            Error::UnknownBuildSystem(format!(
                "could not guess project build system in {}",
                source_dir.display()
            ))
        })
    }
}

impl FromStr for BuildSystem {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "autotools" => Ok(Self::Autotools),
            "cmake" => Ok(Self::Cmake),
            "makefile" | "make" => Ok(Self::Makefile),
            "python" => Ok(Self::Python),
            _ => Err(Error::UnknownBuildSystem(s.to_string())),
        }
    }
}

impl std::fmt::Display for BuildSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
