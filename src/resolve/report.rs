// src/resolve/report.rs

//! Serializable result of ventilating and resolving a source package

use super::{Resolution, Warning};
use crate::error::Result;
use crate::package::{Dependency, SourcePackage};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// One binary package, as handed to the archive writer
#[derive(Debug, Clone, Serialize)]
pub struct PackageManifest {
    pub kind: String,
    pub version: String,
    pub description: String,
    pub files: Vec<String>,
    pub provides: BTreeMap<String, BTreeSet<String>>,
    pub depends: BTreeMap<String, Dependency>,
    pub sysdepends: Vec<String>,
}

/// Everything produced for a source package
#[derive(Debug, Clone, Serialize)]
pub struct VentilationReport {
    pub source: String,
    pub version: String,
    pub packages: BTreeMap<String, PackageManifest>,
    pub ignored: Vec<String>,
    pub warnings: Vec<Warning>,
}

impl VentilationReport {
    /// Build the report of a ventilated and resolved source package
    pub fn new(source: &SourcePackage, resolution: Resolution) -> Self {
        let packages = source
            .packages()
            .iter()
            .map(|(name, pkg)| {
                let resolved = resolution.packages.get(name);
                let manifest = PackageManifest {
                    kind: pkg.kind.as_str().to_string(),
                    version: pkg.version.clone(),
                    description: pkg.description.clone(),
                    files: pkg.files().paths().map(str::to_string).collect(),
                    provides: pkg.provides.clone(),
                    depends: resolved
                        .map(|r| r.depends.clone())
                        .unwrap_or_else(|| pkg.depends.clone()),
                    sysdepends: resolved
                        .map(|r| r.sysdepends.clone())
                        .unwrap_or_else(|| pkg.sysdepends.clone()),
                };
                (name.clone(), manifest)
            })
            .collect();

        Self {
            source: source.srcname.clone(),
            version: source.version.clone(),
            packages,
            ignored: source.ignored().paths().map(str::to_string).collect(),
            warnings: resolution.warnings,
        }
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the JSON report to a file
    pub fn write_json(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
