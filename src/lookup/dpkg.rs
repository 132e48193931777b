// src/lookup/dpkg.rs

//! Library owners on Debian systems, from the dpkg database

use super::{LookupError, OwnerQuery, SystemLookup};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// `dpkg -S` owner query
#[derive(Debug, Clone, Copy, Default)]
pub struct DpkgQuery;

/// Lookup resolving libraries through dpkg
pub type DpkgLookup = SystemLookup<DpkgQuery>;

impl OwnerQuery for DpkgQuery {
    fn tool(&self) -> &'static str {
        "dpkg"
    }

    fn query_owner(&self, path: &Path) -> Result<Option<String>, LookupError> {
        let output = Command::new("dpkg")
            .arg("-S")
            .arg(path)
            .output()
            .map_err(|e| LookupError::CommandFailed {
                tool: self.tool(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            // File not owned by any package
            debug!("dpkg -S {}: no owner", path.display());
            return Ok(None);
        }

        let owners = parse_owners(&String::from_utf8_lossy(&output.stdout));
        Ok(owners.into_iter().next())
    }
}

/// Parse `dpkg -S` output into package names
///
/// Lines look like `pkg:arch: /path` or `pkg1, pkg2: /path`; the
/// architecture qualifier is dropped and diversion lines are skipped.
pub fn parse_owners(output: &str) -> Vec<String> {
    let mut owners = Vec::new();
    for line in output.lines() {
        if line.starts_with("diversion by") || line.starts_with("local diversion") {
            continue;
        }
        let Some((packages, _path)) = line.split_once(": ") else {
            continue;
        };
        for package in packages.split(',') {
            let name = package.trim();
            let name = name.split_once(':').map_or(name, |(name, _arch)| name);
            if !name.is_empty() && !owners.iter().any(|o| o == name) {
                owners.push(name.to_string());
            }
        }
    }
    owners
}

/// Check if dpkg is available on this system
pub fn is_dpkg_available() -> bool {
    which::which("dpkg").is_ok()
}
