// src/lookup/pacman.rs

//! Library owners on MSYS2, from the pacman database

use super::{LookupError, OwnerQuery, SystemLookup};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// `pacman -Qo` owner query
#[derive(Debug, Clone, Copy, Default)]
pub struct PacmanQuery;

/// Lookup resolving DLLs through pacman
pub type PacmanLookup = SystemLookup<PacmanQuery>;

impl OwnerQuery for PacmanQuery {
    fn tool(&self) -> &'static str {
        "pacman"
    }

    fn query_owner(&self, path: &Path) -> Result<Option<String>, LookupError> {
        let output = Command::new("pacman")
            .arg("-Qo")
            .arg(path)
            .output()
            .map_err(|e| LookupError::CommandFailed {
                tool: self.tool(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            debug!("pacman -Qo {}: no owner", path.display());
            return Ok(None);
        }

        Ok(parse_owner(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Parse `pacman -Qo` output (`<path> is owned by <package> <version>`)
pub fn parse_owner(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let (_, rest) = line.split_once(" is owned by ")?;
        rest.split_whitespace().next().map(str::to_string)
    })
}

/// Check if pacman is available on this system
pub fn is_pacman_available() -> bool {
    which::which("pacman").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_owner() {
        let output = "/mingw64/bin/libzstd.dll is owned by mingw-w64-x86_64-zstd 1.5.5-1\n";
        assert_eq!(parse_owner(output), Some("mingw-w64-x86_64-zstd".to_string()));
    }

    #[test]
    fn test_parse_owner_error_output() {
        assert_eq!(parse_owner("error: No package owns /mingw64/bin/foo.dll\n"), None);
    }

    #[test]
    fn test_is_pacman_available() {
        let _ = is_pacman_available();
    }
}
