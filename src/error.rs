// src/error.rs

//! Error types for ventilation and dependency resolution
//!
//! Every variant here is fatal for the source package being processed.
//! Non-fatal conditions (unparseable binaries, unresolved symbols) are not
//! errors; they are collected as [`crate::resolve::Warning`] entries instead.

use crate::version::VersionConflict;
use thiserror::Error;

/// Errors that abort ventilation or resolution of a source package
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed specfile content
    #[error("Specfile error: {0}")]
    SpecError(String),

    /// A required field of the `general` section is missing
    #[error("Specfile is missing required field 'general.{0}'")]
    MissingField(&'static str),

    /// A custom package declared file patterns but matched nothing
    #[error("Custom package {0} is empty")]
    EmptyPackage(String),

    /// The `build-system` token is not one we know how to drive
    #[error("Unknown build system: {0}")]
    UnknownBuildSystem(String),

    /// A file pattern from the specfile is not a valid regular expression
    #[error("Invalid file pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A version string could not be parsed
    #[error("Invalid version '{0}'")]
    InvalidVersion(String),

    /// A library package name derived from a SONAME collides with a reserved name
    #[error("Library package name '{name}' derived from SONAME '{soname}' collides with a reserved package name")]
    ReservedName { name: String, soname: String },

    /// Leftover files could go to more than one library package
    #[error("Cannot choose a fallback package, library candidates: {}", .0.join(", "))]
    AmbiguousFallback(Vec<String>),

    /// Two clauses for the same dependency have an empty intersection
    #[error("Package {package}: conflicting requirements for {dependency}: {source}")]
    DependencyConflict {
        package: String,
        dependency: String,
        #[source]
        source: VersionConflict,
    },

    /// Version ranges that cannot both hold
    #[error(transparent)]
    VersionConflict(#[from] VersionConflict),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The resolver worker pool could not be started
    #[error("Failed to start resolver workers: {0}")]
    ThreadPoolError(#[from] rayon::ThreadPoolBuildError),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parse error in the specfile
    #[error("Failed to parse specfile: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parse error in the configuration file
    #[error("Failed to parse configuration: {0}")]
    TomlError(#[from] toml::de::Error),

    /// JSON serialization error for the report
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambiguous_fallback_lists_candidates() {
        let err = Error::AmbiguousFallback(vec!["libfoo1".to_string(), "libbar2".to_string()]);
        assert_eq!(
            err.to_string(),
            "Cannot choose a fallback package, library candidates: libfoo1, libbar2"
        );
    }

    #[test]
    fn test_empty_package_names_package() {
        let err = Error::EmptyPackage("foo-extra".to_string());
        assert!(err.to_string().contains("foo-extra"));
    }

    #[test]
    fn test_thread_pool_failure_converts() {
        // The global pool can only be set up once per process
        let build_err = (0..2)
            .find_map(|_| rayon::ThreadPoolBuilder::new().build_global().err())
            .unwrap();
        let err: Error = build_err.into();
        assert!(matches!(err, Error::ThreadPoolError(_)));
        assert!(err.to_string().starts_with("Failed to start resolver workers"));
    }
}
