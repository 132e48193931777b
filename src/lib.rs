// src/lib.rs

//! Ventilo: binary package ventilation and dependency resolution
//!
//! Takes the tree of files a build installed, splits it into binary
//! packages and works out what each package depends on.
//!
//! # Architecture
//!
//! - Specfile: YAML describing the source package and custom binary packages
//! - Ventilation: ignore, custom, library, default and fallback passes
//! - Introspection: ELF and PE metadata (SONAME, exports, needed libraries)
//! - Resolution: provides first, then depends from siblings or the host
//!   package manager
//! - Report: one JSON manifest per binary package for the archive writer

pub mod classify;
pub mod config;
mod error;
pub mod introspect;
pub mod lookup;
pub mod package;
pub mod packager;
pub mod resolve;
pub mod spec;
pub mod ventilate;
pub mod version;

pub use classify::{FileCategory, FileClassifier};
pub use config::BuildConfig;
pub use error::{Error, Result};
pub use introspect::{BinaryFormat, BinaryInfo, GoblinIntrospector, Introspector};
pub use lookup::{DependencyLookup, LookupError, LookupMatch, NoLookup};
pub use package::{scan_install_tree, BinaryPackage, FileSet, InstallFile, SourcePackage};
pub use packager::Packager;
pub use resolve::{Resolution, Resolver, VentilationReport, Warning};
pub use spec::{BuildSystem, SpecDocument};
pub use ventilate::{ventilate, Ventilator};
pub use version::{Version, VersionConflict, VersionRange};
