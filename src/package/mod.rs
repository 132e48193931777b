// src/package/mod.rs

//! Package data model
//!
//! A [`SourcePackage`] owns a registry of [`BinaryPackage`]s keyed by name.
//! Each binary package owns a [`FileSet`] of [`InstallFile`]s; files move
//! between sets but are never shared.

mod binary;
mod file;
mod source;

pub use binary::{BinaryPackage, Dependency, DependencyOrigin, PackageKind};
pub use file::{scan_install_tree, FileSet, InstallFile};
pub use source::SourcePackage;
