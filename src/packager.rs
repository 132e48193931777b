// src/packager.rs

//! End-to-end packaging of an installed tree
//!
//! Ventilation and dependency resolution for one source package, as the
//! package builder runs them after the build step installed its files.

use crate::config::BuildConfig;
use crate::error::Result;
use crate::introspect::Introspector;
use crate::lookup::DependencyLookup;
use crate::package::{FileSet, SourcePackage};
use crate::resolve::{Resolver, VentilationReport};
use crate::spec::SpecDocument;
use crate::ventilate::Ventilator;
use tracing::info;

/// Runs ventilation then resolution with shared collaborators
pub struct Packager<'a> {
    config: &'a BuildConfig,
    introspector: &'a dyn Introspector,
    lookup: &'a dyn DependencyLookup,
}

impl<'a> Packager<'a> {
    pub fn new(
        config: &'a BuildConfig,
        introspector: &'a dyn Introspector,
        lookup: &'a dyn DependencyLookup,
    ) -> Self {
        Self {
            config,
            introspector,
            lookup,
        }
    }

    /// Ventilate `files` and resolve the dependencies of every package
    ///
    /// Fatal errors abort the whole source package; warnings are part of
    /// the returned report.
    pub fn run(
        &self,
        spec: &SpecDocument,
        files: FileSet,
        tag: Option<&str>,
    ) -> Result<VentilationReport> {
        let mut source = SourcePackage::from_spec(spec, tag, &self.config.target_dist)?;
        info!(
            "Packaging {} {} for {}",
            source.srcname, source.version, source.dist
        );

        Ventilator::new(spec, self.introspector).ventilate(&mut source, files)?;
        let resolution = Resolver::new(self.introspector, self.lookup)
            .with_workers(self.config.lookup_workers)
            .resolve(&mut source)?;

        Ok(VentilationReport::new(&source, resolution))
    }
}
