// src/resolve/mod.rs

//! Dependency resolution for ventilated binary packages
//!
//! Resolution runs in two phases separated by a barrier:
//!
//! 1. **provides**: every package records the SONAMEs and exported symbols
//!    of the libraries it ships, whatever pass put them there.
//! 2. **depends**: for each binary in a package, each needed library is
//!    matched against the package itself, then its siblings, then the
//!    external [`DependencyLookup`]. Symbols covered at each step are
//!    removed from the file's pending set; what remains is reported.
//!
//! Explicit clauses from the specfile are never narrowed or replaced by a
//! discovered dependency. Failures of the external lookup are warnings,
//! not errors.

mod report;

pub use report::{PackageManifest, VentilationReport};

use crate::error::Result;
use crate::introspect::{is_link_name, Introspector};
use crate::lookup::{DependencyLookup, LookupError};
use crate::package::{BinaryPackage, Dependency, DependencyOrigin, PackageKind, SourcePackage};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, info, warn};

/// Default number of packages resolved concurrently
pub const DEFAULT_WORKERS: usize = 4;

/// A dependency problem that does not abort resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Warning {
    /// Imported symbols nobody was found to provide
    UnresolvedSymbols {
        package: String,
        file: String,
        symbols: BTreeSet<String>,
    },
    /// The external lookup failed for a needed library
    LookupFailed {
        package: String,
        file: String,
        library: String,
        reason: String,
    },
}

impl Warning {
    /// Package the warning is about
    pub fn package(&self) -> &str {
        match self {
            Self::UnresolvedSymbols { package, .. } | Self::LookupFailed { package, .. } => package,
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedSymbols { package, file, symbols } => write!(
                f,
                "{}: {} has unresolved symbols: {}",
                package,
                file,
                symbols.iter().cloned().collect::<Vec<_>>().join(", ")
            ),
            Self::LookupFailed { package, file, library, reason } => write!(
                f,
                "{}: cannot find provider of {} needed by {}: {}",
                package, library, file, reason
            ),
        }
    }
}

/// Final dependencies of one binary package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedDeps {
    pub depends: BTreeMap<String, Dependency>,
    pub sysdepends: Vec<String>,
}

/// Outcome of resolving a source package
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub packages: BTreeMap<String, ResolvedDeps>,
    pub warnings: Vec<Warning>,
}

/// Who ships a SONAME inside the source package
#[derive(Debug)]
struct InternalProvider {
    package: String,
    exports: BTreeSet<String>,
}

/// Dependencies found for one package during phase 2
#[derive(Debug, Default)]
struct Discovered {
    depends: Vec<(String, DependencyOrigin)>,
    warnings: Vec<Warning>,
}

impl Discovered {
    fn record(&mut self, name: &str, origin: DependencyOrigin) {
        if !self.depends.iter().any(|(n, _)| n == name) {
            self.depends.push((name.to_string(), origin));
        }
    }
}

/// Computes provides and depends of the binary packages of a source package
pub struct Resolver<'a> {
    introspector: &'a dyn Introspector,
    lookup: &'a dyn DependencyLookup,
    workers: usize,
}

impl<'a> Resolver<'a> {
    pub fn new(introspector: &'a dyn Introspector, lookup: &'a dyn DependencyLookup) -> Self {
        Self {
            introspector,
            lookup,
            workers: DEFAULT_WORKERS,
        }
    }

    /// Set the number of packages resolved concurrently
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Resolve every binary package of `source` in place
    pub fn resolve(&self, source: &mut SourcePackage) -> Result<Resolution> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()?;

        // Phase 1
        pool.install(|| {
            source
                .packages_mut()
                .par_iter_mut()
                .for_each(|(_, pkg)| self.compute_provides(pkg));
        });
        let providers = index_providers(source.packages());

        // Phase 2
        let discovered: Vec<(String, Discovered)> = pool.install(|| {
            source
                .packages()
                .par_iter()
                .map(|(name, pkg)| (name.clone(), self.discover(pkg, &providers)))
                .collect()
        });

        let mut resolution = Resolution::default();
        for (name, found) in discovered {
            let Some(pkg) = source.package_mut(&name) else {
                continue;
            };
            for (dependency, origin) in found.depends {
                if pkg.record_dependency(&dependency, origin) {
                    debug!("{} depends on {} ({:?})", name, dependency, origin);
                }
            }
            for warning in &found.warnings {
                warn!("{}", warning);
            }
            resolution.warnings.extend(found.warnings);
        }

        for (name, pkg) in source.packages() {
            resolution.packages.insert(
                name.clone(),
                ResolvedDeps {
                    depends: pkg.depends.clone(),
                    sysdepends: pkg.sysdepends.clone(),
                },
            );
        }

        info!(
            "Resolved dependencies of {} packages ({} warnings)",
            resolution.packages.len(),
            resolution.warnings.len()
        );
        Ok(resolution)
    }

    fn compute_provides(&self, pkg: &mut BinaryPackage) {
        let libraries: Vec<(String, BTreeSet<String>)> = pkg
            .files()
            .iter()
            .filter_map(|file| {
                let info = file.binary_info(self.introspector)?;
                let soname = info.soname.as_deref()?;
                if is_link_name(file.path(), soname) {
                    return None;
                }
                Some((soname.to_string(), info.exports.clone()))
            })
            .collect();

        for (soname, exports) in libraries {
            pkg.add_provides(soname, exports);
        }
    }

    fn discover(
        &self,
        pkg: &BinaryPackage,
        providers: &BTreeMap<String, InternalProvider>,
    ) -> Discovered {
        let mut found = Discovered::default();

        for file in pkg.files().iter() {
            let Some(info) = file.binary_info(self.introspector) else {
                continue;
            };
            let mut pending = info.imported_symbols();

            for needed in &info.needed {
                if let Some(exports) = pkg.provides.get(&needed.name) {
                    pending.retain(|s| !exports.contains(s));
                    continue;
                }

                // ELF imports are not bound to a library, so any sibling covers them
                if let Some(provider) = providers.get(&needed.name)
                    && provider.package != pkg.name
                    && needed.symbols.is_subset(&provider.exports)
                {
                    found.record(&provider.package, DependencyOrigin::Internal);
                    pending.retain(|s| !provider.exports.contains(s));
                    continue;
                }

                match self.lookup.lookup(&needed.name, &pending) {
                    Ok(hit) => {
                        found.record(&hit.package, DependencyOrigin::External);
                        pending.retain(|s| !hit.satisfied.contains(s));
                    }
                    Err(e) => found.warnings.push(lookup_warning(pkg, file.path(), &needed.name, e)),
                }
            }

            if !pending.is_empty() {
                found.warnings.push(Warning::UnresolvedSymbols {
                    package: pkg.name.clone(),
                    file: file.path().to_string(),
                    symbols: pending,
                });
            }
        }

        found
    }
}

fn lookup_warning(pkg: &BinaryPackage, file: &str, library: &str, error: LookupError) -> Warning {
    Warning::LookupFailed {
        package: pkg.name.clone(),
        file: file.to_string(),
        library: library.to_string(),
        reason: error.to_string(),
    }
}

/// SONAME → package providing it
///
/// Library packages win over other kinds; ties go to the first by name.
fn index_providers(
    packages: &BTreeMap<String, BinaryPackage>,
) -> BTreeMap<String, InternalProvider> {
    let libraries = packages.values().filter(|pkg| pkg.kind == PackageKind::Library);
    let others = packages.values().filter(|pkg| pkg.kind != PackageKind::Library);

    let mut providers = BTreeMap::new();
    for pkg in libraries.chain(others) {
        for (soname, exports) in &pkg.provides {
            providers
                .entry(soname.clone())
                .or_insert_with(|| InternalProvider {
                    package: pkg.name.clone(),
                    exports: exports.clone(),
                });
        }
    }
    providers
}
