// src/ventilate/mod.rs

//! Ventilation: partition installed files into binary packages
//!
//! Files go through five passes in a fixed order. Each pass only sees the
//! files earlier passes left in the pool:
//!
//! 1. ignore: drop files matching `general.ignore` and the built-in rules
//! 2. custom packages: specfile sections claim files by pattern
//! 3. library discovery: every shared library gets a package named after its SONAME
//! 4. default classification: executables, docs, devel and debug files
//! 5. fallback: whatever is left
//!
//! Binary metadata is computed in parallel during pass 3 and cached on each
//! file, so later passes and dependency resolution never introspect twice.

use crate::classify::FileClassifier;
use crate::error::{Error, Result};
use crate::introspect::{is_link_name, library_package_name, Introspector};
use crate::package::{FileSet, PackageKind, SourcePackage};
use crate::spec::{compile_pattern, SpecDocument};
use rayon::prelude::*;
use regex::Regex;
use tracing::{debug, info};

/// Files never shipped in any package (libtool archives, module definitions)
const BUILTIN_IGNORE: &[&str] = &[r".*\.la$", r".*\.def$"];

/// Where the files left after classification go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackTarget {
    /// The main package already exists
    Existing(String),
    /// The only library package of the source
    Library(String),
    /// A main package created for the occasion
    New(String),
}

impl FallbackTarget {
    pub fn name(&self) -> &str {
        match self {
            Self::Existing(name) | Self::Library(name) | Self::New(name) => name,
        }
    }
}

/// Runs the ventilation passes for one source package
pub struct Ventilator<'a> {
    spec: &'a SpecDocument,
    introspector: &'a dyn Introspector,
}

impl<'a> Ventilator<'a> {
    pub fn new(spec: &'a SpecDocument, introspector: &'a dyn Introspector) -> Self {
        Self { spec, introspector }
    }

    /// Distribute `files` over the binary packages of `source`
    ///
    /// `source` should come from [`SourcePackage::from_spec`] on the same
    /// specfile. On error the source package is left partially ventilated
    /// and must be discarded.
    pub fn ventilate(&self, source: &mut SourcePackage, files: FileSet) -> Result<()> {
        let total = files.len();
        let mut pool = files;

        self.remove_ignored(source, &mut pool)?;
        self.ventilate_custom(source, &mut pool)?;
        self.ventilate_libraries(source, &mut pool)?;
        self.ventilate_defaults(source, &mut pool);
        self.ventilate_fallback(source, pool)?;

        info!(
            "Ventilated {} files of {} into {} packages ({} ignored)",
            total,
            source.srcname,
            source.packages().len(),
            source.ignored().len()
        );
        Ok(())
    }

    fn remove_ignored(&self, source: &mut SourcePackage, pool: &mut FileSet) -> Result<()> {
        let patterns = self
            .spec
            .general
            .ignore
            .iter()
            .map(String::as_str)
            .chain(BUILTIN_IGNORE.iter().copied())
            .map(compile_pattern)
            .collect::<Result<Vec<Regex>>>()?;

        let ignored = pool.take_matching(|path| patterns.iter().any(|re| re.is_match(path)));
        if !ignored.is_empty() {
            debug!("Ignoring {} installed files", ignored.len());
        }
        source.add_ignored(ignored);
        Ok(())
    }

    fn ventilate_custom(&self, source: &mut SourcePackage, pool: &mut FileSet) -> Result<()> {
        for section in &self.spec.packages {
            if section.is_meta() {
                continue;
            }

            let kind = match source.reserved_category(&section.name) {
                Some(category) => PackageKind::Default(category),
                None => PackageKind::Custom,
            };
            let pkg = source.get_or_create(&section.name, kind);
            for pattern in &section.files {
                let re = compile_pattern(pattern)?;
                let matching = pool.take_matching(|path| re.is_match(path));
                debug!(
                    "Pattern '{}' gives {} files to {}",
                    pattern,
                    matching.len(),
                    section.name
                );
                pkg.add_files(matching);
            }
        }

        // Meta-packages (no patterns) may stay empty
        for section in &self.spec.packages {
            let empty = source
                .package(&section.name)
                .is_none_or(|pkg| pkg.is_empty());
            if !section.is_meta() && empty {
                return Err(Error::EmptyPackage(section.name.clone()));
            }
        }
        Ok(())
    }

    fn ventilate_libraries(&self, source: &mut SourcePackage, pool: &mut FileSet) -> Result<()> {
        let introspector = self.introspector;
        let discovered: Vec<(String, String)> = pool
            .as_map()
            .par_iter()
            .filter_map(|(path, file)| {
                let soname = file.soname(introspector)?;
                if is_link_name(path, soname) {
                    return None;
                }
                Some((path.clone(), soname.to_string()))
            })
            .collect();

        for (path, soname) in discovered {
            // Already moved as the SONAME alias of an earlier file
            let Some(file) = pool.remove(&path) else {
                continue;
            };

            let name = library_package_name(&soname);
            if source.reserved_category(&name).is_some() {
                return Err(Error::ReservedName { name, soname });
            }

            let exports = file
                .cached_binary_info()
                .map(|info| info.exports.clone())
                .unwrap_or_default();
            let alias = soname_alias(&path, &soname);
            let alias_file = if alias != path { pool.remove(&alias) } else { None };
            let description = source.format_description(PackageKind::Library, None, Some(&soname));

            let pkg = source.get_or_create(&name, PackageKind::Library);
            if pkg.kind == PackageKind::Custom {
                pkg.kind = PackageKind::Library;
            }
            if pkg.description.is_empty() {
                pkg.description = description;
            }
            debug!("Library {} ({}) goes to {}", path, soname, name);
            pkg.add_file(file);
            if let Some(alias_file) = alias_file {
                pkg.add_file(alias_file);
            }
            pkg.add_provides(soname, exports);
        }
        Ok(())
    }

    fn ventilate_defaults(&self, source: &mut SourcePackage, pool: &mut FileSet) {
        let classified: Vec<(String, String)> = pool
            .iter()
            .filter_map(|file| {
                let category =
                    FileClassifier::classify(file.path(), file.binary_info(self.introspector))?;
                Some((file.path().to_string(), source.default_package_name(category)))
            })
            .collect();

        for (path, target) in classified {
            let Some(file) = pool.remove(&path) else {
                continue;
            };
            let kind = match source.reserved_category(&target) {
                Some(category) => PackageKind::Default(category),
                None => PackageKind::Custom,
            };
            source.get_or_create(&target, kind).add_file(file);
        }
    }

    fn ventilate_fallback(&self, source: &mut SourcePackage, pool: FileSet) -> Result<()> {
        if pool.is_empty() {
            return Ok(());
        }

        let target = fallback_target(source)?;
        debug!(
            "Giving {} unclassified files to {:?}",
            pool.len(),
            target
        );
        let kind = match &target {
            FallbackTarget::Library(_) => PackageKind::Library,
            _ => PackageKind::Default(crate::classify::FileCategory::Main),
        };
        source.get_or_create(target.name(), kind).add_files(pool);
        Ok(())
    }
}

/// Choose the package receiving unclassified files
///
/// The main package if it exists, else the only library package, else a
/// new main package. Two or more library packages make the choice
/// ambiguous.
pub fn fallback_target(source: &SourcePackage) -> Result<FallbackTarget> {
    let main = source.default_package_name(crate::classify::FileCategory::Main);
    if source.package(&main).is_some() {
        return Ok(FallbackTarget::Existing(main));
    }

    match source.library_packages().as_slice() {
        [] => Ok(FallbackTarget::New(main)),
        [only] => Ok(FallbackTarget::Library(only.to_string())),
        many => Err(Error::AmbiguousFallback(
            many.iter().map(|s| s.to_string()).collect(),
        )),
    }
}

/// Ventilate `files` according to `spec`
///
/// Builds the source package from the specfile and runs every pass.
pub fn ventilate(
    spec: &SpecDocument,
    files: FileSet,
    introspector: &dyn Introspector,
    tag: Option<&str>,
    dist: &str,
) -> Result<SourcePackage> {
    let mut source = SourcePackage::from_spec(spec, tag, dist)?;
    Ventilator::new(spec, introspector).ventilate(&mut source, files)?;
    Ok(source)
}

/// Path of the SONAME-named file next to `path`
fn soname_alias(path: &str, soname: &str) -> String {
    match path.rsplit_once('/') {
        Some((dir, _)) => format!("{}/{}", dir, soname),
        None => soname.to_string(),
    }
}
