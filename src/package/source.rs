// src/package/source.rs

//! Source package: the registry of binary packages built from one source

use super::binary::{BinaryPackage, PackageKind};
use super::file::FileSet;
use crate::classify::FileCategory;
use crate::error::{Error, Result};
use crate::spec::{BuildSystem, SpecDocument};
use std::collections::BTreeMap;
use tracing::debug;

/// A source package and the binary packages created from it
///
/// Binary packages are created on first reference through
/// [`SourcePackage::get_or_create`] and are never re-created.
#[derive(Debug, Clone)]
pub struct SourcePackage {
    pub name: String,
    pub version: String,
    pub tag: Option<String>,
    /// `<name>_<tag>` when a tag is set, `<name>` otherwise
    pub srcname: String,
    pub description: String,
    pub maintainer: Option<String>,
    pub url: Option<String>,
    pub build_system: Option<BuildSystem>,
    pub build_options: Option<String>,
    pub build_depends: Vec<String>,
    /// Distribution whose system dependencies are used
    pub dist: String,
    packages: BTreeMap<String, BinaryPackage>,
    ignored: FileSet,
}

impl SourcePackage {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            srcname: name.clone(),
            name,
            version: version.into(),
            tag: None,
            description: String::new(),
            maintainer: None,
            url: None,
            build_system: None,
            build_options: None,
            build_depends: Vec::new(),
            dist: String::new(),
            packages: BTreeMap::new(),
            ignored: FileSet::new(),
        }
    }

    /// Set the build tag (also updates `srcname`)
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        self.srcname = format!("{}_{}", self.name, tag);
        self.tag = Some(tag);
        self
    }

    /// Set the target distribution
    pub fn with_dist(mut self, dist: impl Into<String>) -> Self {
        self.dist = dist.into();
        self
    }

    /// Create a source package from a specfile
    ///
    /// Every package section gets its binary package right away, carrying
    /// its explicit dependencies and the system dependencies of `dist`.
    pub fn from_spec(spec: &SpecDocument, tag: Option<&str>, dist: &str) -> Result<Self> {
        let general = &spec.general;
        let mut source = Self::new(&general.name, &general.version).with_dist(dist);
        if let Some(tag) = tag {
            source = source.with_tag(tag);
        }
        source.description = general.description.clone();
        source.maintainer = general.maintainer.clone();
        source.url = general.url.clone();
        source.build_system = general.build_system;
        source.build_options = general.build_options.clone();
        source.build_depends = general.build_depends.clone();

        for section in &spec.packages {
            let kind = match source.reserved_category(&section.name) {
                Some(category) => PackageKind::Default(category),
                None => PackageKind::Custom,
            };
            let description = source.format_description(kind, section.description.as_deref(), None);

            let pkg = source.get_or_create(&section.name, kind);
            pkg.description = description;
            for clause in &section.depends {
                pkg.require(&clause.name, clause.range.clone())
                    .map_err(|e| Error::DependencyConflict {
                        package: section.name.clone(),
                        dependency: clause.name.clone(),
                        source: e,
                    })?;
            }
            for sysdep in section.sysdepends_for(dist) {
                pkg.add_sysdepend(sysdep);
            }
        }

        debug!(
            "Source package {} {} declares {} binary packages",
            source.srcname,
            source.version,
            source.packages.len()
        );
        Ok(source)
    }

    /// Name of the default package for a category
    pub fn default_package_name(&self, category: FileCategory) -> String {
        category.package_name(&self.name)
    }

    /// Category whose default package has this name, if any
    pub fn reserved_category(&self, name: &str) -> Option<FileCategory> {
        FileCategory::all()
            .iter()
            .copied()
            .find(|c| self.default_package_name(*c) == name)
    }

    /// Look up a binary package, creating it if needed
    ///
    /// A new package gets the default description for its kind. The kind of
    /// an existing package is not changed.
    pub fn get_or_create(&mut self, name: &str, kind: PackageKind) -> &mut BinaryPackage {
        let description = match kind {
            PackageKind::Library => String::new(),
            _ => self.format_description(kind, None, None),
        };
        let (srcname, version) = (&self.srcname, &self.version);

        self.packages.entry(name.to_string()).or_insert_with(|| {
            debug!("Creating binary package {} ({})", name, kind);
            let mut pkg = BinaryPackage::new(name, kind, srcname, version);
            pkg.description = description;
            pkg
        })
    }

    pub fn package(&self, name: &str) -> Option<&BinaryPackage> {
        self.packages.get(name)
    }

    pub fn package_mut(&mut self, name: &str) -> Option<&mut BinaryPackage> {
        self.packages.get_mut(name)
    }

    pub fn packages(&self) -> &BTreeMap<String, BinaryPackage> {
        &self.packages
    }

    pub fn packages_mut(&mut self) -> &mut BTreeMap<String, BinaryPackage> {
        &mut self.packages
    }

    /// Names of packages created around a SONAME
    pub fn library_packages(&self) -> Vec<&str> {
        self.packages
            .values()
            .filter(|p| p.kind == PackageKind::Library)
            .map(|p| p.name.as_str())
            .collect()
    }

    /// Files dropped by the ignore rules
    pub fn ignored(&self) -> &FileSet {
        &self.ignored
    }

    pub(crate) fn add_ignored(&mut self, files: FileSet) {
        self.ignored.append(files);
    }

    /// Description of a binary package
    ///
    /// - default packages: the source description, then the section's own
    /// - library packages: the source description and the SONAME
    /// - custom packages: their own description, else the source description
    pub fn format_description(
        &self,
        kind: PackageKind,
        section: Option<&str>,
        soname: Option<&str>,
    ) -> String {
        let general = self.description.trim();
        let section = section.map(str::trim).filter(|s| !s.is_empty());

        match kind {
            PackageKind::Default(_) => match section {
                Some(extra) if general.is_empty() => extra.to_string(),
                Some(extra) => format!("{}\n{}", general, extra),
                None => general.to_string(),
            },
            PackageKind::Library => {
                let note = match soname {
                    Some(soname) => format!("automatically generated around SONAME {}", soname),
                    None => "automatically generated library package".to_string(),
                };
                if general.is_empty() {
                    note
                } else {
                    format!("{}\n{}", general, note)
                }
            }
            PackageKind::Custom => section.unwrap_or(general).to_string(),
        }
    }
}
