// src/spec/format.rs

//! YAML decoding of specfiles
//!
//! The `general` section has a fixed shape and goes through serde directly.
//! Package sections carry distribution-keyed `sysdepends-<dist>` entries and
//! polymorphic `depends` values, so they are decoded from `serde_yaml::Value`.

use super::{
    BuildSystem, DependencyClause, GeneralSection, PackageSection, SpecDocument, GENERAL_SECTION,
    SYSDEPENDS_PREFIX,
};
use crate::error::{Error, Result};
use crate::version::VersionRange;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use tracing::warn;

/// Raw `general` section as written in the file
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawGeneral {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<Value>,
    #[serde(default)]
    maintainer: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    build_options: Option<Value>,
    #[serde(default)]
    build_depends: Vec<String>,
    #[serde(default)]
    build_system: Option<String>,
    #[serde(default)]
    ignore: Vec<String>,
}

/// Raw package section as written in the file
#[derive(Debug, Default, Deserialize)]
struct RawPackage {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    files: Vec<String>,
    #[serde(default)]
    depends: Vec<Value>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

pub(super) fn parse_document(content: &str) -> Result<SpecDocument> {
    let root: Mapping = serde_yaml::from_str(content)?;

    let mut general = None;
    let mut packages = Vec::new();

    for (key, value) in root {
        let Some(name) = key.as_str().map(str::to_string) else {
            return Err(Error::SpecError(format!(
                "top-level key {:?} is not a string",
                key
            )));
        };

        if name == GENERAL_SECTION {
            let raw: RawGeneral = if value.is_null() {
                RawGeneral::default()
            } else {
                serde_yaml::from_value(value)?
            };
            general = Some(convert_general(raw)?);
        } else {
            packages.push(convert_package(name, value)?);
        }
    }

    let general = general
        .ok_or_else(|| Error::SpecError(format!("missing '{}' section", GENERAL_SECTION)))?;

    Ok(SpecDocument { general, packages })
}

fn convert_general(raw: RawGeneral) -> Result<GeneralSection> {
    let name = raw
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or(Error::MissingField("name"))?;
    let version = raw
        .version
        .as_ref()
        .and_then(scalar_to_string)
        .ok_or(Error::MissingField("version"))?;
    let build_system = raw
        .build_system
        .as_deref()
        .map(str::parse::<BuildSystem>)
        .transpose()?;

    Ok(GeneralSection {
        name,
        version,
        maintainer: raw.maintainer,
        url: raw.url,
        description: raw.description.unwrap_or_default(),
        build_options: raw.build_options.as_ref().and_then(scalar_to_string),
        build_depends: raw.build_depends,
        build_system,
        ignore: raw.ignore,
    })
}

fn convert_package(name: String, value: Value) -> Result<PackageSection> {
    let raw: RawPackage = if value.is_null() {
        RawPackage::default()
    } else {
        serde_yaml::from_value(value)
            .map_err(|e| Error::SpecError(format!("package section '{}': {}", name, e)))?
    };

    let mut depends = Vec::with_capacity(raw.depends.len());
    for entry in &raw.depends {
        depends.push(convert_dependency(&name, entry)?);
    }

    let mut sysdepends = BTreeMap::new();
    for (key, value) in raw.extra {
        let Some(dist) = key.strip_prefix(SYSDEPENDS_PREFIX) else {
            warn!("Ignoring unknown key '{}' in package section '{}'", key, name);
            continue;
        };
        let deps: Vec<String> = serde_yaml::from_value(value).map_err(|e| {
            Error::SpecError(format!("package section '{}', key '{}': {}", name, key, e))
        })?;
        sysdepends.insert(dist.to_string(), deps);
    }

    Ok(PackageSection {
        name,
        description: raw.description,
        files: raw.files,
        depends,
        sysdepends,
    })
}

/// Decode one `depends` entry
///
/// Entries are single-key maps (`name: 1.0`, `name: [min, max]`,
/// `name: any`); a bare `name` string means any version.
fn convert_dependency(package: &str, entry: &Value) -> Result<DependencyClause> {
    let invalid = |what: &str| {
        Error::SpecError(format!(
            "package section '{}': invalid dependency {:?}: {}",
            package, entry, what
        ))
    };

    if let Some(name) = entry.as_str() {
        return Ok(DependencyClause::new(name, VersionRange::any()));
    }

    let map = entry
        .as_mapping()
        .ok_or_else(|| invalid("expected a map"))?;
    if map.len() != 1 {
        return Err(invalid("expected exactly one dependency per entry"));
    }
    let Some((key, value)) = map.iter().next() else {
        return Err(invalid("empty entry"));
    };
    let name = key.as_str().ok_or_else(|| invalid("name is not a string"))?;

    let range = match value {
        Value::Null => VersionRange::any(),
        Value::Sequence(bounds) => {
            let [min, max] = bounds.as_slice() else {
                return Err(invalid("expected [min, max]"));
            };
            let min = scalar_to_string(min).ok_or_else(|| invalid("minimum is not a version"))?;
            let max = scalar_to_string(max).ok_or_else(|| invalid("maximum is not a version"))?;
            VersionRange::from_pair(&min, &max)?
        }
        other => {
            let version = scalar_to_string(other).ok_or_else(|| invalid("not a version"))?;
            VersionRange::parse(&version)?
        }
    };

    Ok(DependencyClause::new(name, range))
}

/// Render a YAML scalar as text (YAML reads `1.0` as a float)
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_package_section_is_meta() {
        let doc = parse_document("general:\n  name: foo\n  version: 1\nfoo:\n").unwrap();
        assert_eq!(doc.packages.len(), 1);
        assert!(doc.packages[0].files.is_empty());
        assert_eq!(doc.general.version, "1");
    }

    #[test]
    fn test_bare_string_dependency() {
        let dep = convert_dependency("foo", &Value::String("zlib".to_string())).unwrap();
        assert_eq!(dep, DependencyClause::new("zlib", VersionRange::any()));
    }

    #[test]
    fn test_dependency_with_two_keys_is_rejected() {
        let entry: Value = serde_yaml::from_str("{a: 1.0, b: 2.0}").unwrap();
        assert!(convert_dependency("foo", &entry).is_err());
    }

    #[test]
    fn test_dependency_inverted_range_is_rejected() {
        let entry: Value = serde_yaml::from_str("{a: [2.0, 1.0]}").unwrap();
        assert!(convert_dependency("foo", &entry).is_err());
    }

    #[test]
    fn test_dependency_numeric_version() {
        let entry: Value = serde_yaml::from_str("{libbar: 1.5}").unwrap();
        let dep = convert_dependency("foo", &entry).unwrap();
        assert_eq!(dep.range, VersionRange::parse("1.5").unwrap());
    }

    #[test]
    fn test_non_list_sysdepends_is_rejected() {
        let spec = "general:\n  name: foo\n  version: 1\nfoo:\n  sysdepends-debian: libc6\n";
        assert!(parse_document(spec).is_err());
    }
}
