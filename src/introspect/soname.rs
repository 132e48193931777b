// src/introspect/soname.rs
//! SONAME parsing and library package naming
//!
//! A library package is named after the SONAME it provides, with the ABI
//! version appended: `libfoo.so.1` becomes `libfoo1`. When the base name
//! already ends in a digit a dash keeps the two apart (`libfoo2.so.3` becomes
//! `libfoo2-3`). DLLs carry their ABI version as a dash suffix
//! (`libfoo-1.dll` becomes `libfoo1`).

/// Split a SONAME into its base name and ABI version
///
/// The version is empty when the SONAME carries none.
pub fn parse_soname(soname: &str) -> (String, String) {
    if let Some((base, version)) = soname.split_once(".so.") {
        return (base.to_string(), version.to_string());
    }
    if let Some(base) = soname.strip_suffix(".so") {
        return (base.to_string(), String::new());
    }

    let lower = soname.to_ascii_lowercase();
    if lower.ends_with(".dll") {
        let stem = &soname[..soname.len() - 4];
        if let Some((base, version)) = stem.rsplit_once('-')
            && !base.is_empty()
            && is_abi_version(version)
        {
            return (base.to_string(), version.to_string());
        }
        return (stem.to_string(), String::new());
    }

    (soname.to_string(), String::new())
}

fn is_abi_version(s: &str) -> bool {
    !s.is_empty()
        && s.starts_with(|c: char| c.is_ascii_digit())
        && s.chars().all(|c| c.is_ascii_digit() || c == '.')
}

/// Derive the binary package name for a library from its SONAME
pub fn library_package_name(soname: &str) -> String {
    let (base, version) = parse_soname(soname);
    let name = if !version.is_empty() && base.ends_with(|c: char| c.is_ascii_digit()) {
        format!("{}-{}", base, version)
    } else {
        format!("{}{}", base, version)
    };
    name.to_ascii_lowercase()
}

/// Whether `path` is the unversioned link name of a library with `soname`
///
/// `lib/libfoo.so` pointing at `libfoo.so.1` is a development link, not the
/// library itself.
pub fn is_link_name(path: &str, soname: &str) -> bool {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    file_name.ends_with(".so") && file_name != soname
}
