// src/classify/mod.rs

//! File-to-category classification based on path patterns
//!
//! Used by the default-classification pass of ventilation, after custom
//! packages and library packages had their pick. Each category maps to one
//! of the reserved default packages of a source package:
//!
//! | Category | Package | Matches |
//! |----------|---------|---------|
//! | `Main`   | `<source>`        | executables, manpages of sections 1, 6, 8 |
//! | `Doc`    | `<source>-doc`    | documentation, manpages of sections 2, 3 and others |
//! | `Devel`  | `<source>-devel`  | headers, pkg-config, static and import libs, link names |
//! | `Debug`  | `<source>-debug`  | detached debug symbols |
//!
//! Paths are relative to the install prefix (`bin/foo`, `share/doc/foo/README`).

use crate::introspect::BinaryInfo;

/// Default package categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FileCategory {
    /// Executables and their manpages
    Main,
    /// Documentation
    Doc,
    /// Development files
    Devel,
    /// Debug symbols
    Debug,
}

impl FileCategory {
    /// Get the string representation of the category
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Doc => "doc",
            Self::Devel => "devel",
            Self::Debug => "debug",
        }
    }

    /// Name of the default package for this category
    ///
    /// ```ignore
    /// assert_eq!(FileCategory::Devel.package_name("foo"), "foo-devel");
    /// assert_eq!(FileCategory::Main.package_name("foo"), "foo");
    /// ```
    pub fn package_name(&self, source: &str) -> String {
        match self {
            Self::Main => source.to_string(),
            other => format!("{}-{}", source, other.as_str()),
        }
    }

    /// Return all categories, in classification priority order
    pub fn all() -> &'static [FileCategory] {
        &[Self::Main, Self::Doc, Self::Devel, Self::Debug]
    }
}

impl std::fmt::Display for FileCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classifies files into default package categories
pub struct FileClassifier;

impl FileClassifier {
    /// Classify a file
    ///
    /// Order of checks matters: the first matching rule wins. Returns `None`
    /// for files left to the fallback package.
    pub fn classify(path: &str, binary: Option<&BinaryInfo>) -> Option<FileCategory> {
        let path = normalize(path);

        if is_binary(path, binary) || is_manpage_for_executable(path) {
            return Some(FileCategory::Main);
        }
        if is_documentation(path) || is_manpage_for_library(path) {
            return Some(FileCategory::Doc);
        }
        if is_devel(path) {
            return Some(FileCategory::Devel);
        }
        if is_debug_symbols(path) {
            return Some(FileCategory::Debug);
        }
        None
    }
}

fn normalize(path: &str) -> &str {
    let path = path.strip_prefix("./").unwrap_or(path);
    path.trim_start_matches('/')
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn extension(path: &str) -> Option<&str> {
    let name = file_name(path);
    name.rsplit_once('.').map(|(_, ext)| ext).filter(|_| !name.starts_with('.'))
}

fn first_segment(path: &str) -> &str {
    path.split('/').next().unwrap_or(path)
}

/// Executable: in a binary directory, or a non-library binary image
pub fn is_binary(path: &str, binary: Option<&BinaryInfo>) -> bool {
    let path = normalize(path);
    if binary.is_some_and(|info| !info.is_library()) {
        return true;
    }
    matches!(first_segment(path), "bin" | "sbin" | "libexec")
        && path.contains('/')
        && !is_debug_symbols(path)
}

/// Manpage section, for `share/man/manN/...` and localized `share/man/<lang>/manN/...`
fn manpage_section(path: &str) -> Option<char> {
    let segments: Vec<&str> = path.split('/').collect();
    let man_root = segments.iter().position(|s| *s == "man")?;

    // The file itself can't be the section directory
    let dirs = &segments[man_root + 1..segments.len().saturating_sub(1)];
    dirs.iter().find_map(|dir| {
        let section = dir.strip_prefix("man")?;
        section.chars().next().filter(char::is_ascii_digit)
    })
}

/// Manpage documenting a command (sections 1, 6 and 8)
pub fn is_manpage_for_executable(path: &str) -> bool {
    matches!(manpage_section(normalize(path)), Some('1' | '6' | '8'))
}

/// Manpage documenting a library API (sections 2 and 3)
pub fn is_manpage_for_library(path: &str) -> bool {
    matches!(manpage_section(normalize(path)), Some('2' | '3'))
}

/// Documentation files
pub fn is_documentation(path: &str) -> bool {
    const DOC_DIRS: &[&str] = &[
        "share/doc/",
        "doc/",
        "share/info/",
        "share/gtk-doc/",
        "share/help/",
    ];
    const DOC_EXTENSIONS: &[&str] = &["info", "html", "pdf", "md", "rst", "txt"];
    const TOP_LEVEL_DOCS: &[&str] = &["README", "COPYING", "LICENSE", "NEWS", "ChangeLog", "AUTHORS"];

    let path = normalize(path);

    if DOC_DIRS.iter().any(|d| path.starts_with(d)) || path.contains("/doc/") {
        return true;
    }

    // Remaining manpage sections (4, 5, 7, ...) are plain documentation
    if manpage_section(path).is_some() {
        return true;
    }

    if extension(path).is_some_and(|ext| DOC_EXTENSIONS.contains(&ext)) {
        return true;
    }

    !path.contains('/') && TOP_LEVEL_DOCS.iter().any(|d| path.starts_with(d))
}

/// Development files
pub fn is_devel(path: &str) -> bool {
    const DEVEL_EXTENSIONS: &[&str] = &["h", "hh", "hpp", "hxx", "pc", "a", "lib", "cmake"];

    let path = normalize(path);

    // Headers
    if path.starts_with("include/") || path.contains("/include/") {
        return true;
    }

    // Headers, pkg-config, static and import libraries, cmake modules
    if extension(path).is_some_and(|ext| DEVEL_EXTENSIONS.contains(&ext)) {
        return true;
    }

    // CMake package directories and aclocal macros
    if path.split('/').any(|s| s == "cmake") || path.starts_with("share/aclocal/") {
        return true;
    }

    // Unversioned link name used only at link time: lib/libfoo.so
    let name = file_name(path);
    first_segment(path).starts_with("lib") && name.starts_with("lib") && name.ends_with(".so")
}

/// Detached debug symbols
pub fn is_debug_symbols(path: &str) -> bool {
    let path = normalize(path);
    path.ends_with(".debug")
        || path.ends_with(".pdb")
        || path.contains(".dSYM/")
        || path.starts_with("lib/debug/")
        || path.contains("/.build-id/")
}
