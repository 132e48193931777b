// tests/ventilation.rs

//! Integration tests for ventilation of on-disk install trees.

mod common;

use common::{install_tree, write_spec, TableIntrospector};
use ventilo::package::PackageKind;
use ventilo::{
    scan_install_tree, ventilate, BinaryFormat, BinaryInfo, Error, FileCategory,
    GoblinIntrospector, SourcePackage, SpecDocument,
};

const SPEC: &str = r#"
general:
  name: foo
  version: 1.2.0
  maintainer: Jane Doe <jane@example.com>
  description: foo does things
  ignore:
    - share/foo/tests/.*

foo:
  description: foo command line tools
  sysdepends-debian:
    - python3

foo-extra:
  description: extra data
  files:
    - extra/.*
  depends:
    - foo: any
"#;

fn package_paths(source: &SourcePackage, name: &str) -> Vec<String> {
    source
        .package(name)
        .map(|pkg| pkg.files().paths().map(str::to_string).collect())
        .unwrap_or_default()
}

#[test]
fn test_ventilate_scanned_tree() {
    let tree = install_tree(&[
        "bin/foo",
        "extra/a.txt",
        "extra/b/c.dat",
        "include/foo/foo.h",
        "lib/libfoo.la",
        "lib/libfoo.so",
        "lib/libfoo.so.1",
        "lib/pkgconfig/foo.pc",
        "share/doc/foo/README",
        "share/foo/tests/run.sh",
        "share/man/man1/foo.1.gz",
        "share/man/man3/foo_init.3",
    ]);
    let spec = SpecDocument::parse(SPEC).unwrap();
    let files = scan_install_tree(tree.path()).unwrap();
    let introspector = TableIntrospector::new().with(
        "lib/libfoo.so.1",
        BinaryInfo::library(BinaryFormat::Elf, "libfoo.so.1").with_exports(["foo_init"]),
    );

    let source = ventilate(&spec, files, &introspector, Some("v1.2.0"), "debian").unwrap();

    assert_eq!(source.srcname, "foo_v1.2.0");
    assert_eq!(
        package_paths(&source, "foo"),
        vec!["bin/foo", "share/man/man1/foo.1.gz"]
    );
    assert_eq!(
        package_paths(&source, "foo-extra"),
        vec!["extra/a.txt", "extra/b/c.dat"]
    );
    assert_eq!(package_paths(&source, "libfoo1"), vec!["lib/libfoo.so.1"]);
    assert_eq!(
        package_paths(&source, "foo-devel"),
        vec!["include/foo/foo.h", "lib/libfoo.so", "lib/pkgconfig/foo.pc"]
    );
    assert_eq!(
        package_paths(&source, "foo-doc"),
        vec!["share/doc/foo/README", "share/man/man3/foo_init.3"]
    );
    assert_eq!(
        source.ignored().paths().collect::<Vec<_>>(),
        vec!["lib/libfoo.la", "share/foo/tests/run.sh"]
    );
    assert!(source.package("foo-debug").is_none());

    let lib = source.package("libfoo1").unwrap();
    assert_eq!(lib.kind, PackageKind::Library);
    assert_eq!(
        lib.description,
        "foo does things\nautomatically generated around SONAME libfoo.so.1"
    );

    let main = source.package("foo").unwrap();
    assert_eq!(main.kind, PackageKind::Default(FileCategory::Main));
    assert_eq!(main.sysdepends, vec!["python3".to_string()]);
}

#[test]
fn test_every_file_lands_exactly_once() {
    let paths = [
        "bin/foo",
        "extra/a.txt",
        "lib/debug/foo.debug",
        "lib/libfoo.so.1",
        "share/foo/icons/foo.png",
        "share/foo/tests/run.sh",
    ];
    let tree = install_tree(&paths);
    let spec = SpecDocument::parse(SPEC).unwrap();
    let files = scan_install_tree(tree.path()).unwrap();

    let source = ventilate(&spec, files, &TableIntrospector::new(), None, "debian").unwrap();

    let mut seen: Vec<String> = source.ignored().paths().map(str::to_string).collect();
    for pkg in source.packages().values() {
        seen.extend(pkg.files().paths().map(str::to_string));
    }
    seen.sort();
    assert_eq!(seen, paths.iter().map(|p| p.to_string()).collect::<Vec<_>>());
    assert_eq!(package_paths(&source, "foo-debug"), vec!["lib/debug/foo.debug"]);
}

#[test]
fn test_spec_file_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_spec(dir.path(), SPEC);

    let spec = SpecDocument::load(&path).unwrap();
    assert_eq!(spec.general.name, "foo");
    assert_eq!(spec.packages.len(), 2);
}

#[test]
fn test_empty_custom_package_aborts() {
    let tree = install_tree(&["bin/foo"]);
    let spec = SpecDocument::parse(SPEC).unwrap();
    let files = scan_install_tree(tree.path()).unwrap();

    let err = ventilate(&spec, files, &TableIntrospector::new(), None, "debian").unwrap_err();
    assert!(matches!(err, Error::EmptyPackage(ref name) if name == "foo-extra"));
}

#[test]
fn test_non_binaries_on_disk_are_not_libraries() {
    // Files named like libraries but holding no ELF image
    let tree = install_tree(&["extra/x", "lib/libfoo.so.1", "lib/libbar.so.2"]);
    let spec = SpecDocument::parse(SPEC).unwrap();
    let files = scan_install_tree(tree.path()).unwrap();
    let introspector = GoblinIntrospector::new(tree.path());

    let source = ventilate(&spec, files, &introspector, None, "debian").unwrap();
    assert!(source.library_packages().is_empty());
    assert_eq!(
        package_paths(&source, "foo"),
        vec!["lib/libbar.so.2", "lib/libfoo.so.1"]
    );
}

#[test]
fn test_real_shared_library_gets_its_package() {
    let Some(libc) = ["/lib/x86_64-linux-gnu", "/usr/lib/x86_64-linux-gnu", "/lib64", "/usr/lib64"]
        .iter()
        .map(|dir| std::path::Path::new(dir).join("libc.so.6"))
        .find(|path| path.is_file())
    else {
        return;
    };
    let tree = install_tree(&["extra/a.txt"]);
    std::fs::create_dir_all(tree.path().join("lib")).unwrap();
    std::fs::copy(&libc, tree.path().join("lib/libc.so.6")).unwrap();

    let spec = SpecDocument::parse(SPEC).unwrap();
    let files = scan_install_tree(tree.path()).unwrap();
    let introspector = GoblinIntrospector::new(tree.path());

    let source = ventilate(&spec, files, &introspector, None, "debian").unwrap();
    assert_eq!(package_paths(&source, "libc6"), vec!["lib/libc.so.6"]);
    assert_eq!(source.package("libc6").unwrap().kind, PackageKind::Library);
}
