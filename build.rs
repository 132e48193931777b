// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: specfile path
fn spec_arg() -> Arg {
    Arg::new("spec")
        .short('s')
        .long("spec")
        .value_name("FILE")
        .help("Specfile of the source package")
}

fn build_cli() -> Command {
    Command::new("ventilo")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Ventilo Contributors")
        .about("Split an installed build tree into binary packages")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Verbose logging (same as RUST_LOG=debug)"),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("ventilate")
                .about("Ventilate an install tree and resolve package dependencies")
                .arg(spec_arg().required(true))
                .arg(
                    Arg::new("install_root")
                        .short('i')
                        .long("install-root")
                        .value_name("DIR")
                        .required(true)
                        .help("Directory the build installed into"),
                )
                .arg(Arg::new("tag").short('t').long("tag").help("Build tag appended to the source name"))
                .arg(Arg::new("dist").long("dist").help("Target distribution (overrides the configuration)"))
                .arg(Arg::new("config").short('c').long("config").value_name("FILE").help("Configuration file"))
                .arg(
                    Arg::new("no_lookup")
                        .long("no-lookup")
                        .action(ArgAction::SetTrue)
                        .help("Do not query the host package manager"),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("FILE")
                        .help("Write the JSON report here instead of stdout"),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Show the dynamic linking metadata of a binary")
                .arg(Arg::new("path").required(true).help("Path to an ELF or PE file")),
        )
        .subcommand(
            Command::new("build-system")
                .about("Show the build system of a source tree")
                .arg(Arg::new("source_dir").required(true).help("Source directory"))
                .arg(spec_arg()),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();
    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("ventilo.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
