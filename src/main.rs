// src/main.rs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use ventilo::lookup::{system_lookup, DependencyLookup, NoLookup};
use ventilo::{
    scan_install_tree, BuildConfig, BuildSystem, GoblinIntrospector, Packager, SpecDocument,
};

#[derive(Parser)]
#[command(name = "ventilo")]
#[command(author, version, about = "Split an installed build tree into binary packages", long_about = None)]
struct Cli {
    /// Verbose logging (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ventilate an install tree and resolve package dependencies
    Ventilate {
        /// Specfile of the source package
        #[arg(short, long)]
        spec: PathBuf,
        /// Directory the build installed into
        #[arg(short, long)]
        install_root: PathBuf,
        /// Build tag appended to the source name
        #[arg(short, long)]
        tag: Option<String>,
        /// Target distribution (overrides the configuration)
        #[arg(long)]
        dist: Option<String>,
        /// Configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Do not query the host package manager
        #[arg(long)]
        no_lookup: bool,
        /// Write the JSON report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the dynamic linking metadata of a binary
    Inspect {
        /// Path to an ELF or PE file
        path: PathBuf,
    },
    /// Show the build system of a source tree
    BuildSystem {
        /// Source directory
        source_dir: PathBuf,
        /// Specfile whose build-system entry takes precedence
        #[arg(short, long)]
        spec: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Ventilate {
            spec,
            install_root,
            tag,
            dist,
            config,
            no_lookup,
            output,
        } => {
            let mut config = BuildConfig::load_or_default(config.as_deref())
                .context("Failed to load configuration")?;
            if let Some(dist) = dist {
                config = config.with_dist(dist);
            }

            let spec = SpecDocument::load(&spec)
                .with_context(|| format!("Failed to load specfile {}", spec.display()))?;
            let install_dir = config.install_dir(&install_root);
            let files = scan_install_tree(&install_dir)
                .with_context(|| format!("Failed to scan {}", install_dir.display()))?;
            info!("Found {} installed files", files.len());

            let introspector = GoblinIntrospector::new(&install_dir);
            let lookup: Box<dyn DependencyLookup> = if no_lookup {
                Box::new(NoLookup)
            } else {
                system_lookup(&config.target_dist, config.search_dirs())
            };

            let report = Packager::new(&config, &introspector, lookup.as_ref())
                .run(&spec, files, tag.as_deref())
                .with_context(|| format!("Failed to package {}", spec.general.name))?;

            match output {
                Some(path) => {
                    report.write_json(&path)?;
                    println!(
                        "Wrote {} packages to {}",
                        report.packages.len(),
                        path.display()
                    );
                }
                None => println!("{}", report.to_json()?),
            }
            if !report.warnings.is_empty() {
                eprintln!("{} dependency warnings", report.warnings.len());
            }
            Ok(())
        }
        Commands::Inspect { path } => {
            match ventilo::introspect::inspect_file(&path) {
                Some(info) => println!("{}", serde_json::to_string_pretty(&info)?),
                None => println!("{}: not a recognized binary", path.display()),
            }
            Ok(())
        }
        Commands::BuildSystem { source_dir, spec } => {
            let declared = match spec {
                Some(path) => SpecDocument::load(&path)?.general.build_system,
                None => None,
            };
            let build_system = BuildSystem::resolve(declared, &source_dir)?;
            println!("{}", build_system);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ventilate_args() {
        let cli = Cli::try_parse_from([
            "ventilo",
            "ventilate",
            "--spec",
            "foo.yaml",
            "--install-root",
            "/tmp/install",
            "--no-lookup",
        ])
        .unwrap();
        match cli.command {
            Commands::Ventilate { spec, no_lookup, tag, .. } => {
                assert_eq!(spec, PathBuf::from("foo.yaml"));
                assert!(no_lookup);
                assert!(tag.is_none());
            }
            _ => panic!("expected ventilate"),
        }
    }
}
