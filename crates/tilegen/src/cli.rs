//! Command line front end.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tilegen_common::{
    ArchTag,
    config::{GeneratorConfig, Logger, split_list},
};
use tilegen_dispatch::{DispatchGenerator, DispatchReport};
use tilegen_library::{EmissionReport, Manifest, ManifestOptions, OperationRegistry};

/// Directory created under the workspace by the library generator.
pub const GENERATED_DIR: &str = "generated";

#[derive(Parser, Debug)]
#[command(name = "tilegen", version, about)]
pub struct Args {
    /// Configuration file, searched upward from the working directory when omitted
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate the kernel library sources
    Library {
        /// Directory receiving the `generated` output tree
        #[arg(long)]
        workspace_dir: PathBuf,

        /// Comma separated substrings a kernel name must contain to be generated
        #[arg(long)]
        kernels: Option<String>,

        /// Target architecture
        #[arg(long)]
        arch: Option<ArchTag>,
    },
    /// Generate the host wrappers and the dispatch header
    Dispatch {
        /// Directory receiving one wrapper source per variant
        #[arg(long)]
        wrapper_dir: PathBuf,

        /// Directory receiving `launch_map.h`
        #[arg(long)]
        include_dir: PathBuf,

        /// Scalar type to generate, may be repeated
        #[arg(long = "dtype")]
        dtypes: Vec<String>,

        /// Kernel family to generate, may be repeated
        #[arg(long = "family")]
        families: Vec<String>,
    },
}

/// Loads the configuration, applying environment then command line overrides.
pub fn load_config(args: &Args) -> anyhow::Result<GeneratorConfig> {
    let config = match &args.config {
        Some(path) => GeneratorConfig::from_file_path(path)?,
        None => {
            let cwd = std::env::current_dir().context("Unable to read the working directory")?;
            GeneratorConfig::from_dir(&cwd)?
        }
    };
    let mut config = config.override_from_env()?;

    match &args.command {
        Command::Library { kernels, arch, .. } => {
            if let Some(kernels) = kernels {
                config.library.kernels = split_list(kernels);
            }
            if let Some(arch) = arch {
                config.library.arch = *arch;
            }
        }
        Command::Dispatch {
            dtypes, families, ..
        } => {
            if !dtypes.is_empty() {
                config.dispatch.dtypes = dtypes.clone();
            }
            if !families.is_empty() {
                config.dispatch.families = families.clone();
            }
        }
    }

    Ok(config)
}

pub fn run(args: Args) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    let mut logger = Logger::new(&config)?;

    match &args.command {
        Command::Library { workspace_dir, .. } => {
            let report = generate_library(&config, workspace_dir, &mut logger)?;
            log::info!(
                "Wrote {} files under {}",
                report.files().len(),
                report.root.display()
            );
        }
        Command::Dispatch {
            wrapper_dir,
            include_dir,
            ..
        } => {
            generate_dispatch(&config, wrapper_dir, include_dir, &mut logger)?;
        }
    }

    Ok(())
}

/// Runs the stock registrations and emits the library under `<workspace_dir>/generated`.
pub fn generate_library(
    config: &GeneratorConfig,
    workspace_dir: &Path,
    logger: &mut Logger,
) -> anyhow::Result<EmissionReport> {
    let registry = OperationRegistry::with_defaults();
    let mut manifest = Manifest::new(ManifestOptions::from_config(&config.library));

    manifest.run(&registry)?;
    if manifest.filtered_out() > 0 {
        log::info!(
            "{} operations excluded by the kernel filter {:?}",
            manifest.filtered_out(),
            config.library.kernels
        );
    }

    let root = workspace_dir.join(GENERATED_DIR);
    let report = manifest
        .emit(&root, logger)
        .with_context(|| format!("Unable to emit the kernel library to {}", root.display()))?;

    Ok(report)
}

pub fn generate_dispatch(
    config: &GeneratorConfig,
    wrapper_dir: &Path,
    include_dir: &Path,
    logger: &mut Logger,
) -> anyhow::Result<DispatchReport> {
    let generator = DispatchGenerator::from_config(&config.dispatch, config.library.arch)?;
    let report = generator.generate(wrapper_dir, include_dir, logger)?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn library_flags_override_the_config() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = tmp.path().join("tilegen.toml");
        std::fs::write(&config_path, "[library]\nkernels = [\"grouped_matmul\"]\n").unwrap();
        let args = Args::parse_from([
            "tilegen",
            "--config",
            config_path.to_str().unwrap(),
            "library",
            "--workspace-dir",
            "out",
            "--kernels",
            "basic_matmul,x128_",
        ]);

        let config = load_config(&args).unwrap();

        assert_eq!(
            config.library.kernels,
            vec!["basic_matmul".to_string(), "x128_".to_string()]
        );
    }

    #[test]
    fn dispatch_flags_are_repeatable() {
        let args = Args::parse_from([
            "tilegen",
            "dispatch",
            "--wrapper-dir",
            "wrapper",
            "--include-dir",
            "include",
            "--dtype",
            "half",
            "--dtype",
            "float",
            "--family",
            "small_matmul",
        ]);

        match args.command {
            Command::Dispatch {
                dtypes, families, ..
            } => {
                assert_eq!(dtypes, vec!["half".to_string(), "float".to_string()]);
                assert_eq!(families, vec!["small_matmul".to_string()]);
            }
            command => panic!("unexpected command {command:?}"),
        }
    }

    #[test]
    fn unknown_arch_is_rejected_by_the_parser() {
        let result = Args::try_parse_from([
            "tilegen",
            "library",
            "--workspace-dir",
            "out",
            "--arch",
            "AtlasZ9",
        ]);

        assert!(result.is_err());
    }

    #[test]
    fn library_is_written_under_generated() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = GeneratorConfig::default();
        config.library.kernels = vec!["basic_matmul".to_string()];

        let report = generate_library(&config, tmp.path(), &mut Logger::disabled()).unwrap();

        assert_eq!(report.root, tmp.path().join(GENERATED_DIR));
        assert!(report.register_all_file.is_file());
        assert!(
            report
                .kinds
                .iter()
                .all(|kind| kind.group_files.iter().all(|file| file.is_file()))
        );
    }

    #[test]
    fn dispatch_uses_the_configured_families() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = GeneratorConfig::default();
        config.dispatch.families = vec!["small_matmul".to_string()];

        let report = generate_dispatch(
            &config,
            &tmp.path().join("wrapper"),
            &tmp.path().join("include"),
            &mut Logger::disabled(),
        )
        .unwrap();

        assert_eq!(report.wrapper_files.len(), 4);
        assert!(report.launch_map_file.is_file());
    }
}
