use std::path::{Path, PathBuf};

use tilegen_common::{
    ArchTag, ConfigError, ElementType, GenerateError,
    config::{
        Logger,
        dispatch::{DispatchConfig, DispatchLogLevel},
    },
    fs::{ensure_dir, write_file},
};

use crate::{
    family::KernelFamily,
    launch_map::{LAUNCH_MAP_FILE, LaunchMap},
    wrapper::WrapperVariant,
};

/// Generates the host wrappers of the kernel families and the dispatch header.
#[derive(new, Debug, Clone)]
pub struct DispatchGenerator {
    arch: ArchTag,
    elements: Vec<ElementType>,
    families: Vec<KernelFamily>,
}

/// Every variant of a run with its launch map, validated and ready to be written.
#[derive(Debug, Clone)]
pub struct DispatchPlan {
    pub variants: Vec<WrapperVariant>,
    pub launch_map: LaunchMap,
}

/// Files written by a dispatch generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub wrapper_files: Vec<PathBuf>,
    pub launch_map_file: PathBuf,
}

impl DispatchGenerator {
    pub fn from_config(config: &DispatchConfig, arch: ArchTag) -> Result<Self, ConfigError> {
        let elements = config
            .dtypes
            .iter()
            .map(|name| name.parse())
            .collect::<Result<Vec<ElementType>, _>>()?;
        let families = config
            .families
            .iter()
            .map(|name| name.parse())
            .collect::<Result<Vec<KernelFamily>, _>>()?;

        Ok(Self::new(arch, elements, families))
    }

    /// Enumerates the variants and builds the launch map.
    ///
    /// Fails on unsupported tags and on tiling-key collisions, before anything is written.
    pub fn plan(&self) -> Result<DispatchPlan, GenerateError> {
        let mut variants = Vec::new();
        let mut launch_map = LaunchMap::new();

        for element in self.elements.iter() {
            for family in self.families.iter() {
                let family_variants = WrapperVariant::enumerate(*family, self.arch, *element)?;
                log::info!(
                    "{family} {element}: {} wrappers",
                    family_variants.len()
                );

                for variant in family_variants {
                    launch_map.insert(variant.tiling_key(), variant.name())?;
                    variants.push(variant);
                }
            }
        }

        Ok(DispatchPlan {
            variants,
            launch_map,
        })
    }

    /// Writes one source per variant into `wrapper_dir`, then the launch map into
    /// `include_dir`.
    pub fn generate(
        &self,
        wrapper_dir: &Path,
        include_dir: &Path,
        logger: &mut Logger,
    ) -> Result<DispatchReport, GenerateError> {
        let plan = self.plan()?;
        let sources: Vec<_> = plan
            .variants
            .iter()
            .map(|variant| (variant.file_name(), variant.source()))
            .collect();
        let header = plan.launch_map.to_string();

        ensure_dir(wrapper_dir)?;
        let mut wrapper_files = Vec::with_capacity(sources.len());
        for (variant, (file_name, source)) in plan.variants.iter().zip(sources) {
            if let DispatchLogLevel::Full = logger.log_level_dispatch() {
                logger.log_dispatch(&format_args!(
                    "{} -> {}",
                    variant.tiling_key(),
                    variant.name()
                ));
            }
            let path = wrapper_dir.join(file_name);
            write_file(&path, &source)?;
            wrapper_files.push(path);
        }

        ensure_dir(include_dir)?;
        let launch_map_file = include_dir.join(LAUNCH_MAP_FILE);
        write_file(&launch_map_file, &header)?;

        log::info!(
            "Generated {} wrappers and {}",
            wrapper_files.len(),
            launch_map_file.display()
        );

        Ok(DispatchReport {
            wrapper_files,
            launch_map_file,
        })
    }
}
