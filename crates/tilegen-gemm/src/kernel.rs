use core::fmt::Display;
use core::str::FromStr;

use strum::EnumIter;
use tilegen_common::ConfigError;

use crate::search_space::{PreloadAsyncStages, TileShapePruning};

/// Device-level gemm kernel templates the library can instantiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter)]
pub enum KernelType {
    BasicMatmul,
    GroupedMatmul,
}

impl KernelType {
    pub fn name(&self) -> &'static str {
        match self {
            KernelType::BasicMatmul => "basic_matmul",
            KernelType::GroupedMatmul => "grouped_matmul",
        }
    }

    /// The template and headers used to instantiate this kernel.
    pub fn instance(&self) -> KernelInstance {
        match self {
            KernelType::BasicMatmul => KernelInstance {
                kernel: "Gemm::Kernel::BasicMatmul",
                dispatch_policy: "Gemm::MmadAtlasA2Pingpong<true>".to_string(),
                operation_class: "BasicMatmulGemmOperation",
                custom_header: "#include \"catlass/gemm/kernel/basic_matmul.hpp\"",
                custom_common_decls: "",
            },
            KernelType::GroupedMatmul => {
                let s = PreloadAsyncStages::default();
                KernelInstance {
                    kernel: "Gemm::Kernel::GroupedMatmul",
                    dispatch_policy: format!(
                        "Gemm::MmadAtlasA2PreloadAsync<{},{},{},{},{},true,true>",
                        s.preload, s.l1, s.l0a, s.l0b, s.l0c
                    ),
                    operation_class: "GroupedMatmulGemmOperation",
                    custom_header: "#include \"catlass/gemm/kernel/grouped_matmul.hpp\"",
                    custom_common_decls: "",
                }
            }
        }
    }

    /// Pruning matching the pipeline of the kernel's dispatch policy.
    pub fn default_pruning(&self) -> TileShapePruning {
        match self {
            KernelType::BasicMatmul => TileShapePruning::Pingpong { stages: 2 },
            KernelType::GroupedMatmul => {
                TileShapePruning::PreloadAsync(PreloadAsyncStages::default())
            }
        }
    }
}

impl Display for KernelType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KernelType {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "basic_matmul" => Ok(KernelType::BasicMatmul),
            "grouped_matmul" => Ok(KernelType::GroupedMatmul),
            _ => Err(ConfigError::UnknownKernelType(value.to_string())),
        }
    }
}

/// Instantiation template of a [KernelType].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelInstance {
    /// Device kernel class template.
    pub kernel: &'static str,
    /// MMAD dispatch policy of the block.
    pub dispatch_policy: String,
    /// Library operation class registered with the manifest.
    pub operation_class: &'static str,
    /// Include providing the kernel class.
    pub custom_header: &'static str,
    /// Declarations shared by every instance of the kernel.
    pub custom_common_decls: &'static str,
}
