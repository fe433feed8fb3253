use tilegen_common::{ArchTag, ElementType, LayoutTag};
use tilegen_gemm::{AxisRange, BlockSwizzle, KernelType, TileShapeRange};
use tilegen_library::{GemmSearchSpace, Manifest, ManifestOptions, OperationRegistry};

#[macro_export]
macro_rules! load_source_string {
    ($file:expr) => {
        include_str!($file)
            .replace("\r\n", "\n")
            .trim_end()
            .to_string()
    };
}

pub fn unfiltered() -> Manifest {
    Manifest::new(ManifestOptions::new(Vec::new(), ArchTag::AtlasA2))
}

/// Two basic matmul operations differing by their L1 k extent.
pub fn narrow_basic_matmul() -> GemmSearchSpace {
    let range = TileShapeRange {
        l1_m: AxisRange::fixed(32),
        l1_n: AxisRange::fixed(128),
        l1_k: AxisRange::new(128, 144),
        l0_m: AxisRange::fixed(32),
        l0_n: AxisRange::fixed(128),
        l0_k: AxisRange::fixed(32),
    };

    GemmSearchSpace::new(KernelType::BasicMatmul, range)
        .with_operands([ElementType::Fp16; 3], [LayoutTag::RowMajor; 3])
        .with_swizzle(BlockSwizzle::identity(3, 0))
}

/// Registry producing `count` distinct basic matmul operations.
pub fn registry_with(count: u32) -> OperationRegistry {
    let mut registry = OperationRegistry::new();
    registry.register("basic_matmul", move |manifest| {
        let range = TileShapeRange::with_default_l0(
            AxisRange::fixed(16),
            AxisRange::fixed(16),
            AxisRange::fixed(64),
        );
        let mut space = GemmSearchSpace::new(KernelType::BasicMatmul, range)
            .with_operands([ElementType::Fp16; 3], [LayoutTag::RowMajor; 3]);
        for offset in 0..count {
            space = space.with_swizzle(BlockSwizzle::identity(offset, 0));
        }
        space.register(manifest).map(|_| ())
    });
    registry
}
