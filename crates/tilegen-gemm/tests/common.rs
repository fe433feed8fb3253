use tilegen_common::{ArchTag, ElementType, GemmTypeDescription, LayoutTag};
use tilegen_gemm::{BlockSwizzle, GemmOperation, KernelType, TileShape, TileShapeCandidate};

#[macro_export]
macro_rules! load_source_string {
    ($file:expr) => {
        include_str!($file)
            .replace("\r\n", "\n")
            .trim_end()
            .to_string()
    };
}

pub fn gemm(
    kernel_type: KernelType,
    l1: (u32, u32, u32),
    l0: (u32, u32, u32),
    layouts: [LayoutTag; 3],
    swizzle: BlockSwizzle,
) -> GemmOperation {
    let desc = |layout| GemmTypeDescription::new(ElementType::Fp16, layout);

    GemmOperation::new(
        kernel_type,
        ArchTag::AtlasA2,
        TileShapeCandidate::new(TileShape::from(l1), TileShape::from(l0)),
        desc(layouts[0]),
        desc(layouts[1]),
        desc(layouts[2]),
        swizzle,
    )
}
