use tilegen_common::{ElementType, GemmTypeDescription, GenerateError, LayoutTag};
use tilegen_gemm::{
    AxisRange, BlockSwizzle, ElementSizes, GemmOperation, KernelType, TileShapePruning,
    TileShapeRange, TileShapeSearch,
};

use crate::{Manifest, OperationRegistry};

/// Step used by the stock search spaces.
pub const DEFAULT_STEP: u32 = 16;

/// Declarative description of a family of gemm kernels.
///
/// Every combination of operand types, accepted tile shape and swizzle becomes one operation.
#[derive(Debug, Clone)]
pub struct GemmSearchSpace {
    pub kernel_type: KernelType,
    /// A, B and C operand descriptions.
    pub operands: Vec<[GemmTypeDescription; 3]>,
    pub ranges: Vec<TileShapeRange>,
    pub step: u32,
    pub element_sizes: ElementSizes,
    pub pruning: TileShapePruning,
    pub swizzles: Vec<BlockSwizzle>,
}

impl GemmSearchSpace {
    /// Search space using the kernel's pruning, the default step and fp16 element sizes.
    pub fn new(kernel_type: KernelType, range: TileShapeRange) -> Self {
        Self {
            kernel_type,
            operands: Vec::new(),
            ranges: vec![range],
            step: DEFAULT_STEP,
            element_sizes: ElementSizes::default(),
            pruning: kernel_type.default_pruning(),
            swizzles: Vec::new(),
        }
    }

    pub fn with_operands(
        mut self,
        element: [ElementType; 3],
        layout: [LayoutTag; 3],
    ) -> Self {
        self.operands.push(core::array::from_fn(|i| {
            GemmTypeDescription::new(element[i], layout[i])
        }));
        self
    }

    pub fn with_range(mut self, range: TileShapeRange) -> Self {
        self.ranges.push(range);
        self
    }

    pub fn with_step(mut self, step: u32) -> Self {
        self.step = step;
        self
    }

    pub fn with_element_sizes(mut self, element_sizes: ElementSizes) -> Self {
        self.element_sizes = element_sizes;
        self
    }

    pub fn with_pruning(mut self, pruning: TileShapePruning) -> Self {
        self.pruning = pruning;
        self
    }

    pub fn with_swizzle(mut self, swizzle: BlockSwizzle) -> Self {
        self.swizzles.push(swizzle);
        self
    }

    /// Appends every operation of the search space, returning how many were retained.
    pub fn register(&self, manifest: &mut Manifest) -> Result<usize, GenerateError> {
        let arch = manifest.arch();
        let constraint = self.pruning.constraint(arch.buffer_capacity());
        let mut retained = 0;

        for range in self.ranges.iter() {
            let search = TileShapeSearch::new(*range, self.step, self.element_sizes, &constraint)?;
            let tile_shapes: Vec<_> = search.iter().collect();
            log::info!("{} tile_shapes size={}", self.kernel_type, tile_shapes.len());

            for [a, b, c] in self.operands.iter() {
                for tile in tile_shapes.iter() {
                    for swizzle in self.swizzles.iter() {
                        let op = GemmOperation::new(
                            self.kernel_type,
                            arch,
                            *tile,
                            *a,
                            *b,
                            *c,
                            swizzle.clone(),
                        );
                        if manifest.append(op) {
                            retained += 1;
                        }
                    }
                }
            }
        }

        Ok(retained)
    }
}

/// Single-kernel configuration: one operand combination, L1 ranges and a swizzle.
///
/// L0 ranges are derived with [TileShapeRange::with_default_l0].
#[derive(Debug, Clone)]
pub struct SearchSpaceConfiguration {
    pub kernel_type: KernelType,
    pub data_types: [ElementType; 3],
    pub layouts: [LayoutTag; 3],
    pub l1_tile_m_range: AxisRange,
    pub l1_tile_n_range: AxisRange,
    pub l1_tile_k_range: AxisRange,
    pub block_swizzle: BlockSwizzle,
}

impl SearchSpaceConfiguration {
    pub fn search_space(&self) -> GemmSearchSpace {
        let range = TileShapeRange::with_default_l0(
            self.l1_tile_m_range,
            self.l1_tile_n_range,
            self.l1_tile_k_range,
        );

        GemmSearchSpace::new(self.kernel_type, range)
            .with_operands(self.data_types, self.layouts)
            .with_swizzle(self.block_swizzle.clone())
    }
}

/// Registers the operations of a single-kernel configuration.
pub fn register_custom_kernel(
    config: &SearchSpaceConfiguration,
    manifest: &mut Manifest,
) -> Result<(), GenerateError> {
    config.search_space().register(manifest).map(|_| ())
}

/// Stock `basic_matmul` search space.
pub fn basic_matmul_search_space() -> GemmSearchSpace {
    let range = TileShapeRange {
        l1_m: AxisRange::new(32, 128),
        l1_n: AxisRange::new(128, 256),
        l1_k: AxisRange::new(128, 256),
        l0_m: AxisRange::new(32, 128),
        l0_n: AxisRange::new(128, 256),
        l0_k: AxisRange::new(32, 64),
    };

    GemmSearchSpace::new(KernelType::BasicMatmul, range)
        .with_operands([ElementType::Fp16; 3], [LayoutTag::RowMajor; 3])
        .with_swizzle(BlockSwizzle::identity(3, 0))
}

/// Stock `grouped_matmul` search space.
pub fn grouped_matmul_search_space() -> GemmSearchSpace {
    let range = TileShapeRange {
        l1_m: AxisRange::new(128, 256),
        l1_n: AxisRange::new(128, 256),
        l1_k: AxisRange::new(128, 256),
        l0_m: AxisRange::new(128, 256),
        l0_n: AxisRange::new(128, 256),
        l0_k: AxisRange::new(32, 64),
    };

    GemmSearchSpace::new(KernelType::GroupedMatmul, range)
        .with_operands(
            [ElementType::Fp16; 3],
            [LayoutTag::ColumnMajor, LayoutTag::RowMajor, LayoutTag::RowMajor],
        )
        .with_swizzle(BlockSwizzle::identity(3, 1))
}

/// High priority `basic_matmul` configuration, overriding the stock search space.
pub fn basic_matmul_configuration() -> SearchSpaceConfiguration {
    SearchSpaceConfiguration {
        kernel_type: KernelType::BasicMatmul,
        data_types: [ElementType::Fp16; 3],
        layouts: [LayoutTag::RowMajor; 3],
        l1_tile_m_range: AxisRange::new(32, 128),
        l1_tile_n_range: AxisRange::new(128, 256),
        l1_tile_k_range: AxisRange::new(128, 256),
        block_swizzle: BlockSwizzle::identity(3, 0),
    }
}

impl OperationRegistry {
    /// Registry holding the stock search spaces.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(KernelType::BasicMatmul.name(), |manifest| {
            basic_matmul_search_space().register(manifest).map(|_| ())
        });
        registry.register(KernelType::GroupedMatmul.name(), |manifest| {
            grouped_matmul_search_space().register(manifest).map(|_| ())
        });
        registry.register_high_priority(KernelType::BasicMatmul.name(), |manifest| {
            register_custom_kernel(&basic_matmul_configuration(), manifest)
        });

        registry
    }
}
