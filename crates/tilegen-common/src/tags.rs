use core::fmt::Display;
use core::str::FromStr;

use strum::{EnumIter, IntoEnumIterator};

use crate::ConfigError;

/// Element data type of a matrix operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter)]
pub enum ElementType {
    /// Unsigned 8-bit integer.
    Uint8,
    /// Signed 8-bit integer.
    Int8,
    /// Signed 32-bit integer.
    Int32,
    /// IEEE half precision.
    Fp16,
    /// Brain floating point.
    Bf16,
    /// IEEE single precision.
    Fp32,
}

impl ElementType {
    /// Short code used in generated kernel names.
    pub fn name(&self) -> &'static str {
        match self {
            ElementType::Uint8 => "uint8",
            ElementType::Int8 => "int8",
            ElementType::Int32 => "int32",
            ElementType::Fp16 => "fp16",
            ElementType::Bf16 => "bf16",
            ElementType::Fp32 => "fp32",
        }
    }

    /// Device-side C++ type.
    pub fn to_code(&self) -> &'static str {
        match self {
            ElementType::Uint8 => "uint8_t",
            ElementType::Int8 => "int8_t",
            ElementType::Int32 => "int32_t",
            ElementType::Fp16 => "half",
            ElementType::Bf16 => "bfloat16_t",
            ElementType::Fp32 => "float32_t",
        }
    }

    /// Storage size of one element.
    pub fn size_in_bytes(&self) -> u32 {
        match self {
            ElementType::Uint8 | ElementType::Int8 => 1,
            ElementType::Fp16 | ElementType::Bf16 => 2,
            ElementType::Int32 | ElementType::Fp32 => 4,
        }
    }

    /// Value of the dtype field of a tiling key.
    pub fn dispatch_code(&self) -> Result<u8, ConfigError> {
        match self {
            ElementType::Fp16 => Ok(0),
            ElementType::Fp32 => Ok(1),
            _ => Err(ConfigError::UnsupportedDispatchType {
                kind: "element type",
                value: self.name().to_string(),
            }),
        }
    }

    /// Host-side scalar spelling used by dispatch wrappers.
    pub fn dispatch_name(&self) -> Result<&'static str, ConfigError> {
        match self {
            ElementType::Fp16 => Ok("half"),
            ElementType::Fp32 => Ok("float"),
            _ => Err(ConfigError::UnsupportedDispatchType {
                kind: "element type",
                value: self.name().to_string(),
            }),
        }
    }
}

impl Display for ElementType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ElementType {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "half" => Ok(ElementType::Fp16),
            "float" => Ok(ElementType::Fp32),
            "bfloat16" => Ok(ElementType::Bf16),
            _ => parse_tag("element type", value, ElementType::name),
        }
    }
}

/// Memory layout of a matrix operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter)]
pub enum LayoutTag {
    /// Column major.
    ColumnMajor,
    /// Row major.
    RowMajor,
    /// Fractal `nZ`.
    NZ,
    /// Fractal `zN`.
    ZN,
    /// Fractal `zZ`.
    ZZ,
    /// Fractal `nN`.
    NN,
    /// Row major with padded leading dimension.
    PaddingRowMajor,
    /// Column major with padded leading dimension.
    PaddingColumnMajor,
    /// One dimensional vector.
    VectorLayout,
}

impl LayoutTag {
    /// Short code used in generated kernel names.
    pub fn name(&self) -> &'static str {
        match self {
            LayoutTag::ColumnMajor => "ColumnMajor",
            LayoutTag::RowMajor => "RowMajor",
            LayoutTag::NZ => "nZ",
            LayoutTag::ZN => "zN",
            LayoutTag::ZZ => "zZ",
            LayoutTag::NN => "nN",
            LayoutTag::PaddingRowMajor => "PaddingRowMajor",
            LayoutTag::PaddingColumnMajor => "PaddingColumnMajor",
            LayoutTag::VectorLayout => "VectorLayout",
        }
    }

    /// Layout type relative to the `Catlass` namespace.
    pub fn to_code(&self) -> &'static str {
        match self {
            LayoutTag::ColumnMajor => "layout::ColumnMajor",
            LayoutTag::RowMajor => "layout::RowMajor",
            LayoutTag::NZ => "layout::nZ",
            LayoutTag::ZN => "layout::zN",
            LayoutTag::ZZ => "layout::zZ",
            LayoutTag::NN => "layout::nN",
            LayoutTag::PaddingRowMajor => "layout::PaddingRowMajor",
            LayoutTag::PaddingColumnMajor => "layout::PaddingColumnMajor",
            LayoutTag::VectorLayout => "layout::VectorLayout",
        }
    }

    /// Fully qualified layout type, used outside the library namespace.
    pub fn to_qualified_code(&self) -> String {
        format!("Catlass::{}", self.to_code())
    }

    /// Value of a layout field of a tiling key.
    pub fn dispatch_code(&self) -> Result<u8, ConfigError> {
        match self {
            LayoutTag::RowMajor => Ok(0),
            LayoutTag::ColumnMajor => Ok(1),
            _ => Err(ConfigError::UnsupportedDispatchType {
                kind: "layout",
                value: self.name().to_string(),
            }),
        }
    }

    /// Inverse of [dispatch_code](LayoutTag::dispatch_code).
    pub fn from_dispatch_code(code: u8) -> Result<Self, ConfigError> {
        match code {
            0 => Ok(LayoutTag::RowMajor),
            1 => Ok(LayoutTag::ColumnMajor),
            _ => Err(ConfigError::UnknownTag {
                kind: "layout",
                value: code.to_string(),
            }),
        }
    }
}

impl Display for LayoutTag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LayoutTag {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        parse_tag("layout", value, LayoutTag::name)
    }
}

/// Padding strategy applied to an operand before the main kernel runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter)]
pub enum PaddingTag {
    /// Operand is consumed as is.
    NoPadding,
    /// Leading dimension padded to an aligned stride.
    PaddingNd,
    /// Operand padded block by block to the L1 tile shape.
    PaddingBlockNd,
    /// Operand converted to the fractal `nZ` layout.
    PaddingNz,
}

impl PaddingTag {
    /// Short code used in generated names and tiling keys.
    pub fn name(&self) -> &'static str {
        match self {
            PaddingTag::NoPadding => "NO_PADDING",
            PaddingTag::PaddingNd => "PADDING_ND",
            PaddingTag::PaddingBlockNd => "PADDING_BLOCK_ND",
            PaddingTag::PaddingNz => "PADDING_NZ",
        }
    }

    /// Kernel side enum value.
    pub fn to_code(&self) -> String {
        format!("PaddingTag::{}", self.name())
    }

    /// Value of a padding field of a tiling key.
    pub fn dispatch_code(&self) -> u8 {
        match self {
            PaddingTag::NoPadding => 0,
            PaddingTag::PaddingNd => 1,
            PaddingTag::PaddingBlockNd => 2,
            PaddingTag::PaddingNz => 3,
        }
    }

    /// Inverse of [dispatch_code](PaddingTag::dispatch_code).
    pub fn from_dispatch_code(code: u8) -> Result<Self, ConfigError> {
        PaddingTag::iter()
            .find(|tag| tag.dispatch_code() == code)
            .ok_or_else(|| ConfigError::UnknownTag {
                kind: "padding",
                value: code.to_string(),
            })
    }
}

impl Display for PaddingTag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PaddingTag {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        parse_tag("padding", value, PaddingTag::name)
    }
}

/// Target hardware generation.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum ArchTag {
    /// Atlas A2 training and inference series.
    #[default]
    AtlasA2,
}

impl ArchTag {
    /// Short code, also accepted on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            ArchTag::AtlasA2 => "AtlasA2",
        }
    }

    /// Architecture type relative to the `Catlass` namespace.
    pub fn to_code(&self) -> &'static str {
        match self {
            ArchTag::AtlasA2 => "Arch::AtlasA2",
        }
    }

    /// Fully qualified architecture type.
    pub fn to_qualified_code(&self) -> String {
        format!("Catlass::{}", self.to_code())
    }

    /// On-chip buffer sizes available to a single core.
    pub fn buffer_capacity(&self) -> BufferCapacity {
        match self {
            ArchTag::AtlasA2 => BufferCapacity::ATLAS_A2,
        }
    }
}

impl Display for ArchTag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ArchTag {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "A2" => Ok(ArchTag::AtlasA2),
            _ => parse_tag("arch", value, ArchTag::name),
        }
    }
}

/// Byte capacities of the on-chip staging buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferCapacity {
    /// L1 buffer, shared by the A and B operands.
    pub l1: u64,
    /// L0A buffer, holds the A operand.
    pub l0a: u64,
    /// L0B buffer, holds the B operand.
    pub l0b: u64,
    /// L0C buffer, holds the accumulator.
    pub l0c: u64,
}

impl BufferCapacity {
    /// Capacities of the Atlas A2 cube core.
    pub const ATLAS_A2: BufferCapacity = BufferCapacity {
        l1: 512 * 1024,
        l0a: 64 * 1024,
        l0b: 64 * 1024,
        l0c: 128 * 1024,
    };
}

impl Default for BufferCapacity {
    fn default() -> Self {
        Self::ATLAS_A2
    }
}

/// Element type and layout of one operand in global memory.
#[derive(new, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GemmTypeDescription {
    /// Element type.
    pub element: ElementType,
    /// Layout.
    pub layout: LayoutTag,
}

impl GemmTypeDescription {
    /// Kernel side `GemmType` instantiation.
    pub fn to_code(&self) -> String {
        format!(
            "Gemm::GemmType<{}, {}>",
            self.element.to_code(),
            self.layout.to_code()
        )
    }
}

fn parse_tag<T: IntoEnumIterator>(
    kind: &'static str,
    value: &str,
    name: fn(&T) -> &'static str,
) -> Result<T, ConfigError> {
    T::iter()
        .find(|tag| name(tag) == value)
        .ok_or_else(|| ConfigError::UnknownTag {
            kind,
            value: value.to_string(),
        })
}
