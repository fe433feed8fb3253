use core::fmt::{Display, Write};

use tilegen_common::{ArchTag, GemmTypeDescription, format::join_x};

use crate::kernel::{KernelInstance, KernelType};
use crate::search_space::{TileShape, TileShapeCandidate};

/// Family of library operations, each emitted in its own directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OperationKind {
    Gemm,
}

impl OperationKind {
    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::Gemm => "gemm",
        }
    }

    /// Includes every translation unit of this operation kind starts with.
    pub fn headers(&self) -> &'static [&'static str] {
        match self {
            OperationKind::Gemm => &[
                "#include \"catlass/library/operation.h\"",
                "#include \"catlass/library/manifest.h\"",
                "",
                "#include \"catlass/catlass.hpp\"",
                "#include \"catlass/arch/arch.hpp\"",
                "#include \"catlass/layout/layout.hpp\"",
                "#include \"catlass/gemm/block/block_mmad.hpp\"",
                "#include \"catlass/gemm/block/block_swizzle.hpp\"",
                "#include \"catlass/gemm/dispatch_policy.hpp\"",
                "#include \"catlass/gemm_coord.hpp\"",
                "#include \"catlass/gemm/device/device_gemm.hpp\"",
                "",
                "#include \"gemm_operation.h\"",
            ],
        }
    }
}

impl Display for OperationKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Block swizzle expression, rendered verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockSwizzle {
    expression: String,
}

impl BlockSwizzle {
    pub fn new<S: Into<String>>(expression: S) -> Self {
        Self {
            expression: expression.into(),
        }
    }

    /// The identity swizzle with the given offset and direction.
    pub fn identity(offset: u32, direction: u32) -> Self {
        Self::new(format!(
            "Gemm::Block::GemmIdentityBlockSwizzle<{offset}, {direction}>"
        ))
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// `swizzle{a}x{b}` from the first `<a, b>` integer pair of the expression.
    ///
    /// Empty when the expression has no such pair.
    pub fn short_name(&self) -> String {
        let mut rest = self.expression.as_str();

        while let Some(start) = rest.find('<') {
            rest = &rest[start + 1..];
            if let Some((a, b)) = parse_int_pair(rest) {
                return format!("swizzle{a}x{b}");
            }
        }

        String::new()
    }
}

// Parses `a, b>` where whitespace is allowed around the comma and before `>`.
fn parse_int_pair(input: &str) -> Option<(&str, &str)> {
    let (inner, _) = input.split_once('>')?;
    let (a, b) = inner.split_once(',')?;
    let a = a.trim_end();
    let b = b.trim();
    let is_int = |s: &str| !s.is_empty() && s.bytes().all(|c| c.is_ascii_digit());

    (is_int(a) && is_int(b)).then_some((a, b))
}

/// Sources contributed by one operation to its translation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedOperation {
    /// Includes shared by the operation kind.
    pub operation_headers: &'static [&'static str],
    /// Include providing the kernel class.
    pub kernel_header: String,
    /// Declarations shared by every instance of the kernel.
    pub common_decls: String,
    /// Registration function instantiating the kernel.
    pub body: String,
}

/// One fully specialized gemm kernel variant.
///
/// The name is derived from the inputs only and identifies the variant in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GemmOperation {
    kernel_type: KernelType,
    arch: ArchTag,
    tile: TileShapeCandidate,
    a: GemmTypeDescription,
    b: GemmTypeDescription,
    c: GemmTypeDescription,
    swizzle: BlockSwizzle,
    name: String,
}

impl GemmOperation {
    pub fn new(
        kernel_type: KernelType,
        arch: ArchTag,
        tile: TileShapeCandidate,
        a: GemmTypeDescription,
        b: GemmTypeDescription,
        c: GemmTypeDescription,
        swizzle: BlockSwizzle,
    ) -> Self {
        let name = format!(
            "catlass_{}_{}_{}_{}_{}_{}_{}_{}",
            OperationKind::Gemm,
            kernel_type,
            type_name(&a),
            type_name(&b),
            type_name(&c),
            join_x(tile.l1.dims()),
            join_x(tile.l0.dims()),
            swizzle.short_name(),
        );

        Self {
            kernel_type,
            arch,
            tile,
            a,
            b,
            c,
            swizzle,
            name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> OperationKind {
        OperationKind::Gemm
    }

    pub fn kernel_type(&self) -> KernelType {
        self.kernel_type
    }

    pub fn arch(&self) -> ArchTag {
        self.arch
    }

    pub fn l1(&self) -> TileShape {
        self.tile.l1
    }

    pub fn l0(&self) -> TileShape {
        self.tile.l0
    }

    /// Renders the registration function and collects the includes it needs.
    pub fn render(&self) -> RenderedOperation {
        let instance = self.kernel_type.instance();

        RenderedOperation {
            operation_headers: self.kind().headers(),
            kernel_header: instance.custom_header.to_string(),
            common_decls: instance.custom_common_decls.to_string(),
            body: RegisterFunction {
                operation: self,
                instance: &instance,
            }
            .to_string(),
        }
    }
}

fn type_name(desc: &GemmTypeDescription) -> String {
    format!("{}x{}", desc.element, desc.layout)
}

struct RegisterFunction<'a> {
    operation: &'a GemmOperation,
    instance: &'a KernelInstance,
}

impl Display for RegisterFunction<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let op = self.operation;
        let name = op.name();

        writeln!(f, "void Register_{name}(Manifest &manifest)")?;
        f.write_str("{\n")?;
        writeln!(f, "    using {name} =")?;
        writeln!(f, "        Gemm::Device::DeviceGemm<")?;
        writeln!(f, "            {}<", self.instance.kernel)?;
        writeln!(f, "                Gemm::Block::BlockMmad<")?;

        let block_args = [
            self.instance.dispatch_policy.clone(),
            format!("GemmShape<{}, {}, {}>", op.tile.l1.m, op.tile.l1.n, op.tile.l1.k),
            format!("GemmShape<{}, {}, {}>", op.tile.l0.m, op.tile.l0.n, op.tile.l0.k),
            op.a.to_code(),
            op.b.to_code(),
            op.c.to_code(),
        ];
        for (i, arg) in block_args.iter().enumerate() {
            let sep = if i + 1 < block_args.len() { "," } else { "" };
            writeln!(f, "                    {arg}{sep}")?;
        }

        writeln!(f, "                >,")?;
        writeln!(f, "                void,")?;
        writeln!(f, "                {}", op.swizzle.expression())?;
        writeln!(f, "            >")?;
        writeln!(f, "        >;")?;
        f.write_char('\n')?;
        writeln!(f, "    manifest.Append(")?;
        writeln!(f, "        new {}<{name}>(", self.instance.operation_class)?;
        writeln!(f, "            \"{name}\"")?;
        writeln!(f, "        )")?;
        writeln!(f, "    );")?;
        f.write_str("}\n")
    }
}
