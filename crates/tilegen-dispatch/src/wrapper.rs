use core::fmt::{Display, Write};

use tilegen_common::{
    ArchTag, ConfigError, ElementType, LayoutTag,
    format::{camel_to_snake, capitalize},
};

use crate::family::{KernelFamily, PaddingTuple};
use crate::tiling_key::{TilingKey, TilingKeyFields};

/// Layouts A and B are instantiated with, in tiling-key order.
pub const DISPATCH_LAYOUTS: [LayoutTag; 2] = [LayoutTag::RowMajor, LayoutTag::ColumnMajor];

/// Layout of C for every dispatch variant.
pub const LAYOUT_C: LayoutTag = LayoutTag::RowMajor;

/// One host-side wrapper around a kernel family instantiation.
///
/// The wrapper defines `Launch<name>` and `<name>GetWorkspaceSize`, referenced by the
/// launch map under the variant's tiling key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WrapperVariant {
    family: KernelFamily,
    arch: ArchTag,
    element: ElementType,
    layout_a: LayoutTag,
    layout_b: LayoutTag,
    padding: Option<PaddingTuple>,
    name: String,
    key: TilingKey,
}

impl WrapperVariant {
    /// Fails when a tag has no dispatch code.
    pub fn new(
        family: KernelFamily,
        arch: ArchTag,
        element: ElementType,
        layout_a: LayoutTag,
        layout_b: LayoutTag,
        padding: Option<PaddingTuple>,
    ) -> Result<Self, ConfigError> {
        let dtype = element.dispatch_code()?;
        let code_a = layout_a.dispatch_code()?;
        let code_b = layout_b.dispatch_code()?;

        let mut name = format!(
            "{}{}Layout{code_a}{code_b}",
            family.kernel_name(),
            capitalize(element.dispatch_name()?),
        );
        if let Some(padding) = padding {
            name.push_str("Padding");
            for tag in padding.tags() {
                write!(name, "{}", tag.dispatch_code()).ok();
            }
        }

        let key = TilingKey::encode(TilingKeyFields {
            serial: family.serial(),
            dtype,
            layout_a: code_a,
            layout_b: code_b,
            layout_c: LAYOUT_C.dispatch_code()?,
            padding_a: padding.map(|p| p.a.dispatch_code()).unwrap_or(0),
            padding_b: padding.map(|p| p.b.dispatch_code()).unwrap_or(0),
            padding_c: padding
                .and_then(|p| p.c)
                .map(|tag| tag.dispatch_code())
                .unwrap_or(0),
        })?;

        Ok(Self {
            family,
            arch,
            element,
            layout_a,
            layout_b,
            padding,
            name,
            key,
        })
    }

    /// Every variant of a family for one scalar type, layouts varying slowest.
    pub fn enumerate(
        family: KernelFamily,
        arch: ArchTag,
        element: ElementType,
    ) -> Result<Vec<Self>, ConfigError> {
        let mut variants = Vec::new();

        for layout_a in DISPATCH_LAYOUTS {
            for layout_b in DISPATCH_LAYOUTS {
                for padding in family.padding_tuples() {
                    variants.push(Self::new(
                        family, arch, element, layout_a, layout_b, padding,
                    )?);
                }
            }
        }

        Ok(variants)
    }

    pub fn family(&self) -> KernelFamily {
        self.family
    }

    pub fn element(&self) -> ElementType {
        self.element
    }

    /// Generated function name, e.g. `CommonMatmulKernelHalfLayout01`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn launch_name(&self) -> String {
        format!("Launch{}", self.name)
    }

    pub fn workspace_name(&self) -> String {
        format!("{}GetWorkspaceSize", self.name)
    }

    pub fn file_name(&self) -> String {
        format!("{}.cpp", camel_to_snake(&self.name))
    }

    pub fn tiling_key(&self) -> TilingKey {
        self.key
    }

    /// Renders the wrapper translation unit.
    pub fn source(&self) -> String {
        WrapperSource { variant: self }.to_string()
    }
}

struct WrapperSource<'a> {
    variant: &'a WrapperVariant,
}

impl WrapperSource<'_> {
    fn aliases(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let v = self.variant;
        // `dispatch_name` was validated in `WrapperVariant::new`.
        let element = v.element.dispatch_name().unwrap_or_default();

        if v.family.takes_arch_tag() {
            writeln!(f, "    using ArchTag = {};", v.arch.to_qualified_code())?;
        }
        for operand in ["A", "B", "C"] {
            writeln!(f, "    using Element{operand} = {element};")?;
        }
        writeln!(f, "    using LayoutA = {};", v.layout_a.to_qualified_code())?;
        writeln!(f, "    using LayoutB = {};", v.layout_b.to_qualified_code())?;
        writeln!(f, "    using LayoutC = {};", LAYOUT_C.to_qualified_code())?;

        if let Some(padding) = v.padding {
            for (operand, tag) in ["A", "B", "C"].iter().zip(padding.tags()) {
                writeln!(
                    f,
                    "    constexpr PaddingTag paddingTag{operand} = {};",
                    tag.to_code()
                )?;
            }
        }

        Ok(())
    }

    fn template_args(&self) -> String {
        let v = self.variant;
        let mut args = Vec::new();

        if v.family.takes_arch_tag() {
            args.push("ArchTag");
        }
        args.extend([
            "ElementA", "LayoutA", "ElementB", "LayoutB", "ElementC", "LayoutC",
        ]);
        if let Some(padding) = v.padding {
            let tags = ["paddingTagA", "paddingTagB", "paddingTagC"];
            args.extend(&tags[..padding.tags().len()]);
        }

        args.join(", ")
    }
}

impl Display for WrapperSource<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let v = self.variant;
        let kernel = v.family.kernel_name();
        let args = self.template_args();
        let workspace = if v.family.uses_workspace() { "dW, " } else { "" };

        writeln!(f, "#include \"{}\"", v.family.header())?;
        f.write_char('\n')?;

        writeln!(
            f,
            "void {}(aclrtStream& stream, uint64_t fftsAddr,",
            v.launch_name()
        )?;
        writeln!(
            f,
            "    uint8_t* dA, uint8_t* dB, uint8_t* dC, uint8_t* dW, uint8_t* dTilingParams, TilingParams& tilingParams)"
        )?;
        f.write_str("{\n")?;
        self.aliases(f)?;
        writeln!(f, "    Launch{kernel}<{args}>(")?;
        writeln!(
            f,
            "        stream, fftsAddr, dA, dB, dC, {workspace}dTilingParams, tilingParams);"
        )?;
        f.write_str("}\n")?;
        f.write_char('\n')?;

        writeln!(f, "size_t {}(TilingParams& tilingParams)", v.workspace_name())?;
        f.write_str("{\n")?;
        self.aliases(f)?;
        writeln!(f, "    return {kernel}GetWorkspaceSize<{args}>(tilingParams);")?;
        f.write_str("}\n")
    }
}
