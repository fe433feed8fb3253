use tilegen_common::{ConfigError, ElementType, LayoutTag};

use crate::family::KernelFamily;
use crate::tiling_key::{TilingKey, TilingKeyFields};

/// Runtime description of a matmul problem, as seen by the host dispatcher.
#[derive(new, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatmulProblem {
    pub m: u32,
    pub n: u32,
    pub k: u32,
    pub element: ElementType,
    pub layout_a: LayoutTag,
    pub layout_b: LayoutTag,
}

impl MatmulProblem {
    /// Layouts used for the lookup.
    ///
    /// A single-row A or single-column B is stored identically in both layouts, so the one
    /// with the faster copy path is picked: row-major A and column-major B.
    pub fn effective_layouts(&self) -> (LayoutTag, LayoutTag) {
        let layout_a = match (self.m, self.layout_a) {
            (1, LayoutTag::ColumnMajor) => LayoutTag::RowMajor,
            (_, layout) => layout,
        };
        let layout_b = match (self.n, self.layout_b) {
            (1, LayoutTag::RowMajor) => LayoutTag::ColumnMajor,
            (_, layout) => layout,
        };

        (layout_a, layout_b)
    }
}

/// Tiling key the host dispatcher computes for a 16-bit problem.
///
/// Only the common matmul family is selected at runtime for now.
pub fn select_tiling_key(problem: &MatmulProblem) -> Result<TilingKey, ConfigError> {
    let (layout_a, layout_b) = problem.effective_layouts();

    TilingKey::encode(TilingKeyFields {
        serial: KernelFamily::CommonMatmul.serial(),
        dtype: problem.element.dispatch_code()?,
        layout_a: layout_a.dispatch_code()?,
        layout_b: layout_b.dispatch_code()?,
        ..Default::default()
    })
}
