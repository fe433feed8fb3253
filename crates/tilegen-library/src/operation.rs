use tilegen_gemm::{GemmOperation, OperationKind, RenderedOperation};

/// An operation the manifest can hold and emit.
pub trait Operation: core::fmt::Debug {
    /// Kind of the operation, selecting its output directory.
    fn kind(&self) -> OperationKind;

    /// Identity of the operation within its kind.
    fn name(&self) -> &str;

    /// Renders the sources contributed to the translation unit.
    fn render(&self) -> RenderedOperation;
}

impl Operation for GemmOperation {
    fn kind(&self) -> OperationKind {
        GemmOperation::kind(self)
    }

    fn name(&self) -> &str {
        GemmOperation::name(self)
    }

    fn render(&self) -> RenderedOperation {
        GemmOperation::render(self)
    }
}
