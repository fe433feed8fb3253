//! Kernel variant and dispatch table generator for the Catlass matmul template library.
//!
//! The `library` generator enumerates tile shapes for every registered kernel family and
//! emits bucketed registration sources. The `dispatch` generator emits host wrappers and the
//! tiling-key launch map used by the runtime dispatcher.

pub mod cli;

pub use tilegen_common as common;
pub use tilegen_dispatch as dispatch;
pub use tilegen_gemm as gemm;
pub use tilegen_library as library;
