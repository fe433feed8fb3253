//! Gemm kernel variants: the tile-shape search space and the operation descriptors rendered
//! into the kernel library.

#[macro_use]
extern crate derive_new;

mod kernel;
mod operation;
mod search_space;

pub use kernel::*;
pub use operation::*;
pub use search_space::*;
