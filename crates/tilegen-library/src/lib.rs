//! The kernel library generator.
//!
//! Registration callbacks fill a [Manifest] with operations, which is then emitted as a
//! bounded set of translation units plus the registration glue of every operation kind.

#[macro_use]
extern crate derive_new;

mod defaults;
mod emit;
mod manifest;
mod operation;
mod registry;

pub use defaults::*;
pub use emit::*;
pub use manifest::*;
pub use operation::*;
pub use registry::*;
