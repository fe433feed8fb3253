//! Tiling-key encoding and dispatch table generation.
//!
//! Each kernel family is instantiated for every scalar type, layout pair and padding tuple it
//! supports. Every instantiation gets a host wrapper source and an entry in `launch_map.h`,
//! keyed by the [TilingKey] the runtime dispatcher computes for a problem.

#[macro_use]
extern crate derive_new;

mod family;
mod generator;
mod launch_map;
mod selection;
mod tiling_key;
mod wrapper;

pub use family::*;
pub use generator::*;
pub use launch_map::*;
pub use selection::*;
pub use tiling_key::*;
pub use wrapper::*;
