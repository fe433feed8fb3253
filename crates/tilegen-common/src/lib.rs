#![warn(missing_docs)]

//! Common building blocks shared by the tilegen code generators: the tag model,
//! configuration and logging, the error taxonomy and output file helpers.

#[macro_use]
extern crate derive_new;

/// Generator configuration and logging.
pub mod config;
/// Error taxonomy.
pub mod error;
/// String formatting helpers for generated identifiers.
pub mod format;
/// Output tree helpers.
pub mod fs;
/// Element types, layouts, padding and architecture tags.
pub mod tags;

pub use error::*;
pub use tags::*;
