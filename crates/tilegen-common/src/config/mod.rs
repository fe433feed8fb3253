/// Dispatch table generation config module.
pub mod dispatch;
/// Library generation config module.
pub mod library;

mod base;
mod logger;

pub use base::*;
pub use logger::*;
