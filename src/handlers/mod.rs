//! HTTP handlers.

pub mod point;
pub use point::*;
