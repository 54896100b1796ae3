//! In-memory mesh model shared by the text and binary format crates.

mod geometry;
mod model;

pub use geometry::*;
pub use model::*;
