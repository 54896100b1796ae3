//! Reading and writing meshes in the Wavefront-style text format.
//!
//! Only positions, normals, texture coordinates and triangular faces are supported. Faces are
//! written with one shared index per corner for all three attribute slots (`f 1/1/1 ...`),
//! which assumes the normal and texture coordinate arrays run parallel to the positions.

mod reader;
mod writer;

pub use reader::*;
pub use writer::*;
