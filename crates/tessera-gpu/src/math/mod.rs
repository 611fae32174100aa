//! Leaf transform utilities.
//!
//! Matrix builders are written in row form (the way they are usually printed)
//! and stored column-major by `glam`. `MatrixRows` bridges the two views.

mod access;
mod transform;

pub use access::MatrixRows;
pub use transform::{perspective, rotation, rotation3, translation};
