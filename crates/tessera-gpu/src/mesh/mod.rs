//! Procedural grid meshes.
//!
//! A grid mesh tesselates a rectangular frame into `cells_x * cells_y` quads,
//! two triangles each. Vertices are generic over the `Positionable` /
//! `Texturable` capabilities; indices are 16- or 32-bit depending on the
//! vertex count.

mod grid;
mod index;
mod upload;
mod vertex;

pub use grid::{GridDimensions, GridMesh, TextureFlip};
pub use index::{GridIndex, IndexWidth, MeshIndices};
pub use upload::MeshBuffers;
pub use vertex::{PositionVertex, Positionable, Texturable, TexturedVertex};
