//! Tessera GPU data layer.
//!
//! Typed, bounds-checked containers over device resources:
//!
//! - [`raster::RasterBuffer`]: region reads and writes on a 2-D image with mip levels.
//! - [`mesh::GridMesh`]: procedural grid tesselation with 16/32-bit index selection,
//!   uploaded through [`mesh::MeshBuffers`].
//! - [`uniforms::UniformRing`]: a ring of uniform buffers for frames in flight.
//! - [`math`]: projection and rotation matrices with row-wise element access.
//!
//! Resources are created through a [`device::ResourceAllocator`]: either the
//! wgpu-backed [`device::GpuContext`] or the in-memory [`device::HostAllocator`].

pub mod coords;
pub mod device;
pub mod error;
pub mod logging;
pub mod math;
pub mod mesh;
pub mod raster;
pub mod uniforms;

pub use error::{Error, Result};
