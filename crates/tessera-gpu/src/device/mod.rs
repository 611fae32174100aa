//! Allocation capability consumed by the data layer, plus its backends.
//!
//! This module is responsible for:
//! - the resource traits (`ResourceAllocator`, `ImageResource`, `BufferResource`)
//! - pixel format tags and allocation descriptors
//! - a wgpu backend (`GpuContext`) acquiring an Instance/Adapter/Device/Queue
//! - an in-memory backend (`HostAllocator`) for tests and CPU-only tooling

mod format;
mod gpu;
mod host;
mod init;
mod resource;

pub use format::PixelFormat;
pub use gpu::{GpuBuffer, GpuContext, GpuImage};
pub use host::{HostAllocator, HostBuffer, HostImage};
pub use init::GpuInit;
pub use resource::{
    BufferDescriptor, BufferResource, BufferUsage, CacheMode, ImageDescriptor, ImageResource,
    ResourceAllocator,
};
