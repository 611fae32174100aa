use bytemuck::Pod;

use crate::device::{BufferDescriptor, BufferResource, BufferUsage, CacheMode, ResourceAllocator};
use crate::error::Result;

use super::{GridMesh, IndexWidth};

/// A grid mesh copied into device vertex and index buffers.
#[derive(Debug)]
pub struct MeshBuffers<B> {
    vertex_buffer: B,
    index_buffer: B,
    vertex_count: usize,
    index_count: usize,
    index_width: IndexWidth,
}

impl<B: BufferResource> MeshBuffers<B> {
    /// Allocates one vertex and one index buffer sized to `mesh` and copies
    /// its data in. The mesh itself is left untouched.
    pub fn upload<A, V>(allocator: &A, mesh: &GridMesh<V>) -> Result<Self>
    where
        A: ResourceAllocator<Buffer = B>,
        V: Pod,
    {
        let vertex_bytes = mesh.vertex_bytes();
        let index_bytes = mesh.index_bytes();

        let mut vertex_buffer = allocator.allocate_buffer(&BufferDescriptor {
            label: Some("grid mesh vertices"),
            size: vertex_bytes.len() as u64,
            usage: BufferUsage::Vertex,
            cache_mode: CacheMode::Default,
        })?;
        vertex_buffer.write_bytes(0, vertex_bytes)?;

        let mut index_buffer = allocator.allocate_buffer(&BufferDescriptor {
            label: Some("grid mesh indices"),
            size: index_bytes.len() as u64,
            usage: BufferUsage::Index,
            cache_mode: CacheMode::Default,
        })?;
        index_buffer.write_bytes(0, index_bytes)?;

        log::debug!(
            "uploaded grid mesh: {} vertices ({} bytes), {} indices ({:?})",
            mesh.vertex_count(),
            vertex_bytes.len(),
            mesh.index_count(),
            mesh.index_width()
        );

        Ok(Self {
            vertex_buffer,
            index_buffer,
            vertex_count: mesh.vertex_count(),
            index_count: mesh.index_count(),
            index_width: mesh.index_width(),
        })
    }
}

impl<B> MeshBuffers<B> {
    pub fn vertex_buffer(&self) -> &B {
        &self.vertex_buffer
    }

    pub fn index_buffer(&self) -> &B {
        &self.index_buffer
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Number of indices to draw.
    pub fn index_count(&self) -> usize {
        self.index_count
    }

    pub fn index_width(&self) -> IndexWidth {
        self.index_width
    }

    /// Format tag for `RenderPass::set_index_buffer`.
    pub fn index_format(&self) -> wgpu::IndexFormat {
        self.index_width.index_format()
    }
}
