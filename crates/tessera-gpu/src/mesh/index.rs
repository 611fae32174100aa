use bytemuck::Pod;
use num_traits::PrimInt;

/// Index representation of a mesh.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum IndexWidth {
    /// 16-bit indices.
    Narrow,
    /// 32-bit indices.
    Wide,
}

impl IndexWidth {
    /// Largest vertex count a 16-bit index can address.
    pub const NARROW_VERTEX_LIMIT: usize = 1 << 16;

    /// Picks the narrowest width able to address `vertex_count` vertices.
    #[inline]
    pub fn select(vertex_count: usize) -> Self {
        if vertex_count <= Self::NARROW_VERTEX_LIMIT {
            Self::Narrow
        } else {
            Self::Wide
        }
    }

    /// Native index-format tag used when binding the index buffer.
    #[inline]
    pub const fn index_format(self) -> wgpu::IndexFormat {
        match self {
            Self::Narrow => wgpu::IndexFormat::Uint16,
            Self::Wide => wgpu::IndexFormat::Uint32,
        }
    }

    #[inline]
    pub const fn bytes_per_index(self) -> usize {
        match self {
            Self::Narrow => 2,
            Self::Wide => 4,
        }
    }
}

/// Integer type a grid index array can be built in.
///
/// Grid arithmetic runs in this type directly, with overflow checks, so a
/// narrow mesh is never produced by truncating wide results.
pub trait GridIndex: Pod + PrimInt + TryFrom<u32> {
    /// Tags an index array of this width.
    fn into_mesh_indices(indices: Vec<Self>) -> MeshIndices;
}

impl GridIndex for u16 {
    fn into_mesh_indices(indices: Vec<u16>) -> MeshIndices {
        MeshIndices::Narrow(indices)
    }
}

impl GridIndex for u32 {
    fn into_mesh_indices(indices: Vec<u32>) -> MeshIndices {
        MeshIndices::Wide(indices)
    }
}

/// Index array in the width chosen for its mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshIndices {
    Narrow(Vec<u16>),
    Wide(Vec<u32>),
}

impl MeshIndices {
    #[inline]
    pub fn width(&self) -> IndexWidth {
        match self {
            Self::Narrow(_) => IndexWidth::Narrow,
            Self::Wide(_) => IndexWidth::Wide,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Self::Narrow(v) => v.len(),
            Self::Wide(v) => v.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw bytes in native endianness, ready for upload.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Narrow(v) => bytemuck::cast_slice(v),
            Self::Wide(v) => bytemuck::cast_slice(v),
        }
    }

    /// Index `i` widened to `u32`.
    pub fn get(&self, i: usize) -> Option<u32> {
        match self {
            Self::Narrow(v) => v.get(i).map(|&x| u32::from(x)),
            Self::Wide(v) => v.get(i).copied(),
        }
    }

    /// Iterates the indices widened to `u32`.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.len()).filter_map(|i| self.get(i))
    }
}
