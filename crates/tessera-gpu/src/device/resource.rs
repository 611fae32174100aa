use anyhow::Result;

use crate::coords::{PixelRegion, PixelSize};

use super::PixelFormat;

/// What a buffer allocation will be bound as.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferUsage {
    Vertex,
    Index,
    Uniform,
}

/// CPU cache behaviour requested for a buffer allocation.
///
/// `Shared` memory is expected to be written by the CPU every frame and read
/// back cheaply; `Default` favours device-side reads.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum CacheMode {
    #[default]
    Default,
    Shared,
}

/// Parameters for `ResourceAllocator::allocate_image`.
#[derive(Debug, Clone)]
pub struct ImageDescriptor<'a> {
    pub label: Option<&'a str>,
    pub size: PixelSize,
    pub format: PixelFormat,
    /// Number of mip levels; at least 1.
    pub mip_level_count: u32,
}

impl<'a> ImageDescriptor<'a> {
    /// Single-level image.
    pub fn new(size: PixelSize, format: PixelFormat) -> Self {
        Self {
            label: None,
            size,
            format,
            mip_level_count: 1,
        }
    }

    pub fn with_label(mut self, label: &'a str) -> Self {
        self.label = Some(label);
        self
    }

    pub fn with_mip_levels(mut self, mip_level_count: u32) -> Self {
        self.mip_level_count = mip_level_count;
        self
    }
}

/// Parameters for `ResourceAllocator::allocate_buffer`.
#[derive(Debug, Clone)]
pub struct BufferDescriptor<'a> {
    pub label: Option<&'a str>,
    /// Requested length in bytes.
    pub size: u64,
    pub usage: BufferUsage,
    pub cache_mode: CacheMode,
}

/// Device-owned 2-D image with byte-addressable texel access.
///
/// Implementations receive regions that are already projected onto
/// `mip_level`, have a non-negative origin and lie inside that level. The
/// packed data uses `bytes_per_row` bytes per row of the region.
pub trait ImageResource {
    fn size(&self) -> PixelSize;
    fn format(&self) -> PixelFormat;
    fn mip_level_count(&self) -> u32;

    fn read_bytes(
        &self,
        region: PixelRegion,
        mip_level: u32,
        bytes_per_row: usize,
        out: &mut [u8],
    ) -> Result<()>;

    fn write_bytes(
        &mut self,
        region: PixelRegion,
        mip_level: u32,
        bytes_per_row: usize,
        bytes: &[u8],
    ) -> Result<()>;
}

/// Device-visible linear allocation.
pub trait BufferResource {
    /// Length in bytes, as requested at allocation.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies `bytes` into the allocation starting at `offset`.
    fn write_bytes(&mut self, offset: u64, bytes: &[u8]) -> Result<()>;

    /// Returns the full contents of the allocation.
    fn read_bytes(&self) -> Result<Vec<u8>>;
}

/// The allocation capability a graphics context exposes to the data layer.
pub trait ResourceAllocator {
    type Image: ImageResource;
    type Buffer: BufferResource;

    fn allocate_image(&self, desc: &ImageDescriptor<'_>) -> Result<Self::Image>;
    fn allocate_buffer(&self, desc: &BufferDescriptor<'_>) -> Result<Self::Buffer>;
}

/// Shared helper for backends: validates a region against a level and
/// returns it as unsigned `(x, y, width, height)`.
pub(super) fn level_rect(
    region: PixelRegion,
    level_size: PixelSize,
) -> Result<(u32, u32, u32, u32)> {
    anyhow::ensure!(
        region.within(level_size),
        "region {region} is outside the {level_size} level"
    );
    let x = u32::try_from(region.origin.x)?;
    let y = u32::try_from(region.origin.y)?;
    Ok((x, y, region.width(), region.height()))
}

/// Rejects image descriptors no backend can allocate: zero extents, mip
/// counts outside `1..=full chain`, and sides above `max_dimension`.
pub(super) fn check_image(desc: &ImageDescriptor<'_>, max_dimension: Option<u32>) -> Result<()> {
    let size = desc.size;
    anyhow::ensure!(
        size.width > 0 && size.height > 0,
        "image size {size} must be non-zero"
    );
    if let Some(max) = max_dimension {
        anyhow::ensure!(
            size.width <= max && size.height <= max,
            "image size {size} exceeds the device limit of {max} texels per side"
        );
    }
    anyhow::ensure!(
        (1..=size.full_mip_chain_len()).contains(&desc.mip_level_count),
        "{} mip levels requested for a {size} image",
        desc.mip_level_count
    );
    Ok(())
}

/// Rejects buffer lengths above `max_size`.
pub(super) fn check_buffer(desc: &BufferDescriptor<'_>, max_size: Option<u64>) -> Result<()> {
    if let Some(max) = max_size {
        anyhow::ensure!(
            desc.size <= max,
            "buffer of {} bytes exceeds the device limit of {max} bytes",
            desc.size
        );
    }
    Ok(())
}
