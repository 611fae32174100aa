/// Pixel format tag handed to the allocator when creating an image.
///
/// Each tag fixes the channel count and the byte size of one channel; the
/// raster layer relies on both for its size arithmetic.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PixelFormat {
    R8Unorm,
    Rg8Unorm,
    Rgba8Unorm,
    Bgra8Unorm,
    R8Sint,
    R16Uint,
    R16Sint,
    Rgba16Uint,
    R32Uint,
    R32Sint,
    R32Float,
    Rg32Float,
    Rgba32Float,
}

impl PixelFormat {
    /// Channels per pixel.
    pub const fn channel_count(self) -> usize {
        match self {
            Self::R8Unorm
            | Self::R8Sint
            | Self::R16Uint
            | Self::R16Sint
            | Self::R32Uint
            | Self::R32Sint
            | Self::R32Float => 1,
            Self::Rg8Unorm | Self::Rg32Float => 2,
            Self::Rgba8Unorm | Self::Bgra8Unorm | Self::Rgba16Uint | Self::Rgba32Float => 4,
        }
    }

    /// Bytes per channel.
    pub const fn channel_size(self) -> usize {
        match self {
            Self::R8Unorm | Self::Rg8Unorm | Self::Rgba8Unorm | Self::Bgra8Unorm | Self::R8Sint => 1,
            Self::R16Uint | Self::R16Sint | Self::Rgba16Uint => 2,
            Self::R32Uint | Self::R32Sint | Self::R32Float | Self::Rg32Float | Self::Rgba32Float => 4,
        }
    }

    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        self.channel_count() * self.channel_size()
    }

    /// Native wgpu format for this tag.
    pub const fn to_wgpu(self) -> wgpu::TextureFormat {
        match self {
            Self::R8Unorm => wgpu::TextureFormat::R8Unorm,
            Self::Rg8Unorm => wgpu::TextureFormat::Rg8Unorm,
            Self::Rgba8Unorm => wgpu::TextureFormat::Rgba8Unorm,
            Self::Bgra8Unorm => wgpu::TextureFormat::Bgra8Unorm,
            Self::R8Sint => wgpu::TextureFormat::R8Sint,
            Self::R16Uint => wgpu::TextureFormat::R16Uint,
            Self::R16Sint => wgpu::TextureFormat::R16Sint,
            Self::Rgba16Uint => wgpu::TextureFormat::Rgba16Uint,
            Self::R32Uint => wgpu::TextureFormat::R32Uint,
            Self::R32Sint => wgpu::TextureFormat::R32Sint,
            Self::R32Float => wgpu::TextureFormat::R32Float,
            Self::Rg32Float => wgpu::TextureFormat::Rg32Float,
            Self::Rgba32Float => wgpu::TextureFormat::Rgba32Float,
        }
    }
}
