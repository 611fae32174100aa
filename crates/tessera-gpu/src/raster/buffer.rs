use std::marker::PhantomData;

use crate::coords::{PixelIndex, PixelRegion, PixelSize};
use crate::device::{ImageDescriptor, ImageResource, PixelFormat, ResourceAllocator};
use crate::error::{Error, Result};

use super::PixelChannel;

/// A device-owned 2-D image with typed region get/set.
///
/// `C` is the channel element type; the channel count is fixed at
/// construction. Every access validates the addressed region before the
/// image is touched, so a rejected call never performs a partial write.
pub struct RasterBuffer<C: PixelChannel, I: ImageResource> {
    image: I,
    channel_count: usize,
    _channel: PhantomData<C>,
}

impl<C: PixelChannel, I: ImageResource> RasterBuffer<C, I> {
    /// Allocates an image through `allocator` and wraps it.
    ///
    /// The channel count is taken from `desc.format`; `C` must match the
    /// format's channel element type.
    pub fn new<A>(allocator: &A, desc: &ImageDescriptor<'_>) -> Result<Self>
    where
        A: ResourceAllocator<Image = I>,
    {
        debug_assert_eq!(
            size_of::<C>(),
            desc.format.channel_size(),
            "channel type does not match {:?}",
            desc.format
        );
        let image = allocator.allocate_image(desc)?;
        Ok(Self::from_image(image, desc.format.channel_count()))
    }

    /// Wraps an existing image.
    ///
    /// `channel_count` and `C` must agree with the image's pixel format;
    /// behaviour is undefined by contract otherwise.
    pub fn from_image(image: I, channel_count: usize) -> Self {
        Self {
            image,
            channel_count,
            _channel: PhantomData,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.image.size().width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.image.size().height
    }

    /// Native (level 0) extent.
    #[inline]
    pub fn bounds(&self) -> PixelSize {
        self.image.size()
    }

    /// Extent of mip level `level`.
    #[inline]
    pub fn mip_bounds(&self, level: u32) -> PixelSize {
        self.bounds().at_mip_level(level)
    }

    #[inline]
    pub fn mip_level_count(&self) -> u32 {
        self.image.mip_level_count()
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.image.format()
    }

    #[inline]
    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    #[inline]
    pub fn channel_element_size(&self) -> usize {
        size_of::<C>()
    }

    /// Size of one pixel in bytes; size caller buffers with this.
    #[inline]
    pub fn pixel_size_in_bytes(&self) -> usize {
        self.channel_element_size() * self.channel_count
    }

    /// The wrapped image, for binding.
    pub fn image(&self) -> &I {
        &self.image
    }

    pub fn into_image(self) -> I {
        self.image
    }

    /// Reads `region` at level 0.
    pub fn get(&self, region: PixelRegion) -> Result<Vec<C>> {
        self.get_at_level(region, 0)
    }

    /// Reads `region` from `mip_level`.
    ///
    /// `region` is framed in that level's own texel space and must lie within
    /// [`mip_bounds`](Self::mip_bounds). Channel values come back row-major
    /// starting at the region's top-left texel, in the image's native
    /// orientation.
    pub fn get_at_level(&self, region: PixelRegion, mip_level: u32) -> Result<Vec<C>> {
        let expected = self.resolve_read(region, mip_level)?;
        let mut out = vec![C::zeroed(); expected];
        self.read(region, mip_level, &mut out)?;
        Ok(out)
    }

    /// Like [`get_at_level`](Self::get_at_level), into a caller-owned buffer
    /// of exactly the addressed size.
    pub fn get_into(&self, region: PixelRegion, mip_level: u32, out: &mut [C]) -> Result<()> {
        let expected = self.resolve_read(region, mip_level)?;
        if out.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: out.len(),
            });
        }
        self.read(region, mip_level, out)
    }

    /// Overwrites `region` at level 0 with `data`.
    pub fn set(&mut self, region: PixelRegion, data: &[C]) -> Result<()> {
        self.set_at_level(region, data, 0)
    }

    /// Overwrites the texels of `mip_level` covered by `region`.
    ///
    /// `region` is framed at native resolution and must lie within
    /// [`bounds`](Self::bounds). `data` must hold exactly
    /// `region.area / 4^mip_level * channel_count` values, and the region
    /// must cover whole texels of the level: origin and size multiples of
    /// `2^mip_level`.
    pub fn set_at_level(&mut self, region: PixelRegion, data: &[C], mip_level: u32) -> Result<()> {
        let level_region = self.resolve_write(region, mip_level, data.len())?;
        if data.is_empty() {
            return Ok(());
        }

        log::trace!("raster write {region} -> {level_region} at level {mip_level}");
        let bytes_per_row = self.bytes_per_row(level_region);
        self.image
            .write_bytes(level_region, mip_level, bytes_per_row, bytemuck::cast_slice(data))?;
        Ok(())
    }

    /// Reads the single texel at `index` (level 0).
    pub fn get_pixel(&self, index: PixelIndex) -> Result<Vec<C>> {
        self.get(PixelRegion::pixel(index))
    }

    /// Overwrites the single texel at `index` (level 0).
    pub fn set_pixel(&mut self, index: PixelIndex, data: &[C]) -> Result<()> {
        self.set(PixelRegion::pixel(index), data)
    }

    /// Overwrites every texel of level 0 with `pixel`.
    pub fn fill(&mut self, pixel: &[C]) -> Result<()> {
        if pixel.len() != self.channel_count {
            return Err(Error::SizeMismatch {
                expected: self.channel_count,
                actual: pixel.len(),
            });
        }
        let texels = usize::try_from(self.bounds().area()).map_err(anyhow::Error::from)?;
        let data = pixel.repeat(texels);
        self.set(self.bounds().bounds(), &data)
    }

    fn check_level(&self, mip_level: u32) -> Result<()> {
        let levels = self.mip_level_count();
        if mip_level >= levels {
            return Err(Error::MipLevelOutOfRange {
                level: mip_level,
                levels,
            });
        }
        Ok(())
    }

    /// Channel values needed for `texels` texels.
    fn channel_values(&self, region: PixelRegion, texels: u64) -> Result<usize> {
        usize::try_from(texels)
            .ok()
            .and_then(|texels| texels.checked_mul(self.channel_count))
            .ok_or_else(|| anyhow::anyhow!("region {region} is too large to address").into())
    }

    /// Validates a level-framed read; returns the channel-value count.
    fn resolve_read(&self, region: PixelRegion, mip_level: u32) -> Result<usize> {
        self.check_level(mip_level)?;
        let bounds = self.mip_bounds(mip_level);
        if !region.within(bounds) {
            return Err(Error::OutOfBounds {
                region,
                bounds,
                mip_level,
            });
        }
        self.channel_values(region, region.area())
    }

    /// Validates a native-framed write of `len` values; returns the texel
    /// rectangle it covers on `mip_level`.
    fn resolve_write(&self, region: PixelRegion, mip_level: u32, len: usize) -> Result<PixelRegion> {
        self.check_level(mip_level)?;
        let bounds = self.bounds();
        if !region.within(bounds) {
            return Err(Error::OutOfBounds {
                region,
                bounds,
                mip_level,
            });
        }

        let texels = region.area().checked_shr(2 * mip_level).unwrap_or(0);
        let expected = self.channel_values(region, texels)?;
        if len != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: len,
            });
        }

        if !covers_whole_texels(region, mip_level) {
            return Err(Error::UnalignedRegion { region, mip_level });
        }
        Ok(region.at_mip_level(mip_level))
    }

    fn read(&self, region: PixelRegion, mip_level: u32, out: &mut [C]) -> Result<()> {
        if out.is_empty() {
            return Ok(());
        }
        log::trace!("raster read {region} at level {mip_level}");
        let bytes_per_row = self.bytes_per_row(region);
        self.image
            .read_bytes(region, mip_level, bytes_per_row, bytemuck::cast_slice_mut(out))?;
        Ok(())
    }

    #[inline]
    fn bytes_per_row(&self, level_region: PixelRegion) -> usize {
        level_region.width() as usize * self.channel_count * self.channel_element_size()
    }
}

/// Whether a native-framed region starts and ends on texel boundaries of
/// `mip_level`.
fn covers_whole_texels(region: PixelRegion, mip_level: u32) -> bool {
    let Some(step) = 1i64.checked_shl(mip_level) else {
        return false;
    };
    [
        region.origin.x,
        region.origin.y,
        i64::from(region.size.width),
        i64::from(region.size.height),
    ]
    .iter()
    .all(|v| v % step == 0)
}

impl<I: ImageResource> RasterBuffer<u8, I> {
    /// Allocates a single-level `Bgra8Unorm` image of `size`.
    pub fn bgra8<A>(allocator: &A, size: PixelSize) -> Result<Self>
    where
        A: ResourceAllocator<Image = I>,
    {
        Self::new(
            allocator,
            &ImageDescriptor::new(size, PixelFormat::Bgra8Unorm).with_label("tessera bgra8 raster"),
        )
    }
}
