use anyhow::{Context, Result};

use crate::coords::{PixelRegion, PixelSize};

use super::resource::{check_image, level_rect};
use super::{
    BufferDescriptor, BufferResource, BufferUsage, CacheMode, ImageDescriptor, ImageResource,
    PixelFormat, ResourceAllocator,
};

/// In-memory allocator.
///
/// Images are stored as one tightly packed plane per mip level and buffers as
/// plain byte vectors. Behaviour matches the device backends byte for byte,
/// which makes it the backend of choice for tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostAllocator;

impl HostAllocator {
    pub fn new() -> Self {
        Self
    }
}

impl ResourceAllocator for HostAllocator {
    type Image = HostImage;
    type Buffer = HostBuffer;

    fn allocate_image(&self, desc: &ImageDescriptor<'_>) -> Result<HostImage> {
        check_image(desc, None)?;

        let bpp = desc.format.bytes_per_pixel();
        let levels = (0..desc.mip_level_count)
            .map(|level| {
                let area = usize::try_from(desc.size.at_mip_level(level).area())?;
                let len = area.checked_mul(bpp).context("image plane too large")?;
                Ok(vec![0u8; len])
            })
            .collect::<Result<Vec<_>>>()?;

        log::debug!(
            "host image allocated: {} {:?} x{} level(s) ({:?})",
            desc.size,
            desc.format,
            desc.mip_level_count,
            desc.label
        );

        Ok(HostImage {
            size: desc.size,
            format: desc.format,
            levels,
        })
    }

    fn allocate_buffer(&self, desc: &BufferDescriptor<'_>) -> Result<HostBuffer> {
        let len = usize::try_from(desc.size).context("buffer too large for host memory")?;
        log::debug!(
            "host buffer allocated: {} bytes {:?}/{:?} ({:?})",
            desc.size,
            desc.usage,
            desc.cache_mode,
            desc.label
        );
        Ok(HostBuffer {
            data: vec![0u8; len],
            usage: desc.usage,
            cache_mode: desc.cache_mode,
        })
    }
}

/// Host-memory image: one packed plane per mip level.
#[derive(Debug, Clone)]
pub struct HostImage {
    size: PixelSize,
    format: PixelFormat,
    levels: Vec<Vec<u8>>,
}

impl HostImage {
    /// Packed bytes of one mip level.
    pub fn level_bytes(&self, mip_level: u32) -> Option<&[u8]> {
        self.levels.get(mip_level as usize).map(Vec::as_slice)
    }

    /// Yields `(plane_offset, packed_offset, len)` for every row of the region.
    ///
    /// Fails up front if `packed_len` bytes cannot hold the region, so callers
    /// never copy a partial region.
    fn rows(
        &self,
        region: PixelRegion,
        mip_level: u32,
        bytes_per_row: usize,
        packed_len: usize,
    ) -> Result<impl Iterator<Item = (usize, usize, usize)>> {
        anyhow::ensure!(
            (mip_level as usize) < self.levels.len(),
            "mip level {mip_level} does not exist"
        );
        let level_size = self.size.at_mip_level(mip_level);
        let (x, y, w, h) = level_rect(region, level_size)?;

        let bpp = self.format.bytes_per_pixel();
        let row_len = w as usize * bpp;
        anyhow::ensure!(
            bytes_per_row >= row_len,
            "bytes_per_row {bytes_per_row} is smaller than a {w}-texel row"
        );
        if w > 0 && h > 0 {
            let needed = bytes_per_row * (h as usize - 1) + row_len;
            anyhow::ensure!(
                packed_len >= needed,
                "{packed_len} packed bytes cannot hold a {w}x{h} region ({needed} needed)"
            );
        }
        let stride = level_size.width as usize * bpp;

        Ok((0..h as usize).map(move |row| {
            let plane = (y as usize + row) * stride + x as usize * bpp;
            (plane, row * bytes_per_row, row_len)
        }))
    }
}

impl ImageResource for HostImage {
    fn size(&self) -> PixelSize {
        self.size
    }

    fn format(&self) -> PixelFormat {
        self.format
    }

    fn mip_level_count(&self) -> u32 {
        self.levels.len() as u32
    }

    fn read_bytes(
        &self,
        region: PixelRegion,
        mip_level: u32,
        bytes_per_row: usize,
        out: &mut [u8],
    ) -> Result<()> {
        let rows = self.rows(region, mip_level, bytes_per_row, out.len())?;
        let plane = &self.levels[mip_level as usize];
        for (src, dst, len) in rows {
            out[dst..dst + len].copy_from_slice(&plane[src..src + len]);
        }
        Ok(())
    }

    fn write_bytes(
        &mut self,
        region: PixelRegion,
        mip_level: u32,
        bytes_per_row: usize,
        bytes: &[u8],
    ) -> Result<()> {
        let rows: Vec<_> = self
            .rows(region, mip_level, bytes_per_row, bytes.len())?
            .collect();
        let plane = &mut self.levels[mip_level as usize];
        for (dst, src, len) in rows {
            plane[dst..dst + len].copy_from_slice(&bytes[src..src + len]);
        }
        Ok(())
    }
}

/// Host-memory buffer.
#[derive(Debug, Clone)]
pub struct HostBuffer {
    data: Vec<u8>,
    usage: BufferUsage,
    cache_mode: CacheMode,
}

impl HostBuffer {
    /// Borrowed view of the contents.
    pub fn contents(&self) -> &[u8] {
        &self.data
    }

    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    pub fn cache_mode(&self) -> CacheMode {
        self.cache_mode
    }
}

impl BufferResource for HostBuffer {
    fn len(&self) -> u64 {
        self.data.len() as u64
    }

    fn write_bytes(&mut self, offset: u64, bytes: &[u8]) -> Result<()> {
        let start = usize::try_from(offset)?;
        let buf_len = self.data.len();
        let dst = start
            .checked_add(bytes.len())
            .and_then(|end| self.data.get_mut(start..end))
            .with_context(|| {
                format!(
                    "write of {} bytes at offset {offset} overruns a {}-byte buffer",
                    bytes.len(),
                    buf_len
                )
            })?;
        dst.copy_from_slice(bytes);
        Ok(())
    }

    fn read_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(w: u32, h: u32, format: PixelFormat) -> HostImage {
        HostAllocator
            .allocate_image(&ImageDescriptor::new(PixelSize::new(w, h), format))
            .unwrap()
    }

    #[test]
    fn image_planes_are_zeroed_and_sized_per_level() {
        let img = HostAllocator
            .allocate_image(
                &ImageDescriptor::new(PixelSize::new(4, 2), PixelFormat::Rgba8Unorm)
                    .with_mip_levels(3),
            )
            .unwrap();
        assert_eq!(img.level_bytes(0).unwrap().len(), 4 * 2 * 4);
        assert_eq!(img.level_bytes(1).unwrap().len(), 2 * 1 * 4);
        assert_eq!(img.level_bytes(2).unwrap().len(), 4);
        assert!(img.level_bytes(3).is_none());
        assert!(img.level_bytes(0).unwrap().iter().all(|&b| b == 0));
    }

    #[test]
    fn too_many_mip_levels_is_rejected() {
        let desc = ImageDescriptor::new(PixelSize::new(4, 4), PixelFormat::R8Unorm).with_mip_levels(4);
        assert!(HostAllocator.allocate_image(&desc).is_err());
    }

    #[test]
    fn sub_region_write_lands_at_the_right_offsets() {
        let mut img = image(3, 3, PixelFormat::R8Unorm);
        img.write_bytes(PixelRegion::from_xywh(1, 1, 2, 2), 0, 2, &[1, 2, 3, 4])
            .unwrap();
        assert_eq!(img.level_bytes(0).unwrap(), &[0, 0, 0, 0, 1, 2, 0, 3, 4]);
    }

    #[test]
    fn padded_rows_are_honoured_on_read() {
        let mut img = image(2, 2, PixelFormat::R8Unorm);
        img.write_bytes(PixelSize::new(2, 2).bounds(), 0, 2, &[1, 2, 3, 4]).unwrap();
        let mut out = [9u8; 6];
        img.read_bytes(PixelSize::new(2, 2).bounds(), 0, 3, &mut out).unwrap();
        assert_eq!(out, [1, 2, 9, 3, 4, 9]);
    }

    #[test]
    fn short_source_writes_nothing() {
        let mut img = image(2, 2, PixelFormat::R8Unorm);
        // Room for the first row only.
        assert!(img.write_bytes(PixelSize::new(2, 2).bounds(), 0, 2, &[5, 6, 7]).is_err());
        assert_eq!(img.level_bytes(0).unwrap(), &[0, 0, 0, 0]);
    }

    #[test]
    fn short_destination_reads_nothing() {
        let img = image(2, 2, PixelFormat::R8Unorm);
        let mut out = [9u8; 3];
        assert!(img.read_bytes(PixelSize::new(2, 2).bounds(), 0, 2, &mut out).is_err());
        assert_eq!(out, [9, 9, 9]);
    }

    #[test]
    fn out_of_level_region_is_a_device_error() {
        let img = image(2, 2, PixelFormat::R8Unorm);
        let mut out = [0u8; 4];
        assert!(img.read_bytes(PixelRegion::from_xywh(1, 1, 2, 2), 0, 2, &mut out).is_err());
    }

    #[test]
    fn buffer_write_overrun_is_rejected() {
        let mut buf = HostAllocator
            .allocate_buffer(&BufferDescriptor {
                label: None,
                size: 4,
                usage: BufferUsage::Uniform,
                cache_mode: CacheMode::Shared,
            })
            .unwrap();
        buf.write_bytes(2, &[7, 8]).unwrap();
        assert_eq!(buf.contents(), &[0, 0, 7, 8]);
        assert!(buf.write_bytes(3, &[1, 2]).is_err());
        assert_eq!(buf.read_bytes().unwrap(), vec![0, 0, 7, 8]);
    }
}
