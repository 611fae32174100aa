use std::borrow::Cow;
use std::sync::mpsc;

use anyhow::{Context, Result};

use crate::coords::{PixelRegion, PixelSize};

use super::resource::{check_buffer, check_image, level_rect};
use super::{
    BufferDescriptor, BufferResource, BufferUsage, CacheMode, GpuInit, ImageDescriptor,
    ImageResource, PixelFormat, ResourceAllocator,
};

/// Owns the wgpu core objects used to back data-layer resources.
///
/// This type is the headless graphics context:
/// - creates and stores Instance/Adapter/Device/Queue
/// - allocates textures and buffers on behalf of the data layer
///
/// No surface is created; presentation belongs to the caller.
pub struct GpuContext {
    /// wgpu instance used to create the adapter.
    instance: wgpu::Instance,

    /// Selected adapter.
    adapter: wgpu::Adapter,

    /// Logical device.
    device: wgpu::Device,

    /// Command queue.
    queue: wgpu::Queue,
}

impl GpuContext {
    /// Creates a context, blocking the calling thread on adapter/device
    /// acquisition.
    pub fn new(init: GpuInit) -> Result<Self> {
        pollster::block_on(Self::new_async(init))
    }

    /// Creates a context.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new_async(init: GpuInit) -> Result<Self> {
        let GpuInit {
            backends,
            power_preference,
            force_fallback_adapter,
            required_features,
            required_limits,
        } = init;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference,
                compatible_surface: None,
                force_fallback_adapter,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("tessera device"),
                required_features,
                required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let info = adapter.get_info();
        log::info!("gpu context ready: {} ({:?})", info.name, info.backend);

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
        })
    }

    /// Returns a reference to the wgpu instance.
    pub fn instance(&self) -> &wgpu::Instance {
        &self.instance
    }

    /// Returns information about the selected adapter.
    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    /// Returns a reference to the logical device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns a reference to the command queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}

impl ResourceAllocator for GpuContext {
    type Image = GpuImage;
    type Buffer = GpuBuffer;

    fn allocate_image(&self, desc: &ImageDescriptor<'_>) -> Result<GpuImage> {
        // wgpu reports invalid descriptors to the uncaptured-error handler,
        // which panics by default.
        check_image(desc, Some(self.device.limits().max_texture_dimension_2d))?;

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: desc.label,
            size: wgpu::Extent3d {
                width: desc.size.width,
                height: desc.size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: desc.mip_level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: desc.format.to_wgpu(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        log::debug!(
            "gpu image allocated: {} {:?} x{} level(s) ({:?})",
            desc.size,
            desc.format,
            desc.mip_level_count,
            desc.label
        );

        Ok(GpuImage {
            texture,
            device: self.device.clone(),
            queue: self.queue.clone(),
            size: desc.size,
            format: desc.format,
        })
    }

    fn allocate_buffer(&self, desc: &BufferDescriptor<'_>) -> Result<GpuBuffer> {
        check_buffer(desc, Some(self.device.limits().max_buffer_size))?;

        let usage = match desc.usage {
            BufferUsage::Vertex => wgpu::BufferUsages::VERTEX,
            BufferUsage::Index => wgpu::BufferUsages::INDEX,
            BufferUsage::Uniform => wgpu::BufferUsages::UNIFORM,
        } | wgpu::BufferUsages::COPY_DST
            | wgpu::BufferUsages::COPY_SRC;

        // Copies and writes operate on whole 4-byte words.
        let padded = align_up(desc.size.max(1), wgpu::COPY_BUFFER_ALIGNMENT);

        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: desc.label,
            size: padded,
            usage,
            mapped_at_creation: false,
        });

        let shadow = match desc.cache_mode {
            CacheMode::Shared => Some(vec![0u8; usize::try_from(desc.size)?]),
            CacheMode::Default => None,
        };

        log::debug!(
            "gpu buffer allocated: {} bytes {:?}/{:?} ({:?})",
            desc.size,
            desc.usage,
            desc.cache_mode,
            desc.label
        );

        Ok(GpuBuffer {
            buffer,
            device: self.device.clone(),
            queue: self.queue.clone(),
            len: desc.size,
            shadow,
        })
    }
}

/// Texture allocated by a [`GpuContext`].
pub struct GpuImage {
    texture: wgpu::Texture,
    device: wgpu::Device,
    queue: wgpu::Queue,
    size: PixelSize,
    format: PixelFormat,
}

impl GpuImage {
    /// The backing texture, for binding.
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    fn copy_info(&self, x: u32, y: u32, mip_level: u32) -> wgpu::TexelCopyTextureInfo<'_> {
        wgpu::TexelCopyTextureInfo {
            texture: &self.texture,
            mip_level,
            origin: wgpu::Origin3d { x, y, z: 0 },
            aspect: wgpu::TextureAspect::All,
        }
    }
}

impl ImageResource for GpuImage {
    fn size(&self) -> PixelSize {
        self.size
    }

    fn format(&self) -> PixelFormat {
        self.format
    }

    fn mip_level_count(&self) -> u32 {
        self.texture.mip_level_count()
    }

    fn read_bytes(
        &self,
        region: PixelRegion,
        mip_level: u32,
        bytes_per_row: usize,
        out: &mut [u8],
    ) -> Result<()> {
        let (x, y, w, h) = level_rect(region, self.size.at_mip_level(mip_level))?;
        if w == 0 || h == 0 {
            return Ok(());
        }

        let row_len = w as usize * self.format.bytes_per_pixel();
        anyhow::ensure!(bytes_per_row >= row_len, "bytes_per_row is smaller than a row");
        anyhow::ensure!(
            out.len() >= bytes_per_row * (h as usize - 1) + row_len,
            "read destination is too short"
        );

        // Texture-to-buffer copies require 256-byte aligned rows.
        let padded_row = align_up(row_len as u64, u64::from(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT));
        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tessera image readback"),
            size: padded_row * u64::from(h),
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("tessera image readback encoder"),
            });
        encoder.copy_texture_to_buffer(
            self.copy_info(x, y, mip_level),
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(u32::try_from(padded_row)?),
                    rows_per_image: Some(h),
                },
            },
            wgpu::Extent3d {
                width: w,
                height: h,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        map_for_read(&self.device, &staging)?;
        {
            let data = staging.slice(..).get_mapped_range();
            for row in 0..h as usize {
                let src = row * padded_row as usize;
                let dst = row * bytes_per_row;
                out[dst..dst + row_len].copy_from_slice(&data[src..src + row_len]);
            }
        }
        staging.unmap();
        Ok(())
    }

    fn write_bytes(
        &mut self,
        region: PixelRegion,
        mip_level: u32,
        bytes_per_row: usize,
        bytes: &[u8],
    ) -> Result<()> {
        let (x, y, w, h) = level_rect(region, self.size.at_mip_level(mip_level))?;
        if w == 0 || h == 0 {
            return Ok(());
        }

        self.queue.write_texture(
            self.copy_info(x, y, mip_level),
            bytes,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(u32::try_from(bytes_per_row)?),
                rows_per_image: Some(h),
            },
            wgpu::Extent3d {
                width: w,
                height: h,
                depth_or_array_layers: 1,
            },
        );
        Ok(())
    }
}

/// Buffer allocated by a [`GpuContext`].
///
/// `CacheMode::Shared` buffers keep a CPU shadow of their contents so reads
/// never wait on the device.
pub struct GpuBuffer {
    buffer: wgpu::Buffer,
    device: wgpu::Device,
    queue: wgpu::Queue,
    len: u64,
    shadow: Option<Vec<u8>>,
}

impl GpuBuffer {
    /// The backing buffer, for binding.
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

impl BufferResource for GpuBuffer {
    fn len(&self) -> u64 {
        self.len
    }

    fn write_bytes(&mut self, offset: u64, bytes: &[u8]) -> Result<()> {
        let (submit, end) = plan_write(offset, bytes, self.len)?;
        self.queue.write_buffer(&self.buffer, offset, &submit);

        if let Some(shadow) = self.shadow.as_mut() {
            shadow[offset as usize..end as usize].copy_from_slice(bytes);
        }
        Ok(())
    }

    fn read_bytes(&self) -> Result<Vec<u8>> {
        if let Some(shadow) = &self.shadow {
            return Ok(shadow.clone());
        }

        let size = self.buffer.size();
        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tessera buffer readback"),
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("tessera buffer readback encoder"),
            });
        encoder.copy_buffer_to_buffer(&self.buffer, 0, &staging, 0, size);
        self.queue.submit(std::iter::once(encoder.finish()));

        map_for_read(&self.device, &staging)?;
        let bytes = staging.slice(..).get_mapped_range()[..self.len as usize].to_vec();
        staging.unmap();
        Ok(bytes)
    }
}

/// Checks a write of `bytes` at `offset` into a buffer of logical length
/// `len` and returns the bytes to submit plus the logical end offset.
///
/// wgpu copies whole 4-byte words. An unaligned length is zero-padded, which
/// is only sound when the write ends at `len` so the padding lands in the
/// allocation's tail.
fn plan_write(offset: u64, bytes: &[u8], len: u64) -> Result<(Cow<'_, [u8]>, u64)> {
    let end = offset
        .checked_add(bytes.len() as u64)
        .filter(|&end| end <= len)
        .with_context(|| {
            format!(
                "write of {} bytes at offset {offset} overruns a {len}-byte buffer",
                bytes.len()
            )
        })?;
    anyhow::ensure!(
        offset % wgpu::COPY_BUFFER_ALIGNMENT == 0,
        "buffer write offset {offset} is not 4-byte aligned"
    );

    if bytes.len() as u64 % wgpu::COPY_BUFFER_ALIGNMENT == 0 {
        return Ok((Cow::Borrowed(bytes), end));
    }
    anyhow::ensure!(
        end == len,
        "unaligned buffer write must end at the end of the buffer"
    );
    let mut padded = bytes.to_vec();
    padded.resize(align_up(bytes.len() as u64, wgpu::COPY_BUFFER_ALIGNMENT) as usize, 0);
    Ok((Cow::Owned(padded), end))
}

/// Maps `buffer` for reading and blocks until the mapping completes.
fn map_for_read(device: &wgpu::Device, buffer: &wgpu::Buffer) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    buffer.slice(..).map_async(wgpu::MapMode::Read, move |res| {
        let _ = tx.send(res);
    });
    device
        .poll(wgpu::PollType::wait_indefinitely())
        .context("device poll failed during readback")?;
    rx.recv()
        .context("readback mapping callback was dropped")?
        .context("failed to map readback buffer")?;
    Ok(())
}

#[inline]
fn align_up(value: u64, alignment: u64) -> u64 {
    value.div_ceil(alignment) * alignment
}
