//! Headless smoke test of the data layer against a real wgpu device.
//!
//! Exits non-zero if no adapter is available or any round trip disagrees.

use anyhow::{ensure, Context, Result};
use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use tessera_gpu::coords::{PixelRegion, PixelSize, Rect};
use tessera_gpu::device::{BufferResource, GpuContext, GpuInit};
use tessera_gpu::logging::{init_logging, LoggingConfig};
use tessera_gpu::math::{perspective, rotation, translation};
use tessera_gpu::mesh::{GridDimensions, GridMesh, MeshBuffers, TexturedVertex};
use tessera_gpu::raster::RasterBuffer;
use tessera_gpu::uniforms::UniformRing;

const FRAMES_IN_FLIGHT: usize = 3;
const FRAMES: u32 = 6;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct Globals {
    model_view_projection: [[f32; 4]; 4],
}

impl Globals {
    fn at_angle(angle: f32) -> Self {
        let mvp = perspective(16.0 / 9.0, 60f32.to_radians(), 0.1, 100.0)
            * translation(Vec3::new(0.0, 0.0, -3.0))
            * rotation(Vec3::Y, angle);
        Self {
            model_view_projection: mvp.to_cols_array_2d(),
        }
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let gpu = GpuContext::new(GpuInit::default()).context("failed to acquire a GPU device")?;
    let info = gpu.adapter_info();
    log::info!("adapter: {} ({:?})", info.name, info.backend);

    // ── mesh ──────────────────────────────────────────────────────────────
    let mesh = GridMesh::<TexturedVertex>::generate_textured(
        Rect::new(-1.0, -1.0, 2.0, 2.0),
        Rect::unit(),
        GridDimensions::new(64, 64),
    )?;
    let buffers = MeshBuffers::upload(&gpu, &mesh)?;
    ensure!(
        buffers.index_buffer().read_bytes()? == mesh.index_bytes(),
        "index buffer readback differs from generated indices"
    );

    // ── uniforms ──────────────────────────────────────────────────────────
    let mut ring = UniformRing::new(Globals::at_angle(0.0), &gpu, FRAMES_IN_FLIGHT)?;
    for frame in 0..FRAMES {
        ring.set(Globals::at_angle(frame as f32 * 0.1))?;
        let slot = ring.next_slot();
        log::trace!("frame {frame}: bound {} byte uniform slot", slot.len());
    }
    let expected = bytemuck::bytes_of(ring.get()).to_vec();
    for (i, slot) in ring.slots().iter().enumerate() {
        ensure!(slot.read_bytes()? == expected, "uniform slot {i} is stale");
    }

    // ── raster ────────────────────────────────────────────────────────────
    let mut raster = RasterBuffer::bgra8(&gpu, PixelSize::new(128, 64))?;
    let region = PixelRegion::from_xywh(17, 9, 33, 21);
    let texels: Vec<u8> = (0..region.area() as usize * 4)
        .map(|i| (i % 251) as u8)
        .collect();
    raster.set(region, &texels)?;
    ensure!(
        raster.get(region)? == texels,
        "raster region {region} did not round-trip"
    );

    log::info!(
        "ok: {} vertices / {} {:?} indices, {} uniform slots, {}x{} raster",
        buffers.vertex_count(),
        buffers.index_count(),
        buffers.index_width(),
        ring.capacity(),
        raster.width(),
        raster.height()
    );
    Ok(())
}
