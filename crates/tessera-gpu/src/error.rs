//! Error types for the data layer.
//!
//! Every variant except [`Error::Device`] is a caller contract violation that
//! is detected synchronously, before any device call is made. None of them
//! are retried or clamped internally.

use thiserror::Error;

use crate::coords::{PixelRegion, PixelSize, Rect};

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A region or texel index is not contained in the addressed image level.
    #[error("region {region} is out of bounds of {bounds} at mip level {mip_level}")]
    OutOfBounds {
        region: PixelRegion,
        bounds: PixelSize,
        mip_level: u32,
    },

    /// The supplied element count does not match the addressed texel count.
    #[error("expected {expected} channel values for the addressed region, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// A mip-level write whose native-framed region does not start and end on
    /// texel boundaries of that level.
    #[error("region {region} does not cover whole texels of mip level {mip_level}")]
    UnalignedRegion { region: PixelRegion, mip_level: u32 },

    /// The mip level does not exist on the backing resource.
    #[error("mip level {level} requested but the resource has {levels} level(s)")]
    MipLevelOutOfRange { level: u32, levels: u32 },

    /// Grid dimensions with fewer than one cell per axis, or too many vertices
    /// to index.
    #[error("invalid grid dimensions {cells_x}x{cells_y}")]
    InvalidDimensions { cells_x: u32, cells_y: u32 },

    /// A mesh frame with a negative or non-finite size.
    #[error("invalid mesh frame {0:?}")]
    InvalidFrame(Rect),

    /// A uniform ring must have at least one slot.
    #[error("uniform ring capacity must be at least 1")]
    InvalidCapacity,

    /// Failure reported by the graphics collaborator (device lost, allocation
    /// failure, readback failure). Passed through unchanged.
    #[error(transparent)]
    Device(#[from] anyhow::Error),
}
