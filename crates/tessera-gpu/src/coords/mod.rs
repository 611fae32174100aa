//! Coordinate and geometry types shared by the raster and mesh layers.
//!
//! Two spaces are in use:
//! - float frames (`Rect`, `Vec2`) describe where generated geometry lands
//! - integer pixel regions (`PixelRegion`, `PixelIndex`, `PixelSize`) address
//!   texels of a raster resource, origin top-left, +X right, +Y down

mod rect;
mod region;
mod vec2;

pub use rect::Rect;
pub use region::{PixelIndex, PixelRegion, PixelSize};
pub use vec2::Vec2;
