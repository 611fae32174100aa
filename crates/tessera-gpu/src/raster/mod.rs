//! Typed, bounds-checked texel access into device-owned 2-D images.
//!
//! Reads address a mip level in that level's own texel space: a region read
//! from level `L` must fit `bounds >> L` and yields `area` texels.
//!
//! Writes are framed at native resolution: a region of area `A` written to
//! level `L` carries `A / 4^L` texels and is projected onto the level by
//! halving origin and size once per level. It must therefore be aligned to
//! `2^L` native texels.

mod buffer;
mod channel;

pub use buffer::RasterBuffer;
pub use channel::PixelChannel;
