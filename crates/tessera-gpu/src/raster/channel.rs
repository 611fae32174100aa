use bytemuck::Pod;

/// Element type of one pixel channel (`u8` for `Bgra8Unorm`, `f32` for
/// `Rgba32Float`, ...).
///
/// The channel type and channel count of a `RasterBuffer` must agree with the
/// pixel format of its image. This is a documented precondition: only the
/// resulting byte counts are checked.
pub trait PixelChannel: Pod {}

impl PixelChannel for i8 {}
impl PixelChannel for i16 {}
impl PixelChannel for i32 {}
impl PixelChannel for u8 {}
impl PixelChannel for u16 {}
impl PixelChannel for u32 {}
impl PixelChannel for f32 {}
