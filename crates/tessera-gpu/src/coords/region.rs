use std::fmt;

/// Integer texel coordinate.
///
/// Signed so that a region positioned left of or above the image can be
/// expressed and rejected, rather than wrapping around.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct PixelIndex {
    pub x: i64,
    pub y: i64,
}

impl PixelIndex {
    #[inline]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self { x: 0, y: 0 }
    }

    /// True when the texel lies inside an image of size `bounds`.
    #[inline]
    pub fn within(self, bounds: PixelSize) -> bool {
        PixelRegion::pixel(self).within(bounds)
    }
}

/// Integer extent in texels.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn area(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Extent of mip level `level` of an image with this size.
    ///
    /// Each level halves both axes, never going below one texel.
    #[inline]
    pub fn at_mip_level(self, level: u32) -> PixelSize {
        PixelSize::new(
            self.width.checked_shr(level).unwrap_or(0).max(1),
            self.height.checked_shr(level).unwrap_or(0).max(1),
        )
    }

    /// Number of levels in a full mip chain down to 1x1.
    #[inline]
    pub fn full_mip_chain_len(self) -> u32 {
        let largest = self.width.max(self.height).max(1);
        u32::BITS - largest.leading_zeros()
    }

    /// The region covering the whole extent.
    #[inline]
    pub const fn bounds(self) -> PixelRegion {
        PixelRegion::new(PixelIndex::zero(), self)
    }
}

/// Axis-aligned rectangle of texels: `origin` is the top-left texel.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct PixelRegion {
    pub origin: PixelIndex,
    pub size: PixelSize,
}

impl PixelRegion {
    #[inline]
    pub const fn new(origin: PixelIndex, size: PixelSize) -> Self {
        Self { origin, size }
    }

    #[inline]
    pub const fn from_xywh(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self::new(PixelIndex::new(x, y), PixelSize::new(width, height))
    }

    /// The 1x1 region covering a single texel.
    #[inline]
    pub const fn pixel(index: PixelIndex) -> Self {
        Self::new(index, PixelSize::new(1, 1))
    }

    #[inline]
    pub fn width(self) -> u32 {
        self.size.width
    }

    #[inline]
    pub fn height(self) -> u32 {
        self.size.height
    }

    #[inline]
    pub fn area(self) -> u64 {
        self.size.area()
    }

    /// Containment predicate used before every byte-level access:
    /// `x >= 0 && y >= 0 && x + width <= bounds.width && y + height <= bounds.height`.
    pub fn within(self, bounds: PixelSize) -> bool {
        if self.origin.x < 0 || self.origin.y < 0 {
            return false;
        }
        let fits = |origin: i64, extent: u32, limit: u32| {
            origin
                .checked_add(i64::from(extent))
                .is_some_and(|end| end <= i64::from(limit))
        };
        fits(self.origin.x, self.size.width, bounds.width)
            && fits(self.origin.y, self.size.height, bounds.height)
    }

    /// Projects a region framed at native resolution onto mip level `level`.
    ///
    /// Origin and size are both halved once per level; a region narrower than
    /// `2^level` texels collapses to zero on that axis.
    pub fn at_mip_level(self, level: u32) -> PixelRegion {
        let shift_i = |v: i64| v.checked_shr(level).unwrap_or(0);
        let shift_u = |v: u32| v.checked_shr(level).unwrap_or(0);
        PixelRegion::from_xywh(
            shift_i(self.origin.x),
            shift_i(self.origin.y),
            shift_u(self.size.width),
            shift_u(self.size.height),
        )
    }
}

impl fmt::Display for PixelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl fmt::Display for PixelIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl fmt::Display for PixelRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.origin, self.size)
    }
}
