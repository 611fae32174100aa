use super::Vec2;

/// Axis-aligned float rectangle (top-left origin).
///
/// Used as the frame a grid mesh is tesselated over, both for positions and
/// for texture coordinates.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub const fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    /// The unit square `(0, 0) .. (1, 1)`, the usual texture-coordinate frame.
    #[inline]
    pub const fn unit() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }

    #[inline]
    pub fn min(self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        self.origin + self.size
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.origin.is_finite() && self.size.is_finite()
    }

    /// True when the size is non-negative on both axes and every component is
    /// finite. Zero-area frames are allowed; they collapse the grid to a line
    /// or a point.
    #[inline]
    pub fn is_valid_frame(self) -> bool {
        self.is_finite() && self.size.x >= 0.0 && self.size.y >= 0.0
    }
}
