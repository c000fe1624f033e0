//! Pixel-space rectangles and points.

/// Axis-aligned rectangle in whole pixels. Width and height may be negative
/// or zero in caller input; operations treat such rectangles as empty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle covering a whole `width` x `height` image.
    pub fn of_size(width: usize, height: usize) -> Self {
        Self::new(0, 0, to_i32(width), to_i32(height))
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// `x + width`, saturating at the `i32` range.
    #[inline]
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Overlap with `[0, width) x [0, height)`, or `None` when there is none.
    pub fn clip_to(&self, width: usize, height: usize) -> Option<Rect> {
        let x0 = self.x.max(0);
        let y0 = self.y.max(0);
        let x1 = self.right().min(to_i32(width));
        let y1 = self.bottom().min(to_i32(height));
        (x1 > x0 && y1 > y0).then(|| Rect::new(x0, y0, x1 - x0, y1 - y0))
    }

    /// Every field divided by two, for the next mip level.
    pub(crate) const fn halved(&self) -> Rect {
        Rect::new(self.x / 2, self.y / 2, self.width / 2, self.height / 2)
    }
}

/// A point with sub-pixel precision.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32)> for Vec2 {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

#[inline]
pub(crate) fn to_i32(v: usize) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}
