/// Straight-alpha RGBA8 pixel, the layout `image::RgbaImage` stores.
pub type Rgba8 = [u8; 4];

/// Foreground color used for grid lines.
pub const FOREGROUND: Rgba8 = [0, 0, 0, 255];

/// Integer pixel coordinate, origin at the top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Half-open pixel rectangle `[left, right) x [top, bottom)`.
///
/// Coordinates are signed so that overlay targets may hang off any edge of the image before
/// being clipped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl PixelRect {
    pub const fn new(left: i64, top: i64, right: i64, bottom: i64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// The rectangle covering a `width x height` image.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, i64::from(width), i64::from(height))
    }

    pub fn width(self) -> i64 {
        (self.right - self.left).max(0)
    }

    pub fn height(self) -> i64 {
        (self.bottom - self.top).max(0)
    }

    pub fn is_empty(self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn intersect(self, other: Self) -> Self {
        let r = Self {
            left: self.left.max(other.left),
            top: self.top.max(other.top),
            right: self.right.min(other.right),
            bottom: self.bottom.min(other.bottom),
        };
        if r.is_empty() { Self::default() } else { r }
    }

    /// Whether `other` lies entirely inside `self`.
    pub fn contains_rect(self, other: Self) -> bool {
        other.left >= self.left
            && other.top >= self.top
            && other.right <= self.right
            && other.bottom <= self.bottom
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
