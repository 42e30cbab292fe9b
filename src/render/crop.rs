use std::str::FromStr;

use image::RgbaImage;

use crate::foundation::{
    core::PixelRect,
    error::{DiagramError, DiagramResult},
};

/// Crop boundaries in source pixels; `right` and `bottom` are exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct CropRect {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl CropRect {
    /// Build a rectangle, rejecting empty or inverted ones.
    pub fn new(left: i64, top: i64, right: i64, bottom: i64) -> DiagramResult<Self> {
        if right <= left {
            return Err(DiagramError::crop(format!(
                "right ({right}) must be greater than left ({left})"
            )));
        }
        if bottom <= top {
            return Err(DiagramError::crop(format!(
                "bottom ({bottom}) must be greater than top ({top})"
            )));
        }
        Ok(Self {
            left,
            top,
            right,
            bottom,
        })
    }

    /// Parse a `left,top,right,bottom` string.
    pub fn parse(s: &str) -> DiagramResult<Self> {
        let coords = s
            .split(',')
            .map(|c| c.trim().parse::<i64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| DiagramError::crop(format!("{s:?} has a non-integer component")))?;
        let &[left, top, right, bottom] = coords.as_slice() else {
            return Err(DiagramError::crop(format!(
                "expected 4 components in {s:?}, found {}",
                coords.len()
            )));
        };
        Self::new(left, top, right, bottom)
    }

    pub fn width(self) -> i64 {
        self.right - self.left
    }

    pub fn height(self) -> i64 {
        self.bottom - self.top
    }

    fn as_pixel_rect(self) -> PixelRect {
        PixelRect::new(self.left, self.top, self.right, self.bottom)
    }
}

impl FromStr for CropRect {
    type Err = DiagramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Copy the `rect` region of `image` into a new image, pixel for pixel.
///
/// The rectangle must lie inside the image.
pub fn crop(image: &RgbaImage, rect: CropRect) -> DiagramResult<RgbaImage> {
    let bounds = PixelRect::from_size(image.width(), image.height());
    if !bounds.contains_rect(rect.as_pixel_rect()) {
        return Err(DiagramError::crop(format!(
            "{},{},{},{} exceeds the {}x{} image",
            rect.left,
            rect.top,
            rect.right,
            rect.bottom,
            image.width(),
            image.height()
        )));
    }

    // Containment above bounds every coordinate to [0, u32::MAX].
    let (left, top) = (rect.left as u32, rect.top as u32);
    let out = image::imageops::crop_imm(
        image,
        left,
        top,
        rect.width() as u32,
        rect.height() as u32,
    )
    .to_image();
    tracing::debug!(left, top, width = out.width(), height = out.height(), "cropped");
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/render/crop.rs"]
mod tests;
