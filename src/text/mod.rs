use image::RgbaImage;

use crate::foundation::error::DiagramResult;

pub(crate) mod markup;
pub(crate) mod svg;

/// Rasterizes a string of caption markup into a standalone glyph bitmap.
///
/// Implementations must return a straight-alpha image with a transparent background whose
/// bounds are tightly cropped to the ink. `markup` may contain `<sub>…</sub>` and
/// `<sup>…</sup>` spans. A result without visible pixels is an error, not an empty image.
pub trait TextRenderer {
    /// Render `markup` at `size_pt` points.
    fn render(&self, markup: &str, size_pt: u32) -> DiagramResult<RgbaImage>;
}

impl<T: TextRenderer + ?Sized> TextRenderer for &T {
    fn render(&self, markup: &str, size_pt: u32) -> DiagramResult<RgbaImage> {
        (**self).render(markup, size_pt)
    }
}

impl<T: TextRenderer + ?Sized> TextRenderer for Box<T> {
    fn render(&self, markup: &str, size_pt: u32) -> DiagramResult<RgbaImage> {
        (**self).render(markup, size_pt)
    }
}
