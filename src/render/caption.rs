use image::RgbaImage;

use crate::{
    caption::parse::Caption,
    foundation::{
        core::{PixelPoint, PixelRect},
        error::DiagramResult,
    },
    render::composite::draw_over,
    text::TextRenderer,
};

/// Rectangle a `glyph_w x glyph_h` bitmap occupies when centered on `anchor`.
///
/// Half extents use truncating division, so odd sizes lose their last row or column.
pub fn caption_target(anchor: PixelPoint, glyph_w: u32, glyph_h: u32) -> PixelRect {
    let (x, y) = (i64::from(anchor.x), i64::from(anchor.y));
    let (hw, hh) = (i64::from(glyph_w / 2), i64::from(glyph_h / 2));
    PixelRect::new(x - hw, y - hh, x + hw, y + hh)
}

/// Render `caption` and composite it centered on its position, clipped to the image.
pub fn apply_caption(
    image: &mut RgbaImage,
    caption: &Caption,
    renderer: &dyn TextRenderer,
) -> DiagramResult<()> {
    let glyph = renderer.render(&caption.text, caption.size)?;
    let target = caption_target(caption.position, glyph.width(), glyph.height());
    let touched = draw_over(image, &glyph, target);
    tracing::debug!(
        text = %caption.text,
        size = caption.size,
        x = caption.position.x,
        y = caption.position.y,
        touched,
        "caption"
    );
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/caption.rs"]
mod tests;
