use image::{Rgba, RgbaImage};

use crate::foundation::core::{PixelRect, Rgba8};

/// Source-over blend of two straight-alpha pixels.
pub fn over(dst: Rgba8, src: Rgba8) -> Rgba8 {
    if src[3] == 0 {
        return dst;
    }
    if src[3] == 255 {
        return src;
    }

    let (d, s) = (premultiply(dst), premultiply(src));
    let inv = 255u16 - u16::from(s[3]);

    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = s[i].saturating_add(mul_div255(u16::from(d[i]), inv));
    }
    unpremultiply(out)
}

/// Composite `src` onto `dst` with `src`'s pixel (0,0) at the top-left of `target`.
///
/// Only the part of `target` that lies inside both `dst` and `src` is touched. Returns the
/// number of destination pixels visited.
pub fn draw_over(dst: &mut RgbaImage, src: &RgbaImage, target: PixelRect) -> u64 {
    let src_extent = PixelRect::new(
        target.left,
        target.top,
        target.left + i64::from(src.width()),
        target.top + i64::from(src.height()),
    );
    let clip = PixelRect::from_size(dst.width(), dst.height())
        .intersect(target)
        .intersect(src_extent);
    if clip.is_empty() {
        return 0;
    }

    for y in clip.top..clip.bottom {
        for x in clip.left..clip.right {
            // Inside `clip`, all four coordinates are non-negative and in range.
            let s = src.get_pixel((x - target.left) as u32, (y - target.top) as u32).0;
            let d = dst.get_pixel_mut(x as u32, y as u32);
            *d = Rgba(over(d.0, s));
        }
    }
    (clip.width() * clip.height()) as u64
}

/// Source-over fill of `rect` (clipped to `dst`) with a single color.
pub fn fill_over(dst: &mut RgbaImage, rect: PixelRect, color: Rgba8) {
    let clip = PixelRect::from_size(dst.width(), dst.height()).intersect(rect);
    for y in clip.top..clip.bottom {
        for x in clip.left..clip.right {
            let d = dst.get_pixel_mut(x as u32, y as u32);
            *d = Rgba(over(d.0, color));
        }
    }
}

fn premultiply(px: Rgba8) -> Rgba8 {
    let a = u16::from(px[3]);
    [
        mul_div255(u16::from(px[0]), a),
        mul_div255(u16::from(px[1]), a),
        mul_div255(u16::from(px[2]), a),
        px[3],
    ]
}

fn unpremultiply(px: Rgba8) -> Rgba8 {
    let a = u32::from(px[3]);
    if a == 0 {
        return [0, 0, 0, 0];
    }
    let un = |c: u8| ((u32::from(c) * 255 + a / 2) / a).min(255) as u8;
    [un(px[0]), un(px[1]), un(px[2]), px[3]]
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
