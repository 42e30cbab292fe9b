use std::{
    fmt::Write as _,
    path::{Path, PathBuf},
    sync::Arc,
};

use image::RgbaImage;

use crate::{
    foundation::error::{DiagramError, DiagramResult},
    text::{
        TextRenderer,
        markup::{Shift, Span, parse_markup, visible_len},
    },
};

/// Shifted runs are drawn at this fraction of the caption size.
const SHIFTED_SCALE: f32 = 0.7;

// Avoid pathological allocations for absurd font sizes.
const MAX_DIM: u32 = 16_384;

/// [`TextRenderer`] that lays text out as an SVG `<text>` element with `usvg` and rasterizes it
/// with `resvg`.
///
/// One point maps to one pixel. Glyphs are black on a transparent background and the result is
/// cropped to the ink.
pub struct SvgTextRenderer {
    options: usvg::Options<'static>,
}

impl SvgTextRenderer {
    /// Renderer backed by the system fonts.
    pub fn new() -> Self {
        Self::with_font_dirs(&[])
    }

    /// Renderer backed by the system fonts plus every `.ttf`/`.otf`/`.ttc` file in `dirs`.
    pub fn with_font_dirs(dirs: &[PathBuf]) -> Self {
        let options = usvg::Options {
            fontdb: build_fontdb(dirs),
            font_resolver: make_font_resolver(),
            ..Default::default()
        };
        Self { options }
    }

    /// Number of font faces available to the renderer.
    pub fn face_count(&self) -> usize {
        self.options.fontdb.faces().count()
    }
}

impl Default for SvgTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SvgTextRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SvgTextRenderer")
            .field("faces", &self.face_count())
            .finish()
    }
}

impl TextRenderer for SvgTextRenderer {
    fn render(&self, markup: &str, size_pt: u32) -> DiagramResult<RgbaImage> {
        if size_pt == 0 {
            return Err(DiagramError::render("font size must be positive"));
        }
        let spans = parse_markup(markup);
        if spans.is_empty() {
            return Err(DiagramError::render("nothing to render"));
        }

        let doc = svg_document(&spans, size_pt)?;
        let tree = usvg::Tree::from_str(&doc.source, &self.options)
            .map_err(|e| DiagramError::render(format!("lay out {markup:?}: {e}")))?;

        let mut pixmap = resvg::tiny_skia::Pixmap::new(doc.width, doc.height)
            .ok_or_else(|| DiagramError::render("failed to allocate text pixmap"))?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::identity(),
            &mut pixmap.as_mut(),
        );

        crop_to_ink(&pixmap).ok_or_else(|| {
            DiagramError::render(format!(
                "no visible glyphs for {markup:?} (is a font installed?)"
            ))
        })
    }
}

pub(crate) struct SvgDocument {
    pub(crate) source: String,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

/// Build an SVG document holding the spans, on a canvas large enough for any glyph run.
pub(crate) fn svg_document(spans: &[Span], size_pt: u32) -> DiagramResult<SvgDocument> {
    let chars = u32::try_from(visible_len(spans)).unwrap_or(u32::MAX);
    let width = chars
        .saturating_mul(3)
        .div_ceil(2)
        .saturating_add(2)
        .saturating_mul(size_pt);
    let height = size_pt.saturating_mul(3);
    if width > MAX_DIM || height > MAX_DIM {
        return Err(DiagramError::render(format!(
            "text raster size too large: {width}x{height} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }

    let size = size_pt as f32;
    let mut source = String::new();
    let _ = write!(
        source,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}">"#
    );
    let _ = write!(
        source,
        r#"<text x="{size}" y="{}" font-family="sans-serif" font-size="{size}" fill="black">"#,
        size * 2.0
    );
    for span in spans {
        let text = xml_escape(&span.text);
        let shift = match span.shift {
            Shift::Baseline => {
                source.push_str(&text);
                continue;
            }
            Shift::Sub => "sub",
            Shift::Super => "super",
        };
        let _ = write!(
            source,
            r#"<tspan baseline-shift="{shift}" font-size="{}">{text}</tspan>"#,
            size * SHIFTED_SCALE
        );
    }
    source.push_str("</text></svg>");

    Ok(SvgDocument {
        source,
        width,
        height,
    })
}

fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Copy the smallest rectangle holding every non-transparent pixel, un-premultiplied.
fn crop_to_ink(pixmap: &resvg::tiny_skia::Pixmap) -> Option<RgbaImage> {
    let width = pixmap.width();
    let pixels = pixmap.pixels();

    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (i, px) in pixels.iter().enumerate() {
        if px.alpha() == 0 {
            continue;
        }
        let (x, y) = ((i as u32) % width, (i as u32) / width);
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }

    let (x0, y0, x1, y1) = bounds?;
    Some(RgbaImage::from_fn(x1 - x0 + 1, y1 - y0 + 1, |x, y| {
        let idx = ((y + y0) * width + (x + x0)) as usize;
        let c = pixels[idx].demultiply();
        image::Rgba([c.red(), c.green(), c.blue(), c.alpha()])
    }))
}

fn build_fontdb(dirs: &[PathBuf]) -> Arc<usvg::fontdb::Database> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    for dir in dirs {
        load_fonts_from_dir(&mut db, dir);
    }
    tracing::debug!(faces = db.len(), "loaded font database");
    Arc::new(db)
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "font directory is not readable");
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(err) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), %err, "skipping font file");
        }
    }
}

/// Resolve generic families against whatever is installed, and fall back to any face rather
/// than silently dropping the text.
fn make_font_resolver() -> usvg::FontResolver<'static> {
    use usvg::FontResolver;

    FontResolver {
        select_font: Box::new(|font, fontdb| {
            let mut families = Vec::<usvg::fontdb::Family<'_>>::new();
            for family in font.families() {
                families.push(match family {
                    usvg::FontFamily::Serif => usvg::fontdb::Family::Serif,
                    usvg::FontFamily::SansSerif => usvg::fontdb::Family::SansSerif,
                    usvg::FontFamily::Cursive => usvg::fontdb::Family::Cursive,
                    usvg::FontFamily::Fantasy => usvg::fontdb::Family::Fantasy,
                    usvg::FontFamily::Monospace => usvg::fontdb::Family::Monospace,
                    usvg::FontFamily::Named(s) => usvg::fontdb::Family::Name(s),
                });
            }
            for fallback in ["DejaVu Sans", "Liberation Sans", "Noto Sans"] {
                families.push(usvg::fontdb::Family::Name(fallback));
            }

            let query = usvg::fontdb::Query {
                families: &families,
                weight: usvg::fontdb::Weight(font.weight()),
                stretch: usvg::fontdb::Stretch::Normal,
                style: usvg::fontdb::Style::Normal,
            };

            if let Some(id) = fontdb.query(&query) {
                return Some(id);
            }
            fontdb.faces().next().map(|f| f.id)
        }),
        select_fallback: FontResolver::default_fallback_selector(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/svg.rs"]
mod tests;
