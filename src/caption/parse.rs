use std::{fmt, path::Path};

use anyhow::Context as _;
use tracing::{debug, warn};

use crate::foundation::{
    core::PixelPoint,
    error::{DiagramError, DiagramResult},
};

/// A positioned, sized text annotation.
///
/// `text` is renderer markup: the `_<digits>` shorthand of the caption format has already been
/// rewritten to `<sub>digits</sub>`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Caption {
    pub text: String,
    /// Font size in points.
    pub size: u32,
    /// Anchor the rendered text is centered on, in pre-crop pixel space.
    pub position: PixelPoint,
}

impl Caption {
    pub fn new(text: impl Into<String>, size: u32, position: PixelPoint) -> Self {
        Self {
            text: text.into(),
            size,
            position,
        }
    }
}

impl fmt::Display for Caption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {},{}",
            self.text, self.size, self.position.x, self.position.y
        )
    }
}

/// Result of parsing a caption source: the captions in input order plus the lines that were
/// skipped along the way.
#[derive(Debug, Default)]
pub struct ParsedCaptions {
    pub captions: Vec<Caption>,
    /// Always [`DiagramError::MalformedCaptionLine`] values.
    pub warnings: Vec<DiagramError>,
}

/// Parse a caption source with one `<text> <size> <x>,<y>` record per line.
///
/// Blank lines are ignored. Lines with the wrong field count or a bad size are skipped and
/// recorded in [`ParsedCaptions::warnings`]. A malformed `x,y` field fails the whole parse.
#[tracing::instrument(skip(source), fields(bytes = source.len()))]
pub fn parse_captions(source: &str) -> DiagramResult<ParsedCaptions> {
    let mut out = ParsedCaptions::default();

    for (idx, raw) in source.lines().enumerate() {
        let line = idx + 1;
        let fields: Vec<&str> = raw.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }

        let &[text, size, xy] = fields.as_slice() else {
            debug!(line, fields = fields.len(), "skipping caption line");
            out.warnings.push(DiagramError::malformed_line(
                line,
                format!("expected 3 fields, found {}", fields.len()),
            ));
            continue;
        };

        match parse_caption_fields(line, text, size, xy) {
            Ok(caption) => out.captions.push(caption),
            Err(err) if err.is_recoverable() => {
                warn!("{err}, skipping");
                out.warnings.push(err);
            }
            Err(err) => return Err(err),
        }
    }

    debug!(
        captions = out.captions.len(),
        skipped = out.warnings.len(),
        "parsed captions"
    );
    Ok(out)
}

/// Read and parse a caption file.
pub fn read_caption_file(path: &Path) -> DiagramResult<ParsedCaptions> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("read caption file '{}'", path.display()))?;
    parse_captions(&source)
}

/// Build a caption from its three raw fields. `line` is only used for error reporting.
///
/// The size is checked before the coordinates, so a line with both wrong is skippable.
pub fn parse_caption_fields(
    line: usize,
    text: &str,
    size: &str,
    xy: &str,
) -> DiagramResult<Caption> {
    let size_pt = size.parse::<i64>().map_err(|_| {
        DiagramError::malformed_line(line, format!("caption size {size:?} is not an integer"))
    })?;
    let size_pt = u32::try_from(size_pt)
        .ok()
        .filter(|&s| s > 0)
        .ok_or_else(|| {
            DiagramError::malformed_line(line, format!("caption size {size_pt} is out of range"))
        })?;

    let position = parse_position(line, xy)?;

    Ok(Caption {
        text: rewrite_subscripts(text),
        size: size_pt,
        position,
    })
}

fn parse_position(line: usize, xy: &str) -> DiagramResult<PixelPoint> {
    let parts: Vec<&str> = xy.split(',').collect();
    let &[x, y] = parts.as_slice() else {
        return Err(DiagramError::malformed_coordinates(line, xy));
    };
    let coord = |s: &str| {
        s.parse::<i32>()
            .map_err(|_| DiagramError::malformed_coordinates(line, xy))
    };
    Ok(PixelPoint::new(coord(x)?, coord(y)?))
}

/// Rewrite every `_<digits>` run into `<sub>digits</sub>`.
///
/// An underscore not followed by a digit is kept as-is.
pub fn rewrite_subscripts(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '_' || !chars.peek().is_some_and(char::is_ascii_digit) {
            out.push(c);
            continue;
        }
        out.push_str("<sub>");
        while let Some(d) = chars.next_if(char::is_ascii_digit) {
            out.push(d);
        }
        out.push_str("</sub>");
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/caption/parse.rs"]
mod tests;
