use std::str::FromStr;

use image::RgbaImage;
use tracing::debug;

use crate::{
    foundation::{
        core::{FOREGROUND, PixelRect},
        error::{DiagramError, DiagramResult},
    },
    render::composite::{draw_over, fill_over},
    text::TextRenderer,
};

/// Number of horizontal and vertical grid lines. Zero disables that direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct GridSpec {
    pub horizontal: u32,
    pub vertical: u32,
}

impl GridSpec {
    pub const fn new(horizontal: u32, vertical: u32) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Parse an `h,v` string.
    pub fn parse(s: &str) -> DiagramResult<Self> {
        let parts: Vec<&str> = s.split(',').collect();
        let &[h, v] = parts.as_slice() else {
            return Err(DiagramError::grid(format!(
                "expected \"h,v\", got {s:?}"
            )));
        };
        let count = |field: &str| {
            field.trim().parse::<u32>().map_err(|_| {
                DiagramError::grid(format!(
                    "{field:?} in {s:?} is not a non-negative integer"
                ))
            })
        };
        Ok(Self::new(count(h)?, count(v)?))
    }
}

impl FromStr for GridSpec {
    type Err = DiagramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Where grid lines go on an image and how large their labels are.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GridLayout {
    /// Rows of the horizontal lines, ascending.
    pub rows: Vec<u32>,
    /// Columns of the vertical lines, ascending.
    pub columns: Vec<u32>,
    /// Font size of the offset labels, in points. Zero means no labels.
    pub label_size: u32,
}

/// Spacing between lines along an axis of `extent` pixels.
///
/// With no lines requested the step is `extent - 1`, which still places a single line on the
/// last row or column.
pub fn grid_step(extent: u32, lines: u32) -> u32 {
    if lines > 0 {
        extent / lines
    } else {
        extent.saturating_sub(1)
    }
}

/// Label font size: the square root of the image area, over 100.
pub fn label_size(width: u32, height: u32) -> u32 {
    let area = u64::from(width) * u64::from(height);
    let side = (area as f64).sqrt() as u64;
    u32::try_from(side / 100).unwrap_or(u32::MAX)
}

/// Line offsets `step, 2*step, …` strictly below `extent`.
fn offsets(extent: u32, step: u32) -> Vec<u32> {
    if step == 0 {
        return Vec::new();
    }
    (step..extent).step_by(step as usize).collect()
}

pub fn grid_layout(width: u32, height: u32, spec: GridSpec) -> GridLayout {
    GridLayout {
        rows: offsets(height, grid_step(height, spec.horizontal)),
        columns: offsets(width, grid_step(width, spec.vertical)),
        label_size: label_size(width, height),
    }
}

/// Draw labelled grid lines onto `image`.
///
/// Each label is composited first with its top-left corner on the line, then the line is drawn
/// over it.
#[tracing::instrument(skip(image, renderer), fields(width = image.width(), height = image.height()))]
pub fn apply_grid(
    image: &mut RgbaImage,
    spec: GridSpec,
    renderer: &dyn TextRenderer,
) -> DiagramResult<()> {
    let (width, height) = image.dimensions();
    let layout = grid_layout(width, height, spec);
    debug!(
        rows = layout.rows.len(),
        columns = layout.columns.len(),
        label_size = layout.label_size,
        "grid layout"
    );

    for &row in &layout.rows {
        let row = i64::from(row);
        if layout.label_size > 0 {
            let label = renderer.render(&row.to_string(), layout.label_size)?;
            let target = PixelRect::new(
                0,
                row,
                i64::from(label.width()),
                row + i64::from(label.height()),
            );
            draw_over(image, &label, target);
        }
        fill_over(
            image,
            PixelRect::new(0, row, i64::from(width), row + 1),
            FOREGROUND,
        );
    }

    for &col in &layout.columns {
        let col = i64::from(col);
        if layout.label_size > 0 {
            let label = renderer.render(&col.to_string(), layout.label_size)?;
            let target = PixelRect::new(
                col,
                0,
                col + i64::from(label.width()),
                i64::from(label.height()),
            );
            draw_over(image, &label, target);
        }
        fill_over(
            image,
            PixelRect::new(col, 0, col + 1, i64::from(height)),
            FOREGROUND,
        );
    }

    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/grid.rs"]
mod tests;
