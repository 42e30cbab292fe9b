//! Caption and grid overlays for raster images.
//!
//! `diagram` takes a PNG and a caption file and produces an annotated image.
//!
//! # Pipeline overview
//!
//! 1. **Parse**: caption file text → [`Caption`]s ([`parse_captions`])
//! 2. **Grid** (optional): labelled coordinate lines ([`apply_grid`])
//! 3. **Captions**: each caption rendered by a [`TextRenderer`] and centered on its anchor
//!    ([`apply_caption`])
//! 4. **Crop** (optional): a sub-rectangle of the annotated image ([`crop`])
//! 5. **Finalize**: write a PNG or open a viewer ([`Output`])
//!
//! [`Compositor`] owns the image through steps 2–4 and refuses to run them out of order, so
//! caption positions are always in pre-crop pixel space.
//!
//! Text rasterization sits behind the [`TextRenderer`] trait. [`SvgTextRenderer`] is the
//! production implementation; tests substitute fixed-size bitmaps.
#![forbid(unsafe_code)]

mod caption;
mod config;
mod foundation;
pub mod logging;
mod render;
mod session;
mod text;

pub use caption::parse::{
    Caption, ParsedCaptions, parse_caption_fields, parse_captions, read_caption_file,
    rewrite_subscripts,
};
pub use config::RunConfig;
pub use foundation::core::{FOREGROUND, PixelPoint, PixelRect, Rgba8};
pub use foundation::error::{DiagramError, DiagramResult};
pub use render::caption::{apply_caption, caption_target};
pub use render::composite::{draw_over, fill_over, over};
pub use render::crop::{CropRect, crop};
pub use render::grid::{GridLayout, GridSpec, apply_grid, grid_layout, grid_step, label_size};
pub use render::output::{
    DEFAULT_VIEWER, Output, VIEWER_ENV, display, ensure_parent_dir, load_image, save_png,
};
pub use render::pipeline::{Compositor, Plan, Stage, render_once};
pub use session::interactive::{InteractiveSession, RenderRequest, RequestPlan, SessionState};
pub use session::protocol::{Reply, serve_lines};
pub use text::TextRenderer;
pub use text::markup::{Shift, Span, parse_markup};
pub use text::svg::SvgTextRenderer;
