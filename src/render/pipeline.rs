use std::path::Path;

use image::RgbaImage;

use crate::{
    caption::parse::Caption,
    foundation::error::{DiagramError, DiagramResult},
    render::{
        caption::apply_caption,
        crop::{CropRect, crop},
        grid::{GridSpec, apply_grid},
        output::{Output, load_image},
    },
    text::TextRenderer,
};

/// Pipeline stages in the only order they may run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Loaded,
    GridApplied,
    CaptionsApplied,
    Cropped,
}

/// What to draw on an image. Every part is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Plan {
    pub grid: Option<GridSpec>,
    /// Positions are in pre-crop pixel space.
    pub captions: Vec<Caption>,
    pub crop: Option<CropRect>,
}

/// Owns an image for the duration of one pipeline run and applies overlays in stage order.
///
/// A stage may be repeated (several captions, for instance) but never run after a later one:
/// captions after a crop would be positioned in the wrong coordinate space.
pub struct Compositor<'r> {
    image: RgbaImage,
    stage: Stage,
    renderer: &'r dyn TextRenderer,
}

impl<'r> Compositor<'r> {
    pub fn new(image: RgbaImage, renderer: &'r dyn TextRenderer) -> Self {
        Self {
            image,
            stage: Stage::Loaded,
            renderer,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn apply_grid(&mut self, spec: GridSpec) -> DiagramResult<&mut Self> {
        self.check_order(Stage::GridApplied)?;
        apply_grid(&mut self.image, spec, self.renderer)?;
        self.stage = Stage::GridApplied;
        Ok(self)
    }

    pub fn apply_caption(&mut self, caption: &Caption) -> DiagramResult<&mut Self> {
        self.check_order(Stage::CaptionsApplied)?;
        apply_caption(&mut self.image, caption, self.renderer)?;
        self.stage = Stage::CaptionsApplied;
        Ok(self)
    }

    pub fn apply_captions(&mut self, captions: &[Caption]) -> DiagramResult<&mut Self> {
        for caption in captions {
            self.apply_caption(caption)?;
        }
        Ok(self)
    }

    pub fn apply_crop(&mut self, rect: CropRect) -> DiagramResult<&mut Self> {
        self.check_order(Stage::Cropped)?;
        self.image = crop(&self.image, rect)?;
        self.stage = Stage::Cropped;
        Ok(self)
    }

    /// Apply every part of `plan` and hand back the image.
    #[tracing::instrument(skip_all, fields(
        grid = ?plan.grid,
        captions = plan.captions.len(),
        crop = ?plan.crop,
    ))]
    pub fn run(mut self, plan: &Plan) -> DiagramResult<RgbaImage> {
        if let Some(spec) = plan.grid {
            self.apply_grid(spec)?;
        }
        self.apply_captions(&plan.captions)?;
        if let Some(rect) = plan.crop {
            self.apply_crop(rect)?;
        }
        Ok(self.finish())
    }

    pub fn finish(self) -> RgbaImage {
        self.image
    }

    fn check_order(&self, next: Stage) -> DiagramResult<()> {
        if next < self.stage {
            return Err(DiagramError::validation(format!(
                "cannot run {next:?} after {:?}",
                self.stage
            )));
        }
        Ok(())
    }
}

/// Load `source`, apply `plan`, and finalize to `output`.
///
/// Nothing is written unless every stage succeeds.
pub fn render_once(
    source: &Path,
    plan: &Plan,
    output: &Output,
    renderer: &dyn TextRenderer,
) -> DiagramResult<()> {
    let image = load_image(source)?;
    tracing::debug!(
        path = %source.display(),
        width = image.width(),
        height = image.height(),
        "loaded source image"
    );
    let image = Compositor::new(image, renderer).run(plan)?;
    output.finalize(&image)
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
