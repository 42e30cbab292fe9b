use std::path::PathBuf;

use crate::{
    caption::parse::read_caption_file,
    foundation::error::{DiagramError, DiagramResult},
    render::{crop::CropRect, grid::GridSpec, output::Output, pipeline::Plan},
};

/// Everything one invocation needs, independent of how it was collected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfig {
    pub source: PathBuf,
    /// Raw `h,v` grid string.
    pub grid: Option<String>,
    pub caption_file: Option<PathBuf>,
    /// Raw `l,t,r,b` crop string.
    pub crop: Option<String>,
    pub output: Output,
    pub interactive: bool,
    /// Extra directories to load fonts from.
    pub font_dirs: Vec<PathBuf>,
}

impl RunConfig {
    pub fn new(source: impl Into<PathBuf>, output: Output) -> Self {
        Self {
            source: source.into(),
            grid: None,
            caption_file: None,
            crop: None,
            output,
            interactive: false,
            font_dirs: Vec::new(),
        }
    }

    /// Parse the grid and crop strings and read the caption file.
    ///
    /// Malformed caption lines are skipped (they are logged by the parser); malformed caption
    /// coordinates fail.
    pub fn plan(&self) -> DiagramResult<Plan> {
        let grid = self
            .grid
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(GridSpec::parse)
            .transpose()?;
        let crop = self
            .crop
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(CropRect::parse)
            .transpose()?;
        let captions = match &self.caption_file {
            Some(path) => read_caption_file(path)?.captions,
            None => Vec::new(),
        };
        Ok(Plan {
            grid,
            captions,
            crop,
        })
    }

    /// Reject option combinations that cannot be honored.
    pub fn validate(&self) -> DiagramResult<()> {
        if self.interactive && matches!(self.output, Output::File(_)) {
            return Err(DiagramError::validation(
                "interactive mode writes its own artifacts; drop the output path",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
