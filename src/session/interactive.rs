use std::path::{Path, PathBuf};

use anyhow::Context as _;
use tracing::{debug, warn};

use crate::{
    caption::parse::{Caption, parse_caption_fields, read_caption_file},
    foundation::error::{DiagramError, DiagramResult},
    render::{
        crop::CropRect,
        grid::GridSpec,
        output::{ensure_parent_dir, load_image, save_png},
        pipeline::{Compositor, Plan},
    },
    text::TextRenderer,
};

/// One re-render request from an interactive client.
///
/// Every field defaults to empty. `grid` of `""` or `","` means no grid, `crop` of `""` or
/// `",,,"` means no crop, and each caption entry is `text,size,x,y`.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderRequest {
    pub grid: String,
    #[serde(alias = "cap")]
    pub captions: Vec<String>,
    /// Caption file to save the request's captions to, if non-empty.
    pub dump: String,
    pub crop: String,
}

/// A request translated into pipeline terms.
#[derive(Debug, Default)]
pub struct RequestPlan {
    pub plan: Plan,
    /// Caption-file lines for every four-field caption entry, in request order.
    pub dump_lines: Vec<String>,
    /// Caption entries skipped because of a bad size.
    pub warnings: Vec<DiagramError>,
}

impl RenderRequest {
    pub fn to_plan(&self) -> DiagramResult<RequestPlan> {
        let mut out = RequestPlan::default();

        let grid = self.grid.trim();
        if !grid.is_empty() && grid != "," {
            out.plan.grid = Some(GridSpec::parse(grid)?);
        }

        for (idx, entry) in self.captions.iter().enumerate() {
            if entry.is_empty() {
                continue;
            }
            let fields: Vec<&str> = entry.split(',').collect();
            let &[text, size, x, y] = fields.as_slice() else {
                debug!(entry = %entry, "ignoring caption entry without 4 fields");
                continue;
            };
            out.dump_lines.push(format!("{text} {size} {x},{y}"));
            match parse_caption_fields(idx + 1, text, size, &format!("{x},{y}")) {
                Ok(caption) => out.plan.captions.push(caption),
                Err(err) if err.is_recoverable() => {
                    warn!("{err}, skipping");
                    out.warnings.push(err);
                }
                Err(err) => return Err(err),
            }
        }

        let crop = self.crop.trim();
        if !crop.is_empty() && crop != ",,," {
            out.plan.crop = Some(CropRect::parse(crop)?);
        }

        Ok(out)
    }
}

/// What an interactive client needs to draw its initial view.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct SessionState {
    pub image: PathBuf,
    pub caption_file: Option<PathBuf>,
    pub captions: Vec<Caption>,
}

/// State of one interactive editing session.
///
/// Every request is an independent pipeline run against a fresh copy of the source image. The
/// session only remembers its most recent artifact, which the next successful request replaces
/// and deletes.
pub struct InteractiveSession<R> {
    source: PathBuf,
    caption_file: Option<PathBuf>,
    captions: Vec<Caption>,
    renderer: R,
    artifact_dir: PathBuf,
    session_id: u128,
    generation: u64,
    last_artifact: Option<PathBuf>,
}

impl<R: TextRenderer> InteractiveSession<R> {
    /// Open a session on `source`, preloading captions from `caption_file` if given.
    ///
    /// The source image is checked for readability up front so a bad path fails at startup.
    pub fn new(
        source: impl Into<PathBuf>,
        caption_file: Option<PathBuf>,
        renderer: R,
        artifact_dir: impl Into<PathBuf>,
    ) -> DiagramResult<Self> {
        let source = source.into();
        load_image(&source)?;

        let captions = match &caption_file {
            Some(path) => read_caption_file(path)?.captions,
            None => Vec::new(),
        };

        let session_id = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);

        Ok(Self {
            source,
            caption_file,
            captions,
            renderer,
            artifact_dir: artifact_dir.into(),
            session_id,
            generation: 0,
            last_artifact: None,
        })
    }

    pub fn state(&self) -> SessionState {
        SessionState {
            image: self.source.clone(),
            caption_file: self.caption_file.clone(),
            captions: self.captions.clone(),
        }
    }

    pub fn last_artifact(&self) -> Option<&Path> {
        self.last_artifact.as_deref()
    }

    /// Render `request` into a new artifact and return its path.
    #[tracing::instrument(skip_all, fields(generation = self.generation + 1))]
    pub fn handle(&mut self, request: &RenderRequest) -> DiagramResult<PathBuf> {
        let RequestPlan {
            plan, dump_lines, ..
        } = request.to_plan()?;

        if !request.dump.is_empty() {
            write_dump(Path::new(&request.dump), &dump_lines)?;
        }

        let image = load_image(&self.source)?;
        let image = Compositor::new(image, &self.renderer).run(&plan)?;

        self.generation += 1;
        let path = self.artifact_dir.join(format!(
            "diagram-{}-{}-{}.png",
            std::process::id(),
            self.session_id,
            self.generation
        ));
        save_png(&image, &path)?;

        if let Some(prev) = self.last_artifact.replace(path.clone()) {
            remove_artifact(&prev);
        }
        Ok(path)
    }
}

impl<R> Drop for InteractiveSession<R> {
    fn drop(&mut self) {
        if let Some(path) = self.last_artifact.take() {
            remove_artifact(&path);
        }
    }
}

fn write_dump(path: &Path, lines: &[String]) -> DiagramResult<()> {
    ensure_parent_dir(path)?;
    let mut body = lines.join("\n");
    if !body.is_empty() {
        body.push('\n');
    }
    std::fs::write(path, body)
        .with_context(|| format!("write caption file '{}'", path.display()))?;
    debug!(path = %path.display(), lines = lines.len(), "saved captions");
    Ok(())
}

fn remove_artifact(path: &Path) {
    if let Err(err) = std::fs::remove_file(path) {
        warn!(path = %path.display(), %err, "failed to remove previous artifact");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/interactive.rs"]
mod tests;
