use std::{
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::Context as _;
use image::{ImageFormat, RgbaImage};

use crate::foundation::error::{DiagramError, DiagramResult};

/// Environment variable that overrides the default image viewer.
pub const VIEWER_ENV: &str = "DIAGRAM_VIEWER";

/// Viewer used when neither a command nor [`VIEWER_ENV`] is given.
pub const DEFAULT_VIEWER: &str = "xdg-open";

/// Where a finished image goes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Output {
    /// Write a PNG to this path.
    File(PathBuf),
    /// Write a temporary PNG, open it with this command, then delete it.
    Viewer(String),
}

impl Output {
    /// Viewer output using `$DIAGRAM_VIEWER`, or `xdg-open`.
    pub fn default_viewer() -> Self {
        let cmd = std::env::var(VIEWER_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_VIEWER.to_owned());
        Self::Viewer(cmd)
    }

    pub fn finalize(&self, image: &RgbaImage) -> DiagramResult<()> {
        match self {
            Self::File(path) => save_png(image, path),
            Self::Viewer(cmd) => display(image, cmd),
        }
    }
}

/// Load a PNG from disk as straight-alpha RGBA8.
pub fn load_image(path: &Path) -> DiagramResult<RgbaImage> {
    if !path.is_file() {
        return Err(DiagramError::MissingSourceImage(path.to_path_buf()));
    }
    let bytes = std::fs::read(path)
        .with_context(|| format!("read source image '{}'", path.display()))?;
    let img = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
        .map_err(|e| DiagramError::decode(format!("'{}': {e}", path.display())))?;
    Ok(img.to_rgba8())
}

/// Encode `image` as PNG at `path`, creating parent directories.
pub fn save_png(image: &RgbaImage, path: &Path) -> DiagramResult<()> {
    ensure_parent_dir(path)?;
    image
        .save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("write png '{}'", path.display()))?;
    tracing::info!(path = %path.display(), "wrote image");
    Ok(())
}

pub fn ensure_parent_dir(path: &Path) -> DiagramResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Show `image` with an external viewer. The temporary file is removed once the viewer
/// returns, whether or not it succeeded.
pub fn display(image: &RgbaImage, viewer: &str) -> DiagramResult<()> {
    let path = std::env::temp_dir().join(format!(
        "diagram_view_{}_{}.png",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0)
    ));
    view_via_file(image, viewer, path)
}

pub(crate) fn view_via_file(image: &RgbaImage, viewer: &str, path: PathBuf) -> DiagramResult<()> {
    let _tmp = TempFileGuard(Some(path.clone()));
    save_png(image, &path)?;

    tracing::debug!(viewer, path = %path.display(), "launching viewer");
    let status = Command::new(viewer)
        .arg(&path)
        .status()
        .map_err(|e| DiagramError::viewer(format!("failed to run '{viewer}': {e}")))?;
    if !status.success() {
        return Err(DiagramError::viewer(format!("'{viewer}' exited with {status}")));
    }
    Ok(())
}

pub(crate) struct TempFileGuard(pub(crate) Option<PathBuf>);

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/output.rs"]
mod tests;
