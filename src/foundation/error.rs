use std::path::PathBuf;

/// Convenience result type used across diagram.
pub type DiagramResult<T> = Result<T, DiagramError>;

/// Top-level error taxonomy used by the pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum DiagramError {
    /// A caption line that was skipped. Parsers record these as warnings instead of failing.
    #[error("malformed caption line {line}: {reason}")]
    MalformedCaptionLine {
        /// 1-based line number in the caption source.
        line: usize,
        /// What was wrong with the line.
        reason: String,
    },

    /// A caption position that is not `x,y` with two integers. Aborts the whole parse.
    #[error("malformed caption coordinates on line {line}: {field:?}")]
    MalformedCaptionCoordinates {
        /// 1-based line number in the caption source.
        line: usize,
        /// The offending `x,y` field.
        field: String,
    },

    /// Crop specification or rectangle that cannot be applied.
    #[error("invalid crop rectangle: {0}")]
    InvalidCropRect(String),

    /// Grid specification that is not `h,v`.
    #[error("invalid grid specification: {0}")]
    InvalidGridSpec(String),

    /// The source image path does not exist.
    #[error("source image '{}' not found", .0.display())]
    MissingSourceImage(PathBuf),

    /// The source image could not be decoded.
    #[error("image decode error: {0}")]
    ImageDecode(String),

    /// The text renderer did not return a usable glyph bitmap.
    #[error("text render failure: {0}")]
    RenderFailure(String),

    /// Misuse of the pipeline or configuration (stage order, bad option combinations).
    #[error("validation error: {0}")]
    Validation(String),

    /// The external image viewer could not be run or reported failure.
    #[error("viewer error: {0}")]
    Viewer(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DiagramError {
    /// Build a [`DiagramError::MalformedCaptionLine`] value.
    pub fn malformed_line(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedCaptionLine {
            line,
            reason: reason.into(),
        }
    }

    /// Build a [`DiagramError::MalformedCaptionCoordinates`] value.
    pub fn malformed_coordinates(line: usize, field: impl Into<String>) -> Self {
        Self::MalformedCaptionCoordinates {
            line,
            field: field.into(),
        }
    }

    /// Build a [`DiagramError::InvalidCropRect`] value.
    pub fn crop(msg: impl Into<String>) -> Self {
        Self::InvalidCropRect(msg.into())
    }

    /// Build a [`DiagramError::InvalidGridSpec`] value.
    pub fn grid(msg: impl Into<String>) -> Self {
        Self::InvalidGridSpec(msg.into())
    }

    /// Build a [`DiagramError::ImageDecode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::ImageDecode(msg.into())
    }

    /// Build a [`DiagramError::RenderFailure`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::RenderFailure(msg.into())
    }

    /// Build a [`DiagramError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`DiagramError::Viewer`] value.
    pub fn viewer(msg: impl Into<String>) -> Self {
        Self::Viewer(msg.into())
    }

    /// Whether the pipeline may skip the offending input and continue.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::MalformedCaptionLine { .. })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
