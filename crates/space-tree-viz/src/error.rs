//! Error types for loading, rendering and exporting.

use space_tree::{CastError, DecodeError};
use thiserror::Error;

/// Errors that can occur while serving a render request.
#[derive(Error, Debug)]
pub enum RenderError {
    /// No asset exists under the requested path.
    #[error("asset not found: {0}")]
    NotFound(String),

    /// Reading an asset failed.
    #[error("failed to read asset: {0}")]
    Io(#[from] std::io::Error),

    /// An asset could not be decoded as a tree.
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: DecodeError,
    },

    /// The intersection engine hit an internal inconsistency.
    #[error("ray cast failed: {0}")]
    Cast(#[from] CastError),

    /// The model's bounding box cannot be normalized.
    #[error("model {0} has an empty or non-finite bounding box")]
    DegenerateBounds(String),

    /// The request named no model.
    #[error("render request has no model path")]
    MissingModel,

    /// The requested frame is too large to render or encode.
    #[error("frame size {0} is too large")]
    FrameTooLarge(usize),

    /// Image encoding failed.
    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),

    /// A catalog or protocol document was malformed.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The render worker thread is no longer running.
    #[error("render worker has shut down")]
    WorkerGone,
}

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;
