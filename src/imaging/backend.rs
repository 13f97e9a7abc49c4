//! Image backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations every backend must
//! support: a width probe and a width-capped resize. The rest of the
//! codebase is backend-agnostic; see [`select`](super::select) for how a
//! backend is chosen at startup.

use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("width probe failed: {0}")]
    ProbeFailed(String),
    #[error("resize failed: {0}")]
    ResizeFailed(String),
}

/// Trait for image backends.
///
/// Both operations take plain paths: backends own decode/encode entirely,
/// so the processing pass never touches pixel data.
pub trait ImageBackend {
    /// Pixel width of the image at `path`.
    fn probe_width(&self, path: &Path) -> Result<u32, BackendError>;

    /// Write a copy of `source` at `dest` whose width does not exceed
    /// `max_width`, preserving aspect ratio. Output format follows the
    /// destination extension (which mirrors the source filename).
    fn resize_to_limit(&self, source: &Path, dest: &Path, max_width: u32)
    -> Result<(), BackendError>;
}
