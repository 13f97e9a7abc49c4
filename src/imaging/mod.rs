//! Image backends — probe a width, resize to a width cap.
//!
//! | Backend | Probe | Resize |
//! |---|---|---|
//! | [`NativeBackend`] | `image::image_dimensions` | Lanczos3 via the `image` crate |
//! | [`MagickBackend`] | `identify -format %w` | `magick -resize {w}x>` |
//!
//! The module is split into:
//! - **Backend**: the [`ImageBackend`] trait and error type
//! - **Providers**: [`NativeBackend`] and [`MagickBackend`], each with a
//!   `detect()` availability check
//! - **Selection**: [`select_backend`] walks providers in preference order
//!   once at startup and yields a [`Selection`] passed into every job

pub mod backend;
pub mod magick_backend;
pub mod native_backend;
pub mod select;

pub use backend::{BackendError, ImageBackend};
pub use magick_backend::MagickBackend;
pub use native_backend::NativeBackend;
pub use select::{BackendKind, Selection, select_backend};
