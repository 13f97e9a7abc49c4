//! Pure Rust image backend — zero external dependencies.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Width probe | `image::image_dimensions` (header-only, no full decode) |
//! | Decode (JPEG, PNG, WebP) | `image` crate (pure Rust decoders) |
//! | Resize | `image::DynamicImage::resize` with `Lanczos3` filter |
//! | Encode | extension-keyed: `JpegEncoder` / `PngEncoder` / `WebPEncoder` |
//!
//! WebP output uses the `image` crate's lossless encoder, the only WebP
//! encoder it ships.

use super::backend::{BackendError, ImageBackend};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::path::Path;

/// Extensions the processing pass feeds us, with their formats.
///
/// Must stay in sync with the allow-list in
/// [`process`](crate::process): jpg, jpeg, png, webp.
const REQUIRED_FORMATS: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("webp", ImageFormat::WebP),
];

/// Pure Rust backend using the `image` crate ecosystem.
pub struct NativeBackend;

impl NativeBackend {
    pub fn new() -> Self {
        Self
    }

    /// Availability check for backend selection: every required format must
    /// have both its decoder and encoder compiled in.
    pub fn detect() -> Result<Self, BackendError> {
        for (ext, format) in REQUIRED_FORMATS {
            if !format.reading_enabled() {
                return Err(BackendError::Unavailable(format!(
                    "no decoder compiled in for .{ext}"
                )));
            }
            if !format.writing_enabled() {
                return Err(BackendError::Unavailable(format!(
                    "no encoder compiled in for .{ext}"
                )));
            }
        }
        Ok(Self)
    }
}

impl Default for NativeBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ResizeFailed(format!("failed to decode {}: {}", path.display(), e))
        })
}

/// Save an image at `path`, format inferred from the extension.
fn save_image(img: &DynamicImage, path: &Path) -> Result<(), BackendError> {
    let format = ImageFormat::from_path(path).map_err(|e| {
        BackendError::ResizeFailed(format!("unsupported output {}: {}", path.display(), e))
    })?;
    // JPEG encoders reject alpha channels; PNG sources may carry one.
    let img = match (format, img.color().has_alpha()) {
        (ImageFormat::Jpeg, true) => DynamicImage::ImageRgb8(img.to_rgb8()),
        _ => img.clone(),
    };
    img.save_with_format(path, format)
        .map_err(|e| BackendError::ResizeFailed(format!("encode {} failed: {}", path.display(), e)))
}

impl ImageBackend for NativeBackend {
    fn probe_width(&self, path: &Path) -> Result<u32, BackendError> {
        let (width, _height) = image::image_dimensions(path)
            .map_err(|e| BackendError::ProbeFailed(format!("{}: {}", path.display(), e)))?;
        Ok(width)
    }

    fn resize_to_limit(
        &self,
        source: &Path,
        dest: &Path,
        max_width: u32,
    ) -> Result<(), BackendError> {
        let img = load_image(source)?;
        let output = if img.width() > max_width {
            // Height bound of u32::MAX leaves width as the only constraint
            img.resize(max_width, u32::MAX, FilterType::Lanczos3)
        } else {
            img
        };
        save_image(&output, dest)
    }
}
