//! ImageMagick CLI backend.
//!
//! Shells out to `identify` for the width probe and `magick` (or the legacy
//! `convert` on ImageMagick 6) for resizing. Used as the fallback provider
//! when the native backend is unavailable, or when pinned via
//! `backend = "magick"`.
//!
//! The resize geometry is `{max_width}x>`: width-bounded, height free, and
//! the trailing `>` makes it shrink-only, so an already-small image is a
//! plain transcode.

use super::backend::{BackendError, ImageBackend};
use std::path::Path;
use std::process::Command;

/// ImageMagick CLI backend.
///
/// Carries the resolved converter binary name (`magick` vs `convert`) from
/// the detection probe so every resize call uses the right entry point.
pub struct MagickBackend {
    converter: &'static str,
}

impl MagickBackend {
    /// Availability check for backend selection.
    ///
    /// Requires `identify` plus one of `magick`/`convert` to run and exit 0.
    pub fn detect() -> Result<Self, BackendError> {
        if !command_works("identify") {
            return Err(BackendError::Unavailable(
                "ImageMagick 'identify' not found on PATH".to_string(),
            ));
        }
        for converter in ["magick", "convert"] {
            if command_works(converter) {
                return Ok(Self { converter });
            }
        }
        Err(BackendError::Unavailable(
            "ImageMagick 'magick'/'convert' not found on PATH".to_string(),
        ))
    }

    /// The resize-to-limit geometry argument. Split out for testing without
    /// ImageMagick installed.
    fn geometry(max_width: u32) -> String {
        format!("{max_width}x>")
    }
}

fn command_works(name: &str) -> bool {
    Command::new(name)
        .arg("-version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

impl ImageBackend for MagickBackend {
    fn probe_width(&self, path: &Path) -> Result<u32, BackendError> {
        let output = Command::new("identify")
            .args(["-format", "%w"])
            .arg(path)
            .output()
            .map_err(BackendError::Io)?;
        if !output.status.success() {
            return Err(BackendError::ProbeFailed(format!(
                "identify {} failed: {}",
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        // Multi-frame inputs print one width per frame; the first is the image
        stdout
            .split_whitespace()
            .next()
            .and_then(|w| w.parse().ok())
            .ok_or_else(|| {
                BackendError::ProbeFailed(format!(
                    "identify {} returned unparsable width '{}'",
                    path.display(),
                    stdout.trim()
                ))
            })
    }

    fn resize_to_limit(
        &self,
        source: &Path,
        dest: &Path,
        max_width: u32,
    ) -> Result<(), BackendError> {
        let output = Command::new(self.converter)
            .arg(source)
            .args(["-resize", &Self::geometry(max_width)])
            .arg(dest)
            .output()
            .map_err(BackendError::Io)?;
        if !output.status.success() {
            return Err(BackendError::ResizeFailed(format!(
                "{} {} failed: {}",
                self.converter,
                source.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_is_width_bounded_shrink_only() {
        assert_eq!(MagickBackend::geometry(1200), "1200x>");
        assert_eq!(MagickBackend::geometry(800), "800x>");
    }

    #[test]
    fn detect_missing_cli_is_unavailable_not_panic() {
        // Whatever the host has installed, detect must return a Result,
        // never abort. Both arms are legal here.
        match MagickBackend::detect() {
            Ok(_) => {}
            Err(BackendError::Unavailable(_)) => {}
            Err(other) => panic!("unexpected detect error: {other}"),
        }
    }

    #[test]
    #[ignore] // Requires ImageMagick
    fn probe_and_resize_round_trip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.png");
        let img = image::RgbImage::from_pixel(400, 300, image::Rgb([200, 100, 50]));
        img.save(&source).unwrap();

        let backend = MagickBackend::detect().unwrap();
        assert_eq!(backend.probe_width(&source).unwrap(), 400);

        let dest = tmp.path().join("out.png");
        backend.resize_to_limit(&source, &dest, 200).unwrap();
        assert_eq!(backend.probe_width(&dest).unwrap(), 200);
    }
}
