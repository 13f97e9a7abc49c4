//! One-time backend selection.
//!
//! The processing pass never probes for backends itself: [`select_backend`]
//! runs once at startup, walks an ordered provider list, and the resulting
//! [`Selection`] value is passed into every directory job. Selection failure
//! is not an error — an [`Selection::Unavailable`] result degrades the whole
//! pass to staleness-gated copying.

use super::backend::ImageBackend;
use super::magick_backend::MagickBackend;
use super::native_backend::NativeBackend;
use crate::config::BackendPreference;
use std::fmt;

/// Which backend implementation was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Native,
    Magick,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Native => write!(f, "native (image crate)"),
            BackendKind::Magick => write!(f, "ImageMagick CLI"),
        }
    }
}

/// The process-wide backend choice, computed once and reused for every file.
pub enum Selection {
    Available {
        kind: BackendKind,
        backend: Box<dyn ImageBackend>,
    },
    Unavailable,
}

impl Selection {
    /// The selected backend, if any.
    pub fn backend(&self) -> Option<&dyn ImageBackend> {
        match self {
            Selection::Available { backend, .. } => Some(backend.as_ref()),
            Selection::Unavailable => None,
        }
    }

    pub fn kind(&self) -> Option<BackendKind> {
        match self {
            Selection::Available { kind, .. } => Some(*kind),
            Selection::Unavailable => None,
        }
    }

    #[cfg(test)]
    pub fn for_tests(backend: Box<dyn ImageBackend>) -> Self {
        Selection::Available {
            kind: BackendKind::Native,
            backend,
        }
    }
}

/// Try providers in preference order; first one whose `detect` succeeds wins.
///
/// Detection failures are reported through `warn` (one line per skipped
/// provider) and never abort: exhausting the list yields
/// [`Selection::Unavailable`].
pub fn select_backend(
    preference: BackendPreference,
    warn: &mut dyn FnMut(String),
) -> Selection {
    let order: &[BackendKind] = match preference {
        BackendPreference::Auto => &[BackendKind::Native, BackendKind::Magick],
        BackendPreference::Native => &[BackendKind::Native],
        BackendPreference::Magick => &[BackendKind::Magick],
        BackendPreference::None => &[],
    };

    for &kind in order {
        let detected: Result<Box<dyn ImageBackend>, _> = match kind {
            BackendKind::Native => NativeBackend::detect().map(|b| Box::new(b) as _),
            BackendKind::Magick => MagickBackend::detect().map(|b| Box::new(b) as _),
        };
        match detected {
            Ok(backend) => return Selection::Available { kind, backend },
            Err(e) => warn(format!("backend {kind} unavailable: {e}")),
        }
    }
    Selection::Unavailable
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_warnings(preference: BackendPreference) -> (Selection, Vec<String>) {
        let mut warnings = Vec::new();
        let selection = select_backend(preference, &mut |w| warnings.push(w));
        (selection, warnings)
    }

    #[test]
    fn preference_none_selects_nothing_silently() {
        let (selection, warnings) = collect_warnings(BackendPreference::None);
        assert!(selection.backend().is_none());
        assert!(warnings.is_empty());
    }

    #[test]
    fn preference_auto_prefers_native() {
        // The native backend's formats are compiled into the test binary,
        // so auto always lands on it without consulting ImageMagick.
        let (selection, warnings) = collect_warnings(BackendPreference::Auto);
        assert_eq!(selection.kind(), Some(BackendKind::Native));
        assert!(warnings.is_empty());
    }

    #[test]
    fn preference_native_selects_native() {
        let (selection, _) = collect_warnings(BackendPreference::Native);
        assert_eq!(selection.kind(), Some(BackendKind::Native));
    }

    #[test]
    fn preference_magick_never_falls_back_to_native() {
        // With or without ImageMagick installed, a pinned preference must
        // not select a different provider.
        let (selection, _) = collect_warnings(BackendPreference::Magick);
        assert_ne!(selection.kind(), Some(BackendKind::Native));
    }

    #[test]
    fn kind_display_names() {
        assert_eq!(BackendKind::Native.to_string(), "native (image crate)");
        assert_eq!(BackendKind::Magick.to_string(), "ImageMagick CLI");
    }
}
