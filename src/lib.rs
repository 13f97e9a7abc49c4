//! # Darkroom
//!
//! A post-build image post-processor for static blogs. After your site
//! generator writes its output tree, darkroom walks the image tree
//! (`assets/images/<subdir>/*`), resizes anything wider than a configured
//! cap into the mirrored destination path, and falls back to plain copying
//! when no image backend is available. One linear pass, invoked once per
//! build.
//!
//! # Architecture: One Pass, One Decision Per File
//!
//! ```text
//! select backend (once)  →  for each subdir  →  for each image:
//!                               resize | copy-if-stale | cache-copy | drop
//! ```
//!
//! There is deliberately no pipeline here: the tool's ambition is "copy or
//! shrink files", and the design stays that small. The interesting pieces
//! are the backend fallback chain, the mtime staleness gates, and the
//! excluded-originals cache protocol.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `darkroom.toml` loading and validation, per-directory overrides |
//! | [`imaging`] | `ImageBackend` trait, native + ImageMagick providers, one-time selection |
//! | [`process`] | the pass itself — directory jobs, per-file decisions, reports |
//! | [`fsops`] | mtime staleness checks and gated copies |
//! | [`output`] | CLI output formatting — pure `format_*` + `print_*` wrappers |
//!
//! # Design Decisions
//!
//! ## Backend Selection Happens Once
//!
//! The backend choice is an explicit [`imaging::Selection`] value computed
//! before any directory is processed and passed into every job. No global
//! mutable state, no re-probing per file. `auto` tries the pure-Rust
//! backend (the `image` crate) and falls back to the ImageMagick CLI;
//! exhausting the list degrades the whole pass to staleness-gated copying
//! rather than failing the build.
//!
//! ## Degrade, Never Abort
//!
//! Nothing in this tool is permitted to fail a site build. A failed width
//! probe forces a resize attempt; a failed resize falls back to a raw copy;
//! a missing backend means copy-only mode. Every failure is logged and
//! counted in the run report. The single exception to "prefer degraded
//! output" is the excluded-originals mode, where leaking a raw source file
//! is worse than publishing nothing — there, failures drop the file.
//!
//! ## Mtime Staleness, With One Content Gate
//!
//! The destination gate and the excluded-directory `resize/` cache compare
//! modification times. Builds run where the sources live and mtimes are
//! reliable enough there; a false-stale copy costs one redundant write,
//! which is cheaper than hashing every image on every build. The one place
//! mtimes cannot be trusted is publishing from an excluded directory's
//! cache: the site generator may have copied the raw original into the
//! destination moments earlier, so that copy compares bytes instead and
//! overwrites any mismatch. A crash mid-pass leaves the destination
//! partially updated and the next run repairs it through the same checks.
//!
//! ## Width-Only Resizing
//!
//! `max_width` bounds the published width; height follows from the aspect
//! ratio. Comparison is strictly `width > max_width`, so an exactly-at-cap
//! image is copied untouched.

pub mod config;
pub mod fsops;
pub mod imaging;
pub mod output;
pub mod process;
