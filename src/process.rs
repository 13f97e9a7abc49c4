//! The post-processing pass.
//!
//! Runs once per site build, after the static-site generator has copied its
//! raw assets into the destination tree. Walks the top-level subdirectories
//! of the images root, and for every image either resizes it into the
//! mirrored destination path or copies it when it is already within bounds.
//!
//! ## Per-file decision, default mode
//!
//! ```text
//! probe width ──fail──> warn, treat as unknown ─┐
//!      │ ok                                     │
//!      ├── width > max, or unknown ─────────────┴──> resize to dest   (Resized)
//!      └── width <= max ──> copy when dest missing/older              (CopiedOriginal)
//! resize failure ──> best-effort raw copy, counted as                 (Error)
//! no backend at all ──> always the staleness-gated copy               (CopiedOriginal)
//! ```
//!
//! ## Excluded-originals mode
//!
//! Directories listed in `exclude_originals` never have source bytes
//! written to the destination. A derived file is maintained in a `resize/`
//! subfolder of the source directory (regenerated when missing or older
//! than the source) and only that cache file is copied out. When a
//! regeneration is needed and no backend exists or the resize fails, the
//! file is dropped and counted as an error — omission over leaking a
//! forbidden original.
//!
//! Per-file state machine, terminal after one pass:
//! `NotProcessed -> {Resized | CopiedOriginal | CachedCopy | Error}`.
//!
//! The pass is sequential and single-threaded: directories one at a time,
//! files within a directory one at a time. Nothing in it aborts the build;
//! every failure is caught, reported through the diagnostic callback, and
//! counted.

use crate::config::Config;
use crate::fsops::{copy_if_differs, copy_if_stale, is_stale};
use crate::imaging::Selection;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Extensions the pass will read, resize, or copy. Case-insensitive.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Sibling cache folder used by excluded-originals directories.
const CACHE_DIR_NAME: &str = "resize";

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Diagnostic lines emitted while the pass runs.
///
/// Warnings are recoverable oddities (a failed width probe); errors are
/// per-file failures that incremented a directory's error count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    Warning(String),
    Error(String),
}

/// Terminal state of one file after the pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileOutcome {
    /// Resized (or regenerated into the cache) and written to the destination.
    Resized,
    /// Original copied through the staleness gate (includes "already fresh").
    CopiedOriginal,
    /// Served from an excluded directory's cache without regeneration.
    CachedCopy,
    /// Dropped or degraded after a per-file failure.
    Error,
}

/// Everything needed to process one top-level subdirectory.
///
/// Ephemeral: built per directory, dropped when its scan finishes.
#[derive(Debug, Clone)]
struct DirJob {
    name: String,
    source_dir: PathBuf,
    dest_dir: PathBuf,
    max_width: u32,
    exclude_originals: bool,
}

/// Per-directory summary counts.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DirReport {
    pub name: String,
    /// Resized straight to dest, or regenerated into an excluded dir's cache.
    pub resized: u32,
    /// Skipped/copied originals and cache-served files.
    pub copied: u32,
    pub errors: u32,
}

/// Whole-pass report, one entry per processed directory.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub dirs: Vec<DirReport>,
}

impl RunReport {
    pub fn total_resized(&self) -> u32 {
        self.dirs.iter().map(|d| d.resized).sum()
    }

    pub fn total_copied(&self) -> u32 {
        self.dirs.iter().map(|d| d.copied).sum()
    }

    pub fn total_errors(&self) -> u32 {
        self.dirs.iter().map(|d| d.errors).sum()
    }
}

/// What `check` reports for one directory, without writing anything.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DirSurvey {
    pub name: String,
    pub files: usize,
    pub max_width: u32,
    pub exclude_originals: bool,
}

/// Run the full post-processing pass.
///
/// A disabled config or a missing images root under `source_root` yields an
/// empty report — a site without images is not an error. Per-file and per-directory failures
/// land in the report and the diagnostic stream; only a failure to
/// enumerate the images root itself is returned as `Err`.
pub fn run_pass(
    source_root: &Path,
    dest_root: &Path,
    config: &Config,
    selection: &Selection,
    diag: &mut dyn FnMut(Diagnostic),
) -> Result<RunReport, ProcessError> {
    if !config.enabled {
        return Ok(RunReport::default());
    }
    let images_source = source_root.join(&config.images_root);
    if !images_source.is_dir() {
        return Ok(RunReport::default());
    }
    let images_dest = dest_root.join(&config.images_root);

    let mut report = RunReport::default();
    for dir in subdirectories(&images_source)? {
        let name = dir_name(&dir);
        let job = DirJob {
            dest_dir: images_dest.join(&name),
            max_width: config.max_width_for(&name),
            exclude_originals: config.is_excluded(&name),
            source_dir: dir,
            name,
        };
        report.dirs.push(process_directory(&job, selection, diag));
    }
    Ok(report)
}

/// Dry scan for the `check` command: what would be processed, per directory.
pub fn survey(source_root: &Path, config: &Config) -> Result<Vec<DirSurvey>, ProcessError> {
    let images_source = source_root.join(&config.images_root);
    if !images_source.is_dir() {
        return Ok(Vec::new());
    }
    let mut surveys = Vec::new();
    for dir in subdirectories(&images_source)? {
        let name = dir_name(&dir);
        surveys.push(DirSurvey {
            files: image_files(&dir).len(),
            max_width: config.max_width_for(&name),
            exclude_originals: config.is_excluded(&name),
            name,
        });
    }
    Ok(surveys)
}

/// Process one directory job: mirror it under the destination and run the
/// per-file decision over every direct child image.
fn process_directory(
    job: &DirJob,
    selection: &Selection,
    diag: &mut dyn FnMut(Diagnostic),
) -> DirReport {
    let mut report = DirReport {
        name: job.name.clone(),
        resized: 0,
        copied: 0,
        errors: 0,
    };

    if let Err(e) = fs::create_dir_all(&job.dest_dir) {
        diag(Diagnostic::Error(format!(
            "cannot create {}: {e}",
            job.dest_dir.display()
        )));
        report.errors += 1;
        return report;
    }

    for source in image_files(&job.source_dir) {
        let outcome = if job.exclude_originals {
            process_file_excluded(job, &source, selection, diag)
        } else {
            process_file_default(job, &source, selection, diag)
        };
        match outcome {
            FileOutcome::Resized => report.resized += 1,
            FileOutcome::CopiedOriginal | FileOutcome::CachedCopy => report.copied += 1,
            FileOutcome::Error => report.errors += 1,
        }
    }

    report
}

/// Default mode: resize oversized images to the destination, copy the rest.
fn process_file_default(
    job: &DirJob,
    source: &Path,
    selection: &Selection,
    diag: &mut dyn FnMut(Diagnostic),
) -> FileOutcome {
    let filename = file_name(source);
    let dest = job.dest_dir.join(&filename);

    let Some(backend) = selection.backend() else {
        // Copy-only mode
        return match copy_if_stale(source, &dest) {
            Ok(_) => FileOutcome::CopiedOriginal,
            Err(e) => {
                diag(Diagnostic::Error(format!("copy {filename} failed: {e}")));
                FileOutcome::Error
            }
        };
    };

    // Probe failure is non-fatal: unknown width forces a resize attempt.
    let width = match backend.probe_width(source) {
        Ok(w) => Some(w),
        Err(e) => {
            diag(Diagnostic::Warning(format!(
                "could not probe {filename}, will resize anyway: {e}"
            )));
            None
        }
    };

    let needs_resize = width.is_none_or(|w| w > job.max_width);
    if needs_resize {
        match backend.resize_to_limit(source, &dest, job.max_width) {
            Ok(()) => FileOutcome::Resized,
            Err(e) => {
                diag(Diagnostic::Error(format!("resize {filename} failed: {e}")));
                // Best-effort raw copy, only when the destination is empty
                if !dest.exists()
                    && let Err(copy_err) = fs::copy(source, &dest)
                {
                    diag(Diagnostic::Error(format!(
                        "fallback copy {filename} failed: {copy_err}"
                    )));
                }
                FileOutcome::Error
            }
        }
    } else {
        match copy_if_stale(source, &dest) {
            Ok(_) => FileOutcome::CopiedOriginal,
            Err(e) => {
                diag(Diagnostic::Error(format!("copy {filename} failed: {e}")));
                FileOutcome::Error
            }
        }
    }
}

/// Excluded-originals mode: publish only from the `resize/` cache.
///
/// Source bytes never reach the destination here, not even when the site
/// generator already copied the raw file into the destination before this
/// pass ran. Any failure that would require falling back to the original
/// instead drops the file, deleting whatever is already published under
/// that name.
fn process_file_excluded(
    job: &DirJob,
    source: &Path,
    selection: &Selection,
    diag: &mut dyn FnMut(Diagnostic),
) -> FileOutcome {
    let filename = file_name(source);
    let dest = job.dest_dir.join(&filename);
    let cache_dir = job.source_dir.join(CACHE_DIR_NAME);
    let cache_path = cache_dir.join(&filename);

    let mut regenerated = false;
    if is_stale(&cache_path, source) {
        let Some(backend) = selection.backend() else {
            diag(Diagnostic::Error(format!(
                "{}/{filename}: cache regeneration needed but no image backend is available; \
                 file dropped (originals are excluded from output)",
                job.name
            )));
            remove_published(&dest, &filename, diag);
            return FileOutcome::Error;
        };
        if let Err(e) = fs::create_dir_all(&cache_dir) {
            diag(Diagnostic::Error(format!(
                "cannot create {}: {e}",
                cache_dir.display()
            )));
            remove_published(&dest, &filename, diag);
            return FileOutcome::Error;
        }
        if let Err(e) = backend.resize_to_limit(source, &cache_path, job.max_width) {
            diag(Diagnostic::Error(format!(
                "{}/{filename}: cache regeneration failed, file dropped: {e}",
                job.name
            )));
            remove_published(&dest, &filename, diag);
            return FileOutcome::Error;
        }
        regenerated = true;
    }

    // Content-gated, not mtime-gated: a pre-populated destination file (the
    // generator's raw copy) is newer than the cache but holds the wrong
    // bytes, and must still be overwritten.
    match copy_if_differs(&cache_path, &dest) {
        Ok(_) if regenerated => FileOutcome::Resized,
        Ok(_) => FileOutcome::CachedCopy,
        Err(e) => {
            diag(Diagnostic::Error(format!(
                "copy cached {filename} failed: {e}"
            )));
            FileOutcome::Error
        }
    }
}

/// Delete an already-published file when its source must be dropped.
///
/// Called on every drop path of the excluded mode so a raw original the
/// generator placed in the destination does not survive the pass.
fn remove_published(dest: &Path, filename: &str, diag: &mut dyn FnMut(Diagnostic)) {
    if !dest.exists() {
        return;
    }
    if let Err(e) = fs::remove_file(dest) {
        diag(Diagnostic::Error(format!(
            "cannot remove published {filename}: {e}"
        )));
    }
}

// ============================================================================
// Enumeration helpers
// ============================================================================

/// Direct subdirectories of `root`, sorted by name for deterministic output.
fn subdirectories(root: &Path) -> Result<Vec<PathBuf>, ProcessError> {
    let mut dirs = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| {
            ProcessError::Io(e.into_io_error().unwrap_or_else(|| {
                std::io::Error::other("walkdir loop")
            }))
        })?;
        if entry.file_type().is_dir() {
            dirs.push(entry.into_path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Direct child files of `dir` whose extension is on the allow-list,
/// sorted by name. Subdirectories (including `resize/`) and unreadable
/// entries are skipped silently.
fn image_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| is_image_file(p))
        .collect();
    files.sort();
    files
}

/// Extension allow-list membership, case-insensitive.
fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
