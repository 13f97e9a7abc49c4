//! Filesystem helpers shared by the processing pass.
//!
//! Staleness decisions are mtime-based: an artifact is fresh when it exists
//! and is not older than the file it derives from. The one exception is
//! [`copy_if_differs`], which gates on content for destinations that other
//! tools may have written more recently. A crash mid-pass leaves the
//! destination partially updated; the next run repairs it through the same
//! checks.

use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;

/// Modification time of `path`, or `None` when it doesn't exist or the
/// platform can't report one.
pub fn mtime(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Whether the artifact at `dest` needs regeneration from `source`.
///
/// True when `dest` is missing or strictly older than `source`. An
/// unreadable source mtime counts as "no, dest is fine" — the caller
/// already has a dest file and nothing proves it stale.
pub fn is_stale(dest: &Path, source: &Path) -> bool {
    let Some(dest_time) = mtime(dest) else {
        return true;
    };
    match mtime(source) {
        Some(source_time) => dest_time < source_time,
        None => false,
    }
}

/// Copy `source` to `dest` only when `dest` is missing or older.
///
/// Returns whether a copy actually happened.
pub fn copy_if_stale(source: &Path, dest: &Path) -> io::Result<bool> {
    if !is_stale(dest, source) {
        return Ok(false);
    }
    fs::copy(source, dest)?;
    Ok(true)
}

/// Copy `source` to `dest` unless `dest` already holds identical bytes.
///
/// The content gate (not mtime) matters when something else may have
/// written `dest` more recently than `source` — a newer dest with the
/// wrong bytes must still be overwritten. An unreadable dest counts as
/// differing.
///
/// Returns whether a copy actually happened.
pub fn copy_if_differs(source: &Path, dest: &Path) -> io::Result<bool> {
    if let Ok(existing) = fs::read(dest)
        && existing == fs::read(source)?
    {
        return Ok(false);
    }
    fs::copy(source, dest)?;
    Ok(true)
}
