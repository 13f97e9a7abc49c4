//! CLI output formatting.
//!
//! Each surface has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout/stderr. Format
//! functions are pure — no I/O, no side effects.
//!
//! ## Run
//!
//! ```text
//! films: 3 resized, 12 copied
//! musics: 1 resized, 4 copied, 1 error
//!
//! Processed images: 4 resized, 16 copied, 1 error
//! ```
//!
//! ## Check
//!
//! ```text
//! films: 15 images (max width 1200, originals excluded)
//! musics: 5 images (max width 800)
//!
//! 20 images in 2 directories
//! ```

use crate::process::{Diagnostic, DirSurvey, RunReport};

/// Pluralize "error" the cheap way; counts are small.
fn error_word(n: u32) -> &'static str {
    if n == 1 { "error" } else { "errors" }
}

/// One line per directory, then a blank line and the totals line.
///
/// Directories with nothing to report (all counts zero) are skipped; an
/// entirely empty run formats to a single "no images processed" line.
pub fn format_run_report(report: &RunReport) -> Vec<String> {
    let mut lines = Vec::new();
    for dir in &report.dirs {
        if dir.resized == 0 && dir.copied == 0 && dir.errors == 0 {
            continue;
        }
        let mut line = format!("{}: {} resized, {} copied", dir.name, dir.resized, dir.copied);
        if dir.errors > 0 {
            line.push_str(&format!(", {} {}", dir.errors, error_word(dir.errors)));
        }
        lines.push(line);
    }

    if lines.is_empty() {
        return vec!["no images processed".to_string()];
    }

    lines.push(String::new());
    let mut total = format!(
        "Processed images: {} resized, {} copied",
        report.total_resized(),
        report.total_copied()
    );
    if report.total_errors() > 0 {
        total.push_str(&format!(
            ", {} {}",
            report.total_errors(),
            error_word(report.total_errors())
        ));
    }
    lines.push(total);
    lines
}

/// Per-directory survey lines for `check`, plus a totals line.
pub fn format_survey(surveys: &[DirSurvey]) -> Vec<String> {
    if surveys.is_empty() {
        return vec!["no image directories found".to_string()];
    }

    let mut lines = Vec::new();
    for s in surveys {
        let mut line = format!("{}: {} images (max width {}", s.name, s.files, s.max_width);
        if s.exclude_originals {
            line.push_str(", originals excluded");
        }
        line.push(')');
        lines.push(line);
    }

    lines.push(String::new());
    let total: usize = surveys.iter().map(|s| s.files).sum();
    lines.push(format!(
        "{} images in {} directories",
        total,
        surveys.len()
    ));
    lines
}

/// Render a diagnostic with its severity prefix.
pub fn format_diagnostic(diag: &Diagnostic) -> String {
    match diag {
        Diagnostic::Warning(msg) => format!("warning: {msg}"),
        Diagnostic::Error(msg) => format!("error: {msg}"),
    }
}

pub fn print_run_report(report: &RunReport) {
    for line in format_run_report(report) {
        println!("{line}");
    }
}

pub fn print_survey(surveys: &[DirSurvey]) {
    for line in format_survey(surveys) {
        println!("{line}");
    }
}

/// Diagnostics go to stderr so `--json` output on stdout stays parseable.
pub fn print_diagnostic(diag: &Diagnostic) {
    eprintln!("{}", format_diagnostic(diag));
}
