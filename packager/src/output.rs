//! Progress output for the packager.
//!
//! The pipeline reports progress on an injected stderr handle so tests can
//! capture it; this module holds the shared write helper.

use std::io::Write;

/// Write a single line to the given stderr handle.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}
