//! Final mod packaging.
//!
//! Bundles the launcher manifest and the core mod archive side by side
//! into the distributable archive that gets published.

use crate::archive::{self, ArchiveError};
use crate::manifest::{ManifestError, ModManifest};
use std::path::{Path, PathBuf};

/// Errors arising from final packaging.
#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    /// The core mod archive to bundle does not exist.
    #[error("core mod archive not found: {path}")]
    MissingCoreArchive {
        /// The expected archive path.
        path: PathBuf,
    },

    /// Writing the manifest into the package staging area failed.
    #[error("manifest write failed: {0}")]
    Manifest(#[from] ManifestError),

    /// Creating the package archive failed.
    #[error("package archive creation failed: {0}")]
    Archive(#[from] ArchiveError),

    /// An I/O operation on the staging area failed.
    #[error("packaging I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build the final distributable archive at `out_path`.
///
/// The package contains exactly two entries: the rendered manifest file
/// and the core archive renamed to the manifest's archive file name.
///
/// # Errors
///
/// Returns [`PackageError::MissingCoreArchive`] when `core_archive` does
/// not exist, and propagates manifest and archive failures. The staging
/// directory is cleaned up on every exit path.
pub fn pack_mod(
    core_archive: &Path,
    manifest: &ModManifest,
    out_path: &Path,
) -> Result<(), PackageError> {
    if !core_archive.is_file() {
        return Err(PackageError::MissingCoreArchive {
            path: core_archive.to_path_buf(),
        });
    }

    let staging = tempfile::tempdir()?;
    manifest.write_to(staging.path())?;
    std::fs::copy(core_archive, staging.path().join(manifest.archive_file_name()))?;
    archive::zip_directory(staging.path(), out_path)?;
    Ok(())
}
