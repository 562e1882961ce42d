//! Core mod assembly.
//!
//! Builds the canonical staging layout the game expects — preview image
//! at the root, `interface/` copied verbatim, curated fonts under
//! `gfx/fonts/`, curated localisation under `localisation/` — inside a
//! scoped temporary directory, then compresses the whole tree into the
//! core mod archive. The staging directory is removed when the scope
//! ends, whether assembly succeeded or failed.

use crate::archive::{self, ArchiveError};
use crate::config::CurationConfig;
use crate::curate::{self, CurateError};
use std::path::{Path, PathBuf};

/// Staging-tree folder receiving the interface files.
const INTERFACE_DIR: &str = "interface";

/// Staging-tree folder receiving the curated fonts.
const FONTS_DIR: &str = "gfx/fonts";

/// Staging-tree folder receiving the curated localisation files.
const LOCALISATION_DIR: &str = "localisation";

/// Local inputs and downloaded archives consumed by the assembler.
#[derive(Debug)]
pub struct CoreModInputs<'a> {
    /// The downloaded font release archive.
    pub font_archive: &'a Path,
    /// The downloaded translation export archive.
    pub translation_archive: &'a Path,
    /// Preview image copied to the staging-tree root.
    pub image: &'a Path,
    /// Interface directory copied verbatim; this tool does not transform
    /// interface files.
    pub interface_dir: &'a Path,
}

/// Errors arising from core mod assembly.
#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    /// A required local resource is missing.
    #[error("resource not found: {path}")]
    MissingResource {
        /// The missing file or directory.
        path: PathBuf,
    },

    /// Curating an archive into the staging tree failed.
    #[error("curation failed: {0}")]
    Curate(#[from] CurateError),

    /// Creating the core mod archive failed.
    #[error("archive creation failed: {0}")]
    Archive(#[from] ArchiveError),

    /// An I/O operation on the staging tree failed.
    #[error("staging I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Assemble the core mod archive at `out_path`.
///
/// # Errors
///
/// Returns [`AssemblyError::MissingResource`] when the image or interface
/// directory is absent, and propagates curation and archive failures. The
/// staging directory is cleaned up on every exit path.
pub fn assemble_core_mod(
    inputs: &CoreModInputs<'_>,
    curation: &CurationConfig,
    out_path: &Path,
) -> Result<(), AssemblyError> {
    let image_name = inputs
        .image
        .file_name()
        .filter(|_| inputs.image.is_file())
        .ok_or_else(|| AssemblyError::MissingResource {
            path: inputs.image.to_path_buf(),
        })?;
    if !inputs.interface_dir.is_dir() {
        return Err(AssemblyError::MissingResource {
            path: inputs.interface_dir.to_path_buf(),
        });
    }

    let staging = tempfile::tempdir()?;
    let root = staging.path();

    std::fs::copy(inputs.image, root.join(image_name))?;
    archive::copy_tree(inputs.interface_dir, &root.join(INTERFACE_DIR))?;
    curate::extract_filtered(
        inputs.font_archive,
        &root.join(FONTS_DIR),
        &curation.font_filter,
    )?;

    // The export bundles several resource kinds under its special/
    // namespace; extract the subset to scratch, then copy only the named
    // folders into the staging tree.
    let translation_scratch = tempfile::tempdir()?;
    curate::extract_filtered(
        inputs.translation_archive,
        translation_scratch.path(),
        &curation.translation_filter,
    )?;
    curate::collect_folders(
        translation_scratch.path(),
        &curation.folders,
        &root.join(LOCALISATION_DIR),
    )?;

    archive::zip_directory(root, out_path)?;
    Ok(())
}
