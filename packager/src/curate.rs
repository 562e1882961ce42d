//! Selective extraction of entries from the source archives.
//!
//! The font release and the translation export each contribute only a
//! subset of their entries to the mod. Selection is expressed as named,
//! serialisable prefix rules so the rules can be unit-tested on their own
//! and changed through configuration, and every extracted entry path is
//! validated to prevent zip-slip escapes from the staging tree.

use crate::archive::{self, ArchiveError};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Filename prefixes of reserved/duplicate font variants excluded from
/// the mod.
pub const FONT_DENY_PREFIXES: [&str; 3] = [
    "aoyagireisyo60-aoyagi",
    "aoyagireisyo60-appb",
    "tuikafont1",
];

/// Entry-name prefix the translation export uses for supplementary
/// editable resources, kept separate from the main translation memory.
pub const SPECIAL_PREFIX: &str = "special/";

/// Subfolder of the extracted translation subset that named folders are
/// copied out of.
const SPECIAL_DIR: &str = "special";

/// A named rule selecting which archive entries to extract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryFilter {
    /// Keep every entry except those whose name starts with one of the
    /// listed prefixes.
    DenyPrefixes(Vec<String>),
    /// Keep only entries whose name starts with the prefix.
    AllowPrefix(String),
}

impl EntryFilter {
    /// The deny-list rule applied to the font release archive.
    #[must_use]
    pub fn font_default() -> Self {
        Self::DenyPrefixes(FONT_DENY_PREFIXES.map(str::to_owned).to_vec())
    }

    /// The allow rule applied to the translation export.
    #[must_use]
    pub fn translation_default() -> Self {
        Self::AllowPrefix(SPECIAL_PREFIX.to_owned())
    }

    /// Whether an entry with this name should be extracted.
    ///
    /// # Examples
    ///
    /// ```
    /// use locmod_packager::curate::EntryFilter;
    ///
    /// let filter = EntryFilter::font_default();
    /// assert!(filter.accepts("keep.ttf"));
    /// assert!(!filter.accepts("tuikafont1.ttf"));
    /// ```
    #[must_use]
    pub fn accepts(&self, name: &str) -> bool {
        match self {
            Self::DenyPrefixes(prefixes) => {
                !prefixes.iter().any(|prefix| name.starts_with(prefix))
            }
            Self::AllowPrefix(prefix) => name.starts_with(prefix),
        }
    }
}

/// Errors arising from archive curation.
#[derive(Debug, thiserror::Error)]
pub enum CurateError {
    /// I/O error during extraction.
    #[error("extraction I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The source archive is missing or corrupt.
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// A path in the archive attempts to traverse outside the destination.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending path from the archive entry.
        path: String,
    },

    /// The filter matched no entries at all, which would silently produce
    /// an empty mod folder downstream.
    #[error("no entries in {archive} matched the filter")]
    EmptySelection {
        /// The archive whose filtered selection was empty.
        archive: PathBuf,
    },

    /// A named subfolder expected in the extracted tree was not found,
    /// usually meaning the export's folder convention changed upstream.
    #[error("folder {folder:?} not found under {root}")]
    FolderNotFound {
        /// The missing folder name.
        folder: String,
        /// The extracted tree that was searched.
        root: PathBuf,
    },

    /// Copying a named subfolder into the staging tree failed.
    #[error("folder copy failed: {0}")]
    Copy(#[from] ArchiveError),
}

impl CurateError {
    fn folder_not_found(folder: &str, root: &Path) -> Self {
        Self::FolderNotFound {
            folder: folder.to_owned(),
            root: root.to_path_buf(),
        }
    }
}

/// Extract the entries of `archive_path` accepted by `filter` into
/// `dest_dir`, preserving each entry's relative path.
///
/// Returns the names of the extracted entries.
///
/// # Errors
///
/// Returns [`CurateError::PathTraversal`] if any accepted entry attempts
/// to escape the destination directory, [`CurateError::EmptySelection`]
/// if the filter accepts nothing, and [`CurateError::Archive`] /
/// [`CurateError::Io`] on archive or I/O failures.
pub fn extract_filtered(
    archive_path: &Path,
    dest_dir: &Path,
    filter: &EntryFilter,
) -> Result<Vec<String>, CurateError> {
    let file = std::fs::File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file)?;
    let mut extracted = Vec::new();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let name = entry.name().to_owned();
        if !filter.accepts(&name) {
            continue;
        }

        let entry_path = PathBuf::from(&name);
        validate_entry_path(&entry_path)?;

        let dest_path = dest_dir.join(&entry_path);
        if entry.is_dir() {
            std::fs::create_dir_all(&dest_path)?;
        } else {
            if let Some(parent) = dest_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut out = std::fs::File::create(&dest_path)?;
            std::io::copy(&mut entry, &mut out)?;
        }
        extracted.push(name);
    }

    if extracted.is_empty() {
        return Err(CurateError::EmptySelection {
            archive: archive_path.to_path_buf(),
        });
    }

    log::debug!(
        "extracted {} of {} entries from {}",
        extracted.len(),
        archive.len(),
        archive_path.display()
    );
    Ok(extracted)
}

/// Copy the named subfolders out of an extracted translation subset into
/// `dest_dir`.
///
/// The export groups several resource kinds under its `special/`
/// namespace; only the configured folders are wanted. Each folder's
/// contents land directly in `dest_dir`.
///
/// # Errors
///
/// Returns [`CurateError::FolderNotFound`] when a named folder is absent
/// from the extracted tree.
pub fn collect_folders(
    extracted_root: &Path,
    folders: &[String],
    dest_dir: &Path,
) -> Result<(), CurateError> {
    let special_root = extracted_root.join(SPECIAL_DIR);
    for folder in folders {
        let source = special_root.join(folder);
        if !source.is_dir() {
            return Err(CurateError::folder_not_found(folder, &special_root));
        }
        archive::copy_tree(&source, dest_dir)?;
    }
    Ok(())
}

/// Validate that an archive entry path does not escape the destination
/// directory via `..` components or absolute paths.
fn validate_entry_path(path: &Path) -> Result<(), CurateError> {
    if path.is_absolute() {
        return Err(CurateError::PathTraversal {
            path: path.display().to_string(),
        });
    }
    for component in path.components() {
        if matches!(component, Component::ParentDir) {
            return Err(CurateError::PathTraversal {
                path: path.display().to_string(),
            });
        }
    }
    Ok(())
}
