//! Zip creation and verbatim tree copies for staging directories.

use std::path::Path;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;

/// Errors arising from archive creation and tree copies.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// I/O error reading a source file or writing the archive.
    #[error("archive I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The zip writer rejected an entry.
    #[error("zip write error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Walking the source tree failed.
    #[error("directory traversal failed: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Compress the contents of `src_dir` into a zip archive at `out_path`.
///
/// Entry names are the paths relative to `src_dir` with `/` separators.
/// Member ordering follows filesystem traversal order, so the archive is
/// not guaranteed byte-for-byte reproducible across runs.
///
/// # Errors
///
/// Returns [`ArchiveError`] if the tree cannot be walked or any entry
/// cannot be written.
pub fn zip_directory(src_dir: &Path, out_path: &Path) -> Result<(), ArchiveError> {
    let file = std::fs::File::create(out_path)?;
    let mut writer = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for entry in WalkDir::new(src_dir).min_depth(1) {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(src_dir) else {
            continue;
        };
        let name = entry_name(relative);
        if entry.file_type().is_dir() {
            writer.add_directory(name, options)?;
        } else {
            writer.start_file(name, options)?;
            let mut source = std::fs::File::open(entry.path())?;
            std::io::copy(&mut source, &mut writer)?;
        }
    }

    writer.finish()?;
    Ok(())
}

/// Recursively copy the contents of `src_dir` into `dest_dir`, creating
/// `dest_dir` and any intermediate directories.
///
/// # Errors
///
/// Returns [`ArchiveError`] if the tree cannot be walked or a file cannot
/// be copied.
pub fn copy_tree(src_dir: &Path, dest_dir: &Path) -> Result<(), ArchiveError> {
    for entry in WalkDir::new(src_dir) {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(src_dir) else {
            continue;
        };
        let target = dest_dir.join(relative);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Build a `/`-separated archive entry name from a relative path.
fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
