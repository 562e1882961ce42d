//! Launcher manifest (`.mod.mod`) generation.
//!
//! The game launcher registers a mod from a small plain-text descriptor
//! of five `key="value"` / `key={...}` lines. Tags are kept in an
//! ordered set so the rendered manifest is byte-identical across runs.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Errors arising from manifest construction and writing.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// The mod file base name cannot be used in file names and manifest
    /// references.
    #[error("invalid mod file name: {reason}")]
    InvalidFileName {
        /// Description of the validation failure.
        reason: String,
    },

    /// Writing the manifest file failed.
    #[error("failed to write manifest: {0}")]
    Io(#[from] std::io::Error),
}

/// A validated mod archive base name (without extension).
///
/// The name appears inside the manifest's quoted `archive` reference and
/// as an on-disk file name, so path separators and quote characters are
/// rejected.
///
/// # Examples
///
/// ```
/// use locmod_packager::manifest::ModFileName;
///
/// let name = ModFileName::try_from("jpmod3_0_x").expect("valid name");
/// assert_eq!(name.as_str(), "jpmod3_0_x");
/// assert!(ModFileName::try_from("bad/name").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModFileName(String);

impl ModFileName {
    /// Return the base name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for ModFileName {
    type Error = ManifestError;

    fn try_from(value: &str) -> Result<Self, ManifestError> {
        validate_file_name(value)?;
        Ok(Self(value.to_owned()))
    }
}

impl TryFrom<String> for ModFileName {
    type Error = ManifestError;

    fn try_from(value: String) -> Result<Self, ManifestError> {
        validate_file_name(&value)?;
        Ok(Self(value))
    }
}

impl AsRef<str> for ModFileName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModFileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validate that `value` is usable as a mod archive base name.
fn validate_file_name(value: &str) -> Result<(), ManifestError> {
    if value.is_empty() {
        return Err(ManifestError::InvalidFileName {
            reason: "name must not be empty".to_owned(),
        });
    }
    if let Some(bad) = value.chars().find(|c| matches!(c, '/' | '\\' | '"')) {
        return Err(ManifestError::InvalidFileName {
            reason: format!("forbidden character {bad:?}"),
        });
    }
    Ok(())
}

/// The launcher-facing mod descriptor.
///
/// Values are written verbatim, without escaping — a title or tag
/// containing a double quote produces a manifest the launcher cannot
/// parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModManifest {
    title: String,
    file_name: ModFileName,
    user_dir: Option<String>,
    tags: BTreeSet<String>,
    picture: String,
}

impl ModManifest {
    /// Construct a manifest from the mod metadata.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        file_name: ModFileName,
        tags: BTreeSet<String>,
        picture: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            file_name,
            user_dir: None,
            tags,
            picture: picture.into(),
        }
    }

    /// Set an explicit working-directory name; the file base name is used
    /// otherwise.
    #[must_use]
    pub fn with_user_dir(mut self, user_dir: impl Into<String>) -> Self {
        self.user_dir = Some(user_dir.into());
        self
    }

    /// Return the validated file base name.
    #[must_use]
    pub fn file_name(&self) -> &ModFileName {
        &self.file_name
    }

    /// File name of the manifest on disk.
    #[must_use]
    pub fn manifest_file_name(&self) -> String {
        format!("{}.mod.mod", self.file_name)
    }

    /// File name the core archive carries inside the final package.
    #[must_use]
    pub fn archive_file_name(&self) -> String {
        format!("{}.zip", self.file_name)
    }

    /// Render the five manifest lines, newline-joined with no trailing
    /// newline.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::BTreeSet;
    /// use locmod_packager::manifest::{ModFileName, ModManifest};
    ///
    /// let tags: BTreeSet<String> =
    ///     ["Translation".to_owned(), "Localisation".to_owned()].into();
    /// let name = ModFileName::try_from("jpmod3_0_x").expect("valid name");
    /// let manifest = ModManifest::new("Japanese Language Mod", name, tags, "title.jpg");
    ///
    /// let rendered = manifest.render();
    /// assert!(rendered.starts_with("name=\"Japanese Language Mod\""));
    /// assert!(rendered.contains("tags={Localisation Translation}"));
    /// ```
    #[must_use]
    pub fn render(&self) -> String {
        let user_dir = self.user_dir.as_deref().unwrap_or(self.file_name.as_str());
        let tags = self
            .tags
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        [
            format!("name=\"{}\"", self.title),
            format!("archive=\"mod/{}.zip\"", self.file_name),
            format!("user_dir=\"{user_dir}\""),
            format!("tags={{{tags}}}"),
            format!("picture=\"{}\"", self.picture),
        ]
        .join("\n")
    }

    /// Write the rendered manifest to `<out_dir>/<base>.mod.mod`,
    /// creating the directory when needed, and return the written path.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Io`] when the directory or file cannot be
    /// written.
    pub fn write_to(&self, out_dir: &Path) -> Result<PathBuf, ManifestError> {
        std::fs::create_dir_all(out_dir)?;
        let path = out_dir.join(self.manifest_file_name());
        std::fs::write(&path, self.render())?;
        Ok(path)
    }
}
