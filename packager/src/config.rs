//! Run configuration for the packager.
//!
//! All settings live in one explicit record handed to the pipeline at
//! construction time — nothing deeper performs ambient environment
//! lookups. Values are deserialised from an optional `locmod.toml` when
//! present and fall back to the defaults below otherwise; secrets are
//! captured from the environment once, at load time.

use crate::curate::EntryFilter;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Environment variable holding the translation-platform API token.
pub const PARATRANZ_SECRET_VAR: &str = "PARATRANZ_SECRET";

/// Environment variable holding the object-storage access key.
pub const STORAGE_ACCESS_KEY_VAR: &str = "AWS_S3_ACCESS_KEY";

/// Environment variable holding the object-storage secret key.
pub const STORAGE_SECRET_KEY_VAR: &str = "AWS_S3_SECRET_ACCESS_KEY";

/// Errors arising from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file exists but could not be read.
    #[error("failed to read configuration at {path}: {source}")]
    Read {
        /// Path of the unreadable file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file could not be deserialised.
    #[error("invalid configuration: {reason}")]
    Parse {
        /// Description of the parse error.
        reason: String,
    },
}

/// The complete configuration record for one packaging run.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PackagerConfig {
    /// Coordinates of the font release on the source-hosting service.
    pub source: SourceConfig,
    /// Coordinates of the translation-platform export.
    pub translation: TranslationConfig,
    /// Launcher-facing mod metadata.
    #[serde(rename = "mod")]
    pub mod_info: ModInfoConfig,
    /// Local resource files copied into the mod verbatim.
    pub resources: ResourceConfig,
    /// Archive-entry selection rules.
    pub curation: CurationConfig,
    /// Working and output directories and file names.
    pub output: OutputConfig,
    /// Object-storage and CDN settings.
    pub storage: StorageConfig,
    /// Secrets captured from the environment; never read from the file.
    #[serde(skip)]
    pub secrets: Secrets,
}

impl PackagerConfig {
    /// Load configuration from `path` when it exists, falling back to the
    /// built-in defaults otherwise, then capture secrets from the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if an existing file cannot be read
    /// and [`ConfigError::Parse`] if its contents are not valid.
    pub fn load_or_default(path: &Utf8Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_owned(),
                source,
            })?;
            Self::from_toml_str(&text)?
        } else {
            Self::default()
        };
        config.secrets = Secrets::from_env();
        Ok(config)
    }

    /// Deserialise a configuration record from TOML text.
    ///
    /// Unknown keys are rejected so typos fail loudly instead of being
    /// silently ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the text is not valid TOML or
    /// contains unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })
    }
}

/// Coordinates of the font release on the source-hosting service.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Release tag; the latest release is resolved when absent.
    pub tag: Option<String>,
    /// Asset file name; the release's first asset is used when absent.
    pub asset: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            owner: "matanki-saito".to_owned(),
            repo: "CK2Fontcreate".to_owned(),
            tag: None,
            asset: None,
        }
    }
}

/// Coordinates of the translation-platform artifact export.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct TranslationConfig {
    /// Project identifier on the translation platform.
    pub project_id: u64,
    /// Base URL of the translation platform.
    pub base_url: String,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            project_id: 91,
            base_url: "https://paratranz.cn".to_owned(),
        }
    }
}

/// Launcher-facing mod metadata rendered into the `.mod.mod` manifest.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ModInfoConfig {
    /// Mod title shown by the launcher.
    pub title: String,
    /// Base name (without extension) of the mod archive and manifest.
    pub file_base_name: String,
    /// Working-directory name; falls back to `file_base_name` when absent.
    pub user_dir: Option<String>,
    /// Tag set; rendered sorted so manifests are deterministic.
    pub tags: BTreeSet<String>,
    /// Preview image path as referenced from inside the mod.
    pub picture: String,
}

impl Default for ModInfoConfig {
    fn default() -> Self {
        Self {
            title: "Japanese Language Mod 3.0.x".to_owned(),
            file_base_name: "jpmod3_0_x".to_owned(),
            user_dir: Some("JLM30X".to_owned()),
            tags: ["Translation", "Localisation"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            picture: "title.jpg".to_owned(),
        }
    }
}

/// Local resource files copied into the mod verbatim.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ResourceConfig {
    /// Preview image copied to the mod root.
    pub image: Utf8PathBuf,
    /// Interface directory copied recursively; its structure must already
    /// match what the game expects.
    pub interface_dir: Utf8PathBuf,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            image: Utf8PathBuf::from("resource/title.jpg"),
            interface_dir: Utf8PathBuf::from("resource/interface"),
        }
    }
}

/// Archive-entry selection rules for the curation stage.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct CurationConfig {
    /// Rule selecting font entries from the release archive.
    pub font_filter: EntryFilter,
    /// Rule selecting entries from the translation export.
    pub translation_filter: EntryFilter,
    /// Named subfolders copied out of the extracted translation subset
    /// into the staging tree's localisation folder.
    pub folders: Vec<String>,
}

impl Default for CurationConfig {
    fn default() -> Self {
        Self {
            font_filter: EntryFilter::font_default(),
            translation_filter: EntryFilter::translation_default(),
            folders: vec!["localisation".to_owned()],
        }
    }
}

/// Working and output directories and file names.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Scratch directory for downloads and intermediate archives.
    /// Persistent across runs; not cleaned up on failure.
    pub tmp_dir: Utf8PathBuf,
    /// Directory receiving the final package and descriptor.
    pub out_dir: Utf8PathBuf,
    /// Base name (without extension) of the final package archive.
    pub package_name: String,
    /// File name of the distribution descriptor.
    pub descriptor_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            tmp_dir: Utf8PathBuf::from("tmp"),
            out_dir: Utf8PathBuf::from("out"),
            package_name: "ck2_core_mod".to_owned(),
            descriptor_name: "dist.v1.json".to_owned(),
        }
    }
}

/// Object-storage and CDN settings.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Bucket receiving the final package archive.
    pub bucket: String,
    /// Storage region.
    pub region: String,
    /// Endpoint override for storage-compatible services; derived from the
    /// region when absent.
    pub endpoint: Option<String>,
    /// Base URL of the CDN fronting the bucket.
    pub cdn_base_url: String,
    /// Fixed suffix appended to the timestamped object key.
    pub key_suffix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: "triela-file".to_owned(),
            region: "ap-northeast-1".to_owned(),
            endpoint: None,
            cdn_base_url: "https://d3fxmsw7mhzbqi.cloudfront.net".to_owned(),
            key_suffix: "ck2-core".to_owned(),
        }
    }
}

/// Secrets captured from the environment at load time.
///
/// Blank values are treated as absent to avoid surprising behaviour when
/// CI templating leaves a variable set but empty.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secrets {
    /// Translation-platform API token, sent verbatim as the
    /// `Authorization` header value.
    pub paratranz_token: Option<String>,
    /// Object-storage access key.
    pub storage_access_key: Option<String>,
    /// Object-storage secret key.
    pub storage_secret_key: Option<String>,
}

impl Secrets {
    /// Capture secrets from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            paratranz_token: non_blank_var(PARATRANZ_SECRET_VAR),
            storage_access_key: non_blank_var(STORAGE_ACCESS_KEY_VAR),
            storage_secret_key: non_blank_var(STORAGE_SECRET_KEY_VAR),
        }
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn presence(value: Option<&String>) -> &'static str {
            if value.is_some() { "set" } else { "unset" }
        }
        f.debug_struct("Secrets")
            .field("paratranz_token", &presence(self.paratranz_token.as_ref()))
            .field(
                "storage_access_key",
                &presence(self.storage_access_key.as_ref()),
            )
            .field(
                "storage_secret_key",
                &presence(self.storage_secret_key.as_ref()),
            )
            .finish()
    }
}

/// Read an environment variable, treating blank values as absent.
fn non_blank_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_production_targets() {
        let config = PackagerConfig::default();
        assert_eq!(config.source.owner, "matanki-saito");
        assert_eq!(config.source.repo, "CK2Fontcreate");
        assert_eq!(config.translation.project_id, 91);
        assert_eq!(config.storage.bucket, "triela-file");
        assert_eq!(config.storage.region, "ap-northeast-1");
        assert_eq!(config.output.descriptor_name, "dist.v1.json");
        assert_eq!(config.curation.folders, vec!["localisation".to_owned()]);
    }

    #[test]
    fn default_tags_are_sorted() {
        let config = PackagerConfig::default();
        let tags: Vec<&String> = config.mod_info.tags.iter().collect();
        assert_eq!(tags, ["Localisation", "Translation"]);
    }

    #[test]
    fn toml_overrides_replace_defaults() {
        let config = PackagerConfig::from_toml_str(
            r#"
            [source]
            owner = "example"
            repo = "fonts"
            tag = "v1.2.0"

            [storage]
            bucket = "test-bucket"
            "#,
        )
        .expect("valid config");
        assert_eq!(config.source.owner, "example");
        assert_eq!(config.source.tag.as_deref(), Some("v1.2.0"));
        assert_eq!(config.storage.bucket, "test-bucket");
        // Untouched sections keep their defaults.
        assert_eq!(config.translation.project_id, 91);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = PackagerConfig::from_toml_str("[source]\nonwer = \"typo\"\n");
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn curation_rules_are_configurable() {
        let config = PackagerConfig::from_toml_str(
            r#"
            [curation]
            folders = ["localisation", "gui"]
            translation_filter = { allow_prefix = "extra/" }
            "#,
        )
        .expect("valid config");
        assert_eq!(config.curation.folders.len(), 2);
        assert_eq!(
            config.curation.translation_filter,
            EntryFilter::AllowPrefix("extra/".to_owned())
        );
    }

    #[test]
    fn secrets_come_from_the_environment() {
        temp_env::with_vars(
            [
                (PARATRANZ_SECRET_VAR, Some("token")),
                (STORAGE_ACCESS_KEY_VAR, Some("")),
                (STORAGE_SECRET_KEY_VAR, None),
            ],
            || {
                let secrets = Secrets::from_env();
                assert_eq!(secrets.paratranz_token.as_deref(), Some("token"));
                // Blank values count as absent.
                assert_eq!(secrets.storage_access_key, None);
                assert_eq!(secrets.storage_secret_key, None);
            },
        );
    }

    #[test]
    fn secrets_debug_output_redacts_values() {
        let secrets = Secrets {
            paratranz_token: Some("super-secret".to_owned()),
            storage_access_key: None,
            storage_secret_key: None,
        };
        let rendered = format!("{secrets:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("set"));
    }

    #[test]
    fn load_or_default_without_file_uses_defaults() {
        let config = PackagerConfig::load_or_default(Utf8Path::new("does/not/exist.toml"))
            .expect("defaults load");
        assert_eq!(config.source.repo, "CK2Fontcreate");
    }
}
