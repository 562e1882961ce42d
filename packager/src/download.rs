//! Archive downloads from the release host and the translation platform.
//!
//! Provides a trait-based abstraction over the two external sources so
//! the pipeline can be exercised with injected fakes, plus the
//! production HTTP implementation. Both fetches write their payload to a
//! caller-specified path and hand the path back as the handle, keeping
//! large archives out of memory.

use serde::Deserialize;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

/// Base URL of the release host's REST API.
const RELEASE_API_BASE: &str = "https://api.github.com";

/// Base URL for direct release-asset downloads.
const RELEASE_DOWNLOAD_BASE: &str = "https://github.com";

/// Network timeout applied to every request. Archives run to tens of
/// megabytes, so this is generous compared to a metadata fetch.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Coordinates of a release asset to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRequest {
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Release tag; the latest release is resolved when absent.
    pub tag: Option<String>,
    /// Asset file name; the release's first asset is used when absent.
    pub asset: Option<String>,
}

/// The release coordinates actually used after resolving defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    /// The release tag the asset was downloaded from.
    pub tag: String,
    /// The asset file name that was downloaded.
    pub asset: String,
}

/// Coordinates of a translation-platform artifact export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    /// Project identifier on the translation platform.
    pub project_id: u64,
    /// Base URL of the translation platform.
    pub base_url: String,
}

/// Errors arising from archive downloads.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// HTTP request failed.
    #[error("download failed for {url}: {reason}")]
    HttpError {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The requested resource was not found (HTTP 404).
    #[error("resource not found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// The release metadata response could not be parsed.
    #[error("malformed release metadata from {url}: {reason}")]
    Metadata {
        /// The URL whose response was malformed.
        url: String,
        /// Description of the parse failure.
        reason: String,
    },

    /// The resolved release lists no downloadable assets.
    #[error("release {tag} has no assets")]
    NoAssets {
        /// The tag of the asset-less release.
        tag: String,
    },

    /// I/O error writing the downloaded file.
    #[error("I/O error writing download: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for fetching the two source archives.
///
/// Abstraction allows tests to exercise the pipeline without network
/// access.
#[cfg_attr(test, mockall::automock)]
pub trait ArchiveFetcher {
    /// Fetch a release asset into `dest`, resolving the latest tag and
    /// the first listed asset when the request leaves them unspecified.
    ///
    /// # Errors
    ///
    /// Returns an error if metadata resolution, the download itself, or
    /// the file write fails. There are no retries.
    fn fetch_release_asset(
        &self,
        request: &ReleaseRequest,
        dest: &Path,
    ) -> Result<ResolvedAsset, DownloadError>;

    /// Fetch the translation export archive into `dest`.
    ///
    /// The token is sent verbatim as the `Authorization` header value —
    /// the platform expects no scheme prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the download or the file write fails.
    fn fetch_translation_export(
        &self,
        request: &TranslationRequest,
        token: &str,
        dest: &Path,
    ) -> Result<(), DownloadError>;
}

/// Release metadata subset consumed from the API.
#[derive(Debug, Deserialize)]
struct ReleaseMetadata {
    tag_name: String,
    #[serde(default)]
    assets: Vec<ReleaseAssetMetadata>,
}

/// Asset entry subset consumed from the API.
#[derive(Debug, Deserialize)]
struct ReleaseAssetMetadata {
    name: String,
}

/// HTTP-based fetcher using `ureq`.
pub struct HttpFetcher;

impl HttpFetcher {
    /// Construct the release metadata URL for a repository.
    ///
    /// With a tag this addresses that release; without one it addresses
    /// the latest release.
    ///
    /// # Examples
    ///
    /// ```
    /// use locmod_packager::download::HttpFetcher;
    ///
    /// let latest = HttpFetcher::release_api_url("matanki-saito", "CK2Fontcreate", None);
    /// assert!(latest.ends_with("/releases/latest"));
    ///
    /// let tagged = HttpFetcher::release_api_url("matanki-saito", "CK2Fontcreate", Some("v2"));
    /// assert!(tagged.ends_with("/releases/tags/v2"));
    /// ```
    #[must_use]
    pub fn release_api_url(owner: &str, repo: &str, tag: Option<&str>) -> String {
        match tag {
            Some(tag) => format!("{RELEASE_API_BASE}/repos/{owner}/{repo}/releases/tags/{tag}"),
            None => format!("{RELEASE_API_BASE}/repos/{owner}/{repo}/releases/latest"),
        }
    }

    /// Construct the direct download URL for a release asset.
    ///
    /// # Examples
    ///
    /// ```
    /// use locmod_packager::download::HttpFetcher;
    ///
    /// let url = HttpFetcher::asset_url("matanki-saito", "CK2Fontcreate", "v2", "font.zip");
    /// assert!(url.ends_with("/CK2Fontcreate/releases/download/v2/font.zip"));
    /// ```
    #[must_use]
    pub fn asset_url(owner: &str, repo: &str, tag: &str, asset: &str) -> String {
        format!("{RELEASE_DOWNLOAD_BASE}/{owner}/{repo}/releases/download/{tag}/{asset}")
    }

    /// Construct the translation artifact download URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use locmod_packager::download::HttpFetcher;
    ///
    /// let url = HttpFetcher::export_url("https://paratranz.cn", 91);
    /// assert_eq!(url, "https://paratranz.cn/api/projects/91/artifacts/download");
    /// ```
    #[must_use]
    pub fn export_url(base_url: &str, project_id: u64) -> String {
        format!(
            "{}/api/projects/{project_id}/artifacts/download",
            base_url.trim_end_matches('/')
        )
    }
}

impl ArchiveFetcher for HttpFetcher {
    fn fetch_release_asset(
        &self,
        request: &ReleaseRequest,
        dest: &Path,
    ) -> Result<ResolvedAsset, DownloadError> {
        let tag = match &request.tag {
            Some(tag) => tag.clone(),
            None => fetch_release_metadata(&request.owner, &request.repo, None)?.tag_name,
        };
        let asset = match &request.asset {
            Some(asset) => asset.clone(),
            None => {
                let release = fetch_release_metadata(&request.owner, &request.repo, Some(&tag))?;
                release
                    .assets
                    .into_iter()
                    .next()
                    .map(|a| a.name)
                    .ok_or_else(|| DownloadError::NoAssets { tag: tag.clone() })?
            }
        };

        let url = Self::asset_url(&request.owner, &request.repo, &tag, &asset);
        log::debug!("downloading release asset from {url}");
        download_to_file(&url, dest, None)?;
        Ok(ResolvedAsset { tag, asset })
    }

    fn fetch_translation_export(
        &self,
        request: &TranslationRequest,
        token: &str,
        dest: &Path,
    ) -> Result<(), DownloadError> {
        let url = Self::export_url(&request.base_url, request.project_id);
        log::debug!("downloading translation export from {url}");
        download_to_file(&url, dest, Some(token))
    }
}

/// Fetch and parse release metadata for a repository.
fn fetch_release_metadata(
    owner: &str,
    repo: &str,
    tag: Option<&str>,
) -> Result<ReleaseMetadata, DownloadError> {
    let url = HttpFetcher::release_api_url(owner, repo, tag);
    let body = download_text(&url)?;
    parse_release_metadata(&url, &body)
}

/// Parse a release metadata payload, mapping failures to [`DownloadError::Metadata`].
fn parse_release_metadata(url: &str, body: &str) -> Result<ReleaseMetadata, DownloadError> {
    serde_json::from_str(body).map_err(|e| DownloadError::Metadata {
        url: url.to_owned(),
        reason: e.to_string(),
    })
}

/// Download a URL and return the body as a string.
fn download_text(url: &str) -> Result<String, DownloadError> {
    let response = http_agent()
        .get(url)
        .call()
        .map_err(|e| map_ureq_error(url, &e))?;
    response
        .into_body()
        .read_to_string()
        .map_err(|e| DownloadError::HttpError {
            url: url.to_owned(),
            reason: e.to_string(),
        })
}

/// Download a URL and write the body to a file, optionally sending an
/// `Authorization` header.
fn download_to_file(url: &str, dest: &Path, auth: Option<&str>) -> Result<(), DownloadError> {
    let mut request = http_agent().get(url);
    if let Some(token) = auth {
        request = request.header("Authorization", token);
    }
    let response = request.call().map_err(|e| map_ureq_error(url, &e))?;
    let mut file = std::fs::File::create(dest)?;
    std::io::copy(&mut response.into_body().as_reader(), &mut file).map_err(DownloadError::Io)?;
    Ok(())
}

/// Shared `ureq` agent with request timeout configuration.
fn http_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(DOWNLOAD_TIMEOUT))
            .build();
        ureq::Agent::new_with_config(config)
    })
}

/// Map a ureq error to a [`DownloadError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> DownloadError {
    match err {
        ureq::Error::StatusCode(404) => DownloadError::NotFound {
            url: url.to_owned(),
        },
        other => DownloadError::HttpError {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}
