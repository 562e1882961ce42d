//! Publishing the final package to object storage.
//!
//! Uploads the package archive as a single object under a timestamped
//! key, derives its public CDN URL, and writes the distribution
//! descriptor a separate client uses to verify and fetch the package.
//! The bucket is assumed to already be served through the CDN;
//! configuring that is out of scope here.

use crate::config::StorageConfig;
use crate::digest::Md5Digest;
use chrono::{DateTime, Utc};
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::region::Region;
use serde::Serialize;
use std::path::Path;

/// Errors arising from publishing.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// The storage credentials were rejected at client construction.
    #[error("storage credentials error: {reason}")]
    Credentials {
        /// Description of the failure.
        reason: String,
    },

    /// The storage client failed before or during the upload.
    #[error("storage error: {reason}")]
    Storage {
        /// Description of the failure.
        reason: String,
    },

    /// The storage service answered the upload with a non-success status.
    #[error("upload of {key} rejected with status {status}")]
    Upload {
        /// The object key that was being written.
        key: String,
        /// The HTTP status the service returned.
        status: u16,
    },

    /// Reading the package or writing the descriptor failed.
    #[error("publish I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialising the distribution descriptor failed.
    #[error("descriptor serialisation failed: {0}")]
    Descriptor(#[from] serde_json::Error),
}

/// Trait for uploading the package archive, enabling test fakes.
#[cfg_attr(test, mockall::automock)]
pub trait ObjectStore {
    /// Upload the file at `path` as a single object under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or the service
    /// rejects the upload. There are no retries and no multipart
    /// handling.
    fn put_object(&self, path: &Path, key: &str) -> Result<(), PublishError>;
}

/// Production object store backed by an S3-compatible bucket.
pub struct S3Store {
    bucket: Bucket,
}

impl S3Store {
    /// Build a store from storage settings and credentials.
    ///
    /// When no endpoint override is configured, the regional default
    /// endpoint is derived from the region name.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Credentials`] or [`PublishError::Storage`]
    /// when the client cannot be constructed.
    pub fn new(
        settings: &StorageConfig,
        access_key: &str,
        secret_key: &str,
    ) -> Result<Self, PublishError> {
        let endpoint = settings
            .endpoint
            .clone()
            .unwrap_or_else(|| format!("https://s3.{}.amazonaws.com", settings.region));
        let region = Region::Custom {
            region: settings.region.clone(),
            endpoint,
        };
        let credentials = Credentials::new(Some(access_key), Some(secret_key), None, None, None)
            .map_err(|e| PublishError::Credentials {
                reason: e.to_string(),
            })?;
        let bucket =
            Bucket::new(&settings.bucket, region, credentials).map_err(|e| PublishError::Storage {
                reason: e.to_string(),
            })?;
        Ok(Self { bucket })
    }
}

impl ObjectStore for S3Store {
    fn put_object(&self, path: &Path, key: &str) -> Result<(), PublishError> {
        let content = std::fs::read(path)?;
        let response = self
            .bucket
            .put_object(key, &content)
            .map_err(|e| PublishError::Storage {
                reason: e.to_string(),
            })?;
        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(PublishError::Upload {
                key: key.to_owned(),
                status,
            });
        }
        Ok(())
    }
}

/// Build the timestamped object key for an upload.
///
/// Keys collide only within the same second; runs are manual or CI-paced,
/// so the narrow window is accepted.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use locmod_packager::publish::object_key;
///
/// let now = Utc.with_ymd_and_hms(2026, 8, 5, 10, 30, 0).unwrap();
/// assert_eq!(object_key(&now, "ck2-core"), "2026-08-05_10-30-00-ck2-core");
/// ```
#[must_use]
pub fn object_key(now: &DateTime<Utc>, suffix: &str) -> String {
    format!("{}-{suffix}", now.format("%Y-%m-%d_%H-%M-%S"))
}

/// Derive the public CDN URL for an uploaded object.
///
/// # Examples
///
/// ```
/// use locmod_packager::publish::public_url;
///
/// let url = public_url("https://cdn.example.net", "2026-08-05_10-30-00-ck2-core");
/// assert_eq!(url, "https://cdn.example.net/2026-08-05_10-30-00-ck2-core");
/// ```
#[must_use]
pub fn public_url(cdn_base_url: &str, key: &str) -> String {
    format!("{}/{key}", cdn_base_url.trim_end_matches('/'))
}

/// The descriptor a separate distribution client reads to verify and
/// fetch the published package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionDescriptor {
    /// Hex MD5 digest of the published archive.
    pub file_md5: Md5Digest,
    /// Public CDN URL of the published archive.
    pub url: String,
}

impl DistributionDescriptor {
    /// Serialise the descriptor as indented JSON.
    ///
    /// Output is UTF-8 with non-ASCII characters left unescaped.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Descriptor`] when serialisation fails.
    pub fn to_json(&self) -> Result<String, PublishError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the descriptor to `out_path`.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] when serialisation or the write fails.
    pub fn write_to(&self, out_path: &Path) -> Result<(), PublishError> {
        std::fs::write(out_path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_digest() -> Md5Digest {
        Md5Digest::try_from("5eb63bbbe01eeed093cb22bb8f5acdc3").expect("valid digest")
    }

    #[test]
    fn object_key_formats_timestamp_then_suffix() {
        let now = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(object_key(&now, "ck2-core"), "2026-01-02_03-04-05-ck2-core");
    }

    #[test]
    fn public_url_tolerates_trailing_slash() {
        assert_eq!(
            public_url("https://cdn.example.net/", "key"),
            "https://cdn.example.net/key"
        );
    }

    #[test]
    fn descriptor_serialises_expected_fields() {
        let descriptor = DistributionDescriptor {
            file_md5: sample_digest(),
            url: "https://cdn.example.net/key".to_owned(),
        };
        let json = descriptor.to_json().expect("serialise");
        let value: serde_json::Value = serde_json::from_str(&json).expect("parse");
        assert_eq!(value["file_md5"], "5eb63bbbe01eeed093cb22bb8f5acdc3");
        assert_eq!(value["url"], "https://cdn.example.net/key");
        // Indented output, exactly the two keys.
        assert!(json.contains("\n  \"file_md5\""));
        assert_eq!(value.as_object().expect("object").len(), 2);
    }

    #[test]
    fn descriptor_writes_to_disk() {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = temp.path().join("dist.v1.json");
        let descriptor = DistributionDescriptor {
            file_md5: sample_digest(),
            url: "https://cdn.example.net/key".to_owned(),
        };
        descriptor.write_to(&path).expect("write");
        let written = std::fs::read_to_string(&path).expect("read");
        assert_eq!(written, descriptor.to_json().expect("serialise"));
    }
}
