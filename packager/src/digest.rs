//! Content fingerprint for published packages.
//!
//! The distribution descriptor carries an MD5 hex digest under the
//! `file_md5` key; the downstream client recomputes it after download to
//! verify the transfer. The digest is an integrity fingerprint, not a
//! security boundary.

use std::fmt;
use std::io::Read;
use std::path::Path;

/// Expected length of a hex-encoded MD5 digest.
const DIGEST_HEX_LEN: usize = 32;

/// Errors arising from digest computation and validation.
#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    /// The value is not a well-formed hex-encoded MD5 digest.
    #[error("invalid MD5 digest: {reason}")]
    InvalidDigest {
        /// Description of the validation failure.
        reason: String,
    },

    /// Reading the file to hash failed.
    #[error("digest I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A validated hex-encoded MD5 digest string.
///
/// # Examples
///
/// ```
/// use locmod_packager::digest::Md5Digest;
///
/// let hex = "d41d8cd98f00b204e9800998ecf8427e";
/// let digest = Md5Digest::try_from(hex).expect("valid digest");
/// assert_eq!(digest.as_str().len(), 32);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct Md5Digest(String);

impl Md5Digest {
    /// Return the digest as a hex string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<&str> for Md5Digest {
    type Error = DigestError;

    fn try_from(value: &str) -> Result<Self, DigestError> {
        validate_md5(value)?;
        Ok(Self(value.to_owned()))
    }
}

impl TryFrom<String> for Md5Digest {
    type Error = DigestError;

    fn try_from(value: String) -> Result<Self, DigestError> {
        validate_md5(&value)?;
        Ok(Self(value))
    }
}

impl AsRef<str> for Md5Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Md5Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validate that `value` is a well-formed hex-encoded MD5 digest.
fn validate_md5(value: &str) -> Result<(), DigestError> {
    if value.len() != DIGEST_HEX_LEN {
        return Err(DigestError::InvalidDigest {
            reason: format!(
                "expected {DIGEST_HEX_LEN} hex characters, got {}",
                value.len()
            ),
        });
    }
    if let Some(bad) = value.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(DigestError::InvalidDigest {
            reason: format!("non-hex character '{bad}'"),
        });
    }
    if value.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(DigestError::InvalidDigest {
            reason: "digest must be lowercase".to_owned(),
        });
    }
    Ok(())
}

/// Compute the MD5 digest of a file.
///
/// Reads the file at `path` in chunks and returns the lowercase hex
/// digest as a validated [`Md5Digest`].
///
/// # Errors
///
/// Returns [`DigestError::Io`] if the file cannot be read.
pub fn compute_md5(path: &Path) -> Result<Md5Digest, DigestError> {
    let mut file = std::fs::File::open(path)?;
    let mut context = md5::Context::new();
    let mut buffer = [0u8; 8192];
    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        context.consume(&buffer[..bytes_read]);
    }
    let hex = format!("{:x}", context.compute());
    // md5 always produces valid 32-char lowercase hex.
    Ok(Md5Digest::try_from(hex).expect("md5 produces valid 32-char lowercase hex"))
}
