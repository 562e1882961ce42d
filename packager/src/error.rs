//! Error types for the packager pipeline.
//!
//! Each pipeline stage defines its own error enum next to its code; this
//! module composes them into the semantic top-level error the binary
//! reports. Nothing is caught or retried anywhere in the pipeline — every
//! stage propagates failures upward and the run terminates on the first
//! error.

use thiserror::Error;

/// Errors that can abort a packaging run.
#[derive(Debug, Error)]
pub enum PackagerError {
    /// The configuration file could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// A download from the release host or translation platform failed.
    #[error("download failed: {0}")]
    Download(#[from] crate::download::DownloadError),

    /// Curating files out of a source archive failed.
    #[error("archive curation failed: {0}")]
    Curate(#[from] crate::curate::CurateError),

    /// Assembling the core mod staging tree failed.
    #[error("core mod assembly failed: {0}")]
    Assembly(#[from] crate::assemble::AssemblyError),

    /// The launcher manifest could not be built or written.
    #[error("manifest error: {0}")]
    Manifest(#[from] crate::manifest::ManifestError),

    /// Packing the final distributable archive failed.
    #[error("mod packing failed: {0}")]
    Package(#[from] crate::package::PackageError),

    /// Computing the content fingerprint failed.
    #[error("digest error: {0}")]
    Digest(#[from] crate::digest::DigestError),

    /// Uploading or writing the distribution descriptor failed.
    #[error("publish failed: {0}")]
    Publish(#[from] crate::publish::PublishError),

    /// A required secret was not present in the environment.
    #[error("missing secret: set the {variable} environment variable")]
    MissingSecret {
        /// Name of the environment variable that was not set.
        variable: &'static str,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using [`PackagerError`].
pub type Result<T> = std::result::Result<T, PackagerError>;
