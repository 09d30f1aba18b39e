//! Error types for compendium-core

use std::path::PathBuf;

/// Result type for compendium-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in compendium-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Manifest or settings file not found at expected path
    #[error("Configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// Manifest or settings file could not be parsed or is inconsistent
    #[error("Invalid configuration in {path}: {message}")]
    ConfigInvalid { path: PathBuf, message: String },

    /// A package named by settings is absent from the manifest
    #[error("Package not found in manifest: {name}")]
    PackageNotFound { name: String },

    /// A single read or write against a package log failed
    #[error("Store I/O error in package {package} ({path}): {source}")]
    StoreIo {
        package: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Too many lines of a package log could not be decoded
    #[error("Corrupt package log {path}: {corrupt} of {total} lines unreadable")]
    CorruptLog {
        path: PathBuf,
        corrupt: usize,
        total: usize,
    },

    /// A document addressed by id is not present in its package
    #[error("Document {id} not found in package {package}")]
    DocumentNotFound { package: String, id: String },

    /// A document lacks a field the operation requires
    #[error("Document {document} is missing field {field}")]
    MissingField { document: String, field: String },

    /// A document payload does not have the expected shape
    #[error("Invalid payload in {document}: {message}")]
    InvalidPayload { document: String, message: String },

    /// An authored source file could not be read or parsed
    #[error("Source error at {path}: {message}")]
    Source { path: PathBuf, message: String },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from compendium-fs
    #[error(transparent)]
    Fs(#[from] compendium_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error belongs to the fatal configuration class.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound { .. } | Self::ConfigInvalid { .. } | Self::PackageNotFound { .. }
        )
    }

    pub(crate) fn store_io(
        package: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::StoreIo {
            package: package.into(),
            path: path.into(),
            source,
        }
    }

    /// Map a configuration-file error from compendium-fs into the config class.
    pub(crate) fn from_config_fs(path: impl Into<PathBuf>, err: compendium_fs::Error) -> Self {
        let path = path.into();
        match err {
            compendium_fs::Error::NotFound { .. } => Self::ConfigNotFound { path },
            other => Self::ConfigInvalid {
                path,
                message: other.to_string(),
            },
        }
    }
}
