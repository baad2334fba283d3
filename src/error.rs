//! Error types for Sift
//!
//! Per-item scan failures are attributed to the path that caused them and
//! collected into a [`ScanError`] so a partial catalog is never lost.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in Sift
#[derive(Debug, Error)]
pub enum SiftError {
    /// A catalog directory exists but could not be listed
    #[error("read dir {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A descriptor file could not be read or decoded
    #[error("parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A bundle root could not be walked
    #[error("walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// Bundle metadata could not be read
    #[error("parse bundle {}: {message}", path.display())]
    BundleMetadata { path: PathBuf, message: String },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Launch errors (failed to start app)
    #[error("Launch error: {0}")]
    Launch(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("Config parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl SiftError {
    /// Whether this failure only means a directory is absent on this system.
    pub fn is_not_found(&self) -> bool {
        match self {
            SiftError::ReadDir { source, .. } | SiftError::Io(source) => {
                source.kind() == std::io::ErrorKind::NotFound
            }
            SiftError::Walk { source, .. } => source
                .io_error()
                .is_some_and(|e| e.kind() == std::io::ErrorKind::NotFound),
            _ => false,
        }
    }
}

/// Result type alias for Sift operations
pub type SiftResult<T> = Result<T, SiftError>;

/// Every per-item failure from one catalog build.
#[derive(Debug, Default)]
pub struct ScanError {
    failures: Vec<SiftError>,
}

impl ScanError {
    /// Combine failures, dropping "not found" noise. Returns `None` when
    /// nothing worth reporting remains.
    pub fn from_failures(failures: impl IntoIterator<Item = SiftError>) -> Option<Self> {
        let failures: Vec<SiftError> = failures
            .into_iter()
            .filter(|e| !e.is_not_found())
            .collect();

        if failures.is_empty() {
            None
        } else {
            Some(Self { failures })
        }
    }

    pub fn failures(&self) -> &[SiftError] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", failure)?;
        }
        Ok(())
    }
}

impl std::error::Error for ScanError {}
