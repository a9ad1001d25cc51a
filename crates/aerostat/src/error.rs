//! Error taxonomy for the preloader.
//!
//! Only configuration errors are fatal, and only at startup. Everything
//! raised while frames are running is logged and recovered from.

use std::path::PathBuf;

use aerostat_rendering::{AssetError, FontError};
use thiserror::Error;

/// Errors surfaced by the preloader crate.
#[derive(Debug, Error)]
pub enum PreloaderError {
    /// The configuration file is not valid TOML for [`crate::PreloaderConfig`].
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// A file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The text font could not be loaded in time or parsed.
    #[error(transparent)]
    Font(#[from] FontError),

    /// A model failed to load.
    #[error(transparent)]
    Asset(#[from] AssetError),
}

/// Result alias for preloader operations.
pub type PreloaderResult<T> = Result<T, PreloaderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_timeout_message() {
        let err = PreloaderError::from(FontError::Timeout { waited_ms: 1800 });
        assert_eq!(err.to_string(), "font not ready after 1800 ms");
    }

    #[test]
    fn test_config_error_wraps_toml() {
        let err = toml::from_str::<toml::Table>("= nope").unwrap_err();
        let err = PreloaderError::from(err);
        assert!(err.to_string().starts_with("invalid configuration"));
    }
}
