//! Font readiness.
//!
//! The text layer waits a short while for the real font, then samples with
//! the block fallback. The load itself keeps going for longer; if it lands
//! inside that window the text is sampled again.

use std::path::Path;
use std::time::Duration;

use aerostat_rendering::{FontError, FontdueRasterizer};

use crate::error::{PreloaderError, PreloaderResult};

/// Reads and parses a font file, giving up after `wait`.
///
/// # Errors
///
/// [`FontError::Timeout`] when the deadline passes, [`PreloaderError::Io`]
/// when the file cannot be read, [`FontError::Parse`] for a bad file.
pub async fn load_font<P: AsRef<Path>>(path: P, wait: Duration) -> PreloaderResult<FontdueRasterizer> {
    let path = path.as_ref();
    let read = async {
        let bytes = tokio::fs::read(path).await.map_err(|source| PreloaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok::<_, PreloaderError>(FontdueRasterizer::from_bytes(&bytes)?)
    };

    match tokio::time::timeout(wait, read).await {
        Ok(result) => {
            if result.is_ok() {
                tracing::info!(path = %path.display(), "Font ready");
            }
            result
        }
        Err(_) => Err(FontError::Timeout {
            waited_ms: wait.as_millis() as u64,
        }
        .into()),
    }
}

/// The gate the text layer consults before its first sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontGate {
    /// Not started yet.
    Idle,
    /// Waiting for the font until `deadline`.
    Waiting {
        /// Clock time after which the fallback is used.
        deadline: Duration,
    },
    /// Sampled with the fallback; resample when the font arrives.
    Fallback,
    /// Sampled with the real font.
    Ready,
}

impl FontGate {
    /// True while the text must not be shown yet.
    #[must_use]
    pub fn is_waiting(&self, now: Duration) -> bool {
        matches!(self, Self::Waiting { deadline } if now < *deadline)
    }

    /// True once the text has been sampled, by either rasterizer.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Fallback | Self::Ready)
    }
}
