//! Loaded model handles and the loader seam.

use std::future::Future;

use thiserror::Error;

use super::glb::GlbSummary;
use super::placeholder::PlaceholderBalloon;

/// Model loading failures.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Not a binary glTF container.
    #[error("invalid GLB container: {0}")]
    InvalidContainer(String),
    /// Container version other than 2.
    #[error("unsupported GLB version {0}")]
    UnsupportedVersion(u32),
    /// A required chunk is absent.
    #[error("missing {0} chunk")]
    MissingChunk(&'static str),
    /// The JSON chunk does not parse.
    #[error("invalid glTF JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    /// The asset needs a decoder that is not configured.
    #[error("asset requires {extension} but no decoder is configured")]
    CodecUnavailable {
        /// The required glTF extension.
        extension: String,
    },
}

/// Result alias for asset operations.
pub type AssetResult<T> = Result<T, AssetError>;

/// Material tweak applied to every mesh of a loaded model.
///
/// Blended materials sort badly against each other, so they are turned into
/// alpha-tested cutouts that write depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialOverride {
    /// Fragments below this alpha are discarded.
    pub alpha_test: f32,
    /// Write depth even though the source material was transparent.
    pub depth_write: bool,
}

impl MaterialOverride {
    /// The cutout override used for transparent balloon materials.
    pub const CUTOUT: Self = Self {
        alpha_test: 0.5,
        depth_write: true,
    };
}

/// What a model is backed by.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelSource {
    /// A parsed binary glTF file.
    Gltf(GlbSummary),
    /// A procedural stand-in.
    Placeholder(PlaceholderBalloon),
}

/// A model ready to place in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedModel {
    /// Requested path, or a label for procedural models.
    pub path: String,
    /// Backing data.
    pub source: ModelSource,
    /// Material tweak to apply, if any.
    pub material_override: Option<MaterialOverride>,
}

impl LoadedModel {
    /// Wraps a procedural placeholder.
    #[must_use]
    pub fn placeholder(label: impl Into<String>, balloon: PlaceholderBalloon) -> Self {
        Self {
            path: label.into(),
            source: ModelSource::Placeholder(balloon),
            material_override: None,
        }
    }

    /// True for procedural stand-ins.
    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        matches!(self.source, ModelSource::Placeholder(_))
    }
}

/// Asynchronous model source.
pub trait AssetLoader: Send + Sync {
    /// Loads the model at `path`.
    fn load(&self, path: &str) -> impl Future<Output = AssetResult<LoadedModel>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_keeps_source() {
        let err = AssetError::Io {
            path: "hab.glb".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().contains("hab.glb"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_placeholder_model() {
        let model = LoadedModel::placeholder("placeholder-0", PlaceholderBalloon::intro());
        assert!(model.is_placeholder());
        assert!(model.material_override.is_none());
    }
}
