//! Binary glTF (GLB) loader.
//!
//! ## GLB Format Reference
//!
//! ```text
//! GLB File Structure:
//! ├── "glTF" (4 bytes) - Magic number
//! ├── Version (4 bytes) - Container version (2)
//! ├── Length (4 bytes) - Total file length
//! ├── Chunk 0 - JSON (required)
//! │   ├── Length (4 bytes)
//! │   ├── Type   (4 bytes) - 0x4E4F534A "JSON"
//! │   └── Data   (padded to 4 bytes)
//! └── Chunk 1 - BIN (optional)
//!     ├── Length (4 bytes)
//!     ├── Type   (4 bytes) - 0x004E4942 "BIN\0"
//!     └── Data
//! ```
//!
//! Only the document structure is inspected; geometry stays with the GPU
//! backend.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::model::{AssetError, AssetLoader, AssetResult, LoadedModel, MaterialOverride, ModelSource};

/// GLB file magic number.
const GLB_MAGIC: [u8; 4] = *b"glTF";

/// Supported GLB container version.
const GLB_VERSION: u32 = 2;

/// JSON chunk type.
const CHUNK_JSON: u32 = 0x4E4F_534A;

/// Binary chunk type.
const CHUNK_BIN: u32 = 0x004E_4942;

/// Fixed container header: magic, version, length.
const HEADER_LEN: usize = 12;

/// The glTF extension for Draco mesh compression.
pub const DRACO_EXTENSION: &str = "KHR_draco_mesh_compression";

/// Which Draco decoder build to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecoderKind {
    /// WebAssembly decoder.
    #[default]
    Wasm,
    /// Pure JavaScript decoder.
    Js,
}

/// Draco decoder location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Directory or URL of the decoder; `None` disables Draco.
    pub decoder_path: Option<String>,
    /// Decoder build.
    pub kind: DecoderKind,
}

impl DecoderConfig {
    /// True if Draco assets can be decoded.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.decoder_path.as_deref().is_some_and(|p| !p.is_empty())
    }
}

/// What the loader learned about a GLB file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlbSummary {
    /// `asset.version` from the JSON chunk.
    pub gltf_version: String,
    /// Length of the JSON chunk.
    pub json_len: usize,
    /// Length of the BIN chunk, 0 if absent.
    pub bin_len: usize,
    /// Meshes in the document.
    pub mesh_count: usize,
    /// Nodes in the document.
    pub node_count: usize,
    /// Materials in the document.
    pub material_count: usize,
    /// Materials with `alphaMode: BLEND`.
    pub blended_materials: usize,
    /// `extensionsRequired`.
    pub extensions_required: Vec<String>,
}

impl GlbSummary {
    /// True if the document cannot be read without a Draco decoder.
    #[must_use]
    pub fn requires_draco(&self) -> bool {
        self.extensions_required.iter().any(|e| e == DRACO_EXTENSION)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GltfDocument {
    asset: GltfAsset,
    meshes: Vec<serde_json::Value>,
    nodes: Vec<serde_json::Value>,
    materials: Vec<GltfMaterial>,
    extensions_required: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GltfAsset {
    version: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GltfMaterial {
    alpha_mode: Option<String>,
}

fn read_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let raw = bytes.get(offset..offset + 4)?;
    Some(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
}

/// Validates a GLB container and summarizes its JSON document.
///
/// # Errors
///
/// Returns [`AssetError::InvalidContainer`], [`AssetError::UnsupportedVersion`],
/// [`AssetError::MissingChunk`] or [`AssetError::InvalidJson`].
pub fn parse_glb(bytes: &[u8]) -> AssetResult<GlbSummary> {
    if bytes.len() < HEADER_LEN {
        return Err(AssetError::InvalidContainer(format!(
            "{} bytes is shorter than the header",
            bytes.len()
        )));
    }
    if bytes[0..4] != GLB_MAGIC {
        return Err(AssetError::InvalidContainer(format!(
            "Expected 'glTF', got '{}'",
            String::from_utf8_lossy(&bytes[0..4])
        )));
    }

    let version = read_u32(bytes, 4).unwrap_or_default();
    if version != GLB_VERSION {
        return Err(AssetError::UnsupportedVersion(version));
    }

    let declared = read_u32(bytes, 8).unwrap_or_default() as usize;
    if declared > bytes.len() {
        return Err(AssetError::InvalidContainer(format!(
            "declared length {declared} exceeds {} bytes",
            bytes.len()
        )));
    }
    let body = &bytes[..declared.max(HEADER_LEN)];

    let mut offset = HEADER_LEN;
    let mut json: Option<&[u8]> = None;
    let mut bin_len = 0;
    while offset + 8 <= body.len() {
        let (Some(length), Some(kind)) = (read_u32(body, offset), read_u32(body, offset + 4)) else {
            break;
        };
        let start = offset + 8;
        let end = start + length as usize;
        let Some(data) = body.get(start..end) else {
            return Err(AssetError::InvalidContainer(format!(
                "chunk at {offset} overruns the file"
            )));
        };
        match kind {
            CHUNK_JSON if json.is_none() => json = Some(data),
            CHUNK_BIN => bin_len = data.len(),
            // Unknown chunks must be ignored.
            _ => {}
        }
        // Chunks are 4-byte aligned.
        offset = (end + 3) & !3;
    }

    let json = json.ok_or(AssetError::MissingChunk("JSON"))?;
    let document: GltfDocument = serde_json::from_slice(json)?;

    Ok(GlbSummary {
        gltf_version: document.asset.version,
        json_len: json.len(),
        bin_len,
        mesh_count: document.meshes.len(),
        node_count: document.nodes.len(),
        material_count: document.materials.len(),
        blended_materials: document
            .materials
            .iter()
            .filter(|m| m.alpha_mode.as_deref() == Some("BLEND"))
            .count(),
        extensions_required: document.extensions_required,
    })
}

/// Loads GLB files relative to an asset root.
#[derive(Debug, Clone)]
pub struct GlbAssetLoader {
    root: PathBuf,
    decoder: DecoderConfig,
}

impl GlbAssetLoader {
    /// Creates a loader rooted at `root`.
    #[must_use]
    pub fn new<P: AsRef<Path>>(root: P, decoder: DecoderConfig) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            decoder,
        }
    }

    /// Asset root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Parses and checks already-read bytes.
    ///
    /// # Errors
    ///
    /// Container errors from [`parse_glb`], or [`AssetError::CodecUnavailable`]
    /// for Draco assets without a configured decoder.
    pub fn load_from_bytes(&self, path: &str, bytes: &[u8]) -> AssetResult<LoadedModel> {
        let summary = parse_glb(bytes)?;
        if summary.requires_draco() && !self.decoder.is_available() {
            return Err(AssetError::CodecUnavailable {
                extension: DRACO_EXTENSION.to_string(),
            });
        }
        let material_override = (summary.blended_materials > 0).then_some(MaterialOverride::CUTOUT);

        tracing::debug!(
            path,
            meshes = summary.mesh_count,
            materials = summary.material_count,
            blended = summary.blended_materials,
            "Loaded GLB"
        );
        Ok(LoadedModel {
            path: path.to_string(),
            source: ModelSource::Gltf(summary),
            material_override,
        })
    }
}

impl AssetLoader for GlbAssetLoader {
    async fn load(&self, path: &str) -> AssetResult<LoadedModel> {
        let full = self.root.join(path);
        let bytes = tokio::fs::read(&full).await.map_err(|source| AssetError::Io {
            path: full.display().to_string(),
            source,
        })?;
        self.load_from_bytes(path, &bytes)
    }
}
