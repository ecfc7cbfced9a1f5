//! Model library: resolves model names to files under a models directory
//! and tags each with a content hash.
//!
//! A model name is looked up as-is first, then with each known extension.
//! Loading the same name twice returns the cached id without touching disk.
//! glTF files additionally have their mesh names read from the JSON.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Extensions tried, in order, when a bare model name does not exist.
pub const MODEL_EXTENSIONS: &[&str] = &["egg", "bam", "gltf", "glb"];

/// Content-addressed model ID computed from the file bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModelId(pub u64);

/// A registered model file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    pub name: String,
    /// Byte-identical files under different names share this id.
    pub id: ModelId,
    pub path: PathBuf,
    pub byte_len: u64,
    /// Mesh names, when the format exposes them (glTF only). Unnamed meshes
    /// are called `mesh_<index>`.
    pub meshes: Vec<String>,
}

/// Errors from model loading.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("model '{name}' not found under {}", dir.display())]
    NotFound { name: String, dir: PathBuf },
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("glTF parse error in {}: {message}", path.display())]
    GltfParse { path: PathBuf, message: String },
}

/// Registry of loaded models rooted at a models directory, one record per
/// model name.
#[derive(Debug, Clone)]
pub struct ModelLibrary {
    root: PathBuf,
    models: BTreeMap<String, Model>,
}

impl ModelLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            models: BTreeMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load `name` from the models directory, or return the cached id.
    pub fn load(&mut self, name: &str) -> Result<ModelId, AssetError> {
        if let Some(model) = self.models.get(name) {
            return Ok(model.id);
        }

        let path = self.resolve(name).ok_or_else(|| AssetError::NotFound {
            name: name.to_string(),
            dir: self.root.clone(),
        })?;
        let bytes = std::fs::read(&path).map_err(|source| AssetError::Io {
            path: path.clone(),
            source,
        })?;

        let meshes = if path.extension().is_some_and(|e| e == "gltf") {
            gltf_mesh_names(&path, &bytes)?
        } else {
            Vec::new()
        };

        let id = content_hash(&bytes);
        tracing::info!(model = name, path = %path.display(), id = id.0, "model loaded");
        self.models.insert(
            name.to_string(),
            Model {
                name: name.to_string(),
                id,
                path,
                byte_len: bytes.len() as u64,
                meshes,
            },
        );
        Ok(id)
    }

    fn resolve(&self, name: &str) -> Option<PathBuf> {
        let bare = self.root.join(name);
        if bare.is_file() {
            return Some(bare);
        }
        MODEL_EXTENSIONS
            .iter()
            .map(|ext| self.root.join(format!("{name}.{ext}")))
            .find(|p| p.is_file())
    }

    pub fn get(&self, name: &str) -> Option<&Model> {
        self.models.get(name)
    }

    pub fn id_of(&self, name: &str) -> Option<ModelId> {
        self.models.get(name).map(|m| m.id)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

fn content_hash(bytes: &[u8]) -> ModelId {
    let digest = Sha256::digest(bytes);
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    ModelId(u64::from_le_bytes(prefix))
}

fn gltf_mesh_names(path: &Path, bytes: &[u8]) -> Result<Vec<String>, AssetError> {
    let json: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| AssetError::GltfParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    let names = json
        .get("meshes")
        .and_then(|m| m.as_array())
        .map(|meshes| {
            meshes
                .iter()
                .enumerate()
                .map(|(i, mesh)| {
                    mesh.get("name")
                        .and_then(|n| n.as_str())
                        .map_or_else(|| format!("mesh_{i}"), str::to_string)
                })
                .collect()
        })
        .unwrap_or_default();
    Ok(names)
}
