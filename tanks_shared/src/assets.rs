//! Asset model, loading, and caching.
//!
//! The renderer consumes assets; this module only defines the data contract
//! and gets the bytes off disk. Geometry arrives as the converter's JSON
//! shape (`models/<name>.json`); each referenced material resolves to a
//! texture image named `<model>__<material>.jpg` (or `.png` for alpha
//! materials). Sounds and heightmaps are opaque byte blobs.
//!
//! Caching is an explicit [`AssetCache`] owned by the caller; there is no
//! module-level shared state.

use std::{collections::HashMap, path::PathBuf, sync::Arc};

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// One draw group inside a mesh, as emitted by the converter.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PartInfo {
    pub id: String,
    pub material: String,
    /// Triangle offset into the index buffer.
    pub offset: u32,
    /// Triangle count.
    pub size: u32,
    /// Present on parts that carry an independent transform, e.g.
    /// `"rotation"` on a turret.
    #[serde(default)]
    pub relation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BoundBox {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BoundSphere {
    pub center: [f32; 3],
    pub radius: f32,
}

/// Geometry for one model, deduplicated and triangulated offline.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MeshData {
    pub vertices: Vec<f32>,
    pub uvs: Vec<f32>,
    pub normals: Vec<f32>,
    pub polygons: Vec<u16>,
    pub groups: Vec<PartInfo>,
    #[serde(rename = "boundBox")]
    pub bound_box: BoundBox,
    #[serde(rename = "boundSphere")]
    pub bound_sphere: BoundSphere,
}

impl MeshData {
    pub fn from_json(bytes: &[u8]) -> anyhow::Result<Self> {
        serde_json::from_slice(bytes).context("parse mesh json")
    }
}

/// Texture addressing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    #[default]
    Clamp,
    Repeat,
}

/// Structured texture options (no dynamic shape objects).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextureOptions {
    pub wrap: WrapMode,
    /// Texture participates in alpha testing (e.g. foliage).
    pub alpha: bool,
}

/// Undecoded texture image; decoding/upload belongs to the renderer.
#[derive(Debug, Clone)]
pub struct Texture {
    pub name: String,
    pub options: TextureOptions,
    pub bytes: Vec<u8>,
}

/// Undecoded audio clip.
#[derive(Debug, Clone)]
pub struct SoundClip {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Abstract byte source, so tests and tools can swap the filesystem out.
#[async_trait]
pub trait AssetSource: Send + Sync {
    async fn read(&self, rel_path: &str) -> anyhow::Result<Vec<u8>>;
}

/// Filesystem-backed asset source rooted at a directory.
pub struct FsAssetSource {
    root: PathBuf,
}

impl FsAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl AssetSource for FsAssetSource {
    async fn read(&self, rel_path: &str) -> anyhow::Result<Vec<u8>> {
        let path = self.root.join(rel_path);
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("read asset {}", path.display()))
    }
}

/// Mesh geometry plus its per-material textures.
#[derive(Debug, Clone)]
pub struct ModelAssets {
    pub mesh: Arc<MeshData>,
    pub textures: HashMap<String, Arc<Texture>>,
}

/// Loads `models/<name>.json`.
pub async fn load_mesh(source: &dyn AssetSource, name: &str) -> anyhow::Result<Arc<MeshData>> {
    let bytes = source.read(&format!("models/{name}.json")).await?;
    let mesh = Arc::new(MeshData::from_json(&bytes)?);
    debug!(
        model = name,
        groups = mesh.groups.len(),
        vertices = mesh.vertices.len() / 3,
        "Mesh loaded"
    );
    Ok(mesh)
}

/// Loads `textures/<file_name>`.
pub async fn load_texture(
    source: &dyn AssetSource,
    file_name: &str,
    options: TextureOptions,
) -> anyhow::Result<Arc<Texture>> {
    let bytes = source.read(&format!("textures/{file_name}")).await?;
    debug!(texture = file_name, bytes = bytes.len(), "Texture loaded");
    Ok(Arc::new(Texture {
        name: file_name.to_string(),
        options,
        bytes,
    }))
}

/// Loads `sounds/<file_name>`.
pub async fn load_sound(
    source: &dyn AssetSource,
    file_name: &str,
) -> anyhow::Result<Arc<SoundClip>> {
    let bytes = source.read(&format!("sounds/{file_name}")).await?;
    Ok(Arc::new(SoundClip {
        name: file_name.to_string(),
        bytes,
    }))
}

/// Loads a mesh and one texture per referenced material, using the
/// `<model>__<material>.<jpg|png>` naming convention. Materials listed in
/// `alpha_materials` resolve to `.png` with alpha testing enabled.
pub async fn load_model(
    source: &dyn AssetSource,
    name: &str,
    alpha_materials: &[&str],
) -> anyhow::Result<ModelAssets> {
    let mesh = load_mesh(source, name).await?;

    let mut textures = HashMap::new();
    for group in &mesh.groups {
        if textures.contains_key(&group.material) {
            continue;
        }
        let alpha = alpha_materials.contains(&group.material.as_str());
        let ext = if alpha { "png" } else { "jpg" };
        let file_name = format!("{name}__{}.{ext}", group.material);
        let options = TextureOptions {
            wrap: WrapMode::Clamp,
            alpha,
        };
        let tex = load_texture(source, &file_name, options).await?;
        textures.insert(group.material.clone(), tex);
    }

    Ok(ModelAssets { mesh, textures })
}

/// Explicit cache keyed by asset name. Owned by whoever loads; shared
/// entries are handed out as `Arc`s.
#[derive(Default)]
pub struct AssetCache {
    meshes: HashMap<String, Arc<MeshData>>,
    textures: HashMap<String, Arc<Texture>>,
    sounds: HashMap<String, Arc<SoundClip>>,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached variant of [`load_mesh`].
    pub async fn mesh(
        &mut self,
        source: &dyn AssetSource,
        name: &str,
    ) -> anyhow::Result<Arc<MeshData>> {
        if let Some(mesh) = self.meshes.get(name) {
            return Ok(mesh.clone());
        }
        let mesh = load_mesh(source, name).await?;
        self.meshes.insert(name.to_string(), mesh.clone());
        Ok(mesh)
    }

    /// Cached variant of [`load_texture`].
    pub async fn texture(
        &mut self,
        source: &dyn AssetSource,
        file_name: &str,
        options: TextureOptions,
    ) -> anyhow::Result<Arc<Texture>> {
        if let Some(tex) = self.textures.get(file_name) {
            return Ok(tex.clone());
        }
        let tex = load_texture(source, file_name, options).await?;
        self.textures.insert(file_name.to_string(), tex.clone());
        Ok(tex)
    }

    /// Cached variant of [`load_sound`].
    pub async fn sound(
        &mut self,
        source: &dyn AssetSource,
        file_name: &str,
    ) -> anyhow::Result<Arc<SoundClip>> {
        if let Some(clip) = self.sounds.get(file_name) {
            return Ok(clip.clone());
        }
        let clip = load_sound(source, file_name).await?;
        self.sounds.insert(file_name.to_string(), clip.clone());
        Ok(clip)
    }

    /// Cached variant of [`load_model`]: memoizes the mesh and every
    /// texture the naming convention resolves.
    pub async fn model(
        &mut self,
        source: &dyn AssetSource,
        name: &str,
        alpha_materials: &[&str],
    ) -> anyhow::Result<ModelAssets> {
        let mesh = self.mesh(source, name).await?;

        let mut textures = HashMap::new();
        for group in &mesh.groups {
            if textures.contains_key(&group.material) {
                continue;
            }
            let alpha = alpha_materials.contains(&group.material.as_str());
            let ext = if alpha { "png" } else { "jpg" };
            let file_name = format!("{name}__{}.{ext}", group.material);
            let options = TextureOptions {
                wrap: WrapMode::Clamp,
                alpha,
            };
            let tex = self.texture(source, &file_name, options).await?;
            textures.insert(group.material.clone(), tex);
        }

        Ok(ModelAssets { mesh, textures })
    }
}
