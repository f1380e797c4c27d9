//! Renderable scene proxies.
//!
//! A [`Mesh`] is a shared, immutable geometry template; a [`Model`] is one
//! placed instance with its own transform. Mesh parts are a tagged variant:
//! `Static` parts are shared between every instance, `Rotatable` parts own
//! a per-instance rotation and are duplicated when a model is instantiated.
//! Vertex/uv/normal/index data is never copied.

use std::{collections::HashMap, sync::Arc};

use crate::{
    assets::{MeshData, ModelAssets, Texture},
    math::Vec3,
};

/// Draw-range geometry of one part, shared across instances.
#[derive(Debug, Clone, PartialEq)]
pub struct PartGeometry {
    pub id: String,
    pub material: String,
    pub offset: u32,
    pub size: u32,
}

/// One part of a model. Only `Rotatable` parts carry per-instance state.
#[derive(Debug, Clone)]
pub enum MeshPart {
    Static(Arc<PartGeometry>),
    Rotatable {
        geometry: Arc<PartGeometry>,
        rotation: Vec3,
    },
}

impl MeshPart {
    pub fn id(&self) -> &str {
        &self.geometry().id
    }

    pub fn geometry(&self) -> &Arc<PartGeometry> {
        match self {
            MeshPart::Static(g) => g,
            MeshPart::Rotatable { geometry, .. } => geometry,
        }
    }

    /// Produces the per-instance copy of this part: shared for `Static`,
    /// duplicated with a fresh rotation for `Rotatable`.
    fn instantiate(&self) -> MeshPart {
        match self {
            MeshPart::Static(g) => MeshPart::Static(g.clone()),
            MeshPart::Rotatable { geometry, .. } => MeshPart::Rotatable {
                geometry: geometry.clone(),
                rotation: Vec3::ZERO,
            },
        }
    }
}

/// Immutable mesh template: geometry plus the part layout.
#[derive(Debug)]
pub struct Mesh {
    pub data: Arc<MeshData>,
    parts: Vec<MeshPart>,
}

impl Mesh {
    pub fn from_data(data: Arc<MeshData>) -> Self {
        let parts = data
            .groups
            .iter()
            .map(|group| {
                let geometry = Arc::new(PartGeometry {
                    id: group.id.clone(),
                    material: group.material.clone(),
                    offset: group.offset,
                    size: group.size,
                });
                let rotatable = group
                    .relation
                    .as_deref()
                    .is_some_and(|r| r.contains("rotation"));
                if rotatable {
                    MeshPart::Rotatable {
                        geometry,
                        rotation: Vec3::ZERO,
                    }
                } else {
                    MeshPart::Static(geometry)
                }
            })
            .collect();

        Self { data, parts }
    }

    pub fn parts(&self) -> &[MeshPart] {
        &self.parts
    }
}

/// One placed, renderable instance of a mesh.
#[derive(Debug, Clone)]
pub struct Model {
    pub mesh: Arc<Mesh>,
    pub textures: HashMap<String, Arc<Texture>>,
    pub parts: Vec<MeshPart>,
    pub position: Vec3,
    pub rotation_y: f32,
    pub scale: f32,
}

impl Model {
    /// Creates an instance sharing the mesh geometry. Only `Rotatable`
    /// parts are duplicated.
    pub fn instantiate(mesh: &Arc<Mesh>, textures: HashMap<String, Arc<Texture>>) -> Self {
        let parts = mesh.parts().iter().map(MeshPart::instantiate).collect();
        Self {
            mesh: mesh.clone(),
            textures,
            parts,
            position: Vec3::ZERO,
            rotation_y: 0.0,
            scale: 1.0,
        }
    }

    pub fn from_assets(assets: &ModelAssets) -> Self {
        let mesh = Arc::new(Mesh::from_data(assets.mesh.clone()));
        Self::instantiate(&mesh, assets.textures.clone())
    }

    pub fn part(&self, id: &str) -> Option<&MeshPart> {
        self.parts.iter().find(|p| p.id() == id)
    }

    /// Mutable rotation of a named part, if that part is `Rotatable`.
    pub fn part_rotation_mut(&mut self, id: &str) -> Option<&mut Vec3> {
        self.parts.iter_mut().find_map(|p| match p {
            MeshPart::Rotatable { geometry, rotation } if geometry.id == id => Some(rotation),
            _ => None,
        })
    }

    pub fn part_rotation(&self, id: &str) -> Option<Vec3> {
        self.parts.iter().find_map(|p| match p {
            MeshPart::Rotatable { geometry, rotation } if geometry.id == id => Some(*rotation),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{BoundBox, BoundSphere, PartInfo};

    fn tank_mesh() -> Arc<Mesh> {
        let data = Arc::new(MeshData {
            vertices: vec![0.0; 9],
            uvs: vec![0.0; 6],
            normals: vec![0.0; 9],
            polygons: vec![0, 1, 2],
            groups: vec![
                PartInfo {
                    id: "Hull".to_string(),
                    material: "camo".to_string(),
                    offset: 0,
                    size: 1,
                    relation: None,
                },
                PartInfo {
                    id: "Turret_2".to_string(),
                    material: "camo".to_string(),
                    offset: 1,
                    size: 1,
                    relation: Some("rotation".to_string()),
                },
            ],
            bound_box: BoundBox {
                min: [0.0; 3],
                max: [1.0; 3],
            },
            bound_sphere: BoundSphere {
                center: [0.5; 3],
                radius: 1.0,
            },
        });
        Arc::new(Mesh::from_data(data))
    }

    #[test]
    fn relation_groups_become_rotatable() {
        let mesh = tank_mesh();
        assert!(matches!(mesh.parts()[0], MeshPart::Static(_)));
        assert!(matches!(mesh.parts()[1], MeshPart::Rotatable { .. }));
    }

    #[test]
    fn instances_share_static_parts_and_geometry() {
        let mesh = tank_mesh();
        let a = Model::instantiate(&mesh, HashMap::new());
        let b = Model::instantiate(&mesh, HashMap::new());

        assert!(Arc::ptr_eq(&a.mesh.data, &b.mesh.data));
        assert!(Arc::ptr_eq(a.parts[0].geometry(), b.parts[0].geometry()));
        // Rotatable parts still share geometry, only the transform is owned.
        assert!(Arc::ptr_eq(a.parts[1].geometry(), b.parts[1].geometry()));
    }

    #[test]
    fn rotatable_transform_is_per_instance() {
        let mesh = tank_mesh();
        let mut a = Model::instantiate(&mesh, HashMap::new());
        let b = Model::instantiate(&mesh, HashMap::new());

        a.part_rotation_mut("Turret_2").unwrap().y = 1.5;
        assert_eq!(a.part_rotation("Turret_2").unwrap().y, 1.5);
        assert_eq!(b.part_rotation("Turret_2").unwrap().y, 0.0);
    }

    #[test]
    fn static_parts_have_no_transform() {
        let mesh = tank_mesh();
        let mut model = Model::instantiate(&mesh, HashMap::new());
        assert!(model.part_rotation_mut("Hull").is_none());
        assert!(model.part("Hull").is_some());
    }
}
