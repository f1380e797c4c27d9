//! Remote entity registry.
//!
//! Maps server-assigned entity ids to renderable proxies. A proxy is
//! created the first time its id appears in a snapshot by instantiating
//! the shared tank mesh template; every later mention overwrites its
//! transform in place. Proxies are never removed: an id that stops
//! appearing in snapshots keeps its last state (see DESIGN.md for the open
//! question around pruning).

use std::{
    collections::HashMap,
    sync::Arc,
};

use tanks_shared::{
    assets::Texture,
    net::{EntityId, WorldSnapshot},
    scene::{Mesh, Model},
};
use tracing::debug;

/// Part id of the turret inside the tank mesh.
pub const TURRET_PART: &str = "Turret_2";

pub struct RemoteEntityRegistry {
    template: Arc<Mesh>,
    textures: HashMap<String, Arc<Texture>>,
    proxies: HashMap<EntityId, Model>,
}

impl RemoteEntityRegistry {
    pub fn new(template: Arc<Mesh>, textures: HashMap<String, Arc<Texture>>) -> Self {
        Self {
            template,
            textures,
            proxies: HashMap::new(),
        }
    }

    /// Reconciles one authoritative snapshot into the proxy set.
    ///
    /// The server's 2D `pos.y` maps to render `z`; render `y` (height) is
    /// never server-driven and keeps its creation-time value. The turret
    /// rotation snaps straight to the snapshot value.
    pub fn apply_snapshot(&mut self, snapshot: &WorldSnapshot) {
        for tank in &snapshot.tanks {
            let proxy = self.proxies.entry(tank.id.clone()).or_insert_with(|| {
                debug!(id = %tank.id.0, "First sight of entity, creating proxy");
                Model::instantiate(&self.template, self.textures.clone())
            });

            proxy.position.x = tank.pos.x;
            proxy.position.z = tank.pos.y;
            proxy.rotation_y = tank.dir;

            if let Some(rotation) = proxy.part_rotation_mut(TURRET_PART) {
                rotation.y = tank.tur_dir;
            }
        }
    }

    pub fn get(&self, id: &EntityId) -> Option<&Model> {
        self.proxies.get(id)
    }

    pub fn get_mut(&mut self, id: &EntityId) -> Option<&mut Model> {
        self.proxies.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, &Model)> {
        self.proxies.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tanks_shared::{
        assets::{BoundBox, BoundSphere, MeshData, PartInfo},
        math::Vec2,
        net::TankState,
    };

    fn template() -> Arc<Mesh> {
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
                    id: TURRET_PART.to_string(),
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

    fn snapshot(x: f32, y: f32) -> WorldSnapshot {
        WorldSnapshot {
            tanks: vec![TankState {
                id: EntityId::new("A"),
                pos: Vec2::new(x, y),
                dir: 0.5,
                tur_dir: 1.0,
            }],
        }
    }

    #[test]
    fn first_sight_creates_exactly_one_proxy() {
        let mut registry = RemoteEntityRegistry::new(template(), HashMap::new());
        registry.apply_snapshot(&snapshot(1.0, 2.0));
        assert_eq!(registry.len(), 1);

        let proxy = registry.get(&EntityId::new("A")).unwrap();
        assert_eq!(proxy.position.x, 1.0);
        assert_eq!(proxy.position.z, 2.0);
        assert_eq!(proxy.rotation_y, 0.5);
        assert_eq!(proxy.part_rotation(TURRET_PART).unwrap().y, 1.0);
    }

    #[test]
    fn apply_snapshot_is_idempotent() {
        let mut registry = RemoteEntityRegistry::new(template(), HashMap::new());
        let snap = snapshot(1.0, 2.0);
        registry.apply_snapshot(&snap);
        let first = registry.get(&EntityId::new("A")).unwrap().position;

        registry.apply_snapshot(&snap);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&EntityId::new("A")).unwrap().position, first);
    }

    #[test]
    fn later_snapshots_update_in_place() {
        let mut registry = RemoteEntityRegistry::new(template(), HashMap::new());
        registry.apply_snapshot(&snapshot(1.0, 2.0));
        registry.apply_snapshot(&snapshot(5.0, -3.0));

        assert_eq!(registry.len(), 1);
        let proxy = registry.get(&EntityId::new("A")).unwrap();
        assert_eq!(proxy.position.x, 5.0);
        assert_eq!(proxy.position.z, -3.0);
    }

    #[test]
    fn height_is_never_server_driven() {
        let mut registry = RemoteEntityRegistry::new(template(), HashMap::new());
        registry.apply_snapshot(&snapshot(1.0, 2.0));
        registry
            .get_mut(&EntityId::new("A"))
            .unwrap()
            .position
            .y = 0.75;

        registry.apply_snapshot(&snapshot(9.0, 9.0));
        assert_eq!(registry.get(&EntityId::new("A")).unwrap().position.y, 0.75);
    }

    #[test]
    fn absent_ids_are_kept() {
        let mut registry = RemoteEntityRegistry::new(template(), HashMap::new());
        registry.apply_snapshot(&snapshot(1.0, 2.0));
        registry.apply_snapshot(&WorldSnapshot { tanks: vec![] });
        assert_eq!(registry.len(), 1);
    }
}
