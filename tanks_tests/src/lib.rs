//! Shared fixtures for the integration tests.

use std::collections::HashMap;
use std::sync::Arc;

use tanks_shared::{
    assets::{BoundBox, BoundSphere, MeshData, ModelAssets, PartInfo},
    math::Vec2,
    net::{EntityId, Msg, TankState, WorldSnapshot},
};

/// A minimal tank mesh with a static hull and a rotatable turret, matching
/// the converter's output shape.
pub fn tank_assets() -> ModelAssets {
    let mesh = Arc::new(MeshData {
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
    ModelAssets {
        mesh,
        textures: HashMap::new(),
    }
}

/// A one-tank world snapshot for entity id `"A"`.
pub fn world_msg(x: f32, y: f32) -> Msg {
    Msg::World(WorldSnapshot {
        tanks: vec![TankState {
            id: EntityId::new("A"),
            pos: Vec2::new(x, y),
            dir: 0.5,
            tur_dir: 1.0,
        }],
    })
}
