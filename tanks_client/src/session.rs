//! Game session controller.
//!
//! Owns the lifecycle `Loading -> Connecting -> AwaitingFirstSnapshot ->
//! Running` and orchestrates everything per frame: advance the local
//! vehicle and/or camera, reconcile the latest world snapshot into the
//! registry, slave the turret, and (on its own wall-clock timer, driven by
//! the binary) sample input and send it.
//!
//! The session never blocks: socket polling uses short timeouts and all
//! asset loading happens before the first frame.

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use rand::Rng;
use tanks_shared::{
    assets::{
        load_mesh, load_model, load_sound, load_texture, AssetSource, MeshData, ModelAssets,
        SoundClip, Texture, TextureOptions, WrapMode,
    },
    config::GameConfig,
    math::{step_angle, Vec3},
    net::{EntityId, Msg, WorldSnapshot},
    render::RenderBackend,
    scene::{Mesh, Model},
};
use tracing::{debug, info, warn};

use crate::{
    camera::{Camera, CameraMode},
    connection::Connection,
    input::InputSampler,
    registry::{RemoteEntityRegistry, TURRET_PART},
    vehicle::{VehicleController, CAMERA_HEIGHT},
};

/// Turret chase rate toward the camera yaw, radians per millisecond.
const TURRET_TURN_RATE: f32 = 0.004;

/// Far-plane parameter handed to the camera.
const VIEW_DISTANCE: f32 = 1000.0;

/// Eye height before the first follow/drive tick positions the camera.
const EYE_HEIGHT: f32 = 1.7;

const POLL_TIMEOUT: Duration = Duration::from_millis(10);

/// Session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Assets are being fetched; any single failure aborts startup.
    Loading,
    /// Transport opening + join handshake.
    Connecting,
    /// Connected; reconciliation and the input timer stay inert until the
    /// first `world` message.
    AwaitingFirstSnapshot,
    /// Render/logic loop and the input-send timer are armed.
    Running,
}

/// Everything the session needs loaded before the first frame.
pub struct GameAssets {
    pub tank: ModelAssets,
    pub oak: Option<ModelAssets>,
    pub ground: Option<Arc<MeshData>>,
    pub skybox: Option<Arc<Texture>>,
    pub grass: Option<Arc<Texture>>,
    pub road: Option<Arc<Texture>>,
    pub heightmap: Option<Arc<Texture>>,
    pub shoot_sound: Option<Arc<SoundClip>>,
}

impl GameAssets {
    /// Issues every load concurrently and fails fast: one missing asset
    /// aborts the whole sequence.
    pub async fn load(source: &dyn AssetSource) -> anyhow::Result<Self> {
        let repeat = TextureOptions {
            wrap: WrapMode::Repeat,
            alpha: false,
        };

        let (tank, oak, ground, skybox, grass, road, heightmap, shoot_sound) = tokio::try_join!(
            load_model(source, "tank", &[]),
            load_model(source, "oak", &["blaetter"]),
            load_mesh(source, "ground"),
            load_texture(source, "skybox.jpg", TextureOptions::default()),
            load_texture(source, "grass.jpg", repeat),
            load_texture(source, "stone-road.jpg", repeat),
            load_texture(source, "terrain.jpg", TextureOptions::default()),
            load_sound(source, "tank-shoot.wav"),
        )?;

        Ok(Self {
            tank,
            oak: Some(oak),
            ground: Some(ground),
            skybox: Some(skybox),
            grass: Some(grass),
            road: Some(road),
            heightmap: Some(heightmap),
            shoot_sound: Some(shoot_sound),
        })
    }

    /// Bare-bones asset set for headless runs and tests: only the tank
    /// template.
    pub fn headless(tank: ModelAssets) -> Self {
        Self {
            tank,
            oak: None,
            ground: None,
            skybox: None,
            grass: None,
            road: None,
            heightmap: None,
            shoot_sound: None,
        }
    }
}

pub struct GameSession {
    cfg: GameConfig,
    state: SessionState,
    player_name: String,

    pub input: InputSampler,
    pub camera: Camera,
    pub registry: RemoteEntityRegistry,

    /// Locally integrated vehicle; only present in offline drive mode.
    pub vehicle: Option<VehicleController>,
    local_model: Option<Model>,
    statics: Vec<Model>,

    latest_world: Option<WorldSnapshot>,
    my_tank: Option<EntityId>,
    socket: Option<Connection>,
    shoot_sound: Option<Arc<SoundClip>>,
}

impl GameSession {
    /// Loads all assets (concurrently, fail-fast) and builds the session.
    pub async fn load(cfg: GameConfig, source: &dyn AssetSource) -> anyhow::Result<Self> {
        info!(assets_dir = %cfg.assets_dir, "Loading assets");
        let assets = GameAssets::load(source).await.context("load assets")?;
        Ok(Self::with_assets(cfg, assets))
    }

    /// Builds a session from already loaded assets.
    pub fn with_assets(cfg: GameConfig, assets: GameAssets) -> Self {
        let player_name = if cfg.player_name.is_empty() {
            let n: u32 = rand::thread_rng().gen_range(0..100_000_000);
            format!("Random_{n:08}")
        } else {
            cfg.player_name.clone()
        };

        let template = Arc::new(Mesh::from_data(assets.tank.mesh.clone()));
        let registry = RemoteEntityRegistry::new(template.clone(), assets.tank.textures.clone());

        let mode = if cfg.observer {
            CameraMode::Observer
        } else {
            CameraMode::Follow
        };
        let mut camera = Camera::new(mode, VIEW_DISTANCE);
        camera.position.y = EYE_HEIGHT;

        let mut statics = Vec::new();
        if let Some(oak) = &assets.oak {
            let mut oak = Model::from_assets(oak);
            oak.scale = 0.1;
            oak.position.z = 10.0;
            statics.push(oak);
        }

        let (state, vehicle, local_model) = if cfg.offline {
            // No network: the local integrator drives a rendered tank.
            let vehicle = VehicleController::new(Vec3::ZERO, 0.0);
            let model = Model::instantiate(&template, assets.tank.textures.clone());
            (SessionState::Running, Some(vehicle), Some(model))
        } else {
            (SessionState::Connecting, None, None)
        };

        Self {
            cfg,
            state,
            player_name,
            input: InputSampler::new(),
            camera,
            registry,
            vehicle,
            local_model,
            statics,
            latest_world: None,
            my_tank: None,
            socket: None,
            shoot_sound: assets.shoot_sound,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn my_tank(&self) -> Option<&EntityId> {
        self.my_tank.as_ref()
    }

    /// Opens the connection and sends the join handshake.
    pub async fn connect(&mut self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.state == SessionState::Connecting,
            "connect called in state {:?}",
            self.state
        );

        let mut conn = Connection::connect(&self.cfg.server_addr).await?;
        conn.send(&Msg::Join {
            name: self.player_name.clone(),
        })
        .await
        .context("send join")?;
        info!(name = %self.player_name, "Joined");

        self.socket = Some(conn);
        self.state = SessionState::AwaitingFirstSnapshot;
        Ok(())
    }

    /// Polls the socket for one message. Transport failures after the
    /// handshake are logged, not retried.
    pub async fn poll_socket(&mut self) {
        let Some(conn) = self.socket.as_mut() else {
            return;
        };
        match conn.poll(POLL_TIMEOUT).await {
            Ok(Some(msg)) => self.handle_message(msg),
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "Socket closed");
                self.socket = None;
            }
        }
    }

    /// Dispatches one inbound message. Unknown types are logged and
    /// ignored, never fatal.
    pub fn handle_message(&mut self, msg: Msg) {
        match msg {
            Msg::World(snapshot) => {
                self.latest_world = Some(snapshot);
                if self.state == SessionState::AwaitingFirstSnapshot {
                    info!("First world snapshot received, session running");
                    self.state = SessionState::Running;
                }
            }
            Msg::Tank { id } => {
                info!(id = %id.0, "Server assigned own tank");
                self.my_tank = Some(id);
            }
            Msg::Initial(data) => {
                debug!(?data, "Late initial message");
            }
            other => {
                debug!(?other, "Unknown message");
            }
        }
    }

    /// One per-frame logic tick. `delta` is elapsed milliseconds. Inert
    /// until the session is running.
    pub fn logic_tick(&mut self, delta: f32) {
        if self.state != SessionState::Running {
            return;
        }

        let intent = self.input.intent();

        // Reconcile the latest authoritative snapshot in place.
        if let Some(world) = self.latest_world.take() {
            self.registry.apply_snapshot(&world);
            self.follow_own_tank(&world);
            self.latest_world = Some(world);
        }

        self.camera.apply_movement(intent, delta);

        if let Some(vehicle) = self.vehicle.as_mut() {
            vehicle.logic_tick(intent, delta);
            let position = vehicle.position;
            let direction = vehicle.direction;

            if let Some(model) = self.local_model.as_mut() {
                model.position = position;
                model.rotation_y = direction;

                // No server turret feed offline: chase the camera yaw
                // relative to the hull, shorter arc, never overshooting.
                let target = self.camera.yaw - direction;
                if let Some(rotation) = model.part_rotation_mut(TURRET_PART) {
                    rotation.y = step_angle(rotation.y, target, TURRET_TURN_RATE * delta);
                }
            }

            if self.camera.mode == CameraMode::Follow {
                self.camera.follow(position, CAMERA_HEIGHT);
            }
        }

        for _ in 0..self.input.take_fire_edges() {
            if let Some(clip) = &self.shoot_sound {
                debug!(sound = %clip.name, "Fire");
            }
        }
    }

    fn follow_own_tank(&mut self, world: &WorldSnapshot) {
        if self.camera.mode != CameraMode::Follow {
            return;
        }
        let Some(my_id) = &self.my_tank else {
            return;
        };
        if let Some(tank) = world.tanks.iter().find(|t| &t.id == my_id) {
            self.camera
                .follow(Vec3::new(tank.pos.x, 0.0, tank.pos.y), CAMERA_HEIGHT);
        }
    }

    /// Builds the periodic input message: discrete intent plus the camera
    /// yaw. Physical vehicle state is never transmitted.
    pub fn sample_input(&self) -> Msg {
        let intent = self.input.intent();
        Msg::Input {
            direction: intent.right,
            acceleration: intent.forward,
            view_direction: self.camera.yaw,
        }
    }

    /// Sends one input sample. A no-op until the session is running, and
    /// in observer mode.
    pub async fn send_input(&mut self) -> anyhow::Result<()> {
        if self.state != SessionState::Running || self.cfg.observer {
            return Ok(());
        }
        let msg = self.sample_input();
        if let Some(conn) = self.socket.as_mut() {
            conn.send(&msg).await.context("send input")?;
        }
        Ok(())
    }

    /// Draws the current scene.
    pub fn render(&self, backend: &mut dyn RenderBackend) {
        backend.begin_frame();
        backend.set_view(&self.camera.view());

        for model in &self.statics {
            backend.draw_model(model);
        }
        if let Some(model) = &self.local_model {
            backend.draw_model(model);
        }
        for (_, proxy) in self.registry.iter() {
            backend.draw_model(proxy);
        }

        backend.end_frame();
    }

    /// Bounded loop for demos and tests: ticks and draws a fixed number of
    /// frames, then returns.
    pub fn run_frames(&mut self, backend: &mut dyn RenderBackend, frames: u32, frame_ms: f32) {
        for _ in 0..frames {
            self.logic_tick(frame_ms);
            self.render(backend);
        }
    }

    pub fn local_model(&self) -> Option<&Model> {
        self.local_model.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tanks_shared::{
        assets::{BoundBox, BoundSphere, PartInfo},
        math::{normalize_angle, Vec2},
        net::TankState,
        render::NullRenderer,
    };

    fn tank_assets() -> ModelAssets {
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
        ModelAssets {
            mesh,
            textures: HashMap::new(),
        }
    }

    fn online_session() -> GameSession {
        let cfg = GameConfig {
            player_name: "Tester".to_string(),
            ..Default::default()
        };
        let mut session = GameSession::with_assets(cfg, GameAssets::headless(tank_assets()));
        // Skip the socket: tests inject messages directly.
        session.state = SessionState::AwaitingFirstSnapshot;
        session
    }

    fn world(x: f32, y: f32) -> Msg {
        Msg::World(WorldSnapshot {
            tanks: vec![TankState {
                id: EntityId::new("A"),
                pos: Vec2::new(x, y),
                dir: 0.5,
                tur_dir: 1.0,
            }],
        })
    }

    #[test]
    fn first_snapshot_arms_the_session() {
        let mut session = online_session();
        assert_eq!(session.state(), SessionState::AwaitingFirstSnapshot);

        session.handle_message(world(1.0, 2.0));
        assert_eq!(session.state(), SessionState::Running);

        session.logic_tick(16.0);
        assert_eq!(session.registry.len(), 1);
    }

    #[test]
    fn reconciliation_is_inert_before_first_snapshot() {
        let mut session = online_session();
        session.logic_tick(16.0);
        assert!(session.registry.is_empty());
    }

    #[test]
    fn unknown_messages_are_ignored() {
        let mut session = online_session();
        session.handle_message(Msg::Unknown);
        assert_eq!(session.state(), SessionState::AwaitingFirstSnapshot);
    }

    #[test]
    fn own_tank_snaps_follow_camera() {
        let mut session = online_session();
        session.handle_message(Msg::Tank {
            id: EntityId::new("A"),
        });
        session.handle_message(world(3.0, 8.0));
        session.logic_tick(16.0);

        assert_eq!(session.camera.position.x, 3.0);
        assert_eq!(session.camera.position.y, CAMERA_HEIGHT);
        assert_eq!(session.camera.position.z, 8.0);
    }

    #[test]
    fn empty_name_gets_random_fallback() {
        let session =
            GameSession::with_assets(GameConfig::default(), GameAssets::headless(tank_assets()));
        assert!(session.player_name().starts_with("Random_"));
        assert_eq!(session.player_name().len(), "Random_".len() + 8);
    }

    #[test]
    fn offline_turret_chases_camera_yaw() {
        let cfg = GameConfig {
            offline: true,
            ..Default::default()
        };
        let mut session = GameSession::with_assets(cfg, GameAssets::headless(tank_assets()));
        assert_eq!(session.state(), SessionState::Running);

        session.camera.yaw = 1.0;
        for _ in 0..500 {
            session.logic_tick(16.0);
        }

        let turret = session
            .local_model()
            .unwrap()
            .part_rotation(TURRET_PART)
            .unwrap()
            .y;
        let hull = session.vehicle.as_ref().unwrap().direction;
        let target = normalize_angle(1.0 - hull);
        assert!((turret - target).abs() < 1e-3);
    }

    #[test]
    fn bounded_loop_renders_fixed_frame_count() {
        let mut session = online_session();
        session.handle_message(world(0.0, 0.0));

        let mut renderer = NullRenderer::default();
        session.run_frames(&mut renderer, 30, 16.0);
        assert_eq!(renderer.frames, 30);
        // One proxy drawn every frame.
        assert_eq!(renderer.models_drawn, 30);
    }

    #[test]
    fn input_sample_carries_camera_yaw_not_vehicle_state() {
        let mut session = online_session();
        session.camera.yaw = 2.5;
        session.input.set_capture(true);
        session.input.key_down(crate::input::Key::Forward);
        session.input.key_down(crate::input::Key::Right);

        let msg = session.sample_input();
        assert_eq!(
            msg,
            Msg::Input {
                direction: 1,
                acceleration: 1,
                view_direction: 2.5,
            }
        );
    }
}
