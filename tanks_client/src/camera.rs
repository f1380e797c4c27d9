//! Camera state and movement.
//!
//! Two modes, fixed by session configuration: `Observer` free-flies from
//! input intent, `Follow` is rigidly snapped to a tracked vehicle while
//! yaw/pitch come from pointer deltas only. Pitch is clamped to a half
//! turn; yaw accumulates unbounded.

use std::f32::consts::FRAC_PI_2;

use tanks_shared::{math::Vec3, render::ViewState};

use crate::input::Intent;

/// Radians of rotation per pixel of pointer movement.
const POINTER_SENSITIVITY: f32 = 0.003;

/// Observer fly speed, world units per millisecond.
const FLY_SPEED: f32 = 0.01;

/// Speed factor when moving forward and sideways at once.
const DIAGONAL_FACTOR: f32 = 0.707107;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    /// Free-fly, decoupled from any vehicle.
    Observer,
    /// Rigidly tracks a vehicle's position.
    Follow,
}

#[derive(Debug, Clone)]
pub struct Camera {
    pub mode: CameraMode,
    pub position: Vec3,
    /// Yaw in radians, unbounded.
    pub yaw: f32,
    /// Pitch in radians, clamped to ±π/2.
    pub pitch: f32,
    pub distance: f32,
    pub aspect_ratio: f32,
}

impl Camera {
    pub fn new(mode: CameraMode, distance: f32) -> Self {
        Self {
            mode,
            position: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            distance,
            aspect_ratio: 1.0,
        }
    }

    /// Feeds a raw pointer-move delta into yaw/pitch.
    pub fn apply_pointer_delta(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * POINTER_SENSITIVITY;
        self.pitch = (self.pitch + dy * POINTER_SENSITIVITY).clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    /// Observer-mode movement: intent decomposed into world space through
    /// the current yaw. No-op in follow mode. `delta` is milliseconds.
    pub fn apply_movement(&mut self, intent: Intent, delta: f32) {
        if self.mode != CameraMode::Observer {
            return;
        }

        let forward = intent.forward as f32;
        let right = intent.right as f32;

        let mut distance = if intent.forward != 0 && intent.right != 0 {
            DIAGONAL_FACTOR
        } else {
            1.0
        };

        distance *= delta * FLY_SPEED;

        if intent.shift_held {
            distance *= 0.5;
        }

        if intent.forward != 0 {
            let sin = (-self.yaw).sin();
            let cos = (-self.yaw).cos();
            self.position.z -= distance * forward * cos;
            self.position.x += distance * forward * sin;
        }

        if intent.right != 0 {
            let sin = (-self.yaw + FRAC_PI_2).sin();
            let cos = (-self.yaw + FRAC_PI_2).cos();
            self.position.z -= distance * right * cos;
            self.position.x += distance * right * sin;
        }
    }

    /// Follow-mode snap: position locked to the target at a fixed height.
    pub fn follow(&mut self, target: Vec3, height: f32) {
        self.position.x = target.x;
        self.position.y = height;
        self.position.z = target.z;
    }

    pub fn view(&self) -> ViewState {
        ViewState {
            position: self.position,
            yaw: self.yaw,
            pitch: self.pitch,
            distance: self.distance,
            aspect_ratio: self.aspect_ratio,
        }
    }
}
