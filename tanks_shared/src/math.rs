//! Math types and angle helpers.
//!
//! This module intentionally stays small and deterministic.
//! It avoids SIMD/unsafe and focuses on stable semantics.

use serde::{Deserialize, Serialize};

pub const TAU: f32 = std::f32::consts::TAU;
pub const PI: f32 = std::f32::consts::PI;

/// 3D vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// 2D vector, used for ground-plane positions on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Wraps an angle into `[0, 2π)`.
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can return TAU itself for tiny negative inputs.
    if wrapped >= TAU {
        wrapped - TAU
    } else {
        wrapped
    }
}

/// Steps `current` toward `target` by at most `max_step` radians, always
/// along the shorter arc. Snaps to the target when it is within one step.
///
/// Both angles are treated modulo `2π`; the result is in `[0, 2π)`.
pub fn step_angle(current: f32, target: f32, max_step: f32) -> f32 {
    let current = normalize_angle(current);
    let target = normalize_angle(target);
    let diff = normalize_angle(target - current);

    if diff == 0.0 {
        return current;
    }

    if diff < PI {
        if diff <= max_step {
            target
        } else {
            normalize_angle(current + max_step)
        }
    } else if TAU - diff <= max_step {
        target
    } else {
        normalize_angle(current - max_step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_wraps_negative() {
        let a = normalize_angle(-0.5);
        assert!((a - (TAU - 0.5)).abs() < 1e-6);
        assert_eq!(normalize_angle(0.0), 0.0);
        assert!((normalize_angle(TAU + 1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn step_angle_zero_delta_is_noop() {
        let a = step_angle(1.0, 1.0, 0.1);
        assert_eq!(a, 1.0);
    }

    #[test]
    fn step_angle_takes_shorter_arc() {
        let eps = 1e-3;

        // Just under a half turn: forward.
        let a = step_angle(0.0, PI - eps, 0.1);
        assert!((a - 0.1).abs() < 1e-6);

        // Just over a half turn: backward, wrapping below zero.
        let b = step_angle(0.0, PI + eps, 0.1);
        assert!((b - (TAU - 0.1)).abs() < 1e-5);

        // Almost a full turn: backward is nearly immediate.
        let c = step_angle(0.0, TAU - eps, 0.1);
        assert!((c - (TAU - eps)).abs() < 1e-5);
    }

    #[test]
    fn step_angle_never_overshoots() {
        // Remaining delta smaller than the step: snap exactly to target.
        let target = 0.05;
        let a = step_angle(0.0, target, 0.1);
        assert_eq!(a, target);

        let b = step_angle(0.0, TAU - 0.05, 0.1);
        assert_eq!(b, TAU - 0.05);
    }

    #[test]
    fn step_angle_converges() {
        let mut angle = 0.0;
        let target = 4.0;
        for _ in 0..200 {
            angle = step_angle(angle, target, 0.05);
        }
        assert!((angle - target).abs() < 1e-5);
    }
}
