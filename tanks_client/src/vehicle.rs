//! Local vehicle integrator.
//!
//! A forward-Euler damped model: input pushes acceleration, acceleration
//! pushes speed through a soft top-speed taper, and both decay every tick.
//! The constants here define the driving feel and must not be tuned
//! casually.
//!
//! Heading is an unbounded accumulator; it is only wrapped where angular
//! comparisons need it (see the turret stepper in `tanks_shared::math`).

use tanks_shared::math::Vec3;
use tracing::warn;

use crate::input::Intent;

/// Soft cap on self-propelled speed. Braking and reversing are not tapered.
pub const MAX_SELF_SPEED: f32 = 10.0;

/// Height of the follow camera above the hull.
pub const CAMERA_HEIGHT: f32 = 4.0;

#[derive(Debug, Clone, Default)]
pub struct VehicleController {
    pub speed: f32,
    pub acceleration: f32,
    /// Heading in radians, unnormalized.
    pub direction: f32,
    pub position: Vec3,
}

impl VehicleController {
    pub fn new(position: Vec3, direction: f32) -> Self {
        Self {
            speed: 0.0,
            acceleration: 0.0,
            direction,
            position,
        }
    }

    /// Advances one logic tick. `delta` is elapsed wall-clock time in
    /// milliseconds.
    pub fn logic_tick(&mut self, intent: Intent, delta: f32) {
        let acceleration_change = intent.forward as f32;
        let direction_change = intent.right as f32;

        self.acceleration += acceleration_change * delta * 0.000625;

        // Steering flips with the gear so reverse steers like a car backing
        // up. Zero speed counts as forward.
        let gear = if self.speed >= 0.0 { 1.0 } else { -1.0 };
        self.direction -= gear * direction_change * delta * 0.0625 * 0.02;

        if delta != 0.0 {
            if self.acceleration.abs() > 1e-4 {
                self.acceleration *= 0.95f32.powf(delta * 0.0625);
            }

            self.speed *= 0.8f32.powf(delta);

            // Linear friction floor, clamped so it never crosses zero.
            if self.speed > 0.0 {
                self.speed = (self.speed - 0.1).max(0.0);
            } else {
                self.speed = (self.speed + 0.1).min(0.0);
            }
        }

        if self.acceleration.abs() > 1e-3 {
            let mut speed_change = self.acceleration;

            let same_sign = (self.speed > 0.0 && self.acceleration > 0.0)
                || (self.speed < 0.0 && self.acceleration < 0.0);
            if same_sign {
                speed_change *= (MAX_SELF_SPEED - self.speed) / MAX_SELF_SPEED;
            }

            self.speed += speed_change;
        }

        let distance = self.speed * delta * 0.0625;
        let sin = (-self.direction).sin();
        let cos = (-self.direction).cos();

        self.position.x += distance * sin;
        self.position.z -= distance * cos;

        self.sanitize();
    }

    /// Resets any scalar that became non-finite instead of letting it
    /// poison every later tick.
    fn sanitize(&mut self) {
        if !self.speed.is_finite() || !self.acceleration.is_finite() || !self.direction.is_finite()
        {
            warn!(
                speed = self.speed,
                acceleration = self.acceleration,
                direction = self.direction,
                "Vehicle state became non-finite, resetting"
            );
            if !self.speed.is_finite() {
                self.speed = 0.0;
            }
            if !self.acceleration.is_finite() {
                self.acceleration = 0.0;
            }
            if !self.direction.is_finite() {
                self.direction = 0.0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDLE: Intent = Intent {
        forward: 0,
        right: 0,
        shift_held: false,
    };

    const FULL_FORWARD: Intent = Intent {
        forward: 1,
        right: 0,
        shift_held: false,
    };

    #[test]
    fn rest_state_is_exactly_idempotent() {
        let mut car = VehicleController::default();
        for _ in 0..100 {
            car.logic_tick(IDLE, 16.0);
        }
        assert_eq!(car.speed, 0.0);
        assert_eq!(car.acceleration, 0.0);
        assert_eq!(car.position, Vec3::ZERO);
        assert_eq!(car.direction, 0.0);
    }

    #[test]
    fn speed_never_exceeds_soft_cap() {
        let mut car = VehicleController::default();
        for _ in 0..10_000 {
            car.logic_tick(FULL_FORWARD, 16.0);
            assert!(
                car.speed <= MAX_SELF_SPEED,
                "speed {} exceeded cap",
                car.speed
            );
        }
        assert!(car.speed > 0.0);
    }

    #[test]
    fn forward_intent_moves_along_heading() {
        let mut car = VehicleController::default();
        for _ in 0..50 {
            car.logic_tick(FULL_FORWARD, 16.0);
        }
        // Heading 0 points along -z.
        assert!(car.position.z < 0.0);
        assert!(car.position.x.abs() < 1e-4);
    }

    #[test]
    fn steering_is_mirrored_in_reverse() {
        let turn_right = Intent {
            forward: 0,
            right: 1,
            shift_held: false,
        };

        let mut forward_car = VehicleController::default();
        forward_car.speed = 5.0;
        forward_car.logic_tick(turn_right, 16.0);

        let mut reverse_car = VehicleController::default();
        reverse_car.speed = -5.0;
        reverse_car.logic_tick(turn_right, 16.0);

        assert!(forward_car.direction < 0.0);
        assert!(reverse_car.direction > 0.0);
    }

    #[test]
    fn non_finite_state_is_reset() {
        let mut car = VehicleController::default();
        car.speed = f32::NAN;
        car.logic_tick(IDLE, 16.0);
        assert_eq!(car.speed, 0.0);
        assert!(car.position.x.is_finite());
    }

    #[test]
    fn zero_delta_changes_nothing_at_rest() {
        let mut car = VehicleController::default();
        car.logic_tick(FULL_FORWARD, 0.0);
        assert_eq!(car.speed, 0.0);
        assert_eq!(car.acceleration, 0.0);
        assert_eq!(car.position, Vec3::ZERO);
    }
}
