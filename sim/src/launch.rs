/*!
Pure shot math: aim rotation, power-meter oscillation, spin selection, and
the impulse computation for a released shot.

These are value-in/value-out helpers. The shot state machine in the `game`
crate owns when they run; nothing here talks to the physics engine.
*/

use crate::settings::{
    DIST_EPS, ROLL_SPIN_FACTOR, SIDE_SPIN_FACTOR, VERTICAL_SPIN_FACTOR,
};
use crate::types::{Vec3, horizontal, rotate_about_y, up};

/// Rotate a unit aim vector about the world up axis and renormalize.
///
/// Returns the input unchanged if the rotation degenerates the vector
/// (cannot happen for a horizontal unit aim, but guards misuse).
#[inline]
pub fn rotate_aim(aim: &Vec3, radians: f32) -> Vec3 {
    let rotated = rotate_about_y(aim, radians);
    let len = rotated.norm();
    if len <= DIST_EPS {
        return *aim;
    }
    rotated / len
}

/// The classic oscillating power bar.
///
/// While `oscillating`, the value sweeps between 0 and 1 at `speed` units
/// per second, reflecting exactly onto the boundary on each bounce.
/// Freezing snapshots the value as the committed shot power fraction.
#[derive(Clone, Copy, Debug)]
pub struct PowerMeter {
    /// Current bar fill in [0, 1].
    pub value: f32,
    /// Sweep direction, +1 or -1.
    direction: f32,
    /// Sweep rate in bar-units per second.
    pub speed: f32,
    /// Whether the bar is currently sweeping.
    pub oscillating: bool,
}

impl PowerMeter {
    pub fn new(speed: f32) -> Self {
        Self {
            value: 0.0,
            direction: 1.0,
            speed,
            oscillating: false,
        }
    }

    /// Reset to empty and begin sweeping upward.
    pub fn start(&mut self) {
        self.value = 0.0;
        self.direction = 1.0;
        self.oscillating = true;
    }

    /// Advance the sweep by `dt` seconds. No-op while frozen.
    ///
    /// Boundary semantics: the value is clamped exactly to 0 or 1 on the
    /// step that reaches the boundary, and the direction reverses for the
    /// next step.
    pub fn advance(&mut self, dt: f32) {
        if !self.oscillating {
            return;
        }
        self.value += self.direction * self.speed * dt.max(0.0);
        if self.value >= 1.0 {
            self.value = 1.0;
            self.direction = -1.0;
        } else if self.value <= 0.0 {
            self.value = 0.0;
            self.direction = 1.0;
        }
    }

    /// Stop sweeping and return the committed power fraction.
    pub fn freeze(&mut self) -> f32 {
        self.oscillating = false;
        self.value
    }
}

/// Which spin the player selected for the next shot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpinKind {
    None,
    Top,
    Back,
    Left,
    Right,
}

/// Four independent non-negative spin magnitudes in [0, 1].
///
/// Invariant: at most one component is nonzero at a time; selecting a new
/// spin kind resets the others to zero.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SpinVector {
    pub top: f32,
    pub back: f32,
    pub left: f32,
    pub right: f32,
}

impl SpinVector {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Select `kind` at `value` (clamped to [0, 1]), zeroing the others.
    pub fn set(&mut self, kind: SpinKind, value: f32) {
        let value = value.clamp(0.0, 1.0);
        *self = Self::zero();
        match kind {
            SpinKind::None => {}
            SpinKind::Top => self.top = value,
            SpinKind::Back => self.back = value,
            SpinKind::Left => self.left = value,
            SpinKind::Right => self.right = value,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.top == 0.0 && self.back == 0.0 && self.left == 0.0 && self.right == 0.0
    }
}

/// Linear and angular impulse for one released shot.
#[derive(Clone, Copy, Debug)]
pub struct LaunchImpulse {
    pub linear: Vec3,
    pub angular: Vec3,
}

/// Compute the launch impulses for a shot.
///
/// - Base impulse is `aim * shot_power`.
/// - Top spin lowers the trajectory, back spin raises it, scaled by
///   [`VERTICAL_SPIN_FACTOR`].
/// - Left/right spin shifts the impulse along the aim rotated 90 degrees
///   about +Y, scaled by [`SIDE_SPIN_FACTOR`].
/// - The angular impulse is a forward roll about the axis perpendicular to
///   the travel direction, proportional to shot power.
pub fn launch_impulse(aim: &Vec3, shot_power: f32, spin: &SpinVector) -> LaunchImpulse {
    // Aim rotated +90 degrees about +Y points to the roller's left.
    let left = rotate_about_y(aim, std::f32::consts::FRAC_PI_2);

    let mut linear = aim * shot_power;
    linear.y += (spin.back - spin.top) * shot_power * VERTICAL_SPIN_FACTOR;
    linear += left * (spin.left - spin.right) * shot_power * SIDE_SPIN_FACTOR;

    // Forward-roll axis: up x aim. For travel along +X this spins about -Z,
    // which rolls the ball forward without slipping.
    let angular = up().cross(aim) * shot_power * ROLL_SPIN_FACTOR;

    LaunchImpulse { linear, angular }
}

/// Blend a directional offset into a horizontal velocity, preserving the
/// original horizontal speed and the vertical component unchanged.
///
/// Used for mid-air bounce steering: `blend` is small, so control nudges
/// the flight direction rather than redirecting it outright.
pub fn steer_horizontal(vel: &Vec3, steer: &Vec3, blend: f32) -> Vec3 {
    let planar = horizontal(vel);
    let speed = planar.norm();
    if speed <= DIST_EPS {
        return *vel;
    }

    let blended = planar / speed + horizontal(steer) * blend;
    let len = blended.norm();
    if len <= DIST_EPS {
        return *vel;
    }

    let redirected = blended / len * speed;
    Vec3::new(redirected.x, vel.y, redirected.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{AIM_STEP_LARGE_RAD, AIM_STEP_RAD};

    #[test]
    fn aim_stays_unit_length_under_rotation_sequences() {
        let mut aim = Vec3::new(0.0, 0.0, -1.0);
        let steps = [
            AIM_STEP_RAD,
            -AIM_STEP_RAD,
            AIM_STEP_LARGE_RAD,
            -AIM_STEP_LARGE_RAD,
            AIM_STEP_RAD,
            AIM_STEP_RAD,
            -AIM_STEP_LARGE_RAD,
        ];
        for _ in 0..100 {
            for &step in &steps {
                aim = rotate_aim(&aim, step);
                assert!((aim.norm() - 1.0).abs() < 1.0e-6);
                assert!(aim.y.abs() < 1.0e-5);
            }
        }
    }

    #[test]
    fn power_meter_first_ascent_is_linear() {
        // value(t) = min(1, s*t) for the first ascending half-cycle.
        let speed = 1.25;
        let mut meter = PowerMeter::new(speed);
        meter.start();

        let dt = 1.0 / 60.0;
        let mut t = 0.0;
        while speed * (t + dt) < 1.0 {
            meter.advance(dt);
            t += dt;
            assert!((meter.value - (speed * t).min(1.0)).abs() < 1.0e-4);
        }
    }

    #[test]
    fn power_meter_reflects_on_boundaries_and_stays_in_range() {
        let mut meter = PowerMeter::new(3.0);
        meter.start();
        let dt = 0.016;
        for _ in 0..500 {
            meter.advance(dt);
            assert!((0.0..=1.0).contains(&meter.value));
        }
    }

    #[test]
    fn frozen_meter_keeps_its_value() {
        let mut meter = PowerMeter::new(1.0);
        meter.start();
        meter.advance(0.5);
        let committed = meter.freeze();
        meter.advance(10.0);
        assert_eq!(meter.value, committed);
    }

    #[test]
    fn spin_selection_is_exclusive() {
        let mut spin = SpinVector::zero();
        spin.set(SpinKind::Top, 1.0);
        assert_eq!(spin.top, 1.0);
        spin.set(SpinKind::Left, 0.5);
        assert_eq!(spin.top, 0.0);
        assert_eq!(spin.left, 0.5);
        spin.set(SpinKind::None, 1.0);
        assert!(spin.is_zero());
    }

    #[test]
    fn spin_values_are_clamped() {
        let mut spin = SpinVector::zero();
        spin.set(SpinKind::Back, 7.0);
        assert_eq!(spin.back, 1.0);
        spin.set(SpinKind::Right, -2.0);
        assert_eq!(spin.right, 0.0);
    }

    #[test]
    fn top_spin_lowers_and_back_spin_raises() {
        let aim = Vec3::new(0.0, 0.0, -1.0);
        let mut spin = SpinVector::zero();

        spin.set(SpinKind::Top, 1.0);
        let low = launch_impulse(&aim, 10.0, &spin);

        spin.set(SpinKind::Back, 1.0);
        let high = launch_impulse(&aim, 10.0, &spin);

        let flat = launch_impulse(&aim, 10.0, &SpinVector::zero());

        assert!(low.linear.y < flat.linear.y);
        assert!(high.linear.y > flat.linear.y);
    }

    #[test]
    fn side_spin_shifts_along_rotated_aim() {
        let aim = Vec3::new(0.0, 0.0, -1.0);
        let mut spin = SpinVector::zero();
        spin.set(SpinKind::Left, 1.0);

        let out = launch_impulse(&aim, 10.0, &spin);
        // Aiming -Z, the left direction is -X.
        assert!(out.linear.x < 0.0);

        spin.set(SpinKind::Right, 1.0);
        let out = launch_impulse(&aim, 10.0, &spin);
        assert!(out.linear.x > 0.0);
    }

    #[test]
    fn angular_impulse_is_perpendicular_to_travel() {
        let aim = Vec3::new(1.0, 0.0, 0.0);
        let out = launch_impulse(&aim, 10.0, &SpinVector::zero());
        assert!(out.angular.dot(&aim).abs() < 1.0e-5);
        assert!(out.angular.norm() > 0.0);
    }

    #[test]
    fn steer_preserves_horizontal_speed_and_vertical_component() {
        let vel = Vec3::new(3.0, -2.0, 4.0);
        let steered = steer_horizontal(&vel, &Vec3::new(0.0, 0.0, 1.0), 0.2);

        assert!((horizontal(&steered).norm() - horizontal(&vel).norm()).abs() < 1.0e-5);
        assert_eq!(steered.y, vel.y);
        // The direction actually moved toward the steer input.
        assert!(steered.z > vel.z - 1.0e-6);
    }

    #[test]
    fn steer_with_no_horizontal_motion_is_identity() {
        let vel = Vec3::new(0.0, -5.0, 0.0);
        let steered = steer_horizontal(&vel, &Vec3::new(1.0, 0.0, 0.0), 0.5);
        assert_eq!(steered, vel);
    }
}
