/*!
Deterministic projectile prediction for the shot preview.

The predictor integrates discretized projectile motion from a start position
and velocity, producing the sample polyline, bounce points, and landing
position the renderer draws ahead of a shot. It runs purely on value inputs
and returns value outputs: it never touches live entities or the physics
engine.

Determinism
- Given identical inputs the function produces byte-identical output
  sequences. No wall-clock time, no randomness.
- The same integration scheme (semi-implicit Euler) and default constants as
  the live simulation keep the preview visually consistent with what the
  engine will actually do.
*/

use crate::settings::{
    TRAJECTORY_AIR_DAMPING, TRAJECTORY_FRICTION, TRAJECTORY_GROUND_EPS, TRAJECTORY_MAX_STEPS,
    TRAJECTORY_REST_SPEED, TRAJECTORY_RESTITUTION,
};
use crate::types::Vec3;

/// Ground response for the bouncing prediction variant.
#[derive(Clone, Copy, Debug)]
pub struct BounceParams {
    /// Fraction of vertical speed retained after a bounce.
    pub restitution: f32,
    /// Fraction of horizontal speed retained after a bounce.
    pub friction: f32,
    /// Prediction stops after this many bounces.
    pub max_bounces: u32,
}

impl Default for BounceParams {
    fn default() -> Self {
        Self {
            restitution: TRAJECTORY_RESTITUTION,
            friction: TRAJECTORY_FRICTION,
            max_bounces: 3,
        }
    }
}

/// Input for one prediction run.
///
/// The ground plane is assumed at y = 0. Without `bounce`, prediction stops
/// at the first descending ground crossing; with it, the velocity is
/// reflected and damped until `max_bounces` or near-rest.
#[derive(Clone, Copy, Debug)]
pub struct TrajectoryParams {
    /// Start position (meters, world space).
    pub start_pos: Vec3,
    /// Start velocity (meters per second).
    pub start_vel: Vec3,
    /// Gravity acceleration (m/s^2), typically `(0, -GRAVITY_MPS2, 0)`.
    pub gravity: Vec3,
    /// Integration timestep (seconds).
    pub timestep: f32,
    /// Step budget; prediction always terminates within this many steps.
    pub max_steps: u32,
    /// Per-step velocity retention in the air. 1.0 disables air damping.
    pub air_damping: f32,
    /// Ground response; `None` selects the single-landing variant.
    pub bounce: Option<BounceParams>,
}

impl TrajectoryParams {
    /// Defaults matching the live roller tuning.
    pub fn new(start_pos: Vec3, start_vel: Vec3, gravity: Vec3, timestep: f32) -> Self {
        Self {
            start_pos,
            start_vel,
            gravity,
            timestep,
            max_steps: TRAJECTORY_MAX_STEPS,
            air_damping: TRAJECTORY_AIR_DAMPING,
            bounce: None,
        }
    }
}

/// Output of one prediction run.
///
/// `positions` and `velocities` have equal length and include the start
/// sample. The sequences are derived state: recomputed whenever aim or power
/// changes, never persisted across frames.
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    pub positions: Vec<Vec3>,
    pub velocities: Vec<Vec3>,
    /// Ground contacts recorded by the bouncing variant, in flight order.
    pub bounce_points: Vec<Vec3>,
    /// Where the trajectory meets the ground plane. For the non-bouncing
    /// variant this sits exactly on y = 0.
    pub landing: Vec3,
}

/// Simulate discretized projectile motion from `params`.
///
/// Integration is semi-implicit Euler: each step advances velocity by
/// gravity first, then position by the updated velocity. This matches the
/// scheme rapier applies to a ballistic body, so the preview curve tracks
/// the live shot.
///
/// Non-bouncing variant
/// - Stops at the first step where the position descends through y = 0 and
///   replaces the final sample with the exact crossing, interpolated by the
///   linear fraction `last_y / (last_y - current_y)`. This guarantees the
///   landing marker sits on the ground plane rather than slightly below it.
///
/// Bouncing variant
/// - On each descending ground contact: records a bounce point, reflects
///   the vertical velocity scaled by `restitution`, damps the horizontal
///   velocity by `friction`, and clamps the height to a small positive
///   epsilon so the next step does not re-trigger the contact.
/// - Stops after `max_bounces` bounces or when speed drops below the
///   minimum-motion threshold.
pub fn simulate(params: &TrajectoryParams) -> Trajectory {
    let dt = params.timestep.max(0.0);

    let mut pos = params.start_pos;
    let mut vel = params.start_vel;

    let mut positions = vec![pos];
    let mut velocities = vec![vel];
    let mut bounce_points = Vec::new();
    let mut landing = pos;
    let mut bounces = 0u32;

    for _ in 0..params.max_steps {
        let last_pos = pos;

        vel += params.gravity * dt;
        vel *= params.air_damping;
        pos += vel * dt;

        match params.bounce {
            None => {
                if pos.y < 0.0 && last_pos.y >= 0.0 {
                    // Interpolate the exact ground crossing between the last
                    // two samples and finish there.
                    let denom = last_pos.y - pos.y;
                    let t = if denom > crate::settings::DIST_EPS {
                        last_pos.y / denom
                    } else {
                        0.0
                    };
                    let mut crossing = last_pos + (pos - last_pos) * t;
                    crossing.y = 0.0;

                    positions.push(crossing);
                    velocities.push(vel);
                    landing = crossing;
                    return Trajectory {
                        positions,
                        velocities,
                        bounce_points,
                        landing,
                    };
                }
            }
            Some(bounce) => {
                if pos.y <= 0.0 && vel.y < 0.0 {
                    pos.y = TRAJECTORY_GROUND_EPS;
                    bounce_points.push(Vec3::new(pos.x, 0.0, pos.z));

                    vel.y = -vel.y * bounce.restitution;
                    vel.x *= bounce.friction;
                    vel.z *= bounce.friction;
                    bounces += 1;

                    positions.push(pos);
                    velocities.push(vel);

                    if bounces >= bounce.max_bounces || vel.norm() < TRAJECTORY_REST_SPEED {
                        landing = Vec3::new(pos.x, 0.0, pos.z);
                        return Trajectory {
                            positions,
                            velocities,
                            bounce_points,
                            landing,
                        };
                    }
                    continue;
                }
            }
        }

        positions.push(pos);
        velocities.push(vel);
        landing = pos;
    }

    // Step budget exhausted; report the last sample as the landing estimate.
    Trajectory {
        positions,
        velocities,
        bounce_points,
        landing,
    }
}
