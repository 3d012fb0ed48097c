/*!
Shot, rest-detection, and trajectory tuning constants.

These constants centralize the parameters used by the shot state machine,
the rest/airborne classification, and the trajectory predictor. Keeping
them together makes tuning easier and helps ensure deterministic behavior
across platforms.

Notes
- Distances are in meters, time in seconds, angles in radians.
- Favor practical world-space tolerances over machine epsilon for robust behavior.
- Per-course customization should treat these as defaults and override through
  `ShotSettings` in the `game` crate.
*/

/// Practical small distance for comparisons (meters).
/// Use for dot-product guards, equality checks in world space, etc.
pub const DIST_EPS: f32 = 1.0e-6;

/// Gravity magnitude in meters per second squared (positive value).
pub const GRAVITY_MPS2: f32 = 9.81;

/// Fixed simulation timestep (seconds). One physics step per rendered frame.
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;

/// Linear and angular speed below which a moving roller is considered at rest.
/// Both must hold while grounded before the shot returns to `Idle`.
pub const REST_SPEED: f32 = 0.1;

/// Vertical speed above which the roller is classified as airborne (m/s).
pub const AIRBORNE_VERTICAL_SPEED: f32 = 0.5;

/// Maximum horizontal speed at which a roller overlapping the hole sensor
/// is captured (m/s). Faster rollers skip over the hole.
pub const HOLE_CAPTURE_SPEED: f32 = 2.0;

/// Impulse applied at full power-meter charge (N·s, for a unit-mass roller
/// this is the launch speed in m/s).
pub const MAX_SHOT_POWER: f32 = 18.0;

/// Power-meter sweep rate in meter-units per second.
/// A full 0 -> 1 ascent takes `1.0 / POWER_METER_SPEED` seconds.
pub const POWER_METER_SPEED: f32 = 1.25;

/// Small aim rotation step (radians). Roughly 2 degrees.
pub const AIM_STEP_RAD: f32 = 0.034_906_585;

/// Large aim rotation step (radians). Roughly 10 degrees.
pub const AIM_STEP_LARGE_RAD: f32 = 0.174_532_92;

/// Vertical impulse adjustment per unit of top/back spin, as a fraction of
/// shot power. Top spin subtracts, back spin adds.
pub const VERTICAL_SPIN_FACTOR: f32 = 0.35;

/// Lateral impulse adjustment per unit of left/right spin, as a fraction of
/// shot power, applied along the aim rotated 90 degrees about +Y.
pub const SIDE_SPIN_FACTOR: f32 = 0.30;

/// Forward-roll angular impulse per unit of shot power.
pub const ROLL_SPIN_FACTOR: f32 = 0.5;

/// Upward impulse applied by a mid-flight bounce request (N·s).
pub const BOUNCE_IMPULSE: f32 = 6.0;

/// Blend weight for directional air-control while airborne.
/// 0.0 = no steering, 1.0 = instant redirection.
pub const AIR_STEER_BLEND: f32 = 0.2;

/// Default energy capacity of a freshly spawned roller (shots).
pub const DEFAULT_MAX_ENERGY: u32 = 10;

/// Duration of the scripted hole-sink sequence (seconds).
/// Timer-driven, so the duration is independent of frame rate.
pub const HOLE_ANIM_DURATION: f32 = 1.0;

/// Depth the roller descends over the hole-sink sequence (meters).
pub const HOLE_SINK_DEPTH: f32 = 0.5;

/// Default step budget for trajectory prediction.
pub const TRAJECTORY_MAX_STEPS: u32 = 240;

/// Fraction of vertical speed retained after a predicted bounce.
pub const TRAJECTORY_RESTITUTION: f32 = 0.6;

/// Fraction of horizontal speed retained after a predicted bounce.
pub const TRAJECTORY_FRICTION: f32 = 0.8;

/// Per-step velocity retention in the air. 1.0 disables air damping, which
/// matches a rapier body with zero linear damping.
pub const TRAJECTORY_AIR_DAMPING: f32 = 1.0;

/// Predicted bounces stop once speed falls below this threshold (m/s).
pub const TRAJECTORY_REST_SPEED: f32 = 0.25;

/// Height the predictor clamps to after a bounce to avoid re-triggering
/// ground contact on the next step (meters).
pub const TRAJECTORY_GROUND_EPS: f32 = 1.0e-3;
