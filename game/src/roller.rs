/*!
The shot state machine: aim, charge, spin, release, fly, rest.

One controller owns one roller. It sequences player input through the
`Idle -> Aiming -> Power -> Spin -> Moving` cycle, forwards the resulting
impulses through the physics adapter, and classifies the roller back to rest
after each shot. All pure math (aim rotation, meter sweep, impulse
computation, air steering) lives in `sim::launch`; this module owns *when*
it runs.

Failure semantics
- Every transition method returns a success flag rather than panicking;
  illegal transitions are logged no-ops. Nothing here propagates an error
  into the frame loop.
*/

use sim::launch::{PowerMeter, SpinKind, SpinVector};
use sim::settings::{
    AIM_STEP_LARGE_RAD, AIM_STEP_RAD, AIR_STEER_BLEND, AIRBORNE_VERTICAL_SPEED, BOUNCE_IMPULSE,
    DEFAULT_MAX_ENERGY, FIXED_TIMESTEP, GRAVITY_MPS2, HOLE_ANIM_DURATION, HOLE_SINK_DEPTH,
    MAX_SHOT_POWER, POWER_METER_SPEED, REST_SPEED,
};
use sim::trajectory::{BounceParams, Trajectory, TrajectoryParams, simulate};
use sim::{Vec3, launch_impulse, rotate_aim, steer_horizontal, up};

use crate::bodies::PhysicsBodies;
use crate::entity::EntityId;
use crate::events::{EventSink, GameEvent};
use crate::powerup::{self, PowerUpKind, ShotModifiers, WorldEffect};

/// The shot cycle. Exactly one state is active per roller; power, spin, and
/// aim are only mutable in their corresponding states, and a shot may only
/// be released from `Spin`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShotState {
    Idle,
    Aiming,
    Power,
    Spin,
    Moving,
}

/// Discrete aim adjustment, small or large step left/right.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AimStep {
    Left,
    Right,
    LeftLarge,
    RightLarge,
}

impl AimStep {
    fn radians(self) -> f32 {
        match self {
            AimStep::Left => AIM_STEP_RAD,
            AimStep::Right => -AIM_STEP_RAD,
            AimStep::LeftLarge => AIM_STEP_LARGE_RAD,
            AimStep::RightLarge => -AIM_STEP_LARGE_RAD,
        }
    }
}

/// Discrete input commands consumed from the input collaborator.
/// No raw device polling happens inside the core.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShotCommand {
    StartAim,
    AdjustAim(AimStep),
    StartPower,
    SetPower,
    ApplySpin(SpinKind, f32),
    ReleaseShot,
    AddBounce,
    SteerBounce(Vec3),
    Reset,
}

/// Per-course shot tuning. Defaults come from `sim::settings`; courses
/// override fields in-memory.
#[derive(Clone, Copy, Debug)]
pub struct ShotSettings {
    /// Impulse at full meter charge.
    pub max_power: f32,
    /// Power-meter sweep rate (bar-units per second).
    pub meter_speed: f32,
    /// Upward impulse of a mid-flight bounce.
    pub bounce_impulse: f32,
    /// Blend weight for airborne steering.
    pub steer_blend: f32,
    /// Linear and angular speed below which the roller rests.
    pub rest_speed: f32,
    /// Vertical speed above which the roller counts as airborne.
    pub airborne_vertical_speed: f32,
    /// Energy capacity; also the spawn energy.
    pub max_energy: u32,
    /// Roller mass used to convert impulses to preview velocities.
    pub mass: f32,
    /// Hole-sink sequence duration (seconds).
    pub hole_anim_duration: f32,
    /// Depth descended over the hole-sink sequence (meters).
    pub hole_sink_depth: f32,
}

impl Default for ShotSettings {
    fn default() -> Self {
        Self {
            max_power: MAX_SHOT_POWER,
            meter_speed: POWER_METER_SPEED,
            bounce_impulse: BOUNCE_IMPULSE,
            steer_blend: AIR_STEER_BLEND,
            rest_speed: REST_SPEED,
            airborne_vertical_speed: AIRBORNE_VERTICAL_SPEED,
            max_energy: DEFAULT_MAX_ENERGY,
            mass: 1.0,
            hole_anim_duration: HOLE_ANIM_DURATION,
            hole_sink_depth: HOLE_SINK_DEPTH,
        }
    }
}

/// A power-up currently in force, with its remaining duration in seconds
/// (`f32::INFINITY` = until reset).
#[derive(Clone, Copy, Debug)]
struct ActivePowerUp {
    kind: PowerUpKind,
    remaining: f32,
}

/// The scripted, physics-suspended hole-sink sequence.
///
/// Timer-driven (elapsed-time accumulation across frames), so its duration
/// is independent of frame rate.
#[derive(Clone, Copy, Debug)]
enum SinkAnimation {
    Inactive,
    Running {
        elapsed: f32,
        start: Vec3,
    },
    Finished,
}

/// Shot state machine for one roller.
pub struct RollerController {
    entity: EntityId,
    spawn: Vec3,
    settings: ShotSettings,

    state: ShotState,
    aim: Vec3,
    meter: PowerMeter,
    spin: SpinVector,
    /// Committed impulse magnitude, set when the meter freezes.
    shot_power: f32,
    energy: u32,

    modifiers: ShotModifiers,
    active_power_up: Option<ActivePowerUp>,
    airborne: bool,
    /// Set once the roller has sunk into the hole.
    hidden: bool,
    sink_anim: SinkAnimation,
}

impl RollerController {
    pub fn new(entity: EntityId, spawn: Vec3, settings: ShotSettings) -> Self {
        Self {
            entity,
            spawn,
            settings,
            state: ShotState::Idle,
            aim: Vec3::new(0.0, 0.0, -1.0),
            meter: PowerMeter::new(settings.meter_speed),
            spin: SpinVector::zero(),
            shot_power: 0.0,
            energy: settings.max_energy,
            modifiers: ShotModifiers::default(),
            active_power_up: None,
            airborne: false,
            hidden: false,
            sink_anim: SinkAnimation::Inactive,
        }
    }

    #[inline]
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    #[inline]
    pub fn state(&self) -> ShotState {
        self.state
    }

    /// The position the roller spawns at and resets to.
    #[inline]
    pub fn spawn(&self) -> Vec3 {
        self.spawn
    }

    #[inline]
    pub fn aim(&self) -> Vec3 {
        self.aim
    }

    #[inline]
    pub fn energy(&self) -> u32 {
        self.energy
    }

    #[inline]
    pub fn spin(&self) -> SpinVector {
        self.spin
    }

    #[inline]
    pub fn is_airborne(&self) -> bool {
        self.airborne
    }

    #[inline]
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn active_power_up(&self) -> Option<PowerUpKind> {
        self.active_power_up.map(|a| a.kind)
    }

    /// Apply one input command. Returns whether the command took effect.
    pub fn apply_command(
        &mut self,
        command: ShotCommand,
        bodies: &mut PhysicsBodies,
        sink: &mut dyn EventSink,
    ) -> bool {
        match command {
            ShotCommand::StartAim => self.start_aim(sink),
            ShotCommand::AdjustAim(step) => self.adjust_aim(step),
            ShotCommand::StartPower => self.start_power(sink),
            ShotCommand::SetPower => self.set_power(sink),
            ShotCommand::ApplySpin(kind, value) => self.apply_spin(kind, value, sink),
            ShotCommand::ReleaseShot => self.release_shot(bodies, sink),
            ShotCommand::AddBounce => self.add_bounce(bodies, sink),
            ShotCommand::SteerBounce(dir) => self.steer_bounce(dir, bodies),
            ShotCommand::Reset => self.reset(bodies, sink),
        }
    }

    /// `Idle -> Aiming`. Rejected while moving, out of energy, or sunk.
    pub fn start_aim(&mut self, sink: &mut dyn EventSink) -> bool {
        if self.state != ShotState::Idle || self.hidden {
            log::debug!("start_aim rejected in state {:?}", self.state);
            return false;
        }
        if self.energy == 0 {
            log::debug!("start_aim rejected: no energy");
            return false;
        }
        // Clear leftovers from the previous shot before lining up.
        self.meter = PowerMeter::new(self.settings.meter_speed);
        self.shot_power = 0.0;
        self.spin = SpinVector::zero();
        self.set_state(ShotState::Aiming, sink);
        true
    }

    /// Rotate the aim about the up axis. Legal while aiming or charging.
    pub fn adjust_aim(&mut self, step: AimStep) -> bool {
        if !matches!(self.state, ShotState::Aiming | ShotState::Power) {
            return false;
        }
        self.aim = rotate_aim(&self.aim, step.radians());
        true
    }

    /// `Aiming -> Power`: reset the meter and begin oscillation.
    pub fn start_power(&mut self, sink: &mut dyn EventSink) -> bool {
        if self.state != ShotState::Aiming {
            log::debug!("start_power rejected in state {:?}", self.state);
            return false;
        }
        self.meter.start();
        self.set_state(ShotState::Power, sink);
        true
    }

    /// `Power -> Spin`: freeze the meter and commit the shot power.
    pub fn set_power(&mut self, sink: &mut dyn EventSink) -> bool {
        if self.state != ShotState::Power {
            log::debug!("set_power rejected in state {:?}", self.state);
            return false;
        }
        let fraction = self.meter.freeze();
        self.shot_power = fraction * self.settings.max_power;
        sink.emit(GameEvent::PowerMeterUpdated {
            value: fraction,
            power: self.shot_power,
        });
        self.set_state(ShotState::Spin, sink);
        true
    }

    /// Select spin for the committed shot. Legal only in `Spin`.
    pub fn apply_spin(&mut self, kind: SpinKind, value: f32, sink: &mut dyn EventSink) -> bool {
        if self.state != ShotState::Spin {
            log::debug!("apply_spin rejected in state {:?}", self.state);
            return false;
        }
        self.spin.set(kind, value);
        sink.emit(GameEvent::SpinUpdated { spin: self.spin });
        true
    }

    /// `Spin -> Moving`: apply the launch impulses and spend one energy.
    pub fn release_shot(&mut self, bodies: &mut PhysicsBodies, sink: &mut dyn EventSink) -> bool {
        if self.state != ShotState::Spin {
            log::debug!("release_shot rejected in state {:?}", self.state);
            return false;
        }

        let power = self.shot_power * self.modifiers.power_multiplier;
        let impulse = launch_impulse(&self.aim, power, &self.spin);
        bodies.apply_impulse(self.entity, impulse.linear, true);
        bodies.apply_angular_impulse(self.entity, impulse.angular, true);

        self.use_energy(sink);
        self.set_state(ShotState::Moving, sink);
        true
    }

    /// Mid-flight bounce: fixed upward impulse, allowed any time while
    /// `Moving`. Bounces are free; only `release_shot` spends energy.
    pub fn add_bounce(&mut self, bodies: &mut PhysicsBodies, sink: &mut dyn EventSink) -> bool {
        if self.state != ShotState::Moving {
            log::debug!("add_bounce rejected in state {:?}", self.state);
            return false;
        }
        bodies.apply_impulse(self.entity, up() * self.settings.bounce_impulse, true);
        self.airborne = true;

        let position = bodies
            .transform(self.entity)
            .map(|t| t.translation)
            .unwrap_or(self.spawn);
        sink.emit(GameEvent::Bounce { position });
        true
    }

    /// Directional air-control: nudge the horizontal flight direction while
    /// airborne, preserving horizontal speed and the vertical component.
    pub fn steer_bounce(&mut self, direction: Vec3, bodies: &mut PhysicsBodies) -> bool {
        if self.state != ShotState::Moving || !self.airborne {
            return false;
        }
        let vel = bodies.linvel(self.entity);
        bodies.set_linvel(
            self.entity,
            steer_horizontal(&vel, &direction, self.settings.steer_blend),
        );
        true
    }

    /// Return to `Idle` from any state: restore the spawn transform, clear
    /// shot state, and revert any active power-up. Energy is kept.
    pub fn reset(&mut self, bodies: &mut PhysicsBodies, sink: &mut dyn EventSink) -> bool {
        self.deactivate_power_up(bodies, sink);

        bodies.set_linvel(self.entity, Vec3::zeros());
        bodies.set_angvel(self.entity, Vec3::zeros());
        bodies.set_translation(self.entity, self.spawn);

        self.aim = Vec3::new(0.0, 0.0, -1.0);
        self.meter = PowerMeter::new(self.settings.meter_speed);
        self.spin = SpinVector::zero();
        self.shot_power = 0.0;
        self.airborne = false;
        self.hidden = false;
        self.sink_anim = SinkAnimation::Inactive;
        self.set_state(ShotState::Idle, sink);
        true
    }

    /// Spend one energy (floored at zero).
    pub fn use_energy(&mut self, sink: &mut dyn EventSink) {
        self.energy = self.energy.saturating_sub(1);
        sink.emit(GameEvent::EnergyChanged {
            energy: self.energy,
        });
    }

    /// Replenish energy (capped at the configured maximum).
    pub fn replenish_energy(&mut self, amount: u32, sink: &mut dyn EventSink) {
        self.energy = (self.energy + amount).min(self.settings.max_energy);
        sink.emit(GameEvent::EnergyChanged {
            energy: self.energy,
        });
    }

    /// Handle a collected power-up: energy applies instantly, everything
    /// else activates (replacing any currently active modifier).
    pub fn collect_power_up(
        &mut self,
        kind: PowerUpKind,
        bodies: &mut PhysicsBodies,
        sink: &mut dyn EventSink,
    ) {
        match kind {
            PowerUpKind::Energy { amount } => self.replenish_energy(amount, sink),
            _ => self.activate_power_up(kind, bodies, sink),
        }
    }

    /// Activate `kind`, first fully reverting the previous power-up so at
    /// most one is in force at a time.
    fn activate_power_up(
        &mut self,
        kind: PowerUpKind,
        bodies: &mut PhysicsBodies,
        sink: &mut dyn EventSink,
    ) {
        self.deactivate_power_up(bodies, sink);

        let effect = powerup::apply(&kind, &mut self.modifiers);
        self.forward_effect(effect, bodies);
        self.active_power_up = Some(ActivePowerUp {
            kind,
            remaining: kind.duration().unwrap_or(f32::INFINITY),
        });
        sink.emit(GameEvent::PowerUpActivated { kind });
    }

    /// Revert the active power-up, if any. Idempotent.
    pub fn deactivate_power_up(&mut self, bodies: &mut PhysicsBodies, sink: &mut dyn EventSink) {
        let Some(active) = self.active_power_up.take() else {
            return;
        };
        let effect = powerup::revert(&active.kind, &mut self.modifiers);
        self.forward_effect(effect, bodies);
        sink.emit(GameEvent::PowerUpDeactivated { kind: active.kind });
    }

    fn forward_effect(&mut self, effect: WorldEffect, bodies: &mut PhysicsBodies) {
        match effect {
            WorldEffect::None => {}
            WorldEffect::FlipGravity => bodies.flip_gravity(),
            WorldEffect::SetRollerRestitution(r) => bodies.set_restitution(self.entity, r),
            WorldEffect::RestoreRollerRestitution => bodies.restore_restitution(self.entity),
        }
    }

    /// Start the scripted hole-sink sequence. Velocities are zeroed for its
    /// duration so the live simulation does not fight the scripted motion.
    pub fn begin_hole_sink(&mut self, bodies: &mut PhysicsBodies, sink: &mut dyn EventSink) -> bool {
        if !matches!(self.sink_anim, SinkAnimation::Inactive) {
            return false;
        }
        let start = bodies
            .transform(self.entity)
            .map(|t| t.translation)
            .unwrap_or(self.spawn);

        bodies.set_linvel(self.entity, Vec3::zeros());
        bodies.set_angvel(self.entity, Vec3::zeros());

        self.sink_anim = SinkAnimation::Running {
            elapsed: 0.0,
            start,
        };
        sink.emit(GameEvent::HoleAnimationStarted);
        true
    }

    /// Per-frame update: sink animation, power-up expiry, meter sweep, and
    /// rest detection, in that order of precedence.
    pub fn update(&mut self, dt: f32, bodies: &mut PhysicsBodies, sink: &mut dyn EventSink) {
        let dt = dt.max(0.0);

        if let SinkAnimation::Running { elapsed, start } = self.sink_anim {
            self.advance_sink_anim(elapsed + dt, start, bodies, sink);
            return;
        }

        self.tick_power_up(dt, bodies, sink);

        match self.state {
            ShotState::Power => {
                self.meter.advance(dt);
                sink.emit(GameEvent::PowerMeterUpdated {
                    value: self.meter.value,
                    power: self.meter.value * self.settings.max_power,
                });
            }
            ShotState::Moving => self.poll_motion(dt, bodies, sink),
            _ => {}
        }
    }

    fn advance_sink_anim(
        &mut self,
        elapsed: f32,
        start: Vec3,
        bodies: &mut PhysicsBodies,
        sink: &mut dyn EventSink,
    ) {
        // Keep the simulation from fighting the scripted descent.
        bodies.set_linvel(self.entity, Vec3::zeros());
        bodies.set_angvel(self.entity, Vec3::zeros());

        let duration = self.settings.hole_anim_duration.max(f32::EPSILON);
        let progress = (elapsed / duration).min(1.0);
        bodies.set_translation(
            self.entity,
            start - up() * (self.settings.hole_sink_depth * progress),
        );

        if elapsed >= duration {
            self.sink_anim = SinkAnimation::Finished;
            self.hidden = true;
            sink.emit(GameEvent::HoleAnimationCompleted);
            self.set_state(ShotState::Idle, sink);
        } else {
            self.sink_anim = SinkAnimation::Running { elapsed, start };
        }
    }

    fn tick_power_up(&mut self, dt: f32, bodies: &mut PhysicsBodies, sink: &mut dyn EventSink) {
        let expired = match self.active_power_up.as_mut() {
            Some(active) if active.remaining.is_finite() => {
                active.remaining -= dt;
                active.remaining <= 0.0
            }
            _ => false,
        };
        if expired {
            self.deactivate_power_up(bodies, sink);
        }
    }

    /// Airborne classification, sticky damping, and rest detection.
    fn poll_motion(&mut self, dt: f32, bodies: &mut PhysicsBodies, sink: &mut dyn EventSink) {
        let mut vel = bodies.linvel(self.entity);
        let ang = bodies.angvel(self.entity);

        self.airborne = vel.y.abs() > self.settings.airborne_vertical_speed;

        if !self.airborne && self.modifiers.ground_damping > 0.0 {
            let keep = (1.0 - self.modifiers.ground_damping * dt).max(0.0);
            vel = Vec3::new(vel.x * keep, vel.y, vel.z * keep);
            bodies.set_linvel(self.entity, vel);
        }

        let at_rest = !self.airborne
            && vel.norm() < self.settings.rest_speed
            && ang.norm() < self.settings.rest_speed;
        if at_rest {
            bodies.set_linvel(self.entity, Vec3::zeros());
            bodies.set_angvel(self.entity, Vec3::zeros());
            self.set_state(ShotState::Idle, sink);
        }
    }

    /// Forward-predict the current shot for the preview overlay.
    ///
    /// Derived purely from the current aim/power/spin values; never touches
    /// the live simulation. `start` is the roller's current position,
    /// supplied by the caller.
    pub fn preview(&self, start: Vec3) -> Option<Trajectory> {
        let power = match self.state {
            ShotState::Spin => self.shot_power,
            ShotState::Aiming | ShotState::Power => self.meter.value * self.settings.max_power,
            _ => return None,
        };
        let impulse = launch_impulse(&self.aim, power * self.modifiers.power_multiplier, &self.spin);
        let start_vel = impulse.linear / self.settings.mass.max(f32::EPSILON);

        let mut params = TrajectoryParams::new(
            start,
            start_vel,
            Vec3::new(0.0, -GRAVITY_MPS2, 0.0),
            FIXED_TIMESTEP,
        );
        params.bounce = Some(BounceParams::default());
        Some(simulate(&params))
    }

    fn set_state(&mut self, state: ShotState, sink: &mut dyn EventSink) {
        if self.state != state {
            self.state = state;
            sink.emit(GameEvent::ShotStateChanged { state });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventQueue;
    use sim::MaterialTable;

    const ROLLER: EntityId = 1;

    /// Uninitialized adapter: physics commands degrade to no-ops, which is
    /// exactly what pure state-machine tests want.
    fn harness(max_energy: u32) -> (RollerController, PhysicsBodies, EventQueue) {
        let controller = RollerController::new(
            ROLLER,
            Vec3::zeros(),
            ShotSettings {
                max_energy,
                ..ShotSettings::default()
            },
        );
        (
            controller,
            PhysicsBodies::new(MaterialTable::with_defaults()),
            EventQueue::new(),
        )
    }

    #[test]
    fn full_shot_sequence_reaches_moving_and_spends_energy() {
        let (mut c, mut bodies, mut sink) = harness(4);
        assert_eq!(c.energy(), 4);

        assert!(c.start_aim(&mut sink));
        assert!(c.start_power(&mut sink));

        // Sweep the meter to 0.5, then freeze.
        let dt = 0.5 / c.settings.meter_speed;
        c.update(dt, &mut bodies, &mut sink);
        assert!(c.set_power(&mut sink));
        assert_eq!(c.state(), ShotState::Spin);
        assert!((c.shot_power - 0.5 * c.settings.max_power).abs() < 1.0e-3);

        assert!(c.apply_spin(SpinKind::Top, 1.0, &mut sink));
        assert!(c.release_shot(&mut bodies, &mut sink));
        assert_eq!(c.state(), ShotState::Moving);
        assert_eq!(c.energy(), 3);
    }

    #[test]
    fn start_aim_is_rejected_without_energy() {
        let (mut c, _bodies, mut sink) = harness(0);
        assert!(!c.start_aim(&mut sink));
        assert_eq!(c.state(), ShotState::Idle);
    }

    #[test]
    fn release_shot_is_only_legal_in_spin() {
        let (mut c, mut bodies, mut sink) = harness(4);

        assert!(!c.release_shot(&mut bodies, &mut sink));
        assert_eq!(c.state(), ShotState::Idle);

        c.start_aim(&mut sink);
        assert!(!c.release_shot(&mut bodies, &mut sink));
        assert_eq!(c.state(), ShotState::Aiming);

        c.start_power(&mut sink);
        assert!(!c.release_shot(&mut bodies, &mut sink));
        assert_eq!(c.state(), ShotState::Power);

        c.set_power(&mut sink);
        assert!(c.release_shot(&mut bodies, &mut sink));

        // Already moving: a second release is rejected.
        assert!(!c.release_shot(&mut bodies, &mut sink));
    }

    #[test]
    fn energy_stays_within_bounds() {
        let (mut c, _bodies, mut sink) = harness(3);

        for _ in 0..10 {
            c.use_energy(&mut sink);
            assert!(c.energy() <= 3);
        }
        assert_eq!(c.energy(), 0);

        for _ in 0..10 {
            c.replenish_energy(2, &mut sink);
            assert!(c.energy() <= 3);
        }
        assert_eq!(c.energy(), 3);
    }

    #[test]
    fn aim_adjustment_is_limited_to_aiming_and_power() {
        let (mut c, _bodies, mut sink) = harness(4);
        assert!(!c.adjust_aim(AimStep::Left));

        c.start_aim(&mut sink);
        let before = c.aim();
        assert!(c.adjust_aim(AimStep::LeftLarge));
        assert!((c.aim() - before).norm() > 0.0);
        assert!((c.aim().norm() - 1.0).abs() < 1.0e-6);

        c.start_power(&mut sink);
        assert!(c.adjust_aim(AimStep::Right));

        c.set_power(&mut sink);
        assert!(!c.adjust_aim(AimStep::Right));
    }

    #[test]
    fn spin_is_only_mutable_in_spin_state() {
        let (mut c, _bodies, mut sink) = harness(4);
        assert!(!c.apply_spin(SpinKind::Back, 1.0, &mut sink));

        c.start_aim(&mut sink);
        c.start_power(&mut sink);
        assert!(!c.apply_spin(SpinKind::Back, 1.0, &mut sink));

        c.set_power(&mut sink);
        assert!(c.apply_spin(SpinKind::Back, 1.0, &mut sink));
        assert_eq!(c.spin().back, 1.0);
    }

    #[test]
    fn add_bounce_requires_moving_and_is_free() {
        let (mut c, mut bodies, mut sink) = harness(4);
        assert!(!c.add_bounce(&mut bodies, &mut sink));

        c.start_aim(&mut sink);
        c.start_power(&mut sink);
        c.set_power(&mut sink);
        c.release_shot(&mut bodies, &mut sink);
        let energy_after_shot = c.energy();

        assert!(c.add_bounce(&mut bodies, &mut sink));
        assert!(c.is_airborne());
        assert_eq!(c.energy(), energy_after_shot);
    }

    #[test]
    fn reset_returns_to_idle_and_clears_shot_state() {
        let (mut c, mut bodies, mut sink) = harness(4);
        c.start_aim(&mut sink);
        c.start_power(&mut sink);
        c.update(0.3, &mut bodies, &mut sink);
        c.set_power(&mut sink);
        c.apply_spin(SpinKind::Left, 0.7, &mut sink);
        c.release_shot(&mut bodies, &mut sink);

        assert!(c.reset(&mut bodies, &mut sink));
        assert_eq!(c.state(), ShotState::Idle);
        assert!(c.spin().is_zero());
        assert!(!c.is_airborne());
        // Energy is preserved across a reset.
        assert_eq!(c.energy(), 3);
    }

    #[test]
    fn activating_a_power_up_replaces_the_previous_one() {
        let (mut c, mut bodies, mut sink) = harness(4);

        c.collect_power_up(
            PowerUpKind::SuperShot {
                multiplier: 2.0,
                duration: 10.0,
            },
            &mut bodies,
            &mut sink,
        );
        assert_eq!(c.modifiers.power_multiplier, 2.0);

        c.collect_power_up(
            PowerUpKind::StickyBall {
                extra_damping: 2.0,
                duration: 10.0,
            },
            &mut bodies,
            &mut sink,
        );
        // SuperShot fully reverted, sticky in force, exactly one active.
        assert_eq!(c.modifiers.power_multiplier, 1.0);
        assert_eq!(c.modifiers.ground_damping, 2.0);
        assert!(matches!(
            c.active_power_up(),
            Some(PowerUpKind::StickyBall { .. })
        ));
    }

    #[test]
    fn power_up_expires_after_its_duration() {
        let (mut c, mut bodies, mut sink) = harness(4);
        c.collect_power_up(
            PowerUpKind::SuperShot {
                multiplier: 2.0,
                duration: 1.0,
            },
            &mut bodies,
            &mut sink,
        );

        c.update(0.6, &mut bodies, &mut sink);
        assert!(c.active_power_up().is_some());

        c.update(0.6, &mut bodies, &mut sink);
        assert!(c.active_power_up().is_none());
        assert_eq!(c.modifiers, ShotModifiers::default());

        let events = sink.drain();
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::PowerUpDeactivated { .. })));
    }

    #[test]
    fn energy_power_up_replenishes_instantly() {
        let (mut c, mut bodies, mut sink) = harness(4);
        c.use_energy(&mut sink);
        c.use_energy(&mut sink);
        assert_eq!(c.energy(), 2);

        c.collect_power_up(PowerUpKind::Energy { amount: 5 }, &mut bodies, &mut sink);
        assert_eq!(c.energy(), 4);
        assert!(c.active_power_up().is_none());
    }

    #[test]
    fn hole_sink_animation_runs_on_its_timer() {
        let (mut c, mut bodies, mut sink) = harness(4);
        assert!(c.begin_hole_sink(&mut bodies, &mut sink));
        // Re-entry is rejected while running.
        assert!(!c.begin_hole_sink(&mut bodies, &mut sink));

        c.update(0.5, &mut bodies, &mut sink);
        assert!(!c.is_hidden());

        c.update(0.6, &mut bodies, &mut sink);
        assert!(c.is_hidden());

        let events = sink.drain();
        assert!(events.contains(&GameEvent::HoleAnimationStarted));
        assert!(events.contains(&GameEvent::HoleAnimationCompleted));
    }

    #[test]
    fn preview_is_deterministic_and_only_available_while_lining_up() {
        let (mut c, mut bodies, mut sink) = harness(4);
        assert!(c.preview(Vec3::zeros()).is_none());

        c.start_aim(&mut sink);
        c.start_power(&mut sink);
        c.update(0.4, &mut bodies, &mut sink);
        c.set_power(&mut sink);

        let a = c.preview(Vec3::new(0.0, 0.5, 0.0)).unwrap();
        let b = c.preview(Vec3::new(0.0, 0.5, 0.0)).unwrap();
        assert_eq!(a, b);
    }
}
