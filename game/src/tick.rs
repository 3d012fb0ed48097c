/*!
The fixed-role frame loop driving one course.

Per frame, in order: gameplay input is applied to the shot state machine,
the controller runs its per-frame update (so impulses requested this frame
are integrated starting this step), the engine advances exactly one step,
and the collision events observed during that step are drained into the
contact tracker, whose detections feed back into the state machine. Derived
events accumulate in a queue for the rendering/UI collaborators to drain.

Single-threaded and cooperative: nothing here suspends or cancels mid-step.
Before [`CourseRunner::init`] completes, ticking is a safe no-op.
*/

use sim::trajectory::Trajectory;
use sim::{ColliderDef, MaterialTable, Transform, Vec3, horizontal_speed};

use crate::bodies::{BodyKind, PhysicsBodies};
use crate::contacts::{ContactOutcome, ContactTracker};
use crate::entity::{EntityId, EntityKind};
use crate::events::{EventQueue, GameEvent};
use crate::roller::{RollerController, ShotCommand, ShotSettings};

/// Owns the adapter, tracker, controller, and event queue for one course.
pub struct CourseRunner {
    bodies: PhysicsBodies,
    tracker: ContactTracker,
    roller: RollerController,
    events: EventQueue,
}

impl CourseRunner {
    /// Build a runner with an uninitialized engine. Call
    /// [`CourseRunner::init`] before spawning entities or ticking.
    pub fn new(
        materials: MaterialTable,
        roller_id: EntityId,
        spawn: Vec3,
        settings: ShotSettings,
    ) -> Self {
        Self {
            bodies: PhysicsBodies::new(materials),
            tracker: ContactTracker::new(),
            roller: RollerController::new(roller_id, spawn, settings),
            events: EventQueue::new(),
        }
    }

    /// One-time setup barrier: initialize the engine and spawn the roller's
    /// dynamic body at its spawn position.
    pub fn init(&mut self, gravity: Vec3, roller_def: &ColliderDef) -> bool {
        if !self.bodies.init(gravity) {
            return false;
        }
        let created = self.bodies.create_body(
            self.roller.entity(),
            BodyKind::Dynamic,
            roller_def,
            Transform::at(self.roller.spawn()),
        );
        if created {
            self.tracker.register(self.roller.entity(), EntityKind::Roller);
        }
        created
    }

    /// Add a course entity (terrain, wall, obstacle, power-up, hole).
    pub fn spawn_entity(
        &mut self,
        id: EntityId,
        kind: EntityKind,
        body_kind: BodyKind,
        def: &ColliderDef,
        transform: Transform,
    ) -> bool {
        if !self.bodies.create_body(id, body_kind, def, transform) {
            return false;
        }
        self.tracker.register(id, kind);
        true
    }

    /// Remove an entity, firing contact exits for anything it was touching.
    pub fn despawn_entity(&mut self, id: EntityId) {
        self.bodies.remove_body(id);
        self.tracker.unregister(id, &mut self.events);
    }

    /// Advance the course by one frame.
    pub fn tick(&mut self, dt: f32, commands: &[ShotCommand]) {
        // 1) Input is applied before the step so a shot released this frame
        //    is integrated starting this physics step.
        for &command in commands {
            self.roller
                .apply_command(command, &mut self.bodies, &mut self.events);
        }

        // 2) Controller frame update (meter sweep, power-up expiry, rest
        //    detection, sink animation).
        self.roller.update(dt, &mut self.bodies, &mut self.events);

        // 3) Exactly one physics step; a no-op before init.
        let raw_events = self.bodies.step(dt);

        // 4) Drain collision events into the tracker.
        let pair_events = self.bodies.map_contact_events(&raw_events);
        let roller_speed = horizontal_speed(&self.bodies.linvel(self.roller.entity()));
        let outcomes = self
            .tracker
            .process(&pair_events, roller_speed, &mut self.events);

        // 5) Gameplay reactions to tracked detections.
        for outcome in outcomes {
            match outcome {
                ContactOutcome::PowerUpCollected { entity, kind } => {
                    self.roller
                        .collect_power_up(kind, &mut self.bodies, &mut self.events);
                    // Consumed: the pickup leaves the course.
                    self.despawn_entity(entity);
                }
                ContactOutcome::HoleReached { .. } => {
                    self.roller.begin_hole_sink(&mut self.bodies, &mut self.events);
                }
            }
        }
    }

    /// Remove and return the events produced since the last drain.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain()
    }

    pub fn roller(&self) -> &RollerController {
        &self.roller
    }

    pub fn bodies(&self) -> &PhysicsBodies {
        &self.bodies
    }

    /// Roller transform for the rendering collaborator, refreshed from the
    /// engine after the latest step.
    pub fn roller_transform(&self) -> Option<Transform> {
        self.bodies.transform(self.roller.entity())
    }

    /// Forward-predicted trajectory for the preview overlay.
    pub fn preview(&self) -> Option<Trajectory> {
        let start = self
            .roller_transform()
            .map(|t| t.translation)
            .unwrap_or_else(|| self.roller.spawn());
        self.roller.preview(start)
    }
}
