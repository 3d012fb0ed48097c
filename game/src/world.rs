/*!
Rapier-backed dynamic world owned by the physics adapter.

This wraps the engine-native state (body/collider sets, broad/narrow phase,
solver pipeline) behind the small surface the game layer uses: step once,
drain collision events, run scene queries, adjust gravity.

Design notes
- Exactly one engine step per call to [`RapierWorld::step`]; the caller
  sequences it once per frame after gameplay input has been applied, so a
  shot released this frame is integrated starting this step.
- Collision begin/end events are captured through rapier's `EventHandler`
  during the step and returned as plain [`ContactEvent`] records for the
  contact tracker to consume.
- No other component touches the rapier sets directly; all mutation goes
  through the adapter in `bodies`.
*/

use rapier3d::prelude::*;
use std::sync::Mutex;

/// One collision begin/end record drained after a step.
///
/// Handles are engine-side; the adapter maps them to entity ids (and drops
/// records whose handles it no longer tracks).
#[derive(Clone, Copy, Debug)]
pub struct ContactEvent {
    pub collider1: ColliderHandle,
    pub collider2: ColliderHandle,
    /// `true` for contact begin, `false` for contact end.
    pub started: bool,
}

/// Collects rapier collision events during a step.
///
/// Rapier invokes the handler through `&self` (the solver may be internally
/// parallel), so the buffer sits behind a mutex. Contention is nil: events
/// are pushed during the step and drained strictly after it.
#[derive(Default)]
struct ContactEventCollector {
    events: Mutex<Vec<ContactEvent>>,
}

impl EventHandler for ContactEventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        let record = match event {
            CollisionEvent::Started(collider1, collider2, _) => ContactEvent {
                collider1,
                collider2,
                started: true,
            },
            CollisionEvent::Stopped(collider1, collider2, _) => ContactEvent {
                collider1,
                collider2,
                started: false,
            },
        };
        if let Ok(mut events) = self.events.lock() {
            events.push(record);
        }
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}

/// In-memory rapier structures for the live course simulation.
pub struct RapierWorld {
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    islands: IslandManager,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    pipeline: PhysicsPipeline,
    params: IntegrationParameters,
    gravity: Vector<f32>,
}

impl RapierWorld {
    pub fn new(gravity: Vector<f32>) -> Self {
        Self {
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            islands: IslandManager::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            pipeline: PhysicsPipeline::new(),
            params: IntegrationParameters::default(),
            gravity,
        }
    }

    /// Advance the simulation by one step of `dt` seconds and return the
    /// collision events observed during that step.
    pub fn step(&mut self, dt: f32) -> Vec<ContactEvent> {
        self.params.dt = dt;

        let collector = ContactEventCollector::default();
        let hooks = ();

        self.pipeline.step(
            &self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            &hooks,
            &collector,
        );

        collector.events.into_inner().unwrap_or_default()
    }

    /// Create a borrowed `QueryPipeline` view suitable for scene queries.
    ///
    /// The returned pipeline borrows `self`, so it should be used within the
    /// scope of the borrow.
    pub fn query_pipeline<'a>(&'a self, filter: QueryFilter<'a>) -> QueryPipeline<'a> {
        self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            filter,
        )
    }

    /// Attach a collider to an existing body.
    pub fn attach_collider(&mut self, collider: Collider, body: RigidBodyHandle) -> ColliderHandle {
        self.colliders
            .insert_with_parent(collider, body, &mut self.bodies)
    }

    /// Remove a collider and its parent body. Absent handles are no-ops.
    pub fn remove_body(&mut self, collider: ColliderHandle, body: RigidBodyHandle) {
        self.colliders
            .remove(collider, &mut self.islands, &mut self.bodies, false);
        self.bodies.remove(
            body,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    pub fn gravity(&self) -> Vector<f32> {
        self.gravity
    }

    pub fn set_gravity(&mut self, gravity: Vector<f32>) {
        self.gravity = gravity;
    }

    /// Invert world gravity (anti-gravity power-up). Calling twice restores
    /// the original field.
    pub fn flip_gravity(&mut self) {
        self.gravity = -self.gravity;
    }
}
