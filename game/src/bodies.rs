/*!
Physics body adapter: the translation layer between game entities and
engine-side body/collider handles.

The rigid-body world is a single process-wide resource exclusively owned and
mutated here; no other component touches engine-native handles directly.

Contract
- Everything short-circuits safely before [`PhysicsBodies::init`] completes:
  creation fails with a logged warning, impulses are dropped, velocity reads
  return the zero vector, queries return `None`. Callers must treat a zero
  vector as "no motion", never as an error signal.
- Every body/collider creation registers entries in id-keyed maps (and a
  collider-to-entity reverse index) so later lookups are O(1). Removal
  clears all of them.
- Collider descriptors are retained per entity: the engine-side handle is an
  ephemeral cache, rebuildable from the stored [`ColliderDef`] at any time.
*/

use std::collections::HashMap;

use rapier3d::prelude::{
    ColliderHandle, QueryFilter, Ray, RigidBodyBuilder, RigidBodyHandle, point,
};

use sim::{ColliderDef, MaterialTable, Transform, Vec3, collider_from_def};

use crate::contacts::PairEvent;
use crate::entity::EntityId;
use crate::world::{ContactEvent, RapierWorld};

/// How an entity participates in the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyKind {
    /// Immovable course geometry.
    Static,
    /// Script-driven mover (platforms); unaffected by forces.
    Kinematic,
    /// Fully simulated (the roller).
    Dynamic,
}

/// Result of a successful raycast.
#[derive(Clone, Copy, Debug)]
pub struct RayHit {
    pub entity: EntityId,
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
}

/// Adapter between game entities and the rapier world.
pub struct PhysicsBodies {
    /// `None` until [`PhysicsBodies::init`] runs; the init barrier every
    /// operation checks.
    world: Option<RapierWorld>,
    materials: MaterialTable,
    bodies: HashMap<EntityId, RigidBodyHandle>,
    colliders: HashMap<EntityId, ColliderHandle>,
    /// Reverse index for O(1) entity lookup from engine collision events.
    entity_by_collider: HashMap<ColliderHandle, EntityId>,
    /// Retained descriptors; the source of truth the engine-side cache is
    /// rebuilt from.
    defs: HashMap<EntityId, ColliderDef>,
}

impl PhysicsBodies {
    pub fn new(materials: MaterialTable) -> Self {
        Self {
            world: None,
            materials,
            bodies: HashMap::new(),
            colliders: HashMap::new(),
            entity_by_collider: HashMap::new(),
            defs: HashMap::new(),
        }
    }

    /// One-time engine setup. Until this runs, every other operation is a
    /// checked no-op rather than a crash.
    pub fn init(&mut self, gravity: Vec3) -> bool {
        if self.world.is_some() {
            log::warn!("physics world already initialized; ignoring init");
            return true;
        }
        self.world = Some(RapierWorld::new(gravity));
        true
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.world.is_some()
    }

    pub fn materials(&self) -> &MaterialTable {
        &self.materials
    }

    /// Create (or rebuild) the body and collider for `entity`.
    ///
    /// Returns `false` with a logged warning when the engine is not yet
    /// initialized. An existing body for the same entity is removed first,
    /// so shape-defining changes rebuild the engine-side cache in place.
    pub fn create_body(
        &mut self,
        entity: EntityId,
        kind: BodyKind,
        def: &ColliderDef,
        transform: Transform,
    ) -> bool {
        if self.world.is_none() {
            log::warn!("create_body({entity}) before physics init; ignored");
            return false;
        }
        if self.bodies.contains_key(&entity) {
            self.remove_body(entity);
        }

        // Checked above; re-borrowed here so remove_body could run.
        let Some(world) = self.world.as_mut() else {
            return false;
        };

        let builder = match kind {
            BodyKind::Static => RigidBodyBuilder::fixed(),
            BodyKind::Kinematic => RigidBodyBuilder::kinematic_position_based(),
            BodyKind::Dynamic => RigidBodyBuilder::dynamic().ccd_enabled(true),
        };
        let body = world.bodies.insert(builder.pose(transform.iso()));
        let collider = world.attach_collider(collider_from_def(def, &self.materials), body);

        self.bodies.insert(entity, body);
        self.colliders.insert(entity, collider);
        self.entity_by_collider.insert(collider, entity);
        self.defs.insert(entity, def.clone());
        true
    }

    /// Remove `entity`'s body and collider. Removing an absent body is a
    /// no-op; all maps (including the reverse index) are cleared together.
    pub fn remove_body(&mut self, entity: EntityId) {
        let (Some(body), Some(collider)) =
            (self.bodies.remove(&entity), self.colliders.remove(&entity))
        else {
            return;
        };
        self.entity_by_collider.remove(&collider);
        self.defs.remove(&entity);
        if let Some(world) = self.world.as_mut() {
            world.remove_body(collider, body);
        }
    }

    /// O(1) lookup of the entity owning an engine collider handle.
    #[inline]
    pub fn entity_of_collider(&self, handle: ColliderHandle) -> Option<EntityId> {
        self.entity_by_collider.get(&handle).copied()
    }

    pub fn apply_impulse(&mut self, entity: EntityId, impulse: Vec3, wake: bool) {
        if let Some(body) = self.body_mut(entity) {
            body.apply_impulse(impulse, wake);
        }
    }

    /// Continuous torque, forwarded verbatim to the engine.
    pub fn apply_torque(&mut self, entity: EntityId, torque: Vec3, wake: bool) {
        if let Some(body) = self.body_mut(entity) {
            body.add_torque(torque, wake);
        }
    }

    pub fn apply_angular_impulse(&mut self, entity: EntityId, impulse: Vec3, wake: bool) {
        if let Some(body) = self.body_mut(entity) {
            body.apply_torque_impulse(impulse, wake);
        }
    }

    /// Linear velocity, or zero when the body is missing or the engine is
    /// uninitialized.
    pub fn linvel(&self, entity: EntityId) -> Vec3 {
        self.body(entity)
            .map(|b| *b.linvel())
            .unwrap_or_else(Vec3::zeros)
    }

    /// Angular velocity, with the same zero-vector degrade as [`linvel`].
    ///
    /// [`linvel`]: PhysicsBodies::linvel
    pub fn angvel(&self, entity: EntityId) -> Vec3 {
        self.body(entity)
            .map(|b| *b.angvel())
            .unwrap_or_else(Vec3::zeros)
    }

    /// Setting a velocity always wakes the body.
    pub fn set_linvel(&mut self, entity: EntityId, vel: Vec3) {
        if let Some(body) = self.body_mut(entity) {
            body.set_linvel(vel, true);
        }
    }

    pub fn set_angvel(&mut self, entity: EntityId, vel: Vec3) {
        if let Some(body) = self.body_mut(entity) {
            body.set_angvel(vel, true);
        }
    }

    /// World transform of `entity`, refreshed from the engine.
    pub fn transform(&self, entity: EntityId) -> Option<Transform> {
        self.body(entity)
            .map(|b| Transform::new(*b.translation(), *b.rotation()))
    }

    pub fn set_translation(&mut self, entity: EntityId, translation: Vec3) {
        if let Some(body) = self.body_mut(entity) {
            body.set_translation(translation, true);
        }
    }

    /// Override the restitution on `entity`'s collider (bouncy power-up).
    pub fn set_restitution(&mut self, entity: EntityId, restitution: f32) {
        let Some(&handle) = self.colliders.get(&entity) else {
            return;
        };
        if let Some(world) = self.world.as_mut() {
            if let Some(collider) = world.colliders.get_mut(handle) {
                collider.set_restitution(restitution);
            }
        }
    }

    /// Restore the restitution recorded in `entity`'s material.
    pub fn restore_restitution(&mut self, entity: EntityId) {
        let Some(def) = self.defs.get(&entity) else {
            return;
        };
        let restitution = self.materials.get(&def.material).restitution;
        self.set_restitution(entity, restitution);
    }

    /// Cast a ray; the direction is normalized internally. `None` means no
    /// hit within `max_distance` (or an uninitialized engine).
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        let world = self.world.as_ref()?;
        let len = direction.norm();
        if len <= sim::settings::DIST_EPS {
            return None;
        }
        let dir = direction / len;

        let ray = Ray::new(point![origin.x, origin.y, origin.z], dir);
        let pipeline = world.query_pipeline(QueryFilter::default());
        let (handle, hit) = pipeline.cast_ray_and_get_normal(&ray, max_distance, true)?;

        // Defensive: the engine may report colliders the game layer has
        // already released.
        let entity = self.entity_of_collider(handle)?;
        Some(RayHit {
            entity,
            point: ray.point_at(hit.time_of_impact).coords,
            normal: hit.normal,
            distance: hit.time_of_impact,
        })
    }

    /// Advance the engine one step. A no-op (empty event list) before init.
    pub fn step(&mut self, dt: f32) -> Vec<ContactEvent> {
        match self.world.as_mut() {
            Some(world) => world.step(dt),
            None => Vec::new(),
        }
    }

    /// Map raw engine events to entity pairs with trigger classification.
    ///
    /// A pair is routed to the trigger channel iff either side's collider is
    /// a sensor. Events referencing handles with no tracked entity are
    /// silently dropped: the engine may emit events for colliders already
    /// released by the game layer. On `end` events the collider itself may
    /// be gone, so sensor-ness falls back to the retained descriptor.
    pub fn map_contact_events(&self, events: &[ContactEvent]) -> Vec<PairEvent> {
        events
            .iter()
            .filter_map(|event| {
                let a = self.entity_of_collider(event.collider1)?;
                let b = self.entity_of_collider(event.collider2)?;
                let trigger = self.is_sensor(a) || self.is_sensor(b);
                Some(PairEvent {
                    a,
                    b,
                    trigger,
                    started: event.started,
                })
            })
            .collect()
    }

    pub fn flip_gravity(&mut self) {
        if let Some(world) = self.world.as_mut() {
            world.flip_gravity();
        }
    }

    pub fn gravity(&self) -> Vec3 {
        self.world
            .as_ref()
            .map(|w| w.gravity())
            .unwrap_or_else(Vec3::zeros)
    }

    fn is_sensor(&self, entity: EntityId) -> bool {
        self.defs.get(&entity).is_some_and(|d| d.sensor)
    }

    fn body(&self, entity: EntityId) -> Option<&rapier3d::prelude::RigidBody> {
        let world = self.world.as_ref()?;
        let handle = self.bodies.get(&entity)?;
        world.bodies.get(*handle)
    }

    fn body_mut(&mut self, entity: EntityId) -> Option<&mut rapier3d::prelude::RigidBody> {
        let world = self.world.as_mut()?;
        let handle = self.bodies.get(&entity)?;
        world.bodies.get_mut(*handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim::ColliderShapeDef;

    fn ball_def() -> ColliderDef {
        ColliderDef::solid(ColliderShapeDef::Sphere { radius: 0.25 }).with_material("roller")
    }

    fn gravity() -> Vec3 {
        Vec3::new(0.0, -9.81, 0.0)
    }

    #[test]
    fn operations_before_init_degrade_safely() {
        let mut bodies = PhysicsBodies::new(MaterialTable::with_defaults());

        assert!(!bodies.create_body(
            1,
            BodyKind::Dynamic,
            &ball_def(),
            Transform::at(Vec3::zeros())
        ));
        bodies.apply_impulse(1, Vec3::new(1.0, 0.0, 0.0), true);
        assert_eq!(bodies.linvel(1), Vec3::zeros());
        assert_eq!(bodies.angvel(1), Vec3::zeros());
        assert!(bodies.transform(1).is_none());
        assert!(bodies
            .raycast(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -1.0, 0.0), 10.0)
            .is_none());
        assert!(bodies.step(1.0 / 60.0).is_empty());
    }

    #[test]
    fn missing_body_reads_as_zero_motion() {
        let mut bodies = PhysicsBodies::new(MaterialTable::with_defaults());
        bodies.init(gravity());
        assert_eq!(bodies.linvel(42), Vec3::zeros());
        bodies.set_linvel(42, Vec3::new(1.0, 0.0, 0.0));
        bodies.remove_body(42);
        bodies.remove_body(42);
    }

    #[test]
    fn create_registers_maps_and_remove_clears_them() {
        let mut bodies = PhysicsBodies::new(MaterialTable::with_defaults());
        bodies.init(gravity());

        assert!(bodies.create_body(
            7,
            BodyKind::Dynamic,
            &ball_def(),
            Transform::at(Vec3::new(0.0, 1.0, 0.0))
        ));
        let handle = *bodies.colliders.get(&7).unwrap();
        assert_eq!(bodies.entity_of_collider(handle), Some(7));

        bodies.remove_body(7);
        assert_eq!(bodies.entity_of_collider(handle), None);
        assert!(bodies.transform(7).is_none());
        // Idempotent.
        bodies.remove_body(7);
    }

    #[test]
    fn impulse_changes_velocity_after_step() {
        let mut bodies = PhysicsBodies::new(MaterialTable::with_defaults());
        bodies.init(gravity());
        bodies.create_body(
            1,
            BodyKind::Dynamic,
            &ball_def(),
            Transform::at(Vec3::new(0.0, 5.0, 0.0)),
        );

        bodies.apply_impulse(1, Vec3::new(2.0, 0.0, 0.0), true);
        bodies.step(1.0 / 60.0);

        assert!(bodies.linvel(1).x > 0.0);
    }

    #[test]
    fn raycast_hits_ground_slab() {
        let mut bodies = PhysicsBodies::new(MaterialTable::with_defaults());
        bodies.init(gravity());
        bodies.create_body(
            1,
            BodyKind::Static,
            &ColliderDef::solid(ColliderShapeDef::Box {
                half_extents: Vec3::new(10.0, 0.5, 10.0),
            }),
            Transform::at(Vec3::new(0.0, -0.5, 0.0)),
        );

        // Direction deliberately unnormalized.
        let hit = bodies
            .raycast(Vec3::new(0.0, 2.0, 0.0), Vec3::new(0.0, -3.0, 0.0), 10.0)
            .expect("expected ground hit");
        assert_eq!(hit.entity, 1);
        assert!((hit.point.y - 0.0).abs() < 1.0e-3);
        assert!(hit.normal.y > 0.9);
    }

    #[test]
    fn restitution_override_and_restore() {
        let mut bodies = PhysicsBodies::new(MaterialTable::with_defaults());
        bodies.init(gravity());
        bodies.create_body(
            1,
            BodyKind::Dynamic,
            &ball_def(),
            Transform::at(Vec3::new(0.0, 1.0, 0.0)),
        );

        bodies.set_restitution(1, 0.95);
        bodies.restore_restitution(1);
        // The restore goes back to the "roller" material value.
        let expected = bodies.materials().get("roller").restitution;
        let handle = *bodies.colliders.get(&1).unwrap();
        let world = bodies.world.as_ref().unwrap();
        let actual = world.colliders.get(handle).unwrap().restitution();
        assert!((actual - expected).abs() < 1.0e-6);
    }
}
