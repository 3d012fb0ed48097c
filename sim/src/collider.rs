use nalgebra as na;
use rapier3d::prelude::*;

use crate::material::MaterialTable;
use crate::types::Vec3;

/// Collider shapes supported by course entities.
///
/// Keep this intentionally small and deterministic. Extend as needed.
#[derive(Clone, Debug)]
pub enum ColliderShapeDef {
    /// Oriented box with given half-extents (meters).
    Box { half_extents: Vec3 },

    /// Sphere/ball (meters).
    Sphere { radius: f32 },

    /// Y-aligned capsule (meters).
    CapsuleY { radius: f32, half_height: f32 },

    /// Y-aligned cylinder (meters).
    CylinderY { radius: f32, half_height: f32 },

    /// Convex hull of a world-local point cloud (meters).
    ///
    /// Degenerate point sets (fewer than four non-coplanar points) cannot
    /// form a hull; construction falls back to [`FALLBACK_RADIUS`] sphere.
    Convex { points: Vec<Vec3> },
}

/// Radius of the sphere substituted for an unbuildable shape (meters).
pub const FALLBACK_RADIUS: f32 = 0.5;

/// Canonical, engine-agnostic description of one entity's collider.
///
/// The engine-side collider handle is an ephemeral cache entry: it can be
/// rebuilt from these fields at any time, e.g. after a shape-defining
/// property changes.
///
/// Conventions
/// - Units are meters.
/// - `offset` is expressed relative to the owning entity's body.
/// - `membership`/`filter` are collision-layer bitmasks (rapier group bits).
#[derive(Clone, Debug)]
pub struct ColliderDef {
    pub shape: ColliderShapeDef,
    /// Sensor colliders detect overlap without a physical collision response.
    pub sensor: bool,
    /// Key into the friction/restitution [`MaterialTable`].
    pub material: String,
    /// Collision-layer membership bitmask.
    pub membership: u32,
    /// Collision-layer filter bitmask (which layers this collider touches).
    pub filter: u32,
    /// Local offset relative to the owning body (meters).
    pub offset: Vec3,
    /// Explicit mass (kg). `None` derives mass from shape density.
    pub mass: Option<f32>,
}

impl ColliderDef {
    /// A solid collider on all layers using the default material.
    pub fn solid(shape: ColliderShapeDef) -> Self {
        Self {
            shape,
            sensor: false,
            material: crate::material::DEFAULT_MATERIAL.to_owned(),
            membership: u32::MAX,
            filter: u32::MAX,
            offset: Vec3::zeros(),
            mass: None,
        }
    }

    /// A sensor (trigger) collider on all layers using the default material.
    pub fn trigger(shape: ColliderShapeDef) -> Self {
        Self {
            sensor: true,
            ..Self::solid(shape)
        }
    }

    pub fn with_material(mut self, name: &str) -> Self {
        self.material = name.to_owned();
        self
    }

    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_layers(mut self, membership: u32, filter: u32) -> Self {
        self.membership = membership;
        self.filter = filter;
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = Some(mass);
        self
    }
}

/// Build a rapier collider from a [`ColliderDef`].
///
/// The collider is created with its `offset` as the local transform relative
/// to the parent body, so callers attach it with `insert_with_parent`.
///
/// Collision events are always enabled: the contact tracker derives its
/// enter/stay/exit semantics from the engine's begin/end event stream.
pub fn collider_from_def(def: &ColliderDef, materials: &MaterialTable) -> Collider {
    let material = materials.get(&def.material);

    let builder = match &def.shape {
        ColliderShapeDef::Box { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
        }

        ColliderShapeDef::Sphere { radius } => ColliderBuilder::ball(*radius),

        ColliderShapeDef::CapsuleY {
            radius,
            half_height,
        } => ColliderBuilder::capsule_y(*half_height, *radius),

        ColliderShapeDef::CylinderY {
            radius,
            half_height,
        } => ColliderBuilder::cylinder(*half_height, *radius),

        ColliderShapeDef::Convex { points } => {
            let points: Vec<na::Point3<f32>> =
                points.iter().map(|p| na::Point3::from(*p)).collect();
            // Hull construction fails on degenerate input; degrade to a
            // default sphere rather than refusing to create the entity.
            ColliderBuilder::convex_hull(&points)
                .unwrap_or_else(|| ColliderBuilder::ball(FALLBACK_RADIUS))
        }
    };

    let builder = match def.mass {
        Some(mass) => builder.mass(mass),
        None => builder,
    };

    builder
        .sensor(def.sensor)
        .friction(material.friction)
        .restitution(material.restitution)
        .collision_groups(InteractionGroups::new(
            Group::from_bits_truncate(def.membership),
            Group::from_bits_truncate(def.filter),
            InteractionTestMode::And,
        ))
        .translation(def.offset)
        .active_events(ActiveEvents::COLLISION_EVENTS)
        .build()
}
