//! Game-layer entity identity and classification.
//!
//! The physics engine deals in body/collider handles; gameplay deals in
//! [`EntityId`]s. The adapter maintains the mapping between the two, and the
//! contact tracker consults [`EntityKind`] to decide which overlaps are
//! gameplay-relevant (power-up pickup, hole capture).

use crate::powerup::PowerUpKind;

/// Stable unique identifier for any course entity (roller, terrain piece,
/// obstacle, power-up, hole).
///
/// Assigned by the course loader; never reused within a course. Engine-side
/// handles are ephemeral caches keyed by this id.
pub type EntityId = u64;

/// Gameplay classification of an entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EntityKind {
    /// The player-controlled ball.
    Roller,
    /// Walkable/rollable course surface.
    Ground,
    /// Boundary geometry the roller bounces off.
    Wall,
    /// Placed obstacle.
    Obstacle,
    /// Collectible modifier, consumed on pickup.
    PowerUp(PowerUpKind),
    /// The target hole; capture completes the course.
    Hole,
}

impl EntityKind {
    #[inline]
    pub fn is_roller(&self) -> bool {
        matches!(self, EntityKind::Roller)
    }

    #[inline]
    pub fn is_hole(&self) -> bool {
        matches!(self, EntityKind::Hole)
    }

    #[inline]
    pub fn as_power_up(&self) -> Option<PowerUpKind> {
        match self {
            EntityKind::PowerUp(kind) => Some(*kind),
            _ => None,
        }
    }
}
