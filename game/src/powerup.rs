//! Power-up variants and their apply/revert pairs.
//!
//! Each variant carries exactly the fields it needs; `apply` and `revert`
//! touch exactly the fields that variant owns, so deactivation restores the
//! roller to its unmodified state. Effects that reach beyond the shot
//! modifiers (world gravity, the roller collider's restitution) are returned
//! as a [`WorldEffect`] for the caller to forward through the adapter.

/// A collectible modifier altering roller physics or the world.
///
/// Durations are in seconds; `f32::INFINITY` means "until reset".
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PowerUpKind {
    /// Instantly replenishes shot energy on pickup. Never "active".
    Energy { amount: u32 },
    /// Multiplies committed shot power.
    SuperShot { multiplier: f32, duration: f32 },
    /// Extra horizontal damping while grounded, for precise stops.
    StickyBall { extra_damping: f32, duration: f32 },
    /// Raises the roller collider's restitution.
    BouncyBall { restitution: f32, duration: f32 },
    /// Flips world gravity.
    AntiGravity { duration: f32 },
}

impl PowerUpKind {
    /// Active duration in seconds; `None` for instant pickups.
    pub fn duration(&self) -> Option<f32> {
        match self {
            PowerUpKind::Energy { .. } => None,
            PowerUpKind::SuperShot { duration, .. }
            | PowerUpKind::StickyBall { duration, .. }
            | PowerUpKind::BouncyBall { duration, .. }
            | PowerUpKind::AntiGravity { duration } => Some(*duration),
        }
    }
}

/// Roller-local fields power-ups may modify.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShotModifiers {
    /// Committed shot power is multiplied by this at release.
    pub power_multiplier: f32,
    /// Extra per-second horizontal damping applied while grounded.
    pub ground_damping: f32,
    /// Whether the bouncy-ball modifier is in force.
    pub bouncy: bool,
}

impl Default for ShotModifiers {
    fn default() -> Self {
        Self {
            power_multiplier: 1.0,
            ground_damping: 0.0,
            bouncy: false,
        }
    }
}

/// World-level side effect of activating or reverting a power-up, forwarded
/// through the physics adapter by the caller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WorldEffect {
    None,
    FlipGravity,
    /// Set the roller collider's restitution to the given value.
    SetRollerRestitution(f32),
    /// Restore the roller collider's restitution from its material.
    RestoreRollerRestitution,
}

/// Mutate `mods` for an activated power-up and report the world effect.
pub fn apply(kind: &PowerUpKind, mods: &mut ShotModifiers) -> WorldEffect {
    match kind {
        PowerUpKind::Energy { .. } => WorldEffect::None,
        PowerUpKind::SuperShot { multiplier, .. } => {
            mods.power_multiplier = *multiplier;
            WorldEffect::None
        }
        PowerUpKind::StickyBall { extra_damping, .. } => {
            mods.ground_damping = *extra_damping;
            WorldEffect::None
        }
        PowerUpKind::BouncyBall { restitution, .. } => {
            mods.bouncy = true;
            WorldEffect::SetRollerRestitution(*restitution)
        }
        PowerUpKind::AntiGravity { .. } => WorldEffect::FlipGravity,
    }
}

/// Reverse exactly the fields `apply` touched for this variant.
pub fn revert(kind: &PowerUpKind, mods: &mut ShotModifiers) -> WorldEffect {
    match kind {
        PowerUpKind::Energy { .. } => WorldEffect::None,
        PowerUpKind::SuperShot { .. } => {
            mods.power_multiplier = 1.0;
            WorldEffect::None
        }
        PowerUpKind::StickyBall { .. } => {
            mods.ground_damping = 0.0;
            WorldEffect::None
        }
        PowerUpKind::BouncyBall { .. } => {
            mods.bouncy = false;
            WorldEffect::RestoreRollerRestitution
        }
        PowerUpKind::AntiGravity { .. } => WorldEffect::FlipGravity,
    }
}
