//! Named friction/restitution pairs for collider construction.
//!
//! Materials are looked up by name when a collider is built. The table is
//! immutable during normal gameplay; [`MaterialTable::set`] exists as an
//! explicit administrative operation for course setup and tests.

use std::collections::HashMap;

/// A named surface response: Coulomb friction and bounce restitution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicsMaterial {
    pub friction: f32,
    pub restitution: f32,
}

/// Lookup table keyed by material name.
///
/// Unknown names resolve to the `"default"` material rather than failing,
/// so a misspelled name in course data degrades to sane surface behavior.
#[derive(Clone, Debug)]
pub struct MaterialTable {
    materials: HashMap<String, PhysicsMaterial>,
}

/// Name of the fallback material every table contains.
pub const DEFAULT_MATERIAL: &str = "default";

impl MaterialTable {
    /// Build the standard table used by courses.
    pub fn with_defaults() -> Self {
        let mut materials = HashMap::new();
        materials.insert(
            DEFAULT_MATERIAL.to_owned(),
            PhysicsMaterial {
                friction: 0.6,
                restitution: 0.3,
            },
        );
        materials.insert(
            "roller".to_owned(),
            PhysicsMaterial {
                friction: 0.4,
                restitution: 0.5,
            },
        );
        materials.insert(
            "wall".to_owned(),
            PhysicsMaterial {
                friction: 0.2,
                restitution: 0.8,
            },
        );
        materials.insert(
            "obstacle".to_owned(),
            PhysicsMaterial {
                friction: 0.5,
                restitution: 0.6,
            },
        );
        materials.insert(
            "hole".to_owned(),
            PhysicsMaterial {
                friction: 0.9,
                restitution: 0.0,
            },
        );
        Self { materials }
    }

    /// Look up a material by name, falling back to `"default"`.
    pub fn get(&self, name: &str) -> PhysicsMaterial {
        if let Some(mat) = self.materials.get(name) {
            return *mat;
        }
        // The defaults table always contains DEFAULT_MATERIAL; a hand-built
        // table that removed it still resolves to a usable surface.
        self.materials
            .get(DEFAULT_MATERIAL)
            .copied()
            .unwrap_or(PhysicsMaterial {
                friction: 0.6,
                restitution: 0.3,
            })
    }

    /// Administrative operation: insert or replace a named material.
    ///
    /// Not intended for use during normal gameplay; colliders built before
    /// the change keep their old surface response until rebuilt.
    pub fn set(&mut self, name: &str, material: PhysicsMaterial) {
        self.materials.insert(name.to_owned(), material);
    }
}

impl Default for MaterialTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}
