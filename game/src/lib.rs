pub mod bodies;
pub mod contacts;
pub mod entity;
pub mod events;
pub mod powerup;
pub mod roller;
pub mod tick;
pub mod world;

pub use bodies::{BodyKind, PhysicsBodies, RayHit};
pub use contacts::{ContactOutcome, ContactTracker, PairEvent};
pub use entity::{EntityId, EntityKind};
pub use events::{EventFanout, EventQueue, EventSink, GameEvent};
pub use powerup::{PowerUpKind, ShotModifiers, WorldEffect};
pub use roller::{AimStep, RollerController, ShotCommand, ShotSettings, ShotState};
pub use tick::CourseRunner;
pub use world::{ContactEvent, RapierWorld};
