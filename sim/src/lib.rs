pub mod collider;
pub mod launch;
pub mod material;
pub mod settings;
pub mod trajectory;
pub mod types;

pub use collider::{ColliderDef, ColliderShapeDef, collider_from_def};
pub use launch::{
    LaunchImpulse, PowerMeter, SpinKind, SpinVector, launch_impulse, rotate_aim, steer_horizontal,
};
pub use material::{DEFAULT_MATERIAL, MaterialTable, PhysicsMaterial};
pub use trajectory::{BounceParams, Trajectory, TrajectoryParams, simulate};
pub use types::{Iso, Quat, Transform, Vec3, horizontal, horizontal_speed, rotate_about_y, up};
