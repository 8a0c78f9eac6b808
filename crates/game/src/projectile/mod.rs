mod definition;
mod hit;
mod id;
mod projectile;
mod registry;

pub use definition::{HIT_ALL_LAYERS, ProjectileDef};
pub use hit::{Health, HitOutcome, HitTargets, Hittable};
pub use id::ProjectileId;
pub use projectile::{Motion, Projectile, ProjectileRole, ProjectileSpawn};
pub use registry::{AdvanceReport, Despawn, DespawnReason, HitReport, ProjectileRegistry};
