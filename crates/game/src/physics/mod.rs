mod provider;
mod world;

pub use provider::{ActorBodies, ArenaBox, CollisionProvider, FlatArena, ObjectId, SegmentHit};
pub use world::PhysicsWorld;

pub const LAYER_STATIC: u8 = 0;
pub const LAYER_ACTOR: u8 = 1;
