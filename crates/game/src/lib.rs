pub mod definitions;
pub mod error;
pub mod event;
pub mod input;
pub mod net;
pub mod physics;
pub mod player;
pub mod prediction;
pub mod projectile;
pub mod simulation;
pub mod weapon;

pub use definitions::Definitions;
pub use error::{ConfigError, FireRejection, SpawnError};
pub use event::{EventQueue, GameEvent, PendingEvent, ReliabilityMode};
pub use input::{Buttons, InputCollector, InputFrame, InputRingBuffer, PlaneProjection};
pub use net::{LinkConfig, LinkSimulator, LinkStats, NetMessage, Packet, PacketError};
pub use physics::{ActorBodies, CollisionProvider, FlatArena, ObjectId, PhysicsWorld};
pub use player::{FireIntent, MovementConfig, MovementController, MovementState, StepContext};
pub use prediction::{ReconcilePhase, ReconcileReport, ReconcileSnapshot, Reconciler};
pub use projectile::{
    Health, Hittable, ProjectileDef, ProjectileId, ProjectileRegistry, ProjectileRole,
};
pub use simulation::{
    Actor, ActorId, ActorRole, FixedTimestep, Outgoing, Peer, PickupId, PickupTable, Site,
    SiteConfig, SiteRole, SiteStats, WeaponPickup,
};
pub use weapon::{WeaponBehavior, WeaponDefinition, WeaponFire, WeaponId, WeaponRuntimeState};
