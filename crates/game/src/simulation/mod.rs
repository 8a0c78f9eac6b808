mod actor;
mod pickup;
mod site;
mod tick;

pub use actor::{Actor, ActorId, ActorRole, FireEffects, STATIC_OBJECT_BASE};
pub use pickup::{PickupId, PickupTable, WeaponPickup};
pub use site::{Outgoing, Peer, Site, SiteConfig, SiteRole, SiteStats};
pub use tick::FixedTimestep;
