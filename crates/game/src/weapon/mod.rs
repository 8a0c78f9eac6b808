mod behavior;
mod definition;
mod runtime;
pub mod spread;

pub use behavior::{WeaponBehavior, WeaponFire};
pub use definition::{SpreadPattern, WeaponDefinition, WeaponId};
pub use runtime::{FireTicket, WeaponRuntimeState};
pub use spread::{BurstRequest, PelletSpec};
