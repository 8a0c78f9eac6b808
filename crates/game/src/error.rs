use crate::projectile::ProjectileId;
use crate::weapon::WeaponId;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no weapon definition for {0:?}")]
    UnknownWeapon(WeaponId),
    #[error("no projectile definition named `{0}`")]
    UnknownProjectile(String),
    #[error("weapon {0:?} is defined more than once")]
    DuplicateWeapon(WeaponId),
    #[error("projectile `{0}` is defined more than once")]
    DuplicateProjectile(String),
    #[error("invalid definition `{name}`: {reason}")]
    InvalidDefinition { name: String, reason: String },
    #[error("failed to parse definitions: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read definitions: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FireRejection {
    #[error("no weapon equipped")]
    NoWeapon,
    #[error("fire intent for a weapon that is not equipped")]
    WeaponMismatch,
    #[error("weapon cooling down until tick {next_allowed_tick}")]
    Cooldown { next_allowed_tick: u32 },
    #[error("out of ammo")]
    OutOfAmmo,
    #[error("reloading until tick {ready_tick}")]
    Reloading { ready_tick: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpawnError {
    #[error("no projectile definition named `{0}`")]
    UnknownProjectile(String),
    #[error("projectile {0} is already registered")]
    DuplicateId(ProjectileId),
    #[error("projectile {0} was already destroyed")]
    Tombstoned(ProjectileId),
}
