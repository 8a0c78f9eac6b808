#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReliabilityMode {
    Unreliable,
    UnreliableExpiring { ttl_ticks: u32 },
    Reliable,
}

impl ReliabilityMode {
    pub fn is_reliable(&self) -> bool {
        matches!(self, Self::Reliable)
    }
}

/// One-shot effects a site emits for presentation layers. Never produced
/// while replaying input.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    WeaponFired {
        actor: u16,
        weapon: u8,
        tick: u32,
        origin: [f32; 2],
    },
    ReloadStarted {
        actor: u16,
    },
    ProjectileImpact {
        projectile: u64,
        object: u32,
        position: [f32; 2],
    },
    DamageDealt {
        projectile: u64,
        target: u16,
        damage: u32,
    },
    PlayerDeath {
        actor: u16,
    },
    PlayerRespawn {
        actor: u16,
        position: [f32; 2],
    },
    WeaponEquipped {
        actor: u16,
        weapon: u8,
    },
    ActorJoined {
        actor: u16,
    },
    ActorLeft {
        actor: u16,
    },
    PickupSpawned {
        pickup: u16,
        weapon: u8,
        position: [f32; 2],
    },
    PickupTaken {
        pickup: u16,
        actor: u16,
    },
}

impl GameEvent {
    pub fn reliability(&self) -> ReliabilityMode {
        match self {
            Self::WeaponEquipped { .. } => ReliabilityMode::Reliable,
            Self::ActorJoined { .. } => ReliabilityMode::Reliable,
            Self::ActorLeft { .. } => ReliabilityMode::Reliable,
            Self::PlayerRespawn { .. } => ReliabilityMode::Reliable,
            Self::PickupSpawned { .. } => ReliabilityMode::Reliable,
            Self::PickupTaken { .. } => ReliabilityMode::Reliable,

            Self::PlayerDeath { .. } => ReliabilityMode::UnreliableExpiring { ttl_ticks: 250 },
            Self::DamageDealt { .. } => ReliabilityMode::UnreliableExpiring { ttl_ticks: 50 },

            Self::WeaponFired { .. } => ReliabilityMode::Unreliable,
            Self::ReloadStarted { .. } => ReliabilityMode::Unreliable,
            Self::ProjectileImpact { .. } => ReliabilityMode::Unreliable,
        }
    }
}
