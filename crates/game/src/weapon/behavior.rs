use crate::error::FireRejection;
use crate::projectile::ProjectileDef;

use super::spread::{compute_burst, BurstRequest, BurstShape, PelletSpec};
use super::{FireTicket, SpreadPattern, WeaponDefinition, WeaponId, WeaponRuntimeState};

pub trait WeaponFire {
    fn fire(
        &self,
        state: &mut WeaponRuntimeState,
        tick: u32,
        definition: &WeaponDefinition,
        tick_rate: u32,
    ) -> Result<FireTicket, FireRejection>;

    fn spawn_burst(
        &self,
        request: &BurstRequest,
        definition: &WeaponDefinition,
        projectile: &ProjectileDef,
    ) -> Vec<PelletSpec>;
}

/// Closed set of firing behaviours, chosen by weapon id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponBehavior {
    Scatter,
    Single,
}

impl WeaponBehavior {
    pub fn for_weapon(id: WeaponId) -> Option<Self> {
        match id {
            WeaponId::Shotgun => Some(Self::Scatter),
            WeaponId::Pistol => Some(Self::Single),
            WeaponId::None => None,
        }
    }
}

impl WeaponFire for WeaponBehavior {
    fn fire(
        &self,
        state: &mut WeaponRuntimeState,
        tick: u32,
        definition: &WeaponDefinition,
        tick_rate: u32,
    ) -> Result<FireTicket, FireRejection> {
        state.try_fire(tick, definition, tick_rate)
    }

    fn spawn_burst(
        &self,
        request: &BurstRequest,
        definition: &WeaponDefinition,
        projectile: &ProjectileDef,
    ) -> Vec<PelletSpec> {
        let shape = match self {
            Self::Scatter => BurstShape {
                pellet_count: definition.pellet_count,
                spread_degrees: definition.spread_degrees,
                pattern: definition.spread_pattern,
                base_speed: projectile.speed,
                speed_variance: definition.speed_variance,
            },
            Self::Single => BurstShape {
                pellet_count: 1,
                spread_degrees: 0.0,
                pattern: SpreadPattern::Fixed,
                base_speed: projectile.speed,
                speed_variance: definition.speed_variance,
            },
        };
        compute_burst(request, &shape)
    }
}
