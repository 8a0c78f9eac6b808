use crate::error::FireRejection;

use super::{WeaponDefinition, WeaponId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FireTicket {
    pub weapon: WeaponId,
    pub tick: u32,
    pub ammo_left: u32,
}

/// Ammo and rate-of-fire gate for the equipped weapon. The server holds the
/// authoritative copy; every peer mirrors it and rebuilds on equip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WeaponRuntimeState {
    pub equipped: WeaponId,
    pub ammo: u32,
    pub next_allowed_fire_tick: u32,
    pub reload_ready_tick: Option<u32>,
}

impl WeaponRuntimeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn equipped(definition: &WeaponDefinition) -> Self {
        let mut state = Self::default();
        state.rebuild(Some(definition));
        state
    }

    /// Resets ammo and cooldown for a newly equipped weapon; `None` unequips.
    pub fn rebuild(&mut self, definition: Option<&WeaponDefinition>) {
        *self = match definition {
            Some(def) => Self {
                equipped: def.id,
                ammo: def.max_ammo,
                next_allowed_fire_tick: 0,
                reload_ready_tick: None,
            },
            None => Self::default(),
        };
    }

    pub fn has_weapon(&self) -> bool {
        self.equipped != WeaponId::None
    }

    pub fn is_reloading(&self) -> bool {
        self.reload_ready_tick.is_some()
    }

    /// Validates a shot at `tick`. Only an accepted shot mutates state.
    pub fn try_fire(
        &mut self,
        tick: u32,
        definition: &WeaponDefinition,
        tick_rate: u32,
    ) -> Result<FireTicket, FireRejection> {
        if !self.has_weapon() {
            return Err(FireRejection::NoWeapon);
        }
        if definition.id != self.equipped {
            return Err(FireRejection::WeaponMismatch);
        }

        self.finish_reload(tick, definition);
        if let Some(ready_tick) = self.reload_ready_tick {
            return Err(FireRejection::Reloading { ready_tick });
        }
        if tick < self.next_allowed_fire_tick {
            return Err(FireRejection::Cooldown {
                next_allowed_tick: self.next_allowed_fire_tick,
            });
        }
        if self.ammo == 0 {
            return Err(FireRejection::OutOfAmmo);
        }

        self.ammo -= 1;
        self.next_allowed_fire_tick =
            tick.saturating_add(definition.fire_interval_ticks(tick_rate));

        Ok(FireTicket {
            weapon: self.equipped,
            tick,
            ammo_left: self.ammo,
        })
    }

    pub fn start_reload(
        &mut self,
        tick: u32,
        definition: &WeaponDefinition,
        tick_rate: u32,
    ) -> bool {
        if !self.has_weapon()
            || definition.id != self.equipped
            || self.is_reloading()
            || self.ammo >= definition.max_ammo
        {
            return false;
        }

        self.reload_ready_tick = Some(tick.saturating_add(definition.reload_ticks(tick_rate)));
        true
    }

    pub fn finish_reload(&mut self, tick: u32, definition: &WeaponDefinition) -> bool {
        match self.reload_ready_tick {
            Some(ready_tick) if tick >= ready_tick && definition.id == self.equipped => {
                self.ammo = definition.max_ammo;
                self.reload_ready_tick = None;
                true
            }
            _ => false,
        }
    }
}
