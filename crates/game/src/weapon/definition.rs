use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum WeaponId {
    #[default]
    None = 0,
    Shotgun = 1,
    Pistol = 2,
}

impl From<u8> for WeaponId {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Shotgun,
            2 => Self::Pistol,
            _ => Self::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpreadPattern {
    /// Offsets drawn from the burst's seeded generator.
    #[default]
    Random,
    /// Evenly fanned offsets, identical on every peer without any sampling.
    Fixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponDefinition {
    pub id: WeaponId,
    pub display_name: String,
    pub max_ammo: u32,
    pub damage: u32,
    pub pellet_count: u16,
    pub spread_degrees: f32,
    pub spread_pattern: SpreadPattern,
    pub speed_variance: f32,
    pub recoil_force: f32,
    pub seconds_between_shots: f32,
    pub reload_time_seconds: f32,
    pub projectile: String,
}

impl Default for WeaponDefinition {
    fn default() -> Self {
        Self::shotgun()
    }
}

impl WeaponDefinition {
    pub fn shotgun() -> Self {
        Self {
            id: WeaponId::Shotgun,
            display_name: "Shotgun".to_string(),
            max_ammo: 8,
            damage: 18,
            pellet_count: 6,
            spread_degrees: 15.0,
            spread_pattern: SpreadPattern::Random,
            speed_variance: 3.0,
            recoil_force: 12.0,
            seconds_between_shots: 1.0,
            reload_time_seconds: 1.2,
            projectile: "pellet".to_string(),
        }
    }

    pub fn pistol() -> Self {
        Self {
            id: WeaponId::Pistol,
            display_name: "Pistol".to_string(),
            max_ammo: 12,
            damage: 8,
            pellet_count: 1,
            spread_degrees: 0.0,
            spread_pattern: SpreadPattern::Fixed,
            speed_variance: 0.0,
            recoil_force: 2.0,
            seconds_between_shots: 0.25,
            reload_time_seconds: 0.9,
            projectile: "bolt".to_string(),
        }
    }

    /// Rate limit in whole ticks, never below one.
    pub fn fire_interval_ticks(&self, tick_rate: u32) -> u32 {
        seconds_to_ticks(self.seconds_between_shots, tick_rate)
    }

    pub fn reload_ticks(&self, tick_rate: u32) -> u32 {
        seconds_to_ticks(self.reload_time_seconds, tick_rate)
    }

    pub fn damage_per_projectile(&self) -> u32 {
        let pellets = self.pellet_count.max(1) as f32;
        ((self.damage as f32 / pellets).round() as u32).max(1)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidDefinition {
            name: self.display_name.clone(),
            reason: reason.to_string(),
        };

        if self.id == WeaponId::None {
            return Err(invalid("weapon id must not be None"));
        }
        if self.max_ammo == 0 {
            return Err(invalid("max_ammo must be at least 1"));
        }
        if self.pellet_count == 0 {
            return Err(invalid("pellet_count must be at least 1"));
        }
        if !(0.0..=89.0).contains(&self.spread_degrees) {
            return Err(invalid("spread_degrees must be within 0..=89"));
        }
        if self.seconds_between_shots < 0.0 || self.reload_time_seconds < 0.0 {
            return Err(invalid("timings must not be negative"));
        }
        if self.speed_variance < 0.0 {
            return Err(invalid("speed_variance must not be negative"));
        }
        Ok(())
    }
}

fn seconds_to_ticks(seconds: f32, tick_rate: u32) -> u32 {
    let ticks = (seconds.max(0.0) * tick_rate.max(1) as f32).ceil() as u32;
    ticks.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_second_at_fifty_hz_is_fifty_ticks() {
        let mut def = WeaponDefinition::shotgun();
        def.seconds_between_shots = 1.0;
        assert_eq!(def.fire_interval_ticks(50), 50);
    }

    #[test]
    fn interval_rounds_up_and_has_floor() {
        let mut def = WeaponDefinition::shotgun();
        def.seconds_between_shots = 0.011;
        assert_eq!(def.fire_interval_ticks(100), 2);

        def.seconds_between_shots = 0.0;
        assert_eq!(def.fire_interval_ticks(60), 1);
        assert_eq!(def.fire_interval_ticks(0), 1);
    }

    #[test]
    fn per_pellet_damage() {
        let def = WeaponDefinition::shotgun();
        assert_eq!(def.damage_per_projectile(), 3);
        assert_eq!(WeaponDefinition::pistol().damage_per_projectile(), 8);
    }

    #[test]
    fn validation_rejects_empty_bursts() {
        let mut def = WeaponDefinition::shotgun();
        def.pellet_count = 0;
        assert!(matches!(
            def.validate(),
            Err(ConfigError::InvalidDefinition { .. })
        ));
        assert!(WeaponDefinition::pistol().validate().is_ok());
    }
}
