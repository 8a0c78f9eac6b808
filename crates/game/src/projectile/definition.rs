use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const HIT_ALL_LAYERS: u32 = u32::MAX;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileDef {
    pub name: String,
    pub speed: f32,
    pub gravity: f32,
    pub lifetime: f32,
    /// Cap on how much already-elapsed time a late spawn may make up.
    pub max_passed_time: f32,
    /// Catch-up seconds consumed per tick's worth of frame time: each
    /// advance takes `min(left, catchup_rate * frame_dt / tick_dt)`, so the
    /// drain rate does not depend on render frame rate.
    pub catchup_rate: f32,
    pub despawn_on_impact: bool,
    pub damage: u32,
    pub hit_mask: u32,
}

impl Default for ProjectileDef {
    fn default() -> Self {
        Self::pellet()
    }
}

impl ProjectileDef {
    pub fn pellet() -> Self {
        Self {
            name: "pellet".to_string(),
            speed: 24.0,
            gravity: 0.0,
            lifetime: 2.5,
            max_passed_time: 0.15,
            catchup_rate: 0.10,
            despawn_on_impact: true,
            damage: 3,
            hit_mask: HIT_ALL_LAYERS,
        }
    }

    pub fn bolt() -> Self {
        Self {
            name: "bolt".to_string(),
            speed: 40.0,
            gravity: 2.0,
            lifetime: 1.5,
            max_passed_time: 0.2,
            catchup_rate: 0.05,
            despawn_on_impact: true,
            damage: 8,
            hit_mask: HIT_ALL_LAYERS,
        }
    }

    pub fn hits_layer(&self, layer: u8) -> bool {
        layer < 32 && self.hit_mask & (1 << layer) != 0
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidDefinition {
            name: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.name.is_empty() {
            return Err(invalid("projectile name must not be empty"));
        }
        if self.lifetime <= 0.0 {
            return Err(invalid("lifetime must be positive"));
        }
        if self.speed < 0.0 || self.max_passed_time < 0.0 || self.catchup_rate < 0.0 {
            return Err(invalid("speed and catch-up settings must not be negative"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_mask_filters_layers() {
        let mut def = ProjectileDef::pellet();
        assert!(def.hits_layer(0));
        assert!(def.hits_layer(31));
        assert!(!def.hits_layer(32));

        def.hit_mask = 0b100;
        assert!(def.hits_layer(2));
        assert!(!def.hits_layer(1));
    }
}
