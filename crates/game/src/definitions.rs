//! Static weapon and projectile tables, read as immutable configuration.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::projectile::ProjectileDef;
use crate::weapon::{WeaponDefinition, WeaponId};

#[derive(Debug, Default, Serialize, Deserialize)]
struct DefinitionFile {
    #[serde(default)]
    weapons: Vec<WeaponDefinition>,
    #[serde(default)]
    projectiles: Vec<ProjectileDef>,
}

#[derive(Debug, Clone, Default)]
pub struct Definitions {
    weapons: HashMap<WeaponId, WeaponDefinition>,
    projectiles: HashMap<String, ProjectileDef>,
}

impl Definitions {
    pub fn builtin() -> Self {
        let mut defs = Self::default();
        for projectile in [ProjectileDef::pellet(), ProjectileDef::bolt()] {
            defs.projectiles.insert(projectile.name.clone(), projectile);
        }
        for weapon in [WeaponDefinition::shotgun(), WeaponDefinition::pistol()] {
            defs.weapons.insert(weapon.id, weapon);
        }
        defs
    }

    pub fn from_parts(
        weapons: Vec<WeaponDefinition>,
        projectiles: Vec<ProjectileDef>,
    ) -> Result<Self, ConfigError> {
        let mut defs = Self::default();

        for projectile in projectiles {
            projectile.validate()?;
            if defs.projectiles.contains_key(&projectile.name) {
                return Err(ConfigError::DuplicateProjectile(projectile.name));
            }
            defs.projectiles.insert(projectile.name.clone(), projectile);
        }

        for weapon in weapons {
            weapon.validate()?;
            if defs.weapons.contains_key(&weapon.id) {
                return Err(ConfigError::DuplicateWeapon(weapon.id));
            }
            if !defs.projectiles.contains_key(&weapon.projectile) {
                return Err(ConfigError::UnknownProjectile(weapon.projectile));
            }
            defs.weapons.insert(weapon.id, weapon);
        }

        Ok(defs)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let file: DefinitionFile = serde_json::from_str(json)?;
        Self::from_parts(file.weapons, file.projectiles)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn weapon(&self, id: WeaponId) -> Result<&WeaponDefinition, ConfigError> {
        self.weapons.get(&id).ok_or(ConfigError::UnknownWeapon(id))
    }

    pub fn projectile(&self, name: &str) -> Result<&ProjectileDef, ConfigError> {
        self.projectiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProjectile(name.to_string()))
    }

    pub fn weapon_ids(&self) -> impl Iterator<Item = WeaponId> + '_ {
        self.weapons.keys().copied()
    }
}
