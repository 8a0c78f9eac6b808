use std::collections::HashMap;

use crate::physics::ObjectId;

use super::ProjectileId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    Ignored,
    Damaged { remaining: u32 },
    Killed,
}

/// Capability of anything a projectile can damage.
pub trait Hittable {
    fn on_hit(&mut self, source: ProjectileId, damage: u32) -> HitOutcome;
}

/// Resolves a struck physics object to its hittable capability, if it still
/// has one locally.
pub trait HitTargets {
    fn target(&mut self, object: ObjectId) -> Option<&mut dyn Hittable>;
}

impl HitTargets for () {
    fn target(&mut self, _object: ObjectId) -> Option<&mut dyn Hittable> {
        None
    }
}

impl<H: Hittable> HitTargets for HashMap<ObjectId, H> {
    fn target(&mut self, object: ObjectId) -> Option<&mut dyn Hittable> {
        self.get_mut(&object).map(|h| h as &mut dyn Hittable)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn is_dead(&self) -> bool {
        self.current == 0
    }

    pub fn restore(&mut self) {
        self.current = self.max;
    }
}

impl Hittable for Health {
    fn on_hit(&mut self, _source: ProjectileId, damage: u32) -> HitOutcome {
        if self.is_dead() || damage == 0 {
            return HitOutcome::Ignored;
        }

        self.current = self.current.saturating_sub(damage);
        if self.current == 0 {
            HitOutcome::Killed
        } else {
            HitOutcome::Damaged {
                remaining: self.current,
            }
        }
    }
}
