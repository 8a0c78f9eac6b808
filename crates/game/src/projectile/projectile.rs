use glam::Vec2;

use crate::physics::ObjectId;

use super::{ProjectileDef, ProjectileId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectileRole {
    /// Server instance; the only one allowed to apply damage.
    Authoritative,
    Visual,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileSpawn {
    pub id: ProjectileId,
    pub role: ProjectileRole,
    pub shooter: Option<ObjectId>,
    pub origin: Vec2,
    pub direction: Vec2,
    pub speed: f32,
    pub damage: u32,
    /// Seconds that really passed between the fire tick and this spawn.
    pub elapsed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub from: Vec2,
    pub to: Vec2,
    pub expired: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub id: ProjectileId,
    pub definition: ProjectileDef,
    pub role: ProjectileRole,
    pub shooter: Option<ObjectId>,
    pub position: Vec2,
    pub velocity: Vec2,
    pub damage: u32,
    pub life: f32,
    pub catchup_left: f32,
    pub catchup_consumed: f32,
    pub struck: Vec<ObjectId>,
}

impl Projectile {
    pub fn new(spawn: ProjectileSpawn, definition: &ProjectileDef) -> Self {
        let direction = spawn.direction.try_normalize().unwrap_or(Vec2::X);
        Self {
            id: spawn.id,
            role: spawn.role,
            shooter: spawn.shooter,
            position: spawn.origin,
            velocity: direction * spawn.speed,
            damage: spawn.damage,
            life: definition.lifetime,
            catchup_left: spawn.elapsed.max(0.0).min(definition.max_passed_time),
            catchup_consumed: 0.0,
            struck: Vec::new(),
            definition: definition.clone(),
        }
    }

    pub fn is_authoritative(&self) -> bool {
        self.role == ProjectileRole::Authoritative
    }

    /// Catch-up seconds this frame will add on top of `frame_dt`.
    pub fn catchup_bonus(&self, frame_dt: f32, tick_dt: f32) -> f32 {
        if self.catchup_left <= 0.0 || tick_dt <= 0.0 {
            return 0.0;
        }
        self.catchup_left
            .min(self.definition.catchup_rate * frame_dt / tick_dt)
    }

    /// Integrates one frame. Lifetime tracks wall-clock; the catch-up bonus
    /// only speeds up the motion.
    pub fn advance(&mut self, frame_dt: f32, tick_dt: f32) -> Motion {
        let bonus = self.catchup_bonus(frame_dt, tick_dt);
        if bonus >= self.catchup_left {
            self.catchup_left = 0.0;
        } else {
            self.catchup_left -= bonus;
        }
        self.catchup_consumed += bonus;

        let dt = frame_dt + bonus;
        let from = self.position;
        self.velocity.y -= self.definition.gravity * dt;
        self.position += self.velocity * dt;
        self.life -= frame_dt;

        Motion {
            from,
            to: self.position,
            expired: self.life <= 0.0,
        }
    }
}
