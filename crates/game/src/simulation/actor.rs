use glam::Vec2;

use crate::input::{InputFrame, InputRingBuffer};
use crate::physics::ObjectId;
use crate::player::MovementState;
use crate::prediction::{ReconcileSnapshot, Reconciler, SnapshotSource};
use crate::projectile::{Health, ProjectileRole};
use crate::weapon::WeaponRuntimeState;

/// Object ids at or above this value belong to static geometry.
pub const STATIC_OBJECT_BASE: u32 = 1 << 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(pub u16);

impl ActorId {
    pub fn object(self) -> ObjectId {
        ObjectId(u32::from(self.0))
    }

    pub fn from_object(object: ObjectId) -> Option<Self> {
        u16::try_from(object.0).ok().map(Self)
    }
}

/// How this site relates to an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorRole {
    /// Server copy, stepped from received input.
    Authority,
    /// The local client's own actor, stepped ahead of the server.
    Owner,
    /// Someone else's actor seen from a client; only follows snapshots.
    Observed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FireEffects {
    pub spawn: Option<ProjectileRole>,
    pub cue: bool,
    pub relay: bool,
}

impl FireEffects {
    pub const NONE: Self = Self {
        spawn: None,
        cue: false,
        relay: false,
    };
}

impl ActorRole {
    /// What a shot by an actor in this role triggers here. Replayed shots
    /// trigger nothing; their effects went out on the original run.
    pub fn fire_effects(self, replay: bool) -> FireEffects {
        if replay {
            return FireEffects::NONE;
        }
        match self {
            Self::Authority => FireEffects {
                spawn: Some(ProjectileRole::Authoritative),
                cue: true,
                relay: true,
            },
            Self::Owner => FireEffects {
                spawn: Some(ProjectileRole::Visual),
                cue: true,
                relay: false,
            },
            Self::Observed => FireEffects::NONE,
        }
    }
}

#[derive(Debug)]
pub struct Actor {
    pub id: ActorId,
    pub role: ActorRole,
    pub movement: MovementState,
    pub weapon: WeaponRuntimeState,
    pub health: Health,
    /// Bumped by the server on every health change; clients keep the newest.
    pub health_version: u32,
    pub inputs: InputRingBuffer,
    pub reconciler: Reconciler,
    /// Newest input tick folded into `movement`, or the newest snapshot tick
    /// for observed actors.
    pub last_tick: Option<u32>,
    pub spawn_point: Vec2,
}

impl Actor {
    pub fn new(
        id: ActorId,
        role: ActorRole,
        spawn_point: Vec2,
        max_health: u32,
        input_capacity: usize,
        history_capacity: usize,
    ) -> Self {
        Self {
            id,
            role,
            movement: MovementState::at(spawn_point),
            weapon: WeaponRuntimeState::new(),
            health: Health::new(max_health),
            health_version: 0,
            inputs: InputRingBuffer::new(input_capacity),
            reconciler: Reconciler::new(history_capacity),
            last_tick: None,
            spawn_point,
        }
    }

    /// Buffered frames the authority has not simulated yet, oldest first.
    pub fn unprocessed_frames(&self) -> Vec<InputFrame> {
        match self.last_tick {
            Some(tick) => self.inputs.frames_after(tick).copied().collect(),
            None => self.inputs.frames_since(0).copied().collect(),
        }
    }

    pub fn snapshot(&self, source: SnapshotSource) -> Option<ReconcileSnapshot> {
        let tick = self.last_tick?;
        Some(ReconcileSnapshot::capture(
            self.id.0,
            tick,
            &self.movement,
            &self.weapon,
            source,
        ))
    }

    pub fn respawn(&mut self) {
        self.health.restore();
        self.movement = MovementState::at(self.spawn_point);
    }

    /// Mirrors a replicated health value. Returns false for updates older
    /// than one already applied.
    pub fn mirror_health(&mut self, current: u32, version: u32) -> bool {
        if version <= self.health_version {
            return false;
        }
        self.health.current = current.min(self.health.max);
        self.health_version = version;
        true
    }
}
