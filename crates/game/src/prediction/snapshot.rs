use glam::Vec2;

use crate::player::MovementState;
use crate::weapon::WeaponRuntimeState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    /// Produced by the server's authoritative run.
    Server,
    /// Mirrored timers produced by the owner itself.
    Owner,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub position: Vec2,
    pub velocity: Vec2,
}

/// End-of-tick state of one actor, shipped to the owner for correction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconcileSnapshot {
    pub actor: u16,
    pub tick: u32,
    pub body: BodyState,
    pub grounded: bool,
    pub coyote_timer: f32,
    pub jump_buffer_timer: f32,
    pub dash_timer: f32,
    pub facing: i8,
    pub weapon: WeaponRuntimeState,
    pub source: SnapshotSource,
}

impl ReconcileSnapshot {
    pub fn capture(
        actor: u16,
        tick: u32,
        state: &MovementState,
        weapon: &WeaponRuntimeState,
        source: SnapshotSource,
    ) -> Self {
        Self {
            actor,
            tick,
            body: BodyState {
                position: state.position,
                velocity: state.velocity,
            },
            grounded: state.grounded,
            coyote_timer: state.coyote_timer,
            jump_buffer_timer: state.jump_buffer_timer,
            dash_timer: state.dash_timer,
            facing: state.facing,
            weapon: *weapon,
            source,
        }
    }

    pub fn is_authoritative(&self) -> bool {
        self.source == SnapshotSource::Server
    }

    /// Overwrites `state` with this snapshot. Velocity and ground state are
    /// only taken when `full` is set.
    pub fn apply_to(&self, state: &mut MovementState, full: bool) {
        state.position = self.body.position;
        state.coyote_timer = self.coyote_timer;
        state.jump_buffer_timer = self.jump_buffer_timer;
        state.dash_timer = self.dash_timer;
        state.facing = self.facing;
        if full {
            state.velocity = self.body.velocity;
            state.grounded = self.grounded;
        }
    }

    pub fn movement_state(&self) -> MovementState {
        let mut state = MovementState::default();
        self.apply_to(&mut state, true);
        state
    }
}
