use glam::Vec2;
use rkyv::{rancor, Archive, Deserialize, Serialize};

use crate::input::{Buttons, InputFrame};
use crate::prediction::{BodyState, ReconcileSnapshot, SnapshotSource};
use crate::weapon::{WeaponId, WeaponRuntimeState};

/// Most recent input frames repeated in every input message, so a single
/// lost packet does not leave a hole on the server.
pub const INPUT_REDUNDANCY: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct WireInput {
    pub tick: u32,
    pub horizontal: f32,
    pub pressed: u16,
    pub held: u16,
    pub look_direction: [f32; 2],
    pub look_angle: f32,
}

impl From<&InputFrame> for WireInput {
    fn from(frame: &InputFrame) -> Self {
        Self {
            tick: frame.tick,
            horizontal: frame.horizontal,
            pressed: frame.pressed.bits(),
            held: frame.held.bits(),
            look_direction: frame.look_direction.to_array(),
            look_angle: frame.look_angle,
        }
    }
}

impl From<&WireInput> for InputFrame {
    fn from(wire: &WireInput) -> Self {
        Self {
            tick: wire.tick,
            horizontal: wire.horizontal.clamp(-1.0, 1.0),
            pressed: Buttons::from_bits_truncate(wire.pressed),
            held: Buttons::from_bits_truncate(wire.held),
            look_direction: Vec2::from_array(wire.look_direction),
            look_angle: wire.look_angle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct WireWeapon {
    pub equipped: u8,
    pub ammo: u32,
    pub next_allowed_fire_tick: u32,
    pub reload_ready_tick: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct WireSnapshot {
    pub actor: u16,
    pub tick: u32,
    pub position: [f32; 2],
    pub velocity: [f32; 2],
    pub grounded: bool,
    pub coyote_timer: f32,
    pub jump_buffer_timer: f32,
    pub dash_timer: f32,
    pub facing: i8,
    pub weapon: WireWeapon,
    pub authoritative: bool,
}

impl From<&ReconcileSnapshot> for WireSnapshot {
    fn from(snapshot: &ReconcileSnapshot) -> Self {
        Self {
            actor: snapshot.actor,
            tick: snapshot.tick,
            position: snapshot.body.position.to_array(),
            velocity: snapshot.body.velocity.to_array(),
            grounded: snapshot.grounded,
            coyote_timer: snapshot.coyote_timer,
            jump_buffer_timer: snapshot.jump_buffer_timer,
            dash_timer: snapshot.dash_timer,
            facing: snapshot.facing,
            weapon: WireWeapon {
                equipped: snapshot.weapon.equipped as u8,
                ammo: snapshot.weapon.ammo,
                next_allowed_fire_tick: snapshot.weapon.next_allowed_fire_tick,
                reload_ready_tick: snapshot.weapon.reload_ready_tick,
            },
            authoritative: snapshot.is_authoritative(),
        }
    }
}

impl From<&WireSnapshot> for ReconcileSnapshot {
    fn from(wire: &WireSnapshot) -> Self {
        Self {
            actor: wire.actor,
            tick: wire.tick,
            body: BodyState {
                position: Vec2::from_array(wire.position),
                velocity: Vec2::from_array(wire.velocity),
            },
            grounded: wire.grounded,
            coyote_timer: wire.coyote_timer,
            jump_buffer_timer: wire.jump_buffer_timer,
            dash_timer: wire.dash_timer,
            facing: wire.facing.signum(),
            weapon: WeaponRuntimeState {
                equipped: WeaponId::from(wire.weapon.equipped),
                ammo: wire.weapon.ammo,
                next_allowed_fire_tick: wire.weapon.next_allowed_fire_tick,
                reload_ready_tick: wire.weapon.reload_ready_tick,
            },
            source: if wire.authoritative {
                SnapshotSource::Server
            } else {
                SnapshotSource::Owner
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub enum NetMessage {
    /// Owner to server: the newest frames, oldest first.
    Input { actor: u16, frames: Vec<WireInput> },
    Reconcile(WireSnapshot),
    /// Server to observers: someone else fired at `tick`.
    ObserverFire {
        actor: u16,
        weapon: u8,
        tick: u32,
        origin: [f32; 2],
        aim_angle: f32,
    },
    ProjectileDestroyed { id: u64 },
    Equip { actor: u16, weapon: u8 },
    ActorJoined {
        actor: u16,
        position: [f32; 2],
        health: u32,
    },
    ActorLeft { actor: u16 },
    /// Server to clients: an authoritative hit. `version` orders health
    /// updates for one actor, since reliable delivery may reorder them.
    Damaged {
        actor: u16,
        projectile: u64,
        damage: u32,
        remaining: u32,
        version: u32,
    },
    Respawned {
        actor: u16,
        position: [f32; 2],
        health: u32,
        version: u32,
    },
    PickupSpawned {
        pickup: u16,
        weapon: u8,
        position: [f32; 2],
        radius: f32,
    },
    PickupTaken { pickup: u16, actor: u16 },
}

impl NetMessage {
    /// Reliable messages may be delayed or reordered, never dropped.
    pub fn is_reliable(&self) -> bool {
        matches!(
            self,
            Self::ProjectileDestroyed { .. }
                | Self::Equip { .. }
                | Self::ActorJoined { .. }
                | Self::ActorLeft { .. }
                | Self::Damaged { .. }
                | Self::Respawned { .. }
                | Self::PickupSpawned { .. }
                | Self::PickupTaken { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct Packet {
    pub tick: u32,
    pub message: NetMessage,
}

#[derive(Debug, thiserror::Error)]
pub enum PacketError {
    #[error("serialization failed: {0}")]
    Serialize(rancor::Error),
    #[error("deserialization failed: {0}")]
    Deserialize(rancor::Error),
}

impl Packet {
    pub fn new(tick: u32, message: NetMessage) -> Self {
        Self { tick, message }
    }

    pub fn serialize(&self) -> Result<Vec<u8>, PacketError> {
        rkyv::to_bytes::<rancor::Error>(self)
            .map(|aligned| aligned.into_vec())
            .map_err(PacketError::Serialize)
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, PacketError> {
        rkyv::from_bytes::<Self, rancor::Error>(data).map_err(PacketError::Deserialize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::MovementState;
    use crate::weapon::WeaponDefinition;

    #[test]
    fn input_survives_the_wire_bit_for_bit() {
        let mut frame = InputFrame::new(77).with_look_angle(0.731);
        frame.horizontal = -0.337;
        frame.pressed = Buttons::ATTACK1 | Buttons::JUMP;
        frame.held = Buttons::JUMP;

        let packet = Packet::new(
            77,
            NetMessage::Input {
                actor: 3,
                frames: vec![WireInput::from(&frame)],
            },
        );
        let decoded = Packet::deserialize(&packet.serialize().unwrap()).unwrap();

        let NetMessage::Input { actor, frames } = decoded.message else {
            panic!("expected input message");
        };
        assert_eq!(actor, 3);
        assert_eq!(InputFrame::from(&frames[0]), frame);
    }

    #[test]
    fn snapshot_keeps_weapon_and_source() {
        let def = WeaponDefinition::shotgun();
        let mut weapon = WeaponRuntimeState::equipped(&def);
        weapon.try_fire(10, &def, 50).unwrap();
        weapon.reload_ready_tick = Some(90);

        let mut state = MovementState::at(Vec2::new(1.25, 3.5));
        state.velocity = Vec2::new(-2.0, 7.5);
        state.dash_timer = 0.04;
        state.facing = -1;
        let snapshot = ReconcileSnapshot::capture(4, 60, &state, &weapon, SnapshotSource::Server);

        let packet = Packet::new(61, NetMessage::Reconcile(WireSnapshot::from(&snapshot)));
        let decoded = Packet::deserialize(&packet.serialize().unwrap()).unwrap();
        let NetMessage::Reconcile(wire) = decoded.message else {
            panic!("expected reconcile message");
        };
        assert_eq!(ReconcileSnapshot::from(&wire), snapshot);
    }

    #[test]
    fn only_bookkeeping_messages_are_reliable() {
        assert!(NetMessage::ProjectileDestroyed { id: 1 }.is_reliable());
        assert!(NetMessage::Equip { actor: 1, weapon: 1 }.is_reliable());
        assert!(NetMessage::PickupTaken { pickup: 4, actor: 1 }.is_reliable());
        assert!(NetMessage::Damaged {
            actor: 2,
            projectile: 9,
            damage: 3,
            remaining: 17,
            version: 1,
        }
        .is_reliable());
        assert!(!NetMessage::Input {
            actor: 1,
            frames: Vec::new()
        }
        .is_reliable());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(Packet::deserialize(&[0xFF, 0x01, 0x02]).is_err());
    }
}
