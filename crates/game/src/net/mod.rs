mod link;
mod protocol;

pub use link::{LinkConfig, LinkSimulator, LinkStats};
pub use protocol::{
    INPUT_REDUNDANCY, NetMessage, Packet, PacketError, WireInput, WireSnapshot, WireWeapon,
};
