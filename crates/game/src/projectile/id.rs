use std::fmt;

/// Identifies one pellet of one spawn event, packed as
/// `owner:16 | tick:32 | pellet:16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(u64);

impl ProjectileId {
    pub fn pack(owner: u16, tick: u32, pellet: u16) -> Self {
        Self(((owner as u64) << 48) | ((tick as u64) << 16) | pellet as u64)
    }

    /// Packs wider inputs, refusing anything that would be truncated.
    pub fn try_pack(owner: u32, tick: u64, pellet: usize) -> Option<Self> {
        Some(Self::pack(
            u16::try_from(owner).ok()?,
            u32::try_from(tick).ok()?,
            u16::try_from(pellet).ok()?,
        ))
    }

    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }

    pub fn owner(self) -> u16 {
        (self.0 >> 48) as u16
    }

    pub fn tick(self) -> u32 {
        (self.0 >> 16) as u32
    }

    pub fn pellet(self) -> u16 {
        self.0 as u16
    }
}

impl fmt::Display for ProjectileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.owner(), self.tick(), self.pellet())
    }
}
