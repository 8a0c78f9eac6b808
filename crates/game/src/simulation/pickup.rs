use std::collections::BTreeMap;

use glam::Vec2;

use crate::weapon::WeaponId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PickupId(pub u16);

/// A weapon lying in the arena. Any actor whose center is within `radius`
/// may take it, once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponPickup {
    pub id: PickupId,
    pub weapon: WeaponId,
    pub position: Vec2,
    pub radius: f32,
}

impl WeaponPickup {
    pub fn new(id: u16, weapon: WeaponId, position: Vec2, radius: f32) -> Self {
        Self {
            id: PickupId(id),
            weapon,
            position,
            radius,
        }
    }

    pub fn reaches(&self, point: Vec2) -> bool {
        self.position.distance_squared(point) <= self.radius * self.radius
    }
}

#[derive(Debug, Default)]
pub struct PickupTable {
    pickups: BTreeMap<PickupId, WeaponPickup>,
}

impl PickupTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the id is already on the table.
    pub fn insert(&mut self, pickup: WeaponPickup) -> bool {
        if self.pickups.contains_key(&pickup.id) {
            return false;
        }
        self.pickups.insert(pickup.id, pickup);
        true
    }

    pub fn remove(&mut self, id: PickupId) -> Option<WeaponPickup> {
        self.pickups.remove(&id)
    }

    pub fn get(&self, id: PickupId) -> Option<&WeaponPickup> {
        self.pickups.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WeaponPickup> {
        self.pickups.values()
    }

    pub fn len(&self) -> usize {
        self.pickups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pickups.is_empty()
    }

    /// Closest pickup reaching `point`. Equal distances go to the lower id.
    pub fn nearest(&self, point: Vec2) -> Option<&WeaponPickup> {
        self.pickups
            .values()
            .filter(|pickup| pickup.reaches(point))
            .min_by(|a, b| {
                let da = a.position.distance_squared(point);
                let db = b.position.distance_squared(point);
                da.total_cmp(&db).then(a.id.cmp(&b.id))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PickupTable {
        let mut table = PickupTable::new();
        assert!(table.insert(WeaponPickup::new(1, WeaponId::Pistol, Vec2::new(0.0, 0.0), 1.0)));
        assert!(table.insert(WeaponPickup::new(2, WeaponId::Shotgun, Vec2::new(1.5, 0.0), 1.0)));
        table
    }

    #[test]
    fn nearest_prefers_the_closest_reaching_pickup() {
        let table = table();
        assert_eq!(table.nearest(Vec2::new(0.2, 0.0)).map(|p| p.id), Some(PickupId(1)));
        assert_eq!(table.nearest(Vec2::new(1.2, 0.0)).map(|p| p.id), Some(PickupId(2)));
        assert_eq!(table.nearest(Vec2::new(0.75, 0.0)).map(|p| p.id), Some(PickupId(1)));
        assert!(table.nearest(Vec2::new(5.0, 0.0)).is_none());
    }

    #[test]
    fn ids_are_unique_and_taken_once() {
        let mut table = table();
        assert!(!table.insert(WeaponPickup::new(1, WeaponId::Shotgun, Vec2::ZERO, 3.0)));
        assert_eq!(table.get(PickupId(1)).map(|p| p.weapon), Some(WeaponId::Pistol));

        assert!(table.remove(PickupId(1)).is_some());
        assert!(table.remove(PickupId(1)).is_none());
        assert_eq!(table.len(), 1);
        assert!(!table.is_empty());
    }
}
