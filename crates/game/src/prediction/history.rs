use crate::player::MovementState;
use crate::weapon::WeaponRuntimeState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictedTick {
    pub tick: u32,
    pub state: MovementState,
    pub weapon: WeaponRuntimeState,
}

/// Predicted end-of-tick states, indexed by `tick % capacity`.
#[derive(Debug)]
pub struct PredictionHistory {
    slots: Vec<Option<PredictedTick>>,
    capacity: usize,
}

impl PredictionHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: vec![None; capacity],
            capacity,
        }
    }

    pub fn record(&mut self, tick: u32, state: MovementState, weapon: WeaponRuntimeState) {
        let index = tick as usize % self.capacity;
        self.slots[index] = Some(PredictedTick { tick, state, weapon });
    }

    pub fn get(&self, tick: u32) -> Option<&PredictedTick> {
        let index = tick as usize % self.capacity;
        self.slots[index].as_ref().filter(|p| p.tick == tick)
    }

    pub fn latest(&self) -> Option<&PredictedTick> {
        self.slots.iter().flatten().max_by_key(|p| p.tick)
    }

    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;

    #[test]
    fn old_ticks_are_overwritten() {
        let mut history = PredictionHistory::new(8);
        for tick in 0..20 {
            let state = MovementState::at(Vec2::new(tick as f32, 0.0));
            history.record(tick, state, WeaponRuntimeState::new());
        }

        assert_eq!(history.len(), 8);
        assert!(history.get(11).is_none());
        assert_eq!(history.get(15).unwrap().state.position.x, 15.0);
        assert_eq!(history.latest().unwrap().tick, 19);
    }
}
