use std::collections::VecDeque;

use super::types::{GameEvent, ReliabilityMode};

#[derive(Debug, Clone, PartialEq)]
pub struct PendingEvent {
    pub tick: u32,
    pub event: GameEvent,
    pub sequence: u32,
}

impl PendingEvent {
    pub fn is_expired(&self, current_tick: u32) -> bool {
        match self.event.reliability() {
            ReliabilityMode::UnreliableExpiring { ttl_ticks } => {
                current_tick.saturating_sub(self.tick) > ttl_ticks
            }
            ReliabilityMode::Unreliable => current_tick > self.tick,
            ReliabilityMode::Reliable => false,
        }
    }
}

/// Outbound effects waiting for a consumer. When full, the oldest unreliable
/// entry makes room; reliable entries are only removed by draining.
#[derive(Debug)]
pub struct EventQueue {
    pending: VecDeque<PendingEvent>,
    next_sequence: u32,
    max_pending: usize,
}

impl EventQueue {
    pub fn new(max_pending: usize) -> Self {
        Self {
            pending: VecDeque::with_capacity(max_pending),
            next_sequence: 0,
            max_pending,
        }
    }

    pub fn push(&mut self, tick: u32, event: GameEvent) -> u32 {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.wrapping_add(1);

        if self.pending.len() >= self.max_pending {
            self.evict_oldest_unreliable();
        }

        self.pending.push_back(PendingEvent {
            tick,
            event,
            sequence,
        });

        sequence
    }

    pub fn cleanup(&mut self, current_tick: u32) {
        self.pending.retain(|e| !e.is_expired(current_tick));
    }

    pub fn drain(&mut self) -> Vec<PendingEvent> {
        self.pending.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    fn evict_oldest_unreliable(&mut self) {
        if let Some(idx) = self
            .pending
            .iter()
            .position(|e| !e.event.reliability().is_reliable())
        {
            self.pending.remove(idx);
        }
    }
}
