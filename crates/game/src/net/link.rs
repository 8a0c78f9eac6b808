use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkConfig {
    pub latency_ticks: u32,
    pub jitter_ticks: u32,
    /// Chance in percent that an unreliable datagram is lost.
    pub loss_percent: f32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            latency_ticks: 3,
            jitter_ticks: 2,
            loss_percent: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    pub sent: u64,
    pub dropped: u64,
    pub delivered: u64,
}

#[derive(Debug)]
struct InFlight<A> {
    release_tick: u32,
    order: u64,
    to: A,
    payload: Vec<u8>,
}

impl<A> PartialEq for InFlight<A> {
    fn eq(&self, other: &Self) -> bool {
        self.release_tick == other.release_tick && self.order == other.order
    }
}

impl<A> Eq for InFlight<A> {}

impl<A> PartialOrd for InFlight<A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<A> Ord for InFlight<A> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap
        other
            .release_tick
            .cmp(&self.release_tick)
            .then_with(|| other.order.cmp(&self.order))
    }
}

/// In-process stand-in for the transport: every datagram is held back by the
/// base latency plus seeded jitter, so delivery order differs from send order.
/// Unreliable datagrams may also be lost. Fully reproducible for a given seed.
#[derive(Debug)]
pub struct LinkSimulator<A> {
    config: LinkConfig,
    rng: ChaCha8Rng,
    in_flight: BinaryHeap<InFlight<A>>,
    next_order: u64,
    stats: LinkStats,
}

impl<A> LinkSimulator<A> {
    pub fn new(config: LinkConfig, seed: u64) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            in_flight: BinaryHeap::new(),
            next_order: 0,
            stats: LinkStats::default(),
        }
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Queues `payload` for `to`. Returns `false` when the datagram was lost.
    pub fn send(&mut self, now_tick: u32, to: A, payload: Vec<u8>, reliable: bool) -> bool {
        self.stats.sent += 1;

        if !reliable && self.config.loss_percent > 0.0 {
            let roll: f32 = self.rng.gen_range(0.0..100.0);
            if roll < self.config.loss_percent {
                self.stats.dropped += 1;
                return false;
            }
        }

        let jitter = if self.config.jitter_ticks > 0 {
            self.rng.gen_range(0..=self.config.jitter_ticks)
        } else {
            0
        };

        self.in_flight.push(InFlight {
            release_tick: now_tick
                .saturating_add(self.config.latency_ticks)
                .saturating_add(jitter),
            order: self.next_order,
            to,
            payload,
        });
        self.next_order += 1;
        true
    }

    /// Everything due at or before `now_tick`, in release order.
    pub fn deliver(&mut self, now_tick: u32) -> Vec<(A, Vec<u8>)> {
        let mut due = Vec::new();
        while self
            .in_flight
            .peek()
            .is_some_and(|next| next.release_tick <= now_tick)
        {
            if let Some(next) = self.in_flight.pop() {
                due.push((next.to, next.payload));
            }
        }
        self.stats.delivered += due.len() as u64;
        due
    }
}
