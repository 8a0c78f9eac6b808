use log::debug;

use crate::input::InputRingBuffer;
use crate::physics::CollisionProvider;
use crate::player::{MovementController, MovementState, StepContext};
use crate::weapon::WeaponRuntimeState;

use super::{PredictionHistory, ReconcileSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconcilePhase {
    #[default]
    Predicting,
    Correcting,
    Replaying,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconcileReport {
    pub snapshot_tick: u32,
    pub replayed: usize,
    /// Distance between the predicted and corrected position at the snapshot
    /// tick, when the prediction was still in history.
    pub divergence: Option<f32>,
    /// Shots the replay re-ran without dispatching them again.
    pub suppressed_fires: usize,
}

/// Per-actor correction state machine of the owning client.
#[derive(Debug)]
pub struct Reconciler {
    phase: ReconcilePhase,
    last_snapshot_tick: Option<u32>,
    history: PredictionHistory,
}

impl Reconciler {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            phase: ReconcilePhase::Predicting,
            last_snapshot_tick: None,
            history: PredictionHistory::new(history_capacity),
        }
    }

    pub fn phase(&self) -> ReconcilePhase {
        self.phase
    }

    pub fn last_snapshot_tick(&self) -> Option<u32> {
        self.last_snapshot_tick
    }

    pub fn history(&self) -> &PredictionHistory {
        &self.history
    }

    pub fn record(&mut self, tick: u32, state: &MovementState, weapon: &WeaponRuntimeState) {
        self.history.record(tick, *state, *weapon);
    }

    /// Rewinds to `snapshot` and replays every buffered frame after it.
    /// Snapshots not newer than the last applied one are ignored.
    #[allow(clippy::too_many_arguments)]
    pub fn reconcile<W: CollisionProvider>(
        &mut self,
        snapshot: &ReconcileSnapshot,
        owner: bool,
        state: &mut MovementState,
        weapon: &mut WeaponRuntimeState,
        inputs: &InputRingBuffer,
        controller: &MovementController,
        ctx: &StepContext<'_>,
        world: &W,
    ) -> Option<ReconcileReport> {
        if self.last_snapshot_tick.is_some_and(|last| snapshot.tick <= last) {
            debug!("ignoring stale snapshot for tick {}", snapshot.tick);
            return None;
        }
        self.last_snapshot_tick = Some(snapshot.tick);

        self.phase = ReconcilePhase::Correcting;
        let divergence = self
            .history
            .get(snapshot.tick)
            .map(|predicted| predicted.state.position.distance(snapshot.body.position));

        snapshot.apply_to(state, !owner || snapshot.is_authoritative());
        if snapshot.is_authoritative() {
            *weapon = snapshot.weapon;
        }
        self.history.record(snapshot.tick, *state, *weapon);

        self.phase = ReconcilePhase::Replaying;
        let replay_ctx = StepContext { replay: true, ..*ctx };
        let mut replayed = 0;
        let mut suppressed_fires = 0;
        for frame in inputs.frames_after(snapshot.tick) {
            let output = controller.step(state, weapon, frame, &replay_ctx, world);
            if output.fire.is_some() {
                suppressed_fires += 1;
            }
            self.history.record(frame.tick, *state, *weapon);
            replayed += 1;
        }
        self.phase = ReconcilePhase::Predicting;

        if let Some(error) = divergence.filter(|e| *e > f32::EPSILON) {
            debug!(
                "corrected {error:.4} units at tick {}, replayed {replayed} frames",
                snapshot.tick
            );
        }

        Some(ReconcileReport {
            snapshot_tick: snapshot.tick,
            replayed,
            divergence,
            suppressed_fires,
        })
    }
}
