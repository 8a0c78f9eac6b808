mod history;
mod reconciler;
mod snapshot;

pub use history::{PredictedTick, PredictionHistory};
pub use reconciler::{ReconcilePhase, ReconcileReport, Reconciler};
pub use snapshot::{BodyState, ReconcileSnapshot, SnapshotSource};
