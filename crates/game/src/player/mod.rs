mod config;
mod controller;
mod state;

pub use config::MovementConfig;
pub use controller::{FireIntent, MovementController, StepContext, StepOutput};
pub use state::MovementState;
