mod buffer;
mod collector;
mod frame;

pub use buffer::InputRingBuffer;
pub use collector::{InputCollector, PlaneProjection};
pub use frame::{Buttons, InputFrame};
