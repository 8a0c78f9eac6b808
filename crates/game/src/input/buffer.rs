use std::collections::VecDeque;

use super::InputFrame;

const MIN_CAPACITY: usize = 8;

/// Fixed-capacity history of captured frames, oldest first. Once full, every
/// push evicts the oldest frame.
#[derive(Debug, Clone)]
pub struct InputRingBuffer {
    frames: VecDeque<InputFrame>,
    capacity: usize,
}

impl InputRingBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(MIN_CAPACITY);
        Self {
            frames: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Returns false (and stores nothing) when `frame` is not newer than the
    /// newest stored frame.
    pub fn push(&mut self, frame: InputFrame) -> bool {
        if self.latest_tick().is_some_and(|latest| frame.tick <= latest) {
            log::debug!("dropping out-of-order input frame for tick {}", frame.tick);
            return false;
        }

        if self.frames.len() >= self.capacity {
            self.frames.pop_front();
        }
        self.frames.push_back(frame);
        true
    }

    pub fn get(&self, tick: u32) -> Option<&InputFrame> {
        // newest first; lookups are almost always recent ticks
        self.frames.iter().rev().find(|frame| frame.tick == tick)
    }

    pub fn frames_since(&self, from_tick: u32) -> impl Iterator<Item = &InputFrame> {
        self.frames.iter().filter(move |frame| frame.tick >= from_tick)
    }

    pub fn frames_after(&self, tick: u32) -> impl Iterator<Item = &InputFrame> {
        self.frames.iter().filter(move |frame| frame.tick > tick)
    }

    pub fn latest_tick(&self) -> Option<u32> {
        self.frames.back().map(|frame| frame.tick)
    }

    pub fn oldest_tick(&self) -> Option<u32> {
        self.frames.front().map(|frame| frame.tick)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(capacity: usize, ticks: std::ops::Range<u32>) -> InputRingBuffer {
        let mut buffer = InputRingBuffer::new(capacity);
        for tick in ticks {
            buffer.push(InputFrame::new(tick));
        }
        buffer
    }

    #[test]
    fn evicts_oldest_when_full() {
        let buffer = filled(8, 0..12);

        assert_eq!(buffer.len(), 8);
        assert_eq!(buffer.oldest_tick(), Some(4));
        assert_eq!(buffer.latest_tick(), Some(11));
        assert!(buffer.get(3).is_none());
        assert_eq!(buffer.get(7).map(|f| f.tick), Some(7));
    }

    #[test]
    fn range_is_ascending() {
        let buffer = filled(16, 100..110);

        let ticks: Vec<u32> = buffer.frames_since(105).map(|f| f.tick).collect();
        assert_eq!(ticks, vec![105, 106, 107, 108, 109]);

        let after: Vec<u32> = buffer.frames_after(107).map(|f| f.tick).collect();
        assert_eq!(after, vec![108, 109]);
    }

    #[test]
    fn rejects_stale_frames() {
        let mut buffer = filled(16, 0..5);

        assert!(!buffer.push(InputFrame::new(2)));
        assert!(!buffer.push(InputFrame::new(4)));
        assert_eq!(buffer.len(), 5);
        assert!(buffer.push(InputFrame::new(9)));
    }

    #[test]
    fn capacity_has_floor() {
        assert_eq!(InputRingBuffer::new(2).capacity(), 8);
    }
}
