use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use skirmish::{Buttons, InputCollector};

/// Scripted player: wanders, hops, dashes, grabs weapons it walks over and
/// takes a shot at whoever it is currently aiming at. Seeded, so a run with
/// the same seed replays exactly.
pub struct Bot {
    rng: ChaCha8Rng,
    collector: InputCollector,
    heading: f32,
    target: Vec2,
}

impl Bot {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            collector: InputCollector::new(),
            heading: 1.0,
            target: Vec2::ZERO,
        }
    }

    pub fn aim_at(&mut self, target: Vec2) {
        self.target = target;
    }

    pub fn think(&mut self, tick: u32) {
        self.collector.release(Buttons::DASH);
        self.collector.release(Buttons::ATTACK1);
        self.collector.release(Buttons::RELOAD);
        self.collector.release(Buttons::INTERACT);

        if tick % 40 == 0 {
            self.heading = match self.rng.gen_range(0..3) {
                0 => -1.0,
                1 => 0.0,
                _ => 1.0,
            };
        }
        self.collector.set_horizontal(self.heading);
        self.collector.set_pointer_world(self.target);

        if self.rng.gen_bool(0.03) {
            self.collector.press(Buttons::JUMP);
        } else if self.rng.gen_bool(0.2) {
            self.collector.release(Buttons::JUMP);
        }
        if self.rng.gen_bool(0.01) {
            self.collector.press(Buttons::DASH);
        }
        if self.rng.gen_bool(0.05) {
            self.collector.press(Buttons::ATTACK1);
        }
        if self.rng.gen_bool(0.004) {
            self.collector.press(Buttons::RELOAD);
        }
        if self.rng.gen_bool(0.02) {
            self.collector.press(Buttons::INTERACT);
        }
    }

    pub fn collector(&mut self) -> &mut InputCollector {
        &mut self.collector
    }
}
