use glam::Vec2;

use super::{Buttons, InputFrame};

const MIN_LOOK_LENGTH_SQUARED: f32 = 0.000001;

/// Maps a screen-space pointer onto the simulation plane (y up).
#[derive(Debug, Clone, Copy)]
pub struct PlaneProjection {
    pub camera_center: Vec2,
    pub pixels_per_unit: f32,
    pub viewport: Vec2,
}

impl PlaneProjection {
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        let offset = screen - self.viewport * 0.5;
        let ppu = self.pixels_per_unit.max(f32::EPSILON);
        self.camera_center + Vec2::new(offset.x, -offset.y) / ppu
    }
}

#[derive(Debug, Clone)]
pub struct InputCollector {
    horizontal: f32,
    held: Buttons,
    pressed_this_tick: Buttons,
    pointer: Vec2,
    default_facing: Vec2,
}

impl Default for InputCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl InputCollector {
    pub fn new() -> Self {
        Self {
            horizontal: 0.0,
            held: Buttons::empty(),
            pressed_this_tick: Buttons::empty(),
            pointer: Vec2::ZERO,
            default_facing: Vec2::X,
        }
    }

    pub fn press(&mut self, button: Buttons) {
        if !self.held.contains(button) {
            self.pressed_this_tick |= button;
        }
        self.held |= button;
    }

    pub fn release(&mut self, button: Buttons) {
        self.held.remove(button);
    }

    pub fn set_horizontal(&mut self, axis: f32) {
        self.horizontal = axis.clamp(-1.0, 1.0);
    }

    pub fn set_pointer_world(&mut self, target: Vec2) {
        self.pointer = target;
    }

    pub fn set_pointer_screen(&mut self, screen: Vec2, projection: &PlaneProjection) {
        self.pointer = projection.screen_to_world(screen);
    }

    /// Builds the frame for `tick` without consuming edge flags, so repeated
    /// reads inside one tick agree.
    pub fn sample(&self, tick: u32, actor_position: Vec2) -> InputFrame {
        let to_target = self.pointer - actor_position;
        let look_direction = if to_target.length_squared() > MIN_LOOK_LENGTH_SQUARED {
            to_target.normalize()
        } else {
            self.default_facing
        };

        InputFrame {
            tick,
            horizontal: self.horizontal,
            pressed: self.pressed_this_tick,
            held: self.held,
            look_direction,
            look_angle: look_direction.y.atan2(look_direction.x),
        }
    }

    pub fn capture(&mut self, tick: u32, actor_position: Vec2) -> InputFrame {
        let frame = self.sample(tick, actor_position);
        self.pressed_this_tick = Buttons::empty();
        frame
    }
}
