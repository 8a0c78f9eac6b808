use bitflags::bitflags;
use glam::Vec2;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Buttons: u16 {
        const JUMP = 1 << 0;
        const ATTACK1 = 1 << 1;
        const ATTACK2 = 1 << 2;
        const DASH = 1 << 3;
        const RELOAD = 1 << 4;
        const INTERACT = 1 << 5;
    }
}

/// One tick of player intent. `pressed` holds edge flags that are set only on
/// the tick the button went down; `held` holds level flags.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputFrame {
    pub tick: u32,
    pub horizontal: f32,
    pub pressed: Buttons,
    pub held: Buttons,
    pub look_direction: Vec2,
    pub look_angle: f32,
}

impl Default for InputFrame {
    fn default() -> Self {
        Self::new(0)
    }
}

impl InputFrame {
    pub fn new(tick: u32) -> Self {
        Self {
            tick,
            horizontal: 0.0,
            pressed: Buttons::empty(),
            held: Buttons::empty(),
            look_direction: Vec2::X,
            look_angle: 0.0,
        }
    }

    pub fn with_tick(mut self, tick: u32) -> Self {
        self.tick = tick;
        self
    }

    pub fn with_look_angle(mut self, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        self.look_direction = Vec2::new(cos, sin);
        self.look_angle = angle;
        self
    }

    pub fn was_pressed(&self, button: Buttons) -> bool {
        self.pressed.contains(button)
    }

    pub fn is_held(&self, button: Buttons) -> bool {
        self.held.contains(button)
    }
}
