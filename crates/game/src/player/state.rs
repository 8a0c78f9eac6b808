use glam::Vec2;

/// Simulated state of one actor at one execution site. Never shared between
/// the owner's copy and the server's copy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementState {
    pub position: Vec2,
    pub velocity: Vec2,
    pub grounded: bool,
    pub coyote_timer: f32,
    pub jump_buffer_timer: f32,
    pub dash_timer: f32,
    pub facing: i8,
}

impl Default for MovementState {
    fn default() -> Self {
        Self::at(Vec2::ZERO)
    }
}

impl MovementState {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            grounded: false,
            coyote_timer: 0.0,
            jump_buffer_timer: 0.0,
            dash_timer: 0.0,
            facing: 1,
        }
    }

    pub fn feet(&self, half_extents: Vec2) -> Vec2 {
        self.position - Vec2::new(0.0, half_extents.y)
    }
}
