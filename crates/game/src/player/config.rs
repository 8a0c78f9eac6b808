use glam::Vec2;

#[derive(Debug, Clone)]
pub struct MovementConfig {
    pub max_move_speed: f32,
    pub acceleration: f32,
    pub deceleration: f32,
    pub air_acceleration: f32,
    pub air_deceleration: f32,

    pub jump_force: f32,
    /// Signed; negative pulls down.
    pub gravity: f32,
    pub coyote_time: f32,
    pub jump_buffer_time: f32,
    pub variable_jump: bool,
    pub jump_cut_multiplier: f32,

    pub dash_speed: f32,
    pub dash_duration: f32,

    pub ground_probe_radius: f32,
    pub half_extents: Vec2,

    pub input_deadzone: f32,
    pub muzzle_offset: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            max_move_speed: 8.0,
            acceleration: 40.0,
            deceleration: 60.0,
            air_acceleration: 30.0,
            air_deceleration: 40.0,

            jump_force: 14.0,
            gravity: -40.0,
            coyote_time: 0.10,
            jump_buffer_time: 0.10,
            variable_jump: true,
            jump_cut_multiplier: 0.5,

            dash_speed: 20.0,
            dash_duration: 0.15,

            ground_probe_radius: 0.12,
            half_extents: Vec2::new(0.4, 0.9),

            input_deadzone: 0.01,
            muzzle_offset: 0.6,
        }
    }
}
