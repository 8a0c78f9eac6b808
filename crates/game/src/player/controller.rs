use glam::Vec2;

use crate::error::FireRejection;
use crate::input::{Buttons, InputFrame};
use crate::physics::{CollisionProvider, ObjectId};
use crate::weapon::{WeaponBehavior, WeaponDefinition, WeaponFire, WeaponId, WeaponRuntimeState};

use super::{MovementConfig, MovementState};

#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    pub dt: f32,
    pub tick_rate: u32,
    pub body: ObjectId,
    pub weapon: Option<&'a WeaponDefinition>,
    /// Set while re-executing already-simulated input after a correction.
    pub replay: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireIntent {
    pub tick: u32,
    pub weapon: WeaponId,
    pub origin: Vec2,
    pub aim_angle: f32,
    pub replay: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StepOutput {
    pub fire: Option<FireIntent>,
    pub rejection: Option<FireRejection>,
    pub jumped: bool,
    pub dashed: bool,
    pub reload_started: bool,
}

/// The deterministic movement/prediction step shared by the owning client and
/// the server. Given equal state, input and dt it yields bit-identical output.
#[derive(Debug, Clone, Default)]
pub struct MovementController {
    config: MovementConfig,
}

impl MovementController {
    pub fn new(config: MovementConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    pub fn step<W: CollisionProvider>(
        &self,
        state: &mut MovementState,
        weapon: &mut WeaponRuntimeState,
        input: &InputFrame,
        ctx: &StepContext<'_>,
        world: &W,
    ) -> StepOutput {
        let dt = ctx.dt;
        let mut output = StepOutput::default();

        self.tick_jump_buffer(state, input, dt);
        self.tick_grounded(state, ctx.body, dt, world);
        output.dashed = self.tick_horizontal(state, input, dt);
        output.jumped = self.tick_vertical(state, input, dt);

        if state.grounded && state.velocity.y < 0.0 {
            state.velocity.y = 0.0;
        }

        if input.horizontal.abs() > self.config.input_deadzone {
            state.facing = if input.horizontal > 0.0 { 1 } else { -1 };
        }

        self.tick_weapon(state, weapon, input, ctx, &mut output);
        self.integrate(state, ctx.body, dt, world);

        output
    }

    fn tick_jump_buffer(&self, state: &mut MovementState, input: &InputFrame, dt: f32) {
        if input.was_pressed(Buttons::JUMP) {
            state.jump_buffer_timer = self.config.jump_buffer_time;
        } else {
            state.jump_buffer_timer = (state.jump_buffer_timer - dt).max(0.0);
        }
    }

    fn tick_grounded<W: CollisionProvider>(
        &self,
        state: &mut MovementState,
        body: ObjectId,
        dt: f32,
        world: &W,
    ) {
        let feet = state.feet(self.config.half_extents);
        state.grounded = world.probe_ground(feet, self.config.ground_probe_radius, Some(body));

        if state.grounded {
            state.coyote_timer = self.config.coyote_time;
        } else {
            state.coyote_timer = (state.coyote_timer - dt).max(0.0);
        }
    }

    fn tick_horizontal(&self, state: &mut MovementState, input: &InputFrame, dt: f32) -> bool {
        let mut dashed = false;

        if state.dash_timer <= 0.0 && input.was_pressed(Buttons::DASH) {
            let direction = if input.horizontal.abs() > self.config.input_deadzone {
                input.horizontal.signum()
            } else {
                state.facing as f32
            };
            state.dash_timer = self.config.dash_duration;
            state.velocity.x = direction * self.config.dash_speed;
            dashed = true;
        }

        if state.dash_timer > 0.0 {
            state.dash_timer = (state.dash_timer - dt).max(0.0);
            return dashed;
        }

        let target_speed = input.horizontal * self.config.max_move_speed;
        let has_input = target_speed.abs() > self.config.input_deadzone;
        let rate = match (state.grounded, has_input) {
            (true, true) => self.config.acceleration,
            (true, false) => self.config.deceleration,
            (false, true) => self.config.air_acceleration,
            (false, false) => self.config.air_deceleration,
        };

        state.velocity.x = move_toward(state.velocity.x, target_speed, rate * dt);
        dashed
    }

    fn tick_vertical(&self, state: &mut MovementState, input: &InputFrame, dt: f32) -> bool {
        if state.jump_buffer_timer > 0.0 && state.coyote_timer > 0.0 {
            state.velocity.y = self.config.jump_force;
            state.jump_buffer_timer = 0.0;
            state.coyote_timer = 0.0;
            return true;
        }

        state.velocity.y += self.config.gravity * dt;
        if self.config.variable_jump && !input.is_held(Buttons::JUMP) && state.velocity.y > 0.0 {
            state.velocity.y += self.config.gravity * (1.0 - self.config.jump_cut_multiplier) * dt;
        }
        false
    }

    fn tick_weapon(
        &self,
        state: &mut MovementState,
        weapon: &mut WeaponRuntimeState,
        input: &InputFrame,
        ctx: &StepContext<'_>,
        output: &mut StepOutput,
    ) {
        let Some(definition) = ctx.weapon.filter(|def| def.id == weapon.equipped) else {
            if input.was_pressed(Buttons::ATTACK1) {
                output.rejection = Some(if weapon.has_weapon() {
                    FireRejection::WeaponMismatch
                } else {
                    FireRejection::NoWeapon
                });
            }
            return;
        };

        weapon.finish_reload(input.tick, definition);
        if input.was_pressed(Buttons::RELOAD) {
            output.reload_started = weapon.start_reload(input.tick, definition, ctx.tick_rate);
        }

        if !input.was_pressed(Buttons::ATTACK1) {
            return;
        }

        let Some(behavior) = WeaponBehavior::for_weapon(definition.id) else {
            output.rejection = Some(FireRejection::NoWeapon);
            return;
        };

        match behavior.fire(weapon, input.tick, definition, ctx.tick_rate) {
            Ok(ticket) => {
                output.fire = Some(FireIntent {
                    tick: ticket.tick,
                    weapon: ticket.weapon,
                    origin: state.position + input.look_direction * self.config.muzzle_offset,
                    aim_angle: input.look_angle,
                    replay: ctx.replay,
                });
                self.apply_recoil(state, input.look_direction, definition.recoil_force);
            }
            Err(rejection) => output.rejection = Some(rejection),
        }
    }

    fn apply_recoil(&self, state: &mut MovementState, aim: Vec2, force: f32) {
        if force <= 0.0 {
            return;
        }

        let impulse = -aim * force;
        state.velocity.x += impulse.x;

        // stacking shots while already moving the same way vertically gains less
        let damping = if impulse.y * state.velocity.y > 0.0 {
            force / (force + state.velocity.y.abs())
        } else {
            1.0
        };
        state.velocity.y += impulse.y * damping;
    }

    fn integrate<W: CollisionProvider>(
        &self,
        state: &mut MovementState,
        body: ObjectId,
        dt: f32,
        world: &W,
    ) {
        let desired = state.velocity * dt;
        let resolved =
            world.resolve_motion(body, state.position, self.config.half_extents, desired);
        state.position += resolved;

        let blocked = resolved - desired;
        if blocked.x.abs() > f32::EPSILON {
            state.velocity.x = 0.0;
        }
        if (blocked.y > f32::EPSILON && state.velocity.y < 0.0)
            || (blocked.y < -f32::EPSILON && state.velocity.y > 0.0)
        {
            state.velocity.y = 0.0;
        }
    }
}

/// Moves `current` toward `target` by at most `max_delta`, never overshooting.
pub fn move_toward(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}
