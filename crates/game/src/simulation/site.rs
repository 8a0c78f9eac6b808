use std::collections::{BTreeMap, HashSet};

use glam::Vec2;
use log::{debug, info, warn};

use crate::definitions::Definitions;
use crate::error::ConfigError;
use crate::event::{EventQueue, GameEvent, PendingEvent};
use crate::input::{Buttons, InputFrame};
use crate::net::{INPUT_REDUNDANCY, NetMessage, Packet, PacketError, WireInput, WireSnapshot};
use crate::physics::{ActorBodies, CollisionProvider, LAYER_ACTOR, ObjectId};
use crate::player::{
    FireIntent, MovementConfig, MovementController, MovementState, StepContext, StepOutput,
};
use crate::prediction::{ReconcileSnapshot, SnapshotSource};
use crate::projectile::{
    DespawnReason, HitOutcome, HitTargets, Hittable, ProjectileId, ProjectileRegistry,
    ProjectileRole, ProjectileSpawn,
};
use crate::weapon::{
    BurstRequest, WeaponBehavior, WeaponDefinition, WeaponFire, WeaponId, WeaponRuntimeState,
};

use super::{Actor, ActorId, ActorRole, FixedTimestep, PickupId, PickupTable, WeaponPickup};

#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub tick_rate: u32,
    pub input_buffer_capacity: usize,
    pub prediction_history: usize,
    pub snapshot_interval_ticks: u32,
    pub tombstone_capacity: usize,
    pub event_capacity: usize,
    pub max_health: u32,
    pub movement: MovementConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            tick_rate: 50,
            input_buffer_capacity: 256,
            prediction_history: 128,
            snapshot_interval_ticks: 2,
            tombstone_capacity: 1024,
            event_capacity: 256,
            max_health: 100,
            movement: MovementConfig::default(),
        }
    }
}

impl SiteConfig {
    pub fn tick_dt(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteRole {
    Server,
    Client { local: ActorId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Peer {
    Server,
    Client(ActorId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outgoing {
    pub to: Peer,
    pub reliable: bool,
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SiteStats {
    pub ticks: u64,
    pub shots: u64,
    pub fire_rejections: u64,
    pub reconciles: u64,
    pub replayed_frames: u64,
    pub suppressed_fires: u64,
    pub max_divergence: f32,
    pub projectiles_spawned: u64,
    pub projectiles_refused: u64,
    pub projectiles_destroyed: u64,
    pub hits: u64,
    pub deaths: u64,
    pub pickups_taken: u64,
}

struct ActorTargets<'a>(&'a mut BTreeMap<ActorId, Actor>);

impl HitTargets for ActorTargets<'_> {
    fn target(&mut self, object: ObjectId) -> Option<&mut dyn Hittable> {
        let id = ActorId::from_object(object)?;
        self.0
            .get_mut(&id)
            .map(|actor| &mut actor.health as &mut dyn Hittable)
    }
}

fn equipped_definition<'a>(
    definitions: &'a Definitions,
    weapon: &WeaponRuntimeState,
) -> Option<&'a WeaponDefinition> {
    if !weapon.has_weapon() {
        return None;
    }
    definitions.weapon(weapon.equipped).ok()
}

/// One execution site: the server or a single client process. Owns every
/// piece of mutable simulation state it touches and is driven by one thread.
pub struct Site<W> {
    role: SiteRole,
    config: SiteConfig,
    definitions: Definitions,
    controller: MovementController,
    timestep: FixedTimestep,
    tick: u32,
    actors: BTreeMap<ActorId, Actor>,
    departed: HashSet<ActorId>,
    registry: ProjectileRegistry,
    pickups: PickupTable,
    world: W,
    events: EventQueue,
    outbox: Vec<Outgoing>,
    stats: SiteStats,
}

impl<W: CollisionProvider + ActorBodies> Site<W> {
    pub fn server(config: SiteConfig, definitions: Definitions, world: W) -> Self {
        Self::new(SiteRole::Server, config, definitions, world)
    }

    pub fn client(local: ActorId, config: SiteConfig, definitions: Definitions, world: W) -> Self {
        Self::new(SiteRole::Client { local }, config, definitions, world)
    }

    fn new(role: SiteRole, config: SiteConfig, definitions: Definitions, world: W) -> Self {
        info!("starting {role:?} site at {} Hz", config.tick_rate);
        Self {
            role,
            controller: MovementController::new(config.movement.clone()),
            timestep: FixedTimestep::new(config.tick_rate),
            tick: 0,
            actors: BTreeMap::new(),
            departed: HashSet::new(),
            registry: ProjectileRegistry::new(config.tick_dt(), config.tombstone_capacity),
            pickups: PickupTable::new(),
            world,
            events: EventQueue::new(config.event_capacity),
            outbox: Vec::new(),
            stats: SiteStats::default(),
            definitions,
            config,
        }
    }

    pub fn role(&self) -> SiteRole {
        self.role
    }

    pub fn is_server(&self) -> bool {
        self.role == SiteRole::Server
    }

    pub fn tick(&self) -> u32 {
        self.tick
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    pub fn actors(&self) -> impl Iterator<Item = &Actor> {
        self.actors.values()
    }

    pub fn local_actor(&self) -> Option<&Actor> {
        match self.role {
            SiteRole::Client { local } => self.actors.get(&local),
            SiteRole::Server => None,
        }
    }

    pub fn registry(&self) -> &ProjectileRegistry {
        &self.registry
    }

    pub fn pickups(&self) -> &PickupTable {
        &self.pickups
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn stats(&self) -> SiteStats {
        self.stats
    }

    pub fn drain_outbox(&mut self) -> Vec<Outgoing> {
        std::mem::take(&mut self.outbox)
    }

    pub fn drain_events(&mut self) -> Vec<PendingEvent> {
        self.events.drain()
    }

    pub fn add_actor(&mut self, id: ActorId, spawn_point: Vec2) -> bool {
        if !self.is_server() || self.actors.contains_key(&id) {
            return false;
        }

        self.insert_actor(id, ActorRole::Authority, spawn_point);

        let others: Vec<(ActorId, Vec2, WeaponId, u32)> = self
            .actors
            .values()
            .filter(|actor| actor.id != id)
            .map(|actor| {
                let position = actor.movement.position;
                (actor.id, position, actor.weapon.equipped, actor.health.current)
            })
            .collect();
        for (other, position, weapon, health) in others {
            self.send(
                Peer::Client(id),
                NetMessage::ActorJoined {
                    actor: other.0,
                    position: position.to_array(),
                    health,
                },
            );
            self.send(
                Peer::Client(id),
                NetMessage::Equip {
                    actor: other.0,
                    weapon: weapon as u8,
                },
            );
        }
        let pickups: Vec<WeaponPickup> = self.pickups.iter().copied().collect();
        for pickup in pickups {
            self.send(Peer::Client(id), pickup_spawned(&pickup));
        }
        self.broadcast(
            NetMessage::ActorJoined {
                actor: id.0,
                position: spawn_point.to_array(),
                health: self.config.max_health,
            },
            None,
        );
        true
    }

    /// Server only: places a weapon in the arena. Fails if the weapon has
    /// no definition, so taking it later cannot.
    pub fn add_pickup(&mut self, pickup: WeaponPickup) -> Result<bool, ConfigError> {
        if !self.is_server() {
            return Ok(false);
        }
        self.definitions.weapon(pickup.weapon)?;
        if !self.pickups.insert(pickup) {
            return Ok(false);
        }
        self.events.push(
            self.tick,
            GameEvent::PickupSpawned {
                pickup: pickup.id.0,
                weapon: pickup.weapon as u8,
                position: pickup.position.to_array(),
            },
        );
        self.broadcast(pickup_spawned(&pickup), None);
        Ok(true)
    }

    /// Stops simulating `id`. Its projectiles keep flying.
    pub fn remove_actor(&mut self, id: ActorId) -> bool {
        if !self.drop_actor(id) {
            return false;
        }
        if self.is_server() {
            self.broadcast(NetMessage::ActorLeft { actor: id.0 }, None);
        }
        true
    }

    /// Server only: resets the actor's weapon to a fresh `weapon` and tells
    /// every peer to rebuild its mirror. `WeaponId::None` unequips.
    pub fn equip(&mut self, id: ActorId, weapon: WeaponId) -> Result<bool, ConfigError> {
        if !self.is_server() {
            return Ok(false);
        }
        let definition = match weapon {
            WeaponId::None => None,
            weapon_id => Some(
                self.definitions
                    .weapon(weapon_id)
                    .inspect_err(|err| warn!("equip aborted: {err}"))?,
            ),
        };
        let Some(actor) = self.actors.get_mut(&id) else {
            return Ok(false);
        };

        actor.weapon.rebuild(definition);
        self.events.push(
            self.tick,
            GameEvent::WeaponEquipped {
                actor: id.0,
                weapon: weapon as u8,
            },
        );
        self.broadcast(
            NetMessage::Equip {
                actor: id.0,
                weapon: weapon as u8,
            },
            None,
        );
        Ok(true)
    }

    /// Runs as many whole ticks as `frame_dt` allows, then moves projectiles
    /// by the frame time. `capture` samples local input for a tick.
    ///
    /// Cue events expire only here, before the first tick of the frame, so
    /// every tick of one call stays drainable until the next call.
    pub fn update<F>(&mut self, frame_dt: f32, mut capture: F) -> u32
    where
        F: FnMut(u32, Vec2) -> InputFrame,
    {
        self.events.cleanup(self.tick);
        self.timestep.accumulate(frame_dt);
        let mut ticks = 0;
        while self.timestep.consume_tick() {
            self.step(&mut capture);
            ticks += 1;
        }
        self.advance_projectiles(frame_dt);
        ticks
    }

    /// Runs exactly one tick. Callers stepping by hand drain events themselves.
    pub fn step<F>(&mut self, capture: F)
    where
        F: FnMut(u32, Vec2) -> InputFrame,
    {
        self.tick += 1;
        match self.role {
            SiteRole::Server => self.step_authority(),
            SiteRole::Client { local } => self.step_owner(local, capture),
        }

        for actor in self.actors.values() {
            self.world.sync_actor(actor.id.object(), actor.movement.position);
        }
        self.world.refresh();
        self.stats.ticks += 1;
    }

    pub fn advance_projectiles(&mut self, frame_dt: f32) {
        let mut targets = ActorTargets(&mut self.actors);
        let report = self.registry.advance(frame_dt, &self.world, &mut targets);

        for despawn in &report.despawned {
            self.stats.projectiles_destroyed += 1;
            if let DespawnReason::Impact { object, point } = despawn.reason {
                self.events.push(
                    self.tick,
                    GameEvent::ProjectileImpact {
                        projectile: despawn.id.raw(),
                        object: object.0,
                        position: point.to_array(),
                    },
                );
            }
            if despawn.role == ProjectileRole::Authoritative {
                self.broadcast(
                    NetMessage::ProjectileDestroyed {
                        id: despawn.id.raw(),
                    },
                    None,
                );
            }
        }

        for hit in report.hits {
            self.stats.hits += 1;
            let Some(target) = ActorId::from_object(hit.object) else {
                continue;
            };
            self.events.push(
                self.tick,
                GameEvent::DamageDealt {
                    projectile: hit.projectile.raw(),
                    target: target.0,
                    damage: hit.damage,
                },
            );
            let remaining = match hit.outcome {
                HitOutcome::Ignored => continue,
                HitOutcome::Damaged { remaining } => remaining,
                HitOutcome::Killed => 0,
            };
            let Some(actor) = self.actors.get_mut(&target) else {
                continue;
            };
            actor.health_version += 1;
            let version = actor.health_version;
            self.broadcast(
                NetMessage::Damaged {
                    actor: target.0,
                    projectile: hit.projectile.raw(),
                    damage: hit.damage,
                    remaining,
                    version,
                },
                None,
            );
            if hit.outcome == HitOutcome::Killed {
                self.kill(target);
            }
        }
    }

    pub fn receive(&mut self, from: Peer, payload: &[u8]) -> Result<(), PacketError> {
        let packet = Packet::deserialize(payload)?;
        self.handle(from, packet);
        Ok(())
    }

    pub fn handle(&mut self, from: Peer, packet: Packet) {
        match (self.role, packet.message) {
            (SiteRole::Server, NetMessage::Input { actor, frames }) => {
                self.accept_input(from, ActorId(actor), &frames)
            }
            (SiteRole::Client { .. }, NetMessage::Reconcile(wire)) => self.accept_snapshot(&wire),
            (
                SiteRole::Client { local },
                NetMessage::ObserverFire {
                    actor,
                    weapon,
                    tick,
                    origin,
                    aim_angle,
                },
            ) => {
                if ActorId(actor) == local {
                    return;
                }
                self.spawn_burst(
                    ActorId(actor),
                    WeaponId::from(weapon),
                    tick,
                    Vec2::from_array(origin),
                    aim_angle,
                    ProjectileRole::Visual,
                );
            }
            (SiteRole::Client { .. }, NetMessage::ProjectileDestroyed { id }) => {
                if self.registry.destroy(ProjectileId::from_raw(id)) {
                    self.stats.projectiles_destroyed += 1;
                }
            }
            (SiteRole::Client { .. }, NetMessage::Equip { actor, weapon }) => {
                self.mirror_equip(ActorId(actor), WeaponId::from(weapon))
            }
            (
                SiteRole::Client { local },
                NetMessage::ActorJoined {
                    actor,
                    position,
                    health,
                },
            ) => {
                let id = ActorId(actor);
                self.departed.remove(&id);
                if !self.actors.contains_key(&id) {
                    let role = if id == local {
                        ActorRole::Owner
                    } else {
                        ActorRole::Observed
                    };
                    self.insert_actor(id, role, Vec2::from_array(position));
                    if let Some(actor) = self.actors.get_mut(&id) {
                        actor.health.current = health.min(actor.health.max);
                    }
                }
            }
            (
                SiteRole::Client { .. },
                NetMessage::Damaged {
                    actor,
                    projectile,
                    damage,
                    remaining,
                    version,
                },
            ) => self.mirror_damage(ActorId(actor), projectile, damage, remaining, version),
            (
                SiteRole::Client { .. },
                NetMessage::Respawned {
                    actor,
                    position,
                    health,
                    version,
                },
            ) => self.mirror_respawn(ActorId(actor), Vec2::from_array(position), health, version),
            (
                SiteRole::Client { .. },
                NetMessage::PickupSpawned {
                    pickup,
                    weapon,
                    position,
                    radius,
                },
            ) => {
                let pickup = WeaponPickup::new(
                    pickup,
                    WeaponId::from(weapon),
                    Vec2::from_array(position),
                    radius,
                );
                if self.pickups.insert(pickup) {
                    self.events.push(
                        self.tick,
                        GameEvent::PickupSpawned {
                            pickup: pickup.id.0,
                            weapon,
                            position,
                        },
                    );
                }
            }
            (SiteRole::Client { .. }, NetMessage::PickupTaken { pickup, actor }) => {
                if self.pickups.remove(PickupId(pickup)).is_some() {
                    self.events.push(self.tick, GameEvent::PickupTaken { pickup, actor });
                }
            }
            (SiteRole::Client { .. }, NetMessage::ActorLeft { actor }) => {
                self.drop_actor(ActorId(actor));
                self.departed.insert(ActorId(actor));
            }
            (role, message) => debug!("{role:?} site ignores {message:?} from {from:?}"),
        }
    }

    fn insert_actor(&mut self, id: ActorId, role: ActorRole, spawn_point: Vec2) {
        let actor = Actor::new(
            id,
            role,
            spawn_point,
            self.config.max_health,
            self.config.input_buffer_capacity,
            self.config.prediction_history,
        );
        self.world.insert_actor(
            id.object(),
            spawn_point,
            self.config.movement.half_extents,
            LAYER_ACTOR,
        );
        self.actors.insert(id, actor);
        self.events.push(self.tick, GameEvent::ActorJoined { actor: id.0 });
        info!("{:?} site: actor {} joined as {role:?}", self.role, id.0);
    }

    fn drop_actor(&mut self, id: ActorId) -> bool {
        if self.actors.remove(&id).is_none() {
            return false;
        }
        self.world.remove_actor(id.object());
        self.registry.forget_shooter(id.object());
        self.events.push(self.tick, GameEvent::ActorLeft { actor: id.0 });
        info!("{:?} site: actor {} left", self.role, id.0);
        true
    }

    fn step_authority(&mut self) {
        let dt = self.config.tick_dt();
        let mut outputs = Vec::new();

        for actor in self.actors.values_mut() {
            for frame in actor.unprocessed_frames() {
                let ctx = StepContext {
                    dt,
                    tick_rate: self.config.tick_rate,
                    body: actor.id.object(),
                    weapon: equipped_definition(&self.definitions, &actor.weapon),
                    replay: false,
                };
                let output = self.controller.step(
                    &mut actor.movement,
                    &mut actor.weapon,
                    &frame,
                    &ctx,
                    &self.world,
                );
                actor.last_tick = Some(frame.tick);
                let interact = frame.was_pressed(Buttons::INTERACT);
                outputs.push((actor.id, output, interact));
            }
        }

        // Actor id order settles contested pickups.
        for (id, output, interact) in outputs {
            self.apply_output(id, output);
            if interact {
                self.take_pickup(id);
            }
        }

        let interval = self.config.snapshot_interval_ticks.max(1);
        if self.tick % interval == 0 {
            let snapshots: Vec<ReconcileSnapshot> = self
                .actors
                .values()
                .filter_map(|actor| actor.snapshot(SnapshotSource::Server))
                .collect();
            for snapshot in snapshots {
                self.broadcast(NetMessage::Reconcile(WireSnapshot::from(&snapshot)), None);
            }
        }
    }

    fn step_owner<F>(&mut self, local: ActorId, mut capture: F)
    where
        F: FnMut(u32, Vec2) -> InputFrame,
    {
        let tick = self.tick;
        let Some(actor) = self.actors.get_mut(&local) else {
            return;
        };

        let frame = capture(tick, actor.movement.position).with_tick(tick);
        if !actor.inputs.push(frame) {
            return;
        }

        let ctx = StepContext {
            dt: self.config.tick_dt(),
            tick_rate: self.config.tick_rate,
            body: local.object(),
            weapon: equipped_definition(&self.definitions, &actor.weapon),
            replay: false,
        };
        let output = self.controller.step(
            &mut actor.movement,
            &mut actor.weapon,
            &frame,
            &ctx,
            &self.world,
        );
        actor.reconciler.record(tick, &actor.movement, &actor.weapon);

        let from = tick.saturating_sub(INPUT_REDUNDANCY as u32 - 1);
        let frames: Vec<WireInput> = actor.inputs.frames_since(from).map(WireInput::from).collect();
        self.send(
            Peer::Server,
            NetMessage::Input {
                actor: local.0,
                frames,
            },
        );

        self.apply_output(local, output);
    }

    fn apply_output(&mut self, id: ActorId, output: StepOutput) {
        if let Some(rejection) = output.rejection {
            self.stats.fire_rejections += 1;
            debug!("actor {} shot rejected at tick {}: {rejection}", id.0, self.tick);
        }
        if output.reload_started {
            self.events.push(self.tick, GameEvent::ReloadStarted { actor: id.0 });
        }
        if let Some(intent) = output.fire {
            self.dispatch_fire(id, intent);
        }
    }

    fn dispatch_fire(&mut self, id: ActorId, intent: FireIntent) {
        let Some(role) = self.actors.get(&id).map(|actor| actor.role) else {
            return;
        };
        let effects = role.fire_effects(intent.replay);

        if effects.cue {
            self.stats.shots += 1;
            self.events.push(
                self.tick,
                GameEvent::WeaponFired {
                    actor: id.0,
                    weapon: intent.weapon as u8,
                    tick: intent.tick,
                    origin: intent.origin.to_array(),
                },
            );
        }
        if let Some(projectile_role) = effects.spawn {
            self.spawn_burst(
                id,
                intent.weapon,
                intent.tick,
                intent.origin,
                intent.aim_angle,
                projectile_role,
            );
        }
        if effects.relay {
            self.broadcast(
                NetMessage::ObserverFire {
                    actor: id.0,
                    weapon: intent.weapon as u8,
                    tick: intent.tick,
                    origin: intent.origin.to_array(),
                    aim_angle: intent.aim_angle,
                },
                Some(id),
            );
        }
    }

    fn spawn_burst(
        &mut self,
        shooter: ActorId,
        weapon: WeaponId,
        fire_tick: u32,
        origin: Vec2,
        aim_angle: f32,
        role: ProjectileRole,
    ) -> usize {
        let Some(behavior) = WeaponBehavior::for_weapon(weapon) else {
            debug!("burst for unarmed actor {} dropped", shooter.0);
            return 0;
        };
        let definition = match self.definitions.weapon(weapon) {
            Ok(definition) => definition,
            Err(err) => {
                warn!("burst aborted: {err}");
                return 0;
            }
        };
        let projectile = match self.definitions.projectile(&definition.projectile) {
            Ok(projectile) => projectile,
            Err(err) => {
                warn!("burst aborted: {err}");
                return 0;
            }
        };

        let request = BurstRequest {
            owner: shooter.0,
            tick: fire_tick,
            origin,
            aim_angle,
        };
        let elapsed = self.tick.saturating_sub(fire_tick) as f32 * self.config.tick_dt();
        let damage = definition.damage_per_projectile();

        let mut spawned = 0;
        for pellet in behavior.spawn_burst(&request, definition, projectile) {
            let spawn = ProjectileSpawn {
                id: pellet.id,
                role,
                shooter: Some(shooter.object()),
                origin: pellet.origin,
                direction: pellet.direction,
                speed: pellet.speed,
                damage,
                elapsed,
            };
            match self.registry.spawn(spawn, projectile) {
                Ok(_) => spawned += 1,
                Err(err) => {
                    self.stats.projectiles_refused += 1;
                    debug!("pellet not spawned: {err}");
                }
            }
        }
        self.stats.projectiles_spawned += spawned as u64;
        spawned
    }

    fn accept_input(&mut self, from: Peer, id: ActorId, frames: &[WireInput]) {
        if from != Peer::Client(id) {
            debug!("input for actor {} arrived from {from:?}", id.0);
            return;
        }
        let Some(actor) = self.actors.get_mut(&id) else {
            return;
        };
        for wire in frames {
            let frame = InputFrame::from(wire);
            if actor.last_tick.is_some_and(|last| frame.tick <= last) {
                continue;
            }
            actor.inputs.push(frame);
        }
    }

    fn accept_snapshot(&mut self, wire: &WireSnapshot) {
        let snapshot = ReconcileSnapshot::from(wire);
        let id = ActorId(snapshot.actor);
        if self.departed.contains(&id) {
            return;
        }
        if !self.actors.contains_key(&id) {
            let role = match self.role {
                SiteRole::Client { local } if local == id => ActorRole::Owner,
                _ => ActorRole::Observed,
            };
            self.insert_actor(id, role, snapshot.body.position);
        }
        let Some(actor) = self.actors.get_mut(&id) else {
            return;
        };

        match actor.role {
            ActorRole::Owner => {
                let weapon = if snapshot.is_authoritative() {
                    snapshot.weapon
                } else {
                    actor.weapon
                };
                let ctx = StepContext {
                    dt: self.config.tick_dt(),
                    tick_rate: self.config.tick_rate,
                    body: id.object(),
                    weapon: equipped_definition(&self.definitions, &weapon),
                    replay: false,
                };
                let report = actor.reconciler.reconcile(
                    &snapshot,
                    true,
                    &mut actor.movement,
                    &mut actor.weapon,
                    &actor.inputs,
                    &self.controller,
                    &ctx,
                    &self.world,
                );
                if let Some(report) = report {
                    self.stats.reconciles += 1;
                    self.stats.replayed_frames += report.replayed as u64;
                    self.stats.suppressed_fires += report.suppressed_fires as u64;
                    if let Some(divergence) = report.divergence {
                        self.stats.max_divergence = self.stats.max_divergence.max(divergence);
                    }
                }
            }
            ActorRole::Observed => {
                if actor.last_tick.is_some_and(|last| snapshot.tick <= last) {
                    return;
                }
                snapshot.apply_to(&mut actor.movement, true);
                actor.weapon = snapshot.weapon;
                actor.last_tick = Some(snapshot.tick);
            }
            ActorRole::Authority => {}
        }
    }

    fn mirror_equip(&mut self, id: ActorId, weapon: WeaponId) {
        let definition = match weapon {
            WeaponId::None => None,
            weapon => match self.definitions.weapon(weapon) {
                Ok(definition) => Some(definition),
                Err(err) => {
                    warn!("equip mirror aborted: {err}");
                    return;
                }
            },
        };
        let Some(actor) = self.actors.get_mut(&id) else {
            debug!("equip for unknown actor {}", id.0);
            return;
        };
        actor.weapon.rebuild(definition);
        self.events.push(
            self.tick,
            GameEvent::WeaponEquipped {
                actor: id.0,
                weapon: weapon as u8,
            },
        );
    }

    fn mirror_damage(
        &mut self,
        id: ActorId,
        projectile: u64,
        damage: u32,
        remaining: u32,
        version: u32,
    ) {
        let Some(actor) = self.actors.get_mut(&id) else {
            debug!("damage for unknown actor {}", id.0);
            return;
        };
        actor.mirror_health(remaining, version);
        self.events.push(
            self.tick,
            GameEvent::DamageDealt {
                projectile,
                target: id.0,
                damage,
            },
        );
    }

    fn mirror_respawn(&mut self, id: ActorId, position: Vec2, health: u32, version: u32) {
        let Some(actor) = self.actors.get_mut(&id) else {
            debug!("respawn for unknown actor {}", id.0);
            return;
        };
        actor.mirror_health(health, version);
        // The owner's body follows reconciliation like any other correction.
        if actor.role == ActorRole::Observed {
            actor.movement = MovementState::at(position);
            self.world.sync_actor(id.object(), position);
        }
        self.stats.deaths += 1;
        self.push_death(id, position);
    }

    fn kill(&mut self, id: ActorId) {
        let Some(actor) = self.actors.get_mut(&id) else {
            return;
        };
        actor.respawn();
        actor.health_version += 1;
        let version = actor.health_version;
        let health = actor.health.current;
        let position = actor.movement.position;
        self.world.sync_actor(id.object(), position);
        self.stats.deaths += 1;
        self.push_death(id, position);
        self.broadcast(
            NetMessage::Respawned {
                actor: id.0,
                position: position.to_array(),
                health,
                version,
            },
            None,
        );
        info!("actor {} died at tick {}", id.0, self.tick);
    }

    fn push_death(&mut self, id: ActorId, position: Vec2) {
        self.events.push(self.tick, GameEvent::PlayerDeath { actor: id.0 });
        self.events.push(
            self.tick,
            GameEvent::PlayerRespawn {
                actor: id.0,
                position: position.to_array(),
            },
        );
    }

    fn take_pickup(&mut self, id: ActorId) -> bool {
        let Some(position) = self.actors.get(&id).map(|actor| actor.movement.position) else {
            return false;
        };
        let Some(pickup) = self.pickups.nearest(position).copied() else {
            return false;
        };
        match self.equip(id, pickup.weapon) {
            Ok(true) => {}
            Ok(false) => return false,
            Err(err) => {
                warn!("pickup {} left in place: {err}", pickup.id.0);
                return false;
            }
        }
        self.pickups.remove(pickup.id);
        self.stats.pickups_taken += 1;
        self.events.push(
            self.tick,
            GameEvent::PickupTaken {
                pickup: pickup.id.0,
                actor: id.0,
            },
        );
        self.broadcast(
            NetMessage::PickupTaken {
                pickup: pickup.id.0,
                actor: id.0,
            },
            None,
        );
        info!("actor {} took pickup {} at tick {}", id.0, pickup.id.0, self.tick);
        true
    }

    fn send(&mut self, to: Peer, message: NetMessage) {
        let reliable = message.is_reliable();
        match Packet::new(self.tick, message).serialize() {
            Ok(payload) => self.outbox.push(Outgoing {
                to,
                reliable,
                payload,
            }),
            Err(err) => warn!("dropping outbound message for {to:?}: {err}"),
        }
    }

    /// Server only: sends `message` to every connected client but `except`.
    fn broadcast(&mut self, message: NetMessage, except: Option<ActorId>) {
        if !self.is_server() {
            return;
        }
        let peers: Vec<ActorId> = self
            .actors
            .keys()
            .copied()
            .filter(|id| Some(*id) != except)
            .collect();
        for id in peers {
            self.send(Peer::Client(id), message.clone());
        }
    }
}

fn pickup_spawned(pickup: &WeaponPickup) -> NetMessage {
    NetMessage::PickupSpawned {
        pickup: pickup.id.0,
        weapon: pickup.weapon as u8,
        position: pickup.position.to_array(),
        radius: pickup.radius,
    }
}
