use anyhow::{Context, Result};
use glam::Vec2;
use log::{debug, info};

use skirmish::{
    ActorBodies, ActorId, CollisionProvider, Definitions, InputFrame, LinkConfig, LinkSimulator,
    LinkStats, Peer, Site, SiteConfig, SiteStats, WeaponId, WeaponPickup,
};

use crate::bot::Bot;

#[derive(Debug, Clone, Copy)]
struct Route {
    from: Peer,
    to: Peer,
}

pub struct SessionConfig {
    pub clients: u16,
    pub site: SiteConfig,
    pub link: LinkConfig,
    pub seed: u64,
    pub weapon: WeaponId,
}

pub struct Report {
    pub server: SiteStats,
    pub clients: Vec<(ActorId, SiteStats)>,
    pub link: LinkStats,
    pub in_flight: usize,
    pub pickups_left: usize,
    pub worst_drift: f32,
}

/// A server and its clients stepped in lockstep inside one process, with
/// every datagram routed through a simulated link.
pub struct Session<W> {
    server: Site<W>,
    clients: Vec<Site<W>>,
    bots: Vec<Bot>,
    link: LinkSimulator<Route>,
    frame_dt: f32,
}

pub fn spawn_point(index: u16) -> Vec2 {
    Vec2::new(index as f32 * 6.0 - 9.0, 0.9)
}

const PICKUP_RADIUS: f32 = 1.0;

fn pickup_point(index: usize) -> Vec2 {
    Vec2::new(index as f32 * 6.0 - 3.0, 0.9)
}

impl<W: CollisionProvider + ActorBodies> Session<W> {
    pub fn new(
        config: SessionConfig,
        definitions: &Definitions,
        frame_rate: u32,
        mut make_world: impl FnMut() -> W,
    ) -> Result<Self> {
        let mut server = Site::server(config.site.clone(), definitions.clone(), make_world());
        let mut clients = Vec::new();
        let mut bots = Vec::new();

        for index in 0..config.clients {
            let id = ActorId(index);
            server.add_actor(id, spawn_point(index));
            server
                .equip(id, config.weapon)
                .with_context(|| format!("equipping actor {index}"))?;
            clients.push(Site::client(
                id,
                config.site.clone(),
                definitions.clone(),
                make_world(),
            ));
            bots.push(Bot::new(config.seed.wrapping_add(index as u64 + 1)));
        }

        let mut weapons: Vec<WeaponId> = definitions.weapon_ids().collect();
        weapons.sort_by_key(|weapon| *weapon as u8);
        for (index, weapon) in weapons.into_iter().enumerate() {
            let point = pickup_point(index);
            let pickup = WeaponPickup::new(index as u16, weapon, point, PICKUP_RADIUS);
            server
                .add_pickup(pickup)
                .with_context(|| format!("placing {weapon:?} pickup"))?;
        }

        Ok(Self {
            server,
            clients,
            bots,
            link: LinkSimulator::new(config.link, config.seed),
            frame_dt: 1.0 / frame_rate.max(1) as f32,
        })
    }

    pub fn run(&mut self, ticks: u32) -> Result<()> {
        while self.server.tick() < ticks {
            self.frame()?;
        }
        Ok(())
    }

    fn frame(&mut self) -> Result<()> {
        let frame_dt = self.frame_dt;
        self.server.update(frame_dt, |tick, _| InputFrame::new(tick));

        let targets: Vec<Vec2> = self
            .server
            .actors()
            .map(|actor| actor.movement.position)
            .collect();

        for (index, client) in self.clients.iter_mut().enumerate() {
            let bot = &mut self.bots[index];
            if !targets.is_empty() {
                bot.aim_at(targets[(index + 1) % targets.len()]);
            }
            client.update(frame_dt, |tick, position| {
                bot.think(tick);
                bot.collector().capture(tick, position)
            });
        }

        self.route()
    }

    fn route(&mut self) -> Result<()> {
        let now = self.server.tick();
        for out in self.server.drain_outbox() {
            let route = Route {
                from: Peer::Server,
                to: out.to,
            };
            self.link.send(now, route, out.payload, out.reliable);
        }
        for client in &mut self.clients {
            let Some(local) = client.local_actor().map(|actor| actor.id) else {
                continue;
            };
            for out in client.drain_outbox() {
                let route = Route {
                    from: Peer::Client(local),
                    to: out.to,
                };
                self.link.send(now, route, out.payload, out.reliable);
            }
        }

        for (route, payload) in self.link.deliver(now) {
            let site = match route.to {
                Peer::Server => &mut self.server,
                Peer::Client(id) => match self.clients.get_mut(id.0 as usize) {
                    Some(client) => client,
                    None => continue,
                },
            };
            site.receive(route.from, &payload)
                .with_context(|| format!("decoding datagram {:?} -> {:?}", route.from, route.to))?;
        }

        for event in self.server.drain_events() {
            debug!("tick {}: {:?}", event.tick, event.event);
        }
        for client in &mut self.clients {
            client.drain_events();
        }
        Ok(())
    }

    pub fn report(&self) -> Report {
        let worst_drift = self
            .clients
            .iter()
            .filter_map(|client| {
                let local = client.local_actor()?;
                let authority = self.server.actor(local.id)?;
                Some(local.movement.position.distance(authority.movement.position))
            })
            .fold(0.0, f32::max);

        Report {
            server: self.server.stats(),
            clients: self
                .clients
                .iter()
                .filter_map(|client| Some((client.local_actor()?.id, client.stats())))
                .collect(),
            link: self.link.stats(),
            in_flight: self.link.in_flight(),
            pickups_left: self.server.pickups().len(),
            worst_drift,
        }
    }
}

impl Report {
    pub fn log(&self) {
        let s = &self.server;
        info!(
            "server: {} ticks, {} shots, {} rejected, {} projectiles, {} hits, {} deaths",
            s.ticks, s.shots, s.fire_rejections, s.projectiles_spawned, s.hits, s.deaths
        );
        info!("pickups: {} taken, {} left", s.pickups_taken, self.pickups_left);
        for (id, c) in &self.clients {
            info!(
                "client {}: {} shots, {} reconciles, {} replayed, {} suppressed, \
                 max divergence {:.4}, {} refused",
                id.0,
                c.shots,
                c.reconciles,
                c.replayed_frames,
                c.suppressed_fires,
                c.max_divergence,
                c.projectiles_refused
            );
        }
        info!(
            "link: {} sent, {} dropped, {} delivered, {} still in flight",
            self.link.sent, self.link.dropped, self.link.delivered, self.in_flight
        );
        info!("worst owner drift at exit: {:.4}", self.worst_drift);
    }
}
