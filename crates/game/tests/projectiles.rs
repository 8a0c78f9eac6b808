use glam::Vec2;

use skirmish::net::WireInput;
use skirmish::physics::FlatArena;
use skirmish::{
    ActorId, Buttons, ConfigError, Definitions, GameEvent, InputFrame, NetMessage, Packet, Peer,
    ProjectileDef, ProjectileId, Site, SiteConfig, WeaponDefinition, WeaponId,
};

const SHOOTER: ActorId = ActorId(1);
const TARGET: ActorId = ActorId(2);

fn server(max_health: u32) -> Site<FlatArena> {
    let config = SiteConfig {
        max_health,
        ..SiteConfig::default()
    };
    let mut server = Site::server(config, Definitions::builtin(), FlatArena::new(0.0));
    server.add_actor(SHOOTER, Vec2::new(0.0, 0.9));
    server.add_actor(TARGET, Vec2::new(3.0, 0.9));
    server.equip(SHOOTER, WeaponId::Shotgun).unwrap();
    server
}

fn send_input(server: &mut Site<FlatArena>, frame: InputFrame) {
    let packet = Packet::new(
        frame.tick,
        NetMessage::Input {
            actor: SHOOTER.0,
            frames: vec![WireInput::from(&frame)],
        },
    );
    server.handle(Peer::Client(SHOOTER), packet);
}

fn run_server(server: &mut Site<FlatArena>, ticks: u32, fire_on: &[u32]) {
    for _ in 0..ticks {
        let tick = server.tick() + 1;
        let mut frame = InputFrame::new(tick);
        if fire_on.contains(&tick) {
            frame.pressed = Buttons::ATTACK1;
        }
        send_input(server, frame);
        server.step(|tick, _| InputFrame::new(tick));
        server.advance_projectiles(server.config().tick_dt());
    }
}

#[test]
fn authoritative_pellets_damage_and_kill() {
    let mut server = server(20);
    run_server(&mut server, 30, &[1]);

    let target = server.actor(TARGET).unwrap();
    let per_pellet = WeaponDefinition::shotgun().damage_per_projectile();
    assert_eq!(target.health.current, 20 - 6 * per_pellet);
    assert!(server.stats().hits >= 1);

    run_server(&mut server, 30, &[51]);
    let events: Vec<GameEvent> = server.drain_events().into_iter().map(|e| e.event).collect();
    assert!(events.contains(&GameEvent::PlayerDeath { actor: TARGET.0 }));
    assert!(events
        .iter()
        .any(|e| matches!(e, GameEvent::PlayerRespawn { actor, .. } if *actor == TARGET.0)));
    assert_eq!(server.stats().deaths, 1);

    // pellets still in flight may strike the respawned target
    let respawned = server.actor(TARGET).unwrap();
    assert!(respawned.health.current > 20 - 6 * per_pellet);
    assert_eq!(respawned.movement.position, Vec2::new(3.0, 0.9));
}

fn relay(server: &mut Site<FlatArena>, client: &mut Site<FlatArena>, to: ActorId) {
    for out in server.drain_outbox() {
        if out.to == Peer::Client(to) {
            client.receive(Peer::Server, &out.payload).unwrap();
        }
    }
}

#[test]
fn clients_mirror_authoritative_health() {
    let mut server = server(20);
    let config = SiteConfig {
        max_health: 20,
        ..SiteConfig::default()
    };
    let mut client = Site::client(TARGET, config, Definitions::builtin(), FlatArena::new(0.0));
    relay(&mut server, &mut client, TARGET);
    assert_eq!(client.local_actor().unwrap().health.current, 20);
    client.drain_events();

    run_server(&mut server, 30, &[1]);
    relay(&mut server, &mut client, TARGET);

    let per_pellet = WeaponDefinition::shotgun().damage_per_projectile();
    let mirrored = client.local_actor().unwrap();
    assert_eq!(mirrored.health.current, 20 - 6 * per_pellet);
    assert_eq!(mirrored.health_version, server.actor(TARGET).unwrap().health_version);
    let damage_events = client
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e.event, GameEvent::DamageDealt { target, .. } if target == TARGET.0))
        .count() as u64;
    assert_eq!(damage_events, server.stats().hits);

    run_server(&mut server, 30, &[51]);
    relay(&mut server, &mut client, TARGET);

    let events: Vec<GameEvent> = client.drain_events().into_iter().map(|e| e.event).collect();
    assert!(events.contains(&GameEvent::PlayerDeath { actor: TARGET.0 }));
    assert_eq!(client.stats().deaths, 1);
    assert_eq!(
        client.local_actor().unwrap().health,
        server.actor(TARGET).unwrap().health
    );
}

#[test]
fn server_relays_fire_and_destroys_to_clients() {
    let mut server = server(100);
    server.drain_outbox();
    run_server(&mut server, 30, &[1]);

    let messages: Vec<(Peer, NetMessage)> = server
        .drain_outbox()
        .into_iter()
        .map(|out| (out.to, Packet::deserialize(&out.payload).unwrap().message))
        .collect();

    let relays: Vec<Peer> = messages
        .iter()
        .filter(|(_, m)| matches!(m, NetMessage::ObserverFire { .. }))
        .map(|(peer, _)| *peer)
        .collect();
    assert_eq!(relays, vec![Peer::Client(TARGET)]);

    let destroyed = messages
        .iter()
        .filter(|(peer, m)| {
            *peer == Peer::Client(SHOOTER) && matches!(m, NetMessage::ProjectileDestroyed { .. })
        })
        .count();
    assert_eq!(destroyed, WeaponDefinition::shotgun().pellet_count as usize);
    assert!(server.registry().is_empty());
}

#[test]
fn destroy_that_overtakes_its_spawn_leaves_no_ghost() {
    let mut client = Site::client(
        ActorId(9),
        SiteConfig::default(),
        Definitions::builtin(),
        FlatArena::new(0.0),
    );
    for _ in 0..10 {
        client.step(|tick, _| InputFrame::new(tick));
    }
    client.handle(
        Peer::Server,
        Packet::new(
            3,
            NetMessage::ActorJoined {
                actor: SHOOTER.0,
                position: [0.0, 0.9],
                health: 100,
            },
        ),
    );

    let raced = ProjectileId::pack(SHOOTER.0, 8, 2);
    client.handle(
        Peer::Server,
        Packet::new(9, NetMessage::ProjectileDestroyed { id: raced.raw() }),
    );
    client.handle(
        Peer::Server,
        Packet::new(
            8,
            NetMessage::ObserverFire {
                actor: SHOOTER.0,
                weapon: WeaponId::Shotgun as u8,
                tick: 8,
                origin: [0.6, 0.9],
                aim_angle: 0.0,
            },
        ),
    );

    let pellets = WeaponDefinition::shotgun().pellet_count as usize;
    assert_eq!(client.registry().len(), pellets - 1);
    assert!(!client.registry().contains(raced));
    assert_eq!(client.stats().projectiles_refused, 1);

    client.handle(
        Peer::Server,
        Packet::new(10, NetMessage::ProjectileDestroyed { id: raced.raw() }),
    );
    assert_eq!(client.registry().len(), pellets - 1);
}

#[test]
fn leaving_shooter_does_not_disturb_its_projectiles() {
    let mut server = server(100);
    run_server(&mut server, 2, &[1]);
    let in_flight = server.registry().len();
    assert!(in_flight > 0);

    assert!(server.remove_actor(SHOOTER));
    assert!(!server.remove_actor(SHOOTER));
    assert_eq!(server.registry().len(), in_flight);
    assert!(server.registry().iter().all(|p| p.shooter.is_none()));

    for _ in 0..30 {
        server.step(|tick, _| InputFrame::new(tick));
        server.advance_projectiles(server.config().tick_dt());
    }
    assert!(server.registry().is_empty());
}

#[test]
fn equip_reports_missing_definitions() {
    let definitions = Definitions::from_parts(
        vec![WeaponDefinition::shotgun()],
        vec![ProjectileDef::pellet()],
    )
    .unwrap();
    let mut server = Site::server(SiteConfig::default(), definitions, FlatArena::new(0.0));
    server.add_actor(SHOOTER, Vec2::ZERO);

    assert!(matches!(
        server.equip(SHOOTER, WeaponId::Pistol),
        Err(ConfigError::UnknownWeapon(WeaponId::Pistol))
    ));
    assert!(server.equip(SHOOTER, WeaponId::Shotgun).unwrap());
    assert_eq!(server.actor(SHOOTER).unwrap().weapon.ammo, 8);
    assert!(!server.equip(ActorId(40), WeaponId::Shotgun).unwrap());

    server.equip(SHOOTER, WeaponId::None).unwrap();
    assert!(!server.actor(SHOOTER).unwrap().weapon.has_weapon());
}
