use glam::Vec2;

use skirmish::net::WireInput;
use skirmish::physics::FlatArena;
use skirmish::{
    ActorId, Buttons, ConfigError, Definitions, GameEvent, InputFrame, NetMessage, Packet, Peer,
    PickupId, Site, SiteConfig, WeaponId, WeaponPickup,
};

const FIRST: ActorId = ActorId(1);
const SECOND: ActorId = ActorId(2);
const FAR: ActorId = ActorId(3);

fn pistol() -> WeaponPickup {
    WeaponPickup::new(7, WeaponId::Pistol, Vec2::new(0.5, 0.9), 1.0)
}

fn arena() -> Site<FlatArena> {
    let definitions = Definitions::builtin();
    let mut server = Site::server(SiteConfig::default(), definitions, FlatArena::new(0.0));
    server.add_actor(FIRST, Vec2::new(0.0, 0.9));
    server.add_actor(SECOND, Vec2::new(1.0, 0.9));
    server.add_actor(FAR, Vec2::new(10.0, 0.9));
    assert!(server.add_pickup(pistol()).unwrap());
    server.drain_outbox();
    server.drain_events();
    server
}

fn press(server: &mut Site<FlatArena>, actor: ActorId, tick: u32, buttons: Buttons) {
    let mut frame = InputFrame::new(tick);
    frame.pressed = buttons;
    let packet = Packet::new(
        tick,
        NetMessage::Input {
            actor: actor.0,
            frames: vec![WireInput::from(&frame)],
        },
    );
    server.handle(Peer::Client(actor), packet);
}

fn holders(server: &Site<FlatArena>) -> Vec<ActorId> {
    server
        .actors()
        .filter(|actor| actor.weapon.equipped == WeaponId::Pistol)
        .map(|actor| actor.id)
        .collect()
}

#[test]
fn contested_pickup_goes_to_exactly_one_actor() {
    let mut server = arena();
    press(&mut server, SECOND, 1, Buttons::INTERACT);
    press(&mut server, FIRST, 1, Buttons::INTERACT);
    server.step(|tick, _| InputFrame::new(tick));

    assert_eq!(holders(&server), vec![FIRST]);
    assert!(server.pickups().is_empty());
    assert_eq!(server.stats().pickups_taken, 1);

    let taken: Vec<(Peer, NetMessage)> = server
        .drain_outbox()
        .into_iter()
        .filter(|out| out.reliable)
        .map(|out| (out.to, Packet::deserialize(&out.payload).unwrap().message))
        .filter(|(_, message)| matches!(message, NetMessage::PickupTaken { .. }))
        .collect();
    assert_eq!(taken.len(), 3);
    assert!(taken.iter().all(|(_, message)| {
        *message
            == NetMessage::PickupTaken {
                pickup: 7,
                actor: FIRST.0,
            }
    }));

    let events: Vec<GameEvent> = server.drain_events().into_iter().map(|e| e.event).collect();
    let taken_events = events
        .iter()
        .filter(|e| matches!(e, GameEvent::PickupTaken { .. }))
        .count();
    assert_eq!(taken_events, 1);
    assert!(events.contains(&GameEvent::WeaponEquipped {
        actor: FIRST.0,
        weapon: WeaponId::Pistol as u8,
    }));

    press(&mut server, SECOND, 2, Buttons::INTERACT);
    server.step(|tick, _| InputFrame::new(tick));
    assert_eq!(holders(&server), vec![FIRST]);
    assert_eq!(server.stats().pickups_taken, 1);
}

#[test]
fn pickup_needs_reach_and_an_interact_press() {
    let mut server = arena();
    press(&mut server, FAR, 1, Buttons::INTERACT);
    press(&mut server, FIRST, 1, Buttons::JUMP | Buttons::ATTACK1);
    server.step(|tick, _| InputFrame::new(tick));

    assert!(holders(&server).is_empty());
    assert_eq!(server.pickups().len(), 1);
    assert!(server.pickups().get(PickupId(7)).is_some());
}

#[test]
fn clients_learn_pickups_on_join_and_see_them_taken() {
    let mut server = arena();
    let late = ActorId(4);
    let mut client = Site::client(
        late,
        SiteConfig::default(),
        Definitions::builtin(),
        FlatArena::new(0.0),
    );
    assert!(server.add_actor(late, Vec2::new(-4.0, 0.9)));
    for out in server.drain_outbox() {
        if out.to == Peer::Client(late) {
            client.receive(Peer::Server, &out.payload).unwrap();
        }
    }
    assert_eq!(client.pickups().get(PickupId(7)), Some(&pistol()));
    assert!(!client.add_pickup(pistol()).unwrap());

    press(&mut server, FIRST, 1, Buttons::INTERACT);
    server.step(|tick, _| InputFrame::new(tick));
    for out in server.drain_outbox() {
        if out.to == Peer::Client(late) {
            client.receive(Peer::Server, &out.payload).unwrap();
        }
    }

    assert!(client.pickups().is_empty());
    let events: Vec<GameEvent> = client.drain_events().into_iter().map(|e| e.event).collect();
    assert!(events.contains(&GameEvent::PickupTaken {
        pickup: 7,
        actor: FIRST.0,
    }));
    let first = client.actor(FIRST).unwrap();
    assert_eq!(first.weapon.equipped, WeaponId::Pistol);
}

#[test]
fn pickups_need_a_known_weapon_and_a_free_id() {
    let mut server = arena();
    let unarmed = WeaponPickup::new(8, WeaponId::None, Vec2::ZERO, 1.0);
    assert!(matches!(
        server.add_pickup(unarmed),
        Err(ConfigError::UnknownWeapon(WeaponId::None))
    ));

    let duplicate = WeaponPickup::new(7, WeaponId::Shotgun, Vec2::new(5.0, 0.9), 1.0);
    assert!(!server.add_pickup(duplicate).unwrap());
    assert_eq!(server.pickups().get(PickupId(7)).map(|p| p.weapon), Some(WeaponId::Pistol));
}
