mod bot;
mod session;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use glam::Vec2;

use skirmish::physics::LAYER_STATIC;
use skirmish::simulation::STATIC_OBJECT_BASE;
use skirmish::{Definitions, FlatArena, LinkConfig, ObjectId, PhysicsWorld, SiteConfig, WeaponId};

use session::{Session, SessionConfig};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum WorldKind {
    /// Analytic floor with hit-only cover boxes.
    Flat,
    /// Rapier colliders for floor and cover.
    Rapier,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Loadout {
    Shotgun,
    Pistol,
    Unarmed,
}

impl From<Loadout> for WeaponId {
    fn from(loadout: Loadout) -> Self {
        match loadout {
            Loadout::Shotgun => WeaponId::Shotgun,
            Loadout::Pistol => WeaponId::Pistol,
            Loadout::Unarmed => WeaponId::None,
        }
    }
}

#[derive(Parser)]
#[command(name = "skirmish-headless")]
#[command(about = "Runs a server and scripted clients over a simulated link")]
struct Args {
    #[arg(short, long, default_value_t = 2)]
    clients: u16,

    #[arg(long, default_value_t = 1500)]
    ticks: u32,

    #[arg(short, long, default_value_t = 50)]
    tick_rate: u32,

    #[arg(long, default_value_t = 60, help = "Render frames per second driving the sites")]
    frame_rate: u32,

    #[arg(long, default_value_t = 3, help = "One-way latency in ticks")]
    latency_ticks: u32,

    #[arg(long, default_value_t = 2, help = "Extra random delay in ticks")]
    jitter_ticks: u32,

    #[arg(long, default_value_t = 0.0, help = "Unreliable packet loss percentage (0-100)")]
    loss_percent: f32,

    #[arg(long, default_value_t = 1)]
    seed: u64,

    #[arg(long, value_enum, default_value_t = WorldKind::Flat)]
    world: WorldKind,

    #[arg(long, value_enum, default_value_t = Loadout::Shotgun)]
    weapon: Loadout,

    #[arg(long, help = "JSON weapon and projectile definitions")]
    definitions: Option<std::path::PathBuf>,
}

const COVER: [(Vec2, Vec2); 2] = [
    (Vec2::new(-6.0, 1.0), Vec2::new(0.5, 1.0)),
    (Vec2::new(6.0, 1.0), Vec2::new(0.5, 1.0)),
];

fn flat_arena() -> FlatArena {
    let mut arena = FlatArena::new(0.0);
    for (index, (center, half_extents)) in COVER.into_iter().enumerate() {
        let object = ObjectId(STATIC_OBJECT_BASE + index as u32);
        arena.add_box(object, LAYER_STATIC, center, half_extents);
    }
    arena
}

fn rapier_arena(tick_rate: u32) -> PhysicsWorld {
    let mut world = PhysicsWorld::new(tick_rate);
    world.add_static_box(
        ObjectId(STATIC_OBJECT_BASE),
        Vec2::new(0.0, -0.5),
        Vec2::new(200.0, 0.5),
        LAYER_STATIC,
    );
    for (index, (center, half_extents)) in COVER.into_iter().enumerate() {
        let object = ObjectId(STATIC_OBJECT_BASE + 1 + index as u32);
        world.add_static_box(object, center, half_extents, LAYER_STATIC);
    }
    world
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let definitions = match &args.definitions {
        Some(path) => Definitions::from_path(path)
            .with_context(|| format!("loading definitions from {}", path.display()))?,
        None => Definitions::builtin(),
    };

    let config = SessionConfig {
        clients: args.clients,
        site: SiteConfig {
            tick_rate: args.tick_rate,
            ..SiteConfig::default()
        },
        link: LinkConfig {
            latency_ticks: args.latency_ticks,
            jitter_ticks: args.jitter_ticks,
            loss_percent: args.loss_percent.clamp(0.0, 100.0),
        },
        seed: args.seed,
        weapon: args.weapon.into(),
    };

    log::info!(
        "{} clients, {} ticks at {} Hz, {:?} world, link {:?}",
        args.clients,
        args.ticks,
        args.tick_rate,
        args.world,
        config.link
    );

    let report = match args.world {
        WorldKind::Flat => {
            let mut session = Session::new(config, &definitions, args.frame_rate, flat_arena)?;
            session.run(args.ticks)?;
            session.report()
        }
        WorldKind::Rapier => {
            let tick_rate = args.tick_rate;
            let mut session = Session::new(config, &definitions, args.frame_rate, || {
                rapier_arena(tick_rate)
            })?;
            session.run(args.ticks)?;
            session.report()
        }
    };

    report.log();
    Ok(())
}
