//! Reproducible pellet bursts. Every peer that recomputes the burst for the
//! same owner and fire tick gets bit-identical pellets, because the generator
//! is seeded from those two values and owned by the burst alone.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::projectile::ProjectileId;

use super::SpreadPattern;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurstRequest {
    pub owner: u16,
    pub tick: u32,
    pub origin: Vec2,
    pub aim_angle: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurstShape {
    pub pellet_count: u16,
    pub spread_degrees: f32,
    pub pattern: SpreadPattern,
    pub base_speed: f32,
    pub speed_variance: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PelletSpec {
    pub id: ProjectileId,
    pub origin: Vec2,
    pub direction: Vec2,
    pub speed: f32,
}

pub fn burst_seed(owner: u16, tick: u32) -> u64 {
    ProjectileId::pack(owner, tick, 0).raw()
}

/// Angular offsets (radians) of a fan spanning the full spread, centred on the aim.
pub fn fan_table(pellet_count: u16, spread_degrees: f32) -> Vec<f32> {
    let count = pellet_count.max(1) as usize;
    if count == 1 {
        return vec![0.0];
    }

    let spread = spread_degrees.to_radians();
    let step = spread / (count - 1) as f32;
    (0..count).map(|i| -spread * 0.5 + step * i as f32).collect()
}

pub fn compute_burst(request: &BurstRequest, shape: &BurstShape) -> Vec<PelletSpec> {
    let mut rng = ChaCha8Rng::seed_from_u64(burst_seed(request.owner, request.tick));
    let count = shape.pellet_count.max(1);
    let half_spread = shape.spread_degrees.to_radians() * 0.5;
    let table = match shape.pattern {
        SpreadPattern::Fixed => Some(fan_table(count, shape.spread_degrees)),
        SpreadPattern::Random => None,
    };

    (0..count)
        .map(|pellet| {
            let offset = match &table {
                Some(table) => table[pellet as usize],
                None if half_spread > 0.0 => rng.gen_range(-half_spread..=half_spread),
                None => 0.0,
            };
            let perturbation = if shape.speed_variance > 0.0 {
                rng.gen_range(-shape.speed_variance..=shape.speed_variance)
            } else {
                0.0
            };

            let (sin, cos) = (request.aim_angle + offset).sin_cos();
            PelletSpec {
                id: ProjectileId::pack(request.owner, request.tick, pellet),
                origin: request.origin,
                direction: Vec2::new(cos, sin),
                speed: (shape.base_speed + perturbation).max(0.0),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shotgun_shape() -> BurstShape {
        BurstShape {
            pellet_count: 8,
            spread_degrees: 30.0,
            pattern: SpreadPattern::Random,
            base_speed: 24.0,
            speed_variance: 3.0,
        }
    }

    fn request(tick: u32) -> BurstRequest {
        BurstRequest {
            owner: 7,
            tick,
            origin: Vec2::new(1.0, 2.0),
            aim_angle: 0.3,
        }
    }

    #[test]
    fn same_tick_same_burst() {
        let a = compute_burst(&request(420), &shotgun_shape());
        let b = compute_burst(&request(420), &shotgun_shape());
        assert_eq!(a, b);
    }

    #[test]
    fn different_ticks_differ() {
        let a = compute_burst(&request(420), &shotgun_shape());
        let b = compute_burst(&request(421), &shotgun_shape());
        assert_ne!(a, b);
    }

    #[test]
    fn pellets_stay_inside_cone_and_variance() {
        let shape = shotgun_shape();
        let half = shape.spread_degrees.to_radians() * 0.5 + 1e-5;

        for tick in 0..64 {
            for pellet in compute_burst(&request(tick), &shape) {
                let offset = pellet.direction.y.atan2(pellet.direction.x) - 0.3;
                assert!(offset.abs() <= half, "offset {offset} outside cone");
                assert!((pellet.speed - shape.base_speed).abs() <= shape.speed_variance + 1e-4);
            }
        }
    }

    #[test]
    fn ids_follow_pellet_index() {
        let pellets = compute_burst(&request(99), &shotgun_shape());
        assert_eq!(pellets.len(), 8);
        for (index, pellet) in pellets.iter().enumerate() {
            assert_eq!(pellet.id, ProjectileId::pack(7, 99, index as u16));
        }
    }

    #[test]
    fn fixed_pattern_fans_evenly() {
        let table = fan_table(3, 20.0);
        assert_eq!(table.len(), 3);
        assert!((table[0] + 10f32.to_radians()).abs() < 1e-6);
        assert!(table[1].abs() < 1e-6);
        assert!((table[2] - 10f32.to_radians()).abs() < 1e-6);
        assert_eq!(fan_table(1, 45.0), vec![0.0]);
    }
}
