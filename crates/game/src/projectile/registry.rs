use std::collections::{BTreeMap, HashSet, VecDeque};

use glam::Vec2;
use log::{debug, trace};

use crate::error::SpawnError;
use crate::physics::{CollisionProvider, ObjectId};

use super::{
    HitOutcome, HitTargets, Projectile, ProjectileDef, ProjectileId, ProjectileRole,
    ProjectileSpawn,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DespawnReason {
    Expired,
    Impact { object: ObjectId, point: Vec2 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Despawn {
    pub id: ProjectileId,
    pub role: ProjectileRole,
    pub reason: DespawnReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitReport {
    pub projectile: ProjectileId,
    pub object: ObjectId,
    pub damage: u32,
    pub outcome: HitOutcome,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdvanceReport {
    pub despawned: Vec<Despawn>,
    pub hits: Vec<HitReport>,
}

/// Live projectiles of one execution site, keyed by id. Owned by the site's
/// tick loop and iterated in id order so every run is reproducible.
#[derive(Debug)]
pub struct ProjectileRegistry {
    tick_dt: f32,
    projectiles: BTreeMap<ProjectileId, Projectile>,
    tombstones: VecDeque<ProjectileId>,
    tombstone_set: HashSet<ProjectileId>,
    tombstone_capacity: usize,
}

impl ProjectileRegistry {
    pub fn new(tick_dt: f32, tombstone_capacity: usize) -> Self {
        Self {
            tick_dt,
            projectiles: BTreeMap::new(),
            tombstones: VecDeque::with_capacity(tombstone_capacity),
            tombstone_set: HashSet::with_capacity(tombstone_capacity),
            tombstone_capacity,
        }
    }

    pub fn spawn(
        &mut self,
        spawn: ProjectileSpawn,
        definition: &ProjectileDef,
    ) -> Result<ProjectileId, SpawnError> {
        let id = spawn.id;
        if self.tombstone_set.contains(&id) {
            return Err(SpawnError::Tombstoned(id));
        }
        if self.projectiles.contains_key(&id) {
            return Err(SpawnError::DuplicateId(id));
        }

        let projectile = Projectile::new(spawn, definition);
        trace!(
            "spawned {:?} projectile {} with {:.3}s catch-up",
            projectile.role, id, projectile.catchup_left
        );
        self.projectiles.insert(id, projectile);
        Ok(id)
    }

    /// Removes `id` and remembers it. Destroying an unknown or already
    /// destroyed id is a no-op that returns `false`.
    pub fn destroy(&mut self, id: ProjectileId) -> bool {
        self.remember(id);
        match self.projectiles.remove(&id) {
            Some(_) => true,
            None => {
                debug!("destroy for projectile {id} that is not alive here");
                false
            }
        }
    }

    pub fn get(&self, id: ProjectileId) -> Option<&Projectile> {
        self.projectiles.get(&id)
    }

    pub fn contains(&self, id: ProjectileId) -> bool {
        self.projectiles.contains_key(&id)
    }

    pub fn is_tombstoned(&self, id: ProjectileId) -> bool {
        self.tombstone_set.contains(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.values()
    }

    pub fn len(&self) -> usize {
        self.projectiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
    }

    pub fn tick_dt(&self) -> f32 {
        self.tick_dt
    }

    /// Drops the shooter reference of every projectile fired by `object`, so a
    /// departed actor's shots keep flying without pointing at a dead body.
    pub fn forget_shooter(&mut self, object: ObjectId) {
        for projectile in self.projectiles.values_mut() {
            if projectile.shooter == Some(object) {
                projectile.shooter = None;
            }
        }
    }

    /// Advances every projectile by one frame, resolving impacts against
    /// `world`. Only authoritative instances reach into `targets`.
    pub fn advance<W, T>(&mut self, frame_dt: f32, world: &W, targets: &mut T) -> AdvanceReport
    where
        W: CollisionProvider,
        T: HitTargets,
    {
        let mut report = AdvanceReport::default();

        for projectile in self.projectiles.values_mut() {
            let motion = projectile.advance(frame_dt, self.tick_dt);

            let impact = world
                .cast_segment(motion.from, motion.to, projectile.shooter)
                .filter(|hit| projectile.definition.hits_layer(hit.layer))
                .filter(|hit| !projectile.struck.contains(&hit.object));

            if let Some(hit) = impact {
                projectile.struck.push(hit.object);

                if projectile.is_authoritative() {
                    match targets.target(hit.object) {
                        Some(target) => {
                            let outcome = target.on_hit(projectile.id, projectile.damage);
                            report.hits.push(HitReport {
                                projectile: projectile.id,
                                object: hit.object,
                                damage: projectile.damage,
                                outcome,
                            });
                        }
                        None => debug!(
                            "projectile {} struck {:?} with nothing to damage",
                            projectile.id, hit.object
                        ),
                    }
                }

                if projectile.definition.despawn_on_impact {
                    projectile.position = hit.point;
                    report.despawned.push(Despawn {
                        id: projectile.id,
                        role: projectile.role,
                        reason: DespawnReason::Impact {
                            object: hit.object,
                            point: hit.point,
                        },
                    });
                    continue;
                }
            }

            if motion.expired {
                report.despawned.push(Despawn {
                    id: projectile.id,
                    role: projectile.role,
                    reason: DespawnReason::Expired,
                });
            }
        }

        for despawn in &report.despawned {
            self.destroy(despawn.id);
        }

        report
    }

    fn remember(&mut self, id: ProjectileId) {
        if self.tombstone_capacity == 0 || !self.tombstone_set.insert(id) {
            return;
        }
        if self.tombstones.len() >= self.tombstone_capacity {
            if let Some(oldest) = self.tombstones.pop_front() {
                self.tombstone_set.remove(&oldest);
            }
        }
        self.tombstones.push_back(id);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::physics::FlatArena;
    use crate::projectile::Health;

    const TICK_DT: f32 = 0.02;
    const TARGET: ObjectId = ObjectId(7);
    const SHOOTER: ObjectId = ObjectId(1);

    fn spawn(id: ProjectileId, role: ProjectileRole) -> ProjectileSpawn {
        ProjectileSpawn {
            id,
            role,
            shooter: Some(SHOOTER),
            origin: Vec2::new(0.0, 1.0),
            direction: Vec2::X,
            speed: 24.0,
            damage: 5,
            elapsed: 0.0,
        }
    }

    fn arena() -> FlatArena {
        FlatArena::new(0.0)
            .with_box(SHOOTER, 0, Vec2::new(0.0, 1.0), Vec2::new(0.4, 0.9))
            .with_box(TARGET, 1, Vec2::new(2.0, 1.0), Vec2::new(0.4, 0.9))
    }

    fn run(
        registry: &mut ProjectileRegistry,
        targets: &mut HashMap<ObjectId, Health>,
    ) -> AdvanceReport {
        let world = arena();
        let mut report = AdvanceReport::default();
        for _ in 0..10 {
            let step = registry.advance(TICK_DT, &world, targets);
            report.despawned.extend(step.despawned);
            report.hits.extend(step.hits);
        }
        report
    }

    #[test]
    fn destroy_twice_equals_destroy_once() {
        let id = ProjectileId::pack(1, 5, 0);
        let mut registry = ProjectileRegistry::new(TICK_DT, 16);
        registry
            .spawn(spawn(id, ProjectileRole::Visual), &ProjectileDef::pellet())
            .unwrap();

        assert!(registry.destroy(id));
        let (len, tombstoned) = (registry.len(), registry.is_tombstoned(id));
        assert!(!registry.destroy(id));
        assert_eq!((registry.len(), registry.is_tombstoned(id)), (len, tombstoned));
    }

    #[test]
    fn destroy_before_spawn_suppresses_the_echo() {
        let id = ProjectileId::pack(2, 9, 3);
        let mut registry = ProjectileRegistry::new(TICK_DT, 16);

        assert!(!registry.destroy(id));
        assert_eq!(
            registry.spawn(spawn(id, ProjectileRole::Visual), &ProjectileDef::pellet()),
            Err(SpawnError::Tombstoned(id))
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn duplicate_spawn_is_refused() {
        let id = ProjectileId::pack(2, 9, 3);
        let mut registry = ProjectileRegistry::new(TICK_DT, 16);
        let def = ProjectileDef::pellet();

        registry.spawn(spawn(id, ProjectileRole::Authoritative), &def).unwrap();
        assert_eq!(
            registry.spawn(spawn(id, ProjectileRole::Authoritative), &def),
            Err(SpawnError::DuplicateId(id))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn tombstones_are_bounded() {
        let mut registry = ProjectileRegistry::new(TICK_DT, 2);
        let ids: Vec<_> = (0..3).map(|p| ProjectileId::pack(1, 1, p)).collect();
        for id in &ids {
            registry.destroy(*id);
        }

        assert!(!registry.is_tombstoned(ids[0]));
        assert!(registry.is_tombstoned(ids[1]));
        assert!(registry.is_tombstoned(ids[2]));
    }

    #[test]
    fn only_authoritative_instances_apply_damage() {
        let mut targets = HashMap::from([(TARGET, Health::new(20))]);

        let mut visual = ProjectileRegistry::new(TICK_DT, 16);
        let pellet = spawn(ProjectileId::pack(1, 1, 0), ProjectileRole::Visual);
        visual.spawn(pellet, &ProjectileDef::pellet()).unwrap();
        let report = run(&mut visual, &mut targets);
        assert!(report.hits.is_empty());
        assert!(visual.is_empty());
        assert!(matches!(
            report.despawned[0].reason,
            DespawnReason::Impact { object: TARGET, .. }
        ));
        assert_eq!(targets[&TARGET].current, 20);

        let mut authoritative = ProjectileRegistry::new(TICK_DT, 16);
        authoritative
            .spawn(
                spawn(ProjectileId::pack(1, 1, 0), ProjectileRole::Authoritative),
                &ProjectileDef::pellet(),
            )
            .unwrap();
        let report = run(&mut authoritative, &mut targets);
        assert_eq!(report.hits.len(), 1);
        assert_eq!(report.hits[0].outcome, HitOutcome::Damaged { remaining: 15 });
        assert_eq!(targets[&TARGET].current, 15);
    }

    #[test]
    fn masked_layers_are_passed_through() {
        let mut def = ProjectileDef::pellet();
        def.hit_mask = 1 << 0;
        let mut targets = HashMap::from([(TARGET, Health::new(20))]);
        let mut registry = ProjectileRegistry::new(TICK_DT, 16);
        registry
            .spawn(spawn(ProjectileId::pack(1, 1, 0), ProjectileRole::Authoritative), &def)
            .unwrap();

        let report = run(&mut registry, &mut targets);
        assert!(report.hits.is_empty());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn lifetime_expiry_despawns() {
        let mut def = ProjectileDef::pellet();
        def.lifetime = 0.1;
        let mut registry = ProjectileRegistry::new(TICK_DT, 16);
        let mut shot = spawn(ProjectileId::pack(1, 1, 0), ProjectileRole::Visual);
        shot.direction = Vec2::NEG_X;
        shot.origin = Vec2::new(-1.0, 1.0);
        registry.spawn(shot, &def).unwrap();

        let report = run(&mut registry, &mut HashMap::new());
        assert_eq!(report.despawned.len(), 1);
        assert_eq!(report.despawned[0].reason, DespawnReason::Expired);
        assert!(registry.is_empty());
    }

    #[test]
    fn forgotten_shooter_can_be_struck() {
        let mut registry = ProjectileRegistry::new(TICK_DT, 16);
        let id = ProjectileId::pack(1, 1, 0);
        registry
            .spawn(spawn(id, ProjectileRole::Visual), &ProjectileDef::pellet())
            .unwrap();
        registry.forget_shooter(SHOOTER);
        assert_eq!(registry.get(id).unwrap().shooter, None);
    }
}
