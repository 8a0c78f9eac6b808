use std::collections::HashMap;

use glam::Vec2;
use rapier3d::control::{CharacterLength, KinematicCharacterController};
use rapier3d::prelude::*;

use super::{ActorBodies, CollisionProvider, ObjectId, SegmentHit};

// Thickness of every body along the axis perpendicular to the simulation plane.
const PLANE_HALF_DEPTH: Real = 0.5;
const PROBE_LIFT: Real = 0.01;

fn to_vector(v: Vec2) -> Vector {
    Vector::new(v.x, v.y, 0.0)
}

#[derive(Debug, Clone, Copy)]
struct ColliderTag {
    object: ObjectId,
    layer: u8,
}

/// Rapier-backed collision world. Everything lives in the z = 0 plane; the
/// simulation only asks it ground probes, motion resolution and sweeps.
pub struct PhysicsWorld {
    pipeline: PhysicsPipeline,
    integration_parameters: IntegrationParameters,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    character_controller: KinematicCharacterController,
    actor_bodies: HashMap<ObjectId, RigidBodyHandle>,
    static_colliders: HashMap<ObjectId, ColliderHandle>,
    tags: HashMap<ColliderHandle, ColliderTag>,
}

impl PhysicsWorld {
    pub fn new(tick_rate: u32) -> Self {
        let dt = 1.0 / tick_rate.max(1) as Real;
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = dt;
        integration_parameters.min_ccd_dt = dt / 100.0;

        let mut character_controller = KinematicCharacterController::default();
        character_controller.offset = CharacterLength::Absolute(0.01);
        character_controller.up = Vector::Y;
        character_controller.snap_to_ground = None;
        character_controller.autostep = None;

        Self {
            pipeline: PhysicsPipeline::new(),
            integration_parameters,
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            character_controller,
            actor_bodies: HashMap::new(),
            static_colliders: HashMap::new(),
            tags: HashMap::new(),
        }
    }

    /// Refreshes the broad phase after bodies moved; gravity is applied by the
    /// movement step, never by the engine.
    pub fn step(&mut self) {
        self.pipeline.step(
            Vector::new(0.0, 0.0, 0.0),
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            &(),
            &(),
        );
    }

    pub fn add_actor(&mut self, object: ObjectId, position: Vec2, half_extents: Vec2, layer: u8) {
        self.remove_object(object);

        let body = RigidBodyBuilder::kinematic_position_based()
            .translation(to_vector(position))
            .lock_rotations()
            .build();
        let handle = self.bodies.insert(body);

        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, PLANE_HALF_DEPTH)
            .friction(0.0)
            .build();
        let collider_handle = self
            .colliders
            .insert_with_parent(collider, handle, &mut self.bodies);

        self.actor_bodies.insert(object, handle);
        self.tags.insert(collider_handle, ColliderTag { object, layer });
    }

    pub fn add_static_box(
        &mut self,
        object: ObjectId,
        center: Vec2,
        half_extents: Vec2,
        layer: u8,
    ) {
        self.remove_object(object);

        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, PLANE_HALF_DEPTH)
            .translation(to_vector(center))
            .build();
        let handle = self.colliders.insert(collider);

        self.static_colliders.insert(object, handle);
        self.tags.insert(handle, ColliderTag { object, layer });
    }

    pub fn remove_object(&mut self, object: ObjectId) {
        if let Some(handle) = self.actor_bodies.remove(&object) {
            if let Some(body) = self.bodies.get(handle) {
                for collider in body.colliders() {
                    self.tags.remove(collider);
                }
            }
            self.bodies.remove(
                handle,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            );
        }

        if let Some(handle) = self.static_colliders.remove(&object) {
            self.tags.remove(&handle);
            self.colliders
                .remove(handle, &mut self.islands, &mut self.bodies, false);
        }
    }

    pub fn set_actor_position(&mut self, object: ObjectId, position: Vec2) {
        let Some(handle) = self.actor_bodies.get(&object) else {
            return;
        };
        if let Some(body) = self.bodies.get_mut(*handle) {
            let current_rot = *body.rotation();
            let pose = Pose::from_parts(to_vector(position), current_rot);
            body.set_position(pose, true);
        }
    }

    pub fn actor_position(&self, object: ObjectId) -> Option<Vec2> {
        let handle = self.actor_bodies.get(&object)?;
        self.bodies.get(*handle).map(|b| {
            let t = b.translation();
            Vec2::new(t.x, t.y)
        })
    }

    fn filter_excluding(&self, exclude: Option<ObjectId>) -> QueryFilter<'_> {
        match exclude.and_then(|object| self.actor_bodies.get(&object)) {
            Some(handle) => QueryFilter::default().exclude_rigid_body(*handle),
            None => QueryFilter::default(),
        }
    }
}

impl ActorBodies for PhysicsWorld {
    fn insert_actor(&mut self, object: ObjectId, position: Vec2, half_extents: Vec2, layer: u8) {
        self.add_actor(object, position, half_extents, layer);
    }

    fn sync_actor(&mut self, object: ObjectId, position: Vec2) {
        self.set_actor_position(object, position);
    }

    fn remove_actor(&mut self, object: ObjectId) {
        self.remove_object(object);
    }

    fn refresh(&mut self) {
        self.step();
    }
}

impl CollisionProvider for PhysicsWorld {
    fn probe_ground(&self, feet: Vec2, radius: f32, exclude: Option<ObjectId>) -> bool {
        let query = self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            self.filter_excluding(exclude),
        );

        let origin = feet + Vec2::new(0.0, PROBE_LIFT);
        let ray = Ray::new(to_vector(origin), Vector::new(0.0, -1.0, 0.0));
        query.cast_ray(&ray, radius + PROBE_LIFT, true).is_some()
    }

    fn resolve_motion(
        &self,
        body: ObjectId,
        position: Vec2,
        half_extents: Vec2,
        translation: Vec2,
    ) -> Vec2 {
        let query = self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            self.filter_excluding(Some(body)),
        );

        let shape = SharedShape::cuboid(half_extents.x, half_extents.y, PLANE_HALF_DEPTH);
        let pose = Pose::from_parts(to_vector(position), Rotation::IDENTITY);
        let corrected = self.character_controller.move_shape(
            self.integration_parameters.dt,
            &query,
            shape.as_ref(),
            &pose,
            to_vector(translation),
            |_collision| {},
        );

        Vec2::new(corrected.translation.x, corrected.translation.y)
    }

    fn cast_segment(&self, from: Vec2, to: Vec2, exclude: Option<ObjectId>) -> Option<SegmentHit> {
        let delta = to - from;
        let length = delta.length();
        if length <= f32::EPSILON {
            return None;
        }

        let query = self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            self.filter_excluding(exclude),
        );

        let direction = delta / length;
        let ray = Ray::new(to_vector(from), to_vector(direction));
        let (collider, toi) = query.cast_ray(&ray, length, true)?;
        let tag = self.tags.get(&collider)?;

        Some(SegmentHit {
            object: tag.object,
            layer: tag.layer,
            point: from + direction * toi,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_with_floor() -> PhysicsWorld {
        let mut world = PhysicsWorld::new(50);
        world.add_static_box(ObjectId(1000), Vec2::new(0.0, -0.5), Vec2::new(50.0, 0.5), 1);
        world.step();
        world
    }

    #[test]
    fn probe_finds_floor() {
        let world = world_with_floor();
        assert!(world.probe_ground(Vec2::new(0.0, 0.05), 0.12, None));
        assert!(!world.probe_ground(Vec2::new(0.0, 1.0), 0.12, None));
    }

    #[test]
    fn segment_reports_tagged_object() {
        let mut world = world_with_floor();
        world.add_actor(ObjectId(3), Vec2::new(5.0, 1.0), Vec2::new(0.4, 0.9), 2);
        world.step();

        let hit = world
            .cast_segment(Vec2::new(0.0, 1.0), Vec2::new(10.0, 1.0), None)
            .unwrap();
        assert_eq!(hit.object, ObjectId(3));
        assert_eq!(hit.layer, 2);

        assert!(world
            .cast_segment(Vec2::new(0.0, 1.0), Vec2::new(10.0, 1.0), Some(ObjectId(3)))
            .is_none());
    }

    #[test]
    fn removed_actor_is_gone() {
        let mut world = world_with_floor();
        world.add_actor(ObjectId(3), Vec2::new(5.0, 1.0), Vec2::new(0.4, 0.9), 2);
        world.remove_object(ObjectId(3));
        world.step();

        assert!(world.actor_position(ObjectId(3)).is_none());
        assert!(world
            .cast_segment(Vec2::new(0.0, 1.0), Vec2::new(10.0, 1.0), None)
            .is_none());
    }
}
