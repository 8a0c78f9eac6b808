use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentHit {
    pub object: ObjectId,
    pub layer: u8,
    pub point: Vec2,
}

/// Collision queries the simulation needs from the physics engine. Positions
/// live on the simulation plane; bodies are addressed by [`ObjectId`].
pub trait CollisionProvider {
    fn probe_ground(&self, feet: Vec2, radius: f32, exclude: Option<ObjectId>) -> bool;

    /// Returns the part of `translation` the body can actually travel.
    fn resolve_motion(
        &self,
        body: ObjectId,
        position: Vec2,
        half_extents: Vec2,
        translation: Vec2,
    ) -> Vec2;

    fn cast_segment(&self, from: Vec2, to: Vec2, exclude: Option<ObjectId>) -> Option<SegmentHit>;
}

/// Keeps actor bodies in the collision world in step with simulated positions.
pub trait ActorBodies {
    fn insert_actor(&mut self, object: ObjectId, position: Vec2, half_extents: Vec2, layer: u8);
    fn sync_actor(&mut self, object: ObjectId, position: Vec2);
    fn remove_actor(&mut self, object: ObjectId);

    /// Called once per tick after all bodies were synced.
    fn refresh(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArenaBox {
    pub object: ObjectId,
    pub layer: u8,
    pub min: Vec2,
    pub max: Vec2,
}

/// Analytic provider: an endless floor plus axis-aligned hit boxes. Boxes are
/// only struck by segment casts; they never block movement.
#[derive(Debug, Clone, Default)]
pub struct FlatArena {
    pub floor_height: f32,
    pub boxes: Vec<ArenaBox>,
}

impl FlatArena {
    pub fn new(floor_height: f32) -> Self {
        Self {
            floor_height,
            boxes: Vec::new(),
        }
    }

    pub fn with_box(
        mut self,
        object: ObjectId,
        layer: u8,
        center: Vec2,
        half_extents: Vec2,
    ) -> Self {
        self.add_box(object, layer, center, half_extents);
        self
    }

    pub fn add_box(&mut self, object: ObjectId, layer: u8, center: Vec2, half_extents: Vec2) {
        self.boxes.push(ArenaBox {
            object,
            layer,
            min: center - half_extents,
            max: center + half_extents,
        });
    }

    pub fn move_box(&mut self, object: ObjectId, center: Vec2) {
        for arena_box in self.boxes.iter_mut().filter(|b| b.object == object) {
            let half = (arena_box.max - arena_box.min) * 0.5;
            arena_box.min = center - half;
            arena_box.max = center + half;
        }
    }

    pub fn remove_box(&mut self, object: ObjectId) {
        self.boxes.retain(|b| b.object != object);
    }
}

impl CollisionProvider for FlatArena {
    fn probe_ground(&self, feet: Vec2, radius: f32, _exclude: Option<ObjectId>) -> bool {
        feet.y - self.floor_height <= radius
    }

    fn resolve_motion(
        &self,
        _body: ObjectId,
        position: Vec2,
        half_extents: Vec2,
        translation: Vec2,
    ) -> Vec2 {
        let feet_after = position.y - half_extents.y + translation.y;
        if feet_after < self.floor_height {
            Vec2::new(translation.x, translation.y + (self.floor_height - feet_after))
        } else {
            translation
        }
    }

    fn cast_segment(&self, from: Vec2, to: Vec2, exclude: Option<ObjectId>) -> Option<SegmentHit> {
        let delta = to - from;
        self.boxes
            .iter()
            .filter(|b| Some(b.object) != exclude)
            .filter_map(|b| segment_enters_box(from, delta, b.min, b.max).map(|t| (t, b)))
            .min_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(t, b)| SegmentHit {
                object: b.object,
                layer: b.layer,
                point: from + delta * t,
            })
    }
}

impl ActorBodies for FlatArena {
    fn insert_actor(&mut self, object: ObjectId, position: Vec2, half_extents: Vec2, layer: u8) {
        self.remove_box(object);
        self.add_box(object, layer, position, half_extents);
    }

    fn sync_actor(&mut self, object: ObjectId, position: Vec2) {
        self.move_box(object, position);
    }

    fn remove_actor(&mut self, object: ObjectId) {
        self.remove_box(object);
    }
}

// slab test; returns the entry fraction along the segment
fn segment_enters_box(origin: Vec2, delta: Vec2, min: Vec2, max: Vec2) -> Option<f32> {
    let mut t_enter = 0.0f32;
    let mut t_exit = 1.0f32;

    for axis in 0..2 {
        let (o, d, lo, hi) = (origin[axis], delta[axis], min[axis], max[axis]);
        if d.abs() < f32::EPSILON {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }
        let (mut t0, mut t1) = ((lo - o) / d, (hi - o) / d);
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_enter = t_enter.max(t0);
        t_exit = t_exit.min(t1);
        if t_enter > t_exit {
            return None;
        }
    }

    Some(t_enter)
}
