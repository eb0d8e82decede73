//! Collision geometry for scene raycasts: spheres and axis-aligned boxes on
//! layers, optionally riding on a live frame and owned by a body.

use std::cell::RefCell;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use pinata_core::{BodyId, FrameHandle, LayerMask, Ray, RaycastHit, SceneRaycast};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Shape {
    Sphere { radius: f32 },
    Box { half_extents: Vec3 },
}

impl Shape {
    /// Entry distance of `ray` into the shape centered at `center`. A ray
    /// starting inside reports its exit.
    fn intersect(&self, center: Vec3, ray: &Ray) -> Option<f32> {
        match *self {
            Shape::Sphere { radius } => {
                let oc = ray.origin - center;
                let b = oc.dot(ray.direction);
                let c = oc.length_squared() - radius * radius;
                let disc = b * b - c;
                if disc < 0.0 {
                    return None;
                }
                let root = disc.sqrt();
                [-b - root, -b + root].into_iter().find(|t| *t >= 0.0)
            }
            Shape::Box { half_extents } => {
                let min = center - half_extents;
                let max = center + half_extents;
                let inv = ray.direction.recip();
                let t1 = (min - ray.origin) * inv;
                let t2 = (max - ray.origin) * inv;
                let near = t1.min(t2).max_element();
                let far = t1.max(t2).min_element();
                if far < near.max(0.0) {
                    return None;
                }
                Some(if near >= 0.0 { near } else { far })
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct Collider {
    pub id: Uuid,
    pub shape: Shape,
    /// Center in the attached frame's space, or in world space when unattached.
    pub offset: Vec3,
    pub layer: u8,
    pub body: Option<BodyId>,
    pub frame: Option<FrameHandle>,
}

impl Collider {
    pub fn new(shape: Shape, offset: Vec3, layer: u8) -> Self {
        Self {
            id: Uuid::new_v4(),
            shape,
            offset,
            layer,
            body: None,
            frame: None,
        }
    }

    pub fn attached(mut self, frame: FrameHandle, body: Option<BodyId>) -> Self {
        self.frame = Some(frame);
        self.body = body;
        self
    }

    pub fn center(&self) -> Vec3 {
        match &self.frame {
            Some(frame) => frame.world_pose().transform_point(self.offset),
            None => self.offset,
        }
    }
}

/// Every collider in the scene. Colliders can be added through a shared
/// reference so a spawner can register the target while the scene is lent out.
#[derive(Debug, Default)]
pub struct SimScene {
    colliders: RefCell<Vec<Collider>>,
}

impl SimScene {
    pub fn new(colliders: Vec<Collider>) -> Self {
        Self {
            colliders: RefCell::new(colliders),
        }
    }

    pub fn add(&self, collider: Collider) -> Uuid {
        let id = collider.id;
        self.colliders.borrow_mut().push(collider);
        id
    }

    pub fn remove(&self, id: Uuid) -> bool {
        let mut colliders = self.colliders.borrow_mut();
        let before = colliders.len();
        colliders.retain(|c| c.id != id);
        colliders.len() != before
    }

    /// Drop every collider owned by `body`.
    pub fn remove_body(&self, body: BodyId) -> usize {
        let mut colliders = self.colliders.borrow_mut();
        let before = colliders.len();
        colliders.retain(|c| c.body != Some(body));
        before - colliders.len()
    }

    pub fn len(&self) -> usize {
        self.colliders.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.borrow().is_empty()
    }
}

impl SceneRaycast for SimScene {
    fn raycast(&self, ray: &Ray, max_distance: f32, layers: LayerMask) -> Option<RaycastHit> {
        self.colliders
            .borrow()
            .iter()
            .filter(|c| layers.contains(c.layer))
            .filter_map(|c| {
                let distance = c.shape.intersect(c.center(), ray)?;
                (distance <= max_distance).then(|| RaycastHit {
                    point: ray.at(distance),
                    distance,
                    body: c.body,
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}
