use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use pinata_core::{
    Camera, CoreError, FrameHandle, ObjectSpawner, PlacedObject, Placement, Pose, RigidBody,
    SharedBody,
};

use crate::body::SimBody;
use crate::feedback::{RecordingAudio, RecordingTactile};
use crate::planes::SimPlanes;
use crate::scene::{Collider, Shape, SimScene};

/// How the spawned target is built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetSpec {
    /// Anchor position relative to the target root. The root is placed so
    /// the anchor lands on the resolved pose.
    pub anchor_offset: Vec3,
    /// Tether hook relative to the body; the body's origin when absent.
    pub hook_offset: Option<Vec3>,
    pub radius: f32,
    pub mass: f32,
    pub layer: u8,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl Default for TargetSpec {
    fn default() -> Self {
        Self {
            anchor_offset: Vec3::new(0.0, 0.8, 0.0),
            hook_offset: None,
            radius: 0.3,
            mass: 1.0,
            layer: 0,
            linear_damping: 2.0,
            angular_damping: 2.0,
        }
    }
}

/// Builds the target: a root frame holding the anchor, a body frame beside it
/// roped to the anchor, an optional hook on the body, and the body's collider
/// registered with the scene.
#[derive(Debug)]
pub struct SimSpawner {
    scene: Rc<SimScene>,
    target: TargetSpec,
    body: Option<Rc<RefCell<SimBody>>>,
}

impl SimSpawner {
    pub fn new(scene: Rc<SimScene>, target: TargetSpec) -> Self {
        Self {
            scene,
            target,
            body: None,
        }
    }

    pub fn target(&self) -> &TargetSpec {
        &self.target
    }

    /// Body of the last spawned target.
    pub fn body(&self) -> Option<&Rc<RefCell<SimBody>>> {
        self.body.as_ref()
    }

    /// Remove the last spawned target's collider from the scene.
    pub fn despawn(&mut self) {
        if let Some(body) = self.body.take() {
            let removed = self.scene.remove_body(body.borrow().id());
            tracing::debug!(removed, "target despawned");
        }
    }
}

impl ObjectSpawner for SimSpawner {
    fn spawn(&mut self, placement: &Placement) -> pinata_core::Result<PlacedObject> {
        let spec = &self.target;
        if spec.radius <= 0.0 || spec.mass <= 0.0 {
            return Err(CoreError::InvalidConfig(format!(
                "target radius and mass must be positive, got {} and {}",
                spec.radius, spec.mass
            )));
        }
        self.despawn();
        let spec = &self.target;

        let root_position = placement.pose.position - placement.pose.rotation * spec.anchor_offset;
        let root = FrameHandle::root("target", Pose::new(root_position, placement.pose.rotation));
        let anchor = root.child("anchor", Pose::from_position(spec.anchor_offset));
        let body_frame = root.child("body", Pose::IDENTITY);

        let body = Rc::new(RefCell::new(
            SimBody::new(body_frame.clone(), spec.mass, spec.radius)
                .with_damping(spec.linear_damping, spec.angular_damping)
                .roped_to(&anchor),
        ));
        let body_id = body.borrow().id();
        self.scene.add(
            Collider::new(Shape::Sphere { radius: spec.radius }, Vec3::ZERO, spec.layer)
                .attached(body_frame.clone(), Some(body_id)),
        );

        let hook = match spec.hook_offset {
            Some(offset) => body_frame.child("hook", Pose::from_position(offset)),
            None => body_frame,
        };
        let object = PlacedObject::new(root, anchor).with_hook(hook);
        let shared: SharedBody = body.clone();
        self.body = Some(body);
        tracing::debug!(root = ?root_position, "target spawned");
        Ok(object.with_body(shared))
    }
}

/// A complete simulated environment for one session.
#[derive(Debug)]
pub struct SimWorld {
    pub camera: Camera,
    pub planes: SimPlanes,
    pub scene: Rc<SimScene>,
    pub spawner: SimSpawner,
    pub tactile: RecordingTactile,
    pub audio: RecordingAudio,
}

impl SimWorld {
    pub fn new(camera: Camera, planes: SimPlanes, scene: SimScene, target: TargetSpec) -> Self {
        let scene = Rc::new(scene);
        Self {
            camera,
            spawner: SimSpawner::new(Rc::clone(&scene), target),
            planes,
            scene,
            tactile: RecordingTactile::default(),
            audio: RecordingAudio::new(),
        }
    }

    pub fn body(&self) -> Option<&Rc<RefCell<SimBody>>> {
        self.spawner.body()
    }

    /// Integrate the target body, if any.
    pub fn step(&mut self, dt: f32) {
        if let Some(body) = self.spawner.body() {
            body.borrow_mut().step(dt);
        }
    }
}
