//! Seams to the host environment: plane tracking, scene collision, rigid
//! bodies, tactile output, audio and the placement reticle.
//!
//! The engine never owns these; it reads and drives them through the traits
//! below so any tracking/physics stack can sit behind them.

use std::cell::RefCell;
use std::rc::Rc;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::{Camera, Ray};
use crate::plane::{Plane, PlaneHit};
use crate::pose::Pose;

/// Identity of a simulated body, used to tell a target hit from any other hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyId(pub Uuid);

impl BodyId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BodyId {
    fn default() -> Self {
        Self::new()
    }
}

/// Bit set of collision layers. Bit `n` selects layer `n`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const ALL: Self = Self(u32::MAX);
    pub const NONE: Self = Self(0);

    pub fn layer(index: u8) -> Self {
        Self(1u32.checked_shl(u32::from(index)).unwrap_or(0))
    }

    pub fn contains(self, layer: u8) -> bool {
        self.0 & Self::layer(layer).0 != 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// Nearest intersection against general collision geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RaycastHit {
    pub point: Vec3,
    pub distance: f32,
    pub body: Option<BodyId>,
}

/// Detected-plane tracking.
pub trait PlaneQuery {
    fn planes(&self) -> Vec<Plane>;

    /// Planes under a screen point, nearest first, restricted to each
    /// plane's boundary polygon.
    fn raycast_planes(&self, screen: Vec2, viewer: &Camera) -> Vec<PlaneHit>;
}

/// Generic scene ray intersection, not limited to detected planes.
pub trait SceneRaycast {
    fn raycast(&self, ray: &Ray, max_distance: f32, layers: LayerMask) -> Option<RaycastHit>;
}

/// Control surface of the simulated target.
pub trait RigidBody {
    fn id(&self) -> BodyId;
    fn pose(&self) -> Pose;
    fn is_kinematic(&self) -> bool;
    fn set_kinematic(&mut self, kinematic: bool);
    fn apply_impulse(&mut self, impulse: Vec3, at_point: Vec3);
    fn apply_angular_impulse(&mut self, torque: Vec3);
}

pub type SharedBody = Rc<RefCell<dyn RigidBody>>;

/// Platform tactile engine.
pub trait TactileOutput {
    fn is_supported(&self) -> bool;
    fn play(&mut self, category_index: u8);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCue {
    Miss,
    Tap,
    Swipe,
}

pub trait AudioSink {
    fn play_one_shot(&mut self, cue: AudioCue);
}

/// The on-screen placement affordance, hidden once an object is placed.
pub trait PlacementReticle {
    fn set_active(&mut self, active: bool);
}
