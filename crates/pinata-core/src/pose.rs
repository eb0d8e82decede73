use std::cell::RefCell;
use std::rc::{Rc, Weak};

use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Position plus orientation in world space. World up is +Y, forward is -Z.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Compose a child pose expressed in this pose's space.
    pub fn then(&self, local: &Pose) -> Pose {
        Pose {
            position: self.position + self.rotation * local.position,
            rotation: (self.rotation * local.rotation).normalize(),
        }
    }

    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    pub fn inverse_transform_point(&self, world: Vec3) -> Vec3 {
        self.rotation.inverse() * (world - self.position)
    }
}

/// Rotation from Euler angles in degrees, applied Z, then X, then Y.
pub fn euler_degrees(angles: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        angles.y.to_radians(),
        angles.x.to_radians(),
        angles.z.to_radians(),
    )
}

#[derive(Debug)]
struct Frame {
    name: String,
    local: Pose,
    parent: Option<FrameHandle>,
}

/// Live, shared reference to a scene frame.
///
/// Cloning a handle does not copy the frame: every clone observes moves made
/// through any other. World pose is resolved through the parent chain on each
/// read, so a child follows its parent without being touched.
#[derive(Clone, Debug)]
pub struct FrameHandle(Rc<RefCell<Frame>>);

/// Non-owning frame reference for holders that must not keep a frame alive,
/// such as a simulated body hanging from an anchor it does not own.
#[derive(Clone, Debug)]
pub struct WeakFrame(Weak<RefCell<Frame>>);

impl FrameHandle {
    pub fn root(name: &str, pose: Pose) -> Self {
        Self(Rc::new(RefCell::new(Frame {
            name: name.to_string(),
            local: pose,
            parent: None,
        })))
    }

    pub fn child(&self, name: &str, local: Pose) -> Self {
        Self(Rc::new(RefCell::new(Frame {
            name: name.to_string(),
            local,
            parent: Some(self.clone()),
        })))
    }

    pub fn name(&self) -> String {
        self.0.borrow().name.clone()
    }

    pub fn local_pose(&self) -> Pose {
        self.0.borrow().local
    }

    pub fn set_local_pose(&self, pose: Pose) {
        self.0.borrow_mut().local = pose;
    }

    pub fn set_local_rotation(&self, rotation: Quat) {
        self.0.borrow_mut().local.rotation = rotation;
    }

    pub fn world_pose(&self) -> Pose {
        let frame = self.0.borrow();
        match &frame.parent {
            Some(parent) => parent.world_pose().then(&frame.local),
            None => frame.local,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.world_pose().position
    }

    /// Move the frame by a world-space offset, keeping its orientation.
    pub fn translate_world(&self, delta: Vec3) {
        let parent_rotation = self
            .0
            .borrow()
            .parent
            .as_ref()
            .map(|p| p.world_pose().rotation)
            .unwrap_or(Quat::IDENTITY);
        self.0.borrow_mut().local.position += parent_rotation.inverse() * delta;
    }

    pub fn set_world_position(&self, position: Vec3) {
        let delta = position - self.position();
        self.translate_world(delta);
    }

    pub fn downgrade(&self) -> WeakFrame {
        WeakFrame(Rc::downgrade(&self.0))
    }

    pub fn ptr_eq(&self, other: &FrameHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl WeakFrame {
    pub fn upgrade(&self) -> Option<FrameHandle> {
        self.0.upgrade().map(FrameHandle)
    }
}
