use glam::{Quat, Vec3};

use pinata_core::{BodyId, FrameHandle, Pose, RigidBody, WeakFrame};

/// One impulse delivered to a body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Impulse {
    Linear { impulse: Vec3, at_point: Vec3 },
    Angular { torque: Vec3 },
}

/// Slack rope from the body's frame origin to an anchor frame it does not own.
#[derive(Clone, Debug)]
struct Rope {
    anchor: WeakFrame,
    length: f32,
}

/// Minimal rigid body driving its own live frame.
///
/// No gravity: only struck motion and damping are integrated. When roped to an
/// anchor the body never strays farther than the rope length from it; once the
/// anchor frame is dropped the rope goes with it. Impulses on a kinematic body
/// are logged and otherwise ignored.
#[derive(Debug)]
pub struct SimBody {
    id: BodyId,
    frame: FrameHandle,
    mass: f32,
    inertia: f32,
    linear_damping: f32,
    angular_damping: f32,
    linear_velocity: Vec3,
    angular_velocity: Vec3,
    kinematic: bool,
    rope: Option<Rope>,
    log: Vec<Impulse>,
}

impl SimBody {
    /// Solid sphere of `radius` and `mass` riding on `frame`.
    pub fn new(frame: FrameHandle, mass: f32, radius: f32) -> Self {
        let mass = mass.max(1e-3);
        Self {
            id: BodyId::new(),
            frame,
            mass,
            inertia: (0.4 * mass * radius * radius).max(1e-4),
            linear_damping: 2.0,
            angular_damping: 2.0,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            kinematic: false,
            rope: None,
            log: Vec::new(),
        }
    }

    /// Hang the body from `anchor` at its current distance.
    pub fn roped_to(mut self, anchor: &FrameHandle) -> Self {
        let length = anchor.position().distance(self.frame.position());
        self.rope = Some(Rope {
            anchor: anchor.downgrade(),
            length,
        });
        self
    }

    /// Rope length, while the anchor it hangs from is alive.
    pub fn rope_length(&self) -> Option<f32> {
        self.rope
            .as_ref()
            .filter(|r| r.anchor.upgrade().is_some())
            .map(|r| r.length)
    }

    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.linear_damping = linear.max(0.0);
        self.angular_damping = angular.max(0.0);
        self
    }

    pub fn frame(&self) -> &FrameHandle {
        &self.frame
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn linear_velocity(&self) -> Vec3 {
        self.linear_velocity
    }

    pub fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    pub fn impulses(&self) -> &[Impulse] {
        &self.log
    }

    /// Integrate one step. Kinematic bodies do not move.
    pub fn step(&mut self, dt: f32) {
        if self.kinematic || dt <= 0.0 {
            return;
        }
        self.frame.translate_world(self.linear_velocity * dt);
        self.hold_rope();

        let spin = self.angular_velocity * dt;
        if spin.length_squared() > 0.0 {
            // World-space spin expressed in the parent's frame
            let mut local = self.frame.local_pose();
            let parent = self.frame.world_pose().rotation * local.rotation.inverse();
            let turn = parent.inverse() * Quat::from_scaled_axis(spin) * parent;
            local.rotation = (turn * local.rotation).normalize();
            self.frame.set_local_pose(local);
        }

        self.linear_velocity *= (1.0 - self.linear_damping * dt).max(0.0);
        self.angular_velocity *= (1.0 - self.angular_damping * dt).max(0.0);
    }

    /// Pull a body that overshot the rope back onto it and drop the outward
    /// part of its velocity.
    fn hold_rope(&mut self) {
        let Some(rope) = &self.rope else {
            return;
        };
        let length = rope.length;
        let Some(anchor) = rope.anchor.upgrade() else {
            tracing::debug!("rope anchor dropped, body is free");
            self.rope = None;
            return;
        };
        let anchor = anchor.position();
        let offset = self.frame.position() - anchor;
        let distance = offset.length();
        if distance <= length || distance <= f32::EPSILON {
            return;
        }
        let outward = offset / distance;
        self.frame.set_world_position(anchor + outward * length);
        let radial = self.linear_velocity.dot(outward);
        if radial > 0.0 {
            self.linear_velocity -= outward * radial;
        }
    }
}

impl RigidBody for SimBody {
    fn id(&self) -> BodyId {
        self.id
    }

    fn pose(&self) -> Pose {
        self.frame.world_pose()
    }

    fn is_kinematic(&self) -> bool {
        self.kinematic
    }

    fn set_kinematic(&mut self, kinematic: bool) {
        if kinematic {
            self.linear_velocity = Vec3::ZERO;
            self.angular_velocity = Vec3::ZERO;
        }
        self.kinematic = kinematic;
    }

    fn apply_impulse(&mut self, impulse: Vec3, at_point: Vec3) {
        self.log.push(Impulse::Linear { impulse, at_point });
        if self.kinematic {
            tracing::debug!("impulse on kinematic body ignored");
            return;
        }
        self.linear_velocity += impulse / self.mass;
        let lever = at_point - self.frame.position();
        self.angular_velocity += lever.cross(impulse) / self.inertia;
    }

    fn apply_angular_impulse(&mut self, torque: Vec3) {
        self.log.push(Impulse::Angular { torque });
        if self.kinematic {
            return;
        }
        self.angular_velocity += torque / self.inertia;
    }
}
