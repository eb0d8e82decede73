//! One-shot post-placement correction of anchor height and orientation,
//! followed by delayed activation of physics and the tether.

use std::rc::Rc;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::object::PlacedObject;
use crate::pose::euler_degrees;
use crate::scene::PlacementReticle;
use crate::schedule::{Scheduler, TimerStatus};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    /// Anchor height an object is lifted to when placed too low.
    pub desired_anchor_height: f32,
    pub min_acceptable_anchor_height: f32,
    /// Euler degrees for an object that did not need lifting.
    pub ceiling_rotation: Vec3,
    /// Euler degrees for an object that was lifted.
    pub floor_rotation: Vec3,
    /// Seconds between correction and physics/tether activation.
    pub activation_delay: f64,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            desired_anchor_height: 2.3,
            min_acceptable_anchor_height: 1.0,
            ceiling_rotation: Vec3::new(0.0, 180.0, 0.0),
            floor_rotation: Vec3::ZERO,
            activation_delay: 0.15,
        }
    }
}

/// Result of one correction run.
#[derive(Clone, Debug)]
pub struct Correction {
    pub was_elevated: bool,
    /// Anchor height after correction.
    pub anchor_height: f32,
    /// The pending activation step. Observable only; once scheduled it runs.
    pub activation: TimerStatus,
}

#[derive(Clone, Debug, Default)]
pub struct AnchorCorrector {
    config: AnchorConfig,
}

impl AnchorCorrector {
    pub fn new(config: AnchorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnchorConfig {
        &self.config
    }

    /// Correct a freshly placed object and schedule its activation.
    ///
    /// Returns `None` if this object was already corrected. The orientation
    /// choice follows elevation alone: lifted objects get the floor rotation,
    /// the rest get the ceiling rotation, whatever surface they came from.
    pub fn correct(
        &self,
        object: &Rc<PlacedObject>,
        reticle: Option<&mut dyn PlacementReticle>,
        scheduler: &mut Scheduler,
    ) -> Option<Correction> {
        let mut state = object.state();
        if state.activated {
            tracing::debug!(object = %object.id(), "anchor already corrected");
            return None;
        }

        let height = object.anchor().position().y;
        let was_elevated = height < self.config.min_acceptable_anchor_height;
        if was_elevated {
            let lift = self.config.desired_anchor_height - height;
            object.root().translate_world(Vec3::Y * lift);
            tracing::info!(lift, "anchor elevated");
        } else {
            tracing::debug!(height, "anchor at acceptable height");
        }

        let euler = if was_elevated {
            self.config.floor_rotation
        } else {
            self.config.ceiling_rotation
        };
        object.root().set_local_rotation(euler_degrees(euler));

        match reticle {
            Some(r) => r.set_active(false),
            None => tracing::warn!("no placement reticle to hide"),
        }

        if let Some(body) = object.body() {
            body.borrow_mut().set_kinematic(true);
        }

        state.anchor_pose = object.anchor().world_pose();
        state.height = state.anchor_pose.position.y;
        state.was_elevated = was_elevated;
        state.activated = true;
        object.set_state(state);

        let weak = Rc::downgrade(object);
        let activation = scheduler.after(
            "anchor-activation",
            self.config.activation_delay,
            move || match weak.upgrade() {
                Some(object) => object.release(),
                None => {
                    tracing::debug!("placed object gone before activation");
                    Ok(())
                }
            },
        );

        Some(Correction {
            was_elevated,
            anchor_height: state.height,
            activation: activation.status(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::pose::{FrameHandle, Pose};
    use crate::scene::{BodyId, RigidBody, SharedBody};
    use crate::tether::{TetherConfig, TetherRenderer};
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use std::cell::RefCell;

    struct FrozenBody {
        id: BodyId,
        kinematic: bool,
    }

    impl RigidBody for FrozenBody {
        fn id(&self) -> BodyId {
            self.id
        }
        fn pose(&self) -> Pose {
            Pose::IDENTITY
        }
        fn is_kinematic(&self) -> bool {
            self.kinematic
        }
        fn set_kinematic(&mut self, kinematic: bool) {
            self.kinematic = kinematic;
        }
        fn apply_impulse(&mut self, _impulse: Vec3, _at_point: Vec3) {}
        fn apply_angular_impulse(&mut self, _torque: Vec3) {}
    }

    struct Reticle(bool);

    impl PlacementReticle for Reticle {
        fn set_active(&mut self, active: bool) {
            self.0 = active;
        }
    }

    fn body() -> Rc<RefCell<FrozenBody>> {
        Rc::new(RefCell::new(FrozenBody {
            id: BodyId::new(),
            kinematic: false,
        }))
    }

    /// Root at `root_y` with the anchor 0.5m above it.
    fn object(root_y: f32) -> PlacedObject {
        let root = FrameHandle::root("pinata", Pose::from_position(Vec3::new(0.0, root_y, 0.0)));
        let anchor = root.child("anchor", Pose::from_position(Vec3::new(0.0, 0.5, 0.0)));
        PlacedObject::new(root, anchor)
    }

    #[test]
    fn test_high_anchor_untouched_gets_ceiling_rotation() {
        let obj = Rc::new(object(1.8));
        let mut sched = Scheduler::new();
        let mut reticle = Reticle(true);
        let c = AnchorCorrector::default()
            .correct(&obj, Some(&mut reticle), &mut sched)
            .unwrap();

        assert!(!c.was_elevated);
        assert_relative_eq!(c.anchor_height, 2.3, epsilon = 1e-6);
        assert_eq!(
            obj.root().local_pose().rotation,
            euler_degrees(Vec3::new(0.0, 180.0, 0.0))
        );
        assert!(!reticle.0, "reticle hidden");
    }

    #[test]
    fn test_low_anchor_lifted_to_desired_height() {
        let obj = Rc::new(object(-0.2));
        let mut sched = Scheduler::new();
        let c = AnchorCorrector::default().correct(&obj, None, &mut sched).unwrap();

        assert!(c.was_elevated);
        assert_relative_eq!(obj.anchor().position().y, 2.3, epsilon = 1e-5);
        assert_relative_eq!(obj.root().position().y, 1.8, epsilon = 1e-5);
        assert_eq!(obj.root().local_pose().rotation, euler_degrees(Vec3::ZERO));
        assert!(obj.state().was_elevated);
    }

    #[test]
    fn test_runs_once() {
        let obj = Rc::new(object(0.0));
        let mut sched = Scheduler::new();
        let corrector = AnchorCorrector::default();
        assert!(corrector.correct(&obj, None, &mut sched).is_some());
        assert!(corrector.correct(&obj, None, &mut sched).is_none());
        assert_eq!(sched.pending(), 1);
        assert_relative_eq!(obj.anchor().position().y, 2.3, epsilon = 1e-5);
    }

    #[test]
    fn test_activation_after_delay_releases_and_arms() {
        let b = body();
        let tether = TetherRenderer::shared(TetherConfig::default());
        let shared: SharedBody = b.clone();
        let obj = Rc::new(object(1.8).with_body(shared).with_tether(Rc::clone(&tether)));
        let mut sched = Scheduler::new();
        let c = AnchorCorrector::default().correct(&obj, None, &mut sched).unwrap();

        assert!(b.borrow().kinematic, "frozen while waiting");
        assert!(sched.advance(0.1).is_empty());
        assert!(!tether.borrow().is_armed());
        assert!(c.activation.is_pending());

        assert!(sched.advance(0.1).is_empty());
        assert!(!c.activation.is_pending());
        assert!(!b.borrow().kinematic);
        let t = tether.borrow();
        let ends = t.endpoints().unwrap();
        assert!(ends.anchor.ptr_eq(obj.anchor()));
        assert!(ends.hook.ptr_eq(obj.root()), "no override: hook is root");
        assert!(obj.state().released);
    }

    #[test]
    fn test_hook_override_used() {
        let root = FrameHandle::root("pinata", Pose::from_position(Vec3::Y * 2.0));
        let anchor = root.child("anchor", Pose::from_position(Vec3::Y * 0.5));
        let hook = root.child("hook", Pose::from_position(Vec3::Y * 0.2));
        let tether = TetherRenderer::shared(TetherConfig::default());
        let obj = Rc::new(
            PlacedObject::new(root, anchor)
                .with_body(body())
                .with_tether(Rc::clone(&tether))
                .with_hook(hook.clone()),
        );
        let mut sched = Scheduler::new();
        AnchorCorrector::default().correct(&obj, None, &mut sched);
        sched.advance(1.0);
        assert!(tether.borrow().endpoints().unwrap().hook.ptr_eq(&hook));
    }

    #[test]
    fn test_missing_tether_aborts_without_releasing_body() {
        let b = body();
        let shared: SharedBody = b.clone();
        let obj = Rc::new(object(1.8).with_body(shared));
        let mut sched = Scheduler::new();
        AnchorCorrector::default().correct(&obj, None, &mut sched);

        let errors = sched.advance(1.0);
        assert_eq!(errors, vec![CoreError::ConfigurationMissing("tether renderer")]);
        assert!(b.borrow().kinematic, "body stays frozen");
        assert!(!obj.state().released);
    }

    #[test]
    fn test_missing_body_aborts_without_arming_tether() {
        let tether = TetherRenderer::shared(TetherConfig::default());
        let obj = Rc::new(object(1.8).with_tether(Rc::clone(&tether)));
        let mut sched = Scheduler::new();
        AnchorCorrector::default().correct(&obj, None, &mut sched);

        let errors = sched.advance(1.0);
        assert_eq!(errors, vec![CoreError::ConfigurationMissing("rigid body")]);
        assert!(!tether.borrow().is_armed());
    }

    #[test]
    fn test_destroyed_object_activation_is_noop() {
        let tether = TetherRenderer::shared(TetherConfig::default());
        let obj = Rc::new(object(1.8).with_body(body()).with_tether(Rc::clone(&tether)));
        let mut sched = Scheduler::new();
        AnchorCorrector::default().correct(&obj, None, &mut sched);
        drop(obj);

        assert!(sched.advance(1.0).is_empty());
        assert!(!tether.borrow().is_armed());
    }

    proptest! {
        #[test]
        fn prop_height_threshold(anchor_h in -2.0f32..5.0) {
            let obj = Rc::new(object(anchor_h - 0.5));
            let start_h = obj.anchor().position().y;
            let mut sched = Scheduler::new();
            let config = AnchorConfig::default();
            let c = AnchorCorrector::new(config.clone()).correct(&obj, None, &mut sched).unwrap();
            let out = obj.anchor().position().y;

            if start_h < config.min_acceptable_anchor_height {
                prop_assert!(c.was_elevated);
                prop_assert!((out - config.desired_anchor_height).abs() < 1e-4);
                prop_assert_eq!(obj.root().local_pose().rotation, euler_degrees(config.floor_rotation));
            } else {
                prop_assert!(!c.was_elevated);
                prop_assert!((out - start_h).abs() < 1e-4);
                prop_assert_eq!(obj.root().local_pose().rotation, euler_degrees(config.ceiling_rotation));
            }
        }
    }
}
