//! One AR scene's worth of state: placement, anchoring, tether, strikes,
//! haptics and manipulation, driven by the host's frame loop.

use std::rc::Rc;

use glam::Vec2;

use crate::anchor::{AnchorCorrector, Correction};
use crate::camera::Camera;
use crate::config::PinataConfig;
use crate::error::{CoreError, Result};
use crate::haptics::{HapticCategory, HapticDispatcher};
use crate::interaction::{GestureSample, InputDevice, InteractionContext, InteractionModel, Outcome};
use crate::manipulation::{
    FrameManipulator, ManipulationCoordinator, ManipulationDelta, ManipulationKind,
};
use crate::object::PlacedObject;
use crate::placement::{Placement, PlacementResolver};
use crate::scene::{AudioSink, PlaneQuery, PlacementReticle, SceneRaycast, TactileOutput};
use crate::schedule::{FrameClock, Scheduler};
use crate::tether::{SharedTether, TetherRenderer};

/// Instantiates the target at a resolved placement.
pub trait ObjectSpawner {
    fn spawn(&mut self, placement: &Placement) -> Result<PlacedObject>;
}

/// Scene-lifecycle cleanup hooks, invoked on teardown.
pub trait CleanupService {
    fn before_scene_change(&mut self);
    fn on_scene_unloaded(&mut self, scene: &str);
}

#[derive(Clone, Debug)]
pub enum PlacementOutcome {
    Placed {
        placement: Placement,
        correction: Option<Correction>,
    },
    /// An object already exists; the tap was ignored.
    Locked,
}

type PlacedCallback = Box<dyn FnMut(&PlacedObject)>;

pub struct Session {
    resolver: PlacementResolver,
    corrector: AnchorCorrector,
    tether: SharedTether,
    interaction: InteractionModel,
    haptics: HapticDispatcher,
    scheduler: Scheduler,
    manipulation: ManipulationCoordinator,
    manipulator: Option<FrameManipulator>,
    object: Option<Rc<PlacedObject>>,
    on_placed: Vec<PlacedCallback>,
    reticle: Option<Box<dyn PlacementReticle>>,
    cleanup: Option<Box<dyn CleanupService>>,
}

impl Session {
    pub fn new(config: PinataConfig) -> Result<Self> {
        Self::with_clock(config, FrameClock::new())
    }

    pub fn with_clock(config: PinataConfig, clock: FrameClock) -> Result<Self> {
        config.validate()?;
        let PinataConfig {
            placement,
            anchor,
            tether,
            force,
            feedback,
            haptics,
        } = config;
        Ok(Self {
            resolver: PlacementResolver::new(placement),
            corrector: AnchorCorrector::new(anchor),
            tether: TetherRenderer::shared(tether),
            interaction: InteractionModel::new(force, feedback),
            haptics: HapticDispatcher::new(haptics, clock.clone()),
            scheduler: Scheduler::with_clock(clock),
            manipulation: ManipulationCoordinator::new(),
            manipulator: None,
            object: None,
            on_placed: Vec::new(),
            reticle: None,
            cleanup: None,
        })
    }

    pub fn set_reticle(&mut self, reticle: Box<dyn PlacementReticle>) {
        self.reticle = Some(reticle);
    }

    pub fn set_cleanup(&mut self, cleanup: Box<dyn CleanupService>) {
        self.cleanup = Some(cleanup);
    }

    pub fn set_tactile_output(&mut self, output: Option<Box<dyn TactileOutput>>) {
        self.haptics.set_output(output);
    }

    /// Register a listener for completed placements.
    pub fn on_placed(&mut self, f: impl FnMut(&PlacedObject) + 'static) {
        self.on_placed.push(Box::new(f));
    }

    pub fn now(&self) -> f64 {
        self.scheduler.now()
    }

    pub fn clock(&self) -> FrameClock {
        self.scheduler.clock()
    }

    pub fn object(&self) -> Option<&Rc<PlacedObject>> {
        self.object.as_ref()
    }

    pub fn tether(&self) -> &SharedTether {
        &self.tether
    }

    pub fn haptics(&self) -> &HapticDispatcher {
        &self.haptics
    }

    pub fn interaction(&self) -> &InteractionModel {
        &self.interaction
    }

    pub fn manipulator(&self) -> Option<&FrameManipulator> {
        self.manipulator.as_ref()
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    /// Resolve a placement tap, spawn the target and start its anchoring.
    /// Once an object exists every further tap is refused until teardown.
    pub fn place(
        &mut self,
        tap: Vec2,
        viewer: &Camera,
        planes: &dyn PlaneQuery,
        scene: &dyn SceneRaycast,
        spawner: &mut dyn ObjectSpawner,
    ) -> Result<PlacementOutcome> {
        if self.object.is_some() {
            tracing::debug!(?tap, "placement locked, object already placed");
            return Ok(PlacementOutcome::Locked);
        }

        let placement = self.resolver.resolve(tap, viewer, planes, scene)?;
        let object = spawner
            .spawn(&placement)?
            .with_tether(Rc::clone(&self.tether));
        let object = Rc::new(object);
        tracing::info!(object = %object.id(), path = %placement.path, "object placed");

        for listener in &mut self.on_placed {
            listener(&object);
        }

        let reticle: Option<&mut dyn PlacementReticle> = match self.reticle.as_mut() {
            Some(r) => Some(r.as_mut()),
            None => None,
        };
        let correction = self.corrector.correct(&object, reticle, &mut self.scheduler);

        self.manipulator = Some(FrameManipulator::new(object.root().clone()));
        self.object = Some(object);
        Ok(PlacementOutcome::Placed {
            placement,
            correction,
        })
    }

    /// Per-frame update: run due continuations, then redraw the tether.
    /// Returns the failures of continuations that ran this frame.
    pub fn tick(&mut self, dt: f64, viewer: &Camera) -> Vec<CoreError> {
        let errors = self.scheduler.advance(dt);
        self.tether.borrow_mut().update(viewer);
        errors
    }

    pub fn press(&mut self, device: InputDevice, position: Vec2) {
        let now = self.scheduler.now();
        self.interaction.press(device, position, now);
    }

    /// Finish a press on `device`. `None` if nothing was pressed or no target
    /// body exists yet.
    pub fn release(
        &mut self,
        device: InputDevice,
        position: Vec2,
        viewer: &Camera,
        scene: &dyn SceneRaycast,
        audio: Option<&mut dyn AudioSink>,
    ) -> Option<Outcome> {
        let Some(body) = self.object.as_ref().and_then(|o| o.body()).cloned() else {
            tracing::debug!(?device, "release with no target body");
            self.interaction.cancel(device);
            return None;
        };
        let now = self.scheduler.now();
        let mut target = body.borrow_mut();
        let mut ctx = InteractionContext {
            viewer,
            scene,
            target: &mut *target,
            audio: audio.map(|a| a as &mut dyn AudioSink),
            haptics: Some(&mut self.haptics),
        };
        self.interaction.release(device, position, now, &mut ctx)
    }

    /// Resolve an already-measured gesture against the target.
    pub fn on_gesture_release(
        &mut self,
        sample: GestureSample,
        viewer: &Camera,
        scene: &dyn SceneRaycast,
        audio: Option<&mut dyn AudioSink>,
    ) -> Option<Outcome> {
        let body = self.object.as_ref().and_then(|o| o.body()).cloned()?;
        let mut target = body.borrow_mut();
        let mut ctx = InteractionContext {
            viewer,
            scene,
            target: &mut *target,
            audio: audio.map(|a| a as &mut dyn AudioSink),
            haptics: Some(&mut self.haptics),
        };
        Some(self.interaction.on_gesture_release(sample, &mut ctx))
    }

    pub fn request_haptic(&mut self, category: HapticCategory) -> bool {
        self.haptics.request(category)
    }

    pub fn begin_manipulation(&mut self, kind: ManipulationKind) -> bool {
        let Some(target) = self.manipulator.as_mut() else {
            return false;
        };
        self.manipulation
            .begin(kind, target, Some(&mut self.haptics))
    }

    pub fn update_manipulation(&mut self, kind: ManipulationKind, delta: ManipulationDelta) -> bool {
        let Some(target) = self.manipulator.as_mut() else {
            return false;
        };
        self.manipulation
            .update(kind, delta, target, Some(&mut self.haptics))
    }

    pub fn end_manipulation(&mut self, kind: ManipulationKind) -> bool {
        let Some(target) = self.manipulator.as_mut() else {
            return false;
        };
        self.manipulation.end(kind, target, Some(&mut self.haptics))
    }

    /// Leave the scene: stop the tether, drop the placed object and run the
    /// cleanup hooks. A pending activation for the dropped object becomes a
    /// no-op. Placement is unlocked afterwards.
    pub fn teardown(&mut self, scene: &str) {
        if let Some(cleanup) = self.cleanup.as_mut() {
            cleanup.before_scene_change();
        }
        self.tether.borrow_mut().stop();
        if let Some(kind) = self.manipulation.active()
            && let Some(target) = self.manipulator.as_mut()
        {
            self.manipulation.end(kind, target, None);
        }
        self.manipulator = None;
        if let Some(object) = self.object.take() {
            tracing::info!(object = %object.id(), scene, "placed object dropped");
        }
        if let Some(reticle) = self.reticle.as_mut() {
            reticle.set_active(true);
        }
        if let Some(cleanup) = self.cleanup.as_mut() {
            cleanup.on_scene_unloaded(scene);
        }
    }
}
