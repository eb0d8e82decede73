//! Pinata AR engine: tap-to-place resolution with a ceiling / virtual
//! ceiling / floor fallback, one-shot anchor correction, a sagging tether
//! between live frames, strike classification into impulses and torque, and
//! cooldown-gated haptics.
//!
//! Zero I/O. Plane tracking, collision, rigid bodies, tactile output and
//! audio sit behind the traits in [`scene`]; all work runs on the host's
//! single frame loop through [`schedule::Scheduler`].

pub mod anchor;
pub mod camera;
pub mod config;
pub mod constants;
pub mod curve;
pub mod error;
pub mod haptics;
pub mod interaction;
pub mod manipulation;
pub mod object;
pub mod placement;
pub mod plane;
pub mod pose;
pub mod scene;
pub mod schedule;
pub mod session;
pub mod tether;

pub use anchor::{AnchorConfig, AnchorCorrector, Correction};
pub use camera::{Camera, Ray};
pub use config::PinataConfig;
pub use constants::{EPSILON, TAP_MIN_LIFT};
pub use curve::{IntensityCurve, Keyframe};
pub use error::{CoreError, Result};
pub use haptics::{HapticCategory, HapticClip, HapticConfig, HapticDispatcher, HapticStats};
pub use interaction::{
    FeedbackConfig, ForceConfig, GestureKind, GestureSample, InputDevice, InteractionContext,
    InteractionModel, Outcome, Strike,
};
pub use manipulation::{
    FrameManipulator, Manipulable, ManipulationCoordinator, ManipulationDelta, ManipulationKind,
};
pub use object::{AnchorState, PlacedObject};
pub use placement::{Placement, PlacementConfig, PlacementPath, PlacementResolver};
pub use plane::{Plane, PlaneClassification, PlaneHit, PlaneStyle, PlaneVisibility, PlaneVisibilityFilter};
pub use pose::{FrameHandle, Pose, WeakFrame, euler_degrees};
pub use scene::{
    AudioCue, AudioSink, BodyId, LayerMask, PlacementReticle, PlaneQuery, RaycastHit, RigidBody,
    SceneRaycast, SharedBody, TactileOutput,
};
pub use schedule::{FrameClock, Scheduler, TimerHandle, TimerStatus};
pub use session::{CleanupService, ObjectSpawner, PlacementOutcome, Session};
pub use tether::{SharedTether, TetherConfig, TetherEndpoints, TetherRenderer, tether_points};
