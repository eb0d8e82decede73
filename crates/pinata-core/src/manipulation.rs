//! Scale / rotate / translate manipulation of a placed object, one kind at
//! a time.

use glam::{Quat, Vec3};

use crate::haptics::HapticDispatcher;
use crate::pose::FrameHandle;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ManipulationKind {
    Scale,
    Rotate,
    Translate,
}

impl ManipulationKind {
    pub const ALL: [ManipulationKind; 3] = [
        ManipulationKind::Scale,
        ManipulationKind::Rotate,
        ManipulationKind::Translate,
    ];
}

/// Incremental change reported by a continuing gesture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ManipulationDelta {
    None,
    /// Multiplicative scale factor.
    Scale(f32),
    /// Yaw in degrees about world up.
    Rotate(f32),
    /// World-space translation.
    Translate(Vec3),
}

impl ManipulationDelta {
    pub fn kind(&self) -> Option<ManipulationKind> {
        match self {
            ManipulationDelta::None => None,
            ManipulationDelta::Scale(_) => Some(ManipulationKind::Scale),
            ManipulationDelta::Rotate(_) => Some(ManipulationKind::Rotate),
            ManipulationDelta::Translate(_) => Some(ManipulationKind::Translate),
        }
    }
}

/// Something a manipulation gesture can drive.
pub trait Manipulable {
    fn on_start(&mut self, kind: ManipulationKind);
    fn on_continue(&mut self, kind: ManipulationKind, delta: ManipulationDelta);
    fn on_end(&mut self, kind: ManipulationKind);
}

/// Applies manipulation deltas to a live frame.
#[derive(Debug)]
pub struct FrameManipulator {
    frame: FrameHandle,
    scale: f32,
    min_scale: f32,
    max_scale: f32,
}

impl FrameManipulator {
    pub fn new(frame: FrameHandle) -> Self {
        Self {
            frame,
            scale: 1.0,
            min_scale: 0.25,
            max_scale: 4.0,
        }
    }

    pub fn with_scale_limits(mut self, min: f32, max: f32) -> Self {
        self.min_scale = min;
        self.max_scale = max.max(min);
        self
    }

    pub fn frame(&self) -> &FrameHandle {
        &self.frame
    }

    /// Accumulated uniform scale. Frames carry no scale, so the host reads it
    /// from here.
    pub fn scale(&self) -> f32 {
        self.scale
    }
}

impl Manipulable for FrameManipulator {
    fn on_start(&mut self, kind: ManipulationKind) {
        tracing::debug!(?kind, frame = %self.frame.name(), "manipulation started");
    }

    fn on_continue(&mut self, kind: ManipulationKind, delta: ManipulationDelta) {
        if delta.kind() != Some(kind) {
            return;
        }
        match delta {
            ManipulationDelta::Scale(factor) if factor > 0.0 => {
                self.scale = (self.scale * factor).clamp(self.min_scale, self.max_scale);
            }
            ManipulationDelta::Rotate(degrees) => {
                let mut local = self.frame.local_pose();
                local.rotation = Quat::from_rotation_y(degrees.to_radians()) * local.rotation;
                self.frame.set_local_pose(local);
            }
            ManipulationDelta::Translate(delta) => self.frame.translate_world(delta),
            _ => {}
        }
    }

    fn on_end(&mut self, kind: ManipulationKind) {
        tracing::debug!(?kind, frame = %self.frame.name(), "manipulation ended");
    }
}

/// Mutual exclusion between manipulation kinds, with haptic accents:
/// a heavy pulse on start and end, a medium pulse per continue.
#[derive(Debug, Default)]
pub struct ManipulationCoordinator {
    active: Option<ManipulationKind>,
}

impl ManipulationCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<ManipulationKind> {
        self.active
    }

    pub fn is_enabled(&self, kind: ManipulationKind) -> bool {
        self.active.is_none_or(|active| active == kind)
    }

    /// Start a gesture. Refused while a different kind is active.
    pub fn begin(
        &mut self,
        kind: ManipulationKind,
        target: &mut dyn Manipulable,
        haptics: Option<&mut HapticDispatcher>,
    ) -> bool {
        if !self.is_enabled(kind) {
            tracing::debug!(?kind, active = ?self.active, "manipulation refused");
            return false;
        }
        self.active = Some(kind);
        target.on_start(kind);
        if let Some(h) = haptics {
            h.heavy();
        }
        true
    }

    /// Forward a delta for the active kind; ignored for any other kind.
    pub fn update(
        &mut self,
        kind: ManipulationKind,
        delta: ManipulationDelta,
        target: &mut dyn Manipulable,
        haptics: Option<&mut HapticDispatcher>,
    ) -> bool {
        if self.active != Some(kind) {
            return false;
        }
        target.on_continue(kind, delta);
        if let Some(h) = haptics {
            h.medium();
        }
        true
    }

    /// End the active gesture and re-enable every kind.
    pub fn end(
        &mut self,
        kind: ManipulationKind,
        target: &mut dyn Manipulable,
        haptics: Option<&mut HapticDispatcher>,
    ) -> bool {
        if self.active != Some(kind) {
            return false;
        }
        self.active = None;
        target.on_end(kind);
        if let Some(h) = haptics {
            h.heavy();
        }
        true
    }
}
