//! Press/release gestures resolved into strikes on the target body.
//!
//! A release is classified once: a miss if the ray through the press point
//! does not hit the target, a tap if the press was short and still, a swipe
//! otherwise. Taps push away from the viewer; swipes push along the swipe
//! as seen at the hit depth, with spin about the axis across the swipe.

use std::collections::HashMap;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::constants::TAP_MIN_LIFT;
use crate::haptics::{HapticCategory, HapticDispatcher};
use crate::scene::{AudioCue, AudioSink, LayerMask, RigidBody, SceneRaycast};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
    /// Impulse magnitude of a tap.
    pub tap_force: f32,
    pub swipe_force_multiplier: f32,
    pub swipe_torque_multiplier: f32,
    /// Screen distance in pixels a press may move and still be a tap.
    pub min_swipe_distance: f32,
    /// Seconds a press may last and still be a tap.
    pub max_tap_duration: f64,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            tap_force: 7.0,
            swipe_force_multiplier: 20.0,
            swipe_torque_multiplier: 5.0,
            min_swipe_distance: 50.0,
            max_tap_duration: 0.2,
        }
    }
}

/// Haptic category issued per strike kind; `None` disables it. In config
/// files the category is written by name, or `"None"`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    #[serde(with = "optional_category")]
    pub tap_haptic: Option<HapticCategory>,
    #[serde(with = "optional_category")]
    pub swipe_haptic: Option<HapticCategory>,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            tap_haptic: Some(HapticCategory::LightImpact),
            swipe_haptic: Some(HapticCategory::MediumImpact),
        }
    }
}

mod optional_category {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::haptics::HapticCategory;

    pub fn serialize<S: Serializer>(
        value: &Option<HapticCategory>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(category) => category.serialize(serializer),
            None => serializer.serialize_str("None"),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<HapticCategory>, D::Error> {
        let name = String::deserialize(deserializer)?;
        if name.eq_ignore_ascii_case("none") {
            return Ok(None);
        }
        HapticCategory::ALL
            .into_iter()
            .find(|c| format!("{c:?}") == name)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("unknown haptic category `{name}`")))
    }
}

/// One press/release cycle in screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureSample {
    pub start: Vec2,
    pub end: Vec2,
    /// Seconds between press and release.
    pub duration: f64,
}

impl GestureSample {
    pub fn distance(&self) -> f32 {
        self.start.distance(self.end)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureKind {
    Miss,
    Tap,
    Swipe,
}

/// Impulses delivered to the target by one strike.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Strike {
    pub point: Vec3,
    pub impulse: Vec3,
    /// Angular impulse; zero for taps.
    pub torque: Vec3,
    /// Haptic category issued, and whether the dispatcher accepted it.
    pub haptic: Option<(HapticCategory, bool)>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Outcome {
    Miss,
    Tap(Strike),
    Swipe(Strike),
}

impl Outcome {
    pub fn kind(&self) -> GestureKind {
        match self {
            Outcome::Miss => GestureKind::Miss,
            Outcome::Tap(_) => GestureKind::Tap,
            Outcome::Swipe(_) => GestureKind::Swipe,
        }
    }

    pub fn strike(&self) -> Option<&Strike> {
        match self {
            Outcome::Miss => None,
            Outcome::Tap(s) | Outcome::Swipe(s) => Some(s),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputDevice {
    Touch,
    Mouse,
}

#[derive(Clone, Copy, Debug)]
struct Press {
    position: Vec2,
    time: f64,
}

/// Everything a release needs from the frame it happens in.
pub struct InteractionContext<'a> {
    pub viewer: &'a Camera,
    pub scene: &'a dyn SceneRaycast,
    pub target: &'a mut dyn RigidBody,
    pub audio: Option<&'a mut dyn AudioSink>,
    pub haptics: Option<&'a mut HapticDispatcher>,
}

impl InteractionContext<'_> {
    fn play(&mut self, cue: AudioCue) {
        if let Some(audio) = self.audio.as_deref_mut() {
            audio.play_one_shot(cue);
        }
    }

    fn haptic(&mut self, category: Option<HapticCategory>) -> Option<(HapticCategory, bool)> {
        let category = category?;
        let accepted = self
            .haptics
            .as_deref_mut()
            .map(|d| d.request(category))
            .unwrap_or(false);
        Some((category, accepted))
    }
}

#[derive(Debug, Default)]
pub struct InteractionModel {
    force: ForceConfig,
    feedback: FeedbackConfig,
    presses: HashMap<InputDevice, Press>,
}

impl InteractionModel {
    pub fn new(force: ForceConfig, feedback: FeedbackConfig) -> Self {
        Self {
            force,
            feedback,
            presses: HashMap::new(),
        }
    }

    pub fn force_config(&self) -> &ForceConfig {
        &self.force
    }

    pub fn is_pressed(&self, device: InputDevice) -> bool {
        self.presses.contains_key(&device)
    }

    /// Idle → Pressed. A second press without release restarts the gesture.
    pub fn press(&mut self, device: InputDevice, position: Vec2, now: f64) {
        self.presses.insert(device, Press { position, time: now });
    }

    /// Drop a press without dispatching anything.
    pub fn cancel(&mut self, device: InputDevice) {
        self.presses.remove(&device);
    }

    /// Pressed → Idle, dispatching exactly one outcome. A release with no
    /// recorded press is ignored.
    pub fn release(
        &mut self,
        device: InputDevice,
        position: Vec2,
        now: f64,
        ctx: &mut InteractionContext<'_>,
    ) -> Option<Outcome> {
        let press = self.presses.remove(&device)?;
        let sample = GestureSample {
            start: press.position,
            end: position,
            duration: (now - press.time).max(0.0),
        };
        Some(self.on_gesture_release(sample, ctx))
    }

    /// Classify a gesture given whether its press point hit the target.
    pub fn classify(&self, sample: &GestureSample, hit_target: bool) -> GestureKind {
        if !hit_target {
            GestureKind::Miss
        } else if sample.duration < self.force.max_tap_duration
            && sample.distance() < self.force.min_swipe_distance
        {
            GestureKind::Tap
        } else {
            GestureKind::Swipe
        }
    }

    /// Resolve one finished gesture against the target.
    pub fn on_gesture_release(
        &self,
        sample: GestureSample,
        ctx: &mut InteractionContext<'_>,
    ) -> Outcome {
        let ray = ctx.viewer.screen_point_to_ray(sample.start);
        let target_id = ctx.target.id();
        let hit = ctx
            .scene
            .raycast(&ray, f32::INFINITY, LayerMask::ALL)
            .filter(|h| h.body == Some(target_id));

        let Some(hit) = hit else {
            ctx.play(AudioCue::Miss);
            tracing::debug!(start = ?sample.start, "strike missed");
            return Outcome::Miss;
        };

        match self.classify(&sample, true) {
            GestureKind::Tap => {
                let impulse = self.tap_impulse(ctx.viewer.position(), hit.point);
                ctx.target.apply_impulse(impulse, hit.point);
                ctx.play(AudioCue::Tap);
                let haptic = ctx.haptic(self.feedback.tap_haptic);
                tracing::debug!(point = ?hit.point, ?impulse, "tap");
                Outcome::Tap(Strike {
                    point: hit.point,
                    impulse,
                    torque: Vec3::ZERO,
                    haptic,
                })
            }
            _ => {
                let up = ctx.target.pose().up();
                let (impulse, torque) = self.swipe_impulses(ctx.viewer, &sample, hit.point, up);
                ctx.target.apply_impulse(impulse, hit.point);
                ctx.play(AudioCue::Swipe);
                ctx.target.apply_angular_impulse(torque);
                let haptic = ctx.haptic(self.feedback.swipe_haptic);
                tracing::debug!(point = ?hit.point, ?impulse, ?torque, "swipe");
                Outcome::Swipe(Strike {
                    point: hit.point,
                    impulse,
                    torque,
                    haptic,
                })
            }
        }
    }

    /// Tap impulse: away from the viewer, never pointing down.
    pub fn tap_impulse(&self, viewer_position: Vec3, hit_point: Vec3) -> Vec3 {
        let mut direction = (hit_point - viewer_position).normalize_or_zero();
        if direction.y < 0.0 {
            direction.y = TAP_MIN_LIFT;
        }
        direction.normalize_or_zero() * self.force.tap_force
    }

    /// Swipe linear and angular impulses. Both scale with how many tap
    /// thresholds the swipe travelled on screen.
    pub fn swipe_impulses(
        &self,
        viewer: &Camera,
        sample: &GestureSample,
        hit_point: Vec3,
        target_up: Vec3,
    ) -> (Vec3, Vec3) {
        let depth = viewer.world_to_screen(hit_point).z;
        let world_start = viewer.screen_to_world(sample.start, depth);
        let world_end = viewer.screen_to_world(sample.end, depth);
        let direction = (world_end - world_start).normalize_or_zero();

        let travel = sample.distance() / self.force.min_swipe_distance;
        let impulse = direction * (self.force.swipe_force_multiplier * travel);
        let axis = direction.cross(target_up).normalize_or_zero();
        let torque = axis * (self.force.swipe_torque_multiplier * travel);
        (impulse, torque)
    }
}
