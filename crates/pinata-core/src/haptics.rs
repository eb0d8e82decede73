//! Cooldown-gated tactile feedback.
//!
//! Each impact intensity has its own cooldown; the three notification
//! categories share one, so mixed notifications in quick succession still
//! throttle as a group. A throttled request is a silent `false`.

use serde::{Deserialize, Serialize};

use crate::constants::{LIGHT_INTENSITY_MAX, MEDIUM_INTENSITY_MAX};
use crate::curve::IntensityCurve;
use crate::scene::TactileOutput;
use crate::schedule::FrameClock;

/// Tactile category. Discriminants are the platform indices passed to
/// [`TactileOutput::play`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum HapticCategory {
    LightImpact = 0,
    MediumImpact = 1,
    HeavyImpact = 2,
    Success = 3,
    Warning = 4,
    Error = 5,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CooldownGroup {
    Light,
    Medium,
    Heavy,
    Notification,
}

impl CooldownGroup {
    fn slot(self) -> usize {
        match self {
            CooldownGroup::Light => 0,
            CooldownGroup::Medium => 1,
            CooldownGroup::Heavy => 2,
            CooldownGroup::Notification => 3,
        }
    }
}

impl HapticCategory {
    pub const ALL: [HapticCategory; 6] = [
        HapticCategory::LightImpact,
        HapticCategory::MediumImpact,
        HapticCategory::HeavyImpact,
        HapticCategory::Success,
        HapticCategory::Warning,
        HapticCategory::Error,
    ];

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn is_notification(self) -> bool {
        self.group() == CooldownGroup::Notification
    }

    fn group(self) -> CooldownGroup {
        match self {
            HapticCategory::LightImpact => CooldownGroup::Light,
            HapticCategory::MediumImpact => CooldownGroup::Medium,
            HapticCategory::HeavyImpact => CooldownGroup::Heavy,
            HapticCategory::Success | HapticCategory::Warning | HapticCategory::Error => {
                CooldownGroup::Notification
            }
        }
    }

    /// Impact category for a sampled ramp intensity.
    pub fn from_intensity(value: f32) -> Self {
        if value <= LIGHT_INTENSITY_MAX {
            HapticCategory::LightImpact
        } else if value <= MEDIUM_INTENSITY_MAX {
            HapticCategory::MediumImpact
        } else {
            HapticCategory::HeavyImpact
        }
    }
}

/// Cooldowns in seconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HapticConfig {
    pub light_impact_cooldown: f64,
    pub medium_impact_cooldown: f64,
    pub heavy_impact_cooldown: f64,
    /// Shared by Success, Warning and Error.
    pub notification_cooldown: f64,
}

impl Default for HapticConfig {
    fn default() -> Self {
        Self {
            light_impact_cooldown: 0.3,
            medium_impact_cooldown: 0.2,
            heavy_impact_cooldown: 0.1,
            notification_cooldown: 0.6,
        }
    }
}

impl HapticConfig {
    pub fn cooldown(&self, category: HapticCategory) -> f64 {
        match category.group() {
            CooldownGroup::Light => self.light_impact_cooldown,
            CooldownGroup::Medium => self.medium_impact_cooldown,
            CooldownGroup::Heavy => self.heavy_impact_cooldown,
            CooldownGroup::Notification => self.notification_cooldown,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HapticStats {
    pub accepted: u64,
    pub throttled: u64,
    /// Accepted requests that reached a supporting tactile output.
    pub played: u64,
}

pub struct HapticDispatcher {
    config: HapticConfig,
    clock: FrameClock,
    last_accepted: [Option<f64>; 4],
    output: Option<Box<dyn TactileOutput>>,
    stats: HapticStats,
}

impl HapticDispatcher {
    pub fn new(config: HapticConfig, clock: FrameClock) -> Self {
        Self {
            config,
            clock,
            last_accepted: [None; 4],
            output: None,
            stats: HapticStats::default(),
        }
    }

    pub fn with_output(mut self, output: Box<dyn TactileOutput>) -> Self {
        self.output = Some(output);
        self
    }

    pub fn set_output(&mut self, output: Option<Box<dyn TactileOutput>>) {
        self.output = output;
    }

    pub fn config(&self) -> &HapticConfig {
        &self.config
    }

    pub fn stats(&self) -> HapticStats {
        self.stats
    }

    /// Time of the last accepted request in this category's cooldown group.
    pub fn last_accepted(&self, category: HapticCategory) -> Option<f64> {
        self.last_accepted[category.group().slot()]
    }

    /// Issue a pulse unless its cooldown group is still cooling down.
    /// Acceptance records the time even when no tactile hardware is present.
    pub fn request(&mut self, category: HapticCategory) -> bool {
        let now = self.clock.now();
        let slot = category.group().slot();
        let cooldown = self.config.cooldown(category);

        if let Some(last) = self.last_accepted[slot]
            && now - last < cooldown
        {
            self.stats.throttled += 1;
            tracing::trace!(?category, cooldown, "haptic throttled");
            return false;
        }

        self.last_accepted[slot] = Some(now);
        self.stats.accepted += 1;

        match self.output.as_mut() {
            Some(output) if output.is_supported() => {
                output.play(category.index());
                self.stats.played += 1;
            }
            _ => tracing::debug!(?category, "haptic accepted without tactile output"),
        }
        true
    }

    pub fn light(&mut self) -> bool {
        self.request(HapticCategory::LightImpact)
    }

    pub fn medium(&mut self) -> bool {
        self.request(HapticCategory::MediumImpact)
    }

    pub fn heavy(&mut self) -> bool {
        self.request(HapticCategory::HeavyImpact)
    }

    pub fn success(&mut self) -> bool {
        self.request(HapticCategory::Success)
    }

    pub fn warning(&mut self) -> bool {
        self.request(HapticCategory::Warning)
    }

    pub fn error(&mut self) -> bool {
        self.request(HapticCategory::Error)
    }

    /// Sample `curve` at `progress` (clamped to [0, 1]) and issue the
    /// thresholded impact category through the normal cooldown path.
    pub fn request_from_curve(&mut self, curve: &IntensityCurve, progress: f32) -> bool {
        let value = curve.evaluate(progress.clamp(0.0, 1.0));
        self.request(HapticCategory::from_intensity(value))
    }
}

/// A timed haptic effect: one pulse of its base category when it starts,
/// then a ramp-driven impact every processed frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HapticClip {
    pub category: HapticCategory,
    #[serde(default)]
    pub ramp: IntensityCurve,
    /// Seconds.
    pub duration: f64,
}

impl HapticClip {
    pub fn new(category: HapticCategory, ramp: IntensityCurve, duration: f64) -> Self {
        Self {
            category,
            ramp,
            duration,
        }
    }

    pub fn begin(&self, dispatcher: &mut HapticDispatcher) -> bool {
        dispatcher.request(self.category)
    }

    /// `local_time` is seconds since the clip started.
    pub fn process_frame(&self, dispatcher: &mut HapticDispatcher, local_time: f64) -> bool {
        let progress = if self.duration > 0.0 {
            (local_time / self.duration) as f32
        } else {
            1.0
        };
        dispatcher.request_from_curve(&self.ramp, progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder {
        supported: bool,
        played: Rc<RefCell<Vec<u8>>>,
    }

    impl TactileOutput for Recorder {
        fn is_supported(&self) -> bool {
            self.supported
        }
        fn play(&mut self, category_index: u8) {
            self.played.borrow_mut().push(category_index);
        }
    }

    fn dispatcher() -> (HapticDispatcher, FrameClock) {
        let clock = FrameClock::new();
        (
            HapticDispatcher::new(HapticConfig::default(), clock.clone()),
            clock,
        )
    }

    #[test]
    fn test_first_request_always_accepted() {
        let (mut d, _) = dispatcher();
        for c in HapticCategory::ALL {
            if !c.is_notification() {
                assert!(d.request(c), "{c:?} should be accepted first time");
            }
        }
        assert!(d.success());
    }

    #[test]
    fn test_light_cooldown() {
        let (mut d, clock) = dispatcher();
        assert!(d.light());
        clock.advance(0.1);
        assert!(!d.light(), "inside 0.3s cooldown");
        clock.advance(0.25);
        assert!(d.light(), "0.35s after first accept");
    }

    #[test]
    fn test_throttled_request_does_not_extend_cooldown() {
        let (mut d, clock) = dispatcher();
        assert!(d.light());
        clock.advance(0.2);
        assert!(!d.light());
        clock.advance(0.11);
        assert!(d.light());
        assert_eq!(d.stats().throttled, 1);
    }

    #[test]
    fn test_impact_categories_independent() {
        let (mut d, _) = dispatcher();
        assert!(d.light());
        assert!(d.medium());
        assert!(d.heavy());
        assert!(!d.light());
    }

    #[test]
    fn test_notifications_share_cooldown() {
        let (mut d, clock) = dispatcher();
        assert!(d.success());
        clock.advance(0.3);
        assert!(!d.warning());
        assert!(!d.error());
        clock.advance(0.31);
        assert!(d.error());
        assert_eq!(d.last_accepted(HapticCategory::Success), Some(clock.now()));
    }

    #[test]
    fn test_plays_only_when_supported() {
        let played = Rc::new(RefCell::new(Vec::new()));
        let clock = FrameClock::new();
        let mut d = HapticDispatcher::new(HapticConfig::default(), clock.clone()).with_output(
            Box::new(Recorder {
                supported: false,
                played: Rc::clone(&played),
            }),
        );
        assert!(d.heavy());
        assert!(played.borrow().is_empty());
        assert_eq!(d.stats().played, 0);

        d.set_output(Some(Box::new(Recorder {
            supported: true,
            played: Rc::clone(&played),
        })));
        clock.advance(1.0);
        assert!(d.heavy());
        assert!(d.warning());
        assert_eq!(*played.borrow(), vec![2, 4]);
    }

    #[test]
    fn test_intensity_thresholds() {
        assert_eq!(HapticCategory::from_intensity(0.0), HapticCategory::LightImpact);
        assert_eq!(HapticCategory::from_intensity(0.33), HapticCategory::LightImpact);
        assert_eq!(HapticCategory::from_intensity(0.34), HapticCategory::MediumImpact);
        assert_eq!(HapticCategory::from_intensity(0.66), HapticCategory::MediumImpact);
        assert_eq!(HapticCategory::from_intensity(0.67), HapticCategory::HeavyImpact);
    }

    #[test]
    fn test_curve_sampling_uses_cooldowns() {
        let (mut d, clock) = dispatcher();
        let ramp = IntensityCurve::default();
        assert!(d.request_from_curve(&ramp, 1.0));
        assert!(!d.request_from_curve(&ramp, 1.0), "heavy still cooling");
        clock.advance(0.1);
        assert!(d.request_from_curve(&ramp, 1.0));
        assert!(d.request_from_curve(&ramp, 0.0), "light group untouched");
    }

    #[test]
    fn test_clip_begin_then_ramp() {
        let played = Rc::new(RefCell::new(Vec::new()));
        let clock = FrameClock::new();
        let mut d = HapticDispatcher::new(HapticConfig::default(), clock.clone()).with_output(
            Box::new(Recorder {
                supported: true,
                played: Rc::clone(&played),
            }),
        );
        let clip = HapticClip::new(HapticCategory::Success, IntensityCurve::default(), 2.0);
        assert!(clip.begin(&mut d));
        assert!(clip.process_frame(&mut d, 0.0));
        clock.advance(1.0);
        assert!(clip.process_frame(&mut d, 1.0));
        clock.advance(1.0);
        assert!(clip.process_frame(&mut d, 2.0));
        assert_eq!(*played.borrow(), vec![3, 0, 1, 2]);
    }

    #[test]
    fn test_clip_with_nan_time_plays_ramp_end() {
        let (mut d, _) = dispatcher();
        let clip = HapticClip::new(HapticCategory::Success, IntensityCurve::constant(0.5), 1.0);
        assert!(clip.process_frame(&mut d, f64::NAN));
        assert!(d.last_accepted(HapticCategory::MediumImpact).is_some());
    }
}
