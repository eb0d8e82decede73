use serde::{Deserialize, Serialize};

use crate::anchor::AnchorConfig;
use crate::error::{CoreError, Result};
use crate::haptics::HapticConfig;
use crate::interaction::{FeedbackConfig, ForceConfig};
use crate::placement::PlacementConfig;
use crate::tether::TetherConfig;

/// Every tunable of a session. Sections missing from a config file fall
/// back to their defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinataConfig {
    pub placement: PlacementConfig,
    pub anchor: AnchorConfig,
    pub tether: TetherConfig,
    pub force: ForceConfig,
    pub feedback: FeedbackConfig,
    pub haptics: HapticConfig,
}

fn non_negative(name: &str, value: f64) -> Result<()> {
    if value < 0.0 || !value.is_finite() {
        return Err(CoreError::InvalidConfig(format!(
            "{name} must be a non-negative number, got {value}"
        )));
    }
    Ok(())
}

fn positive(name: &str, value: f64) -> Result<()> {
    if value <= 0.0 || !value.is_finite() {
        return Err(CoreError::InvalidConfig(format!(
            "{name} must be positive, got {value}"
        )));
    }
    Ok(())
}

impl PinataConfig {
    pub fn validate(&self) -> Result<()> {
        if self.tether.segments < 2 {
            return Err(CoreError::InvalidConfig(format!(
                "tether.segments must be at least 2, got {}",
                self.tether.segments
            )));
        }
        non_negative("tether.sag_strength", self.tether.sag_strength as f64)?;
        non_negative("tether.max_visual_sag", self.tether.max_visual_sag as f64)?;

        positive(
            "placement.virtual_ceiling_max_height",
            self.placement.virtual_ceiling_max_height as f64,
        )?;
        non_negative(
            "placement.virtual_ceiling_probe_lift",
            self.placement.virtual_ceiling_probe_lift as f64,
        )?;

        non_negative("anchor.activation_delay", self.anchor.activation_delay)?;

        positive("force.min_swipe_distance", self.force.min_swipe_distance as f64)?;
        positive("force.max_tap_duration", self.force.max_tap_duration)?;

        let h = &self.haptics;
        non_negative("haptics.light_impact_cooldown", h.light_impact_cooldown)?;
        non_negative("haptics.medium_impact_cooldown", h.medium_impact_cooldown)?;
        non_negative("haptics.heavy_impact_cooldown", h.heavy_impact_cooldown)?;
        non_negative("haptics.notification_cooldown", h.notification_cooldown)?;
        Ok(())
    }
}
