use serde::{Deserialize, Serialize};

use crate::foundation::error::{SlideShowError, SlideShowResult};

/// Frame pacing and scheduling knobs for a slideshow session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Upper bound for the per-activity minimal frame count.
    pub maximum_frame_count: u32,
    /// Shortest wake-up interval handed to the host, in seconds.
    pub minimum_timeout: f64,
    /// Longest wake-up interval handed to the host, in seconds.
    pub maximum_timeout: f64,
    /// Frame rate used to derive minimal frame counts of animations.
    pub minimum_frames_per_second: u32,
    /// Frame rate the frame synchronizer paces to.
    pub preferred_frames_per_second: u32,
    /// Transition duration used when a slide declares none.
    pub default_transition_duration: f64,
    /// Advance automatically when a slide declares `nextSlideDuration`.
    pub auto_advance_enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            maximum_frame_count: 60,
            minimum_timeout: 1.0 / 60.0,
            maximum_timeout: 4.0,
            minimum_frames_per_second: 10,
            preferred_frames_per_second: 50,
            default_transition_duration: 0.001,
            auto_advance_enabled: true,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> SlideShowResult<()> {
        if self.maximum_frame_count == 0 {
            return Err(SlideShowError::validation(
                "maximumFrameCount must be greater than zero",
            ));
        }
        if !(self.minimum_timeout.is_finite() && self.minimum_timeout > 0.0) {
            return Err(SlideShowError::validation(
                "minimumTimeout must be a positive number of seconds",
            ));
        }
        if !(self.maximum_timeout.is_finite() && self.maximum_timeout >= self.minimum_timeout) {
            return Err(SlideShowError::validation(
                "maximumTimeout must be finite and not smaller than minimumTimeout",
            ));
        }
        if self.minimum_frames_per_second == 0 || self.preferred_frames_per_second == 0 {
            return Err(SlideShowError::validation(
                "frame rates must be greater than zero",
            ));
        }
        if !(self.default_transition_duration.is_finite() && self.default_transition_duration > 0.0)
        {
            return Err(SlideShowError::validation(
                "defaultTransitionDuration must be a positive number of seconds",
            ));
        }
        Ok(())
    }

    pub fn preferred_frame_duration(&self) -> f64 {
        1.0 / f64::from(self.preferred_frames_per_second)
    }

    /// Clamp a queue timeout into the host wake-up window.
    pub fn clamp_timeout(&self, timeout: f64) -> f64 {
        timeout.clamp(self.minimum_timeout, self.maximum_timeout)
    }

    /// Minimal number of frames an activity of `duration` seconds must show.
    pub fn min_frame_count(&self, duration: Option<f64>) -> f64 {
        let upper = f64::from(self.minimum_frames_per_second.min(self.maximum_frame_count));
        let frames = match duration {
            Some(d) if d.is_finite() => d * f64::from(self.minimum_frames_per_second),
            _ => upper,
        };
        frames.clamp(1.0, upper.max(1.0))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
