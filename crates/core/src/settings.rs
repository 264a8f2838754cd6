//! Session settings and slot timing
//!
//! Durations are stored as seconds (`f64`) so they read naturally in TOML,
//! and converted to [`Duration`] at the point of use.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Upper bound on simultaneous reels
pub const MAX_REELS: usize = 8;

/// Longest accepted value for any timing field, in seconds
pub const MAX_TIMING_SECS: f64 = 3600.0;

/// Reel window geometry
pub struct ReelLayout;

impl ReelLayout {
    /// Items visible at once (odd so there is a centre row)
    pub const VISIBLE_ITEMS: usize = 3;
    /// Distinct candidates sampled for the spin and idle loops
    pub const LOOP_SAMPLE: usize = 15;
    /// How many times the loop sample is repeated in the window
    pub const LOOP_REPEATS: usize = 3;
    /// Filler items before the tease stop
    pub const LANDING_BUFFER: usize = 12;
    /// Filler items between the tease and the winner
    pub const LANDING_GAP: usize = 6;
    /// Filler items after the winner
    pub const LANDING_TAIL: usize = 3;
    /// Idle reels only auto-cycle when the pool is larger than this
    pub const IDLE_MIN_POOL: usize = 5;
    /// Scroll distance of the bounce overshoot, in item heights
    pub const BOUNCE_OVERSHOOT: f64 = 20.0 / 220.0;
}

/// Timing of one draw, in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotTiming {
    /// Period of one pass through the spin loop
    pub spin_loop: f64,
    /// Minimum time the reels spin before the winner is drawn
    pub spin_hold_min: f64,
    /// Uniform extra spin time on top of the minimum
    pub spin_hold_jitter: f64,
    /// Deceleration onto the tease stop
    pub decel: f64,
    /// Hold on the tease stop
    pub tease_pause: f64,
    /// Slide from the tease stop to the winner
    pub winner_slide: f64,
    /// Overshoot plus spring-back at the winner
    pub bounce: f64,
    /// Extra deceleration time per reel index
    pub reel_stagger: f64,
    /// Frozen highlight on the winner before the reveal
    pub reveal_freeze: f64,
    /// Idle loop period for the first reel
    pub idle_loop_base: f64,
    /// Idle loop period added per reel index
    pub idle_loop_step: f64,
}

impl Default for SlotTiming {
    fn default() -> Self {
        Self::normal()
    }
}

impl SlotTiming {
    /// Stage presentation timing
    pub fn normal() -> Self {
        Self {
            spin_loop: 2.5,
            spin_hold_min: 12.0,
            spin_hold_jitter: 5.0,
            decel: 3.0,
            tease_pause: 1.0,
            winner_slide: 1.5,
            bounce: 0.5,
            reel_stagger: 0.5,
            reveal_freeze: 2.0,
            idle_loop_base: 40.0,
            idle_loop_step: 5.0,
        }
    }

    /// Shortened timing for rehearsals
    pub fn rehearsal() -> Self {
        Self {
            spin_loop: 1.0,
            spin_hold_min: 1.0,
            spin_hold_jitter: 0.5,
            decel: 1.0,
            tease_pause: 0.3,
            winner_slide: 0.5,
            bounce: 0.2,
            reel_stagger: 0.2,
            reveal_freeze: 0.5,
            idle_loop_base: 20.0,
            idle_loop_step: 2.0,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("spin_loop", self.spin_loop),
            ("spin_hold_min", self.spin_hold_min),
            ("spin_hold_jitter", self.spin_hold_jitter),
            ("decel", self.decel),
            ("tease_pause", self.tease_pause),
            ("winner_slide", self.winner_slide),
            ("bounce", self.bounce),
            ("reel_stagger", self.reel_stagger),
            ("reveal_freeze", self.reveal_freeze),
            ("idle_loop_base", self.idle_loop_base),
            ("idle_loop_step", self.idle_loop_step),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!(
                    "timing.{} must be a non-negative number, got {}",
                    name, value
                )));
            }
            if value > MAX_TIMING_SECS {
                return Err(Error::Config(format!(
                    "timing.{} must be at most {} seconds, got {}",
                    name, MAX_TIMING_SECS, value
                )));
            }
        }
        if self.spin_loop == 0.0 {
            return Err(Error::Config("timing.spin_loop must be positive".into()));
        }
        Ok(())
    }

    pub fn spin_loop_period(&self) -> Duration {
        secs(self.spin_loop)
    }

    pub fn decel_for(&self, reel_index: usize) -> Duration {
        secs(self.decel + reel_index as f64 * self.reel_stagger)
    }

    pub fn tease_pause(&self) -> Duration {
        secs(self.tease_pause)
    }

    pub fn winner_slide(&self) -> Duration {
        secs(self.winner_slide)
    }

    /// Each half of the bounce (overshoot, then spring-back)
    pub fn half_bounce(&self) -> Duration {
        secs(self.bounce / 2.0)
    }

    pub fn reveal_freeze(&self) -> Duration {
        secs(self.reveal_freeze)
    }

    pub fn idle_loop_for(&self, reel_index: usize) -> Duration {
        secs(self.idle_loop_base + reel_index as f64 * self.idle_loop_step)
    }

    /// Spin hold plus `jitter_millis` drawn by the caller
    pub fn spin_hold(&self, jitter_millis: u64) -> Duration {
        secs(self.spin_hold_min) + Duration::from_millis(jitter_millis)
    }

    pub fn spin_hold_jitter_millis(&self) -> u64 {
        (self.spin_hold_jitter * 1000.0).round() as u64
    }

    /// Time from winner assignment to settle for one reel
    pub fn landing_duration(&self, reel_index: usize, with_tease: bool) -> Duration {
        let mut total = self.decel_for(reel_index) + self.half_bounce() * 2;
        if with_tease {
            total += self.tease_pause() + self.winner_slide();
        }
        total
    }
}

fn secs(value: f64) -> Duration {
    Duration::from_secs_f64(value.max(0.0))
}

/// Operator-facing settings for a draw session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Rehearsal mode: wins do not consume prize stock
    pub demo_mode: bool,
    pub sound_enabled: bool,
    pub confetti_enabled: bool,
    /// Simultaneous winners per draw, one reel each
    pub reel_count: usize,
    pub timing: SlotTiming,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            demo_mode: false,
            sound_enabled: true,
            confetti_enabled: true,
            reel_count: 1,
            timing: SlotTiming::default(),
        }
    }
}

impl SessionSettings {
    pub fn validate(&self) -> Result<()> {
        if self.reel_count == 0 || self.reel_count > MAX_REELS {
            return Err(Error::Config(format!(
                "reel_count must be between 1 and {}, got {}",
                MAX_REELS, self.reel_count
            )));
        }
        self.timing.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        SessionSettings::default().validate().unwrap();
        SlotTiming::rehearsal().validate().unwrap();
    }

    #[test]
    fn test_landing_duration_includes_stagger() {
        let timing = SlotTiming::normal();
        // 3.0 decel + 0.5 bounce + 1.0 pause + 1.5 slide
        assert_eq!(timing.landing_duration(0, true), Duration::from_secs(6));
        // second reel decelerates 0.5s longer
        assert_eq!(timing.landing_duration(1, true), Duration::from_millis(6500));
        assert_eq!(timing.landing_duration(0, false), Duration::from_millis(3500));
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut settings = SessionSettings::default();
        settings.reel_count = 0;
        assert!(matches!(settings.validate(), Err(Error::Config(_))));

        let mut settings = SessionSettings::default();
        settings.timing.decel = -1.0;
        assert!(matches!(settings.validate(), Err(Error::Config(_))));

        let mut settings = SessionSettings::default();
        settings.timing.tease_pause = f64::NAN;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_rejects_oversized_values() {
        let mut settings = SessionSettings::default();
        settings.timing.decel = 1e20;
        assert!(matches!(settings.validate(), Err(Error::Config(_))));

        let mut settings = SessionSettings::default();
        settings.timing.spin_hold_jitter = 1e300;
        assert!(matches!(settings.validate(), Err(Error::Config(_))));

        let mut settings = SessionSettings::default();
        settings.timing.reveal_freeze = MAX_TIMING_SECS;
        settings.validate().unwrap();
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings: SessionSettings = toml::from_str(
            r#"
demo_mode = true
reel_count = 3

[timing]
decel = 4.0
"#,
        )
        .unwrap();
        assert!(settings.demo_mode);
        assert_eq!(settings.reel_count, 3);
        assert_eq!(settings.timing.decel, 4.0);
        assert_eq!(settings.timing.tease_pause, 1.0);
    }
}
