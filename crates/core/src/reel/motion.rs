//! Continuous reel motion sampled against the virtual clock

use std::time::Duration;

use crate::easing::{lerp, Easing};

/// How the reel's scroll offset evolves over time.
///
/// Offsets are in item units: an offset of `n` centres window item `n`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    /// At rest
    Still(f64),
    /// Constant-speed loop from `origin` to `origin + span`, then wraps
    Loop {
        start: Duration,
        origin: f64,
        span: f64,
        period: Duration,
    },
    /// Eased move from `from` to `to`
    Tween {
        start: Duration,
        duration: Duration,
        from: f64,
        to: f64,
        easing: Easing,
    },
}

impl Motion {
    pub fn offset_at(&self, now: Duration) -> f64 {
        match *self {
            Motion::Still(offset) => offset,
            Motion::Loop {
                start,
                origin,
                span,
                period,
            } => {
                if period.is_zero() || span <= 0.0 {
                    return origin;
                }
                let elapsed = now.saturating_sub(start).as_secs_f64();
                let cycles = elapsed / period.as_secs_f64();
                origin + span * cycles.fract()
            }
            Motion::Tween {
                start,
                duration,
                from,
                to,
                easing,
            } => {
                if duration.is_zero() {
                    return to;
                }
                let elapsed = now.saturating_sub(start).as_secs_f64();
                let t = (elapsed / duration.as_secs_f64()).min(1.0);
                lerp(from, to, easing.apply(t))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_wraps() {
        let motion = Motion::Loop {
            start: Duration::from_secs(10),
            origin: 15.0,
            span: 15.0,
            period: Duration::from_secs(3),
        };
        assert_eq!(motion.offset_at(Duration::from_secs(10)), 15.0);
        assert!((motion.offset_at(Duration::from_millis(11_500)) - 22.5).abs() < 1e-9);
        // one full period later it is back at the origin
        assert!((motion.offset_at(Duration::from_secs(13)) - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_tween_lands_on_target() {
        let motion = Motion::Tween {
            start: Duration::ZERO,
            duration: Duration::from_secs(2),
            from: 1.0,
            to: 12.0,
            easing: Easing::DECELERATE,
        };
        assert_eq!(motion.offset_at(Duration::ZERO), 1.0);
        assert_eq!(motion.offset_at(Duration::from_secs(2)), 12.0);
        assert_eq!(motion.offset_at(Duration::from_secs(5)), 12.0);
    }

    #[test]
    fn test_zero_length_tween() {
        let motion = Motion::Tween {
            start: Duration::ZERO,
            duration: Duration::ZERO,
            from: 0.0,
            to: 4.0,
            easing: Easing::Linear,
        };
        assert_eq!(motion.offset_at(Duration::ZERO), 4.0);
    }
}
