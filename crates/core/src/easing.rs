//! Easing curves for reel motion
//!
//! All curves map progress `t` in `[0, 1]` to eased progress, with
//! `apply(0) == 0` and `apply(1) == 1` exactly so a tween always lands on
//! its target.

use serde::{Deserialize, Serialize};

/// Easing curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Easing {
    Linear,
    /// CSS-style cubic bezier with control points (x1, y1) and (x2, y2)
    CubicBezier(f64, f64, f64, f64),
    /// Spring on a unit mass. `span` seconds of spring time are compressed
    /// into the tween, whatever its real length.
    Spring {
        stiffness: f64,
        damping: f64,
        span: f64,
    },
}

impl Easing {
    /// Fast start, long smooth stop. Used for the deceleration onto the tease.
    pub const DECELERATE: Easing = Easing::CubicBezier(0.1, 0.9, 0.2, 1.0);
    pub const EASE_IN_OUT: Easing = Easing::CubicBezier(0.42, 0.0, 0.58, 1.0);
    pub const EASE_OUT: Easing = Easing::CubicBezier(0.0, 0.0, 0.58, 1.0);

    /// Spring-back used for the second half of the bounce. One second of
    /// spring time is enough for it to come to rest.
    pub const SPRING_BACK: Easing = Easing::Spring {
        stiffness: 200.0,
        damping: 10.0,
        span: 1.0,
    };

    pub fn apply(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        match *self {
            Easing::Linear => t,
            Easing::CubicBezier(x1, y1, x2, y2) => {
                let s = solve_bezier_x(x1, x2, t);
                bezier(y1, y2, s)
            }
            Easing::Spring {
                stiffness,
                damping,
                span,
            } => spring(stiffness, damping, t * span),
        }
    }
}

/// One axis of a cubic bezier anchored at 0 and 1
fn bezier(p1: f64, p2: f64, s: f64) -> f64 {
    let ms = 1.0 - s;
    3.0 * ms * ms * s * p1 + 3.0 * ms * s * s * p2 + s * s * s
}

fn bezier_slope(p1: f64, p2: f64, s: f64) -> f64 {
    let ms = 1.0 - s;
    3.0 * ms * ms * p1 + 6.0 * ms * s * (p2 - p1) + 3.0 * s * s * (1.0 - p2)
}

/// Curve parameter whose x coordinate is `x`
fn solve_bezier_x(x1: f64, x2: f64, x: f64) -> f64 {
    // Newton first, it converges in a handful of steps on sane curves
    let mut s = x;
    for _ in 0..8 {
        let err = bezier(x1, x2, s) - x;
        if err.abs() < 1e-7 {
            return s;
        }
        let slope = bezier_slope(x1, x2, s);
        if slope.abs() < 1e-6 {
            break;
        }
        s -= err / slope;
    }

    // Bisection fallback for flat spots
    let (mut lo, mut hi) = (0.0, 1.0);
    s = x;
    for _ in 0..64 {
        let value = bezier(x1, x2, s);
        if (value - x).abs() < 1e-7 {
            break;
        }
        if value < x {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) / 2.0;
    }
    s
}

/// Displacement of a unit-mass spring released from 0 toward 1
fn spring(stiffness: f64, damping: f64, time: f64) -> f64 {
    let omega = stiffness.sqrt();
    let zeta = damping / (2.0 * omega);
    if zeta >= 1.0 {
        // Critically or over-damped: no oscillation
        return 1.0 - (1.0 + omega * time) * (-omega * time).exp();
    }
    let omega_d = omega * (1.0 - zeta * zeta).sqrt();
    let envelope = (-zeta * omega * time).exp();
    1.0 - envelope * ((omega_d * time).cos() + (zeta * omega / omega_d) * (omega_d * time).sin())
}

/// Interpolate between `from` and `to` with eased progress
pub fn lerp(from: f64, to: f64, eased: f64) -> f64 {
    from + (to - from) * eased
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURVES: [Easing; 4] = [
        Easing::Linear,
        Easing::DECELERATE,
        Easing::EASE_IN_OUT,
        Easing::EASE_OUT,
    ];

    #[test]
    fn test_endpoints_exact() {
        for curve in CURVES {
            assert_eq!(curve.apply(0.0), 0.0);
            assert_eq!(curve.apply(1.0), 1.0);
        }
        let spring = Easing::SPRING_BACK;
        assert_eq!(spring.apply(0.0), 0.0);
        assert_eq!(spring.apply(1.0), 1.0);
    }

    #[test]
    fn test_decelerate_front_loads_motion() {
        // Well past half the distance at a quarter of the time
        assert!(Easing::DECELERATE.apply(0.25) > 0.7);
        // And nowhere near linear
        assert!(Easing::DECELERATE.apply(0.5) > 0.9);
    }

    #[test]
    fn test_bezier_monotonic() {
        for curve in CURVES {
            let mut last = 0.0;
            for i in 1..=100 {
                let value = curve.apply(i as f64 / 100.0);
                assert!(value + 1e-9 >= last, "{:?} not monotonic at {}", curve, i);
                last = value;
            }
        }
    }

    #[test]
    fn test_ease_in_out_symmetric() {
        let a = Easing::EASE_IN_OUT.apply(0.3);
        let b = Easing::EASE_IN_OUT.apply(0.7);
        assert!((a + b - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_spring_overshoots_then_settles() {
        let spring = Easing::SPRING_BACK;
        let peak = (1..100)
            .map(|i| spring.apply(i as f64 / 100.0))
            .fold(0.0, f64::max);
        assert!(peak > 1.0);
        assert!((spring.apply(0.99) - 1.0).abs() < 0.05);
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(2.0, 12.0, 0.5), 7.0);
        assert_eq!(lerp(12.0, 2.0, 1.0), 2.0);
    }
}
