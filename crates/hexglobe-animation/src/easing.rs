//! Easing curves mapping linear progress to eased progress.

use serde::{Deserialize, Serialize};

/// Easing curve applied to a tween's normalized progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Easing {
    /// Constant speed, no acceleration.
    #[default]
    Linear,
    /// Slow start, fast end.
    QuadIn,
    /// Fast start, slow end.
    QuadOut,
    /// Slow start, fast middle, slow end.
    QuadInOut,
    /// Overshoots and oscillates into place.
    ElasticOut,
}

impl Easing {
    /// Map a linear progress value (0.0..=1.0) to an eased value.
    ///
    /// The endpoints are exact: `apply(0.0) == 0.0` and `apply(1.0) == 1.0`.
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadIn => t * t,
            Easing::QuadOut => t * (2.0 - t),
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::ElasticOut => {
                if t == 0.0 || t == 1.0 {
                    t
                } else {
                    2f64.powf(-10.0 * t) * ((t - 0.1) * 5.0 * std::f64::consts::PI).sin() + 1.0
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 5] = [
        Easing::Linear,
        Easing::QuadIn,
        Easing::QuadOut,
        Easing::QuadInOut,
        Easing::ElasticOut,
    ];

    #[test]
    fn test_endpoints_are_exact() {
        for easing in ALL {
            assert_eq!(easing.apply(0.0), 0.0, "{easing:?}");
            assert_eq!(easing.apply(1.0), 1.0, "{easing:?}");
        }
    }

    #[test]
    fn test_input_is_clamped() {
        for easing in ALL {
            assert_eq!(easing.apply(-1.0), 0.0);
            assert_eq!(easing.apply(2.0), 1.0);
        }
    }

    #[test]
    fn test_elastic_overshoots() {
        let peak = (1..100)
            .map(|i| Easing::ElasticOut.apply(i as f64 / 100.0))
            .fold(f64::MIN, f64::max);
        assert!(peak > 1.0, "peak {peak}");
    }

    #[test]
    fn test_quad_in_out_is_symmetric() {
        let a = Easing::QuadInOut.apply(0.25);
        let b = Easing::QuadInOut.apply(0.75);
        assert!((a + b - 1.0).abs() < 1e-12);
    }
}
