//! Bubble radius scaling.
//!
//! How a size-field value becomes a pixel radius is left to a [`RadiusMapping`]. The
//! built-in [`RadiusScale`] covers the two common choices; callers with their own notion of
//! size can pass any implementation to the assembler.

use serde::{Deserialize, Serialize};

/// Smallest radius a bubble is drawn with, so near-zero sizes stay visible
pub const MIN_RADIUS: f64 = 3.0;

/// Largest radius of the linear scale by default
pub const MAX_RADIUS: f64 = 30.0;

/// Maps a raw size value to a rendered radius
pub trait RadiusMapping {
    /// `domain` is the (min, max) of all size values in the chart
    fn radius(&self, value: f64, domain: (f64, f64)) -> f64;
}

impl<F> RadiusMapping for F
where
    F: Fn(f64, (f64, f64)) -> f64,
{
    fn radius(&self, value: f64, domain: (f64, f64)) -> f64 {
        self(value, domain)
    }
}

/// Built-in radius scales
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum RadiusScale {
    /// Use the value as the radius, clamped to a minimum
    #[serde(rename_all = "camelCase")]
    Raw {
        #[serde(default = "default_min_radius")]
        min_radius: f64,
    },
    /// Interpolate linearly from the value domain onto `[min_radius, max_radius]`
    #[serde(rename_all = "camelCase")]
    Linear {
        #[serde(default = "default_min_radius")]
        min_radius: f64,
        #[serde(default = "default_max_radius")]
        max_radius: f64,
    },
}

fn default_min_radius() -> f64 { MIN_RADIUS }
fn default_max_radius() -> f64 { MAX_RADIUS }

impl Default for RadiusScale {
    fn default() -> Self {
        RadiusScale::Raw {
            min_radius: MIN_RADIUS,
        }
    }
}

impl RadiusMapping for RadiusScale {
    fn radius(&self, value: f64, domain: (f64, f64)) -> f64 {
        match *self {
            RadiusScale::Raw { min_radius } => value.max(min_radius),
            RadiusScale::Linear {
                min_radius,
                max_radius,
            } => {
                let (lo, hi) = domain;
                if hi <= lo {
                    return (min_radius + max_radius) / 2.0;
                }
                let t = ((value - lo) / (hi - lo)).clamp(0.0, 1.0);
                min_radius + t * (max_radius - min_radius)
            }
        }
    }
}

/// Min and max of a set of values; `None` when empty
pub fn value_domain<I>(values: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = f64>,
{
    values.into_iter().fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_clamps_small_values() {
        let scale = RadiusScale::default();
        assert_eq!(scale.radius(0.0, (0.0, 10.0)), MIN_RADIUS);
        assert_eq!(scale.radius(-4.0, (0.0, 10.0)), MIN_RADIUS);
        assert_eq!(scale.radius(12.0, (0.0, 10.0)), 12.0);
    }

    #[test]
    fn test_linear() {
        let scale = RadiusScale::Linear {
            min_radius: 2.0,
            max_radius: 12.0,
        };
        assert_eq!(scale.radius(0.0, (0.0, 10.0)), 2.0);
        assert_eq!(scale.radius(5.0, (0.0, 10.0)), 7.0);
        assert_eq!(scale.radius(10.0, (0.0, 10.0)), 12.0);
        // Degenerate domain
        assert_eq!(scale.radius(4.0, (4.0, 4.0)), 7.0);
    }

    #[test]
    fn test_closure_mapping() {
        let double = |v: f64, _: (f64, f64)| v * 2.0;
        assert_eq!(double.radius(3.0, (0.0, 1.0)), 6.0);
    }

    #[test]
    fn test_config_shape() {
        let scale: RadiusScale =
            serde_json::from_str(r#"{"mode": "linear", "maxRadius": 20}"#).unwrap();
        assert_eq!(
            scale,
            RadiusScale::Linear {
                min_radius: MIN_RADIUS,
                max_radius: 20.0
            }
        );
        let scale: RadiusScale = serde_json::from_str(r#"{"mode": "raw"}"#).unwrap();
        assert_eq!(scale, RadiusScale::default());
    }

    #[test]
    fn test_value_domain() {
        assert_eq!(value_domain(vec![3.0, -1.0, 7.5]), Some((-1.0, 7.5)));
        assert_eq!(value_domain(Vec::<f64>::new()), None);
    }
}
