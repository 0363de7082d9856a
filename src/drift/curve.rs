// ==============================================================================
// curve.rs — PURE 1D CURVES (SLIP LOADING / UNLOADING)
// ------------------------------------------------------------------------------
// `Curve` is the evaluator seam: x (normalized lateral speed) -> y (slip 0..1).
// Any `Fn(f32) -> f32` is a curve; `KeyframeCurve` is the data-driven one read
// from config (piecewise linear, held flat outside its first/last key).
//
// validate_curve(...) samples a curve over [0, CURVE_SAMPLE_DOMAIN] once at
// setup and rejects non-finite, out-of-range or non-monotonic curves.
// ==============================================================================

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, invalid};

/// Upper end of the normalized input range checked at setup.
pub const CURVE_SAMPLE_DOMAIN: f32 = 2.0;
const CURVE_SAMPLES: usize = 129;

pub trait Curve {
    fn evaluate(&self, x: f32) -> f32;
}

impl<F> Curve for F
where
    F: Fn(f32) -> f32,
{
    fn evaluate(&self, x: f32) -> f32 {
        self(x)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<[f32; 2]>", into = "Vec<[f32; 2]>")]
pub struct KeyframeCurve {
    keys: Vec<[f32; 2]>, // [x, y], strictly increasing x
}

impl KeyframeCurve {
    pub fn new(keys: Vec<[f32; 2]>) -> Result<Self, ConfigError> {
        if keys.is_empty() {
            return Err(invalid("keyframe curve needs at least one key"));
        }
        if keys.iter().flatten().any(|v| !v.is_finite()) {
            return Err(invalid("keyframe curve contains a non-finite key"));
        }
        if keys.windows(2).any(|w| w[1][0] <= w[0][0]) {
            return Err(invalid("keyframe curve keys must have strictly increasing x"));
        }
        Ok(Self { keys })
    }

    pub fn keys(&self) -> &[[f32; 2]] {
        &self.keys
    }

    /// Grip fades in slowly and is fully gone at x = 0.75.
    pub fn slip_loading_default() -> Self {
        Self { keys: vec![[0.0, 0.0], [0.4, 0.1], [0.75, 1.0]] }
    }

    /// Grip comes back fast once x drops under 0.5 and is full at 0.2.
    pub fn slip_unloading_default() -> Self {
        Self { keys: vec![[0.0, 0.0], [0.2, 0.0], [0.5, 1.0]] }
    }
}

impl TryFrom<Vec<[f32; 2]>> for KeyframeCurve {
    type Error = ConfigError;

    fn try_from(keys: Vec<[f32; 2]>) -> Result<Self, Self::Error> {
        Self::new(keys)
    }
}

impl From<KeyframeCurve> for Vec<[f32; 2]> {
    fn from(curve: KeyframeCurve) -> Self {
        curve.keys
    }
}

impl Curve for KeyframeCurve {
    fn evaluate(&self, x: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return 0.0;
        };
        // NaN fails both end guards below; treat it as the rest input
        if x.is_nan() {
            return first[1];
        }
        if x <= first[0] {
            return first[1];
        }
        if x >= last[0] {
            return last[1];
        }

        // first key with x above the input; always in 1..len for finite x
        let i = self.keys.partition_point(|k| k[0] <= x);
        let [x0, y0] = self.keys[i - 1];
        let [x1, y1] = self.keys[i];
        let t = (x - x0) / (x1 - x0);
        y0 + (y1 - y0) * t
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Monotonic {
    Flat,
    NonDecreasing,
    NonIncreasing,
}

/// Samples `curve` over the setup domain and checks it is finite, within
/// [0, 1] and monotonic in one direction.
pub fn validate_curve(label: &str, curve: &dyn Curve) -> Result<Monotonic, ConfigError> {
    let mut rising = false;
    let mut falling = false;
    let mut prev: Option<f32> = None;

    for i in 0..CURVE_SAMPLES {
        let x = CURVE_SAMPLE_DOMAIN * i as f32 / (CURVE_SAMPLES - 1) as f32;
        let y = curve.evaluate(x);

        if !y.is_finite() {
            return Err(invalid(format!("{label} curve is not finite at x = {x}")));
        }
        if !(0.0..=1.0).contains(&y) {
            return Err(invalid(format!("{label} curve leaves [0, 1] at x = {x} (y = {y})")));
        }

        if let Some(p) = prev {
            rising |= y > p;
            falling |= y < p;
        }
        prev = Some(y);
    }

    match (rising, falling) {
        (true, true) => Err(invalid(format!("{label} curve is not monotonic"))),
        (true, false) => Ok(Monotonic::NonDecreasing),
        (false, true) => Ok(Monotonic::NonIncreasing),
        (false, false) => Ok(Monotonic::Flat),
    }
}

/// True if any setup sample of `curve` equals `value` exactly.
pub fn curve_reaches(curve: &dyn Curve, value: f32) -> bool {
    (0..CURVE_SAMPLES).any(|i| {
        let x = CURVE_SAMPLE_DOMAIN * i as f32 / (CURVE_SAMPLES - 1) as f32;
        curve.evaluate(x) == value
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> KeyframeCurve {
        KeyframeCurve::new(vec![[0.25, 0.0], [0.75, 1.0]]).unwrap()
    }

    #[test]
    fn nan_input_holds_the_first_key() {
        assert_eq!(ramp().evaluate(f32::NAN), 0.0);
        assert_eq!(KeyframeCurve::slip_loading_default().evaluate(f32::NAN), 0.0);
        assert_eq!(KeyframeCurve::slip_unloading_default().evaluate(f32::NAN), 0.0);
    }

    #[test]
    fn keyframes_interpolate_and_hold_ends() {
        let c = ramp();
        assert_eq!(c.evaluate(-1.0), 0.0);
        assert_eq!(c.evaluate(0.25), 0.0);
        assert!((c.evaluate(0.5) - 0.5).abs() < 1e-6);
        assert_eq!(c.evaluate(0.75), 1.0);
        assert_eq!(c.evaluate(10.0), 1.0);
    }

    #[test]
    fn keys_must_be_ordered() {
        assert!(KeyframeCurve::new(vec![]).is_err());
        assert!(KeyframeCurve::new(vec![[0.5, 0.0], [0.5, 1.0]]).is_err());
        assert!(KeyframeCurve::new(vec![[0.0, f32::NAN]]).is_err());
    }

    #[test]
    fn deserializes_from_pairs() {
        let c: KeyframeCurve = serde_json::from_str("[[0.0, 0.0], [1.0, 1.0]]").unwrap();
        assert_eq!(c.keys().len(), 2);
        assert!(serde_json::from_str::<KeyframeCurve>("[[1.0, 0.0], [0.0, 1.0]]").is_err());
    }

    #[test]
    fn validation_reports_direction() {
        assert_eq!(validate_curve("loading", &ramp()).unwrap(), Monotonic::NonDecreasing);
        assert_eq!(validate_curve("down", &|x: f32| (1.0 - x).max(0.0)).unwrap(), Monotonic::NonIncreasing);
        assert!(validate_curve("bump", &|x: f32| (x * 3.0).sin().abs()).is_err());
        assert!(validate_curve("big", &|x: f32| x * 2.0).is_err());
    }

    #[test]
    fn reaches_exact_endpoints() {
        assert!(curve_reaches(&ramp(), 1.0));
        assert!(curve_reaches(&ramp(), 0.0));
        assert!(!curve_reaches(&|_x: f32| 0.5, 1.0));
    }
}
