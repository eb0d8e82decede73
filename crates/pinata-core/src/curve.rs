use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
    #[serde(default)]
    pub in_tangent: f32,
    #[serde(default)]
    pub out_tangent: f32,
}

impl Keyframe {
    pub fn flat(time: f32, value: f32) -> Self {
        Self {
            time,
            value,
            in_tangent: 0.0,
            out_tangent: 0.0,
        }
    }
}

/// Keyframed scalar curve with cubic Hermite segments. Evaluation is clamped
/// to the first/last key outside the key range.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntensityCurve {
    keys: Vec<Keyframe>,
}

impl Default for IntensityCurve {
    fn default() -> Self {
        Self::ease_in_out(0.0, 0.0, 1.0, 1.0)
    }
}

impl IntensityCurve {
    pub fn new(mut keys: Vec<Keyframe>) -> Self {
        keys.retain(|k| k.time.is_finite() && k.value.is_finite());
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys }
    }

    /// Smooth ramp between two keys with flat tangents.
    pub fn ease_in_out(t0: f32, v0: f32, t1: f32, v1: f32) -> Self {
        Self::new(vec![Keyframe::flat(t0, v0), Keyframe::flat(t1, v1)])
    }

    pub fn constant(value: f32) -> Self {
        Self::new(vec![Keyframe::flat(0.0, value)])
    }

    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    pub fn evaluate(&self, t: f32) -> f32 {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => return 0.0,
        };
        if t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        // NaN fails every comparison and lands here with no matching window
        let Some(i) = self
            .keys
            .windows(2)
            .position(|w| t >= w[0].time && t <= w[1].time)
        else {
            return last.value;
        };
        let (k0, k1) = (self.keys[i], self.keys[i + 1]);
        let dt = k1.time - k0.time;
        if dt <= f32::EPSILON {
            return k1.value;
        }

        let s = (t - k0.time) / dt;
        let s2 = s * s;
        let s3 = s2 * s;
        let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
        let h10 = s3 - 2.0 * s2 + s;
        let h01 = -2.0 * s3 + 3.0 * s2;
        let h11 = s3 - s2;
        h00 * k0.value + h10 * dt * k0.out_tangent + h01 * k1.value + h11 * dt * k1.in_tangent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ease_in_out_shape() {
        let c = IntensityCurve::default();
        assert_relative_eq!(c.evaluate(0.0), 0.0);
        assert_relative_eq!(c.evaluate(0.5), 0.5);
        assert_relative_eq!(c.evaluate(1.0), 1.0);
        // flat tangents: slow start
        assert!(c.evaluate(0.1) < 0.1);
    }

    #[test]
    fn test_clamped_outside_range() {
        let c = IntensityCurve::ease_in_out(0.2, 0.3, 0.8, 0.9);
        assert_relative_eq!(c.evaluate(-5.0), 0.3);
        assert_relative_eq!(c.evaluate(5.0), 0.9);
    }

    #[test]
    fn test_nan_time_reads_last_key() {
        assert_relative_eq!(IntensityCurve::constant(0.5).evaluate(f32::NAN), 0.5);
        let c = IntensityCurve::ease_in_out(0.0, 0.2, 1.0, 0.8);
        assert_relative_eq!(c.evaluate(f32::NAN), 0.8);
    }

    #[test]
    fn test_empty_curve_is_zero() {
        assert_eq!(IntensityCurve::new(vec![]).evaluate(0.5), 0.0);
    }

    #[test]
    fn test_unsorted_keys_are_sorted() {
        let c = IntensityCurve::new(vec![Keyframe::flat(1.0, 1.0), Keyframe::flat(0.0, 0.0)]);
        assert_relative_eq!(c.keys()[0].time, 0.0);
        assert_relative_eq!(c.evaluate(0.5), 0.5);
    }

    #[test]
    fn test_linear_tangents_give_line() {
        let c = IntensityCurve::new(vec![
            Keyframe {
                time: 0.0,
                value: 0.0,
                in_tangent: 1.0,
                out_tangent: 1.0,
            },
            Keyframe {
                time: 1.0,
                value: 1.0,
                in_tangent: 1.0,
                out_tangent: 1.0,
            },
        ]);
        assert_relative_eq!(c.evaluate(0.25), 0.25, epsilon = 1e-6);
    }

    #[test]
    fn test_serde_transparent() {
        let c = IntensityCurve::constant(0.7);
        let json = serde_json::to_string(&c).unwrap();
        assert!(json.starts_with('['));
        let back: IntensityCurve = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
