use serde::{Deserialize, Serialize};

use crate::error::EnvError;

/// Number of values in one observation.
pub const OBS_DIM: usize = 4;

/// Cart-pole state captured once per control tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub cart_position: f64,
    pub cart_velocity: f64,
    pub pole_angle: f64,
    pub pole_angular_velocity: f64,
}

impl Observation {
    #[must_use]
    pub const fn new(
        cart_position: f64,
        cart_velocity: f64,
        pole_angle: f64,
        pole_angular_velocity: f64,
    ) -> Self {
        Self {
            cart_position,
            cart_velocity,
            pole_angle,
            pole_angular_velocity,
        }
    }

    /// Values in discretizer order.
    #[must_use]
    pub const fn as_array(&self) -> [f64; OBS_DIM] {
        [
            self.cart_position,
            self.cart_velocity,
            self.pole_angle,
            self.pole_angular_velocity,
        ]
    }

    /// True once the cart or the pole has left the safe envelope.
    #[must_use]
    pub fn out_of_range(&self, limits: &SafetyLimits) -> bool {
        self.cart_position.abs() > limits.cart_position || self.pole_angle.abs() > limits.pole_angle
    }
}

impl TryFrom<&[f64]> for Observation {
    type Error = EnvError;

    fn try_from(raw: &[f64]) -> Result<Self, Self::Error> {
        if raw.len() != OBS_DIM {
            return Err(EnvError::Dimension {
                expected: OBS_DIM,
                actual: raw.len(),
            });
        }
        if let Some(index) = raw.iter().position(|v| !v.is_finite()) {
            return Err(EnvError::NonFinite { index });
        }
        Ok(Self::new(raw[0], raw[1], raw[2], raw[3]))
    }
}

/// Envelope outside of which an episode counts as failed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyLimits {
    /// Metres from the track centre.
    pub cart_position: f64,
    /// Radians from upright.
    pub pole_angle: f64,
}

impl Default for SafetyLimits {
    fn default() -> Self {
        Self {
            cart_position: 2.4,
            pole_angle: std::f64::consts::PI / 12.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_dimension() {
        let err = Observation::try_from(&[0.0, 1.0, 2.0][..]).unwrap_err();
        assert!(matches!(err, EnvError::Dimension { expected: 4, actual: 3 }));
    }

    #[test]
    fn rejects_nan() {
        let err = Observation::try_from(&[0.0, f64::NAN, 0.0, 0.0][..]).unwrap_err();
        assert!(matches!(err, EnvError::NonFinite { index: 1 }));
    }

    #[test]
    fn envelope_is_exclusive() {
        let limits = SafetyLimits::default();
        assert!(!Observation::new(2.4, 0.0, 0.0, 0.0).out_of_range(&limits));
        assert!(Observation::new(-2.5, 0.0, 0.0, 0.0).out_of_range(&limits));
        assert!(Observation::new(0.0, 0.0, 0.3, 0.0).out_of_range(&limits));
    }
}
