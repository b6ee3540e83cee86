//! Logarithmic space

use serde::{Deserialize, Serialize};

use crate::error::{Result, TuneError};

use super::{check_bounds, clamp_bounds, round_within};

fn default_base() -> f64 {
    std::f64::consts::E
}

/// `coordinate = log_base(raw) / scale`, raw strictly positive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSpace {
    pub scale: f64,
    #[serde(default = "default_base")]
    pub base: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default)]
    pub is_integer: bool,
}

impl LogSpace {
    /// Create a natural-log space
    pub fn new(scale: f64) -> Self {
        Self { scale, base: default_base(), min: None, max: None, is_integer: false }
    }

    pub fn with_base(mut self, base: f64) -> Self {
        self.base = base;
        self
    }

    pub fn with_bounds(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn integer(mut self) -> Self {
        self.is_integer = true;
        self
    }

    /// Smallest raw value an integer log space may round to; zero is outside the domain
    pub(crate) fn integer_floor(&self) -> f64 {
        self.min.map_or(1.0, |lo| lo.max(1.0))
    }

    pub(crate) fn to_normalized(&self, raw: f64) -> Result<f64> {
        if !raw.is_finite() || raw <= 0.0 {
            return Err(TuneError::domain("log", raw, "value must be positive and finite"));
        }
        check_bounds("log", raw, self.min, self.max)?;
        Ok(raw.ln() / self.base.ln() / self.scale)
    }

    pub(crate) fn to_raw(&self, coordinate: f64) -> Result<f64> {
        let raw = (coordinate * self.scale * self.base.ln()).exp();
        let raw = if raw.is_infinite() {
            match self.max {
                Some(hi) => hi,
                None => {
                    return Err(TuneError::domain("log", raw, "denormalized value overflowed"))
                }
            }
        } else {
            // exp underflow stays inside the positive domain
            raw.max(f64::MIN_POSITIVE)
        };
        if self.is_integer {
            Ok(round_within(raw, Some(self.integer_floor()), self.max))
        } else {
            Ok(clamp_bounds(raw, self.min, self.max))
        }
    }
}
