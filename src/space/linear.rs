//! Linear (affine) space

use serde::{Deserialize, Serialize};

use crate::error::{Result, TuneError};

use super::{check_bounds, clamp_bounds, round_within};

/// `coordinate = (raw - offset) / scale`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearSpace {
    /// Raw units per normalized unit
    pub scale: f64,
    /// Raw value mapped to coordinate zero
    #[serde(default)]
    pub offset: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Round raw values to integers in `to_raw`
    #[serde(default)]
    pub is_integer: bool,
}

impl LinearSpace {
    /// Create an unbounded linear space
    pub fn new(scale: f64) -> Self {
        Self { scale, offset: 0.0, min: None, max: None, is_integer: false }
    }

    /// Set the raw value that maps to coordinate zero
    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    /// Restrict the raw domain to `[min, max]`
    pub fn with_bounds(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Round suggestions to integers
    pub fn integer(mut self) -> Self {
        self.is_integer = true;
        self
    }

    pub(crate) fn to_normalized(&self, raw: f64) -> Result<f64> {
        if !raw.is_finite() {
            return Err(TuneError::domain("linear", raw, "value must be finite"));
        }
        check_bounds("linear", raw, self.min, self.max)?;
        Ok((raw - self.offset) / self.scale)
    }

    pub(crate) fn to_raw(&self, coordinate: f64) -> Result<f64> {
        let raw = coordinate * self.scale + self.offset;
        if !raw.is_finite() {
            return Err(TuneError::domain("linear", raw, "denormalized value overflowed"));
        }
        if self.is_integer {
            Ok(round_within(raw, self.min, self.max))
        } else {
            Ok(clamp_bounds(raw, self.min, self.max))
        }
    }
}
