//! Parameter spaces
//!
//! A space maps a user-facing raw value onto a normalized search coordinate
//! and back. The proposer only ever sees normalized coordinates; callers only
//! ever see raw values.
//!
//! # Example
//!
//! ```
//! use afinar::space::{LogSpace, ParameterSpace};
//!
//! let space = ParameterSpace::Log(LogSpace::new(1.0));
//! let coord = space.to_normalized(1e-2)?;
//! let raw = space.to_raw(coord)?;
//! assert!((raw - 1e-2).abs() < 1e-12);
//! # Ok::<(), afinar::TuneError>(())
//! ```

mod linear;
mod log;
mod logit;


use serde::{Deserialize, Serialize};

use crate::error::{Result, TuneError};

pub use linear::LinearSpace;
pub use log::LogSpace;
pub use logit::{LogitSpace, LOGIT_EPSILON};

/// Bidirectional raw <-> normalized transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParameterSpace {
    /// Affine transform, unbounded domain unless `min`/`max` are set
    Linear(LinearSpace),
    /// Logarithmic transform, strictly positive domain
    Log(LogSpace),
    /// Logit transform, open unit interval domain
    Logit(LogitSpace),
}

impl ParameterSpace {
    /// Short name used in errors and stored schemas
    pub fn kind(&self) -> &'static str {
        match self {
            ParameterSpace::Linear(_) => "linear",
            ParameterSpace::Log(_) => "log",
            ParameterSpace::Logit(_) => "logit",
        }
    }

    /// Map a raw value onto the normalized search coordinate
    pub fn to_normalized(&self, raw: f64) -> Result<f64> {
        match self {
            ParameterSpace::Linear(s) => s.to_normalized(raw),
            ParameterSpace::Log(s) => s.to_normalized(raw),
            ParameterSpace::Logit(s) => s.to_normalized(raw),
        }
    }

    /// Map a normalized coordinate back onto a raw value
    pub fn to_raw(&self, coordinate: f64) -> Result<f64> {
        if !coordinate.is_finite() {
            return Err(TuneError::domain(self.kind(), coordinate, "coordinate must be finite"));
        }
        match self {
            ParameterSpace::Linear(s) => s.to_raw(coordinate),
            ParameterSpace::Log(s) => s.to_raw(coordinate),
            ParameterSpace::Logit(s) => s.to_raw(coordinate),
        }
    }

    /// Check whether a raw value lies in the valid domain
    pub fn contains(&self, raw: f64) -> bool {
        self.to_normalized(raw).is_ok()
    }

    /// Validate the space declaration itself (scale, bounds, base)
    pub fn validate(&self) -> Result<()> {
        let scale = match self {
            ParameterSpace::Linear(s) => s.scale,
            ParameterSpace::Log(s) => s.scale,
            ParameterSpace::Logit(s) => s.scale,
        };
        if !(scale.is_finite() && scale > 0.0) {
            return Err(TuneError::invalid_config(
                "scale",
                format!("{} space scale must be positive and finite, got {scale}", self.kind()),
            ));
        }
        match self {
            ParameterSpace::Linear(s) => {
                if !s.offset.is_finite() {
                    return Err(TuneError::invalid_config("offset", "must be finite"));
                }
                validate_bounds(self.kind(), s.min, s.max)?;
                if s.is_integer {
                    validate_integer_bounds(self.kind(), s.min, s.max)?;
                }
                Ok(())
            }
            ParameterSpace::Log(s) => {
                if !(s.base.is_finite() && s.base > 0.0 && s.base != 1.0) {
                    return Err(TuneError::invalid_config(
                        "base",
                        format!("log base must be positive and not 1, got {}", s.base),
                    ));
                }
                if s.min.is_some_and(|m| m <= 0.0) {
                    return Err(TuneError::invalid_config("min", "log space bounds must be positive"));
                }
                validate_bounds(self.kind(), s.min, s.max)?;
                if s.is_integer {
                    validate_integer_bounds(self.kind(), Some(s.integer_floor()), s.max)?;
                }
                Ok(())
            }
            ParameterSpace::Logit(s) => {
                let outside = |v: f64| v <= 0.0 || v >= 1.0;
                if s.min.is_some_and(outside) || s.max.is_some_and(outside) {
                    return Err(TuneError::invalid_config(
                        "min/max",
                        "logit space bounds must lie inside (0, 1)",
                    ));
                }
                validate_bounds(self.kind(), s.min, s.max)
            }
        }
    }
}

impl From<LinearSpace> for ParameterSpace {
    fn from(space: LinearSpace) -> Self {
        ParameterSpace::Linear(space)
    }
}

impl From<LogSpace> for ParameterSpace {
    fn from(space: LogSpace) -> Self {
        ParameterSpace::Log(space)
    }
}

impl From<LogitSpace> for ParameterSpace {
    fn from(space: LogitSpace) -> Self {
        ParameterSpace::Logit(space)
    }
}

fn validate_bounds(kind: &str, min: Option<f64>, max: Option<f64>) -> Result<()> {
    for (field, bound) in [("min", min), ("max", max)] {
        if bound.is_some_and(|b| !b.is_finite()) {
            return Err(TuneError::invalid_config(field, format!("{kind} space bound must be finite")));
        }
    }
    if let (Some(lo), Some(hi)) = (min, max) {
        if lo >= hi {
            return Err(TuneError::invalid_config(
                "min/max",
                format!("{kind} space requires min < max, got [{lo}, {hi}]"),
            ));
        }
    }
    Ok(())
}

/// An integer space needs at least one integer inside its bounds
fn validate_integer_bounds(kind: &str, min: Option<f64>, max: Option<f64>) -> Result<()> {
    if let (Some(lo), Some(hi)) = (min, max) {
        if lo.ceil() > hi.floor() {
            return Err(TuneError::invalid_config(
                "min/max",
                format!("integer {kind} space has no integer in [{lo}, {hi}]"),
            ));
        }
    }
    Ok(())
}

/// Reject raw values outside declared bounds
pub(crate) fn check_bounds(
    kind: &'static str,
    raw: f64,
    min: Option<f64>,
    max: Option<f64>,
) -> Result<()> {
    if let Some(lo) = min {
        if raw < lo {
            return Err(TuneError::domain(kind, raw, format!("below declared min {lo}")));
        }
    }
    if let Some(hi) = max {
        if raw > hi {
            return Err(TuneError::domain(kind, raw, format!("above declared max {hi}")));
        }
    }
    Ok(())
}

pub(crate) fn clamp_bounds(raw: f64, min: Option<f64>, max: Option<f64>) -> f64 {
    let raw = min.map_or(raw, |lo| raw.max(lo));
    max.map_or(raw, |hi| raw.min(hi))
}

/// Round to the nearest integer that still respects the bounds
pub(crate) fn round_within(raw: f64, min: Option<f64>, max: Option<f64>) -> f64 {
    let lo = min.map(f64::ceil);
    let hi = max.map(f64::floor);
    clamp_bounds(raw.round(), lo, hi)
}
