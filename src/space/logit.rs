//! Logit (sigmoid-domain) space

use serde::{Deserialize, Serialize};

use crate::error::{Result, TuneError};

use super::{check_bounds, clamp_bounds};

/// Distance from 0 and 1 inside which logit inputs and logistic outputs are
/// clamped, so neither direction of the transform reaches an infinity.
pub const LOGIT_EPSILON: f64 = 1e-9;

/// `coordinate = logit(raw) / scale`, raw in the open interval (0, 1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogitSpace {
    pub scale: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl LogitSpace {
    pub fn new(scale: f64) -> Self {
        Self { scale, min: None, max: None }
    }

    pub fn with_bounds(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub(crate) fn to_normalized(&self, raw: f64) -> Result<f64> {
        if !raw.is_finite() || raw <= 0.0 || raw >= 1.0 {
            return Err(TuneError::domain("logit", raw, "value must lie in (0, 1)"));
        }
        check_bounds("logit", raw, self.min, self.max)?;
        let p = raw.clamp(LOGIT_EPSILON, 1.0 - LOGIT_EPSILON);
        Ok((p / (1.0 - p)).ln() / self.scale)
    }

    pub(crate) fn to_raw(&self, coordinate: f64) -> Result<f64> {
        let x = coordinate * self.scale;
        let p = if x >= 0.0 {
            1.0 / (1.0 + (-x).exp())
        } else {
            let e = x.exp();
            e / (1.0 + e)
        };
        let p = p.clamp(LOGIT_EPSILON, 1.0 - LOGIT_EPSILON);
        Ok(clamp_bounds(p, self.min, self.max))
    }
}
