//! Tunable parameter declarations

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{Result, TuneError};
use crate::ledger::ROW_ID_KEY;
use crate::space::ParameterSpace;

/// A named space plus the raw value searches start from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub space: ParameterSpace,
    pub search_center: f64,
}

impl Parameter {
    /// Declare a parameter, checking the space and that the center is in its domain
    pub fn new(name: impl Into<String>, space: impl Into<ParameterSpace>, search_center: f64) -> Result<Self> {
        let param = Self { name: name.into(), space: space.into(), search_center };
        param.validate()?;
        Ok(param)
    }

    /// Re-check a (possibly deserialized) declaration
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(TuneError::invalid_config("name", "parameter name must not be empty"));
        }
        if self.name == ROW_ID_KEY {
            return Err(TuneError::invalid_config(
                "name",
                format!("'{ROW_ID_KEY}' is reserved for the row id carried in inputs"),
            ));
        }
        self.space.validate()?;
        self.space.to_normalized(self.search_center)?;
        Ok(())
    }

    /// Search center in normalized coordinates
    pub fn normalized_center(&self) -> Result<f64> {
        self.space.to_normalized(self.search_center)
    }

    /// The part of the declaration a store must agree with on reload
    pub fn schema(&self) -> ParamSchema {
        ParamSchema { name: self.name.clone(), space: self.space.clone() }
    }
}

/// Stored fingerprint of one declared parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSchema {
    pub name: String,
    pub space: ParameterSpace,
}

/// Validate a full declaration list: non-empty, unique names, valid entries
pub fn validate_params(params: &[Parameter]) -> Result<()> {
    if params.is_empty() {
        return Err(TuneError::invalid_config("params", "at least one parameter is required"));
    }
    let mut seen = HashSet::new();
    for param in params {
        param.validate()?;
        if !seen.insert(param.name.as_str()) {
            return Err(TuneError::invalid_config(
                "params",
                format!("duplicate parameter name '{}'", param.name),
            ));
        }
    }
    Ok(())
}

/// Describe the first disagreement between stored and declared schemas
pub(crate) fn schema_mismatch(stored: &[ParamSchema], declared: &[ParamSchema]) -> Option<String> {
    if stored.len() != declared.len() {
        let names = |s: &[ParamSchema]| s.iter().map(|p| p.name.clone()).collect::<Vec<_>>().join(", ");
        return Some(format!(
            "store has {} parameters [{}], declared {} [{}]",
            stored.len(),
            names(stored),
            declared.len(),
            names(declared)
        ));
    }
    stored.iter().zip(declared).enumerate().find_map(|(i, (s, d))| {
        if s.name != d.name {
            Some(format!("position {i}: stored '{}', declared '{}'", s.name, d.name))
        } else if s.space != d.space {
            Some(format!("'{}': stored {:?}, declared {:?}", s.name, s.space, d.space))
        } else {
            None
        }
    })
}
