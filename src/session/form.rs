//! Raw text fields from a weapon editor, parsed into core inputs.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::{CombatLength, SampleGridSpec};
use crate::model::{ParamError, WeaponParams};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error("{field} must be a number, got '{value}'")]
    NotANumber { field: &'static str, value: String },
    #[error(transparent)]
    Param(#[from] ParamError),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeatmapForm {
    pub damage: String,
    pub mult: String,
    pub base_cooldown: String,
    #[serde(default)]
    pub low_cap: String,
    #[serde(default)]
    pub high_cap: String,
    /// User-facing maximum CDR percent (10..=100).
    pub max_cdr: String,
    #[serde(default)]
    pub end_at_storm: bool,
}

/// Everything needed to build and colour one weapon's grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatmapRequest {
    pub params: WeaponParams,
    pub spec: SampleGridSpec,
    #[serde(default)]
    pub low_cap: Option<f64>,
    #[serde(default)]
    pub high_cap: Option<f64>,
}

impl HeatmapRequest {
    pub fn validate(&self) -> Result<(), ParamError> {
        self.params.validate()?;
        self.spec.validate()
    }
}

impl HeatmapForm {
    pub fn parse(&self) -> Result<HeatmapRequest, FormError> {
        let damage: f64 = parse_field("damage", &self.damage)?;
        let mult: u32 = parse_field("mult", &self.mult)?;
        let base_cooldown: f64 = parse_field("base_cooldown", &self.base_cooldown)?;
        let low_cap = parse_optional("low_cap", &self.low_cap)?;
        let high_cap = parse_optional("high_cap", &self.high_cap)?;
        let max_cdr: u32 = parse_field("max_cdr", &self.max_cdr).map_err(|_| {
            ParamError::invalid("max_cdr", "Maximum CDR must be an integer between 10 and 100.")
        })?;

        Ok(HeatmapRequest {
            params: WeaponParams::new(damage, mult, base_cooldown)?,
            spec: SampleGridSpec::from_percent(
                max_cdr,
                CombatLength::from_end_at_storm(self.end_at_storm),
            )?,
            low_cap,
            high_cap,
        })
    }
}

fn parse_field<T: FromStr>(field: &'static str, raw: &str) -> Result<T, FormError> {
    raw.trim().parse::<T>().map_err(|_| FormError::NotANumber {
        field,
        value: raw.to_string(),
    })
}

/// Blank means "derive from data".
pub fn parse_optional(field: &'static str, raw: &str) -> Result<Option<f64>, FormError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_field(field, raw).map(Some)
}
