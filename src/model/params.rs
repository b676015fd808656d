use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::damage::expected_damage;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("invalid parameter `{field}`: {reason}")]
    InvalidParameter { field: &'static str, reason: String },
}

impl ParamError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }
}

/// Immutable weapon stats fed to the damage model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponParams {
    /// Damage per hit.
    pub damage: f64,
    /// Hits per activation.
    pub mult: u32,
    /// Cooldown in seconds at 0% CDR.
    pub base_cooldown: f64,
}

impl WeaponParams {
    pub fn new(damage: f64, mult: u32, base_cooldown: f64) -> Result<Self, ParamError> {
        let params = Self {
            damage,
            mult,
            base_cooldown,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), ParamError> {
        if !self.damage.is_finite() || self.damage < 0.0 {
            return Err(ParamError::invalid(
                "damage",
                format!("must be a finite non-negative number, got {}", self.damage),
            ));
        }
        if self.mult == 0 {
            return Err(ParamError::invalid("mult", "must be at least 1"));
        }
        if !self.base_cooldown.is_finite() || self.base_cooldown <= 0.0 {
            return Err(ParamError::invalid(
                "base_cooldown",
                format!("must be a finite positive number, got {}", self.base_cooldown),
            ));
        }
        Ok(())
    }

    pub fn expected_damage(&self, y_percent: f64, seconds: f64) -> f64 {
        expected_damage(y_percent, seconds, self.damage, self.mult, self.base_cooldown)
    }
}
