//! Samples the damage model over integer (CDR percent, second) pairs.
//!
//! Storage row `r` holds CDR percent `max_cdr - 1 - r`, so row 0 is the
//! highest CDR in range and renders at the top of a heatmap.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{ParamError, WeaponParams};

/// Smallest accepted exclusive CDR bound (0..=10%).
pub const MIN_MAX_CDR: u32 = 11;
/// Largest accepted exclusive CDR bound (0..=100%).
pub const MAX_MAX_CDR: u32 = 101;

/// How many seconds of combat a grid covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum CombatLength {
    /// Fight ends when the storm arrives.
    EndAtStorm,
    #[default]
    Full,
}

impl CombatLength {
    pub const fn columns(self) -> usize {
        match self {
            Self::EndAtStorm => 30,
            Self::Full => 60,
        }
    }

    pub const fn from_end_at_storm(end_at_storm: bool) -> Self {
        if end_at_storm {
            Self::EndAtStorm
        } else {
            Self::Full
        }
    }
}

impl TryFrom<u32> for CombatLength {
    type Error = ParamError;

    fn try_from(seconds: u32) -> Result<Self, Self::Error> {
        match seconds {
            30 => Ok(Self::EndAtStorm),
            60 => Ok(Self::Full),
            other => Err(ParamError::invalid(
                "duration_range",
                format!("must be 30 or 60 seconds, got {other}"),
            )),
        }
    }
}

impl From<CombatLength> for u32 {
    fn from(length: CombatLength) -> Self {
        length.columns() as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleGridSpec {
    /// Exclusive upper bound on sampled CDR percents; rows are `0..max_cdr`.
    pub max_cdr: u32,
    #[serde(rename = "duration_range", default)]
    pub length: CombatLength,
}

impl SampleGridSpec {
    pub fn new(max_cdr: u32, length: CombatLength) -> Result<Self, ParamError> {
        let spec = Self { max_cdr, length };
        spec.validate()?;
        Ok(spec)
    }

    /// Build from the user-facing "maximum CDR" percent (10..=100), which is
    /// inclusive and therefore one less than the stored bound.
    pub fn from_percent(max_cdr_percent: u32, length: CombatLength) -> Result<Self, ParamError> {
        Self::new(max_cdr_percent.saturating_add(1), length)
    }

    pub fn validate(&self) -> Result<(), ParamError> {
        if !(MIN_MAX_CDR..=MAX_MAX_CDR).contains(&self.max_cdr) {
            return Err(ParamError::invalid(
                "max_cdr",
                "Maximum CDR must be an integer between 10 and 100.",
            ));
        }
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.max_cdr as usize
    }

    pub fn columns(&self) -> usize {
        self.length.columns()
    }
}

/// Expected damage for every sampled (CDR, second) pair, row-major.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DamageGrid {
    max_cdr: u32,
    columns: usize,
    values: Vec<f64>,
}

impl DamageGrid {
    /// Wrap precomputed row-major values. `values.len()` must equal `max_cdr * columns`.
    pub fn from_values(max_cdr: u32, columns: usize, values: Vec<f64>) -> Option<Self> {
        (values.len() == max_cdr as usize * columns).then_some(Self {
            max_cdr,
            columns,
            values,
        })
    }

    pub fn max_cdr(&self) -> u32 {
        self.max_cdr
    }

    pub fn rows(&self) -> usize {
        self.max_cdr as usize
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows(), self.columns)
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        if row >= self.rows() || column >= self.columns {
            return None;
        }
        self.values.get(row * self.columns + column).copied()
    }

    pub fn row(&self, row: usize) -> Option<&[f64]> {
        if row >= self.rows() {
            return None;
        }
        let start = row * self.columns;
        self.values.get(start..start + self.columns)
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks(self.columns.max(1))
    }

    /// CDR percent represented by a storage row.
    pub fn cdr_percent_for_row(&self, row: usize) -> Option<u32> {
        (row < self.rows()).then(|| self.max_cdr - 1 - row as u32)
    }

    /// Look up by CDR percent and elapsed seconds instead of storage row.
    pub fn value_at(&self, cdr_percent: u32, seconds: usize) -> Option<f64> {
        if cdr_percent >= self.max_cdr {
            return None;
        }
        self.get((self.max_cdr - 1 - cdr_percent) as usize, seconds)
    }

    pub fn min(&self) -> f64 {
        self.values.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

pub fn build_grid(spec: &SampleGridSpec, params: &WeaponParams) -> Result<DamageGrid, ParamError> {
    spec.validate()?;
    params.validate()?;

    let rows = spec.rows();
    let columns = spec.columns();
    let mut values = Vec::with_capacity(rows * columns);
    for row in 0..rows {
        let cdr_percent = f64::from(spec.max_cdr - 1 - row as u32);
        for column in 0..columns {
            values.push(params.expected_damage(cdr_percent, column as f64));
        }
    }

    debug!(rows, columns, ?params, "built damage grid");
    Ok(DamageGrid {
        max_cdr: spec.max_cdr,
        columns,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_params() -> WeaponParams {
        WeaponParams::new(10.0, 1, 5.0).expect("valid params")
    }

    #[test]
    fn dimensions_follow_spec() {
        let spec = SampleGridSpec::new(21, CombatLength::EndAtStorm).expect("valid spec");
        let grid = build_grid(&spec, &sample_params()).expect("grid");
        assert_eq!(grid.shape(), (21, 30));
        assert_eq!(grid.values().len(), 21 * 30);
    }

    #[test]
    fn first_row_holds_highest_cdr() {
        let spec = SampleGridSpec::new(51, CombatLength::Full).expect("valid spec");
        let params = sample_params();
        let grid = build_grid(&spec, &params).expect("grid");
        assert_eq!(grid.cdr_percent_for_row(0), Some(50));
        assert_eq!(grid.get(0, 7), Some(params.expected_damage(50.0, 7.0)));
        assert_eq!(grid.get(50, 7), Some(params.expected_damage(0.0, 7.0)));
        assert_eq!(grid.value_at(0, 7), grid.get(50, 7));
    }

    #[test]
    fn out_of_range_lookups_return_none() {
        let spec = SampleGridSpec::new(11, CombatLength::EndAtStorm).expect("valid spec");
        let grid = build_grid(&spec, &sample_params()).expect("grid");
        assert_eq!(grid.get(11, 0), None);
        assert_eq!(grid.get(0, 30), None);
        assert_eq!(grid.value_at(11, 0), None);
        assert!(grid.row(11).is_none());
    }

    #[test]
    fn spec_rejects_out_of_band_bounds() {
        assert!(SampleGridSpec::new(10, CombatLength::Full).is_err());
        assert!(SampleGridSpec::new(102, CombatLength::Full).is_err());
        assert_eq!(
            SampleGridSpec::from_percent(100, CombatLength::Full).map(|s| s.max_cdr),
            Ok(101)
        );
    }

    #[test]
    fn build_guards_against_invalid_params() {
        let spec = SampleGridSpec::new(11, CombatLength::Full).expect("valid spec");
        let params = WeaponParams {
            damage: 10.0,
            mult: 1,
            base_cooldown: 0.0,
        };
        assert!(build_grid(&spec, &params).is_err());
    }

    #[test]
    fn combat_length_serializes_as_seconds() {
        let spec = SampleGridSpec::new(11, CombatLength::EndAtStorm).expect("valid spec");
        let json = serde_json::to_value(spec).expect("serialize");
        assert_eq!(json["duration_range"], 30);
        let bad: Result<SampleGridSpec, _> =
            serde_json::from_str(r#"{"max_cdr":11,"duration_range":45}"#);
        assert!(bad.is_err());
    }
}
