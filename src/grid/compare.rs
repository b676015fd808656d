//! Cell-by-cell comparison of two damage grids.
//!
//! Relative mode cannot express "one side dealt nothing" as a finite ratio,
//! so such cells are deferred and later filled with a sentinel just beyond
//! the strongest ratio observed for that side.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::grid::builder::DamageGrid;

/// Sentinels sit this far past the strongest observed ratio.
pub const SENTINEL_FACTOR: f64 = 1.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareMode {
    /// `a - b`.
    Absolute,
    /// Signed ratio against the weaker side.
    #[default]
    Relative,
}

/// What to reference when a sentinel is needed but no resolved cell of that
/// sign exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Reference ±1.0 (±100%), so sentinels become ±1.01.
    #[default]
    UnitMagnitude,
    /// Reference zero; sentinels collapse to 0.
    Zero,
    /// Fail with [CompareError::NoPositive] / [CompareError::NoNegative].
    Reject,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompareError {
    #[error("grids must have the same dimensions: left is {left:?}, right is {right:?}")]
    DimensionMismatch {
        left: (usize, usize),
        right: (usize, usize),
    },
    #[error("no cell where the left grid is stronger to size a sentinel against")]
    NoPositive,
    #[error("no cell where the right grid is stronger to size a sentinel against")]
    NoNegative,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonGrid {
    mode: CompareMode,
    rows: usize,
    columns: usize,
    values: Vec<f64>,
    /// Largest resolved ratio before sentinels were filled in.
    max_positive: Option<f64>,
    /// Most negative resolved ratio before sentinels were filled in.
    max_negative: Option<f64>,
    /// Per cell, the side that dealt no damage when only one did.
    #[serde(skip)]
    deferred: Vec<Option<ZeroSide>>,
}

impl ComparisonGrid {
    pub fn mode(&self) -> CompareMode {
        self.mode
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.columns)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        if row >= self.rows || column >= self.columns {
            return None;
        }
        self.values.get(row * self.columns + column).copied()
    }

    /// Look up by CDR percent, mirroring [DamageGrid::value_at].
    pub fn value_at(&self, cdr_percent: u32, seconds: usize) -> Option<f64> {
        let cdr = cdr_percent as usize;
        if cdr >= self.rows {
            return None;
        }
        self.get(self.rows - 1 - cdr, seconds)
    }

    /// Which side dealt nothing at this CDR percent and second, if exactly one did.
    /// Always `None` in absolute mode.
    pub fn zero_side_at(&self, cdr_percent: u32, seconds: usize) -> Option<ZeroSide> {
        let cdr = cdr_percent as usize;
        if cdr >= self.rows || seconds >= self.columns {
            return None;
        }
        let index = (self.rows - 1 - cdr) * self.columns + seconds;
        self.deferred.get(index).copied().flatten()
    }

    pub fn max_positive(&self) -> Option<f64> {
        self.max_positive
    }

    pub fn max_negative(&self) -> Option<f64> {
        self.max_negative
    }

    pub fn min(&self) -> f64 {
        self.values.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

/// The grid that dealt zero damage in a cell where the other did not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZeroSide {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Cell {
    Resolved(f64),
    Deferred(ZeroSide),
}

pub fn compare(
    left: &DamageGrid,
    right: &DamageGrid,
    mode: CompareMode,
    policy: FallbackPolicy,
) -> Result<ComparisonGrid, CompareError> {
    if left.shape() != right.shape() {
        return Err(CompareError::DimensionMismatch {
            left: left.shape(),
            right: right.shape(),
        });
    }

    let (rows, columns) = left.shape();
    let pairs = left.values().iter().copied().zip(right.values().iter().copied());

    let (values, max_positive, max_negative, deferred) = match mode {
        CompareMode::Absolute => (pairs.map(|(a, b)| a - b).collect(), None, None, Vec::new()),
        CompareMode::Relative => {
            let cells: Vec<Cell> = pairs.map(|(a, b)| relative_cell(a, b)).collect();
            let (max_positive, max_negative) = resolved_extremes(&cells);
            let values = fill_deferred(&cells, max_positive, max_negative, policy)?;
            let deferred = cells
                .iter()
                .map(|cell| match cell {
                    Cell::Deferred(side) => Some(*side),
                    Cell::Resolved(_) => None,
                })
                .collect();
            (values, max_positive, max_negative, deferred)
        }
    };

    debug!(rows, columns, ?mode, ?max_positive, ?max_negative, "compared grids");
    Ok(ComparisonGrid {
        mode,
        rows,
        columns,
        values,
        max_positive,
        max_negative,
        deferred,
    })
}

fn relative_cell(a: f64, b: f64) -> Cell {
    match (a == 0.0, b == 0.0) {
        (true, true) => Cell::Resolved(0.0),
        (true, false) => Cell::Deferred(ZeroSide::Left),
        (false, true) => Cell::Deferred(ZeroSide::Right),
        (false, false) if a > b => Cell::Resolved((a - b) / b),
        (false, false) => Cell::Resolved(-(b - a) / a),
    }
}

fn resolved_extremes(cells: &[Cell]) -> (Option<f64>, Option<f64>) {
    cells
        .iter()
        .filter_map(|cell| match cell {
            Cell::Resolved(value) if value.is_finite() => Some(*value),
            _ => None,
        })
        .fold((None, None), |(pos, neg): (Option<f64>, Option<f64>), value| {
            if value > 0.0 {
                (Some(pos.map_or(value, |p| p.max(value))), neg)
            } else if value < 0.0 {
                (pos, Some(neg.map_or(value, |n| n.min(value))))
            } else {
                (pos, neg)
            }
        })
}

fn fill_deferred(
    cells: &[Cell],
    max_positive: Option<f64>,
    max_negative: Option<f64>,
    policy: FallbackPolicy,
) -> Result<Vec<f64>, CompareError> {
    let needs_positive = cells.contains(&Cell::Deferred(ZeroSide::Right));
    let needs_negative = cells.contains(&Cell::Deferred(ZeroSide::Left));

    let positive_sentinel = if needs_positive {
        reference(max_positive, 1.0, policy, CompareError::NoPositive)? * SENTINEL_FACTOR
    } else {
        0.0
    };
    let negative_sentinel = if needs_negative {
        reference(max_negative, -1.0, policy, CompareError::NoNegative)? * SENTINEL_FACTOR
    } else {
        0.0
    };

    Ok(cells
        .iter()
        .map(|cell| match cell {
            Cell::Resolved(value) => *value,
            Cell::Deferred(ZeroSide::Left) => negative_sentinel,
            Cell::Deferred(ZeroSide::Right) => positive_sentinel,
        })
        .collect())
}

fn reference(
    observed: Option<f64>,
    unit: f64,
    policy: FallbackPolicy,
    missing: CompareError,
) -> Result<f64, CompareError> {
    match (observed, policy) {
        (Some(value), _) => Ok(value),
        (None, FallbackPolicy::UnitMagnitude) => Ok(unit),
        (None, FallbackPolicy::Zero) => Ok(0.0),
        (None, FallbackPolicy::Reject) => Err(missing),
    }
}
