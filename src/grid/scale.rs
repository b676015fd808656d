//! Colour-scale bounds and axis ticks for whatever renders a grid.

use serde::Serialize;

use crate::grid::builder::DamageGrid;
use crate::grid::compare::{CompareMode, ComparisonGrid};

pub const DEFAULT_TICK_COUNT: usize = 5;
const CDR_AXIS_TICKS: usize = 11;
const DURATION_TICK_STEP: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TickFormat {
    Decimal,
    Percent,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorScale {
    pub min: f64,
    pub max: f64,
    /// Value pinned to the middle colour, if any.
    pub center: Option<f64>,
}

impl ColorScale {
    /// Explicit caps win; missing caps fall back to the grid's own range.
    pub fn for_grid(grid: &DamageGrid, low_cap: Option<f64>, high_cap: Option<f64>) -> Self {
        Self {
            min: low_cap.unwrap_or_else(|| grid.min()),
            max: high_cap.unwrap_or_else(|| grid.max()),
            center: None,
        }
    }

    /// Data range with zero pinned to the middle colour.
    pub fn centered(grid: &ComparisonGrid) -> Self {
        Self {
            min: grid.min(),
            max: grid.max(),
            center: Some(0.0),
        }
    }

    /// Normalised colour position in `[0, 1]`.
    pub fn position(&self, value: f64) -> f64 {
        match self.center {
            None => {
                let span = self.max - self.min;
                if span > 0.0 {
                    ((value - self.min) / span).clamp(0.0, 1.0)
                } else {
                    0.5
                }
            }
            Some(center) => {
                let extent = (self.max - center).max(center - self.min);
                if extent > 0.0 {
                    (0.5 + (value - center) / (2.0 * extent)).clamp(0.0, 1.0)
                } else {
                    0.5
                }
            }
        }
    }

    pub fn ticks(&self, count: usize) -> Vec<f64> {
        linspace(self.min, self.max, count)
    }

    pub fn tick_labels(&self, count: usize, format: TickFormat) -> Vec<String> {
        self.ticks(count)
            .into_iter()
            .map(|tick| match format {
                TickFormat::Decimal => format!("{tick:.2}"),
                TickFormat::Percent => format!("{:.0}%", tick * 100.0),
            })
            .collect()
    }
}

impl TickFormat {
    pub fn for_comparison(mode: CompareMode) -> Self {
        match mode {
            CompareMode::Absolute => Self::Decimal,
            CompareMode::Relative => Self::Percent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTick {
    pub position: f64,
    pub label: String,
}

/// Eleven CDR labels running from the top row (highest CDR) down to 0%.
pub fn cdr_axis_ticks(max_cdr: u32) -> Vec<AxisTick> {
    let top = f64::from(max_cdr.saturating_sub(1));
    linspace(0.0, top, CDR_AXIS_TICKS)
        .into_iter()
        .zip(linspace(top, 0.0, CDR_AXIS_TICKS))
        .map(|(position, percent)| AxisTick {
            position,
            label: format!("{percent:.0}%"),
        })
        .collect()
}

/// A tick every five seconds, including the end of the range.
pub fn duration_axis_ticks(columns: usize) -> Vec<AxisTick> {
    (0..=columns)
        .step_by(DURATION_TICK_STEP)
        .map(|second| AxisTick {
            position: second as f64,
            label: second.to_string(),
        })
        .collect()
}

fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count)
                .map(|i| if i == count - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}
