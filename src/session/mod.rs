//! Per-tab heatmap state. Each tab owns at most one grid; regenerating a tab
//! replaces its grid wholesale.

pub mod form;

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::info;

use crate::grid::{
    build_grid, compare, CompareError, CompareMode, ComparisonGrid, DamageGrid, FallbackPolicy,
};
use crate::model::ParamError;

pub use form::{parse_optional, FormError, HeatmapForm, HeatmapRequest};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("Heatmaps for {0} must be generated first.")]
    MissingGrid(String),
    #[error(transparent)]
    Param(#[from] ParamError),
    #[error(transparent)]
    Compare(#[from] CompareError),
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    grids: BTreeMap<String, DamageGrid>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a grid for `tab`, replacing whatever it held. On failure the
    /// previous grid is left untouched.
    pub fn generate(
        &mut self,
        tab: &str,
        request: &HeatmapRequest,
    ) -> Result<&DamageGrid, SessionError> {
        let grid = build_grid(&request.spec, &request.params)?;
        info!(tab, rows = grid.rows(), columns = grid.columns(), "generated heatmap");
        self.grids.insert(tab.to_string(), grid);
        self.grid(tab)
            .ok_or_else(|| SessionError::MissingGrid(tab.to_string()))
    }

    pub fn grid(&self, tab: &str) -> Option<&DamageGrid> {
        self.grids.get(tab)
    }

    pub fn clear(&mut self, tab: &str) -> Option<DamageGrid> {
        self.grids.remove(tab)
    }

    pub fn tabs(&self) -> impl Iterator<Item = &str> {
        self.grids.keys().map(String::as_str)
    }

    pub fn compare(
        &self,
        left: &str,
        right: &str,
        mode: CompareMode,
        policy: FallbackPolicy,
    ) -> Result<ComparisonGrid, SessionError> {
        let (left_grid, right_grid) = match (self.grid(left), self.grid(right)) {
            (Some(l), Some(r)) => (l, r),
            (None, Some(_)) => return Err(SessionError::MissingGrid(left.to_string())),
            (Some(_), None) => return Err(SessionError::MissingGrid(right.to_string())),
            (None, None) => {
                return Err(SessionError::MissingGrid(format!("{left} and {right}")))
            }
        };
        Ok(compare(left_grid, right_grid, mode, policy)?)
    }
}
