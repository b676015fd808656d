use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::{NewPreset, Preset, PresetError, PresetStore};
use crate::grid::{
    cdr_axis_ticks, describe_comparison, describe_damage, duration_axis_ticks, AxisTick,
    CombatLength, CompareMode, ColorScale, DamageGrid, FallbackPolicy, SampleGridSpec, TickFormat,
    DEFAULT_TICK_COUNT,
};
use crate::model::{ParamError, WeaponParams};
use crate::parallel::{evaluate_presets, rank_evaluations, PresetEvaluation, Probe, WorkerPool};
use crate::session::{HeatmapRequest, Session, SessionError};

const LEFT_TAB: &str = "Weapon 1";
const RIGHT_TAB: &str = "Weapon 2";

/// Shared state handed to every route.
#[derive(Debug, Clone)]
pub struct ApiContext {
    pub presets: PresetStore,
    pub pool: WorkerPool,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request body: {0}")]
    Parse(serde_json::Error),
    #[error("{0}")]
    Query(String),
    #[error(transparent)]
    Param(#[from] ParamError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Preset(#[from] PresetError),
    #[error("failed to serialize response: {0}")]
    Serialize(serde_json::Error),
}

/// One weapon as submitted by a client. `max_cdr` is the user-facing percent.
#[derive(Debug, Clone, Deserialize)]
pub struct WeaponInput {
    pub damage: f64,
    pub mult: u32,
    pub base_cooldown: f64,
    pub max_cdr: u32,
    #[serde(default)]
    pub duration_range: CombatLength,
    #[serde(default)]
    pub low_cap: Option<f64>,
    #[serde(default)]
    pub high_cap: Option<f64>,
}

impl WeaponInput {
    fn to_request(&self) -> Result<HeatmapRequest, ParamError> {
        Ok(HeatmapRequest {
            params: WeaponParams::new(self.damage, self.mult, self.base_cooldown)?,
            spec: SampleGridSpec::from_percent(self.max_cdr, self.duration_range)?,
            low_cap: self.low_cap,
            high_cap: self.high_cap,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HeatmapApiRequest {
    #[serde(flatten)]
    pub weapon: WeaponInput,
    #[serde(default)]
    pub probe: Option<Probe>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompareApiRequest {
    pub left: WeaponInput,
    pub right: WeaponInput,
    #[serde(default)]
    pub mode: CompareMode,
    #[serde(default)]
    pub policy: FallbackPolicy,
    #[serde(default)]
    pub probe: Option<Probe>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScaleSummary {
    pub min: f64,
    pub max: f64,
    pub ticks: Vec<String>,
}

impl ScaleSummary {
    fn new(scale: &ColorScale, format: TickFormat) -> Self {
        Self {
            min: scale.min,
            max: scale.max,
            ticks: scale.tick_labels(DEFAULT_TICK_COUNT, format),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HeatmapResponse {
    pub status: &'static str,
    pub rows: usize,
    pub columns: usize,
    /// Row 0 is the highest CDR percent.
    pub values: Vec<Vec<f64>>,
    pub scale: ScaleSummary,
    pub cdr_axis: Vec<AxisTick>,
    pub duration_axis: Vec<AxisTick>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readout: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompareResponse {
    pub status: &'static str,
    pub mode: CompareMode,
    pub rows: usize,
    pub columns: usize,
    pub values: Vec<Vec<f64>>,
    pub max_positive: Option<f64>,
    pub max_negative: Option<f64>,
    pub scale: ScaleSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readout: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankResponse {
    pub status: &'static str,
    pub probe: Probe,
    pub duration_range: u32,
    pub rankings: Vec<PresetEvaluation>,
}

pub fn health_payload() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "service": "cdr-heatmap-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

fn nested(values: &[f64], columns: usize) -> Vec<Vec<f64>> {
    values.chunks(columns.max(1)).map(<[f64]>::to_vec).collect()
}

fn grid_response(grid: &DamageGrid, request: &HeatmapRequest, probe: Option<Probe>) -> HeatmapResponse {
    let scale = ColorScale::for_grid(grid, request.low_cap, request.high_cap);
    HeatmapResponse {
        status: "ok",
        rows: grid.rows(),
        columns: grid.columns(),
        values: nested(grid.values(), grid.columns()),
        scale: ScaleSummary::new(&scale, TickFormat::Decimal),
        cdr_axis: cdr_axis_ticks(grid.max_cdr()),
        duration_axis: duration_axis_ticks(grid.columns()),
        readout: probe.and_then(|p| describe_damage(grid, p.cdr_percent, p.seconds)),
    }
}

pub fn heatmap_payload(body: &str) -> Result<String, ApiError> {
    let request: HeatmapApiRequest = serde_json::from_str(body).map_err(ApiError::Parse)?;
    let heatmap = request.weapon.to_request()?;

    let mut session = Session::new();
    let grid = session.generate(LEFT_TAB, &heatmap)?;
    let response = grid_response(grid, &heatmap, request.probe);
    serde_json::to_string_pretty(&response).map_err(ApiError::Serialize)
}

pub fn compare_payload(body: &str) -> Result<String, ApiError> {
    let request: CompareApiRequest = serde_json::from_str(body).map_err(ApiError::Parse)?;

    let mut session = Session::new();
    session.generate(LEFT_TAB, &request.left.to_request()?)?;
    session.generate(RIGHT_TAB, &request.right.to_request()?)?;
    let comparison = session.compare(LEFT_TAB, RIGHT_TAB, request.mode, request.policy)?;

    let scale = ColorScale::centered(&comparison);
    let response = CompareResponse {
        status: "ok",
        mode: comparison.mode(),
        rows: comparison.rows(),
        columns: comparison.columns(),
        values: nested(comparison.values(), comparison.columns()),
        max_positive: comparison.max_positive(),
        max_negative: comparison.max_negative(),
        scale: ScaleSummary::new(&scale, TickFormat::for_comparison(comparison.mode())),
        readout: request.probe.and_then(|p| {
            describe_comparison(&comparison, p.cdr_percent, p.seconds, LEFT_TAB, RIGHT_TAB)
        }),
    };
    serde_json::to_string_pretty(&response).map_err(ApiError::Serialize)
}

pub fn presets_list_payload(store: &PresetStore) -> Result<String, ApiError> {
    let presets: Vec<Preset> = store.load_all()?;
    serde_json::to_string_pretty(&serde_json::json!({ "presets": presets }))
        .map_err(ApiError::Serialize)
}

pub fn preset_post_payload(store: &PresetStore, body: &str) -> Result<String, ApiError> {
    let new: NewPreset = serde_json::from_str(body).map_err(ApiError::Parse)?;
    let preset = store.save(new)?;
    serde_json::to_string_pretty(&preset).map_err(ApiError::Serialize)
}

/// Parse `key=value` out of the query string.
fn query_param<'a>(path: &'a str, key: &str) -> Option<&'a str> {
    let query = path.split('?').nth(1)?;
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k.trim() == key).then(|| v.trim())
    })
}

fn parse_query<T: std::str::FromStr>(path: &str, key: &str, default: T) -> Result<T, ApiError> {
    match query_param(path, key) {
        None => Ok(default),
        Some(raw) => raw
            .parse::<T>()
            .map_err(|_| ApiError::Query(format!("query parameter '{key}' is invalid: '{raw}'"))),
    }
}

pub fn rank_payload(ctx: &ApiContext, path: &str) -> Result<String, ApiError> {
    let probe = Probe {
        cdr_percent: parse_query(path, "cdr", 0_u32)?,
        seconds: parse_query(path, "seconds", 30_usize)?,
    };
    let length = CombatLength::try_from(parse_query(path, "length", 60_u32)?)?;

    let presets = ctx.presets.load_all()?;
    let rankings = rank_evaluations(evaluate_presets(&presets, length, probe, &ctx.pool));
    let response = RankResponse {
        status: "ok",
        probe,
        duration_range: length.into(),
        rankings,
    };
    serde_json::to_string_pretty(&response).map_err(ApiError::Serialize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_param_finds_key() {
        assert_eq!(query_param("/api/presets/rank?cdr=20&seconds=15", "seconds"), Some("15"));
        assert_eq!(query_param("/api/presets/rank?cdr=20", "seconds"), None);
        assert_eq!(query_param("/api/presets/rank", "cdr"), None);
    }

    #[test]
    fn nested_splits_rows() {
        assert_eq!(
            nested(&[1.0, 2.0, 3.0, 4.0], 2),
            vec![vec![1.0, 2.0], vec![3.0, 4.0]]
        );
    }
}
