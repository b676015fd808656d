//! Named weapon snapshots kept in a single JSON file.
//!
//! Presets are listed in insertion (id) order. Names are unique; saving a
//! name that already exists fails instead of overwriting.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::grid::{CombatLength, SampleGridSpec};
use crate::model::{ParamError, WeaponParams};

pub const DEFAULT_PRESETS_PATH: &str = "data/presets.json";

static PRESET_WRITE_MTX: Mutex<()> = Mutex::new(());

#[derive(Debug, Error)]
pub enum PresetError {
    #[error("a preset named '{0}' already exists")]
    DuplicateName(String),
    #[error("Preset not found")]
    NotFound,
    #[error("preset name must not be empty")]
    EmptyName,
    #[error(transparent)]
    Param(#[from] ParamError),
    #[error("preset store io error: {0}")]
    Io(#[from] io::Error),
    #[error("preset store is not valid json: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("preset store lock poisoned")]
    Poisoned,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub id: u64,
    pub name: String,
    pub damage: f64,
    pub mult: u32,
    pub base_cooldown: f64,
    #[serde(default)]
    pub low_cap: Option<f64>,
    #[serde(default)]
    pub high_cap: Option<f64>,
    /// User-facing maximum CDR percent (10..=100).
    pub max_cdr: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,
}

impl Preset {
    pub fn weapon_params(&self) -> Result<WeaponParams, ParamError> {
        WeaponParams::new(self.damage, self.mult, self.base_cooldown)
    }

    pub fn grid_spec(&self, length: CombatLength) -> Result<SampleGridSpec, ParamError> {
        SampleGridSpec::from_percent(self.max_cdr, length)
    }
}

/// Fields supplied when saving; the store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPreset {
    pub name: String,
    pub damage: f64,
    pub mult: u32,
    pub base_cooldown: f64,
    #[serde(default)]
    pub low_cap: Option<f64>,
    #[serde(default)]
    pub high_cap: Option<f64>,
    pub max_cdr: u32,
}

#[derive(Debug, Clone)]
pub struct PresetStore {
    path: PathBuf,
}

impl PresetStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All presets ordered by id. A missing file is an empty store.
    pub fn load_all(&self) -> Result<Vec<Preset>, PresetError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "preset store missing, treating as empty");
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        let mut presets: Vec<Preset> = serde_json::from_str(&raw)?;
        presets.sort_by_key(|preset| preset.id);
        Ok(presets)
    }

    pub fn find(&self, name: &str) -> Result<Preset, PresetError> {
        self.load_all()?
            .into_iter()
            .find(|preset| preset.name == name)
            .ok_or(PresetError::NotFound)
    }

    pub fn save(&self, new: NewPreset) -> Result<Preset, PresetError> {
        let name = new.name.trim().to_string();
        if name.is_empty() {
            return Err(PresetError::EmptyName);
        }
        WeaponParams::new(new.damage, new.mult, new.base_cooldown)?;
        SampleGridSpec::from_percent(new.max_cdr, CombatLength::default())?;

        let _guard = PRESET_WRITE_MTX.lock().map_err(|_| PresetError::Poisoned)?;
        let mut presets = self.load_all()?;
        if presets.iter().any(|preset| preset.name == name) {
            return Err(PresetError::DuplicateName(name));
        }

        let preset = Preset {
            id: presets.iter().map(|preset| preset.id).max().unwrap_or(0) + 1,
            name,
            damage: new.damage,
            mult: new.mult,
            base_cooldown: new.base_cooldown,
            low_cap: new.low_cap,
            high_cap: new.high_cap,
            max_cdr: new.max_cdr,
            saved_at: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
        };
        presets.push(preset.clone());
        self.write_all(&presets)?;
        info!(id = preset.id, name = %preset.name, "saved preset");
        Ok(preset)
    }

    fn write_all(&self, presets: &[Preset]) -> Result<(), PresetError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(presets)?;
        // Rename over the store so a partial write never replaces it.
        let temp_path = self.temp_path();
        fs::write(&temp_path, raw)?;
        fs::rename(&temp_path, &self.path)?;
        debug!(path = %self.path.display(), count = presets.len(), "wrote preset store");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_converts_to_core_inputs() {
        let preset = Preset {
            id: 1,
            name: "Katana".to_string(),
            damage: 30.0,
            mult: 2,
            base_cooldown: 6.0,
            low_cap: None,
            high_cap: Some(500.0),
            max_cdr: 60,
            saved_at: None,
        };
        assert_eq!(
            preset.weapon_params(),
            WeaponParams::new(30.0, 2, 6.0)
        );
        let spec = preset.grid_spec(CombatLength::EndAtStorm).expect("spec");
        assert_eq!(spec.max_cdr, 61);
        assert_eq!(spec.columns(), 30);
    }

    #[test]
    fn legacy_rows_without_timestamp_deserialize() {
        let raw = r#"[{"id":3,"name":"Bow","damage":12.5,"mult":1,"base_cooldown":4.0,"max_cdr":40}]"#;
        let presets: Vec<Preset> = serde_json::from_str(raw).expect("parse");
        assert_eq!(presets[0].low_cap, None);
        assert_eq!(presets[0].saved_at, None);
    }
}
