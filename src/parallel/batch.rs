//! Evaluate every stored preset at a probe point and rank them.
//!
//! Each preset's grid is built independently, so the sweep fans out one
//! preset per Rayon task.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::data::Preset;
use crate::grid::{build_grid, CombatLength};
use crate::parallel::pool::WorkerPool;

/// Cell to rank presets by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Probe {
    pub cdr_percent: u32,
    pub seconds: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresetEvaluation {
    pub id: u64,
    pub name: String,
    /// Best cell anywhere in the preset's grid.
    pub peak_damage: f64,
    /// `None` when the probe lies outside this preset's grid.
    pub damage_at_probe: Option<f64>,
}

pub fn evaluate_presets(
    presets: &[Preset],
    length: CombatLength,
    probe: Probe,
    pool: &WorkerPool,
) -> Vec<PresetEvaluation> {
    pool.install(|| {
        presets
            .par_iter()
            .filter_map(|preset| evaluate_one(preset, length, probe))
            .collect()
    })
}

fn evaluate_one(preset: &Preset, length: CombatLength, probe: Probe) -> Option<PresetEvaluation> {
    let built = preset
        .grid_spec(length)
        .and_then(|spec| build_grid(&spec, &preset.weapon_params()?));
    match built {
        Ok(grid) => Some(PresetEvaluation {
            id: preset.id,
            name: preset.name.clone(),
            peak_damage: grid.max(),
            damage_at_probe: grid.value_at(probe.cdr_percent, probe.seconds),
        }),
        Err(err) => {
            warn!(preset = %preset.name, %err, "skipping invalid preset");
            None
        }
    }
}

/// Highest probe damage first; presets the probe misses sink to the bottom.
pub fn rank_evaluations(mut evaluations: Vec<PresetEvaluation>) -> Vec<PresetEvaluation> {
    evaluations.sort_by(|left, right| {
        let l = left.damage_at_probe.unwrap_or(f64::NEG_INFINITY);
        let r = right.damage_at_probe.unwrap_or(f64::NEG_INFINITY);
        r.total_cmp(&l)
            .then_with(|| right.peak_damage.total_cmp(&left.peak_damage))
            .then_with(|| left.name.cmp(&right.name))
    });
    evaluations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preset(id: u64, name: &str, damage: f64, base_cooldown: f64, max_cdr: u32) -> Preset {
        Preset {
            id,
            name: name.to_string(),
            damage,
            mult: 1,
            base_cooldown,
            low_cap: None,
            high_cap: None,
            max_cdr,
            saved_at: None,
        }
    }

    #[test]
    fn ranks_by_probe_damage() {
        let presets = vec![
            preset(1, "slow", 10.0, 10.0, 50),
            preset(2, "fast", 10.0, 2.0, 50),
            preset(3, "broken", 10.0, 0.0, 50),
        ];
        let probe = Probe {
            cdr_percent: 0,
            seconds: 20,
        };
        let ranked = rank_evaluations(evaluate_presets(
            &presets,
            CombatLength::Full,
            probe,
            &WorkerPool::with_workers(2),
        ));
        let names: Vec<&str> = ranked.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["fast", "slow"]);
        assert_eq!(ranked[0].damage_at_probe, Some(100.0));
        assert_eq!(ranked[1].damage_at_probe, Some(20.0));
    }

    #[test]
    fn probe_outside_grid_sinks() {
        let presets = vec![preset(1, "narrow", 50.0, 2.0, 10), preset(2, "wide", 1.0, 5.0, 90)];
        let probe = Probe {
            cdr_percent: 80,
            seconds: 10,
        };
        let ranked = rank_evaluations(evaluate_presets(
            &presets,
            CombatLength::Full,
            probe,
            &WorkerPool::default(),
        ));
        assert_eq!(ranked[0].name, "wide");
        assert_eq!(ranked[1].damage_at_probe, None);
    }
}
