//! Expected-damage heatmaps over combat duration and cooldown reduction.
//!
//! [model] holds the closed-form damage model, [grid] samples it and compares
//! grids, and the remaining modules wrap that core in presets, per-tab
//! session state, a CLI and a local JSON API.

pub mod cli;
pub mod config;
pub mod data;
pub mod grid;
pub mod model;
pub mod parallel;
pub mod server;
pub mod session;
