pub mod batch;
pub mod pool;

pub use batch::{evaluate_presets, rank_evaluations, PresetEvaluation, Probe};
pub use pool::WorkerPool;
