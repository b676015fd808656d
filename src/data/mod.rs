pub mod preset;

pub use preset::{NewPreset, Preset, PresetError, PresetStore, DEFAULT_PRESETS_PATH};
