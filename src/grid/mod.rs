pub mod builder;
pub mod compare;
pub mod readout;
pub mod scale;

pub use builder::{
    build_grid, CombatLength, DamageGrid, SampleGridSpec, MAX_MAX_CDR, MIN_MAX_CDR,
};
pub use compare::{
    compare, CompareError, CompareMode, ComparisonGrid, FallbackPolicy, ZeroSide, SENTINEL_FACTOR,
};
pub use readout::{describe_comparison, describe_damage};
pub use scale::{
    cdr_axis_ticks, duration_axis_ticks, AxisTick, ColorScale, TickFormat, DEFAULT_TICK_COUNT,
};
