//! Expected damage for periodic cooldown usage.
//!
//! Closed-form steady-state approximation: a weapon fires once per completed
//! cooldown cycle, so only whole cycles inside the elapsed time contribute.
//! Nothing here validates its inputs; see [crate::model::WeaponParams].

/// CDR arrives as a percent; the model works on fractions.
pub const CDR_PERCENT_SCALE: f64 = 100.0;

/// Largest cooldown fraction CDR may remove before the 1 second floor kicks in.
pub fn cooldown_floor_fraction(base_cooldown: f64) -> f64 {
    (base_cooldown - 1.0) / base_cooldown
}

/// Cooldown in seconds after applying `y_percent` CDR, never below 1 second
/// for `base_cooldown >= 1`.
pub fn net_cooldown(y_percent: f64, base_cooldown: f64) -> f64 {
    let y = y_percent / CDR_PERCENT_SCALE;
    let cooldown_mod = 1.0 - cooldown_floor_fraction(base_cooldown).min(y);
    base_cooldown * cooldown_mod
}

/// Expected damage dealt within `x` seconds of combat with `y_percent` CDR.
///
/// `x * dps` is the continuous estimate; the partial cycle left over after
/// `floor(x / cooldown)` activations never completes, so its share is removed.
pub fn expected_damage(y_percent: f64, x: f64, damage: f64, mult: u32, base_cooldown: f64) -> f64 {
    let net_damage = damage * f64::from(mult);
    let cooldown = net_cooldown(y_percent, base_cooldown);
    let net_dps = net_damage / cooldown;

    let ideal = x * net_dps;
    let wasted = net_dps * (x - cooldown * (x / cooldown).floor());
    ideal - wasted
}
