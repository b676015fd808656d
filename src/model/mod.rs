pub mod damage;
pub mod params;

pub use damage::{cooldown_floor_fraction, expected_damage, net_cooldown, CDR_PERCENT_SCALE};
pub use params::{ParamError, WeaponParams};
