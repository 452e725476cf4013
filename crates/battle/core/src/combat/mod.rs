//! Built-in combat steps: stat staging, accuracy and damage.
//!
//! These are the fixed parts of a strike that every action goes through.
//! Content influences them only through the cells they read.
//!
//! # Core Functions
//!
//! - `stage_strike`: copy effective stats and boost stages into the local store
//! - `check_hit`: no-double-miss guarantee, accuracy formula and roll
//! - `calculate_damage`: critical roll, boosts, bonuses, variance, multiplier

pub mod damage;
pub mod hit;
pub mod result;
pub mod stage;

pub use damage::{DamageRoll, base_damage, calculate_damage, effectiveness_level};
pub use hit::{HitCheck, accuracy_percent, check_hit};
pub use result::{ActionReport, StrikeOutcome, StrikeResult};
pub use stage::stage_strike;
