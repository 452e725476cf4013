/// Engine capacity limits and fixed formula constants.
///
/// Balance numbers that designers tune live in [`crate::env::CombatTables`];
/// the values here are structural and part of the observable damage contract.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BattleConfig;

impl BattleConfig {
    // ===== compile-time constants used as type parameters =====
    /// Elements a single combatant can carry (dual typing).
    pub const MAX_ELEMENTS: usize = 2;
    /// Intrinsic abilities per combatant.
    pub const MAX_INTRINSICS: usize = 3;
    /// Skills a combatant can have slotted.
    pub const MAX_SKILLS: usize = 4;
    pub const MAX_STATUS_EFFECTS: usize = 8;

    // ===== damage formula =====
    pub const LEVEL_DIVISOR: i64 = 3;
    pub const LEVEL_OFFSET: i64 = 6;
    pub const DAMAGE_DIVISOR: i64 = 50;
    /// Inclusive bounds of the damage variance roll, as a percentage.
    pub const VARIANCE_MIN: u32 = 90;
    pub const VARIANCE_MAX: u32 = 100;

    // ===== accuracy =====
    /// Accuracy rolls draw from `0..ACCURACY_ROLL_SPAN`.
    pub const ACCURACY_ROLL_SPAN: u32 = 100;
}
