use crate::cells::Ratio;
use crate::error::{BattleError, ErrorSeverity};

/// Level-indexed ratio table.
///
/// `ratios[0]` applies at `min_level`; each following entry covers the next
/// `step` levels. Levels outside the table clamp to the nearest end.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelTable {
    pub min_level: i32,
    pub step: i32,
    pub ratios: Vec<Ratio>,
}

impl LevelTable {
    pub fn new(min_level: i32, step: i32, ratios: Vec<Ratio>) -> Self {
        Self {
            min_level,
            step,
            ratios,
        }
    }

    pub fn ratio(&self, level: i32) -> Ratio {
        let Some(last) = self.ratios.len().checked_sub(1) else {
            return Ratio::ONE;
        };
        let offset = i64::from(level) - i64::from(self.min_level);
        let index = offset.div_euclid(i64::from(self.step.max(1)));
        let index = index.clamp(0, last as i64) as usize;
        self.ratios[index]
    }

    /// `value` scaled by the ratio at `level`, truncating.
    pub fn apply(&self, level: i32, value: i64) -> i64 {
        self.ratio(level).apply(value)
    }

    fn validate(&self, table: &'static str) -> Result<(), TableError> {
        if self.ratios.is_empty() {
            return Err(TableError::Empty { table });
        }
        if self.step <= 0 {
            return Err(TableError::NonPositiveStep {
                table,
                step: self.step,
            });
        }
        if let Some(index) = self.ratios.iter().position(|r| r.den <= 0) {
            return Err(TableError::BadDenominator { table, index });
        }
        Ok(())
    }
}

/// Balance tables consulted by hit and damage resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CombatTables {
    /// Accuracy level table. Evasion reads it at the negated level.
    pub accuracy: LevelTable,
    pub stat_boost: LevelTable,
    /// Critical chance in percent, indexed by critical level.
    pub crit_chance: Vec<u32>,
    pub crit_ratio: Ratio,
    /// Critical ratio when the attacker has the precision trait.
    pub precision_crit_ratio: Ratio,
    pub same_element_ratio: Ratio,
    /// Indexed by summed effectiveness level.
    pub effectiveness: LevelTable,
}

impl Default for CombatTables {
    fn default() -> Self {
        let accuracy = (0..13)
            .map(|i| Ratio::new(3 + (i - 6).max(0), 3 + (6 - i).max(0)))
            .collect();
        let stat_boost = (0..13)
            .map(|i| Ratio::new(2 + (i - 6).max(0), 2 + (6 - i).max(0)))
            .collect();
        Self {
            accuracy: LevelTable::new(-6, 1, accuracy),
            stat_boost: LevelTable::new(-6, 1, stat_boost),
            crit_chance: vec![6, 12, 25, 33, 50],
            crit_ratio: Ratio::new(3, 2),
            precision_crit_ratio: Ratio::new(2, 1),
            same_element_ratio: Ratio::new(4, 3),
            effectiveness: LevelTable::new(
                -2,
                1,
                vec![
                    Ratio::new(1, 4),
                    Ratio::new(1, 2),
                    Ratio::ONE,
                    Ratio::new(2, 1),
                    Ratio::new(4, 1),
                ],
            ),
        }
    }
}

impl CombatTables {
    /// Critical chance for a critical level, clamped to the table ends.
    pub fn crit_chance(&self, level: i64) -> u32 {
        let Some(last) = self.crit_chance.len().checked_sub(1) else {
            return 0;
        };
        let index = level.clamp(0, last as i64) as usize;
        self.crit_chance[index]
    }

    pub fn validate(&self) -> Result<(), TableError> {
        self.accuracy.validate("accuracy")?;
        self.stat_boost.validate("stat_boost")?;
        self.effectiveness.validate("effectiveness")?;
        if self.crit_chance.is_empty() {
            return Err(TableError::Empty {
                table: "crit_chance",
            });
        }
        for (name, ratio) in [
            ("crit_ratio", self.crit_ratio),
            ("precision_crit_ratio", self.precision_crit_ratio),
            ("same_element_ratio", self.same_element_ratio),
        ] {
            if ratio.den <= 0 {
                return Err(TableError::BadDenominator {
                    table: name,
                    index: 0,
                });
            }
        }
        Ok(())
    }
}

/// Malformed balance table.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("table `{table}` has no entries")]
    Empty { table: &'static str },

    #[error("table `{table}` has non-positive step {step}")]
    NonPositiveStep { table: &'static str, step: i32 },

    #[error("table `{table}` entry {index} has a non-positive denominator")]
    BadDenominator { table: &'static str, index: usize },
}

impl BattleError for TableError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Empty { .. } => "TABLE_EMPTY",
            Self::NonPositiveStep { .. } => "TABLE_NON_POSITIVE_STEP",
            Self::BadDenominator { .. } => "TABLE_BAD_DENOMINATOR",
        }
    }
}
