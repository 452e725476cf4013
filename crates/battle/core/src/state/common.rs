use std::fmt;

/// Index of a character in the [`Battlefield`](super::Battlefield) registry.
///
/// Resolution records hold these instead of references; the registry stays
/// the sole owner of character state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CharacterId(pub u16);

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

macro_rules! catalog_id {
    ($($(#[$meta:meta])* $name:ident($repr:ty) => $prefix:literal;)+) => {
        $(
            $(#[$meta])*
            #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
            #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
            #[cfg_attr(feature = "serde", serde(transparent))]
            pub struct $name(pub $repr);

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, concat!($prefix, ":{}"), self.0)
                }
            }
        )+
    };
}

catalog_id! {
    /// Catalog id of a skill (move).
    SkillId(u32) => "skill";
    /// Catalog id of an item.
    ItemId(u32) => "item";
    /// Catalog id of a status condition.
    StatusId(u32) => "status";
    /// Catalog id of an intrinsic ability.
    IntrinsicId(u32) => "intrinsic";
    /// Catalog id of a map-wide status (weather, terrain).
    MapStatusId(u32) => "map_status";
    /// Catalog id of an element.
    ElementId(u16) => "element";
}

impl SkillId {
    /// Skill used by the "default attack" usage slot. Every catalog must define it.
    pub const DEFAULT_ATTACK: Self = Self(0);
}

impl ElementId {
    /// Typeless element. Never earns the same-element bonus.
    pub const NONE: Self = Self(0);
}

/// Discrete grid position expressed in tile coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Tile distance allowing diagonal steps.
    pub fn chebyshev(self, other: Position) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        dx.max(dy)
    }
}

/// Integer resource meter (e.g., health) tracked per character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceMeter {
    pub current: u32,
    pub maximum: u32,
}

impl ResourceMeter {
    pub fn new(current: u32, maximum: u32) -> Self {
        Self {
            current: current.min(maximum),
            maximum,
        }
    }

    pub fn full(maximum: u32) -> Self {
        Self::new(maximum, maximum)
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.maximum
    }

    pub fn is_empty(&self) -> bool {
        self.current == 0
    }

    /// Removes up to `amount`, returning what was actually removed.
    pub fn drain(&mut self, amount: u32) -> u32 {
        let removed = amount.min(self.current);
        self.current -= removed;
        removed
    }

    /// Adds up to `amount` without exceeding the maximum, returning what was added.
    pub fn restore(&mut self, amount: u32) -> u32 {
        let added = amount.min(self.maximum - self.current);
        self.current += added;
        added
    }

    /// Current value as a percentage of the maximum (0 when the maximum is 0).
    pub fn percent(&self) -> u32 {
        if self.maximum == 0 {
            return 0;
        }
        ((u64::from(self.current) * 100) / u64::from(self.maximum)) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meter_drain_and_restore_are_clamped() {
        let mut hp = ResourceMeter::new(30, 50);
        assert_eq!(hp.drain(45), 30);
        assert!(hp.is_empty());
        assert_eq!(hp.restore(80), 50);
        assert!(hp.is_full());
    }

    #[test]
    fn chebyshev_counts_diagonals_as_one() {
        let a = Position::new(0, 0);
        assert_eq!(a.chebyshev(Position::new(3, -2)), 3);
        assert_eq!(a.chebyshev(a), 0);
    }
}
