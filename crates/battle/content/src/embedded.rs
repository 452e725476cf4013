//! Default content compiled into the binary.

pub const SKILLS: &str = include_str!("../data/skills.ron");
pub const ITEMS: &str = include_str!("../data/items.ron");
pub const STATUSES: &str = include_str!("../data/statuses.ron");
pub const INTRINSICS: &str = include_str!("../data/intrinsics.ron");
pub const ELEMENTS: &str = include_str!("../data/elements.ron");
pub const MAP_STATUSES: &str = include_str!("../data/map_statuses.ron");
pub const TABLES: &str = include_str!("../data/tables.toml");
