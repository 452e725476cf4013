//! Reference driver for the combat resolution engine.
//!
//! `battle-core` never waits on its own. An [`battle_core::ActionRun`] hands
//! back a [`battle_core::Suspension`] whenever presentation needs time to
//! pass, and this crate supplies the loop that honors those waits.
//!
//! Modules are organized by responsibility:
//! - [`driver`] pumps an action run to completion
//! - [`pacer`] decides how long a frame takes
//! - [`scene`] provides a headless scene that reports through `tracing`
//! - [`error`] wraps start-up failures and stalled signals
pub mod driver;
pub mod error;
pub mod pacer;
pub mod scene;

pub use driver::{Driver, DriverConfig};
pub use error::{DriverError, Result};
pub use pacer::{FixedRatePacer, InstantPacer, Pacer};
pub use scene::TracingScene;
