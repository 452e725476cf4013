//! Errors surfaced while driving an action.

use battle_core::{ActionError, BattleError, ErrorSeverity, SignalId};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DriverError>;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Action(#[from] ActionError),

    #[error("{signal} still pending after {frames} frames")]
    SignalTimeout { signal: SignalId, frames: u32 },
}

impl BattleError for DriverError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Action(err) => err.severity(),
            Self::SignalTimeout { .. } => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Action(err) => err.error_code(),
            Self::SignalTimeout { .. } => "DRIVER_SIGNAL_TIMEOUT",
        }
    }
}
