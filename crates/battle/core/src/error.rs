//! Shared error classification for battle-core.
//!
//! Resolution itself never fails: authored-data problems degrade to "no
//! effect" and precondition failures become a logged message plus the
//! cancellation flag. The error types in this crate cover the edges around
//! resolution instead: starting an action, validating tables, validating
//! catalog content.
//!
//! Each of those concerns has its own `thiserror` enum, and every variant
//! carries a severity and a stable code for logs and tests.

/// How a caller should react to an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Retry with a different request (another slot, another target).
    Recoverable,

    /// The request or the content is wrong; retrying unchanged fails again.
    ///
    /// Examples: unknown character, dangling catalog id
    Validation,

    /// Engine and catalog disagree about something that validation should
    /// have caught.
    Internal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Classification shared by every battle error enum.
pub trait BattleError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Stable identifier of the variant, e.g. `ACTION_EMPTY_SLOT`.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
