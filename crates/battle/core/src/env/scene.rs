//! Presentation facade: message log, sound cues, visual effects.
//!
//! Resolution never renders anything itself. It reports what happened
//! through a [`Scene`] and, when pacing matters, suspends on the
//! [`SignalId`] the scene hands back until the scene reports it done.

use std::fmt;

use crate::state::{CharacterId, Position};

/// Handle to an in-flight sound or visual.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignalId(pub u32);

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "signal:{}", self.0)
    }
}

/// A message for the battle log, keyed for localization.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    pub key: String,
    pub subject: Option<CharacterId>,
    pub object: Option<CharacterId>,
    pub value: Option<i64>,
}

impl Message {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            subject: None,
            object: None,
            value: None,
        }
    }

    pub fn subject(mut self, id: CharacterId) -> Self {
        self.subject = Some(id);
        self
    }

    pub fn object(mut self, id: CharacterId) -> Self {
        self.object = Some(id);
        self
    }

    pub fn value(mut self, value: i64) -> Self {
        self.value = Some(value);
        self
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)?;
        if let Some(subject) = self.subject {
            write!(f, " {subject}")?;
        }
        if let Some(object) = self.object {
            write!(f, " -> {object}")?;
        }
        if let Some(value) = self.value {
            write!(f, " ({value})")?;
        }
        Ok(())
    }
}

/// Presentation collaborator.
pub trait Scene {
    fn log(&mut self, message: Message);

    /// Starts a sound cue. `None` when there is nothing to wait for.
    fn play_sound(&mut self, cue: &str) -> Option<SignalId>;

    /// Starts a visual effect at a tile. `None` when there is nothing to wait for.
    fn spawn_visual(&mut self, cue: &str, at: Position) -> Option<SignalId>;

    fn is_signal_done(&self, signal: SignalId) -> bool;

    /// Called by the driver once per elapsed frame.
    fn on_frame(&mut self) {}
}
