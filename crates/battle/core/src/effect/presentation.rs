//! Pacing effects: sounds, visuals and log lines, optionally waited on.

use tracing::debug;

use crate::env::Message;

use super::Who;
use super::cx::EffectCx;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SoundEffect {
    pub cue: String,
    /// Suspend until the scene reports the sound finished.
    #[cfg_attr(feature = "serde", serde(default))]
    pub wait: bool,
}

impl SoundEffect {
    pub fn apply(&self, cx: &mut EffectCx<'_, '_>) {
        let signal = cx.world.scene.play_sound(&self.cue);
        if self.wait {
            cx.wait_signal(signal);
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimateEffect {
    pub cue: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub at: Who,
    #[cfg_attr(feature = "serde", serde(default))]
    pub wait: bool,
}

impl AnimateEffect {
    pub fn apply(&self, cx: &mut EffectCx<'_, '_>) {
        let Some(position) = cx.combatant(self.at).map(|c| c.position) else {
            debug!(target: "battle::effect", cue = %self.cue, "animation skipped: not in play");
            return;
        };
        let signal = cx.world.scene.spawn_visual(&self.cue, position);
        if self.wait {
            cx.wait_signal(signal);
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogEffect {
    pub key: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub subject: Option<Who>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub object: Option<Who>,
}

impl LogEffect {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            subject: None,
            object: None,
        }
    }

    pub fn apply(&self, cx: &mut EffectCx<'_, '_>) {
        let mut message = Message::new(self.key.clone());
        if let Some(who) = self.subject {
            message = message.subject(cx.resolve(who));
        }
        if let Some(who) = self.object {
            message = message.object(cx.resolve(who));
        }
        cx.log(message);
    }
}
