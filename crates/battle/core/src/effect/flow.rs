//! Control-flow effects: cancellation, strike count and move replacement.

use tracing::{debug, trace};

use crate::env::Message;
use crate::state::SkillId;

use super::cx::EffectCx;

/// Stop the rest of the current phase, optionally with a message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CancelEffect {
    #[cfg_attr(feature = "serde", serde(default))]
    pub message: Option<String>,
}

impl CancelEffect {
    pub fn apply(&self, cx: &mut EffectCx<'_, '_>) {
        if let Some(key) = &self.message {
            let user = cx.ctx.user;
            cx.log(Message::new(key.clone()).subject(user));
        }
        trace!(target: "battle::effect", source = ?cx.owner.source, "phase cancelled");
        cx.ctx.cancel();
    }
}

/// Swap the executing move for another catalog skill.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReplaceMoveEffect {
    pub skill: SkillId,
    /// Keep modifier traits of the move being replaced.
    #[cfg_attr(feature = "serde", serde(default))]
    pub carry_traits: bool,
}

impl ReplaceMoveEffect {
    pub fn apply(&self, cx: &mut EffectCx<'_, '_>) {
        let Some(data) = cx.env.catalog.skill(self.skill) else {
            debug!(target: "battle::effect", skill = %self.skill, "replacement skipped: unknown skill");
            return;
        };
        cx.ctx.replace_move(data.to_move_spec(), self.carry_traits);
        cx.ctx.hitbox = data.hitbox;
        cx.ctx.explosion = data.explosion;
        let user = cx.ctx.user;
        cx.log(
            Message::new("battle.move_replaced")
                .subject(user)
                .value(i64::from(self.skill.0)),
        );
    }
}
