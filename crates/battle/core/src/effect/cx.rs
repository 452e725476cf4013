use std::collections::VecDeque;

use tracing::debug;

use crate::context::BattleContext;
use crate::env::{BattleEnv, Message, SignalId};
use crate::state::{CharacterId, Combatant};
use crate::world::World;

use super::run::Suspension;
use super::{EffectOwner, Who};

/// Everything a leaf effect can see and touch while it runs.
pub struct EffectCx<'a, 'w> {
    pub env: BattleEnv<'a>,
    pub owner: EffectOwner,
    pub ctx: &'a mut BattleContext,
    pub world: &'a mut World<'w>,
    pending: VecDeque<Suspension>,
}

impl<'a, 'w> EffectCx<'a, 'w> {
    pub fn new(
        env: BattleEnv<'a>,
        owner: EffectOwner,
        ctx: &'a mut BattleContext,
        world: &'a mut World<'w>,
    ) -> Self {
        Self {
            env,
            owner,
            ctx,
            world,
            pending: VecDeque::new(),
        }
    }

    pub fn resolve(&self, who: Who) -> CharacterId {
        match who {
            Who::User => self.ctx.user,
            Who::Target => self.ctx.target,
            Who::Holder => self.owner.holder.unwrap_or(self.ctx.user),
        }
    }

    /// The participant if it exists and is still in play.
    pub fn combatant(&self, who: Who) -> Option<&Combatant> {
        let id = self.resolve(who);
        self.world.field.get(id).filter(|c| !c.is_fainted())
    }

    /// Mutable access to a participant still in play.
    pub fn combatant_mut(&mut self, who: Who) -> Option<&mut Combatant> {
        let id = self.resolve(who);
        self.world.field.get_mut(id).filter(|c| !c.is_fainted())
    }

    pub fn log(&mut self, message: Message) {
        self.world.scene.log(message);
    }

    /// Queues a frame wait. Zero-frame waits are dropped.
    pub fn wait_frames(&mut self, frames: u32) {
        if frames > 0 {
            self.pending.push_back(Suspension::Frames(frames));
        }
    }

    /// Queues a wait on a scene signal, if the scene returned one.
    pub fn wait_signal(&mut self, signal: Option<SignalId>) {
        if let Some(signal) = signal {
            self.pending.push_back(Suspension::Signal(signal));
        }
    }

    /// Precondition failure: report it and stop the current phase.
    pub fn refuse(&mut self, refusal: EffectRefusal) {
        debug!(
            target: "battle::effect",
            source = ?self.owner.source,
            %refusal,
            "effect refused"
        );
        let subject = self.ctx.user;
        self.log(Message::new(refusal.message_key()).subject(subject));
        self.ctx.cancel();
    }

    pub(crate) fn into_pending(self) -> VecDeque<Suspension> {
        self.pending
    }
}

/// Why a leaf declined to run.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EffectRefusal {
    #[error("target holds nothing to steal")]
    NothingToSteal,

    #[error("user already holds an item")]
    HandsFull,

    #[error("HP is already full")]
    AlreadyAtFullHp,

    #[error("no one is there to affect")]
    NoTarget,

    #[error("{0}")]
    Custom(String),
}

impl EffectRefusal {
    /// Localization key logged when the refusal surfaces.
    pub fn message_key(&self) -> &str {
        match self {
            Self::NothingToSteal => "battle.steal.nothing",
            Self::HandsFull => "battle.steal.hands_full",
            Self::AlreadyAtFullHp => "battle.heal.full",
            Self::NoTarget => "battle.no_target",
            Self::Custom(key) => key,
        }
    }
}
