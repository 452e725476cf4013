//! Action pipeline: drives one action through its phases and strikes.
//!
//! ```text
//! BeforeAction
//!   └─ per strike: Prepare → BeforeHit → AttemptHit → OnHit | OnMiss → Report → AfterStrike
//! AfterAction
//! ```
//!
//! Each phase re-reads the resolution record and collects its effects
//! ([`phase_entries`]), so a move replaced mid-action contributes its own
//! effects from the next phase on. `AttemptHit` and `Report` are built-in
//! steps with no effects of their own.
//!
//! Cancellation is scoped by phase. The flag is cleared at every phase
//! boundary; what a set flag means depends on where it was raised:
//! - `BeforeAction`: the action fizzles, no strike starts and `AfterAction`
//!   is skipped.
//! - `Prepare` / `BeforeHit`: this strike fizzles, the next one proceeds.
//! - `OnHit` / `OnMiss`: the remaining effects are skipped, `Report` runs.
//!
//! [`BattleContext::cancel_turn`] stops strikes after the current one;
//! `AfterAction` still runs.
mod assemble;

pub use assemble::phase_entries;

use tracing::{debug, info, trace};

use crate::cells::{CriticalHit, DamageDealt, HealDealt, Hit, StrikesLanded, TotalDamage, TotalHealed};
use crate::combat::{ActionReport, StrikeOutcome, StrikeResult, check_hit, stage_strike};
use crate::context::{ActionKind, BattleContext, ItemPayload, UsageSlot};
use crate::effect::{ChildCursor, Phase, Progress};
use crate::env::{BattleEnv, Message};
use crate::error::{BattleError, ErrorSeverity};
use crate::state::{Battlefield, CharacterId, ItemId, Position, SkillId};
use crate::world::World;

/// What a participant asked to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionRequest {
    pub user: CharacterId,
    pub target: CharacterId,
    pub action: ActionKind,
    pub slot: UsageSlot,
    /// Explicit skill. When absent the skill is read from the usage slot.
    pub skill: Option<SkillId>,
    /// Item used or thrown. When absent an `EquippedItem` slot reads the
    /// user's held item.
    pub item: Option<ItemId>,
    pub target_tile: Option<Position>,
}

impl ActionRequest {
    fn new(user: CharacterId, target: CharacterId, action: ActionKind, slot: UsageSlot) -> Self {
        Self {
            user,
            target,
            action,
            slot,
            skill: None,
            item: None,
            target_tile: None,
        }
    }

    /// Use the skill in one of the user's skill slots.
    pub fn skill(user: CharacterId, target: CharacterId, slot: u8) -> Self {
        Self::new(user, target, ActionKind::Skill, UsageSlot::Skill(slot))
    }

    pub fn default_attack(user: CharacterId, target: CharacterId) -> Self {
        let mut request = Self::new(user, target, ActionKind::Skill, UsageSlot::DefaultAttack);
        request.skill = Some(SkillId::DEFAULT_ATTACK);
        request
    }

    /// Run a skill the user did not select (e.g. forced by a status).
    pub fn forced(user: CharacterId, target: CharacterId, skill: SkillId) -> Self {
        let mut request = Self::new(user, target, ActionKind::Skill, UsageSlot::Forced);
        request.skill = Some(skill);
        request
    }

    pub fn use_item(user: CharacterId, target: CharacterId, item: ItemId, slot: UsageSlot) -> Self {
        let mut request = Self::new(user, target, ActionKind::Item, slot);
        request.item = Some(item);
        request
    }

    pub fn throw(user: CharacterId, target: CharacterId, item: ItemId, slot: UsageSlot) -> Self {
        let mut request = Self::new(user, target, ActionKind::Throw, slot);
        request.item = Some(item);
        request
    }

    /// A trap springing on whoever stepped on it. The victim is both user
    /// and target; only its target-side hooks run.
    pub fn trap(victim: CharacterId, skill: SkillId) -> Self {
        let mut request = Self::new(victim, victim, ActionKind::Trap, UsageSlot::Forced);
        request.skill = Some(skill);
        request
    }

    /// Builder: aim at a tile rather than the target's position.
    pub fn at_tile(mut self, tile: Position) -> Self {
        self.target_tile = Some(tile);
        self
    }
}

/// Reasons an action cannot start.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("user {0} does not exist")]
    UserNotFound(CharacterId),

    #[error("target {0} does not exist")]
    TargetNotFound(CharacterId),

    #[error("user {0} is out of play")]
    UserOutOfPlay(CharacterId),

    #[error("usage slot {0:?} is empty")]
    EmptySlot(UsageSlot),

    #[error("no skill selected for usage slot {0:?}")]
    NoSkillSelected(UsageSlot),

    #[error("unknown skill {0}")]
    UnknownSkill(SkillId),

    #[error("unknown item {0}")]
    UnknownItem(ItemId),
}

impl BattleError for ActionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UserOutOfPlay(_) | Self::EmptySlot(_) | Self::NoSkillSelected(_) => {
                ErrorSeverity::Recoverable
            }
            Self::UserNotFound(_) | Self::TargetNotFound(_) => ErrorSeverity::Validation,
            Self::UnknownSkill(_) | Self::UnknownItem(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UserNotFound(_) => "ACTION_USER_NOT_FOUND",
            Self::TargetNotFound(_) => "ACTION_TARGET_NOT_FOUND",
            Self::UserOutOfPlay(_) => "ACTION_USER_OUT_OF_PLAY",
            Self::EmptySlot(_) => "ACTION_EMPTY_SLOT",
            Self::NoSkillSelected(_) => "ACTION_NO_SKILL_SELECTED",
            Self::UnknownSkill(_) => "ACTION_UNKNOWN_SKILL",
            Self::UnknownItem(_) => "ACTION_UNKNOWN_ITEM",
        }
    }
}

#[derive(Debug)]
enum Stage<'c> {
    Begin,
    Phase { phase: Phase, cursor: ChildCursor<'c> },
    NextStrike,
    AttemptHit,
    Report,
    Finish,
    Done,
}

/// One in-flight action.
///
/// Owns its [`BattleContext`] and borrows effect templates from the catalog.
/// Call [`resume`](Self::resume) until it returns [`Progress::Finished`],
/// honoring every suspension in between.
#[derive(Debug)]
pub struct ActionRun<'c> {
    env: BattleEnv<'c>,
    ctx: BattleContext,
    stage: Stage<'c>,
    strike: StrikeResult,
    report: ActionReport,
}

impl<'c> ActionRun<'c> {
    /// Resolves the request against the battlefield and catalog.
    ///
    /// Nothing is mutated until the first resume.
    pub fn start(
        env: BattleEnv<'c>,
        field: &Battlefield,
        request: ActionRequest,
    ) -> Result<Self, ActionError> {
        let user = field
            .get(request.user)
            .ok_or(ActionError::UserNotFound(request.user))?;
        if user.is_fainted() {
            return Err(ActionError::UserOutOfPlay(request.user));
        }
        let target = field
            .get(request.target)
            .ok_or(ActionError::TargetNotFound(request.target))?;

        let mut ctx = match request.action {
            ActionKind::Skill | ActionKind::Trap => {
                let skill = match (request.skill, request.slot) {
                    (Some(skill), _) => skill,
                    (None, UsageSlot::Skill(index)) => user
                        .skills
                        .get(usize::from(index))
                        .copied()
                        .ok_or(ActionError::EmptySlot(request.slot))?,
                    (None, UsageSlot::DefaultAttack) => SkillId::DEFAULT_ATTACK,
                    (None, slot) => return Err(ActionError::NoSkillSelected(slot)),
                };
                let data = env
                    .catalog
                    .skill(skill)
                    .ok_or(ActionError::UnknownSkill(skill))?;
                let mut ctx = BattleContext::new(
                    request.user,
                    request.target,
                    request.action,
                    request.slot,
                    data.to_move_spec(),
                    data.strikes.max(1),
                );
                ctx.hitbox = data.hitbox;
                ctx.explosion = data.explosion;
                ctx
            }
            ActionKind::Item | ActionKind::Throw => {
                let held = match request.slot {
                    UsageSlot::EquippedItem => user.held_item,
                    _ => None,
                };
                let item = request
                    .item
                    .or(held)
                    .ok_or(ActionError::EmptySlot(request.slot))?;
                let data = env
                    .catalog
                    .item(item)
                    .ok_or(ActionError::UnknownItem(item))?;
                let spec = match request.action {
                    ActionKind::Throw => data.throw_spec(),
                    _ => data.use_spec(),
                };
                let mut ctx = BattleContext::new(
                    request.user,
                    request.target,
                    request.action,
                    request.slot,
                    spec,
                    1,
                );
                ctx.item = Some(ItemPayload {
                    item,
                    consumed: true,
                });
                ctx
            }
        };
        ctx.origin = user.position;
        ctx.target_tile = request.target_tile.unwrap_or(target.position);

        Ok(Self {
            env,
            ctx,
            stage: Stage::Begin,
            strike: StrikeResult::Fizzled,
            report: ActionReport::new(request.user, request.target, request.action),
        })
    }

    pub fn context(&self) -> &BattleContext {
        &self.ctx
    }

    /// Report so far. Complete once the run has finished.
    pub fn report(&self) -> &ActionReport {
        &self.report
    }

    pub fn into_report(self) -> ActionReport {
        self.report
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.stage, Stage::Done)
    }

    /// Advances until the next suspension or the end of the action.
    pub fn resume(&mut self, world: &mut World<'_>) -> Progress {
        loop {
            match &mut self.stage {
                Stage::Begin => {
                    info!(
                        target: "battle::pipeline",
                        user = %self.ctx.user,
                        target = %self.ctx.target,
                        action = %self.ctx.action,
                        skill = ?self.ctx.spec.skill,
                        strikes = self.ctx.strikes(),
                        "action started"
                    );
                    self.enter_phase(Phase::BeforeAction, world.field);
                }
                Stage::Phase { phase, cursor } => {
                    let phase = *phase;
                    if let Progress::Suspended(wait) = cursor.resume(self.env, &mut self.ctx, world)
                    {
                        trace!(target: "battle::pipeline", %phase, ?wait, "suspended");
                        return Progress::Suspended(wait);
                    }
                    self.finish_phase(phase, world);
                }
                Stage::NextStrike => self.next_strike(world),
                Stage::AttemptHit => self.attempt_hit(world),
                Stage::Report => self.publish(world),
                Stage::Finish => self.finish(world),
                Stage::Done => return Progress::Finished,
            }
        }
    }

    fn enter_phase(&mut self, phase: Phase, field: &Battlefield) {
        self.ctx.clear_cancel();
        let entries = phase_entries(self.env, &self.ctx, field, phase);
        trace!(
            target: "battle::pipeline",
            %phase,
            effects = entries.len(),
            strike = self.ctx.strikes_made(),
            "phase started"
        );
        self.stage = Stage::Phase {
            phase,
            cursor: ChildCursor::new(entries),
        };
    }

    fn finish_phase(&mut self, phase: Phase, world: &mut World<'_>) {
        let cancelled = self.ctx.is_cancelled();
        self.ctx.clear_cancel();

        match phase {
            Phase::BeforeAction if cancelled => {
                debug!(target: "battle::pipeline", user = %self.ctx.user, "action fizzled");
                self.report.fizzled = true;
                self.stage = Stage::Finish;
            }
            Phase::BeforeAction | Phase::AfterStrike => self.stage = Stage::NextStrike,
            Phase::Prepare | Phase::BeforeHit if cancelled => {
                debug!(
                    target: "battle::pipeline",
                    %phase,
                    strike = self.ctx.strikes_made(),
                    "strike fizzled"
                );
                self.report.strikes.push(StrikeOutcome::fizzled());
                self.stage = Stage::NextStrike;
            }
            Phase::Prepare => self.enter_phase(Phase::BeforeHit, world.field),
            Phase::BeforeHit => self.stage = Stage::AttemptHit,
            Phase::OnHit | Phase::OnMiss => self.stage = Stage::Report,
            Phase::AfterAction => self.stage = Stage::Finish,
        }
    }

    fn next_strike(&mut self, world: &mut World<'_>) {
        let field: &Battlefield = world.field;

        if self.ctx.is_turn_cancelled() || self.ctx.remaining_strikes() == 0 {
            self.enter_phase(Phase::AfterAction, field);
            return;
        }
        let user = field.get(self.ctx.user).filter(|c| !c.is_fainted());
        let target = field.get(self.ctx.target).filter(|c| !c.is_fainted());
        let (Some(user), Some(target)) = (user, target) else {
            debug!(
                target: "battle::pipeline",
                remaining = self.ctx.remaining_strikes(),
                "participant out of play, no further strikes"
            );
            self.enter_phase(Phase::AfterAction, field);
            return;
        };

        let ctx = &mut self.ctx;
        ctx.begin_strike();
        ctx.reset_local();
        ctx.spec.cells.copy_all_into(&mut ctx.local);
        stage_strike(&mut ctx.local, user, target);
        debug!(
            target: "battle::pipeline",
            strike = ctx.strikes_made(),
            of = ctx.strikes(),
            "strike started"
        );
        self.enter_phase(Phase::Prepare, field);
    }

    fn attempt_hit(&mut self, world: &mut World<'_>) {
        let check = check_hit(self.env, &self.ctx, world);
        if check.is_hit() {
            self.ctx.local.set(Hit);
            self.ctx.global.add::<StrikesLanded>(1);
            self.strike = StrikeResult::Hit;
            self.enter_phase(Phase::OnHit, world.field);
        } else {
            world.scene.log(
                Message::new("battle.miss")
                    .subject(self.ctx.user)
                    .object(self.ctx.target),
            );
            self.strike = StrikeResult::Miss;
            self.enter_phase(Phase::OnMiss, world.field);
        }
    }

    /// Publishes the strike's totals for `AfterStrike` effects and the report.
    fn publish(&mut self, world: &mut World<'_>) {
        let damage = self.ctx.local.count::<DamageDealt>().max(0);
        let healed = self.ctx.local.count::<HealDealt>().max(0);
        self.ctx.global.add::<TotalDamage>(damage);
        self.ctx.global.add::<TotalHealed>(healed);

        let outcome = StrikeOutcome {
            result: self.strike,
            critical: self.ctx.local.contains::<CriticalHit>(),
            damage: u32::try_from(damage).unwrap_or(u32::MAX),
            healed: u32::try_from(healed).unwrap_or(u32::MAX),
        };
        self.report.total_damage = self.report.total_damage.saturating_add(outcome.damage);
        self.report.total_healed = self.report.total_healed.saturating_add(outcome.healed);
        self.report.strikes.push(outcome);

        debug!(
            target: "battle::pipeline",
            strike = self.ctx.strikes_made(),
            result = %outcome.result,
            damage = outcome.damage,
            healed = outcome.healed,
            critical = outcome.critical,
            "strike reported"
        );
        self.enter_phase(Phase::AfterStrike, world.field);
    }

    fn finish(&mut self, world: &mut World<'_>) {
        if !self.report.fizzled {
            if let Some(payload) = self.ctx.item.filter(|p| p.consumed) {
                if self.ctx.slot == UsageSlot::EquippedItem {
                    if let Some(user) = world.field.get_mut(self.ctx.user) {
                        if user.held_item == Some(payload.item) {
                            user.held_item = None;
                        }
                    }
                }
                self.report.consumed = Some(payload.item);
            }
        }
        self.report.skill = self.ctx.spec.skill;
        self.report.turn_cancelled = self.ctx.is_turn_cancelled();

        info!(
            target: "battle::pipeline",
            user = %self.ctx.user,
            target = %self.ctx.target,
            strikes = self.report.strikes.len(),
            hits = self.report.hits(),
            damage = self.report.total_damage,
            healed = self.report.total_healed,
            fizzled = self.report.fizzled,
            "action finished"
        );
        self.stage = Stage::Done;
    }
}

#[cfg(test)]
mod tests;
