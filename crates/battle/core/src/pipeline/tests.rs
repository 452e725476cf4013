use super::*;
use crate::context::{Category, HitRate};
use crate::effect::{
    CancelEffect, Condition, DamageEffect, EffectNode, FixedDamageEffect, HealEffect, LogEffect,
    PhasedEffect, ReplaceMoveEffect, SoundEffect, StrikeFlag, Suspension, Who,
};
use crate::env::{Catalog, CombatTables, ItemData, Scene, SignalId, SkillData};
use crate::error::{BattleError, ErrorSeverity};
use crate::state::{Combatant, ElementId, StageStat, StatBlock};
use crate::testing::{RecordingScene, ScriptedRng};

const FIRE: ElementId = ElementId(1);

struct Arena {
    catalog: Catalog,
    tables: CombatTables,
    field: Battlefield,
    scene: RecordingScene,
    rng: ScriptedRng,
    user: CharacterId,
    target: CharacterId,
}

impl Arena {
    /// Level-10 user (Atk 20, fire) against a level-10 target (Def 15, 40 HP).
    fn new() -> Self {
        let mut catalog = Catalog::new();
        catalog.insert_skill(
            SkillData::new(SkillId::DEFAULT_ATTACK, "Strike", Category::Physical, 40)
                .element(FIRE)
                .hit_rate(HitRate::Always)
                .effect(PhasedEffect::new(EffectNode::Damage(DamageEffect::new()))),
        );

        let mut field = Battlefield::new();
        let user = field.spawn(
            Combatant::new("Charmer", 10, 40, StatBlock::new(20, 10, 10, 10, 10))
                .with_elements([FIRE])
                .with_skills([SkillId::DEFAULT_ATTACK, SkillId(1)]),
        ).expect("room for combatant");
        let target = field.spawn(Combatant::new(
            "Dummy",
            10,
            40,
            StatBlock::new(10, 15, 10, 10, 10),
        )).expect("room for combatant");

        Self {
            catalog,
            tables: CombatTables::default(),
            field,
            scene: RecordingScene::new(),
            rng: ScriptedRng::new([]),
            user,
            target,
        }
    }

    fn skill(&mut self, data: SkillData) {
        self.catalog.insert_skill(data);
    }

    fn start(&self, request: ActionRequest) -> Result<ActionRun<'_>, ActionError> {
        ActionRun::start(BattleEnv::new(&self.catalog, &self.tables), &self.field, request)
    }

    /// Runs the action to completion, ticking one frame per suspension.
    fn run(&mut self, request: ActionRequest) -> (ActionReport, Vec<Suspension>) {
        let env = BattleEnv::new(&self.catalog, &self.tables);
        let mut run = ActionRun::start(env, &self.field, request).expect("action starts");
        let mut waits = Vec::new();
        loop {
            let mut world = World::new(&mut self.field, &mut self.scene, &mut self.rng);
            match run.resume(&mut world) {
                Progress::Finished => break,
                Progress::Suspended(wait) => {
                    waits.push(wait);
                    self.scene.on_frame();
                }
            }
        }
        assert!(run.is_finished());
        (run.into_report(), waits)
    }

    fn attack(&mut self) -> ActionReport {
        let request = ActionRequest::default_attack(self.user, self.target);
        self.run(request).0
    }

    fn use_skill(&mut self, slot: u8) -> ActionReport {
        let request = ActionRequest::skill(self.user, self.target, slot);
        self.run(request).0
    }

    fn target_hp(&self) -> u32 {
        self.field.get(self.target).unwrap().hp.current
    }

    fn logged(&self, key: &str) -> usize {
        self.scene.message_keys().iter().filter(|k| **k == key).count()
    }
}

fn fixed(amount: u32) -> EffectNode {
    EffectNode::FixedDamage(FixedDamageEffect {
        amount,
        target: Who::Target,
    })
}

fn log(key: &str) -> EffectNode {
    EffectNode::Log(LogEffect::new(key))
}

fn cancel() -> EffectNode {
    EffectNode::Cancel(CancelEffect::default())
}

/// Skill 1: always hits, `strikes` strikes, given effects.
fn multi_strike(strikes: u32, effects: Vec<PhasedEffect>) -> SkillData {
    let mut data = SkillData::new(SkillId(1), "Flurry", Category::Physical, 0)
        .hit_rate(HitRate::Always)
        .strikes(strikes);
    data.effects = effects;
    data
}

// ============================================================================
// Damage and accuracy
// ============================================================================

#[test]
fn same_element_attack_deals_twelve() {
    let mut arena = Arena::new();
    // crit roll 99 (no crit), variance 100
    arena.rng = ScriptedRng::new([99, 100]);

    let (report, waits) = arena.run(ActionRequest::default_attack(arena.user, arena.target));

    assert_eq!(report.total_damage, 12);
    assert_eq!(arena.target_hp(), 28);
    assert_eq!(report.strikes.len(), 1);
    assert_eq!(report.strikes[0].result, StrikeResult::Hit);
    assert!(!report.strikes[0].critical);
    assert_eq!(arena.rng.remaining(), 0);
    assert_eq!(waits, vec![Suspension::Signal(SignalId(0))]);
    assert_eq!(arena.logged("battle.damage"), 1);
}

#[test]
fn damage_is_deterministic_for_fixed_rolls() {
    let mut first = Arena::new();
    first.rng = ScriptedRng::new([40, 93]);
    let mut second = Arena::new();
    second.rng = ScriptedRng::new([40, 93]);

    assert_eq!(first.attack(), second.attack());
    assert_eq!(first.target_hp(), second.target_hp());
}

#[test]
fn missed_check_guarantees_next_hit() {
    let mut arena = Arena::new();
    arena.skill(
        SkillData::new(SkillId(1), "Wild Swing", Category::Physical, 40)
            .hit_rate(HitRate::Percent(50))
            .effect(PhasedEffect::new(EffectNode::Damage(DamageEffect::new()))),
    );
    // accuracy 99 misses; next action draws no accuracy roll: crit 99, variance 100
    arena.rng = ScriptedRng::new([99, 99, 100]);

    let missed = arena.use_skill(1);
    assert_eq!(missed.strikes[0].result, StrikeResult::Miss);
    assert_eq!(arena.logged("battle.miss"), 1);
    assert!(arena.field.get(arena.user).unwrap().has_forced_hit());
    assert_eq!(arena.rng.draws(), 1);

    let forced = arena.use_skill(1);
    assert_eq!(forced.strikes[0].result, StrikeResult::Hit);
    assert_eq!(arena.rng.draws(), 3);
    assert_eq!(arena.rng.remaining(), 0);
    assert!(!arena.field.get(arena.user).unwrap().has_forced_hit());
}

#[test]
fn immunity_deals_nothing_and_draws_no_variance() {
    let mut arena = Arena::new();
    arena.skill(
        multi_strike(
            1,
            vec![
                PhasedEffect::new(EffectNode::ElementImmunity(FIRE))
                    .phase(Phase::Prepare),
                PhasedEffect::new(EffectNode::Damage(DamageEffect::with_power(80))),
            ],
        )
        .element(FIRE),
    );
    arena.rng = ScriptedRng::new([99]);

    let report = arena.use_skill(1);
    assert_eq!(report.total_damage, 0);
    assert_eq!(arena.target_hp(), 40);
    assert_eq!(arena.rng.draws(), 1);
}

/// Fire skill 1 with power 40: the given effects plus an OnHit damage at priority 0.
fn fire_strike(category: Category, effects: Vec<PhasedEffect>) -> SkillData {
    let mut data = SkillData::new(SkillId(1), "Ember Jab", category, 40)
        .element(FIRE)
        .hit_rate(HitRate::Always);
    data.effects = effects;
    data.effect(PhasedEffect::new(EffectNode::Damage(DamageEffect::new())))
}

#[test]
fn critical_hit_multiplies_by_the_crit_ratio() {
    let mut arena = Arena::new();
    arena.skill(fire_strike(
        Category::Physical,
        vec![PhasedEffect::new(EffectNode::Conditional {
            condition: Condition::WasCritical,
            then_effects: vec![log("test.crit")],
            else_effects: vec![],
        })
        .priority(1)],
    ));
    // crit roll 0 (< 6), variance 100: 9 × 3/2 × 4/3
    arena.rng = ScriptedRng::new([0, 100]);

    let report = arena.use_skill(1);
    assert_eq!(report.total_damage, 18);
    assert!(report.strikes[0].critical);
    assert_eq!(arena.logged("test.crit"), 1);
    assert_eq!(arena.rng.remaining(), 0);
}

#[test]
fn precision_uses_the_larger_crit_ratio() {
    let mut arena = Arena::new();
    arena.skill(fire_strike(
        Category::Physical,
        vec![PhasedEffect::new(EffectNode::SetFlag(StrikeFlag::Precision)).phase(Phase::Prepare)],
    ));
    arena.rng = ScriptedRng::new([0, 100]);

    let report = arena.use_skill(1);
    // 9 × 2 × 4/3
    assert_eq!(report.total_damage, 24);
    assert!(report.strikes[0].critical);
}

#[test]
fn precision_without_a_crit_changes_nothing() {
    let mut arena = Arena::new();
    arena.skill(fire_strike(
        Category::Physical,
        vec![PhasedEffect::new(EffectNode::SetFlag(StrikeFlag::Precision)).phase(Phase::Prepare)],
    ));
    arena.rng = ScriptedRng::new([99, 100]);

    assert_eq!(arena.use_skill(1).total_damage, 12);
}

#[test]
fn boosts_apply_to_the_stat_pair() {
    let mut arena = Arena::new();
    let user = arena.user;
    let target = arena.target;
    arena.field.get_mut(user).unwrap().boosts.shift(StageStat::Attack, -2);
    arena.field.get_mut(target).unwrap().boosts.shift(StageStat::Defense, 2);
    arena.rng = ScriptedRng::new([99, 100]);

    // atk 20 × 2/4 = 10, def 15 × 4/2 = 30: base 2, × 4/3 = 2
    assert_eq!(arena.attack().total_damage, 2);
}

#[test]
fn critical_hit_ignores_unfavorable_boosts() {
    let mut arena = Arena::new();
    let user = arena.user;
    let target = arena.target;
    arena.field.get_mut(user).unwrap().boosts.shift(StageStat::Attack, -2);
    arena.field.get_mut(target).unwrap().boosts.shift(StageStat::Defense, 2);
    arena.rng = ScriptedRng::new([0, 100]);

    let report = arena.attack();
    assert!(report.strikes[0].critical);
    assert_eq!(report.total_damage, 18);
}

#[test]
fn category_flip_swaps_the_stat_pair() {
    let mut arena = Arena::new();
    arena.skill(fire_strike(
        Category::Physical,
        vec![PhasedEffect::new(EffectNode::FlipCategory).phase(Phase::Prepare)],
    ));
    arena.rng = ScriptedRng::new([99, 100]);

    // SpAtk 10 vs SpDef 10: base 7, × 4/3 = 9
    assert_eq!(arena.use_skill(1).total_damage, 9);
}

#[test]
fn magical_skills_use_the_special_pair() {
    let mut arena = Arena::new();
    arena.skill(fire_strike(Category::Magical, vec![]));
    arena.rng = ScriptedRng::new([99, 100]);
    assert_eq!(arena.use_skill(1).total_damage, 9);

    let mut flipped = Arena::new();
    flipped.skill(fire_strike(
        Category::Magical,
        vec![PhasedEffect::new(EffectNode::FlipCategory).phase(Phase::Prepare)],
    ));
    flipped.rng = ScriptedRng::new([99, 100]);
    assert_eq!(flipped.use_skill(1).total_damage, 12);
}

#[test]
fn strike_flags_do_not_outlive_their_strike() {
    let mut arena = Arena::new();
    arena.skill(multi_strike(
        2,
        vec![
            PhasedEffect::new(EffectNode::Conditional {
                condition: Condition::FirstStrike,
                then_effects: vec![EffectNode::SetFlag(StrikeFlag::NoCrit)],
                else_effects: vec![],
            })
            .phase(Phase::Prepare),
            PhasedEffect::new(EffectNode::Damage(DamageEffect::with_power(40))),
        ],
    ));
    // strike 1: variance only; strike 2: crit roll then variance
    arena.rng = ScriptedRng::new([100, 99, 100]);

    let report = arena.use_skill(1);
    assert_eq!(report.strikes.len(), 2);
    assert_eq!(arena.rng.draws(), 3);
    assert_eq!(arena.rng.remaining(), 0);
    assert_eq!(report.total_damage, 18);
    assert_eq!(arena.target_hp(), 22);
}

// ============================================================================
// Cancellation
// ============================================================================

#[test]
fn cancel_before_action_fizzles_everything() {
    let mut arena = Arena::new();
    arena.skill(multi_strike(
        2,
        vec![
            PhasedEffect::new(cancel()).phase(Phase::BeforeAction),
            PhasedEffect::new(fixed(5)),
            PhasedEffect::new(log("test.after")).phase(Phase::AfterAction),
        ],
    ));

    let report = arena.use_skill(1);
    assert!(report.fizzled);
    assert!(report.strikes.is_empty());
    assert_eq!(arena.target_hp(), 40);
    assert_eq!(arena.logged("test.after"), 0);
}

#[test]
fn cancel_in_prepare_fizzles_only_that_strike() {
    let mut arena = Arena::new();
    arena.skill(multi_strike(
        2,
        vec![
            PhasedEffect::new(EffectNode::Conditional {
                condition: Condition::FirstStrike,
                then_effects: vec![cancel()],
                else_effects: Vec::new(),
            })
            .phase(Phase::Prepare),
            PhasedEffect::new(fixed(5)),
        ],
    ));

    let report = arena.use_skill(1);
    let results: Vec<_> = report.strikes.iter().map(|s| s.result).collect();
    assert_eq!(results, vec![StrikeResult::Fizzled, StrikeResult::Hit]);
    assert_eq!(report.total_damage, 5);
    assert!(!report.fizzled);
}

#[test]
fn cancel_on_hit_skips_the_rest_but_still_reports() {
    let mut arena = Arena::new();
    arena.skill(multi_strike(
        1,
        vec![
            PhasedEffect::new(fixed(3)).priority(0),
            PhasedEffect::new(cancel()).priority(1),
            PhasedEffect::new(fixed(100)).priority(2),
            PhasedEffect::new(log("test.after_strike")).phase(Phase::AfterStrike),
        ],
    ));

    let report = arena.use_skill(1);
    assert_eq!(report.total_damage, 3);
    assert_eq!(arena.target_hp(), 37);
    assert_eq!(arena.logged("test.after_strike"), 1);
}

#[test]
fn cancel_turn_stops_later_strikes_but_runs_after_action() {
    let mut arena = Arena::new();
    arena.skill(multi_strike(
        3,
        vec![
            PhasedEffect::new(fixed(4)),
            PhasedEffect::new(EffectNode::CancelTurn).priority(1),
            PhasedEffect::new(log("test.done")).phase(Phase::AfterAction),
        ],
    ));

    let report = arena.use_skill(1);
    assert_eq!(report.strikes.len(), 1);
    assert!(report.turn_cancelled);
    assert_eq!(report.total_damage, 4);
    assert_eq!(arena.logged("test.done"), 1);
}

#[test]
fn refused_heal_cancels_the_phase() {
    let mut arena = Arena::new();
    arena.skill(multi_strike(
        1,
        vec![
            PhasedEffect::new(EffectNode::Heal(HealEffect {
                percent: 50,
                target: Who::User,
                fail_if_full: true,
            })),
            PhasedEffect::new(fixed(9)).priority(1),
        ],
    ));

    let report = arena.use_skill(1);
    assert_eq!(arena.logged("battle.heal.full"), 1);
    assert_eq!(report.total_damage, 0);
    assert_eq!(report.total_healed, 0);
}

// ============================================================================
// Strikes
// ============================================================================

#[test]
fn fainted_target_ends_multi_strike() {
    let mut arena = Arena::new();
    arena.field.get_mut(arena.target).unwrap().hp.drain(30);
    arena.skill(multi_strike(5, vec![PhasedEffect::new(fixed(6))]));

    let report = arena.use_skill(1);
    assert_eq!(report.strikes.len(), 2);
    assert_eq!(report.total_damage, 10);
    assert!(arena.field.get(arena.target).unwrap().is_fainted());
    assert_eq!(arena.logged("battle.fainted"), 1);
}

#[test]
fn effects_can_add_strikes() {
    let mut arena = Arena::new();
    arena.skill(multi_strike(
        1,
        vec![
            PhasedEffect::new(EffectNode::AddStrikes(2)).phase(Phase::BeforeAction),
            PhasedEffect::new(fixed(1)),
        ],
    ));

    let report = arena.use_skill(1);
    assert_eq!(report.hits(), 3);
}

#[test]
fn once_per_action_fires_once_across_strikes() {
    let mut arena = Arena::new();
    arena.skill(multi_strike(
        3,
        vec![PhasedEffect::new(EffectNode::OncePerAction {
            key: 1,
            effect: Box::new(log("test.once")),
        })],
    ));

    let report = arena.use_skill(1);
    assert_eq!(report.hits(), 3);
    assert_eq!(arena.logged("test.once"), 1);

    arena.use_skill(1);
    assert_eq!(arena.logged("test.once"), 2);
}

// ============================================================================
// Combinators and suspension
// ============================================================================

#[test]
fn invoke_runs_another_skills_phase() {
    let mut arena = Arena::new();
    arena.skill(multi_strike(
        1,
        vec![PhasedEffect::new(EffectNode::Invoke {
            skill: SkillId(2),
            phase: Phase::OnHit,
        })],
    ));
    arena.skill(
        SkillData::new(SkillId(2), "Echo", Category::Status, 0)
            .effect(PhasedEffect::new(log("test.echo")))
            .effect(PhasedEffect::new(log("test.wrong_phase")).phase(Phase::AfterAction)),
    );

    arena.use_skill(1);
    assert_eq!(arena.logged("test.echo"), 1);
    assert_eq!(arena.logged("test.wrong_phase"), 0);
}

#[test]
fn choose_one_runs_exactly_the_drawn_child() {
    let mut arena = Arena::new();
    arena.skill(multi_strike(
        1,
        vec![PhasedEffect::new(EffectNode::ChooseOne(vec![
            log("test.a"),
            log("test.b"),
            log("test.c"),
        ]))],
    ));
    arena.rng = ScriptedRng::new([1]);

    arena.use_skill(1);
    assert_eq!(arena.logged("test.a"), 0);
    assert_eq!(arena.logged("test.b"), 1);
    assert_eq!(arena.logged("test.c"), 0);
}

#[test]
fn nested_suspensions_surface_in_order() {
    let mut arena = Arena::new();
    arena.scene = RecordingScene::with_signal_frames(2);
    arena.skill(multi_strike(
        1,
        vec![PhasedEffect::new(EffectNode::Sequence(vec![
            EffectNode::Wait(2),
            EffectNode::Repeat {
                count: 2,
                effect: Box::new(EffectNode::PlaySound(SoundEffect {
                    cue: "ding".into(),
                    wait: true,
                })),
            },
            EffectNode::Wait(0),
            EffectNode::Wait(1),
        ]))],
    ));

    let (_, waits) = arena.run(ActionRequest::skill(arena.user, arena.target, 1));
    assert_eq!(
        waits,
        vec![
            Suspension::Frames(2),
            Suspension::Signal(SignalId(0)),
            Suspension::Signal(SignalId(1)),
            Suspension::Frames(1),
        ]
    );
}

#[test]
fn replaced_move_drives_later_phases() {
    let mut arena = Arena::new();
    arena.skill(multi_strike(
        1,
        vec![
            PhasedEffect::new(EffectNode::ReplaceMove(ReplaceMoveEffect {
                skill: SkillId(3),
                carry_traits: false,
            }))
            .phase(Phase::BeforeAction),
            PhasedEffect::new(log("test.original")),
        ],
    ));
    arena.skill(
        SkillData::new(SkillId(3), "Mimic", Category::Physical, 0)
            .hit_rate(HitRate::Always)
            .strikes(2)
            .effect(PhasedEffect::new(log("test.replacement"))),
    );

    let report = arena.use_skill(1);
    assert_eq!(report.skill, Some(SkillId(3)));
    assert_eq!(arena.logged("test.original"), 0);
    // The strike total was fixed when the action started.
    assert_eq!(arena.logged("test.replacement"), 1);
    assert_eq!(arena.logged("battle.move_replaced"), 1);
}

// ============================================================================
// Items and start errors
// ============================================================================

#[test]
fn equipped_item_is_consumed_on_use() {
    let mut arena = Arena::new();
    let mut potion = ItemData::new(ItemId(1), "Oran Berry");
    potion.effects.push(PhasedEffect::new(EffectNode::Heal(HealEffect {
        percent: 50,
        target: Who::User,
        fail_if_full: false,
    })));
    arena.catalog.insert_item(potion);
    let user = arena.field.get_mut(arena.user).unwrap();
    user.held_item = Some(ItemId(1));
    user.hp.drain(30);

    let mut request = ActionRequest::use_item(arena.user, arena.user, ItemId(1), UsageSlot::EquippedItem);
    request.item = None;
    let (report, _) = arena.run(request);

    assert_eq!(report.consumed, Some(ItemId(1)));
    assert_eq!(report.total_healed, 20);
    let user = arena.field.get(arena.user).unwrap();
    assert_eq!(user.held_item, None);
    assert_eq!(user.hp.current, 30);
}

#[test]
fn start_rejects_bad_requests() {
    let mut arena = Arena::new();
    let ghost = CharacterId(9);

    let err = arena
        .start(ActionRequest::default_attack(ghost, arena.target))
        .unwrap_err();
    assert_eq!(err, ActionError::UserNotFound(ghost));
    assert_eq!(err.error_code(), "ACTION_USER_NOT_FOUND");
    assert_eq!(err.severity(), ErrorSeverity::Validation);

    assert_eq!(
        arena
            .start(ActionRequest::default_attack(arena.user, ghost))
            .unwrap_err(),
        ActionError::TargetNotFound(ghost)
    );
    assert_eq!(
        arena
            .start(ActionRequest::skill(arena.user, arena.target, 3))
            .unwrap_err(),
        ActionError::EmptySlot(UsageSlot::Skill(3))
    );
    assert!(ActionError::EmptySlot(UsageSlot::Skill(3)).severity().is_recoverable());
    assert_eq!(
        arena
            .start(ActionRequest::skill(arena.user, arena.target, 1))
            .unwrap_err(),
        ActionError::UnknownSkill(SkillId(1))
    );

    arena.field.get_mut(arena.user).unwrap().hp.drain(40);
    assert_eq!(
        arena
            .start(ActionRequest::default_attack(arena.user, arena.target))
            .unwrap_err(),
        ActionError::UserOutOfPlay(arena.user)
    );
}

#[test]
fn trap_springs_on_its_victim() {
    let mut arena = Arena::new();
    arena.skill(multi_strike(1, vec![PhasedEffect::new(fixed(7))]));

    let (report, _) = arena.run(ActionRequest::trap(arena.target, SkillId(1)));
    assert_eq!(report.action, ActionKind::Trap);
    assert_eq!(arena.target_hp(), 33);
}
