//! Drives bundled skills through the driver and checks the frame accounting.

use battle_content::{CatalogLoader, TablesLoader};
use battle_core::state::{SkillId, StageStat, StatBlock};
use battle_core::testing::{RecordingScene, ScriptedRng};
use battle_core::{
    ActionError, ActionRequest, BattleEnv, Battlefield, Catalog, CharacterId, Combatant,
    CombatTables, ErrorSeverity, BattleError,
};
use runtime::{Driver, DriverConfig, DriverError, InstantPacer, Pacer, TracingScene};

const SWORDS_DANCE: SkillId = SkillId(9);
const EARTHQUAKE: SkillId = SkillId(13);

struct Arena {
    catalog: Catalog,
    tables: CombatTables,
    field: Battlefield,
    user: CharacterId,
    target: CharacterId,
}

impl Arena {
    fn new(skill: SkillId) -> Self {
        let mut field = Battlefield::new();
        let user = field.spawn(
            Combatant::new("Mover", 10, 60, StatBlock::new(20, 15, 20, 15, 10))
                .with_skills([skill]),
        ).expect("room for combatant");
        let target = field.spawn(Combatant::new(
            "Stander",
            10,
            60,
            StatBlock::new(20, 15, 20, 15, 10),
        )).expect("room for combatant");
        Self {
            catalog: CatalogLoader::load_embedded().expect("embedded catalog loads"),
            tables: TablesLoader::load_embedded().expect("embedded tables load"),
            field,
            user,
            target,
        }
    }
}

#[tokio::test]
async fn frame_waits_advance_pacer_and_scene_together() {
    let mut arena = Arena::new(EARTHQUAKE);
    let mut scene = RecordingScene::new();
    let mut rng = ScriptedRng::new([0, 99, 100]);
    let mut driver = Driver::new(InstantPacer::new());
    let request = ActionRequest::skill(arena.user, arena.target, 0);

    let env = BattleEnv::new(&arena.catalog, &arena.tables);
    let report = driver
        .run(env, &mut arena.field, &mut scene, &mut rng, request)
        .await
        .unwrap();

    assert_eq!(report.hits(), 1);
    assert!(report.total_damage > 0);
    assert_eq!(driver.pacer().frames(), 6);
    assert_eq!(scene.frames(), 6);
}

#[tokio::test]
async fn signal_waits_last_until_the_scene_finishes() {
    let mut arena = Arena::new(SWORDS_DANCE);
    let mut scene = TracingScene::with_signal_frames(3);
    let mut rng = ScriptedRng::new([]);
    let mut driver = Driver::new(InstantPacer::new());
    let request = ActionRequest::skill(arena.user, arena.user, 0);

    let env = BattleEnv::new(&arena.catalog, &arena.tables);
    let report = driver
        .run(env, &mut arena.field, &mut scene, &mut rng, request)
        .await
        .unwrap();

    assert_eq!(report.hits(), 1);
    assert_eq!(driver.pacer().frames(), 3);
    assert_eq!(scene.pending(), 0);
    let user = arena.field.get(arena.user).unwrap();
    assert_eq!(user.boosts.get(StageStat::Attack), 2);
}

#[tokio::test]
async fn stalled_signal_times_out() {
    let mut arena = Arena::new(SWORDS_DANCE);
    let mut scene = RecordingScene::with_signal_frames(50);
    let mut rng = ScriptedRng::new([]);
    let mut driver = Driver::with_config(
        InstantPacer::new(),
        DriverConfig {
            max_signal_frames: 5,
        },
    );
    let request = ActionRequest::skill(arena.user, arena.user, 0);

    let env = BattleEnv::new(&arena.catalog, &arena.tables);
    let err = driver
        .run(env, &mut arena.field, &mut scene, &mut rng, request)
        .await
        .unwrap_err();

    assert!(matches!(err, DriverError::SignalTimeout { frames: 5, .. }));
    assert_eq!(err.severity(), ErrorSeverity::Internal);
    assert_eq!(scene.frames(), 5);
}

#[tokio::test]
async fn rejected_requests_surface_as_action_errors() {
    let mut arena = Arena::new(SkillId::DEFAULT_ATTACK);
    let mut scene = RecordingScene::new();
    let mut rng = ScriptedRng::new([]);
    let mut driver = Driver::new(InstantPacer::new());
    let ghost = CharacterId(99);

    let env = BattleEnv::new(&arena.catalog, &arena.tables);
    let err = driver
        .run(
            env,
            &mut arena.field,
            &mut scene,
            &mut rng,
            ActionRequest::default_attack(ghost, arena.target),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DriverError::Action(ActionError::UserNotFound(id)) if id == ghost
    ));
    assert_eq!(err.error_code(), "ACTION_USER_NOT_FOUND");
    assert!(scene.events.is_empty());
    assert_eq!(driver.pacer().frames(), 0);
}
