use crate::cells::{
    AccuracyBoost, AttackBoost, CellStore, DefenseBoost, EvasionBoost, SpAtkBoost, SpDefBoost,
    TargetDefense, TargetLevel, TargetSpDef, TargetSpeed, UserAttack, UserLevel, UserSpAtk,
    UserSpeed,
};
use crate::state::{Combatant, Stat};

/// Captures the participants' effective stats, levels and boost stages into
/// the local store at the start of a strike.
///
/// Boost stages are added on top of whatever the move's own cells already
/// contributed.
pub fn stage_strike(local: &mut CellStore, user: &Combatant, target: &Combatant) {
    local.set(UserLevel(i64::from(user.level)));
    local.set(UserAttack(i64::from(user.effective(Stat::Attack))));
    local.set(UserSpAtk(i64::from(user.effective(Stat::SpAtk))));
    local.set(UserSpeed(i64::from(user.effective(Stat::Speed))));
    local.add::<AttackBoost>(i64::from(user.boosts.attack));
    local.add::<SpAtkBoost>(i64::from(user.boosts.sp_atk));
    local.add::<AccuracyBoost>(i64::from(user.boosts.accuracy));

    local.set(TargetLevel(i64::from(target.level)));
    local.set(TargetDefense(i64::from(target.effective(Stat::Defense))));
    local.set(TargetSpDef(i64::from(target.effective(Stat::SpDef))));
    local.set(TargetSpeed(i64::from(target.effective(Stat::Speed))));
    local.add::<DefenseBoost>(i64::from(target.boosts.defense));
    local.add::<SpDefBoost>(i64::from(target.boosts.sp_def));
    local.add::<EvasionBoost>(i64::from(target.boosts.evasion));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StatBlock;

    #[test]
    fn staging_reads_overrides_and_stacks_boosts() {
        let mut user = Combatant::new("User", 12, 50, StatBlock::new(20, 10, 30, 10, 8));
        user.proxy.set(Stat::Attack, Some(44));
        user.boosts.attack = 2;
        let mut target = Combatant::new("Target", 9, 50, StatBlock::new(10, 15, 10, 25, 6));
        target.boosts.evasion = -1;

        let mut local = CellStore::new();
        local.add::<AttackBoost>(1);
        stage_strike(&mut local, &user, &target);

        assert_eq!(local.count::<UserLevel>(), 12);
        assert_eq!(local.count::<UserAttack>(), 44);
        assert_eq!(local.count::<AttackBoost>(), 3);
        assert_eq!(local.count::<TargetDefense>(), 15);
        assert_eq!(local.count::<TargetSpeed>(), 6);
        assert_eq!(local.count::<EvasionBoost>(), -1);
    }
}
