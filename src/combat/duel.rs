//! Closed-form 1v1 summary for the compare view.
//!
//! Assumes both units start in range and swing at t = 0, then once per attack
//! interval; when both swings fall on the same instant the ally's lands first.
//! For intervals that are multiples of the tick size this agrees with a 1v1
//! [simulate](crate::combat::simulate) run at distance 0.

use serde::{Deserialize, Serialize};

use crate::combat::damage::hit_damage;
use crate::combat::engine::EPSILON;
use crate::combat::profile::{AttackKind, CombatProfile, Side};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DuelLine {
    pub attack: Option<AttackKind>,
    /// Damage per hit; 0 for an unarmed unit.
    pub damage: f64,
    pub attack_interval: f64,
    pub attacks_needed: Option<u32>,
    pub time_needed: Option<f64>,
    pub hp_left: f64,
    /// Strictly faster than the opponent.
    pub can_kite: bool,
}

/// Ally stat minus enemy stat; attacks include their bonus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatDiffs {
    pub hitpoints: f64,
    pub attack_interval: f64,
    pub move_speed: f64,
    pub max_range: f64,
    pub melee_attack: f64,
    pub ranged_attack: f64,
    pub fire_attack: f64,
    pub melee_armor: f64,
    pub ranged_armor: f64,
    pub fire_armor: f64,
}

impl StatDiffs {
    pub fn between(ally: &CombatProfile, enemy: &CombatProfile) -> Self {
        let attack = |kind: AttackKind| {
            let (own, other) = (ally.attack(kind), enemy.attack(kind));
            (own.total + own.bonus) - (other.total + other.bonus)
        };
        let armor = |kind: AttackKind| ally.armor.against(kind) - enemy.armor.against(kind);
        Self {
            hitpoints: ally.hitpoints - enemy.hitpoints,
            attack_interval: ally.attack_interval - enemy.attack_interval,
            move_speed: ally.move_speed - enemy.move_speed,
            max_range: ally.max_range - enemy.max_range,
            melee_attack: attack(AttackKind::Melee),
            ranged_attack: attack(AttackKind::Ranged),
            fire_attack: attack(AttackKind::Fire),
            melee_armor: armor(AttackKind::Melee),
            ranged_armor: armor(AttackKind::Ranged),
            fire_armor: armor(AttackKind::Fire),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DuelSummary {
    pub ally: DuelLine,
    pub enemy: DuelLine,
    pub winner: Option<Side>,
    pub stat_diffs: StatDiffs,
}

impl DuelSummary {
    pub fn line(&self, side: Side) -> &DuelLine {
        match side {
            Side::Ally => &self.ally,
            Side::Enemy => &self.enemy,
        }
    }
}

/// Swings at `0, interval, 2 * interval, ...` up to `end`; `inclusive` counts a swing at exactly `end`.
fn swings_until(end: f64, interval: f64, inclusive: bool) -> u32 {
    if inclusive {
        ((end + EPSILON) / interval).floor() as u32 + 1
    } else if end <= EPSILON {
        0
    } else {
        ((end - EPSILON) / interval).floor() as u32 + 1
    }
}

pub fn estimate_duel(ally: &CombatProfile, enemy: &CombatProfile) -> DuelSummary {
    let ally_hit = hit_damage(ally, enemy);
    let enemy_hit = hit_damage(enemy, ally);

    let needed = |hit: Option<(AttackKind, f64)>, target: &CombatProfile| {
        hit.map(|(_, damage)| (target.hitpoints / damage - EPSILON).ceil().max(1.0) as u32)
    };
    let ally_needed = needed(ally_hit, enemy);
    let enemy_needed = needed(enemy_hit, ally);
    let time = |attacks: Option<u32>, profile: &CombatProfile| {
        attacks.map(|n| f64::from(n - 1) * profile.attack_interval)
    };
    let ally_time = time(ally_needed, ally);
    let enemy_time = time(enemy_needed, enemy);

    let winner = match (ally_time, enemy_time) {
        (Some(a), Some(e)) if a <= e + EPSILON => Some(Side::Ally),
        (Some(_), Some(_)) => Some(Side::Enemy),
        (Some(_), None) => Some(Side::Ally),
        (None, Some(_)) => Some(Side::Enemy),
        (None, None) => None,
    };

    let (ally_taken, enemy_taken) = match winner {
        Some(Side::Ally) => {
            let end = ally_time.unwrap_or_default();
            let enemy_swings = match enemy_hit {
                Some(_) => swings_until(end, enemy.attack_interval, false),
                None => 0,
            };
            (enemy_swings, ally_needed.unwrap_or_default())
        }
        Some(Side::Enemy) => {
            let end = enemy_time.unwrap_or_default();
            let ally_swings = match ally_hit {
                Some(_) => swings_until(end, ally.attack_interval, true),
                None => 0,
            };
            (enemy_needed.unwrap_or_default(), ally_swings)
        }
        None => (0, 0),
    };

    let line = |profile: &CombatProfile,
                opponent: &CombatProfile,
                hit: Option<(AttackKind, f64)>,
                opponent_hit: Option<(AttackKind, f64)>,
                attacks_needed: Option<u32>,
                time_needed: Option<f64>,
                hits_taken: u32| {
        let incoming = opponent_hit.map_or(0.0, |(_, damage)| damage);
        DuelLine {
            attack: hit.map(|(kind, _)| kind),
            damage: hit.map_or(0.0, |(_, damage)| damage),
            attack_interval: profile.attack_interval,
            attacks_needed,
            time_needed,
            hp_left: (profile.hitpoints - f64::from(hits_taken) * incoming).max(0.0),
            can_kite: profile.move_speed > opponent.move_speed,
        }
    };

    DuelSummary {
        ally: line(ally, enemy, ally_hit, enemy_hit, ally_needed, ally_time, ally_taken),
        enemy: line(enemy, ally, enemy_hit, ally_hit, enemy_needed, enemy_time, enemy_taken),
        winner,
        stat_diffs: StatDiffs::between(ally, enemy),
    }
}
