use crate::combat::profile::{AttackKind, CombatProfile};

/// Smallest damage a landed hit can deal.
pub const MIN_HIT_DAMAGE: f64 = 1.0;

/// Damage one hit of `attacker` deals to a unit with `defender`'s armor.
///
/// Uses the attacker's primary attack and the defender's armor of the same
/// kind: `max(1, round(total + bonus - armor))`. Returns `None` when the
/// attacker has no attack at all.
pub fn hit_damage(attacker: &CombatProfile, defender: &CombatProfile) -> Option<(AttackKind, f64)> {
    let (kind, stat) = attacker.primary_attack()?;
    let raw = stat.total + stat.bonus - defender.armor.against(kind);
    Some((kind, raw.max(MIN_HIT_DAMAGE).round()))
}
