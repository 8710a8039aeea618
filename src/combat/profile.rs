//! Resolved per-unit stat bundles.
//!
//! Everything in a [CombatProfile] has already been through bonus and upgrade
//! stacking upstream; the simulator only reads the final numbers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::combat::error::ConfigurationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Ally,
    Enemy,
}

impl Side {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ally => "ally",
            Self::Enemy => "enemy",
        }
    }

    pub const fn opponent(self) -> Self {
        match self {
            Self::Ally => Self::Enemy,
            Self::Enemy => Self::Ally,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Damage channel. Each channel is mitigated only by the armor of the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttackKind {
    Melee,
    Ranged,
    Fire,
}

impl AttackKind {
    /// Priority order used to pick a unit's primary attack.
    pub const ALL: [AttackKind; 3] = [AttackKind::Melee, AttackKind::Ranged, AttackKind::Fire];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Melee => "melee",
            Self::Ranged => "ranged",
            Self::Fire => "fire",
        }
    }
}

impl fmt::Display for AttackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AttackStat {
    pub total: f64,
    /// Bonus damage against the opposing unit, already resolved for this matchup.
    #[serde(default)]
    pub bonus: f64,
}

impl AttackStat {
    pub const fn new(total: f64, bonus: f64) -> Self {
        Self { total, bonus }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ArmorStats {
    #[serde(default)]
    pub melee: f64,
    #[serde(default)]
    pub ranged: f64,
    #[serde(default)]
    pub fire: f64,
}

impl ArmorStats {
    pub const fn against(&self, kind: AttackKind) -> f64 {
        match kind {
            AttackKind::Melee => self.melee,
            AttackKind::Ranged => self.ranged,
            AttackKind::Fire => self.fire,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombatProfile {
    #[serde(default)]
    pub melee: AttackStat,
    #[serde(default)]
    pub ranged: AttackStat,
    #[serde(default)]
    pub fire: AttackStat,
    #[serde(default)]
    pub armor: ArmorStats,
    /// Seconds between two attacks of the same unit.
    pub attack_interval: f64,
    /// Distance per second.
    pub move_speed: f64,
    pub max_range: f64,
    /// Starting hitpoints of every unit in the group.
    pub hitpoints: f64,
}

impl CombatProfile {
    pub fn attack(&self, kind: AttackKind) -> AttackStat {
        match kind {
            AttackKind::Melee => self.melee,
            AttackKind::Ranged => self.ranged,
            AttackKind::Fire => self.fire,
        }
    }

    /// First attack kind with a positive total, in [AttackKind::ALL] order.
    pub fn primary_attack(&self) -> Option<(AttackKind, AttackStat)> {
        AttackKind::ALL
            .into_iter()
            .map(|kind| (kind, self.attack(kind)))
            .find(|(_, stat)| stat.total > 0.0)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let fields = [
            ("melee.total", self.melee.total),
            ("melee.bonus", self.melee.bonus),
            ("ranged.total", self.ranged.total),
            ("ranged.bonus", self.ranged.bonus),
            ("fire.total", self.fire.total),
            ("fire.bonus", self.fire.bonus),
            ("armor.melee", self.armor.melee),
            ("armor.ranged", self.armor.ranged),
            ("armor.fire", self.armor.fire),
            ("attack_interval", self.attack_interval),
            ("move_speed", self.move_speed),
            ("max_range", self.max_range),
            ("hitpoints", self.hitpoints),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigurationError::InvalidStat { field, value });
            }
        }
        if self.attack_interval <= 0.0 {
            return Err(ConfigurationError::NonPositiveAttackInterval(
                self.attack_interval,
            ));
        }
        if self.hitpoints <= 0.0 {
            return Err(ConfigurationError::NonPositiveHitpoints(self.hitpoints));
        }
        Ok(())
    }
}
