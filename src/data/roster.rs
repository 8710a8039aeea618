//! Resolved unit profiles keyed by unit id, civilization, and age.
//! Reads `data/units.json` by default; records hold final stats, no modifier math happens here.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::combat::CombatProfile;

pub const DEFAULT_ROSTER_PATH: &str = "data/units.json";
pub const MIN_AGE: u8 = 1;
pub const MAX_AGE: u8 = 4;

/// Upstream collaborator that turns a unit/civ/age context into final stats.
pub trait ProfileSource {
    fn resolve(&self, unit: &str, civ: &str, age: u8) -> Option<CombatProfile>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub civ: String,
    pub age: u8,
    pub profile: CombatProfile,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    pub units: Vec<UnitRecord>,
}

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("unable to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to parse '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Accepts `{ "units": [...] }` or a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum RosterFile {
    Wrapped(Roster),
    Bare(Vec<UnitRecord>),
}

/// Lowercase and collapse spaces/underscores so "Man at Arms" matches "man_at_arms".
pub(crate) fn normalize_lookup(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() || c == '_' || c == '-' { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

impl Roster {
    pub fn new(units: Vec<UnitRecord>) -> Self {
        Self { units }
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        Ok(match serde_json::from_str(raw)? {
            RosterFile::Wrapped(roster) => roster,
            RosterFile::Bare(units) => Self::new(units),
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, RosterError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| RosterError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw).map_err(|source| RosterError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Like [Roster::load] but an unreadable or missing file yields an empty roster.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(roster) => roster,
            Err(err) => {
                tracing::warn!("{err}; continuing with an empty roster");
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Record for `unit` of `civ` at the highest age not above `age`.
    pub fn find(&self, unit: &str, civ: &str, age: u8) -> Option<&UnitRecord> {
        let unit = normalize_lookup(unit);
        let civ = normalize_lookup(civ);
        self.units
            .iter()
            .filter(|record| record.age <= age)
            .filter(|record| normalize_lookup(&record.civ) == civ)
            .filter(|record| {
                normalize_lookup(&record.id) == unit
                    || (!record.name.is_empty() && normalize_lookup(&record.name) == unit)
            })
            .max_by_key(|record| record.age)
    }
}

impl ProfileSource for Roster {
    fn resolve(&self, unit: &str, civ: &str, age: u8) -> Option<CombatProfile> {
        self.find(unit, civ, age).map(|record| record.profile)
    }
}
