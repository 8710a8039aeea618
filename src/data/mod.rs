pub mod roster;
pub mod validate;

pub use roster::{ProfileSource, Roster, RosterError, UnitRecord, DEFAULT_ROSTER_PATH};
pub use validate::{validate_roster, validate_roster_file, ValidationReport, ValidationSeverity};
