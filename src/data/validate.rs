use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use crate::data::roster::{normalize_lookup, Roster, RosterError, MAX_AGE, MIN_AGE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationSeverity {
    Error,
    Warning,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == ValidationSeverity::Error)
            .count()
    }
}

pub fn validate_roster(roster: &Roster) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut seen = HashSet::new();

    for (index, record) in roster.units.iter().enumerate() {
        let context = if record.id.trim().is_empty() {
            format!("units[{index}]")
        } else {
            format!("units[{index}] {}@{}", record.id, record.civ)
        };

        if record.id.trim().is_empty() {
            report.push(ValidationSeverity::Error, &context, "id is empty");
        }
        if record.civ.trim().is_empty() {
            report.push(ValidationSeverity::Error, &context, "civ is empty");
        }
        if !(MIN_AGE..=MAX_AGE).contains(&record.age) {
            report.push(
                ValidationSeverity::Error,
                &context,
                format!("age {} is outside {MIN_AGE}..={MAX_AGE}", record.age),
            );
        }
        if let Err(err) = record.profile.validate() {
            report.push(ValidationSeverity::Error, &context, err.to_string());
        }
        if record.profile.primary_attack().is_none() {
            report.push(
                ValidationSeverity::Warning,
                &context,
                "unit has no attack and can never win a fight",
            );
        }

        let key = (
            normalize_lookup(&record.id),
            normalize_lookup(&record.civ),
            record.age,
        );
        if !seen.insert(key) {
            report.push(
                ValidationSeverity::Error,
                &context,
                format!("duplicate record for age {}", record.age),
            );
        }
    }

    report
}

pub fn validate_roster_file(path: impl AsRef<Path>) -> Result<ValidationReport, RosterError> {
    Roster::load(path).map(|roster| validate_roster(&roster))
}
