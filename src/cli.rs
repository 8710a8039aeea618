use std::io;

use crate::combat::{
    estimate_duel, simulate, write_trace_csv, CombatProfile, SimulationResult, TraceMode,
};
use crate::data::{validate_roster_file, ProfileSource, Roster, DEFAULT_ROSTER_PATH};
use crate::server;
use crate::settings::Settings;

const USAGE: &str = "usage: skirmish <serve|simulate|duel|units|validate>";
const SIMULATE_USAGE: &str = "usage: skirmish simulate <unit:civ[:age]> <unit:civ[:age]> [ally_count] [enemy_count] [--distance=<d>] [--trace] [--csv] [--table]";
const DUEL_USAGE: &str = "usage: skirmish duel <unit:civ[:age]> <unit:civ[:age]>";
const DEFAULT_AGE: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Simulate,
    Duel,
    Units,
    Validate,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("simulate") => Some(Command::Simulate),
        Some("duel") => Some(Command::Duel),
        Some("units") => Some(Command::Units),
        Some("validate") => Some(Command::Validate),
        _ => None,
    }
}

/// `unit:civ[:age]` as typed on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideRef {
    pub unit: String,
    pub civ: String,
    pub age: u8,
}

pub fn parse_side(token: &str) -> Result<SideRef, String> {
    let mut parts = token.split(':');
    let unit = parts.next().unwrap_or_default().trim();
    let civ = parts.next().unwrap_or_default().trim();
    if unit.is_empty() || civ.is_empty() {
        return Err(format!("expected unit:civ[:age], got '{token}'"));
    }
    let age = match parts.next() {
        Some(raw) => raw
            .trim()
            .parse::<u8>()
            .map_err(|_| format!("invalid age '{raw}' in '{token}'"))?,
        None => DEFAULT_AGE,
    };
    if parts.next().is_some() {
        return Err(format!("expected unit:civ[:age], got '{token}'"));
    }
    Ok(SideRef {
        unit: unit.to_string(),
        civ: civ.to_string(),
        age,
    })
}

pub fn run_with_args(args: &[String]) -> i32 {
    let Some(command) = parse_command(args) else {
        eprintln!("{USAGE}");
        return 2;
    };

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("settings error: {err}");
            return 1;
        }
    };

    match command {
        Command::Serve => handle_serve(&settings),
        Command::Simulate => handle_simulate(args, &settings),
        Command::Duel => handle_duel(args, &settings),
        Command::Units => handle_units(&settings),
        Command::Validate => handle_validate(args, &settings),
    }
}

fn handle_serve(settings: &Settings) -> i32 {
    match server::run_server(settings) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn positional(args: &[String]) -> Vec<&String> {
    args.iter().skip(2).filter(|arg| !arg.starts_with("--")).collect()
}

fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    let prefix = format!("--{name}=");
    args.iter().find_map(|arg| arg.strip_prefix(prefix.as_str()))
}

fn has_flag(args: &[String], name: &str) -> bool {
    let flag = format!("--{name}");
    args.iter().any(|arg| *arg == flag)
}

fn load_roster(settings: &Settings) -> Result<Roster, i32> {
    Roster::load(&settings.roster_path).map_err(|err| {
        eprintln!("roster error: {err}");
        1
    })
}

/// Resolves the two side tokens at `positional[0..2]`.
fn resolve_sides(
    positional: &[&String],
    roster: &Roster,
    usage: &str,
) -> Result<(CombatProfile, CombatProfile), i32> {
    let (Some(ally), Some(enemy)) = (positional.first(), positional.get(1)) else {
        eprintln!("{usage}");
        return Err(2);
    };
    let mut profiles = Vec::with_capacity(2);
    for token in [ally, enemy] {
        let side = parse_side(token).map_err(|err| {
            eprintln!("{err}");
            2
        })?;
        let profile = roster.resolve(&side.unit, &side.civ, side.age).ok_or_else(|| {
            eprintln!(
                "unknown unit '{}' for civ '{}' at age {}",
                side.unit, side.civ, side.age
            );
            1
        })?;
        profiles.push(profile);
    }
    Ok((profiles[0], profiles[1]))
}

fn handle_simulate(args: &[String], settings: &Settings) -> i32 {
    let roster = match load_roster(settings) {
        Ok(roster) => roster,
        Err(code) => return code,
    };
    let positional = positional(args);
    let (ally, enemy) = match resolve_sides(&positional, &roster, SIMULATE_USAGE) {
        Ok(profiles) => profiles,
        Err(code) => return code,
    };
    let counts = (
        parse_count(positional.get(2).copied(), "ally_count"),
        parse_count(positional.get(3).copied(), "enemy_count"),
    );
    let (ally_count, enemy_count) = match counts {
        (Ok(ally), Ok(enemy)) => (ally, enemy),
        (Err(err), _) | (_, Err(err)) => {
            eprintln!("{err}");
            eprintln!("{SIMULATE_USAGE}");
            return 2;
        }
    };
    let as_csv = has_flag(args, "csv");
    let as_table = has_flag(args, "table");

    let mut config = settings.simulation.to_config();
    if let Some(raw) = flag_value(args, "distance") {
        match raw.parse::<f64>() {
            Ok(distance) => config.starting_distance = distance,
            Err(_) => {
                eprintln!("invalid distance '{raw}'");
                return 2;
            }
        }
    }
    if as_csv || has_flag(args, "trace") {
        config.trace_mode = TraceMode::Ticks;
    }

    let result = match simulate(&ally, &enemy, ally_count, enemy_count, &config) {
        Ok(result) => result,
        Err(err) => {
            eprintln!("simulation failed: {err}");
            return 1;
        }
    };

    if as_csv {
        if let Err(err) = write_trace_csv(&result.trace, io::stdout().lock()) {
            eprintln!("failed to write trace csv: {err}");
            return 1;
        }
    } else if as_table {
        print_table(&result);
    } else {
        match serde_json::to_string_pretty(&result) {
            Ok(payload) => println!("{payload}"),
            Err(err) => {
                eprintln!("failed to serialize simulation result: {err}");
                return 1;
            }
        }
    }
    0
}

fn print_table(result: &SimulationResult) {
    let outcome = match result.outcome.winner() {
        Some(side) => format!("{side}_victory"),
        None => "stalemate".to_string(),
    };
    println!("outcome\telapsed_time\tally_survivors\tenemy_survivors\tally_hits\tenemy_hits");
    println!(
        "{}\t{:.3}\t{}\t{}\t{}\t{}",
        outcome,
        result.elapsed_time,
        result.ally.survivors(),
        result.enemy.survivors(),
        result.ally.hits_landed,
        result.enemy.hits_landed
    );
}

fn handle_duel(args: &[String], settings: &Settings) -> i32 {
    let roster = match load_roster(settings) {
        Ok(roster) => roster,
        Err(code) => return code,
    };
    let (ally, enemy) = match resolve_sides(&positional(args), &roster, DUEL_USAGE) {
        Ok(profiles) => profiles,
        Err(code) => return code,
    };
    match serde_json::to_string_pretty(&estimate_duel(&ally, &enemy)) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize duel summary: {err}");
            1
        }
    }
}

fn handle_units(settings: &Settings) -> i32 {
    let roster = match load_roster(settings) {
        Ok(roster) => roster,
        Err(code) => return code,
    };
    println!("id\tciv\tage\tname");
    for record in &roster.units {
        println!("{}\t{}\t{}\t{}", record.id, record.civ, record.age, record.name);
    }
    0
}

fn handle_validate(args: &[String], settings: &Settings) -> i32 {
    let path = args
        .get(2)
        .map(String::as_str)
        .or_else(|| settings.roster_path.to_str())
        .unwrap_or(DEFAULT_ROSTER_PATH);

    match validate_roster_file(path) {
        Ok(report) if !report.has_errors() => {
            for diagnostic in &report.diagnostics {
                eprintln!("{diagnostic}");
            }
            println!("validation passed: {path}");
            0
        }
        Ok(report) => {
            eprintln!("validation failed: {} issue(s)", report.error_count());
            for diagnostic in &report.diagnostics {
                eprintln!("  {diagnostic}");
            }
            1
        }
        Err(err) => {
            eprintln!("validation failed: {err}");
            1
        }
    }
}

/// Missing counts mean one unit; anything present must be a non-negative integer.
fn parse_count(raw: Option<&String>, name: &str) -> Result<u32, String> {
    match raw {
        None => Ok(1),
        Some(value) => value
            .parse::<u32>()
            .map_err(|_| format!("invalid {name} '{value}': expected a unit count")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn parse_command_maps_known_subcommands() {
        assert_eq!(parse_command(&args(&["skirmish", "duel"])), Some(Command::Duel));
        assert_eq!(parse_command(&args(&["skirmish", "units"])), Some(Command::Units));
        assert_eq!(parse_command(&args(&["skirmish", "fight"])), None);
        assert_eq!(parse_command(&args(&["skirmish"])), None);
    }

    #[test]
    fn parse_side_defaults_age() {
        assert_eq!(
            parse_side("spearman:ab"),
            Ok(SideRef {
                unit: "spearman".to_string(),
                civ: "ab".to_string(),
                age: DEFAULT_AGE,
            })
        );
        assert_eq!(parse_side("archer:de:2").map(|side| side.age), Ok(2));
    }

    #[test]
    fn parse_side_rejects_malformed_tokens() {
        assert!(parse_side("spearman").is_err());
        assert!(parse_side(":ab").is_err());
        assert!(parse_side("archer:de:two").is_err());
        assert!(parse_side("archer:de:2:extra").is_err());
    }

    #[test]
    fn positional_skips_flags() {
        let argv = args(&["skirmish", "simulate", "a:b", "--trace", "c:d", "3"]);
        let positional: Vec<&str> = positional(&argv).into_iter().map(String::as_str).collect();
        assert_eq!(positional, vec!["a:b", "c:d", "3"]);
        assert!(has_flag(&argv, "trace"));
        assert!(!has_flag(&argv, "csv"));
    }

    #[test]
    fn parse_count_rejects_instead_of_defaulting() {
        let negative = "-3".to_string();
        let word = "abc".to_string();
        let five = "5".to_string();
        assert_eq!(parse_count(None, "ally_count"), Ok(1));
        assert_eq!(parse_count(Some(&five), "ally_count"), Ok(5));
        assert!(parse_count(Some(&negative), "ally_count").is_err());
        assert!(parse_count(Some(&word), "enemy_count").is_err());
    }

    #[test]
    fn flag_value_reads_equals_form() {
        let argv = args(&["skirmish", "simulate", "--distance=12.5"]);
        assert_eq!(flag_value(&argv, "distance"), Some("12.5"));
        assert_eq!(flag_value(&argv, "ticks"), None);
    }
}
