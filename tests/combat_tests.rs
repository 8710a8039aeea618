use skirmish::combat::{
    estimate_duel, simulate, ArmorStats, AttackStat, Battle, CombatProfile, ConfigurationError,
    EngagementState, Outcome, Side, SimulationConfig, SimulationError, TraceMode,
    DEFAULT_STALL_WINDOW, DEFAULT_TICK_SIZE,
};

fn melee_unit(attack: f64, hitpoints: f64) -> CombatProfile {
    CombatProfile {
        melee: AttackStat::new(attack, 0.0),
        ranged: AttackStat::default(),
        fire: AttackStat::default(),
        armor: ArmorStats::default(),
        attack_interval: 1.0,
        move_speed: 1.0,
        max_range: 1.0,
        hitpoints,
    }
}

fn traced() -> SimulationConfig {
    SimulationConfig {
        trace_mode: TraceMode::Ticks,
        ..SimulationConfig::default()
    }
}

#[test]
fn scenario_a_enemy_dies_on_fifth_attack_at_four_seconds() {
    let ally = melee_unit(10.0, 100.0);
    let enemy = melee_unit(1.0, 50.0);

    let result = simulate(&ally, &enemy, 1, 1, &SimulationConfig::default())
        .expect("simulation should resolve");

    assert_eq!(result.outcome, Outcome::Victory { winner: Side::Ally });
    assert_eq!(result.elapsed_time, 4.0);
    assert_eq!(result.ticks, 33);
    assert_eq!(result.ally.volleys, 5);
    assert_eq!(result.ally.hits_landed, 5);
    assert!(result.enemy.hitpoints.is_empty());
    // Enemy swung at t = 0, 1, 2, 3; its swing at t = 4 never happens.
    assert_eq!(result.ally.hitpoints, vec![96.0]);
    assert_eq!(result.enemy.hits_landed, 4);
}

#[test]
fn scenario_b_unreachable_groups_end_in_stalemate() {
    let mut ally = melee_unit(10.0, 100.0);
    ally.max_range = 0.0;
    ally.move_speed = 0.0;
    let enemy = ally;
    let config = SimulationConfig {
        starting_distance: 20.0,
        ..SimulationConfig::default()
    };

    let result = simulate(&ally, &enemy, 1, 1, &config).expect("stalemate is a normal result");

    assert_eq!(result.outcome, Outcome::Stalemate);
    assert_eq!(result.outcome.winner(), None);
    assert_eq!(result.ticks, DEFAULT_STALL_WINDOW);
    assert_eq!(result.ally.hitpoints, vec![100.0]);
    assert_eq!(result.enemy.hitpoints, vec![100.0]);
    assert_eq!(result.enemy.position, 20.0);
}

#[test]
fn unarmed_pair_in_contact_is_a_stalemate() {
    let unarmed = melee_unit(0.0, 100.0);
    let result =
        simulate(&unarmed, &unarmed, 2, 3, &traced()).expect("stalemate is a normal result");

    assert_eq!(result.outcome, Outcome::Stalemate);
    assert_eq!(result.ticks, DEFAULT_STALL_WINDOW);
    assert!(result
        .trace
        .iter()
        .all(|tick| tick.ally.state == EngagementState::Engaged && !tick.ally.attacked));
    assert_eq!(result.ally.hitpoints, vec![100.0; 2]);
    assert_eq!(result.enemy.hitpoints, vec![100.0; 3]);
}

#[test]
fn slow_approach_is_never_a_stalemate() {
    let mut crawler = melee_unit(10.0, 100.0);
    crawler.move_speed = 0.01;
    let mut post = melee_unit(0.0, 10.0);
    post.move_speed = 0.0;
    post.max_range = 0.0;
    let config = SimulationConfig {
        starting_distance: 5.0,
        ..SimulationConfig::default()
    };

    // 4 units of closing at 0.00125 per tick takes about 3200 ticks.
    let result = simulate(&crawler, &post, 1, 1, &config).expect("should resolve");
    assert_eq!(result.outcome.winner(), Some(Side::Ally));
    assert!(result.ticks > 40 * DEFAULT_STALL_WINDOW);
    assert_eq!(result.ally.volleys, 1);
}

#[test]
fn scenario_c_floor_damage_needs_one_hit_per_hitpoint() {
    let ally = melee_unit(5.0, 1000.0);
    let mut enemy = melee_unit(1.0, 50.0);
    enemy.armor = ArmorStats {
        melee: 100.0,
        ranged: 0.0,
        fire: 0.0,
    };

    let result = simulate(&ally, &enemy, 3, 1, &SimulationConfig::default())
        .expect("simulation should resolve");

    assert_eq!(result.outcome.winner(), Some(Side::Ally));
    assert_eq!(result.ally.hits_landed, 50);
    // 17 volleys of three; the last volley's third hit has no target left.
    assert_eq!(result.ally.volleys, 17);
    assert_eq!(result.elapsed_time, 16.0);
    // Every enemy hit lands on the first ally unit.
    assert_eq!(result.ally.hitpoints, vec![984.0, 1000.0, 1000.0]);
}

#[test]
fn ally_wins_simultaneous_last_kill() {
    let unit = melee_unit(10.0, 30.0);
    let result =
        simulate(&unit, &unit, 1, 1, &SimulationConfig::default()).expect("should resolve");

    assert_eq!(result.outcome.winner(), Some(Side::Ally));
    assert_eq!(result.elapsed_time, 2.0);
    assert_eq!(result.ally.hitpoints, vec![10.0]);
}

#[test]
fn duel_estimate_matches_in_range_one_on_one_simulation() {
    let mut ally = melee_unit(12.0, 120.0);
    ally.attack_interval = 1.875;
    let mut enemy = melee_unit(7.0, 100.0);
    enemy.attack_interval = 1.625;
    enemy.armor.melee = 2.0;

    let duel = estimate_duel(&ally, &enemy);
    let result =
        simulate(&ally, &enemy, 1, 1, &SimulationConfig::default()).expect("should resolve");

    assert_eq!(duel.winner, result.outcome.winner());
    let winner = duel.winner.expect("both units are armed");
    assert_eq!(duel.line(winner).time_needed, Some(result.elapsed_time));
    let hp_left = |side: Side| result.side(side).hitpoints.iter().sum::<f64>();
    assert_eq!(duel.ally.hp_left, hp_left(Side::Ally));
    assert_eq!(duel.enemy.hp_left, hp_left(Side::Enemy));
}

#[test]
fn volley_damage_goes_to_first_living_unit() {
    let ally = melee_unit(30.0, 100.0);
    let enemy = melee_unit(0.0, 50.0);
    let mut battle = Battle::new(&ally, &enemy, 1, 3, &SimulationConfig::default())
        .expect("battle should build");

    assert_eq!(battle.step(), None);
    assert_eq!(battle.group(Side::Enemy).hitpoints, vec![20.0, 50.0, 50.0]);

    for _ in 0..8 {
        assert_eq!(battle.step(), None);
    }
    // Second volley at t = 1 kills the first unit and the pool shrinks.
    assert_eq!(battle.group(Side::Enemy).hitpoints, vec![50.0, 50.0]);
}

#[test]
fn each_side_moves_with_its_own_speed() {
    let mut ally = melee_unit(10.0, 100.0);
    ally.move_speed = 2.0;
    let mut enemy = melee_unit(10.0, 100.0);
    enemy.move_speed = 0.5;
    let config = SimulationConfig {
        starting_distance: 21.0,
        ..traced()
    };

    let mut battle = Battle::new(&ally, &enemy, 1, 1, &config).expect("battle should build");
    battle.step();
    assert_eq!(battle.group(Side::Ally).position, 2.0 * DEFAULT_TICK_SIZE);
    assert_eq!(battle.group(Side::Enemy).position, 21.0 - 0.5 * DEFAULT_TICK_SIZE);
    assert!(battle.group(Side::Ally).is_moving);

    let result = simulate(&ally, &enemy, 1, 1, &config).expect("should resolve");
    assert_eq!(result.trace[63].ally.state, EngagementState::Approaching);
    assert_eq!(result.trace[64].ally.state, EngagementState::Engaged);
    assert_eq!(result.trace[64].distance, 1.0);
    // Engaged groups hold position.
    assert_eq!(result.ally.position, 16.0);
    assert_eq!(result.enemy.position, 17.0);
}

#[test]
fn groups_meet_instead_of_crossing() {
    let mut unit = melee_unit(10.0, 100.0);
    unit.move_speed = 8.0;
    unit.max_range = 0.0;
    let config = SimulationConfig {
        starting_distance: 1.0,
        ..SimulationConfig::default()
    };

    let mut battle = Battle::new(&unit, &unit, 1, 1, &config).expect("battle should build");
    battle.step();
    assert_eq!(battle.distance(), 0.0);
    assert_eq!(battle.group(Side::Ally).position, 0.5);
    assert_eq!(battle.group(Side::Enemy).position, 0.5);
}

#[test]
fn outranging_unit_strikes_first() {
    let mut archer = melee_unit(0.0, 70.0);
    archer.ranged = AttackStat::new(5.0, 0.0);
    archer.max_range = 5.0;
    archer.move_speed = 1.25;
    let mut spearman = melee_unit(8.0, 80.0);
    spearman.max_range = 0.3;
    spearman.move_speed = 1.25;
    let config = SimulationConfig {
        starting_distance: 12.0,
        ..traced()
    };

    let result = simulate(&archer, &spearman, 1, 1, &config).expect("should resolve");
    let first_attack = |side: Side| {
        result
            .trace
            .iter()
            .position(|tick| match side {
                Side::Ally => tick.ally.attacked,
                Side::Enemy => tick.enemy.attacked,
            })
            .expect("both sides attack at some point")
    };
    assert!(first_attack(Side::Ally) < first_attack(Side::Enemy));
    // Range 5 is reached at the start of tick 23; the archer held from then on.
    assert_eq!(result.trace[22].ally.state, EngagementState::Approaching);
    assert_eq!(result.trace[23].ally.state, EngagementState::Engaged);
    assert_eq!(result.ally.position, 22.0 * 1.25 * DEFAULT_TICK_SIZE);
}

#[test]
fn configuration_errors_fail_before_the_loop() {
    let unit = melee_unit(10.0, 100.0);
    let config = SimulationConfig::default();

    assert_eq!(
        simulate(&unit, &unit, 0, 1, &config),
        Err(SimulationError::Configuration(ConfigurationError::EmptyGroup {
            side: Side::Ally
        }))
    );

    let mut idle = unit;
    idle.attack_interval = 0.0;
    assert_eq!(
        simulate(&unit, &idle, 1, 1, &config),
        Err(SimulationError::Profile {
            side: Side::Enemy,
            source: ConfigurationError::NonPositiveAttackInterval(0.0),
        })
    );

    let mut broken = unit;
    broken.max_range = f64::INFINITY;
    let err = simulate(&broken, &unit, 1, 1, &config).expect_err("infinite range is rejected");
    assert!(err.is_configuration());

    for bad in [
        SimulationConfig {
            tick_size: 0.0,
            ..config
        },
        SimulationConfig {
            starting_distance: -1.0,
            ..config
        },
        SimulationConfig {
            max_ticks: 0,
            ..config
        },
        SimulationConfig {
            stall_window: 0,
            ..config
        },
    ] {
        let err = simulate(&unit, &unit, 1, 1, &bad).expect_err("bad config is rejected");
        assert!(err.is_configuration(), "unexpected error: {err}");
    }
}

#[test]
fn tick_ceiling_is_a_fatal_error() {
    let ally = melee_unit(10.0, 100.0);
    let enemy = melee_unit(1.0, 50.0);
    let config = SimulationConfig {
        max_ticks: 10,
        ..SimulationConfig::default()
    };

    assert_eq!(
        simulate(&ally, &enemy, 1, 1, &config),
        Err(SimulationError::SafetyLimitExceeded { ticks: 10 })
    );
}

#[test]
fn identical_inputs_give_identical_results() {
    let mut ally = melee_unit(9.0, 125.0);
    ally.move_speed = 1.875;
    let mut enemy = melee_unit(6.0, 70.0);
    enemy.ranged = AttackStat::new(6.0, 0.0);
    enemy.max_range = 5.0;
    let config = SimulationConfig {
        starting_distance: 15.0,
        ..traced()
    };

    let first = simulate(&ally, &enemy, 8, 10, &config).expect("should resolve");
    let second = simulate(&ally, &enemy, 8, 10, &config).expect("should resolve");
    assert_eq!(first, second);
}

#[test]
fn trace_has_one_entry_per_tick_and_monotonic_pools() {
    let ally = melee_unit(7.0, 60.0);
    let enemy = melee_unit(5.0, 80.0);
    let config = SimulationConfig {
        starting_distance: 6.0,
        ..traced()
    };

    let result = simulate(&ally, &enemy, 5, 4, &config).expect("should resolve");

    assert_eq!(result.trace.len() as u64, result.ticks);
    for (index, tick) in result.trace.iter().enumerate() {
        assert_eq!(tick.tick, index as u64);
        assert_eq!(tick.time, index as f64 * DEFAULT_TICK_SIZE);
        assert!(tick.ally.damage >= f64::from(tick.ally.hits));
        assert!(tick.enemy.damage >= f64::from(tick.enemy.hits));
    }
    for pair in result.trace.windows(2) {
        assert!(pair[1].ally.units_alive <= pair[0].ally.units_alive);
        assert!(pair[1].enemy.units_alive <= pair[0].enemy.units_alive);
    }
    let last = result.trace.last().expect("trace should not be empty");
    assert_eq!(last.time, result.elapsed_time);
}

#[test]
fn trace_is_empty_unless_requested() {
    let unit = melee_unit(10.0, 30.0);
    let result =
        simulate(&unit, &unit, 2, 2, &SimulationConfig::default()).expect("should resolve");
    assert!(result.trace.is_empty());
}

#[test]
fn result_serializes_side_keyed_pools() {
    let ally = melee_unit(10.0, 100.0);
    let enemy = melee_unit(1.0, 50.0);
    let result =
        simulate(&ally, &enemy, 2, 1, &SimulationConfig::default()).expect("should resolve");

    let json = serde_json::to_value(&result).expect("result should serialize");
    assert_eq!(json["outcome"]["kind"], "victory");
    assert_eq!(json["outcome"]["winner"], "ally");
    assert_eq!(json["ally"]["side"], "ally");
    assert_eq!(json["ally"]["hitpoints"].as_array().map(Vec::len), Some(2));
    assert_eq!(json["enemy"]["hitpoints"].as_array().map(Vec::len), Some(0));
    assert!(json["elapsed_time"].is_number());
    assert!(json.get("trace").is_none());
}

#[test]
fn larger_armies_close_in_and_resolve() {
    let mut knights = melee_unit(24.0, 230.0);
    knights.armor = ArmorStats {
        melee: 4.0,
        ranged: 4.0,
        fire: 0.0,
    };
    knights.move_speed = 1.625;
    knights.attack_interval = 1.5;
    let mut archers = melee_unit(0.0, 70.0);
    archers.ranged = AttackStat::new(5.0, 0.0);
    archers.max_range = 5.0;
    archers.move_speed = 1.25;
    archers.attack_interval = 1.625;
    let config = SimulationConfig {
        starting_distance: 30.0,
        ..SimulationConfig::default()
    };

    let result = simulate(&knights, &archers, 10, 40, &config).expect("should resolve");
    assert!(result.outcome.winner().is_some());
    assert!(result.ally.hits_landed > 0);
    assert!(result.enemy.hits_landed > 0);
}
