use super::*;
use proptest::prelude::*;

#[test]
fn test_default_config_is_valid() {
    let config = GameConfig::default();
    config.validate().expect("default config valid");
    assert_eq!(config.countdown_ms(), u64::from(COUNTDOWN_SECONDS) * 1_000);
}

#[test]
fn test_config_validation_rejects_bad_fields() {
    let valid = GameConfig::default();

    let inverted_bets = GameConfig {
        min_bet: 50.0,
        max_bet: 10.0,
        ..valid.clone()
    };
    assert!(matches!(
        inverted_bets.validate(),
        Err(ConfigError::BetLimits { .. })
    ));

    let zero_tick = GameConfig {
        game_loop_interval_ms: 0,
        ..valid.clone()
    };
    assert_eq!(
        zero_tick.validate(),
        Err(ConfigError::ZeroDuration("game_loop_interval_ms"))
    );

    let initial_outside = GameConfig {
        difficulty_initial: 2.0,
        ..valid.clone()
    };
    assert!(matches!(
        initial_outside.validate(),
        Err(ConfigError::DifficultyBounds { .. })
    ));

    let bad_chance = GameConfig {
        safe_zone_chance: 1.5,
        ..valid.clone()
    };
    assert_eq!(bad_chance.validate(), Err(ConfigError::SafeZoneChance(1.5)));

    let nan_drain = GameConfig {
        drain_exponent: f64::NAN,
        ..valid
    };
    assert!(matches!(
        nan_drain.validate(),
        Err(ConfigError::DrainExponent(_))
    ));
}

#[test]
fn test_config_partial_yaml_uses_defaults() {
    let config: GameConfig = serde_yaml::from_str("min_bet: 5.0\ncountdown_seconds: 3\n").unwrap();
    assert_eq!(config.min_bet, 5.0);
    assert_eq!(config.countdown_seconds, 3);
    assert_eq!(config.max_bet, MAX_BET);
    assert_eq!(config.drain_exponent, DRAIN_EXPONENT);
}

#[test]
fn test_phase_cycle() {
    let mut phase = RoundPhase::Betting;
    let mut seen = Vec::new();
    for _ in 0..4 {
        seen.push(phase);
        phase = phase.next();
    }
    assert_eq!(phase, RoundPhase::Betting);
    assert_eq!(
        seen,
        vec![
            RoundPhase::Betting,
            RoundPhase::Countdown,
            RoundPhase::InProgress,
            RoundPhase::Crashed
        ]
    );
    assert!(RoundPhase::Countdown.stake_at_risk());
    assert!(!RoundPhase::Crashed.stake_at_risk());
}

#[test]
fn test_phase_try_from() {
    for phase in [
        RoundPhase::Betting,
        RoundPhase::Countdown,
        RoundPhase::InProgress,
        RoundPhase::Crashed,
    ] {
        assert_eq!(RoundPhase::try_from(phase as u8), Ok(phase));
    }
    assert!(RoundPhase::try_from(4).is_err());
}

#[test]
fn test_challenge_levels() {
    assert_eq!(ChallengeLevel::from_difficulty(0.7), ChallengeLevel::Low);
    assert_eq!(ChallengeLevel::from_difficulty(0.9), ChallengeLevel::Normal);
    assert_eq!(ChallengeLevel::from_difficulty(1.0), ChallengeLevel::Normal);
    assert_eq!(ChallengeLevel::from_difficulty(1.1), ChallengeLevel::High);
    assert_eq!(ChallengeLevel::from_difficulty(1.5), ChallengeLevel::Intense);
}

#[test]
fn test_history_entry_profit() {
    let win = HistoryEntry::settle(1, 10.0, Some(1.8), 2.4);
    assert!(win.won());
    assert!((win.profit - 8.0).abs() < 1e-9);
    assert!((win.payout() - 18.0).abs() < 1e-9);

    let loss = HistoryEntry::settle(2, 10.0, None, 1.0);
    assert!(!loss.won());
    assert_eq!(loss.profit, -10.0);
    assert_eq!(loss.payout(), 0.0);
}

#[test]
fn test_history_entry_json_is_camel_case() {
    let entry = HistoryEntry::settle(7, 25.0, None, 1.37);
    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["betAmount"], 25.0);
    assert!(json["cashedOutAt"].is_null());
    assert_eq!(json["crashMultiplier"], 1.37);

    let decoded: HistoryEntry = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, entry);
}

#[test]
fn test_simple_history_low_marker() {
    assert!(SimpleHistoryItem { id: 1, multiplier: 1.99 }.is_low());
    assert!(!SimpleHistoryItem { id: 2, multiplier: 2.0 }.is_low());
}

#[test]
fn test_event_tagging() {
    let event = EngineEvent::Crashed {
        crash_multiplier: 3.2,
    };
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["kind"], "Crashed");
    assert_eq!(event.name(), "crashed");
    assert!(!event.is_continuous());
    assert!(EngineEvent::DrainLevel { percentage: 0.1 }.is_continuous());
}

proptest! {
    #[test]
    fn prop_profit_matches_cash_out(
        bet in 1.0f64..1_000.0,
        cashed in proptest::option::of(1.0f64..100.0),
        crash in 1.0f64..100.0,
    ) {
        let entry = HistoryEntry::settle(0, bet, cashed, crash);
        let expected = match cashed {
            Some(multiplier) => bet * (multiplier - 1.0),
            None => -bet,
        };
        prop_assert!((entry.profit - expected).abs() < 1e-9 * bet.max(1.0) * 100.0);
    }
}
