// tests/engine_tests.rs
//
// End-to-end tests through the public API:
// - learning from a reported round lands in the right table entry
// - a saved table is picked up by a fresh engine
// - a corrupt table file degrades to a fresh table
// - many matches share one agent that initializes exactly once

use std::sync::Arc;
use std::thread;

use duelist::algorithms::rl::{
    Action, HeuristicPolicy, StateEncoder, StateKey, TableSource, ACTION_COUNT,
};
use duelist::{CombatClass, Combatant, DecisionEngine, DecisionError, EngineConfig, Strategy};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn wizard(health: i32, armor: i32) -> Combatant {
    Combatant::new(CombatClass::Wizard, health, armor, 0.6, 0.3, 0.9)
}

fn knight(health: i32, armor: i32) -> Combatant {
    Combatant::new(CombatClass::Knight, health, armor, 0.9, 0.6, 0.3)
}

fn learning_config() -> EngineConfig {
    EngineConfig {
        strategy: Strategy::Reinforcement,
        training: true,
        explore_rate: 0.0,
        ..EngineConfig::default()
    }
}

#[test]
fn test_reported_round_updates_prior_state() {
    let engine = DecisionEngine::new(&learning_config()).unwrap();

    let before = (wizard(40, 3), knight(80, 10));
    let after = (wizard(40, 7), knight(30, 10));
    let prior = StateEncoder::encode(&before.0, &before.1).unwrap();
    let next = StateEncoder::encode(&after.0, &after.1).unwrap();
    assert_eq!(prior.raw(), 676);
    assert_eq!(next.raw(), 421);

    let action = engine.decide(&before.0, &before.1).unwrap();
    // Zero table, no exploration: first action wins the tie.
    assert_eq!(action, Action::Heavy);

    let reward = engine
        .observe((&before.0, &before.1), action, (&after.0, &after.1))
        .unwrap();
    assert_eq!(reward, Some(2.5));

    // 0 + 0.05 * (2.5 + 0.3 * 0 - 0)
    let values = engine.agent().q_values(prior);
    assert!((values[Action::Heavy.index()] - 0.125).abs() < 1e-12);
    for v in &values[1..] {
        assert_eq!(*v, 0.0);
    }
    assert_eq!(engine.agent().q_values(next), [0.0; ACTION_COUNT]);
}

#[test]
fn test_saved_table_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("q_table.json");
    let config = EngineConfig {
        table_path: Some(path.clone()),
        ..learning_config()
    };

    let before = (wizard(40, 3), knight(80, 10));
    let after = (wizard(40, 7), knight(30, 10));
    let prior = StateEncoder::encode(&before.0, &before.1).unwrap();

    let first = DecisionEngine::new(&config).unwrap();
    let action = first.decide(&before.0, &before.1).unwrap();
    first
        .observe((&before.0, &before.1), action, (&after.0, &after.1))
        .unwrap();
    // The first decision never saves.
    assert!(!path.exists());
    first.agent().persist().unwrap();
    assert!(path.exists());

    let second = DecisionEngine::new(&config).unwrap();
    assert_eq!(
        second.agent().initialize(),
        &TableSource::Loaded(path.clone())
    );
    assert_eq!(
        second.agent().q_values(prior),
        first.agent().q_values(prior)
    );
    // The learned entry now beats the untouched ones.
    let replay = second.decide(&before.0, &before.1).unwrap();
    assert_eq!(replay, action);
}

#[test]
fn test_corrupt_table_falls_back_to_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("q_table.json");
    std::fs::write(&path, "{ not json").unwrap();

    let engine = DecisionEngine::new(&EngineConfig {
        table_path: Some(path),
        ..learning_config()
    })
    .unwrap();

    let (own, opp) = (wizard(90, 15), knight(90, 15));
    assert!(engine.decide(&own, &opp).is_ok());
    assert!(matches!(
        engine.agent().table_source(),
        Some(TableSource::Recovered { .. })
    ));
    for key in StateKey::all().take(10) {
        assert_eq!(engine.agent().q_values(key), [0.0; ACTION_COUNT]);
    }
}

#[test]
fn test_concurrent_matches_share_one_agent() {
    let engine = Arc::new(
        DecisionEngine::new(&EngineConfig {
            explore_rate: 1.0,
            ..learning_config()
        })
        .unwrap(),
    );

    let handles: Vec<_> = (0..8u64)
        .map(|seed| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let mut rng = StdRng::seed_from_u64(seed);
                let (own, opp) = (wizard(60, 12), knight(70, 4));
                for _ in 0..50 {
                    let action = engine.decide_with(&own, &opp, &mut rng).unwrap();
                    engine.observe((&own, &opp), action, (&own, &opp)).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let stats = engine.agent().stats();
    assert_eq!(stats.initializations, 1);
    assert_eq!(stats.decisions, 400);
    assert_eq!(stats.updates, 400);
    assert!(stats.explore_rate < 1.0);
    assert!(stats.explore_rate >= 0.0);
}

#[test]
fn test_heuristic_weights_form_a_distribution() {
    for own_class in CombatClass::all() {
        for opp_class in CombatClass::all() {
            let own = Combatant::new(own_class, 70, 8, 0.55, 0.45, 0.35);
            let opp = Combatant::new(opp_class, 50, 14, 0.25, 0.65, 0.75);
            let weights = HeuristicPolicy::distribution(&own, &opp);
            let sum: f64 = weights.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9, "weights {weights:?}");
            assert!(weights.iter().all(|w| (0.0..=1.0).contains(w)));
        }
    }
}

#[test]
fn test_unknown_class_fails_reinforcement_decision() {
    let mut own = wizard(50, 5);
    own.class_name = "Paladin".to_string();
    let opp = knight(50, 5);
    let engine = DecisionEngine::new(&learning_config()).unwrap();

    let err = engine.decide(&own, &opp).unwrap_err();
    assert!(matches!(err, DecisionError::UnknownClass(ref name) if name == "Paladin"));
    // The failed request must not poison later ones.
    assert!(engine.decide(&wizard(50, 5), &opp).is_ok());
}
