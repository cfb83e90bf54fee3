//! Background engine lifecycle suite.
//!
//! Exercises the idle → running → stopped state machine end to end: result
//! gating, cancellation, budgets, and best-move validity against the
//! searched position.

use std::time::{Duration, Instant};

use sable::ai::{Engine, EngineState, MaterialEvaluator, SearchLimits, ThreatClassifier};
use sable::ai::greedy_search;
use sable::engine::board::{Position, START_FEN};
use sable::engine::movegen::legal_moves;
use sable::engine::types::EngineError;

fn quick_limits() -> SearchLimits {
    SearchLimits {
        depth: 3,
        branch_limit: 6,
        max_nodes: 20_000,
        time_budget: Some(Duration::from_millis(500)),
    }
}

#[test]
fn results_are_gated_until_stopped() {
    let mut engine = Engine::new();
    assert_eq!(engine.state(), EngineState::Idle);
    assert!(matches!(
        engine.best_move(),
        Err(EngineError::NotStopped("idle"))
    ));

    engine.start(START_FEN, quick_limits()).unwrap();
    assert_eq!(engine.state(), EngineState::Running);
    assert!(matches!(
        engine.score(),
        Err(EngineError::NotStopped("running"))
    ));

    engine.stop(false).unwrap();
    assert_eq!(engine.state(), EngineState::Stopped);
    assert!(engine.best_move().is_ok());
    assert!(engine.node_count().unwrap() >= 1);
    assert!(engine.root().unwrap().is_some());
}

#[test]
fn best_move_is_legal_in_the_searched_position() {
    let mut engine = Engine::new();
    engine.start(START_FEN, quick_limits()).unwrap();
    engine.stop(false).unwrap();

    let best = engine.best_move().unwrap().expect("start position has moves");
    let legal = legal_moves(&Position::start());
    assert!(legal.iter().any(|m| m.same_move(best)));
    assert!(engine.validated_best_move(&Position::start()).is_ok());
}

#[test]
fn position_without_moves_signals_none() {
    // Black is already mated; the search must say so rather than invent a move.
    let mut engine = Engine::new();
    engine
        .start("4R1k1/5ppp/8/8/8/8/8/6K1 b - - 0 1", quick_limits())
        .unwrap();
    engine.stop(false).unwrap();
    assert!(engine.best_move().unwrap().is_none());
}

#[test]
fn double_start_is_rejected_then_restartable() {
    let mut engine = Engine::new();
    engine.start(START_FEN, quick_limits()).unwrap();
    assert!(matches!(
        engine.start(START_FEN, quick_limits()),
        Err(EngineError::AlreadyRunning)
    ));

    engine.stop(true).unwrap();
    assert!(engine.root().unwrap().is_none());

    // A stopped engine accepts a new search.
    engine
        .start("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1", quick_limits())
        .unwrap();
    engine.stop(false).unwrap();
    assert!(engine.best_move().unwrap().is_some());
}

#[test]
fn invalid_fen_is_rejected_without_state_change() {
    let mut engine = Engine::new();
    assert!(matches!(
        engine.start("totally/not/a/position", quick_limits()),
        Err(EngineError::InvalidFen(_))
    ));
    assert_eq!(engine.state(), EngineState::Idle);
}

#[test]
fn stale_best_move_is_surfaced() {
    let mut engine = Engine::new();
    engine.start(START_FEN, quick_limits()).unwrap();
    engine.stop(false).unwrap();

    // The position moved on; the stored best move no longer applies.
    let other = Position::from_fen("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1").unwrap();
    assert!(matches!(
        engine.validated_best_move(&other),
        Err(EngineError::StaleBestMove(_))
    ));
}

#[test]
fn time_budget_bounds_the_search() {
    let mut engine = Engine::new();
    let limits = SearchLimits {
        depth: 30,
        branch_limit: 12,
        max_nodes: u64::MAX,
        time_budget: Some(Duration::from_millis(200)),
    };

    let started = Instant::now();
    engine.start(START_FEN, limits).unwrap();
    std::thread::sleep(Duration::from_millis(250));
    engine.stop(false).unwrap();

    assert!(
        started.elapsed() < Duration::from_secs(3),
        "stop took {:?}, worker ignored its deadline",
        started.elapsed()
    );
    let best = engine.best_move().unwrap().expect("start position has moves");
    assert!(legal_moves(&Position::start()).iter().any(|m| m.same_move(best)));
}

#[test]
fn stop_cancels_a_long_search() {
    let mut engine = Engine::new();
    let limits = SearchLimits {
        depth: 40,
        branch_limit: 16,
        max_nodes: u64::MAX,
        time_budget: None,
    };

    engine.start(START_FEN, limits).unwrap();
    std::thread::sleep(Duration::from_millis(50));

    let stop_started = Instant::now();
    engine.stop(false).unwrap();
    assert!(
        stop_started.elapsed() < Duration::from_secs(3),
        "cancellation did not take effect promptly"
    );
}

#[test]
fn synchronous_search_respects_the_node_budget() {
    let limits = SearchLimits {
        depth: 10,
        branch_limit: 8,
        max_nodes: 1_000,
        time_budget: None,
    };
    let outcome = greedy_search(
        &Position::start(),
        &limits,
        &ThreatClassifier,
        &MaterialEvaluator,
        None,
    );
    assert!(
        outcome.nodes <= 1_000 + u64::from(limits.depth),
        "expanded {} nodes against a budget of 1000",
        outcome.nodes
    );
    assert!(outcome.best_move.is_some());
}
