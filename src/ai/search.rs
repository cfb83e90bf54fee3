//! Bounded greedy search and the background engine.
//!
//! The synchronous entry point is [`greedy_search`]: expand a tree of
//! candidate moves to a fixed depth with a per-node branching cap, score
//! leaves with an [`Evaluator`], and back scores up negamax-style. The
//! [`Engine`] wraps the same search in a single worker thread with a
//! cooperative cancellation token; results become readable only after
//! `stop` has joined the worker.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use tracing::{debug, error, info};

use crate::ai::candidates::{MoveClassifier, ThreatClassifier};
use crate::ai::evaluation::{Evaluator, MaterialEvaluator};
use crate::ai::score::Score;
use crate::ai::tree::{NodeId, SearchNode, SearchTree};
use crate::config::EngineConfig;
use crate::engine::board::Position;
use crate::engine::movegen;
use crate::engine::types::{EngineError, Move};

// =========================================================================
// Limits & outcome
// =========================================================================

/// Budget for one search invocation.
#[derive(Clone, Copy, Debug)]
pub struct SearchLimits {
    /// Maximum expansion depth in plies.
    pub depth: u32,
    /// Children expanded per node, taken in candidate order.
    pub branch_limit: usize,
    /// Hard cap on expanded nodes.
    pub max_nodes: u64,
    /// Wall-clock budget; `None` means no deadline.
    pub time_budget: Option<Duration>,
}

impl Default for SearchLimits {
    fn default() -> Self {
        SearchLimits {
            depth: 4,
            branch_limit: 8,
            max_nodes: 100_000,
            time_budget: Some(Duration::from_millis(2_000)),
        }
    }
}

impl From<&EngineConfig> for SearchLimits {
    fn from(cfg: &EngineConfig) -> Self {
        SearchLimits {
            depth: cfg.depth,
            branch_limit: cfg.branch_limit,
            max_nodes: cfg.max_nodes,
            time_budget: Some(Duration::from_millis(cfg.time_ms)),
        }
    }
}

/// Result of a finished search. `tree` is `None` after the caller asked for
/// it to be released on stop.
#[derive(Default)]
pub struct SearchOutcome {
    pub best_move: Option<Move>,
    pub score: Score,
    pub nodes: u64,
    pub tree: Option<SearchTree>,
}

// =========================================================================
// Greedy bounded search
// =========================================================================

/// Synchronous bounded search from `pos`. Honors the node, depth, and time
/// budgets in `limits`; additionally checks `cancel` at every expansion
/// boundary when supplied.
pub fn greedy_search(
    pos: &Position,
    limits: &SearchLimits,
    classifier: &dyn MoveClassifier,
    evaluator: &dyn Evaluator,
    cancel: Option<&AtomicBool>,
) -> SearchOutcome {
    info!(
        depth = limits.depth,
        branch = limits.branch_limit,
        "search started"
    );

    let mut searcher = Searcher {
        tree: SearchTree::new(pos.clone()),
        nodes: 0,
        limits,
        deadline: limits.time_budget.map(|b| Instant::now() + b),
        cancel,
        classifier,
        evaluator,
        halted: false,
        rng: rand::thread_rng(),
    };
    // Depth 0 would leaf out at the root and name no move; one ply is the
    // floor.
    let score = searcher.expand(SearchTree::ROOT, limits.depth.max(1));

    let best_move = searcher
        .tree
        .root()
        .best_child
        .and_then(|c| searcher.tree.get(c).mv);
    info!(
        nodes = searcher.nodes,
        score = %score,
        best = %best_move.map(|m| m.to_coordinate()).unwrap_or_default(),
        "search finished"
    );

    SearchOutcome {
        best_move,
        score,
        nodes: searcher.nodes,
        tree: Some(searcher.tree),
    }
}

struct Searcher<'a> {
    tree: SearchTree,
    nodes: u64,
    limits: &'a SearchLimits,
    deadline: Option<Instant>,
    cancel: Option<&'a AtomicBool>,
    classifier: &'a dyn MoveClassifier,
    evaluator: &'a dyn Evaluator,
    halted: bool,
    rng: rand::rngs::ThreadRng,
}

impl Searcher<'_> {
    /// Latches once any budget runs out; checked before every expansion.
    fn should_halt(&mut self) -> bool {
        if self.halted {
            return true;
        }
        if self.nodes >= self.limits.max_nodes {
            self.halted = true;
        } else if self.cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
            debug!(nodes = self.nodes, "search cancelled");
            self.halted = true;
        } else if self.deadline.is_some_and(|d| Instant::now() >= d) {
            debug!(nodes = self.nodes, "search deadline reached");
            self.halted = true;
        }
        self.halted
    }

    /// Expand one node and back up its score (side-to-move perspective).
    fn expand(&mut self, id: NodeId, depth: u32) -> Score {
        self.nodes += 1;
        self.tree.get_mut(id).visits += 1;
        let pos = self.tree.get(id).position.clone();

        let cands = self.classifier.classify(&pos);
        if cands.is_empty() {
            let score = if movegen::is_in_check(&pos, pos.turn()) {
                Score::mated_in(0)
            } else {
                Score::DRAW
            };
            self.tree.get_mut(id).score = score;
            return score;
        }
        // The root never leafs out on a halt: a cancelled search must still
        // name some legal move, so the child loop below always runs there
        // and expands at least one child before the halt takes effect.
        if depth == 0 || (id != SearchTree::ROOT && self.should_halt()) {
            let score = self.evaluator.evaluate(&pos);
            self.tree.get_mut(id).score = score;
            return score;
        }

        let picked: Vec<Move> = cands
            .ordered()
            .copied()
            .take(self.limits.branch_limit)
            .collect();
        self.tree.get_mut(id).cands = cands;

        let mut best = Score::MIN;
        let mut best_children: Vec<NodeId> = Vec::new();
        for mv in picked {
            if self.should_halt() && !best_children.is_empty() {
                break;
            }
            let child_pos = pos.successor(mv);
            let child = self.tree.add_child(id, mv, child_pos);
            let backed = (-self.expand(child, depth - 1)).backed_up();
            if backed > best {
                best = backed;
                best_children.clear();
                best_children.push(child);
            } else if backed == best {
                best_children.push(child);
            }
        }

        // Random tie-break keeps repeated searches from always playing the
        // first generated move.
        let chosen = best_children.choose(&mut self.rng).copied();
        self.tree.refresh_most_visited(id);
        let node = self.tree.get_mut(id);
        node.best_child = chosen;
        node.score = best;
        best
    }
}

// =========================================================================
// Background engine
// =========================================================================

/// Lifecycle of a background search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Running,
    Stopped,
}

impl EngineState {
    pub fn as_str(self) -> &'static str {
        match self {
            EngineState::Idle => "idle",
            EngineState::Running => "running",
            EngineState::Stopped => "stopped",
        }
    }
}

/// Background search controller: at most one worker thread, cooperative
/// cancellation, results gated behind the stopped state.
pub struct Engine {
    state: EngineState,
    cancel: Arc<AtomicBool>,
    worker: Option<JoinHandle<SearchOutcome>>,
    outcome: Option<SearchOutcome>,
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Engine {
            state: EngineState::Idle,
            cancel: Arc::new(AtomicBool::new(false)),
            worker: None,
            outcome: None,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Start a background search for the given position string. Fails when
    /// a search is already running or the position does not parse.
    pub fn start(&mut self, fen: &str, limits: SearchLimits) -> Result<(), EngineError> {
        if self.state == EngineState::Running {
            return Err(EngineError::AlreadyRunning);
        }
        let pos = Position::from_fen(fen)?;

        self.cancel.store(false, Ordering::Relaxed);
        self.outcome = None;
        let cancel = Arc::clone(&self.cancel);
        self.worker = Some(thread::spawn(move || {
            greedy_search(
                &pos,
                &limits,
                &ThreatClassifier,
                &MaterialEvaluator,
                Some(cancel.as_ref()),
            )
        }));
        self.state = EngineState::Running;
        info!(fen, "background search started");
        Ok(())
    }

    /// Signal cancellation, join the worker, and latch the outcome.
    /// Idempotent once stopped; an error when nothing was ever started.
    pub fn stop(&mut self, release_tree: bool) -> Result<(), EngineError> {
        match self.state {
            EngineState::Idle => Err(EngineError::NotStopped("idle")),
            EngineState::Stopped => {
                if release_tree {
                    if let Some(outcome) = self.outcome.as_mut() {
                        outcome.tree = None;
                    }
                }
                Ok(())
            }
            EngineState::Running => {
                self.cancel.store(true, Ordering::Relaxed);
                let mut outcome = match self.worker.take() {
                    Some(handle) => match handle.join() {
                        Ok(outcome) => outcome,
                        Err(_) => {
                            error!("search worker panicked");
                            SearchOutcome::default()
                        }
                    },
                    None => SearchOutcome::default(),
                };
                if release_tree {
                    outcome.tree = None;
                }
                info!(nodes = outcome.nodes, "background search stopped");
                self.outcome = Some(outcome);
                self.state = EngineState::Stopped;
                Ok(())
            }
        }
    }

    fn results(&self) -> Result<&SearchOutcome, EngineError> {
        match (&self.state, &self.outcome) {
            (EngineState::Stopped, Some(outcome)) => Ok(outcome),
            _ => Err(EngineError::NotStopped(self.state.as_str())),
        }
    }

    /// Best move found, `None` when the searched position had no legal
    /// moves. Only available once stopped.
    pub fn best_move(&self) -> Result<Option<Move>, EngineError> {
        Ok(self.results()?.best_move)
    }

    pub fn node_count(&self) -> Result<u64, EngineError> {
        Ok(self.results()?.nodes)
    }

    pub fn score(&self) -> Result<Score, EngineError> {
        Ok(self.results()?.score)
    }

    /// Root of the retained search tree; `None` if the tree was released.
    pub fn root(&self) -> Result<Option<&SearchNode>, EngineError> {
        Ok(self.results()?.tree.as_ref().map(SearchTree::root))
    }

    /// The best move, re-validated against the position it is about to be
    /// played in. A move that no longer matches any legal move is stale.
    pub fn validated_best_move(&self, pos: &Position) -> Result<Option<Move>, EngineError> {
        let Some(best) = self.results()?.best_move else {
            return Ok(None);
        };
        let legal = movegen::legal_moves(pos);
        if legal.iter().any(|m| m.same_move(best)) {
            Ok(Some(best))
        } else {
            Err(EngineError::StaleBestMove(best.to_coordinate()))
        }
    }
}

impl Drop for Engine {
    /// A still-running worker is cancelled and joined so it never outlives
    /// the controller.
    fn drop(&mut self) {
        if self.state == EngineState::Running {
            let _ = self.stop(true);
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::board::START_FEN;
    use crate::engine::types::Square;

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    fn search(p: &Position, depth: u32) -> SearchOutcome {
        let limits = SearchLimits {
            depth,
            branch_limit: 8,
            max_nodes: 200_000,
            time_budget: None,
        };
        greedy_search(p, &limits, &ThreatClassifier, &MaterialEvaluator, None)
    }

    #[test]
    fn returns_a_legal_move_from_the_start() {
        let p = Position::start();
        let outcome = search(&p, 2);
        let best = outcome.best_move.expect("start position has moves");
        assert!(movegen::legal_moves(&p).iter().any(|m| m.same_move(best)));
        assert!(outcome.nodes > 1);
    }

    #[test]
    fn finds_mate_in_one() {
        // Ra8 mates the cornered king.
        let p = pos("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1");
        let outcome = search(&p, 2);
        let best = outcome.best_move.unwrap();
        assert_eq!(best.to, Square::from_algebraic("a8").unwrap());
        assert_eq!(outcome.score, Score::mate_in(1));
    }

    #[test]
    fn prefers_winning_a_queen() {
        // Pawn takes the undefended queen.
        let p = pos("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1");
        let outcome = search(&p, 2);
        let best = outcome.best_move.unwrap();
        assert_eq!(best.to, Square::from_algebraic("d5").unwrap());
    }

    #[test]
    fn mated_position_reports_no_move() {
        let p = pos("4R1k1/5ppp/8/8/8/8/8/6K1 b - - 0 1");
        let outcome = search(&p, 2);
        assert!(outcome.best_move.is_none());
        assert_eq!(outcome.score, Score::mated_in(0));
    }

    #[test]
    fn stalemate_scores_as_draw() {
        let p = pos("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        let outcome = search(&p, 3);
        assert!(outcome.best_move.is_none());
        assert_eq!(outcome.score, Score::DRAW);
    }

    #[test]
    fn node_budget_is_respected() {
        let limits = SearchLimits {
            depth: 12,
            branch_limit: 8,
            max_nodes: 500,
            time_budget: None,
        };
        let outcome = greedy_search(
            &Position::start(),
            &limits,
            &ThreatClassifier,
            &MaterialEvaluator,
            None,
        );
        // One in-flight expansion may overshoot by a node per tree level.
        assert!(outcome.nodes <= 500 + u64::from(limits.depth));
    }

    #[test]
    fn preset_cancel_token_stops_immediately() {
        let cancel = AtomicBool::new(true);
        let limits = SearchLimits {
            depth: 12,
            branch_limit: 8,
            max_nodes: u64::MAX,
            time_budget: None,
        };
        let outcome = greedy_search(
            &Position::start(),
            &limits,
            &ThreatClassifier,
            &MaterialEvaluator,
            Some(&cancel),
        );
        // Only the first level gets expanded before the halt latches.
        assert!(outcome.nodes < 100, "cancelled search expanded {} nodes", outcome.nodes);
    }

    #[test]
    fn cancelled_search_still_names_a_legal_move() {
        // Cancellation before any expansion must not masquerade as the
        // no-legal-move signal.
        let p = Position::start();
        let cancel = AtomicBool::new(true);
        let limits = SearchLimits {
            depth: 6,
            branch_limit: 8,
            max_nodes: u64::MAX,
            time_budget: None,
        };
        let outcome = greedy_search(
            &p,
            &limits,
            &ThreatClassifier,
            &MaterialEvaluator,
            Some(&cancel),
        );
        let best = outcome.best_move.expect("cancelled search named no move");
        assert!(movegen::legal_moves(&p).iter().any(|m| m.same_move(best)));

        // A genuinely moveless position still reports none.
        let mated = pos("4R1k1/5ppp/8/8/8/8/8/6K1 b - - 0 1");
        let outcome = greedy_search(
            &mated,
            &limits,
            &ThreatClassifier,
            &MaterialEvaluator,
            Some(&cancel),
        );
        assert!(outcome.best_move.is_none());
    }

    #[test]
    fn backed_up_mate_is_preferred_over_material() {
        // White can either grab the rook or mate; mate must win.
        let p = pos("6k1/5ppp/8/8/8/8/r7/R3Q1K1 w - - 0 1");
        let outcome = search(&p, 2);
        assert!(outcome.score.is_mate(), "expected mate, got {}", outcome.score);
    }

    #[test]
    fn engine_lifecycle_gates_accessors() {
        let mut engine = Engine::new();
        assert_eq!(engine.state(), EngineState::Idle);
        assert!(matches!(
            engine.best_move(),
            Err(EngineError::NotStopped("idle"))
        ));
        assert!(matches!(
            engine.stop(false),
            Err(EngineError::NotStopped("idle"))
        ));

        engine.start(START_FEN, SearchLimits::default()).unwrap();
        assert_eq!(engine.state(), EngineState::Running);
        assert!(matches!(
            engine.node_count(),
            Err(EngineError::NotStopped("running"))
        ));

        engine.stop(false).unwrap();
        assert_eq!(engine.state(), EngineState::Stopped);
        let best = engine.best_move().unwrap().unwrap();
        let legal = movegen::legal_moves(&Position::start());
        assert!(legal.iter().any(|m| m.same_move(best)));
        assert!(engine.node_count().unwrap() >= 1);
        assert!(engine.root().unwrap().is_some());

        // stop is idempotent once stopped and can release the tree late.
        engine.stop(true).unwrap();
        assert!(engine.root().unwrap().is_none());
    }

    #[test]
    fn double_start_is_rejected() {
        let mut engine = Engine::new();
        engine.start(START_FEN, SearchLimits::default()).unwrap();
        assert!(matches!(
            engine.start(START_FEN, SearchLimits::default()),
            Err(EngineError::AlreadyRunning)
        ));
        engine.stop(true).unwrap();
    }

    #[test]
    fn bad_fen_leaves_the_engine_idle() {
        let mut engine = Engine::new();
        assert!(matches!(
            engine.start("not a position", SearchLimits::default()),
            Err(EngineError::InvalidFen(_))
        ));
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[test]
    fn stale_best_move_is_detected() {
        let mut engine = Engine::new();
        engine.start(START_FEN, SearchLimits::default()).unwrap();
        engine.stop(false).unwrap();

        // Validating against the position it searched succeeds.
        assert!(engine.validated_best_move(&Position::start()).is_ok());

        // Against an unrelated position the stored move is stale.
        let other = pos("4R1k1/5ppp/8/8/8/8/8/6K1 b - - 0 1");
        assert!(matches!(
            engine.validated_best_move(&other),
            Err(EngineError::StaleBestMove(_))
        ));
    }

    #[test]
    fn time_budget_returns_promptly() {
        let mut engine = Engine::new();
        let limits = SearchLimits {
            depth: 20,
            branch_limit: 8,
            max_nodes: u64::MAX,
            time_budget: Some(Duration::from_millis(150)),
        };
        let started = Instant::now();
        engine.start(START_FEN, limits).unwrap();
        thread::sleep(Duration::from_millis(200));
        engine.stop(false).unwrap();
        assert!(
            started.elapsed() < Duration::from_secs(3),
            "stop did not return within the budget plus overhead"
        );
        assert!(engine.best_move().unwrap().is_some());
    }
}
