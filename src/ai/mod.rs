pub mod candidates;
pub mod evaluation;
pub mod score;
pub mod search;
pub mod tree;

pub use candidates::{CandSet, MoveClassifier, ThreatClassifier};
pub use evaluation::{Evaluator, MaterialEvaluator};
pub use score::Score;
pub use search::{Engine, EngineState, SearchLimits, SearchOutcome, greedy_search};
pub use tree::{NodeId, SearchNode, SearchTree};
