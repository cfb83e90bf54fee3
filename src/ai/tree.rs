//! Arena-allocated search tree.
//!
//! Nodes live in a flat `Vec` and refer to each other by [`NodeId`]
//! indices, so the tree is cheap to grow, trivially `Send`, and freed in
//! one drop. The search keeps the tree around after it finishes so callers
//! can inspect the principal line.

use crate::ai::candidates::CandSet;
use crate::ai::score::Score;
use crate::engine::board::Position;
use crate::engine::types::Move;

/// Index of a node inside its [`SearchTree`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

/// One expanded position in the search tree.
#[derive(Clone, Debug)]
pub struct SearchNode {
    /// Position after `mv` was played from the parent.
    pub position: Position,
    /// Move that led here; `None` only at the root.
    pub mv: Option<Move>,
    /// Triage of this position's legal moves, filled on expansion.
    pub cands: CandSet,
    /// Backed-up score from this node's side-to-move perspective.
    pub score: Score,
    pub children: Vec<NodeId>,
    /// Child carrying the best backed-up score.
    pub best_child: Option<NodeId>,
    /// Child with the highest visit count.
    pub most_visited: Option<NodeId>,
    pub parent: Option<NodeId>,
    /// Expansion passes that went through this node.
    pub visits: u32,
}

impl SearchNode {
    fn new(position: Position, mv: Option<Move>, parent: Option<NodeId>) -> Self {
        SearchNode {
            position,
            mv,
            cands: CandSet::default(),
            score: Score::DRAW,
            children: Vec::new(),
            best_child: None,
            most_visited: None,
            parent,
            visits: 0,
        }
    }
}

/// Flat arena holding a whole search tree; index 0 is the root.
pub struct SearchTree {
    nodes: Vec<SearchNode>,
}

impl SearchTree {
    pub fn new(root: Position) -> Self {
        SearchTree {
            nodes: vec![SearchNode::new(root, None, None)],
        }
    }

    pub const ROOT: NodeId = NodeId(0);

    pub fn root(&self) -> &SearchNode {
        &self.nodes[0]
    }

    pub fn get(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut SearchNode {
        &mut self.nodes[id.0 as usize]
    }

    /// Append a child reached by playing `mv` from `parent`.
    pub fn add_child(&mut self, parent: NodeId, mv: Move, position: Position) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(SearchNode::new(position, Some(mv), Some(parent)));
        self.nodes[parent.0 as usize].children.push(id);
        id
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Recompute the most-visited child marker after an expansion pass.
    pub fn refresh_most_visited(&mut self, id: NodeId) {
        let most = self
            .get(id)
            .children
            .iter()
            .copied()
            .max_by_key(|&c| self.get(c).visits);
        self.get_mut(id).most_visited = most;
    }

    /// Principal line from the root, following `best_child` links.
    pub fn principal_line(&self) -> Vec<Move> {
        let mut line = Vec::new();
        let mut cursor = SearchTree::ROOT;
        while let Some(next) = self.get(cursor).best_child {
            if let Some(mv) = self.get(next).mv {
                line.push(mv);
            }
            cursor = next;
        }
        line
    }
}
