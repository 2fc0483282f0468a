//! Challenge policy layered on top of the growth controller.
//!
//! Challenges are predicates over [`SessionStats`], drawn at random per tree
//! stage. They are deliberately outside the session's own contract: the
//! session never consults them, and the cycle-back from the AVL stage to a
//! fresh B-tree happens only when the hosting layer reacts to a cleared
//! board by calling `Session::restart`.

use rand::seq::SliceRandom;

use crate::session::SessionStats;
use crate::trees::TreeKind;

/// A single challenge: a human-readable goal and its completion predicate.
#[derive(Clone, Copy)]
pub struct TreeChallenge {
    pub description: &'static str,
    pub condition: fn(&SessionStats) -> bool,
}

const BTREE_POOL: [TreeChallenge; 3] = [
    TreeChallenge {
        description: "Reach 4 nodes",
        condition: |s: &SessionStats| s.node_count >= 4,
    },
    TreeChallenge {
        description: "Insert 10 keys",
        condition: |s: &SessionStats| s.total_inserted >= 10,
    },
    TreeChallenge {
        description: "Reach a depth of 3",
        condition: |s: &SessionStats| s.depth >= 3,
    },
];

const BST_POOL: [TreeChallenge; 3] = [
    TreeChallenge {
        description: "Reach 5 nodes",
        condition: |s: &SessionStats| s.node_count >= 5,
    },
    TreeChallenge {
        description: "Insert 8 keys",
        condition: |s: &SessionStats| s.total_inserted >= 8,
    },
    TreeChallenge {
        description: "Grow 3 nodes with children",
        condition: |s: &SessionStats| s.branch_count >= 3,
    },
];

const AVL_POOL: [TreeChallenge; 3] = [
    TreeChallenge {
        description: "Rotate the tree 3 times",
        condition: |s: &SessionStats| s.rotations >= 3,
    },
    TreeChallenge {
        description: "Reach a depth of 4",
        condition: |s: &SessionStats| s.depth >= 4,
    },
    TreeChallenge {
        description: "Reach 6 nodes",
        condition: |s: &SessionStats| s.node_count >= 6,
    },
];

/// Draws the challenge set for a tree stage in random order.
pub fn challenges_for(kind: TreeKind) -> Vec<TreeChallenge> {
    let pool: &[TreeChallenge] = match kind {
        TreeKind::BTree => &BTREE_POOL,
        TreeKind::Bst => &BST_POOL,
        TreeKind::Avl => &AVL_POOL,
    };
    let mut drawn = pool.to_vec();
    drawn.shuffle(&mut rand::thread_rng());
    drawn.truncate(3);
    drawn
}

/// Raised by [`ChallengeBoard::check`] when the active challenge completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeEvent {
    /// The active challenge completed; another one is now active.
    Completed(&'static str),
    /// The last challenge completed and the board is exhausted.
    Cleared(&'static str),
}

/// The per-stage board: one active challenge at a time, drawn from the
/// stage's shuffled pool.
pub struct ChallengeBoard {
    kind: TreeKind,
    remaining: Vec<TreeChallenge>,
    active: Option<TreeChallenge>,
    completed: Vec<&'static str>,
}

impl ChallengeBoard {
    pub fn new(kind: TreeKind) -> Self {
        let mut remaining = challenges_for(kind);
        let active = remaining.pop();
        ChallengeBoard {
            kind,
            remaining,
            active,
            completed: Vec::new(),
        }
    }

    pub fn kind(&self) -> TreeKind {
        self.kind
    }

    pub fn active(&self) -> Option<&TreeChallenge> {
        self.active.as_ref()
    }

    pub fn completed(&self) -> &[&'static str] {
        &self.completed
    }

    /// Evaluates the active challenge against fresh session stats. At most
    /// one challenge completes per call.
    pub fn check(&mut self, stats: &SessionStats) -> Option<ChallengeEvent> {
        let challenge = self.active?;
        if !(challenge.condition)(stats) {
            return None;
        }
        self.completed.push(challenge.description);
        self.active = self.remaining.pop();
        if self.active.is_none() {
            Some(ChallengeEvent::Cleared(challenge.description))
        } else {
            Some(ChallengeEvent::Completed(challenge.description))
        }
    }
}
