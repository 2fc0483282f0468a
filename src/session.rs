//! Per-player session: owns exactly one live tree and promotes it to the
//! next structure when its growth threshold is crossed.
//!
//! The state machine is `BTree -> Bst -> Avl`, with AVL terminal. A promotion
//! drains the old tree in order, rebuilds the next structure from the
//! collected sequence, then drops the old root at the swap; from the caller's
//! point of view the migration is destructive and atomic. Cycling back to a
//! fresh B-tree is not part of the state machine; policy layers (see
//! `challenges`) request it through [`Session::restart`].

use tracing::info;
use uuid::Uuid;

use crate::config::GrowthConfig;
use crate::errors;
use crate::trees::avl::AvlTree;
use crate::trees::bst::Bst;
use crate::trees::btree::BTree;
use crate::trees::TreeKind;

enum ActiveTree {
    BTree(BTree),
    Bst(Bst),
    Avl(AvlTree),
}

/// What a single `insert_key` call did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    Promoted { from: TreeKind, to: TreeKind },
}

/// Snapshot of session counters, consumed by the shell and the challenge
/// layer.
#[derive(Debug, Clone, Copy)]
pub struct SessionStats {
    pub kind: TreeKind,
    /// Structural node count of the active tree.
    pub node_count: usize,
    /// Live key count; differs from `node_count` only for the B-tree.
    pub key_count: usize,
    pub depth: usize,
    /// Nodes with at least one child.
    pub branch_count: usize,
    /// Keys offered to the session over its lifetime, duplicates included.
    pub total_inserted: u64,
    /// AVL rotations performed (0 before the AVL stage).
    pub rotations: u64,
    /// Promotions completed so far.
    pub migrations: u32,
}

pub struct Session {
    pub id: Uuid,
    config: GrowthConfig,
    tree: ActiveTree,
    total_inserted: u64,
    migrations: u32,
}

impl Session {
    /// Opens a session on a fresh B-tree. Fails fast on a bad configuration.
    pub fn open(config: GrowthConfig) -> Result<Self, errors::Error> {
        config.validate()?;
        let session = Session {
            id: Uuid::new_v4(),
            tree: ActiveTree::BTree(BTree::new(config.degree)?),
            config,
            total_inserted: 0,
            migrations: 0,
        };
        info!(
            session = %session.id,
            degree = config.degree,
            "Opened session on a fresh B-tree"
        );
        Ok(session)
    }

    /// Inserts a key into the active tree, promoting to the next structure
    /// when the configured threshold is exceeded.
    pub fn insert_key(&mut self, key: i64) -> Result<InsertOutcome, errors::Error> {
        let from;
        let values = match &mut self.tree {
            ActiveTree::BTree(tree) => {
                tree.insert(key)?;
                self.total_inserted += 1;
                if tree.count_keys() <= self.config.btree_key_limit {
                    return Ok(InsertOutcome::Inserted);
                }
                from = TreeKind::BTree;
                tree.in_order_values()?
            }
            ActiveTree::Bst(tree) => {
                tree.insert(key);
                self.total_inserted += 1;
                if tree.count_nodes() <= self.config.bst_node_limit {
                    return Ok(InsertOutcome::Inserted);
                }
                from = TreeKind::Bst;
                tree.in_order_values()
            }
            // Terminal state in the baseline flow.
            ActiveTree::Avl(tree) => {
                tree.insert(key)?;
                self.total_inserted += 1;
                return Ok(InsertOutcome::Inserted);
            }
        };

        // The old tree is fully drained into `values`; the assignment below
        // drops its root.
        let to = match from {
            TreeKind::BTree => {
                let mut bst = Bst::new();
                for &value in &values {
                    bst.insert(value);
                }
                self.tree = ActiveTree::Bst(bst);
                TreeKind::Bst
            }
            TreeKind::Bst => {
                let mut avl = AvlTree::new();
                for &value in &values {
                    avl.insert(value)?;
                }
                self.tree = ActiveTree::Avl(avl);
                TreeKind::Avl
            }
            TreeKind::Avl => {
                return Err(err!(Other, "AVL stage has no promotion target"));
            }
        };
        self.migrations += 1;
        info!(
            session = %self.id,
            %from,
            %to,
            keys = values.len(),
            "Promoted session tree"
        );
        Ok(InsertOutcome::Promoted { from, to })
    }

    /// Discards the active tree and starts over on a fresh B-tree.
    ///
    /// This is the cycle-back path external policies (challenges) trigger;
    /// the state machine never calls it on its own.
    pub fn restart(&mut self) -> Result<(), errors::Error> {
        self.tree = ActiveTree::BTree(BTree::new(self.config.degree)?);
        info!(session = %self.id, "Restarted session on a fresh B-tree");
        Ok(())
    }

    pub fn kind(&self) -> TreeKind {
        match &self.tree {
            ActiveTree::BTree(_) => TreeKind::BTree,
            ActiveTree::Bst(_) => TreeKind::Bst,
            ActiveTree::Avl(_) => TreeKind::Avl,
        }
    }

    pub fn config(&self) -> &GrowthConfig {
        &self.config
    }

    /// Structural node count of the active tree.
    pub fn count_nodes(&self) -> usize {
        match &self.tree {
            ActiveTree::BTree(tree) => tree.count_nodes(),
            ActiveTree::Bst(tree) => tree.count_nodes(),
            ActiveTree::Avl(tree) => tree.count_nodes(),
        }
    }

    /// Depth of the active tree, 0 when empty.
    pub fn depth(&self) -> usize {
        match &self.tree {
            ActiveTree::BTree(tree) => tree.depth(),
            ActiveTree::Bst(tree) => tree.depth(),
            ActiveTree::Avl(tree) => tree.depth(),
        }
    }

    /// Ascending key sequence of the active tree, fresh per call.
    pub fn in_order_values(&self) -> Result<Vec<i64>, errors::Error> {
        match &self.tree {
            ActiveTree::BTree(tree) => tree.in_order_values(),
            ActiveTree::Bst(tree) => Ok(tree.in_order_values()),
            ActiveTree::Avl(tree) => Ok(tree.in_order_values()),
        }
    }

    pub fn stats(&self) -> SessionStats {
        let (kind, node_count, key_count, depth, branch_count, rotations) = match &self.tree {
            ActiveTree::BTree(tree) => (
                TreeKind::BTree,
                tree.count_nodes(),
                tree.count_keys(),
                tree.depth(),
                tree.branch_count(),
                0,
            ),
            ActiveTree::Bst(tree) => {
                let nodes = tree.count_nodes();
                (TreeKind::Bst, nodes, nodes, tree.depth(), tree.branch_count(), 0)
            }
            ActiveTree::Avl(tree) => {
                let nodes = tree.count_nodes();
                (
                    TreeKind::Avl,
                    nodes,
                    nodes,
                    tree.depth(),
                    tree.branch_count(),
                    tree.rotations(),
                )
            }
        };
        SessionStats {
            kind,
            node_count,
            key_count,
            depth,
            branch_count,
            total_inserted: self.total_inserted,
            rotations,
            migrations: self.migrations,
        }
    }

    pub fn render(&self) -> String {
        match &self.tree {
            ActiveTree::BTree(tree) => tree.render(),
            ActiveTree::Bst(tree) => tree.render(),
            ActiveTree::Avl(tree) => tree.render(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> GrowthConfig {
        GrowthConfig {
            degree: 2,
            btree_key_limit: 2,
            bst_node_limit: 3,
        }
    }

    #[test]
    fn test_open_rejects_bad_config() {
        let config = GrowthConfig {
            degree: 1,
            ..GrowthConfig::default()
        };
        assert!(Session::open(config).is_err());
    }

    #[test]
    fn test_starts_on_btree() {
        let session = Session::open(GrowthConfig::default()).unwrap();
        assert_eq!(session.kind(), TreeKind::BTree);
        assert_eq!(session.count_nodes(), 0);
        assert_eq!(session.depth(), 0);
    }

    #[test]
    fn test_full_progression_preserves_key_set() {
        // 3, 1, 4, 1, 5: the B-tree drains as {1,3,4} on the third insert,
        // the BST swallows the duplicate 1, and the final AVL holds
        // {1,3,4,5}.
        let mut session = Session::open(small_config()).unwrap();

        assert_eq!(session.insert_key(3).unwrap(), InsertOutcome::Inserted);
        assert_eq!(session.insert_key(1).unwrap(), InsertOutcome::Inserted);
        assert_eq!(
            session.insert_key(4).unwrap(),
            InsertOutcome::Promoted {
                from: TreeKind::BTree,
                to: TreeKind::Bst
            }
        );
        assert_eq!(session.kind(), TreeKind::Bst);
        assert_eq!(session.in_order_values().unwrap(), vec![1, 3, 4]);

        // Duplicate: BST rejects it silently, no promotion.
        assert_eq!(session.insert_key(1).unwrap(), InsertOutcome::Inserted);
        assert_eq!(session.count_nodes(), 3);

        assert_eq!(
            session.insert_key(5).unwrap(),
            InsertOutcome::Promoted {
                from: TreeKind::Bst,
                to: TreeKind::Avl
            }
        );
        assert_eq!(session.kind(), TreeKind::Avl);
        assert_eq!(session.in_order_values().unwrap(), vec![1, 3, 4, 5]);
        assert_eq!(session.stats().migrations, 2);
    }

    #[test]
    fn test_avl_stage_is_terminal() {
        let mut session = Session::open(small_config()).unwrap();
        for key in 0..50 {
            session.insert_key(key).unwrap();
        }
        assert_eq!(session.kind(), TreeKind::Avl);
        assert_eq!(session.stats().migrations, 2);
    }

    #[test]
    fn test_btree_duplicates_count_toward_threshold() {
        let mut session = Session::open(small_config()).unwrap();
        session.insert_key(5).unwrap();
        session.insert_key(5).unwrap();
        assert_eq!(session.stats().key_count, 2);
        // Third duplicate exceeds the 2-key limit and forces the promotion;
        // the BST then collapses the duplicates.
        let outcome = session.insert_key(5).unwrap();
        assert_eq!(
            outcome,
            InsertOutcome::Promoted {
                from: TreeKind::BTree,
                to: TreeKind::Bst
            }
        );
        assert_eq!(session.in_order_values().unwrap(), vec![5]);
    }

    #[test]
    fn test_restart_returns_to_btree() {
        let mut session = Session::open(small_config()).unwrap();
        for key in 0..10 {
            session.insert_key(key).unwrap();
        }
        assert_eq!(session.kind(), TreeKind::Avl);

        session.restart().unwrap();
        assert_eq!(session.kind(), TreeKind::BTree);
        assert_eq!(session.count_nodes(), 0);
        // Lifetime counters survive the restart.
        assert_eq!(session.stats().total_inserted, 10);
    }

    #[test]
    fn test_in_order_idempotent_across_structures() {
        let mut session = Session::open(small_config()).unwrap();
        for key in [9, 2, 7, 4] {
            session.insert_key(key).unwrap();
        }
        assert_eq!(
            session.in_order_values().unwrap(),
            session.in_order_values().unwrap()
        );
    }
}
