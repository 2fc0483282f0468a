//! The three tree engines driving the progression mechanic.
//!
//! Each engine owns its root exclusively; nodes own their children through
//! `Box` links with no back-references or sharing. Insertion is the only
//! operation that creates nodes, and a whole tree is discarded at once when
//! the session migrates to the next structure.

use std::fmt;

pub mod avl;
pub mod bst;
pub mod btree;

/// Which tree structure a session is currently growing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeKind {
    BTree,
    Bst,
    Avl,
}

impl TreeKind {
    /// The structure a tree of this kind promotes into, if any.
    pub fn next(&self) -> Option<TreeKind> {
        match self {
            TreeKind::BTree => Some(TreeKind::Bst),
            TreeKind::Bst => Some(TreeKind::Avl),
            TreeKind::Avl => None,
        }
    }
}

impl fmt::Display for TreeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeKind::BTree => write!(f, "btree"),
            TreeKind::Bst => write!(f, "bst"),
            TreeKind::Avl => write!(f, "avl"),
        }
    }
}
