//! Self-balancing AVL tree, the terminal stage of the progression.
//!
//! Same contract as the BST (silent duplicate rejection, ascending in-order
//! walk) plus the height bookkeeping and rotations that keep every node's
//! balance factor in `[-1, 1]`. A rotation whose pivot child is missing means
//! the invariant is already corrupted, so the insert path reports that as a
//! fatal `Corrupt` error rather than tolerating it.

use std::cmp::Ordering;

use tracing::trace;

use crate::errors;

/// An AVL node. `height` is 1 for a leaf; an absent subtree counts as 0.
#[derive(Debug)]
pub struct AvlNode {
    pub key: i64,
    pub height: u32,
    pub left: Option<Box<AvlNode>>,
    pub right: Option<Box<AvlNode>>,
}

impl AvlNode {
    fn new(key: i64) -> Self {
        AvlNode {
            key,
            height: 1,
            left: None,
            right: None,
        }
    }
}

fn height(node: &Option<Box<AvlNode>>) -> u32 {
    node.as_ref().map_or(0, |n| n.height)
}

fn balance_factor(node: &AvlNode) -> i32 {
    height(&node.left) as i32 - height(&node.right) as i32
}

fn update_height(node: &mut AvlNode) {
    node.height = 1 + height(&node.left).max(height(&node.right));
}

/// Promotes `y`'s left child to the subtree root, reparenting its right
/// subtree under `y`. Updates exactly the two reshaped heights; ancestors are
/// handled by the unwinding insert recursion.
fn rotate_right(
    mut y: Box<AvlNode>,
    rotations: &mut u64,
) -> Result<Box<AvlNode>, errors::Error> {
    let mut x = y
        .left
        .take()
        .ok_or_else(|| err!(Corrupt, "Rotation pivot {} has no left child", y.key))?;
    y.left = x.right.take();
    update_height(&mut y);
    x.right = Some(y);
    update_height(&mut x);
    *rotations += 1;
    trace!(root = x.key, "Rotated right");
    Ok(x)
}

fn rotate_left(mut x: Box<AvlNode>, rotations: &mut u64) -> Result<Box<AvlNode>, errors::Error> {
    let mut y = x
        .right
        .take()
        .ok_or_else(|| err!(Corrupt, "Rotation pivot {} has no right child", x.key))?;
    x.right = y.left.take();
    update_height(&mut x);
    y.left = Some(x);
    update_height(&mut y);
    *rotations += 1;
    trace!(root = y.key, "Rotated left");
    Ok(y)
}

fn insert_node(
    node: Option<Box<AvlNode>>,
    key: i64,
    rotations: &mut u64,
) -> Result<(Box<AvlNode>, bool), errors::Error> {
    let mut node = match node {
        None => return Ok((Box::new(AvlNode::new(key)), true)),
        Some(n) => n,
    };

    match key.cmp(&node.key) {
        Ordering::Less => {
            let (child, inserted) = insert_node(node.left.take(), key, rotations)?;
            node.left = Some(child);
            if !inserted {
                return Ok((node, false));
            }
        }
        Ordering::Greater => {
            let (child, inserted) = insert_node(node.right.take(), key, rotations)?;
            node.right = Some(child);
            if !inserted {
                return Ok((node, false));
            }
        }
        // Duplicate: nothing changed below, no rebalancing needed.
        Ordering::Equal => return Ok((node, false)),
    }

    update_height(&mut node);
    let balance = balance_factor(&node);

    if balance > 1 {
        let left_key = node
            .left
            .as_ref()
            .ok_or_else(|| err!(Corrupt, "Left-heavy node {} has no left child", node.key))?
            .key;
        if key < left_key {
            return Ok((rotate_right(node, rotations)?, true));
        }
        // Left-right case.
        let left = node
            .left
            .take()
            .ok_or_else(|| err!(Corrupt, "Left-heavy node {} has no left child", node.key))?;
        node.left = Some(rotate_left(left, rotations)?);
        return Ok((rotate_right(node, rotations)?, true));
    }

    if balance < -1 {
        let right_key = node
            .right
            .as_ref()
            .ok_or_else(|| err!(Corrupt, "Right-heavy node {} has no right child", node.key))?
            .key;
        if key > right_key {
            return Ok((rotate_left(node, rotations)?, true));
        }
        // Right-left case.
        let right = node
            .right
            .take()
            .ok_or_else(|| err!(Corrupt, "Right-heavy node {} has no right child", node.key))?;
        node.right = Some(rotate_right(right, rotations)?);
        return Ok((rotate_left(node, rotations)?, true));
    }

    Ok((node, true))
}

/// AVL tree container with a running rotation counter.
#[derive(Debug, Default)]
pub struct AvlTree {
    root: Option<Box<AvlNode>>,
    rotations: u64,
}

impl AvlTree {
    pub fn new() -> Self {
        AvlTree {
            root: None,
            rotations: 0,
        }
    }

    /// Inserts a key, rebalancing on the way back up. Returns `Ok(false)` on
    /// a duplicate (silent rejection, as the BST).
    pub fn insert(&mut self, key: i64) -> Result<bool, errors::Error> {
        let (root, inserted) = insert_node(self.root.take(), key, &mut self.rotations)?;
        self.root = Some(root);
        Ok(inserted)
    }

    /// Total rotations performed over the tree's lifetime.
    pub fn rotations(&self) -> u64 {
        self.rotations
    }

    pub fn count_nodes(&self) -> usize {
        fn count(node: &Option<Box<AvlNode>>) -> usize {
            match node {
                None => 0,
                Some(n) => 1 + count(&n.left) + count(&n.right),
            }
        }
        count(&self.root)
    }

    pub fn branch_count(&self) -> usize {
        fn count(node: &Option<Box<AvlNode>>) -> usize {
            match node {
                None => 0,
                Some(n) => {
                    let own = (n.left.is_some() || n.right.is_some()) as usize;
                    own + count(&n.left) + count(&n.right)
                }
            }
        }
        count(&self.root)
    }

    /// Structural depth, recomputed rather than read from stored heights.
    /// Bounded by O(log n) thanks to the balance invariant.
    pub fn depth(&self) -> usize {
        fn depth(node: &Option<Box<AvlNode>>) -> usize {
            match node {
                None => 0,
                Some(n) => 1 + depth(&n.left).max(depth(&n.right)),
            }
        }
        depth(&self.root)
    }

    pub fn root_key(&self) -> Option<i64> {
        self.root.as_ref().map(|n| n.key)
    }

    pub fn in_order_values(&self) -> Vec<i64> {
        fn collect(node: &Option<Box<AvlNode>>, out: &mut Vec<i64>) {
            if let Some(n) = node {
                collect(&n.left, out);
                out.push(n.key);
                collect(&n.right, out);
            }
        }
        let mut out = Vec::new();
        collect(&self.root, &mut out);
        out
    }

    /// Text rendering, rotated 90 degrees: right subtree above, left below.
    pub fn render(&self) -> String {
        fn render_node(node: &AvlNode, depth: usize, out: &mut String) {
            if let Some(right) = &node.right {
                render_node(right, depth + 1, out);
            }
            out.push_str(&"    ".repeat(depth));
            out.push_str(&node.key.to_string());
            out.push('\n');
            if let Some(left) = &node.left {
                render_node(left, depth + 1, out);
            }
        }
        let mut out = String::new();
        match &self.root {
            None => out.push_str("(empty)\n"),
            Some(root) => render_node(root, 0, &mut out),
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::seq::SliceRandom;

    /// Checks the balance factor and stored heights of every node.
    fn assert_balanced(node: &Option<Box<AvlNode>>) {
        if let Some(n) = node {
            let bf = balance_factor(n);
            assert!((-1..=1).contains(&bf), "node {} has balance {}", n.key, bf);
            assert_eq!(n.height, 1 + height(&n.left).max(height(&n.right)));
            assert_balanced(&n.left);
            assert_balanced(&n.right);
        }
    }

    #[test]
    fn test_empty_tree() {
        let tree = AvlTree::new();
        assert_eq!(tree.count_nodes(), 0);
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.root_key(), None);
    }

    #[test]
    fn test_sorted_build_balances() {
        // The classic balanced build from sorted input.
        let mut tree = AvlTree::new();
        for key in 1..=7 {
            assert!(tree.insert(key).unwrap());
        }
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.root_key(), Some(4));
        assert_eq!(tree.in_order_values(), vec![1, 2, 3, 4, 5, 6, 7]);
        assert_balanced(&tree.root);
    }

    #[test]
    fn test_single_rotation_on_ascending_triple() {
        let mut tree = AvlTree::new();
        for key in [1, 2, 3] {
            tree.insert(key).unwrap();
        }
        assert_eq!(tree.root_key(), Some(2));
        assert_eq!(tree.rotations(), 1);
    }

    #[test]
    fn test_left_right_and_right_left_cases() {
        let mut tree = AvlTree::new();
        // LR: 5, 1, 3 forces a left rotation on 1 then a right rotation on 5.
        for key in [5, 1, 3] {
            tree.insert(key).unwrap();
        }
        assert_eq!(tree.root_key(), Some(3));
        assert_eq!(tree.rotations(), 2);

        let mut tree = AvlTree::new();
        // RL: 1, 5, 3.
        for key in [1, 5, 3] {
            tree.insert(key).unwrap();
        }
        assert_eq!(tree.root_key(), Some(3));
        assert_eq!(tree.rotations(), 2);
    }

    #[test]
    fn test_duplicate_is_silent_noop() {
        let mut tree = AvlTree::new();
        tree.insert(4).unwrap();
        tree.insert(2).unwrap();
        assert!(!tree.insert(4).unwrap());
        assert_eq!(tree.count_nodes(), 2);
    }

    #[test]
    fn test_balance_invariant_after_every_insert() {
        let mut rng = rand::thread_rng();
        for _ in 0..10 {
            let mut keys: Vec<i64> = (0..100).collect();
            keys.shuffle(&mut rng);

            let mut tree = AvlTree::new();
            for &key in &keys {
                tree.insert(key).unwrap();
                assert_balanced(&tree.root);
            }
            let values = tree.in_order_values();
            assert!(values.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_depth_stays_logarithmic() {
        let mut tree = AvlTree::new();
        for key in 1..=100 {
            tree.insert(key).unwrap();
        }
        // Worst-case AVL depth for 100 nodes is well under 10.
        assert!(tree.depth() <= 9, "depth was {}", tree.depth());
    }
}
