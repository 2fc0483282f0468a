//! Plain binary search tree.
//!
//! The BST is the middle stage of the progression: it receives the keys the
//! B-tree collected, keeps them in a simple ordered node graph, and is itself
//! drained into an AVL tree once it outgrows its threshold. No balancing is
//! performed, so an adversarial (sorted) insert sequence degenerates into a
//! chain of depth O(n). Because of that, every walk over this tree uses an
//! explicit stack instead of recursion.

use std::cmp::Ordering;

/// A single BST node. Owns its children exclusively; no parent links.
#[derive(Debug)]
pub struct BstNode {
    pub key: i64,
    pub left: Option<Box<BstNode>>,
    pub right: Option<Box<BstNode>>,
}

impl BstNode {
    fn new(key: i64) -> Self {
        BstNode {
            key,
            left: None,
            right: None,
        }
    }
}

/// Binary search tree container. An empty tree has no root.
#[derive(Debug, Default)]
pub struct Bst {
    root: Option<Box<BstNode>>,
}

impl Bst {
    pub fn new() -> Self {
        Bst { root: None }
    }

    /// Inserts a key, descending left on smaller and right on greater.
    ///
    /// Duplicate keys are rejected silently: the tree is left untouched and
    /// `false` is returned. A successful insert creates exactly one new leaf.
    pub fn insert(&mut self, key: i64) -> bool {
        let mut cur = &mut self.root;
        loop {
            match cur {
                None => {
                    *cur = Some(Box::new(BstNode::new(key)));
                    return true;
                }
                Some(node) => match key.cmp(&node.key) {
                    Ordering::Less => cur = &mut node.left,
                    Ordering::Greater => cur = &mut node.right,
                    Ordering::Equal => return false,
                },
            }
        }
    }

    /// Structural node count, O(n).
    pub fn count_nodes(&self) -> usize {
        let mut count = 0;
        let mut stack: Vec<&BstNode> = Vec::new();
        if let Some(root) = &self.root {
            stack.push(root);
        }
        while let Some(node) = stack.pop() {
            count += 1;
            if let Some(left) = &node.left {
                stack.push(left);
            }
            if let Some(right) = &node.right {
                stack.push(right);
            }
        }
        count
    }

    /// Number of nodes with at least one child.
    pub fn branch_count(&self) -> usize {
        let mut count = 0;
        let mut stack: Vec<&BstNode> = Vec::new();
        if let Some(root) = &self.root {
            stack.push(root);
        }
        while let Some(node) = stack.pop() {
            if node.left.is_some() || node.right.is_some() {
                count += 1;
            }
            if let Some(left) = &node.left {
                stack.push(left);
            }
            if let Some(right) = &node.right {
                stack.push(right);
            }
        }
        count
    }

    /// Depth of the tree: 0 for empty, 1 for a lone root.
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack: Vec<(&BstNode, usize)> = Vec::new();
        if let Some(root) = &self.root {
            stack.push((root, 1));
        }
        while let Some((node, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let Some(left) = &node.left {
                stack.push((left, depth + 1));
            }
            if let Some(right) = &node.right {
                stack.push((right, depth + 1));
            }
        }
        max_depth
    }

    /// Lazy in-order walk yielding keys in ascending order.
    ///
    /// The iterator is finite and fresh per call; callers needing a second
    /// pass call this again.
    pub fn in_order(&self) -> InOrder<'_> {
        let mut iter = InOrder { stack: Vec::new() };
        iter.push_left(self.root.as_deref());
        iter
    }

    /// Collects the in-order walk into a vector.
    pub fn in_order_values(&self) -> Vec<i64> {
        self.in_order().collect()
    }

    /// Text rendering, rotated 90 degrees: right subtree above, left below.
    pub fn render(&self) -> String {
        let mut out = String::new();
        match &self.root {
            None => out.push_str("(empty)\n"),
            Some(root) => render_node(root, 0, &mut out),
        }
        out
    }
}

fn render_node(node: &BstNode, depth: usize, out: &mut String) {
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

/// In-order iterator over a BST, backed by an explicit stack of ancestors.
pub struct InOrder<'a> {
    stack: Vec<&'a BstNode>,
}

impl<'a> InOrder<'a> {
    fn push_left(&mut self, mut node: Option<&'a BstNode>) {
        while let Some(n) = node {
            self.stack.push(n);
            node = n.left.as_deref();
        }
    }
}

impl<'a> Iterator for InOrder<'a> {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        let node = self.stack.pop()?;
        self.push_left(node.right.as_deref());
        Some(node.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::seq::SliceRandom;

    #[test]
    fn test_empty_tree() {
        let tree = Bst::new();
        assert_eq!(tree.count_nodes(), 0);
        assert_eq!(tree.depth(), 0);
        assert!(tree.in_order_values().is_empty());
    }

    #[test]
    fn test_insert_and_in_order() {
        let mut tree = Bst::new();
        for key in [8, 3, 10, 1, 6, 14, 4, 7, 13] {
            assert!(tree.insert(key));
        }
        assert_eq!(tree.in_order_values(), vec![1, 3, 4, 6, 7, 8, 10, 13, 14]);
        assert_eq!(tree.count_nodes(), 9);
    }

    #[test]
    fn test_duplicate_is_silent_noop() {
        let mut tree = Bst::new();
        assert!(tree.insert(5));
        assert!(tree.insert(3));
        assert!(!tree.insert(5));
        assert_eq!(tree.count_nodes(), 2);
        assert_eq!(tree.in_order_values(), vec![3, 5]);
    }

    #[test]
    fn test_sorted_input_degenerates_to_chain() {
        let mut tree = Bst::new();
        for key in 1..=12 {
            tree.insert(key);
        }
        assert_eq!(tree.depth(), 12);
        assert_eq!(tree.branch_count(), 11);
    }

    #[test]
    fn test_in_order_sorted_for_random_sequences() {
        let mut rng = rand::thread_rng();
        for _ in 0..20 {
            let mut keys: Vec<i64> = (0..50).collect();
            keys.shuffle(&mut rng);

            let mut tree = Bst::new();
            for &key in &keys {
                tree.insert(key);
            }
            let values = tree.in_order_values();
            assert!(values.windows(2).all(|w| w[0] < w[1]));
            assert_eq!(values.len(), 50);
        }
    }

    #[test]
    fn test_in_order_idempotent() {
        let mut tree = Bst::new();
        for key in [5, 2, 9, 1, 3] {
            tree.insert(key);
        }
        assert_eq!(tree.in_order_values(), tree.in_order_values());
    }

    #[test]
    fn test_lazy_iterator_is_fresh_per_call() {
        let mut tree = Bst::new();
        for key in [2, 1, 3] {
            tree.insert(key);
        }
        let mut first = tree.in_order();
        assert_eq!(first.next(), Some(1));
        // A second iterator starts from the beginning regardless.
        let second: Vec<i64> = tree.in_order().collect();
        assert_eq!(second, vec![1, 2, 3]);
    }

    #[test]
    fn test_render_contains_all_keys() {
        let mut tree = Bst::new();
        for key in [4, 2, 6] {
            tree.insert(key);
        }
        let text = tree.render();
        for key in ["2", "4", "6"] {
            assert!(text.contains(key));
        }
    }
}
