//! Fixed-degree B-tree, the opening stage of the progression.
//!
//! Unlike a binary tree, each node holds up to `2t-1` sorted keys and up to
//! `2t` children, where `t` is the tree's minimum degree. The tree stays
//! shallow because a node is split the moment it would overflow, promoting
//! its median key into the parent; the height grows only at the root, one
//! level per split chain.
//!
//! | **Property**        | **Internal node**          | **Leaf node**   |
//! |---------------------|----------------------------|-----------------|
//! | **Stores**          | Keys and child links       | Keys only       |
//! | **Number of keys**  | `t-1` to `2t-1` (root: 1+) | same            |
//! | **Number of links** | number of keys + 1         | none            |
//! | **Key purpose**     | Routing and payload        | Payload         |
//!
//! Key and child storage is a fixed-capacity [`heapless::Vec`]; the live
//! length is the node's key count and the compile-time capacity caps the
//! supported degree at [`MAX_DEGREE`]. The shift-and-insert and
//! shift-and-split index arithmetic follows the classical formulation
//! exactly, since off-by-one errors there are the most common class of
//! B-tree bug.
//!
//! Two quirks are deliberate and load-bearing for the growth thresholds:
//! this tree performs no duplicate check (equal keys accumulate as distinct
//! entries), and the promotion threshold is measured in keys via
//! [`BTree::count_keys`], not in nodes.

use heapless::Vec as BoundedVec;
use tracing::debug;

use crate::errors;

/// Largest supported minimum degree. Construction rejects anything above.
pub const MAX_DEGREE: usize = 8;

const MAX_KEYS: usize = 2 * MAX_DEGREE - 1;
const MAX_CHILDREN: usize = 2 * MAX_DEGREE;

/// A B-tree node: sorted keys, child links and a leaf flag.
///
/// The arrays are bounded at compile time; the logical bound `2t-1` for the
/// tree's actual degree is enforced by the insert/split paths.
#[derive(Debug)]
pub struct BTreeNode {
    pub keys: BoundedVec<i64, MAX_KEYS>,
    pub children: BoundedVec<Box<BTreeNode>, MAX_CHILDREN>,
    pub leaf: bool,
}

impl BTreeNode {
    fn new(leaf: bool) -> Self {
        BTreeNode {
            keys: BoundedVec::new(),
            children: BoundedVec::new(),
            leaf,
        }
    }

    /// Inserts into a subtree whose root is known not to be full.
    ///
    /// Leaf: shift keys greater than `key` right and place `key` at its
    /// sorted position. Internal: locate the covering child by a linear scan
    /// from the end; split it first if full (which may shift the target index
    /// right by one when the promoted median is less than `key`), then
    /// recurse.
    ///
    /// # Errors
    /// Returns `Error::Corrupt` if the node is already full or its key/child
    /// arrays are inconsistent with its leaf flag.
    fn insert_non_full(&mut self, key: i64, degree: usize) -> Result<(), errors::Error> {
        let max_keys = 2 * degree - 1;
        if self.keys.len() >= max_keys {
            return Err(err!(
                Corrupt,
                "Non-full insert into a node holding {} keys (max {})",
                self.keys.len(),
                max_keys
            ));
        }

        let mut i = self.keys.len();
        while i > 0 && self.keys[i - 1] > key {
            i -= 1;
        }

        if self.leaf {
            self.keys
                .insert(i, key)
                .map_err(|_| err!(Corrupt, "Key array capacity exceeded on leaf insert"))?;
            return Ok(());
        }

        if self.children.len() != self.keys.len() + 1 {
            return Err(err!(
                Corrupt,
                "Internal node has {} children for {} keys",
                self.children.len(),
                self.keys.len()
            ));
        }

        if self.children[i].keys.len() == max_keys {
            self.split_child(i, degree)?;
            if self.keys[i] < key {
                i += 1;
            }
        }
        self.children[i].insert_non_full(key, degree)
    }

    /// Splits the full child at index `i`.
    ///
    /// Creates a new right sibling `z` holding the child's top `t-1` keys
    /// (and top `t` children when internal), truncates the child to its
    /// bottom `t-1` keys, wires `z` in as child `i+1` and promotes the
    /// child's median key into this node at key index `i`. This is the sole
    /// rebalancing mechanism.
    ///
    /// # Errors
    /// Returns `Error::Corrupt` if the child is missing, not exactly full, or
    /// its arrays disagree with its leaf flag.
    fn split_child(&mut self, i: usize, degree: usize) -> Result<(), errors::Error> {
        let max_keys = 2 * degree - 1;
        let (median, z) = {
            let y = self
                .children
                .get_mut(i)
                .ok_or_else(|| err!(Corrupt, "Split target child {} out of range", i))?;
            if y.keys.len() != max_keys {
                return Err(err!(
                    Corrupt,
                    "Splitting a node with {} keys, expected {}",
                    y.keys.len(),
                    max_keys
                ));
            }

            let mut z = BTreeNode::new(y.leaf);
            while y.keys.len() > degree {
                let key = y.keys.remove(degree);
                z.keys
                    .push(key)
                    .map_err(|_| err!(Corrupt, "Key array capacity exceeded during split"))?;
            }
            let median = y
                .keys
                .pop()
                .ok_or_else(|| err!(Corrupt, "Split node lost its median key"))?;

            if !y.leaf {
                if y.children.len() != 2 * degree {
                    return Err(err!(
                        Corrupt,
                        "Splitting an internal node with {} children, expected {}",
                        y.children.len(),
                        2 * degree
                    ));
                }
                while y.children.len() > degree {
                    let child = y.children.remove(degree);
                    z.children
                        .push(child)
                        .map_err(|_| err!(Corrupt, "Child array capacity exceeded during split"))?;
                }
            }
            (median, z)
        };

        self.children
            .insert(i + 1, Box::new(z))
            .map_err(|_| err!(Corrupt, "Child array capacity exceeded inserting sibling"))?;
        self.keys
            .insert(i, median)
            .map_err(|_| err!(Corrupt, "Key array capacity exceeded promoting median"))?;

        debug!(median, child = i, "Split B-tree child");
        Ok(())
    }
}

/// B-tree container: root link plus the degree shared by every node.
#[derive(Debug)]
pub struct BTree {
    root: Option<Box<BTreeNode>>,
    degree: usize,
}

impl BTree {
    /// Creates an empty tree of the given minimum degree.
    ///
    /// # Errors
    /// Returns `Error::Config` for a degree outside `2..=MAX_DEGREE`; a
    /// degree below 2 cannot satisfy the node-occupancy invariant.
    pub fn new(degree: usize) -> Result<Self, errors::Error> {
        if degree < 2 {
            return Err(err!(
                Config,
                "B-tree degree must be at least 2, got {}",
                degree
            ));
        }
        if degree > MAX_DEGREE {
            return Err(err!(
                Config,
                "B-tree degree {} exceeds supported maximum {}",
                degree,
                MAX_DEGREE
            ));
        }
        Ok(BTree { root: None, degree })
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Inserts a key. Always succeeds on a healthy tree; duplicates are not
    /// checked and accumulate as distinct entries.
    pub fn insert(&mut self, key: i64) -> Result<(), errors::Error> {
        let max_keys = 2 * self.degree - 1;

        if self.root.is_none() {
            let mut root = BTreeNode::new(true);
            root.keys
                .push(key)
                .map_err(|_| err!(Corrupt, "Key array capacity exceeded on root insert"))?;
            self.root = Some(Box::new(root));
            return Ok(());
        }

        let root_full = self.root.as_ref().map_or(false, |r| r.keys.len() == max_keys);
        if root_full {
            // Grow at the root: the old root becomes child 0 of a fresh
            // internal root and is split before the descent continues.
            let old_root = self
                .root
                .take()
                .ok_or_else(|| err!(Corrupt, "Root vanished during split"))?;
            let mut new_root = BTreeNode::new(false);
            new_root
                .children
                .push(old_root)
                .map_err(|_| err!(Corrupt, "Child array capacity exceeded on root growth"))?;
            new_root.split_child(0, self.degree)?;

            let promoted = *new_root
                .keys
                .first()
                .ok_or_else(|| err!(Corrupt, "Root split promoted no key"))?;
            let i = usize::from(promoted < key);
            new_root
                .children
                .get_mut(i)
                .ok_or_else(|| err!(Corrupt, "Root split produced no child {}", i))?
                .insert_non_full(key, self.degree)?;
            self.root = Some(Box::new(new_root));
        } else if let Some(root) = self.root.as_mut() {
            root.insert_non_full(key, self.degree)?;
        }
        Ok(())
    }

    /// Total number of stored keys. This is what the growth controller
    /// measures against its promotion threshold.
    pub fn count_keys(&self) -> usize {
        fn count(node: &BTreeNode) -> usize {
            node.keys.len() + node.children.iter().map(|c| count(c)).sum::<usize>()
        }
        self.root.as_deref().map_or(0, count)
    }

    /// Structural node count.
    pub fn count_nodes(&self) -> usize {
        fn count(node: &BTreeNode) -> usize {
            1 + node.children.iter().map(|c| count(c)).sum::<usize>()
        }
        self.root.as_deref().map_or(0, count)
    }

    /// Number of internal (non-leaf) nodes.
    pub fn branch_count(&self) -> usize {
        fn count(node: &BTreeNode) -> usize {
            let own = usize::from(!node.leaf);
            own + node.children.iter().map(|c| count(c)).sum::<usize>()
        }
        self.root.as_deref().map_or(0, count)
    }

    /// Depth of the tree: 0 for empty, 1 for a lone leaf root.
    pub fn depth(&self) -> usize {
        fn depth(node: &BTreeNode) -> usize {
            1 + node.children.iter().map(|c| depth(c)).max().unwrap_or(0)
        }
        self.root.as_deref().map_or(0, depth)
    }

    /// Multiway in-order traversal: child `i`, key `i` for each slot, then
    /// the final child. Keys come out in ascending order.
    ///
    /// # Errors
    /// Returns `Error::Corrupt` if an internal node's child count disagrees
    /// with its key count; traversal over invalid indices has no recovery
    /// path.
    pub fn in_order_values(&self) -> Result<Vec<i64>, errors::Error> {
        fn collect(node: &BTreeNode, out: &mut Vec<i64>) -> Result<(), errors::Error> {
            if node.leaf {
                if !node.children.is_empty() {
                    return Err(err!(
                        Corrupt,
                        "Leaf node unexpectedly holds {} children",
                        node.children.len()
                    ));
                }
                out.extend_from_slice(&node.keys);
                return Ok(());
            }
            if node.children.len() != node.keys.len() + 1 {
                return Err(err!(
                    Corrupt,
                    "Internal node has {} children for {} keys",
                    node.children.len(),
                    node.keys.len()
                ));
            }
            for (i, key) in node.keys.iter().enumerate() {
                collect(&node.children[i], out)?;
                out.push(*key);
            }
            collect(&node.children[node.keys.len()], out)
        }

        let mut out = Vec::new();
        if let Some(root) = &self.root {
            collect(root, &mut out)?;
        }
        Ok(out)
    }

    /// Text rendering: one node per line, keys bracketed, children indented.
    pub fn render(&self) -> String {
        fn render_node(node: &BTreeNode, depth: usize, out: &mut String) {
            out.push_str(&"    ".repeat(depth));
            out.push('[');
            let keys: Vec<String> = node.keys.iter().map(|k| k.to_string()).collect();
            out.push_str(&keys.join(" "));
            out.push_str("]\n");
            for child in &node.children {
                render_node(child, depth + 1, out);
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

    /// Checks the node-occupancy and ordering invariants over a whole tree
    /// built from distinct keys.
    fn assert_invariants(tree: &BTree) {
        fn check(node: &BTreeNode, degree: usize, is_root: bool) {
            let max_keys = 2 * degree - 1;
            assert!(node.keys.len() <= max_keys);
            if is_root {
                assert!(!node.keys.is_empty());
            } else {
                assert!(node.keys.len() >= degree - 1);
            }
            assert!(node.keys.windows(2).all(|w| w[0] < w[1]));
            if node.leaf {
                assert!(node.children.is_empty());
            } else {
                assert_eq!(node.children.len(), node.keys.len() + 1);
                for child in &node.children {
                    check(child, degree, false);
                }
            }
        }
        if let Some(root) = &tree.root {
            check(root, tree.degree, true);
        }
    }

    #[test]
    fn test_rejects_bad_degree() {
        assert!(BTree::new(0).is_err());
        assert_eq!(BTree::new(1).unwrap_err().code(), 2000);
        assert!(BTree::new(MAX_DEGREE + 1).is_err());
        assert!(BTree::new(2).is_ok());
        assert!(BTree::new(MAX_DEGREE).is_ok());
    }

    #[test]
    fn test_empty_tree() {
        let tree = BTree::new(2).unwrap();
        assert_eq!(tree.count_keys(), 0);
        assert_eq!(tree.count_nodes(), 0);
        assert_eq!(tree.depth(), 0);
        assert!(tree.in_order_values().unwrap().is_empty());
    }

    #[test]
    fn test_first_split_at_degree_two() {
        // 10, 20, 30 into a t=2 tree splits once: root [20], children
        // [10] and [30].
        let mut tree = BTree::new(2).unwrap();
        for key in [10, 20, 30] {
            tree.insert(key).unwrap();
        }
        let root = tree.root.as_ref().unwrap();
        assert!(!root.leaf);
        assert_eq!(root.keys.as_slice(), &[20]);
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].keys.as_slice(), &[10]);
        assert_eq!(root.children[1].keys.as_slice(), &[30]);
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.count_nodes(), 3);
        assert_eq!(tree.count_keys(), 3);
    }

    #[test]
    fn test_duplicates_accumulate() {
        let mut tree = BTree::new(2).unwrap();
        for key in [5, 5, 5] {
            tree.insert(key).unwrap();
        }
        assert_eq!(tree.count_keys(), 3);
        assert_eq!(tree.in_order_values().unwrap(), vec![5, 5, 5]);
    }

    #[test]
    fn test_in_order_ascending() {
        let mut tree = BTree::new(3).unwrap();
        for key in [42, 7, 19, 3, 88, 61, 12, 50, 1, 99, 34] {
            tree.insert(key).unwrap();
        }
        let values = tree.in_order_values().unwrap();
        assert_eq!(values, vec![1, 3, 7, 12, 19, 34, 42, 50, 61, 88, 99]);
    }

    #[test]
    fn test_invariants_over_random_sequences() {
        let mut rng = rand::thread_rng();
        for degree in [2, 3, 4] {
            for _ in 0..10 {
                let mut keys: Vec<i64> = (0..200).collect();
                keys.shuffle(&mut rng);

                let mut tree = BTree::new(degree).unwrap();
                for &key in &keys {
                    tree.insert(key).unwrap();
                }
                assert_invariants(&tree);
                assert_eq!(tree.count_keys(), 200);
                let values = tree.in_order_values().unwrap();
                assert!(values.windows(2).all(|w| w[0] < w[1]));
            }
        }
    }

    #[test]
    fn test_height_grows_only_at_root() {
        let mut tree = BTree::new(2).unwrap();
        let mut last_depth = 0;
        for key in 0..50 {
            tree.insert(key).unwrap();
            let depth = tree.depth();
            assert!(depth == last_depth || depth == last_depth + 1);
            last_depth = depth;
        }
    }

    #[test]
    fn test_render_contains_all_keys() {
        let mut tree = BTree::new(2).unwrap();
        for key in [10, 20, 30] {
            tree.insert(key).unwrap();
        }
        let text = tree.render();
        for key in ["10", "20", "30"] {
            assert!(text.contains(key));
        }
    }
}
