use crate::errors;
use crate::trees::btree::MAX_DEGREE;

/// Growth thresholds for a player session.
///
/// The hosting layer supplies these; nothing in the tree engines or the
/// session hardcodes them. A session starts on a B-tree of `degree`,
/// promotes to a BST once the B-tree holds more than `btree_key_limit`
/// keys, and promotes to an AVL tree once the BST holds more than
/// `bst_node_limit` nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthConfig {
    /// Minimum degree `t` of the B-tree. Max keys per node = `2t-1`.
    pub degree: usize,
    /// Total key count above which the B-tree is promoted to a BST.
    pub btree_key_limit: usize,
    /// Node count above which the BST is promoted to an AVL tree.
    pub bst_node_limit: usize,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        GrowthConfig {
            degree: 3,
            btree_key_limit: 20,
            bst_node_limit: 20,
        }
    }
}

impl GrowthConfig {
    /// Checks the configuration before any tree is built.
    ///
    /// # Errors
    /// Returns `Error::Config` if the degree is outside `2..=MAX_DEGREE` or
    /// either threshold is zero.
    pub fn validate(&self) -> Result<(), errors::Error> {
        if self.degree < 2 {
            return Err(err!(
                Config,
                "B-tree degree must be at least 2, got {}",
                self.degree
            ));
        }
        if self.degree > MAX_DEGREE {
            return Err(err!(
                Config,
                "B-tree degree {} exceeds supported maximum {}",
                self.degree,
                MAX_DEGREE
            ));
        }
        if self.btree_key_limit == 0 || self.bst_node_limit == 0 {
            return Err(err!(Config, "Promotion thresholds must be positive"));
        }
        Ok(())
    }
}
