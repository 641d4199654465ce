use std::fmt;

use super::node::{Color, Direction, NodeId};
use super::RBTree;


/// A broken red-black or BST property, as found by [`RBTree::check_invariants`].
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantViolation {
    RedRoot,
    RootHasParent,
    RedRedPair,
    BlackHeightMismatch { left: usize, right: usize },
    OutOfOrder,
    BrokenParentLink,
    LengthMismatch { reachable: usize, recorded: usize },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RedRoot => write!(f, "the root is red"),
            Self::RootHasParent => write!(f, "the root has a parent link"),
            Self::RedRedPair => write!(f, "a red node has a red child"),
            Self::BlackHeightMismatch { left, right } => {
                write!(f, "black height differs between subtrees ({left} on the left, {right} on the right)")
            }
            Self::OutOfOrder => write!(f, "keys are not strictly increasing in order"),
            Self::BrokenParentLink => write!(f, "a child does not point back at its parent"),
            Self::LengthMismatch { reachable, recorded } => {
                write!(f, "{reachable} nodes reachable from the root, but {recorded} stored")
            }
        }
    }
}

impl std::error::Error for InvariantViolation {}


impl<K: Ord, V> RBTree<K, V> {
    /// Walks the whole tree and checks every red-black and ordering rule, plus the parent links.
    ///
    /// O(n). Meant for tests and debugging.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let Some(root) = self.root else {
            return match self.len() {
                0 => Ok(()),
                recorded => Err(InvariantViolation::LengthMismatch { reachable: 0, recorded }),
            }
        };

        if self.node(root).parent.is_some() {
            return Err(InvariantViolation::RootHasParent)
        }
        if self.node(root).color.is_red() {
            return Err(InvariantViolation::RedRoot)
        }

        let mut reachable = 0;
        self.check_subtree(Some(root), &mut reachable)?;

        // strictly increasing in-order keys
        let mut prev: Option<&K> = None;
        for (k, _) in self.iter() {
            if prev.is_some_and(|p| p >= k) {
                return Err(InvariantViolation::OutOfOrder)
            }
            prev = Some(k);
        }

        if reachable != self.len() {
            return Err(InvariantViolation::LengthMismatch { reachable, recorded: self.len() })
        }
        Ok(())
    }

    /// Returns the black height of the subtree at `id`, counting the missing children below it.
    // NOTE: recursion depth is bounded by the tree height, which is logarithmic as long as the
    //       coloring holds (and the coloring is exactly what is being checked on the way down).
    fn check_subtree(&self, id: Option<NodeId>, reachable: &mut usize) -> Result<usize, InvariantViolation> {
        let Some(id) = id else { return Ok(1) };
        *reachable += 1;
        let node = self.node(id);

        for dir in [Direction::Left, Direction::Right] {
            if let Some(child) = node[dir] {
                if self.node(child).parent != Some(id) {
                    return Err(InvariantViolation::BrokenParentLink)
                }
                if node.color.is_red() && self.node(child).color.is_red() {
                    return Err(InvariantViolation::RedRedPair)
                }
            }
        }

        let left = self.check_subtree(node[Direction::Left], reachable)?;
        let right = self.check_subtree(node[Direction::Right], reachable)?;
        if left != right {
            return Err(InvariantViolation::BlackHeightMismatch { left, right })
        }
        Ok(left + usize::from(node.color == Color::Black))
    }
}
