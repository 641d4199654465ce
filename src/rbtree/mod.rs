//! An ordered map backed by a red-black tree.
//!
//! The tree keeps the usual four coloring rules on top of the BST ordering:
//!
//! 1. every node is red or black,
//! 2. the root is black,
//! 3. a red node never has a red child,
//! 4. every path from a node down to a missing child crosses the same number of black nodes.
//!
//! Together these bound the height by `2 * log₂(n + 1)`, so search, insert and delete are all
//! O(log n). Nodes are kept in an arena and linked by index, so the parent back-reference is a
//! plain handle and never an owning edge.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;

use log::{debug, trace};

mod check;
mod iter;
mod node;
mod print;

pub use check::InvariantViolation;
pub use iter::Iter;
pub use node::{Color, NodeRef};

use node::{Direction, NodeId, RBTreeNode};


/// An ordered map from `K` to `V`, balanced as a red-black tree.
///
/// Not synchronized: callers sharing a tree between threads have to wrap the whole thing in a lock.
pub struct RBTree<K, V> {
    // NOTE: the arena is always dense, so `nodes.len()` is the number of live keys.
    nodes: Vec<RBTreeNode<K, V>>,
    root: Option<NodeId>,
}

impl<K, V> RBTree<K, V> {
    /// Creates an empty tree.
    pub const fn new() -> Self {
        Self { nodes: Vec::new(), root: None }
    }

    /// The number of keys in the tree. O(1).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The root node, for looking at the shape of the tree.
    pub fn root(&self) -> Option<NodeRef<'_, K, V>> {
        self.root.map(|id| NodeRef::new(self, id))
    }

    /// Removes every key.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    fn node(&self, id: NodeId) -> &RBTreeNode<K, V> {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut RBTreeNode<K, V> {
        &mut self.nodes[id.0]
    }

    /// Missing children are black.
    fn color_of(&self, id: Option<NodeId>) -> Color {
        id.map_or(Color::Black, |id| self.node(id).color)
    }

    fn set_color(&mut self, id: NodeId, color: Color) {
        self.node_mut(id).color = color;
    }

    /// The side of `parent` that `child` hangs off. `child` may be missing, in which case the
    /// missing side is reported (left first).
    fn side_of(&self, parent: NodeId, child: Option<NodeId>) -> Direction {
        if self.node(parent)[Direction::Left] == child {
            Direction::Left
        } else {
            Direction::Right
        }
    }

    fn minimum(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.node(id)[Direction::Left] {
            id = left;
        }
        id
    }

    /// Points whatever referenced `old` from above (its parent, or the root slot) at `new` instead.
    fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: Option<NodeId>) {
        match parent {
            None => self.root = new,
            Some(parent) => {
                let side = self.side_of(parent, Some(old));
                self.node_mut(parent)[side] = new;
            }
        }
    }

    /// Puts the subtree rooted at `new` where the subtree rooted at `old` used to be.
    ///
    /// `old` keeps its own (now stale) links; the caller is responsible for either re-linking it or
    /// releasing it.
    fn transplant(&mut self, old: NodeId, new: Option<NodeId>) {
        let parent = self.node(old).parent;
        self.replace_child(parent, old, new);
        if let Some(new) = new {
            self.node_mut(new).parent = parent;
        }
    }

    /// Rotates `root` down towards `dir`; its child on the opposite side takes its place.
    /// Returns the new subtree root. O(1), and the in-order sequence is unchanged.
    ///
    /// `rotate(x, Direction::Left)` is the textbook left rotation.
    fn rotate(&mut self, root: NodeId, dir: Direction) -> NodeId {
        let pivot = self.node(root)[dir.opposite()]
            .expect("a rotation needs a child on the side that moves up");
        trace!("rotating {dir:?} at {root:?} (pivot {pivot:?})");

        let middle = self.node(pivot)[dir];
        let parent = self.node(root).parent;

        self.node_mut(root)[dir.opposite()] = middle;
        if let Some(middle) = middle {
            self.node_mut(middle).parent = Some(root);
        }

        self.replace_child(parent, root, Some(pivot));
        self.node_mut(pivot).parent = parent;

        self.node_mut(pivot)[dir] = Some(root);
        self.node_mut(root).parent = Some(pivot);

        pivot
    }

    /// Drops the (already detached) node in slot `id` out of the arena and hands it back.
    ///
    /// The last slot gets moved into `id`, so every link that pointed at the last slot is redirected.
    fn release(&mut self, id: NodeId) -> RBTreeNode<K, V> {
        let last = NodeId(self.nodes.len() - 1);
        if id != last {
            let (parent, child) = {
                let moved = self.node(last);
                (moved.parent, moved.child)
            };
            debug!("relinking {last:?} into freed slot {id:?}");
            self.replace_child(parent, last, Some(id));
            for c in child.into_iter().flatten() {
                self.node_mut(c).parent = Some(id);
            }
        }
        self.nodes.swap_remove(id.0)
    }
}

impl<K: Ord, V> RBTree<K, V> {
    fn find<Q>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut cur = self.root;
        while let Some(id) = cur {
            let node = self.node(id);
            cur = match key.cmp(node.key.borrow()) {
                Ordering::Less => node[Direction::Left],
                Ordering::Greater => node[Direction::Right],
                Ordering::Equal => return Some(id),
            };
        }
        None
    }

    /// Looks up the node holding `key`. Does not touch the structure.
    ///
    /// ```rust
    /// # use redblack::RBTree;
    /// let mut tree = RBTree::new();
    /// tree.insert("7".to_string(), 7);
    ///
    /// let node = tree.search("7").unwrap();
    /// assert_eq!(*node.value(), 7);
    /// assert!(tree.search("8").is_none());
    /// ```
    pub fn search<Q>(&self, key: &Q) -> Option<NodeRef<'_, K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.find(key).map(|id| NodeRef::new(self, id))
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.find(key).map(|id| &self.node(id).value)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let id = self.find(key)?;
        Some(&mut self.node_mut(id).value)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.find(key).is_some()
    }

    /// Inserts a key-value pair.
    ///
    /// If the key is already present only its value is replaced (no recoloring, no rotations) and
    /// the old value is returned. Otherwise a new red node is attached and the tree is rebalanced.
    ///
    /// ```rust
    /// # use redblack::RBTree;
    /// let mut tree = RBTree::new();
    /// assert_eq!(tree.insert(4, "four"), None);
    /// assert_eq!(tree.insert(4, "FOUR"), Some("four"));
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let mut parent = None;
        let mut dir = Direction::Left;
        let mut cur = self.root;

        while let Some(id) = cur {
            let node = self.node(id);
            dir = match key.cmp(&node.key) {
                Ordering::Less => Direction::Left,
                Ordering::Greater => Direction::Right,
                Ordering::Equal => {
                    return Some(std::mem::replace(&mut self.node_mut(id).value, value))
                }
            };
            parent = cur;
            cur = node[dir];
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(RBTreeNode::new(key, value, parent));
        match parent {
            None => self.root = Some(id),
            Some(parent) => self.node_mut(parent)[dir] = Some(id),
        }
        debug!("attached {id:?} under {parent:?} ({dir:?}), len = {}", self.len());

        self.insert_fixup(id);
        None
    }

    /// Removes `key`, returning its value if it was present.
    ///
    /// ```rust
    /// # use redblack::RBTree;
    /// let mut tree = RBTree::new();
    /// tree.insert(4, 6);
    /// assert_eq!(tree.remove(&4), Some(6));
    /// assert_eq!(tree.remove(&4), None);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let node = self.find(key)?;

        // The color of whichever node physically leaves its position. For a two-child node that
        // is the successor, not `node`.
        let mut removed_color = self.node(node).color;
        let replacement;
        let replacement_parent;

        match (self.node(node)[Direction::Left], self.node(node)[Direction::Right]) {
            (None, right) => {
                replacement = right;
                replacement_parent = self.node(node).parent;
                self.transplant(node, right);
            }
            (left, None) => {
                replacement = left;
                replacement_parent = self.node(node).parent;
                self.transplant(node, left);
            }
            (Some(left), Some(right)) => {
                let successor = self.minimum(right);
                removed_color = self.node(successor).color;
                replacement = self.node(successor)[Direction::Right];

                if successor == right {
                    replacement_parent = Some(successor);
                } else {
                    replacement_parent = self.node(successor).parent;
                    self.transplant(successor, replacement);
                    self.node_mut(successor)[Direction::Right] = Some(right);
                    self.node_mut(right).parent = Some(successor);
                }

                self.transplant(node, Some(successor));
                self.node_mut(successor)[Direction::Left] = Some(left);
                self.node_mut(left).parent = Some(successor);
                let color = self.node(node).color;
                self.set_color(successor, color);
            }
        }

        if removed_color.is_black() {
            self.delete_fixup(replacement, replacement_parent);
        }

        let removed = self.release(node);
        debug!("removed {node:?}, len = {}", self.len());
        Some(removed.value)
    }

    /// Removes `key`. Returns whether it was present; an absent key leaves the tree untouched.
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.remove(key).is_some()
    }

    /// Restores the coloring rules after attaching the red node `node`.
    ///
    /// Attaching a red leaf can only break rule 3, so this walks the red-red pair upwards until it
    /// either disappears or gets fixed with at most two rotations.
    fn insert_fixup(&mut self, mut node: NodeId) {
        while let Some(parent) = self.node(node).parent {
            if self.node(parent).color.is_black() {
                break
            }
            // a red parent below a missing grandparent is the root, which gets painted below
            let Some(grandparent) = self.node(parent).parent else {
                break
            };

            let side = self.side_of(grandparent, Some(parent));
            let uncle = self.node(grandparent)[side.opposite()];

            if let Some(uncle) = uncle.filter(|&u| self.node(u).color.is_red()) {
                trace!("insert: red uncle at {uncle:?}, pushing the violation to {grandparent:?}");
                self.set_color(parent, Color::Black);
                self.set_color(uncle, Color::Black);
                self.set_color(grandparent, Color::Red);
                node = grandparent;
                continue
            }

            let mut top = parent;
            if self.node(parent)[side.opposite()] == Some(node) {
                trace!("insert: inner child {node:?}, straightening");
                self.rotate(parent, side);
                top = node;
            }
            trace!("insert: outer child, rotating at {grandparent:?}");
            self.set_color(top, Color::Black);
            self.set_color(grandparent, Color::Red);
            self.rotate(grandparent, side.opposite());
            break
        }

        if let Some(root) = self.root {
            self.set_color(root, Color::Black);
        }
    }

    /// Restores the coloring rules after a black node left the position now held by `x`.
    ///
    /// `x` may be missing, which is why its parent is passed separately. The position carries an
    /// extra black ("double black") that is moved up, or absorbed with rotations.
    fn delete_fixup(&mut self, mut x: Option<NodeId>, mut parent: Option<NodeId>) {
        while let Some(p) = parent {
            if self.color_of(x).is_red() {
                break
            }

            let side = self.side_of(p, x);
            let far = side.opposite();
            // the sibling side carries at least one more black than `x` does, so it can't be empty
            let mut sibling = self.node(p)[far]
                .expect("a double-black position always has a sibling");

            if self.node(sibling).color.is_red() {
                trace!("delete: red sibling {sibling:?}, rotating at {p:?}");
                self.set_color(sibling, Color::Black);
                self.set_color(p, Color::Red);
                self.rotate(p, side);
                sibling = self.node(p)[far]
                    .expect("the red sibling's child becomes the new sibling");
            }

            let near_child = self.node(sibling)[side];
            let far_child = self.node(sibling)[far];

            if self.color_of(near_child).is_black() && self.color_of(far_child).is_black() {
                trace!("delete: black nephews, moving the extra black up from {p:?}");
                self.set_color(sibling, Color::Red);
                x = Some(p);
                parent = self.node(p).parent;
                continue
            }

            if self.color_of(far_child).is_black() {
                trace!("delete: red near nephew, rotating at sibling {sibling:?}");
                if let Some(near_child) = near_child {
                    self.set_color(near_child, Color::Black);
                }
                self.set_color(sibling, Color::Red);
                self.rotate(sibling, far);
                sibling = self.node(p)[far]
                    .expect("the near nephew was rotated into the sibling position");
            }

            trace!("delete: red far nephew, rotating at {p:?}");
            let parent_color = self.node(p).color;
            self.set_color(sibling, parent_color);
            self.set_color(p, Color::Black);
            if let Some(far_child) = self.node(sibling)[far] {
                self.set_color(far_child, Color::Black);
            }
            self.rotate(p, side);
            x = self.root;
            break
        }

        if let Some(x) = x {
            self.set_color(x, Color::Black);
        }
    }
}

impl<K, V> Default for RBTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for RBTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for RBTree<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut tree = RBTree::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord, V> Extend<(K, V)> for RBTree<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}


#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};
    use simplelog::{Config, LevelFilter, TestLogger};

    use super::*;

    fn init_logging() {
        // only the first test to get here installs the logger
        let _ = TestLogger::init(LevelFilter::Debug, Config::default());
    }

    fn keys<K: Clone, V>(tree: &RBTree<K, V>) -> Vec<K> {
        let mut out = Vec::new();
        tree.in_order(|k, _| out.push(k.clone()));
        out
    }

    #[test]
    fn insert_and_search() {
        init_logging();
        let mut tree = RBTree::new();
        let entries = [("10", 10), ("3", 3), ("15", 15), ("7", 7), ("20", 20), ("1", 1), ("5", 5)];

        for (k, v) in entries {
            assert_eq!(tree.insert(k.to_string(), v), None);
        }
        assert_eq!(tree.len(), 7);

        for (k, v) in entries {
            let node = tree.search(k).unwrap_or_else(|| panic!("missing key {k:?} after insert"));
            assert_eq!(node.key(), k);
            assert_eq!(*node.value(), v);
        }
        assert_eq!(tree.search("7").map(|n| *n.value()), Some(7));

        // string keys compare lexicographically
        let walked = keys(&tree);
        assert_eq!(walked, ["1", "10", "15", "20", "3", "5", "7"]);
        assert!(walked.windows(2).all(|w| w[0] < w[1]));

        tree.in_order(|k, v| assert_eq!(tree.get(k.as_str()), Some(v)));
        tree.check_invariants().unwrap();
    }

    #[test]
    fn integer_keys_walk_in_numeric_order() {
        let mut tree = RBTree::new();
        for k in [10, 3, 15, 7, 20, 1, 5] {
            assert_eq!(tree.insert(k, k), None);
        }
        assert_eq!(tree.len(), 7);
        assert_eq!(tree.get(&7), Some(&7));
        assert_eq!(keys(&tree), [1, 3, 5, 7, 10, 15, 20]);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn delete_scenario() {
        init_logging();
        let mut tree = RBTree::new();
        let values = ["20", "15", "25", "10", "18", "8", "12", "16", "19"];
        for k in values {
            tree.insert(k, k);
        }
        tree.check_invariants().unwrap();

        let to_delete = ["10", "15", "20"];
        for k in to_delete {
            assert!(tree.delete(k), "expected delete({k:?}) to succeed");
            assert!(tree.search(k).is_none(), "key {k:?} still searchable after delete");
            tree.check_invariants().unwrap();
        }

        assert_eq!(tree.len(), values.len() - to_delete.len());
        assert_eq!(keys(&tree), ["12", "16", "18", "19", "25", "8"]);
        for k in ["8", "12", "16", "18", "19", "25"] {
            assert_eq!(tree.get(k), Some(&k));
        }
    }

    #[test]
    fn update_keeps_shape_and_size() {
        let mut tree: RBTree<i32, i32> = (0..64).map(|k| (k, k)).collect();
        let color_before = tree.search(&17).unwrap().color();
        let parent_before = tree.search(&17).unwrap().parent().map(|p| *p.key());

        assert_eq!(tree.insert(17, -17), Some(17));

        let node = tree.search(&17).unwrap();
        assert_eq!(*node.value(), -17);
        assert_eq!(node.color(), color_before);
        assert_eq!(node.parent().map(|p| *p.key()), parent_before);
        assert_eq!(tree.len(), 64);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn delete_absent_key_is_a_no_op() {
        let mut tree: RBTree<i32, &str> = [(2, "b"), (1, "a"), (3, "c")].into_iter().collect();
        let before = format!("{tree}");

        assert!(!tree.delete(&4));
        assert_eq!(tree.remove(&0), None);

        assert_eq!(tree.len(), 3);
        assert_eq!(format!("{tree}"), before);

        let mut empty: RBTree<i32, ()> = RBTree::new();
        assert!(!empty.delete(&1));
        assert!(empty.is_empty());
    }

    #[test]
    fn remove_returns_value() {
        let mut tree = RBTree::new();
        tree.insert("a".to_string(), vec![1, 2]);
        tree.insert("b".to_string(), vec![3]);

        assert_eq!(tree.remove("a"), Some(vec![1, 2]));
        assert_eq!(tree.get("a"), None);
        assert_eq!(tree.get("b"), Some(&vec![3]));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn delete_down_to_empty() {
        let mut tree: RBTree<u32, u32> = (0..100).map(|k| (k, k * 2)).collect();
        for k in (0..100).rev() {
            assert_eq!(tree.remove(&k), Some(k * 2));
            tree.check_invariants().unwrap();
        }
        assert!(tree.is_empty());
        assert!(tree.root().is_none());

        // the arena is reusable after being emptied
        tree.insert(7, 7);
        assert_eq!(tree.get(&7), Some(&7));
        tree.check_invariants().unwrap();
    }

    #[test]
    fn get_mut_and_contains() {
        let mut tree: RBTree<&str, i32> = RBTree::new();
        tree.insert("x", 1);
        *tree.get_mut("x").unwrap() += 41;
        assert_eq!(tree.get("x"), Some(&42));
        assert!(tree.contains_key("x"));
        assert!(!tree.contains_key("y"));
        assert!(tree.get_mut("y").is_none());
    }

    #[test]
    fn root_stays_black() {
        let mut tree = RBTree::new();
        for k in 0..10 {
            tree.insert(k, ());
            assert_eq!(tree.root().map(|r| r.color()), Some(Color::Black));
        }
        tree.clear();
        assert!(tree.root().is_none());
        assert_eq!(tree.len(), 0);
    }

    #[test]
    fn ascending_insert_stays_shallow() {
        const COUNT: usize = 1 << 12;
        let tree: RBTree<usize, usize> = (0..COUNT).map(|k| (k, k)).collect();

        fn depth<K, V>(node: Option<NodeRef<'_, K, V>>) -> usize {
            match node {
                None => 0,
                Some(n) => 1 + depth(n.left()).max(depth(n.right())),
            }
        }
        // height <= 2 * log2(n + 1)
        assert!(depth(tree.root()) <= 2 * 13);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn random_inserts_then_deletes_keep_invariants() {
        init_logging();
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut tree = RBTree::new();
        let mut inserted = Vec::new();
        let mut seen = BTreeSet::new();

        for _ in 0..1000 {
            let val: u32 = rng.gen_range(0..10_000);
            let key = val.to_string();
            tree.insert(key.clone(), val);
            if seen.insert(key.clone()) {
                inserted.push(key);
            }
            tree.check_invariants().unwrap();
        }
        assert_eq!(tree.len(), seen.len());

        inserted.shuffle(&mut rng);
        let half = inserted.len() / 2;
        for k in &inserted[..half] {
            assert!(tree.delete(k.as_str()), "delete({k:?}) unexpectedly failed");
            tree.check_invariants().unwrap();
        }
        assert_eq!(tree.len(), inserted.len() - half);

        for k in &inserted[..half] {
            assert!(tree.search(k.as_str()).is_none());
        }
        for k in &inserted[half..] {
            assert_eq!(tree.get(k.as_str()).map(|v| v.to_string()), Some(k.clone()));
        }

        let walked = keys(&tree);
        assert!(walked.windows(2).all(|w| w[0] < w[1]), "in-order walk not sorted");
    }

    #[test]
    fn random_mixed_ops_match_btreemap() {
        use std::collections::BTreeMap;

        let mut rng = StdRng::seed_from_u64(42);
        let mut tree = RBTree::new();
        let mut model = BTreeMap::new();

        for step in 0..5000u32 {
            let key: u16 = rng.gen_range(0..512);
            if rng.gen_bool(0.6) {
                assert_eq!(tree.insert(key, step), model.insert(key, step));
            } else {
                assert_eq!(tree.remove(&key), model.remove(&key));
            }
            assert_eq!(tree.len(), model.len());
        }
        tree.check_invariants().unwrap();
        assert!(tree.iter().eq(model.iter()));
    }
}
