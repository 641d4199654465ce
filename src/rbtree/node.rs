use std::fmt;
use std::ops::{Index, IndexMut};

use super::RBTree;


/// The color of a node. Missing children always read as [`Color::Black`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Black,
}

impl Color {
    pub fn is_red(self) -> bool {
        self == Color::Red
    }

    pub fn is_black(self) -> bool {
        self == Color::Black
    }

    /// The single-letter tag used by the structural dump.
    pub fn tag(self) -> &'static str {
        match self {
            Color::Red => "R",
            Color::Black => "B",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}


/// Which side of its parent a node hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Direction {
    Left,
    Right,
}

impl Direction {
    pub(super) fn opposite(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}


/// Handle to a slot in the tree's node arena.
///
/// Handles are only meaningful for the tree that produced them, and only until the next removal
/// (removal compacts the arena by moving the last slot into the freed one).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) struct NodeId(pub(super) usize);


pub(super) struct RBTreeNode<K, V> {
    pub(super) key: K,
    pub(super) value: V,
    pub(super) color: Color,

    /// Back-reference used for navigation only. `None` iff this is the root.
    pub(super) parent: Option<NodeId>,
    pub(super) child: [Option<NodeId>; 2],
}

impl<K, V> RBTreeNode<K, V> {
    /// New nodes always start out red.
    pub(super) fn new(key: K, value: V, parent: Option<NodeId>) -> Self {
        Self {
            key,
            value,
            color: Color::Red,
            parent,
            child: [None, None],
        }
    }
}

impl<K, V> Index<Direction> for RBTreeNode<K, V> {
    type Output = Option<NodeId>;

    fn index(&self, index: Direction) -> &Self::Output {
        match index {
            Direction::Left => &self.child[0],
            Direction::Right => &self.child[1],
        }
    }
}

impl<K, V> IndexMut<Direction> for RBTreeNode<K, V> {
    fn index_mut(&mut self, index: Direction) -> &mut Self::Output {
        match index {
            Direction::Left => &mut self.child[0],
            Direction::Right => &mut self.child[1],
        }
    }
}


/// A read-only view of one node in an [`RBTree`].
///
/// This is what [`RBTree::search`] and [`RBTree::root`] hand out. It borrows the whole tree, so the
/// structure can be walked in any direction, but nothing can be mutated while it is alive.
pub struct NodeRef<'a, K, V> {
    tree: &'a RBTree<K, V>,
    id: NodeId,
}

impl<K, V> Clone for NodeRef<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<K, V> Copy for NodeRef<'_, K, V> {}

impl<'a, K, V> NodeRef<'a, K, V> {
    pub(super) fn new(tree: &'a RBTree<K, V>, id: NodeId) -> Self {
        Self { tree, id }
    }

    fn node(&self) -> &'a RBTreeNode<K, V> {
        self.tree.node(self.id)
    }

    fn link(&self, id: Option<NodeId>) -> Option<NodeRef<'a, K, V>> {
        id.map(|id| NodeRef::new(self.tree, id))
    }

    pub fn key(&self) -> &'a K {
        &self.node().key
    }

    pub fn value(&self) -> &'a V {
        &self.node().value
    }

    pub fn color(&self) -> Color {
        self.node().color
    }

    pub fn parent(&self) -> Option<NodeRef<'a, K, V>> {
        self.link(self.node().parent)
    }

    pub fn left(&self) -> Option<NodeRef<'a, K, V>> {
        self.link(self.node()[Direction::Left])
    }

    pub fn right(&self) -> Option<NodeRef<'a, K, V>> {
        self.link(self.node()[Direction::Right])
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for NodeRef<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("key", self.key())
            .field("value", self.value())
            .field("color", &self.color())
            .finish()
    }
}
