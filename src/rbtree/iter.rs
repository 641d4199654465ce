use std::iter::FusedIterator;

use super::node::{Direction, NodeId};
use super::RBTree;


/// An in-order iterator over the entries of an [`RBTree`].
///
/// Uses an explicit stack, so deep trees can't blow the call stack.
pub struct Iter<'a, K, V> {
    tree: &'a RBTree<K, V>,
    stack: Vec<NodeId>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn new(tree: &'a RBTree<K, V>) -> Self {
        let mut iter = Self { tree, stack: Vec::new(), remaining: tree.len() };
        iter.push_left_spine(tree.root);
        iter
    }

    fn push_left_spine(&mut self, mut cur: Option<NodeId>) {
        while let Some(id) = cur {
            self.stack.push(id);
            cur = self.tree.node(id)[Direction::Left];
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.tree.node(id);
        self.push_left_spine(node[Direction::Right]);
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self { tree: self.tree, stack: self.stack.clone(), remaining: self.remaining }
    }
}


impl<K, V> RBTree<K, V> {
    /// Iterates over the entries in increasing key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self)
    }

    /// Calls `visit` on every entry, in increasing key order.
    pub fn in_order<F: FnMut(&K, &V)>(&self, mut visit: F) {
        for (k, v) in self.iter() {
            visit(k, v);
        }
    }
}

impl<'a, K, V> IntoIterator for &'a RBTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
