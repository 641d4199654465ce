use std::fmt::{self, Display};
use std::io::{self, Write};

use super::node::{Direction, NodeId};
use super::RBTree;


impl<K: Display, V: Display> RBTree<K, V> {
    /// Writes the tree sideways: right subtree above, left subtree below, two spaces of indent per
    /// level, every node tagged with its color. An empty tree prints `(empty)`.
    ///
    /// This is a debugging aid, the format is not stable.
    pub fn print<W: Write>(&self, mut sink: W) -> io::Result<()> {
        write!(sink, "{self}")
    }

    /// [`print`](Self::print) to stdout.
    pub fn print_stdout(&self) -> io::Result<()> {
        self.print(io::stdout().lock())
    }
}

impl<K: Display, V: Display> Display for RBTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(root) = self.root else {
            return writeln!(f, "(empty)")
        };

        // reverse in-order walk, carrying the depth of each node along
        let mut stack: Vec<(NodeId, usize)> = Vec::new();
        let mut cur = Some((root, 0));
        loop {
            while let Some((id, depth)) = cur {
                stack.push((id, depth));
                cur = self.node(id)[Direction::Right].map(|c| (c, depth + 1));
            }
            let Some((id, depth)) = stack.pop() else { break };

            let node = self.node(id);
            writeln!(f, "{:indent$}[{}] {} => {}", "", node.color, node.key, node.value, indent = 2 * depth)?;
            cur = node[Direction::Left].map(|c| (c, depth + 1));
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn printed<K: Display, V: Display>(tree: &RBTree<K, V>) -> String {
        let mut buf = Vec::new();
        tree.print(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn empty_tree() {
        let tree: RBTree<String, i32> = RBTree::new();
        assert_eq!(printed(&tree), "(empty)\n");
        assert_eq!(printed(&tree).trim(), "(empty)");
    }

    #[test]
    fn three_nodes() {
        let mut tree = RBTree::new();
        tree.insert("b", 2);
        tree.insert("a", 1);
        tree.insert("c", 3);

        let out = printed(&tree);
        assert!(out.contains("[B] b => 2"), "expected root line, got {out:?}");
        assert!(out.contains("[R] a => 1"), "expected left child line, got {out:?}");
        assert_eq!(out, "  [R] c => 3\n[B] b => 2\n  [R] a => 1\n");
    }

    #[test]
    fn every_node_printed_once() {
        let tree: RBTree<u32, u32> = (0..300).map(|k| (k, k)).collect();
        let out = printed(&tree);
        assert_eq!(out.lines().count(), 300);

        // sideways means descending key order from top to bottom
        let keys: Vec<u32> = out
            .lines()
            .map(|line| line.trim_start().split(' ').nth(1).unwrap().parse().unwrap())
            .collect();
        assert_eq!(keys, (0..300).rev().collect::<Vec<_>>());

        let root_line = out.lines().find(|line| !line.starts_with(' ')).unwrap();
        assert!(root_line.starts_with("[B] "));
    }

    #[test]
    fn display_matches_print() {
        let tree: RBTree<i32, &str> = [(1, "one"), (2, "two")].into_iter().collect();
        assert_eq!(tree.to_string(), printed(&tree));
    }
}
