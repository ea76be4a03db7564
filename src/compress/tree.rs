//! Binary prefix-code trees and the priority queue builder that produces them

use std::{
    cmp::{Ordering, Reverse},
    collections::BinaryHeap,
};

use super::{frequency::Frequencies, CodecErr, CodecResult};

/// Anything that can be ordered in a [PriorityTreeBuilder] by a weight, lower weights
/// are merged first
pub trait Weighted {
    fn weight(&self) -> u64;
}

/// One vertex of a [Tree]. Leaves carry a byte value, internal nodes always own exactly two
/// children so every tree built from nodes is full
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf {
        value: u8,
        priority: u64,
    },
    Internal {
        priority: u64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    /// Create a leaf node for a byte value
    #[inline]
    pub const fn leaf(value: u8, priority: u64) -> Self {
        Self::Leaf { value, priority }
    }

    /// Create an internal node whose priority is the sum of its children's priorities
    pub fn merge(left: Node, right: Node) -> Self {
        Self::Internal {
            priority: left.priority() + right.priority(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[inline]
    pub const fn priority(&self) -> u64 {
        match self {
            Self::Leaf { priority, .. } | Self::Internal { priority, .. } => *priority,
        }
    }

    #[inline]
    pub const fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. })
    }

    /// Return the byte value of this node if it is a leaf
    #[inline]
    pub const fn value(&self) -> Option<u8> {
        match self {
            Self::Leaf { value, .. } => Some(*value),
            Self::Internal { .. } => None,
        }
    }

    /// Return the (left, right) children of this node if it is an internal node
    #[inline]
    pub fn children(&self) -> Option<(&Node, &Node)> {
        match self {
            Self::Internal { left, right, .. } => Some((&**left, &**right)),
            Self::Leaf { .. } => None,
        }
    }
}

impl Weighted for Node {
    fn weight(&self) -> u64 {
        self.priority()
    }
}

/// An item waiting in the builder's queue, ordered by weight and then by insertion order so
/// that equal weights always merge the same way
struct Pending<N> {
    weight: u64,
    seq: u64,
    node: N,
}

impl<N> PartialEq for Pending<N> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<N> Eq for Pending<N> {}

impl<N> PartialOrd for Pending<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<N> Ord for Pending<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.weight, self.seq).cmp(&(other.weight, other.seq))
    }
}

/// The `PriorityTreeBuilder` repeatedly merges the two lowest weight items of a min-priority
/// queue until only the root remains. The merge operation is supplied by the caller, so the
/// same builder can construct any kind of tree
pub struct PriorityTreeBuilder<N, F> {
    heap: BinaryHeap<Reverse<Pending<N>>>,
    /// Insertion counter used to break ties between equal weights
    seq: u64,
    merge: F,
}

impl<N: Weighted, F: FnMut(N, N) -> N> PriorityTreeBuilder<N, F> {
    /// Create an empty builder that joins nodes using `merge(left, right)`
    pub fn new(merge: F) -> Self {
        Self {
            heap: BinaryHeap::new(),
            seq: 0,
            merge,
        }
    }

    /// Add a candidate to the queue. Candidates with equal weights are merged in the order
    /// they were pushed
    pub fn push(&mut self, node: N) {
        self.heap.push(Reverse(Pending {
            weight: node.weight(),
            seq: self.seq,
            node,
        }));
        self.seq += 1;
    }

    /// Return the number of items waiting in the queue
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Merge every queued item into a single root. A single candidate is returned unchanged
    pub fn build(mut self) -> CodecResult<N> {
        loop {
            let Reverse(first) = self.heap.pop().ok_or(CodecErr::EmptyInput)?;
            match self.heap.pop() {
                Some(Reverse(second)) => {
                    let merged = (self.merge)(first.node, second.node);
                    self.push(merged);
                }
                None => return Ok(first.node),
            }
        }
    }
}

impl<N: Weighted, F: FnMut(N, N) -> N> Extend<N> for PriorityTreeBuilder<N, F> {
    fn extend<I: IntoIterator<Item = N>>(&mut self, iter: I) {
        for node in iter {
            self.push(node);
        }
    }
}

/// A full binary tree holding one leaf per distinct byte value, wrapping its root [Node]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    root: Node,
}

impl Tree {
    /// Build an optimal prefix-code tree from byte frequencies. Leaves are queued in ascending
    /// byte order, so ties between equal frequencies are broken by byte value
    pub fn from_frequencies(freq: &Frequencies) -> CodecResult<Self> {
        let mut builder = PriorityTreeBuilder::new(Node::merge);
        builder.extend(freq.iter().map(|(value, count)| Node::leaf(value, count)));
        let root = builder.build()?;
        let tree = Self { root };
        tracing::trace!(
            leaves = tree.leaf_count(),
            height = tree.height(),
            "built prefix-code tree"
        );
        Ok(tree)
    }

    /// Wrap an already constructed root node
    #[inline]
    pub const fn from_root(root: Node) -> Self {
        Self { root }
    }

    #[inline]
    pub const fn root(&self) -> &Node {
        &self.root
    }

    /// Return the number of leaves in the tree
    pub fn leaf_count(&self) -> usize {
        fn count(node: &Node) -> usize {
            match node.children() {
                Some((left, right)) => count(left) + count(right),
                None => 1,
            }
        }
        count(&self.root)
    }

    /// Return the length of the longest root to leaf path, a single leaf tree has height 0
    pub fn height(&self) -> usize {
        fn height(node: &Node) -> usize {
            match node.children() {
                Some((left, right)) => 1 + height(left).max(height(right)),
                None => 0,
            }
        }
        height(&self.root)
    }

    /// Return the leaf values from left to right
    pub fn leaves(&self) -> Vec<u8> {
        fn collect(node: &Node, out: &mut Vec<u8>) {
            match node {
                Node::Leaf { value, .. } => out.push(*value),
                Node::Internal { left, right, .. } => {
                    collect(left, out);
                    collect(right, out);
                }
            }
        }
        let mut out = Vec::new();
        collect(&self.root, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sum of depth * frequency over every leaf
    fn weighted_path_length(node: &Node, depth: u64) -> u64 {
        match node {
            Node::Leaf { priority, .. } => priority * depth,
            Node::Internal { left, right, .. } => {
                weighted_path_length(left, depth + 1) + weighted_path_length(right, depth + 1)
            }
        }
    }

    fn is_full(node: &Node) -> bool {
        match node {
            Node::Leaf { .. } => true,
            Node::Internal { left, right, .. } => is_full(left) && is_full(right),
        }
    }

    #[test]
    fn empty_builder() {
        let builder = PriorityTreeBuilder::new(Node::merge);
        assert!(builder.is_empty());
        assert!(matches!(builder.build(), Err(CodecErr::EmptyInput)));
        assert!(matches!(
            Tree::from_frequencies(&Frequencies::default()),
            Err(CodecErr::EmptyInput)
        ));
    }

    #[test]
    fn single_leaf() {
        let tree = Tree::from_frequencies(&Frequencies::count(&[0x41; 1000])).unwrap();
        assert_eq!(tree.root(), &Node::leaf(0x41, 1000));
        assert!(tree.root().is_leaf());
        assert_eq!(tree.root().value(), Some(0x41));
        assert_eq!(tree.leaf_count(), 1);
        assert_eq!(tree.height(), 0);
    }

    #[test]
    fn shape_of_small_tree() {
        let tree = Tree::from_frequencies(&Frequencies::count(b"AAAAABBBCC")).unwrap();
        // C(2) and B(3) merge first, then A(5) is queued before the merged 5
        let expected = Node::merge(
            Node::leaf(b'A', 5),
            Node::merge(Node::leaf(b'C', 2), Node::leaf(b'B', 3)),
        );
        assert_eq!(tree.root(), &expected);
        assert_eq!(tree.root().priority(), 10);
        assert_eq!(tree.leaves(), b"ACB".to_vec());
    }

    #[test]
    fn deterministic_ties() {
        let data = b"abcdefgh";
        let first = Tree::from_frequencies(&Frequencies::count(data)).unwrap();
        let second = Tree::from_frequencies(&Frequencies::count(data)).unwrap();
        assert_eq!(first, second);
        // eight equal weights form a balanced tree
        assert_eq!(first.height(), 3);
        assert_eq!(first.leaves(), b"abcdefgh".to_vec());
    }

    #[test]
    fn all_byte_values() {
        let data = (0..=255u8).collect::<Vec<_>>();
        let tree = Tree::from_frequencies(&Frequencies::count(&data)).unwrap();
        assert_eq!(tree.leaf_count(), 256);
        assert_eq!(tree.height(), 8);
        assert!(is_full(tree.root()));
    }

    #[test]
    fn optimal_weights() {
        // Classic textbook frequencies, optimal cost is 224
        let mut freq = Frequencies::default();
        for (byte, count) in [(b'a', 45), (b'b', 13), (b'c', 12), (b'd', 16), (b'e', 9), (b'f', 5)]
            .iter()
        {
            freq.add(&vec![*byte; *count]);
        }
        let tree = Tree::from_frequencies(&freq).unwrap();
        assert_eq!(weighted_path_length(tree.root(), 0), 224);
        assert_eq!(tree.leaf_count(), 6);
        assert!(is_full(tree.root()));
    }

    /// A weighted label used to check that the builder works for other node types
    struct Label(u64, String);

    impl Weighted for Label {
        fn weight(&self) -> u64 {
            self.0
        }
    }

    #[test]
    fn generic_merge() {
        let mut builder = PriorityTreeBuilder::new(|l: Label, r: Label| {
            Label(l.0 + r.0, format!("({} {})", l.1, r.1))
        });
        builder.extend(vec![
            Label(4, "x".into()),
            Label(1, "y".into()),
            Label(2, "z".into()),
        ]);
        assert_eq!(builder.len(), 3);
        let root = builder.build().unwrap();
        assert_eq!(root.0, 7);
        assert_eq!(root.1, "((y z) x)");
    }
}
