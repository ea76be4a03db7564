//! Canonical serialization of prefix-code trees as a pair of traversals.
//!
//! Both traversals list every node of the tree. A leaf is recorded by its byte value and an
//! internal node by its separator rank `k`: the internal node that sits between the k-th and
//! the (k+1)-th leaf when reading leaves from left to right. The inorder traversal of a full
//! tree alternates leaf, internal, leaf, ... so the internal node of rank `k` is always at
//! inorder position `2k + 1` and leaves are at the even positions. Leaf values are unique
//! (one leaf per distinct byte) and so are ranks, which is what lets the preorder traversal be
//! matched back into the inorder one.
//!
//! Byte layout: `[u16 N][N inorder bytes][N preorder bytes]` with N = 2 * leaves - 1.

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{Read, Write};

use super::{
    tree::{Node, Tree},
    CodecErr, CodecResult, ReadFieldExt,
};

/// Largest traversal length, a tree of 256 leaves has 511 nodes
pub const MAX_TRAVERSAL_LEN: usize = 511;

/// The `SerializedTree` holds the inorder and preorder traversals of a [Tree], enough to
/// rebuild the exact tree shape without any other data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedTree {
    inorder: Vec<u8>,
    preorder: Vec<u8>,
}

fn corrupt(msg: impl Into<String>) -> CodecErr {
    CodecErr::CorruptTree(msg.into())
}

impl SerializedTree {
    /// Record both traversals of a tree
    pub fn serialize(tree: &Tree) -> Self {
        let nodes = 2 * tree.leaf_count() - 1;
        let mut this = Self {
            inorder: Vec::with_capacity(nodes),
            preorder: Vec::with_capacity(nodes),
        };
        let mut leaves_seen = 0usize;
        this.walk(tree.root(), &mut leaves_seen);
        this
    }

    fn walk(&mut self, node: &Node, leaves_seen: &mut usize) {
        match node {
            Node::Leaf { value, .. } => {
                self.inorder.push(*value);
                self.preorder.push(*value);
                *leaves_seen += 1;
            }
            Node::Internal { left, right, .. } => {
                // The rank is only known once the left subtree has been walked
                let slot = self.preorder.len();
                self.preorder.push(0);
                self.walk(left, leaves_seen);
                let rank = (*leaves_seen - 1) as u8;
                self.preorder[slot] = rank;
                self.inorder.push(rank);
                self.walk(right, leaves_seen);
            }
        }
    }

    /// Create a serialized tree from raw traversals, checking that they have a usable length
    pub fn from_parts(inorder: Vec<u8>, preorder: Vec<u8>) -> CodecResult<Self> {
        if inorder.len() != preorder.len() {
            return Err(corrupt(format!(
                "inorder has {} entries but preorder has {}",
                inorder.len(),
                preorder.len()
            )));
        }
        Self::check_len(inorder.len())?;
        Ok(Self { inorder, preorder })
    }

    fn check_len(len: usize) -> CodecResult<()> {
        if len == 0 || len > MAX_TRAVERSAL_LEN || len % 2 == 0 {
            return Err(corrupt(format!(
                "a full tree cannot have {} nodes",
                len
            )));
        }
        Ok(())
    }

    /// Return the number of entries in each traversal
    #[inline]
    pub fn len(&self) -> usize {
        self.inorder.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inorder.is_empty()
    }

    #[inline]
    pub fn inorder(&self) -> &[u8] {
        &self.inorder
    }

    #[inline]
    pub fn preorder(&self) -> &[u8] {
        &self.preorder
    }

    /// Return the number of bytes that [write_to](fn@SerializedTree::write_to) produces
    #[inline]
    pub fn encoded_len(&self) -> usize {
        2 + 2 * self.len()
    }

    /// Rebuild the tree these traversals were taken from. Rebuilt nodes carry no frequency
    /// information, every priority is zero
    pub fn deserialize(&self) -> CodecResult<Tree> {
        Self::check_len(self.len())?;
        if self.preorder.len() != self.len() {
            return Err(corrupt("traversal lengths differ"));
        }

        let mut seen = [false; 256];
        for (pos, &entry) in self.inorder.iter().enumerate() {
            if pos % 2 == 0 {
                if seen[entry as usize] {
                    return Err(corrupt(format!("leaf value {} appears twice", entry)));
                }
                seen[entry as usize] = true;
            } else if entry as usize != pos / 2 {
                return Err(corrupt(format!(
                    "inorder position {} holds rank {} instead of {}",
                    pos,
                    entry,
                    pos / 2
                )));
            }
        }

        let mut next = 0usize;
        let root = self.rebuild(0, self.len() - 1, &mut next)?;
        if next != self.len() {
            return Err(corrupt(format!(
                "{} preorder entries were never used",
                self.len() - next
            )));
        }
        Ok(Tree::from_root(root))
    }

    /// Rebuild the subtree covering the inorder range `start..=end`, taking its root from the
    /// next unused preorder entry
    fn rebuild(&self, start: usize, end: usize, next: &mut usize) -> CodecResult<Node> {
        let value = *self
            .preorder
            .get(*next)
            .ok_or_else(|| corrupt("preorder traversal ended early"))?;
        *next += 1;

        if start == end {
            // A single inorder entry is always a leaf
            let leaf = self.inorder[start];
            if leaf != value {
                return Err(corrupt(format!(
                    "preorder expects {} where the inorder leaf is {}",
                    value, leaf
                )));
            }
            return Ok(Node::leaf(value, 0));
        }

        let split = (start + 1..end)
            .step_by(2)
            .find(|&pos| self.inorder[pos] == value)
            .ok_or_else(|| {
                corrupt(format!(
                    "rank {} is not inside inorder range {}..={}",
                    value, start, end
                ))
            })?;
        let left = self.rebuild(start, split - 1, next)?;
        let right = self.rebuild(split + 1, end, next)?;
        Ok(Node::merge(left, right))
    }

    /// Write the traversal length and both traversals
    pub fn write_to<W: Write>(&self, writer: &mut W) -> CodecResult<()> {
        writer.write_u16::<LittleEndian>(self.len() as u16)?;
        writer.write_all(&self.inorder)?;
        writer.write_all(&self.preorder)?;
        Ok(())
    }

    /// Read a serialized tree written by [write_to](fn@SerializedTree::write_to)
    pub fn read_from<R: Read>(reader: &mut R) -> CodecResult<Self> {
        let len = reader.u16_field("tree traversal length")? as usize;
        Self::check_len(len)?;
        let mut inorder = vec![0u8; len];
        reader.field(&mut inorder, "inorder traversal")?;
        let mut preorder = vec![0u8; len];
        reader.field(&mut preorder, "preorder traversal")?;
        Ok(Self { inorder, preorder })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::{code_table::CodeTable, frequency::Frequencies};

    fn tree(data: &[u8]) -> Tree {
        Tree::from_frequencies(&Frequencies::count(data)).unwrap()
    }

    #[test]
    fn traversals_of_small_tree() {
        let ser = SerializedTree::serialize(&tree(b"AAAAABBBCC"));
        assert_eq!(ser.inorder(), &[b'A', 0, b'C', 1, b'B']);
        assert_eq!(ser.preorder(), &[0, b'A', 1, b'C', b'B']);
        assert_eq!(ser.encoded_len(), 12);
    }

    #[test]
    fn rebuild_same_shape() {
        for data in [
            &b"AAAAABBBCC"[..],
            &b"A"[..],
            &b"mississippi river banks"[..],
            &(0..=255u8).collect::<Vec<_>>()[..],
        ]
        .iter()
        {
            let original = tree(data);
            let ser = SerializedTree::serialize(&original);
            assert_eq!(ser.len(), 2 * original.leaf_count() - 1);
            let rebuilt = ser.deserialize().unwrap();
            assert_eq!(rebuilt.leaves(), original.leaves());
            assert_eq!(CodeTable::from_tree(&rebuilt), CodeTable::from_tree(&original));
        }
    }

    #[test]
    fn single_leaf() {
        let ser = SerializedTree::serialize(&tree(&[7; 40]));
        assert_eq!(ser.inorder(), &[7]);
        assert_eq!(ser.preorder(), &[7]);
        assert_eq!(ser.deserialize().unwrap().root(), &Node::leaf(7, 0));
    }

    #[test]
    fn bytes_round_trip() {
        let ser = SerializedTree::serialize(&tree(b"hello world"));
        let mut buf = Vec::new();
        ser.write_to(&mut buf).unwrap();
        assert_eq!(buf.len(), ser.encoded_len());
        assert_eq!(&buf[..2], &(ser.len() as u16).to_le_bytes());
        let read = SerializedTree::read_from(&mut &buf[..]).unwrap();
        assert_eq!(read, ser);
    }

    #[test]
    fn value_outside_range() {
        let ser = SerializedTree::from_parts(vec![b'A', 0, b'C', 1, b'B'], vec![1, b'A', 0, b'C', b'B'])
            .unwrap();
        // rank 1 splits off A and C, then A is expected at the range that holds only C
        assert!(matches!(ser.deserialize(), Err(CodecErr::CorruptTree(_))));
    }

    #[test]
    fn corrupt_traversals() {
        // wrong leaf in preorder
        let ser = SerializedTree::from_parts(vec![b'A', 0, b'C'], vec![0, b'A', b'D']).unwrap();
        assert!(matches!(ser.deserialize(), Err(CodecErr::CorruptTree(_))));
        // duplicate leaves
        let ser = SerializedTree::from_parts(vec![b'A', 0, b'A'], vec![0, b'A', b'A']).unwrap();
        assert!(matches!(ser.deserialize(), Err(CodecErr::CorruptTree(_))));
        // misplaced rank
        let ser = SerializedTree::from_parts(vec![b'A', 3, b'C'], vec![3, b'A', b'C']).unwrap();
        assert!(matches!(ser.deserialize(), Err(CodecErr::CorruptTree(_))));
        // even lengths cannot describe a full tree
        assert!(SerializedTree::from_parts(vec![1, 0], vec![0, 1]).is_err());
        assert!(SerializedTree::from_parts(vec![1, 0, 2], vec![0, 1]).is_err());
    }

    #[test]
    fn truncated_header() {
        let ser = SerializedTree::serialize(&tree(b"hello world"));
        let mut buf = Vec::new();
        ser.write_to(&mut buf).unwrap();
        buf.truncate(buf.len() - 1);
        assert!(matches!(
            SerializedTree::read_from(&mut &buf[..]),
            Err(CodecErr::Truncated("preorder traversal"))
        ));
        assert!(matches!(
            SerializedTree::read_from(&mut &[0u8, 0][..]),
            Err(CodecErr::CorruptTree(_))
        ));
    }
}
