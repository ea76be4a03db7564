use std::fmt;

use super::{
    frequency::Frequencies,
    tree::{Node, Tree},
};

/// A variable length bit string assigned to one byte value, `false` is a left turn in the tree
/// and `true` is a right turn
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Code(Vec<bool>);

impl Code {
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn bits(&self) -> &[bool] {
        &self.0
    }

    /// Return true if this code is a prefix of (or equal to) another code
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        other.0.starts_with(&self.0)
    }
}

impl From<Vec<bool>> for Code {
    fn from(bits: Vec<bool>) -> Self {
        Self(bits)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.0 {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// The `CodeTable` maps every byte value present in a [Tree] to its prefix code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    codes: Vec<Option<Code>>,
}

impl CodeTable {
    /// Walk a tree and record the path to every leaf. A tree that is a single leaf gets the one
    /// bit code `0`, so that every symbol still takes up space in the payload
    pub fn from_tree(tree: &Tree) -> Self {
        let mut codes = vec![None; 256];
        match tree.root() {
            Node::Leaf { value, .. } => codes[*value as usize] = Some(Code(vec![false])),
            root => Self::assign(root, &mut Vec::new(), &mut codes),
        }
        Self { codes }
    }

    fn assign(node: &Node, path: &mut Vec<bool>, codes: &mut [Option<Code>]) {
        match node {
            Node::Leaf { value, .. } => codes[*value as usize] = Some(Code(path.clone())),
            Node::Internal { left, right, .. } => {
                path.push(false);
                Self::assign(left, path, codes);
                path.pop();
                path.push(true);
                Self::assign(right, path, codes);
                path.pop();
            }
        }
    }

    /// Get the code of a byte value, `None` if the byte is not in the table
    #[inline]
    pub fn get(&self, byte: u8) -> Option<&Code> {
        self.codes[byte as usize].as_ref()
    }

    /// Return the number of byte values with a code
    pub fn len(&self) -> usize {
        self.codes.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over every (byte, code) pair in ascending byte order
    pub fn iter(&self) -> impl Iterator<Item = (u8, &Code)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(b, code)| code.as_ref().map(|code| (b as u8, code)))
    }

    /// Return the exact number of bits that encoding input with these frequencies takes
    pub fn encoded_bits(&self, freq: &Frequencies) -> u64 {
        freq.iter()
            .map(|(byte, count)| count * self.get(byte).map_or(0, |c| c.len() as u64))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(data: &[u8]) -> CodeTable {
        CodeTable::from_tree(&Tree::from_frequencies(&Frequencies::count(data)).unwrap())
    }

    #[test]
    fn small_table() {
        let codes = table(b"AAAAABBBCC");
        assert_eq!(codes.len(), 3);
        assert_eq!(codes.get(b'A').unwrap().to_string(), "0");
        assert_eq!(codes.get(b'C').unwrap().to_string(), "10");
        assert_eq!(codes.get(b'B').unwrap().to_string(), "11");
        assert!(codes.get(b'A').unwrap().len() < codes.get(b'C').unwrap().len());
        assert!(codes.get(b'D').is_none());
        assert_eq!(codes.encoded_bits(&Frequencies::count(b"AAAAABBBCC")), 15);
    }

    #[test]
    fn single_symbol() {
        let codes = table(&[0x41; 1000]);
        assert_eq!(codes.len(), 1);
        assert_eq!(codes.get(0x41), Some(&Code::from(vec![false])));
        assert_eq!(codes.encoded_bits(&Frequencies::count(&[0x41; 1000])), 1000);
    }

    #[test]
    fn prefix_free() {
        let data = b"the quick brown fox jumps over the lazy dog, again and again and again";
        let codes = table(data);
        let all = codes.iter().collect::<Vec<_>>();
        assert_eq!(all.len(), Frequencies::count(data).distinct());
        for (a, code_a) in &all {
            assert!(!code_a.is_empty());
            for (b, code_b) in &all {
                if a != b {
                    assert!(!code_a.is_prefix_of(code_b), "{} is a prefix of {}", code_a, code_b);
                }
            }
        }
    }
}
