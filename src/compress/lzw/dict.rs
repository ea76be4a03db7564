use std::collections::HashMap;

/// Number of single byte patterns every dictionary starts with
pub const SEED_LEN: u32 = 256;

/// One dictionary pattern, stored as the code of the pattern it extends plus one byte
#[derive(Debug, Clone, Copy)]
struct Entry {
    /// Code of the pattern without its last byte, `None` for the single byte seeds
    prefix: Option<u32>,
    last: u8,
    first: u8,
}

/// The `Dictionary` maps byte patterns to LZW codes and codes back to patterns. It starts with
/// the 256 single byte patterns and only ever grows
#[derive(Debug, Clone)]
pub struct Dictionary {
    /// (prefix code, next byte) to the code of the extended pattern
    lookup: HashMap<(u32, u8), u32>,
    entries: Vec<Entry>,
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl Dictionary {
    /// Create a dictionary seeded with every single byte pattern, byte `b` has code `b`
    pub fn new() -> Self {
        Self {
            lookup: HashMap::new(),
            entries: (0..=255u8)
                .map(|b| Entry {
                    prefix: None,
                    last: b,
                    first: b,
                })
                .collect(),
        }
    }

    /// Return the number of patterns in the dictionary
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// A dictionary is never empty, it always holds the seed patterns
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the code the next inserted pattern will get
    #[inline]
    pub fn next_code(&self) -> u32 {
        self.entries.len() as u32
    }

    #[inline]
    pub fn contains(&self, code: u32) -> bool {
        (code as usize) < self.entries.len()
    }

    /// Find the code of the pattern `prefix` extended by `byte`
    #[inline]
    pub fn find(&self, prefix: u32, byte: u8) -> Option<u32> {
        self.lookup.get(&(prefix, byte)).copied()
    }

    /// Add the pattern `prefix` extended by `byte`, returning its new code. The prefix code must
    /// already be in the dictionary
    pub fn insert(&mut self, prefix: u32, byte: u8) -> u32 {
        debug_assert!(self.contains(prefix), "prefix {} is not in the dictionary", prefix);
        let code = self.next_code();
        let first = self.entries[prefix as usize].first;
        self.entries.push(Entry {
            prefix: Some(prefix),
            last: byte,
            first,
        });
        self.lookup.entry((prefix, byte)).or_insert(code);
        code
    }

    /// Return the first byte of a pattern
    #[inline]
    pub fn first_byte(&self, code: u32) -> Option<u8> {
        self.entries.get(code as usize).map(|e| e.first)
    }

    /// Find the code of a whole pattern
    pub fn code_of(&self, pattern: &[u8]) -> Option<u32> {
        let (&first, rest) = pattern.split_first()?;
        rest.iter()
            .try_fold(first as u32, |code, &byte| self.find(code, byte))
    }

    /// Append the bytes of a pattern to a buffer, returning false if the code is unknown
    pub fn append_pattern(&self, code: u32, out: &mut Vec<u8>) -> bool {
        if !self.contains(code) {
            return false;
        }
        let start = out.len();
        let mut next = Some(code);
        while let Some(code) = next {
            let entry = self.entries[code as usize];
            out.push(entry.last);
            next = entry.prefix;
        }
        out[start..].reverse();
        true
    }

    /// Return the bytes of a pattern
    pub fn pattern(&self, code: u32) -> Option<Vec<u8>> {
        let mut out = Vec::new();
        if self.append_pattern(code, &mut out) {
            Some(out)
        } else {
            None
        }
    }
}
