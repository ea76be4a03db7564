/// The `Frequencies` struct tallies how many times each byte value occurs in an input
#[derive(Clone, PartialEq, Eq)]
pub struct Frequencies {
    counts: [u64; 256],
}

impl Default for Frequencies {
    fn default() -> Self {
        Self { counts: [0; 256] }
    }
}

impl std::fmt::Debug for Frequencies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl Frequencies {
    /// Count every byte in the input
    pub fn count(data: &[u8]) -> Self {
        let mut this = Self::default();
        this.add(data);
        this
    }

    /// Add the bytes of more input to the tally
    pub fn add(&mut self, data: &[u8]) {
        for &byte in data {
            self.counts[byte as usize] += 1;
        }
    }

    /// Get the number of occurrences of a byte value
    #[inline]
    pub fn get(&self, byte: u8) -> u64 {
        self.counts[byte as usize]
    }

    /// Return the number of distinct byte values that occurred at least once
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Return the total number of bytes counted
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Iterate over every byte value that occurred, with its count, in ascending byte order
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, c)| **c > 0)
            .map(|(b, &c)| (b as u8, c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_bytes() {
        let freq = Frequencies::count(b"AAAAABBBCC");
        assert_eq!(freq.get(b'A'), 5);
        assert_eq!(freq.get(b'B'), 3);
        assert_eq!(freq.get(b'C'), 2);
        assert_eq!(freq.get(b'D'), 0);
        assert_eq!(freq.distinct(), 3);
        assert_eq!(freq.total(), 10);
        assert_eq!(
            freq.iter().collect::<Vec<_>>(),
            vec![(b'A', 5), (b'B', 3), (b'C', 2)]
        );
    }

    #[test]
    fn empty_input() {
        let freq = Frequencies::count(&[]);
        assert_eq!(freq.distinct(), 0);
        assert_eq!(freq.iter().count(), 0);
    }
}
